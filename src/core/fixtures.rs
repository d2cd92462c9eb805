//! Shared test records

use super::task::{Priority, Task, TaskId};
use super::TaskStore;
use chrono::NaiveDateTime;

/// Fixed timestamp `minutes` after a base instant
pub fn at(minutes: i64) -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
        + chrono::Duration::minutes(minutes)
}

pub fn record(
    id: &str,
    parent: Option<&str>,
    anchor: Option<&str>,
    priority: i64,
    minute: i64,
) -> Task {
    Task {
        id: TaskId::from(id),
        title: format!("Task {id}"),
        description: String::new(),
        completed: false,
        stashed: false,
        parent_id: parent.map(TaskId::from),
        workflow_sibling_of: anchor.map(TaskId::from),
        created: at(minute),
        priority: Priority::new(priority),
    }
}

/// Full tree under `root`: `fanout` subtasks and `fanout` workflow siblings
/// at every node, `depth` levels deep. Returns the node count.
pub fn grow(store: &mut TaskStore, root: &str, depth: usize, fanout: usize) -> usize {
    let mut clock = 0;
    store.insert(record(root, None, None, 1, clock));
    1 + grow_children(store, root, None, depth, fanout, &mut clock)
}

fn grow_children(
    store: &mut TaskStore,
    id: &str,
    parent: Option<&str>,
    depth: usize,
    fanout: usize,
    clock: &mut i64,
) -> usize {
    if depth == 0 {
        return 0;
    }
    let mut count = 0;
    for i in 0..fanout {
        *clock += 1;
        let sub = format!("{id}.s{i}");
        store.insert(record(&sub, Some(id), None, i as i64 + 1, *clock));
        count += 1 + grow_children(store, &sub, Some(id), depth - 1, fanout, clock);

        *clock += 1;
        let wf = format!("{id}.w{i}");
        store.insert(record(&wf, parent, Some(id), i as i64 + 1, *clock));
        count += 1 + grow_children(store, &wf, parent, depth - 1, fanout, clock);
    }
    count
}
