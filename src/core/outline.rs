//! Text outline - the tree rendering used by text mode and `flowtask list`
//!
//! Subtasks indent one level under their parent. Workflow siblings stay on
//! their anchor's level, right after the anchor's own subtasks.

use super::task::{Priority, TaskId, TaskStatus, ViewFilter};
use super::TaskStore;
use std::collections::HashSet;

/// One rendered line of the outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLine {
    pub id: TaskId,
    pub depth: usize,
    /// Box-drawing guide preceding the title
    pub guide: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
}

impl OutlineLine {
    /// Status mark and title, without the guide
    pub fn label(&self) -> String {
        let mark = match self.status {
            TaskStatus::Active => "",
            TaskStatus::Done => "✓ ",
            TaskStatus::Stashed => "⏸ ",
        };
        format!("{}{}", mark, self.title)
    }

    /// Full line: guide then label
    pub fn text(&self) -> String {
        format!("{}{}", self.guide, self.label())
    }
}

/// Builds outlines for several trees, emitting each task at most once
pub struct Outliner<'a> {
    store: &'a TaskStore,
    filter: ViewFilter,
    visited: HashSet<TaskId>,
}

impl<'a> Outliner<'a> {
    pub fn new(store: &'a TaskStore, filter: ViewFilter) -> Self {
        Self {
            store,
            filter,
            visited: HashSet::new(),
        }
    }

    /// Outline of `root` and its reachable tasks that match the filter.
    ///
    /// A task outside the filter hides its whole branch.
    pub fn tree(&mut self, root: &TaskId) -> Vec<OutlineLine> {
        let mut lines = Vec::new();
        let level = self.level(std::slice::from_ref(root));
        for id in level {
            self.emit(&id, 0, "", true, &mut lines);
        }
        lines
    }

    /// Visible tasks of one level: each task followed by its workflow chain
    fn level(&mut self, ids: &[TaskId]) -> Vec<TaskId> {
        let mut out = Vec::new();
        for id in ids {
            self.chain(id, &mut out);
        }
        out
    }

    fn chain(&mut self, id: &TaskId, out: &mut Vec<TaskId>) {
        let Some(task) = self.store.get(id) else {
            return;
        };
        if !self.filter.matches(task) || self.visited.contains(id) {
            return;
        }
        self.visited.insert(id.clone());
        out.push(id.clone());
        for sibling in self.store.workflow_siblings(id) {
            self.chain(&sibling, out);
        }
    }

    fn emit(
        &mut self,
        id: &TaskId,
        depth: usize,
        prefix: &str,
        is_last: bool,
        lines: &mut Vec<OutlineLine>,
    ) {
        let Some(task) = self.store.get(id) else {
            return;
        };
        let guide = if depth == 0 {
            String::new()
        } else {
            format!("{}{}", prefix, if is_last { "└── " } else { "├── " })
        };
        lines.push(OutlineLine {
            id: id.clone(),
            depth,
            guide,
            title: task.title.clone(),
            status: task.status(),
            priority: task.priority,
        });

        let child_prefix = if depth == 0 {
            String::new()
        } else {
            format!("{}{}", prefix, if is_last { "    " } else { "│   " })
        };
        // Workflow siblings after this task share its level, so the level's
        // membership was fixed by the caller; only subtasks open a new level.
        let children = self.level(&self.store.subtasks(id));
        let count = children.len();
        for (i, child) in children.iter().enumerate() {
            self.emit(child, depth + 1, &child_prefix, i + 1 == count, lines);
        }
    }
}

/// Outline of several roots, one block per root
pub fn outline(store: &TaskStore, roots: &[TaskId], filter: ViewFilter) -> Vec<Vec<OutlineLine>> {
    let mut outliner = Outliner::new(store, filter);
    roots
        .iter()
        .map(|root| outliner.tree(root))
        .filter(|block| !block.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::record;

    fn texts(lines: &[OutlineLine]) -> Vec<String> {
        lines.iter().map(OutlineLine::text).collect()
    }

    #[test]
    fn test_outline_shape() {
        let mut store = TaskStore::new();
        store.insert(record("a", None, None, 1, 0));
        store.insert(record("b", Some("a"), None, 1, 1));
        store.insert(record("b2", Some("a"), Some("b"), 2, 2));
        store.insert(record("c", Some("a"), None, 2, 3));
        store.insert(record("c1", Some("c"), None, 1, 4));
        store.insert(record("next", None, Some("a"), 2, 5));

        let mut outliner = Outliner::new(&store, ViewFilter::Active);
        let lines = outliner.tree(&"a".into());
        assert_eq!(
            texts(&lines),
            vec![
                "Task a",
                "├── Task b",
                "├── Task b2",
                "└── Task c",
                "    └── Task c1",
                "Task next",
            ]
        );
        assert_eq!(lines[4].depth, 2);
        assert_eq!(lines[5].depth, 0);
    }

    #[test]
    fn test_filtered_task_hides_branch() {
        let mut store = TaskStore::new();
        store.insert(record("a", None, None, 1, 0));
        let mut done = record("b", Some("a"), None, 1, 1);
        done.completed = true;
        store.insert(done);
        store.insert(record("b1", Some("b"), None, 1, 2));
        store.insert(record("c", Some("a"), None, 2, 3));

        let blocks = outline(&store, &["a".into()], ViewFilter::Active);
        assert_eq!(blocks.len(), 1);
        assert_eq!(texts(&blocks[0]), vec!["Task a", "└── Task c"]);
    }

    #[test]
    fn test_status_marks() {
        let mut store = TaskStore::new();
        let mut a = record("a", None, None, 1, 0);
        a.stashed = true;
        store.insert(a);
        let mut b = record("b", Some("a"), None, 1, 1);
        b.stashed = true;
        store.insert(b);

        let blocks = outline(&store, &["a".into()], ViewFilter::Stashed);
        assert_eq!(texts(&blocks[0]), vec!["⏸ Task a", "└── ⏸ Task b"]);
    }

    #[test]
    fn test_each_task_emitted_once() {
        let mut store = TaskStore::new();
        store.insert(record("a", None, Some("b"), 1, 0));
        store.insert(record("b", None, Some("a"), 2, 1));
        store.insert(record("root", None, None, 3, 2));

        let blocks = outline(
            &store,
            &["a".into(), "b".into(), "root".into()],
            ViewFilter::Active,
        );
        let all: Vec<&TaskId> = blocks.iter().flatten().map(|l| &l.id).collect();
        assert_eq!(all.len(), 3);
        assert_eq!(blocks.len(), 2);
    }
}
