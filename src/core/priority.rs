//! Priority reordering - nearest-neighbour moves and drag-and-drop swaps
//!
//! New tasks get auto-incremented priorities, so priority doubles as a
//! dense creation-order sequence until the user reorders.

use super::error::{TaskError, TaskResult};
use super::task::{Priority, TaskId};
use super::TaskStore;

/// Direction of a relative priority move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards higher precedence (smaller number)
    Up,
    /// Towards lower precedence (larger number)
    Down,
}

/// Priority for a newly created task: one past the largest explicit priority.
///
/// Saturates at `i64::MAX`, so a task already at the maximum shares it.
pub fn next_priority(store: &TaskStore) -> Priority {
    let next = store
        .iter()
        .map(|t| t.priority)
        .filter(|p| !p.is_sentinel())
        .map(Priority::value)
        .max()
        .map_or(1, |max| max.saturating_add(1));
    if next == Priority::SENTINEL {
        Priority::new(next + 1)
    } else {
        Priority::new(next)
    }
}

/// Swap priority with the closest other task in `direction`.
///
/// Returns `false` when the task is already at the extreme.
pub fn move_priority(
    store: &mut TaskStore,
    task_id: &TaskId,
    direction: MoveDirection,
) -> TaskResult<bool> {
    let current = store
        .get(task_id)
        .map(|t| t.priority)
        .ok_or_else(|| TaskError::NotFound(task_id.clone()))?;

    let candidates = store.iter().filter(|t| &t.id != task_id);
    let target = match direction {
        MoveDirection::Up => candidates
            .filter(|t| t.priority < current)
            .max_by(|a, b| a.priority.cmp(&b.priority).then(b.created.cmp(&a.created))),
        MoveDirection::Down => candidates
            .filter(|t| t.priority > current)
            .min_by(|a, b| a.priority.cmp(&b.priority).then(a.created.cmp(&b.created))),
    };

    let Some(target) = target else {
        return Ok(false);
    };
    let target_id = target.id.clone();
    let target_priority = target.priority;

    store.require_mut(&target_id)?.priority = current;
    store.require_mut(task_id)?.priority = target_priority;
    log::info!(
        "Moved {} {:?}: {} <-> {}",
        task_id.short(),
        direction,
        current.value(),
        target_priority.value()
    );
    Ok(true)
}

pub fn move_up(store: &mut TaskStore, task_id: &TaskId) -> TaskResult<bool> {
    move_priority(store, task_id, MoveDirection::Up)
}

pub fn move_down(store: &mut TaskStore, task_id: &TaskId) -> TaskResult<bool> {
    move_priority(store, task_id, MoveDirection::Down)
}

/// Drag-and-drop reorder: swap the priorities of two root tasks
pub fn swap_priorities(
    store: &mut TaskStore,
    dragged: &TaskId,
    dropped_on: &TaskId,
) -> TaskResult<()> {
    for id in [dragged, dropped_on] {
        if !store.contains(id) {
            return Err(TaskError::NotFound(id.clone()));
        }
        if !store.is_root(id) {
            return Err(TaskError::NotRoot(id.clone()));
        }
    }
    if dragged == dropped_on {
        return Ok(());
    }

    let dragged_priority = store.require_mut(dragged)?.priority;
    let dropped_priority = store.require_mut(dropped_on)?.priority;
    store.require_mut(dragged)?.priority = dropped_priority;
    store.require_mut(dropped_on)?.priority = dragged_priority;
    Ok(())
}
