//! Cascade operations - recursive delete and stash over both relations

use super::error::{TaskError, TaskResult};
use super::task::TaskId;
use super::TaskStore;
use std::collections::HashSet;

/// Every task reachable from `root` through subtask and workflow edges,
/// root included, in pre-order (subtasks before workflow siblings).
///
/// A node reached twice is visited once; a malformed cyclic graph
/// yields a truncated walk instead of unbounded recursion.
pub fn reachable(store: &TaskStore, root: &TaskId) -> Vec<TaskId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    if store.contains(root) {
        collect(store, root, &mut visited, &mut order);
    }
    order
}

fn collect(
    store: &TaskStore,
    id: &TaskId,
    visited: &mut HashSet<TaskId>,
    order: &mut Vec<TaskId>,
) {
    if !visited.insert(id.clone()) {
        log::warn!("Task {} reached twice while walking the graph", id.short());
        return;
    }
    order.push(id.clone());

    // Child lists are snapshots, so later mutation never races the walk
    let subtasks = store.subtasks(id);
    let siblings = store.workflow_siblings(id);
    for child in subtasks.iter().chain(siblings.iter()) {
        collect(store, child, visited, order);
    }
}

/// Delete `root` and everything reachable from it. Returns the removed ids.
pub fn delete_recursive(store: &mut TaskStore, root: &TaskId) -> TaskResult<Vec<TaskId>> {
    if !store.contains(root) {
        return Err(TaskError::NotFound(root.clone()));
    }
    let doomed = reachable(store, root);
    for id in &doomed {
        store.remove(id);
    }
    log::info!("Deleted {} task(s) under {}", doomed.len(), root.short());
    Ok(doomed)
}

/// Set `stashed` on `root` and everything reachable from it.
///
/// Stashing also clears `completed` on every affected task.
pub fn set_stash_recursive(
    store: &mut TaskStore,
    root: &TaskId,
    stashed: bool,
) -> TaskResult<Vec<TaskId>> {
    if !store.contains(root) {
        return Err(TaskError::NotFound(root.clone()));
    }
    let affected = reachable(store, root);
    for id in &affected {
        if let Some(task) = store.get_mut(id) {
            task.set_stashed(stashed);
        }
    }
    log::info!(
        "{} {} task(s) under {}",
        if stashed { "Stashed" } else { "Unstashed" },
        affected.len(),
        root.short()
    );
    Ok(affected)
}

/// Flip the root's stash flag and cascade the new value. Returns it.
pub fn toggle_stash(store: &mut TaskStore, root: &TaskId) -> TaskResult<bool> {
    let stashed = !store
        .get(root)
        .ok_or_else(|| TaskError::NotFound(root.clone()))?
        .stashed;
    set_stash_recursive(store, root, stashed)?;
    Ok(stashed)
}
