//! Domain errors for task graph operations

use super::TaskId;
use thiserror::Error;

/// Errors raised by store, cascade and reorder operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("id prefix '{prefix}' matches {matches} tasks")]
    AmbiguousId { prefix: String, matches: usize },

    #[error("title must not be empty")]
    EmptyTitle,

    /// Drag-and-drop reordering only applies to root tasks
    #[error("task {0} is not a root task")]
    NotRoot(TaskId),
}

pub type TaskResult<T> = std::result::Result<T, TaskError>;
