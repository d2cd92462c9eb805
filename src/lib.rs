//! flowtask - personal task tracker drawn as a flowchart
//!
//! Tasks form two overlapping relations: subtasks nest detail under a
//! parent, workflow siblings continue a task at the same level. The core
//! engine stores the graph, cascades deletes and stashes through both
//! relations, reorders priorities and lays the graph out as cards.

pub mod app;
pub mod config;
pub mod core;
pub mod storage;
pub mod ui;

// Re-exports
pub use app::App;
pub use config::Settings;
pub use core::{
    Convention, Layout, LayoutMetrics, NewTask, Priority, SortMode, Task, TaskEdit, TaskError,
    TaskId, TaskStore, ViewFilter, Zoom,
};
pub use storage::StorageError;

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
