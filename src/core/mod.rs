//! Core engine - task store, graph walks, layout and priority reordering

mod error;
mod store;
mod task;

pub mod cascade;
pub mod layout;
pub mod outline;
pub mod priority;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::{TaskError, TaskResult};
pub use layout::{
    layout_roots, layout_tree, Connector, Convention, Direction, EdgeKind, Extent, Layout,
    LayoutEngine, LayoutMetrics, Marker, Placement, Point, Rect, Zoom,
};
pub use outline::{outline, OutlineLine, Outliner};
pub use priority::MoveDirection;
pub use store::TaskStore;
pub use task::{NewTask, Priority, SortMode, Task, TaskEdit, TaskId, TaskStatus, ViewFilter};
