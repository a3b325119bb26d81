//! Domain models for the WBS engine
//!
//! Contains the core scheduling logic without any I/O concerns. Every
//! operation is a pure function over a task slice; "today" is always passed
//! in by the caller.

pub mod calendar;
mod id;
mod task;
pub mod status;
pub mod hierarchy;
pub mod reparent;
pub mod stats;
pub mod timeline;

pub use calendar::{working_days, CalendarError};
pub use hierarchy::{aggregate, flatten, FlatRow, HierarchyError, HierarchyIndex};
pub use id::{IdError, LogId, ProjectId, TaskId};
pub use reparent::{resolve_move, MoveOutcome, MoveRejection, MoveRequest};
pub use status::derive_status;
pub use task::{Priority, StatusHold, Task, TaskError, TaskStatus, WorkLog};
