//! WBS CLI - work breakdown structures with derived schedules
//!
//! Tasks form a hierarchy. Leaf tasks carry the schedule and progress the
//! user enters; parent tasks, statuses and working-day counts are derived by
//! a pure engine in [`domain`]. [`storage`] keeps tasks in git-friendly files
//! and [`cli`] exposes the engine as the `wbs` command.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Task, TaskId, TaskStatus};
