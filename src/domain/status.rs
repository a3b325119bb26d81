//! Leaf status derivation
//!
//! Status is a function of the recorded actual dates, the planned schedule
//! and the current date:
//!
//! | actual end | actual start | condition                       | status        |
//! |------------|--------------|---------------------------------|---------------|
//! | set        | any          |                                 | Done          |
//! | unset      | unset        | today > planned start           | Start Delayed |
//! | unset      | unset        | otherwise                       | To Do         |
//! | unset      | set          | elapsed working days > planned  | End Delayed   |
//! | unset      | set          | otherwise                       | In Progress   |
//!
//! Held tasks keep their held status.

use chrono::NaiveDate;

use super::calendar::working_days;
use super::task::{Task, TaskStatus};

/// Derives the status of a task as of `today`
pub fn derive_status(task: &Task, today: NaiveDate) -> TaskStatus {
    if let Some(hold) = task.hold {
        return hold.status();
    }

    if task.actual_end_date.is_some() {
        return TaskStatus::Done;
    }

    match task.actual_start_date {
        None if today > task.start_date => TaskStatus::StartDelayed,
        None => TaskStatus::Todo,
        Some(actual_start) => {
            let elapsed = working_days(actual_start, today);
            if elapsed > task.working_days {
                TaskStatus::EndDelayed
            } else {
                TaskStatus::InProgress
            }
        }
    }
}
