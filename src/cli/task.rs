//! Task CLI commands
//!
//! Every command that changes tasks runs exactly one engine call on the
//! owning project (aggregate, move or subtree removal followed by aggregate)
//! and saves the result.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;

use super::output::Output;
use super::session::{ensure_leaf, Session};
use crate::domain::calendar::parse_date;
use crate::domain::hierarchy::{aggregate, remove_subtree, HierarchyIndex};
use crate::domain::reparent::{resolve_move, MoveOutcome, MoveRequest};
use crate::domain::{Priority, ProjectId, StatusHold, Task, TaskId};

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,

    /// Parent task ID
    #[arg(long)]
    pub parent: Option<TaskId>,

    /// Planned start (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Planned end (YYYY-MM-DD, defaults to the start)
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    #[arg(long)]
    pub assignee: Option<String>,

    /// high, medium or low
    #[arg(long)]
    pub priority: Option<Priority>,

    /// Percent complete (0-100)
    #[arg(long)]
    pub progress: Option<u32>,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: TaskId,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    #[arg(long, conflicts_with = "unassign")]
    pub assignee: Option<String>,

    /// Remove the assignee
    #[arg(long)]
    pub unassign: bool,

    #[arg(long)]
    pub priority: Option<Priority>,

    #[arg(long)]
    pub progress: Option<u32>,

    #[arg(long)]
    pub description: Option<String>,

    /// Actual start (YYYY-MM-DD, or "none" to clear)
    #[arg(long, value_parser = parse_actual_date)]
    pub actual_start: Option<ActualDate>,

    /// Actual end (YYYY-MM-DD, or "none" to clear)
    #[arg(long, value_parser = parse_actual_date)]
    pub actual_end: Option<ActualDate>,
}

/// An actual date given on the command line, or a request to clear it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActualDate {
    Set(NaiveDate),
    Clear,
}

impl ActualDate {
    fn apply(self) -> Option<NaiveDate> {
        match self {
            ActualDate::Set(date) => Some(date),
            ActualDate::Clear => None,
        }
    }
}

fn parse_actual_date(s: &str) -> Result<ActualDate, String> {
    if s.trim().eq_ignore_ascii_case("none") {
        return Ok(ActualDate::Clear);
    }
    parse_date(s).map(ActualDate::Set).map_err(|e| e.to_string())
}

#[derive(Args)]
pub struct MoveArgs {
    /// Task to move (its subtasks move with it)
    pub id: TaskId,

    /// Row to drop the task after
    #[arg(long, required_unless_present = "top", conflicts_with = "top")]
    pub after: Option<TaskId>,

    /// Drop the task at the top of the list as a root task
    #[arg(long)]
    pub top: bool,

    /// Horizontal drag distance in pixels (positive indents)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "levels")]
    pub dx: Option<i32>,

    /// Indentation change in whole levels
    #[arg(long, allow_negative_numbers = true)]
    pub levels: Option<i32>,
}

/// Lifecycle transitions recorded on a leaf task
#[derive(Debug, Clone, Copy)]
pub enum Transition {
    Start,
    Finish,
    Reset,
}

impl Transition {
    fn verb(self) -> &'static str {
        match self {
            Transition::Start => "Started",
            Transition::Finish => "Finished",
            Transition::Reset => "Reset",
        }
    }
}

pub fn add(
    output: &Output,
    args: AddArgs,
    project_id: Option<&ProjectId>,
    today: NaiveDate,
) -> Result<()> {
    let mut session = match &args.parent {
        Some(parent) => Session::for_task(parent, today, output)?,
        None => Session::open(project_id, today, output)?,
    };

    let start = args.start.unwrap_or(today);
    let end = args.end.unwrap_or(start);

    let id = TaskId::generate(&args.title, Utc::now());
    let mut task = Task::new(id.clone(), session.project_id.clone(), args.title, start, start);
    task.set_schedule(start, end)?;
    if let Some(progress) = args.progress {
        task.set_progress(progress)?;
    }
    task.assignee_id = args.assignee.filter(|a| !a.trim().is_empty());
    task.priority = args.priority.unwrap_or_default();
    task.description = args.description;

    let mut tasks = session.tasks();
    let insert_at = match &args.parent {
        Some(parent) => {
            let index = HierarchyIndex::build(&tasks);
            let last = index
                .descendants(parent)
                .last()
                .copied()
                .unwrap_or(parent);
            let pos = index
                .position(last)
                .ok_or_else(|| anyhow!("Task not found: {}", parent))?;
            task.parent_id = Some(parent.clone());
            pos + 1
        }
        None => tasks.len(),
    };
    output.verbose_ctx("add", &format!("Inserting {} at row {}", id, insert_at));
    tasks.insert(insert_at, task);

    let tasks = aggregate(&tasks, today);
    let created = tasks[insert_at].clone();
    session.commit(tasks)?;

    output.task(
        &created,
        &format!("Created task: {} - {}", created.id, created.title),
    );
    Ok(())
}

pub fn edit(output: &Output, args: EditArgs, today: NaiveDate) -> Result<()> {
    let mut session = Session::for_task(&args.id, today, output)?;

    let task = session.update_task(&args.id, |task, tasks| {
        if let Some(title) = args.title {
            task.title = title;
        }
        if args.start.is_some() || args.end.is_some() {
            ensure_leaf(&task.id, tasks, "schedule")?;
            let start = args.start.unwrap_or(task.start_date);
            let end = args.end.unwrap_or(task.end_date);
            task.set_schedule(start, end)?;
        }
        if let Some(progress) = args.progress {
            ensure_leaf(&task.id, tasks, "progress")?;
            task.set_progress(progress)?;
        }
        if args.actual_start.is_some() || args.actual_end.is_some() {
            ensure_leaf(&task.id, tasks, "execution")?;
            let start = args.actual_start.map_or(task.actual_start_date, ActualDate::apply);
            let end = args.actual_end.map_or(task.actual_end_date, ActualDate::apply);
            task.set_actual_dates(start, end)?;
        }
        if args.unassign {
            task.assignee_id = None;
        } else if let Some(assignee) = args.assignee {
            task.assignee_id = Some(assignee).filter(|a| !a.trim().is_empty());
        }
        if let Some(priority) = args.priority {
            task.priority = priority;
        }
        if let Some(description) = args.description {
            task.description = Some(description).filter(|d| !d.is_empty());
        }
        Ok(())
    })?;

    output.task(&task, &format!("Updated task: {}", task.id));
    Ok(())
}

pub fn transition(output: &Output, id: &TaskId, step: Transition, today: NaiveDate) -> Result<()> {
    let mut session = Session::for_task(id, today, output)?;

    let task = session.update_task(id, |task, tasks| {
        ensure_leaf(&task.id, tasks, "execution")?;
        match step {
            Transition::Start => task.start(today),
            Transition::Finish => task.finish(today),
            Transition::Reset => task.reset(),
        }
        Ok(())
    })?;

    output.task(
        &task,
        &format!("{} task: {} ({})", step.verb(), task.id, task.status),
    );
    Ok(())
}

pub fn hold(output: &Output, id: &TaskId, hold: StatusHold, today: NaiveDate) -> Result<()> {
    let mut session = Session::for_task(id, today, output)?;
    let task = session.update_task(id, |task, _| {
        task.hold(hold);
        Ok(())
    })?;

    output.task(&task, &format!("Holding {} at {}", task.id, task.status));
    Ok(())
}

pub fn release(output: &Output, id: &TaskId, today: NaiveDate) -> Result<()> {
    let mut session = Session::for_task(id, today, output)?;
    let task = session.update_task(id, |task, _| {
        task.release();
        Ok(())
    })?;

    output.task(&task, &format!("Released {} ({})", task.id, task.status));
    Ok(())
}

pub fn delete(output: &Output, id: &TaskId, today: NaiveDate) -> Result<()> {
    let mut session = Session::for_task(id, today, output)?;

    let (remaining, removed) = remove_subtree(&session.tasks(), id);
    output.verbose_ctx("delete", &format!("Removing {} task(s)", removed.len()));
    session.commit(aggregate(&remaining, today))?;

    if output.is_json() {
        output.data(&serde_json::json!({ "removed": removed }));
    } else {
        output.success(&format!(
            "Deleted {} task(s): {}",
            removed.len(),
            removed
                .iter()
                .map(TaskId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    Ok(())
}

pub fn move_task(output: &Output, args: MoveArgs, today: NaiveDate) -> Result<()> {
    let mut session = Session::for_task(&args.id, today, output)?;
    let pixels_per_level = session.pixels_per_level();

    let horizontal_delta = match (args.dx, args.levels) {
        (Some(dx), _) => dx,
        (None, Some(levels)) => {
            levels.saturating_mul(i32::try_from(pixels_per_level).unwrap_or(i32::MAX))
        }
        (None, None) => 0,
    };
    let request = match args.after {
        Some(target) if !args.top => MoveRequest::after(args.id, target, horizontal_delta),
        _ => MoveRequest {
            horizontal_delta,
            ..MoveRequest::to_top(args.id)
        },
    };
    output.verbose_ctx(
        "move",
        &format!(
            "Dropping {} after {:?} with dx={} ({}px per level)",
            request.moved, request.target, horizontal_delta, pixels_per_level
        ),
    );

    match resolve_move(&session.tasks(), &request, pixels_per_level, today) {
        MoveOutcome::Moved { tasks, parent } => {
            session.commit(tasks)?;
            let parent_label = parent
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "(root)".to_string());
            if output.is_json() {
                output.data(&serde_json::json!({
                    "moved": true,
                    "id": request.moved,
                    "parent": parent,
                }));
            } else {
                output.success(&format!("Moved {} under {}", request.moved, parent_label));
            }
        }
        MoveOutcome::Rejected { reason, .. } => {
            if output.is_json() {
                output.data(&serde_json::json!({
                    "moved": false,
                    "id": request.moved,
                    "reason": reason.to_string(),
                }));
            } else {
                output.error(&format!("Move ignored: {}", reason));
            }
        }
    }
    Ok(())
}

/// Re-derives every status, schedule and progress of a project
pub fn recalc(output: &Output, project_id: Option<&ProjectId>, today: NaiveDate) -> Result<()> {
    let mut session = Session::open(project_id, today, output)?;
    let before = session.tasks();
    let after = aggregate(&before, today);

    let changed = before.iter().zip(&after).filter(|(a, b)| a != b).count();
    session.commit(after)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "project": session.project_id,
            "tasks": before.len(),
            "changed": changed,
        }));
    } else {
        output.success(&format!(
            "Recalculated {} task(s) in '{}', {} changed",
            before.len(),
            session.project_id,
            changed
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actual_date_argument() {
        assert_eq!(
            parse_actual_date("2024-01-03"),
            Ok(ActualDate::Set(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()))
        );
        assert_eq!(parse_actual_date("none"), Ok(ActualDate::Clear));
        assert_eq!(parse_actual_date("None"), Ok(ActualDate::Clear));
        assert!(parse_actual_date("yesterday").is_err());
    }
}
