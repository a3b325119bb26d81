//! Read-only commands (tree, show, check, stats, load, gantt)

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use serde::Serialize;

use super::output::Output;
use super::session::Session;
use crate::domain::hierarchy::{aggregate, flatten, validate, HierarchyIndex};
use crate::domain::stats::{project_stats, resource_load};
use crate::domain::timeline::{Bar, Timeline};
use crate::domain::{ProjectId, Task, TaskId, TaskStatus};
use crate::storage::GanttCell;

#[derive(Serialize)]
struct TreeRow<'a> {
    depth: usize,
    #[serde(flatten)]
    task: &'a Task,
}

/// Tasks in display order with their nesting depth
fn rows(tasks: &[Task]) -> Vec<TreeRow<'_>> {
    let index = HierarchyIndex::build(tasks);
    flatten(tasks)
        .into_iter()
        .filter_map(|row| {
            index.task(&row.id).map(|task| TreeRow {
                depth: row.depth,
                task,
            })
        })
        .collect()
}

fn indented(title: &str, depth: usize) -> String {
    format!("{}{}", "  ".repeat(depth), title)
}

/// Show the work breakdown of a project
pub fn tree(output: &Output, project_id: Option<&ProjectId>, today: NaiveDate) -> Result<()> {
    let session = Session::open(project_id, today, output)?;
    let tasks = session.tasks();
    let rows = rows(&tasks);

    if output.is_json() {
        output.data(&rows);
    } else if rows.is_empty() {
        println!("No tasks in project '{}'", session.project_id);
    } else {
        output.task_table(rows.iter().map(|row| (row.task, row.depth)));
    }
    Ok(())
}

/// Show one task with its place in the hierarchy and its work logs
pub fn show(output: &Output, id: &TaskId, today: NaiveDate) -> Result<()> {
    let session = Session::for_task(id, today, output)?;
    let tasks = session.tasks();
    let index = HierarchyIndex::build(&tasks);
    let task = index
        .task(id)
        .ok_or_else(|| anyhow!("Task not found: {}", id))?;

    let mut path: Vec<&TaskId> = index.ancestors(id);
    path.reverse();
    let children: Vec<&TaskId> = index.children(id).into_iter().map(|c| &c.id).collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task,
            "depth": index.depth(id),
            "path": path,
            "children": children,
        }));
        return Ok(());
    }

    println!("Task: {}", task.id);
    println!("Title: {}", task.title);
    println!("Project: {}", task.project_id);
    if !path.is_empty() {
        let path: Vec<&str> = path.iter().map(|p| p.as_str()).collect();
        println!("Path: {}", path.join(" > "));
    }
    match task.hold {
        Some(_) => println!("Status: {} (held)", task.status),
        None => println!("Status: {}", task.status),
    }
    println!("Priority: {}", task.priority);
    if let Some(assignee) = &task.assignee_id {
        println!("Assignee: {}", assignee);
    }
    println!(
        "Planned: {} .. {} ({} working days)",
        task.start_date, task.end_date, task.working_days
    );
    if let Some(start) = task.actual_start_date {
        match task.actual_end_date {
            Some(end) => println!("Actual: {} .. {}", start, end),
            None => println!("Actual: {} .. (open)", start),
        }
    }
    println!("Progress: {}%", task.progress);

    if let Some(desc) = &task.description {
        println!("\nDescription:");
        println!("{}", desc);
    }

    if !children.is_empty() {
        println!("\nSubtasks:");
        for child in index.children(id) {
            println!("  {} {} ({})", child.id, child.title, child.status);
        }
    }

    let logs = task.logs_newest_first();
    if !logs.is_empty() {
        println!("\nWork logs:");
        for log in logs {
            println!("  {} [{}] {}", log.date, log.id, log.content);
        }
    }

    Ok(())
}

/// Report structural problems and stale derived fields
pub fn check(output: &Output, project_id: Option<&ProjectId>, today: NaiveDate) -> Result<()> {
    let session = Session::open(project_id, today, output)?;
    let tasks = session.tasks();

    let issues: Vec<String> = validate(&tasks).iter().map(|e| e.to_string()).collect();
    let stale: Vec<&TaskId> = tasks
        .iter()
        .zip(aggregate(&tasks, today))
        .filter(|(before, after)| *before != after)
        .map(|(before, _)| &before.id)
        .collect();
    output.verbose_ctx(
        "check",
        &format!("{} structural issue(s), {} stale task(s)", issues.len(), stale.len()),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "project": session.project_id,
            "issues": issues,
            "stale": stale,
        }));
    } else {
        for issue in &issues {
            println!("{}", issue);
        }
        for id in &stale {
            println!("Derived fields of {} are out of date", id);
        }
    }

    if !issues.is_empty() {
        bail!("{} problem(s) found in project '{}'", issues.len(), session.project_id);
    }
    if !stale.is_empty() {
        bail!("{} task(s) out of date; run 'wbs recalc'", stale.len());
    }
    if output.is_text() {
        output.success(&format!("Project '{}' is consistent", session.project_id));
    }
    Ok(())
}

/// Dashboard figures for a project
pub fn stats(output: &Output, project_id: Option<&ProjectId>, today: NaiveDate) -> Result<()> {
    let session = Session::open(project_id, today, output)?;
    let tasks = session.tasks();
    let stats = project_stats(&tasks);

    let by_status: Vec<(TaskStatus, usize)> = TaskStatus::ALL
        .iter()
        .map(|s| (*s, tasks.iter().filter(|t| t.status == *s).count()))
        .collect();

    if output.is_json() {
        let counts: serde_json::Map<String, serde_json::Value> = by_status
            .iter()
            .map(|(s, n)| (s.label().to_string(), serde_json::json!(n)))
            .collect();
        output.data(&serde_json::json!({
            "project": session.project_id,
            "stats": stats,
            "by_status": counts,
        }));
        return Ok(());
    }

    println!("Project: {}", session.project_id);
    println!();
    println!("Tasks: {}", stats.total_tasks);
    println!("  Completed: {}", stats.completed_tasks);
    println!("  At risk: {}", stats.at_risk_tasks);
    println!("Overall progress: {}%", stats.overall_progress);
    println!();
    for (status, count) in by_status.iter().filter(|(_, n)| *n > 0) {
        println!("  {:<14} {}", status.label(), count);
    }
    Ok(())
}

/// Open work per assignee
pub fn load(output: &Output, project_id: Option<&ProjectId>, today: NaiveDate) -> Result<()> {
    let session = Session::open(project_id, today, output)?;
    let load = resource_load(&session.tasks());

    if output.is_json() {
        output.data(&load);
    } else if load.is_empty() {
        println!("No open assigned tasks");
    } else {
        println!("{:<20} {:>6} {:>15}", "ASSIGNEE", "TASKS", "REMAINING DAYS");
        println!("{}", "-".repeat(43));
        for entry in &load {
            println!(
                "{:<20} {:>6} {:>15}",
                entry.assignee, entry.active_tasks, entry.remaining_days
            );
        }
    }
    Ok(())
}

/// One Gantt column covering `[offset, offset + width)` days from the
/// window start
fn cell_char(column: i64, width: i64, planned: Bar, actual: Option<Bar>, today: i64) -> char {
    let from = column * width;
    let to = from + width;
    let overlaps = |bar: Bar| bar.offset_days < to && bar.offset_days + bar.span_days > from;

    if actual.is_some_and(overlaps) {
        '#'
    } else if overlaps(planned) {
        '='
    } else if (from..to).contains(&today) {
        '|'
    } else {
        '.'
    }
}

#[derive(Serialize)]
struct GanttRow<'a> {
    id: &'a TaskId,
    depth: usize,
    planned: Bar,
    actual: Option<Bar>,
}

/// Text Gantt chart: `=` planned, `#` actual, `|` today
pub fn gantt(output: &Output, project_id: Option<&ProjectId>, today: NaiveDate) -> Result<()> {
    let session = Session::open(project_id, today, output)?;
    let cell = session.project.config().project.display.gantt_cell;
    let tasks = session.tasks();

    let Some(timeline) = Timeline::from_tasks(&tasks, today) else {
        if output.is_json() {
            output.data(&serde_json::json!(null));
        } else {
            println!("No tasks in project '{}'", session.project_id);
        }
        return Ok(());
    };

    let rows = rows(&tasks);
    if output.is_json() {
        let bars: Vec<GanttRow> = rows
            .iter()
            .map(|row| GanttRow {
                id: &row.task.id,
                depth: row.depth,
                planned: timeline.planned(row.task),
                actual: timeline.actual(row.task, today),
            })
            .collect();
        output.data(&serde_json::json!({
            "start": timeline.start,
            "end": timeline.end,
            "days": timeline.days(),
            "rows": bars,
        }));
        return Ok(());
    }

    let width = cell.days();
    let columns = (timeline.days() + width - 1) / width;
    let today_offset = (today - timeline.start).num_days();
    let unit = match cell {
        GanttCell::Day => "day",
        GanttCell::Week => "week",
    };

    println!(
        "{} .. {} (one column per {})",
        timeline.start, timeline.end, unit
    );
    for row in &rows {
        let planned = timeline.planned(row.task);
        let actual = timeline.actual(row.task, today);
        let line: String = (0..columns)
            .map(|c| cell_char(c, width, planned, actual, today_offset))
            .collect();
        println!("{:<30} {}", truncate(&indented(&row.task.title, row.depth), 30), line);
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('~');
        out
    }
}
