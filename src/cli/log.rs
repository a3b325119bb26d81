//! Work log commands
//!
//! Logs are a per-task journal; they never affect derived fields, so these
//! commands save without re-aggregating.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use super::session::Session;
use crate::domain::calendar::parse_date;
use crate::domain::{LogId, TaskId};

#[derive(Subcommand)]
pub enum LogCommands {
    /// Record what was done on a started task (one entry per day)
    Add {
        /// Task ID
        id: TaskId,

        /// Log text
        content: String,

        /// Log date (YYYY-MM-DD, defaults to today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// List work logs, newest first
    List {
        /// Task ID
        id: TaskId,
    },

    /// Replace the text of a log entry
    Edit {
        /// Task ID
        id: TaskId,

        /// Log ID
        log: LogId,

        /// New text
        content: String,
    },

    /// Remove a log entry
    Rm {
        /// Task ID
        id: TaskId,

        /// Log ID
        log: LogId,
    },
}

pub fn run(cmd: LogCommands, output: &Output, today: NaiveDate) -> Result<()> {
    match cmd {
        LogCommands::Add { id, content, date } => add(output, &id, &content, date.unwrap_or(today), today),
        LogCommands::List { id } => list(output, &id, today),
        LogCommands::Edit { id, log, content } => edit(output, &id, &log, &content, today),
        LogCommands::Rm { id, log } => remove(output, &id, &log, today),
    }
}

/// Loads the task's project and applies `edit` to the task in place
fn with_task<T, F>(output: &Output, id: &TaskId, today: NaiveDate, edit: F) -> Result<T>
where
    F: FnOnce(&mut crate::domain::Task) -> Result<T>,
{
    let mut session = Session::for_task(id, today, output)?;
    let mut tasks = session.tasks();
    let task = tasks
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| anyhow!("Task not found: {}", id))?;

    let result = edit(task)?;
    session.commit(tasks)?;
    Ok(result)
}

fn add(output: &Output, id: &TaskId, content: &str, date: NaiveDate, today: NaiveDate) -> Result<()> {
    let log = with_task(output, id, today, |task| Ok(task.add_log(date, content)?.clone()))?;

    if output.is_json() {
        output.data(&log);
    } else {
        output.success(&format!("Logged {} on {} ({})", log.date, id, log.id));
    }
    Ok(())
}

fn list(output: &Output, id: &TaskId, today: NaiveDate) -> Result<()> {
    let session = Session::for_task(id, today, output)?;
    let task = session
        .workbook
        .find(id)
        .ok_or_else(|| anyhow!("Task not found: {}", id))?;
    let logs = task.logs_newest_first();

    if output.is_json() {
        output.data(&logs);
    } else if logs.is_empty() {
        println!("No work logs for {}", id);
    } else {
        println!("{:<12} {:<12} CONTENT", "DATE", "ID");
        println!("{}", "-".repeat(60));
        for log in logs {
            println!("{:<12} {:<12} {}", log.date, log.id, log.content);
        }
    }
    Ok(())
}

fn edit(output: &Output, id: &TaskId, log: &LogId, content: &str, today: NaiveDate) -> Result<()> {
    with_task(output, id, today, |task| Ok(task.edit_log(log, content)?))?;
    output.success(&format!("Updated log {} on {}", log, id));
    Ok(())
}

fn remove(output: &Output, id: &TaskId, log: &LogId, today: NaiveDate) -> Result<()> {
    with_task(output, id, today, |task| Ok(task.remove_log(log)?))?;
    output.success(&format!("Removed log {} from {}", log, id));
    Ok(())
}
