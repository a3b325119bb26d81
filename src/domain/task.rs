//! Task domain model
//!
//! Tasks form a hierarchy through an optional `parent_id` back-reference.
//! Leaf tasks carry user-entered schedule and progress; parent tasks have
//! those fields derived by the aggregator.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::calendar::working_days;
use super::id::{LogId, ProjectId, TaskId};

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Progress must be between 0 and 100, got {0}")]
    InvalidProgress(u32),

    #[error("Unknown {kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Task {0} has not started yet; work logs need an actual start date")]
    NotStarted(TaskId),

    #[error("A work log for {0} already exists")]
    DuplicateLogDate(NaiveDate),

    #[error("Work log content must not be empty")]
    EmptyLog,

    #[error("Work log not found: {0}")]
    LogNotFound(LogId),

    #[error("Actual end {end} is before actual start {start}")]
    ActualEndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("An actual end date needs an actual start date")]
    ActualEndWithoutStart,
}

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Review")]
    Review,
    #[serde(rename = "Done")]
    Done,
    #[serde(rename = "Blocked")]
    Blocked,
    #[serde(rename = "Start Delayed")]
    StartDelayed,
    #[serde(rename = "End Delayed")]
    EndDelayed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 7] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
        TaskStatus::Blocked,
        TaskStatus::StartDelayed,
        TaskStatus::EndDelayed,
    ];

    /// Returns the display label
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::StartDelayed => "Start Delayed",
            TaskStatus::EndDelayed => "End Delayed",
        }
    }

    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Returns true for statuses that put the schedule at risk
    pub fn is_at_risk(&self) -> bool {
        matches!(
            self,
            TaskStatus::Blocked | TaskStatus::StartDelayed | TaskStatus::EndDelayed
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .to_ascii_lowercase()
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        TaskStatus::ALL
            .into_iter()
            .find(|status| normalize(status.label()) == wanted)
            .ok_or_else(|| TaskError::UnknownValue {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Manual status override.
///
/// A held task keeps this status across every aggregation pass until it is
/// released. Only statuses the deriver never produces can be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusHold {
    Blocked,
    Review,
}

impl StatusHold {
    pub fn status(&self) -> TaskStatus {
        match self {
            StatusHold::Blocked => TaskStatus::Blocked,
            StatusHold::Review => TaskStatus::Review,
        }
    }
}

impl FromStr for StatusHold {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "blocked" => Ok(StatusHold::Blocked),
            "review" => Ok(StatusHold::Review),
            _ => Err(TaskError::UnknownValue {
                kind: "hold",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(TaskError::UnknownValue {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(s)
    }
}

/// A dated work journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLog {
    pub id: LogId,
    pub date: NaiveDate,
    pub content: String,
}

/// Empty strings in imported data mean "not set"
fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, super::calendar::DATE_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn assignee_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty() && s != "unassigned"))
}

fn progress_in_range<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = u32::deserialize(deserializer)?;
    if raw > 100 {
        return Err(serde::de::Error::custom(TaskError::InvalidProgress(raw)));
    }
    Ok(raw as u8)
}

/// A work breakdown item
///
/// Field aliases accept the camelCase names used by browser backups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Owning project
    #[serde(alias = "projectId")]
    pub project_id: ProjectId,

    /// Parent task, `None` for root-level tasks
    #[serde(default, alias = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,

    pub title: String,

    #[serde(
        default,
        alias = "assigneeId",
        deserialize_with = "assignee_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: Priority,

    /// Planned start
    #[serde(alias = "startDate")]
    pub start_date: NaiveDate,

    /// Planned end
    #[serde(alias = "endDate")]
    pub end_date: NaiveDate,

    #[serde(
        default,
        alias = "actualStartDate",
        deserialize_with = "empty_date_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_start_date: Option<NaiveDate>,

    #[serde(
        default,
        alias = "actualEndDate",
        deserialize_with = "empty_date_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_end_date: Option<NaiveDate>,

    /// Business days between the planned dates
    #[serde(default, alias = "workingDays")]
    pub working_days: u32,

    /// Percent complete, 0..=100
    #[serde(default, deserialize_with = "progress_in_range")]
    pub progress: u8,

    /// Manual status override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold: Option<StatusHold>,

    #[serde(default, alias = "workLogs", skip_serializing_if = "Vec::is_empty")]
    pub work_logs: Vec<WorkLog>,
}

impl Task {
    /// Creates a root-level task with a planned schedule
    pub fn new(
        id: TaskId,
        project_id: ProjectId,
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            project_id,
            parent_id: None,
            title: title.into(),
            assignee_id: None,
            description: None,
            status: TaskStatus::Todo,
            priority: Priority::default(),
            start_date,
            end_date,
            actual_start_date: None,
            actual_end_date: None,
            working_days: working_days(start_date, end_date),
            progress: 0,
            hold: None,
            work_logs: Vec::new(),
        }
    }

    /// Sets the parent, builder style
    pub fn with_parent(mut self, parent: TaskId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Business days of the planned schedule
    pub fn planned_working_days(&self) -> u32 {
        working_days(self.start_date, self.end_date)
    }

    /// Replaces the planned schedule
    pub fn set_schedule(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), TaskError> {
        if start > end {
            return Err(TaskError::InvalidRange { start, end });
        }
        self.start_date = start;
        self.end_date = end;
        self.working_days = working_days(start, end);
        Ok(())
    }

    pub fn set_progress(&mut self, progress: u32) -> Result<(), TaskError> {
        if progress > 100 {
            return Err(TaskError::InvalidProgress(progress));
        }
        self.progress = progress as u8;
        Ok(())
    }

    /// Records the actual start
    pub fn start(&mut self, today: NaiveDate) {
        if self.actual_start_date.is_none() {
            self.actual_start_date = Some(today);
        }
        self.progress = self.progress.max(10);
    }

    /// Records the actual end (and start, if it was never recorded)
    pub fn finish(&mut self, today: NaiveDate) {
        if self.actual_start_date.is_none() {
            self.actual_start_date = Some(today);
        }
        if self.actual_end_date.is_none() {
            self.actual_end_date = Some(today);
        }
        self.progress = 100;
    }

    /// Clears actual execution dates and progress
    pub fn reset(&mut self) {
        self.actual_start_date = None;
        self.actual_end_date = None;
        self.progress = 0;
    }

    /// Replaces both actual execution dates
    pub fn set_actual_dates(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(), TaskError> {
        match (start, end) {
            (None, Some(_)) => return Err(TaskError::ActualEndWithoutStart),
            (Some(start), Some(end)) if end < start => {
                return Err(TaskError::ActualEndBeforeStart { start, end })
            }
            _ => {}
        }
        self.actual_start_date = start;
        self.actual_end_date = end;
        Ok(())
    }

    /// Pins the status until released
    pub fn hold(&mut self, hold: StatusHold) {
        self.hold = Some(hold);
        self.status = hold.status();
    }

    /// Returns the task to automatic status derivation
    pub fn release(&mut self) {
        self.hold = None;
    }

    pub fn is_held(&self) -> bool {
        self.hold.is_some()
    }

    /// Adds a work log; one log per date, only after the task has started
    pub fn add_log(&mut self, date: NaiveDate, content: &str) -> Result<&WorkLog, TaskError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(TaskError::EmptyLog);
        }
        if self.actual_start_date.is_none() {
            return Err(TaskError::NotStarted(self.id.clone()));
        }
        if self.work_logs.iter().any(|log| log.date == date) {
            return Err(TaskError::DuplicateLogDate(date));
        }

        self.work_logs.push(WorkLog {
            id: LogId::generate(content, Utc::now()),
            date,
            content: content.to_string(),
        });
        Ok(&self.work_logs[self.work_logs.len() - 1])
    }

    pub fn edit_log(&mut self, log_id: &LogId, content: &str) -> Result<(), TaskError> {
        if content.trim().is_empty() {
            return Err(TaskError::EmptyLog);
        }
        let log = self
            .work_logs
            .iter_mut()
            .find(|log| &log.id == log_id)
            .ok_or_else(|| TaskError::LogNotFound(log_id.clone()))?;
        log.content = content.trim().to_string();
        Ok(())
    }

    pub fn remove_log(&mut self, log_id: &LogId) -> Result<(), TaskError> {
        let before = self.work_logs.len();
        self.work_logs.retain(|log| &log.id != log_id);
        if self.work_logs.len() == before {
            return Err(TaskError::LogNotFound(log_id.clone()));
        }
        Ok(())
    }

    /// Work logs, newest first
    pub fn logs_newest_first(&self) -> Vec<&WorkLog> {
        let mut logs: Vec<_> = self.work_logs.iter().collect();
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        logs
    }
}
