//! Whole-workbook backup files
//!
//! A backup is a single pretty-printed JSON document holding every task.
//! Files written by the browser version of the tool (camelCase fields,
//! extra `projects`/`resources` arrays) are accepted on import; the extra
//! arrays are ignored.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::hierarchy::ensure_valid;
use crate::domain::Task;

pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Backup {
    pub fn new(tasks: Vec<Task>, timestamp: DateTime<Utc>) -> Self {
        Self {
            version: Some(BACKUP_VERSION.to_string()),
            timestamp: Some(timestamp),
            tasks,
        }
    }

    /// Writes the backup as pretty JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize backup")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write backup: {}", path.display()))
    }

    /// Reads a backup and checks that its hierarchy is well formed
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read backup: {}", path.display()))?;
        let backup: Backup = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse backup: {}", path.display()))?;

        ensure_valid(&backup.tasks)
            .with_context(|| format!("Backup {} has an invalid task hierarchy", path.display()))?;

        Ok(backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::parse_date;
    use crate::domain::{ProjectId, TaskStatus};
    use tempfile::TempDir;

    fn task(id: &str) -> Task {
        Task::new(
            id.parse().unwrap(),
            ProjectId::default(),
            id,
            parse_date("2024-01-01").unwrap(),
            parse_date("2024-01-05").unwrap(),
        )
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        let tasks = vec![task("p"), task("c").with_parent("p".parse().unwrap())];

        Backup::new(tasks.clone(), Utc::now()).write(&path).unwrap();
        let loaded = Backup::read(&path).unwrap();

        assert_eq!(loaded.version.as_deref(), Some(BACKUP_VERSION));
        assert_eq!(loaded.tasks, tasks);
    }

    #[test]
    fn reads_browser_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nexus_backup.json");
        fs::write(
            &path,
            r#"{
  "projects": [{"id": "p1", "name": "Launch"}],
  "tasks": [
    {"id": "t1", "projectId": "p1", "parentId": null, "title": "Plan",
     "assigneeId": "unassigned", "status": "In Progress", "priority": "High",
     "startDate": "2024-01-01", "endDate": "2024-01-12",
     "actualStartDate": "2024-01-02", "actualEndDate": "",
     "workingDays": 10, "progress": 40}
  ],
  "resources": [],
  "timestamp": "2024-01-15T09:30:00.000Z",
  "version": "1.0"
}"#,
        )
        .unwrap();

        let backup = Backup::read(&path).unwrap();
        let t = &backup.tasks[0];
        assert_eq!(t.project_id.as_str(), "p1");
        assert_eq!(t.status, TaskStatus::InProgress);
        assert_eq!(t.assignee_id, None);
        assert_eq!(t.actual_end_date, None);
        assert_eq!(t.working_days, 10);
    }

    #[test]
    fn rejects_cyclic_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        let a = task("a").with_parent("b".parse().unwrap());
        let b = task("b").with_parent("a".parse().unwrap());
        Backup::new(vec![a, b], Utc::now()).write(&path).unwrap();

        assert!(Backup::read(&path).is_err());
    }

    #[test]
    fn rejects_backup_with_progress_over_100() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        let mut json = serde_json::to_value(Backup::new(vec![task("a")], Utc::now())).unwrap();
        json["tasks"][0]["progress"] = serde_json::json!(250);
        fs::write(&path, json.to_string()).unwrap();

        let err = Backup::read(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Progress must be between 0 and 100"));
    }
}
