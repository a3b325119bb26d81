//! Backup and restore of the whole workbook

use std::path::Path;

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use super::output::Output;
use crate::domain::aggregate;
use crate::domain::hierarchy::order_depth_first;
use crate::storage::{Backup, Project};

pub fn export(output: &Output, path: &Path) -> Result<()> {
    let project = Project::open_current()?;
    let workbook = project.workbook()?;

    let backup = Backup::new(workbook.tasks().to_vec(), Utc::now());
    backup.write(path)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path.display().to_string(),
            "tasks": backup.tasks.len(),
        }));
    } else {
        output.success(&format!(
            "Exported {} task(s) to {}",
            backup.tasks.len(),
            path.display()
        ));
    }
    Ok(())
}

/// Replaces every task with the backup's, then puts each project in display
/// order and re-derives it
pub fn import(output: &Output, path: &Path, today: NaiveDate) -> Result<()> {
    let project = Project::open_current()?;
    let mut workbook = project.workbook()?;

    let backup = Backup::read(path)?;
    output.verbose_ctx(
        "import",
        &format!(
            "Backup version {:?} from {:?} with {} task(s)",
            backup.version,
            backup.timestamp,
            backup.tasks.len()
        ),
    );
    workbook.replace_all(backup.tasks);

    for project_id in workbook.projects() {
        let ordered = order_depth_first(workbook.project_tasks(&project_id));
        let tasks = aggregate(&ordered, today);
        workbook.replace_project(&project_id, tasks);
    }
    project.save(&workbook)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path.display().to_string(),
            "tasks": workbook.tasks().len(),
            "projects": workbook.projects(),
        }));
    } else {
        output.success(&format!(
            "Imported {} task(s) in {} project(s) from {}",
            workbook.tasks().len(),
            workbook.projects().len(),
            path.display()
        ));
    }
    Ok(())
}
