//! Per-invocation state shared by the commands
//!
//! A session opens the project, loads the workbook and fixes the project the
//! command works on and the date it treats as today.

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;

use super::output::Output;
use crate::domain::{aggregate, ProjectId, Task, TaskId};
use crate::storage::{Project, Workbook};

pub struct Session {
    pub project: Project,
    pub workbook: Workbook,
    pub project_id: ProjectId,
    pub today: NaiveDate,
}

impl Session {
    /// Opens the current project. Without `--project` the configured default
    /// project is used.
    pub fn open(project_id: Option<&ProjectId>, today: NaiveDate, output: &Output) -> Result<Self> {
        let project = Project::open_current()?;
        output.verbose_ctx("session", &format!("Opened project at: {}", project.root().display()));

        let workbook = project.workbook()?;
        let project_id = project_id
            .cloned()
            .unwrap_or_else(|| project.config().project.default_project.clone());
        output.verbose_ctx(
            "session",
            &format!("Working on project '{}' as of {}", project_id, today),
        );

        Ok(Self {
            project,
            workbook,
            project_id,
            today,
        })
    }

    /// Opens the project that owns `id`, regardless of `--project`
    pub fn for_task(id: &TaskId, today: NaiveDate, output: &Output) -> Result<Self> {
        let mut session = Self::open(None, today, output)?;
        let owner = session
            .workbook
            .find(id)
            .map(|t| t.project_id.clone())
            .ok_or_else(|| anyhow!("Task not found: {}", id))?;
        session.project_id = owner;
        Ok(session)
    }

    /// Tasks of the session's project, in display order
    pub fn tasks(&self) -> Vec<Task> {
        self.workbook.project_tasks(&self.project_id)
    }

    pub fn pixels_per_level(&self) -> u32 {
        self.project.config().project.engine.pixels_per_level
    }

    /// Merges the project's new tasks back and writes the workbook
    pub fn commit(&mut self, tasks: Vec<Task>) -> Result<()> {
        self.workbook.replace_project(&self.project_id, tasks);
        self.project.save(&self.workbook)
    }

    /// Applies an edit to one task, re-aggregates the project and saves.
    ///
    /// Returns the task as stored after aggregation.
    pub fn update_task<F>(&mut self, id: &TaskId, edit: F) -> Result<Task>
    where
        F: FnOnce(&mut Task, &[Task]) -> Result<()>,
    {
        let mut tasks = self.tasks();
        let pos = tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| anyhow!("Task not found: {}", id))?;

        let mut task = tasks[pos].clone();
        edit(&mut task, &tasks[..])?;
        tasks[pos] = task;

        let tasks = aggregate(&tasks, self.today);
        let updated = tasks[pos].clone();
        self.commit(tasks)?;
        Ok(updated)
    }
}

/// Fails if `id` has subtasks in `tasks`; their schedule is derived
pub fn ensure_leaf(id: &TaskId, tasks: &[Task], what: &str) -> Result<()> {
    if tasks.iter().any(|t| t.parent_id.as_ref() == Some(id)) {
        bail!(
            "Task {} has subtasks; its {} is derived from them",
            id,
            what
        );
    }
    Ok(())
}
