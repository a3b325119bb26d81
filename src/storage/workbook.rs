//! In-memory task collection shared by every project in a store
//!
//! Commands work on one project at a time: take its tasks out with
//! [`Workbook::project_tasks`], run a single engine call and merge the result
//! back with [`Workbook::replace_project`]. The workbook is only written once
//! the engine call has returned.

use anyhow::{bail, Result};
use tracing::warn;

use super::TaskStore;
use crate::domain::hierarchy::validate;
use crate::domain::{HierarchyError, ProjectId, Task, TaskId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    tasks: Vec<Task>,
}

impl Workbook {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Reads the store. Duplicate ids are fatal; other hierarchy problems are
    /// logged and left for `wbs check` to report.
    pub fn load(store: &TaskStore) -> Result<Self> {
        let tasks = store.read_all()?;
        for issue in validate(&tasks) {
            if let HierarchyError::DuplicateId(id) = &issue {
                bail!("{} contains task {} more than once", store.path().display(), id);
            }
            warn!(%issue, "inconsistent task hierarchy");
        }
        Ok(Self { tasks })
    }

    pub fn save(&self, store: &TaskStore) -> Result<()> {
        store.write_all(&self.tasks)
    }

    /// All tasks in display order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Copies out the tasks of one project, in display order
    pub fn project_tasks(&self, project: &ProjectId) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| &t.project_id == project)
            .cloned()
            .collect()
    }

    /// Replaces every task of `project` with `tasks`.
    ///
    /// The new block takes the place of the project's first task so other
    /// projects keep their position in the file.
    pub fn replace_project(&mut self, project: &ProjectId, tasks: Vec<Task>) {
        let mut replacement = Some(tasks);
        let mut merged = Vec::with_capacity(self.tasks.len());

        for task in self.tasks.drain(..) {
            if &task.project_id == project {
                if let Some(block) = replacement.take() {
                    merged.extend(block);
                }
            } else {
                merged.push(task);
            }
        }
        if let Some(block) = replacement {
            merged.extend(block);
        }

        self.tasks = merged;
    }

    /// Replaces the whole collection (backup restore)
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Distinct project ids, in order of first appearance
    pub fn projects(&self) -> Vec<ProjectId> {
        let mut projects: Vec<ProjectId> = Vec::new();
        for task in &self.tasks {
            if !projects.contains(&task.project_id) {
                projects.push(task.project_id.clone());
            }
        }
        projects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::parse_date;
    use tempfile::TempDir;

    fn task(id: &str, project: &str) -> Task {
        Task::new(
            id.parse().unwrap(),
            project.parse().unwrap(),
            id,
            parse_date("2024-01-01").unwrap(),
            parse_date("2024-01-05").unwrap(),
        )
    }

    fn ids(workbook: &Workbook) -> Vec<&str> {
        workbook.tasks().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn project_tasks_filters_in_order() {
        let workbook = Workbook::new(vec![task("a1", "a"), task("b1", "b"), task("a2", "a")]);
        let a: Vec<_> = workbook
            .project_tasks(&"a".parse().unwrap())
            .into_iter()
            .map(|t| t.id.to_string())
            .collect();
        assert_eq!(a, vec!["a1", "a2"]);
    }

    #[test]
    fn replace_keeps_other_projects_in_place() {
        let mut workbook =
            Workbook::new(vec![task("b1", "b"), task("a1", "a"), task("b2", "b"), task("a2", "a")]);
        workbook.replace_project(&"a".parse().unwrap(), vec![task("a3", "a"), task("a1", "a")]);

        assert_eq!(ids(&workbook), vec!["b1", "a3", "a1", "b2"]);
    }

    #[test]
    fn replace_new_project_appends() {
        let mut workbook = Workbook::new(vec![task("b1", "b")]);
        workbook.replace_project(&"a".parse().unwrap(), vec![task("a1", "a")]);

        assert_eq!(ids(&workbook), vec!["b1", "a1"]);
        assert_eq!(workbook.projects().len(), 2);
    }

    #[test]
    fn replace_with_empty_removes_project() {
        let mut workbook = Workbook::new(vec![task("a1", "a"), task("b1", "b")]);
        workbook.replace_project(&"a".parse().unwrap(), Vec::new());

        assert_eq!(ids(&workbook), vec!["b1"]);
    }

    #[test]
    fn load_rejects_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.jsonl"));
        store.write_all(&[task("a1", "a"), task("a1", "a")]).unwrap();

        assert!(Workbook::load(&store).is_err());
    }

    #[test]
    fn load_tolerates_dangling_parent() {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.jsonl"));
        let orphan = task("a1", "a").with_parent("gone".parse().unwrap());
        store.write_all(&[orphan]).unwrap();

        let workbook = Workbook::load(&store).unwrap();
        assert!(workbook.find(&"a1".parse().unwrap()).is_some());
    }
}
