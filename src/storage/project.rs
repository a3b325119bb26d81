//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_DIR;
use super::{Config, TaskStore, Workbook};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a wbs project. Run 'wbs init' first.")]
    NotInProject,
}

/// A WBS project directory
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let wbs_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&wbs_dir).with_context(|| {
            format!("Failed to create {} directory: {}", PROJECT_DIR, wbs_dir.display())
        })?;

        let config_path = wbs_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# WBS CLI configuration

# Project used when a command gets no --project
default_project = "default"

[engine]
# Horizontal pixels per hierarchy level for `wbs move --dx`
pixels_per_level = 24

[display]
# Gantt column width: "day" or "week"
gantt_cell = "day"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = wbs_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = "# Interrupted writes\n*.tmp\n";
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .wbs directory path
    pub fn wbs_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the task store
    pub fn task_store(&self) -> TaskStore {
        TaskStore::for_project(&self.root)
    }

    /// Loads every task of the project
    pub fn workbook(&self) -> Result<Workbook> {
        Workbook::load(&self.task_store())
    }

    /// Persists the workbook
    pub fn save(&self, workbook: &Workbook) -> Result<()> {
        workbook.save(&self.task_store())
    }
}
