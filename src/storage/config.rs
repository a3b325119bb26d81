//! Configuration handling for the WBS CLI
//!
//! Configuration is stored in `.wbs/config.toml` (project) and
//! `~/.config/wbs/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::reparent::DEFAULT_PIXELS_PER_LEVEL;
use crate::domain::ProjectId;

/// Name of the per-project data directory
pub const PROJECT_DIR: &str = ".wbs";

/// Upper bound for `engine.pixels_per_level`
pub const MAX_PIXELS_PER_LEVEL: u32 = 1_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Settings for the scheduling engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Indentation width of one hierarchy level, used by `wbs move --dx`
    pub pixels_per_level: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pixels_per_level: DEFAULT_PIXELS_PER_LEVEL,
        }
    }
}

/// Column granularity of the text Gantt chart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GanttCell {
    #[default]
    Day,
    Week,
}

impl GanttCell {
    /// Days covered by one column
    pub fn days(&self) -> i64 {
        match self {
            GanttCell::Day => 1,
            GanttCell::Week => 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    pub gantt_cell: GanttCell,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project used when a command gets no `--project`
    pub default_project: ProjectId,

    pub engine: EngineConfig,

    pub display: DisplayConfig,
}

impl ProjectConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let pixels = self.engine.pixels_per_level;
        if pixels == 0 || pixels > MAX_PIXELS_PER_LEVEL {
            return Err(ConfigError::Invalid(format!(
                "engine.pixels_per_level must be between 1 and {}, got {}",
                MAX_PIXELS_PER_LEVEL, pixels
            )));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = match Self::find_project_root() {
            Some(root) => Self::load_project_config(&root)?,
            None => ProjectConfig::default(),
        };

        Ok(Self { project, global })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self { project, global })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "wbs", "wbs-cli").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;
        config.validate()?;
        Ok(config)
    }

    /// Finds the project root by looking for a `.wbs/` directory in the
    /// current directory or any parent
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(PROJECT_DIR).is_dir())
            .map(Path::to_path_buf)
    }
}
