//! # Storage Layer
//!
//! Persistence for WBS projects in git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line, display order) | `.wbs/tasks.jsonl` |
//! | Config | TOML | `.wbs/config.toml` |
//! | Backups | Pretty JSON | anywhere (`wbs export` / `wbs import`) |
//!
//! ## Concurrency Safety
//!
//! - [`TaskStore`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .wbs/
//! ├── tasks.jsonl           # All tasks of all projects
//! ├── config.toml           # Project configuration
//! └── .gitignore            # Ignores interrupted temp files
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a WBS project directory
//! - [`Workbook`] - In-memory task collection, edited one project at a time
//! - [`TaskStore`] - Read/write tasks as JSONL
//! - [`Config`] - Project and global configuration

mod backup;
mod config;
mod jsonl;
mod project;
mod workbook;

pub use backup::{Backup, BACKUP_VERSION};
pub use config::{Config, ConfigError, GanttCell, OutputFormat, ProjectConfig, PROJECT_DIR};
pub use jsonl::TaskStore;
pub use project::{Project, ProjectError};
pub use workbook::Workbook;
