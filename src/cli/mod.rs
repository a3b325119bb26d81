//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Task | Editing the breakdown | `add`, `edit`, `start`, `finish`, `move`, `delete` |
//! | Status | Manual overrides | `hold`, `release` |
//! | Query | Reading derived state | `tree`, `show`, `stats`, `load`, `gantt`, `check` |
//! | Logs | Per-task journal | `log add`, `log list` |
//! | Backup | Whole-store transfer | `export`, `import` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output, including the aggregation
//! passes of the engine:
//! ```bash
//! wbs --verbose recalc
//! ```
//!
//! ## Reproducible Dates
//!
//! `--today YYYY-MM-DD` (or `WBS_TODAY`) fixes the date used for status
//! derivation and new actual dates.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod backup_cmd;
mod log;
mod output;
mod query;
mod session;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
