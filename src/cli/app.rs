//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::output::{Output, OutputFormat};
use super::task::{AddArgs, EditArgs, MoveArgs, Transition};
use super::{backup_cmd, log, query, task};
use crate::domain::calendar::{self, parse_date};
use crate::domain::{ProjectId, StatusHold, TaskId};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "wbs")]
#[command(author, version, about = "Work breakdown structures with derived schedules")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project to work on (defaults to `default_project` in config)
    #[arg(long, short = 'p', global = true, env = "WBS_PROJECT")]
    pub project: Option<ProjectId>,

    /// Date to treat as today (YYYY-MM-DD)
    #[arg(long, global = true, env = "WBS_TODAY", value_parser = parse_date)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new wbs project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Add a task
    ///
    /// Examples:
    ///   wbs add "Design" --start 2024-01-01 --end 2024-01-12
    ///   wbs add "Wireframes" --parent t-1a2b3c4
    Add(AddArgs),

    /// Change task fields
    Edit(EditArgs),

    /// Record the actual start of a task
    Start {
        /// Task ID
        id: TaskId,
    },

    /// Record the actual end of a task
    Finish {
        /// Task ID
        id: TaskId,
    },

    /// Clear actual dates and progress
    Reset {
        /// Task ID
        id: TaskId,
    },

    /// Pin a task's status (blocked or review) until released
    Hold {
        /// Task ID
        id: TaskId,

        /// blocked or review
        status: StatusHold,
    },

    /// Return a held task to automatic status
    Release {
        /// Task ID
        id: TaskId,
    },

    /// Delete a task and all of its subtasks
    Delete {
        /// Task ID
        id: TaskId,
    },

    /// Move a task (with its subtasks) like a drag and drop in the WBS table
    ///
    /// Examples:
    ///   wbs move t-1a2b3c4 --after t-5d6e7f8 --levels 1
    ///   wbs move t-1a2b3c4 --after t-1a2b3c4 --dx -24
    ///   wbs move t-1a2b3c4 --top
    Move(MoveArgs),

    /// Show the work breakdown
    Tree,

    /// Show task details
    Show {
        /// Task ID
        id: TaskId,
    },

    /// Re-derive statuses, parent schedules and progress
    Recalc,

    /// Check the hierarchy and derived fields
    Check,

    /// Show project progress figures
    Stats,

    /// Show open work per assignee
    Load,

    /// Show a text Gantt chart
    Gantt,

    /// Manage work logs
    #[command(subcommand)]
    Log(log::LogCommands),

    /// Write every task to a JSON backup file
    Export {
        /// Backup file to write
        file: PathBuf,
    },

    /// Replace every task with the contents of a backup file
    Import {
        /// Backup file to read
        file: PathBuf,
    },
}

/// Installs the tracing subscriber; engine logs go to stderr
fn init_logging(verbose: bool) {
    let default = if verbose { "wbs_cli=debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load()?.global.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);
    let today = cli.today.unwrap_or_else(calendar::today);
    let project = cli.project.as_ref();

    output.verbose(&format!("wbs starting, today is {}", today));

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .wbs directory at: {}", project.wbs_dir().display()),
            );
            output.success(&format!("Initialized wbs project at {}", project.root().display()));
        }

        Commands::Add(args) => task::add(&output, args, project, today)?,
        Commands::Edit(args) => task::edit(&output, args, today)?,
        Commands::Start { id } => task::transition(&output, &id, Transition::Start, today)?,
        Commands::Finish { id } => task::transition(&output, &id, Transition::Finish, today)?,
        Commands::Reset { id } => task::transition(&output, &id, Transition::Reset, today)?,
        Commands::Hold { id, status } => task::hold(&output, &id, status, today)?,
        Commands::Release { id } => task::release(&output, &id, today)?,
        Commands::Delete { id } => task::delete(&output, &id, today)?,
        Commands::Move(args) => task::move_task(&output, args, today)?,
        Commands::Recalc => task::recalc(&output, project, today)?,

        Commands::Tree => query::tree(&output, project, today)?,
        Commands::Show { id } => query::show(&output, &id, today)?,
        Commands::Check => query::check(&output, project, today)?,
        Commands::Stats => query::stats(&output, project, today)?,
        Commands::Load => query::load(&output, project, today)?,
        Commands::Gantt => query::gantt(&output, project, today)?,

        Commands::Log(cmd) => log::run(cmd, &output, today)?,

        Commands::Export { file } => backup_cmd::export(&output, &file)?,
        Commands::Import { file } => backup_cmd::import(&output, &file, today)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
