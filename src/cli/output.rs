//! Output formatting for CLI commands

use serde::Serialize;

use crate::domain::Task;

const TITLE_INDENT: &str = "  ";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<crate::storage::OutputFormat> for OutputFormat {
    fn from(format: crate::storage::OutputFormat) -> Self {
        match format {
            crate::storage::OutputFormat::Text => OutputFormat::Text,
            crate::storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints an error message
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Error: {}", message),
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "success": false,
                        "error": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Reports a changed task: the task itself in JSON, `message` in text
    pub fn task(&self, task: &Task, message: &str) {
        if self.is_json() {
            self.data(task);
        } else {
            self.success(message);
        }
    }

    /// Prints tasks as a table, titles indented by depth. Text mode only.
    pub fn task_table<'a, I>(&self, rows: I)
    where
        I: IntoIterator<Item = (&'a Task, usize)>,
    {
        println!("{}", task_table_header());
        println!("{}", "-".repeat(80));
        for (task, depth) in rows {
            println!("{}", task_row(task, depth));
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Returns true if using text format
    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

fn task_table_header() -> String {
    format!(
        "{:<12} {:<14} {:>4} {:<10} {:<10} {:>4}  TITLE",
        "ID", "STATUS", "PROG", "START", "END", "DAYS"
    )
}

/// One table line: id, status, progress, planned dates, working days, title
pub fn task_row(task: &Task, depth: usize) -> String {
    let status = match task.hold {
        Some(_) => format!("{}*", task.status.label()),
        None => task.status.label().to_string(),
    };
    format!(
        "{:<12} {:<14} {:>3}% {:<10} {:<10} {:>4}  {}{}",
        task.id,
        status,
        task.progress,
        task.start_date,
        task.end_date,
        task.working_days,
        TITLE_INDENT.repeat(depth),
        task.title
    )
}
