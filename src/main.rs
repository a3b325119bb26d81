//! WBS CLI - work breakdown structures with derived schedules

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = wbs_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
