//! Runs the wrapped test command

use colored::Colorize;
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tracing::debug;

use crate::error::CommandError;

/// Result of running the test command
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_status: i32,
    pub duration_ms: u128,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Run `args` in `cwd`, inheriting stdio, and return its exit status.
///
/// A process killed by a signal has no exit code and is reported as `1`.
pub fn run_command(args: &[String], cwd: &Path) -> Result<CommandResult, CommandError> {
    let (program, rest) = args.split_first().ok_or(CommandError::Empty)?;

    println!("\n{} {}\n", "→".blue(), args.join(" ").dimmed());
    debug!(program = %program, cwd = %cwd.display(), "running test command");

    let started = Instant::now();
    let status = Command::new(program)
        .args(rest)
        .current_dir(cwd)
        .status()
        .map_err(|source| CommandError::Spawn {
            program: program.clone(),
            source,
        })?;

    let result = CommandResult {
        exit_status: status.code().unwrap_or(1),
        duration_ms: started.elapsed().as_millis(),
    };

    let marker = if result.success() { "✓".green() } else { "✗".red() };
    println!(
        "\n{} {} exited with status {} ({}ms)",
        marker,
        program.bold(),
        result.exit_status,
        result.duration_ms
    );

    Ok(result)
}
