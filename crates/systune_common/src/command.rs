//! Command execution layer.
//!
//! Runs one external command, captures stdout/stderr, and folds the
//! outcome into a single textual result. Callers always get a string
//! back - probe aggregation and remediation reporting never branch on
//! an error type at this level.

use std::process::Command;

/// Outcome of a single external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The command line as given.
    pub command: String,
    /// Stdout on success, formatted error text on failure.
    pub output: String,
    /// False on nonzero exit or spawn failure.
    pub succeeded: bool,
}

/// Executes external commands.
///
/// The trait seam lets collection, remediation, and the session run
/// against a scripted runner in tests.
pub trait CommandRunner {
    fn run(&self, command: &str) -> CommandResult;
}

/// Runs commands through `sh -c`.
///
/// No retries and no timeout: a failed command yields its error text
/// for that field, a hung command hangs the attended run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> CommandResult {
        let output = Command::new("sh").arg("-c").arg(command).output();

        match output {
            Ok(output) if output.status.success() => CommandResult {
                command: command.to_string(),
                output: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                succeeded: true,
            },
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                CommandResult {
                    command: command.to_string(),
                    output: format!(
                        "Error running command '{}': {}",
                        command,
                        stderr.trim()
                    ),
                    succeeded: false,
                }
            }
            Err(e) => CommandResult {
                command: command.to_string(),
                output: format!("Error running command '{}': {}", command, e),
                succeeded: false,
            },
        }
    }
}

/// Check whether a tool resolves on PATH.
///
/// Single predicate used for every optional probe and every action
/// precondition.
pub fn tool_available(runner: &dyn CommandRunner, tool: &str) -> bool {
    runner.run(&format!("command -v {}", tool)).succeeded
}
