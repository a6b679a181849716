//! Recoverable dispatch errors
//!
//! `Display` is exactly the message shown to the operator. Nothing in here
//! carries internal detail; executor failures are logged where they happen.

use thiserror::Error;

/// Errors recovered at dispatch/processor level (the loop keeps running)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unsupported command '{0}'. Enter 'help' for a list of supported commands")]
    UnsupportedCommand(String),

    #[error("Unsupported subcommand '{subcommand}' for '{command}'. Enter '{command}' for a list of supported subcommands")]
    UnsupportedSubcommand { command: String, subcommand: String },

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Invalid command syntax: {0}")]
    MalformedInput(String),

    #[error("Error performing command. Please check the server logs for more information")]
    ExecutorFailure,
}

impl DispatchError {
    pub fn unsupported_subcommand(command: impl Into<String>, subcommand: impl Into<String>) -> Self {
        Self::UnsupportedSubcommand {
            command: command.into(),
            subcommand: subcommand.into(),
        }
    }

    /// Operator mistake (as opposed to a server-side failure)
    pub fn is_operator_error(&self) -> bool {
        !matches!(self, Self::ExecutorFailure)
    }
}
