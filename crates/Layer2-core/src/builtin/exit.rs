use crate::command::{CommandProvider, Reply};

/// Message written before the session closes
pub const EXIT_MESSAGE: &str = "Goodbye";

pub(super) fn provider() -> CommandProvider {
    CommandProvider::new("exit", "Exit the shell")
        .executor(|_| Ok(Reply::terminate_with(EXIT_MESSAGE)))
}
