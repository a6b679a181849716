//! Built-in commands available in every session
//!
//! | Command | Roles | 동작 |
//! |---------|-------|------|
//! | `help`  | `*`   | 권한 있는 명령어 + post processor 사용법 |
//! | `exit`  | `*`   | 세션 종료 |

mod exit;
mod help;

pub use exit::EXIT_MESSAGE;

use crate::command::CommandProvider;

/// Providers registered by [`CommandRegistry::with_builtins`](crate::CommandRegistry::with_builtins)
pub fn providers() -> Vec<CommandProvider> {
    vec![help::provider(), exit::provider()]
}
