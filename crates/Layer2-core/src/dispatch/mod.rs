//! Dispatcher - 입력 한 줄을 명령어로 해석하고 실행
//!
//! 1. 최대 3개 토큰으로 분리 (`command`, `subcommand`, `remainder`)
//! 2. top-level 조회 → DEFAULT descriptor 권한 확인 (namespace gate)
//! 3. subcommand 조회 → subcommand 권한 확인
//! 4. executor 실행 → `DispatchResult`
//!
//! remainder는 다시 토큰화하지 않으므로 공백이나 JSON이 그대로 전달됩니다.

mod error;

pub use error::DispatchError;

use crate::command::{CommandDescriptor, Reply};
use crate::registry::CommandRegistry;
use futures::FutureExt;
use opshell_foundation::{Error as FoundationError, RoleSet, SessionContext};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

// ============================================================================
// Parsing
// ============================================================================

/// One input line split on its first two spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub command: &'a str,
    pub subcommand: Option<&'a str>,
    /// Raw rest of the line, never re-tokenized
    pub remainder: Option<&'a str>,
}

impl<'a> ParsedLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let mut parts = line.splitn(3, ' ');
        Self {
            command: parts.next().unwrap_or_default(),
            subcommand: parts.next(),
            remainder: parts.next(),
        }
    }
}

// ============================================================================
// DispatchResult
// ============================================================================

/// Outcome of dispatching one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Output(String),
    Error(DispatchError),
    Terminate(Option<String>),
}

impl DispatchResult {
    pub fn is_terminate(&self) -> bool {
        matches!(self, Self::Terminate(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Text shown to the operator, if any
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Output(text) => Some(text.clone()),
            Self::Error(err) => Some(err.to_string()),
            Self::Terminate(message) => message.clone(),
        }
    }
}

impl From<Reply> for DispatchResult {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Output(text) => Self::Output(text),
            Reply::Terminate(message) => Self::Terminate(message),
        }
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Resolves, authorizes and executes commands against a shared registry
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Dispatch one (already trimmed) line for the session in `ctx`
    pub async fn dispatch(&self, line: &str, ctx: &mut SessionContext) -> DispatchResult {
        let parsed = ParsedLine::parse(line);
        let caller = ctx.roles().cloned().unwrap_or_default();
        let user = ctx.username().unwrap_or("-").to_string();

        let Some(entry) = self.registry.lookup(parsed.command) else {
            debug!("Unsupported command '{}' from {}", parsed.command, user);
            return DispatchResult::Error(DispatchError::UnsupportedCommand(
                parsed.command.to_string(),
            ));
        };

        // namespace gate
        if !entry.default_descriptor().is_authorized(&caller) {
            warn!(
                "Permission denied: {} {} -> '{}'",
                user, caller, parsed.command
            );
            return DispatchResult::Error(DispatchError::PermissionDenied);
        }

        let Some(sub) = parsed.subcommand else {
            let default = entry.default_descriptor();
            if default.has_executor() {
                return self.invoke(default, parsed.command, None, ctx).await;
            }
            return DispatchResult::Output(entry.subcommand_listing(&caller));
        };

        let Some(descriptor) = entry.subcommand(sub) else {
            debug!("Unsupported subcommand '{} {}' from {}", parsed.command, sub, user);
            return DispatchResult::Error(DispatchError::unsupported_subcommand(
                parsed.command,
                sub,
            ));
        };

        if !descriptor.is_authorized(&caller) {
            warn!(
                "Permission denied: {} {} -> '{} {}'",
                user, caller, parsed.command, sub
            );
            return DispatchResult::Error(DispatchError::PermissionDenied);
        }

        let path = format!("{} {}", parsed.command, sub);
        self.invoke(descriptor, &path, parsed.remainder, ctx).await
    }

    /// Namespace gate plus subcommand gate for `command [subcommand]`, without executing
    pub fn is_authorized(&self, command: &str, subcommand: Option<&str>, caller: &RoleSet) -> bool {
        let Some(entry) = self.registry.lookup(command) else {
            return false;
        };
        if !entry.default_descriptor().is_authorized(caller) {
            return false;
        }
        match subcommand {
            None => true,
            Some(sub) => entry
                .subcommand(sub)
                .map(|desc| desc.is_authorized(caller))
                .unwrap_or(false),
        }
    }

    async fn invoke(
        &self,
        descriptor: &CommandDescriptor,
        path: &str,
        arg: Option<&str>,
        ctx: &mut SessionContext,
    ) -> DispatchResult {
        let Some(executor) = descriptor.executor_ref() else {
            // subcommands always carry an executor in practice; a bare one is a no-op
            return DispatchResult::Output(String::new());
        };

        debug!("Executing '{}' (argument: {})", path, arg.is_some());
        let outcome = AssertUnwindSafe(executor.execute(ctx, arg))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(reply)) => reply.into(),
            Ok(Err(err)) => {
                if is_interruption(&err) || ctx.is_interrupted() {
                    debug!("'{}' interrupted", path);
                    return DispatchResult::Terminate(None);
                }
                error!(
                    "Command '{}' failed for {}: {:?}",
                    path,
                    ctx.username().unwrap_or("-"),
                    err
                );
                DispatchResult::Error(DispatchError::ExecutorFailure)
            }
            Err(panic) => {
                error!(
                    "Command '{}' panicked for {}: {}",
                    path,
                    ctx.username().unwrap_or("-"),
                    panic_message(panic.as_ref())
                );
                DispatchResult::Error(DispatchError::ExecutorFailure)
            }
        }
    }
}

fn is_interruption(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<FoundationError>(),
        Some(FoundationError::Interrupted)
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_token() {
        let parsed = ParsedLine::parse("help");
        assert_eq!(parsed.command, "help");
        assert_eq!(parsed.subcommand, None);
        assert_eq!(parsed.remainder, None);
    }

    #[test]
    fn test_parse_two_tokens() {
        let parsed = ParsedLine::parse("test execute");
        assert_eq!(parsed.command, "test");
        assert_eq!(parsed.subcommand, Some("execute"));
        assert_eq!(parsed.remainder, None);
    }

    #[test]
    fn test_parse_keeps_remainder_intact() {
        let parsed = ParsedLine::parse(r#"metrics metricName {"name":"x y"}"#);
        assert_eq!(parsed.command, "metrics");
        assert_eq!(parsed.subcommand, Some("metricName"));
        assert_eq!(parsed.remainder, Some(r#"{"name":"x y"}"#));

        let parsed = ParsedLine::parse("echo bob hello  big   world");
        assert_eq!(parsed.remainder, Some("hello  big   world"));
    }

    #[test]
    fn test_dispatch_result_text() {
        assert_eq!(
            DispatchResult::Output("hi".into()).text().as_deref(),
            Some("hi")
        );
        assert_eq!(DispatchResult::Terminate(None).text(), None);
        assert!(DispatchResult::Error(DispatchError::PermissionDenied)
            .text()
            .unwrap()
            .contains("Permission denied"));
        assert!(DispatchResult::from(Reply::terminate()).is_terminate());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
