//! TerminalLoop - 세션 하나의 REPL
//!
//! ```text
//! hint ─▶ prompt ─▶ read line ─▶ ProcessorChain ─▶ write ─┐
//!            ▲                                             │
//!            └─────────────────────────────────────────────┘
//!   exit: Terminate | end of stream | interrupt | I/O failure
//! ```
//!
//! 세션 컨텍스트는 루프 시작 시 채워지고, 종료 원인과 무관하게 반드시 비워집니다
//! (`ContextGuard`).

use crate::processor::{ChainOutcome, ProcessorChain, UsageRow};
use crate::session::Connection;
use opshell_foundation::{
    context_keys as keys, Error, OutputAdapter, PlainAdapter, SessionContext, ShellConfig,
};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

// ============================================================================
// SessionExit
// ============================================================================

/// Why a session loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    /// A command returned `Terminate`
    Terminated,
    /// The session's interrupt token fired
    Interrupted,
    /// The operator closed the input stream
    EndOfStream,
    /// Reading or writing the session stream failed
    Io(String),
    /// No input stage matched (invariant violation)
    Internal(String),
}

impl SessionExit {
    /// Ended by the operator or the shell, not by a failure
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Terminated | Self::Interrupted | Self::EndOfStream)
    }
}

impl fmt::Display for SessionExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminated => f.write_str("terminated"),
            Self::Interrupted => f.write_str("interrupted"),
            Self::EndOfStream => f.write_str("end of stream"),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

// ============================================================================
// ContextGuard
// ============================================================================

/// Clears the borrowed context when dropped
struct ContextGuard<'a>(&'a mut SessionContext);

impl Deref for ContextGuard<'_> {
    type Target = SessionContext;

    fn deref(&self) -> &SessionContext {
        self.0
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut SessionContext {
        self.0
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

// ============================================================================
// TerminalLoop
// ============================================================================

/// Read-process-write loop shared by every session
pub struct TerminalLoop {
    chain: Arc<ProcessorChain>,
    usage: Arc<Vec<UsageRow>>,
    prompt: String,
    hint: Option<String>,
    style: Arc<dyn OutputAdapter>,
}

impl TerminalLoop {
    pub fn new(chain: Arc<ProcessorChain>) -> Self {
        Self::from_config(chain, &ShellConfig::default())
    }

    /// Prompt and hint from the shell configuration
    pub fn from_config(chain: Arc<ProcessorChain>, config: &ShellConfig) -> Self {
        let usage = Arc::new(chain.usage());
        Self {
            chain,
            usage,
            prompt: config.prompt.clone(),
            hint: Some(config.hint.clone()).filter(|h| !h.is_empty()),
            style: Arc::new(PlainAdapter),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Line shown once before the first prompt (`None` to disable)
    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.hint = hint;
        self
    }

    /// Default output adapter for connections that bring none
    pub fn with_style(mut self, style: Arc<dyn OutputAdapter>) -> Self {
        self.style = style;
        self
    }

    pub fn chain(&self) -> &Arc<ProcessorChain> {
        &self.chain
    }

    /// Run a session in a fresh context
    pub async fn run(&self, connection: Connection) -> SessionExit {
        let mut ctx = SessionContext::new();
        self.run_with(&mut ctx, connection, CancellationToken::new())
            .await
    }

    /// Run a session in `ctx`; `ctx` is empty again when this returns
    pub async fn run_with(
        &self,
        ctx: &mut SessionContext,
        connection: Connection,
        interrupt: CancellationToken,
    ) -> SessionExit {
        let mut ctx = ContextGuard(ctx);
        let session_id = connection.session_id.clone();
        let username = connection.username.clone();

        self.populate(&mut ctx, connection, interrupt);
        info!("Session {} opened for {}", session_id, username);

        let exit = self.drive(&mut ctx).await;

        if exit.is_clean() {
            info!("Session {} for {} closed: {}", session_id, username, exit);
        } else {
            warn!("Session {} for {} closed: {}", session_id, username, exit);
        }
        exit
    }

    fn populate(&self, ctx: &mut SessionContext, connection: Connection, interrupt: CancellationToken) {
        let style = connection.style.unwrap_or_else(|| self.style.clone());

        ctx.set(keys::SESSION_ID, connection.session_id);
        ctx.set(keys::USERNAME, connection.username);
        ctx.set(keys::ROLES, connection.roles);
        ctx.set(keys::INPUT, connection.input);
        ctx.set(keys::OUTPUT, connection.output);
        ctx.set(keys::STYLE, style);
        ctx.set(keys::INTERRUPT, interrupt);
        ctx.set(keys::REGISTRY, self.chain.dispatcher().registry().clone());
        ctx.set(keys::USAGE, self.usage.clone());
    }

    async fn drive(&self, ctx: &mut SessionContext) -> SessionExit {
        if let Some(hint) = &self.hint {
            if let Err(e) = ctx.write_line(hint).await {
                return io_exit(e);
            }
        }

        loop {
            let line = match ctx.prompt(&self.prompt).await {
                Ok(Some(line)) => line,
                Ok(None) => return SessionExit::EndOfStream,
                Err(e) => return io_exit(e),
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            debug!("Session input: {}", line);

            match self.chain.process(line, ctx).await {
                Ok(None) => {}
                Ok(Some(ChainOutcome::Text(text))) => {
                    if !text.is_empty() {
                        if let Err(e) = ctx.write_line(&text).await {
                            return io_exit(e);
                        }
                    }
                }
                Ok(Some(ChainOutcome::Terminate(message))) => {
                    if ctx.is_interrupted() {
                        return SessionExit::Interrupted;
                    }
                    if let Some(message) = message.filter(|m| !m.is_empty()) {
                        if let Err(e) = ctx.write_line(&message).await {
                            return io_exit(e);
                        }
                    }
                    return SessionExit::Terminated;
                }
                Err(e) => {
                    error!("Input processing failed: {}", e);
                    return SessionExit::Internal(e.to_string());
                }
            }

            if ctx.is_interrupted() {
                return SessionExit::Interrupted;
            }
        }
    }
}

impl fmt::Debug for TerminalLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalLoop")
            .field("prompt", &self.prompt)
            .field("hint", &self.hint)
            .field("style", &self.style.name())
            .finish_non_exhaustive()
    }
}

fn io_exit(err: Error) -> SessionExit {
    match err {
        Error::Interrupted => SessionExit::Interrupted,
        other => SessionExit::Io(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_guard_clears_on_drop() {
        let mut ctx = SessionContext::new();
        {
            let mut guard = ContextGuard(&mut ctx);
            guard.set("k", 1u32);
            assert_eq!(guard.len(), 1);
        }
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_io_exit_maps_interrupt() {
        assert_eq!(io_exit(Error::Interrupted), SessionExit::Interrupted);
        assert!(matches!(
            io_exit(Error::MissingContext(keys::INPUT)),
            SessionExit::Io(_)
        ));
    }

    #[test]
    fn test_exit_cleanliness() {
        assert!(SessionExit::Terminated.is_clean());
        assert!(SessionExit::EndOfStream.is_clean());
        assert!(!SessionExit::Io("broken pipe".into()).is_clean());
    }
}
