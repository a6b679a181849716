//! Command executors and their replies

use async_trait::async_trait;
use opshell_foundation::SessionContext;

/// What a successful executor hands back to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text shown to the operator
    Output(String),
    /// End the session, optionally showing a last message
    Terminate(Option<String>),
}

impl Reply {
    pub fn output(text: impl Into<String>) -> Self {
        Reply::Output(text.into())
    }

    pub fn terminate() -> Self {
        Reply::Terminate(None)
    }

    pub fn terminate_with(message: impl Into<String>) -> Self {
        Reply::Terminate(Some(message.into()))
    }
}

/// Executor bound to a command or subcommand
///
/// `arg` is `None` when the operator typed no argument, otherwise the raw,
/// untokenized remainder of the line. Errors are logged server-side and never
/// shown to the operator verbatim.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        ctx: &mut SessionContext,
        arg: Option<&str>,
    ) -> anyhow::Result<Reply>;
}

/// Synchronous executor over the argument only
pub struct FnExecutor<F> {
    f: F,
}

impl<F> FnExecutor<F>
where
    F: Fn(Option<&str>) -> anyhow::Result<Reply> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> CommandExecutor for FnExecutor<F>
where
    F: Fn(Option<&str>) -> anyhow::Result<Reply> + Send + Sync,
{
    async fn execute(
        &self,
        _ctx: &mut SessionContext,
        arg: Option<&str>,
    ) -> anyhow::Result<Reply> {
        (self.f)(arg)
    }
}

/// Synchronous executor with access to the session context
pub struct ContextFnExecutor<F> {
    f: F,
}

impl<F> ContextFnExecutor<F>
where
    F: Fn(&mut SessionContext, Option<&str>) -> anyhow::Result<Reply> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> CommandExecutor for ContextFnExecutor<F>
where
    F: Fn(&mut SessionContext, Option<&str>) -> anyhow::Result<Reply> + Send + Sync,
{
    async fn execute(
        &self,
        ctx: &mut SessionContext,
        arg: Option<&str>,
    ) -> anyhow::Result<Reply> {
        (self.f)(ctx, arg)
    }
}
