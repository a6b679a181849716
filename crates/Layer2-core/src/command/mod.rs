//! Command model - descriptor, executor, provider
//!
//! - `CommandDescriptor`: 이름 + 설명 + role + (선택) executor
//! - `CommandExecutor`: optional 인자 → `Reply` (출력 또는 종료)
//! - `CommandProvider`: top-level 명령어 하나의 DEFAULT + subcommand 묶음
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use opshell_core::{CommandDescriptor, CommandProvider, Reply};
//!
//! let echo = CommandProvider::new("echo", "Echo commands")
//!     .subcommand(
//!         CommandDescriptor::new("bob", "Bob repeats you")
//!             .executor(|arg| Ok(Reply::output(format!("bob says {}", arg.unwrap_or("")))))
//!     );
//! ```

mod executor;

pub use executor::{CommandExecutor, ContextFnExecutor, FnExecutor, Reply};

use opshell_foundation::permission::{authorize, RoleSet};
use opshell_foundation::SessionContext;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// CommandDescriptor
// ============================================================================

/// One invocable (or namespace-only) command
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    description: String,
    roles: RoleSet,
    executor: Option<Arc<dyn CommandExecutor>>,
}

impl CommandDescriptor {
    /// New descriptor open to every role (`"*"`) with no executor bound
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            roles: RoleSet::any(),
            executor: None,
        }
    }

    /// Replace the required roles
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().collect();
        self
    }

    /// Bind a synchronous executor that only looks at the argument
    pub fn executor<F>(self, f: F) -> Self
    where
        F: Fn(Option<&str>) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.with_executor(Arc::new(FnExecutor::new(f)))
    }

    /// Bind a synchronous executor that also reads/writes the session context
    pub fn context_executor<F>(self, f: F) -> Self
    where
        F: Fn(&mut SessionContext, Option<&str>) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.with_executor(Arc::new(ContextFnExecutor::new(f)))
    }

    /// Bind any executor (async commands, commands that prompt the operator)
    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn required_roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn executor_ref(&self) -> Option<&Arc<dyn CommandExecutor>> {
        self.executor.as_ref()
    }

    pub fn has_executor(&self) -> bool {
        self.executor.is_some()
    }

    /// Authorization gate for this descriptor
    pub fn is_authorized(&self, caller: &RoleSet) -> bool {
        authorize(&self.roles, caller)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("roles", &self.roles)
            .field("executor", &self.executor.is_some())
            .finish()
    }
}

// ============================================================================
// CommandProvider
// ============================================================================

/// Everything one provider registers under a single top-level name
#[derive(Debug, Clone)]
pub struct CommandProvider {
    default: CommandDescriptor,
    subcommands: Vec<CommandDescriptor>,
}

impl CommandProvider {
    /// Namespace-only provider; bind an executor or add subcommands
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            default: CommandDescriptor::new(name, description),
            subcommands: Vec::new(),
        }
    }

    /// Provider built around an existing DEFAULT descriptor
    pub fn from_descriptor(default: CommandDescriptor) -> Self {
        Self {
            default,
            subcommands: Vec::new(),
        }
    }

    /// Roles required for the whole namespace
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default = self.default.roles(roles);
        self
    }

    /// Executor invoked when the command is entered without a subcommand
    pub fn executor<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&str>) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.default = self.default.executor(f);
        self
    }

    pub fn context_executor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut SessionContext, Option<&str>) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.default = self.default.context_executor(f);
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.default = self.default.with_executor(executor);
        self
    }

    /// Add a named subcommand
    pub fn subcommand(mut self, descriptor: CommandDescriptor) -> Self {
        self.subcommands.push(descriptor);
        self
    }

    pub fn name(&self) -> &str {
        self.default.name()
    }

    pub fn default_descriptor(&self) -> &CommandDescriptor {
        &self.default
    }

    pub fn subcommands(&self) -> &[CommandDescriptor] {
        &self.subcommands
    }

    pub(crate) fn into_parts(self) -> (CommandDescriptor, Vec<CommandDescriptor>) {
        (self.default, self.subcommands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(items: &[&str]) -> RoleSet {
        items.iter().copied().collect()
    }

    #[test]
    fn test_descriptor_defaults_to_wildcard() {
        let desc = CommandDescriptor::new("status", "Show status");
        assert!(desc.required_roles().is_wildcard());
        assert!(!desc.has_executor());
        assert!(desc.is_authorized(&roles(&["ANYONE"])));
    }

    #[test]
    fn test_descriptor_roles_and_gate() {
        let desc = CommandDescriptor::new("execute", "Execute").roles(["ADMIN"]);
        assert!(desc.is_authorized(&roles(&["ADMIN"])));
        assert!(!desc.is_authorized(&roles(&["USER"])));
        assert!(!desc.is_authorized(&RoleSet::new()));
    }

    #[test]
    fn test_provider_builder() {
        let provider = CommandProvider::new("test", "Test commands")
            .roles(["USER", "ADMIN"])
            .subcommand(CommandDescriptor::new("run", "Run").roles(["USER"]))
            .subcommand(CommandDescriptor::new("execute", "Execute").roles(["ADMIN"]));

        assert_eq!(provider.name(), "test");
        assert!(!provider.default_descriptor().has_executor());
        assert_eq!(provider.subcommands().len(), 2);
        assert!(provider.default_descriptor().required_roles().contains("USER"));
    }

    #[test]
    fn test_bound_executor_runs() {
        let desc = CommandDescriptor::new("ping", "Ping").executor(|_| Ok(Reply::output("pong")));
        let executor = desc.executor_ref().cloned().unwrap();
        let mut ctx = SessionContext::new();

        let reply = tokio_test::block_on(executor.execute(&mut ctx, None)).unwrap();
        assert_eq!(reply, Reply::output("pong"));
    }
}
