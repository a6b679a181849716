//! # opshell-core
//!
//! Layer2 - OpShell 명령어 런타임
//!
//! # 주요 모듈
//!
//! - `command`: CommandDescriptor / CommandProvider / CommandExecutor
//! - `registry`: 빌드 후 변경되지 않는 계층형 명령어 레지스트리
//! - `dispatch`: 토큰 분리 → 권한 확인 → 실행
//! - `processor`: 입력 처리 체인 (`| h` highlight, `| m` forward, 기본 dispatch)
//! - `builtin`: `help`, `exit`
//! - `delivery`: Forward stage의 전달 collaborator
//! - `session`: Connection / TerminalLoop / ShellServer
//!
//! # 사용 예시
//!
//! ```ignore
//! use opshell_core::{CommandProvider, CommandRegistry, Dispatcher, ProcessorChain, Reply};
//! use opshell_core::{Connection, TerminalLoop};
//!
//! let registry = Arc::new(CommandRegistry::with_builtins(vec![
//!     CommandProvider::new("echo", "Echo").executor(|arg| Ok(Reply::output(arg.unwrap_or("")))),
//! ])?);
//!
//! let chain = ProcessorChain::builder()
//!     .highlight()?
//!     .build(Dispatcher::new(registry))?;
//!
//! let terminal = TerminalLoop::new(Arc::new(chain));
//! let exit = terminal.run(connection).await;
//! ```

pub mod builtin;
pub mod command;
pub mod delivery;
pub mod dispatch;
pub mod processor;
pub mod registry;
pub mod session;

// Re-exports: Command
pub use command::{
    CommandDescriptor, CommandExecutor, CommandProvider, ContextFnExecutor, FnExecutor, Reply,
};

// Re-exports: Registry / Dispatch
pub use dispatch::{DispatchError, DispatchResult, Dispatcher, ParsedLine};
pub use registry::{CommandEntry, CommandRegistry};

// Re-exports: Processor
pub use processor::{
    ChainOutcome, ProcessorChain, ProcessorChainBuilder, Stage, StageKind, UsageRow,
    DEFAULT_STAGE_PRIORITY,
};

// Re-exports: Delivery
pub use delivery::{Delivery, DirectoryDelivery};

// Re-exports: Session
pub use session::{
    ChannelTransport, Connection, SessionExit, SessionHandle, ShellServer, TerminalLoop, Transport,
};

// Re-exports: Foundation (편의용)
pub use opshell_foundation::{
    context_keys, Error, OutputAdapter, Result, RoleSet, SessionContext, ShellConfig, StyledText,
};
