//! # opshell-foundation
//!
//! Foundation layer for OpShell:
//! - Error: 공통 에러 타입
//! - Config: ShellConfig (JSON) + JsonStore
//! - Permission: RoleSet + authorization gate
//! - Session: 세션별 격리된 SessionContext
//! - Style: styled text / OutputAdapter 계약
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Transport (SSH 등, 외부)                                │
//! │      │  input / output / username / roles              │
//! │      ▼                                                  │
//! │  SessionContext (세션 1개 = task 1개, 공유 없음)          │
//! │      │                                                  │
//! │      ▼                                                  │
//! │  opshell-core: Processor Chain → Dispatcher → Registry  │
//! │                          │                              │
//! │                 Permission (RoleSet, "*")                │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod permission;
pub mod session;
pub mod storage;
pub mod style;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{ConsoleConfig, DeliveryConfig, ShellConfig, SHELL_CONFIG_FILE};

// ============================================================================
// Permission (권한)
// ============================================================================
pub use permission::{authorize, RoleSet, WILDCARD};

// ============================================================================
// Session (세션 상태)
// ============================================================================
pub use session::{keys as context_keys, SessionContext, SessionInput, SessionOutput};

// ============================================================================
// Storage / Style
// ============================================================================
pub use storage::JsonStore;
pub use style::{MarkerAdapter, OutputAdapter, PlainAdapter, Span, StyledText};
