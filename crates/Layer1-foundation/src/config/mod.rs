//! Config - 통합 설정 관리
//!
//! - `shell.rs` - ShellConfig (프롬프트, 콘솔 신원, delivery 등)

mod shell;

pub use shell::{ConsoleConfig, DeliveryConfig, ShellConfig, SHELL_CONFIG_FILE};
