//! Error types for OpShell
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// OpShell 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // Command registry 관련 (startup 시점의 치명적 에러)
    // ========================================================================
    #[error("Duplicate command: '{0}' is registered by more than one provider")]
    DuplicateCommand(String),

    #[error("Duplicate subcommand: '{command} {subcommand}' is registered twice")]
    DuplicateSubcommand { command: String, subcommand: String },

    #[error("Command '{0}' has neither a default executor nor any subcommand")]
    EmptyCommand(String),

    #[error("Invalid command name: '{0}'")]
    InvalidCommandName(String),

    // ========================================================================
    // Input processor 관련
    // ========================================================================
    #[error("Invalid processor pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    // ========================================================================
    // Session 관련
    // ========================================================================
    #[error("Session context is missing '{0}'")]
    MissingContext(&'static str),

    #[error("Session interrupted")]
    Interrupted,

    // ========================================================================
    // Delivery 관련
    // ========================================================================
    #[error("Delivery to '{destination}' failed: {message}")]
    Delivery {
        destination: String,
        message: String,
    },

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::Delivery { .. } | Error::Interrupted)
    }

    /// 레지스트리 빌드 실패 (서비스 시작 중단 사유)
    pub fn is_fatal_build_error(&self) -> bool {
        matches!(
            self,
            Error::DuplicateCommand(_)
                | Error::DuplicateSubcommand { .. }
                | Error::EmptyCommand(_)
                | Error::InvalidCommandName(_)
                | Error::InvalidPattern { .. }
        )
    }

    /// Delivery 에러 생성 헬퍼
    pub fn delivery(destination: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Delivery {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Duplicate subcommand 에러 생성 헬퍼
    pub fn duplicate_subcommand(command: impl Into<String>, subcommand: impl Into<String>) -> Self {
        Error::DuplicateSubcommand {
            command: command.into(),
            subcommand: subcommand.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_errors_are_fatal() {
        assert!(Error::DuplicateCommand("echo".into()).is_fatal_build_error());
        assert!(Error::duplicate_subcommand("echo", "bob").is_fatal_build_error());
        assert!(!Error::Interrupted.is_fatal_build_error());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::duplicate_subcommand("test", "run");
        assert_eq!(
            err.to_string(),
            "Duplicate subcommand: 'test run' is registered twice"
        );

        let err = Error::delivery("ops", "disk full");
        assert!(err.is_user_facing());
        assert_eq!(err.to_string(), "Delivery to 'ops' failed: disk full");
    }
}
