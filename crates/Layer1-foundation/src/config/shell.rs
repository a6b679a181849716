//! Shell Config - 셸 설정
//!
//! JSON (camelCase) 파일에서 로드. 모든 필드는 기본값을 가지므로 파일이
//! 없거나 일부만 작성되어도 동작합니다.

use crate::permission::RoleSet;
use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 설정 파일명
pub const SHELL_CONFIG_FILE: &str = "shell.json";

// ============================================================================
// Shell Config (통합)
// ============================================================================

/// OpShell 통합 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellConfig {
    /// 프롬프트 문자열
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// 세션 시작 시 한 번 출력되는 안내 메시지
    #[serde(default = "default_hint")]
    pub hint: String,

    /// 입력에 포함되면 MalformedInput으로 거부되는 기호
    #[serde(default = "default_banned_symbols")]
    pub banned_symbols: Vec<String>,

    /// Highlight 색상 (ANSI adapter)
    #[serde(default = "default_highlight")]
    pub highlight: String,

    /// 로컬 콘솔 세션 설정
    #[serde(default)]
    pub console: ConsoleConfig,

    /// Forward(`| m`) 전달 설정
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            hint: default_hint(),
            banned_symbols: default_banned_symbols(),
            highlight: default_highlight(),
            console: ConsoleConfig::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}

impl ShellConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 설정 로드 (~/.config/opshell/shell.json, 없으면 기본값)
    pub fn load() -> Result<Self> {
        let store = JsonStore::global()?;
        Ok(store
            .load_optional::<ShellConfig>(SHELL_CONFIG_FILE)?
            .unwrap_or_default())
    }

    /// 지정 경로에서 로드 (파일이 없으면 기본값)
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let (dir, file) = split_path(path);
        JsonStore::new(dir).load(&file)
    }

    /// 글로벌 설정 저장
    pub fn save_global(&self) -> Result<()> {
        JsonStore::global()?.save(SHELL_CONFIG_FILE, self)
    }

    /// 지정 경로에 저장
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let (dir, file) = split_path(path);
        JsonStore::new(dir).save(&file, self)
    }
}

fn split_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| SHELL_CONFIG_FILE.to_string());
    (dir, file)
}

// ============================================================================
// Console
// ============================================================================

/// 로컬 콘솔 세션의 신원 (transport가 인증을 대신함)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// 사용자 이름 (없으면 OS 사용자)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// 부여할 role
    #[serde(default = "default_console_roles")]
    pub roles: RoleSet,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            username: None,
            roles: default_console_roles(),
        }
    }
}

// ============================================================================
// Delivery
// ============================================================================

/// Forward stage 전달 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryConfig {
    /// 전달된 출력이 저장될 디렉토리 (없으면 데이터 디렉토리 아래 `outbox`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl DeliveryConfig {
    /// 실제 사용할 디렉토리
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("opshell")
                .join("outbox")
        })
    }
}

// ============================================================================
// Defaults
// ============================================================================

fn default_prompt() -> String {
    "opshell> ".to_string()
}

fn default_hint() -> String {
    "Enter 'help' for a list of supported commands".to_string()
}

fn default_banned_symbols() -> Vec<String> {
    vec!["|".to_string()]
}

fn default_highlight() -> String {
    "yellow".to_string()
}

fn default_console_roles() -> RoleSet {
    RoleSet::any()
}
