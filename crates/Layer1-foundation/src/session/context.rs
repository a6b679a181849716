//! SessionContext - per-session key/value store
//!
//! 세션 하나에만 속하는 저장소. 세션 task가 소유하며 다른 세션과 공유되지 않음
//! (동기화 없음). Well-known key 위에 typed accessor를 제공합니다.

use super::keys;
use crate::permission::RoleSet;
use crate::style::{OutputAdapter, PlainAdapter, StyledText};
use crate::{Error, Result};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Operator input stream of a session
pub type SessionInput = Box<dyn AsyncBufRead + Send + Unpin>;

/// Operator output stream of a session
pub type SessionOutput = Box<dyn AsyncWrite + Send + Unpin>;

/// Line terminator written after every message
pub const LINE_ENDING: &str = "\n";

/// Per-session isolated key/value store
#[derive(Default)]
pub struct SessionContext {
    values: HashMap<String, Box<dyn Any + Send>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Opaque store
    // ========================================================================

    /// Store a value, replacing any previous value under the same key
    pub fn set<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Value under `key`, if present and of type `T`
    pub fn get<T: Any + Send>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any + Send>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.downcast_mut::<T>()
    }

    /// Remove a value; returns whether something was stored under `key`
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Remove and return a typed value
    ///
    /// A value of another type is left in place.
    pub fn take<T: Any + Send>(&mut self, key: &str) -> Option<T> {
        if !self.values.get(key)?.is::<T>() {
            return None;
        }
        let boxed = self.values.remove(key)?;
        boxed.downcast::<T>().ok().map(|value| *value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Drop every value (including the I/O handles)
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Authenticated username
    pub fn username(&self) -> Option<&str> {
        self.get::<String>(keys::USERNAME).map(|s| s.as_str())
    }

    /// Roles granted by the transport
    pub fn roles(&self) -> Option<&RoleSet> {
        self.get::<RoleSet>(keys::ROLES)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.get::<String>(keys::SESSION_ID).map(|s| s.as_str())
    }

    // ========================================================================
    // Style
    // ========================================================================

    /// Output adapter of this session (plain when none was installed)
    pub fn style(&self) -> Arc<dyn OutputAdapter> {
        self.get::<Arc<dyn OutputAdapter>>(keys::STYLE)
            .cloned()
            .unwrap_or_else(|| Arc::new(PlainAdapter))
    }

    /// Render styled text through the session's adapter
    pub fn render(&self, text: &StyledText) -> String {
        self.style().render(text)
    }

    // ========================================================================
    // Interruption
    // ========================================================================

    /// Token that interrupts this session's blocking reads
    pub fn interrupt_token(&self) -> CancellationToken {
        self.get::<CancellationToken>(keys::INTERRUPT)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_interrupted(&self) -> bool {
        self.get::<CancellationToken>(keys::INTERRUPT)
            .map(|token| token.is_cancelled())
            .unwrap_or(false)
    }

    // ========================================================================
    // I/O
    // ========================================================================

    /// Block until the operator sends one line
    ///
    /// Returns `Ok(None)` at end of stream and `Err(Error::Interrupted)` when
    /// the session's interrupt token fires first. The line terminator is
    /// stripped; invalid UTF-8 is replaced with U+FFFD instead of failing.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let token = self.interrupt_token();
        let input = self
            .get_mut::<SessionInput>(keys::INPUT)
            .ok_or(Error::MissingContext(keys::INPUT))?;

        let mut buf = Vec::new();
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Interrupted),
            read = input.read_until(b'\n', &mut buf) => {
                if read? == 0 {
                    return Ok(None);
                }
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
            }
        }
    }

    /// Write `message` (no line ending) and wait for the operator's answer
    pub async fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        self.write(message).await?;
        self.read_line().await
    }

    /// Write raw text and flush
    pub async fn write(&mut self, text: &str) -> Result<()> {
        let output = self
            .get_mut::<SessionOutput>(keys::OUTPUT)
            .ok_or(Error::MissingContext(keys::OUTPUT))?;
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }

    /// Write text followed by the line ending
    pub async fn write_line(&mut self, text: &str) -> Result<()> {
        let mut buf = String::with_capacity(text.len() + LINE_ENDING.len());
        buf.push_str(text);
        buf.push_str(LINE_ENDING);
        self.write(&buf).await
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        f.debug_struct("SessionContext")
            .field("username", &self.username())
            .field("keys", &keys)
            .finish()
    }
}
