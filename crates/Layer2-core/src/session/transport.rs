//! Transport boundary - 인증된 연결을 세션 루프에 넘겨주는 쪽
//!
//! 인증 handshake 자체는 transport의 몫입니다. Core는 username, 부여된 role,
//! 입출력 스트림만 받습니다.

use async_trait::async_trait;
use opshell_foundation::{OutputAdapter, RoleSet, SessionInput, SessionOutput};
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, BufReader, DuplexStream};
use tokio::sync::mpsc;

/// Buffer size of in-memory connections
const IN_MEMORY_BUFFER: usize = 64 * 1024;

// ============================================================================
// Connection
// ============================================================================

/// One authenticated operator connection
pub struct Connection {
    pub session_id: String,
    pub username: String,
    pub roles: RoleSet,
    pub input: SessionInput,
    pub output: SessionOutput,
    /// Overrides the loop's output adapter when set
    pub style: Option<Arc<dyn OutputAdapter>>,
}

impl Connection {
    pub fn new<R, W>(username: impl Into<String>, roles: RoleSet, input: R, output: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            roles,
            input: Box::new(BufReader::new(input)),
            output: Box::new(output),
            style: None,
        }
    }

    /// Connection over an in-memory pipe; the returned stream is the operator side
    pub fn in_memory(username: impl Into<String>, roles: RoleSet) -> (Self, DuplexStream) {
        let (server, client) = tokio::io::duplex(IN_MEMORY_BUFFER);
        let (read, write) = tokio::io::split(server);
        (Self::new(username, roles, read, write), client)
    }

    pub fn with_style(mut self, style: Arc<dyn OutputAdapter>) -> Self {
        self.style = Some(style);
        self
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Source of authenticated connections
#[async_trait]
pub trait Transport: Send {
    /// Next connection; `None` once the transport is closed
    ///
    /// Must be cancel-safe: a dropped call must not lose a connection.
    async fn accept(&mut self) -> Option<Connection>;
}

/// Transport fed through a channel (embedding, tests)
pub struct ChannelTransport {
    rx: mpsc::Receiver<Connection>,
}

impl ChannelTransport {
    /// Transport plus the sender that hands it connections
    pub fn new(capacity: usize) -> (Self, mpsc::Sender<Connection>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { rx }, tx)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn accept(&mut self) -> Option<Connection> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_transport_closes_with_sender() {
        let (mut transport, tx) = ChannelTransport::new(4);
        let (conn, _client) = Connection::in_memory("alice", RoleSet::any());
        let id = conn.session_id.clone();
        tx.send(conn).await.unwrap();
        drop(tx);

        let accepted = transport.accept().await.unwrap();
        assert_eq!(accepted.session_id, id);
        assert_eq!(accepted.username, "alice");
        assert!(transport.accept().await.is_none());
    }

    #[test]
    fn test_session_ids_are_unique() {
        let (a, _ca) = Connection::in_memory("a", RoleSet::new());
        let (b, _cb) = Connection::in_memory("a", RoleSet::new());
        assert_ne!(a.session_id, b.session_id);
    }
}
