//! 로컬 콘솔 세션 - stdin/stdout을 하나의 인증된 연결로 취급
//!
//! 콘솔에서는 OS 사용자가 곧 인증된 사용자이고, role은 설정(또는 `--role`)에서
//! 옵니다. Ctrl-C는 세션을 interrupt 합니다.

use crate::ansi::AnsiAdapter;
use async_trait::async_trait;
use opshell_core::{Connection, RoleSet, SessionExit, ShellServer, Transport};
use opshell_foundation::ShellConfig;
use std::sync::Arc;
use tracing::{debug, warn};

/// Transport that yields the console connection exactly once
pub struct ConsoleTransport {
    connection: Option<Connection>,
}

impl ConsoleTransport {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection: Some(connection),
        }
    }

    /// stdin/stdout connection for `username` with ANSI highlighting
    pub fn stdio(username: String, roles: RoleSet, config: &ShellConfig) -> Self {
        let connection = Connection::new(username, roles, tokio::io::stdin(), tokio::io::stdout())
            .with_style(Arc::new(AnsiAdapter::from_name(&config.highlight)));
        Self::new(connection)
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn accept(&mut self) -> Option<Connection> {
        self.connection.take()
    }
}

/// Resolve the console identity: CLI flags first, then config, then the OS user
pub fn identity(config: &ShellConfig, user: Option<String>, roles: Vec<String>) -> (String, RoleSet) {
    let username = user
        .or_else(|| config.console.username.clone())
        .or_else(|| std::env::var("USER").ok())
        .or_else(|| std::env::var("USERNAME").ok())
        .unwrap_or_else(|| "operator".to_string());

    let roles = if roles.is_empty() {
        config.console.roles.clone()
    } else {
        roles.into_iter().collect()
    };
    (username, roles)
}

/// Run the console session until exit, end of input or Ctrl-C
pub async fn run(server: ShellServer, mut transport: ConsoleTransport) -> SessionExit {
    let Some(connection) = transport.accept().await else {
        return SessionExit::EndOfStream;
    };

    let handle = server.spawn_session(connection);
    let interrupt = handle.interrupt_token();
    let ctrl_c = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                debug!("Ctrl-C received");
                interrupt.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let exit = handle.wait().await;
    ctrl_c.abort();
    exit
}
