//! ShellServer - 세션마다 독립된 task를 띄우는 accept loop
//!
//! 세션은 서로 아무것도 공유하지 않습니다 (읽기 전용 registry/chain 제외).
//! 각 세션의 interrupt token은 서버 shutdown token의 child이므로 shutdown 한 번으로
//! 모든 세션의 blocking read가 풀립니다.

use super::{Connection, SessionExit, TerminalLoop, Transport};
use opshell_foundation::SessionContext;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Handle to one spawned session
#[derive(Debug)]
pub struct SessionHandle {
    id: String,
    interrupt: CancellationToken,
    handle: JoinHandle<SessionExit>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Unblock the session's pending read and end it
    pub fn interrupt(&self) {
        self.interrupt.cancel();
    }

    pub fn interrupt_token(&self) -> CancellationToken {
        self.interrupt.clone()
    }

    /// Wait for the session to end
    pub async fn wait(self) -> SessionExit {
        match self.handle.await {
            Ok(exit) => exit,
            Err(e) => {
                error!("Session {} task failed: {}", self.id, e);
                SessionExit::Internal(e.to_string())
            }
        }
    }
}

/// Runs sessions on their own tasks
#[derive(Debug, Clone)]
pub struct ShellServer {
    terminal: Arc<TerminalLoop>,
    shutdown: CancellationToken,
    /// Sessions `serve` still holds a task slot for
    tracked: Arc<AtomicUsize>,
}

impl ShellServer {
    pub fn new(terminal: TerminalLoop) -> Self {
        Self {
            terminal: Arc::new(terminal),
            shutdown: CancellationToken::new(),
            tracked: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn terminal(&self) -> &Arc<TerminalLoop> {
        &self.terminal
    }

    /// Cancelling this token stops `serve` and interrupts every session
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Sessions accepted by `serve` that have not been reaped yet
    pub fn tracked_sessions(&self) -> usize {
        self.tracked.load(Ordering::Relaxed)
    }

    pub fn shutdown(&self) {
        info!("Shell server shutting down");
        self.shutdown.cancel();
    }

    /// Spawn one session on its own task
    pub fn spawn_session(&self, connection: Connection) -> SessionHandle {
        let id = connection.session_id.clone();
        let interrupt = self.shutdown.child_token();
        let terminal = self.terminal.clone();
        let token = interrupt.clone();

        let handle = tokio::spawn(async move {
            let mut ctx = SessionContext::new();
            terminal.run_with(&mut ctx, connection, token).await
        });

        SessionHandle {
            id,
            interrupt,
            handle,
        }
    }

    /// Accept connections until the transport closes or shutdown is requested,
    /// then wait for every session. Returns the number of sessions served.
    ///
    /// Finished sessions are reaped while accepting. `Transport::accept` must
    /// be cancel-safe.
    pub async fn serve<T: Transport>(&self, mut transport: T) -> usize {
        let mut sessions: JoinSet<SessionExit> = JoinSet::new();
        let mut served = 0usize;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    reap(joined);
                }
                connection = transport.accept() => {
                    let Some(connection) = connection else {
                        debug!("Transport closed");
                        break;
                    };
                    served += 1;
                    let handle = self.spawn_session(connection);
                    sessions.spawn(handle.wait());
                }
            }
            self.tracked.store(sessions.len(), Ordering::Relaxed);
        }

        while let Some(joined) = sessions.join_next().await {
            reap(joined);
            self.tracked.store(sessions.len(), Ordering::Relaxed);
        }
        info!("Served {} sessions", served);
        served
    }
}

fn reap(joined: Result<SessionExit, JoinError>) {
    match joined {
        Ok(exit) => debug!("Session reaped: {}", exit),
        Err(e) => error!("Session join failed: {}", e),
    }
}
