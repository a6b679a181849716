//! # Session
//!
//! - [`Connection`] / [`Transport`]: 인증된 연결 경계
//! - [`TerminalLoop`]: 세션 하나의 REPL
//! - [`ShellServer`]: 세션당 task 하나

mod server;
mod terminal;
mod transport;

pub use server::{SessionHandle, ShellServer};
pub use terminal::{SessionExit, TerminalLoop};
pub use transport::{ChannelTransport, Connection, Transport};
