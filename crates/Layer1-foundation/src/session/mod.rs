//! Session - 세션 단위 상태
//!
//! - `context`: SessionContext (per-session key/value store + I/O helpers)
//! - `keys`: well-known context keys

mod context;

pub use context::{SessionContext, SessionInput, SessionOutput, LINE_ENDING};

/// Well-known context keys
///
/// The terminal loop fills these before the first prompt; commands may add
/// their own keys next to them.
pub mod keys {
    /// `String` - authenticated username
    pub const USERNAME: &str = "username";
    /// `RoleSet` - roles granted by the transport
    pub const ROLES: &str = "roles";
    /// `String` - unique id of the session (logs)
    pub const SESSION_ID: &str = "session_id";
    /// `SessionInput` - operator input stream
    pub const INPUT: &str = "input";
    /// `SessionOutput` - operator output stream
    pub const OUTPUT: &str = "output";
    /// `Arc<dyn OutputAdapter>` - rendering of styled text
    pub const STYLE: &str = "style";
    /// `CancellationToken` - interrupts blocking reads of this session
    pub const INTERRUPT: &str = "interrupt";
    /// `Arc<CommandRegistry>` - read-only registry (help, completion)
    pub const REGISTRY: &str = "registry";
    /// `Arc<Vec<UsageRow>>` - usage rows of the input processor chain
    pub const USAGE: &str = "usage";
}
