//! Permission system for OpShell
//!
//! - `roles`: RoleSet + authorization gate (`"*"` wildcard, deny-by-default)
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use opshell_foundation::permission::{authorize, RoleSet};
//!
//! let required: RoleSet = ["ADMIN"].into_iter().collect();
//! let caller: RoleSet = ["USER"].into_iter().collect();
//! if !authorize(&required, &caller) {
//!     // 거부
//! }
//! ```

mod roles;

pub use roles::{authorize, RoleSet, WILDCARD};
