//! Role sets and the authorization gate
//!
//! Role은 불투명한 문자열 라벨이며, `"*"`는 모든 role과 일치합니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Wildcard role - matches any role on either side of a check
pub const WILDCARD: &str = "*";

/// Set of role labels, kept sorted for stable listings and logs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// Empty set (never authorizes anything on its own)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set containing only the wildcard
    pub fn any() -> Self {
        Self::from_iter([WILDCARD])
    }

    /// Add a role
    pub fn insert(&mut self, role: impl Into<String>) -> bool {
        self.0.insert(role.into())
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    /// Whether the wildcard is present
    pub fn is_wildcard(&self) -> bool {
        self.0.contains(WILDCARD)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    /// Whether the two sets share at least one role
    pub fn intersects(&self, other: &RoleSet) -> bool {
        self.0.iter().any(|role| other.0.contains(role))
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles: Vec<&str> = self.iter().collect();
        write!(f, "[{}]", roles.join(", "))
    }
}

/// Authorization gate
///
/// `required` 또는 `caller`에 wildcard가 있거나, 두 집합이 교집합을 가지면 허용.
/// 빈 집합은 (wildcard가 없는 한) 항상 거부 - deny-by-default.
pub fn authorize(required: &RoleSet, caller: &RoleSet) -> bool {
    required.is_wildcard() || caller.is_wildcard() || required.intersects(caller)
}
