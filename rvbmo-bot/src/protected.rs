//! Names that bulk deletion must never touch.

use std::collections::BTreeSet;

use rvbmo_sdk::types::RoleInfo;

/// Reserved role names used when none are configured.
pub const DEFAULT_RESERVED: [&str; 4] = ["Green Team", "Red Team", "RvBMo", "Public"];

/// Any name containing one of these (case-insensitive) is protected.
const RESERVED_FRAGMENTS: [&str; 1] = ["everyone"];

/// An explicit deny list: exact reserved names plus reserved fragments.
#[derive(Debug, Clone)]
pub struct ProtectedNames {
    reserved: BTreeSet<String>,
}

impl Default for ProtectedNames {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED)
    }
}

impl ProtectedNames {
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: reserved.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        if self.reserved.contains(name) {
            return true;
        }
        let lower = name.to_lowercase();
        RESERVED_FRAGMENTS.iter().any(|f| lower.contains(f))
    }

    /// Managed roles belong to integrations and are always protected.
    pub fn is_protected_role(&self, role: &RoleInfo) -> bool {
        role.managed || self.is_protected(&role.name)
    }

    pub fn reserved(&self) -> impl Iterator<Item = &str> {
        self.reserved.iter().map(String::as_str)
    }
}
