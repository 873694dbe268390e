//! Value types shared between the platform backends and the bot core.

use serde::Serialize;

/// Identifier of a role in the target guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RoleId(pub u64);

/// Identifier of a channel (including categories) in the target guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChannelId(pub u64);

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A role as listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
    /// Owned by an integration or the platform itself (bot roles, boosters).
    pub managed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelKind::Text => write!(f, "text"),
            ChannelKind::Voice => write!(f, "voice"),
            ChannelKind::Category => write!(f, "category"),
        }
    }
}

/// A channel as listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    pub kind: ChannelKind,
    /// Parent category, if any.
    pub parent: Option<ChannelId>,
}

impl ChannelInfo {
    pub fn is_category(&self) -> bool {
        self.kind == ChannelKind::Category
    }
}

/// Presentation attributes applied to a freshly created role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleStyle {
    /// RGB colour as a packed integer.
    pub color: u32,
    /// Display members separately in the member list.
    pub hoist: bool,
    pub mentionable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Permission {
    ViewChannel,
    ManageChannels,
}

/// A per-role permission override on a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionOverwrite {
    pub role: RoleId,
    pub allow: Vec<Permission>,
    pub deny: Vec<Permission>,
}

impl PermissionOverwrite {
    pub fn allow(role: RoleId, permissions: &[Permission]) -> Self {
        Self {
            role,
            allow: permissions.to_vec(),
            deny: Vec::new(),
        }
    }

    pub fn deny(role: RoleId, permissions: &[Permission]) -> Self {
        Self {
            role,
            allow: Vec::new(),
            deny: permissions.to_vec(),
        }
    }
}

/// Handle to the single status message of one command invocation.
///
/// On Discord this is the interaction token; editing the target replaces the
/// original interaction response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusTarget(String);

impl StatusTarget {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

/// A fully rendered status message. Every publish replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDocument {
    pub title: String,
    pub body: String,
    pub color: u32,
}
