//! The team workspace: one role, one category, three member channels.

use rvbmo_sdk::types::{ChannelId, ChannelKind, RoleId};
use serde::Serialize;

/// Member channels created under every workspace category, in creation order.
pub const MEMBER_CHANNELS: [(&str, ChannelKind); 3] = [
    ("text", ChannelKind::Text),
    ("support", ChannelKind::Text),
    ("voice", ChannelKind::Voice),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    pub name: String,
    pub role: RoleId,
    pub category: ChannelId,
    /// Member channels in `MEMBER_CHANNELS` order.
    pub channels: Vec<ChannelId>,
}

/// Ids created before a provisioning step failed. Nothing is rolled back, so
/// these are what an operator has to clean up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialWorkspace {
    pub name: String,
    pub role: RoleId,
    pub category: Option<ChannelId>,
    pub channels: Vec<ChannelId>,
}

impl PartialWorkspace {
    pub fn new(name: &str, role: RoleId) -> Self {
        Self {
            name: name.to_string(),
            role,
            category: None,
            channels: Vec::new(),
        }
    }
}

impl std::fmt::Display for PartialWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "role {}", self.role)?;
        if let Some(category) = self.category {
            write!(f, ", category {category}")?;
        }
        if !self.channels.is_empty() {
            let ids: Vec<String> = self.channels.iter().map(ToString::to_string).collect();
            write!(f, ", channels {}", ids.join(" "))?;
        }
        Ok(())
    }
}

/// Lowercase, whitespace runs collapsed to `-`. Discord applies the same
/// normalisation to text channel names, so `Team 1` becomes `team-1`.
/// Voice channel names are not normalised by Discord; ours are slugged
/// anyway, so `Alpha` gets `alpha-voice` rather than `Alpha-voice`.
pub fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub fn member_channel_name(workspace: &str, suffix: &str) -> String {
    format!("{}-{suffix}", slug(workspace))
}

/// Label of the n-th (1-based) workspace in a create batch.
pub fn batch_name(n: usize) -> String {
    format!("Team {n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_matches_discord_normalisation() {
        assert_eq!(slug("Team 1"), "team-1");
        assert_eq!(slug("  Blue   Squad "), "blue-squad");
        assert_eq!(slug("alpha"), "alpha");
    }

    #[test]
    fn member_names_follow_suffix_order() {
        let names: Vec<String> = MEMBER_CHANNELS
            .iter()
            .map(|(suffix, _)| member_channel_name("Team 3", suffix))
            .collect();
        assert_eq!(names, vec!["team-3-text", "team-3-support", "team-3-voice"]);
    }

    #[test]
    fn partial_workspace_lists_created_ids() {
        let mut partial = PartialWorkspace::new("Alpha", RoleId(7));
        assert_eq!(partial.to_string(), "role 7");
        partial.category = Some(ChannelId(8));
        partial.channels.push(ChannelId(9));
        assert_eq!(partial.to_string(), "role 7, category 8, channels 9");
    }
}
