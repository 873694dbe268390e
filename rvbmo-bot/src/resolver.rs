//! Maps a workspace name to its live resources by scanning guild state.
//!
//! Nothing is persisted across restarts: the category is found by exact name,
//! members by parent id. Renaming either outside the bot breaks resolution.
//! When names collide the first match in listing order wins; listings are
//! ordered by the platform, so the choice is deterministic.

use std::sync::Arc;

use rvbmo_sdk::PlatformClient;
use rvbmo_sdk::types::{ChannelId, ChannelInfo, RoleInfo};

use crate::error::PodError;

/// First category named exactly `name`.
pub fn find_category<'a>(channels: &'a [ChannelInfo], name: &str) -> Option<&'a ChannelInfo> {
    let mut matches = channels.iter().filter(|c| c.is_category() && c.name == name);
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        tracing::warn!(
            workspace = name,
            duplicates = extra + 1,
            chosen = %first.id,
            "Several categories share this name; using the first"
        );
    }
    Some(first)
}

/// First role named exactly `name`.
pub fn find_role<'a>(roles: &'a [RoleInfo], name: &str) -> Option<&'a RoleInfo> {
    let mut matches = roles.iter().filter(|r| r.name == name);
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        tracing::warn!(
            role = name,
            duplicates = extra + 1,
            chosen = %first.id,
            "Several roles share this name; using the first"
        );
    }
    Some(first)
}

/// Channels parented to `category`, in listing order.
pub fn members(channels: &[ChannelInfo], category: ChannelId) -> Vec<ChannelId> {
    channels
        .iter()
        .filter(|c| c.parent == Some(category))
        .map(|c| c.id)
        .collect()
}

pub struct WorkspaceResolver {
    platform: Arc<dyn PlatformClient>,
}

impl WorkspaceResolver {
    pub fn new(platform: Arc<dyn PlatformClient>) -> Self {
        Self { platform }
    }

    /// Category id of the workspace called `name`.
    pub async fn resolve(&self, name: &str) -> Result<ChannelId, PodError> {
        let channels = self.platform.list_channels().await?;
        find_category(&channels, name)
            .map(|c| c.id)
            .ok_or_else(|| PodError::not_found("category", name))
    }

    pub async fn resolve_role(&self, name: &str) -> Result<RoleInfo, PodError> {
        let roles = self.platform.list_roles().await?;
        find_role(&roles, name)
            .cloned()
            .ok_or_else(|| PodError::not_found("role", name))
    }
}
