//! Discord backend over serenity's HTTP client.
//!
//! One `DiscordPlatform` is bound to one guild. Status edits go through the
//! interaction webhook, so the bot needs no message permissions in the
//! invoking channel.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{CreateChannel, EditRole};
use serenity::http::Http;
use serenity::model::channel::{
    ChannelType, GuildChannel, PermissionOverwrite as DcOverwrite, PermissionOverwriteType,
};
use serenity::model::guild::Role;
use serenity::model::id::{ChannelId as DcChannelId, GuildId, RoleId as DcRoleId};
use serenity::model::permissions::Permissions;

use crate::error::PlatformError;
use crate::platform::{PlatformClient, PlatformResult};
use crate::types::{
    ChannelId, ChannelInfo, ChannelKind, Permission, PermissionOverwrite, RoleId, RoleInfo,
    RoleStyle, StatusDocument, StatusTarget,
};

/// A guild reached through serenity's REST client.
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
    guild: GuildId,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>, guild: u64) -> Self {
        Self {
            http,
            guild: GuildId::new(guild),
        }
    }
}

fn permissions(set: &[Permission]) -> Permissions {
    set.iter().fold(Permissions::empty(), |acc, p| {
        acc | match p {
            Permission::ViewChannel => Permissions::VIEW_CHANNEL,
            Permission::ManageChannels => Permissions::MANAGE_CHANNELS,
        }
    })
}

fn to_overwrite(o: &PermissionOverwrite) -> DcOverwrite {
    DcOverwrite {
        allow: permissions(&o.allow),
        deny: permissions(&o.deny),
        kind: PermissionOverwriteType::Role(DcRoleId::new(o.role.0)),
    }
}

fn kind_to_dc(kind: ChannelKind) -> ChannelType {
    match kind {
        ChannelKind::Text => ChannelType::Text,
        ChannelKind::Voice => ChannelType::Voice,
        ChannelKind::Category => ChannelType::Category,
    }
}

fn channel_info(c: &GuildChannel) -> ChannelInfo {
    let kind = match c.kind {
        ChannelType::Category => ChannelKind::Category,
        ChannelType::Voice | ChannelType::Stage => ChannelKind::Voice,
        _ => ChannelKind::Text,
    };
    ChannelInfo {
        id: ChannelId(c.id.get()),
        name: c.name.clone(),
        kind,
        parent: c.parent_id.map(|p| ChannelId(p.get())),
    }
}

fn role_info(r: &Role) -> RoleInfo {
    RoleInfo {
        id: RoleId(r.id.get()),
        name: r.name.clone(),
        managed: r.managed,
    }
}

#[async_trait]
impl PlatformClient for DiscordPlatform {
    fn everyone_role(&self) -> RoleId {
        // @everyone shares the guild's snowflake
        RoleId(self.guild.get())
    }

    async fn create_role(&self, name: &str) -> PlatformResult<RoleInfo> {
        let role = self
            .guild
            .create_role(self.http.as_ref(), EditRole::new().name(name))
            .await
            .map_err(|e| PlatformError::call("create_role", e))?;
        Ok(role_info(&role))
    }

    async fn edit_role(&self, id: RoleId, name: &str, style: &RoleStyle) -> PlatformResult<()> {
        let builder = EditRole::new()
            .name(name)
            .colour(style.color)
            .hoist(style.hoist)
            .mentionable(style.mentionable);
        self.guild
            .edit_role(self.http.as_ref(), DcRoleId::new(id.0), builder)
            .await
            .map_err(|e| PlatformError::call("edit_role", e))?;
        Ok(())
    }

    async fn create_category(
        &self,
        name: &str,
        overwrites: &[PermissionOverwrite],
    ) -> PlatformResult<ChannelInfo> {
        let builder = CreateChannel::new(name)
            .kind(ChannelType::Category)
            .permissions(overwrites.iter().map(to_overwrite));
        let channel = self
            .guild
            .create_channel(self.http.as_ref(), builder)
            .await
            .map_err(|e| PlatformError::call("create_category", e))?;
        Ok(channel_info(&channel))
    }

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        parent: ChannelId,
    ) -> PlatformResult<ChannelInfo> {
        let builder = CreateChannel::new(name)
            .kind(kind_to_dc(kind))
            .category(DcChannelId::new(parent.0));
        let channel = self
            .guild
            .create_channel(self.http.as_ref(), builder)
            .await
            .map_err(|e| PlatformError::call("create_channel", e))?;
        Ok(channel_info(&channel))
    }

    async fn list_channels(&self) -> PlatformResult<Vec<ChannelInfo>> {
        let channels = self
            .guild
            .channels(self.http.as_ref())
            .await
            .map_err(|e| PlatformError::call("list_channels", e))?;
        let mut sorted: Vec<&GuildChannel> = channels.values().collect();
        sorted.sort_by_key(|c| (c.position, c.id.get()));
        Ok(sorted.into_iter().map(channel_info).collect())
    }

    async fn list_roles(&self) -> PlatformResult<Vec<RoleInfo>> {
        let roles = self
            .guild
            .roles(self.http.as_ref())
            .await
            .map_err(|e| PlatformError::call("list_roles", e))?;
        let mut sorted: Vec<&Role> = roles.values().collect();
        sorted.sort_by_key(|r| (std::cmp::Reverse(r.position), r.id.get()));
        Ok(sorted.into_iter().map(role_info).collect())
    }

    async fn delete_channel(&self, id: ChannelId) -> PlatformResult<()> {
        DcChannelId::new(id.0)
            .delete(self.http.as_ref())
            .await
            .map_err(|e| PlatformError::call("delete_channel", e))?;
        Ok(())
    }

    async fn delete_role(&self, id: RoleId) -> PlatformResult<()> {
        self.guild
            .delete_role(self.http.as_ref(), DcRoleId::new(id.0))
            .await
            .map_err(|e| PlatformError::call("delete_role", e))
    }

    async fn edit_message(
        &self,
        target: &StatusTarget,
        document: &StatusDocument,
    ) -> PlatformResult<()> {
        let body = serde_json::json!({
            "embeds": [{
                "type": "rich",
                "title": document.title,
                "description": document.body,
                "color": document.color,
            }]
        });
        self.http
            .edit_original_interaction_response(target.token(), &body, Vec::new())
            .await
            .map_err(|e| PlatformError::call("edit_message", e))?;
        tracing::debug!(title = %document.title, "Status message updated");
        Ok(())
    }
}
