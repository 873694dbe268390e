//! The capability interface the provisioning core consumes.

use async_trait::async_trait;

use crate::error::PlatformError;
use crate::types::{
    ChannelId, ChannelInfo, ChannelKind, PermissionOverwrite, RoleId, RoleInfo, RoleStyle,
    StatusDocument, StatusTarget,
};

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Operations on one guild, plus editing of the invocation's status message.
///
/// Implementations are scoped to a single guild. Every call completes (or
/// fails) before the caller issues the next one; callers never pipeline.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// The role every member implicitly holds.
    fn everyone_role(&self) -> RoleId;

    /// Create an unstyled role. The returned role already carries `name`.
    async fn create_role(&self, name: &str) -> PlatformResult<RoleInfo>;

    async fn edit_role(&self, id: RoleId, name: &str, style: &RoleStyle) -> PlatformResult<()>;

    async fn create_category(
        &self,
        name: &str,
        overwrites: &[PermissionOverwrite],
    ) -> PlatformResult<ChannelInfo>;

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        parent: ChannelId,
    ) -> PlatformResult<ChannelInfo>;

    /// All channels, ordered by position then id.
    async fn list_channels(&self) -> PlatformResult<Vec<ChannelInfo>>;

    /// All roles, highest position first, ties broken by id.
    async fn list_roles(&self) -> PlatformResult<Vec<RoleInfo>>;

    async fn delete_channel(&self, id: ChannelId) -> PlatformResult<()>;

    async fn delete_role(&self, id: RoleId) -> PlatformResult<()>;

    /// Replace the whole content of the status message behind `target`.
    async fn edit_message(
        &self,
        target: &StatusTarget,
        document: &StatusDocument,
    ) -> PlatformResult<()>;
}
