//! In-memory guild backend (for testing and dry runs).
//!
//! Keeps roles and channels in insertion order, logs every call, and can be
//! told to fail the next call of a given operation.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::PlatformError;
use crate::platform::{PlatformClient, PlatformResult};
use crate::types::{
    ChannelId, ChannelInfo, ChannelKind, PermissionOverwrite, RoleId, RoleInfo, RoleStyle,
    StatusDocument, StatusTarget,
};

/// Guild id of the in-memory guild; also the id of its `@everyone` role.
pub const GUILD_ID: u64 = 1;

/// Operation kinds, used for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CreateRole,
    EditRole,
    CreateCategory,
    CreateChannel,
    ListChannels,
    ListRoles,
    DeleteChannel,
    DeleteRole,
    EditMessage,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::CreateRole => "create_role",
            Op::EditRole => "edit_role",
            Op::CreateCategory => "create_category",
            Op::CreateChannel => "create_channel",
            Op::ListChannels => "list_channels",
            Op::ListRoles => "list_roles",
            Op::DeleteChannel => "delete_channel",
            Op::DeleteRole => "delete_role",
            Op::EditMessage => "edit_message",
        }
    }
}

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateRole { name: String },
    EditRole { id: RoleId, name: String, style: RoleStyle },
    CreateCategory { name: String, overwrites: Vec<PermissionOverwrite> },
    CreateChannel { name: String, kind: ChannelKind, parent: ChannelId },
    ListChannels,
    ListRoles,
    DeleteChannel(ChannelId),
    DeleteRole(RoleId),
    EditMessage { target: String, title: String },
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Call::CreateRole { .. } => Op::CreateRole,
            Call::EditRole { .. } => Op::EditRole,
            Call::CreateCategory { .. } => Op::CreateCategory,
            Call::CreateChannel { .. } => Op::CreateChannel,
            Call::ListChannels => Op::ListChannels,
            Call::ListRoles => Op::ListRoles,
            Call::DeleteChannel(_) => Op::DeleteChannel,
            Call::DeleteRole(_) => Op::DeleteRole,
            Call::EditMessage { .. } => Op::EditMessage,
        }
    }

    /// True for calls that change guild state (everything but listings and
    /// status edits).
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Call::ListChannels | Call::ListRoles | Call::EditMessage { .. }
        )
    }
}

struct State {
    next_id: u64,
    roles: Vec<RoleInfo>,
    channels: Vec<ChannelInfo>,
    calls: Vec<Call>,
    documents: HashMap<StatusTarget, Vec<StatusDocument>>,
    failures: HashMap<Op, usize>,
}

impl State {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Log the call, then consume a pending injected failure for its op.
    fn record(&mut self, call: Call) -> PlatformResult<()> {
        let op = call.op();
        self.calls.push(call);
        if let Some(remaining) = self.failures.get_mut(&op)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(PlatformError::Call {
                op: op.name(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

/// An in-process guild.
pub struct MemoryPlatform {
    state: Mutex<State>,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlatform {
    /// A guild holding only its `@everyone` role.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                roles: vec![RoleInfo {
                    id: RoleId(GUILD_ID),
                    name: "@everyone".to_string(),
                    managed: false,
                }],
                channels: Vec::new(),
                calls: Vec::new(),
                documents: HashMap::new(),
                failures: HashMap::new(),
            }),
        }
    }

    /// Seed a role without logging a call.
    pub fn add_role(&self, name: &str) -> RoleId {
        self.insert_role(name, false)
    }

    /// Seed an integration-owned role without logging a call.
    pub fn add_managed_role(&self, name: &str) -> RoleId {
        self.insert_role(name, true)
    }

    fn insert_role(&self, name: &str, managed: bool) -> RoleId {
        let mut state = self.state.lock();
        let id = RoleId(state.allocate());
        state.roles.push(RoleInfo {
            id,
            name: name.to_string(),
            managed,
        });
        id
    }

    /// Seed a channel without logging a call.
    pub fn add_channel(&self, name: &str, kind: ChannelKind, parent: Option<ChannelId>) -> ChannelId {
        let mut state = self.state.lock();
        let id = ChannelId(state.allocate());
        state.channels.push(ChannelInfo {
            id,
            name: name.to_string(),
            kind,
            parent,
        });
        id
    }

    /// Make the next `count` calls of `op` fail.
    pub fn fail_next(&self, op: Op, count: usize) {
        *self.state.lock().failures.entry(op).or_insert(0) += count;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.state.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn roles(&self) -> Vec<RoleInfo> {
        self.state.lock().roles.clone()
    }

    pub fn channels(&self) -> Vec<ChannelInfo> {
        self.state.lock().channels.clone()
    }

    /// Every document published to `target`, oldest first.
    pub fn documents(&self, target: &StatusTarget) -> Vec<StatusDocument> {
        self.state
            .lock()
            .documents
            .get(target)
            .cloned()
            .unwrap_or_default()
    }

    pub fn last_document(&self, target: &StatusTarget) -> Option<StatusDocument> {
        self.documents(target).pop()
    }
}

#[async_trait]
impl PlatformClient for MemoryPlatform {
    fn everyone_role(&self) -> RoleId {
        RoleId(GUILD_ID)
    }

    async fn create_role(&self, name: &str) -> PlatformResult<RoleInfo> {
        let mut state = self.state.lock();
        state.record(Call::CreateRole {
            name: name.to_string(),
        })?;
        let role = RoleInfo {
            id: RoleId(state.allocate()),
            name: name.to_string(),
            managed: false,
        };
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn edit_role(&self, id: RoleId, name: &str, style: &RoleStyle) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.record(Call::EditRole {
            id,
            name: name.to_string(),
            style: style.clone(),
        })?;
        let role = state
            .roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(PlatformError::Missing { kind: "role", id: id.0 })?;
        role.name = name.to_string();
        Ok(())
    }

    async fn create_category(
        &self,
        name: &str,
        overwrites: &[PermissionOverwrite],
    ) -> PlatformResult<ChannelInfo> {
        let mut state = self.state.lock();
        state.record(Call::CreateCategory {
            name: name.to_string(),
            overwrites: overwrites.to_vec(),
        })?;
        let channel = ChannelInfo {
            id: ChannelId(state.allocate()),
            name: name.to_string(),
            kind: ChannelKind::Category,
            parent: None,
        };
        state.channels.push(channel.clone());
        Ok(channel)
    }

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        parent: ChannelId,
    ) -> PlatformResult<ChannelInfo> {
        let mut state = self.state.lock();
        state.record(Call::CreateChannel {
            name: name.to_string(),
            kind,
            parent,
        })?;
        if !state.channels.iter().any(|c| c.id == parent && c.is_category()) {
            return Err(PlatformError::Missing {
                kind: "category",
                id: parent.0,
            });
        }
        let channel = ChannelInfo {
            id: ChannelId(state.allocate()),
            name: name.to_string(),
            kind,
            parent: Some(parent),
        };
        state.channels.push(channel.clone());
        Ok(channel)
    }

    async fn list_channels(&self) -> PlatformResult<Vec<ChannelInfo>> {
        let mut state = self.state.lock();
        state.record(Call::ListChannels)?;
        Ok(state.channels.clone())
    }

    async fn list_roles(&self) -> PlatformResult<Vec<RoleInfo>> {
        let mut state = self.state.lock();
        state.record(Call::ListRoles)?;
        Ok(state.roles.clone())
    }

    async fn delete_channel(&self, id: ChannelId) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.record(Call::DeleteChannel(id))?;
        let before = state.channels.len();
        state.channels.retain(|c| c.id != id);
        if state.channels.len() == before {
            return Err(PlatformError::Missing { kind: "channel", id: id.0 });
        }
        // Discord orphans children of a deleted category
        for c in state.channels.iter_mut() {
            if c.parent == Some(id) {
                c.parent = None;
            }
        }
        Ok(())
    }

    async fn delete_role(&self, id: RoleId) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.record(Call::DeleteRole(id))?;
        let before = state.roles.len();
        state.roles.retain(|r| r.id != id);
        if state.roles.len() == before {
            return Err(PlatformError::Missing { kind: "role", id: id.0 });
        }
        Ok(())
    }

    async fn edit_message(
        &self,
        target: &StatusTarget,
        document: &StatusDocument,
    ) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.record(Call::EditMessage {
            target: target.token().to_string(),
            title: document.title.clone(),
        })?;
        state
            .documents
            .entry(target.clone())
            .or_default()
            .push(document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn injected_failure_is_one_shot() {
        let platform = MemoryPlatform::new();
        platform.fail_next(Op::CreateRole, 1);

        let err = platform.create_role("Alpha").await.unwrap_err();
        assert!(matches!(err, PlatformError::Call { op: "create_role", .. }));
        assert!(platform.create_role("Alpha").await.is_ok());
        assert_eq!(platform.count(Op::CreateRole), 2);
        assert_eq!(platform.roles().len(), 2, "@everyone plus one created role");
    }

    #[tokio::test]
    async fn channel_requires_existing_category() {
        let platform = MemoryPlatform::new();
        let text = platform.add_channel("general", ChannelKind::Text, None);
        let err = platform
            .create_channel("alpha-text", ChannelKind::Text, text)
            .await
            .unwrap_err();
        assert_eq!(err, PlatformError::Missing { kind: "category", id: text.0 });
    }

    #[tokio::test]
    async fn deleting_category_orphans_children() {
        let platform = MemoryPlatform::new();
        let cat = platform.add_channel("Alpha", ChannelKind::Category, None);
        let child = platform.add_channel("alpha-text", ChannelKind::Text, Some(cat));

        platform.delete_channel(cat).await.unwrap();
        let channels = platform.channels();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].id, child);
        assert_eq!(channels[0].parent, None);
    }

    #[tokio::test]
    async fn deleting_unknown_role_reports_missing() {
        let platform = MemoryPlatform::new();
        let err = platform.delete_role(RoleId(999)).await.unwrap_err();
        assert_eq!(err, PlatformError::Missing { kind: "role", id: 999 });
        assert_eq!(platform.calls(), vec![Call::DeleteRole(RoleId(999))]);
    }
}
