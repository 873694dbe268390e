//! Deletes one workspace: member channels, then the category, then the role.
//!
//! Deletions are independent. A failed delete is recorded and the remaining
//! ones still run; the job fails afterwards with every failure listed.

use std::sync::Arc;

use rvbmo_sdk::PlatformClient;
use rvbmo_sdk::types::{ChannelId, RoleId};

use crate::error::PodError;
use crate::job::JobStatus;
use crate::progress::JobCursor;
use crate::registry::WorkspaceRegistry;
use crate::resolver::{self, WorkspaceResolver};

pub struct DeprovisioningEngine {
    platform: Arc<dyn PlatformClient>,
    resolver: WorkspaceResolver,
    registry: Arc<WorkspaceRegistry>,
}

impl DeprovisioningEngine {
    pub fn new(platform: Arc<dyn PlatformClient>, registry: Arc<WorkspaceRegistry>) -> Self {
        Self {
            resolver: WorkspaceResolver::new(platform.clone()),
            platform,
            registry,
        }
    }

    /// Delete the workspace called `name`. `role` short-cuts the role lookup
    /// when the caller already knows which role backs the workspace.
    pub async fn delete_workspace(
        &self,
        name: &str,
        role: Option<RoleId>,
        cursor: &mut JobCursor<'_>,
    ) -> Result<(), PodError> {
        cursor.advance(JobStatus::Finding).await;

        let record = role
            .and_then(|r| self.registry.by_role(r))
            .or_else(|| self.registry.by_name(name));

        let channels = self.platform.list_channels().await?;
        let category = match &record {
            Some((_, ws)) if channels.iter().any(|c| c.id == ws.category) => ws.category,
            _ => self.resolver.resolve(name).await?,
        };

        cursor.advance(JobStatus::ChannelStep).await;
        tracing::info!(workspace = name, category = %category, "Deleting channels");
        let mut failures = Vec::new();
        for child in resolver::members(&channels, category) {
            self.delete_channel(name, child, &mut failures).await;
        }
        self.delete_channel(name, category, &mut failures).await;

        cursor.advance(JobStatus::RoleStep).await;
        let role = match role.or(record.as_ref().map(|(_, ws)| ws.role)) {
            Some(id) => id,
            None => self
                .resolver
                .resolve_role(name)
                .await
                .inspect_err(|e| {
                    if let PodError::NotFound { .. } = e {
                        tracing::warn!(workspace = name, "No role matches workspace; channels removed")
                    }
                })?
                .id,
        };
        tracing::info!(workspace = name, role = %role, "Deleting role");
        if let Err(e) = self.platform.delete_role(role).await {
            tracing::warn!(workspace = name, role = %role, error = %e, "Role delete failed");
            failures.push(e.to_string());
        }

        if let Some((id, _)) = record {
            self.registry.remove(&id);
        }

        if failures.is_empty() {
            tracing::info!(workspace = name, "Workspace removed");
            Ok(())
        } else {
            Err(PodError::Partial { failures })
        }
    }

    async fn delete_channel(&self, workspace: &str, id: ChannelId, failures: &mut Vec<String>) {
        if let Err(e) = self.platform.delete_channel(id).await {
            tracing::warn!(workspace, channel = %id, error = %e, "Channel delete failed");
            failures.push(e.to_string());
        }
    }
}
