//! Creates one workspace: role, then category, then member channels.
//!
//! Steps run strictly in order and nothing is rolled back. A failed step
//! leaves the resources created so far in place and fails the job.

use std::sync::Arc;

use rvbmo_sdk::{PlatformClient, PlatformError};
use rvbmo_sdk::types::{Permission, PermissionOverwrite, RoleId, RoleStyle};

use crate::error::PodError;
use crate::job::JobStatus;
use crate::progress::JobCursor;
use crate::registry::WorkspaceRegistry;
use crate::resolver::WorkspaceResolver;
use crate::workspace::{self, MEMBER_CHANNELS, PartialWorkspace, Workspace};

/// Brand blue applied to every team role.
pub const TEAM_COLOR: u32 = 3447003;

pub fn team_style() -> RoleStyle {
    RoleStyle {
        color: TEAM_COLOR,
        hoist: true,
        mentionable: true,
    }
}

/// Category overwrites: hidden from everyone, visible to the team, visible
/// and manageable for the admin role.
pub fn category_overwrites(everyone: RoleId, team: RoleId, admin: RoleId) -> Vec<PermissionOverwrite> {
    vec![
        PermissionOverwrite::deny(everyone, &[Permission::ViewChannel]),
        PermissionOverwrite::allow(team, &[Permission::ViewChannel]),
        PermissionOverwrite::allow(admin, &[Permission::ViewChannel, Permission::ManageChannels]),
    ]
}

pub struct ProvisioningEngine {
    platform: Arc<dyn PlatformClient>,
    resolver: WorkspaceResolver,
    registry: Arc<WorkspaceRegistry>,
    admin_role: String,
}

impl ProvisioningEngine {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        registry: Arc<WorkspaceRegistry>,
        admin_role: impl Into<String>,
    ) -> Self {
        Self {
            resolver: WorkspaceResolver::new(platform.clone()),
            platform,
            registry,
            admin_role: admin_role.into(),
        }
    }

    pub async fn create_workspace(
        &self,
        name: &str,
        cursor: &mut JobCursor<'_>,
    ) -> Result<Workspace, PodError> {
        if name.trim().is_empty() {
            return Err(PodError::InvalidInput("team name must not be empty".into()));
        }

        // Nothing is created until the admin role resolves.
        let admin = self.resolver.resolve_role(&self.admin_role).await?.id;

        cursor.advance(JobStatus::RoleStep).await;
        tracing::info!(workspace = name, "Creating role");
        let role = self.platform.create_role(name).await?;
        let mut created = PartialWorkspace::new(name, role.id);
        self.platform
            .edit_role(role.id, name, &team_style())
            .await
            .map_err(|e| incomplete(&created, e))?;

        cursor.advance(JobStatus::ChannelStep).await;
        tracing::info!(workspace = name, role = %role.id, "Creating channels");
        let overwrites = category_overwrites(self.platform.everyone_role(), role.id, admin);
        let category = self
            .platform
            .create_category(name, &overwrites)
            .await
            .map_err(|e| incomplete(&created, e))?;
        created.category = Some(category.id);

        for (suffix, kind) in MEMBER_CHANNELS {
            let channel_name = workspace::member_channel_name(name, suffix);
            let channel = self
                .platform
                .create_channel(&channel_name, kind, category.id)
                .await
                .map_err(|e| incomplete(&created, e))?;
            created.channels.push(channel.id);
        }

        let ws = Workspace {
            name: name.to_string(),
            role: role.id,
            category: category.id,
            channels: created.channels,
        };
        let id = self.registry.register(ws.clone());
        tracing::info!(workspace = name, id = %id, "Workspace created");
        Ok(ws)
    }
}

fn incomplete(created: &PartialWorkspace, source: PlatformError) -> PodError {
    tracing::warn!(
        workspace = %created.name,
        role = %created.role,
        category = ?created.category,
        channels = ?created.channels,
        error = %source,
        "Workspace left partial"
    );
    PodError::Incomplete {
        created: created.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::BatchRun;
    use crate::progress::ProgressReporter;
    use rvbmo_sdk::memory::{Call, MemoryPlatform, Op, GUILD_ID};
    use rvbmo_sdk::types::{ChannelKind, StatusTarget};

    fn setup() -> (Arc<MemoryPlatform>, Arc<WorkspaceRegistry>, ProvisioningEngine, ProgressReporter) {
        let platform = Arc::new(MemoryPlatform::new());
        platform.add_role("Green Team");
        let registry = Arc::new(WorkspaceRegistry::new());
        let engine = ProvisioningEngine::new(platform.clone(), registry.clone(), "Green Team");
        let reporter = ProgressReporter::new(platform.clone(), StatusTarget::new("t"));
        (platform, registry, engine, reporter)
    }

    #[tokio::test]
    async fn creates_role_category_and_three_channels() {
        let (platform, registry, engine, reporter) = setup();
        let admin = platform.roles()[1].id;
        let mut run = BatchRun::single_create("Alpha");
        let mut cursor = JobCursor::new(&mut run, 0, &reporter);

        let ws = engine.create_workspace("Alpha", &mut cursor).await.unwrap();
        assert_eq!(ws.channels.len(), 3);
        assert_eq!(registry.by_role(ws.role).unwrap().1, ws);

        let mutations: Vec<Call> = platform.calls().into_iter().filter(Call::is_mutation).collect();
        assert_eq!(
            mutations,
            vec![
                Call::CreateRole { name: "Alpha".into() },
                Call::EditRole { id: ws.role, name: "Alpha".into(), style: team_style() },
                Call::CreateCategory {
                    name: "Alpha".into(),
                    overwrites: category_overwrites(RoleId(GUILD_ID), ws.role, admin),
                },
                Call::CreateChannel { name: "alpha-text".into(), kind: ChannelKind::Text, parent: ws.category },
                Call::CreateChannel { name: "alpha-support".into(), kind: ChannelKind::Text, parent: ws.category },
                Call::CreateChannel { name: "alpha-voice".into(), kind: ChannelKind::Voice, parent: ws.category },
            ]
        );
        assert_eq!(run.jobs[0].status, JobStatus::ChannelStep);
    }

    #[tokio::test]
    async fn missing_admin_role_creates_nothing() {
        let platform = Arc::new(MemoryPlatform::new());
        let registry = Arc::new(WorkspaceRegistry::new());
        let engine = ProvisioningEngine::new(platform.clone(), registry.clone(), "Green Team");
        let reporter = ProgressReporter::new(platform.clone(), StatusTarget::new("t"));
        let mut run = BatchRun::single_create("Alpha");
        let mut cursor = JobCursor::new(&mut run, 0, &reporter);

        let err = engine.create_workspace("Alpha", &mut cursor).await.unwrap_err();
        assert!(matches!(err, PodError::NotFound { kind: "role", .. }));
        assert!(!platform.calls().iter().any(Call::is_mutation));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let (platform, _registry, engine, reporter) = setup();
        let mut run = BatchRun::single_create(" ");
        let mut cursor = JobCursor::new(&mut run, 0, &reporter);

        let err = engine.create_workspace("   ", &mut cursor).await.unwrap_err();
        assert!(matches!(err, PodError::InvalidInput(_)));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_channel_step_leaves_partial_workspace() {
        let (platform, registry, engine, reporter) = setup();
        platform.fail_next(Op::CreateChannel, 1);
        let mut run = BatchRun::single_create("Alpha");
        let mut cursor = JobCursor::new(&mut run, 0, &reporter);

        let err = engine.create_workspace("Alpha", &mut cursor).await.unwrap_err();
        assert_eq!(platform.count(Op::CreateChannel), 1, "no further channels after a failure");
        let role = platform.roles().into_iter().find(|r| r.name == "Alpha").unwrap().id;
        let category = platform
            .channels()
            .into_iter()
            .find(|c| c.name == "Alpha" && c.is_category())
            .unwrap()
            .id;
        match err {
            PodError::Incomplete { created, .. } => {
                assert_eq!(created.role, role);
                assert_eq!(created.category, Some(category));
                assert!(created.channels.is_empty());
            }
            other => panic!("Expected Incomplete, got {other:?}"),
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn failed_category_reports_leftover_role() {
        let (platform, registry, engine, reporter) = setup();
        platform.fail_next(Op::CreateCategory, 1);
        let mut run = BatchRun::single_create("Alpha");
        let mut cursor = JobCursor::new(&mut run, 0, &reporter);

        let err = engine.create_workspace("Alpha", &mut cursor).await.unwrap_err();
        let role = platform.roles().into_iter().find(|r| r.name == "Alpha").unwrap().id;
        assert!(err.to_string().ends_with(&format!("left behind role {role}")), "{err}");
        match err {
            PodError::Incomplete { created, source } => {
                assert_eq!(created.role, role);
                assert_eq!(created.category, None);
                assert!(matches!(source, PlatformError::Call { op: "create_category", .. }));
            }
            other => panic!("Expected Incomplete, got {other:?}"),
        }
        assert_eq!(platform.count(Op::CreateChannel), 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn failed_role_step_leaves_nothing() {
        let (platform, _registry, engine, reporter) = setup();
        platform.fail_next(Op::CreateRole, 1);
        let mut run = BatchRun::single_create("Alpha");
        let mut cursor = JobCursor::new(&mut run, 0, &reporter);

        let err = engine.create_workspace("Alpha", &mut cursor).await.unwrap_err();
        assert!(matches!(err, PodError::PlatformCallFailed(_)));
        assert!(!platform.roles().iter().any(|r| r.name == "Alpha"));
    }
}
