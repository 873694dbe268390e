//! Batch orchestration: plan a run, then execute its job queue.
//!
//! Jobs run one at a time in list order. A job reaches a terminal status
//! before the next one issues its first platform call, and the run is
//! re-published after every transition. One job failing never stops the
//! others.

use std::sync::Arc;

use rvbmo_sdk::PlatformClient;
use rvbmo_sdk::types::RoleId;

use crate::deprovision::DeprovisioningEngine;
use crate::error::PodError;
use crate::job::{BatchRun, JobSpec, JobStatus};
use crate::progress::{JobCursor, ProgressReporter};
use crate::protected::ProtectedNames;
use crate::provision::ProvisioningEngine;
use crate::registry::WorkspaceRegistry;
use crate::workspace;

/// Knobs for the orchestrator that come from configuration.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Role granted view+manage on every workspace category.
    pub admin_role: String,
    pub protected: ProtectedNames,
    /// Largest accepted `create batch` count.
    pub max_batch: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            admin_role: "Green Team".to_string(),
            protected: ProtectedNames::default(),
            max_batch: 25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Create { count: i64 },
    DeleteAll,
}

pub struct BatchOrchestrator {
    platform: Arc<dyn PlatformClient>,
    provisioner: ProvisioningEngine,
    deprovisioner: DeprovisioningEngine,
    settings: BatchSettings,
}

impl BatchOrchestrator {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        registry: Arc<WorkspaceRegistry>,
        settings: BatchSettings,
    ) -> Self {
        Self {
            provisioner: ProvisioningEngine::new(
                platform.clone(),
                registry.clone(),
                settings.admin_role.clone(),
            ),
            deprovisioner: DeprovisioningEngine::new(platform.clone(), registry),
            platform,
            settings,
        }
    }

    /// Plan and execute a batch.
    pub async fn run_batch(
        &self,
        kind: BatchKind,
        reporter: &ProgressReporter,
    ) -> Result<BatchRun, PodError> {
        let mut run = match kind {
            BatchKind::Create { count } => self.plan_create(count)?,
            BatchKind::DeleteAll => self.plan_delete_all().await?,
        };
        self.execute(&mut run, reporter).await;
        Ok(run)
    }

    pub async fn create_one(&self, name: &str, reporter: &ProgressReporter) -> BatchRun {
        let mut run = BatchRun::single_create(name);
        self.execute(&mut run, reporter).await;
        run
    }

    pub async fn delete_one(
        &self,
        name: &str,
        role: RoleId,
        reporter: &ProgressReporter,
    ) -> BatchRun {
        let mut run = BatchRun::single_delete(name, role);
        self.execute(&mut run, reporter).await;
        run
    }

    /// `Team 1 .. Team n`.
    pub fn plan_create(&self, count: i64) -> Result<BatchRun, PodError> {
        let max = self.settings.max_batch;
        let n = usize::try_from(count)
            .ok()
            .filter(|n| (1..=max).contains(n))
            .ok_or_else(|| {
                PodError::InvalidInput(format!("team count must be between 1 and {max}, got {count}"))
            })?;
        Ok(BatchRun::batch_create((1..=n).map(workspace::batch_name).collect()))
    }

    /// One job per unprotected role, in role listing order.
    pub async fn plan_delete_all(&self) -> Result<BatchRun, PodError> {
        let roles = self.platform.list_roles().await?;
        let targets: Vec<(String, RoleId)> = roles
            .into_iter()
            .filter(|r| {
                let protected = self.settings.protected.is_protected_role(r);
                if protected {
                    tracing::debug!(role = %r.name, "Skipping protected role");
                }
                !protected
            })
            .map(|r| (r.name, r.id))
            .collect();
        Ok(BatchRun::batch_delete(targets))
    }

    /// Drain the run's job queue.
    pub async fn execute(&self, run: &mut BatchRun, reporter: &ProgressReporter) {
        tracing::info!(title = %run.title, jobs = run.jobs.len(), "Starting run");
        reporter.report(run).await;

        while let Some(index) = run.next_pending() {
            self.execute_job(run, index, reporter).await;
        }

        run.finish();
        reporter.report(run).await;

        let summary = run.summary();
        tracing::info!(
            title = %run.title,
            elapsed_ms = run.elapsed().map(|d| d.num_milliseconds()),
            summary = %serde_json::to_string(&summary).unwrap_or_default(),
            "Run finished"
        );
    }

    /// Advance one job to a terminal status.
    async fn execute_job(&self, run: &mut BatchRun, index: usize, reporter: &ProgressReporter) {
        let spec = run.jobs[index].spec.clone();
        let mut cursor = JobCursor::new(run, index, reporter);

        let outcome = match &spec {
            JobSpec::Create { name } => self
                .provisioner
                .create_workspace(name, &mut cursor)
                .await
                .map(|_| ()),
            JobSpec::Delete { name, role } => self
                .deprovisioner
                .delete_workspace(name, *role, &mut cursor)
                .await,
        };

        match outcome {
            Ok(()) => cursor.advance(JobStatus::Done).await,
            Err(e) => {
                tracing::warn!(job = %cursor.label(), error = %e, "Job failed");
                cursor.advance(JobStatus::Failed(e.to_string())).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvbmo_sdk::memory::{MemoryPlatform, Op};
    use rvbmo_sdk::types::StatusTarget;

    fn orchestrator(platform: &Arc<MemoryPlatform>) -> BatchOrchestrator {
        BatchOrchestrator::new(
            platform.clone(),
            Arc::new(WorkspaceRegistry::new()),
            BatchSettings::default(),
        )
    }

    #[test]
    fn create_plan_names_teams_in_order() {
        let platform = Arc::new(MemoryPlatform::new());
        let run = orchestrator(&platform).plan_create(3).unwrap();
        let labels: Vec<&str> = run.jobs.iter().map(|j| j.label.as_str()).collect();
        assert_eq!(labels, vec!["Team 1", "Team 2", "Team 3"]);
        assert_eq!(run.title, "Building 3 teams");
    }

    #[test]
    fn create_plan_rejects_out_of_range_counts() {
        let platform = Arc::new(MemoryPlatform::new());
        let orch = orchestrator(&platform);
        for bad in [0, -2, 26] {
            assert!(matches!(orch.plan_create(bad), Err(PodError::InvalidInput(_))), "{bad}");
        }
        assert!(orch.plan_create(25).is_ok());
    }

    #[tokio::test]
    async fn delete_plan_skips_protected_roles() {
        let platform = Arc::new(MemoryPlatform::new());
        platform.add_role("Green Team");
        platform.add_role("Team 1");
        platform.add_role("Red Team");
        platform.add_managed_role("RvBMo Bot");
        platform.add_role("Team 2");

        let run = orchestrator(&platform).plan_delete_all().await.unwrap();
        let labels: Vec<&str> = run.jobs.iter().map(|j| j.label.as_str()).collect();
        assert_eq!(labels, vec!["Team 1", "Team 2"]);
        assert_eq!(run.title, "Deleting all (2) pods");
    }

    #[tokio::test]
    async fn failed_job_does_not_block_siblings() {
        let platform = Arc::new(MemoryPlatform::new());
        platform.add_role("Green Team");
        platform.fail_next(Op::CreateRole, 1);
        let reporter = ProgressReporter::new(platform.clone(), StatusTarget::new("t"));

        let run = orchestrator(&platform)
            .run_batch(BatchKind::Create { count: 2 }, &reporter)
            .await
            .unwrap();
        assert!(matches!(run.jobs[0].status, JobStatus::Failed(_)));
        assert_eq!(run.jobs[1].status, JobStatus::Done);
        assert!(run.finished_at.is_some());

        let last = platform.last_document(reporter.target()).unwrap();
        assert!(last.body.ends_with("**1/2 done, 1 failed**"), "{}", last.body);
    }
}
