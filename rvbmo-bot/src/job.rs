//! Jobs and batch runs.
//!
//! A job walks one of two paths:
//!
//! ```text
//! create: Pending -> RoleStep -> ChannelStep -> Done
//! delete: Pending -> Finding -> ChannelStep -> RoleStep -> Done
//! ```
//!
//! and may drop to `Failed` from any non-terminal state. There is no retry.

use chrono::{DateTime, Utc};
use rvbmo_sdk::types::RoleId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Create,
    Delete,
}

/// What a job should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSpec {
    Create { name: String },
    /// `role` is known when the job came from a role listing or mention.
    Delete { name: String, role: Option<RoleId> },
}

impl JobSpec {
    pub fn kind(&self) -> JobKind {
        match self {
            JobSpec::Create { .. } => JobKind::Create,
            JobSpec::Delete { .. } => JobKind::Delete,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            JobSpec::Create { name } | JobSpec::Delete { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Finding,
    RoleStep,
    ChannelStep,
    Done,
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed(_))
    }

    /// Whether `next` is a legal successor on the `kind` path.
    pub fn can_advance_to(&self, kind: JobKind, next: &JobStatus) -> bool {
        use JobStatus::*;
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Failed(_)) {
            return true;
        }
        match kind {
            JobKind::Create => matches!(
                (self, next),
                (Pending, RoleStep) | (RoleStep, ChannelStep) | (ChannelStep, Done)
            ),
            JobKind::Delete => matches!(
                (self, next),
                (Pending, Finding)
                    | (Finding, ChannelStep)
                    | (ChannelStep, RoleStep)
                    | (RoleStep, Done)
            ),
        }
    }

    /// Status text shown in the status document.
    pub fn text(&self, kind: JobKind) -> String {
        match (self, kind) {
            (JobStatus::Pending, _) => "Initializing...".to_string(),
            (JobStatus::Finding, _) => "Finding...".to_string(),
            (JobStatus::RoleStep, JobKind::Create) => "Creating role...".to_string(),
            (JobStatus::RoleStep, JobKind::Delete) => "Deleting role...".to_string(),
            (JobStatus::ChannelStep, JobKind::Create) => "Creating channels...".to_string(),
            (JobStatus::ChannelStep, JobKind::Delete) => "Deleting channels...".to_string(),
            (JobStatus::Done, JobKind::Create) => "**Created successfully.**".to_string(),
            (JobStatus::Done, JobKind::Delete) => "**Removed successfully.**".to_string(),
            (JobStatus::Failed(reason), _) => format!("**Failed:** {reason}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    /// Zero-based position in the run.
    pub index: usize,
    pub label: String,
    pub spec: JobSpec,
    pub status: JobStatus,
}

impl Job {
    pub fn kind(&self) -> JobKind {
        self.spec.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One workspace named by the user.
    Single,
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub done: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn is_total_success(&self) -> bool {
        self.done == self.total
    }
}

/// The jobs of one command invocation and their statuses.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub title: String,
    pub heading: String,
    pub mode: RunMode,
    pub jobs: Vec<Job>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchRun {
    pub fn new(
        title: impl Into<String>,
        heading: impl Into<String>,
        mode: RunMode,
        specs: Vec<JobSpec>,
    ) -> Self {
        let jobs = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Job {
                index,
                label: spec.name().to_string(),
                spec,
                status: JobStatus::Pending,
            })
            .collect();
        Self {
            title: title.into(),
            heading: heading.into(),
            mode,
            jobs,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn single_create(name: &str) -> Self {
        Self::new(
            format!("Creating team {name}"),
            "**Single Job**",
            RunMode::Single,
            vec![JobSpec::Create { name: name.to_string() }],
        )
    }

    pub fn single_delete(name: &str, role: RoleId) -> Self {
        Self::new(
            format!("Deleting pod for {name}"),
            "**Single Team Remove**",
            RunMode::Single,
            vec![JobSpec::Delete {
                name: name.to_string(),
                role: Some(role),
            }],
        )
    }

    pub fn batch_create(names: Vec<String>) -> Self {
        let title = format!("Building {} teams", names.len());
        let specs = names.into_iter().map(|name| JobSpec::Create { name }).collect();
        Self::new(title, "**Batch Create**", RunMode::Batch, specs)
    }

    pub fn batch_delete(targets: Vec<(String, RoleId)>) -> Self {
        let title = format!("Deleting all ({}) pods", targets.len());
        let specs = targets
            .into_iter()
            .map(|(name, role)| JobSpec::Delete {
                name,
                role: Some(role),
            })
            .collect();
        Self::new(title, "**Batch Remove**", RunMode::Batch, specs)
    }

    /// Index of the first job still waiting to run.
    pub fn next_pending(&self) -> Option<usize> {
        self.jobs
            .iter()
            .position(|j| j.status == JobStatus::Pending)
    }

    /// Move job `index` to `status`. Illegal transitions are refused and
    /// logged; the job keeps its current status.
    pub fn set_status(&mut self, index: usize, status: JobStatus) -> bool {
        let Some(job) = self.jobs.get_mut(index) else {
            return false;
        };
        if !job.status.can_advance_to(job.kind(), &status) {
            tracing::warn!(
                job = %job.label,
                from = ?job.status,
                to = ?status,
                "Refusing illegal job transition"
            );
            return false;
        }
        job.status = status;
        true
    }

    pub fn is_finished(&self) -> bool {
        self.jobs.iter().all(|j| j.status.is_terminal())
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock time of a finished run.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }

    pub fn summary(&self) -> BatchSummary {
        let done = self
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Done)
            .count();
        let failed = self
            .jobs
            .iter()
            .filter(|j| matches!(j.status, JobStatus::Failed(_)))
            .count();
        BatchSummary {
            total: self.jobs.len(),
            done,
            failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_path_transitions() {
        use JobStatus::*;
        let k = JobKind::Create;
        assert!(Pending.can_advance_to(k, &RoleStep));
        assert!(RoleStep.can_advance_to(k, &ChannelStep));
        assert!(ChannelStep.can_advance_to(k, &Done));
        assert!(!Pending.can_advance_to(k, &Finding));
        assert!(!ChannelStep.can_advance_to(k, &RoleStep));
        assert!(RoleStep.can_advance_to(k, &Failed("x".into())));
        assert!(!Done.can_advance_to(k, &Failed("x".into())));
    }

    #[test]
    fn delete_path_transitions() {
        use JobStatus::*;
        let k = JobKind::Delete;
        assert!(Pending.can_advance_to(k, &Finding));
        assert!(Finding.can_advance_to(k, &ChannelStep));
        assert!(ChannelStep.can_advance_to(k, &RoleStep));
        assert!(RoleStep.can_advance_to(k, &Done));
        assert!(!Pending.can_advance_to(k, &RoleStep));
        assert!(Finding.can_advance_to(k, &Failed("missing".into())));
    }

    #[test]
    fn status_text_depends_on_kind() {
        assert_eq!(JobStatus::RoleStep.text(JobKind::Create), "Creating role...");
        assert_eq!(JobStatus::RoleStep.text(JobKind::Delete), "Deleting role...");
        assert_eq!(JobStatus::Done.text(JobKind::Delete), "**Removed successfully.**");
        assert_eq!(
            JobStatus::Failed("category not found: X".into()).text(JobKind::Delete),
            "**Failed:** category not found: X"
        );
    }

    #[test]
    fn next_pending_walks_in_order() {
        let mut run = BatchRun::batch_create(vec!["Team 1".into(), "Team 2".into()]);
        assert_eq!(run.next_pending(), Some(0));
        assert!(run.set_status(0, JobStatus::Failed("boom".into())));
        assert_eq!(run.next_pending(), Some(1));
        assert!(run.set_status(1, JobStatus::RoleStep));
        assert_eq!(run.next_pending(), None);
        assert!(!run.is_finished());
    }

    #[test]
    fn illegal_transition_is_refused() {
        let mut run = BatchRun::single_create("Alpha");
        assert!(!run.set_status(0, JobStatus::Done));
        assert_eq!(run.jobs[0].status, JobStatus::Pending);
        assert!(!run.set_status(5, JobStatus::RoleStep));
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut run = BatchRun::batch_delete(vec![
            ("Team 1".into(), RoleId(1)),
            ("Team 2".into(), RoleId(2)),
            ("Team 3".into(), RoleId(3)),
        ]);
        for status in [JobStatus::Finding, JobStatus::ChannelStep, JobStatus::RoleStep, JobStatus::Done] {
            run.set_status(0, status);
        }
        run.set_status(1, JobStatus::Failed("gone".into()));
        let summary = run.summary();
        assert_eq!(summary, BatchSummary { total: 3, done: 1, failed: 1 });
        assert!(!summary.is_total_success());
        assert_eq!(run.title, "Deleting all (3) pods");
    }

    #[test]
    fn elapsed_only_after_finish() {
        let mut run = BatchRun::single_create("Alpha");
        assert!(run.elapsed().is_none());
        run.finish();
        let elapsed = run.elapsed().unwrap();
        assert!(elapsed >= chrono::Duration::zero());
        assert_eq!(run.finished_at.unwrap() - run.started_at, elapsed);
    }
}
