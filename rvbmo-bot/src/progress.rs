//! Status document rendering and publishing.
//!
//! Every invocation owns one status message. Each state change re-renders the
//! whole run and replaces the message body; nothing is patched in place.

use std::sync::Arc;

use rvbmo_sdk::PlatformClient;
use rvbmo_sdk::types::{StatusDocument, StatusTarget};

use crate::error::PodError;
use crate::job::{BatchRun, JobStatus, RunMode};

/// Prefix of every status title.
pub const BRAND: &str = "RvBMo";
/// Embed colour of status messages.
pub const STATUS_COLOR: u32 = 16755520;
/// Discord's embed description limit.
pub const MAX_BODY: usize = 4096;
/// Discord's embed title limit.
pub const MAX_TITLE: usize = 256;
/// Room kept free for the overflow and summary lines.
const TAIL_RESERVE: usize = 96;

pub const ERROR_TITLE: &str = "Error";
pub const ERROR_BODY: &str =
    "Oops, something went wrong.\nHol' up, you aren't supposed to see this message.";

/// A free-form status document.
pub fn message(title: &str, body: &str) -> StatusDocument {
    StatusDocument {
        title: format!("{BRAND} • {title}").chars().take(MAX_TITLE).collect(),
        body: body.to_string(),
        color: STATUS_COLOR,
    }
}

/// The document shown before any work starts.
pub fn starting() -> StatusDocument {
    message("Bouncing back", "Starting")
}

/// Render a run. Pure: the same run always renders to the same document.
pub fn render(run: &BatchRun) -> StatusDocument {
    let mut body = String::with_capacity(64 + run.jobs.len() * 40);
    body.push_str(&run.heading);
    body.push('\n');

    let mut shown = 0;
    for job in &run.jobs {
        let line = format!("{}: {}\n", job.label, job.status.text(job.kind()));
        if body.len() + line.len() > MAX_BODY - TAIL_RESERVE {
            break;
        }
        body.push_str(&line);
        shown += 1;
    }
    if shown < run.jobs.len() {
        body.push_str(&format!("... and {} more\n", run.jobs.len() - shown));
    }

    if run.mode == RunMode::Batch && run.is_finished() {
        let summary = run.summary();
        if summary.is_total_success() {
            body.push_str(&format!("**All {} done.**\n", summary.total));
        } else {
            body.push_str(&format!(
                "**{}/{} done, {} failed**\n",
                summary.done, summary.total, summary.failed
            ));
        }
    }

    message(&run.title, body.trim_end())
}

/// Publishes documents to the status message of one invocation.
pub struct ProgressReporter {
    platform: Arc<dyn PlatformClient>,
    target: StatusTarget,
}

impl ProgressReporter {
    pub fn new(platform: Arc<dyn PlatformClient>, target: StatusTarget) -> Self {
        Self { platform, target }
    }

    pub fn target(&self) -> &StatusTarget {
        &self.target
    }

    pub async fn publish(&self, document: &StatusDocument) -> Result<(), PodError> {
        tracing::debug!(title = %document.title, body = %document.body, "Publishing status");
        self.platform.edit_message(&self.target, document).await?;
        Ok(())
    }

    /// Render and publish. A failed edit is logged and otherwise ignored.
    pub async fn report(&self, run: &BatchRun) {
        if let Err(e) = self.publish(&render(run)).await {
            tracing::warn!(error = %e, title = %run.title, "Failed to update status message");
        }
    }
}

/// The engines' handle on the job they are executing.
pub struct JobCursor<'a> {
    run: &'a mut BatchRun,
    index: usize,
    reporter: &'a ProgressReporter,
}

impl<'a> JobCursor<'a> {
    pub fn new(run: &'a mut BatchRun, index: usize, reporter: &'a ProgressReporter) -> Self {
        Self { run, index, reporter }
    }

    pub fn status(&self) -> &JobStatus {
        &self.run.jobs[self.index].status
    }

    pub fn label(&self) -> &str {
        &self.run.jobs[self.index].label
    }

    /// Transition the job and publish the run.
    pub async fn advance(&mut self, status: JobStatus) {
        if self.run.set_status(self.index, status) {
            self.reporter.report(&*self.run).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvbmo_sdk::memory::{MemoryPlatform, Op};

    #[test]
    fn renders_heading_and_one_line_per_job() {
        let mut run = BatchRun::batch_create(vec!["Team 1".into(), "Team 2".into()]);
        run.set_status(0, JobStatus::RoleStep);

        let doc = render(&run);
        assert_eq!(doc.title, "RvBMo • Building 2 teams");
        assert_eq!(
            doc.body,
            "**Batch Create**\nTeam 1: Creating role...\nTeam 2: Initializing..."
        );
        assert_eq!(doc.color, STATUS_COLOR);
    }

    #[test]
    fn render_is_idempotent() {
        let mut run = BatchRun::batch_create(vec!["Team 1".into(), "Team 2".into()]);
        run.set_status(1, JobStatus::Failed("create_role failed".into()));
        assert_eq!(render(&run), render(&run));
    }

    #[test]
    fn finished_batch_gets_summary() {
        let mut run = BatchRun::batch_create(vec!["Team 1".into(), "Team 2".into()]);
        for status in [JobStatus::RoleStep, JobStatus::ChannelStep, JobStatus::Done] {
            run.set_status(0, status);
        }
        run.set_status(1, JobStatus::Failed("boom".into()));
        let body = render(&run).body;
        assert!(body.ends_with("**1/2 done, 1 failed**"), "{body}");
    }

    #[test]
    fn single_run_has_no_summary() {
        let mut run = BatchRun::single_create("Alpha");
        for status in [JobStatus::RoleStep, JobStatus::ChannelStep, JobStatus::Done] {
            run.set_status(0, status);
        }
        let doc = render(&run);
        assert_eq!(doc.title, "RvBMo • Creating team Alpha");
        assert_eq!(doc.body, "**Single Job**\nAlpha: **Created successfully.**");
    }

    #[test]
    fn large_runs_stay_within_bound() {
        let names = (1..=400).map(|n| format!("A rather long team name number {n}")).collect();
        let run = BatchRun::batch_create(names);
        let body = render(&run).body;
        assert!(body.len() <= MAX_BODY);
        assert!(body.contains("more"), "overflow marker missing");
    }

    #[test]
    fn long_names_keep_title_within_bound() {
        let name = "é".repeat(300);
        let doc = render(&BatchRun::single_create(&name));
        assert_eq!(doc.title.chars().count(), MAX_TITLE);
        assert!(doc.title.starts_with("RvBMo • Creating team é"));

        let doc = render(&BatchRun::single_delete(&name, rvbmo_sdk::types::RoleId(9)));
        assert_eq!(doc.title.chars().count(), MAX_TITLE);
    }

    #[tokio::test]
    async fn report_survives_edit_failure() {
        let platform = Arc::new(MemoryPlatform::new());
        let target = StatusTarget::new("token-1");
        let reporter = ProgressReporter::new(platform.clone(), target.clone());
        platform.fail_next(Op::EditMessage, 1);

        let run = BatchRun::single_create("Alpha");
        reporter.report(&run).await;
        reporter.report(&run).await;
        assert_eq!(platform.documents(&target).len(), 1);
    }

    #[tokio::test]
    async fn cursor_publishes_on_every_transition() {
        let platform = Arc::new(MemoryPlatform::new());
        let target = StatusTarget::new("token-2");
        let reporter = ProgressReporter::new(platform.clone(), target.clone());
        let mut run = BatchRun::single_create("Alpha");

        let mut cursor = JobCursor::new(&mut run, 0, &reporter);
        cursor.advance(JobStatus::RoleStep).await;
        cursor.advance(JobStatus::Done).await; // illegal from RoleStep
        assert_eq!(cursor.status(), &JobStatus::RoleStep);
        assert_eq!(cursor.label(), "Alpha");
        assert_eq!(platform.documents(&target).len(), 1);
    }
}
