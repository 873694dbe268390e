//! Command surface: slash-command definitions, option parsing and routing.
//!
//!   /ping                             - liveness check
//!   /teams create by-name <team-name> - one workspace
//!   /teams create batch <team-count>  - `Team 1 .. Team n`
//!   /teams delete by-role <team-role> - one workspace, by its role
//!   /teams delete all                 - every unprotected workspace

use std::sync::Arc;

use rvbmo_sdk::PlatformClient;
use rvbmo_sdk::types::{RoleId, StatusTarget};
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{CommandOptionType, ResolvedOption, ResolvedValue};

use crate::batch::{BatchKind, BatchOrchestrator, BatchSettings};
use crate::error::PodError;
use crate::job::BatchRun;
use crate::progress::{self, ProgressReporter};
use crate::registry::WorkspaceRegistry;

pub const PING: &str = "ping";
pub const TEAMS: &str = "teams";
/// Discord's role name limit.
pub const MAX_TEAM_NAME: u16 = 100;

/// A parsed `/teams` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamsCommand {
    CreateByName { name: String },
    CreateBatch { count: i64 },
    DeleteByRole { role: RoleId, name: String },
    DeleteAll,
}

/// Every command the bot registers.
pub fn definitions() -> Vec<CreateCommand> {
    let by_name = CreateCommandOption::new(
        CommandOptionType::SubCommand,
        "by-name",
        "Create a team with a specific name",
    )
    .add_sub_option(
        CreateCommandOption::new(CommandOptionType::String, "team-name", "Name for the team")
            .max_length(MAX_TEAM_NAME)
            .required(true),
    );
    let batch = CreateCommandOption::new(
        CommandOptionType::SubCommand,
        "batch",
        "Create a batch of teams",
    )
    .add_sub_option(
        CreateCommandOption::new(
            CommandOptionType::Integer,
            "team-count",
            "Number of teams to create",
        )
        .min_int_value(1)
        .required(true),
    );
    let by_role = CreateCommandOption::new(
        CommandOptionType::SubCommand,
        "by-role",
        "Specific team to delete",
    )
    .add_sub_option(
        CreateCommandOption::new(CommandOptionType::Role, "team-role", "Role for the team")
            .required(true),
    );
    let all = CreateCommandOption::new(CommandOptionType::SubCommand, "all", "Delete all teams");

    vec![
        CreateCommand::new(PING).description("Test responsiveness"),
        CreateCommand::new(TEAMS)
            .description("Create or delete team pods")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommandGroup,
                    "create",
                    "Subcommands group",
                )
                .add_sub_option(by_name)
                .add_sub_option(batch),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommandGroup,
                    "delete",
                    "Subcommands group",
                )
                .add_sub_option(by_role)
                .add_sub_option(all),
            ),
    ]
}

/// Parse the resolved options of a `/teams` interaction.
pub fn parse(options: &[ResolvedOption<'_>]) -> Option<TeamsCommand> {
    let group = options.first()?;
    let ResolvedValue::SubCommandGroup(subs) = &group.value else {
        return None;
    };
    let sub = subs.first()?;
    let ResolvedValue::SubCommand(args) = &sub.value else {
        return None;
    };

    match (group.name, sub.name) {
        ("create", "by-name") => args.iter().find_map(|a| match (a.name, &a.value) {
            ("team-name", ResolvedValue::String(name)) => Some(TeamsCommand::CreateByName {
                name: team_name(name),
            }),
            _ => None,
        }),
        ("create", "batch") => args.iter().find_map(|a| match (a.name, &a.value) {
            ("team-count", ResolvedValue::Integer(count)) => {
                Some(TeamsCommand::CreateBatch { count: *count })
            }
            _ => None,
        }),
        ("delete", "by-role") => args.iter().find_map(|a| match (a.name, &a.value) {
            ("team-role", ResolvedValue::Role(role)) => Some(TeamsCommand::DeleteByRole {
                role: RoleId(role.id.get()),
                name: role.name.clone(),
            }),
            _ => None,
        }),
        ("delete", "all") => Some(TeamsCommand::DeleteAll),
        _ => None,
    }
}

/// A user-supplied team name as it is used for the role, category and status
/// label alike.
pub fn team_name(raw: &str) -> String {
    raw.trim().to_string()
}

/// Dispatches parsed commands to the orchestrator. One router serves one
/// guild; the registry outlives every router built for it.
pub struct CommandRouter {
    platform: Arc<dyn PlatformClient>,
    orchestrator: BatchOrchestrator,
}

impl CommandRouter {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        registry: Arc<WorkspaceRegistry>,
        settings: BatchSettings,
    ) -> Self {
        Self {
            orchestrator: BatchOrchestrator::new(platform.clone(), registry, settings),
            platform,
        }
    }

    /// Run `command`, reporting into the status message behind `target`.
    /// `None` (an unrecognised invocation) publishes the error document.
    pub async fn dispatch(
        &self,
        command: Option<TeamsCommand>,
        target: StatusTarget,
    ) -> Result<BatchRun, PodError> {
        let reporter = ProgressReporter::new(self.platform.clone(), target);
        let Some(command) = command else {
            reporter
                .publish(&progress::message(progress::ERROR_TITLE, progress::ERROR_BODY))
                .await?;
            return Err(PodError::InvalidInput("unrecognised teams command".into()));
        };

        tracing::info!(command = ?command, "Dispatching");
        let result = match command {
            TeamsCommand::CreateByName { name } => {
                Ok(self.orchestrator.create_one(&name, &reporter).await)
            }
            TeamsCommand::CreateBatch { count } => {
                self.orchestrator
                    .run_batch(BatchKind::Create { count }, &reporter)
                    .await
            }
            TeamsCommand::DeleteByRole { role, name } => {
                Ok(self.orchestrator.delete_one(&name, role, &reporter).await)
            }
            TeamsCommand::DeleteAll => self.orchestrator.run_batch(BatchKind::DeleteAll, &reporter).await,
        };

        if let Err(e) = &result {
            // Planning failed before any job existed.
            let body = format!("{}\n\n{e}", progress::ERROR_BODY);
            if let Err(publish_err) = reporter
                .publish(&progress::message(progress::ERROR_TITLE, &body))
                .await
            {
                tracing::warn!(error = %publish_err, "Failed to publish error document");
            }
        }
        result
    }
}
