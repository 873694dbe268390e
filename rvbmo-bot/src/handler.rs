//! Gateway event handling: answers `/ping`, routes `/teams`.

use std::sync::Arc;

use rvbmo_sdk::discord::DiscordPlatform;
use rvbmo_sdk::types::{StatusDocument, StatusTarget};
use serenity::all::{
    CommandInteraction, Context, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage, EventHandler, Interaction, Ready,
};
use serenity::async_trait;

use crate::batch::BatchSettings;
use crate::commands::{self, CommandRouter};
use crate::progress;
use crate::registry::WorkspaceRegistry;

pub struct Handler {
    guild: u64,
    registry: Arc<WorkspaceRegistry>,
    settings: BatchSettings,
}

impl Handler {
    pub fn new(guild: u64, registry: Arc<WorkspaceRegistry>, settings: BatchSettings) -> Self {
        Self {
            guild,
            registry,
            settings,
        }
    }

    async fn teams(&self, ctx: &Context, command: &CommandInteraction) -> anyhow::Result<()> {
        respond(ctx, command, embed(&progress::starting())).await?;

        let platform = Arc::new(DiscordPlatform::new(ctx.http.clone(), self.guild));
        let target = StatusTarget::new(command.token.clone());

        let parsed = if command.guild_id.map(|g| g.get()) == Some(self.guild) {
            commands::parse(&command.data.options())
        } else {
            tracing::warn!(guild = ?command.guild_id, "Ignoring /teams outside the configured guild");
            None
        };

        let router = CommandRouter::new(platform, self.registry.clone(), self.settings.clone());
        let run = router.dispatch(parsed, target).await?;
        tracing::info!(title = %run.title, summary = ?run.summary(), "Command complete");
        Ok(())
    }
}

fn embed(document: &StatusDocument) -> CreateEmbed {
    CreateEmbed::new()
        .title(&document.title)
        .description(&document.body)
        .colour(document.color)
}

async fn respond(
    ctx: &Context,
    command: &CommandInteraction,
    embed: CreateEmbed,
) -> serenity::Result<()> {
    command
        .create_response(
            ctx,
            CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().embed(embed)),
        )
        .await
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!("Logged in as: {}", ready.user.tag());
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        match command.data.name.as_str() {
            commands::PING => {
                let pong = CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new().content("Pong"),
                );
                if let Err(e) = command.create_response(&ctx, pong).await {
                    tracing::error!(error = %e, "Failed to answer ping");
                }
            }
            commands::TEAMS => {
                if let Err(e) = self.teams(&ctx, &command).await {
                    tracing::error!(error = %e, user = %command.user.name, "Teams command failed");
                }
            }
            other => tracing::debug!(command = other, "Ignoring unknown command"),
        }
    }
}
