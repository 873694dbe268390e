//! rvbmo-bot: registers the slash commands on one guild, serves them until
//! interrupted, then deregisters them.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serenity::all::{GatewayIntents, GuildId};
use serenity::Client;
use tracing_subscriber::EnvFilter;

use rvbmo_bot::commands;
use rvbmo_bot::config::BotConfig;
use rvbmo_bot::handler::Handler;
use rvbmo_bot::registry::WorkspaceRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs when RVBMO_LOG_JSON=1, human-readable otherwise
    let json_logs = std::env::var("RVBMO_LOG_JSON").unwrap_or_default() == "1";
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rvbmo_bot=info,rvbmo_sdk=info"));
    if json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = BotConfig::parse();
    config.validate()?;

    let settings = config.batch_settings();
    tracing::info!(
        admin_role = %settings.admin_role,
        protected = ?settings.protected.reserved().collect::<Vec<_>>(),
        max_batch = settings.max_batch,
        "Loaded settings"
    );
    let registry = Arc::new(WorkspaceRegistry::new());
    let handler = Handler::new(config.guild, registry, settings);

    let mut client = Client::builder(&config.token, GatewayIntents::GUILDS)
        .event_handler(handler)
        .await
        .context("Failed to build gateway client")?;

    let http = client.http.clone();
    let app = http
        .get_current_application_info()
        .await
        .context("Failed to fetch application info")?;
    http.set_application_id(app.id);

    let guild = GuildId::new(config.guild);
    tracing::info!(guild = config.guild, "Adding commands...");
    let registered = guild
        .set_commands(&http, commands::definitions())
        .await
        .context("Failed to register commands")?;
    for command in &registered {
        tracing::info!("Added: {}", command.name);
    }

    let shard_manager = client.shard_manager.clone();
    let mut gateway = tokio::spawn(async move { client.start().await });
    tracing::info!("Bot is running. Press Ctrl+C to exit");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
        }
        result = &mut gateway => {
            match result {
                Ok(Ok(())) => tracing::warn!("Gateway closed"),
                Ok(Err(e)) => tracing::error!(error = %e, "Gateway error"),
                Err(e) => tracing::error!(error = %e, "Gateway task panicked"),
            }
        }
    }

    if config.remove_commands {
        tracing::info!("Removing commands...");
        for command in &registered {
            match guild.delete_command(&http, command.id).await {
                Ok(()) => tracing::info!("Removed: {}", command.name),
                Err(e) => tracing::warn!(command = %command.name, error = %e, "Cannot delete command"),
            }
        }
    }

    shard_manager.shutdown_all().await;
    tracing::info!("Gracefully shutting down.");
    Ok(())
}
