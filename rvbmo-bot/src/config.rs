//! Process configuration, from flags or environment.

use clap::Parser;

use crate::batch::BatchSettings;
use crate::error::PodError;
use crate::protected::ProtectedNames;

#[derive(Debug, Clone, Parser)]
#[command(name = "rvbmo-bot", about = "Provision and tear down team pods on a Discord guild")]
pub struct BotConfig {
    /// Guild the bot registers its commands in and provisions workspaces on
    #[arg(long, env = "RVBMO_GUILD")]
    pub guild: u64,

    /// Bot access token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Deregister the commands on shutdown
    #[arg(
        long,
        env = "RVBMO_REMOVE_COMMANDS",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub remove_commands: bool,

    /// Role granted view and manage on every team category
    #[arg(long, default_value = "Green Team")]
    pub admin_role: String,

    /// Role name `/teams delete all` never touches (repeatable)
    #[arg(
        long = "protected-role",
        default_values = ["Green Team", "Red Team", "RvBMo", "Public"]
    )]
    pub protected_roles: Vec<String>,

    /// Largest team count accepted by `/teams create batch`
    #[arg(long, default_value_t = 25)]
    pub max_batch: usize,
}

impl BotConfig {
    pub fn validate(&self) -> Result<(), PodError> {
        if self.token.trim().is_empty() {
            return Err(PodError::ConfigInvalid("bot token is empty".into()));
        }
        if self.guild == 0 {
            return Err(PodError::ConfigInvalid("guild id must be non-zero".into()));
        }
        if self.max_batch == 0 {
            return Err(PodError::ConfigInvalid("max batch must be at least 1".into()));
        }
        Ok(())
    }

    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            admin_role: self.admin_role.clone(),
            protected: ProtectedNames::new(self.protected_roles.iter().cloned()),
            max_batch: self.max_batch,
        }
    }
}
