//! rvbmo-bot: team pod provisioning for a Discord guild.
//!
//! A team pod (workspace) is a role plus a private category holding three
//! member channels. The bot creates and deletes pods one at a time or in
//! batches, rendering progress into a single status message:
//! - ProvisioningEngine: role → category → channels
//! - DeprovisioningEngine: channels → category → role
//! - BatchOrchestrator: sequential job queue over either engine
//! - ProgressReporter: renders a run and edits the status message

pub mod batch;
pub mod commands;
pub mod config;
pub mod deprovision;
pub mod error;
pub mod handler;
pub mod job;
pub mod progress;
pub mod protected;
pub mod provision;
pub mod registry;
pub mod resolver;
pub mod workspace;
