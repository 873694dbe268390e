//! rvbmo-sdk: the platform surface the team-pod bot provisions against.
//!
//! The bot core only ever talks to [`platform::PlatformClient`]. Two
//! backends ship with the SDK:
//! - [`discord::DiscordPlatform`]: a guild on Discord, via serenity's HTTP client
//! - [`memory::MemoryPlatform`]: an in-process guild that records every call

pub mod discord;
pub mod error;
pub mod memory;
pub mod platform;
pub mod types;

pub use error::PlatformError;
pub use platform::PlatformClient;
