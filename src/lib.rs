//! steambridge - a synchronous bridge to Steam's online services
//!
//! Game code is written as straight-line synchronous calls; Steam's SDK is
//! asynchronous, poll-driven, and hands out volatile runtime handles. This
//! crate sits between the two:
//! - adapter: the facade gameplay and UI code call into
//! - bridge: blocking waits over the SDK's poll-and-callback completion
//! - stats: the per-session request-once / flush-on-dirty stats cache
//! - leaderboards: stable string identities over volatile runtime handles
//! - identity: Steam's 64-bit account ids widened into engine 128-bit ids
//! - sdk: the vendor SDK boundary as traits, plus an in-memory backend
//!
//! The host initializes one [`OnlinePlatformSteam`] and drives
//! [`OnlinePlatformSteam::update`] once per frame; everything else is a
//! blocking call that returns a [`Result`].

pub mod adapter;
pub mod bridge;
pub mod config;
pub mod error;
pub mod identity;
pub mod leaderboards;
pub mod sdk;
pub mod stats;
pub mod types;

// Re-export the surface most callers need.
pub use adapter::{AdapterState, InitOutcome, OnlinePlatformSteam};
pub use bridge::ShutdownFlag;
pub use config::SteamSettings;
pub use error::{Error, Result};
pub use identity::{steam_id_from_user, user_id_from_steam, OnlineUserId};
pub use types::{
    Achievement, Leaderboard, LeaderboardEntry, LeaderboardSortMode, LeaderboardValueFormat,
    OnlineUser, PresenceState,
};
