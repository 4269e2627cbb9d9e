//! Caller-facing online data model.
//!
//! Everything here is a snapshot produced by a single query; nothing is
//! cached or kept alive by the bridge. The one exception to pure ephemerality
//! is [`Leaderboard::identifier`], which string-encodes the platform's
//! runtime handle so a board can be referenced across calls by value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::OnlineUserId;
use crate::sdk::{LeaderboardDisplayType, LeaderboardSortMethod, PersonaState};

/// Presence of an online user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceState {
    Offline,
    Online,
    Busy,
    Away,
}

impl From<PersonaState> for PresenceState {
    fn from(state: PersonaState) -> Self {
        match state {
            PersonaState::Offline | PersonaState::Invisible => PresenceState::Offline,
            PersonaState::Online | PersonaState::LookingToTrade | PersonaState::LookingToPlay => {
                PresenceState::Online
            }
            PersonaState::Busy => PresenceState::Busy,
            PersonaState::Away | PersonaState::Snooze => PresenceState::Away,
        }
    }
}

/// A user as the platform currently sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineUser {
    pub id: OnlineUserId,
    pub name: String,
    pub presence: PresenceState,
}

/// Read-only achievement snapshot. Unlocking goes through the adapter as a
/// write-through command, not by mutating this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    /// Stable platform key.
    pub identifier: String,
    /// Game-facing name. Currently the identifier verbatim; see
    /// [`OnlinePlatformSteam::achievement_name_of`](crate::adapter::OnlinePlatformSteam::achievement_name_of).
    pub name: String,
    /// Localized display title.
    pub title: String,
    /// Localized description.
    pub description: String,
    /// Hidden until unlocked.
    pub hidden: bool,
    /// Present once unlocked.
    pub unlock_time: Option<DateTime<Utc>>,
    /// 0 or 100; the platform's fractional progress metric is not surfaced.
    pub progress: f32,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.unlock_time.is_some()
    }
}

/// Sort order of a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardSortMode {
    None,
    Ascending,
    Descending,
}

impl From<LeaderboardSortMethod> for LeaderboardSortMode {
    fn from(method: LeaderboardSortMethod) -> Self {
        match method {
            LeaderboardSortMethod::None => LeaderboardSortMode::None,
            LeaderboardSortMethod::Ascending => LeaderboardSortMode::Ascending,
            LeaderboardSortMethod::Descending => LeaderboardSortMode::Descending,
        }
    }
}

impl From<LeaderboardSortMode> for LeaderboardSortMethod {
    fn from(mode: LeaderboardSortMode) -> Self {
        match mode {
            LeaderboardSortMode::None => LeaderboardSortMethod::None,
            LeaderboardSortMode::Ascending => LeaderboardSortMethod::Ascending,
            LeaderboardSortMode::Descending => LeaderboardSortMethod::Descending,
        }
    }
}

/// How leaderboard values are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardValueFormat {
    Undefined,
    Numeric,
    Seconds,
    Milliseconds,
}

impl From<LeaderboardDisplayType> for LeaderboardValueFormat {
    fn from(display: LeaderboardDisplayType) -> Self {
        match display {
            LeaderboardDisplayType::None => LeaderboardValueFormat::Undefined,
            LeaderboardDisplayType::Numeric => LeaderboardValueFormat::Numeric,
            LeaderboardDisplayType::TimeSeconds => LeaderboardValueFormat::Seconds,
            LeaderboardDisplayType::TimeMilliSeconds => LeaderboardValueFormat::Milliseconds,
        }
    }
}

impl From<LeaderboardValueFormat> for LeaderboardDisplayType {
    fn from(format: LeaderboardValueFormat) -> Self {
        match format {
            LeaderboardValueFormat::Undefined => LeaderboardDisplayType::None,
            LeaderboardValueFormat::Numeric => LeaderboardDisplayType::Numeric,
            LeaderboardValueFormat::Seconds => LeaderboardDisplayType::TimeSeconds,
            LeaderboardValueFormat::Milliseconds => LeaderboardDisplayType::TimeMilliSeconds,
        }
    }
}

/// A leaderboard as resolved for this session.
///
/// `identifier` is the decimal-encoded runtime handle and the only part that
/// survives across calls; the handle itself is re-validated on every use
/// because it is not guaranteed stable across platform reconnects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub name: String,
    pub identifier: String,
    pub sort_mode: LeaderboardSortMode,
    pub value_format: LeaderboardValueFormat,
    pub entry_count: i32,
}

/// One leaderboard row from a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user: OnlineUser,
    /// 1-based global rank.
    pub rank: i32,
    pub score: i32,
}
