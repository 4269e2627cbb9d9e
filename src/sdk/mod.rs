//! Steam SDK boundary
//!
//! The vendor SDK exposes process-wide singleton interfaces; everything the
//! bridge needs from them is captured here as object-safe traits so the rest
//! of the crate depends on injected handles instead of global state. The
//! in-memory [`mock`] backend implements the same surface for tests and for
//! running without the real platform attached.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod call;
pub mod mock;

pub use call::{
    ApiCall, CallFailure, CallPayload, CallResult, CallResultKind, CallStatus,
    LeaderboardFindResult, LeaderboardScoreUploaded, LeaderboardScoresDownloaded,
};

/// Steam's native 64-bit account identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SteamId(pub u64);

/// Session-scoped runtime handle naming a leaderboard. Not stable across
/// platform sessions; zero is the invalid sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeaderboardHandle(pub u64);

impl LeaderboardHandle {
    pub const INVALID: LeaderboardHandle = LeaderboardHandle(0);

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

/// Handle to one downloaded batch of leaderboard rows, consumed via
/// [`UserStatsApi::downloaded_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntriesHandle(pub u64);

/// Presence as the platform reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersonaState {
    #[default]
    Offline,
    Online,
    Busy,
    Away,
    Snooze,
    LookingToTrade,
    LookingToPlay,
    Invisible,
}

/// Wire-level leaderboard sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardSortMethod {
    None,
    Ascending,
    Descending,
}

/// Wire-level leaderboard value presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardDisplayType {
    None,
    Numeric,
    TimeSeconds,
    TimeMilliSeconds,
}

/// Conflict policy for score uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardUploadMethod {
    /// Keep the better of the existing and submitted score per sort order.
    KeepBest,
    /// Overwrite whatever is stored.
    ForceUpdate,
}

/// Scope of a leaderboard entry download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardDataRequest {
    /// Absolute 1-based inclusive range over the whole board.
    Global,
    /// Window positioned relative to the current user's row, 0-based.
    GlobalAroundUser,
    /// The current user's friends; the platform defines the window.
    Friends,
}

/// One row as the platform stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLeaderboardEntry {
    pub user: SteamId,
    pub global_rank: i32,
    pub score: i32,
}

/// Severity of a diagnostic message coming out of the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Message,
    Warning,
}

/// Sink for SDK diagnostic text.
pub type WarningHook = Box<dyn Fn(WarningSeverity, &str) + Send + Sync>;

/// Process-level SDK surface: lifecycle plus subsystem accessors.
///
/// Accessors return `None` when the subsystem is unavailable, which aborts
/// initialization; past that point the adapter never asks again.
pub trait SteamSdk: Send + Sync {
    /// True when the process must be relaunched through the Steam client.
    fn restart_app_if_necessary(&self, app_id: u32) -> bool;

    /// Connect to the platform. False means no Steam client is reachable.
    fn init(&self) -> bool;

    fn shutdown(&self);

    /// Pump the SDK's internal callback queue. Called once per host frame.
    fn run_callbacks(&self);

    fn set_warning_hook(&self, hook: WarningHook);

    fn user(&self) -> Option<Arc<dyn UserApi>>;
    fn friends(&self) -> Option<Arc<dyn FriendsApi>>;
    fn user_stats(&self) -> Option<Arc<dyn UserStatsApi>>;
    fn remote_storage(&self) -> Option<Arc<dyn RemoteStorageApi>>;
    fn utils(&self) -> Option<Arc<dyn UtilsApi>>;
}

/// Local session identity.
pub trait UserApi: Send + Sync {
    fn logged_on(&self) -> bool;
    fn steam_id(&self) -> SteamId;
}

/// Social graph and presence.
pub trait FriendsApi: Send + Sync {
    fn persona_name(&self) -> String;
    fn persona_state(&self) -> PersonaState;
    fn friend_count(&self) -> i32;
    fn friend_by_index(&self, index: i32) -> SteamId;
    fn friend_persona_name(&self, id: SteamId) -> String;
    fn friend_persona_state(&self, id: SteamId) -> PersonaState;
}

/// Achievements, stats, and leaderboards.
///
/// The platform requires one successful `request_current_stats` per session
/// before any of the read/write calls below are valid, and batches writes
/// until `store_stats`.
pub trait UserStatsApi: Send + Sync {
    fn request_current_stats(&self) -> bool;
    fn store_stats(&self) -> bool;
    fn reset_all_stats(&self, achievements_too: bool) -> bool;

    fn num_achievements(&self) -> u32;
    fn achievement_name(&self, index: u32) -> Option<String>;
    /// Display attributes are a named, untyped property bag on the platform
    /// side; the bridge only ever asks for "name", "desc", and "hidden".
    fn achievement_display_attribute(&self, name: &str, key: &str) -> Option<String>;
    /// Unlock flag plus unix unlock time, or `None` for an unknown name.
    fn achievement_unlock_info(&self, name: &str) -> Option<(bool, u32)>;
    fn set_achievement(&self, name: &str) -> bool;
    fn indicate_achievement_progress(&self, name: &str, progress: u32, max_progress: u32) -> bool;

    fn stat(&self, name: &str) -> Option<f32>;
    fn set_stat(&self, name: &str, value: f32) -> bool;

    fn find_leaderboard(&self, name: &str) -> ApiCall;
    fn find_or_create_leaderboard(
        &self,
        name: &str,
        sort: LeaderboardSortMethod,
        display: LeaderboardDisplayType,
    ) -> ApiCall;
    fn leaderboard_sort_method(&self, handle: LeaderboardHandle) -> LeaderboardSortMethod;
    fn leaderboard_display_type(&self, handle: LeaderboardHandle) -> LeaderboardDisplayType;
    fn leaderboard_entry_count(&self, handle: LeaderboardHandle) -> i32;
    fn download_entries(
        &self,
        handle: LeaderboardHandle,
        request: LeaderboardDataRequest,
        range_start: i32,
        range_end: i32,
    ) -> ApiCall;
    fn download_entries_for_users(&self, handle: LeaderboardHandle, users: &[SteamId]) -> ApiCall;
    fn upload_score(
        &self,
        handle: LeaderboardHandle,
        method: LeaderboardUploadMethod,
        score: i32,
    ) -> ApiCall;
    fn downloaded_entry(&self, entries: EntriesHandle, index: i32) -> Option<RawLeaderboardEntry>;
}

/// Cloud save files.
pub trait RemoteStorageApi: Send + Sync {
    fn file_exists(&self, name: &str) -> bool;
    /// Declared size in bytes; what `file_read` returns must match.
    fn file_size(&self, name: &str) -> i32;
    fn file_read(&self, name: &str, max_len: i32) -> Vec<u8>;
    fn file_write(&self, name: &str, data: &[u8]) -> bool;
    fn file_delete(&self, name: &str) -> bool;
}

/// Asynchronous call completion queries.
pub trait UtilsApi: Send + Sync {
    fn call_status(&self, call: ApiCall) -> CallStatus;
    /// Result payload of a completed call. `None` once consumed or unknown.
    fn call_result(&self, call: ApiCall) -> Option<CallPayload>;
}
