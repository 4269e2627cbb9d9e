//! In-memory Steam backend.
//!
//! Implements the full [`SteamSdk`](super::SteamSdk) surface against local
//! state so the bridge can run without the real platform attached. Used by
//! the test suite; asynchronous calls mature after a configurable number of
//! completion polls so the waiting path is exercised for real, and the usual
//! platform failures (rejected calls, mismatched payloads, short reads,
//! missing subsystems) can be injected.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::call::{ApiCall, CallFailure, CallPayload, CallStatus};
use super::{
    EntriesHandle, FriendsApi, LeaderboardDataRequest, LeaderboardDisplayType, LeaderboardHandle,
    LeaderboardSortMethod, LeaderboardUploadMethod, PersonaState, RawLeaderboardEntry,
    RemoteStorageApi, SteamId, SteamSdk, UserApi, UserStatsApi, UtilsApi, WarningHook,
    WarningSeverity,
};

/// Unix time stamped onto unlocks; fixed so assertions are deterministic.
pub const MOCK_UNLOCK_TIME: u32 = 1_700_000_000;

/// Subsystems that can be withheld to simulate a broken installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    User,
    Friends,
    UserStats,
    RemoteStorage,
    Utils,
}

#[derive(Debug, Clone)]
struct Friend {
    id: SteamId,
    name: String,
    state: PersonaState,
}

#[derive(Debug, Clone)]
struct AchievementDef {
    id: String,
    title: String,
    description: String,
    hidden: bool,
    unlocked: bool,
    unlock_time: u32,
}

#[derive(Debug, Clone)]
struct Board {
    handle: LeaderboardHandle,
    name: String,
    sort: LeaderboardSortMethod,
    display: LeaderboardDisplayType,
    rows: HashMap<u64, i32>,
}

#[derive(Debug, Clone)]
struct PendingCall {
    remaining_polls: u32,
    failure: Option<CallFailure>,
    payload: CallPayload,
}

#[derive(Default)]
struct World {
    initialized: bool,
    fail_init: bool,
    restart_required: bool,
    restart_checked_with: Option<u32>,
    withheld: HashSet<Subsystem>,

    logged_on: bool,
    local_user: SteamId,
    persona_name: String,
    persona_state: PersonaState,
    friends: Vec<Friend>,

    achievements: Vec<AchievementDef>,
    stats: HashMap<String, f32>,
    stat_defaults: HashMap<String, f32>,
    fail_stats_requests: bool,
    stats_requests: u32,
    stats_stores: u32,
    callbacks_pumped: u32,

    boards: Vec<Board>,
    next_handle: u64,
    downloads: HashMap<u64, Vec<RawLeaderboardEntry>>,
    next_entries: u64,
    last_window: Option<(LeaderboardDataRequest, i32, i32)>,

    files: HashMap<String, Vec<u8>>,
    truncate_next_read: Option<usize>,

    calls: HashMap<u64, PendingCall>,
    next_call: u64,
    call_latency: u32,
    fail_next_call: Option<CallFailure>,
    mismatch_next_payload: bool,
}

struct MockCore {
    world: Mutex<World>,
    warning_hook: Mutex<Option<WarningHook>>,
}

/// The in-memory platform. Cheap to clone; all clones share one world.
#[derive(Clone)]
pub struct MockSteam {
    core: Arc<MockCore>,
}

impl Default for MockSteam {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSteam {
    pub fn new() -> Self {
        let world = World {
            call_latency: 2,
            next_handle: 1,
            next_call: 1,
            next_entries: 1,
            ..Default::default()
        };
        Self {
            core: Arc::new(MockCore {
                world: Mutex::new(world),
                warning_hook: Mutex::new(None),
            }),
        }
    }

    fn world(&self) -> MutexGuard<'_, World> {
        self.core.world.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- session setup ---

    pub fn log_on(&self, id: SteamId, name: &str) {
        let mut world = self.world();
        world.logged_on = true;
        world.local_user = id;
        world.persona_name = name.to_string();
        world.persona_state = PersonaState::Online;
    }

    pub fn log_off(&self) {
        self.world().logged_on = false;
    }

    pub fn set_persona_state(&self, state: PersonaState) {
        self.world().persona_state = state;
    }

    pub fn add_friend(&self, id: SteamId, name: &str, state: PersonaState) {
        self.world().friends.push(Friend {
            id,
            name: name.to_string(),
            state,
        });
    }

    // --- schema setup ---

    pub fn define_achievement(&self, id: &str, title: &str, description: &str, hidden: bool) {
        self.world().achievements.push(AchievementDef {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            hidden,
            unlocked: false,
            unlock_time: 0,
        });
    }

    pub fn define_stat(&self, name: &str, initial: f32) {
        let mut world = self.world();
        world.stats.insert(name.to_string(), initial);
        world.stat_defaults.insert(name.to_string(), initial);
    }

    pub fn put_file(&self, name: &str, data: Vec<u8>) {
        self.world().files.insert(name.to_string(), data);
    }

    // --- fault injection ---

    pub fn set_call_latency(&self, polls: u32) {
        self.world().call_latency = polls;
    }

    pub fn fail_next_call(&self, reason: CallFailure) {
        self.world().fail_next_call = Some(reason);
    }

    /// The next call completes with a payload of the wrong kind.
    pub fn mismatch_next_payload(&self) {
        self.world().mismatch_next_payload = true;
    }

    /// The next file read returns at most `len` bytes regardless of the
    /// declared size.
    pub fn truncate_next_read(&self, len: usize) {
        self.world().truncate_next_read = Some(len);
    }

    pub fn withhold(&self, subsystem: Subsystem) {
        self.world().withheld.insert(subsystem);
    }

    pub fn fail_init(&self) {
        self.world().fail_init = true;
    }

    pub fn require_restart(&self) {
        self.world().restart_required = true;
    }

    pub fn fail_stats_requests(&self, fail: bool) {
        self.world().fail_stats_requests = fail;
    }

    // --- observation ---

    pub fn is_initialized(&self) -> bool {
        self.world().initialized
    }

    pub fn restart_checked_with(&self) -> Option<u32> {
        self.world().restart_checked_with
    }

    pub fn stats_request_count(&self) -> u32 {
        self.world().stats_requests
    }

    pub fn stats_store_count(&self) -> u32 {
        self.world().stats_stores
    }

    pub fn callbacks_pumped(&self) -> u32 {
        self.world().callbacks_pumped
    }

    pub fn last_download_window(&self) -> Option<(LeaderboardDataRequest, i32, i32)> {
        self.world().last_window
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.world().files.get(name).cloned()
    }

    pub fn achievement_unlocked(&self, id: &str) -> bool {
        self.world()
            .achievements
            .iter()
            .any(|a| a.id == id && a.unlocked)
    }

    pub fn stat_value(&self, name: &str) -> Option<f32> {
        self.world().stats.get(name).copied()
    }

    /// Push a diagnostic line through the installed warning hook, as the SDK
    /// would.
    pub fn emit_diagnostic(&self, severity: WarningSeverity, text: &str) {
        if let Some(hook) = self.core.warning_hook.lock().unwrap_or_else(|e| e.into_inner()).as_ref()
        {
            hook(severity, text);
        }
    }
}

// --- internal helpers ---

impl World {
    fn issue_call(&mut self, payload: CallPayload) -> ApiCall {
        let payload = if self.mismatch_next_payload {
            self.mismatch_next_payload = false;
            mismatched(&payload)
        } else {
            payload
        };
        let failure = self.fail_next_call.take();
        let call = ApiCall(self.next_call);
        self.next_call += 1;
        self.calls.insert(
            call.0,
            PendingCall {
                remaining_polls: self.call_latency,
                failure,
                payload,
            },
        );
        call
    }

    fn handle_by_name(&self, name: &str) -> Option<LeaderboardHandle> {
        self.boards.iter().find(|b| b.name == name).map(|b| b.handle)
    }

    fn board_by_handle(&self, handle: LeaderboardHandle) -> Option<&Board> {
        self.boards.iter().find(|b| b.handle == handle)
    }

    fn create_board(
        &mut self,
        name: &str,
        sort: LeaderboardSortMethod,
        display: LeaderboardDisplayType,
    ) -> LeaderboardHandle {
        let handle = LeaderboardHandle(self.next_handle);
        self.next_handle += 1;
        self.boards.push(Board {
            handle,
            name: name.to_string(),
            sort,
            display,
            rows: HashMap::new(),
        });
        handle
    }

    fn ranked_rows(&self, board: &Board) -> Vec<RawLeaderboardEntry> {
        let mut rows: Vec<(u64, i32)> = board.rows.iter().map(|(u, s)| (*u, *s)).collect();
        match board.sort {
            LeaderboardSortMethod::Ascending => rows.sort_by_key(|(u, s)| (*s, *u)),
            _ => rows.sort_by_key(|(u, s)| (std::cmp::Reverse(*s), *u)),
        }
        rows.iter()
            .enumerate()
            .map(|(i, (user, score))| RawLeaderboardEntry {
                user: SteamId(*user),
                global_rank: i as i32 + 1,
                score: *score,
            })
            .collect()
    }

    fn snapshot_download(
        &mut self,
        handle: LeaderboardHandle,
        rows: Vec<RawLeaderboardEntry>,
    ) -> CallPayload {
        let entries = EntriesHandle(self.next_entries);
        self.next_entries += 1;
        let count = rows.len() as i32;
        self.downloads.insert(entries.0, rows);
        CallPayload::LeaderboardScoresDownloaded {
            handle,
            entries,
            count,
        }
    }
}

fn mismatched(payload: &CallPayload) -> CallPayload {
    match payload {
        CallPayload::LeaderboardFindResult { .. } => CallPayload::LeaderboardScoreUploaded {
            accepted: true,
            handle: LeaderboardHandle::INVALID,
            score: 0,
            score_changed: false,
            global_rank_new: 0,
            global_rank_previous: 0,
        },
        _ => CallPayload::LeaderboardFindResult {
            handle: LeaderboardHandle::INVALID,
            found: false,
        },
    }
}

fn better_score(sort: LeaderboardSortMethod, existing: i32, submitted: i32) -> i32 {
    match sort {
        LeaderboardSortMethod::Ascending => existing.min(submitted),
        _ => existing.max(submitted),
    }
}

// --- SDK surface ---

impl SteamSdk for MockSteam {
    fn restart_app_if_necessary(&self, app_id: u32) -> bool {
        let mut world = self.world();
        world.restart_checked_with = Some(app_id);
        world.restart_required
    }

    fn init(&self) -> bool {
        let mut world = self.world();
        if world.fail_init {
            return false;
        }
        world.initialized = true;
        true
    }

    fn shutdown(&self) {
        let mut world = self.world();
        world.initialized = false;
        world.calls.clear();
        world.downloads.clear();
    }

    fn run_callbacks(&self) {
        self.world().callbacks_pumped += 1;
    }

    fn set_warning_hook(&self, hook: WarningHook) {
        *self
            .core
            .warning_hook
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(hook);
    }

    fn user(&self) -> Option<Arc<dyn UserApi>> {
        if self.world().withheld.contains(&Subsystem::User) {
            return None;
        }
        Some(Arc::new(self.clone()))
    }

    fn friends(&self) -> Option<Arc<dyn FriendsApi>> {
        if self.world().withheld.contains(&Subsystem::Friends) {
            return None;
        }
        Some(Arc::new(self.clone()))
    }

    fn user_stats(&self) -> Option<Arc<dyn UserStatsApi>> {
        if self.world().withheld.contains(&Subsystem::UserStats) {
            return None;
        }
        Some(Arc::new(self.clone()))
    }

    fn remote_storage(&self) -> Option<Arc<dyn RemoteStorageApi>> {
        if self.world().withheld.contains(&Subsystem::RemoteStorage) {
            return None;
        }
        Some(Arc::new(self.clone()))
    }

    fn utils(&self) -> Option<Arc<dyn UtilsApi>> {
        if self.world().withheld.contains(&Subsystem::Utils) {
            return None;
        }
        Some(Arc::new(self.clone()))
    }
}

impl UserApi for MockSteam {
    fn logged_on(&self) -> bool {
        self.world().logged_on
    }

    fn steam_id(&self) -> SteamId {
        self.world().local_user
    }
}

impl FriendsApi for MockSteam {
    fn persona_name(&self) -> String {
        self.world().persona_name.clone()
    }

    fn persona_state(&self) -> PersonaState {
        self.world().persona_state
    }

    fn friend_count(&self) -> i32 {
        self.world().friends.len() as i32
    }

    fn friend_by_index(&self, index: i32) -> SteamId {
        self.world()
            .friends
            .get(index as usize)
            .map(|f| f.id)
            .unwrap_or(SteamId(0))
    }

    fn friend_persona_name(&self, id: SteamId) -> String {
        let world = self.world();
        if world.logged_on && world.local_user == id {
            return world.persona_name.clone();
        }
        world
            .friends
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.name.clone())
            .unwrap_or_default()
    }

    fn friend_persona_state(&self, id: SteamId) -> PersonaState {
        let world = self.world();
        if world.logged_on && world.local_user == id {
            return world.persona_state;
        }
        world
            .friends
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.state)
            .unwrap_or(PersonaState::Offline)
    }
}

impl UserStatsApi for MockSteam {
    fn request_current_stats(&self) -> bool {
        let mut world = self.world();
        world.stats_requests += 1;
        world.logged_on && !world.fail_stats_requests
    }

    fn store_stats(&self) -> bool {
        let mut world = self.world();
        world.stats_stores += 1;
        world.logged_on
    }

    fn reset_all_stats(&self, achievements_too: bool) -> bool {
        let mut world = self.world();
        let defaults = world.stat_defaults.clone();
        world.stats = defaults;
        if achievements_too {
            for achievement in &mut world.achievements {
                achievement.unlocked = false;
                achievement.unlock_time = 0;
            }
        }
        true
    }

    fn num_achievements(&self) -> u32 {
        self.world().achievements.len() as u32
    }

    fn achievement_name(&self, index: u32) -> Option<String> {
        self.world()
            .achievements
            .get(index as usize)
            .map(|a| a.id.clone())
    }

    fn achievement_display_attribute(&self, name: &str, key: &str) -> Option<String> {
        let world = self.world();
        let achievement = world.achievements.iter().find(|a| a.id == name)?;
        match key {
            "name" => Some(achievement.title.clone()),
            "desc" => Some(achievement.description.clone()),
            "hidden" => Some(if achievement.hidden { "1" } else { "0" }.to_string()),
            _ => None,
        }
    }

    fn achievement_unlock_info(&self, name: &str) -> Option<(bool, u32)> {
        self.world()
            .achievements
            .iter()
            .find(|a| a.id == name)
            .map(|a| (a.unlocked, a.unlock_time))
    }

    fn set_achievement(&self, name: &str) -> bool {
        let mut world = self.world();
        if !world.logged_on {
            return false;
        }
        match world.achievements.iter_mut().find(|a| a.id == name) {
            Some(achievement) => {
                if !achievement.unlocked {
                    achievement.unlocked = true;
                    achievement.unlock_time = MOCK_UNLOCK_TIME;
                }
                true
            }
            None => false,
        }
    }

    fn indicate_achievement_progress(&self, name: &str, _progress: u32, _max: u32) -> bool {
        self.world().achievements.iter().any(|a| a.id == name)
    }

    fn stat(&self, name: &str) -> Option<f32> {
        self.world().stats.get(name).copied()
    }

    fn set_stat(&self, name: &str, value: f32) -> bool {
        let mut world = self.world();
        match world.stats.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn find_leaderboard(&self, name: &str) -> ApiCall {
        let mut world = self.world();
        let payload = match world.handle_by_name(name) {
            Some(handle) => CallPayload::LeaderboardFindResult {
                handle,
                found: true,
            },
            None => CallPayload::LeaderboardFindResult {
                handle: LeaderboardHandle::INVALID,
                found: false,
            },
        };
        world.issue_call(payload)
    }

    fn find_or_create_leaderboard(
        &self,
        name: &str,
        sort: LeaderboardSortMethod,
        display: LeaderboardDisplayType,
    ) -> ApiCall {
        let mut world = self.world();
        let handle = match world.handle_by_name(name) {
            Some(handle) => handle,
            None => world.create_board(name, sort, display),
        };
        let payload = CallPayload::LeaderboardFindResult {
            handle,
            found: true,
        };
        world.issue_call(payload)
    }

    fn leaderboard_sort_method(&self, handle: LeaderboardHandle) -> LeaderboardSortMethod {
        self.world()
            .board_by_handle(handle)
            .map(|b| b.sort)
            .unwrap_or(LeaderboardSortMethod::None)
    }

    fn leaderboard_display_type(&self, handle: LeaderboardHandle) -> LeaderboardDisplayType {
        self.world()
            .board_by_handle(handle)
            .map(|b| b.display)
            .unwrap_or(LeaderboardDisplayType::None)
    }

    fn leaderboard_entry_count(&self, handle: LeaderboardHandle) -> i32 {
        self.world()
            .board_by_handle(handle)
            .map(|b| b.rows.len() as i32)
            .unwrap_or(0)
    }

    fn download_entries(
        &self,
        handle: LeaderboardHandle,
        request: LeaderboardDataRequest,
        range_start: i32,
        range_end: i32,
    ) -> ApiCall {
        let mut world = self.world();
        world.last_window = Some((request, range_start, range_end));
        let Some(board) = world.board_by_handle(handle).cloned() else {
            return ApiCall::INVALID;
        };
        let ranked = world.ranked_rows(&board);
        let rows: Vec<RawLeaderboardEntry> = match request {
            LeaderboardDataRequest::Global => {
                let begin = (range_start.max(1) - 1) as usize;
                let end = (range_end.max(0) as usize).min(ranked.len());
                if begin >= end {
                    Vec::new()
                } else {
                    ranked[begin..end].to_vec()
                }
            }
            LeaderboardDataRequest::GlobalAroundUser => {
                let anchor = ranked
                    .iter()
                    .position(|row| row.user == world.local_user)
                    .unwrap_or(0) as i32;
                let begin = (anchor + range_start).clamp(0, ranked.len() as i32) as usize;
                let len = (range_end - range_start).max(0) as usize;
                let end = (begin + len).min(ranked.len());
                ranked[begin..end].to_vec()
            }
            LeaderboardDataRequest::Friends => {
                let mut scope: HashSet<u64> =
                    world.friends.iter().map(|f| f.id.0).collect();
                scope.insert(world.local_user.0);
                ranked
                    .into_iter()
                    .filter(|row| scope.contains(&row.user.0))
                    .collect()
            }
        };
        let payload = world.snapshot_download(handle, rows);
        world.issue_call(payload)
    }

    fn download_entries_for_users(&self, handle: LeaderboardHandle, users: &[SteamId]) -> ApiCall {
        let mut world = self.world();
        let Some(board) = world.board_by_handle(handle).cloned() else {
            return ApiCall::INVALID;
        };
        let scope: HashSet<u64> = users.iter().map(|u| u.0).collect();
        let rows: Vec<RawLeaderboardEntry> = world
            .ranked_rows(&board)
            .into_iter()
            .filter(|row| scope.contains(&row.user.0))
            .collect();
        let payload = world.snapshot_download(handle, rows);
        world.issue_call(payload)
    }

    fn upload_score(
        &self,
        handle: LeaderboardHandle,
        method: LeaderboardUploadMethod,
        score: i32,
    ) -> ApiCall {
        let mut world = self.world();
        if !world.logged_on {
            return ApiCall::INVALID;
        }
        let user = world.local_user.0;
        let Some(board) = world.boards.iter_mut().find(|b| b.handle == handle) else {
            return ApiCall::INVALID;
        };
        let sort = board.sort;
        let previous = board.rows.get(&user).copied();
        let stored = match (method, previous) {
            (LeaderboardUploadMethod::ForceUpdate, _) | (_, None) => score,
            (LeaderboardUploadMethod::KeepBest, Some(existing)) => {
                better_score(sort, existing, score)
            }
        };
        board.rows.insert(user, stored);
        let changed = previous != Some(stored);
        let payload = CallPayload::LeaderboardScoreUploaded {
            accepted: true,
            handle,
            score: stored,
            score_changed: changed,
            global_rank_new: 0,
            global_rank_previous: 0,
        };
        world.issue_call(payload)
    }

    fn downloaded_entry(&self, entries: EntriesHandle, index: i32) -> Option<RawLeaderboardEntry> {
        self.world()
            .downloads
            .get(&entries.0)
            .and_then(|rows| rows.get(index as usize))
            .copied()
    }
}

impl RemoteStorageApi for MockSteam {
    fn file_exists(&self, name: &str) -> bool {
        self.world().files.contains_key(name)
    }

    fn file_size(&self, name: &str) -> i32 {
        self.world()
            .files
            .get(name)
            .map(|data| data.len() as i32)
            .unwrap_or(0)
    }

    fn file_read(&self, name: &str, max_len: i32) -> Vec<u8> {
        let mut world = self.world();
        let truncate = world.truncate_next_read.take();
        let Some(data) = world.files.get(name) else {
            return Vec::new();
        };
        let mut len = data.len().min(max_len.max(0) as usize);
        if let Some(limit) = truncate {
            len = len.min(limit);
        }
        data[..len].to_vec()
    }

    fn file_write(&self, name: &str, data: &[u8]) -> bool {
        self.world().files.insert(name.to_string(), data.to_vec());
        true
    }

    fn file_delete(&self, name: &str) -> bool {
        self.world().files.remove(name).is_some()
    }
}

impl UtilsApi for MockSteam {
    fn call_status(&self, call: ApiCall) -> CallStatus {
        let mut world = self.world();
        let Some(pending) = world.calls.get_mut(&call.0) else {
            return CallStatus::Failed(CallFailure::InvalidHandle);
        };
        if pending.remaining_polls > 0 {
            pending.remaining_polls -= 1;
            return CallStatus::Pending;
        }
        match pending.failure {
            Some(reason) => CallStatus::Failed(reason),
            None => CallStatus::Ready,
        }
    }

    fn call_result(&self, call: ApiCall) -> Option<CallPayload> {
        self.world().calls.get(&call.0).map(|c| c.payload.clone())
    }
}
