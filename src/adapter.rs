//! The Steam online platform facade.
//!
//! One `OnlinePlatformSteam` instance owns the resolved SDK subsystem handles
//! and exposes the whole operation surface as synchronous, result-returning
//! methods: session and identity queries, friends, achievements, stats,
//! leaderboards, and cloud saves. Everything runs on the host's main
//! execution context; the host calls [`OnlinePlatformSteam::update`] once per
//! frame after a successful [`OnlinePlatformSteam::initialize`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::bridge::ShutdownFlag;
use crate::config::SteamSettings;
use crate::error::{Error, Result};
use crate::identity::{user_id_from_steam, OnlineUserId};
use crate::leaderboards::LeaderboardRegistry;
use crate::sdk::{
    FriendsApi, RemoteStorageApi, SteamSdk, UserApi, UserStatsApi, UtilsApi, WarningSeverity,
};
use crate::stats::StatsCache;
use crate::types::{
    Achievement, Leaderboard, LeaderboardEntry, LeaderboardSortMode, LeaderboardValueFormat,
    OnlineUser,
};

/// Lifecycle state of the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Uninitialized,
    Initializing,
    Ready,
    ShuttingDown,
}

/// Successful initialization outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The platform is connected and operations are available.
    Ready,
    /// The platform wants the process relaunched through the Steam client.
    /// The shutdown flag has been raised; the current process should exit.
    /// This is a controlled termination, not a failure.
    RelaunchViaSteam,
}

/// Subsystem handles resolved at initialization. Read-only afterwards.
#[derive(Clone)]
struct Subsystems {
    user: Arc<dyn UserApi>,
    friends: Arc<dyn FriendsApi>,
    user_stats: Arc<dyn UserStatsApi>,
    remote_storage: Arc<dyn RemoteStorageApi>,
    utils: Arc<dyn UtilsApi>,
}

/// Synchronous facade over the Steam online platform.
pub struct OnlinePlatformSteam {
    sdk: Arc<dyn SteamSdk>,
    settings: SteamSettings,
    quit: ShutdownFlag,
    state: AdapterState,
    subsystems: Option<Subsystems>,
    stats: StatsCache,
}

impl OnlinePlatformSteam {
    pub fn new(sdk: Arc<dyn SteamSdk>, settings: SteamSettings) -> Self {
        Self {
            sdk,
            settings,
            quit: ShutdownFlag::new(),
            state: AdapterState::Uninitialized,
            subsystems: None,
            stats: StatsCache::default(),
        }
    }

    /// Share the host's shutdown flag so an exit request aborts any wait.
    pub fn with_shutdown_flag(mut self, quit: ShutdownFlag) -> Self {
        self.quit = quit;
        self
    }

    pub fn shutdown_flag(&self) -> ShutdownFlag {
        self.quit.clone()
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Connect to the platform and resolve every required subsystem.
    ///
    /// Either the whole initialization succeeds or nothing is retained: a
    /// missing subsystem rolls the SDK back down and leaves the adapter
    /// `Uninitialized`. The relaunch-via-Steam case raises the shutdown flag
    /// and reports success with [`InitOutcome::RelaunchViaSteam`].
    pub fn initialize(&mut self) -> Result<InitOutcome> {
        if self.state != AdapterState::Uninitialized {
            return Err(Error::InvalidState(format!(
                "initialize called in {:?}",
                self.state
            )));
        }
        self.state = AdapterState::Initializing;

        let app_id = self.settings.effective_app_id();
        tracing::info!(app_id, "initializing Steam platform");

        // When running from the editor, place the appid discovery file next
        // to the process so the SDK can attach without a Steam launch.
        #[cfg(feature = "editor")]
        match std::env::current_dir() {
            Ok(dir) => {
                if let Err(err) = crate::config::write_app_id_file(&dir, app_id) {
                    tracing::warn!(%err, "could not write appid file");
                }
            }
            Err(err) => tracing::warn!(%err, "could not resolve working directory"),
        }

        if self.sdk.restart_app_if_necessary(app_id) {
            tracing::info!("restarting game via Steam");
            self.quit.request_exit();
            self.state = AdapterState::Uninitialized;
            return Ok(InitOutcome::RelaunchViaSteam);
        }

        if !self.sdk.init() {
            self.state = AdapterState::Uninitialized;
            return Err(Error::SubsystemUnavailable("Steam API"));
        }

        let Some(user) = self.sdk.user() else {
            return Err(self.abort_init("user"));
        };
        let Some(friends) = self.sdk.friends() else {
            return Err(self.abort_init("friends"));
        };
        let Some(user_stats) = self.sdk.user_stats() else {
            return Err(self.abort_init("user stats"));
        };
        let Some(remote_storage) = self.sdk.remote_storage() else {
            return Err(self.abort_init("remote storage"));
        };
        let Some(utils) = self.sdk.utils() else {
            return Err(self.abort_init("utils"));
        };

        self.sdk
            .set_warning_hook(Box::new(|severity, text| match severity {
                WarningSeverity::Message => tracing::info!(target: "steam", "{}", text),
                WarningSeverity::Warning => tracing::warn!(target: "steam", "{}", text),
            }));

        self.subsystems = Some(Subsystems {
            user,
            friends,
            user_stats,
            remote_storage,
            utils,
        });
        self.state = AdapterState::Ready;
        tracing::info!("Steam platform ready");
        Ok(InitOutcome::Ready)
    }

    /// Release every platform handle and shut the SDK down. Idempotent.
    pub fn deinitialize(&mut self) {
        if self.state == AdapterState::Uninitialized {
            return;
        }
        self.state = AdapterState::ShuttingDown;
        self.subsystems = None;
        self.stats.clear();
        self.sdk.shutdown();
        self.state = AdapterState::Uninitialized;
        tracing::info!("Steam platform shut down");
    }

    /// Per-frame tick: flush pending stat writes, then pump the SDK callback
    /// queue. A no-op unless the adapter is `Ready`.
    pub fn update(&mut self) {
        if self.state != AdapterState::Ready {
            return;
        }
        if let Some(subsystems) = &self.subsystems {
            self.stats.flush(&*subsystems.user_stats);
        }
        self.sdk.run_callbacks();
    }

    // --- session and identity ---

    pub fn is_logged_in(&self) -> bool {
        self.subsystems
            .as_ref()
            .map(|s| s.user.logged_on())
            .unwrap_or(false)
    }

    /// Steam owns session lifetime: logging in succeeds exactly when the
    /// platform already reports a live session.
    pub fn login(&self) -> Result<()> {
        self.session().map(|_| ())
    }

    /// Steam sessions cannot be ended by the game; always a no-op success.
    pub fn logout(&self) -> Result<()> {
        Ok(())
    }

    pub fn local_user(&self) -> Result<OnlineUser> {
        let subsystems = self.session()?;
        Ok(OnlineUser {
            id: user_id_from_steam(subsystems.user.steam_id()),
            name: subsystems.friends.persona_name(),
            presence: subsystems.friends.persona_state().into(),
        })
    }

    pub fn friends(&self) -> Result<Vec<OnlineUser>> {
        let subsystems = self.session()?;
        let count = subsystems.friends.friend_count();
        let mut friends = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count {
            let id = subsystems.friends.friend_by_index(index);
            friends.push(OnlineUser {
                id: user_id_from_steam(id),
                name: subsystems.friends.friend_persona_name(id),
                presence: subsystems.friends.friend_persona_state(id).into(),
            });
        }
        Ok(friends)
    }

    // --- achievements ---

    /// Game-facing name of a platform achievement identifier. Identity for
    /// now; the extension point for a per-title translation table.
    pub fn achievement_name_of(&self, identifier: &str) -> String {
        identifier.to_string()
    }

    /// Platform identifier of a game-facing achievement name. Inverse of
    /// [`Self::achievement_name_of`]; identity for now.
    pub fn achievement_id_of(&self, name: &str) -> String {
        name.to_string()
    }

    pub fn achievements(&mut self) -> Result<Vec<Achievement>> {
        let subsystems = self.session()?;
        self.stats.ensure_loaded(&*subsystems.user_stats)?;
        let api = &subsystems.user_stats;

        let count = api.num_achievements();
        let mut achievements = Vec::with_capacity(count as usize);
        for index in 0..count {
            let Some(identifier) = api.achievement_name(index) else {
                continue;
            };
            let title = api
                .achievement_display_attribute(&identifier, "name")
                .unwrap_or_default();
            let description = api
                .achievement_display_attribute(&identifier, "desc")
                .unwrap_or_default();
            let hidden =
                api.achievement_display_attribute(&identifier, "hidden").as_deref() == Some("1");
            let unlock = api.achievement_unlock_info(&identifier);
            let unlock_time = match unlock {
                Some((true, timestamp)) => DateTime::<Utc>::from_timestamp(timestamp as i64, 0),
                _ => None,
            };
            achievements.push(Achievement {
                name: self.achievement_name_of(&identifier),
                title,
                description,
                hidden,
                progress: if unlock_time.is_some() { 100.0 } else { 0.0 },
                unlock_time,
                identifier,
            });
        }
        Ok(achievements)
    }

    pub fn unlock_achievement(&mut self, identifier: &str) -> Result<()> {
        let subsystems = self.session()?;
        self.stats.ensure_loaded(&*subsystems.user_stats)?;
        let platform_name = self.achievement_id_of(identifier);
        if !subsystems.user_stats.set_achievement(&platform_name) {
            return Err(Error::NotFound(format!("achievement '{}'", identifier)));
        }
        self.stats.mark_dirty();
        subsystems
            .user_stats
            .indicate_achievement_progress(&platform_name, 100, 100);
        tracing::info!(achievement = identifier, "achievement unlocked");
        Ok(())
    }

    /// Record progress towards an achievement. Only full progress unlocks;
    /// anything below 100 succeeds without touching unlock state.
    pub fn unlock_achievement_progress(&mut self, identifier: &str, progress: f32) -> Result<()> {
        if progress >= 100.0 {
            return self.unlock_achievement(identifier);
        }
        Ok(())
    }

    /// Wipe the local user's stats and achievements. Development builds only.
    #[cfg(debug_assertions)]
    pub fn reset_achievements(&mut self) -> Result<()> {
        let subsystems = self.session()?;
        self.stats.ensure_loaded(&*subsystems.user_stats)?;
        self.stats.reset(&*subsystems.user_stats);
        tracing::warn!("all stats and achievements reset");
        Ok(())
    }

    // --- stats ---

    pub fn stat(&mut self, name: &str) -> Result<f32> {
        let subsystems = self.session()?;
        self.stats.ensure_loaded(&*subsystems.user_stats)?;
        subsystems
            .user_stats
            .stat(name)
            .ok_or_else(|| Error::NotFound(format!("stat '{}'", name)))
    }

    pub fn set_stat(&mut self, name: &str, value: f32) -> Result<()> {
        let subsystems = self.session()?;
        self.stats.ensure_loaded(&*subsystems.user_stats)?;
        if !subsystems.user_stats.set_stat(name, value) {
            return Err(Error::NotFound(format!("stat '{}'", name)));
        }
        self.stats.mark_dirty();
        Ok(())
    }

    // --- leaderboards ---

    pub fn find_leaderboard(&mut self, name: &str) -> Result<Leaderboard> {
        let subsystems = self.resolved()?;
        self.registry(&subsystems).find(name)
    }

    pub fn find_or_create_leaderboard(
        &mut self,
        name: &str,
        sort_mode: LeaderboardSortMode,
        value_format: LeaderboardValueFormat,
    ) -> Result<Leaderboard> {
        let subsystems = self.resolved()?;
        self.registry(&subsystems)
            .find_or_create(name, sort_mode, value_format)
    }

    /// Entries by absolute position; `start` is 0-based.
    pub fn leaderboard_entries(
        &mut self,
        leaderboard: &Leaderboard,
        start: u32,
        count: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        let subsystems = self.resolved()?;
        self.registry(&subsystems)
            .entries_range(leaderboard, &mut self.stats, start, count)
    }

    /// Entries in a window positioned on the current user's row.
    pub fn leaderboard_entries_around_user(
        &mut self,
        leaderboard: &Leaderboard,
        start: u32,
        count: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        let subsystems = self.resolved()?;
        self.registry(&subsystems)
            .entries_around_user(leaderboard, &mut self.stats, start, count)
    }

    pub fn leaderboard_entries_friends(
        &mut self,
        leaderboard: &Leaderboard,
    ) -> Result<Vec<LeaderboardEntry>> {
        let subsystems = self.resolved()?;
        self.registry(&subsystems)
            .entries_friends(leaderboard, &mut self.stats)
    }

    pub fn leaderboard_entries_for_users(
        &mut self,
        leaderboard: &Leaderboard,
        users: &[OnlineUserId],
    ) -> Result<Vec<LeaderboardEntry>> {
        let subsystems = self.resolved()?;
        self.registry(&subsystems)
            .entries_for_users(leaderboard, &mut self.stats, users)
    }

    /// Submit a score. `keep_best` keeps the better of the existing and
    /// submitted score per the board's sort order; otherwise the stored score
    /// is overwritten.
    pub fn submit_score(
        &mut self,
        leaderboard: &Leaderboard,
        score: i32,
        keep_best: bool,
    ) -> Result<()> {
        let subsystems = self.resolved()?;
        self.registry(&subsystems)
            .submit_score(leaderboard, &mut self.stats, score, keep_best)
    }

    // --- cloud saves ---

    /// Read a save by name. A file the platform does not have reads as
    /// empty; a short read against the declared size is an error, never a
    /// partial result.
    pub fn save_game(&self, name: &str) -> Result<Vec<u8>> {
        let storage = self.storage()?;
        if !storage.file_exists(name) {
            return Ok(Vec::new());
        }
        let size = storage.file_size(name);
        if size <= 0 {
            return Ok(Vec::new());
        }
        let data = storage.file_read(name, size);
        if data.len() as i32 != size {
            return Err(Error::SaveIo(format!(
                "'{}': declared {} bytes, read {}",
                name,
                size,
                data.len()
            )));
        }
        Ok(data)
    }

    /// Write a save by name. Empty `data` means delete-if-exists, giving
    /// callers one entry point for both write and delete.
    pub fn set_save_game(&self, name: &str, data: &[u8]) -> Result<()> {
        let storage = self.storage()?;
        if !data.is_empty() {
            if !storage.file_write(name, data) {
                return Err(Error::SaveIo(format!("write of '{}' rejected", name)));
            }
            return Ok(());
        }
        if storage.file_exists(name) && !storage.file_delete(name) {
            return Err(Error::SaveIo(format!("delete of '{}' rejected", name)));
        }
        Ok(())
    }

    // --- internal ---

    fn abort_init(&mut self, subsystem: &'static str) -> Error {
        tracing::error!(subsystem, "Steam subsystem unavailable, rolling back");
        self.sdk.shutdown();
        self.subsystems = None;
        self.state = AdapterState::Uninitialized;
        Error::SubsystemUnavailable(subsystem)
    }

    fn resolved(&self) -> Result<Subsystems> {
        self.subsystems
            .clone()
            .ok_or_else(|| Error::InvalidState("platform not initialized".to_string()))
    }

    fn session(&self) -> Result<Subsystems> {
        let subsystems = self.subsystems.as_ref().ok_or(Error::NotAuthenticated)?;
        if !subsystems.user.logged_on() {
            return Err(Error::NotAuthenticated);
        }
        Ok(subsystems.clone())
    }

    fn storage(&self) -> Result<Arc<dyn RemoteStorageApi>> {
        self.subsystems
            .as_ref()
            .map(|s| s.remote_storage.clone())
            .ok_or(Error::SubsystemUnavailable("remote storage"))
    }

    fn registry(&self, subsystems: &Subsystems) -> LeaderboardRegistry {
        LeaderboardRegistry::new(
            subsystems.user.clone(),
            subsystems.friends.clone(),
            subsystems.user_stats.clone(),
            subsystems.utils.clone(),
            self.quit.clone(),
        )
    }
}
