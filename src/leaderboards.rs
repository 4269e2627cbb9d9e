//! Leaderboard resolution, entry queries, and score submission.
//!
//! The platform names leaderboards with short-lived runtime handles. The
//! registry gives callers a stable reference instead: the handle is resolved
//! by name, string-encoded into [`Leaderboard::identifier`], and decoded and
//! re-validated on every subsequent use rather than cached, which sidesteps
//! handle invalidation across platform reconnects.

use std::sync::Arc;

use crate::bridge::{wait_for_call, ShutdownFlag};
use crate::error::{Error, Result};
use crate::identity::{steam_id_from_user, user_id_from_steam, OnlineUserId};
use crate::sdk::{
    FriendsApi, LeaderboardDataRequest, LeaderboardFindResult, LeaderboardHandle,
    LeaderboardScoresDownloaded, LeaderboardUploadMethod, SteamId, UserApi, UserStatsApi, UtilsApi,
};
use crate::stats::StatsCache;
use crate::types::{Leaderboard, LeaderboardEntry, LeaderboardSortMode, LeaderboardValueFormat, OnlineUser};

/// Leaderboard operations over the resolved platform subsystems.
pub(crate) struct LeaderboardRegistry {
    user: Arc<dyn UserApi>,
    friends: Arc<dyn FriendsApi>,
    stats_api: Arc<dyn UserStatsApi>,
    utils: Arc<dyn UtilsApi>,
    quit: ShutdownFlag,
}

impl LeaderboardRegistry {
    pub fn new(
        user: Arc<dyn UserApi>,
        friends: Arc<dyn FriendsApi>,
        stats_api: Arc<dyn UserStatsApi>,
        utils: Arc<dyn UtilsApi>,
        quit: ShutdownFlag,
    ) -> Self {
        Self {
            user,
            friends,
            stats_api,
            utils,
            quit,
        }
    }

    /// Resolve an existing leaderboard by name. A board the platform does not
    /// know is `Error::NotFound`, distinct from transport failure.
    pub fn find(&self, name: &str) -> Result<Leaderboard> {
        let call = self.stats_api.find_leaderboard(name);
        let result: LeaderboardFindResult = wait_for_call(&*self.utils, &self.quit, call)?;
        if !result.found {
            return Err(Error::NotFound(format!("leaderboard '{}'", name)));
        }
        Ok(self.snapshot(name, result.handle))
    }

    /// Resolve a leaderboard, creating it server-side if absent. The sort
    /// mode and value format are authoritative only at creation time; an
    /// existing board keeps its remote definition.
    pub fn find_or_create(
        &self,
        name: &str,
        sort_mode: LeaderboardSortMode,
        value_format: LeaderboardValueFormat,
    ) -> Result<Leaderboard> {
        let call = self
            .stats_api
            .find_or_create_leaderboard(name, sort_mode.into(), value_format.into());
        let result: LeaderboardFindResult = wait_for_call(&*self.utils, &self.quit, call)?;
        if !result.found {
            return Err(Error::NotFound(format!("leaderboard '{}'", name)));
        }
        Ok(self.snapshot(name, result.handle))
    }

    /// Decode a leaderboard's runtime handle, re-validating the session on
    /// every use: leaderboard calls are only valid while authenticated with
    /// the stats snapshot loaded, and handles are never trusted across
    /// reconnects.
    pub fn runtime_handle(
        &self,
        leaderboard: &Leaderboard,
        cache: &mut StatsCache,
    ) -> Result<LeaderboardHandle> {
        if !self.user.logged_on() {
            return Err(Error::NotAuthenticated);
        }
        cache.ensure_loaded(&*self.stats_api)?;
        let raw: u64 = leaderboard
            .identifier
            .parse()
            .map_err(|_| Error::InvalidHandle(leaderboard.identifier.clone()))?;
        let handle = LeaderboardHandle(raw);
        if !handle.is_valid() {
            return Err(Error::InvalidHandle(leaderboard.identifier.clone()));
        }
        Ok(handle)
    }

    /// Entries by absolute position. The caller's 0-based `(start, count)`
    /// window becomes the platform's 1-based inclusive range.
    pub fn entries_range(
        &self,
        leaderboard: &Leaderboard,
        cache: &mut StatsCache,
        start: u32,
        count: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        let handle = self.runtime_handle(leaderboard, cache)?;
        let start = start as i32;
        let count = count as i32;
        self.download(
            handle,
            LeaderboardDataRequest::Global,
            start + 1,
            start + count,
        )
    }

    /// Entries positioned around the current user's row. The window stays
    /// 0-based: its semantics are centered on the user, not absolute, and the
    /// platform consumes it unmodified.
    pub fn entries_around_user(
        &self,
        leaderboard: &Leaderboard,
        cache: &mut StatsCache,
        start: u32,
        count: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        let handle = self.runtime_handle(leaderboard, cache)?;
        let start = start as i32;
        let count = count as i32;
        self.download(
            handle,
            LeaderboardDataRequest::GlobalAroundUser,
            start,
            start + count,
        )
    }

    /// Entries for the current user's friends. The platform defines the
    /// window; the range arguments are ignored on the wire.
    pub fn entries_friends(
        &self,
        leaderboard: &Leaderboard,
        cache: &mut StatsCache,
    ) -> Result<Vec<LeaderboardEntry>> {
        let handle = self.runtime_handle(leaderboard, cache)?;
        self.download(handle, LeaderboardDataRequest::Friends, 0, 0)
    }

    /// Entries for an explicit set of users.
    pub fn entries_for_users(
        &self,
        leaderboard: &Leaderboard,
        cache: &mut StatsCache,
        users: &[OnlineUserId],
    ) -> Result<Vec<LeaderboardEntry>> {
        let handle = self.runtime_handle(leaderboard, cache)?;
        let ids: Vec<SteamId> = users
            .iter()
            .map(|id| steam_id_from_user(*id))
            .collect::<Result<_>>()?;
        let call = self.stats_api.download_entries_for_users(handle, &ids);
        let batch: LeaderboardScoresDownloaded = wait_for_call(&*self.utils, &self.quit, call)?;
        self.decode_entries(batch)
    }

    /// Upload a score. Success is the platform accepting the call token; the
    /// write confirmation is not awaited.
    pub fn submit_score(
        &self,
        leaderboard: &Leaderboard,
        cache: &mut StatsCache,
        score: i32,
        keep_best: bool,
    ) -> Result<()> {
        let handle = self.runtime_handle(leaderboard, cache)?;
        let method = if keep_best {
            LeaderboardUploadMethod::KeepBest
        } else {
            LeaderboardUploadMethod::ForceUpdate
        };
        let call = self.stats_api.upload_score(handle, method, score);
        if !call.is_valid() {
            return Err(Error::CallFailed(format!(
                "score upload to '{}' rejected",
                leaderboard.name
            )));
        }
        tracing::debug!(leaderboard = %leaderboard.name, score, "score upload issued");
        Ok(())
    }

    fn snapshot(&self, name: &str, handle: LeaderboardHandle) -> Leaderboard {
        Leaderboard {
            name: name.to_string(),
            identifier: handle.0.to_string(),
            sort_mode: self.stats_api.leaderboard_sort_method(handle).into(),
            value_format: self.stats_api.leaderboard_display_type(handle).into(),
            entry_count: self.stats_api.leaderboard_entry_count(handle),
        }
    }

    fn download(
        &self,
        handle: LeaderboardHandle,
        request: LeaderboardDataRequest,
        range_start: i32,
        range_end: i32,
    ) -> Result<Vec<LeaderboardEntry>> {
        let call = self
            .stats_api
            .download_entries(handle, request, range_start, range_end);
        let batch: LeaderboardScoresDownloaded = wait_for_call(&*self.utils, &self.quit, call)?;
        self.decode_entries(batch)
    }

    fn decode_entries(&self, batch: LeaderboardScoresDownloaded) -> Result<Vec<LeaderboardEntry>> {
        let mut entries = Vec::with_capacity(batch.count.max(0) as usize);
        for index in 0..batch.count {
            let raw = self
                .stats_api
                .downloaded_entry(batch.entries, index)
                .ok_or_else(|| {
                    Error::CallFailed(format!("downloaded entry {} could not be read", index))
                })?;
            entries.push(LeaderboardEntry {
                user: OnlineUser {
                    id: user_id_from_steam(raw.user),
                    name: self.friends.friend_persona_name(raw.user),
                    presence: self.friends.friend_persona_state(raw.user).into(),
                },
                rank: raw.global_rank,
                score: raw.score,
            });
        }
        Ok(entries)
    }
}
