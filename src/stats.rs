//! Per-session statistics cache lifecycle.
//!
//! The platform requires one explicit "request current stats" call before any
//! stat or achievement access is valid, and batches writes server-side until
//! a "store" call. Issuing a store per mutation would be wasteful and runs
//! into rate limits, so writes only mark the session dirty and the periodic
//! flush issues a single store per tick at most.

use crate::error::{Error, Result};
use crate::sdk::UserStatsApi;

/// Loaded/dirty state for the local user's stats snapshot. One per active
/// platform session.
#[derive(Debug, Default)]
pub(crate) struct StatsCache {
    loaded: bool,
    dirty: bool,
}

impl StatsCache {
    /// Fetch the remote snapshot if this session has not done so yet.
    ///
    /// A rejected request leaves the cache unloaded so the next operation
    /// retries; a session only ever issues one request that succeeds.
    pub fn ensure_loaded(&mut self, api: &dyn UserStatsApi) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        if !api.request_current_stats() {
            return Err(Error::CallFailed("current stats request rejected".to_string()));
        }
        self.loaded = true;
        Ok(())
    }

    /// Record a local mutation to be persisted by the next flush. Valid only
    /// once the snapshot is loaded.
    pub fn mark_dirty(&mut self) {
        debug_assert!(self.loaded, "stats written before snapshot load");
        self.dirty = true;
    }

    /// Persist pending mutations. Invoked once per host tick; issues exactly
    /// one store call when dirty and nothing otherwise.
    pub fn flush(&mut self, api: &dyn UserStatsApi) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        if !api.store_stats() {
            tracing::warn!("stats store rejected; pending mutations dropped");
        }
    }

    /// Debug-only full reset: wipes the remote stats and achievements and
    /// forces the next access to reload.
    pub fn reset(&mut self, api: &dyn UserStatsApi) {
        self.loaded = false;
        self.dirty = false;
        api.reset_all_stats(true);
    }

    /// Forget all session state without touching the platform.
    pub fn clear(&mut self) {
        self.loaded = false;
        self.dirty = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
