//! Asynchronous call tokens and result payloads.
//!
//! Issuing a remote operation yields an [`ApiCall`] token; its completion is
//! observed through [`UtilsApi::call_status`](super::UtilsApi::call_status)
//! and the result arrives as a [`CallPayload`] tagged with its kind. The
//! bridge decodes a payload into the typed result the call site expects and
//! treats a kind mismatch as a failed call, never as undefined behavior.

use std::fmt;

use super::{EntriesHandle, LeaderboardHandle};

/// Opaque token for a pending asynchronous platform call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiCall(pub u64);

impl ApiCall {
    /// The well-known invalid sentinel: the platform rejected the call
    /// outright and there is nothing to wait for.
    pub const INVALID: ApiCall = ApiCall(0);

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

/// Completion state of an asynchronous call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Pending,
    Ready,
    Failed(CallFailure),
}

/// Platform-reported reason an asynchronous call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallFailure {
    /// The platform client went away mid-call.
    SteamGone,
    /// The call never reached the backend.
    NetworkFailure,
    /// The token does not name a live call.
    InvalidHandle,
    /// The completion was routed to the wrong consumer.
    MismatchedCallback,
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            CallFailure::SteamGone => "Steam client shut down",
            CallFailure::NetworkFailure => "network failure",
            CallFailure::InvalidHandle => "invalid call handle",
            CallFailure::MismatchedCallback => "mismatched callback",
        };
        f.write_str(reason)
    }
}

/// Discriminant of a [`CallPayload`], used for shape checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallResultKind {
    LeaderboardFindResult,
    LeaderboardScoresDownloaded,
    LeaderboardScoreUploaded,
}

impl fmt::Display for CallResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallResultKind::LeaderboardFindResult => "LeaderboardFindResult",
            CallResultKind::LeaderboardScoresDownloaded => "LeaderboardScoresDownloaded",
            CallResultKind::LeaderboardScoreUploaded => "LeaderboardScoreUploaded",
        };
        f.write_str(name)
    }
}

/// Raw result payload of a completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallPayload {
    LeaderboardFindResult {
        handle: LeaderboardHandle,
        found: bool,
    },
    LeaderboardScoresDownloaded {
        handle: LeaderboardHandle,
        entries: EntriesHandle,
        count: i32,
    },
    LeaderboardScoreUploaded {
        accepted: bool,
        handle: LeaderboardHandle,
        score: i32,
        score_changed: bool,
        global_rank_new: i32,
        global_rank_previous: i32,
    },
}

impl CallPayload {
    pub fn kind(&self) -> CallResultKind {
        match self {
            CallPayload::LeaderboardFindResult { .. } => CallResultKind::LeaderboardFindResult,
            CallPayload::LeaderboardScoresDownloaded { .. } => {
                CallResultKind::LeaderboardScoresDownloaded
            }
            CallPayload::LeaderboardScoreUploaded { .. } => {
                CallResultKind::LeaderboardScoreUploaded
            }
        }
    }
}

/// A typed view of one payload kind, produced by the bridge after the shape
/// check passes.
pub trait CallResult: Sized {
    const KIND: CallResultKind;

    fn decode(payload: CallPayload) -> Option<Self>;
}

/// Outcome of a find / find-or-create leaderboard call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardFindResult {
    pub handle: LeaderboardHandle,
    pub found: bool,
}

impl CallResult for LeaderboardFindResult {
    const KIND: CallResultKind = CallResultKind::LeaderboardFindResult;

    fn decode(payload: CallPayload) -> Option<Self> {
        match payload {
            CallPayload::LeaderboardFindResult { handle, found } => {
                Some(LeaderboardFindResult { handle, found })
            }
            _ => None,
        }
    }
}

/// Outcome of an entry download call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardScoresDownloaded {
    pub handle: LeaderboardHandle,
    pub entries: EntriesHandle,
    pub count: i32,
}

impl CallResult for LeaderboardScoresDownloaded {
    const KIND: CallResultKind = CallResultKind::LeaderboardScoresDownloaded;

    fn decode(payload: CallPayload) -> Option<Self> {
        match payload {
            CallPayload::LeaderboardScoresDownloaded {
                handle,
                entries,
                count,
            } => Some(LeaderboardScoresDownloaded {
                handle,
                entries,
                count,
            }),
            _ => None,
        }
    }
}

/// Outcome of a score upload call. Uploads are fire-and-forget in the bridge;
/// this result exists for completeness of the wire surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardScoreUploaded {
    pub accepted: bool,
    pub handle: LeaderboardHandle,
    pub score: i32,
    pub score_changed: bool,
    pub global_rank_new: i32,
    pub global_rank_previous: i32,
}

impl CallResult for LeaderboardScoreUploaded {
    const KIND: CallResultKind = CallResultKind::LeaderboardScoreUploaded;

    fn decode(payload: CallPayload) -> Option<Self> {
        match payload {
            CallPayload::LeaderboardScoreUploaded {
                accepted,
                handle,
                score,
                score_changed,
                global_rank_new,
                global_rank_previous,
            } => Some(LeaderboardScoreUploaded {
                accepted,
                handle,
                score,
                score_changed,
                global_rank_new,
                global_rank_previous,
            }),
            _ => None,
        }
    }
}
