//! Error types and handling for the Steam bridge

use thiserror::Error;

use crate::identity::OnlineUserId;
use crate::sdk::CallResultKind;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Steam bridge error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("not authenticated: no active Steam session")]
    NotAuthenticated,

    #[error("Steam subsystem unavailable: {0}")]
    SubsystemUnavailable(&'static str),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("API call failed: {0}")]
    CallFailed(String),

    #[error("API call cancelled by shutdown request")]
    Cancelled,

    #[error("result shape mismatch: expected {expected}, got {actual}")]
    ResultShapeMismatch {
        expected: CallResultKind,
        actual: CallResultKind,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid leaderboard handle: {0}")]
    InvalidHandle(String),

    #[error("user id {0} does not name a Steam user")]
    InvalidUserId(OnlineUserId),

    #[error("save game IO error: {0}")]
    SaveIo(String),

    #[error("configuration error: {0}")]
    Config(String),
}
