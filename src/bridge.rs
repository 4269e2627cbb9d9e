//! Blocking wait on asynchronous platform calls.
//!
//! The SDK only offers poll-and-callback completion while every caller in the
//! game is a synchronous function on the main execution context, so the
//! bridge spin-polls the completion query with a short sleep. There is no
//! other scheduler to yield to. A process-wide shutdown flag is checked on
//! every iteration so an in-flight call never blocks exit; beyond that and
//! platform-reported failure there is no timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::sdk::{ApiCall, CallResult, CallStatus, UtilsApi};

/// Poll interval for completion checks. Short enough not to stall interactive
/// use, long enough not to monopolize the core. A tuning value, not a
/// correctness property.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Cloneable process-wide shutdown request, shared between the host, the
/// adapter, and every poll loop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_exit(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_exit_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Block until `call` completes and decode its payload as `T`.
///
/// Returns `Error::CallFailed` for the invalid sentinel token and for
/// platform-reported failure, `Error::Cancelled` when shutdown is requested
/// mid-wait, and `Error::ResultShapeMismatch` when the completed payload is
/// not of the kind the call site expects.
pub(crate) fn wait_for_call<T: CallResult>(
    utils: &dyn UtilsApi,
    quit: &ShutdownFlag,
    call: ApiCall,
) -> Result<T> {
    if !call.is_valid() {
        return Err(Error::CallFailed("invalid call token".to_string()));
    }
    loop {
        match utils.call_status(call) {
            CallStatus::Pending => {
                if quit.is_exit_requested() {
                    tracing::debug!(call = call.0, "api call wait cancelled by shutdown");
                    return Err(Error::Cancelled);
                }
                thread::sleep(POLL_INTERVAL);
            }
            CallStatus::Failed(reason) => {
                return Err(Error::CallFailed(reason.to_string()));
            }
            CallStatus::Ready => {
                let payload = utils
                    .call_result(call)
                    .ok_or_else(|| Error::CallFailed("completed call had no result".to_string()))?;
                let actual = payload.kind();
                return T::decode(payload).ok_or(Error::ResultShapeMismatch {
                    expected: T::KIND,
                    actual,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::{
        CallFailure, CallPayload, LeaderboardFindResult, LeaderboardHandle, LeaderboardScoreUploaded,
    };
    use std::sync::Mutex;

    struct ScriptedUtils {
        pending_polls: Mutex<u32>,
        outcome: CallStatus,
        payload: Option<CallPayload>,
    }

    impl ScriptedUtils {
        fn completes_with(payload: CallPayload, pending_polls: u32) -> Self {
            Self {
                pending_polls: Mutex::new(pending_polls),
                outcome: CallStatus::Ready,
                payload: Some(payload),
            }
        }

        fn fails_with(reason: CallFailure) -> Self {
            Self {
                pending_polls: Mutex::new(0),
                outcome: CallStatus::Failed(reason),
                payload: None,
            }
        }
    }

    impl UtilsApi for ScriptedUtils {
        fn call_status(&self, _call: ApiCall) -> CallStatus {
            let mut remaining = self.pending_polls.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return CallStatus::Pending;
            }
            self.outcome
        }

        fn call_result(&self, _call: ApiCall) -> Option<CallPayload> {
            self.payload.clone()
        }
    }

    fn find_payload() -> CallPayload {
        CallPayload::LeaderboardFindResult {
            handle: LeaderboardHandle(7),
            found: true,
        }
    }

    #[test]
    fn decodes_after_pending_polls() {
        let utils = ScriptedUtils::completes_with(find_payload(), 3);
        let quit = ShutdownFlag::new();

        let result: LeaderboardFindResult =
            wait_for_call(&utils, &quit, ApiCall(1)).expect("call should complete");
        assert_eq!(result.handle, LeaderboardHandle(7));
        assert!(result.found);
    }

    #[test]
    fn invalid_token_fails_without_polling() {
        let utils = ScriptedUtils::completes_with(find_payload(), 0);
        let quit = ShutdownFlag::new();

        let result: Result<LeaderboardFindResult> = wait_for_call(&utils, &quit, ApiCall::INVALID);
        assert!(matches!(result, Err(Error::CallFailed(_))));
    }

    #[test]
    fn platform_failure_reports_reason() {
        let utils = ScriptedUtils::fails_with(CallFailure::NetworkFailure);
        let quit = ShutdownFlag::new();

        let result: Result<LeaderboardFindResult> = wait_for_call(&utils, &quit, ApiCall(1));
        match result {
            Err(Error::CallFailed(reason)) => assert!(reason.contains("network")),
            other => panic!("expected CallFailed, got {:?}", other),
        }
    }

    #[test]
    fn shutdown_aborts_the_wait() {
        // Never completes; only the flag can end the loop.
        let utils = ScriptedUtils::completes_with(find_payload(), u32::MAX);
        let quit = ShutdownFlag::new();
        quit.request_exit();

        let result: Result<LeaderboardFindResult> = wait_for_call(&utils, &quit, ApiCall(1));
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn wrong_payload_kind_is_a_shape_mismatch() {
        let utils = ScriptedUtils::completes_with(find_payload(), 0);
        let quit = ShutdownFlag::new();

        let result: Result<LeaderboardScoreUploaded> = wait_for_call(&utils, &quit, ApiCall(1));
        assert!(matches!(result, Err(Error::ResultShapeMismatch { .. })));
    }
}
