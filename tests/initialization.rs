//! Adapter lifecycle: initialization, rollback, relaunch, and teardown.

mod common;

use common::{adapter_over, mock_world, ready_adapter, APP_ID};
use steambridge::sdk::mock::Subsystem;
use steambridge::{AdapterState, Error, InitOutcome};

#[test]
fn initialize_resolves_subsystems_and_goes_ready() {
    let (adapter, mock) = ready_adapter();

    assert_eq!(adapter.state(), AdapterState::Ready);
    assert!(adapter.is_logged_in());
    assert!(mock.is_initialized());
    assert_eq!(mock.restart_checked_with(), Some(APP_ID));
}

#[test]
fn update_pumps_callbacks_only_while_ready() {
    let (mut adapter, mock) = ready_adapter();

    adapter.update();
    adapter.update();
    assert_eq!(mock.callbacks_pumped(), 2);

    adapter.deinitialize();
    adapter.update();
    assert_eq!(mock.callbacks_pumped(), 2, "no pumping after shutdown");
}

#[test]
fn update_before_initialize_is_a_no_op() {
    let mock = mock_world();
    let mut adapter = adapter_over(&mock);

    adapter.update();
    assert_eq!(mock.callbacks_pumped(), 0);
}

#[test]
fn missing_subsystem_rolls_back_completely() {
    let mock = mock_world();
    mock.withhold(Subsystem::RemoteStorage);
    let mut adapter = adapter_over(&mock);

    let result = adapter.initialize();
    assert!(matches!(result, Err(Error::SubsystemUnavailable(_))));
    assert_eq!(adapter.state(), AdapterState::Uninitialized);
    assert!(!mock.is_initialized(), "SDK must be shut back down");
    assert!(!adapter.is_logged_in());

    // Deinitializing the never-initialized adapter is a safe no-op.
    adapter.deinitialize();
    assert_eq!(adapter.state(), AdapterState::Uninitialized);
}

#[test]
fn failed_api_init_reports_unavailable() {
    let mock = mock_world();
    mock.fail_init();
    let mut adapter = adapter_over(&mock);

    assert!(matches!(
        adapter.initialize(),
        Err(Error::SubsystemUnavailable(_))
    ));
    assert_eq!(adapter.state(), AdapterState::Uninitialized);
}

#[test]
fn relaunch_via_steam_is_a_successful_exit() {
    let mock = mock_world();
    mock.require_restart();
    let mut adapter = adapter_over(&mock);

    let outcome = adapter.initialize().expect("relaunch is not a failure");
    assert_eq!(outcome, InitOutcome::RelaunchViaSteam);
    assert!(adapter.shutdown_flag().is_exit_requested());
    assert_eq!(adapter.state(), AdapterState::Uninitialized);
    assert!(!mock.is_initialized());
}

#[test]
fn double_initialize_is_rejected() {
    let (mut adapter, _mock) = ready_adapter();

    assert!(matches!(
        adapter.initialize(),
        Err(Error::InvalidState(_))
    ));
    assert_eq!(adapter.state(), AdapterState::Ready);
}

#[test]
fn deinitialize_is_idempotent() {
    let (mut adapter, mock) = ready_adapter();

    adapter.deinitialize();
    assert_eq!(adapter.state(), AdapterState::Uninitialized);
    assert!(!mock.is_initialized());

    adapter.deinitialize();
    assert_eq!(adapter.state(), AdapterState::Uninitialized);
}

#[test]
fn reinitialize_after_deinitialize_works() {
    let (mut adapter, mock) = ready_adapter();

    adapter.deinitialize();
    let outcome = adapter.initialize().expect("second session should start");
    assert_eq!(outcome, InitOutcome::Ready);
    assert!(mock.is_initialized());
}
