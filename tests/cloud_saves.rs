//! Cloud save blobs: read, write, delete-by-empty-write, and size checks.

mod common;

use common::{adapter_over, mock_world, ready_adapter};
use steambridge::Error;

#[test]
fn missing_save_reads_as_empty() {
    let (adapter, _mock) = ready_adapter();

    let data = adapter.save_game("slot0").unwrap();
    assert!(data.is_empty());
}

#[test]
fn save_round_trips_through_the_platform() {
    let (adapter, mock) = ready_adapter();

    let payload = vec![7u8; 256];
    adapter.set_save_game("slot0", &payload).unwrap();
    assert_eq!(mock.file("slot0").as_deref(), Some(payload.as_slice()));
    assert_eq!(adapter.save_game("slot0").unwrap(), payload);
}

#[test]
fn empty_write_deletes_an_existing_save() {
    let (adapter, mock) = ready_adapter();

    adapter.set_save_game("slot0", &[1, 2, 3]).unwrap();
    adapter.set_save_game("slot0", &[]).unwrap();
    assert_eq!(mock.file("slot0"), None);

    // Deletion reads back as nonexistence, not as an error.
    assert!(adapter.save_game("slot0").unwrap().is_empty());
}

#[test]
fn empty_write_on_a_missing_save_is_a_no_op() {
    let (adapter, mock) = ready_adapter();

    adapter.set_save_game("never-written", &[]).unwrap();
    assert_eq!(mock.file("never-written"), None);
}

#[test]
fn short_read_is_a_hard_failure() {
    let (adapter, mock) = ready_adapter();

    adapter.set_save_game("slot0", &vec![9u8; 100]).unwrap();
    mock.truncate_next_read(60);

    match adapter.save_game("slot0") {
        Err(Error::SaveIo(reason)) => {
            assert!(reason.contains("100"));
            assert!(reason.contains("60"));
        }
        other => panic!("expected SaveIo, got {:?}", other),
    }

    // The fault was transient; the next read succeeds in full.
    assert_eq!(adapter.save_game("slot0").unwrap().len(), 100);
}

#[test]
fn saves_require_the_storage_subsystem() {
    let mock = mock_world();
    let adapter = adapter_over(&mock);

    assert!(matches!(
        adapter.save_game("slot0"),
        Err(Error::SubsystemUnavailable(_))
    ));
    assert!(matches!(
        adapter.set_save_game("slot0", &[1]),
        Err(Error::SubsystemUnavailable(_))
    ));
}
