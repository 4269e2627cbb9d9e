//! Leaderboard resolution, entry queries, and score submission end to end.

mod common;

use common::{ready_adapter, FRIEND_SAM, LOCAL_ID};
use steambridge::sdk::mock::MockSteam;
use steambridge::sdk::{CallFailure, LeaderboardDataRequest};
use steambridge::{
    user_id_from_steam, Error, Leaderboard, LeaderboardSortMode, LeaderboardValueFormat,
    OnlinePlatformSteam, OnlineUserId,
};
use uuid::Uuid;

fn high_scores(adapter: &mut OnlinePlatformSteam) -> Leaderboard {
    adapter
        .find_or_create_leaderboard(
            "HighScores",
            LeaderboardSortMode::Descending,
            LeaderboardValueFormat::Numeric,
        )
        .expect("board should resolve")
}

fn seed_scores(mock: &MockSteam, board: &Leaderboard, entries: &[(u64, i32)]) {
    // Submit as other users by borrowing the session briefly.
    let mut adapter = common::adapter_over(mock);
    adapter.initialize().unwrap();
    for (user, score) in entries {
        mock.log_on(steambridge::sdk::SteamId(*user), &format!("user-{}", user));
        adapter.submit_score(board, *score, false).unwrap();
    }
    mock.log_on(LOCAL_ID, "Riley");
}

#[test]
fn lookup_of_a_missing_board_is_not_found() {
    let (mut adapter, _mock) = ready_adapter();

    assert!(matches!(
        adapter.find_leaderboard("Nonexistent"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn creation_defines_sort_and_format() {
    let (mut adapter, _mock) = ready_adapter();

    let board = high_scores(&mut adapter);
    assert_eq!(board.name, "HighScores");
    assert_eq!(board.sort_mode, LeaderboardSortMode::Descending);
    assert_eq!(board.value_format, LeaderboardValueFormat::Numeric);
    assert_eq!(board.entry_count, 0);
    let handle: u64 = board.identifier.parse().unwrap();
    assert_ne!(handle, 0);
}

#[test]
fn resolve_by_name_yields_the_same_handle() {
    let (mut adapter, _mock) = ready_adapter();

    let created = high_scores(&mut adapter);
    let found = adapter.find_leaderboard("HighScores").unwrap();
    assert_eq!(found.identifier, created.identifier);

    // Creation parameters are only authoritative the first time.
    let again = adapter
        .find_or_create_leaderboard(
            "HighScores",
            LeaderboardSortMode::Ascending,
            LeaderboardValueFormat::Seconds,
        )
        .unwrap();
    assert_eq!(again.identifier, created.identifier);
    assert_eq!(again.sort_mode, LeaderboardSortMode::Descending);
}

#[test]
fn keep_best_discards_the_worse_score() {
    let (mut adapter, _mock) = ready_adapter();
    let board = high_scores(&mut adapter);

    adapter.submit_score(&board, 500, true).unwrap();
    adapter.submit_score(&board, 300, true).unwrap();

    let top = adapter.leaderboard_entries(&board, 0, 1).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].score, 500);
    assert_eq!(top[0].rank, 1);
    assert_eq!(top[0].user.id, user_id_from_steam(LOCAL_ID));
    assert_eq!(top[0].user.name, "Riley");
}

#[test]
fn force_update_overwrites_the_stored_score() {
    let (mut adapter, _mock) = ready_adapter();
    let board = high_scores(&mut adapter);

    adapter.submit_score(&board, 500, true).unwrap();
    adapter.submit_score(&board, 300, false).unwrap();

    let top = adapter.leaderboard_entries(&board, 0, 1).unwrap();
    assert_eq!(top[0].score, 300);
}

#[test]
fn global_range_translates_to_one_based() {
    let (mut adapter, mock) = ready_adapter();
    let board = high_scores(&mut adapter);

    adapter.leaderboard_entries(&board, 0, 10).unwrap();
    assert_eq!(
        mock.last_download_window(),
        Some((LeaderboardDataRequest::Global, 1, 10))
    );

    adapter.leaderboard_entries(&board, 5, 3).unwrap();
    assert_eq!(
        mock.last_download_window(),
        Some((LeaderboardDataRequest::Global, 6, 8))
    );
}

#[test]
fn around_user_window_is_passed_through_zero_based() {
    let (mut adapter, mock) = ready_adapter();
    let board = high_scores(&mut adapter);

    adapter
        .leaderboard_entries_around_user(&board, 0, 10)
        .unwrap();
    assert_eq!(
        mock.last_download_window(),
        Some((LeaderboardDataRequest::GlobalAroundUser, 0, 10))
    );
}

#[test]
fn ranking_follows_the_sort_order() {
    let (mut adapter, mock) = ready_adapter();
    let board = high_scores(&mut adapter);
    seed_scores(&mock, &board, &[(42, 900), (43, 100)]);
    adapter.submit_score(&board, 500, true).unwrap();

    let entries = adapter.leaderboard_entries(&board, 0, 10).unwrap();
    let scores: Vec<i32> = entries.iter().map(|e| e.score).collect();
    assert_eq!(scores, vec![900, 500, 100]);
    assert_eq!(entries[1].user.name, "Riley");
    assert_eq!(entries[1].rank, 2);
}

#[test]
fn friends_query_scopes_to_the_social_graph() {
    let (mut adapter, mock) = ready_adapter();
    let board = high_scores(&mut adapter);
    // A stranger plus a friend on the board.
    seed_scores(&mock, &board, &[(4242, 900), (FRIEND_SAM.0, 700)]);
    adapter.submit_score(&board, 500, true).unwrap();

    let entries = adapter.leaderboard_entries_friends(&board).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.user.name.as_str()).collect();
    assert_eq!(names, vec!["Sam", "Riley"]);
    // Global ranks are preserved inside the friends view.
    assert_eq!(entries[0].rank, 2);
}

#[test]
fn entries_for_users_filters_to_the_requested_set() {
    let (mut adapter, mock) = ready_adapter();
    let board = high_scores(&mut adapter);
    seed_scores(&mock, &board, &[(FRIEND_SAM.0, 700), (4242, 900)]);

    let entries = adapter
        .leaderboard_entries_for_users(&board, &[user_id_from_steam(FRIEND_SAM)])
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user.name, "Sam");
}

#[test]
fn foreign_user_ids_are_rejected() {
    let (mut adapter, _mock) = ready_adapter();
    let board = high_scores(&mut adapter);

    let foreign = OnlineUserId::from_uuid(Uuid::from_u64_pair(7, 7));
    assert!(matches!(
        adapter.leaderboard_entries_for_users(&board, &[foreign]),
        Err(Error::InvalidUserId(_))
    ));
}

#[test]
fn tampered_identifier_is_an_invalid_handle() {
    let (mut adapter, _mock) = ready_adapter();
    let mut board = high_scores(&mut adapter);
    board.identifier = "garbage".to_string();

    assert!(matches!(
        adapter.leaderboard_entries(&board, 0, 10),
        Err(Error::InvalidHandle(_))
    ));
    assert!(matches!(
        adapter.submit_score(&board, 1, true),
        Err(Error::InvalidHandle(_))
    ));
}

#[test]
fn entry_queries_require_a_session() {
    let (mut adapter, mock) = ready_adapter();
    let board = high_scores(&mut adapter);

    mock.log_off();
    assert!(matches!(
        adapter.leaderboard_entries(&board, 0, 10),
        Err(Error::NotAuthenticated)
    ));
}

#[test]
fn transport_failure_is_distinct_from_not_found() {
    let (mut adapter, mock) = ready_adapter();

    mock.fail_next_call(CallFailure::NetworkFailure);
    match adapter.find_leaderboard("HighScores") {
        Err(Error::CallFailed(reason)) => assert!(reason.contains("network")),
        other => panic!("expected CallFailed, got {:?}", other),
    }
}

#[test]
fn mismatched_result_payload_is_detected() {
    let (mut adapter, mock) = ready_adapter();

    mock.mismatch_next_payload();
    assert!(matches!(
        adapter.find_or_create_leaderboard(
            "HighScores",
            LeaderboardSortMode::Descending,
            LeaderboardValueFormat::Numeric,
        ),
        Err(Error::ResultShapeMismatch { .. })
    ));
}

#[test]
fn shutdown_cancels_a_pending_wait() {
    let (mut adapter, mock) = ready_adapter();

    mock.set_call_latency(1_000);
    adapter.shutdown_flag().request_exit();
    assert!(matches!(
        adapter.find_leaderboard("HighScores"),
        Err(Error::Cancelled)
    ));
}
