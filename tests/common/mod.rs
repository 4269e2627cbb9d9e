use std::sync::{Arc, Once};

use steambridge::sdk::mock::MockSteam;
use steambridge::sdk::{PersonaState, SteamId};
use steambridge::{OnlinePlatformSteam, SteamSettings};

static TRACING: Once = Once::new();

/// Route bridge logs through the test harness; filtered by RUST_LOG.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const APP_ID: u32 = 1337;
pub const LOCAL_ID: SteamId = SteamId(9_000_001);
pub const FRIEND_SAM: SteamId = SteamId(9_000_002);
pub const FRIEND_ALEX: SteamId = SteamId(9_000_003);

/// A mock platform with a logged-on user, two friends, and a small
/// achievement/stat schema.
pub fn mock_world() -> MockSteam {
    init_tracing();
    let mock = MockSteam::new();
    mock.log_on(LOCAL_ID, "Riley");
    mock.add_friend(FRIEND_SAM, "Sam", PersonaState::Online);
    mock.add_friend(FRIEND_ALEX, "Alex", PersonaState::Snooze);
    mock.define_achievement("ACH_FIRST_WIN", "First Win", "Win a match.", false);
    mock.define_achievement("ACH_SECRET", "???", "Hidden until unlocked.", true);
    mock.define_stat("matches_won", 0.0);
    mock.define_stat("fastest_lap_ms", 0.0);
    mock
}

pub fn adapter_over(mock: &MockSteam) -> OnlinePlatformSteam {
    OnlinePlatformSteam::new(Arc::new(mock.clone()), SteamSettings { app_id: APP_ID })
}

/// An initialized adapter over [`mock_world`].
pub fn ready_adapter() -> (OnlinePlatformSteam, MockSteam) {
    let mock = mock_world();
    let mut adapter = adapter_over(&mock);
    adapter.initialize().expect("platform should initialize");
    (adapter, mock)
}
