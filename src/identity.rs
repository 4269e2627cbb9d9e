//! Mapping between Steam's 64-bit account ids and the engine-wide 128-bit
//! user id space.
//!
//! Steam identifies accounts with 64 bits; the rest of the engine names users
//! with 128-bit ids. A Steam account is embedded into the low 64 bits of the
//! wide id with the high 64 bits zeroed, so the conversion back is lossless
//! exactly for ids this module produced.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::sdk::SteamId;

/// Engine-wide 128-bit user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OnlineUserId(Uuid);

impl OnlineUserId {
    /// Wrap an engine-side id as-is. Ids from other identity domains are
    /// representable but will not narrow back to a [`SteamId`].
    pub fn from_uuid(id: Uuid) -> Self {
        OnlineUserId(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// True when the id lies in the Steam-originated subspace (high 64 bits
    /// zero) and can be converted back to a [`SteamId`].
    pub fn is_steam_user(&self) -> bool {
        let (high, _) = self.0.as_u64_pair();
        high == 0
    }
}

impl fmt::Display for OnlineUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Widens a Steam account id into the engine id space. Total, never fails.
pub fn user_id_from_steam(id: SteamId) -> OnlineUserId {
    OnlineUserId(Uuid::from_u64_pair(0, id.0))
}

/// Narrows an engine user id back to a Steam account id.
///
/// Only ids produced by [`user_id_from_steam`] convert back; anything with
/// nonzero high bits belongs to another identity domain and is rejected.
pub fn steam_id_from_user(id: OnlineUserId) -> Result<SteamId> {
    let (high, low) = id.0.as_u64_pair();
    if high != 0 {
        return Err(Error::InvalidUserId(id));
    }
    Ok(SteamId(low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn widening_zero_fills_high_bits() {
        let wide = user_id_from_steam(SteamId(0xDEAD_BEEF));
        let (high, low) = wide.as_uuid().as_u64_pair();
        assert_eq!(high, 0);
        assert_eq!(low, 0xDEAD_BEEF);
        assert!(wide.is_steam_user());
    }

    #[test]
    fn nonzero_high_bits_are_rejected() {
        let foreign = OnlineUserId(Uuid::from_u64_pair(1, 42));
        assert!(!foreign.is_steam_user());
        assert!(matches!(
            steam_id_from_user(foreign),
            Err(Error::InvalidUserId(_))
        ));
    }

    proptest! {
        #[test]
        fn round_trip_holds_for_all_account_ids(raw in any::<u64>()) {
            let narrow = SteamId(raw);
            let back = steam_id_from_user(user_id_from_steam(narrow)).unwrap();
            prop_assert_eq!(back, narrow);
        }
    }
}
