//! Globally unique identifiers used throughout Crickscore.
//!
//! Entity IDs handed to us by collaborators (matches, players, teams,
//! tournaments) are UUIDv7. Innings and ball-event IDs are derived
//! deterministically from their parent so a replayed match produces the
//! same identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype with a display prefix.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            #[must_use]
            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a single fixture between two teams.
    MatchId,
    "match"
);

uuid_id!(
    /// Identifier of a registered player.
    PlayerId,
    "player"
);

uuid_id!(
    /// Identifier of a franchise / team.
    TeamId,
    "team"
);

uuid_id!(
    /// Identifier of a tournament (league stage plus playoffs).
    TournamentId,
    "tournament"
);

uuid_id!(
    /// Identifier of one innings of a match.
    InningsId,
    "innings"
);

uuid_id!(
    /// Identifier of one recorded delivery.
    BallEventId,
    "ball"
);

fn derive_uuid(domain: &[u8], parent: &Uuid, seq: u64) -> Uuid {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(parent.as_bytes());
    hasher.update(seq.to_le_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);
    Uuid::from_bytes(bytes)
}

impl InningsId {
    /// Deterministic innings ID from the owning match and innings number.
    #[must_use]
    pub fn deterministic(match_id: MatchId, number: u8) -> Self {
        Self(derive_uuid(b"crickscore:innings_id:v1:", &match_id.0, u64::from(number)))
    }
}

impl BallEventId {
    /// Deterministic ball ID from the innings and the delivery's sequence number.
    #[must_use]
    pub fn deterministic(innings_id: InningsId, sequence: u32) -> Self {
        Self(derive_uuid(b"crickscore:ball_id:v1:", &innings_id.0, u64::from(sequence)))
    }
}
