//! Playing XI supplied by the roster collaborator.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CrickscoreError, PlayerId, Result, TeamId, constants};

/// A team's playing XI in batting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingXi {
    pub team_id: TeamId,
    players: Vec<PlayerId>,
}

impl PlayingXi {
    /// Build a validated XI: 2 to 11 distinct players.
    pub fn new(team_id: TeamId, players: Vec<PlayerId>) -> Result<Self> {
        if players.len() < constants::MIN_PLAYING_XI || players.len() > constants::MAX_PLAYING_XI
        {
            return Err(CrickscoreError::InvalidRoster {
                reason: format!(
                    "team {team_id} named {} players, expected {}..={}",
                    players.len(),
                    constants::MIN_PLAYING_XI,
                    constants::MAX_PLAYING_XI
                ),
            });
        }
        let mut seen = HashSet::with_capacity(players.len());
        if let Some(dup) = players.iter().find(|p| !seen.insert(**p)) {
            return Err(CrickscoreError::InvalidRoster {
                reason: format!("player {dup} listed twice for team {team_id}"),
            });
        }
        Ok(Self { team_id, players })
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    /// Wickets that bowl this side out: `min(10, len - 1)`.
    #[must_use]
    pub fn all_out_wickets(&self) -> u32 {
        let last_man_standing = u32::try_from(self.players.len() - 1).unwrap_or(u32::MAX);
        last_man_standing.min(constants::MAX_WICKETS)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl PlayingXi {
    /// `n` players with IDs derived from `seed` and their batting position.
    pub fn numbered(team_id: TeamId, seed: u8, n: usize) -> Self {
        let players = (0..n)
            .map(|i| {
                let mut bytes = [seed; 16];
                bytes[15] = u8::try_from(i).expect("small XI");
                PlayerId::from_bytes(bytes)
            })
            .collect();
        Self::new(team_id, players).expect("valid numbered XI")
    }

    pub fn player(&self, index: usize) -> PlayerId {
        self.players[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_xi_all_out_at_ten() {
        let xi = PlayingXi::numbered(TeamId::new(), 1, 11);
        assert_eq!(xi.all_out_wickets(), 10);
        assert!(xi.contains(xi.player(10)));
    }

    #[test]
    fn short_xi_all_out_at_last_pair() {
        let xi = PlayingXi::numbered(TeamId::new(), 1, 5);
        assert_eq!(xi.all_out_wickets(), 4);
    }

    #[test]
    fn rejects_duplicates_and_sizes() {
        let p = PlayerId::new();
        let err = PlayingXi::new(TeamId::new(), vec![p, p]).unwrap_err();
        assert!(matches!(err, CrickscoreError::InvalidRoster { .. }));
        assert!(PlayingXi::new(TeamId::new(), vec![p]).is_err());
        let twelve = (0..12).map(|_| PlayerId::new()).collect();
        assert!(PlayingXi::new(TeamId::new(), twelve).is_err());
    }
}
