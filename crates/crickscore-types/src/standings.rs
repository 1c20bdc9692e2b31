//! Points-table rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{TeamId, TournamentId, overs_display};

/// One team's row in a tournament's points table.
///
/// Runs and balls are cumulative integers; `net_run_rate` and `position` are
/// derived from them by the Standings Engine after every fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStandingRecord {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub team_name: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub tied: u32,
    pub no_result: u32,
    pub points: u32,
    pub runs_scored: u32,
    /// Legal balls faced, after the overs-quota rule.
    pub balls_faced: u32,
    pub runs_conceded: u32,
    /// Legal balls bowled, after the overs-quota rule.
    pub balls_bowled: u32,
    pub net_run_rate: Decimal,
    /// 1-based league position; 0 until the table is first ranked.
    pub position: u32,
}

impl TeamStandingRecord {
    #[must_use]
    pub fn new(tournament_id: TournamentId, team_id: TeamId, team_name: impl Into<String>) -> Self {
        Self {
            tournament_id,
            team_id,
            team_name: team_name.into(),
            played: 0,
            won: 0,
            lost: 0,
            tied: 0,
            no_result: 0,
            points: 0,
            runs_scored: 0,
            balls_faced: 0,
            runs_conceded: 0,
            balls_bowled: 0,
            net_run_rate: Decimal::ZERO,
            position: 0,
        }
    }

    #[must_use]
    pub fn overs_faced_display(&self) -> String {
        overs_display(self.balls_faced)
    }

    #[must_use]
    pub fn overs_bowled_display(&self) -> String {
        overs_display(self.balls_bowled)
    }
}
