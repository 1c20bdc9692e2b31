//! Scorecard ledger entries: batsmen, bowlers, partnerships and fall of wickets.
//!
//! Entries store integer counts only. Strike rate and economy are derived on
//! read so an undo can never leave a stale rate behind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Dismissal, InningsId, PlayerId, constants, overs_display, runs_per_over};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatsmanStatus {
    YetToBat,
    Batting,
    Out,
}

/// One batsman's line in an innings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatsmanEntry {
    pub innings_id: InningsId,
    pub player: PlayerId,
    /// 1-based position in the playing XI's batting order.
    pub batting_position: u8,
    pub status: BatsmanStatus,
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub dismissal: Option<Dismissal>,
    pub on_strike: bool,
    pub at_crease: bool,
}

impl BatsmanEntry {
    #[must_use]
    pub fn yet_to_bat(innings_id: InningsId, player: PlayerId, batting_position: u8) -> Self {
        Self {
            innings_id,
            player,
            batting_position,
            status: BatsmanStatus::YetToBat,
            runs: 0,
            balls_faced: 0,
            fours: 0,
            sixes: 0,
            dismissal: None,
            on_strike: false,
            at_crease: false,
        }
    }

    /// Runs per hundred balls faced.
    #[must_use]
    pub fn strike_rate(&self) -> Decimal {
        if self.balls_faced == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.runs) * Decimal::ONE_HUNDRED / Decimal::from(self.balls_faced))
            .round_dp(constants::RATE_DISPLAY_DP)
    }

    #[must_use]
    pub fn is_out(&self) -> bool {
        self.status == BatsmanStatus::Out
    }
}

/// One bowler's line in an innings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlerEntry {
    pub innings_id: InningsId,
    pub player: PlayerId,
    /// Legal balls bowled.
    pub balls_bowled: u32,
    pub runs_conceded: u32,
    /// Wickets credited to the bowler (run-outs excluded).
    pub wickets: u32,
    pub wides: u32,
    pub no_balls: u32,
    pub dot_balls: u32,
    pub is_current_bowler: bool,
}

impl BowlerEntry {
    #[must_use]
    pub fn new(innings_id: InningsId, player: PlayerId) -> Self {
        Self {
            innings_id,
            player,
            balls_bowled: 0,
            runs_conceded: 0,
            wickets: 0,
            wides: 0,
            no_balls: 0,
            dot_balls: 0,
            is_current_bowler: false,
        }
    }

    #[must_use]
    pub fn overs_display(&self) -> String {
        overs_display(self.balls_bowled)
    }

    /// Completed overs (partial overs do not count toward the quota until finished).
    #[must_use]
    pub fn completed_overs(&self) -> u32 {
        self.balls_bowled / constants::BALLS_PER_OVER
    }

    /// Runs conceded per six legal balls.
    #[must_use]
    pub fn economy(&self) -> Decimal {
        runs_per_over(self.runs_conceded, self.balls_bowled)
    }
}

/// Runs added by a pair of batsmen since the previous wicket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partnership {
    pub innings_id: InningsId,
    /// The wicket this partnership is for (1st, 2nd, ...).
    pub for_wicket: u32,
    pub batsman_a: PlayerId,
    pub batsman_b: PlayerId,
    /// All runs added, extras included.
    pub runs: u32,
    /// Legal balls bowled during the partnership.
    pub balls: u32,
    pub batsman_a_runs: u32,
    pub batsman_b_runs: u32,
    pub is_current: bool,
}

impl Partnership {
    #[must_use]
    pub fn open(innings_id: InningsId, for_wicket: u32, a: PlayerId, b: PlayerId) -> Self {
        Self {
            innings_id,
            for_wicket,
            batsman_a: a,
            batsman_b: b,
            runs: 0,
            balls: 0,
            batsman_a_runs: 0,
            batsman_b_runs: 0,
            is_current: true,
        }
    }

    #[must_use]
    pub fn involves(&self, player: PlayerId) -> bool {
        self.batsman_a == player || self.batsman_b == player
    }

    /// Mutable handle on `player`'s personal contribution.
    pub fn contribution_mut(&mut self, player: PlayerId) -> Option<&mut u32> {
        if player == self.batsman_a {
            Some(&mut self.batsman_a_runs)
        } else if player == self.batsman_b {
            Some(&mut self.batsman_b_runs)
        } else {
            None
        }
    }
}

/// Score and over at a dismissal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallOfWicket {
    pub innings_id: InningsId,
    /// 1-indexed.
    pub wicket_number: u32,
    pub player_out: PlayerId,
    pub score: u32,
    /// Legal balls bowled in the innings when the wicket fell.
    pub legal_balls: u32,
}

impl FallOfWicket {
    #[must_use]
    pub fn overs_display(&self) -> String {
        overs_display(self.legal_balls)
    }
}
