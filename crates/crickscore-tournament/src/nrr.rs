//! Net run rate arithmetic.
//!
//! NRR is always derived from a team's cumulative integer totals, never
//! accumulated as a rate, so the same match set yields the same value in
//! any fold order. Intermediate rates keep full `Decimal` precision; only
//! the final difference is rounded.

use crickscore_types::{InningsLine, MatchResult, MatchSummary, constants};
use rust_decimal::Decimal;

fn unrounded_rate(runs: u32, balls: u32) -> Decimal {
    if balls == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(runs) * Decimal::from(constants::BALLS_PER_OVER) / Decimal::from(balls)
}

/// `runs_scored / overs_faced - runs_conceded / overs_bowled`, rounded to
/// [`constants::NRR_DISPLAY_DP`] places. A side with no balls on one side of
/// the ledger contributes a zero rate for that side.
#[must_use]
pub fn net_run_rate(
    runs_scored: u32,
    balls_faced: u32,
    runs_conceded: u32,
    balls_bowled: u32,
) -> Decimal {
    (unrounded_rate(runs_scored, balls_faced) - unrounded_rate(runs_conceded, balls_bowled))
        .round_dp(constants::NRR_DISPLAY_DP)
}

/// Legal balls an innings counts for NRR.
///
/// A side that won by wickets is charged the full quota instead of the balls
/// it actually used. The same count is credited to the fielding side as
/// balls bowled, so the table stays zero-sum.
#[must_use]
pub fn nrr_balls(summary: &MatchSummary, line: &InningsLine) -> u32 {
    match summary.result {
        MatchResult::WonByWickets { winner, .. } if winner == line.batting_team => summary.balls_quota,
        _ => line.legal_balls,
    }
}
