//! Innings lifecycle rules.
//!
//! Evaluated after every delivery, in this order:
//!
//! 1. **Target reached** (innings 2 only): `runs >= target`
//! 2. **All out**: `wickets >= all_out_wickets`
//! 3. **Overs completed**: `legal_balls >= balls_quota`
//!
//! The first trigger that fires is the innings' end reason.

use crickscore_types::{Innings, InningsEndReason, InningsNumber, MatchResult};

/// Why the innings is over, if it is.
#[must_use]
pub fn end_reason(
    innings: &Innings,
    balls_quota: u32,
    all_out_wickets: u32,
) -> Option<InningsEndReason> {
    if innings.number == InningsNumber::Second
        && innings.target.is_some_and(|t| innings.total_runs >= t)
    {
        return Some(InningsEndReason::TargetReached);
    }
    if innings.total_wickets >= all_out_wickets {
        return Some(InningsEndReason::AllOut);
    }
    if innings.legal_balls >= balls_quota {
        return Some(InningsEndReason::OversCompleted);
    }
    None
}

/// Innings 2 chases one more than innings 1 scored.
#[must_use]
pub fn chase_target(first: &Innings) -> u32 {
    first.total_runs + 1
}

/// Decide the match from the completed chase.
#[must_use]
pub fn decide(chase: &Innings, reason: InningsEndReason, all_out_wickets: u32) -> MatchResult {
    let target = chase.target.unwrap_or(1);
    if reason == InningsEndReason::TargetReached || chase.total_runs >= target {
        return MatchResult::WonByWickets {
            winner: chase.batting_team,
            wickets: all_out_wickets.saturating_sub(chase.total_wickets),
        };
    }
    let tied_score = target - 1;
    if chase.total_runs == tied_score {
        MatchResult::Tie
    } else {
        MatchResult::WonByRuns {
            winner: chase.bowling_team,
            runs: tied_score - chase.total_runs,
        }
    }
}
