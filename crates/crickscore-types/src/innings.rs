//! Innings model and overs notation.
//!
//! Balls are always stored as an integer count of legal deliveries. The
//! familiar `18.4` notation is derived for display by [`overs_display`] and is
//! never used for arithmetic.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{InningsId, MatchId, TeamId, constants};

/// Render a legal-ball count as overs notation: `⌊balls/6⌋.(balls mod 6)`.
#[must_use]
pub fn overs_display(balls: u32) -> String {
    format!(
        "{}.{}",
        balls / constants::BALLS_PER_OVER,
        balls % constants::BALLS_PER_OVER
    )
}

/// Runs per six legal balls, rounded for display. Zero when no balls bowled.
#[must_use]
pub fn runs_per_over(runs: u32, balls: u32) -> Decimal {
    if balls == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(runs) * Decimal::from(constants::BALLS_PER_OVER) / Decimal::from(balls))
        .round_dp(constants::RATE_DISPLAY_DP)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum InningsNumber {
    First,
    Second,
}

impl InningsNumber {
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl fmt::Display for InningsNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// `NotStarted → InProgress → Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InningsStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for InningsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NOT_STARTED"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Why an innings closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InningsEndReason {
    OversCompleted,
    AllOut,
    TargetReached,
    /// Closed because the match was decided or abandoned elsewhere.
    MatchEnded,
}

impl fmt::Display for InningsEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OversCompleted => write!(f, "overs_completed"),
            Self::AllOut => write!(f, "all_out"),
            Self::TargetReached => write!(f, "target_reached"),
            Self::MatchEnded => write!(f, "match_ended"),
        }
    }
}

/// Extras conceded, by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    pub wides: u32,
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
    pub penalties: u32,
}

impl Extras {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.wides + self.no_balls + self.byes + self.leg_byes + self.penalties
    }

    /// Component-wise sum, `None` if any bucket overflows.
    #[must_use]
    pub fn checked_plus(self, other: Self) -> Option<Self> {
        Some(Self {
            wides: self.wides.checked_add(other.wides)?,
            no_balls: self.no_balls.checked_add(other.no_balls)?,
            byes: self.byes.checked_add(other.byes)?,
            leg_byes: self.leg_byes.checked_add(other.leg_byes)?,
            penalties: self.penalties.checked_add(other.penalties)?,
        })
    }

    /// Component-wise difference, saturating at zero.
    #[must_use]
    pub fn minus(self, other: Self) -> Self {
        Self {
            wides: self.wides.saturating_sub(other.wides),
            no_balls: self.no_balls.saturating_sub(other.no_balls),
            byes: self.byes.saturating_sub(other.byes),
            leg_byes: self.leg_byes.saturating_sub(other.leg_byes),
            penalties: self.penalties.saturating_sub(other.penalties),
        }
    }
}

/// One side's turn to bat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Innings {
    pub id: InningsId,
    pub match_id: MatchId,
    pub number: InningsNumber,
    pub batting_team: TeamId,
    pub bowling_team: TeamId,
    pub total_runs: u32,
    pub total_wickets: u32,
    /// Legal deliveries bowled.
    pub legal_balls: u32,
    pub extras: Extras,
    /// Set on the second innings only: first-innings total + 1.
    pub target: Option<u32>,
    pub status: InningsStatus,
    pub end_reason: Option<InningsEndReason>,
}

impl Innings {
    #[must_use]
    pub fn new(
        match_id: MatchId,
        number: InningsNumber,
        batting_team: TeamId,
        bowling_team: TeamId,
    ) -> Self {
        Self {
            id: InningsId::deterministic(match_id, number.as_u8()),
            match_id,
            number,
            batting_team,
            bowling_team,
            total_runs: 0,
            total_wickets: 0,
            legal_balls: 0,
            extras: Extras::default(),
            target: None,
            status: InningsStatus::NotStarted,
            end_reason: None,
        }
    }

    #[must_use]
    pub fn overs_display(&self) -> String {
        overs_display(self.legal_balls)
    }

    #[must_use]
    pub fn run_rate(&self) -> Decimal {
        runs_per_over(self.total_runs, self.legal_balls)
    }

    /// Runs still needed to reach the target (second innings only).
    #[must_use]
    pub fn runs_needed(&self) -> Option<u32> {
        self.target.map(|t| t.saturating_sub(self.total_runs))
    }

    /// Required run rate over the remaining balls of `balls_quota`.
    #[must_use]
    pub fn required_run_rate(&self, balls_quota: u32) -> Option<Decimal> {
        let needed = self.runs_needed()?;
        let remaining = balls_quota.saturating_sub(self.legal_balls);
        Some(runs_per_over(needed, remaining))
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == InningsStatus::InProgress
    }
}
