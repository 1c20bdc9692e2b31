//! Match (fixture) model: setup, lifecycle status and result.
//!
//! A [`Match`] is created from a [`MatchSetup`] supplied by the registration
//! collaborator and is mutated only by the innings lifecycle and the playoff
//! bracket. The core never deletes a match.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrickscoreError, MatchId, Result, TeamId, TournamentId, constants};

/// Lifecycle of a match: `Setup → Live → InningsBreak → Live → Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    Setup,
    Live,
    InningsBreak,
    Completed,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "SETUP"),
            Self::Live => write!(f, "LIVE"),
            Self::InningsBreak => write!(f, "INNINGS_BREAK"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Which part of a tournament the match belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStage {
    League,
    Qualifier1,
    Eliminator,
    Qualifier2,
    Final,
}

impl MatchStage {
    /// Only league matches feed the points table.
    #[must_use]
    pub fn is_league(self) -> bool {
        self == Self::League
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TossDecision {
    Bat,
    Bowl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toss {
    pub winner: TeamId,
    pub decision: TossDecision,
}

/// Everything the registration collaborator hands over to create a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSetup {
    pub id: MatchId,
    pub tournament_id: Option<TournamentId>,
    pub stage: MatchStage,
    pub team_a: TeamId,
    pub team_b: TeamId,
    /// Overs per side.
    pub total_overs: u32,
    /// Per-bowler over limit; `None` means `ceil(total_overs / 5)`.
    pub max_overs_per_bowler: Option<u32>,
    pub toss: Option<Toss>,
    pub venue: String,
}

impl MatchSetup {
    pub fn validate(&self) -> Result<()> {
        if self.team_a == self.team_b {
            return Err(CrickscoreError::InvalidSetup {
                reason: "a team cannot play itself".to_string(),
            });
        }
        if self.total_overs == 0 || self.total_overs > constants::MAX_OVERS {
            return Err(CrickscoreError::InvalidSetup {
                reason: format!(
                    "total_overs must be in 1..={}, got {}",
                    constants::MAX_OVERS,
                    self.total_overs
                ),
            });
        }
        if self.max_overs_per_bowler == Some(0) {
            return Err(CrickscoreError::InvalidSetup {
                reason: "max_overs_per_bowler must be > 0".to_string(),
            });
        }
        match self.toss {
            Some(toss) if toss.winner != self.team_a && toss.winner != self.team_b => {
                Err(CrickscoreError::InvalidSetup {
                    reason: format!("toss winner {} is not playing this match", toss.winner),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Decided outcome of a completed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    /// The chasing side reached the target.
    WonByWickets { winner: TeamId, wickets: u32 },
    /// The defending side held the chase below the target.
    WonByRuns { winner: TeamId, runs: u32 },
    Tie,
    NoResult,
}

impl MatchResult {
    #[must_use]
    pub fn winner(&self) -> Option<TeamId> {
        match self {
            Self::WonByWickets { winner, .. } | Self::WonByRuns { winner, .. } => Some(*winner),
            Self::Tie | Self::NoResult => None,
        }
    }

    /// Human-readable margin, e.g. "Won by 4 wickets".
    #[must_use]
    pub fn margin_text(&self) -> String {
        fn plural(n: u32, unit: &str) -> String {
            if n == 1 {
                format!("Won by 1 {unit}")
            } else {
                format!("Won by {n} {unit}s")
            }
        }
        match self {
            Self::WonByWickets { wickets, .. } => plural(*wickets, "wicket"),
            Self::WonByRuns { runs, .. } => plural(*runs, "run"),
            Self::Tie => "Match tied".to_string(),
            Self::NoResult => "No result".to_string(),
        }
    }
}

/// A fixture between two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: Option<TournamentId>,
    pub stage: MatchStage,
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub total_overs: u32,
    pub max_overs_per_bowler: u32,
    pub toss: Option<Toss>,
    pub venue: String,
    pub status: MatchStatus,
    pub winner: Option<TeamId>,
    /// Free-text margin, e.g. "Won by 4 wickets".
    pub win_margin: Option<String>,
    pub result: Option<MatchResult>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Build a match in `Setup` status. The setup must already be validated.
    #[must_use]
    pub fn from_setup(setup: &MatchSetup) -> Self {
        let max_overs_per_bowler = setup
            .max_overs_per_bowler
            .unwrap_or_else(|| setup.total_overs.div_ceil(constants::BOWLER_QUOTA_DIVISOR));
        Self {
            id: setup.id,
            tournament_id: setup.tournament_id,
            stage: setup.stage,
            team_a: setup.team_a,
            team_b: setup.team_b,
            total_overs: setup.total_overs,
            max_overs_per_bowler,
            toss: setup.toss,
            venue: setup.venue.clone(),
            status: MatchStatus::Setup,
            winner: None,
            win_margin: None,
            result: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// The team that bats in the first innings.
    #[must_use]
    pub fn batting_first(&self) -> TeamId {
        match self.toss {
            Some(Toss { winner, decision: TossDecision::Bat }) => winner,
            Some(Toss { winner, decision: TossDecision::Bowl }) => self.opponent(winner),
            None => self.team_a,
        }
    }

    #[must_use]
    pub fn opponent(&self, team: TeamId) -> TeamId {
        if team == self.team_a { self.team_b } else { self.team_a }
    }

    #[must_use]
    pub fn involves(&self, team: TeamId) -> bool {
        team == self.team_a || team == self.team_b
    }

    /// Legal balls allotted to each side.
    #[must_use]
    pub fn balls_quota(&self) -> u32 {
        self.total_overs * constants::BALLS_PER_OVER
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Persist a decided result and move to `Completed`.
    pub fn complete(&mut self, result: MatchResult) {
        self.status = MatchStatus::Completed;
        self.winner = result.winner();
        self.win_margin = Some(result.margin_text());
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
    }
}

/// One innings as the points table sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsLine {
    pub batting_team: TeamId,
    pub bowling_team: TeamId,
    pub runs: u32,
    pub wickets: u32,
    pub legal_balls: u32,
}

/// What a completed match hands to the standings engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub tournament_id: Option<TournamentId>,
    pub stage: MatchStage,
    pub team_a: TeamId,
    pub team_b: TeamId,
    /// Legal balls each side was allotted.
    pub balls_quota: u32,
    pub result: MatchResult,
    /// Innings in batting order. Empty or partial for an abandoned match.
    pub innings: Vec<InningsLine>,
}

impl MatchSummary {
    #[must_use]
    pub fn involves(&self, team: TeamId) -> bool {
        team == self.team_a || team == self.team_b
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl MatchSetup {
    /// A 20-over league match, `team_a` batting first.
    pub fn t20(team_a: TeamId, team_b: TeamId) -> Self {
        Self::with_overs(team_a, team_b, 20)
    }

    pub fn with_overs(team_a: TeamId, team_b: TeamId, total_overs: u32) -> Self {
        Self {
            id: MatchId::new(),
            tournament_id: None,
            stage: MatchStage::League,
            team_a,
            team_b,
            total_overs,
            max_overs_per_bowler: None,
            toss: None,
            venue: "Test Ground".to_string(),
        }
    }
}
