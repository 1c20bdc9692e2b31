//! Standings Engine: folds completed league matches into a points table.
//!
//! ## Fold
//!
//! 1. Reject a summary from another tournament
//! 2. Skip non-league stages and matches already in the [`FoldLedger`]
//! 3. Check the summary's teams are consistent and registered
//! 4. Credit each innings to both sides (runs, NRR balls) and award result
//!    points from [`PointsConfig`]
//! 5. Recompute NRR from the cumulative totals and re-rank the whole table
//!
//! Nothing is written until every check in steps 1 to 3 has passed.

use std::cmp::Ordering;
use std::collections::HashMap;

use crickscore_types::{
    CrickscoreError, MatchId, MatchResult, MatchSummary, PointsConfig, Result, TeamId,
    TeamStandingRecord, TournamentId,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::fold_ledger::FoldLedger;
use crate::nrr;

/// What a fold call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoldOutcome {
    /// The match entered the table.
    Folded,
    /// The match was already in the table; nothing changed.
    AlreadyFolded,
    /// Playoff matches never touch the table.
    NotLeague,
}

impl FoldOutcome {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Folded => "match folded into standings",
            Self::AlreadyFolded => "match already folded; no change",
            Self::NotLeague => "playoff match; standings unchanged",
        }
    }
}

/// Ranked points table handed to display collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsSnapshot {
    pub tournament_id: TournamentId,
    /// Rows in league position order.
    pub records: Vec<TeamStandingRecord>,
    pub matches_folded: usize,
    /// Hex SHA-256 over the ranked rows.
    pub digest: String,
}

/// Total ranking order: points desc, NRR desc, wins desc, name asc, then
/// team id so two equal names can never compare equal.
fn ranking(a: &TeamStandingRecord, b: &TeamStandingRecord) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.net_run_rate.cmp(&a.net_run_rate))
        .then_with(|| b.won.cmp(&a.won))
        .then_with(|| a.team_name.cmp(&b.team_name))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Digest of a ranked table. Identical for any fold order of the same
/// match set.
#[must_use]
pub fn standings_root(ranked: &[TeamStandingRecord]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"crickscore:standings:v1:");
    hasher.update((ranked.len() as u64).to_le_bytes());
    for r in ranked {
        hasher.update(r.team_id.0.as_bytes());
        for n in [
            r.position,
            r.played,
            r.won,
            r.lost,
            r.tied,
            r.no_result,
            r.points,
            r.runs_scored,
            r.balls_faced,
            r.runs_conceded,
            r.balls_bowled,
        ] {
            hasher.update(n.to_le_bytes());
        }
        hasher.update(r.net_run_rate.normalize().to_string().as_bytes());
        hasher.update([0]);
    }
    hasher.finalize().into()
}

/// One tournament's points table.
#[derive(Debug, Clone)]
pub struct StandingsTable {
    tournament_id: TournamentId,
    points: PointsConfig,
    records: HashMap<TeamId, TeamStandingRecord>,
    ledger: FoldLedger,
}

impl StandingsTable {
    #[must_use]
    pub fn new(tournament_id: TournamentId, points: PointsConfig) -> Self {
        Self {
            tournament_id,
            points,
            records: HashMap::new(),
            ledger: FoldLedger::new(),
        }
    }

    #[must_use]
    pub fn tournament_id(&self) -> TournamentId {
        self.tournament_id
    }

    #[must_use]
    pub fn points_config(&self) -> PointsConfig {
        self.points
    }

    pub fn register_team(&mut self, team_id: TeamId, name: impl Into<String>) -> Result<()> {
        if self.records.contains_key(&team_id) {
            return Err(CrickscoreError::TournamentConflict {
                reason: format!("team {team_id} already registered"),
            });
        }
        self.records
            .insert(team_id, TeamStandingRecord::new(self.tournament_id, team_id, name));
        self.rerank();
        Ok(())
    }

    #[must_use]
    pub fn is_registered(&self, team_id: TeamId) -> bool {
        self.records.contains_key(&team_id)
    }

    #[must_use]
    pub fn team_count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn record(&self, team_id: TeamId) -> Option<&TeamStandingRecord> {
        self.records.get(&team_id)
    }

    #[must_use]
    pub fn is_folded(&self, match_id: &MatchId) -> bool {
        self.ledger.is_folded(match_id)
    }

    #[must_use]
    pub fn ledger(&self) -> &FoldLedger {
        &self.ledger
    }

    /// Fold one completed match. Idempotent per match id.
    pub fn fold(&mut self, summary: &MatchSummary) -> Result<FoldOutcome> {
        if summary.tournament_id != Some(self.tournament_id) {
            return Err(CrickscoreError::TournamentConflict {
                reason: format!(
                    "match {} does not belong to tournament {}",
                    summary.match_id, self.tournament_id
                ),
            });
        }
        if !summary.stage.is_league() {
            tracing::debug!(match_id = %summary.match_id, "playoff match not folded");
            return Ok(FoldOutcome::NotLeague);
        }
        if self.ledger.is_folded(&summary.match_id) {
            tracing::debug!(match_id = %summary.match_id, "match already folded");
            return Ok(FoldOutcome::AlreadyFolded);
        }
        Self::check_summary(summary)?;
        for team in [summary.team_a, summary.team_b] {
            if !self.records.contains_key(&team) {
                return Err(CrickscoreError::TeamNotFound(team));
            }
        }

        self.credit(summary);
        self.ledger.mark_folded(summary.match_id);
        self.rerank();

        tracing::info!(
            tournament_id = %self.tournament_id,
            match_id = %summary.match_id,
            result = %summary.result.margin_text(),
            folded = self.ledger.len(),
            "match folded into standings"
        );
        Ok(FoldOutcome::Folded)
    }

    fn check_summary(summary: &MatchSummary) -> Result<()> {
        if summary.team_a == summary.team_b {
            return Err(CrickscoreError::InvalidSetup {
                reason: "a team cannot play itself".to_string(),
            });
        }
        if let Some(winner) = summary.result.winner() {
            if !summary.involves(winner) {
                return Err(CrickscoreError::TeamNotFound(winner));
            }
        }
        for line in &summary.innings {
            let paired = summary.involves(line.batting_team)
                && summary.involves(line.bowling_team)
                && line.batting_team != line.bowling_team;
            if !paired {
                return Err(CrickscoreError::InvalidSetup {
                    reason: format!("innings line teams do not match {}", summary.match_id),
                });
            }
            if line.legal_balls > summary.balls_quota {
                return Err(CrickscoreError::InvalidSetup {
                    reason: format!(
                        "innings faced {} legal balls, quota is {}",
                        line.legal_balls, summary.balls_quota
                    ),
                });
            }
        }
        Ok(())
    }

    /// Apply a validated summary to both teams' cumulative rows.
    fn credit(&mut self, summary: &MatchSummary) {
        let points = self.points;
        for team in [summary.team_a, summary.team_b] {
            if let Some(r) = self.records.get_mut(&team) {
                r.played += 1;
                match summary.result {
                    MatchResult::NoResult => {
                        r.no_result += 1;
                        r.points += points.no_result;
                    }
                    MatchResult::Tie => {
                        r.tied += 1;
                        r.points += points.tie;
                    }
                    MatchResult::WonByWickets { winner, .. }
                    | MatchResult::WonByRuns { winner, .. } => {
                        if winner == team {
                            r.won += 1;
                            r.points += points.win;
                        } else {
                            r.lost += 1;
                            r.points += points.loss;
                        }
                    }
                }
            }
        }

        // An abandoned match keeps its points but adds nothing to NRR.
        if summary.result == MatchResult::NoResult {
            return;
        }
        for line in &summary.innings {
            let balls = nrr::nrr_balls(summary, line);
            if let Some(bat) = self.records.get_mut(&line.batting_team) {
                bat.runs_scored += line.runs;
                bat.balls_faced += balls;
            }
            if let Some(bowl) = self.records.get_mut(&line.bowling_team) {
                bowl.runs_conceded += line.runs;
                bowl.balls_bowled += balls;
            }
        }
    }

    /// Recompute every NRR from cumulative totals, then assign positions.
    fn rerank(&mut self) {
        for r in self.records.values_mut() {
            r.net_run_rate =
                nrr::net_run_rate(r.runs_scored, r.balls_faced, r.runs_conceded, r.balls_bowled);
        }
        let mut order: Vec<(TeamId, &TeamStandingRecord)> =
            self.records.iter().map(|(id, r)| (*id, r)).collect();
        order.sort_by(|a, b| ranking(a.1, b.1));
        let positions: Vec<TeamId> = order.into_iter().map(|(id, _)| id).collect();
        for (i, id) in positions.into_iter().enumerate() {
            if let Some(r) = self.records.get_mut(&id) {
                r.position = u32::try_from(i + 1).unwrap_or(u32::MAX);
            }
        }
    }

    /// Rows in league position order.
    #[must_use]
    pub fn ranked(&self) -> Vec<TeamStandingRecord> {
        let mut rows: Vec<TeamStandingRecord> = self.records.values().cloned().collect();
        rows.sort_by_key(|r| r.position);
        rows
    }

    /// The first `n` teams by league position.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<TeamId> {
        self.ranked().into_iter().take(n).map(|r| r.team_id).collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> StandingsSnapshot {
        let records = self.ranked();
        let digest = hex::encode(standings_root(&records));
        StandingsSnapshot {
            tournament_id: self.tournament_id,
            records,
            matches_folded: self.ledger.len(),
            digest,
        }
    }
}
