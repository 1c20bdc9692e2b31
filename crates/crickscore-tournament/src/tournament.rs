//! Tournament aggregate: league table, league phase and playoff bracket.

use crickscore_types::{
    CrickscoreError, FixtureKind, MatchId, MatchSummary, PlayoffBracket, PointsConfig, Result,
    TeamId, TeamStandingRecord, TournamentId, constants,
};
use serde::{Deserialize, Serialize};

use crate::playoff::PlayoffController;
use crate::standings::{FoldOutcome, StandingsSnapshot, StandingsTable};

/// League play is open until `close_league` seeds the bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaguePhase {
    Open,
    Closed,
}

#[derive(Debug, Clone)]
pub struct Tournament {
    name: String,
    phase: LeaguePhase,
    standings: StandingsTable,
    playoffs: PlayoffController,
}

impl Tournament {
    #[must_use]
    pub fn new(id: TournamentId, name: impl Into<String>, points: PointsConfig) -> Self {
        Self {
            name: name.into(),
            phase: LeaguePhase::Open,
            standings: StandingsTable::new(id, points),
            playoffs: PlayoffController::new(id),
        }
    }

    #[must_use]
    pub fn id(&self) -> TournamentId {
        self.standings.tournament_id()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn phase(&self) -> LeaguePhase {
        self.phase
    }

    fn ensure_open(&self, action: &str) -> Result<()> {
        if self.phase == LeaguePhase::Closed {
            return Err(CrickscoreError::TournamentConflict {
                reason: format!("cannot {action}: league phase of {} is closed", self.id()),
            });
        }
        Ok(())
    }

    pub fn register_team(&mut self, team_id: TeamId, name: impl Into<String>) -> Result<()> {
        self.ensure_open("register a team")?;
        self.standings.register_team(team_id, name)
    }

    #[must_use]
    pub fn is_registered(&self, team_id: TeamId) -> bool {
        self.standings.is_registered(team_id)
    }

    /// Fold a completed match into the table.
    ///
    /// A league match already folded stays a no-op after the league closes;
    /// a new league result arriving after the close is rejected because the
    /// bracket was seeded from the table as it stood.
    pub fn fold_match(&mut self, summary: &MatchSummary) -> Result<FoldOutcome> {
        let late = self.phase == LeaguePhase::Closed
            && summary.stage.is_league()
            && !self.standings.is_folded(&summary.match_id);
        if late {
            return Err(CrickscoreError::TournamentConflict {
                reason: format!("league closed before match {} was folded", summary.match_id),
            });
        }
        self.standings.fold(summary)
    }

    #[must_use]
    pub fn standings(&self) -> Vec<TeamStandingRecord> {
        self.standings.ranked()
    }

    #[must_use]
    pub fn standings_snapshot(&self) -> StandingsSnapshot {
        self.standings.snapshot()
    }

    #[must_use]
    pub fn table(&self) -> &StandingsTable {
        &self.standings
    }

    /// Close league play and seed the bracket from the current top four.
    pub fn close_league(&mut self) -> Result<Vec<TeamId>> {
        self.ensure_open("close the league")?;
        if self.standings.team_count() < constants::PLAYOFF_TEAMS {
            return Err(CrickscoreError::TournamentConflict {
                reason: format!(
                    "{} teams registered, playoffs need {}",
                    self.standings.team_count(),
                    constants::PLAYOFF_TEAMS
                ),
            });
        }
        let top = self.standings.top(constants::PLAYOFF_TEAMS);
        self.playoffs.seed(&top)?;
        self.phase = LeaguePhase::Closed;
        tracing::info!(
            tournament_id = %self.id(),
            folded = self.standings.ledger().len(),
            "league phase closed"
        );
        Ok(top)
    }

    pub fn schedule_fixture(&mut self, kind: FixtureKind, match_id: MatchId) -> Result<()> {
        self.playoffs.schedule_fixture(kind, match_id)
    }

    pub fn advance_playoff(
        &mut self,
        match_id: MatchId,
        winner: TeamId,
    ) -> Result<&PlayoffBracket> {
        self.playoffs.advance(match_id, winner)
    }

    #[must_use]
    pub fn bracket(&self) -> &PlayoffBracket {
        self.playoffs.bracket()
    }

    /// Whether `match_id` has been folded into the table or has decided a
    /// playoff fixture. A settled match's result can no longer change.
    #[must_use]
    pub fn has_settled(&self, match_id: MatchId) -> bool {
        let bracket = self.playoffs.bracket();
        self.standings.is_folded(&match_id)
            || bracket
                .fixture_for_match(match_id)
                .is_some_and(|kind| bracket.fixture(kind).is_decided())
    }
}
