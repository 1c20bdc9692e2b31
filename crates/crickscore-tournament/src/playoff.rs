//! Playoff Bracket Controller.
//!
//! A linear state machine over [`PlayoffBracket`]. Every slot is written
//! exactly once: seeding and each advance first check that all target slots
//! are empty, and only then write them. A repeated or racing advance gets
//! `BracketSlotOccupied` instead of overwriting a result.

use crickscore_types::{
    CrickscoreError, FixtureKind, MatchId, PlayoffBracket, PlayoffStage, Result, TeamId,
    TournamentId, constants,
};

/// Where a fixture's winner and loser go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    TeamA(FixtureKind),
    TeamB(FixtureKind),
    Champion,
    RunnerUp,
}

impl Slot {
    fn name(self) -> String {
        match self {
            Self::TeamA(kind) => format!("{kind}.team_a"),
            Self::TeamB(kind) => format!("{kind}.team_b"),
            Self::Champion => "champion".to_string(),
            Self::RunnerUp => "runner_up".to_string(),
        }
    }

    fn get(self, bracket: &PlayoffBracket) -> Option<TeamId> {
        match self {
            Self::TeamA(kind) => bracket.fixture(kind).team_a,
            Self::TeamB(kind) => bracket.fixture(kind).team_b,
            Self::Champion => bracket.champion,
            Self::RunnerUp => bracket.runner_up,
        }
    }

    fn set(self, bracket: &mut PlayoffBracket, team: TeamId) {
        match self {
            Self::TeamA(kind) => bracket.fixture_mut(kind).team_a = Some(team),
            Self::TeamB(kind) => bracket.fixture_mut(kind).team_b = Some(team),
            Self::Champion => bracket.champion = Some(team),
            Self::RunnerUp => bracket.runner_up = Some(team),
        }
    }
}

/// `(winner slot, loser slot)` for each fixture.
fn routes(kind: FixtureKind) -> (Slot, Option<Slot>) {
    match kind {
        FixtureKind::Qualifier1 => (
            Slot::TeamA(FixtureKind::Final),
            Some(Slot::TeamA(FixtureKind::Qualifier2)),
        ),
        FixtureKind::Eliminator => (Slot::TeamB(FixtureKind::Qualifier2), None),
        FixtureKind::Qualifier2 => (Slot::TeamB(FixtureKind::Final), None),
        FixtureKind::Final => (Slot::Champion, Some(Slot::RunnerUp)),
    }
}

/// Stage in which a fixture is played.
fn stage_of(kind: FixtureKind) -> PlayoffStage {
    match kind {
        FixtureKind::Qualifier1 | FixtureKind::Eliminator => PlayoffStage::Qualifier1AndEliminator,
        FixtureKind::Qualifier2 => PlayoffStage::Qualifier2,
        FixtureKind::Final => PlayoffStage::Final,
    }
}

fn ensure_empty(bracket: &PlayoffBracket, slot: Slot) -> Result<()> {
    if slot.get(bracket).is_some() {
        tracing::warn!(
            tournament_id = %bracket.tournament_id,
            slot = %slot.name(),
            "rejected write to populated bracket slot"
        );
        return Err(CrickscoreError::BracketSlotOccupied { slot: slot.name() });
    }
    Ok(())
}

/// Owns one tournament's bracket and every write to it.
#[derive(Debug, Clone)]
pub struct PlayoffController {
    bracket: PlayoffBracket,
}

impl PlayoffController {
    #[must_use]
    pub fn new(tournament_id: TournamentId) -> Self {
        Self { bracket: PlayoffBracket::new(tournament_id) }
    }

    #[must_use]
    pub fn bracket(&self) -> &PlayoffBracket {
        &self.bracket
    }

    #[must_use]
    pub fn stage(&self) -> PlayoffStage {
        self.bracket.stage
    }

    /// Seed ranks 1 and 2 into Qualifier 1 and ranks 3 and 4 into the
    /// Eliminator. `top` is in league position order.
    pub fn seed(&mut self, top: &[TeamId]) -> Result<()> {
        if self.bracket.stage != PlayoffStage::GroupStage {
            return Err(CrickscoreError::WrongPlayoffStage {
                expected: PlayoffStage::GroupStage,
                actual: self.bracket.stage,
            });
        }
        let &[first, second, third, fourth] = top else {
            return Err(CrickscoreError::TournamentConflict {
                reason: format!(
                    "bracket needs exactly {} seeds, got {}",
                    constants::PLAYOFF_TEAMS,
                    top.len()
                ),
            });
        };
        for (i, team) in top.iter().enumerate() {
            if top[..i].contains(team) {
                return Err(CrickscoreError::InvalidSetup {
                    reason: format!("team {team} seeded twice"),
                });
            }
        }

        let writes = [
            (Slot::TeamA(FixtureKind::Qualifier1), first),
            (Slot::TeamB(FixtureKind::Qualifier1), second),
            (Slot::TeamA(FixtureKind::Eliminator), third),
            (Slot::TeamB(FixtureKind::Eliminator), fourth),
        ];
        for (slot, _) in writes {
            ensure_empty(&self.bracket, slot)?;
        }
        for (slot, team) in writes {
            slot.set(&mut self.bracket, team);
        }
        self.bracket.stage = PlayoffStage::Qualifier1AndEliminator;

        tracing::info!(
            tournament_id = %self.bracket.tournament_id,
            seeds = ?top,
            "playoff bracket seeded"
        );
        Ok(())
    }

    /// Bind a match id to a fixture whose teams are both known.
    pub fn schedule_fixture(&mut self, kind: FixtureKind, match_id: MatchId) -> Result<()> {
        if let Some(bound) = self.bracket.fixture_for_match(match_id) {
            return Err(CrickscoreError::TournamentConflict {
                reason: format!("match {match_id} already bound to {bound}"),
            });
        }
        let fixture = self.bracket.fixture(kind);
        if !fixture.is_ready() {
            return Err(CrickscoreError::TournamentConflict {
                reason: format!("{kind} teams are not yet known"),
            });
        }
        if fixture.match_id.is_some() {
            return Err(CrickscoreError::BracketSlotOccupied { slot: format!("{kind}.match_id") });
        }
        self.bracket.fixture_mut(kind).match_id = Some(match_id);
        tracing::info!(
            tournament_id = %self.bracket.tournament_id,
            fixture = %kind,
            match_id = %match_id,
            "playoff fixture scheduled"
        );
        Ok(())
    }

    /// Record the winner of the fixture bound to `match_id` and route both
    /// teams onward.
    pub fn advance(&mut self, match_id: MatchId, winner: TeamId) -> Result<&PlayoffBracket> {
        let kind = self
            .bracket
            .fixture_for_match(match_id)
            .ok_or(CrickscoreError::FixtureNotFound(match_id))?;
        let fixture = self.bracket.fixture(kind);
        if fixture.is_decided() {
            tracing::warn!(
                tournament_id = %self.bracket.tournament_id,
                fixture = %kind,
                "rejected second result for decided fixture"
            );
            return Err(CrickscoreError::BracketSlotOccupied { slot: format!("{kind}.winner") });
        }
        let expected = stage_of(kind);
        if self.bracket.stage != expected {
            return Err(CrickscoreError::WrongPlayoffStage {
                expected,
                actual: self.bracket.stage,
            });
        }
        if !fixture.has_team(winner) {
            return Err(CrickscoreError::InvalidSelection {
                reason: format!("team {winner} is not playing {kind}"),
            });
        }
        let mut decided = fixture.clone();
        decided.winner = Some(winner);
        let loser = decided
            .loser()
            .ok_or_else(|| CrickscoreError::Internal(format!("{kind} has one team")))?;

        let (win_slot, lose_slot) = routes(kind);
        ensure_empty(&self.bracket, win_slot)?;
        if let Some(slot) = lose_slot {
            ensure_empty(&self.bracket, slot)?;
        }

        self.bracket.fixture_mut(kind).winner = Some(winner);
        win_slot.set(&mut self.bracket, winner);
        if let Some(slot) = lose_slot {
            slot.set(&mut self.bracket, loser);
        }
        self.bracket.stage = self.next_stage(kind);

        tracing::info!(
            tournament_id = %self.bracket.tournament_id,
            fixture = %kind,
            winner = %winner,
            stage = %self.bracket.stage,
            "playoff bracket advanced"
        );
        Ok(&self.bracket)
    }

    fn next_stage(&self, decided: FixtureKind) -> PlayoffStage {
        match decided {
            FixtureKind::Qualifier1 | FixtureKind::Eliminator => {
                let both = self.bracket.qualifier_1.is_decided()
                    && self.bracket.eliminator.is_decided();
                if both {
                    PlayoffStage::Qualifier2
                } else {
                    PlayoffStage::Qualifier1AndEliminator
                }
            }
            FixtureKind::Qualifier2 => PlayoffStage::Final,
            FixtureKind::Final => PlayoffStage::Completed,
        }
    }
}
