//! Playoff bracket model.
//!
//! Four knockout fixtures seeded from the league's top four:
//!
//! ```text
//! Qualifier 1 (1v2) ──winner──────────────────────────▶ Final A
//!        └──loser──▶ Qualifier 2 A
//! Eliminator  (3v4) ──winner──▶ Qualifier 2 B
//! Qualifier 2       ──winner──────────────────────────▶ Final B
//! Final             ──winner──▶ champion, loser ──▶ runner-up
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MatchId, TeamId, TournamentId};

/// Bracket progression: `GroupStage → Qualifier1AndEliminator → Qualifier2 → Final → Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayoffStage {
    GroupStage,
    /// Qualifier 1 and the Eliminator run in parallel.
    Qualifier1AndEliminator,
    Qualifier2,
    Final,
    Completed,
}

impl fmt::Display for PlayoffStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupStage => write!(f, "GROUP_STAGE"),
            Self::Qualifier1AndEliminator => write!(f, "QUALIFIER_1_ELIMINATOR"),
            Self::Qualifier2 => write!(f, "QUALIFIER_2"),
            Self::Final => write!(f, "FINAL"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixtureKind {
    Qualifier1,
    Eliminator,
    Qualifier2,
    Final,
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualifier1 => write!(f, "qualifier_1"),
            Self::Eliminator => write!(f, "eliminator"),
            Self::Qualifier2 => write!(f, "qualifier_2"),
            Self::Final => write!(f, "final"),
        }
    }
}

/// One knockout fixture's slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffFixture {
    pub kind: FixtureKind,
    pub match_id: Option<MatchId>,
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
    pub winner: Option<TeamId>,
}

impl PlayoffFixture {
    #[must_use]
    pub fn empty(kind: FixtureKind) -> Self {
        Self {
            kind,
            match_id: None,
            team_a: None,
            team_b: None,
            winner: None,
        }
    }

    /// Both teams known.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.team_a.is_some() && self.team_b.is_some()
    }

    #[must_use]
    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    #[must_use]
    pub fn has_team(&self, team: TeamId) -> bool {
        self.team_a == Some(team) || self.team_b == Some(team)
    }

    /// The other team once a winner is known.
    #[must_use]
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner?;
        if self.team_a == Some(winner) { self.team_b } else { self.team_a }
    }
}

/// A tournament's knockout bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffBracket {
    pub tournament_id: TournamentId,
    pub stage: PlayoffStage,
    pub qualifier_1: PlayoffFixture,
    pub eliminator: PlayoffFixture,
    pub qualifier_2: PlayoffFixture,
    pub final_fixture: PlayoffFixture,
    pub champion: Option<TeamId>,
    pub runner_up: Option<TeamId>,
}

impl PlayoffBracket {
    /// An unseeded bracket in `GroupStage`.
    #[must_use]
    pub fn new(tournament_id: TournamentId) -> Self {
        Self {
            tournament_id,
            stage: PlayoffStage::GroupStage,
            qualifier_1: PlayoffFixture::empty(FixtureKind::Qualifier1),
            eliminator: PlayoffFixture::empty(FixtureKind::Eliminator),
            qualifier_2: PlayoffFixture::empty(FixtureKind::Qualifier2),
            final_fixture: PlayoffFixture::empty(FixtureKind::Final),
            champion: None,
            runner_up: None,
        }
    }

    #[must_use]
    pub fn fixture(&self, kind: FixtureKind) -> &PlayoffFixture {
        match kind {
            FixtureKind::Qualifier1 => &self.qualifier_1,
            FixtureKind::Eliminator => &self.eliminator,
            FixtureKind::Qualifier2 => &self.qualifier_2,
            FixtureKind::Final => &self.final_fixture,
        }
    }

    pub fn fixture_mut(&mut self, kind: FixtureKind) -> &mut PlayoffFixture {
        match kind {
            FixtureKind::Qualifier1 => &mut self.qualifier_1,
            FixtureKind::Eliminator => &mut self.eliminator,
            FixtureKind::Qualifier2 => &mut self.qualifier_2,
            FixtureKind::Final => &mut self.final_fixture,
        }
    }

    /// The fixture bound to `match_id`, if any.
    #[must_use]
    pub fn fixture_for_match(&self, match_id: MatchId) -> Option<FixtureKind> {
        [
            FixtureKind::Qualifier1,
            FixtureKind::Eliminator,
            FixtureKind::Qualifier2,
            FixtureKind::Final,
        ]
        .into_iter()
        .find(|k| self.fixture(*k).match_id == Some(match_id))
    }
}
