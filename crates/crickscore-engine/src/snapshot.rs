//! Read-only views handed to scoreboard renderers.

use crickscore_types::{
    BatsmanEntry, BowlerEntry, FallOfWicket, Innings, InningsNumber, Match, Partnership,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::state::MatchState;

/// One innings with its ledgers and derived rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsSnapshot {
    pub innings: Innings,
    /// `overs.balls` notation, display only.
    pub overs: String,
    pub run_rate: Decimal,
    /// Present while a chase is in progress.
    pub required_run_rate: Option<Decimal>,
    pub batsmen: Vec<BatsmanEntry>,
    pub bowlers: Vec<BowlerEntry>,
    pub partnerships: Vec<Partnership>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub balls_recorded: usize,
    /// Hex digest of the scoring state; changes whenever anything above does.
    pub digest: String,
}

/// Consistent view of a whole match at one point in its event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub fixture: Match,
    pub innings: Vec<InningsSnapshot>,
    pub state: MatchState,
}

impl MatchSnapshot {
    #[must_use]
    pub fn innings(&self, number: InningsNumber) -> Option<&InningsSnapshot> {
        self.innings.iter().find(|i| i.innings.number == number)
    }

    /// The innings the cursor points at.
    #[must_use]
    pub fn current(&self) -> Option<&InningsSnapshot> {
        let id = self.state.innings_id?;
        self.innings.iter().find(|i| i.innings.id == id)
    }

    #[must_use]
    pub fn over_trace(&self) -> Vec<String> {
        self.state.over_trace.marks()
    }
}
