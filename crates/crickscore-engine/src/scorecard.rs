//! Scorecard aggregator: the four per-innings ledgers.
//!
//! [`Scorecard::apply`] adds a [`BallDelta`] to the batsman, bowler,
//! partnership and fall-of-wicket ledgers; [`Scorecard::revert`] subtracts
//! the same delta. Both are infallible: every precondition was checked
//! before the delta was derived.

use crickscore_types::{
    BatsmanEntry, BatsmanStatus, BowlerEntry, FallOfWicket, InningsId, Partnership, PlayerId,
    PlayingXi,
};
use serde::{Deserialize, Serialize};

use crate::processor::BallDelta;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorecard {
    pub innings_id: InningsId,
    batsmen: Vec<BatsmanEntry>,
    bowlers: Vec<BowlerEntry>,
    partnerships: Vec<Partnership>,
    fall_of_wickets: Vec<FallOfWicket>,
}

impl Scorecard {
    /// One `yet_to_bat` entry per player, in batting order.
    #[must_use]
    pub fn seed(innings_id: InningsId, xi: &PlayingXi) -> Self {
        let batsmen = xi
            .players()
            .iter()
            .zip(1u8..)
            .map(|(player, position)| BatsmanEntry::yet_to_bat(innings_id, *player, position))
            .collect();
        Self {
            innings_id,
            batsmen,
            bowlers: Vec::new(),
            partnerships: Vec::new(),
            fall_of_wickets: Vec::new(),
        }
    }

    #[must_use]
    pub fn batsmen(&self) -> &[BatsmanEntry] {
        &self.batsmen
    }

    #[must_use]
    pub fn bowlers(&self) -> &[BowlerEntry] {
        &self.bowlers
    }

    #[must_use]
    pub fn partnerships(&self) -> &[Partnership] {
        &self.partnerships
    }

    #[must_use]
    pub fn fall_of_wickets(&self) -> &[FallOfWicket] {
        &self.fall_of_wickets
    }

    #[must_use]
    pub fn batsman(&self, player: PlayerId) -> Option<&BatsmanEntry> {
        self.batsmen.iter().find(|b| b.player == player)
    }

    fn batsman_mut(&mut self, player: PlayerId) -> Option<&mut BatsmanEntry> {
        self.batsmen.iter_mut().find(|b| b.player == player)
    }

    #[must_use]
    pub fn bowler(&self, player: PlayerId) -> Option<&BowlerEntry> {
        self.bowlers.iter().find(|b| b.player == player)
    }

    /// Create the bowler's line if absent. Existing counts are never reset.
    pub fn upsert_bowler(&mut self, player: PlayerId) -> &mut BowlerEntry {
        let idx = match self.bowlers.iter().position(|b| b.player == player) {
            Some(idx) => idx,
            None => {
                self.bowlers.push(BowlerEntry::new(self.innings_id, player));
                self.bowlers.len() - 1
            }
        };
        &mut self.bowlers[idx]
    }

    /// At most one bowler is current.
    pub fn set_current_bowler(&mut self, player: Option<PlayerId>) {
        for b in &mut self.bowlers {
            b.is_current_bowler = Some(b.player) == player;
        }
    }

    #[must_use]
    pub fn current_partnership(&self) -> Option<&Partnership> {
        self.partnerships.iter().rev().find(|p| p.is_current)
    }

    fn current_partnership_mut(&mut self) -> Option<&mut Partnership> {
        self.partnerships.iter_mut().rev().find(|p| p.is_current)
    }

    /// Start the partnership for `for_wicket`, closing any open one.
    pub fn open_partnership(&mut self, for_wicket: u32, a: PlayerId, b: PlayerId) {
        for p in &mut self.partnerships {
            p.is_current = false;
        }
        self.partnerships
            .push(Partnership::open(self.innings_id, for_wicket, a, b));
    }

    /// Mark a batsman as having come in.
    pub fn send_in(&mut self, player: PlayerId) {
        if let Some(entry) = self.batsman_mut(player) {
            entry.status = BatsmanStatus::Batting;
        }
    }

    /// Send a batsman who faced nothing back to the pavilion list.
    pub fn recall(&mut self, player: PlayerId) {
        if let Some(entry) = self.batsman_mut(player) {
            entry.status = BatsmanStatus::YetToBat;
            entry.on_strike = false;
            entry.at_crease = false;
        }
    }

    /// Align the crease flags with the cursor's slots.
    pub fn sync_crease(&mut self, striker: Option<PlayerId>, non_striker: Option<PlayerId>) {
        for b in &mut self.batsmen {
            b.on_strike = Some(b.player) == striker;
            b.at_crease = b.on_strike || Some(b.player) == non_striker;
        }
    }

    /// Drop ledger rows created after a ball was recorded.
    pub fn truncate(&mut self, bowlers: usize, partnerships: usize) {
        self.bowlers.truncate(bowlers);
        self.partnerships.truncate(partnerships);
    }

    pub fn apply(&mut self, delta: &BallDelta) {
        if let Some(b) = delta.batsman {
            if let Some(entry) = self.batsman_mut(b.player) {
                entry.runs += b.runs;
                entry.balls_faced += b.balls_faced;
                entry.fours += b.fours;
                entry.sixes += b.sixes;
            }
        }

        let bd = delta.bowler;
        let bowler = self.upsert_bowler(bd.player);
        bowler.balls_bowled += bd.balls;
        bowler.runs_conceded += bd.runs_conceded;
        bowler.wickets += bd.wickets;
        bowler.wides += bd.wides;
        bowler.no_balls += bd.no_balls;
        bowler.dot_balls += bd.dot_balls;

        let pd = delta.partnership;
        if let Some(p) = self.current_partnership_mut() {
            p.runs += pd.runs;
            p.balls += pd.balls;
            if let Some(share) = p.contribution_mut(pd.striker) {
                *share += pd.striker_runs;
            }
        }

        if let Some(dismissal) = delta.event.dismissal {
            if let Some(entry) = self.batsman_mut(dismissal.player_out) {
                entry.status = BatsmanStatus::Out;
                entry.dismissal = Some(dismissal);
                entry.on_strike = false;
                entry.at_crease = false;
            }
            if let Some(p) = self.current_partnership_mut() {
                p.is_current = false;
            }
        }
        if let Some(fow) = &delta.fall_of_wicket {
            self.fall_of_wickets.push(fow.clone());
        }
    }

    /// Exact inverse of [`Scorecard::apply`]. Rows opened after the ball
    /// must already have been truncated.
    pub fn revert(&mut self, delta: &BallDelta) {
        if delta.fall_of_wicket.is_some() {
            self.fall_of_wickets.pop();
        }
        if let Some(dismissal) = delta.event.dismissal {
            if let Some(entry) = self.batsman_mut(dismissal.player_out) {
                entry.status = BatsmanStatus::Batting;
                entry.dismissal = None;
            }
            if let Some(p) = self.partnerships.last_mut() {
                p.is_current = true;
            }
        }

        let pd = delta.partnership;
        if let Some(p) = self.current_partnership_mut() {
            p.runs -= pd.runs;
            p.balls -= pd.balls;
            if let Some(share) = p.contribution_mut(pd.striker) {
                *share -= pd.striker_runs;
            }
        }

        let bd = delta.bowler;
        let bowler = self.upsert_bowler(bd.player);
        bowler.balls_bowled -= bd.balls;
        bowler.runs_conceded -= bd.runs_conceded;
        bowler.wickets -= bd.wickets;
        bowler.wides -= bd.wides;
        bowler.no_balls -= bd.no_balls;
        bowler.dot_balls -= bd.dot_balls;

        if let Some(b) = delta.batsman {
            if let Some(entry) = self.batsman_mut(b.player) {
                entry.runs -= b.runs;
                entry.balls_faced -= b.balls_faced;
                entry.fours -= b.fours;
                entry.sixes -= b.sixes;
            }
        }
    }

    /// Sum of every batsman's runs.
    #[must_use]
    pub fn batting_runs(&self) -> u32 {
        self.batsmen.iter().map(|b| b.runs).sum()
    }
}
