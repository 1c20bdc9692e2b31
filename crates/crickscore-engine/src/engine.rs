//! The per-match aggregate.
//!
//! `MatchEngine` owns everything one match mutates: the fixture, both
//! innings, their scorecards and event logs, the undo journal and the
//! match-state cursor. Every public mutator checks all of its preconditions
//! first and only then commits, so a rejected call leaves no trace.
//!
//! ```text
//! initialize_innings ─▶ set_bowler / set_batsman ─▶ record_ball ─┬─▶ ...
//!                                                    undo_last_ball ◀┘
//! ```
//!
//! The engine is single-threaded. Serializing writers across threads is the
//! service layer's job.

use chrono::{DateTime, Utc};
use crickscore_types::{
    BallEvent, BallInput, BatsmanStatus, BowlerEntry, CrickscoreError, Extras, Innings,
    InningsEndReason, InningsId, InningsLine, InningsNumber, InningsStatus, Match, MatchId,
    MatchResult, MatchSetup, MatchStatus, MatchSummary, PlayerId, PlayingXi, Result, TeamId,
    constants,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    determinism::innings_digest_hex,
    lifecycle,
    processor::{self, BallDelta, InningsDelta},
    scorecard::Scorecard,
    snapshot::{InningsSnapshot, MatchSnapshot},
    state::MatchState,
};

/// Response bundle for one recorded delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallOutcome {
    pub event: BallEvent,
    pub state: MatchState,
    pub innings: Innings,
    pub need_new_batsman: bool,
    pub need_new_bowler: bool,
    pub runs_this_ball: u32,
    pub is_legal_ball: bool,
    pub innings_ended: bool,
    pub innings_end_reason: Option<InningsEndReason>,
    pub match_completed: bool,
    pub winner: Option<TeamId>,
    pub win_margin: Option<String>,
}

/// Lifecycle fields a delivery can change, captured before it is applied.
#[derive(Debug, Clone)]
struct Lifecycle {
    match_status: MatchStatus,
    winner: Option<TeamId>,
    win_margin: Option<String>,
    result: Option<MatchResult>,
    completed_at: Option<DateTime<Utc>>,
    innings: [(InningsStatus, Option<InningsEndReason>, Option<u32>); 2],
}

/// Undo journal entry: the applied delta plus what it overwrote.
#[derive(Debug, Clone)]
struct JournalEntry {
    delta: BallDelta,
    pre_state: MatchState,
    lifecycle: Lifecycle,
    bowler_rows: usize,
    partnership_rows: usize,
}

pub struct MatchEngine {
    fixture: Match,
    /// Batting XI of each innings; the bowling XI is the other one.
    lineups: [PlayingXi; 2],
    innings: [Innings; 2],
    cards: [Scorecard; 2],
    events: [Vec<BallEvent>; 2],
    journal: [Vec<JournalEntry>; 2],
    state: MatchState,
}

impl MatchEngine {
    /// Set up a match: both innings `not_started`, batsmen seeded in order.
    pub fn new(setup: &MatchSetup, xi_a: PlayingXi, xi_b: PlayingXi) -> Result<Self> {
        setup.validate()?;
        for (xi, team) in [(&xi_a, setup.team_a), (&xi_b, setup.team_b)] {
            if xi.team_id != team {
                return Err(CrickscoreError::InvalidRoster {
                    reason: format!("XI for {} submitted for {team}", xi.team_id),
                });
            }
        }
        if let Some(p) = xi_a.players().iter().find(|p| xi_b.contains(**p)) {
            return Err(CrickscoreError::InvalidRoster {
                reason: format!("player {p} named in both XIs"),
            });
        }

        let fixture = Match::from_setup(setup);
        let (first, second) = if fixture.batting_first() == setup.team_a {
            (xi_a, xi_b)
        } else {
            (xi_b, xi_a)
        };
        let innings = [
            Innings::new(fixture.id, InningsNumber::First, first.team_id, second.team_id),
            Innings::new(fixture.id, InningsNumber::Second, second.team_id, first.team_id),
        ];
        let cards = [
            Scorecard::seed(innings[0].id, &first),
            Scorecard::seed(innings[1].id, &second),
        ];

        info!(
            match_id = %fixture.id,
            batting_first = %first.team_id,
            overs = fixture.total_overs,
            "Match created"
        );

        Ok(Self {
            state: MatchState::new(fixture.id, constants::DEFAULT_OVER_TRACE_CAPACITY),
            fixture,
            lineups: [first, second],
            innings,
            cards,
            events: [Vec::new(), Vec::new()],
            journal: [Vec::new(), Vec::new()],
        })
    }

    /// Override the over-trace bound. Only meaningful before play starts.
    #[must_use]
    pub fn with_trace_capacity(mut self, capacity: usize) -> Self {
        if self.state.innings_id.is_none() {
            self.state = MatchState::new(self.fixture.id, capacity);
        }
        self
    }

    // ── Queries ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn id(&self) -> MatchId {
        self.fixture.id
    }

    #[must_use]
    pub fn fixture(&self) -> &Match {
        &self.fixture
    }

    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[must_use]
    pub fn innings_by_number(&self, number: InningsNumber) -> &Innings {
        match number {
            InningsNumber::First => &self.innings[0],
            InningsNumber::Second => &self.innings[1],
        }
    }

    pub fn innings(&self, innings_id: InningsId) -> Result<&Innings> {
        Ok(&self.innings[self.index(innings_id)?])
    }

    pub fn scorecard(&self, innings_id: InningsId) -> Result<&Scorecard> {
        Ok(&self.cards[self.index(innings_id)?])
    }

    pub fn events(&self, innings_id: InningsId) -> Result<&[BallEvent]> {
        Ok(&self.events[self.index(innings_id)?])
    }

    fn index(&self, innings_id: InningsId) -> Result<usize> {
        self.innings
            .iter()
            .position(|i| i.id == innings_id)
            .ok_or(CrickscoreError::InningsNotFound(innings_id))
    }

    // ── Preconditions ───────────────────────────────────────────────────

    fn check_match(&self, match_id: MatchId) -> Result<()> {
        if match_id == self.fixture.id {
            Ok(())
        } else {
            Err(CrickscoreError::MatchNotFound(match_id))
        }
    }

    fn require_live(&self, idx: usize) -> Result<()> {
        if self.fixture.status != MatchStatus::Live {
            return Err(CrickscoreError::WrongMatchStatus {
                expected: MatchStatus::Live,
                actual: self.fixture.status,
            });
        }
        let innings = &self.innings[idx];
        if innings.status != InningsStatus::InProgress {
            return Err(CrickscoreError::WrongInningsStatus {
                innings: innings.id,
                expected: InningsStatus::InProgress,
                actual: innings.status,
            });
        }
        Ok(())
    }

    fn require_batter(&self, idx: usize, player: PlayerId) -> Result<()> {
        let xi = &self.lineups[idx];
        if xi.contains(player) {
            Ok(())
        } else {
            Err(CrickscoreError::PlayerNotFound {
                player,
                context: format!("batting XI of {}", xi.team_id),
            })
        }
    }

    fn require_fielder(&self, idx: usize, player: PlayerId) -> Result<()> {
        let xi = &self.lineups[1 - idx];
        if xi.contains(player) {
            Ok(())
        } else {
            Err(CrickscoreError::PlayerNotFound {
                player,
                context: format!("bowling XI of {}", xi.team_id),
            })
        }
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Open an innings with its opening pair and bowler.
    pub fn initialize_innings(
        &mut self,
        innings_id: InningsId,
        match_id: MatchId,
        striker: PlayerId,
        non_striker: PlayerId,
        bowler: PlayerId,
    ) -> Result<()> {
        self.check_match(match_id)?;
        let idx = self.index(innings_id)?;
        let expected = if idx == 0 { MatchStatus::Setup } else { MatchStatus::InningsBreak };
        if self.fixture.status != expected {
            return Err(CrickscoreError::WrongMatchStatus {
                expected,
                actual: self.fixture.status,
            });
        }
        let innings = &self.innings[idx];
        if innings.status != InningsStatus::NotStarted {
            return Err(CrickscoreError::WrongInningsStatus {
                innings: innings_id,
                expected: InningsStatus::NotStarted,
                actual: innings.status,
            });
        }
        if striker == non_striker {
            return Err(CrickscoreError::InvalidSelection {
                reason: "striker and non-striker must be different players".to_string(),
            });
        }
        self.require_batter(idx, striker)?;
        self.require_batter(idx, non_striker)?;
        self.require_fielder(idx, bowler)?;

        self.innings[idx].status = InningsStatus::InProgress;
        self.fixture.status = MatchStatus::Live;
        self.state.begin_innings(innings_id, striker, non_striker, bowler);

        let card = &mut self.cards[idx];
        card.send_in(striker);
        card.send_in(non_striker);
        card.open_partnership(1, striker, non_striker);
        card.upsert_bowler(bowler);
        card.set_current_bowler(Some(bowler));
        card.sync_crease(Some(striker), Some(non_striker));

        info!(
            match_id = %self.fixture.id,
            innings = self.innings[idx].number.as_u8(),
            batting = %self.innings[idx].batting_team,
            target = ?self.innings[idx].target,
            "Innings started"
        );
        Ok(())
    }

    /// Fill an empty crease slot with a batsman who has not batted yet.
    pub fn set_batsman(
        &mut self,
        innings_id: InningsId,
        player: PlayerId,
        is_striker: bool,
    ) -> Result<()> {
        let idx = self.index(innings_id)?;
        self.require_live(idx)?;
        self.require_batter(idx, player)?;
        let status = self.cards[idx].batsman(player).map(|b| b.status);
        if status != Some(BatsmanStatus::YetToBat) {
            return Err(CrickscoreError::CursorConflict {
                reason: format!("{player} has already batted"),
            });
        }
        let slot = if is_striker { self.state.striker } else { self.state.non_striker };
        if let Some(occupant) = slot {
            warn!(
                match_id = %self.fixture.id,
                occupant = %occupant,
                requested = %player,
                "Crease slot already occupied"
            );
            return Err(CrickscoreError::CursorConflict {
                reason: format!("crease slot is occupied by {occupant}"),
            });
        }

        if is_striker {
            self.state.striker = Some(player);
        } else {
            self.state.non_striker = Some(player);
        }
        let card = &mut self.cards[idx];
        card.send_in(player);
        if let (Some(a), Some(b)) = (self.state.striker, self.state.non_striker) {
            if card.current_partnership().is_none() {
                card.open_partnership(self.innings[idx].total_wickets + 1, a, b);
            }
        }
        self.state.need_new_batsman =
            self.state.striker.is_none() || self.state.non_striker.is_none();
        card.sync_crease(self.state.striker, self.state.non_striker);

        info!(match_id = %self.fixture.id, player = %player, is_striker, "Batsman in");
        Ok(())
    }

    /// Hand the ball to a bowler. Creates the bowler's line on first use.
    pub fn set_bowler(&mut self, innings_id: InningsId, player: PlayerId) -> Result<()> {
        let idx = self.index(innings_id)?;
        self.require_live(idx)?;
        self.require_fielder(idx, player)?;
        if self.state.last_bowler == Some(player) {
            return Err(CrickscoreError::BowlerNotAllowed {
                bowler: player,
                reason: "bowled the previous over".to_string(),
            });
        }
        let bowled = self.cards[idx]
            .bowler(player)
            .map_or(0, BowlerEntry::completed_overs);
        if bowled >= self.fixture.max_overs_per_bowler {
            return Err(CrickscoreError::BowlerNotAllowed {
                bowler: player,
                reason: format!("quota of {} overs used", self.fixture.max_overs_per_bowler),
            });
        }

        let card = &mut self.cards[idx];
        card.upsert_bowler(player);
        card.set_current_bowler(Some(player));
        self.state.bowler = Some(player);
        self.state.need_new_bowler = false;

        info!(match_id = %self.fixture.id, bowler = %player, over = self.state.over, "Bowler set");
        Ok(())
    }

    /// Record one delivery: validate, derive, then apply every ledger change.
    pub fn record_ball(&mut self, input: &BallInput) -> Result<BallOutcome> {
        self.check_match(input.match_id)?;
        let idx = self.index(input.innings_id)?;
        self.require_live(idx)?;
        processor::validate(input)?;
        let cursor = self.state.ready_for_delivery()?;
        if cursor != (input.striker, input.non_striker, input.bowler) {
            warn!(
                match_id = %self.fixture.id,
                over = self.state.over,
                ball = self.state.ball,
                "Ball submitted against a stale cursor"
            );
            return Err(CrickscoreError::CursorConflict {
                reason: "striker, non-striker or bowler differ from the current cursor".to_string(),
            });
        }
        if let Some(fielder) = input.fielder {
            self.require_fielder(idx, fielder)?;
        }
        let sequence = u32::try_from(self.events[idx].len())
            .map_err(|_| CrickscoreError::Internal("event log overflow".to_string()))?;
        let delta = processor::derive(input, &self.state, &self.innings[idx], sequence);
        let totals = advanced_totals(&self.innings[idx], &delta.innings)?;

        // Nothing below can fail.
        let entry = JournalEntry {
            delta: delta.clone(),
            pre_state: self.state.clone(),
            lifecycle: self.lifecycle(),
            bowler_rows: self.cards[idx].bowlers().len(),
            partnership_rows: self.cards[idx].partnerships().len(),
        };

        self.cards[idx].apply(&delta);
        let innings = &mut self.innings[idx];
        (innings.total_runs, innings.total_wickets, innings.legal_balls, innings.extras) = totals;
        self.state = delta.next_state.clone();

        let ended = lifecycle::end_reason(
            &self.innings[idx],
            self.fixture.balls_quota(),
            self.lineups[idx].all_out_wickets(),
        );
        if let Some(reason) = ended {
            self.close_innings(idx, reason);
        }
        self.cards[idx].set_current_bowler(self.state.bowler);
        self.cards[idx].sync_crease(self.state.striker, self.state.non_striker);

        self.events[idx].push(delta.event.clone());
        self.journal[idx].push(entry);

        debug!(
            match_id = %self.fixture.id,
            over = delta.event.over,
            ball = delta.event.ball_in_over,
            mark = %delta.event.mark(),
            score = self.innings[idx].total_runs,
            wickets = self.innings[idx].total_wickets,
            "Ball recorded"
        );

        Ok(BallOutcome {
            runs_this_ball: delta.event.total_runs,
            is_legal_ball: delta.event.is_legal_ball,
            event: delta.event,
            state: self.state.clone(),
            innings: self.innings[idx].clone(),
            need_new_batsman: self.state.need_new_batsman,
            need_new_bowler: self.state.need_new_bowler,
            innings_ended: ended.is_some(),
            innings_end_reason: ended,
            match_completed: self.fixture.is_completed(),
            winner: self.fixture.winner,
            win_margin: self.fixture.win_margin.clone(),
        })
    }

    fn close_innings(&mut self, idx: usize, reason: InningsEndReason) {
        let innings = &mut self.innings[idx];
        innings.status = InningsStatus::Completed;
        innings.end_reason = Some(reason);
        self.state.need_new_batsman = false;
        self.state.need_new_bowler = false;

        if idx == 0 {
            let target = lifecycle::chase_target(&self.innings[0]);
            self.innings[1].target = Some(target);
            self.fixture.status = MatchStatus::InningsBreak;
            info!(
                match_id = %self.fixture.id,
                runs = self.innings[0].total_runs,
                wickets = self.innings[0].total_wickets,
                reason = %reason,
                target,
                "First innings complete"
            );
        } else {
            let result =
                lifecycle::decide(&self.innings[1], reason, self.lineups[1].all_out_wickets());
            for innings in &mut self.innings {
                if innings.status != InningsStatus::Completed {
                    innings.status = InningsStatus::Completed;
                    innings.end_reason.get_or_insert(InningsEndReason::MatchEnded);
                }
            }
            self.fixture.complete(result);
            info!(
                match_id = %self.fixture.id,
                winner = ?result.winner(),
                margin = %result.margin_text(),
                "Match complete"
            );
        }
    }

    /// Reverse the most recent delivery of `innings_id` exactly.
    pub fn undo_last_ball(&mut self, innings_id: InningsId) -> Result<BallEvent> {
        let idx = self.index(innings_id)?;
        if self.fixture.result == Some(MatchResult::NoResult) {
            return Err(CrickscoreError::WrongMatchStatus {
                expected: MatchStatus::Live,
                actual: self.fixture.status,
            });
        }
        if idx == 0 && self.innings[1].status != InningsStatus::NotStarted {
            return Err(CrickscoreError::WrongInningsStatus {
                innings: self.innings[1].id,
                expected: InningsStatus::NotStarted,
                actual: self.innings[1].status,
            });
        }
        let Some(entry) = self.journal[idx].pop() else {
            return Err(CrickscoreError::NoBallToUndo(innings_id));
        };
        self.events[idx].pop();

        let card = &mut self.cards[idx];
        card.truncate(entry.bowler_rows, entry.partnership_rows);
        card.revert(&entry.delta);
        for arrival in [self.state.striker, self.state.non_striker].into_iter().flatten() {
            if !entry.pre_state.at_crease(arrival) {
                card.recall(arrival);
            }
        }

        let d = entry.delta.innings;
        let innings = &mut self.innings[idx];
        innings.total_runs -= d.runs;
        innings.total_wickets -= d.wickets;
        innings.legal_balls -= d.legal_balls;
        innings.extras = innings.extras.minus(d.extras);

        self.restore(entry.lifecycle);
        self.state = entry.pre_state;
        let card = &mut self.cards[idx];
        card.set_current_bowler(self.state.bowler);
        card.sync_crease(self.state.striker, self.state.non_striker);

        let event = entry.delta.event;
        info!(
            match_id = %self.fixture.id,
            over = event.over,
            ball = event.ball_in_over,
            runs = event.total_runs,
            "Ball undone"
        );
        Ok(event)
    }

    /// End the match without a result.
    pub fn abandon(&mut self) -> Result<MatchResult> {
        if self.fixture.is_completed() {
            return Err(CrickscoreError::WrongMatchStatus {
                expected: MatchStatus::Live,
                actual: self.fixture.status,
            });
        }
        for innings in &mut self.innings {
            if innings.status == InningsStatus::InProgress {
                innings.status = InningsStatus::Completed;
                innings.end_reason = Some(InningsEndReason::MatchEnded);
            }
        }
        self.state.need_new_batsman = false;
        self.state.need_new_bowler = false;
        self.fixture.complete(MatchResult::NoResult);
        info!(match_id = %self.fixture.id, "Match abandoned");
        Ok(MatchResult::NoResult)
    }

    fn lifecycle(&self) -> Lifecycle {
        let fields = |i: &Innings| (i.status, i.end_reason, i.target);
        Lifecycle {
            match_status: self.fixture.status,
            winner: self.fixture.winner,
            win_margin: self.fixture.win_margin.clone(),
            result: self.fixture.result,
            completed_at: self.fixture.completed_at,
            innings: [fields(&self.innings[0]), fields(&self.innings[1])],
        }
    }

    fn restore(&mut self, saved: Lifecycle) {
        self.fixture.status = saved.match_status;
        self.fixture.winner = saved.winner;
        self.fixture.win_margin = saved.win_margin;
        self.fixture.result = saved.result;
        self.fixture.completed_at = saved.completed_at;
        for (innings, (status, end_reason, target)) in self.innings.iter_mut().zip(saved.innings) {
            innings.status = status;
            innings.end_reason = end_reason;
            innings.target = target;
        }
    }

    // ── Views ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn innings_snapshot(&self, number: InningsNumber) -> InningsSnapshot {
        let idx = usize::from(number == InningsNumber::Second);
        let innings = &self.innings[idx];
        let card = &self.cards[idx];
        let required_run_rate = if innings.is_in_progress() {
            innings.required_run_rate(self.fixture.balls_quota())
        } else {
            None
        };
        InningsSnapshot {
            innings: innings.clone(),
            overs: innings.overs_display(),
            run_rate: innings.run_rate(),
            required_run_rate,
            batsmen: card.batsmen().to_vec(),
            bowlers: card.bowlers().to_vec(),
            partnerships: card.partnerships().to_vec(),
            fall_of_wickets: card.fall_of_wickets().to_vec(),
            balls_recorded: self.events[idx].len(),
            digest: innings_digest_hex(innings, card, &self.events[idx]),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            fixture: self.fixture.clone(),
            innings: vec![
                self.innings_snapshot(InningsNumber::First),
                self.innings_snapshot(InningsNumber::Second),
            ],
            state: self.state.clone(),
        }
    }

    /// What the standings engine folds, once the match is completed.
    #[must_use]
    pub fn summary(&self) -> Option<MatchSummary> {
        let result = self.fixture.result.filter(|_| self.fixture.is_completed())?;
        let innings = self
            .innings
            .iter()
            .filter(|i| i.status != InningsStatus::NotStarted)
            .map(|i| InningsLine {
                batting_team: i.batting_team,
                bowling_team: i.bowling_team,
                runs: i.total_runs,
                wickets: i.total_wickets,
                legal_balls: i.legal_balls,
            })
            .collect();
        Some(MatchSummary {
            match_id: self.fixture.id,
            tournament_id: self.fixture.tournament_id,
            stage: self.fixture.stage,
            team_a: self.fixture.team_a,
            team_b: self.fixture.team_b,
            balls_quota: self.fixture.balls_quota(),
            result,
            innings,
        })
    }
}

/// Innings totals after `delta`, or an error if any would overflow.
///
/// Every scorecard entry is bounded by these totals, so checking them here
/// covers the ledgers as well.
fn advanced_totals(innings: &Innings, delta: &InningsDelta) -> Result<(u32, u32, u32, Extras)> {
    let overflow =
        || CrickscoreError::Internal(format!("totals of innings {} overflow", innings.id));
    Ok((
        innings.total_runs.checked_add(delta.runs).ok_or_else(overflow)?,
        innings.total_wickets.checked_add(delta.wickets).ok_or_else(overflow)?,
        innings.legal_balls.checked_add(delta.legal_balls).ok_or_else(overflow)?,
        innings.extras.checked_plus(delta.extras).ok_or_else(overflow)?,
    ))
}
