//! The live match-state cursor.
//!
//! Exactly one cursor exists per match. It tracks where the next delivery
//! comes from (over, ball, who is on strike, who is bowling) and carries the
//! two signals the scorer must act on before the next ball: a new batsman
//! after a wicket, and a new bowler after a completed over.

use std::collections::VecDeque;

use crickscore_types::{CrickscoreError, InningsId, MatchId, PlayerId, Result};
use serde::{Deserialize, Serialize};

/// Bounded trace of the marks of the current over (`0 1 4 W 1wd ...`).
///
/// Reset when the first delivery of a new over is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverTrace {
    over: u32,
    marks: VecDeque<String>,
    capacity: usize,
}

impl OverTrace {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            over: 0,
            marks: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record a delivery bowled during `over`.
    pub fn record(&mut self, over: u32, mark: String) {
        if over != self.over {
            self.marks.clear();
            self.over = over;
        }
        if self.marks.len() == self.capacity {
            self.marks.pop_front();
        }
        self.marks.push_back(mark);
    }

    pub fn clear(&mut self) {
        self.over = 0;
        self.marks.clear();
    }

    /// The over the marks belong to.
    #[must_use]
    pub fn over(&self) -> u32 {
        self.over
    }

    #[must_use]
    pub fn marks(&self) -> Vec<String> {
        self.marks.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// Per-match cursor: current innings, over/ball, crease and bowler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub match_id: MatchId,
    pub innings_id: Option<InningsId>,
    /// Completed overs in the current innings.
    pub over: u32,
    /// Legal balls bowled in the current over (0..=5).
    pub ball: u32,
    pub striker: Option<PlayerId>,
    pub non_striker: Option<PlayerId>,
    pub bowler: Option<PlayerId>,
    /// Bowler of the previous completed over. May not bowl the next one.
    pub last_bowler: Option<PlayerId>,
    pub need_new_batsman: bool,
    pub need_new_bowler: bool,
    pub over_trace: OverTrace,
}

impl MatchState {
    #[must_use]
    pub fn new(match_id: MatchId, trace_capacity: usize) -> Self {
        Self {
            match_id,
            innings_id: None,
            over: 0,
            ball: 0,
            striker: None,
            non_striker: None,
            bowler: None,
            last_bowler: None,
            need_new_batsman: false,
            need_new_bowler: false,
            over_trace: OverTrace::new(trace_capacity),
        }
    }

    /// Point the cursor at a fresh innings.
    pub fn begin_innings(
        &mut self,
        innings_id: InningsId,
        striker: PlayerId,
        non_striker: PlayerId,
        bowler: PlayerId,
    ) {
        self.innings_id = Some(innings_id);
        self.over = 0;
        self.ball = 0;
        self.striker = Some(striker);
        self.non_striker = Some(non_striker);
        self.bowler = Some(bowler);
        self.last_bowler = None;
        self.need_new_batsman = false;
        self.need_new_bowler = false;
        self.over_trace.clear();
    }

    pub fn swap_strike(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    /// Empty whichever crease slot `player` occupies.
    pub fn vacate(&mut self, player: PlayerId) {
        if self.striker == Some(player) {
            self.striker = None;
        } else if self.non_striker == Some(player) {
            self.non_striker = None;
        }
    }

    #[must_use]
    pub fn at_crease(&self, player: PlayerId) -> bool {
        self.striker == Some(player) || self.non_striker == Some(player)
    }

    /// Striker, non-striker and bowler, if the cursor is ready for a delivery.
    pub fn ready_for_delivery(&self) -> Result<(PlayerId, PlayerId, PlayerId)> {
        if self.need_new_batsman {
            return Err(CrickscoreError::CursorConflict {
                reason: "a new batsman must be set before the next ball".to_string(),
            });
        }
        if self.need_new_bowler {
            return Err(CrickscoreError::CursorConflict {
                reason: "a new bowler must be set before the next over".to_string(),
            });
        }
        match (self.striker, self.non_striker, self.bowler) {
            (Some(s), Some(n), Some(b)) => Ok((s, n, b)),
            _ => Err(CrickscoreError::CursorConflict {
                reason: "striker, non-striker and bowler must all be set".to_string(),
            }),
        }
    }
}
