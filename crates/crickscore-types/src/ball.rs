//! Ball (delivery) types.
//!
//! A [`BallInput`] is what a scorer submits. The Ball Event Processor
//! validates it and derives an immutable [`BallEvent`]: legality, extras,
//! boundaries and total runs. Events are append-only; the only way to remove
//! one is an explicit undo of the most recent delivery.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BallEventId, InningsId, MatchId, PlayerId};

/// How a batsman was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WicketType {
    Bowled,
    Caught,
    Lbw,
    RunOut,
    Stumped,
    HitWicket,
    ObstructingTheField,
}

impl WicketType {
    /// Whether the bowler's wicket tally includes this dismissal.
    #[must_use]
    pub fn credited_to_bowler(self) -> bool {
        !matches!(self, Self::RunOut | Self::ObstructingTheField)
    }

    #[must_use]
    pub fn allowed_on_wide(self) -> bool {
        matches!(
            self,
            Self::Stumped | Self::RunOut | Self::HitWicket | Self::ObstructingTheField
        )
    }

    #[must_use]
    pub fn allowed_on_no_ball(self) -> bool {
        matches!(self, Self::RunOut | Self::ObstructingTheField)
    }

    #[must_use]
    pub fn can_dismiss_non_striker(self) -> bool {
        matches!(self, Self::RunOut | Self::ObstructingTheField)
    }
}

impl fmt::Display for WicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bowled => write!(f, "bowled"),
            Self::Caught => write!(f, "caught"),
            Self::Lbw => write!(f, "lbw"),
            Self::RunOut => write!(f, "run out"),
            Self::Stumped => write!(f, "stumped"),
            Self::HitWicket => write!(f, "hit wicket"),
            Self::ObstructingTheField => write!(f, "obstructing the field"),
        }
    }
}

/// Dismissal metadata stored on the ball and on the batsman's entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dismissal {
    pub kind: WicketType,
    pub player_out: PlayerId,
    pub bowler: PlayerId,
    pub fielder: Option<PlayerId>,
}

/// A scoring event as submitted by a scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallInput {
    pub innings_id: InningsId,
    pub match_id: MatchId,
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
    /// Runs struck or run. On a wide these are byes run and count as wides.
    pub runs_scored: u32,
    pub is_wide: bool,
    pub is_no_ball: bool,
    pub is_bye: bool,
    pub is_leg_bye: bool,
    pub is_wicket: bool,
    pub wicket_type: Option<WicketType>,
    /// Defaults to the striker when absent.
    pub wicket_player: Option<PlayerId>,
    pub fielder: Option<PlayerId>,
    pub is_penalty: bool,
    pub penalty_runs: u32,
}

impl BallInput {
    /// A dot ball from `bowler` to `striker`.
    #[must_use]
    pub fn new(
        innings_id: InningsId,
        match_id: MatchId,
        striker: PlayerId,
        non_striker: PlayerId,
        bowler: PlayerId,
    ) -> Self {
        Self {
            innings_id,
            match_id,
            striker,
            non_striker,
            bowler,
            runs_scored: 0,
            is_wide: false,
            is_no_ball: false,
            is_bye: false,
            is_leg_bye: false,
            is_wicket: false,
            wicket_type: None,
            wicket_player: None,
            fielder: None,
            is_penalty: false,
            penalty_runs: 0,
        }
    }

    #[must_use]
    pub fn runs(mut self, runs: u32) -> Self {
        self.runs_scored = runs;
        self
    }

    #[must_use]
    pub fn wide(mut self) -> Self {
        self.is_wide = true;
        self
    }

    #[must_use]
    pub fn no_ball(mut self) -> Self {
        self.is_no_ball = true;
        self
    }

    #[must_use]
    pub fn bye(mut self) -> Self {
        self.is_bye = true;
        self
    }

    #[must_use]
    pub fn leg_bye(mut self) -> Self {
        self.is_leg_bye = true;
        self
    }

    #[must_use]
    pub fn wicket(mut self, kind: WicketType, player_out: Option<PlayerId>) -> Self {
        self.is_wicket = true;
        self.wicket_type = Some(kind);
        self.wicket_player = player_out;
        self
    }

    #[must_use]
    pub fn fielder(mut self, fielder: PlayerId) -> Self {
        self.fielder = Some(fielder);
        self
    }

    #[must_use]
    pub fn penalty(mut self, runs: u32) -> Self {
        self.is_penalty = true;
        self.penalty_runs = runs;
        self
    }

    /// The player dismissed, if this is a wicket ball.
    #[must_use]
    pub fn dismissed_player(&self) -> Option<PlayerId> {
        self.is_wicket
            .then(|| self.wicket_player.unwrap_or(self.striker))
    }
}

/// Immutable record of one delivery, with all derived facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallEvent {
    pub id: BallEventId,
    pub innings_id: InningsId,
    pub match_id: MatchId,
    /// Position in the innings' event log, from 0.
    pub sequence: u32,
    /// Completed overs when the ball was bowled.
    pub over: u32,
    /// Legal balls already bowled in this over (0..=5).
    pub ball_in_over: u32,
    pub striker: PlayerId,
    pub non_striker: PlayerId,
    pub bowler: PlayerId,
    pub runs_scored: u32,
    pub is_wide: bool,
    pub is_no_ball: bool,
    pub is_bye: bool,
    pub is_leg_bye: bool,
    pub is_penalty: bool,
    pub penalty_runs: u32,
    pub is_wicket: bool,
    pub dismissal: Option<Dismissal>,
    pub is_legal_ball: bool,
    pub is_boundary_four: bool,
    pub is_boundary_six: bool,
    pub extra_runs: u32,
    pub total_runs: u32,
    pub recorded_at: DateTime<Utc>,
}

impl BallEvent {
    /// Short mark for the over trace: `0`, `4`, `W`, `1wd`, `2nb`, `1lb`, `+5p` ...
    #[must_use]
    pub fn mark(&self) -> String {
        let mut mark = if self.is_wide {
            format!("{}wd", self.extra_runs)
        } else if self.is_no_ball {
            let off_bat = if self.is_bye || self.is_leg_bye { 0 } else { self.runs_scored };
            let byes = self.runs_scored - off_bat;
            let mut m = format!("{off_bat}nb");
            if byes > 0 {
                m.push_str(&format!("+{byes}{}", if self.is_bye { "b" } else { "lb" }));
            }
            m
        } else if self.is_bye {
            format!("{}b", self.runs_scored)
        } else if self.is_leg_bye {
            format!("{}lb", self.runs_scored)
        } else {
            self.runs_scored.to_string()
        };
        if self.is_wicket {
            if mark == "0" {
                mark = "W".to_string();
            } else {
                mark.push('W');
            }
        }
        if self.is_penalty {
            mark.push_str(&format!("+{}p", self.penalty_runs));
        }
        mark
    }
}
