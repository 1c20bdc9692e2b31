//! Request and response types for the scoring operations.
//!
//! Transport-agnostic: every type is plain serde data, so an HTTP or queue
//! adapter only has to (de)serialize them.

use crickscore_engine::{BallOutcome, MatchState};
use crickscore_tournament::FoldOutcome;
use crickscore_types::{
    BallEvent, BallInput, FixtureKind, Innings, InningsEndReason, InningsId, MatchId, PlayerId,
    TeamId, TournamentId, WicketType,
};
use serde::{Deserialize, Serialize};

/// One delivery as the scorer enters it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBallRequest {
    pub innings_id: InningsId,
    pub match_id: MatchId,
    pub striker_id: PlayerId,
    pub non_striker_id: PlayerId,
    pub bowler_id: PlayerId,
    #[serde(default)]
    pub runs_scored: u32,
    #[serde(default)]
    pub is_wide: bool,
    #[serde(default)]
    pub is_noball: bool,
    #[serde(default)]
    pub is_bye: bool,
    #[serde(default)]
    pub is_legbye: bool,
    #[serde(default)]
    pub is_wicket: bool,
    #[serde(default)]
    pub wicket_type: Option<WicketType>,
    #[serde(default)]
    pub wicket_player_id: Option<PlayerId>,
    #[serde(default)]
    pub fielder_id: Option<PlayerId>,
    #[serde(default)]
    pub is_penalty: bool,
    #[serde(default)]
    pub penalty_runs: u32,
}

impl From<&RecordBallRequest> for BallInput {
    fn from(r: &RecordBallRequest) -> Self {
        BallInput {
            innings_id: r.innings_id,
            match_id: r.match_id,
            striker: r.striker_id,
            non_striker: r.non_striker_id,
            bowler: r.bowler_id,
            runs_scored: r.runs_scored,
            is_wide: r.is_wide,
            is_no_ball: r.is_noball,
            is_bye: r.is_bye,
            is_leg_bye: r.is_legbye,
            is_wicket: r.is_wicket,
            wicket_type: r.wicket_type,
            wicket_player: r.wicket_player_id,
            fielder: r.fielder_id,
            is_penalty: r.is_penalty,
            penalty_runs: r.penalty_runs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordBallResponse {
    pub ball_recorded: BallEvent,
    pub match_state: MatchState,
    pub innings: Innings,
    pub need_new_batsman: bool,
    pub need_new_bowler: bool,
    pub runs_this_ball: u32,
    pub is_legal_ball: bool,
    pub innings_ended: bool,
    pub innings_end_reason: Option<InningsEndReason>,
    pub match_completed: bool,
    pub winner_id: Option<TeamId>,
    pub win_margin: Option<String>,
}

impl From<BallOutcome> for RecordBallResponse {
    fn from(o: BallOutcome) -> Self {
        Self {
            ball_recorded: o.event,
            match_state: o.state,
            innings: o.innings,
            need_new_batsman: o.need_new_batsman,
            need_new_bowler: o.need_new_bowler,
            runs_this_ball: o.runs_this_ball,
            is_legal_ball: o.is_legal_ball,
            innings_ended: o.innings_ended,
            innings_end_reason: o.innings_end_reason,
            match_completed: o.match_completed,
            winner_id: o.winner,
            win_margin: o.win_margin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeInningsRequest {
    pub innings_id: InningsId,
    pub match_id: MatchId,
    pub striker_id: PlayerId,
    pub non_striker_id: PlayerId,
    pub bowler_id: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBatsmanRequest {
    pub innings_id: InningsId,
    pub player_id: PlayerId,
    pub is_striker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBowlerRequest {
    pub innings_id: InningsId,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleFixtureRequest {
    pub tournament_id: TournamentId,
    pub fixture: FixtureKind,
    pub match_id: MatchId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancePlayoffRequest {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub winner_id: TeamId,
}

/// `{success}` acknowledgement for operations with nothing else to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub const OK: Self = Self { success: true };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldResponse {
    pub success: bool,
    pub message: String,
    pub outcome: FoldOutcome,
}

impl From<FoldOutcome> for FoldResponse {
    fn from(outcome: FoldOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message().to_string(),
            outcome,
        }
    }
}
