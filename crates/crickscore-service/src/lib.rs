//! # crickscore-service
//!
//! **Concurrency envelope** around the scoring engine and tournaments.
//!
//! Every match is single-writer: ball events, undo and innings setup run
//! under that match's mutex with a bounded wait, so two scorers can never
//! interleave a read-modify-write of the same cursor. Scoreboard reads get
//! the last committed [`MatchSnapshot`](crickscore_engine::MatchSnapshot)
//! without waiting on writers.
//!
//! The operation contracts live in [`api`] as plain serde types.

pub mod api;
pub mod service;

pub use api::{
    Ack, AdvancePlayoffRequest, FoldResponse, InitializeInningsRequest, RecordBallRequest,
    RecordBallResponse, ScheduleFixtureRequest, SetBatsmanRequest, SetBowlerRequest,
};
pub use service::ScoringService;
