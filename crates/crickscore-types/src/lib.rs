//! # crickscore-types
//!
//! Shared types, errors, and configuration for the **Crickscore** engine.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`MatchId`], [`InningsId`], [`PlayerId`], [`TeamId`], [`TournamentId`], [`BallEventId`]
//! - **Match model**: [`Match`], [`MatchSetup`], [`MatchStatus`], [`MatchStage`], [`MatchResult`], [`Toss`], [`MatchSummary`]
//! - **Innings model**: [`Innings`], [`InningsStatus`], [`InningsEndReason`], [`Extras`]
//! - **Ball model**: [`BallInput`], [`BallEvent`], [`WicketType`], [`Dismissal`]
//! - **Scorecard ledgers**: [`BatsmanEntry`], [`BowlerEntry`], [`Partnership`], [`FallOfWicket`]
//! - **Rosters**: [`PlayingXi`]
//! - **Tournament model**: [`TeamStandingRecord`], [`PlayoffBracket`], [`PlayoffStage`]
//! - **Configuration**: [`ServiceConfig`], [`PointsConfig`]
//! - **Errors**: [`CrickscoreError`] with `CS_ERR_` prefix codes
//! - **Constants**: cricket and system-wide limits

pub mod ball;
pub mod config;
pub mod constants;
pub mod error;
pub mod fixture;
pub mod ids;
pub mod innings;
pub mod playoff;
pub mod roster;
pub mod scorecard;
pub mod standings;

// Re-export all primary types at crate root for ergonomic imports:
//   use crickscore_types::{Match, Innings, BallInput, ...};

pub use ball::*;
pub use config::*;
pub use error::*;
pub use fixture::*;
pub use ids::*;
pub use innings::*;
pub use playoff::*;
pub use roster::*;
pub use scorecard::*;
pub use standings::*;

// Constants are accessed via `crickscore_types::constants::FOO`
// (not re-exported to avoid name collisions).
