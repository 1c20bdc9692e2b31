//! # crickscore-tournament
//!
//! **Finality Plane**: league standings, net run rate, and the playoff
//! bracket.
//!
//! ## Architecture
//!
//! The finality plane receives a [`MatchSummary`](crickscore_types::MatchSummary)
//! from the scoring engine once a match completes and:
//! 1. Checks idempotency (a match id is folded at most once)
//! 2. Credits runs and NRR balls to both sides, applying the overs-quota rule
//! 3. Awards points for the result
//! 4. Recomputes every NRR from cumulative totals and re-ranks the table
//!
//! When league play closes, the top four seed the [`PlayoffController`],
//! which then routes knockout winners through to a champion.

pub mod fold_ledger;
pub mod nrr;
pub mod playoff;
pub mod standings;
pub mod tournament;

pub use fold_ledger::FoldLedger;
pub use nrr::{net_run_rate, nrr_balls};
pub use playoff::PlayoffController;
pub use standings::{FoldOutcome, StandingsSnapshot, StandingsTable, standings_root};
pub use tournament::{LeaguePhase, Tournament};
