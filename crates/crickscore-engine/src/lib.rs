//! # crickscore-engine
//!
//! **Deterministic ball-by-ball scoring engine for Crickscore.**
//!
//! The engine is the per-match compute plane. It turns scoring events into
//! a consistent match state:
//!
//! - **Pure derivation**: [`processor::process`] computes every ledger delta
//!   of a delivery without touching state
//! - **All-or-nothing commits**: [`MatchEngine`] checks every precondition
//!   before it applies a delta
//! - **Exact undo**: the applied delta is journaled and subtracted, never
//!   re-derived
//! - **Deterministic digests**: same deliveries, same ledgers, same hash

pub mod determinism;
pub mod engine;
pub mod lifecycle;
pub mod processor;
pub mod scorecard;
pub mod snapshot;
pub mod state;

pub use determinism::{compute_innings_digest, innings_digest_hex};
pub use engine::{BallOutcome, MatchEngine};
pub use processor::BallDelta;
pub use scorecard::Scorecard;
pub use snapshot::{InningsSnapshot, MatchSnapshot};
pub use state::{MatchState, OverTrace};
