//! Error types for the Crickscore engine.
//!
//! All errors use the `CS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by failure class:
//! - 1xx: Validation errors (rejected before any state mutation)
//! - 2xx: Not-found errors
//! - 3xx: State-conflict errors
//! - 4xx: Concurrency errors (retry the whole operation)
//! - 9xx: Fatal / internal errors

use thiserror::Error;

use crate::{
    InningsId, InningsStatus, MatchId, MatchStatus, PlayerId, PlayoffStage, TeamId, TournamentId,
};

/// Central error enum for all Crickscore operations.
#[derive(Debug, Error)]
pub enum CrickscoreError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// A ball event is missing fields or carries impossible values.
    #[error("CS_ERR_100: Invalid ball: {reason}")]
    InvalidBall { reason: String },

    /// Two extras flags that cannot be set together.
    #[error("CS_ERR_101: Conflicting extras: {reason}")]
    ConflictingExtras { reason: String },

    /// Dismissal metadata that cannot occur on this delivery.
    #[error("CS_ERR_102: Invalid dismissal: {reason}")]
    InvalidDismissal { reason: String },

    /// Match setup failed validation (overs, teams, toss).
    #[error("CS_ERR_103: Invalid match setup: {reason}")]
    InvalidSetup { reason: String },

    /// A playing XI failed validation.
    #[error("CS_ERR_104: Invalid roster: {reason}")]
    InvalidRoster { reason: String },

    /// A crease or bowling selection that can never be valid.
    #[error("CS_ERR_105: Invalid selection: {reason}")]
    InvalidSelection { reason: String },

    // =================================================================
    // Not-Found Errors (2xx)
    // =================================================================
    #[error("CS_ERR_200: Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("CS_ERR_201: Innings not found: {0}")]
    InningsNotFound(InningsId),

    #[error("CS_ERR_202: Player {player} not found in {context}")]
    PlayerNotFound { player: PlayerId, context: String },

    #[error("CS_ERR_203: Team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("CS_ERR_204: Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    /// No playoff fixture is bound to this match.
    #[error("CS_ERR_205: No playoff fixture for {0}")]
    FixtureNotFound(MatchId),

    // =================================================================
    // State-Conflict Errors (3xx)
    // =================================================================
    #[error("CS_ERR_300: Wrong match status: expected {expected}, got {actual}")]
    WrongMatchStatus {
        expected: MatchStatus,
        actual: MatchStatus,
    },

    #[error("CS_ERR_301: Innings {innings} is {actual}, expected {expected}")]
    WrongInningsStatus {
        innings: InningsId,
        expected: InningsStatus,
        actual: InningsStatus,
    },

    /// The match-state cursor does not allow this write (no striker set,
    /// bowler pending, scorer working from a stale cursor, ...).
    #[error("CS_ERR_302: Cursor conflict: {reason}")]
    CursorConflict { reason: String },

    #[error("CS_ERR_303: No ball to undo in {0}")]
    NoBallToUndo(InningsId),

    #[error("CS_ERR_304: Bowler {bowler} not allowed: {reason}")]
    BowlerNotAllowed { bowler: PlayerId, reason: String },

    /// A bracket slot was already written (re-seed guard).
    #[error("CS_ERR_305: Bracket slot already populated: {slot}")]
    BracketSlotOccupied { slot: String },

    #[error("CS_ERR_306: Playoff stage conflict: expected {expected}, got {actual}")]
    WrongPlayoffStage {
        expected: PlayoffStage,
        actual: PlayoffStage,
    },

    /// A standings or tournament write that the current phase forbids.
    #[error("CS_ERR_307: Tournament conflict: {reason}")]
    TournamentConflict { reason: String },

    // =================================================================
    // Concurrency Errors (4xx)
    // =================================================================
    /// The per-resource lock could not be acquired in time.
    #[error("CS_ERR_400: Lock timeout on {resource} after {waited_ms}ms")]
    LockTimeout { resource: String, waited_ms: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    #[error("CS_ERR_900: Internal error: {0}")]
    Internal(String),

    #[error("CS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    #[error("CS_ERR_902: Configuration error: {0}")]
    Configuration(String),

    #[error("CS_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Failure classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StateConflict,
    Concurrency,
    Fatal,
}

impl ErrorKind {
    /// Only concurrency failures are worth retrying unchanged.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        self == Self::Concurrency
    }
}

impl CrickscoreError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBall { .. }
            | Self::ConflictingExtras { .. }
            | Self::InvalidDismissal { .. }
            | Self::InvalidSetup { .. }
            | Self::InvalidRoster { .. }
            | Self::InvalidSelection { .. } => ErrorKind::Validation,
            Self::MatchNotFound(_)
            | Self::InningsNotFound(_)
            | Self::PlayerNotFound { .. }
            | Self::TeamNotFound(_)
            | Self::TournamentNotFound(_)
            | Self::FixtureNotFound(_) => ErrorKind::NotFound,
            Self::WrongMatchStatus { .. }
            | Self::WrongInningsStatus { .. }
            | Self::CursorConflict { .. }
            | Self::NoBallToUndo(_)
            | Self::BowlerNotAllowed { .. }
            | Self::BracketSlotOccupied { .. }
            | Self::WrongPlayoffStage { .. }
            | Self::TournamentConflict { .. } => ErrorKind::StateConflict,
            Self::LockTimeout { .. } => ErrorKind::Concurrency,
            Self::Internal(_) | Self::Serialization(_) | Self::Configuration(_) | Self::Io(_) => {
                ErrorKind::Fatal
            }
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, CrickscoreError>;

impl From<std::io::Error> for CrickscoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CrickscoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
