//! System-wide constants for the Crickscore engine.

/// Legal deliveries in one over.
pub const BALLS_PER_OVER: u32 = 6;

/// Wickets that end an innings with a full playing XI.
pub const MAX_WICKETS: u32 = 10;

/// Largest playing XI.
pub const MAX_PLAYING_XI: usize = 11;

/// Smallest playing XI that can form a partnership.
pub const MIN_PLAYING_XI: usize = 2;

/// Most runs that can be run or struck off a single delivery.
pub const MAX_RUNS_PER_BALL: u32 = 7;

/// Most penalty runs a single award can add.
pub const MAX_PENALTY_RUNS: u32 = 5;

/// Most overs per side (one-day cricket).
pub const MAX_OVERS: u32 = 50;

/// Default overs per side (T20).
pub const DEFAULT_TOTAL_OVERS: u32 = 20;

/// A bowler may bowl at most `ceil(total_overs / BOWLER_QUOTA_DIVISOR)` overs.
pub const BOWLER_QUOTA_DIVISOR: u32 = 5;

/// Ball marks retained in the current-over trace.
pub const DEFAULT_OVER_TRACE_CAPACITY: usize = 16;

/// League points for a win.
pub const POINTS_WIN: u32 = 2;

/// League points for a tie.
pub const POINTS_TIE: u32 = 1;

/// League points for a no-result.
pub const POINTS_NO_RESULT: u32 = 1;

/// League points for a loss.
pub const POINTS_LOSS: u32 = 0;

/// Teams that qualify for the playoff bracket.
pub const PLAYOFF_TEAMS: usize = 4;

/// Decimal places for strike rate, economy and run rates.
pub const RATE_DISPLAY_DP: u32 = 2;

/// Decimal places for net run rate.
pub const NRR_DISPLAY_DP: u32 = 3;

/// Default bound on waiting for a per-match write lock.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 250;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Crickscore";
