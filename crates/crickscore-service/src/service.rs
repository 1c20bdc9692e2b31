//! The scoring service: one writer per match, lock-free reads.
//!
//! ## Locking
//!
//! - Each match has its own write mutex around its [`MatchEngine`]. Writers
//!   wait at most `lock_timeout_ms`; past that the call fails with
//!   `LockTimeout` and nothing is applied.
//! - Each committed write republishes an `Arc<MatchSnapshot>`. Readers clone
//!   the `Arc` and never touch the write mutex.
//! - Standings folds and playoff advances take the match lock first, then
//!   the tournament lock. No path takes them in the other order.

use std::collections::HashMap;
use std::sync::Arc;

use crickscore_engine::{MatchEngine, MatchSnapshot};
use crickscore_tournament::{StandingsSnapshot, Tournament};
use crickscore_types::{
    BallInput, CrickscoreError, InningsId, InningsNumber, MatchId, MatchResult, MatchSetup,
    MatchStatus, PlayoffBracket, PlayingXi, Result, ServiceConfig, TeamId, TeamStandingRecord,
    TournamentId,
};
use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::api::{
    Ack, AdvancePlayoffRequest, FoldResponse, InitializeInningsRequest, RecordBallRequest,
    RecordBallResponse, ScheduleFixtureRequest, SetBatsmanRequest, SetBowlerRequest,
};

/// One registered match.
struct MatchSlot {
    engine: Mutex<MatchEngine>,
    published: RwLock<Arc<MatchSnapshot>>,
}

impl MatchSlot {
    fn new(engine: MatchEngine) -> Self {
        let snapshot = Arc::new(engine.snapshot());
        Self {
            engine: Mutex::new(engine),
            published: RwLock::new(snapshot),
        }
    }

    fn publish(&self, engine: &MatchEngine) {
        *self.published.write() = Arc::new(engine.snapshot());
    }
}

pub struct ScoringService {
    config: ServiceConfig,
    matches: RwLock<HashMap<MatchId, Arc<MatchSlot>>>,
    innings_index: RwLock<HashMap<InningsId, MatchId>>,
    tournaments: RwLock<HashMap<TournamentId, Arc<Mutex<Tournament>>>>,
}

impl ScoringService {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            matches: RwLock::new(HashMap::new()),
            innings_index: RwLock::new(HashMap::new()),
            tournaments: RwLock::new(HashMap::new()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ── Lookup and locking ──────────────────────────────────────────────

    fn slot(&self, match_id: MatchId) -> Result<Arc<MatchSlot>> {
        self.matches
            .read()
            .get(&match_id)
            .cloned()
            .ok_or(CrickscoreError::MatchNotFound(match_id))
    }

    fn match_for_innings(&self, innings_id: InningsId) -> Result<MatchId> {
        self.innings_index
            .read()
            .get(&innings_id)
            .copied()
            .ok_or(CrickscoreError::InningsNotFound(innings_id))
    }

    fn tournament(&self, tournament_id: TournamentId) -> Result<Arc<Mutex<Tournament>>> {
        self.tournaments
            .read()
            .get(&tournament_id)
            .cloned()
            .ok_or(CrickscoreError::TournamentNotFound(tournament_id))
    }

    fn acquire<'a, T>(
        &self,
        lock: &'a Mutex<T>,
        resource: impl FnOnce() -> String,
    ) -> Result<MutexGuard<'a, T>> {
        let timeout = self.config.lock_timeout();
        lock.try_lock_for(timeout).ok_or_else(|| {
            let resource = resource();
            tracing::warn!(
                resource = %resource,
                waited_ms = self.config.lock_timeout_ms,
                "lock wait timed out"
            );
            CrickscoreError::LockTimeout {
                resource,
                waited_ms: self.config.lock_timeout_ms,
            }
        })
    }

    /// Run `op` under the match's write lock and republish on success.
    fn write<T>(
        &self,
        match_id: MatchId,
        op: impl FnOnce(&mut MatchEngine) -> Result<T>,
    ) -> Result<T> {
        let slot = self.slot(match_id)?;
        let mut engine = self.acquire(&slot.engine, || format!("match {match_id}"))?;
        let out = op(&mut engine)?;
        slot.publish(&engine);
        Ok(out)
    }

    // ── Registration ────────────────────────────────────────────────────

    pub fn create_tournament(
        &self,
        tournament_id: TournamentId,
        name: impl Into<String>,
    ) -> Result<()> {
        let mut tournaments = self.tournaments.write();
        if tournaments.contains_key(&tournament_id) {
            return Err(CrickscoreError::TournamentConflict {
                reason: format!("tournament {tournament_id} already exists"),
            });
        }
        let tournament = Tournament::new(tournament_id, name, self.config.points);
        tournaments.insert(tournament_id, Arc::new(Mutex::new(tournament)));
        tracing::info!(tournament_id = %tournament_id, "tournament created");
        Ok(())
    }

    pub fn register_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
        name: impl Into<String>,
    ) -> Result<()> {
        let tournament = self.tournament(tournament_id)?;
        let mut t = self.acquire(&tournament, || format!("tournament {tournament_id}"))?;
        t.register_team(team_id, name)
    }

    /// Register a match with both playing XIs. A tournament match's teams
    /// must already be registered with that tournament.
    pub fn create_match(
        &self,
        setup: &MatchSetup,
        xi_a: PlayingXi,
        xi_b: PlayingXi,
    ) -> Result<Arc<MatchSnapshot>> {
        if let Some(tournament_id) = setup.tournament_id {
            let tournament = self.tournament(tournament_id)?;
            let t = self.acquire(&tournament, || format!("tournament {tournament_id}"))?;
            for team in [setup.team_a, setup.team_b] {
                if !t.is_registered(team) {
                    return Err(CrickscoreError::TeamNotFound(team));
                }
            }
        }
        let engine = MatchEngine::new(setup, xi_a, xi_b)?
            .with_trace_capacity(self.config.over_trace_capacity);
        let innings_ids = [
            engine.innings_by_number(InningsNumber::First).id,
            engine.innings_by_number(InningsNumber::Second).id,
        ];
        let slot = Arc::new(MatchSlot::new(engine));
        let snapshot = Arc::clone(&*slot.published.read());

        let mut matches = self.matches.write();
        if matches.contains_key(&setup.id) {
            return Err(CrickscoreError::InvalidSetup {
                reason: format!("match {} already exists", setup.id),
            });
        }
        matches.insert(setup.id, slot);
        let mut index = self.innings_index.write();
        for id in innings_ids {
            index.insert(id, setup.id);
        }
        tracing::info!(match_id = %setup.id, overs = setup.total_overs, "match registered");
        Ok(snapshot)
    }

    // ── Scoring operations ──────────────────────────────────────────────

    pub fn record_ball(&self, request: &RecordBallRequest) -> Result<RecordBallResponse> {
        let input = BallInput::from(request);
        self.write(request.match_id, |engine| engine.record_ball(&input))
            .map(RecordBallResponse::from)
    }

    /// Undo the last ball of an innings.
    ///
    /// A match its tournament has folded, or used to decide a playoff
    /// fixture, is settled and cannot be reopened.
    pub fn undo_last_ball(&self, innings_id: InningsId) -> Result<Ack> {
        let match_id = self.match_for_innings(innings_id)?;
        let slot = self.slot(match_id)?;
        let mut engine = self.acquire(&slot.engine, || format!("match {match_id}"))?;
        if let Some(tournament_id) = engine.fixture().tournament_id {
            let tournament = self.tournament(tournament_id)?;
            let t = self.acquire(&tournament, || format!("tournament {tournament_id}"))?;
            if t.has_settled(match_id) {
                tracing::warn!(
                    match_id = %match_id,
                    tournament_id = %tournament_id,
                    "rejected undo of settled match"
                );
                return Err(CrickscoreError::TournamentConflict {
                    reason: format!("match {match_id} is settled in tournament {tournament_id}"),
                });
            }
        }
        engine.undo_last_ball(innings_id)?;
        slot.publish(&engine);
        Ok(Ack::OK)
    }

    pub fn initialize_innings(&self, r: &InitializeInningsRequest) -> Result<Ack> {
        self.write(r.match_id, |engine| {
            engine.initialize_innings(
                r.innings_id,
                r.match_id,
                r.striker_id,
                r.non_striker_id,
                r.bowler_id,
            )
        })?;
        Ok(Ack::OK)
    }

    pub fn set_batsman(&self, r: &SetBatsmanRequest) -> Result<Ack> {
        let match_id = self.match_for_innings(r.innings_id)?;
        self.write(match_id, |engine| {
            engine.set_batsman(r.innings_id, r.player_id, r.is_striker)
        })?;
        Ok(Ack::OK)
    }

    pub fn set_bowler(&self, r: &SetBowlerRequest) -> Result<Ack> {
        let match_id = self.match_for_innings(r.innings_id)?;
        self.write(match_id, |engine| engine.set_bowler(r.innings_id, r.player_id))?;
        Ok(Ack::OK)
    }

    /// Complete an unfinished match as a no-result.
    pub fn abandon_match(&self, match_id: MatchId) -> Result<MatchResult> {
        self.write(match_id, MatchEngine::abandon)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// The last committed snapshot. Never waits on a writer.
    pub fn snapshot(&self, match_id: MatchId) -> Result<Arc<MatchSnapshot>> {
        let slot = self.slot(match_id)?;
        let snapshot = Arc::clone(&*slot.published.read());
        Ok(snapshot)
    }

    pub fn get_standings(&self, tournament_id: TournamentId) -> Result<Vec<TeamStandingRecord>> {
        let tournament = self.tournament(tournament_id)?;
        let t = self.acquire(&tournament, || format!("tournament {tournament_id}"))?;
        Ok(t.standings())
    }

    pub fn standings_snapshot(&self, tournament_id: TournamentId) -> Result<StandingsSnapshot> {
        let tournament = self.tournament(tournament_id)?;
        let t = self.acquire(&tournament, || format!("tournament {tournament_id}"))?;
        Ok(t.standings_snapshot())
    }

    pub fn bracket(&self, tournament_id: TournamentId) -> Result<PlayoffBracket> {
        let tournament = self.tournament(tournament_id)?;
        let t = self.acquire(&tournament, || format!("tournament {tournament_id}"))?;
        Ok(t.bracket().clone())
    }

    // ── Tournament operations ───────────────────────────────────────────

    /// Fold a completed match into its tournament's table. Idempotent.
    pub fn fold_match_into_standings(&self, match_id: MatchId) -> Result<FoldResponse> {
        let slot = self.slot(match_id)?;
        let engine = self.acquire(&slot.engine, || format!("match {match_id}"))?;
        let fixture = engine.fixture();
        if !fixture.is_completed() {
            return Err(CrickscoreError::WrongMatchStatus {
                expected: MatchStatus::Completed,
                actual: fixture.status,
            });
        }
        let tournament_id =
            fixture.tournament_id.ok_or_else(|| CrickscoreError::TournamentConflict {
                reason: format!("match {match_id} is not part of a tournament"),
            })?;
        let summary = engine.summary().ok_or_else(|| {
            CrickscoreError::Internal(format!("completed match {match_id} has no result"))
        })?;

        let tournament = self.tournament(tournament_id)?;
        let mut t = self.acquire(&tournament, || format!("tournament {tournament_id}"))?;
        let outcome = t.fold_match(&summary)?;
        Ok(FoldResponse::from(outcome))
    }

    pub fn close_league(&self, tournament_id: TournamentId) -> Result<Vec<TeamId>> {
        let tournament = self.tournament(tournament_id)?;
        let mut t = self.acquire(&tournament, || format!("tournament {tournament_id}"))?;
        t.close_league()
    }

    pub fn schedule_playoff_fixture(&self, r: &ScheduleFixtureRequest) -> Result<Ack> {
        let tournament = self.tournament(r.tournament_id)?;
        let mut t = self.acquire(&tournament, || format!("tournament {}", r.tournament_id))?;
        t.schedule_fixture(r.fixture, r.match_id)?;
        Ok(Ack::OK)
    }

    /// Route a knockout result through the bracket.
    ///
    /// When the match was scored on this service, the claimed winner must
    /// agree with the completed match; a tied knockout accepts either team.
    pub fn advance_playoff_stage(&self, r: &AdvancePlayoffRequest) -> Result<PlayoffBracket> {
        let slot = self.matches.read().get(&r.match_id).cloned();
        let guard = match &slot {
            Some(slot) => Some(self.acquire(&slot.engine, || format!("match {}", r.match_id))?),
            None => None,
        };
        if let Some(engine) = &guard {
            check_knockout_winner(engine, r.winner_id)?;
        }

        let tournament = self.tournament(r.tournament_id)?;
        let mut t = self.acquire(&tournament, || format!("tournament {}", r.tournament_id))?;
        let bracket = t.advance_playoff(r.match_id, r.winner_id)?.clone();
        Ok(bracket)
    }
}

fn check_knockout_winner(engine: &MatchEngine, winner: TeamId) -> Result<()> {
    let fixture = engine.fixture();
    if !fixture.is_completed() {
        return Err(CrickscoreError::WrongMatchStatus {
            expected: MatchStatus::Completed,
            actual: fixture.status,
        });
    }
    if !fixture.involves(winner) {
        return Err(CrickscoreError::InvalidSelection {
            reason: format!("team {winner} did not play match {}", fixture.id),
        });
    }
    match fixture.winner {
        Some(actual) if actual != winner => Err(CrickscoreError::InvalidSelection {
            reason: format!("match {} was won by {actual}, not {winner}", fixture.id),
        }),
        _ => Ok(()),
    }
}
