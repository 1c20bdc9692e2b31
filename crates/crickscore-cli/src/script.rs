//! Scoring scripts: teams, matches and the operations applied to them,
//! replayed against a fresh [`ScoringService`].
//!
//! Everything in a script is named by a short key (`"csk"`, `"gaikwad"`,
//! `"m1"`). The replay assigns fresh identifiers and reports the mapping.
//!
//! ```json
//! {
//!   "tournament": { "name": "Premier League" },
//!   "teams": [
//!     { "key": "csk", "name": "Chennai", "players": ["gaikwad", "conway", "dube"] },
//!     { "key": "mi", "name": "Mumbai", "players": ["rohit", "kishan", "bumrah"] }
//!   ],
//!   "matches": [{ "key": "m1", "home": "csk", "away": "mi", "overs": 20 }],
//!   "steps": [
//!     { "op": "open", "match": "m1", "innings": 1,
//!       "striker": "gaikwad", "non_striker": "conway", "bowler": "bumrah" },
//!     { "op": "ball", "match": "m1", "runs": 4 },
//!     { "op": "ball", "match": "m1", "wicket": { "type": "Bowled" } },
//!     { "op": "batsman", "match": "m1", "player": "dube" },
//!     { "op": "fold", "match": "m1" }
//!   ]
//! }
//! ```
//!
//! A ball step takes striker, non-striker and bowler from the published
//! cursor unless it names them.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use crickscore_engine::MatchSnapshot;
use crickscore_service::{
    AdvancePlayoffRequest, InitializeInningsRequest, RecordBallRequest, ScheduleFixtureRequest,
    ScoringService, SetBatsmanRequest, SetBowlerRequest,
};
use crickscore_tournament::StandingsSnapshot;
use crickscore_types::{
    CrickscoreError, FixtureKind, InningsId, InningsNumber, MatchId, MatchSetup, MatchStage,
    PlayerId, PlayingXi, PlayoffBracket, ServiceConfig, TeamId, Toss, TossDecision, TournamentId,
    WicketType, constants,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub tournament: Option<TournamentSpec>,
    pub teams: Vec<TeamSpec>,
    pub matches: Vec<MatchSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TournamentSpec {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeamSpec {
    pub key: String,
    pub name: String,
    /// Batting order.
    pub players: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchSpec {
    pub key: String,
    /// Bats first unless a toss says otherwise.
    pub home: String,
    pub away: String,
    #[serde(default = "default_overs")]
    pub overs: u32,
    #[serde(default)]
    pub max_overs_per_bowler: Option<u32>,
    #[serde(default = "default_stage")]
    pub stage: MatchStage,
    #[serde(default)]
    pub toss: Option<TossSpec>,
    #[serde(default)]
    pub venue: String,
}

fn default_overs() -> u32 {
    constants::DEFAULT_TOTAL_OVERS
}

fn default_stage() -> MatchStage {
    MatchStage::League
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TossSpec {
    pub winner: String,
    pub decision: TossDecision,
}

/// One scripted operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Start innings 1 or 2 with the opening pair and bowler.
    Open {
        #[serde(rename = "match")]
        match_key: String,
        innings: u8,
        striker: String,
        non_striker: String,
        bowler: String,
    },
    Ball(BallStep),
    /// Send in a batsman. Without `striker` the empty end is filled.
    Batsman {
        #[serde(rename = "match")]
        match_key: String,
        player: String,
        striker: Option<bool>,
    },
    Bowler {
        #[serde(rename = "match")]
        match_key: String,
        player: String,
    },
    /// Undo the last ball of the given innings, or of the current one.
    Undo {
        #[serde(rename = "match")]
        match_key: String,
        innings: Option<u8>,
    },
    Abandon {
        #[serde(rename = "match")]
        match_key: String,
    },
    Fold {
        #[serde(rename = "match")]
        match_key: String,
    },
    CloseLeague,
    Schedule {
        fixture: FixtureKind,
        #[serde(rename = "match")]
        match_key: String,
    },
    Advance {
        #[serde(rename = "match")]
        match_key: String,
        winner: String,
    },
}

impl Step {
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Ball(_) => "ball",
            Self::Batsman { .. } => "batsman",
            Self::Bowler { .. } => "bowler",
            Self::Undo { .. } => "undo",
            Self::Abandon { .. } => "abandon",
            Self::Fold { .. } => "fold",
            Self::CloseLeague => "close_league",
            Self::Schedule { .. } => "schedule",
            Self::Advance { .. } => "advance",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BallStep {
    #[serde(rename = "match")]
    pub match_key: String,
    #[serde(default)]
    pub runs: u32,
    #[serde(default)]
    pub wide: bool,
    #[serde(default)]
    pub noball: bool,
    #[serde(default)]
    pub bye: bool,
    #[serde(default)]
    pub legbye: bool,
    pub wicket: Option<WicketSpec>,
    #[serde(default)]
    pub penalty: u32,
    pub striker: Option<String>,
    pub non_striker: Option<String>,
    pub bowler: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WicketSpec {
    #[serde(rename = "type")]
    pub kind: WicketType,
    /// Defaults to the striker.
    pub player: Option<String>,
    pub fielder: Option<String>,
}

/// A step the service refused while replaying with `--keep-going`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub step: usize,
    pub op: &'static str,
    pub error: String,
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub teams: BTreeMap<String, TeamId>,
    pub players: BTreeMap<String, PlayerId>,
    pub matches: BTreeMap<String, MatchSnapshot>,
    pub standings: Option<StandingsSnapshot>,
    pub bracket: Option<PlayoffBracket>,
    pub rejected: Vec<Rejection>,
}

/// A script's teams and matches registered on a scoring service.
pub struct Replay {
    service: ScoringService,
    tournament_id: Option<TournamentId>,
    teams: BTreeMap<String, TeamId>,
    players: BTreeMap<String, PlayerId>,
    matches: BTreeMap<String, MatchId>,
}

impl Replay {
    /// Register the script's tournament, teams and matches.
    pub fn new(script: &Script, config: ServiceConfig) -> Result<Self> {
        let mut replay = Self {
            service: ScoringService::new(config)?,
            tournament_id: None,
            teams: BTreeMap::new(),
            players: BTreeMap::new(),
            matches: BTreeMap::new(),
        };

        let mut rosters = BTreeMap::new();
        for team in &script.teams {
            let team_id = TeamId::new();
            if replay.teams.insert(team.key.clone(), team_id).is_some() {
                bail!("team key {:?} used twice", team.key);
            }
            let mut ids = Vec::with_capacity(team.players.len());
            for key in &team.players {
                let player_id = PlayerId::new();
                if replay.players.insert(key.clone(), player_id).is_some() {
                    bail!("player key {key:?} used twice");
                }
                ids.push(player_id);
            }
            let xi = PlayingXi::new(team_id, ids).with_context(|| format!("team {:?}", team.key))?;
            rosters.insert(team.key.clone(), xi);
        }

        if let Some(spec) = &script.tournament {
            let tournament_id = TournamentId::new();
            replay.service.create_tournament(tournament_id, spec.name.clone())?;
            for team in &script.teams {
                let team_id = replay.team(&team.key)?;
                replay.service.register_team(tournament_id, team_id, team.name.clone())?;
            }
            replay.tournament_id = Some(tournament_id);
        }

        for spec in &script.matches {
            if replay.matches.contains_key(&spec.key) {
                bail!("match key {:?} used twice", spec.key);
            }
            let xi = |key: &str| {
                rosters.get(key).cloned().ok_or_else(|| anyhow!("unknown team {key:?}"))
            };
            let (home, away) = (xi(&spec.home)?, xi(&spec.away)?);
            let toss = match &spec.toss {
                Some(t) => Some(Toss {
                    winner: replay.team(&t.winner)?,
                    decision: t.decision,
                }),
                None => None,
            };
            let setup = MatchSetup {
                id: MatchId::new(),
                tournament_id: replay.tournament_id,
                stage: spec.stage,
                team_a: home.team_id,
                team_b: away.team_id,
                total_overs: spec.overs,
                max_overs_per_bowler: spec.max_overs_per_bowler,
                toss,
                venue: spec.venue.clone(),
            };
            replay
                .service
                .create_match(&setup, home, away)
                .with_context(|| format!("match {:?}", spec.key))?;
            replay.matches.insert(spec.key.clone(), setup.id);
        }
        Ok(replay)
    }

    #[must_use]
    pub fn service(&self) -> &ScoringService {
        &self.service
    }

    /// Apply every step in order.
    ///
    /// A step the service refuses stops the replay, unless `keep_going` is
    /// set, in which case it is recorded in the report and skipped. Script
    /// mistakes (unknown keys, missing players) always stop the replay.
    pub fn run(self, steps: &[Step], keep_going: bool) -> Result<Report> {
        let mut rejected = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            let number = index + 1;
            let Err(err) = self.apply(step) else {
                continue;
            };
            if keep_going && err.downcast_ref::<CrickscoreError>().is_some() {
                tracing::warn!(step = number, op = step.op(), error = %err, "step rejected");
                rejected.push(Rejection {
                    step: number,
                    op: step.op(),
                    error: err.to_string(),
                });
            } else {
                return Err(err.context(format!("step {number} ({})", step.op())));
            }
        }
        self.report(rejected)
    }

    pub fn apply(&self, step: &Step) -> Result<()> {
        match step {
            Step::Open {
                match_key,
                innings,
                striker,
                non_striker,
                bowler,
            } => {
                let match_id = self.match_id(match_key)?;
                self.service.initialize_innings(&InitializeInningsRequest {
                    innings_id: self.innings_id(match_id, *innings)?,
                    match_id,
                    striker_id: self.player(striker)?,
                    non_striker_id: self.player(non_striker)?,
                    bowler_id: self.player(bowler)?,
                })?;
            }
            Step::Ball(ball) => {
                let request = self.ball_request(ball)?;
                let response = self.service.record_ball(&request)?;
                if response.match_completed {
                    tracing::info!(
                        match_key = %ball.match_key,
                        margin = response.win_margin.as_deref().unwrap_or("tie"),
                        "match completed"
                    );
                }
            }
            Step::Batsman {
                match_key,
                player,
                striker,
            } => {
                let (snap, innings_id) = self.cursor(match_key)?;
                self.service.set_batsman(&SetBatsmanRequest {
                    innings_id,
                    player_id: self.player(player)?,
                    is_striker: striker.unwrap_or(snap.state.striker.is_none()),
                })?;
            }
            Step::Bowler { match_key, player } => {
                let (_, innings_id) = self.cursor(match_key)?;
                self.service.set_bowler(&SetBowlerRequest {
                    innings_id,
                    player_id: self.player(player)?,
                })?;
            }
            Step::Undo { match_key, innings } => {
                let innings_id = match innings {
                    Some(n) => self.innings_id(self.match_id(match_key)?, *n)?,
                    None => self.cursor(match_key)?.1,
                };
                self.service.undo_last_ball(innings_id)?;
            }
            Step::Abandon { match_key } => {
                self.service.abandon_match(self.match_id(match_key)?)?;
            }
            Step::Fold { match_key } => {
                self.service.fold_match_into_standings(self.match_id(match_key)?)?;
            }
            Step::CloseLeague => {
                self.service.close_league(self.tournament_id()?)?;
            }
            Step::Schedule { fixture, match_key } => {
                self.service.schedule_playoff_fixture(&ScheduleFixtureRequest {
                    tournament_id: self.tournament_id()?,
                    fixture: *fixture,
                    match_id: self.match_id(match_key)?,
                })?;
            }
            Step::Advance { match_key, winner } => {
                self.service.advance_playoff_stage(&AdvancePlayoffRequest {
                    tournament_id: self.tournament_id()?,
                    match_id: self.match_id(match_key)?,
                    winner_id: self.team(winner)?,
                })?;
            }
        }
        Ok(())
    }

    fn ball_request(&self, ball: &BallStep) -> Result<RecordBallRequest> {
        let (snap, innings_id) = self.cursor(&ball.match_key)?;
        let at_crease = |named: Option<&str>, current: Option<PlayerId>, role: &str| match named {
            Some(key) => self.player(key),
            None => current.ok_or_else(|| anyhow!("no {role} set in match {:?}", ball.match_key)),
        };
        let wicket = ball.wicket.as_ref();
        let lookup = |key: Option<&String>| key.map(|k| self.player(k)).transpose();
        Ok(RecordBallRequest {
            innings_id,
            match_id: snap.state.match_id,
            striker_id: at_crease(ball.striker.as_deref(), snap.state.striker, "striker")?,
            non_striker_id: at_crease(
                ball.non_striker.as_deref(),
                snap.state.non_striker,
                "non-striker",
            )?,
            bowler_id: at_crease(ball.bowler.as_deref(), snap.state.bowler, "bowler")?,
            runs_scored: ball.runs,
            is_wide: ball.wide,
            is_noball: ball.noball,
            is_bye: ball.bye,
            is_legbye: ball.legbye,
            is_wicket: wicket.is_some(),
            wicket_type: wicket.map(|w| w.kind),
            wicket_player_id: lookup(wicket.and_then(|w| w.player.as_ref()))?,
            fielder_id: lookup(wicket.and_then(|w| w.fielder.as_ref()))?,
            is_penalty: ball.penalty > 0,
            penalty_runs: ball.penalty,
        })
    }

    fn report(self, rejected: Vec<Rejection>) -> Result<Report> {
        let mut matches = BTreeMap::new();
        for (key, id) in &self.matches {
            let snap = self.service.snapshot(*id)?;
            matches.insert(key.clone(), MatchSnapshot::clone(&snap));
        }
        let (standings, bracket) = match self.tournament_id {
            Some(tid) => (
                Some(self.service.standings_snapshot(tid)?),
                Some(self.service.bracket(tid)?),
            ),
            None => (None, None),
        };
        Ok(Report {
            teams: self.teams,
            players: self.players,
            matches,
            standings,
            bracket,
            rejected,
        })
    }

    // ── Key lookup ──────────────────────────────────────────────────────

    fn team(&self, key: &str) -> Result<TeamId> {
        self.teams.get(key).copied().ok_or_else(|| anyhow!("unknown team {key:?}"))
    }

    fn player(&self, key: &str) -> Result<PlayerId> {
        self.players.get(key).copied().ok_or_else(|| anyhow!("unknown player {key:?}"))
    }

    fn match_id(&self, key: &str) -> Result<MatchId> {
        self.matches.get(key).copied().ok_or_else(|| anyhow!("unknown match {key:?}"))
    }

    fn tournament_id(&self) -> Result<TournamentId> {
        self.tournament_id.ok_or_else(|| anyhow!("script declares no tournament"))
    }

    fn innings_id(&self, match_id: MatchId, number: u8) -> Result<InningsId> {
        let number = match number {
            1 => InningsNumber::First,
            2 => InningsNumber::Second,
            n => bail!("innings must be 1 or 2, got {n}"),
        };
        let snap = self.service.snapshot(match_id)?;
        snap.innings(number)
            .map(|i| i.innings.id)
            .ok_or_else(|| anyhow!("{match_id} has no innings {number}"))
    }

    /// Published snapshot and the innings its cursor points at.
    fn cursor(&self, match_key: &str) -> Result<(Arc<MatchSnapshot>, InningsId)> {
        let snap = self.service.snapshot(self.match_id(match_key)?)?;
        let innings_id = snap
            .state
            .innings_id
            .ok_or_else(|| anyhow!("match {match_key:?} has no innings in progress"))?;
        Ok((snap, innings_id))
    }
}
