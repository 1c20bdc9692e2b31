//! Plays seeded random matches through the scoring engine.

#![allow(dead_code)]

use crickscore_engine::MatchEngine;
use crickscore_types::*;
use rand::{Rng, rngs::StdRng};

pub fn team(n: u8) -> TeamId {
    TeamId::from_bytes([n; 16])
}

/// Team `n` with players seeded by `n`, so every XI is disjoint.
pub fn squad(n: u8) -> PlayingXi {
    PlayingXi::numbered(team(n), n, 11)
}

fn next_batsman(engine: &MatchEngine, innings_id: InningsId) -> PlayerId {
    engine
        .scorecard(innings_id)
        .unwrap()
        .batsmen()
        .iter()
        .find(|b| b.status == BatsmanStatus::YetToBat)
        .map(|b| b.player)
        .unwrap()
}

fn next_bowler(engine: &MatchEngine, innings_id: InningsId, xi: &PlayingXi) -> PlayerId {
    let state = engine.state();
    let quota = engine.fixture().max_overs_per_bowler;
    let card = engine.scorecard(innings_id).unwrap();
    xi.players()
        .iter()
        .rev()
        .copied()
        .find(|p| {
            Some(*p) != state.last_bowler
                && card.bowler(*p).map_or(0, BowlerEntry::completed_overs) < quota
        })
        .unwrap()
}

fn random_input(engine: &MatchEngine, rng: &mut StdRng) -> BallInput {
    let s = engine.state();
    let base = BallInput::new(
        s.innings_id.unwrap(),
        engine.id(),
        s.striker.unwrap(),
        s.non_striker.unwrap(),
        s.bowler.unwrap(),
    );
    match rng.gen_range(0..100) {
        0..=34 => base,
        35..=69 => base.runs(rng.gen_range(1..=3)),
        70..=79 => base.runs(4),
        80..=84 => base.runs(6),
        85..=88 => base.wide(),
        89..=91 => base.no_ball().runs(rng.gen_range(0..=2)),
        92..=93 => base.leg_bye().runs(1),
        _ => base.wicket(WicketType::Bowled, None),
    }
}

fn open(engine: &mut MatchEngine, number: InningsNumber, bat: &PlayingXi, bowl: &PlayingXi) {
    let id = engine.innings_by_number(number).id;
    let m = engine.id();
    engine
        .initialize_innings(id, m, bat.player(0), bat.player(1), bowl.player(10))
        .unwrap();
}

/// Play a full random match, `home` batting first, and return its summary.
pub fn play_match(
    tournament_id: TournamentId,
    stage: MatchStage,
    home: &PlayingXi,
    away: &PlayingXi,
    overs: u32,
    rng: &mut StdRng,
) -> MatchSummary {
    let mut setup = MatchSetup::with_overs(home.team_id, away.team_id, overs);
    setup.tournament_id = Some(tournament_id);
    setup.stage = stage;
    let mut engine = MatchEngine::new(&setup, home.clone(), away.clone()).unwrap();

    open(&mut engine, InningsNumber::First, home, away);
    loop {
        match engine.fixture().status {
            MatchStatus::InningsBreak => open(&mut engine, InningsNumber::Second, away, home),
            MatchStatus::Completed => break,
            _ => {
                let input = random_input(&engine, rng);
                engine.record_ball(&input).unwrap();
                let state = engine.state().clone();
                let Some(innings_id) = state.innings_id else { continue };
                if !engine.innings(innings_id).unwrap().is_in_progress() {
                    continue;
                }
                let bowling = if engine.innings(innings_id).unwrap().bowling_team == home.team_id {
                    home
                } else {
                    away
                };
                if state.need_new_batsman {
                    let next = next_batsman(&engine, innings_id);
                    engine.set_batsman(innings_id, next, state.striker.is_none()).unwrap();
                }
                if state.need_new_bowler {
                    let next = next_bowler(&engine, innings_id, bowling);
                    engine.set_bowler(innings_id, next).unwrap();
                }
            }
        }
    }
    engine.summary().unwrap()
}

/// A hand-built league result where every innings uses the full quota.
pub fn league_result(
    tournament_id: TournamentId,
    first: (TeamId, u32),
    second: (TeamId, u32),
) -> MatchSummary {
    let ((a, runs_a), (b, runs_b)) = (first, second);
    let result = match runs_a.cmp(&runs_b) {
        std::cmp::Ordering::Greater => MatchResult::WonByRuns { winner: a, runs: runs_a - runs_b },
        std::cmp::Ordering::Equal => MatchResult::Tie,
        std::cmp::Ordering::Less => MatchResult::WonByWickets { winner: b, wickets: 1 },
    };
    MatchSummary {
        match_id: MatchId::new(),
        tournament_id: Some(tournament_id),
        stage: MatchStage::League,
        team_a: a,
        team_b: b,
        balls_quota: 120,
        result,
        innings: vec![
            InningsLine { batting_team: a, bowling_team: b, runs: runs_a, wickets: 6, legal_balls: 120 },
            InningsLine { batting_team: b, bowling_team: a, runs: runs_b, wickets: 9, legal_balls: 120 },
        ],
    }
}
