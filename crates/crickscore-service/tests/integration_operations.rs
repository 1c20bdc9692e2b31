//! Integration test: the operation contracts end to end.

mod common;

use common::{Fixture, register, team};
use crickscore_service::{AdvancePlayoffRequest, ScheduleFixtureRequest, ScoringService};
use crickscore_tournament::FoldOutcome;
use crickscore_types::*;
use rand::{SeedableRng, rngs::StdRng};

fn service() -> ScoringService {
    ScoringService::new(ServiceConfig::default()).unwrap()
}

#[test]
fn record_ball_response_shape() {
    let svc = service();
    let fx = register(&svc, None, MatchStage::League, (1, 2), 20);
    fx.open(&svc, InningsNumber::First);

    let mut four = fx.dot(&svc);
    four.runs_scored = 4;
    let response = fx.play(&svc, &four);
    assert!(response.ball_recorded.is_boundary_four);
    assert_eq!(response.runs_this_ball, 4);
    assert!(response.is_legal_ball);
    assert_eq!(response.match_state.striker, Some(fx.home.player(0)));
    assert!(!response.match_completed);
    assert_eq!(response.winner_id, None);

    let json = serde_json::to_value(&response).unwrap();
    let keys = ["ball_recorded", "match_state", "need_new_batsman", "innings_end_reason", "win_margin"];
    for key in keys {
        assert!(json.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn undo_restores_published_snapshot() {
    let svc = service();
    let fx = register(&svc, None, MatchStage::League, (1, 2), 20);
    fx.open(&svc, InningsNumber::First);
    let mut rng = StdRng::seed_from_u64(8);
    for _ in 0..10 {
        fx.random_ball(&svc, &mut rng);
    }
    let before = svc.snapshot(fx.match_id).unwrap();
    let mut single = fx.dot(&svc);
    single.runs_scored = 1;
    let response = svc.record_ball(&single).unwrap();
    assert_ne!(*svc.snapshot(fx.match_id).unwrap(), *before);

    assert!(svc.undo_last_ball(response.innings.id).unwrap().success);
    let after = svc.snapshot(fx.match_id).unwrap();
    assert_eq!(*after, *before);
}

#[test]
fn undo_with_no_balls_is_rejected() {
    let svc = service();
    let fx = register(&svc, None, MatchStage::League, (1, 2), 20);
    fx.open(&svc, InningsNumber::First);
    let id = svc.snapshot(fx.match_id).unwrap().state.innings_id.unwrap();
    let err = svc.undo_last_ball(id).unwrap_err();
    assert!(matches!(err, CrickscoreError::NoBallToUndo(_)));
}

#[test]
fn fold_needs_completed_tournament_match() {
    let svc = service();
    let fx = register(&svc, None, MatchStage::League, (1, 2), 2);
    assert!(matches!(
        svc.fold_match_into_standings(fx.match_id),
        Err(CrickscoreError::WrongMatchStatus { .. })
    ));
    fx.play_out(&svc, &mut StdRng::seed_from_u64(1));
    assert!(matches!(
        svc.fold_match_into_standings(fx.match_id),
        Err(CrickscoreError::TournamentConflict { .. })
    ));
}

#[test]
fn abandoned_match_folds_as_no_result() {
    let svc = service();
    let tid = TournamentId::new();
    svc.create_tournament(tid, "Cup").unwrap();
    for n in [1, 2] {
        svc.register_team(tid, team(n), format!("Side {n}")).unwrap();
    }
    let fx = register(&svc, Some(tid), MatchStage::League, (1, 2), 20);
    fx.open(&svc, InningsNumber::First);
    fx.play(&svc, &fx.dot(&svc));

    assert_eq!(svc.abandon_match(fx.match_id).unwrap(), MatchResult::NoResult);
    let response = svc.fold_match_into_standings(fx.match_id).unwrap();
    assert!(response.success);
    assert_eq!(response.outcome, FoldOutcome::Folded);
    for row in svc.get_standings(tid).unwrap() {
        assert_eq!((row.no_result, row.points, row.balls_faced), (1, 1, 0));
    }
}

#[test]
fn match_for_unregistered_team_rejected() {
    let svc = service();
    let tid = TournamentId::new();
    svc.create_tournament(tid, "Cup").unwrap();
    svc.register_team(tid, team(1), "Side 1").unwrap();
    let home = common::squad(1);
    let away = common::squad(2);
    let mut setup = MatchSetup::t20(home.team_id, away.team_id);
    setup.tournament_id = Some(tid);
    let err = svc.create_match(&setup, home, away).unwrap_err();
    assert!(matches!(err, CrickscoreError::TeamNotFound(t) if t == team(2)));
}

/// Plays a knockout fixture on the service and reports it.
fn knockout(
    svc: &ScoringService,
    tid: TournamentId,
    kind: FixtureKind,
    stage: MatchStage,
    rng: &mut StdRng,
) -> (Fixture, TeamId) {
    let bracket = svc.bracket(tid).unwrap();
    let f = bracket.fixture(kind);
    let seed = |id: Option<TeamId>| (1..=6u8).find(|n| Some(team(*n)) == id).unwrap();
    let fx = register(svc, Some(tid), stage, (seed(f.team_a), seed(f.team_b)), 3);
    fx.play_out(svc, rng);
    svc.schedule_playoff_fixture(&ScheduleFixtureRequest {
        tournament_id: tid,
        fixture: kind,
        match_id: fx.match_id,
    })
    .unwrap();
    let snap = svc.snapshot(fx.match_id).unwrap();
    let winner = snap.fixture.winner.unwrap_or(fx.home.team_id);
    (fx, winner)
}

#[test]
fn tournament_from_league_to_champion() {
    let svc = service();
    let tid = TournamentId::new();
    svc.create_tournament(tid, "Premier League").unwrap();
    for n in 1..=6u8 {
        svc.register_team(tid, team(n), format!("Side {n}")).unwrap();
    }

    let mut rng = StdRng::seed_from_u64(2024);
    for home in 1..=6u8 {
        for away in (home + 1)..=6 {
            let fx = register(&svc, Some(tid), MatchStage::League, (home, away), 3);
            fx.play_out(&svc, &mut rng);
            let folded = svc.fold_match_into_standings(fx.match_id).unwrap();
            assert_eq!(folded.outcome, FoldOutcome::Folded);
        }
    }
    let table = svc.standings_snapshot(tid).unwrap();
    assert_eq!(table.matches_folded, 15);
    let top = svc.close_league(tid).unwrap();
    assert_eq!(top, table.records.iter().take(4).map(|r| r.team_id).collect::<Vec<_>>());

    let (q1, q1_winner) = knockout(&svc, tid, FixtureKind::Qualifier1, MatchStage::Qualifier1, &mut rng);

    // A result that contradicts the scored match is refused.
    let q1_fixture = svc.bracket(tid).unwrap().qualifier_1.clone();
    let wrong = if q1_fixture.team_a == Some(q1_winner) {
        q1_fixture.team_b
    } else {
        q1_fixture.team_a
    };
    let tied = svc.snapshot(q1.match_id).unwrap().fixture.winner.is_none();
    if !tied {
        let err = svc
            .advance_playoff_stage(&AdvancePlayoffRequest {
                tournament_id: tid,
                match_id: q1.match_id,
                winner_id: wrong.unwrap(),
            })
            .unwrap_err();
        assert!(matches!(err, CrickscoreError::InvalidSelection { .. }));
    }

    let advance = |match_id: MatchId, winner: TeamId| {
        let request = AdvancePlayoffRequest { tournament_id: tid, match_id, winner_id: winner };
        svc.advance_playoff_stage(&request).unwrap()
    };
    advance(q1.match_id, q1_winner);
    assert!(matches!(
        svc.advance_playoff_stage(&AdvancePlayoffRequest {
            tournament_id: tid,
            match_id: q1.match_id,
            winner_id: q1_winner,
        }),
        Err(CrickscoreError::BracketSlotOccupied { .. })
    ));

    let (elim, elim_winner) = knockout(&svc, tid, FixtureKind::Eliminator, MatchStage::Eliminator, &mut rng);
    let bracket = advance(elim.match_id, elim_winner);
    assert_eq!(bracket.stage, PlayoffStage::Qualifier2);

    let (q2, q2_winner) = knockout(&svc, tid, FixtureKind::Qualifier2, MatchStage::Qualifier2, &mut rng);
    advance(q2.match_id, q2_winner);
    let (fin, champion) = knockout(&svc, tid, FixtureKind::Final, MatchStage::Final, &mut rng);
    let bracket = advance(fin.match_id, champion);

    assert_eq!(bracket.stage, PlayoffStage::Completed);
    assert_eq!(bracket.champion, Some(champion));
    assert!(bracket.runner_up.is_some());
    assert_ne!(bracket.runner_up, bracket.champion);

    // Knockout matches never touch the table.
    let folded = svc.fold_match_into_standings(fin.match_id).unwrap();
    assert_eq!(folded.outcome, FoldOutcome::NotLeague);
    assert_eq!(svc.standings_snapshot(tid).unwrap(), table);
}

/// One-over league match: the home side makes nothing, the away side
/// loses a wicket and then wins with a single.
fn chase_won_by_nine_wickets(svc: &ScoringService, tid: TournamentId) -> Fixture {
    let fx = register(svc, Some(tid), MatchStage::League, (1, 2), 1);
    fx.open(svc, InningsNumber::First);
    for _ in 0..6 {
        fx.play(svc, &fx.dot(svc));
    }
    fx.open(svc, InningsNumber::Second);
    let mut wicket = fx.dot(svc);
    wicket.is_wicket = true;
    wicket.wicket_type = Some(WicketType::Bowled);
    fx.play(svc, &wicket);
    let mut single = fx.dot(svc);
    single.runs_scored = 1;
    fx.play(svc, &single);
    fx
}

#[test]
fn undo_after_fold_is_refused() {
    let svc = service();
    let tid = TournamentId::new();
    svc.create_tournament(tid, "Cup").unwrap();
    for n in [1, 2] {
        svc.register_team(tid, team(n), format!("Side {n}")).unwrap();
    }
    let fx = chase_won_by_nine_wickets(&svc, tid);
    let snap = svc.snapshot(fx.match_id).unwrap();
    assert_eq!(
        snap.fixture.result,
        Some(MatchResult::WonByWickets { winner: fx.away.team_id, wickets: 9 })
    );
    svc.fold_match_into_standings(fx.match_id).unwrap();
    let table = svc.standings_snapshot(tid).unwrap();

    let chase = snap.innings(InningsNumber::Second).unwrap().innings.id;
    let err = svc.undo_last_ball(chase).unwrap_err();
    assert!(matches!(err, CrickscoreError::TournamentConflict { .. }));
    assert_eq!(err.kind(), ErrorKind::StateConflict);
    assert_eq!(*svc.snapshot(fx.match_id).unwrap(), *snap);
    assert_eq!(svc.standings_snapshot(tid).unwrap(), table);

    // Folding again still finds the match as it was counted.
    let again = svc.fold_match_into_standings(fx.match_id).unwrap();
    assert_eq!(again.outcome, FoldOutcome::AlreadyFolded);
}

#[test]
fn undo_before_fold_is_allowed() {
    let svc = service();
    let tid = TournamentId::new();
    svc.create_tournament(tid, "Cup").unwrap();
    for n in [1, 2] {
        svc.register_team(tid, team(n), format!("Side {n}")).unwrap();
    }
    let fx = chase_won_by_nine_wickets(&svc, tid);
    let snap = svc.snapshot(fx.match_id).unwrap();
    let chase = snap.innings(InningsNumber::Second).unwrap().innings.id;
    assert!(svc.undo_last_ball(chase).unwrap().success);
    assert_eq!(fx.status(&svc), MatchStatus::Live);
}

#[test]
fn undo_after_playoff_advance_is_refused() {
    let svc = service();
    let tid = TournamentId::new();
    svc.create_tournament(tid, "Cup").unwrap();
    for n in 1..=4u8 {
        svc.register_team(tid, team(n), format!("Side {n}")).unwrap();
    }
    svc.close_league(tid).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let (q1, winner) = knockout(&svc, tid, FixtureKind::Qualifier1, MatchStage::Qualifier1, &mut rng);
    svc.advance_playoff_stage(&AdvancePlayoffRequest {
        tournament_id: tid,
        match_id: q1.match_id,
        winner_id: winner,
    })
    .unwrap();
    let bracket = svc.bracket(tid).unwrap();
    let snap = svc.snapshot(q1.match_id).unwrap();

    let last = snap.innings(InningsNumber::Second).unwrap().innings.id;
    let err = svc.undo_last_ball(last).unwrap_err();
    assert!(matches!(err, CrickscoreError::TournamentConflict { .. }));
    assert_eq!(*svc.snapshot(q1.match_id).unwrap(), *snap);
    assert_eq!(svc.bracket(tid).unwrap(), bracket);
}
