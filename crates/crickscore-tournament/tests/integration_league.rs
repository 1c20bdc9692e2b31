//! Integration test: a league played through the scoring engine, folded
//! into standings, then resolved through the playoff bracket.

mod common;

use common::{league_result, play_match, squad, team};
use crickscore_tournament::{FoldOutcome, StandingsTable, Tournament};
use crickscore_types::*;
use rand::seq::SliceRandom;
use rand::{SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;

const TEAMS: u8 = 5;

fn round_robin(tournament_id: TournamentId, seed: u64) -> Vec<MatchSummary> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut summaries = Vec::new();
    for home in 1..=TEAMS {
        for away in (home + 1)..=TEAMS {
            summaries.push(play_match(
                tournament_id,
                MatchStage::League,
                &squad(home),
                &squad(away),
                5,
                &mut rng,
            ));
        }
    }
    summaries
}

fn table(tournament_id: TournamentId) -> StandingsTable {
    let mut table = StandingsTable::new(tournament_id, PointsConfig::default());
    for n in 1..=TEAMS {
        table.register_team(team(n), format!("Side {n}")).unwrap();
    }
    table
}

#[test]
fn engine_results_fold_zero_sum() {
    let tid = TournamentId::new();
    let summaries = round_robin(tid, 11);
    let mut t = table(tid);
    for s in &summaries {
        assert_eq!(t.fold(s).unwrap(), FoldOutcome::Folded);
    }

    let rows = t.ranked();
    let matches = u32::try_from(summaries.len()).unwrap();
    assert_eq!(rows.iter().map(|r| r.played).sum::<u32>(), 2 * matches);
    // Every match hands out exactly two points under the default config.
    assert_eq!(rows.iter().map(|r| r.points).sum::<u32>(), 2 * matches);
    assert_eq!(
        rows.iter().map(|r| r.runs_scored).sum::<u32>(),
        rows.iter().map(|r| r.runs_conceded).sum::<u32>()
    );
    assert_eq!(
        rows.iter().map(|r| r.balls_faced).sum::<u32>(),
        rows.iter().map(|r| r.balls_bowled).sum::<u32>()
    );
    for (i, r) in rows.iter().enumerate() {
        assert_eq!(r.position as usize, i + 1);
        assert_eq!(r.played, u32::from(TEAMS) - 1);
        assert_eq!(r.won + r.lost + r.tied + r.no_result, r.played);
    }
}

#[test]
fn fold_order_does_not_change_the_table() {
    let tid = TournamentId::new();
    let summaries = round_robin(tid, 3);
    let mut reference = table(tid);
    for s in &summaries {
        reference.fold(s).unwrap();
    }
    let expected = reference.snapshot();

    for seed in 0..16 {
        let mut shuffled = summaries.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut t = table(tid);
        for s in &shuffled {
            t.fold(s).unwrap();
        }
        assert_eq!(t.snapshot(), expected, "seed {seed}");
    }
}

#[test]
fn refolding_everything_changes_nothing() {
    let tid = TournamentId::new();
    let summaries = round_robin(tid, 5);
    let mut t = table(tid);
    for s in &summaries {
        t.fold(s).unwrap();
    }
    let before = t.snapshot();
    for s in summaries.iter().rev() {
        assert_eq!(t.fold(s).unwrap(), FoldOutcome::AlreadyFolded);
    }
    assert_eq!(t.snapshot(), before);
    assert_eq!(before.matches_folded, summaries.len());
}

#[test]
fn better_nrr_ranks_higher_on_equal_points() {
    let tid = TournamentId::new();
    let mut t = StandingsTable::new(tid, PointsConfig::default());
    let (a, b, c, d) = (team(1), team(2), team(3), team(4));
    // Names would put B first if NRR were ignored.
    t.register_team(a, "Zebras").unwrap();
    t.register_team(b, "Aardvarks").unwrap();
    t.register_team(c, "Cobras").unwrap();
    t.register_team(d, "Dingoes").unwrap();

    for s in [
        league_result(tid, (a, 150), (c, 120)),
        league_result(tid, (d, 160), (a, 148)),
        league_result(tid, (b, 130), (c, 125)),
        league_result(tid, (d, 170), (b, 161)),
    ] {
        t.fold(&s).unwrap();
    }

    let ra = t.record(a).unwrap();
    let rb = t.record(b).unwrap();
    assert_eq!(ra.points, rb.points);
    assert_eq!(ra.net_run_rate, Decimal::new(45, 2));
    assert_eq!(rb.net_run_rate, Decimal::new(-10, 2));
    assert!(ra.position < rb.position);
    assert_eq!(t.top(1), vec![d]);
}

#[test]
fn league_to_champion() {
    let tid = TournamentId::new();
    let mut tour = Tournament::new(tid, "Premier League", PointsConfig::default());
    for n in 1..=TEAMS {
        tour.register_team(team(n), format!("Side {n}")).unwrap();
    }
    for s in round_robin(tid, 21) {
        tour.fold_match(&s).unwrap();
    }
    let top = tour.close_league().unwrap();
    assert_eq!(top.len(), constants::PLAYOFF_TEAMS);

    let mut rng = StdRng::seed_from_u64(99);
    let mut decide = |tour: &mut Tournament, kind: FixtureKind, stage: MatchStage| {
        let f = tour.bracket().fixture(kind).clone();
        let (home, away) = (f.team_a.unwrap(), f.team_b.unwrap());
        let pick = |id: TeamId| (1..=TEAMS).find(|n| team(*n) == id).unwrap();
        let summary = play_match(tid, stage, &squad(pick(home)), &squad(pick(away)), 5, &mut rng);
        // A tied knockout goes to the higher seed.
        let winner = summary.result.winner().unwrap_or(home);
        assert_eq!(tour.fold_match(&summary).unwrap(), FoldOutcome::NotLeague);
        tour.schedule_fixture(kind, summary.match_id).unwrap();
        tour.advance_playoff(summary.match_id, winner).unwrap();
        winner
    };

    let q1 = decide(&mut tour, FixtureKind::Qualifier1, MatchStage::Qualifier1);
    decide(&mut tour, FixtureKind::Eliminator, MatchStage::Eliminator);
    assert_eq!(tour.bracket().stage, PlayoffStage::Qualifier2);
    let q2 = decide(&mut tour, FixtureKind::Qualifier2, MatchStage::Qualifier2);
    let champion = decide(&mut tour, FixtureKind::Final, MatchStage::Final);

    let b = tour.bracket();
    assert_eq!(b.stage, PlayoffStage::Completed);
    assert_eq!(b.champion, Some(champion));
    let runner_up = if champion == q1 { q2 } else { q1 };
    assert_eq!(b.runner_up, Some(runner_up));
    assert!(top.contains(&champion));
}
