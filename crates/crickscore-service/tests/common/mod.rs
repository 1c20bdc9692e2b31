//! Drives matches through the service using only its public operations.

#![allow(dead_code)]

use crickscore_service::{
    InitializeInningsRequest, RecordBallRequest, RecordBallResponse, ScoringService,
    SetBatsmanRequest, SetBowlerRequest,
};
use crickscore_types::*;
use rand::{Rng, rngs::StdRng};

pub fn team(n: u8) -> TeamId {
    TeamId::from_bytes([n; 16])
}

pub fn squad(n: u8) -> PlayingXi {
    PlayingXi::numbered(team(n), n, 11)
}

pub struct Fixture {
    pub match_id: MatchId,
    pub home: PlayingXi,
    pub away: PlayingXi,
}

pub fn register(
    svc: &ScoringService,
    tournament_id: Option<TournamentId>,
    stage: MatchStage,
    (home, away): (u8, u8),
    overs: u32,
) -> Fixture {
    let (home, away) = (squad(home), squad(away));
    let mut setup = MatchSetup::with_overs(home.team_id, away.team_id, overs);
    setup.tournament_id = tournament_id;
    setup.stage = stage;
    svc.create_match(&setup, home.clone(), away.clone()).unwrap();
    Fixture { match_id: setup.id, home, away }
}

impl Fixture {
    fn innings_id(&self, svc: &ScoringService, number: InningsNumber) -> InningsId {
        svc.snapshot(self.match_id).unwrap().innings(number).unwrap().innings.id
    }

    pub fn open(&self, svc: &ScoringService, number: InningsNumber) {
        let (bat, bowl) = match number {
            InningsNumber::First => (&self.home, &self.away),
            InningsNumber::Second => (&self.away, &self.home),
        };
        svc.initialize_innings(&InitializeInningsRequest {
            innings_id: self.innings_id(svc, number),
            match_id: self.match_id,
            striker_id: bat.player(0),
            non_striker_id: bat.player(1),
            bowler_id: bowl.player(10),
        })
        .unwrap();
    }

    /// A dot ball against the published cursor.
    pub fn dot(&self, svc: &ScoringService) -> RecordBallRequest {
        let state = svc.snapshot(self.match_id).unwrap().state.clone();
        RecordBallRequest {
            innings_id: state.innings_id.unwrap(),
            match_id: self.match_id,
            striker_id: state.striker.unwrap(),
            non_striker_id: state.non_striker.unwrap(),
            bowler_id: state.bowler.unwrap(),
            runs_scored: 0,
            is_wide: false,
            is_noball: false,
            is_bye: false,
            is_legbye: false,
            is_wicket: false,
            wicket_type: None,
            wicket_player_id: None,
            fielder_id: None,
            is_penalty: false,
            penalty_runs: 0,
        }
    }

    /// Answer pending new-batsman and new-bowler signals.
    pub fn resolve(&self, svc: &ScoringService) {
        let snap = svc.snapshot(self.match_id).unwrap();
        let Some(current) = snap.current() else { return };
        if current.innings.status != InningsStatus::InProgress {
            return;
        }
        let innings_id = current.innings.id;
        if snap.state.need_new_batsman {
            let next = current
                .batsmen
                .iter()
                .find(|b| b.status == BatsmanStatus::YetToBat)
                .map(|b| b.player)
                .unwrap();
            svc.set_batsman(&SetBatsmanRequest {
                innings_id,
                player_id: next,
                is_striker: snap.state.striker.is_none(),
            })
            .unwrap();
        }
        if snap.state.need_new_bowler {
            let bowling = if current.innings.bowling_team == self.home.team_id {
                &self.home
            } else {
                &self.away
            };
            let quota = snap.fixture.max_overs_per_bowler;
            let next = bowling
                .players()
                .iter()
                .rev()
                .copied()
                .find(|p| {
                    Some(*p) != snap.state.last_bowler
                        && current
                            .bowlers
                            .iter()
                            .find(|b| b.player == *p)
                            .map_or(0, BowlerEntry::completed_overs)
                            < quota
                })
                .unwrap();
            svc.set_bowler(&SetBowlerRequest { innings_id, player_id: next }).unwrap();
        }
    }

    pub fn play(&self, svc: &ScoringService, request: &RecordBallRequest) -> RecordBallResponse {
        let response = svc.record_ball(request).unwrap();
        self.resolve(svc);
        response
    }

    pub fn random_ball(&self, svc: &ScoringService, rng: &mut StdRng) -> RecordBallResponse {
        let mut r = self.dot(svc);
        match rng.gen_range(0..100) {
            0..=34 => {}
            35..=69 => r.runs_scored = rng.gen_range(1..=3),
            70..=79 => r.runs_scored = 4,
            80..=84 => r.runs_scored = 6,
            85..=88 => r.is_wide = true,
            89..=91 => {
                r.is_noball = true;
                r.runs_scored = rng.gen_range(0..=2);
            }
            92..=93 => {
                r.is_legbye = true;
                r.runs_scored = 1;
            }
            _ => {
                r.is_wicket = true;
                r.wicket_type = Some(WicketType::Bowled);
            }
        }
        self.play(svc, &r)
    }

    pub fn status(&self, svc: &ScoringService) -> MatchStatus {
        svc.snapshot(self.match_id).unwrap().fixture.status
    }

    /// Play random deliveries until the match completes.
    pub fn play_out(&self, svc: &ScoringService, rng: &mut StdRng) {
        loop {
            match self.status(svc) {
                MatchStatus::Setup => self.open(svc, InningsNumber::First),
                MatchStatus::InningsBreak => self.open(svc, InningsNumber::Second),
                MatchStatus::Live => {
                    self.random_ball(svc, rng);
                }
                MatchStatus::Completed => return,
            }
        }
    }
}
