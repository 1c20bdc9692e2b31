//! Match driver shared by the integration tests.

#![allow(dead_code)]

use crickscore_engine::{BallOutcome, MatchEngine};
use crickscore_types::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

pub struct Sim {
    pub engine: MatchEngine,
    pub home: PlayingXi,
    pub away: PlayingXi,
    rng: StdRng,
}

impl Sim {
    /// Home bats first. Team and player ids are fixed so two sims built
    /// from the same arguments hold identical state.
    pub fn new(overs: u32, seed: u64) -> Self {
        let home = PlayingXi::numbered(TeamId::from_bytes([0xA0; 16]), 1, 11);
        let away = PlayingXi::numbered(TeamId::from_bytes([0xB0; 16]), 2, 11);
        let mut setup = MatchSetup::with_overs(home.team_id, away.team_id, overs);
        setup.id = MatchId::from_bytes([0xC0; 16]);
        let engine = MatchEngine::new(&setup, home.clone(), away.clone()).unwrap();
        Self { engine, home, away, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn innings_id(&self, number: InningsNumber) -> InningsId {
        self.engine.innings_by_number(number).id
    }

    fn current_number(&self) -> InningsNumber {
        let current = self.engine.state().innings_id;
        if current == Some(self.innings_id(InningsNumber::Second)) {
            InningsNumber::Second
        } else {
            InningsNumber::First
        }
    }

    pub fn batting_xi(&self) -> &PlayingXi {
        match self.current_number() {
            InningsNumber::First => &self.home,
            InningsNumber::Second => &self.away,
        }
    }

    pub fn bowling_xi(&self) -> &PlayingXi {
        match self.current_number() {
            InningsNumber::First => &self.away,
            InningsNumber::Second => &self.home,
        }
    }

    /// Start an innings with the first two batsmen and the last-listed bowler.
    pub fn open(&mut self, number: InningsNumber) {
        let (bat, bowl) = match number {
            InningsNumber::First => (&self.home, &self.away),
            InningsNumber::Second => (&self.away, &self.home),
        };
        let (s, n, b) = (bat.player(0), bat.player(1), bowl.player(10));
        let id = self.innings_id(number);
        let m = self.engine.id();
        self.engine.initialize_innings(id, m, s, n, b).unwrap();
    }

    /// Resolve pending new-batsman and new-bowler signals.
    pub fn ensure_ready(&mut self) {
        let state = self.engine.state().clone();
        let Some(innings_id) = state.innings_id else { return };
        if !self.engine.innings(innings_id).unwrap().is_in_progress() {
            return;
        }
        if state.need_new_batsman {
            let card = self.engine.scorecard(innings_id).unwrap();
            let next = card
                .batsmen()
                .iter()
                .find(|b| b.status == BatsmanStatus::YetToBat)
                .map(|b| b.player)
                .unwrap();
            self.engine
                .set_batsman(innings_id, next, state.striker.is_none())
                .unwrap();
        }
        if state.need_new_bowler {
            let quota = self.engine.fixture().max_overs_per_bowler;
            let card = self.engine.scorecard(innings_id).unwrap();
            let next = self
                .bowling_xi()
                .players()
                .iter()
                .rev()
                .copied()
                .find(|p| {
                    Some(*p) != state.last_bowler
                        && card.bowler(*p).map_or(0, BowlerEntry::completed_overs) < quota
                })
                .unwrap();
            self.engine.set_bowler(innings_id, next).unwrap();
        }
    }

    /// A dot ball against the current cursor.
    pub fn input(&self) -> BallInput {
        let s = self.engine.state();
        BallInput::new(
            s.innings_id.unwrap(),
            self.engine.id(),
            s.striker.unwrap(),
            s.non_striker.unwrap(),
            s.bowler.unwrap(),
        )
    }

    pub fn play(&mut self, input: &BallInput) -> BallOutcome {
        let outcome = self.engine.record_ball(input).unwrap();
        self.ensure_ready();
        outcome
    }

    pub fn runs(&mut self, runs: u32) -> BallOutcome {
        let input = self.input().runs(runs);
        self.play(&input)
    }

    pub fn bowled(&mut self) -> BallOutcome {
        let input = self.input().wicket(WicketType::Bowled, None);
        self.play(&input)
    }

    /// A random valid delivery against the current cursor.
    pub fn random_input(&mut self) -> BallInput {
        let base = self.input();
        let pick = self.rng.gen_range(0..10);
        let fielder = self.bowling_xi().player(pick);
        let roll = self.rng.gen_range(0..100);
        match roll {
            0..=29 => base,
            30..=59 => base.runs(self.rng.gen_range(1..=3)),
            60..=67 => base.runs(4),
            68..=71 => base.runs(6),
            72..=76 => base.wide().runs(self.rng.gen_range(0..=2)),
            77..=80 => {
                let b = base.no_ball().runs(self.rng.gen_range(0..=4));
                if self.rng.gen_bool(0.3) { b.leg_bye() } else { b }
            }
            81..=83 => base.bye().runs(self.rng.gen_range(1..=2)),
            84..=86 => base.leg_bye().runs(self.rng.gen_range(1..=2)),
            87..=91 => base.wicket(WicketType::Bowled, None),
            92..=94 => base.wicket(WicketType::Caught, None).fielder(fielder),
            95..=96 => {
                let ns = base.non_striker;
                base.runs(self.rng.gen_range(0..=1))
                    .wicket(WicketType::RunOut, Some(ns))
                    .fielder(fielder)
            }
            97 => base.wide().wicket(WicketType::Stumped, None).fielder(fielder),
            _ => base.runs(1).penalty(5),
        }
    }

    pub fn random_ball(&mut self) -> BallOutcome {
        let input = self.random_input();
        self.play(&input)
    }

    /// Play random deliveries until the match completes.
    pub fn play_out(&mut self) {
        loop {
            let status = self.engine.fixture().status;
            match status {
                MatchStatus::Setup => self.open(InningsNumber::First),
                MatchStatus::InningsBreak => self.open(InningsNumber::Second),
                MatchStatus::Live => {
                    self.random_ball();
                }
                MatchStatus::Completed => return,
            }
        }
    }
}
