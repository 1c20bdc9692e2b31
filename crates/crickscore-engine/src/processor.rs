//! Ball event processor: the per-delivery state transition function.
//!
//! ```text
//! process(BallInput, &MatchState, &Innings, sequence) -> BallDelta
//! ```
//!
//! `process` is pure. It validates the input, derives every implied fact
//! (legality, extras, boundaries, strike rotation, over roll-over) and
//! returns the complete set of ledger deltas plus the next cursor. Nothing
//! is mutated here; the engine applies the delta as one unit and keeps it
//! in the undo journal so the exact inverse can be applied later.
//!
//! ## Derivation rules
//!
//! | Fact | Rule |
//! |------|------|
//! | legal | `!wide && !no_ball` |
//! | extra runs | wide: `1 + runs`; no-ball: `1`; else `0` |
//! | total runs | `runs + extra + penalty` |
//! | boundary | no extras flag and runs exactly 4 or 6 |
//! | batsman credit | not wide, bye or leg-bye; balls faced `+1` unless no-ball |
//! | bowler charge | wide/no-ball: total; bye/leg-bye: 0; else runs |
//! | strike swap | `odd(total) \|\| over_completed` |

use chrono::Utc;
use crickscore_types::{
    BallEvent, BallEventId, BallInput, CrickscoreError, Dismissal, Extras, FallOfWicket, Innings,
    PlayerId, Result, constants,
};
use serde::{Deserialize, Serialize};

use crate::state::MatchState;

/// Credit to the striker's batting line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatsmanDelta {
    pub player: PlayerId,
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
}

/// Charge to the bowler's line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlerDelta {
    pub player: PlayerId,
    pub balls: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub wides: u32,
    pub no_balls: u32,
    pub dot_balls: u32,
}

/// Addition to the current partnership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnershipDelta {
    pub runs: u32,
    pub balls: u32,
    /// Personal contribution of the striker.
    pub striker: PlayerId,
    pub striker_runs: u32,
}

/// Addition to the innings totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsDelta {
    pub runs: u32,
    pub wickets: u32,
    pub legal_balls: u32,
    pub extras: Extras,
}

/// Everything one delivery changes, computed before anything is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallDelta {
    pub event: BallEvent,
    /// `None` for wides, byes and leg-byes.
    pub batsman: Option<BatsmanDelta>,
    pub bowler: BowlerDelta,
    pub partnership: PartnershipDelta,
    pub innings: InningsDelta,
    pub fall_of_wicket: Option<FallOfWicket>,
    pub over_completed: bool,
    pub strike_swapped: bool,
    /// The cursor after this delivery, before innings-end evaluation.
    pub next_state: MatchState,
}

/// Reject a delivery that can never be valid, whatever the match state.
pub fn validate(input: &BallInput) -> Result<()> {
    if input.striker == input.non_striker {
        return Err(CrickscoreError::InvalidBall {
            reason: "striker and non-striker must be different players".to_string(),
        });
    }
    if input.bowler == input.striker || input.bowler == input.non_striker {
        return Err(CrickscoreError::InvalidBall {
            reason: "bowler cannot be one of the batsmen".to_string(),
        });
    }
    if input.runs_scored > constants::MAX_RUNS_PER_BALL {
        return Err(CrickscoreError::InvalidBall {
            reason: format!(
                "runs_scored {} exceeds {}",
                input.runs_scored,
                constants::MAX_RUNS_PER_BALL
            ),
        });
    }
    if input.is_penalty != (input.penalty_runs > 0) {
        return Err(CrickscoreError::InvalidBall {
            reason: "penalty flag and penalty_runs must agree".to_string(),
        });
    }
    if input.penalty_runs > constants::MAX_PENALTY_RUNS {
        return Err(CrickscoreError::InvalidBall {
            reason: format!(
                "penalty_runs {} exceeds {}",
                input.penalty_runs,
                constants::MAX_PENALTY_RUNS
            ),
        });
    }
    validate_extras(input)?;
    validate_dismissal(input)
}

fn validate_extras(input: &BallInput) -> Result<()> {
    let conflict = if input.is_wide && input.is_no_ball {
        Some("wide and no-ball")
    } else if input.is_wide && input.is_bye {
        Some("wide and bye")
    } else if input.is_wide && input.is_leg_bye {
        Some("wide and leg-bye")
    } else if input.is_bye && input.is_leg_bye {
        Some("bye and leg-bye")
    } else {
        None
    };
    match conflict {
        Some(pair) => Err(CrickscoreError::ConflictingExtras {
            reason: format!("{pair} cannot both be set"),
        }),
        None => Ok(()),
    }
}

fn validate_dismissal(input: &BallInput) -> Result<()> {
    let Some(out) = input.dismissed_player() else {
        if input.wicket_type.is_some() || input.wicket_player.is_some() {
            return Err(CrickscoreError::InvalidDismissal {
                reason: "dismissal details given without the wicket flag".to_string(),
            });
        }
        return Ok(());
    };
    let Some(kind) = input.wicket_type else {
        return Err(CrickscoreError::InvalidDismissal {
            reason: "wicket requires a wicket_type".to_string(),
        });
    };
    if input.is_wide && !kind.allowed_on_wide() {
        return Err(CrickscoreError::InvalidDismissal {
            reason: format!("{kind} cannot happen off a wide"),
        });
    }
    if input.is_no_ball && !kind.allowed_on_no_ball() {
        return Err(CrickscoreError::InvalidDismissal {
            reason: format!("{kind} cannot happen off a no-ball"),
        });
    }
    if out == input.non_striker {
        if !kind.can_dismiss_non_striker() {
            return Err(CrickscoreError::InvalidDismissal {
                reason: format!("non-striker cannot be out {kind}"),
            });
        }
    } else if out != input.striker {
        return Err(CrickscoreError::InvalidDismissal {
            reason: format!("dismissed player {out} is not at the crease"),
        });
    }
    Ok(())
}

#[must_use]
pub fn is_legal(input: &BallInput) -> bool {
    !input.is_wide && !input.is_no_ball
}

/// Wide: one plus everything run. No-ball: the flat one.
#[must_use]
pub fn extra_runs(input: &BallInput) -> u32 {
    if input.is_wide {
        1 + input.runs_scored
    } else if input.is_no_ball {
        1
    } else {
        0
    }
}

#[must_use]
pub fn penalty_runs(input: &BallInput) -> u32 {
    if input.is_penalty { input.penalty_runs } else { 0 }
}

#[must_use]
pub fn total_runs(input: &BallInput) -> u32 {
    input.runs_scored + extra_runs(input) + penalty_runs(input)
}

/// Split of this delivery's non-bat runs across the extras buckets.
///
/// A no-ball only ever puts the flat one in `no_balls`; runs off the bat go
/// to the batsman and byes run off a no-ball go to the bye buckets.
#[must_use]
pub fn extras_breakdown(input: &BallInput) -> Extras {
    let mut extras = Extras {
        penalties: penalty_runs(input),
        ..Extras::default()
    };
    if input.is_wide {
        extras.wides = extra_runs(input);
        return extras;
    }
    if input.is_no_ball {
        extras.no_balls = 1;
    }
    if input.is_bye {
        extras.byes = input.runs_scored;
    } else if input.is_leg_bye {
        extras.leg_byes = input.runs_scored;
    }
    extras
}

fn off_the_bat(input: &BallInput) -> bool {
    !input.is_wide && !input.is_bye && !input.is_leg_bye
}

/// Validate and derive in one step.
pub fn process(
    input: &BallInput,
    cursor: &MatchState,
    innings: &Innings,
    sequence: u32,
) -> Result<BallDelta> {
    validate(input)?;
    Ok(derive(input, cursor, innings, sequence))
}

/// Derive the delta of an already validated delivery.
#[must_use]
pub fn derive(
    input: &BallInput,
    cursor: &MatchState,
    innings: &Innings,
    sequence: u32,
) -> BallDelta {
    let legal = is_legal(input);
    let extra = extra_runs(input);
    let total = total_runs(input);
    let clean = !input.is_wide && !input.is_no_ball && !input.is_bye && !input.is_leg_bye;
    let four = clean && input.runs_scored == 4;
    let six = clean && input.runs_scored == 6;

    let dismissal = input.wicket_type.zip(input.dismissed_player()).map(|(kind, player_out)| {
        Dismissal { kind, player_out, bowler: input.bowler, fielder: input.fielder }
    });

    let event = BallEvent {
        id: BallEventId::deterministic(innings.id, sequence),
        innings_id: innings.id,
        match_id: innings.match_id,
        sequence,
        over: cursor.over,
        ball_in_over: cursor.ball,
        striker: input.striker,
        non_striker: input.non_striker,
        bowler: input.bowler,
        runs_scored: input.runs_scored,
        is_wide: input.is_wide,
        is_no_ball: input.is_no_ball,
        is_bye: input.is_bye,
        is_leg_bye: input.is_leg_bye,
        is_penalty: input.is_penalty,
        penalty_runs: penalty_runs(input),
        is_wicket: dismissal.is_some(),
        dismissal,
        is_legal_ball: legal,
        is_boundary_four: four,
        is_boundary_six: six,
        extra_runs: extra,
        total_runs: total,
        recorded_at: Utc::now(),
    };

    let batsman = off_the_bat(input).then(|| BatsmanDelta {
        player: input.striker,
        runs: input.runs_scored,
        balls_faced: u32::from(!input.is_no_ball),
        fours: u32::from(four),
        sixes: u32::from(six),
    });

    let runs_conceded = if input.is_wide || input.is_no_ball {
        total
    } else if input.is_bye || input.is_leg_bye {
        0
    } else {
        input.runs_scored
    };
    let bowler = BowlerDelta {
        player: input.bowler,
        balls: u32::from(legal),
        runs_conceded,
        wickets: u32::from(dismissal.is_some_and(|d| d.kind.credited_to_bowler())),
        wides: u32::from(input.is_wide),
        no_balls: u32::from(input.is_no_ball),
        dot_balls: u32::from(legal && total == 0 && dismissal.is_none()),
    };

    let partnership = PartnershipDelta {
        runs: total,
        balls: u32::from(legal),
        striker: input.striker,
        striker_runs: if off_the_bat(input) { input.runs_scored } else { 0 },
    };

    let innings_delta = InningsDelta {
        runs: total,
        wickets: u32::from(dismissal.is_some()),
        legal_balls: u32::from(legal),
        extras: extras_breakdown(input),
    };

    let fall_of_wicket = dismissal.map(|d| FallOfWicket {
        innings_id: innings.id,
        wicket_number: innings.total_wickets + 1,
        player_out: d.player_out,
        score: innings.total_runs + total,
        legal_balls: innings.legal_balls + innings_delta.legal_balls,
    });

    let mut next = cursor.clone();
    next.over_trace.record(cursor.over, event.mark());

    let mut over_completed = false;
    if legal {
        next.ball += 1;
        if next.ball == constants::BALLS_PER_OVER {
            over_completed = true;
            next.over += 1;
            next.ball = 0;
            next.last_bowler = Some(input.bowler);
            next.bowler = None;
            next.need_new_bowler = true;
        }
    }

    // Odd runs and the end of an over each swap ends, but never both.
    let strike_swapped = total % 2 == 1 || over_completed;
    if strike_swapped {
        next.swap_strike();
    }
    if let Some(d) = dismissal {
        next.vacate(d.player_out);
        next.need_new_batsman = true;
    }

    BallDelta {
        event,
        batsman,
        bowler,
        partnership,
        innings: innings_delta,
        fall_of_wicket,
        over_completed,
        strike_swapped,
        next_state: next,
    }
}

#[cfg(test)]
mod tests {
    use crickscore_types::{InningsNumber, MatchId, TeamId, WicketType};

    use super::*;

    struct Fixture {
        innings: Innings,
        cursor: MatchState,
        striker: PlayerId,
        non_striker: PlayerId,
        bowler: PlayerId,
    }

    fn fixture() -> Fixture {
        let match_id = MatchId::new();
        let innings = Innings::new(match_id, InningsNumber::First, TeamId::new(), TeamId::new());
        let (striker, non_striker, bowler) = (PlayerId::new(), PlayerId::new(), PlayerId::new());
        let mut cursor = MatchState::new(match_id, 16);
        cursor.begin_innings(innings.id, striker, non_striker, bowler);
        Fixture { innings, cursor, striker, non_striker, bowler }
    }

    impl Fixture {
        fn ball(&self) -> BallInput {
            BallInput::new(
                self.innings.id,
                self.innings.match_id,
                self.striker,
                self.non_striker,
                self.bowler,
            )
        }

        fn run(&self, input: &BallInput) -> BallDelta {
            process(input, &self.cursor, &self.innings, 0).unwrap()
        }
    }

    #[test]
    fn four_off_the_bat() {
        let f = fixture();
        let d = f.run(&f.ball().runs(4));
        assert!(d.event.is_boundary_four);
        assert!(d.event.is_legal_ball);
        assert_eq!(d.event.total_runs, 4);
        let b = d.batsman.unwrap();
        assert_eq!((b.runs, b.balls_faced, b.fours), (4, 1, 1));
        assert_eq!(d.bowler.runs_conceded, 4);
        assert!(!d.strike_swapped);
        assert_eq!(d.next_state.striker, Some(f.striker));
    }

    #[test]
    fn wide_with_one_run() {
        let f = fixture();
        let d = f.run(&f.ball().runs(1).wide());
        assert_eq!(d.event.extra_runs, 2);
        assert_eq!(d.event.total_runs, 2);
        assert!(!d.event.is_legal_ball);
        assert!(d.batsman.is_none());
        assert_eq!(d.bowler.runs_conceded, 2);
        assert_eq!(d.bowler.balls, 0);
        assert_eq!(d.innings.extras.wides, 2);
        assert!(!d.strike_swapped);
        assert_eq!(d.next_state.ball, 0);
    }

    #[test]
    fn no_ball_extras_breakdown_keeps_bat_runs_out() {
        let f = fixture();
        let d = f.run(&f.ball().runs(3).no_ball());
        assert_eq!(d.event.extra_runs, 1);
        assert_eq!(d.event.total_runs, 4);
        assert_eq!(d.innings.extras, Extras { no_balls: 1, ..Extras::default() });
        let b = d.batsman.unwrap();
        assert_eq!((b.runs, b.balls_faced), (3, 0));
        assert_eq!(d.bowler.runs_conceded, 4);
        assert_eq!(d.partnership.striker_runs, 3);
        assert_eq!(d.partnership.balls, 0);
    }

    #[test]
    fn byes_off_a_no_ball_go_to_bye_bucket() {
        let f = fixture();
        let d = f.run(&f.ball().runs(2).no_ball().leg_bye());
        assert_eq!(d.innings.extras.no_balls, 1);
        assert_eq!(d.innings.extras.leg_byes, 2);
        assert_eq!(d.innings.extras.total(), d.event.total_runs);
        assert!(d.batsman.is_none());
    }

    #[test]
    fn leg_byes_not_charged_to_bowler() {
        let f = fixture();
        let d = f.run(&f.ball().runs(1).leg_bye());
        assert_eq!(d.bowler.runs_conceded, 0);
        assert_eq!(d.bowler.balls, 1);
        assert_eq!(d.bowler.dot_balls, 0);
        assert!(d.strike_swapped);
        assert_eq!(d.next_state.striker, Some(f.non_striker));
    }

    #[test]
    fn penalty_adds_to_total_and_bucket() {
        let f = fixture();
        let d = f.run(&f.ball().runs(1).penalty(5));
        assert_eq!(d.event.total_runs, 6);
        assert_eq!(d.innings.extras.penalties, 5);
        assert!(!d.strike_swapped);
    }

    #[test]
    fn run_out_not_credited_and_slot_emptied() {
        let f = fixture();
        let input = f.ball().runs(1).wicket(WicketType::RunOut, Some(f.non_striker));
        let d = f.run(&input);
        assert_eq!(d.bowler.wickets, 0);
        let fow = d.fall_of_wicket.unwrap();
        assert_eq!((fow.wicket_number, fow.score, fow.legal_balls), (1, 1, 1));
        // One run swaps ends, then the run-out batsman's slot empties.
        assert_eq!(d.next_state.non_striker, Some(f.striker));
        assert_eq!(d.next_state.striker, None);
        assert!(d.next_state.need_new_batsman);
    }

    #[test]
    fn bowled_is_credited_and_not_a_dot() {
        let f = fixture();
        let d = f.run(&f.ball().wicket(WicketType::Bowled, None));
        assert_eq!(d.bowler.wickets, 1);
        assert_eq!(d.bowler.dot_balls, 0);
        assert_eq!(d.next_state.striker, None);
        assert_eq!(d.event.mark(), "W");
    }

    #[test]
    fn sixth_ball_rolls_over_and_swaps_once() {
        let mut f = fixture();
        f.cursor.ball = 5;
        let d = f.run(&f.ball().runs(1));
        assert!(d.over_completed);
        assert!(d.strike_swapped);
        assert_eq!((d.next_state.over, d.next_state.ball), (1, 0));
        assert_eq!(d.next_state.striker, Some(f.non_striker));
        assert_eq!(d.next_state.bowler, None);
        assert_eq!(d.next_state.last_bowler, Some(f.bowler));
        assert!(d.next_state.need_new_bowler);
    }

    #[test]
    fn wide_on_sixth_ball_does_not_end_over() {
        let mut f = fixture();
        f.cursor.ball = 5;
        let d = f.run(&f.ball().wide());
        assert!(!d.over_completed);
        assert_eq!(d.next_state.ball, 5);
        assert!(d.strike_swapped);
    }

    #[test]
    fn validation_rejects_conflicts() {
        let f = fixture();
        let cases = [
            f.ball().wide().no_ball(),
            f.ball().wide().bye(),
            f.ball().bye().leg_bye(),
        ];
        for input in cases {
            let err = validate(&input).unwrap_err();
            assert!(matches!(err, CrickscoreError::ConflictingExtras { .. }), "{err}");
        }
        assert!(validate(&f.ball().runs(8)).is_err());

        let mut same = f.ball();
        same.non_striker = same.striker;
        assert!(matches!(validate(&same), Err(CrickscoreError::InvalidBall { .. })));

        let mut zero_penalty = f.ball();
        zero_penalty.is_penalty = true;
        assert!(validate(&zero_penalty).is_err());
    }

    #[test]
    fn penalty_award_is_capped() {
        let f = fixture();
        assert!(validate(&f.ball().penalty(constants::MAX_PENALTY_RUNS)).is_ok());
        for runs in [constants::MAX_PENALTY_RUNS + 1, u32::MAX] {
            let err = validate(&f.ball().runs(1).penalty(runs)).unwrap_err();
            assert!(matches!(err, CrickscoreError::InvalidBall { .. }), "{runs}");
        }
    }

    #[test]
    fn validation_rejects_impossible_dismissals() {
        let f = fixture();
        let mut no_type = f.ball();
        no_type.is_wicket = true;
        assert!(matches!(validate(&no_type), Err(CrickscoreError::InvalidDismissal { .. })));

        assert!(validate(&f.ball().no_ball().wicket(WicketType::Bowled, None)).is_err());
        assert!(validate(&f.ball().wide().wicket(WicketType::Caught, None)).is_err());
        assert!(validate(&f.ball().wide().wicket(WicketType::Stumped, None)).is_ok());
        assert!(
            validate(&f.ball().wicket(WicketType::Caught, Some(f.non_striker))).is_err()
        );
        assert!(validate(&f.ball().wicket(WicketType::Bowled, Some(PlayerId::new()))).is_err());
    }

    #[test]
    fn event_id_is_deterministic() {
        let f = fixture();
        let a = derive(&f.ball(), &f.cursor, &f.innings, 3);
        let b = derive(&f.ball(), &f.cursor, &f.innings, 3);
        assert_eq!(a.event.id, b.event.id);
        assert_eq!(a.event.id, BallEventId::deterministic(f.innings.id, 3));
    }
}
