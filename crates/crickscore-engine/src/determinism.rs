//! Innings digests.
//!
//! Every replica that applies the same deliveries in the same order must hold
//! identical ledgers. The digest is a SHA-256 over the innings totals and the
//! four ledgers, hex-encoded for transport. Timestamps are excluded, so a
//! record-then-undo leaves the digest exactly where it was.

use crickscore_types::{BallEvent, Innings, InningsStatus, PlayerId};
use sha2::{Digest, Sha256};

use crate::scorecard::Scorecard;

fn put(hasher: &mut Sha256, n: u32) {
    hasher.update(n.to_le_bytes());
}

fn put_player(hasher: &mut Sha256, p: PlayerId) {
    hasher.update(p.0.as_bytes());
}

fn status_byte(status: InningsStatus) -> u8 {
    match status {
        InningsStatus::NotStarted => 0,
        InningsStatus::InProgress => 1,
        InningsStatus::Completed => 2,
    }
}

/// Digest of an innings' scoring state.
#[must_use]
pub fn compute_innings_digest(
    innings: &Innings,
    card: &Scorecard,
    events: &[BallEvent],
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"crickscore:innings:v1:");
    hasher.update(innings.id.0.as_bytes());
    hasher.update([status_byte(innings.status)]);
    put(&mut hasher, innings.total_runs);
    put(&mut hasher, innings.total_wickets);
    put(&mut hasher, innings.legal_balls);
    put(&mut hasher, innings.target.unwrap_or(0));
    let e = innings.extras;
    for n in [e.wides, e.no_balls, e.byes, e.leg_byes, e.penalties] {
        put(&mut hasher, n);
    }

    hasher.update((events.len() as u64).to_le_bytes());
    for event in events {
        hasher.update(event.id.0.as_bytes());
        put(&mut hasher, event.total_runs);
    }

    for b in card.batsmen() {
        put_player(&mut hasher, b.player);
        hasher.update([b.status as u8, u8::from(b.on_strike), u8::from(b.at_crease)]);
        for n in [b.runs, b.balls_faced, b.fours, b.sixes] {
            put(&mut hasher, n);
        }
    }
    for b in card.bowlers() {
        put_player(&mut hasher, b.player);
        hasher.update([u8::from(b.is_current_bowler)]);
        for n in [b.balls_bowled, b.runs_conceded, b.wickets, b.wides, b.no_balls, b.dot_balls] {
            put(&mut hasher, n);
        }
    }
    for p in card.partnerships() {
        put(&mut hasher, p.for_wicket);
        put_player(&mut hasher, p.batsman_a);
        put_player(&mut hasher, p.batsman_b);
        hasher.update([u8::from(p.is_current)]);
        for n in [p.runs, p.balls, p.batsman_a_runs, p.batsman_b_runs] {
            put(&mut hasher, n);
        }
    }
    for f in card.fall_of_wickets() {
        put(&mut hasher, f.wicket_number);
        put_player(&mut hasher, f.player_out);
        put(&mut hasher, f.score);
        put(&mut hasher, f.legal_balls);
    }

    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// Hex form handed to polling clients.
#[must_use]
pub fn innings_digest_hex(innings: &Innings, card: &Scorecard, events: &[BallEvent]) -> String {
    hex::encode(compute_innings_digest(innings, card, events))
}
