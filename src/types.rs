use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::{Arc, Mutex},
};

use crate::error::Error;
use crate::store::Store;

// ── Constants ──────────────────────────────────────────────────────────

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:17870";
pub const DEFAULT_CONTEST_ID: u64 = 1;
pub const DEFAULT_POINTS_PER_WIN: u32 = 1;

// ── Shared state type aliases ──────────────────────────────────────────

pub type SharedStore = Arc<Mutex<Store>>;

pub type ContestId = u64;
pub type GameId = u64;
pub type PlayerId = u64;

// ── Bracket domain types ───────────────────────────────────────────────

/// One of a game's two participant positions. The identity is fixed for the
/// lifetime of the game, independent of which team currently occupies it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// Parse a slot value off the wire. Anything other than "a"/"b" is
    /// malformed input and rejects the whole submission.
    pub fn parse(raw: &str) -> Result<Slot, Error> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Slot::A),
            "b" => Ok(Slot::B),
            _ => Err(Error::InvalidSlot(raw.to_string())),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::A => write!(f, "a"),
            Slot::B => write!(f, "b"),
        }
    }
}

/// Bracket rounds in play order. `Opening` holds the non-playoff bowls;
/// the rest mirror the playoff structure. The derived `Ord` is the bracket
/// order, which the graph builder relies on: a slot's prerequisite must come
/// from a strictly earlier round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Round {
    Opening,
    First,
    Quarter,
    Semi,
    Final,
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Round::Opening => "opening",
            Round::First => "first",
            Round::Quarter => "quarter",
            Round::Semi => "semi",
            Round::Final => "final",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub contest_id: ContestId,
    /// Bowl title, display only. Never used to infer bracket structure.
    pub name: String,
    pub round: Round,
    /// Stable position index within the round, supplied by ingestion.
    pub position: u32,
    /// Fixed team names. `None` means the slot is unresolved pending a
    /// dependency edge.
    pub slot_a: Option<String>,
    pub slot_b: Option<String>,
    /// No pick may be created or changed at or after this instant. Absent
    /// means the game never locks.
    pub lock_at: Option<DateTime<Utc>>,
    pub network: Option<String>,
    pub location: Option<String>,
    pub winner: Option<Slot>,
    pub points: u32,
}

impl Game {
    pub fn team(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::A => self.slot_a.as_deref(),
            Slot::B => self.slot_b.as_deref(),
        }
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_at.map(|lock| now >= lock).unwrap_or(false)
    }
}

/// Declares that `game_id`'s `slot` is filled by the winner of `depends_on`.
/// A slot has at most one incoming edge, and the prerequisite's round
/// strictly precedes the dependent's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    pub game_id: GameId,
    pub slot: Slot,
    pub depends_on: GameId,
}

/// A player's committed pick on one game. Unique per (player, game).
/// `points_awarded` stays 0 until the scoring updater runs for the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub slot: Slot,
    pub points_awarded: u32,
}

// ── Seed / import types ────────────────────────────────────────────────

/// A game row as handed to the store by schedule import, before an id is
/// assigned.
#[derive(Clone, Debug)]
pub struct GameSeed {
    pub name: String,
    pub round: Round,
    pub position: u32,
    pub slot_a: Option<String>,
    pub slot_b: Option<String>,
    pub lock_at: Option<DateTime<Utc>>,
    pub network: Option<String>,
    pub location: Option<String>,
    pub points: u32,
}

// ── View types ─────────────────────────────────────────────────────────

/// One game on a player's board: the speculative display pair plus the
/// player's own pick. `display_a`/`display_b` are `None` when the slot is
/// still unresolved for this player (shown as TBD).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: GameId,
    pub name: String,
    pub round: Round,
    pub lock_at: Option<DateTime<Utc>>,
    pub network: Option<String>,
    pub location: Option<String>,
    pub points: u32,
    pub winner: Option<Slot>,
    pub display_a: Option<String>,
    pub display_b: Option<String>,
    pub picked: Option<Slot>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRow {
    pub player_id: PlayerId,
    pub points: u32,
}

// ── Submission types ───────────────────────────────────────────────────

/// One (game, slot) pair as submitted by a player. The slot arrives as a
/// raw string and is parsed up front so a malformed value rejects the whole
/// submission.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickSelection {
    pub game_id: GameId,
    pub slot: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PickOutcome {
    Accepted,
    Locked,
    UnmetDependency,
    NotFound,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickResult {
    pub game_id: GameId,
    pub slot: Slot,
    pub outcome: PickOutcome,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub accepted: usize,
    pub results: Vec<PickResult>,
}

// ── Manager request types ──────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerRequest {
    pub winner: String,
    #[serde(default)]
    pub correction: bool,
}
