use serde::{Deserialize, Serialize};

use crate::types::Round;

/// The declared tournament template: which later-round slots are fed by
/// which earlier games. This is configuration shipped with the schedule,
/// addressed by (round, position), never inferred from team or bowl names.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketTemplate {
    pub version: u32,
    pub rounds: Vec<RoundTemplate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTemplate {
    pub round: Round,
    pub games: Vec<GameTemplate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTemplate {
    pub position: u32,
    pub slot_a: SlotSource,
    pub slot_b: SlotSource,
}

/// Where a slot's occupant comes from. `Fixed` slots carry a team name on
/// the game row itself; `WinnerOf` slots are filled by the winner of the
/// game at the declared (round, position).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum SlotSource {
    Fixed,
    WinnerOf { round: Round, position: u32 },
}
