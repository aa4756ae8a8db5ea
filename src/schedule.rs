use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{info, warn};

use crate::error::Error;
use crate::graph;
use crate::store::Store;
use crate::template::BracketTemplate;
use crate::types::{ContestId, GameSeed, Round, SharedStore, DEFAULT_POINTS_PER_WIN};

/// A contest schedule as handed over by ingestion: the season's games plus
/// the declared bracket template. This is the whole ingestion interface;
/// scraping and text parsing happen upstream and never reach this crate.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDoc {
    pub games: Vec<ScheduleGame>,
    pub template: BracketTemplate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleGame {
    pub name: String,
    pub round: Round,
    pub position: u32,
    pub slot_a: Option<String>,
    pub slot_b: Option<String>,
    /// RFC 3339 with offset. Missing or unparseable means the game never
    /// locks.
    pub lock_at: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_points() -> u32 {
    DEFAULT_POINTS_PER_WIN
}

/// Replace the contest's games with the imported set, remember the declared
/// template, and rebuild the dependency graph. Returns (game count, edge
/// count). On `TemplateMismatch` the games are in place but the contest has
/// no edges until a corrected schedule arrives.
pub fn load_schedule(
    store: &mut Store,
    contest_id: ContestId,
    doc: &ScheduleDoc,
) -> Result<(usize, usize), Error> {
    let seeds: Vec<GameSeed> = doc.games.iter().map(to_seed).collect();
    let games = store.replace_games(contest_id, seeds);
    store.set_template(contest_id, doc.template.clone());
    let edge_count = graph::rebuild(store, contest_id)?;
    info!(
        "loaded schedule for contest {contest_id}: {} games, {edge_count} edges",
        games.len()
    );
    Ok((games.len(), edge_count))
}

/// Load a schedule document from disk, for startup seeding.
pub fn load_schedule_file(
    store: &SharedStore,
    contest_id: ContestId,
    path: &Path,
) -> Result<(usize, usize), String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("read schedule {}: {e}", path.display()))?;
    let doc = serde_json::from_str::<ScheduleDoc>(&data)
        .map_err(|e| format!("parse schedule {}: {e}", path.display()))?;
    let mut guard = store.lock().unwrap_or_else(|e| e.into_inner());
    load_schedule(&mut guard, contest_id, &doc).map_err(|e| e.to_string())
}

fn to_seed(game: &ScheduleGame) -> GameSeed {
    GameSeed {
        name: game.name.clone(),
        round: game.round,
        position: game.position,
        slot_a: game.slot_a.clone(),
        slot_b: game.slot_b.clone(),
        lock_at: game.lock_at.as_deref().and_then(|raw| parse_lock_instant(&game.name, raw)),
        network: game.network.clone(),
        location: game.location.clone(),
        points: game.points,
    }
}

fn parse_lock_instant(game_name: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(instant) => Some(instant.with_timezone(&Utc)),
        Err(e) => {
            // The original treated a bad lock value as "not locked" rather
            // than refusing the game.
            warn!("unparseable lock instant {raw:?} on {game_name:?}: {e}; treating as unlocked");
            None
        }
    }
}
