use std::collections::HashMap;

use crate::graph::edge_map;
use crate::types::{DependencyEdge, Game, GameId, GameView, Pick, Slot};

/// Compute the board one player sees: for every game, the display pair and
/// the player's own pick. Resolution is speculative per player: a dependent
/// slot shows the team *this player* picked to win the prerequisite, never
/// the official result. Pure, recomputed on every read, and missing picks
/// are a normal state rather than an error.
pub fn resolve_games(games: &[Game], edges: &[DependencyEdge], picks: &[Pick]) -> Vec<GameView> {
    let games_by_id: HashMap<GameId, &Game> = games.iter().map(|g| (g.id, g)).collect();
    let picked: HashMap<GameId, Slot> = picks.iter().map(|p| (p.game_id, p.slot)).collect();
    let incoming = edge_map(edges);

    games
        .iter()
        .map(|game| GameView {
            id: game.id,
            name: game.name.clone(),
            round: game.round,
            lock_at: game.lock_at,
            network: game.network.clone(),
            location: game.location.clone(),
            points: game.points,
            winner: game.winner,
            display_a: display_name(game, Slot::A, &incoming, &games_by_id, &picked),
            display_b: display_name(game, Slot::B, &incoming, &games_by_id, &picked),
            picked: picked.get(&game.id).copied(),
        })
        .collect()
}

/// A slot with no incoming edge displays its fixed team name. A slot with an
/// edge displays the prerequisite's team on the side the player picked, or
/// nothing while that pick is missing.
fn display_name(
    game: &Game,
    slot: Slot,
    incoming: &HashMap<(GameId, Slot), GameId>,
    games_by_id: &HashMap<GameId, &Game>,
    picked: &HashMap<GameId, Slot>,
) -> Option<String> {
    let Some(dep_id) = incoming.get(&(game.id, slot)) else {
        return game.team(slot).map(str::to_string);
    };
    let prerequisite = games_by_id.get(dep_id)?;
    let picked_slot = picked.get(dep_id)?;
    prerequisite.team(*picked_slot).map(str::to_string)
}
