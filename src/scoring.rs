use tracing::info;

use crate::error::Error;
use crate::store::Store;
use crate::types::{GameId, Slot};

/// Record a game's official winner and recompute points for every pick on
/// it. Recording the same winner again is a no-op recompute; recording a
/// different one is rejected unless the manager explicitly asks for a
/// correction, which re-runs the same full recompute. Returns the number of
/// picks updated.
pub fn record_winner(
    store: &mut Store,
    game_id: GameId,
    winner: Slot,
    correction: bool,
) -> Result<usize, Error> {
    let game = store.game(game_id).ok_or(Error::NotFound {
        what: "game",
        id: game_id,
    })?;

    if let Some(previous) = game.winner {
        if previous != winner && !correction {
            return Err(Error::AlreadyFinal { game_id });
        }
    }

    // Full recompute rather than a delta, so corrections and retries are
    // always safe. The winner write and the points rewrite happen in one
    // store call.
    let updated = store
        .set_winner_and_score(game_id, winner)
        .ok_or(Error::NotFound {
            what: "game",
            id: game_id,
        })?;
    info!("recorded winner {winner} for game {game_id} ({updated} picks rescored)");
    Ok(updated)
}
