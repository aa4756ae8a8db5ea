use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::error::Error;
use crate::graph::edge_map;
use crate::store::Store;
use crate::types::{
    ContestId, Game, GameId, PickOutcome, PickResult, PickSelection, PlayerId, Slot,
    SubmissionReport,
};

/// Validate and record a player's batch of slot selections.
///
/// Slots are parsed up front, so one unrecognized slot value rejects the
/// submission wholesale. Each surviving pair is then checked in order: lock
/// first, dependency-consistency second, and only then upserted. Dropped
/// pairs do not fail the submission; each gets an entry in the returned
/// outcome list. `now` is read once by the caller so a submission cannot
/// straddle a lock boundary mid-request.
pub fn submit_picks(
    store: &mut Store,
    contest_id: ContestId,
    player_id: PlayerId,
    selections: &[PickSelection],
    now: DateTime<Utc>,
) -> Result<SubmissionReport, Error> {
    let mut parsed = Vec::with_capacity(selections.len());
    for selection in selections {
        parsed.push((selection.game_id, Slot::parse(&selection.slot)?));
    }

    let games: HashMap<GameId, Game> = store
        .games_by_contest(contest_id)
        .into_iter()
        .map(|g| (g.id, g))
        .collect();
    let incoming = edge_map(&store.edges_by_contest(contest_id));

    let mut results = Vec::with_capacity(parsed.len());
    let mut accepted = 0;
    for (game_id, slot) in parsed {
        let outcome = evaluate_pair(store, &games, &incoming, player_id, game_id, slot, now);
        if outcome == PickOutcome::Accepted {
            store.upsert_pick(player_id, game_id, slot);
            accepted += 1;
        } else {
            debug!("dropped pick player={player_id} game={game_id} slot={slot}: {outcome:?}");
        }
        results.push(PickResult {
            game_id,
            slot,
            outcome,
        });
    }

    Ok(SubmissionReport { accepted, results })
}

fn evaluate_pair(
    store: &Store,
    games: &HashMap<GameId, Game>,
    incoming: &HashMap<(GameId, Slot), GameId>,
    player_id: PlayerId,
    game_id: GameId,
    slot: Slot,
    now: DateTime<Utc>,
) -> PickOutcome {
    let Some(game) = games.get(&game_id) else {
        return PickOutcome::NotFound;
    };
    if game.is_locked(now) {
        return PickOutcome::Locked;
    }
    // Only the chosen slot's prerequisite matters: the player must already
    // hold a pick for the game feeding that slot. The unchosen slot's edge
    // is irrelevant to this submission.
    if let Some(depends_on) = incoming.get(&(game_id, slot)) {
        if store.pick(player_id, *depends_on).is_none() {
            return PickOutcome::UnmetDependency;
        }
    }
    PickOutcome::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::types::{DependencyEdge, GameSeed, Round};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 18, 0, 0).unwrap()
    }

    fn make_seed(round: Round, position: u32, locked: bool) -> GameSeed {
        GameSeed {
            name: format!("{round} {position}"),
            round,
            position,
            slot_a: Some("Ohio".to_string()),
            slot_b: Some("Tulane".to_string()),
            lock_at: if locked {
                Some(now() - chrono::Duration::hours(1))
            } else {
                Some(now() + chrono::Duration::hours(1))
            },
            network: None,
            location: None,
            points: 4,
        }
    }

    /// Two semifinals feeding a final. Returns (store, [sf1, sf2, final]).
    fn make_bracket() -> (Store, Vec<GameId>) {
        let mut store = Store::new();
        let games = store.replace_games(
            1,
            vec![
                make_seed(Round::Semi, 1, false),
                make_seed(Round::Semi, 2, false),
                make_seed(Round::Final, 1, false),
            ],
        );
        let ids: Vec<GameId> = games.iter().map(|g| g.id).collect();
        store.rebuild_edges(
            1,
            vec![
                DependencyEdge {
                    game_id: ids[2],
                    slot: Slot::A,
                    depends_on: ids[0],
                },
                DependencyEdge {
                    game_id: ids[2],
                    slot: Slot::B,
                    depends_on: ids[1],
                },
            ],
        );
        (store, ids)
    }

    fn select(game_id: GameId, slot: &str) -> PickSelection {
        PickSelection {
            game_id,
            slot: slot.to_string(),
        }
    }

    #[test]
    fn test_locked_pair_dropped() {
        let mut store = Store::new();
        let games = store.replace_games(1, vec![make_seed(Round::Opening, 1, true)]);
        let report = submit_picks(&mut store, 1, 7, &[select(games[0].id, "a")], now()).unwrap();
        assert_eq!(report.accepted, 0);
        assert_eq!(report.results[0].outcome, PickOutcome::Locked);
        assert!(store.pick(7, games[0].id).is_none());
    }

    #[test]
    fn test_missing_lock_means_never_locked() {
        let mut store = Store::new();
        let mut seed = make_seed(Round::Opening, 1, false);
        seed.lock_at = None;
        let games = store.replace_games(1, vec![seed]);
        let report = submit_picks(&mut store, 1, 7, &[select(games[0].id, "b")], now()).unwrap();
        assert_eq!(report.accepted, 1);
    }

    #[test]
    fn test_unmet_dependency_dropped_until_prerequisite_exists() {
        let (mut store, ids) = make_bracket();

        let report = submit_picks(&mut store, 1, 7, &[select(ids[2], "a")], now()).unwrap();
        assert_eq!(report.results[0].outcome, PickOutcome::UnmetDependency);
        assert!(store.pick(7, ids[2]).is_none());

        submit_picks(&mut store, 1, 7, &[select(ids[0], "a")], now()).unwrap();
        let retry = submit_picks(&mut store, 1, 7, &[select(ids[2], "a")], now()).unwrap();
        assert_eq!(retry.results[0].outcome, PickOutcome::Accepted);
        assert_eq!(store.pick(7, ids[2]).unwrap().slot, Slot::A);
    }

    #[test]
    fn test_only_chosen_slot_dependency_checked() {
        let (mut store, ids) = make_bracket();
        submit_picks(&mut store, 1, 7, &[select(ids[0], "a")], now()).unwrap();

        // Slot B depends on the unpicked second semifinal, but the player is
        // choosing slot A, so that edge does not matter.
        let report = submit_picks(&mut store, 1, 7, &[select(ids[2], "a")], now()).unwrap();
        assert_eq!(report.accepted, 1);

        let report = submit_picks(&mut store, 1, 7, &[select(ids[2], "b")], now()).unwrap();
        assert_eq!(report.results[0].outcome, PickOutcome::UnmetDependency);
    }

    #[test]
    fn test_prerequisite_pick_in_same_submission_counts() {
        let (mut store, ids) = make_bracket();
        let report = submit_picks(
            &mut store,
            1,
            7,
            &[select(ids[0], "b"), select(ids[2], "a")],
            now(),
        )
        .unwrap();
        assert_eq!(report.accepted, 2);
    }

    #[test]
    fn test_resubmission_is_noop() {
        let (mut store, ids) = make_bracket();
        submit_picks(&mut store, 1, 7, &[select(ids[0], "a")], now()).unwrap();
        let before = store.pick(7, ids[0]);
        let report = submit_picks(&mut store, 1, 7, &[select(ids[0], "a")], now()).unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(store.pick(7, ids[0]), before);
    }

    #[test]
    fn test_unknown_game_reported_not_found() {
        let (mut store, _) = make_bracket();
        let report = submit_picks(&mut store, 1, 7, &[select(999, "a")], now()).unwrap();
        assert_eq!(report.results[0].outcome, PickOutcome::NotFound);
    }

    #[test]
    fn test_invalid_slot_rejects_wholesale() {
        let (mut store, ids) = make_bracket();
        let err = submit_picks(
            &mut store,
            1,
            7,
            &[select(ids[0], "a"), select(ids[1], "team2")],
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidSlot(_)));
        // Nothing was written, including the well-formed pair.
        assert!(store.pick(7, ids[0]).is_none());
    }

    #[test]
    fn test_overwrite_preserves_awarded_points() {
        let (mut store, ids) = make_bracket();
        submit_picks(&mut store, 1, 7, &[select(ids[0], "a")], now()).unwrap();
        store.set_winner_and_score(ids[0], Slot::A);

        submit_picks(&mut store, 1, 7, &[select(ids[0], "a")], now()).unwrap();
        assert_eq!(store.pick(7, ids[0]).unwrap().points_awarded, 4);
    }
}
