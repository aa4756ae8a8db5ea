use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::Error;
use crate::store::Store;
use crate::template::{BracketTemplate, SlotSource};
use crate::types::{ContestId, DependencyEdge, Game, GameId, Round, Slot};

/// Build the contest's dependency edges from its games and the declared
/// template. Pure; the caller decides what to do with the result. Every
/// declared game and every declared prerequisite must match a concrete game
/// by (round, position), otherwise the whole build fails with
/// `TemplateMismatch` and no edges are produced.
pub fn build_edges(
    games: &[Game],
    template: &BracketTemplate,
) -> Result<Vec<DependencyEdge>, Error> {
    let by_position: HashMap<(Round, u32), GameId> = games
        .iter()
        .map(|g| ((g.round, g.position), g.id))
        .collect();

    let mut edges = Vec::new();
    for round in &template.rounds {
        for declared in &round.games {
            let game_id = find_game(&by_position, round.round, declared.position)?;
            for (slot, source) in [(Slot::A, declared.slot_a), (Slot::B, declared.slot_b)] {
                let SlotSource::WinnerOf { round: dep_round, position } = source else {
                    continue;
                };
                // A prerequisite must come from a strictly earlier round.
                if dep_round >= round.round {
                    return Err(Error::TemplateMismatch {
                        round: dep_round,
                        position,
                    });
                }
                let depends_on = find_game(&by_position, dep_round, position)?;
                edges.push(DependencyEdge {
                    game_id,
                    slot,
                    depends_on,
                });
            }
        }
    }
    Ok(edges)
}

fn find_game(
    by_position: &HashMap<(Round, u32), GameId>,
    round: Round,
    position: u32,
) -> Result<GameId, Error> {
    by_position
        .get(&(round, position))
        .copied()
        .ok_or(Error::TemplateMismatch { round, position })
}

/// Rebuild a contest's dependency graph from its stored games and the
/// template it was imported with. All-or-nothing: on `TemplateMismatch` the
/// previously built edge set is left in place and the error is surfaced to
/// the operator. Returns the new edge count.
pub fn rebuild(store: &mut Store, contest_id: ContestId) -> Result<usize, Error> {
    let template = store.template(contest_id).ok_or(Error::NotFound {
        what: "template for contest",
        id: contest_id,
    })?;
    let games = store.games_by_contest(contest_id);
    let edges = match build_edges(&games, &template) {
        Ok(edges) => edges,
        Err(e) => {
            warn!("dependency graph build failed for contest {contest_id}: {e}");
            return Err(e);
        }
    };
    let count = store.rebuild_edges(contest_id, edges);
    info!("rebuilt dependency graph for contest {contest_id}: {count} edges");
    Ok(count)
}

/// Incoming-edge lookup used by the resolver and the pick validator: at most
/// one prerequisite per (game, slot).
pub fn edge_map(edges: &[DependencyEdge]) -> HashMap<(GameId, Slot), GameId> {
    edges
        .iter()
        .map(|e| ((e.game_id, e.slot), e.depends_on))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{GameTemplate, RoundTemplate};

    fn make_game(id: GameId, round: Round, position: u32) -> Game {
        Game {
            id,
            contest_id: 1,
            name: format!("Game {id}"),
            round,
            position,
            slot_a: None,
            slot_b: None,
            lock_at: None,
            network: None,
            location: None,
            winner: None,
            points: 1,
        }
    }

    fn final_from_semis() -> BracketTemplate {
        BracketTemplate {
            version: 1,
            rounds: vec![RoundTemplate {
                round: Round::Final,
                games: vec![GameTemplate {
                    position: 1,
                    slot_a: SlotSource::WinnerOf {
                        round: Round::Semi,
                        position: 1,
                    },
                    slot_b: SlotSource::WinnerOf {
                        round: Round::Semi,
                        position: 2,
                    },
                }],
            }],
        }
    }

    #[test]
    fn test_builds_declared_edges() {
        let games = vec![
            make_game(1, Round::Semi, 1),
            make_game(2, Round::Semi, 2),
            make_game(3, Round::Final, 1),
        ];
        let edges = build_edges(&games, &final_from_semis()).unwrap();
        assert_eq!(
            edges,
            vec![
                DependencyEdge {
                    game_id: 3,
                    slot: Slot::A,
                    depends_on: 1
                },
                DependencyEdge {
                    game_id: 3,
                    slot: Slot::B,
                    depends_on: 2
                },
            ]
        );
    }

    #[test]
    fn test_fixed_slots_produce_no_edges() {
        let games = vec![make_game(1, Round::Opening, 1)];
        let template = BracketTemplate {
            version: 1,
            rounds: vec![RoundTemplate {
                round: Round::Opening,
                games: vec![GameTemplate {
                    position: 1,
                    slot_a: SlotSource::Fixed,
                    slot_b: SlotSource::Fixed,
                }],
            }],
        };
        assert!(build_edges(&games, &template).unwrap().is_empty());
    }

    #[test]
    fn test_missing_prerequisite_is_template_mismatch() {
        // Ingestion under-produced: the second semifinal never made it in.
        let games = vec![make_game(1, Round::Semi, 1), make_game(3, Round::Final, 1)];
        let err = build_edges(&games, &final_from_semis()).unwrap_err();
        assert!(matches!(
            err,
            Error::TemplateMismatch {
                round: Round::Semi,
                position: 2
            }
        ));
    }

    #[test]
    fn test_missing_dependent_game_is_template_mismatch() {
        let games = vec![make_game(1, Round::Semi, 1), make_game(2, Round::Semi, 2)];
        let err = build_edges(&games, &final_from_semis()).unwrap_err();
        assert!(matches!(
            err,
            Error::TemplateMismatch {
                round: Round::Final,
                position: 1
            }
        ));
    }

    #[test]
    fn test_rebuild_clears_before_insert() {
        use crate::types::GameSeed;

        let mut store = Store::new();
        store.replace_games(
            1,
            [(Round::Semi, 1), (Round::Semi, 2), (Round::Final, 1)]
                .into_iter()
                .map(|(round, position)| GameSeed {
                    name: format!("{round} {position}"),
                    round,
                    position,
                    slot_a: None,
                    slot_b: None,
                    lock_at: None,
                    network: None,
                    location: None,
                    points: 1,
                })
                .collect(),
        );
        store.set_template(1, final_from_semis());

        assert_eq!(rebuild(&mut store, 1).unwrap(), 2);
        assert_eq!(rebuild(&mut store, 1).unwrap(), 2);
        assert_eq!(store.edges_by_contest(1).len(), 2);
    }

    #[test]
    fn test_same_round_prerequisite_rejected() {
        let games = vec![make_game(1, Round::Semi, 1), make_game(2, Round::Semi, 2)];
        let template = BracketTemplate {
            version: 1,
            rounds: vec![RoundTemplate {
                round: Round::Semi,
                games: vec![GameTemplate {
                    position: 2,
                    slot_a: SlotSource::WinnerOf {
                        round: Round::Semi,
                        position: 1,
                    },
                    slot_b: SlotSource::Fixed,
                }],
            }],
        };
        assert!(build_edges(&games, &template).is_err());
    }
}
