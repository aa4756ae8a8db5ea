use std::collections::{HashMap, HashSet};

use crate::template::BracketTemplate;
use crate::types::{
    ContestId, DependencyEdge, Game, GameId, GameSeed, Pick, PlayerId, ScoreRow, Slot,
};

/// The storage collaborator: games, dependency edges, and picks for every
/// contest, indexed for the read paths the engine needs. Lives behind the
/// shared mutex, so each public method is one atomic unit of work.
#[derive(Default)]
pub struct Store {
    /// All games indexed by id.
    games: HashMap<GameId, Game>,
    /// Game ids per contest, in import order.
    contest_games: HashMap<ContestId, Vec<GameId>>,
    /// Dependency edges per contest, replaced wholesale on rebuild.
    edges: HashMap<ContestId, Vec<DependencyEdge>>,
    /// Picks keyed by (player, game); the key is the uniqueness constraint.
    picks: HashMap<(PlayerId, GameId), Pick>,
    /// The declared template each contest was imported with, kept so the
    /// graph can be rebuilt after corrected ingestion.
    templates: HashMap<ContestId, BracketTemplate>,
    next_game_id: GameId,
}

impl Store {
    pub fn new() -> Self {
        Store {
            next_game_id: 1,
            ..Store::default()
        }
    }

    // ── Games ──────────────────────────────────────────────────────────

    /// Replace a contest's games with a freshly imported set. Import is
    /// authoritative: previous games, their picks, and the contest's edges
    /// all go with them.
    pub fn replace_games(&mut self, contest_id: ContestId, seeds: Vec<GameSeed>) -> Vec<Game> {
        if let Some(old_ids) = self.contest_games.remove(&contest_id) {
            let dropped: HashSet<GameId> = old_ids.into_iter().collect();
            for id in &dropped {
                self.games.remove(id);
            }
            self.picks.retain(|(_, game_id), _| !dropped.contains(game_id));
        }
        self.edges.remove(&contest_id);

        let mut inserted = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let id = self.next_game_id;
            self.next_game_id += 1;
            let game = Game {
                id,
                contest_id,
                name: seed.name,
                round: seed.round,
                position: seed.position,
                slot_a: seed.slot_a,
                slot_b: seed.slot_b,
                lock_at: seed.lock_at,
                network: seed.network,
                location: seed.location,
                winner: None,
                points: seed.points,
            };
            self.games.insert(id, game.clone());
            self.contest_games.entry(contest_id).or_default().push(id);
            inserted.push(game);
        }
        inserted
    }

    pub fn game(&self, game_id: GameId) -> Option<Game> {
        self.games.get(&game_id).cloned()
    }

    /// All of a contest's games in display order: earlier rounds first,
    /// then by position within the round.
    pub fn games_by_contest(&self, contest_id: ContestId) -> Vec<Game> {
        let mut games: Vec<Game> = self
            .contest_games
            .get(&contest_id)
            .map(|ids| ids.iter().filter_map(|id| self.games.get(id).cloned()).collect())
            .unwrap_or_default();
        games.sort_by_key(|g| (g.round, g.position, g.id));
        games
    }

    // ── Templates ──────────────────────────────────────────────────────

    pub fn set_template(&mut self, contest_id: ContestId, template: BracketTemplate) {
        self.templates.insert(contest_id, template);
    }

    pub fn template(&self, contest_id: ContestId) -> Option<BracketTemplate> {
        self.templates.get(&contest_id).cloned()
    }

    // ── Dependency edges ───────────────────────────────────────────────

    /// Clear the contest's edges and insert the new set. Rebuilding from the
    /// same template yields the same graph.
    pub fn rebuild_edges(&mut self, contest_id: ContestId, edges: Vec<DependencyEdge>) -> usize {
        let count = edges.len();
        if edges.is_empty() {
            self.edges.remove(&contest_id);
        } else {
            self.edges.insert(contest_id, edges);
        }
        count
    }

    pub fn edges_by_contest(&self, contest_id: ContestId) -> Vec<DependencyEdge> {
        self.edges.get(&contest_id).cloned().unwrap_or_default()
    }

    // ── Picks ──────────────────────────────────────────────────────────

    pub fn pick(&self, player_id: PlayerId, game_id: GameId) -> Option<Pick> {
        self.picks.get(&(player_id, game_id)).cloned()
    }

    pub fn picks_by_player(&self, player_id: PlayerId) -> Vec<Pick> {
        self.picks
            .values()
            .filter(|p| p.player_id == player_id)
            .cloned()
            .collect()
    }

    pub fn picks_by_game(&self, game_id: GameId) -> Vec<Pick> {
        self.picks
            .values()
            .filter(|p| p.game_id == game_id)
            .cloned()
            .collect()
    }

    /// Insert-or-overwrite in a single operation, keyed by (player, game).
    /// Overwriting changes only the chosen slot; `points_awarded` is owned
    /// by the scoring updater.
    pub fn upsert_pick(&mut self, player_id: PlayerId, game_id: GameId, slot: Slot) {
        self.picks
            .entry((player_id, game_id))
            .and_modify(|p| p.slot = slot)
            .or_insert(Pick {
                player_id,
                game_id,
                slot,
                points_awarded: 0,
            });
    }

    // ── Scoring ────────────────────────────────────────────────────────

    /// Record the winner and rewrite every pick's points in the same call,
    /// so no reader can observe the winner with stale points. Returns the
    /// number of picks rewritten, or `None` if the game does not exist.
    pub fn set_winner_and_score(&mut self, game_id: GameId, winner: Slot) -> Option<usize> {
        let game = self.games.get_mut(&game_id)?;
        game.winner = Some(winner);
        let points = game.points;

        let mut updated = 0;
        for pick in self.picks.values_mut().filter(|p| p.game_id == game_id) {
            pick.points_awarded = if pick.slot == winner { points } else { 0 };
            updated += 1;
        }
        Some(updated)
    }

    /// Total points per player over the contest's games, best first.
    pub fn scoreboard(&self, contest_id: ContestId) -> Vec<ScoreRow> {
        let game_ids: HashSet<GameId> = self
            .contest_games
            .get(&contest_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();

        let mut totals: HashMap<PlayerId, u32> = HashMap::new();
        for pick in self.picks.values() {
            if game_ids.contains(&pick.game_id) {
                *totals.entry(pick.player_id).or_insert(0) += pick.points_awarded;
            }
        }

        let mut rows: Vec<ScoreRow> = totals
            .into_iter()
            .map(|(player_id, points)| ScoreRow { player_id, points })
            .collect();
        rows.sort_by(|a, b| b.points.cmp(&a.points).then(a.player_id.cmp(&b.player_id)));
        rows
    }
}
