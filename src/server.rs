use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Error;
use crate::graph;
use crate::picks;
use crate::resolve;
use crate::schedule::{self, ScheduleDoc};
use crate::scoring;
use crate::types::{GameView, PickSelection, ScoreRow, SharedStore, Slot, SubmissionReport, WinnerRequest};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::TemplateMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::AlreadyFinal { .. } => StatusCode::CONFLICT,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::InvalidSlot(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route(
            "/api/contests/:contest_id/players/:player_id/board",
            get(get_board),
        )
        .route(
            "/api/contests/:contest_id/players/:player_id/picks",
            post(post_picks),
        )
        .route("/api/contests/:contest_id/schedule", post(post_schedule))
        .route("/api/contests/:contest_id/graph", post(post_graph))
        .route("/api/contests/:contest_id/scoreboard", get(get_scoreboard))
        .route("/api/games/:game_id/winner", post(post_winner))
        .with_state(store)
}

pub async fn serve(store: SharedStore, addr: &str) {
    let app = router(store);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("pick'em server failed to bind {addr}: {e}");
            return;
        }
    };
    info!("pick'em server listening at http://{addr}/");
    if let Err(e) = axum::serve(listener, app).await {
        error!("pick'em server error: {e}");
    }
}

/// The picks board for one player: every game with its speculative display
/// pair and the player's own pick. Identity is verified upstream; the ids
/// arrive as path parameters.
async fn get_board(
    State(store): State<SharedStore>,
    Path((contest_id, player_id)): Path<(u64, u64)>,
) -> Json<Vec<GameView>> {
    let (games, edges, player_picks) = {
        let guard = store.lock().unwrap_or_else(|e| e.into_inner());
        (
            guard.games_by_contest(contest_id),
            guard.edges_by_contest(contest_id),
            guard.picks_by_player(player_id),
        )
    };
    Json(resolve::resolve_games(&games, &edges, &player_picks))
}

async fn post_picks(
    State(store): State<SharedStore>,
    Path((contest_id, player_id)): Path<(u64, u64)>,
    Json(selections): Json<Vec<PickSelection>>,
) -> Result<Json<SubmissionReport>, Error> {
    // One clock read for the whole submission.
    let now = Utc::now();
    let report = {
        let mut guard = store.lock().unwrap_or_else(|e| e.into_inner());
        picks::submit_picks(&mut guard, contest_id, player_id, &selections, now)?
    };
    info!(
        "player {player_id} submitted {} pairs for contest {contest_id}, {} accepted",
        selections.len(),
        report.accepted
    );
    Ok(Json(report))
}

async fn post_schedule(
    State(store): State<SharedStore>,
    Path(contest_id): Path<u64>,
    Json(doc): Json<ScheduleDoc>,
) -> Result<Json<Value>, Error> {
    let (games, edges) = {
        let mut guard = store.lock().unwrap_or_else(|e| e.into_inner());
        schedule::load_schedule(&mut guard, contest_id, &doc)?
    };
    Ok(Json(json!({ "games": games, "edges": edges })))
}

async fn post_graph(
    State(store): State<SharedStore>,
    Path(contest_id): Path<u64>,
) -> Result<Json<Value>, Error> {
    let edges = {
        let mut guard = store.lock().unwrap_or_else(|e| e.into_inner());
        graph::rebuild(&mut guard, contest_id)?
    };
    Ok(Json(json!({ "edges": edges })))
}

async fn post_winner(
    State(store): State<SharedStore>,
    Path(game_id): Path<u64>,
    Json(request): Json<WinnerRequest>,
) -> Result<Json<Value>, Error> {
    let winner = Slot::parse(&request.winner)?;
    let updated = {
        let mut guard = store.lock().unwrap_or_else(|e| e.into_inner());
        scoring::record_winner(&mut guard, game_id, winner, request.correction)?
    };
    Ok(Json(json!({ "updatedPicks": updated })))
}

async fn get_scoreboard(
    State(store): State<SharedStore>,
    Path(contest_id): Path<u64>,
) -> Json<Vec<ScoreRow>> {
    let rows = {
        let guard = store.lock().unwrap_or_else(|e| e.into_inner());
        guard.scoreboard(contest_id)
    };
    Json(rows)
}
