//! HTTP surface of the score/admin service.
//!
//! Five routes over one shared [`Store`]. Handlers are stateless: extract,
//! hit the store, append the side-effect log, reply. There is no auth and
//! no validation beyond what JSON extraction enforces; that is the service
//! contract, not an oversight.

use crate::command;
use crate::error::ApiError;
use crate::store::Store;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use shared::{
    CommandRequest, CommandResponse, RegisterRequest, RegisterResponse, ScoreRequest,
    ScoreResponse, StatsResponse, TopScore, RECENT_LOGS_LIMIT, SCORE_ALERT_THRESHOLD,
    TOP_SCORES_LIMIT,
};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

pub fn build_router(store: Store) -> Router {
    Router::new()
        .route("/players", post(register_player))
        .route("/scores", post(submit_score))
        .route("/scores/top", get(top_scores))
        .route("/stats", get(stats))
        .route("/command", post(admin_command))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}

async fn register_player(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let id = state.store.register_student(&req.name)?;
    state
        .store
        .append_log("INFO", &format!("New hacker detected: {}", req.name))?;
    info!(id, name = %req.name, "player registered");
    Ok(Json(RegisterResponse { id }))
}

async fn submit_score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, ApiError> {
    state.store.insert_score(req.student_id, req.score)?;
    if req.score > SCORE_ALERT_THRESHOLD {
        state
            .store
            .append_log("ALERT", &format!("Data breach: {} TB stolen!", req.score))?;
    }
    Ok(Json(ScoreResponse {
        message: "Score saved".to_string(),
    }))
}

async fn top_scores(State(state): State<AppState>) -> Result<Json<Vec<TopScore>>, ApiError> {
    let scores = state.store.top_scores(TOP_SCORES_LIMIT)?;
    Ok(Json(scores))
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let total_data = state.store.total_data()?;
    let recent_logs = state.store.recent_logs(RECENT_LOGS_LIMIT)?;
    Ok(Json(StatsResponse {
        total_data,
        recent_logs,
    }))
}

async fn admin_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let response = command::dispatch(&state.store, &req.cmd)?;
    Ok(Json(response))
}
