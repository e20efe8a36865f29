//! HTTP surface: router, shared state, and request handlers.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use crate::analyses::{self, Analysis, UserStats};
use crate::auth::{self, AuthUser, MaybeUser};
use crate::config::Config;
use crate::engine::MaterialEvaluator;
use crate::error::ApiResult;
use crate::positions::{self, GlobalStats, Position};
use crate::service::{BatchOutcome, EvaluationOutcome, EvaluationService};

// Window sizes the statistics view aggregates over.
const USER_STATS_WINDOW: i64 = 100;
const GLOBAL_STATS_WINDOW: i64 = 1000;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub service: EvaluationService,
    pub config: Config,
}

pub fn router(db: Pool<Sqlite>, config: Config) -> Router {
    let state = AppState {
        db,
        service: EvaluationService::new(Arc::new(MaterialEvaluator)),
        config,
    };

    Router::new()
        .route("/evaluate", post(evaluate_position))
        .route("/evaluate/batch", post(batch_evaluate_positions))
        .route("/positions", get(get_all_positions).post(save_user_evaluation))
        .route("/positions/evaluation", get(get_evaluation))
        .route("/positions/mine", get(get_user_positions))
        .route("/analyses", get(get_user_analyses).post(save_analysis))
        .route("/analyses/position", get(get_analysis))
        .route("/stats", get(get_stats))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state)
}

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub fen: String,
    #[serde(default)]
    pub save_to_database: bool,
}

async fn evaluate_position(
    State(state): State<AppState>,
    Json(payload): Json<EvaluateRequest>,
) -> ApiResult<Json<EvaluationOutcome>> {
    let outcome = state
        .service
        .evaluate(&state.db, &payload.fen, payload.save_to_database)
        .await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
pub struct BatchEvaluateRequest {
    pub positions: Vec<String>,
}

async fn batch_evaluate_positions(
    State(state): State<AppState>,
    Json(payload): Json<BatchEvaluateRequest>,
) -> Json<Vec<BatchOutcome>> {
    Json(state.service.batch_evaluate(&state.db, &payload.positions).await)
}

#[derive(Deserialize)]
struct FenQuery {
    fen: String,
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<i64>,
}

async fn get_evaluation(
    State(state): State<AppState>,
    Query(query): Query<FenQuery>,
) -> ApiResult<Json<Option<f64>>> {
    Ok(Json(positions::get_evaluation(&state.db, &query.fen).await?))
}

#[derive(Deserialize)]
pub struct SaveEvaluationRequest {
    pub fen: String,
    pub evaluation: f64,
    pub game_id: Option<String>,
    pub move_number: Option<i64>,
}

#[derive(Serialize)]
pub struct SavedResponse {
    pub id: String,
}

async fn save_user_evaluation(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Json(payload): Json<SaveEvaluationRequest>,
) -> ApiResult<Json<SavedResponse>> {
    let id = positions::upsert(
        &state.db,
        &payload.fen,
        payload.evaluation,
        user_id.as_deref(),
        payload.game_id.as_deref(),
        payload.move_number,
    )
    .await?;
    Ok(Json(SavedResponse { id }))
}

async fn get_user_positions(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Position>>> {
    let Some(user_id) = user_id else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(
        positions::list_by_user(&state.db, &user_id, query.limit).await?,
    ))
}

async fn get_all_positions(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Position>>> {
    Ok(Json(positions::list_recent(&state.db, query.limit).await?))
}

#[derive(Deserialize)]
pub struct SaveAnalysisRequest {
    pub fen: String,
    pub evaluation: f64,
    pub depth: Option<i64>,
    pub best_move: Option<String>,
    pub principal_variation: Option<Vec<String>>,
}

async fn save_analysis(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SaveAnalysisRequest>,
) -> ApiResult<Json<SavedResponse>> {
    let id = analyses::upsert(
        &state.db,
        &user_id,
        &payload.fen,
        payload.evaluation,
        payload.depth,
        payload.best_move.as_deref(),
        payload.principal_variation.as_deref(),
    )
    .await?;
    Ok(Json(SavedResponse { id }))
}

async fn get_user_analyses(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Analysis>>> {
    let Some(user_id) = user_id else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(
        analyses::list_by_user(&state.db, &user_id, query.limit).await?,
    ))
}

async fn get_analysis(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Query(query): Query<FenQuery>,
) -> ApiResult<Json<Option<Analysis>>> {
    let Some(user_id) = user_id else {
        return Ok(Json(None));
    };
    Ok(Json(analyses::get_one(&state.db, &user_id, &query.fen).await?))
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub user: Option<UserStats>,
    pub global: GlobalStats,
}

async fn get_stats(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
) -> ApiResult<Json<StatsResponse>> {
    let user = match user_id {
        Some(user_id) => {
            Some(analyses::user_stats(&state.db, &user_id, USER_STATS_WINDOW).await?)
        }
        None => None,
    };
    let global = positions::global_stats(&state.db, GLOBAL_STATS_WINDOW).await?;
    Ok(Json(StatsResponse { user, global }))
}
