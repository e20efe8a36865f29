//! Position store: evaluations keyed by FEN.
//!
//! Upserts are application-level: look the FEN up, then update in place or
//! insert. Last write wins; concurrent upserts for the same FEN race and
//! the later write survives.

use serde::Serialize;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Position {
    pub id: String,
    pub fen: String,
    pub evaluation: f64,
    pub user_id: Option<String>,
    pub game_id: Option<String>,
    pub move_number: Option<i64>,
    pub created_at: chrono::NaiveDateTime,
}

/// Aggregate over the most recent positions, for the statistics view.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub total: i64,
    pub avg_evaluation: f64,
}

pub async fn get_by_fen(pool: &Pool<Sqlite>, fen: &str) -> Result<Option<Position>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM positions WHERE fen = $1 LIMIT 1")
        .bind(fen)
        .fetch_optional(pool)
        .await
}

pub async fn get_evaluation(pool: &Pool<Sqlite>, fen: &str) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar("SELECT evaluation FROM positions WHERE fen = $1 LIMIT 1")
        .bind(fen)
        .fetch_optional(pool)
        .await
}

/// Insert-or-update keyed on FEN, returning the record id.
///
/// Evaluation, game id and move number are overwritten on update; the
/// owning user is recorded only when the record is first created.
pub async fn upsert(
    pool: &Pool<Sqlite>,
    fen: &str,
    evaluation: f64,
    user_id: Option<&str>,
    game_id: Option<&str>,
    move_number: Option<i64>,
) -> Result<String, sqlx::Error> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM positions WHERE fen = $1 LIMIT 1")
            .bind(fen)
            .fetch_optional(pool)
            .await?;

    match existing {
        Some((id,)) => {
            sqlx::query(
                "UPDATE positions SET evaluation = $1, game_id = $2, move_number = $3 WHERE id = $4",
            )
            .bind(evaluation)
            .bind(game_id)
            .bind(move_number)
            .bind(&id)
            .execute(pool)
            .await?;
            Ok(id)
        }
        None => insert(pool, fen, evaluation, user_id, game_id, move_number).await,
    }
}

/// Direct insert, bypassing the FEN lookup. Used by seeding.
pub async fn insert(
    pool: &Pool<Sqlite>,
    fen: &str,
    evaluation: f64,
    user_id: Option<&str>,
    game_id: Option<&str>,
    move_number: Option<i64>,
) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO positions (id, fen, evaluation, user_id, game_id, move_number)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&id)
    .bind(fen)
    .bind(evaluation)
    .bind(user_id)
    .bind(game_id)
    .bind(move_number)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn list_recent(
    pool: &Pool<Sqlite>,
    limit: Option<i64>,
) -> Result<Vec<Position>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM positions ORDER BY created_at DESC, rowid DESC LIMIT $1")
        .bind(limit.unwrap_or(1000))
        .fetch_all(pool)
        .await
}

pub async fn list_by_user(
    pool: &Pool<Sqlite>,
    user_id: &str,
    limit: Option<i64>,
) -> Result<Vec<Position>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM positions WHERE user_id = $1
         ORDER BY created_at DESC, rowid DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit.unwrap_or(20))
    .fetch_all(pool)
    .await
}

/// Count and mean evaluation over the most recent `limit` positions.
pub async fn global_stats(pool: &Pool<Sqlite>, limit: i64) -> Result<GlobalStats, sqlx::Error> {
    let (total, avg_evaluation): (i64, f64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(AVG(evaluation), 0.0) FROM
         (SELECT evaluation FROM positions ORDER BY created_at DESC, rowid DESC LIMIT $1)",
    )
    .bind(limit)
    .fetch_one(pool)
    .await?;
    Ok(GlobalStats {
        total,
        avg_evaluation,
    })
}
