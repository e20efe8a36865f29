//! Analysis store: per-user evaluation history keyed by (user, FEN).
//!
//! Same last-write-wins upsert semantics as the position store. The
//! principal variation is stored as a JSON array in a text column.

use serde::Serialize;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub id: String,
    pub user_id: String,
    pub fen: String,
    pub evaluation: f64,
    pub depth: Option<i64>,
    pub best_move: Option<String>,
    pub principal_variation: Option<Vec<String>>,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(sqlx::FromRow)]
struct AnalysisRow {
    id: String,
    user_id: String,
    fen: String,
    evaluation: f64,
    depth: Option<i64>,
    best_move: Option<String>,
    principal_variation: Option<String>,
    created_at: chrono::NaiveDateTime,
}

impl From<AnalysisRow> for Analysis {
    fn from(row: AnalysisRow) -> Self {
        let principal_variation = row
            .principal_variation
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());
        Analysis {
            id: row.id,
            user_id: row.user_id,
            fen: row.fen,
            evaluation: row.evaluation,
            depth: row.depth,
            best_move: row.best_move,
            principal_variation,
            created_at: row.created_at,
        }
    }
}

/// Per-user aggregate over recent analyses, for the statistics view.
/// Advantage buckets count evaluations beyond ±0.5.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub total: i64,
    pub avg_evaluation: f64,
    pub white_advantage: i64,
    pub black_advantage: i64,
}

/// Insert-or-update keyed on (user, FEN), returning the record id.
pub async fn upsert(
    pool: &Pool<Sqlite>,
    user_id: &str,
    fen: &str,
    evaluation: f64,
    depth: Option<i64>,
    best_move: Option<&str>,
    principal_variation: Option<&[String]>,
) -> Result<String, sqlx::Error> {
    let pv_json = principal_variation.and_then(|moves| serde_json::to_string(moves).ok());

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM analyses WHERE user_id = $1 AND fen = $2 LIMIT 1")
            .bind(user_id)
            .bind(fen)
            .fetch_optional(pool)
            .await?;

    match existing {
        Some((id,)) => {
            sqlx::query(
                "UPDATE analyses SET evaluation = $1, depth = $2, best_move = $3,
                 principal_variation = $4 WHERE id = $5",
            )
            .bind(evaluation)
            .bind(depth)
            .bind(best_move)
            .bind(&pv_json)
            .bind(&id)
            .execute(pool)
            .await?;
            Ok(id)
        }
        None => {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO analyses (id, user_id, fen, evaluation, depth, best_move, principal_variation)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(&id)
            .bind(user_id)
            .bind(fen)
            .bind(evaluation)
            .bind(depth)
            .bind(best_move)
            .bind(&pv_json)
            .execute(pool)
            .await?;
            Ok(id)
        }
    }
}

pub async fn list_by_user(
    pool: &Pool<Sqlite>,
    user_id: &str,
    limit: Option<i64>,
) -> Result<Vec<Analysis>, sqlx::Error> {
    let rows: Vec<AnalysisRow> = sqlx::query_as(
        "SELECT * FROM analyses WHERE user_id = $1
         ORDER BY created_at DESC, rowid DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit.unwrap_or(50))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Analysis::from).collect())
}

pub async fn get_one(
    pool: &Pool<Sqlite>,
    user_id: &str,
    fen: &str,
) -> Result<Option<Analysis>, sqlx::Error> {
    let row: Option<AnalysisRow> =
        sqlx::query_as("SELECT * FROM analyses WHERE user_id = $1 AND fen = $2 LIMIT 1")
            .bind(user_id)
            .bind(fen)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Analysis::from))
}

/// Aggregate over the user's most recent `limit` analyses.
pub async fn user_stats(
    pool: &Pool<Sqlite>,
    user_id: &str,
    limit: i64,
) -> Result<UserStats, sqlx::Error> {
    let (total, avg_evaluation, white_advantage, black_advantage): (i64, f64, i64, i64) =
        sqlx::query_as(
            "SELECT COUNT(*),
                    COALESCE(AVG(evaluation), 0.0),
                    COALESCE(SUM(evaluation > 0.5), 0),
                    COALESCE(SUM(evaluation < -0.5), 0)
             FROM (SELECT evaluation FROM analyses WHERE user_id = $1
                   ORDER BY created_at DESC, rowid DESC LIMIT $2)",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_one(pool)
        .await?;
    Ok(UserStats {
        total,
        avg_evaluation,
        white_advantage,
        black_advantage,
    })
}
