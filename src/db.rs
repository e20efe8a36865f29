//! Database pool construction and schema bootstrap.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

/// One statement per entry; SQLite executes them individually.
///
/// FEN uniqueness in `positions` is intentionally enforced by the upsert
/// lookup, not by a constraint, so the index on `fen` is non-unique.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS positions (
        id TEXT PRIMARY KEY,
        fen TEXT NOT NULL,
        evaluation REAL NOT NULL,
        user_id TEXT,
        game_id TEXT,
        move_number INTEGER,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS analyses (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        fen TEXT NOT NULL,
        evaluation REAL NOT NULL,
        depth INTEGER,
        best_move TEXT,
        principal_variation TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS idx_positions_fen ON positions (fen)",
    "CREATE INDEX IF NOT EXISTS idx_positions_user ON positions (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_analyses_user ON analyses (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_analyses_user_fen ON analyses (user_id, fen)",
];

pub async fn connect(database_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// In-memory pool for unit tests. A single connection keeps every query
/// on the same in-memory database.
#[cfg(test)]
pub async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create test database");
    init_schema(&pool).await.expect("Failed to initialize schema");
    pool
}
