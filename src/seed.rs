//! Sample data for demos and local development.

use sqlx::{Pool, Sqlite};

use crate::positions;

/// Sample positions from common openings, with hand-assigned evaluations.
const SAMPLE_POSITIONS: &[(&str, f64)] = &[
    // Starting position
    ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 0.0),
    // e4 opening
    ("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1", 0.2),
    // Italian game setup
    ("rnbqkb1r/pppp1ppp/5n2/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 2 3", 0.1),
    // Italian game
    ("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNBQK1NR w KQkq - 4 4", 0.3),
    // Black's bishop active
    ("rnbqk2r/pppp1ppp/5n2/2b1p3/2B1P3/8/PPPP1PPP/RNBQK1NR w KQkq - 4 4", -0.1),
    // Developed pieces
    ("r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R b KQkq - 0 5", 0.2),
    // White better development
    ("r2qkb1r/ppp2ppp/2np1n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R w KQkq - 0 6", 0.4),
    // Black's pieces coordinated
    ("r1bqk1nr/pppp1ppp/2n5/2b1p3/2B1P3/8/PPPP1PPP/RNBQK1NR w KQkq - 4 4", -0.2),
    // Queen's Gambit
    ("rnbqkb1r/ppp2ppp/4pn2/3p4/2PP4/8/PP2PPPP/RNBQKBNR w KQkq d6 0 4", 0.3),
    // Black captured pawn
    ("rnbqkb1r/ppp2ppp/4pn2/8/2pP4/8/PP2PPPP/RNBQKBNR w KQkq - 0 5", -0.1),
];

/// Inserts the sample positions and returns how many were written.
/// Plain inserts: re-seeding an existing database duplicates rows.
pub async fn seed_sample_positions(pool: &Pool<Sqlite>) -> Result<usize, sqlx::Error> {
    for (fen, evaluation) in SAMPLE_POSITIONS {
        positions::insert(pool, fen, *evaluation, None, None, None).await?;
    }
    Ok(SAMPLE_POSITIONS.len())
}
