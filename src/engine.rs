//! Position evaluation.
//!
//! `MaterialEvaluator` is a stand-in for a trained model: material count
//! plus noise. The `Evaluator` trait is the seam a real inference backend
//! slots into without touching the service or the stores.

use rand::Rng;

/// Errors produced while scoring a position.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

/// Maps a FEN string to a numeric evaluation.
///
/// Scores follow the centipawn-like convention: positive favors White,
/// magnitude is rough strength of advantage. Implementations must be pure
/// and safe to call concurrently.
pub trait Evaluator: Send + Sync {
    fn score(&self, fen: &str) -> Result<f64, EvalError>;
}

/// Material-count evaluation with a small random perturbation.
///
/// Sums fixed per-piece values over the FEN piece-placement field, adds
/// uniform noise in [-0.25, 0.25) and rounds to two decimal places. The
/// sign is stable for any material imbalance of a pawn or more.
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn score(&self, fen: &str) -> Result<f64, EvalError> {
        let material = material_balance(fen)?;
        let noise = rand::thread_rng().gen_range(-0.25..0.25);
        Ok(round_to_centipawns(material + noise))
    }
}

fn piece_value(piece: char) -> Option<f64> {
    match piece {
        'P' => Some(1.0),
        'N' | 'B' => Some(3.0),
        'R' => Some(5.0),
        'Q' => Some(9.0),
        'K' => Some(0.0),
        'p' => Some(-1.0),
        'n' | 'b' => Some(-3.0),
        'r' => Some(-5.0),
        'q' => Some(-9.0),
        'k' => Some(0.0),
        _ => None,
    }
}

/// Validates the piece-placement field of `fen` and returns the material
/// balance in pawns.
///
/// The placement must consist of exactly 8 ranks separated by `/`, each
/// spanning exactly 8 files of piece letters and empty-square digits.
pub fn material_balance(fen: &str) -> Result<f64, EvalError> {
    let placement = fen
        .split_whitespace()
        .next()
        .ok_or_else(|| EvalError::InvalidPosition("empty FEN".to_string()))?;

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(EvalError::InvalidPosition(format!(
            "expected 8 ranks, found {}",
            ranks.len()
        )));
    }

    let mut score = 0.0;
    for (index, rank) in ranks.iter().enumerate() {
        let mut files = 0u32;
        for c in rank.chars() {
            if let Some(digit) = c.to_digit(10) {
                if digit == 0 || digit > 8 {
                    return Err(EvalError::InvalidPosition(format!(
                        "invalid empty-square count '{c}' in rank {}",
                        8 - index
                    )));
                }
                files += digit;
            } else if let Some(value) = piece_value(c) {
                score += value;
                files += 1;
            } else {
                return Err(EvalError::InvalidPosition(format!(
                    "unknown piece '{c}' in rank {}",
                    8 - index
                )));
            }
        }
        if files != 8 {
            return Err(EvalError::InvalidPosition(format!(
                "rank {} spans {files} files",
                8 - index
            )));
        }
    }

    Ok(score)
}

fn round_to_centipawns(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    // Starting position without the black queen
    const QUEEN_ODDS_FEN: &str = "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    // Starting position without a white rook
    const ROOK_ODDS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1 w Qkq - 0 1";

    #[test]
    fn starting_position_is_balanced() {
        let score = MaterialEvaluator.score(START_FEN).unwrap();
        assert!(
            score.abs() <= 0.25,
            "balanced material should score within noise, got {score}"
        );
    }

    #[test]
    fn sign_is_stable_for_material_advantage() {
        for _ in 0..20 {
            let score = MaterialEvaluator.score(QUEEN_ODDS_FEN).unwrap();
            assert!(score > 0.0, "white up a queen must score positive, got {score}");
            assert!((8.75..=9.25).contains(&score), "queen advantage out of range: {score}");
        }
        for _ in 0..20 {
            let score = MaterialEvaluator.score(ROOK_ODDS_FEN).unwrap();
            assert!(score < 0.0, "black up a rook must score negative, got {score}");
            assert!((-5.25..=-4.75).contains(&score), "rook deficit out of range: {score}");
        }
    }

    #[test]
    fn score_is_rounded_to_two_decimals() {
        for _ in 0..50 {
            let score = MaterialEvaluator.score(START_FEN).unwrap();
            let scaled = score * 100.0;
            assert!(
                (scaled - scaled.round()).abs() < 1e-9,
                "score {score} carries more than two decimals"
            );
        }
    }

    #[test]
    fn score_stays_within_material_bound() {
        let score = MaterialEvaluator.score(START_FEN).unwrap();
        assert!(score.is_finite());
        assert!(score.abs() <= 45.25);
    }

    #[test]
    fn material_balance_counts_pieces() {
        assert_eq!(material_balance(START_FEN).unwrap(), 0.0);
        assert_eq!(material_balance(QUEEN_ODDS_FEN).unwrap(), 9.0);
        assert_eq!(material_balance(ROOK_ODDS_FEN).unwrap(), -5.0);
    }

    #[test]
    fn rejects_empty_fen() {
        assert!(matches!(
            material_balance(""),
            Err(EvalError::InvalidPosition(_))
        ));
    }

    #[test]
    fn rejects_wrong_rank_count() {
        assert!(material_balance("8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(material_balance("garbage").is_err());
    }

    #[test]
    fn rejects_unknown_pieces() {
        assert!(material_balance("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNZ w - - 0 1").is_err());
    }

    #[test]
    fn rejects_ranks_that_do_not_span_eight_files() {
        // nine pawns on one rank
        assert!(material_balance("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1").is_err());
        // zero is not a valid empty-square count
        assert!(material_balance("rnbqkbnr/pppppppp/08/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1").is_err());
    }
}
