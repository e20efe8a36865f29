//! Evaluation service: computes scores and persists them.

use std::sync::Arc;

use serde::Serialize;
use sqlx::{Pool, Sqlite};

use crate::engine::Evaluator;
use crate::error::ApiResult;
use crate::positions;

/// Depth reported with every evaluation until a real search engine is
/// wired in.
pub const PLACEHOLDER_DEPTH: i64 = 10;

#[derive(Debug, Serialize)]
pub struct EvaluationOutcome {
    pub fen: String,
    pub evaluation: f64,
    /// Always absent until a real engine backs the service.
    pub best_move: Option<String>,
    pub depth: i64,
}

#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub fen: String,
    pub evaluation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
}

/// Orchestrates evaluator invocation and optional persistence.
///
/// Holds the evaluator behind its trait so a model-backed implementation
/// can replace the material heuristic without touching this code.
#[derive(Clone)]
pub struct EvaluationService {
    evaluator: Arc<dyn Evaluator>,
}

impl EvaluationService {
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self { evaluator }
    }

    /// Evaluates one position, optionally upserting it into the position
    /// store. Failures surface to the caller; a bad FEN is never turned
    /// into a zero score on this path.
    pub async fn evaluate(
        &self,
        pool: &Pool<Sqlite>,
        fen: &str,
        save_to_database: bool,
    ) -> ApiResult<EvaluationOutcome> {
        let evaluation = self.evaluator.score(fen)?;

        if save_to_database {
            positions::upsert(pool, fen, evaluation, None, None, None).await?;
        }

        Ok(EvaluationOutcome {
            fen: fen.to_string(),
            evaluation,
            best_move: None,
            depth: PLACEHOLDER_DEPTH,
        })
    }

    /// Evaluates each position independently, persisting every success.
    ///
    /// A failed item is reported as a zero-score result with the error
    /// flag set; it never aborts the rest of the batch, and the batch
    /// itself never fails. One result per input, in input order.
    pub async fn batch_evaluate(&self, pool: &Pool<Sqlite>, fens: &[String]) -> Vec<BatchOutcome> {
        let mut results = Vec::with_capacity(fens.len());

        for fen in fens {
            let outcome = match self.evaluator.score(fen) {
                Ok(evaluation) => match positions::upsert(pool, fen, evaluation, None, None, None)
                    .await
                {
                    Ok(_) => BatchOutcome {
                        fen: fen.clone(),
                        evaluation,
                        error: None,
                    },
                    Err(err) => {
                        tracing::warn!(%fen, error = %err, "batch item persistence failed");
                        failed_item(fen)
                    }
                },
                Err(err) => {
                    tracing::warn!(%fen, error = %err, "batch item evaluation failed");
                    failed_item(fen)
                }
            };
            results.push(outcome);
        }

        results
    }
}

fn failed_item(fen: &str) -> BatchOutcome {
    BatchOutcome {
        fen: fen.to_string(),
        evaluation: 0.0,
        error: Some(true),
    }
}
