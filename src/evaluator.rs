use std::time::Duration;

use shakmaty::uci::UciMove;
use tracing::debug;

use crate::{
    classify::{Thresholds, classify, compute_loss},
    engine::AnalysisEngine,
    error::PunisherError,
    position::PositionRules,
    types::MoveEvaluation,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorConfig {
    /// Engine think time for each request.
    pub think_time: Duration,
    pub thresholds: Thresholds,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            think_time: Duration::from_millis(100),
            thresholds: Thresholds::default(),
        }
    }
}

/// Scores single moves against an analysis engine.
pub struct MoveEvaluator {
    config: EvaluatorConfig,
}

impl MoveEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate `uci` played in `before`.
    ///
    /// Legality is checked before the engine is consulted. Both
    /// evaluations are read from the mover's side, so the loss measures
    /// how much worse off the mover left themselves regardless of who
    /// moves next. `before` is never modified.
    pub fn evaluate_move<P, E>(
        &self,
        before: &P,
        uci: &UciMove,
        engine: &mut E,
    ) -> Result<MoveEvaluation, PunisherError>
    where
        P: PositionRules,
        E: AnalysisEngine<P> + ?Sized,
    {
        let mv = before.legal_move(uci)?;
        let mover = before.turn();
        let think_time = self.config.think_time;

        let eval_before = engine
            .evaluate(before, think_time)?
            .ok_or_else(|| {
                PunisherError::EvaluationUnavailable(
                    "no score for the pre-move position".to_string(),
                )
            })?
            .relative_to(mover)?;

        let best_move = engine.best_move(before, think_time)?.ok_or_else(|| {
            PunisherError::EvaluationUnavailable("engine did not return a move".to_string())
        })?;

        let after = before.after(&mv);
        let eval_after = engine
            .evaluate(&after, think_time)?
            .ok_or_else(|| {
                PunisherError::EvaluationUnavailable(
                    "no score for the post-move position".to_string(),
                )
            })?
            .relative_to(mover)?;

        let loss = compute_loss(eval_before, eval_after);
        let severity = classify(loss, &self.config.thresholds);
        debug!(%uci, eval_before, eval_after, loss, %severity, "move evaluated");

        Ok(MoveEvaluation {
            uci: uci.clone(),
            mover,
            best_move,
            eval_before,
            eval_after,
            loss,
            severity,
        })
    }
}
