//! Move quality evaluation for live chess games.
//!
//! Each move is judged by asking an analysis engine for an evaluation
//! of the position before and after it, both read from the mover's
//! side. The drop in centipawns is classified as OK, INACCURACY,
//! MISTAKE or BLUNDER, and anything worse than OK can trigger an
//! external "punishment" request.
//!
//! The principal type is [`MoveEvaluator`]. It depends on two
//! capabilities, [`PositionRules`] and [`AnalysisEngine`], implemented
//! in production by [`Game`] (backed by `shakmaty`) and [`UciEngine`]
//! (any UCI engine, Stockfish by default). [`Session`] wires the
//! evaluator to a [`GameLog`] and a [`Notifier`] for interactive play.
//!
//! The library re‑exports `shakmaty` for building positions and moves.

mod classify;
mod engine;
mod error;
mod evaluator;
mod game_log;
mod position;
mod punisher;
mod score;
mod session;
mod types;

/// Loss computation and severity tiers.
pub use classify::{Severity, Thresholds, classify, compute_loss};

/// Analysis engine capability and the UCI implementation.
pub use engine::{
    Analysis, AnalysisEngine, UciEngine, UciEngineConfig, parse_bestmove, parse_info_score,
};

/// Error type produced by library operations.
pub use error::PunisherError;

/// Move evaluation orchestration.
pub use evaluator::{EvaluatorConfig, MoveEvaluator};

pub use game_log::{GameLog, GameLogConfig, LogFormat, format_entry};
pub use position::{Game, PositionRules, parse_uci};
pub use punisher::{Notifier, Punisher, PunisherConfig};
pub use score::{Evaluation, MATE_EQUIVALENT, Score, normalize};
pub use session::{Command, Session, SessionState};

/// Output data structures returned by evaluations.
pub use types::{MoveEvaluation, PunishEvent, side_name};

/// Re-export of `shakmaty` for convenience when building positions.
pub use shakmaty;
