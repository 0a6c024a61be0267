//! Error types for the move quality evaluator.
//!
//! This crate uses `thiserror` to provide a single enumeration of the
//! errors that can surface while evaluating moves. Rule violations and
//! incomplete engine answers are recoverable; an engine that cannot be
//! reached ends the session. Notification failures are represented here
//! so the punisher can log them, but they never leave the punisher.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PunisherError {
    /// The move is well formed but not legal in the given position.
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    /// The text could not be read as coordinate notation at all.
    #[error("Invalid UCI move: {0}")]
    InvalidMove(String),

    /// The engine answered, but without a usable score or move.
    #[error("Evaluation unavailable: {0}")]
    EvaluationUnavailable(String),

    /// The engine process is missing, failed to start, or stopped answering.
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Cutoffs must satisfy `inaccuracy <= mistake <= blunder`.
    #[error("Invalid thresholds {inaccuracy},{mistake},{blunder}: expected inaccuracy <= mistake <= blunder")]
    InvalidThresholds {
        inaccuracy: u32,
        mistake: u32,
        blunder: u32,
    },

    /// The provided FEN string could not be parsed.
    #[error("Invalid FEN: {0}")]
    InvalidFen(#[from] shakmaty::fen::ParseFenError),

    /// A parsed position is invalid from the perspective of `shakmaty`.
    #[error("Invalid Chess Position: {0}")]
    InvalidPosition(#[from] Box<shakmaty::PositionError<shakmaty::Chess>>),

    /// Best-effort notification failed. Only ever logged.
    #[error("Notification failed: {0}")]
    Notification(#[from] reqwest::Error),

    /// A notification endpoint is not a valid URL.
    #[error("Invalid URL {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PunisherError {
    /// Whether the interactive session must stop after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EngineUnavailable(_) | Self::Io(_))
    }
}

impl From<shakmaty::PositionError<shakmaty::Chess>> for PunisherError {
    fn from(err: shakmaty::PositionError<shakmaty::Chess>) -> Self {
        Self::InvalidPosition(Box::new(err))
    }
}
