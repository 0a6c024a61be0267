use std::fmt;

use serde::{Serialize, Serializer};
use shakmaty::{Color, uci::UciMove};

use crate::classify::Severity;

/// Lower-case side name used in logs and notification routing.
pub fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

fn serialize_side<S: Serializer>(color: &Color, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(side_name(*color))
}

/// Outcome of evaluating one move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveEvaluation {
    /// The move as played.
    #[serde(rename = "move", serialize_with = "serialize_display")]
    pub uci: UciMove,
    #[serde(serialize_with = "serialize_side")]
    pub mover: Color,
    /// Engine's preferred move in the pre-move position.
    #[serde(rename = "bestmove", serialize_with = "serialize_display")]
    pub best_move: UciMove,
    /// Centipawns before the move, from the mover's side.
    pub eval_before: i32,
    /// Centipawns after the move, still from the mover's side.
    pub eval_after: i32,
    pub loss: u32,
    pub severity: Severity,
}

impl MoveEvaluation {
    /// The notification owed for this move, if any.
    pub fn punish_event(&self) -> Option<PunishEvent> {
        (self.severity != Severity::Ok).then(|| PunishEvent {
            mover: self.mover,
            severity: self.severity,
            uci: self.uci.clone(),
            loss: self.loss,
            best_move: self.best_move.clone(),
        })
    }
}

impl fmt::Display for MoveEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "move={} mover={} bestmove={} eval_before={} eval_after={} loss={} class={}",
            self.uci,
            side_name(self.mover),
            self.best_move,
            self.eval_before,
            self.eval_after,
            self.loss,
            self.severity
        )
    }
}

/// Request to punish the mover for a bad move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunishEvent {
    pub mover: Color,
    pub severity: Severity,
    pub uci: UciMove,
    pub loss: u32,
    pub best_move: UciMove,
}
