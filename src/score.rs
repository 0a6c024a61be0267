//! Engine scores and their normalization to a single centipawn scale.
//!
//! UCI engines report either a centipawn value or a distance to mate,
//! always relative to the side to move. An [`Evaluation`] keeps the raw
//! [`Score`] together with the side it is relative to, so that a value
//! is only collapsed to an integer once the caller names the side it
//! wants to read it from.

use std::fmt;

use shakmaty::Color;

/// Magnitude substituted for every forced mate, regardless of depth.
pub const MATE_EQUIVALENT: i32 = 10_000;

/// A raw engine score, relative to some side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Finite evaluation in centipawns.
    Cp(i32),
    /// Moves to mate: positive if the viewing side mates, negative if it
    /// is mated. `None` when the engine did not report a depth.
    Mate(Option<i32>),
}

/// Collapse a raw score to a signed centipawn value.
///
/// Mate depth is discarded: any mate for the viewing side becomes
/// `+MATE_EQUIVALENT`, any mate against it `-MATE_EQUIVALENT`. `mate 0`
/// means the viewing side is already checkmated.
pub fn normalize(score: Score) -> Result<i32, crate::PunisherError> {
    match score {
        Score::Cp(cp) => Ok(cp),
        Score::Mate(Some(m)) if m > 0 => Ok(MATE_EQUIVALENT),
        Score::Mate(Some(_)) => Ok(-MATE_EQUIVALENT),
        Score::Mate(None) => Err(crate::PunisherError::EvaluationUnavailable(
            "engine reported a mate score without a depth".to_string(),
        )),
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Cp(cp) => write!(f, "{:+.2}", f64::from(*cp) / 100.0),
            Score::Mate(Some(m)) if *m > 0 => write!(f, "+M{m}"),
            Score::Mate(Some(m)) => write!(f, "-M{}", m.abs()),
            Score::Mate(None) => write!(f, "M?"),
        }
    }
}

/// A score paired with the side it is expressed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub score: Score,
    pub perspective: Color,
}

impl Evaluation {
    pub fn new(score: Score, perspective: Color) -> Self {
        Self { score, perspective }
    }

    /// Normalized centipawns as seen by `side`.
    ///
    /// Normalization happens before the sign flip so that `mate 0`
    /// keeps its meaning for the opponent.
    pub fn relative_to(&self, side: Color) -> Result<i32, crate::PunisherError> {
        let cp = normalize(self.score)?;
        Ok(if side == self.perspective { cp } else { -cp })
    }

    /// Compact human-readable rendering from White's point of view.
    pub fn describe(&self) -> String {
        let white = match (self.perspective, self.score) {
            (Color::White, score) => score,
            (Color::Black, Score::Cp(cp)) => Score::Cp(-cp),
            (Color::Black, Score::Mate(m)) => Score::Mate(m.map(|m| -m)),
        };
        match white {
            Score::Cp(cp) => format!("{:+.2} pawns (White)", f64::from(cp) / 100.0),
            Score::Mate(Some(m)) => {
                // `mate 0` for Black to move means White delivered it.
                let winner = if m > 0 || (m == 0 && self.perspective == Color::Black) {
                    "White"
                } else {
                    "Black"
                };
                format!("mate in {} ({winner})", m.abs())
            }
            Score::Mate(None) => "mate: unknown".to_string(),
        }
    }
}
