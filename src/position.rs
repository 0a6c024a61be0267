//! Chess rules, delegated to `shakmaty`.
//!
//! The evaluator only needs three things from the rules: whose turn it
//! is, whether a move in coordinate notation is legal, and a copy of the
//! position with that move applied. [`PositionRules`] names exactly that
//! capability. [`Game`] is the production implementation; besides the
//! `shakmaty` position it keeps the start position and the moves played,
//! which is how a UCI engine is told about a position.

use shakmaty::{CastlingMode, Chess, Color, Move, Position, fen::Fen, uci::UciMove};

use crate::error::PunisherError;

/// Rules capability used by the evaluator.
pub trait PositionRules: Clone {
    /// A move already validated against this position.
    type Move;

    /// Side to move.
    fn turn(&self) -> Color;

    /// Resolve coordinate notation to a legal move, or fail with
    /// [`PunisherError::IllegalMove`].
    fn legal_move(&self, uci: &UciMove) -> Result<Self::Move, PunisherError>;

    /// A copy of this position with `mv` played. `self` is left untouched.
    fn after(&self, mv: &Self::Move) -> Self;
}

/// A game in progress: start position plus the moves played since.
#[derive(Debug, Clone)]
pub struct Game {
    start: Option<Fen>,
    start_position: Chess,
    chess: Chess,
    moves: Vec<UciMove>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Standard starting position.
    pub fn new() -> Self {
        Self {
            start: None,
            start_position: Chess::default(),
            chess: Chess::default(),
            moves: Vec::new(),
        }
    }

    /// Start from an arbitrary FEN.
    pub fn from_fen(fen: &str) -> Result<Self, PunisherError> {
        let fen: Fen = fen.trim().parse()?;
        let chess: Chess = fen.clone().into_position(CastlingMode::Standard)?;

        Ok(Self {
            start: Some(fen),
            start_position: chess.clone(),
            chess,
            moves: Vec::new(),
        })
    }

    pub fn position(&self) -> &Chess {
        &self.chess
    }

    /// Moves played since the start position, in canonical UCI form.
    pub fn moves(&self) -> &[UciMove] {
        &self.moves
    }

    /// Play a move on this game in place.
    pub fn play(&mut self, uci: &UciMove) -> Result<(), PunisherError> {
        let mv = self.legal_move(uci)?;
        *self = self.after(&mv);
        Ok(())
    }

    /// Back to the start position with an empty move list.
    pub fn reset(&mut self) {
        self.chess = self.start_position.clone();
        self.moves.clear();
    }

    /// The `position` command describing this game to a UCI engine.
    pub fn uci_position(&self) -> String {
        let mut command = match &self.start {
            None => "position startpos".to_string(),
            Some(fen) => format!("position fen {fen}"),
        };
        if !self.moves.is_empty() {
            command.push_str(" moves");
            for uci in &self.moves {
                command.push(' ');
                command.push_str(&uci.to_string());
            }
        }
        command
    }
}

impl PositionRules for Game {
    type Move = Move;

    fn turn(&self) -> Color {
        self.chess.turn()
    }

    fn legal_move(&self, uci: &UciMove) -> Result<Move, PunisherError> {
        uci.to_move(&self.chess)
            .map_err(|_| PunisherError::IllegalMove(uci.to_string()))
    }

    fn after(&self, mv: &Move) -> Self {
        let mut next = self.clone();
        next.chess.play_unchecked(mv.clone());
        next.moves.push(mv.to_uci(CastlingMode::Standard));
        next
    }
}

/// Parse coordinate notation such as `e2e4` or `e7e8q`.
pub fn parse_uci(text: &str) -> Result<UciMove, PunisherError> {
    text.trim()
        .parse::<UciMove>()
        .map_err(|_| PunisherError::InvalidMove(text.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position() {
        let game = Game::new();
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.uci_position(), "position startpos");
    }

    #[test]
    fn test_after_does_not_mutate() {
        let game = Game::new();
        let mv = game.legal_move(&parse_uci("e2e4").unwrap()).unwrap();
        let next = game.after(&mv);

        assert_eq!(game.turn(), Color::White);
        assert!(game.moves().is_empty());
        assert_eq!(next.turn(), Color::Black);
        assert_eq!(next.uci_position(), "position startpos moves e2e4");
    }

    #[test]
    fn test_illegal_move() {
        let game = Game::new();
        let uci = parse_uci("e2e5").unwrap();
        assert!(matches!(
            game.legal_move(&uci),
            Err(PunisherError::IllegalMove(m)) if m == "e2e5"
        ));
    }

    #[test]
    fn test_invalid_notation() {
        assert!(matches!(
            parse_uci("hello"),
            Err(PunisherError::InvalidMove(_))
        ));
    }

    #[test]
    fn test_play_and_reset() {
        let mut game = Game::new();
        game.play(&parse_uci("e2e4").unwrap()).unwrap();
        game.play(&parse_uci("e7e5").unwrap()).unwrap();
        assert_eq!(game.uci_position(), "position startpos moves e2e4 e7e5");
        assert!(game.play(&parse_uci("e4e5").unwrap()).is_err());

        game.reset();
        assert_eq!(game.turn(), Color::White);
        assert!(game.moves().is_empty());
    }

    #[test]
    fn test_from_fen() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
        let mut game = Game::from_fen(fen).unwrap();
        assert_eq!(game.turn(), Color::White);
        game.play(&parse_uci("g1f3").unwrap()).unwrap();
        assert_eq!(game.uci_position(), format!("position fen {fen} moves g1f3"));

        assert!(matches!(
            Game::from_fen("not a fen"),
            Err(PunisherError::InvalidFen(_))
        ));
    }
}
