//! Interactive session: one move in, one evaluation out.
//!
//! The session owns the only mutable game position. A move is applied
//! only after it has been fully evaluated, so a rejected move or an
//! incomplete engine answer leaves the game, the log and the notifier
//! untouched.

use std::io::{BufRead, Write};

use tracing::warn;

use crate::{
    engine::AnalysisEngine,
    error::PunisherError,
    evaluator::MoveEvaluator,
    game_log::GameLog,
    position::{Game, parse_uci},
    punisher::Notifier,
};

/// Entries shown by the `log` command.
const LOG_TAIL: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    ValidatingMove,
    Evaluating,
    Dispatching,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reset,
    Log,
    ClearLog,
    Empty,
    Move(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let text = line.trim().to_ascii_lowercase();
        match text.as_str() {
            "quit" => Command::Quit,
            "reset" => Command::Reset,
            "log" => Command::Log,
            "clearlog" => Command::ClearLog,
            "" => Command::Empty,
            _ => Command::Move(text),
        }
    }
}

pub struct Session<E, N> {
    game: Game,
    evaluator: MoveEvaluator,
    engine: E,
    log: GameLog,
    notifier: N,
    state: SessionState,
}

impl<E, N> Session<E, N>
where
    E: AnalysisEngine<Game>,
    N: Notifier,
{
    pub fn new(
        game: Game,
        evaluator: MoveEvaluator,
        engine: E,
        log: GameLog,
        notifier: N,
    ) -> Self {
        Self {
            game,
            evaluator,
            engine,
            log,
            notifier,
            state: SessionState::AwaitingInput,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Read commands until `quit`, end of input, or a fatal error.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut out: W,
    ) -> Result<(), PunisherError> {
        writeln!(out, "Enter UCI moves (e.g. e2e4). Commands: reset, log, clearlog, quit")?;

        let mut line = String::new();
        while self.state != SessionState::Terminated {
            write!(out, "> ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                self.state = SessionState::Terminated;
                break;
            }
            self.handle(&line, &mut out)?;
        }
        Ok(())
    }

    /// Process one line of input and return the resulting state.
    ///
    /// Recoverable problems are reported to `out`. Fatal ones terminate
    /// the session and are returned.
    pub fn handle<W: Write>(
        &mut self,
        line: &str,
        out: &mut W,
    ) -> Result<SessionState, PunisherError> {
        match Command::parse(line) {
            Command::Quit => self.state = SessionState::Terminated,
            Command::Reset => {
                self.game.reset();
                self.log.reset();
                writeln!(out, "Board reset.")?;
            }
            Command::Log => {
                for entry in self.log.tail(LOG_TAIL) {
                    writeln!(out, "{entry}")?;
                }
            }
            Command::ClearLog => {
                self.log.reset();
                writeln!(out, "Log cleared.")?;
            }
            Command::Empty => {}
            Command::Move(text) => {
                if let Err(e) = self.play_move(&text, out) {
                    if e.is_fatal() {
                        self.state = SessionState::Terminated;
                        return Err(e);
                    }
                    warn!(error = %e, "move rejected");
                    writeln!(out, "{e}")?;
                    self.state = SessionState::AwaitingInput;
                }
            }
        }
        Ok(self.state)
    }

    fn play_move<W: Write>(&mut self, text: &str, out: &mut W) -> Result<(), PunisherError> {
        self.state = SessionState::ValidatingMove;
        let uci = parse_uci(text)?;

        self.state = SessionState::Evaluating;
        let result = self
            .evaluator
            .evaluate_move(&self.game, &uci, &mut self.engine)?;

        self.state = SessionState::Dispatching;
        self.game.play(&uci)?;
        self.log.log_move(result.clone());
        writeln!(out, "{result}")?;
        if let Some(event) = result.punish_event() {
            self.notifier.notify(&event);
        }

        self.state = SessionState::AwaitingInput;
        Ok(())
    }
}
