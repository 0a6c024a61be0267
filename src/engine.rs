//! Analysis engine access.
//!
//! [`AnalysisEngine`] is the capability the evaluator depends on. The
//! production implementation, [`UciEngine`], drives an external engine
//! (Stockfish by default) over the UCI protocol: one `position` / `go`
//! exchange per request, read until `bestmove`.

use std::{
    io::{BufRead, BufReader, Write},
    path::PathBuf,
    process::{Child, ChildStdin, Command, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use shakmaty::uci::UciMove;
use tracing::{debug, info};

use crate::{
    error::PunisherError,
    position::{Game, PositionRules},
    score::{Evaluation, Score},
};

/// Synchronous evaluation requests against some position type `P`.
///
/// Both calls are single request/response exchanges bounded by
/// `think_time`; `Ok(None)` means the engine answered without a usable
/// result.
pub trait AnalysisEngine<P> {
    fn evaluate(
        &mut self,
        position: &P,
        think_time: Duration,
    ) -> Result<Option<Evaluation>, PunisherError>;

    fn best_move(
        &mut self,
        position: &P,
        think_time: Duration,
    ) -> Result<Option<UciMove>, PunisherError>;
}

#[derive(Debug, Clone)]
pub struct UciEngineConfig {
    /// Path to the engine executable.
    pub path: PathBuf,
    /// Extra time allowed on top of the think time before the engine is
    /// considered unresponsive.
    pub response_grace: Duration,
}

impl Default for UciEngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./bin/stockfish"),
            response_grace: Duration::from_secs(5),
        }
    }
}

/// Result of one `go` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    /// Last score reported before `bestmove`, relative to the side to move.
    pub score: Option<Score>,
    pub best_move: Option<UciMove>,
}

/// A running UCI engine process.
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    response_grace: Duration,
}

impl UciEngine {
    /// Launch the engine and complete the `uci` / `isready` handshake.
    pub fn start(config: &UciEngineConfig) -> Result<Self, PunisherError> {
        if !config.path.exists() {
            return Err(PunisherError::EngineUnavailable(format!(
                "engine binary not found at '{}'",
                config.path.display()
            )));
        }

        let mut child = Command::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                PunisherError::EngineUnavailable(format!(
                    "failed to start '{}': {e}",
                    config.path.display()
                ))
            })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                return Err(PunisherError::EngineUnavailable(
                    "engine pipes unavailable".to_string(),
                ));
            }
        };

        // The reader thread ends when the engine closes stdout or the
        // receiver is dropped.
        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut engine = Self {
            child,
            stdin,
            lines,
            response_grace: config.response_grace,
        };

        engine.send("uci")?;
        let name = engine.wait_for("uciok", engine.response_grace)?;
        engine.send("isready")?;
        engine.wait_for("readyok", engine.response_grace)?;

        info!(
            path = %config.path.display(),
            name = name.as_deref().unwrap_or("unknown"),
            "analysis engine ready"
        );
        Ok(engine)
    }

    /// Run one search on the position described by `position_command`.
    pub fn analyse(
        &mut self,
        position_command: &str,
        think_time: Duration,
    ) -> Result<Analysis, PunisherError> {
        let movetime = think_time.as_millis().max(1);
        self.send(position_command)?;
        self.send(&format!("go movetime {movetime}"))?;

        let deadline = Instant::now() + think_time + self.response_grace;
        let mut analysis = Analysis::default();
        loop {
            let line = self.next_line(deadline)?;
            if let Some(score) = parse_info_score(&line) {
                analysis.score = Some(score);
            } else if line.starts_with("bestmove") {
                analysis.best_move = parse_bestmove(&line);
                return Ok(analysis);
            }
        }
    }

    fn send(&mut self, command: &str) -> Result<(), PunisherError> {
        debug!(command, "engine <");
        writeln!(self.stdin, "{command}")
            .and_then(|()| self.stdin.flush())
            .map_err(|e| PunisherError::EngineUnavailable(format!("engine input closed: {e}")))
    }

    fn next_line(&self, deadline: Instant) -> Result<String, PunisherError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.lines.recv_timeout(remaining) {
            Ok(line) => {
                debug!(line = line.as_str(), "engine >");
                Ok(line)
            }
            Err(RecvTimeoutError::Timeout) => Err(PunisherError::EngineUnavailable(
                "engine did not answer in time".to_string(),
            )),
            Err(RecvTimeoutError::Disconnected) => Err(PunisherError::EngineUnavailable(
                "engine closed its output".to_string(),
            )),
        }
    }

    /// Read until `token`, returning the `id name` seen on the way.
    fn wait_for(&self, token: &str, timeout: Duration) -> Result<Option<String>, PunisherError> {
        let deadline = Instant::now() + timeout;
        let mut name = None;
        loop {
            let line = self.next_line(deadline)?;
            let line = line.trim();
            if line == token {
                return Ok(name);
            }
            if let Some(id) = line.strip_prefix("id name ") {
                name = Some(id.to_string());
            }
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = writeln!(self.stdin, "quit");
        let _ = self.stdin.flush();
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl AnalysisEngine<Game> for UciEngine {
    fn evaluate(
        &mut self,
        position: &Game,
        think_time: Duration,
    ) -> Result<Option<Evaluation>, PunisherError> {
        let analysis = self.analyse(&position.uci_position(), think_time)?;
        Ok(analysis
            .score
            .map(|score| Evaluation::new(score, position.turn())))
    }

    fn best_move(
        &mut self,
        position: &Game,
        think_time: Duration,
    ) -> Result<Option<UciMove>, PunisherError> {
        Ok(self
            .analyse(&position.uci_position(), think_time)?
            .best_move)
    }
}

/// Score carried by an `info` line, if it has one.
///
/// `info string` lines are free text and never carry a score. A mate
/// score whose depth does not parse is reported as `Mate(None)`.
pub fn parse_info_score(line: &str) -> Option<Score> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("info") {
        return None;
    }

    let mut tokens = tokens.peekable();
    if tokens.peek() == Some(&"string") {
        return None;
    }

    while let Some(token) = tokens.next() {
        if token != "score" {
            continue;
        }
        return match (tokens.next(), tokens.next()) {
            (Some("cp"), Some(value)) => value.parse().ok().map(Score::Cp),
            (Some("mate"), value) => Some(Score::Mate(value.and_then(|v| v.parse().ok()))),
            _ => None,
        };
    }
    None
}

/// Move named by a `bestmove` line. `(none)` and the null move mean the
/// engine has nothing to play.
pub fn parse_bestmove(line: &str) -> Option<UciMove> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return None;
    }
    match tokens.next()? {
        "(none)" | "0000" => None,
        text => text.parse().ok(),
    }
}
