//! Move history for the current game.
//!
//! Entries are kept in memory (optionally capped, oldest dropped first)
//! and, when a path is configured, appended to a text file. The file is
//! append-only: `reset` clears the in-memory history but never truncates
//! what has already been written.

use std::{
    collections::VecDeque,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use tracing::warn;

use crate::{error::PunisherError, types::MoveEvaluation};

/// Line format of the file sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// `move=e2e4 mover=white ... class=OK`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected text or json)")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameLogConfig {
    pub path: Option<PathBuf>,
    pub format: LogFormat,
    /// Maximum entries kept in memory; `None` keeps everything.
    pub capacity: Option<usize>,
}

#[derive(Debug)]
pub struct GameLog {
    config: GameLogConfig,
    entries: VecDeque<MoveEvaluation>,
}

impl GameLog {
    pub fn new(config: GameLogConfig) -> Self {
        Self {
            config,
            entries: VecDeque::new(),
        }
    }

    /// Record one evaluated move. A failing file sink is reported as a
    /// warning; the in-memory entry is kept regardless.
    pub fn log_move(&mut self, entry: MoveEvaluation) {
        if let Some(path) = &self.config.path {
            if let Err(e) = append_line(path, &format_entry(&entry, self.config.format)) {
                warn!(path = %path.display(), error = %e, "unable to write game log");
            }
        }

        if self.config.capacity == Some(0) {
            return;
        }
        if let Some(capacity) = self.config.capacity {
            while self.entries.len() >= capacity {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(entry);
    }

    /// The last `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> Vec<&MoveEvaluation> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

pub fn format_entry(entry: &MoveEvaluation, format: LogFormat) -> String {
    match format {
        LogFormat::Text => entry.to_string(),
        // Plain strings and integers only; serialization cannot fail.
        LogFormat::Json => serde_json::to_string(entry).unwrap_or_default(),
    }
}

fn append_line(path: &Path, line: &str) -> Result<(), PunisherError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use shakmaty::Color;

    use super::*;
    use crate::classify::Severity;

    fn entry(uci: &str, loss: u32, severity: Severity) -> MoveEvaluation {
        MoveEvaluation {
            uci: uci.parse().unwrap(),
            mover: Color::White,
            best_move: "e2e4".parse().unwrap(),
            eval_before: 30,
            eval_after: 30 - loss as i32,
            loss,
            severity,
        }
    }

    fn temp_log_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chess-punisher-{}", std::process::id()));
        dir.join(name)
    }

    #[test]
    fn test_tail() {
        let mut log = GameLog::new(GameLogConfig::default());
        for (i, uci) in ["e2e4", "d2d4", "c2c4"].iter().enumerate() {
            log.log_move(entry(uci, i as u32, Severity::Ok));
        }

        let last_two: Vec<String> = log.tail(2).iter().map(|e| e.uci.to_string()).collect();
        assert_eq!(last_two, ["d2d4", "c2c4"]);
        assert_eq!(log.tail(10).len(), 3);
        assert!(log.tail(0).is_empty());
    }

    #[test]
    fn test_reset() {
        let mut log = GameLog::new(GameLogConfig::default());
        log.log_move(entry("e2e4", 0, Severity::Ok));
        log.reset();
        assert!(log.is_empty());
        assert!(log.tail(10).is_empty());
    }

    #[test]
    fn test_capacity() {
        let mut log = GameLog::new(GameLogConfig {
            capacity: Some(2),
            ..GameLogConfig::default()
        });
        log.log_move(entry("e2e4", 0, Severity::Ok));
        log.log_move(entry("d2d4", 0, Severity::Ok));
        log.log_move(entry("c2c4", 0, Severity::Ok));
        assert_eq!(log.len(), 2);
        assert_eq!(log.tail(10)[0].uci.to_string(), "d2d4");
    }

    #[test]
    fn test_formats() {
        let e = entry("g2g4", 310, Severity::Blunder);
        assert_eq!(
            format_entry(&e, LogFormat::Text),
            "move=g2g4 mover=white bestmove=e2e4 eval_before=30 eval_after=-280 loss=310 class=BLUNDER"
        );

        let json: serde_json::Value =
            serde_json::from_str(&format_entry(&e, LogFormat::Json)).unwrap();
        assert_eq!(json["move"], "g2g4");
        assert_eq!(json["mover"], "white");
        assert_eq!(json["bestmove"], "e2e4");
        assert_eq!(json["loss"], 310);
        assert_eq!(json["severity"], "BLUNDER");
    }

    #[test]
    fn test_file_sink_appends() {
        let path = temp_log_path("append/game.log");
        let _ = fs::remove_file(&path);

        let config = GameLogConfig {
            path: Some(path.clone()),
            ..GameLogConfig::default()
        };
        let mut log = GameLog::new(config.clone());
        log.log_move(entry("e2e4", 0, Severity::Ok));
        log.reset();
        let mut log = GameLog::new(config);
        log.log_move(entry("d2d4", 60, Severity::Inaccuracy));

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("move=e2e4"));
        assert!(lines[1].ends_with("class=INACCURACY"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unwritable_sink_keeps_entry() {
        // A directory cannot be opened for appending.
        let dir = temp_log_path("as-dir");
        fs::create_dir_all(&dir).unwrap();

        let mut log = GameLog::new(GameLogConfig {
            path: Some(dir),
            ..GameLogConfig::default()
        });
        log.log_move(entry("e2e4", 0, Severity::Ok));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
