use std::{
    io::{self, BufWriter},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result, bail};
use chess_punisher::{
    Evaluation, EvaluatorConfig, Game, GameLog, GameLogConfig, LogFormat, MoveEvaluator,
    PositionRules, Punisher, PunisherConfig, Session, Thresholds, UciEngine, UciEngineConfig,
};
use clap::{Parser, Subcommand, builder::BoolishValueParser};
use tracing_subscriber::EnvFilter;

const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Judge every move of a live game and punish the bad ones.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// UCI engine executable
    #[arg(long, env = "STOCKFISH_PATH", default_value = "./bin/stockfish", global = true)]
    engine: PathBuf,

    /// Engine think time per request, in seconds
    #[arg(long, default_value_t = 0.1, global = true)]
    time: f64,

    /// Play options used when no subcommand is given
    #[command(flatten)]
    play: PlayArgs,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Debug, Clone, clap::Args)]
struct PlayArgs {
    /// Centipawn thresholds inaccuracy,mistake,blunder
    #[arg(long, default_value = "50,150,300")]
    thresholds: Thresholds,

    /// Punishment endpoint for White
    #[arg(long, env = "PUNISHER_WHITE_URL")]
    white_url: Option<String>,

    /// Punishment endpoint for Black
    #[arg(long, env = "PUNISHER_BLACK_URL")]
    black_url: Option<String>,

    /// Announce punishments without sending requests
    #[arg(long, env = "PUNISHER_DRY_RUN", value_parser = BoolishValueParser::new())]
    dry_run: bool,

    /// Notification timeout in milliseconds
    #[arg(long, default_value_t = 300)]
    punish_timeout_ms: u64,

    /// Append evaluated moves to this file
    #[arg(long, env = "GAME_LOG_PATH")]
    log_path: Option<PathBuf>,

    /// Line format of the log file (text or json)
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Keep at most this many entries in memory
    #[arg(long)]
    log_capacity: Option<usize>,

    /// Start from this position instead of the standard one
    #[arg(long)]
    fen: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Evaluate moves typed on stdin (default)
    Play(PlayArgs),
    /// Analyse one position and print the engine's evaluation
    Smoke {
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let think_time = Duration::try_from_secs_f64(cli.time)
        .ok()
        .filter(|t| !t.is_zero())
        .with_context(|| format!("invalid think time: {}", cli.time))?;
    let engine_config = UciEngineConfig {
        path: cli.engine.clone(),
        ..UciEngineConfig::default()
    };

    match cli.command {
        Some(Mode::Smoke { fen }) => smoke(&engine_config, &fen, think_time),
        Some(Mode::Play(args)) => play(&engine_config, args, think_time),
        None => play(&engine_config, cli.play, think_time),
    }
}

fn start_engine(config: &UciEngineConfig) -> Result<UciEngine> {
    UciEngine::start(config)
        .context("set STOCKFISH_PATH or place the binary at ./bin/stockfish")
}

fn play(engine_config: &UciEngineConfig, args: PlayArgs, think_time: Duration) -> Result<()> {
    let game = match &args.fen {
        Some(fen) => Game::from_fen(fen)?,
        None => Game::new(),
    };
    let punisher = Punisher::new(PunisherConfig {
        white_url: args.white_url,
        black_url: args.black_url,
        dry_run: args.dry_run,
        timeout: Duration::from_millis(args.punish_timeout_ms),
    })?;
    let log = GameLog::new(GameLogConfig {
        path: args.log_path,
        format: args.log_format,
        capacity: args.log_capacity,
    });
    let evaluator = MoveEvaluator::new(EvaluatorConfig {
        think_time,
        thresholds: args.thresholds,
    });
    let engine = start_engine(engine_config)?;

    let mut session = Session::new(game, evaluator, engine, log, punisher);
    let stdin = io::stdin();
    session.run(stdin.lock(), BufWriter::new(io::stdout()))?;
    Ok(())
}

fn smoke(engine_config: &UciEngineConfig, fen: &str, think_time: Duration) -> Result<()> {
    let game = Game::from_fen(fen)?;
    let mut engine = start_engine(engine_config)?;

    let analysis = engine.analyse(&game.uci_position(), think_time)?;
    let Some(score) = analysis.score else {
        bail!("engine analysis did not return a score");
    };
    let evaluation = Evaluation::new(score, game.turn());
    println!("Smoke test passed. Position eval: {}", evaluation.describe());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_subcommand_accepts_play_options() {
        let cli = Cli::try_parse_from(["chess-punisher", "play", "--thresholds", "20,60,120"])
            .unwrap();
        let Some(Mode::Play(args)) = cli.command else {
            panic!("expected the play subcommand");
        };
        assert_eq!(args.thresholds, Thresholds::new(20, 60, 120).unwrap());
        assert_eq!(args.punish_timeout_ms, 300);
        assert_eq!(args.log_format, LogFormat::Text);
    }

    #[test]
    fn test_play_options_without_subcommand() {
        let cli = Cli::try_parse_from([
            "chess-punisher",
            "--thresholds",
            "10,20,30",
            "--punish-timeout-ms",
            "50",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.play.thresholds, Thresholds::new(10, 20, 30).unwrap());
        assert_eq!(cli.play.punish_timeout_ms, 50);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["chess-punisher", "play", "--time", "0.5"]).unwrap();
        assert_eq!(cli.time, 0.5);
        assert!(matches!(cli.command, Some(Mode::Play(_))));
    }

    #[test]
    fn test_smoke_subcommand() {
        let cli = Cli::try_parse_from(["chess-punisher", "smoke"]).unwrap();
        let Some(Mode::Smoke { fen }) = cli.command else {
            panic!("expected the smoke subcommand");
        };
        assert_eq!(fen, STARTING_FEN);
    }

    #[test]
    fn test_non_monotonic_thresholds_rejected() {
        let err = Cli::try_parse_from(["chess-punisher", "play", "--thresholds", "300,150,50"]);
        assert!(err.is_err());
    }
}
