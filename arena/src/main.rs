//! Arena - interactive tic-tac-toe sessions
//!
//! Runs basic or ultimate tic-tac-toe games between humans (moves typed on
//! stdin) and the MCTS engine, then:
//! 1. Announces each result and the humans' running scores
//! 2. Saves the score record to `<data_dir>/<scores_file>` (JSON)

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::io;
use tracing::{error, info};

mod config;
mod session;
mod stats;

use crate::config::Config;
use crate::session::GameSession;
use crate::stats::ScoreBoard;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so they never interleave with the game on stdout.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    let settings = config.session_settings()?;
    let games_description = if config.games == 0 {
        "until quit".to_string()
    } else {
        config.games.to_string()
    };
    info!(
        variant = %settings.variant,
        players = %settings.players,
        "Arena will play {} games", games_description
    );

    let scores = if config.persist_scores {
        ScoreBoard::load(config.scores_path())
    } else {
        ScoreBoard::in_memory()
    };
    if !scores.is_empty() {
        info!(
            players = scores.len(),
            path = ?scores.path(),
            "Loaded score record"
        );
    }

    let rng = match config.session_seed() {
        Some(seed) => {
            info!(seed, "Using fixed session seed");
            ChaCha20Rng::seed_from_u64(seed)
        }
        None => ChaCha20Rng::from_entropy(),
    };

    let mut session = GameSession::new(settings, scores, rng);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    match session.play(config.games, &mut input, &mut output) {
        Ok(summary) => {
            info!(
                games = summary.games_played,
                quit = summary.quit,
                "Arena completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!("Arena failed: {}", e);
            Err(e)
        }
    }
}
