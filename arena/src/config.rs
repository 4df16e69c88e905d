//! Configuration for the arena binary
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use games_tictactoe::Variant;
use mcts::{HeuristicBias, MctsConfig};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

use crate::session::{PlayerSetting, SessionSettings};

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_variant() -> String {
    CENTRAL_CONFIG.arena.variant.clone()
}

fn default_players() -> String {
    CENTRAL_CONFIG.arena.players.clone()
}

fn default_first_name() -> String {
    CENTRAL_CONFIG.arena.first_name.clone()
}

fn default_second_name() -> String {
    CENTRAL_CONFIG.arena.second_name.clone()
}

fn default_games() -> u32 {
    CENTRAL_CONFIG.arena.games
}

fn default_time_budget_ms() -> u64 {
    CENTRAL_CONFIG.search.time_budget_ms
}

fn default_iterations() -> u32 {
    CENTRAL_CONFIG.search.iterations.unwrap_or(0)
}

fn default_exploration() -> f64 {
    CENTRAL_CONFIG.search.exploration
}

fn default_reuse_tree() -> bool {
    CENTRAL_CONFIG.search.reuse_tree
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_scores_file() -> String {
    CENTRAL_CONFIG.arena.scores_file.clone()
}

fn default_persist_scores() -> bool {
    CENTRAL_CONFIG.arena.persist_scores
}

fn default_show_board() -> bool {
    CENTRAL_CONFIG.arena.show_board
}

fn default_heuristics() -> HeuristicBias {
    let search = &CENTRAL_CONFIG.search;
    HeuristicBias {
        terminal: search.terminal_bias,
        subboard_win: search.subboard_win_bias,
        subboard_handoff: search.subboard_handoff_bias,
        free_move: search.free_move_bias,
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "arena")]
#[command(about = "Play basic or ultimate tic-tac-toe against people or the MCTS engine")]
#[command(
    long_about = "Runs interactive tic-tac-toe sessions. Humans enter moves on stdin as
'x y' (column then row, from the top-left); 'quit' ends the session.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Game variant (basic, ultimate)
    #[arg(long, default_value_t = default_variant())]
    pub variant: String,

    /// Player setting (human-vs-human, human-vs-computer, computer-vs-computer)
    #[arg(long, default_value_t = default_players())]
    pub players: String,

    /// Name of the first player
    #[arg(long, default_value_t = default_first_name())]
    pub first_name: String,

    /// Name of the second player
    #[arg(long, default_value_t = default_second_name())]
    pub second_name: String,

    /// Games to play (0 to keep playing until quit)
    #[arg(long, default_value_t = default_games())]
    pub games: u32,

    /// Thinking time per computer move in milliseconds
    #[arg(long, default_value_t = default_time_budget_ms())]
    pub time_budget_ms: u64,

    /// Fixed search iterations per move (0 to use the time budget)
    #[arg(long, default_value_t = default_iterations())]
    pub iterations: u32,

    /// UCB1 exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f64,

    /// Keep the search tree between moves
    #[arg(long, default_value_t = default_reuse_tree(), action = clap::ArgAction::Set)]
    pub reuse_tree: bool,

    /// RNG seed for reproducible sessions (falls back to config, then entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Data directory for the score record
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Score record file name inside the data directory
    #[arg(long, default_value_t = default_scores_file())]
    pub scores_file: String,

    /// Load and save the score record
    #[arg(long, default_value_t = default_persist_scores(), action = clap::ArgAction::Set)]
    pub persist_scores: bool,

    /// Print the board before every move
    #[arg(long, default_value_t = default_show_board(), action = clap::ArgAction::Set)]
    pub show_board: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let players = self.player_setting()?;
        self.game_variant()?;

        if players.needs_first_name() && self.first_name.trim().is_empty() {
            return Err(anyhow!("first_name cannot be empty for {}", players));
        }

        if players.needs_second_name() && self.second_name.trim().is_empty() {
            return Err(anyhow!("second_name cannot be empty for {}", players));
        }

        if self.iterations == 0 && self.time_budget_ms == 0 {
            return Err(anyhow!(
                "time_budget_ms must be greater than 0 when iterations is 0"
            ));
        }

        if !self.exploration.is_finite() || self.exploration <= 0.0 {
            return Err(anyhow!(
                "exploration must be a positive number, got {}",
                self.exploration
            ));
        }

        if self.persist_scores && self.scores_file.trim().is_empty() {
            return Err(anyhow!("scores_file cannot be empty when persist_scores is set"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    pub fn game_variant(&self) -> Result<Variant> {
        self.variant.parse().map_err(|e| anyhow!("{}", e))
    }

    pub fn player_setting(&self) -> Result<PlayerSetting> {
        self.players.parse()
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Search settings for every computer player in the session.
    pub fn mcts_config(&self) -> MctsConfig {
        let base = if self.iterations > 0 {
            MctsConfig::default().with_iterations(self.iterations)
        } else {
            MctsConfig::default().with_time_budget(self.time_budget())
        };
        base.with_exploration(self.exploration)
            .with_heuristics(default_heuristics())
            .with_tree_reuse(self.reuse_tree)
    }

    /// CLI seed, else the config file's, else None (seed from entropy).
    pub fn session_seed(&self) -> Option<u64> {
        self.seed.or(CENTRAL_CONFIG.common.seed)
    }

    pub fn session_settings(&self) -> Result<SessionSettings> {
        Ok(SessionSettings {
            variant: self.game_variant()?,
            players: self.player_setting()?,
            first_name: self.first_name.trim().to_string(),
            second_name: self.second_name.trim().to_string(),
            mcts: self.mcts_config(),
            show_board: self.show_board,
        })
    }

    /// Full path of the score record file
    pub fn scores_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.scores_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcts::SearchLimit;

    fn base_config() -> Config {
        Config {
            variant: "basic".into(),
            players: "human-vs-computer".into(),
            first_name: "Ada".into(),
            second_name: "Grace".into(),
            games: 1,
            time_budget_ms: 800,
            iterations: 0,
            exploration: 5f64.sqrt(),
            reuse_tree: true,
            seed: Some(7),
            log_level: "info".into(),
            data_dir: "../data".into(),
            scores_file: "scores.json".into(),
            persist_scores: true,
            show_board: true,
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_variant() {
        let mut cfg = base_config();
        cfg.variant = "hexagonal".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("hexagonal"));
    }

    #[test]
    fn validate_rejects_unknown_player_setting() {
        let mut cfg = base_config();
        cfg.players = "cat-vs-dog".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("cat-vs-dog"));
    }

    #[test]
    fn validate_requires_names_for_humans() {
        let mut cfg = base_config();
        cfg.first_name = "  ".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("first_name"));

        // The second name belongs to the computer here
        let mut cfg = base_config();
        cfg.second_name.clear();
        assert!(cfg.validate().is_ok());

        cfg.players = "human-vs-human".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("second_name"));
    }

    #[test]
    fn validate_ignores_names_for_computer_vs_computer() {
        let mut cfg = base_config();
        cfg.players = "computer-vs-computer".into();
        cfg.first_name.clear();
        cfg.second_name.clear();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_time_budget() {
        let mut cfg = base_config();
        cfg.time_budget_ms = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("time_budget_ms"));

        // A fixed iteration count makes the time budget irrelevant
        cfg.iterations = 500;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_exploration() {
        let mut cfg = base_config();
        cfg.exploration = 0.0;
        assert!(cfg.validate().unwrap_err().to_string().contains("exploration"));

        cfg.exploration = f64::NAN;
        assert!(cfg.validate().unwrap_err().to_string().contains("exploration"));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "nope".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn validate_rejects_empty_scores_file_when_persisting() {
        let mut cfg = base_config();
        cfg.scores_file.clear();
        assert!(cfg.validate().is_err());

        cfg.persist_scores = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn mcts_config_uses_time_budget() {
        let cfg = base_config();
        let mcts = cfg.mcts_config();
        assert_eq!(mcts.limit, SearchLimit::Time(Duration::from_millis(800)));
        assert!((mcts.exploration - 5f64.sqrt()).abs() < 1e-12);
        assert!(mcts.reuse_tree);
    }

    #[test]
    fn mcts_config_prefers_fixed_iterations() {
        let mut cfg = base_config();
        cfg.iterations = 250;
        cfg.reuse_tree = false;
        let mcts = cfg.mcts_config();
        assert_eq!(mcts.limit, SearchLimit::Iterations(250));
        assert!(!mcts.reuse_tree);
    }

    #[test]
    fn session_settings_parse_strings() {
        let mut cfg = base_config();
        cfg.variant = "Ultimate".into();
        cfg.players = "computer-vs-computer".into();
        cfg.first_name = " Ada ".into();

        let settings = cfg.session_settings().unwrap();
        assert_eq!(settings.variant, Variant::Ultimate);
        assert_eq!(settings.players, PlayerSetting::ComputerVsComputer);
        assert_eq!(settings.first_name, "Ada");
    }

    #[test]
    fn explicit_seed_wins() {
        let cfg = base_config();
        assert_eq!(cfg.session_seed(), Some(7));
    }

    #[test]
    fn scores_path_constructs_correctly() {
        let cfg = base_config();
        assert_eq!(cfg.scores_path(), PathBuf::from("../data/scores.json"));
    }
}
