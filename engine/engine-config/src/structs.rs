//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_time_budget_ms() -> u64 {
    defaults::time_budget_ms()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_reuse_tree() -> bool {
    defaults::reuse_tree()
}
fn d_terminal_bias() -> i64 {
    defaults::terminal_bias()
}
fn d_subboard_win_bias() -> i64 {
    defaults::subboard_win_bias()
}
fn d_subboard_handoff_bias() -> i64 {
    defaults::subboard_handoff_bias()
}
fn d_free_move_bias() -> i64 {
    defaults::free_move_bias()
}
fn d_variant() -> String {
    defaults::variant().into()
}
fn d_players() -> String {
    defaults::players().into()
}
fn d_first_name() -> String {
    defaults::first_name().into()
}
fn d_second_name() -> String {
    defaults::second_name().into()
}
fn d_games() -> u32 {
    defaults::games()
}
fn d_scores_file() -> String {
    defaults::scores_file().into()
}
fn d_persist_scores() -> bool {
    defaults::persist_scores()
}
fn d_show_board() -> bool {
    defaults::show_board()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// RNG seed for reproducible sessions. None = seed from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
            seed: None,
        }
    }
}

/// Move-search configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(default = "d_time_budget_ms")]
    pub time_budget_ms: u64,
    /// Fixed iteration count per move. Replaces the time budget when set.
    #[serde(default)]
    pub iterations: Option<u32>,
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    #[serde(default = "d_reuse_tree")]
    pub reuse_tree: bool,
    #[serde(default = "d_terminal_bias")]
    pub terminal_bias: i64,
    #[serde(default = "d_subboard_win_bias")]
    pub subboard_win_bias: i64,
    #[serde(default = "d_subboard_handoff_bias")]
    pub subboard_handoff_bias: i64,
    #[serde(default = "d_free_move_bias")]
    pub free_move_bias: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: defaults::time_budget_ms(),
            iterations: None,
            exploration: defaults::exploration(),
            reuse_tree: defaults::reuse_tree(),
            terminal_bias: defaults::terminal_bias(),
            subboard_win_bias: defaults::subboard_win_bias(),
            subboard_handoff_bias: defaults::subboard_handoff_bias(),
            free_move_bias: defaults::free_move_bias(),
        }
    }
}

/// Game session configuration for the arena binary
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ArenaConfig {
    #[serde(default = "d_variant")]
    pub variant: String,
    #[serde(default = "d_players")]
    pub players: String,
    #[serde(default = "d_first_name")]
    pub first_name: String,
    #[serde(default = "d_second_name")]
    pub second_name: String,
    /// Games per session. 0 = keep playing until the user quits.
    #[serde(default = "d_games")]
    pub games: u32,
    /// Score record file, relative to `common.data_dir`
    #[serde(default = "d_scores_file")]
    pub scores_file: String,
    #[serde(default = "d_persist_scores")]
    pub persist_scores: bool,
    #[serde(default = "d_show_board")]
    pub show_board: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            variant: defaults::variant().into(),
            players: defaults::players().into(),
            first_name: defaults::first_name().into(),
            second_name: defaults::second_name().into(),
            games: defaults::games(),
            scores_file: defaults::scores_file().into(),
            persist_scores: defaults::persist_scores(),
            show_board: defaults::show_board(),
        }
    }
}
