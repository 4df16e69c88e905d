//! Default configuration values loaded from config.defaults.toml.
//!
//! The shared TOML file is embedded at compile time, so the binary and the
//! checked-in file can never disagree about a default.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    search: SearchDefaults,
    arena: ArenaDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    time_budget_ms: u64,
    exploration: f64,
    reuse_tree: bool,
    terminal_bias: i64,
    subboard_win_bias: i64,
    subboard_handoff_bias: i64,
    free_move_bias: i64,
}

#[derive(Debug, Deserialize)]
struct ArenaDefaults {
    variant: String,
    players: String,
    first_name: String,
    second_name: String,
    games: u32,
    scores_file: String,
    persist_scores: bool,
    show_board: bool,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Search
pub fn time_budget_ms() -> u64 {
    DEFAULTS.search.time_budget_ms
}
pub fn exploration() -> f64 {
    DEFAULTS.search.exploration
}
pub fn reuse_tree() -> bool {
    DEFAULTS.search.reuse_tree
}
pub fn terminal_bias() -> i64 {
    DEFAULTS.search.terminal_bias
}
pub fn subboard_win_bias() -> i64 {
    DEFAULTS.search.subboard_win_bias
}
pub fn subboard_handoff_bias() -> i64 {
    DEFAULTS.search.subboard_handoff_bias
}
pub fn free_move_bias() -> i64 {
    DEFAULTS.search.free_move_bias
}

// Arena
pub fn variant() -> &'static str {
    &DEFAULTS.arena.variant
}
pub fn players() -> &'static str {
    &DEFAULTS.arena.players
}
pub fn first_name() -> &'static str {
    &DEFAULTS.arena.first_name
}
pub fn second_name() -> &'static str {
    &DEFAULTS.arena.second_name
}
pub fn games() -> u32 {
    DEFAULTS.arena.games
}
pub fn scores_file() -> &'static str {
    &DEFAULTS.arena.scores_file
}
pub fn persist_scores() -> bool {
    DEFAULTS.arena.persist_scores
}
pub fn show_board() -> bool {
    DEFAULTS.arena.show_board
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        // Just accessing these will verify the TOML parses correctly
        assert_eq!(data_dir(), "./data");
        assert_eq!(log_level(), "info");
    }

    #[test]
    fn test_search_defaults() {
        assert_eq!(time_budget_ms(), 800);
        assert!((exploration() - 5f64.sqrt()).abs() < 1e-9);
        assert!(reuse_tree());
        assert_eq!(terminal_bias(), 1_000_000);
        assert_eq!(subboard_win_bias(), 500_000);
        assert_eq!(subboard_handoff_bias(), -1_000_000);
        assert_eq!(free_move_bias(), -200_000);
    }

    #[test]
    fn test_arena_defaults() {
        assert_eq!(variant(), "basic");
        assert_eq!(players(), "human-vs-computer");
        assert_eq!(games(), 1);
        assert_eq!(scores_file(), "scores.json");
        assert!(persist_scores());
    }
}
