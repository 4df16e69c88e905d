//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from a crate directory)
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by TICTACTOE_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var("TICTACTOE_CONFIG") {
        let path = Path::new(&path);
        if path.exists() {
            info!("Loading config from TICTACTOE_CONFIG: {}", path.display());
            return load_from_path(path);
        }
        warn!(
            "TICTACTOE_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Read and parse `key`. Unset gives None; a value that does not parse is
/// logged and also gives None, leaving the configured value in place.
pub(crate) fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: cannot parse value", key, raw);
            None
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, i64, f64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Some(v) = parse_env($key) {
            $config.$section.$field = v;
        }
    };
    // Optional parseable field (Option<u32>, Option<u64>, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        if let Some(v) = parse_env($key) {
            $config.$section.$field = Some(v);
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: TICTACTOE_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "TICTACTOE_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "TICTACTOE_COMMON_LOG_LEVEL");
    env_override!(config, common.seed, "TICTACTOE_COMMON_SEED", optional_parse);

    // Search
    env_override!(
        config,
        search.time_budget_ms,
        "TICTACTOE_SEARCH_TIME_BUDGET_MS",
        parse
    );
    env_override!(
        config,
        search.iterations,
        "TICTACTOE_SEARCH_ITERATIONS",
        optional_parse
    );
    env_override!(
        config,
        search.exploration,
        "TICTACTOE_SEARCH_EXPLORATION",
        parse
    );
    env_override!(
        config,
        search.reuse_tree,
        "TICTACTOE_SEARCH_REUSE_TREE",
        parse
    );
    env_override!(
        config,
        search.terminal_bias,
        "TICTACTOE_SEARCH_TERMINAL_BIAS",
        parse
    );
    env_override!(
        config,
        search.subboard_win_bias,
        "TICTACTOE_SEARCH_SUBBOARD_WIN_BIAS",
        parse
    );
    env_override!(
        config,
        search.subboard_handoff_bias,
        "TICTACTOE_SEARCH_SUBBOARD_HANDOFF_BIAS",
        parse
    );
    env_override!(
        config,
        search.free_move_bias,
        "TICTACTOE_SEARCH_FREE_MOVE_BIAS",
        parse
    );

    // Arena
    env_override!(config, arena.variant, "TICTACTOE_ARENA_VARIANT");
    env_override!(config, arena.players, "TICTACTOE_ARENA_PLAYERS");
    env_override!(config, arena.first_name, "TICTACTOE_ARENA_FIRST_NAME");
    env_override!(config, arena.second_name, "TICTACTOE_ARENA_SECOND_NAME");
    env_override!(config, arena.games, "TICTACTOE_ARENA_GAMES", parse);
    env_override!(config, arena.scores_file, "TICTACTOE_ARENA_SCORES_FILE");
    env_override!(
        config,
        arena.persist_scores,
        "TICTACTOE_ARENA_PERSIST_SCORES",
        parse
    );
    env_override!(
        config,
        arena.show_board,
        "TICTACTOE_ARENA_SHOW_BOARD",
        parse
    );

    config
}
