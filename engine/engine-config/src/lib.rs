//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared by the
//! search engine and the arena binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`TICTACTOE_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! TICTACTOE_<SECTION>_<KEY>=value
//!
//! Examples:
//!     TICTACTOE_COMMON_LOG_LEVEL=debug
//!     TICTACTOE_COMMON_SEED=42
//!     TICTACTOE_SEARCH_TIME_BUDGET_MS=250
//!     TICTACTOE_ARENA_VARIANT=ultimate
//!     TICTACTOE_ARENA_PLAYERS=computer-vs-computer
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
