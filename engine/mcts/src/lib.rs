//! Monte Carlo Tree Search (MCTS) move selection for tic-tac-toe boards.
//!
//! Works on any [`games_tictactoe::Board`], basic or ultimate. Each decision
//! runs a budget of iterations, each of which has four phases:
//!
//! 1. **Selection**: descend through fully expanded nodes, picking the child
//!    with the highest UCB1 score `score/visits + C * sqrt(ln(N) / visits)`
//! 2. **Expansion**: add a child for the first legal move not yet in the tree,
//!    applying one-time heuristic biases in the ultimate variant
//! 3. **Playout**: uniformly random moves until the game ends
//! 4. **Backpropagation**: +1/-1 (or a bare visit for a draw) up to the root
//!
//! # Usage
//!
//! ```rust
//! use games_tictactoe::{Board, Piece, Variant};
//! use mcts::{MctsConfig, MctsSearch};
//!
//! let board = Board::new(Variant::Basic);
//! let mut search = MctsSearch::with_seed(MctsConfig::for_testing(), 42);
//!
//! let result = search.search(&board, Piece::First).unwrap();
//! assert!(board.is_legal(result.mv));
//! println!("{} after {} iterations", result.mv, result.iterations);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `limit`: wall-clock budget (default 800 ms) or a fixed iteration count
//! - `exploration`: UCB1 constant `C` (default sqrt(5))
//! - `heuristics`: expansion-time score biases
//! - `reuse_tree`: keep statistics under the moves actually played
//!
//! # Tree reuse
//!
//! After a decision the chosen child becomes the root. Moves made by the
//! other side are passed in with [`MctsSearch::notify_external_move`] (or
//! picked up from the board's previous move), and the next decision starts
//! from the matching subtree. If that move was never explored, a fresh tree
//! is built instead.

pub mod config;
pub mod node;
pub mod player;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{HeuristicBias, MctsConfig, SearchLimit};
pub use node::{MctsNode, NodeId};
pub use player::{ExternalMoves, MoveSource, PlayerError};
pub use search::{MctsSearch, SearchError, SearchResult};
pub use tree::{MctsTree, TreeError, TreeStats};
