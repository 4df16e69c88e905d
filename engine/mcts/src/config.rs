//! MCTS configuration parameters.

use std::time::Duration;

/// When a single decision stops iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    /// Iterate until this much wall-clock time has elapsed. Checked after
    /// each iteration, so the last one may overrun slightly.
    Time(Duration),
    /// Run exactly this many iterations (at least one). Used for
    /// reproducible runs.
    Iterations(u32),
}

/// One-time score adjustments applied to nodes during expansion.
///
/// Integer amounts are added to a node's score exactly once; applying one also
/// forces the node's visit count to 1 so its win ratio is dominated by the
/// adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicBias {
    /// A move that ends the game, won or drawn.
    pub terminal: i64,
    /// Ultimate only: a move that wins a sub-board.
    pub subboard_win: i64,
    /// Ultimate only: applied to the parent of a sub-board-winning move, i.e.
    /// to the opponent move that allowed it.
    pub subboard_handoff: i64,
    /// Ultimate only: a move that sends the opponent into a settled sub-board,
    /// letting them play anywhere.
    pub free_move: i64,
}

impl Default for HeuristicBias {
    fn default() -> Self {
        Self {
            terminal: 1_000_000,
            subboard_win: 500_000,
            subboard_handoff: -1_000_000,
            free_move: -200_000,
        }
    }
}

impl HeuristicBias {
    /// No shaping at all; every node is scored by playouts alone.
    pub fn disabled() -> Self {
        Self {
            terminal: 0,
            subboard_win: 0,
            subboard_handoff: 0,
            free_move: 0,
        }
    }
}

/// Configuration for the move-selection search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// How long (or how many iterations) each decision runs.
    pub limit: SearchLimit,

    /// Exploration constant `C` in `wins/visits + C * sqrt(ln(N) / visits)`.
    /// The default of sqrt(5) favours exploration fairly strongly.
    pub exploration: f64,

    /// Expansion-time shaping for the ultimate variant and terminal moves.
    pub heuristics: HeuristicBias,

    /// Keep the subtree under the moves actually played between decisions.
    pub reuse_tree: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            limit: SearchLimit::Time(Duration::from_millis(800)),
            exploration: 5f64.sqrt(),
            heuristics: HeuristicBias::default(),
            reuse_tree: true,
        }
    }
}

impl MctsConfig {
    /// Create a fast, iteration-limited config for testing.
    pub fn for_testing() -> Self {
        Self {
            limit: SearchLimit::Iterations(200),
            ..Self::default()
        }
    }

    /// Builder pattern: stop after a wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.limit = SearchLimit::Time(budget);
        self
    }

    /// Builder pattern: stop after a fixed number of iterations.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.limit = SearchLimit::Iterations(n);
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: replace the expansion heuristics.
    pub fn with_heuristics(mut self, heuristics: HeuristicBias) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Builder pattern: enable or disable tree reuse across decisions.
    pub fn with_tree_reuse(mut self, reuse: bool) -> Self {
        self.reuse_tree = reuse;
        self
    }
}
