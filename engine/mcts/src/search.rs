//! MCTS search implementation.
//!
//! Each iteration works on a fresh clone of the authoritative board:
//! 1. Selection: descend through fully expanded nodes by UCB1
//! 2. Expansion: add one child for the first legal move not yet in the tree
//! 3. Playout: uniformly random moves until the game ends
//! 4. Backpropagation: update visits and signed scores up to the root
//!
//! Iterations repeat until the configured [`SearchLimit`] is reached. The
//! chosen child then becomes the root of the tree kept for the next decision.

use std::time::{Duration, Instant};

use games_tictactoe::{Board, Coord, Piece, Variant};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, error, trace};

use crate::config::{MctsConfig, SearchLimit};
use crate::node::NodeId;
use crate::tree::{MctsTree, TreeStats};

/// Errors that can occur during MCTS search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("the game is already finished")]
    GameFinished,

    #[error("cannot search for side {0}")]
    InvalidSide(Piece),

    /// No legal move exists but the game is not over. The board's settlement
    /// bookkeeping is broken.
    #[error("no legal moves after {moves_played} moves, but the game is not finished")]
    UnreachableGameState { moves_played: u32 },

    #[error("search finished without any root children")]
    EmptyTree,
}

/// Result of one decision.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Move to play
    pub mv: Coord,

    /// Iterations run for this decision
    pub iterations: u32,

    /// Root visit count when the decision was made, including reused visits
    pub root_visits: u32,

    /// score / visits of the chosen child
    pub win_ratio: f64,

    /// Wall-clock time spent
    pub elapsed: Duration,

    /// Whether statistics from the previous decision were kept
    pub reused_tree: bool,

    /// Shape of the tree before it was re-rooted onto the chosen move
    pub tree: TreeStats,
}

/// Move-selection engine for one side of a game.
///
/// Holds the search tree between decisions so statistics gathered under the
/// moves actually played are reused.
pub struct MctsSearch {
    config: MctsConfig,
    rng: ChaCha20Rng,
    tree: Option<MctsTree>,
    /// Number of moves on the board at the kept tree's root.
    root_ply: u32,
    /// Moves reported by `notify_external_move` since the last decision.
    pending: Vec<Coord>,
}

impl MctsSearch {
    /// Create a search engine with an explicit random source.
    pub fn new(config: MctsConfig, rng: ChaCha20Rng) -> Self {
        Self {
            config,
            rng,
            tree: None,
            root_ply: 0,
            pending: Vec::new(),
        }
    }

    /// Create a deterministic search engine from a seed.
    pub fn with_seed(config: MctsConfig, seed: u64) -> Self {
        Self::new(config, ChaCha20Rng::seed_from_u64(seed))
    }

    /// The tree kept from the last decision, if any.
    pub fn tree(&self) -> Option<&MctsTree> {
        self.tree.as_ref()
    }

    /// Choose a legal move for `side` on `board`.
    pub fn request_move(&mut self, board: &Board, side: Piece) -> Result<Coord, SearchError> {
        self.search(board, side).map(|result| result.mv)
    }

    /// Record a move made outside the engine so the next decision can keep
    /// the matching subtree.
    pub fn notify_external_move(&mut self, mv: Coord) {
        if self.tree.is_some() {
            self.pending.push(mv);
        }
    }

    /// Forget the kept tree, e.g. when a new game starts.
    pub fn reset(&mut self) {
        self.tree = None;
        self.pending.clear();
        self.root_ply = 0;
    }

    /// Run one full decision and return the move with its statistics.
    pub fn search(&mut self, board: &Board, side: Piece) -> Result<SearchResult, SearchError> {
        if !side.is_player() {
            return Err(SearchError::InvalidSide(side));
        }
        if board.status().is_over() {
            return Err(SearchError::GameFinished);
        }
        if board.legal_moves().is_empty() {
            return Err(unreachable_state(board));
        }

        let start = Instant::now();
        let (mut tree, reused_tree) = match self.resume(board, side) {
            Some(tree) => (tree, true),
            None => (MctsTree::new(side.opponent()), false),
        };

        let mut iterations = 0u32;
        loop {
            self.iterate(&mut tree, board)?;
            iterations += 1;
            if self.limit_reached(start, iterations) {
                break;
            }
        }

        let stats = tree.stats();
        let (mv, chosen) = tree
            .best_child(&mut self.rng)
            .ok_or(SearchError::EmptyTree)?;
        let win_ratio = tree.get(chosen).win_ratio();

        if self.config.reuse_tree {
            tree.reroot(chosen);
            self.tree = Some(tree);
            self.root_ply = board.move_count() + 1;
        }

        let result = SearchResult {
            mv,
            iterations,
            root_visits: stats.root_visits,
            win_ratio,
            elapsed: start.elapsed(),
            reused_tree,
            tree: stats,
        };

        debug!(
            side = %side,
            mv = %result.mv,
            iterations = result.iterations,
            root_visits = result.root_visits,
            win_ratio = result.win_ratio,
            nodes = result.tree.total_nodes,
            reused = result.reused_tree,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "MCTS decision"
        );

        Ok(result)
    }

    /// Recover the kept tree for the position on `board`, replaying the moves
    /// played since the last decision. Returns `None` when there is nothing
    /// usable, in which case the caller starts fresh.
    fn resume(&mut self, board: &Board, side: Piece) -> Option<MctsTree> {
        let pending = std::mem::take(&mut self.pending);
        let mut tree = self.tree.take()?;

        let replay = if pending.is_empty() && board.move_count() == self.root_ply + 1 {
            board.previous_move().into_iter().collect()
        } else {
            pending
        };

        for &mv in &replay {
            if let Err(e) = tree.reroot_on_move(mv) {
                debug!(error = %e, "Opponent move not in tree, starting fresh");
                return None;
            }
        }

        let root = tree.get(tree.root());
        let consistent = self.root_ply + replay.len() as u32 == board.move_count()
            && root.piece == side.opponent()
            && root.mv == board.previous_move();

        if !consistent {
            debug!(
                root_ply = self.root_ply,
                replayed = replay.len(),
                board_moves = board.move_count(),
                "Kept tree does not match the board, starting fresh"
            );
            return None;
        }

        debug!(nodes = tree.len(), root_visits = root.visit_count, "Reusing search tree");
        Some(tree)
    }

    fn limit_reached(&self, start: Instant, iterations: u32) -> bool {
        match self.config.limit {
            SearchLimit::Time(budget) => start.elapsed() >= budget,
            SearchLimit::Iterations(n) => iterations >= n,
        }
    }

    /// Run a single select -> expand -> playout -> backpropagate cycle.
    fn iterate(&mut self, tree: &mut MctsTree, board: &Board) -> Result<(), SearchError> {
        let mut scratch = board.clone();
        let (node_id, depth) = self.select(tree, &mut scratch);

        let leaf_id = if tree.get(node_id).is_terminal {
            node_id
        } else {
            self.expand(tree, node_id, &mut scratch)?
        };

        let winner = if tree.get(leaf_id).is_terminal {
            scratch.winner()
        } else {
            self.playout(&mut scratch, tree.get(leaf_id).piece)?
        };

        tree.backpropagate(leaf_id, winner);

        trace!(
            leaf = leaf_id.0,
            depth,
            winner = ?winner,
            "MCTS iteration complete"
        );

        Ok(())
    }

    /// Descend while every legal move at the current node has a child,
    /// playing each chosen move on `scratch`.
    fn select(&self, tree: &MctsTree, scratch: &mut Board) -> (NodeId, u32) {
        let mut current = tree.root();
        let mut depth = 0;

        loop {
            let node = tree.get(current);
            if node.is_leaf() || node.children.len() != scratch.legal_moves().len() {
                break;
            }

            let Some(child_id) = tree.select_child(current, self.config.exploration) else {
                break;
            };
            let child = tree.get(child_id);
            if let Some(mv) = child.mv {
                scratch.play_unchecked(mv, child.piece);
            }
            current = child_id;
            depth += 1;
        }

        (current, depth)
    }

    /// Add one child under `node_id` for the first legal move it lacks, play
    /// that move on `scratch` and apply the expansion heuristics.
    fn expand(
        &mut self,
        tree: &mut MctsTree,
        node_id: NodeId,
        scratch: &mut Board,
    ) -> Result<NodeId, SearchError> {
        let parent = tree.get(node_id);
        let mv = scratch
            .legal_moves()
            .into_iter()
            .find(|mv| !parent.has_child(*mv))
            .ok_or_else(|| unreachable_state(scratch))?;
        let piece = parent.piece.opponent();

        let settled = scratch.play_unchecked(mv, piece);
        let child_id = tree.add_child(node_id, mv, piece);
        let bias = self.config.heuristics;

        let status = scratch.status();
        if status.is_over() {
            let child = tree.get_mut(child_id);
            child.is_terminal = true;
            child.apply_bias(bias.terminal);
        }

        if scratch.variant() == Variant::Ultimate {
            if matches!(settled, Some(p) if p.is_player()) {
                tree.get_mut(child_id).apply_bias(bias.subboard_win);
                tree.get_mut(node_id).apply_bias(bias.subboard_handoff);
            } else {
                let (tx, ty) = mv.target_subboard();
                if scratch.subboard_outcome(tx, ty).is_some() {
                    tree.get_mut(child_id).apply_bias(bias.free_move);
                }
            }
        }

        Ok(child_id)
    }

    /// Play uniformly random moves until the game ends. `last_mover` made the
    /// most recent move on `scratch`. Returns the winner, `None` for a draw.
    fn playout(
        &mut self,
        scratch: &mut Board,
        last_mover: Piece,
    ) -> Result<Option<Piece>, SearchError> {
        let mut side = last_mover.opponent();

        while !scratch.status().is_over() {
            let moves = scratch.legal_moves();
            let &mv = moves
                .choose(&mut self.rng)
                .ok_or_else(|| unreachable_state(scratch))?;
            scratch.play_unchecked(mv, side);
            side = side.opponent();
        }

        Ok(scratch.winner())
    }
}

fn unreachable_state(board: &Board) -> SearchError {
    error!(
        moves_played = board.move_count(),
        variant = %board.variant(),
        "No legal moves in an unfinished game\n{}",
        board
    );
    SearchError::UnreachableGameState {
        moves_played: board.move_count(),
    }
}
