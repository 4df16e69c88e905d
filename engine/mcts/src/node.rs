//! MCTS tree node representation.
//!
//! Each node is one ply: the move that reached it and the piece that played
//! it, plus the playout statistics used for UCB1 selection.

use games_tictactoe::{Coord, Piece};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Move that led to this node from the parent. `None` only for a fresh
    /// root; a root obtained by re-rooting keeps its move.
    pub mv: Option<Coord>,

    /// Piece that played `mv`. A fresh root holds the side that moved last,
    /// i.e. the opponent of the side the search is deciding for.
    pub piece: Piece,

    /// Number of playouts through this node.
    pub visit_count: u32,

    /// Signed playout results from the perspective of `piece`: +1 per win,
    /// -1 per loss, plus any one-time heuristic bias.
    pub score: i64,

    /// The game is over once `mv` has been played.
    pub is_terminal: bool,

    /// A heuristic bias has already been folded into `score`.
    pub biased: bool,

    /// Children: Vec of (move, NodeId) pairs, in expansion order.
    pub children: Vec<(Coord, NodeId)>,
}

impl MctsNode {
    /// Create a new root node for a position where `piece` moved last.
    pub fn new_root(piece: Piece) -> Self {
        Self {
            parent: NodeId::NONE,
            mv: None,
            piece,
            visit_count: 0,
            score: 0,
            is_terminal: false,
            biased: false,
            children: Vec::new(),
        }
    }

    /// Create a new child node.
    pub fn new_child(parent: NodeId, mv: Coord, piece: Piece) -> Self {
        Self {
            parent,
            mv: Some(mv),
            ..Self::new_root(piece)
        }
    }

    /// score / visits, or 0.0 if never visited.
    #[inline]
    pub fn win_ratio(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.score as f64 / self.visit_count as f64
        }
    }

    /// UCB1: `score/visits + c * sqrt(ln(parent_visits) / visits)`.
    ///
    /// Unvisited nodes score +inf so they are always tried first.
    #[inline]
    pub fn ucb1_score(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }
        let visits = self.visit_count as f64;
        let ln_parent = (parent_visits.max(1) as f64).ln();
        self.win_ratio() + exploration * (ln_parent / visits).sqrt()
    }

    /// Fold a one-time heuristic adjustment into the score.
    ///
    /// Only the first call on a node changes the score, but every call pins
    /// the visit count back to 1 so the ratio is dominated by the bias. A zero
    /// amount is not a bias and leaves the node untouched.
    pub fn apply_bias(&mut self, amount: i64) {
        if amount == 0 {
            return;
        }
        if !self.biased {
            self.score += amount;
            self.biased = true;
        }
        self.visit_count = 1;
    }

    /// Child reached by `mv`, if it has been expanded.
    pub fn child_for_move(&self, mv: Coord) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(child_mv, _)| *child_mv == mv)
            .map(|(_, id)| *id)
    }

    #[inline]
    pub fn has_child(&self, mv: Coord) -> bool {
        self.child_for_move(mv).is_some()
    }

    /// Check if this node has been expanded (has children).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Check if this is a leaf node (not expanded or terminal).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_terminal || !self.is_expanded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let node = MctsNode::new_root(Piece::Second);

        assert!(node.parent.is_none());
        assert_eq!(node.mv, None);
        assert_eq!(node.piece, Piece::Second);
        assert_eq!(node.visit_count, 0);
        assert_eq!(node.score, 0);
        assert!(!node.is_terminal);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_new_child() {
        let node = MctsNode::new_child(NodeId(3), Coord::new(2, 1), Piece::First);
        assert_eq!(node.parent, NodeId(3));
        assert_eq!(node.mv, Some(Coord::new(2, 1)));
        assert_eq!(node.piece, Piece::First);
    }

    #[test]
    fn test_win_ratio() {
        let mut node = MctsNode::new_root(Piece::First);

        // Unvisited
        assert_eq!(node.win_ratio(), 0.0);

        node.visit_count = 4;
        node.score = -2;
        assert!((node.win_ratio() + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ucb1_score() {
        let mut node = MctsNode::new_root(Piece::First);
        assert!(node.ucb1_score(10, 1.0).is_infinite());

        node.visit_count = 10;
        node.score = 5;

        // 0.5 + sqrt(5) * sqrt(ln(100) / 10)
        let expected = 0.5 + 5f64.sqrt() * (100f64.ln() / 10.0).sqrt();
        let ucb = node.ucb1_score(100, 5f64.sqrt());
        assert!((ucb - expected).abs() < 1e-12);
    }

    #[test]
    fn test_ucb1_prefers_less_visited_at_equal_ratio() {
        let mut a = MctsNode::new_root(Piece::First);
        a.visit_count = 2;
        a.score = 1;
        let mut b = MctsNode::new_root(Piece::First);
        b.visit_count = 20;
        b.score = 10;

        assert!(a.ucb1_score(22, 1.0) > b.ucb1_score(22, 1.0));
    }

    #[test]
    fn test_apply_bias_once() {
        let mut node = MctsNode::new_root(Piece::First);
        node.apply_bias(500_000);
        assert_eq!(node.score, 500_000);
        assert_eq!(node.visit_count, 1);
        assert!(node.biased);

        // A second bias leaves the score alone but still pins the visits.
        node.visit_count = 7;
        node.apply_bias(1_000_000);
        assert_eq!(node.score, 500_000);
        assert_eq!(node.visit_count, 1);
    }

    #[test]
    fn test_bias_on_visited_node_resets_visits() {
        let mut node = MctsNode::new_root(Piece::First);
        node.visit_count = 50;
        node.score = 10;

        node.apply_bias(-1_000_000);
        assert_eq!(node.score, -999_990);
        assert_eq!(node.visit_count, 1);
        assert!(node.win_ratio() < -999_000.0);
    }

    #[test]
    fn test_zero_bias_is_ignored() {
        let mut node = MctsNode::new_root(Piece::First);
        node.apply_bias(0);
        assert!(!node.biased);
        assert_eq!(node.visit_count, 0);

        node.apply_bias(-200_000);
        assert_eq!(node.score, -200_000);
    }

    #[test]
    fn test_child_lookup_and_leaf() {
        let mut node = MctsNode::new_root(Piece::First);
        assert!(node.is_leaf());

        node.children.push((Coord::new(0, 0), NodeId(1)));
        node.children.push((Coord::new(1, 0), NodeId(2)));
        assert!(!node.is_leaf());
        assert_eq!(node.child_for_move(Coord::new(1, 0)), Some(NodeId(2)));
        assert!(!node.has_child(Coord::new(2, 2)));

        // Terminal nodes are always leaves
        node.is_terminal = true;
        assert!(node.is_leaf());
    }
}
