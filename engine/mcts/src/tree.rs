//! MCTS tree structure with arena allocation.
//!
//! Nodes live in a contiguous Vec and refer to each other by [`NodeId`]. A
//! node's parent handle is non-owning; a node is owned by the arena and is
//! kept only while it is reachable from the root. Re-rooting rebuilds the
//! arena from the new root, so discarded siblings and their subtrees are
//! reclaimed immediately.

use std::collections::VecDeque;

use games_tictactoe::{Coord, Piece};
use rand::Rng;
use thiserror::Error;

use crate::node::{MctsNode, NodeId};

/// Structural errors from tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("root has no child for move ({x}, {y})")]
    NoSuchChild { x: usize, y: usize },
}

/// MCTS tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after construction or re-rooting)
    root: NodeId,
}

impl MctsTree {
    /// Create a single-node tree for a position where `last_mover` played the
    /// most recent move.
    pub fn new(last_mover: Piece) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(last_mover)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.index()]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (never true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a child for `mv`, played by `piece`, under `parent_id`.
    pub fn add_child(&mut self, parent_id: NodeId, mv: Coord, piece: Piece) -> NodeId {
        let child_id = self.allocate(MctsNode::new_child(parent_id, mv, piece));
        self.get_mut(parent_id).children.push((mv, child_id));
        child_id
    }

    /// Select the child with the highest UCB1 score. Ties go to the first
    /// maximal child in expansion order.
    pub fn select_child(&self, node_id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.visit_count;

        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child_id) in &node.children {
            let score = self.get(child_id).ucb1_score(parent_visits, exploration);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Record one playout result from `leaf_id` up to the root.
    ///
    /// Every node gains a visit. On a decisive result a node scores +1 if its
    /// piece is the winner and -1 otherwise, so the sign alternates with
    /// depth. A draw (`None`) leaves scores unchanged.
    pub fn backpropagate(&mut self, leaf_id: NodeId, winner: Option<Piece>) {
        let mut current_id = leaf_id;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visit_count += 1;

            if let Some(winner) = winner {
                node.score += if node.piece == winner { 1 } else { -1 };
            }

            current_id = node.parent;
        }
    }

    /// Pick the root child to play: highest win ratio, ties to the first
    /// maximal child, starting from a uniformly random candidate so a tree
    /// with no information still yields a move.
    pub fn best_child<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(Coord, NodeId)> {
        let children = &self.get(self.root).children;
        if children.is_empty() {
            return None;
        }

        let mut best = children[rng.gen_range(0..children.len())];
        let mut best_ratio = self.get(best.1).win_ratio();
        for &(mv, id) in children {
            let ratio = self.get(id).win_ratio();
            if ratio > best_ratio {
                best = (mv, id);
                best_ratio = ratio;
            }
        }
        Some(best)
    }

    /// Make the root's child for `mv` the new root, discarding everything
    /// else. The tree is untouched if no such child exists.
    pub fn reroot_on_move(&mut self, mv: Coord) -> Result<(), TreeError> {
        let child = self
            .get(self.root)
            .child_for_move(mv)
            .ok_or(TreeError::NoSuchChild { x: mv.x, y: mv.y })?;
        self.reroot(child);
        Ok(())
    }

    /// Make `new_root` the root, keeping only its subtree.
    ///
    /// The arena is rebuilt breadth-first from `new_root`; child order is
    /// preserved and the new root keeps its move, piece and statistics.
    pub fn reroot(&mut self, new_root: NodeId) {
        let mut old = std::mem::take(&mut self.nodes);
        let mut nodes: Vec<MctsNode> = Vec::with_capacity(old.len());
        let mut queue = VecDeque::from([(new_root, NodeId::NONE)]);

        while let Some((old_id, parent)) = queue.pop_front() {
            let children = std::mem::take(&mut old[old_id.index()].children);
            let mut node = old[old_id.index()].clone();
            node.parent = parent;

            let new_id = NodeId(nodes.len() as u32);
            if let (Some(mv), true) = (node.mv, parent.is_some()) {
                nodes[parent.index()].children.push((mv, new_id));
            }
            nodes.push(node);

            for (_, child_id) in children {
                queue.push_back((child_id, new_id));
            }
        }

        self.nodes = nodes;
        self.root = NodeId(0);
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_children: root.children.len(),
            max_depth: self.compute_max_depth(),
        }
    }

    fn compute_max_depth(&self) -> u32 {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &(_, child) in &self.get(id).children {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_children: usize,
    pub max_depth: u32,
}
