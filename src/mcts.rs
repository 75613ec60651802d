//! Monte Carlo Tree Search (MCTS) with UCT selection.
//!
//! Each search builds a fresh tree over cloned [`BoardState`] snapshots and
//! runs a fixed number of iterations of:
//! - Selection: descend by UCT score, unvisited children first
//! - Expansion: a leaf visited before gets one child per playable move
//! - Simulation: a random playout scored on captures
//! - Backpropagation: visits and reward added along the parent links
//!
//! Nodes live in a flat arena and refer to each other by index. The arena
//! owns every node, so the parent link is a plain index and the whole tree
//! is dropped at once when the search returns.

use std::ops::Index;

use log::{debug, log_enabled, trace, Level};
use thiserror::Error;

use crate::board::{format_move, Color, Move};
use crate::constants::{rollout_limit, EXPLORATION};
use crate::playout::rollout;
use crate::position::BoardState;

/// Index of a node in a [`SearchTree`].
pub type NodeId = usize;

/// The root is always the first node in the arena.
pub const ROOT: NodeId = 0;

/// Failure to produce an engine move.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The root position offered nothing to play (the game is over)
    #[error("no legal move available")]
    NoLegalMove,
    /// The background search thread could not be started
    #[error("failed to start search thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// The background search thread panicked
    #[error("search thread panicked")]
    WorkerPanicked,
}

/// How the accumulated reward is read during selection.
///
/// Rewards always accumulate as "White wins" (1.0 White, 0.0 Black, 0.5
/// tie). The perspective decides who the selection step optimizes for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Perspective {
    /// Each node picks the child best for the player to move there.
    #[default]
    Alternating,
    /// Every node picks the child best for White, whoever is to move.
    FixedWhite,
}

/// Search parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// UCT exploration constant
    pub exploration: f64,
    pub perspective: Perspective,
    /// Move attempts per playout; derived from board size when `None`
    pub rollout_limit: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: EXPLORATION,
            perspective: Perspective::default(),
            rollout_limit: None,
        }
    }
}

/// A node in the search tree.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// The position at this node
    pub state: BoardState,
    /// Parent index; `None` only for the root
    pub parent: Option<NodeId>,
    /// Child indices, in `legal_moves` order
    pub children: Vec<NodeId>,
    /// Move that led here from the parent
    pub mv: Option<Move>,
    /// Number of playouts through this node
    pub visits: u32,
    /// Sum of playout rewards (White wins = 1.0)
    pub reward: f64,
}

impl SearchNode {
    fn new(state: BoardState, parent: Option<NodeId>, mv: Option<Move>) -> Self {
        Self {
            state,
            parent,
            children: Vec::new(),
            mv,
            visits: 0,
            reward: 0.0,
        }
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Average reward, or `None` if the node was never visited.
    #[inline]
    pub fn mean_reward(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.reward / self.visits as f64)
    }
}

/// Compute the UCT score of `child` for selection by `mover`.
///
/// Unvisited children score `+inf` so they are always tried first.
fn uct_score(
    child: &SearchNode,
    parent_visits: u32,
    mover: Color,
    exploration: f64,
    perspective: Perspective,
) -> f64 {
    if child.visits == 0 {
        return f64::INFINITY;
    }
    let visits = child.visits as f64;
    let white_value = child.reward / visits;
    let value = match (perspective, mover) {
        (Perspective::Alternating, Color::Black) => 1.0 - white_value,
        _ => white_value,
    };
    value + exploration * ((parent_visits as f64).ln() / visits).sqrt()
}

/// An arena-backed search tree.
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl Index<NodeId> for SearchTree {
    type Output = SearchNode;

    fn index(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }
}

impl SearchTree {
    /// Create a tree whose root holds a clone of `state`.
    pub fn new(state: &BoardState) -> Self {
        Self {
            nodes: vec![SearchNode::new(state.clone(), None, None)],
        }
    }

    #[inline]
    pub fn root(&self) -> &SearchNode {
        &self.nodes[ROOT]
    }

    /// Total number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the children of `id`.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &SearchNode> + '_ {
        self.nodes[id].children.iter().map(|&c| &self.nodes[c])
    }

    /// Create one child of `id` per playable move.
    ///
    /// Each legal move is played on a clone of the node's state; moves that
    /// fail (suicide) get no child. Returns the number of children created.
    pub fn expand(&mut self, id: NodeId) -> usize {
        if self.nodes[id].is_expanded() {
            return 0;
        }

        let moves = self.nodes[id].state.legal_moves();
        let mut created = 0;
        for mv in moves {
            let mut state = self.nodes[id].state.clone();
            if state.play(mv).is_err() {
                continue;
            }
            let child = self.nodes.len();
            self.nodes.push(SearchNode::new(state, Some(id), Some(mv)));
            self.nodes[id].children.push(child);
            created += 1;
        }
        created
    }

    /// Select the child of `id` with the highest UCT score.
    ///
    /// Ties go to the earlier child. Returns `None` for a leaf.
    pub fn select_child(&self, id: NodeId, exploration: f64, perspective: Perspective) -> Option<NodeId> {
        let node = &self.nodes[id];
        let mover = node.state.current_player();
        let mut best: Option<(NodeId, f64)> = None;

        for &c in &node.children {
            let score = uct_score(&self.nodes[c], node.visits, mover, exploration, perspective);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((c, score));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Descend from the root to a leaf by repeated UCT selection.
    fn descend(&self, exploration: f64, perspective: Perspective) -> NodeId {
        let mut node = ROOT;
        while let Some(child) = self.select_child(node, exploration, perspective) {
            node = child;
        }
        node
    }

    /// Add one visit and `reward` to `id` and every ancestor.
    fn backpropagate(&mut self, id: NodeId, reward: f64) {
        let mut current = Some(id);
        while let Some(n) = current {
            let node = &mut self.nodes[n];
            node.visits += 1;
            node.reward += reward;
            current = node.parent;
        }
    }

    /// The most visited child of the root; ties go to the earlier child.
    pub fn best_child(&self) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &c in &self.root().children {
            if best.is_none_or(|b| self.nodes[c].visits > self.nodes[b].visits) {
                best = Some(c);
            }
        }
        best
    }

    /// Move leading to [`best_child`](Self::best_child).
    pub fn best_move(&self) -> Option<Move> {
        self.best_child().and_then(|c| self.nodes[c].mv)
    }
}

/// Runs MCTS searches and picks moves.
pub struct SearchEngine {
    config: SearchConfig,
    rng: fastrand::Rng,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl SearchEngine {
    /// Create an engine with a randomly seeded generator.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            rng: fastrand::Rng::new(),
        }
    }

    /// Create an engine whose searches are reproducible.
    pub fn with_seed(config: SearchConfig, seed: u64) -> Self {
        Self {
            config,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run `iterations` MCTS iterations from `root_state` and return the tree.
    ///
    /// The root is expanded up front unless the game is already over, so
    /// every iteration reaches one of its children.
    pub fn search(&mut self, root_state: &BoardState, iterations: usize) -> SearchTree {
        let mut tree = SearchTree::new(root_state);
        if !tree.root().state.is_terminal() {
            tree.expand(ROOT);
        }

        let SearchConfig {
            exploration,
            perspective,
            rollout_limit: limit,
        } = self.config;
        let limit = limit.unwrap_or_else(|| rollout_limit(root_state.size()));

        for _ in 0..iterations {
            let mut node = tree.descend(exploration, perspective);

            if tree[node].visits > 0 && !tree[node].state.is_terminal() && tree.expand(node) > 0 {
                let children = &tree[node].children;
                node = children[self.rng.usize(..children.len())];
            }

            let reward = rollout(&tree[node].state, &mut self.rng, limit);
            tree.backpropagate(node, reward);
        }

        if let Some(best) = tree.best_child() {
            debug!(
                "search: {} iterations, {} nodes, best {} (v={} value={:.3})",
                iterations,
                tree.len(),
                format_move(tree[best].mv.unwrap_or(Move::Pass), root_state.size()),
                tree[best].visits,
                tree[best].mean_reward().unwrap_or(0.0)
            );
        }
        if log_enabled!(Level::Trace) {
            dump_children(&tree);
        }

        tree
    }

    /// Pick a move for the player to move in `root_state`.
    ///
    /// Returns the most visited root child after `iterations` iterations,
    /// or `None` if the game is already over.
    pub fn choose_move(&mut self, root_state: &BoardState, iterations: usize) -> Option<Move> {
        self.search(root_state, iterations).best_move()
    }
}

/// Trace the statistics of the root's children.
fn dump_children(tree: &SearchTree) {
    let size = tree.root().state.size();
    for child in tree.children(ROOT) {
        trace!(
            "move {} v={} reward={:.1} mean={:.3}",
            format_move(child.mv.unwrap_or(Move::Pass), size),
            child.visits,
            child.reward,
            child.mean_reward().unwrap_or(-0.1)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SearchEngine {
        SearchEngine::with_seed(SearchConfig::default(), 12345)
    }

    #[test]
    fn test_root_visits_equal_iterations() {
        let pos = BoardState::new(3);
        for k in [1, 2, 10, 60] {
            let tree = engine().search(&pos, k);
            assert_eq!(tree.root().visits as usize, k);
            let child_sum: u32 = tree.children(ROOT).map(|c| c.visits).sum();
            assert_eq!(child_sum as usize, k);
        }
    }

    #[test]
    fn test_expanded_node_visits() {
        let pos = BoardState::new(3);
        let tree = engine().search(&pos, 200);
        for id in 1..tree.len() {
            let node = &tree[id];
            if node.is_expanded() {
                // One visit from before expansion, the rest went to children
                let child_sum: u32 = tree.children(id).map(|c| c.visits).sum();
                assert_eq!(node.visits, child_sum + 1);
            }
        }
    }

    #[test]
    fn test_parent_links() {
        let pos = BoardState::new(3);
        let tree = engine().search(&pos, 100);
        assert_eq!(tree.root().parent, None);
        assert_eq!(tree.root().mv, None);
        for id in 0..tree.len() {
            for &c in &tree[id].children {
                assert_eq!(tree[c].parent, Some(id));
                assert!(tree[c].mv.is_some());
            }
        }
    }

    #[test]
    fn test_expand_skips_suicide() {
        let mut pos = BoardState::new(3);
        pos.apply_move(0, 1).unwrap();
        pos.pass_turn();
        pos.apply_move(1, 0).unwrap();
        // White to move; (0,0) is suicide for White
        let mut tree = SearchTree::new(&pos);
        let created = tree.expand(ROOT);
        assert_eq!(created, 7);
        assert!(tree.children(ROOT).all(|c| c.mv != Some(Move::place(0, 0))));
        assert_eq!(tree.children(ROOT).last().and_then(|c| c.mv), Some(Move::Pass));
    }

    #[test]
    fn test_expand_twice_is_noop() {
        let pos = BoardState::new(2);
        let mut tree = SearchTree::new(&pos);
        assert_eq!(tree.expand(ROOT), 5);
        assert_eq!(tree.expand(ROOT), 0);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_unvisited_child_selected_first() {
        let pos = BoardState::new(2);
        let mut tree = SearchTree::new(&pos);
        tree.expand(ROOT);
        let first = tree.root().children[0];
        let second = tree.root().children[1];
        tree.nodes[first].visits = 5;
        tree.nodes[first].reward = 5.0;
        tree.nodes[ROOT].visits = 5;
        assert_eq!(tree.select_child(ROOT, EXPLORATION, Perspective::Alternating), Some(second));
    }

    /// Root with Black to move; child 0 is good for White, child 1 for Black.
    fn skewed_tree() -> SearchTree {
        let pos = BoardState::new(2);
        let mut tree = SearchTree::new(&pos);
        tree.expand(ROOT);
        let children = tree.root().children.clone();
        for (i, &c) in children.iter().enumerate() {
            tree.nodes[c].visits = 10;
            tree.nodes[c].reward = match i {
                0 => 9.0,
                1 => 1.0,
                _ => 5.0,
            };
        }
        tree.nodes[ROOT].visits = 10 * children.len() as u32;
        tree
    }

    #[test]
    fn test_alternating_perspective_minimizes_for_black() {
        let tree = skewed_tree();
        let picked = tree.select_child(ROOT, EXPLORATION, Perspective::Alternating);
        assert_eq!(picked, Some(tree.root().children[1]));
    }

    #[test]
    fn test_fixed_white_perspective_maximizes_white() {
        let tree = skewed_tree();
        let picked = tree.select_child(ROOT, EXPLORATION, Perspective::FixedWhite);
        assert_eq!(picked, Some(tree.root().children[0]));
    }

    #[test]
    fn test_best_child_ties_go_to_first() {
        let pos = BoardState::new(2);
        let mut tree = SearchTree::new(&pos);
        tree.expand(ROOT);
        assert_eq!(tree.best_move(), Some(Move::place(0, 0)));
        let last = *tree.root().children.last().unwrap();
        tree.nodes[last].visits = 1;
        assert_eq!(tree.best_move(), Some(Move::Pass));
    }

    #[test]
    fn test_terminal_root_has_no_move() {
        let mut pos = BoardState::new(3);
        pos.pass_turn();
        pos.pass_turn();
        let tree = engine().search(&pos, 10);
        assert_eq!(tree.root().visits, 10);
        assert!(!tree.root().is_expanded());
        assert_eq!(engine().choose_move(&pos, 10), None);
    }

    #[test]
    fn test_search_does_not_touch_input() {
        let mut pos = BoardState::new(4);
        pos.apply_move(1, 1).unwrap();
        let before = pos.clone();
        let _ = engine().choose_move(&pos, 50);
        assert_eq!(pos, before);
    }

    #[test]
    fn test_uct_score() {
        let mut child = SearchNode::new(BoardState::new(2), Some(ROOT), Some(Move::Pass));
        assert_eq!(
            uct_score(&child, 1, Color::White, EXPLORATION, Perspective::Alternating),
            f64::INFINITY
        );
        child.visits = 4;
        child.reward = 3.0;
        let expected = 0.75 + EXPLORATION * ((16f64).ln() / 4.0).sqrt();
        let got = uct_score(&child, 16, Color::White, EXPLORATION, Perspective::Alternating);
        assert!((got - expected).abs() < 1e-12);
        let expected_black = 0.25 + EXPLORATION * ((16f64).ln() / 4.0).sqrt();
        let got_black = uct_score(&child, 16, Color::Black, EXPLORATION, Perspective::Alternating);
        assert!((got_black - expected_black).abs() < 1e-12);
    }
}
