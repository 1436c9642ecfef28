//! Monte Carlo Tree Search
//!
//! An alternative to the exact solver for positions that are too deep to
//! solve in reasonable time. Every iteration runs the four classic phases:
//!
//! 1. **Selection**: descend from the root with UCT until a node that still
//!    has untried moves (or a finished game) is reached
//! 2. **Expansion**: add one child for a random untried move
//! 3. **Simulation**: play uniformly random moves until the game ends
//! 4. **Backpropagation**: add the final score to every node on the path
//!
//! Nodes live in an arena and refer to each other by index, a child stores
//! the index of its parent so backpropagation simply follows those links.

use crate::{move_order::MoveList, position::Position};

use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Index of a node in the search tree
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// How the final move is picked among the children of the root
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectionCriterion {
    /// The child with the best accumulated value for the player to move
    HighestValue,
    /// The child visited most often
    MostVisits,
}

/// Search parameters
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Number of select/simulate/backpropagate rounds per search
    pub iterations: usize,
    /// Weight of the exploration term of UCT
    pub exploration_weight: f64,
    pub criterion: SelectionCriterion,
    /// Seed for the random number generator, `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration_weight: std::f64::consts::SQRT_2,
            criterion: SelectionCriterion::HighestValue,
            seed: None,
        }
    }
}

/// Visit statistics of one child of the root
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChildStats {
    pub column: usize,
    pub visits: u32,
    /// Sum of the simulation results, from the first player's point of view
    pub value: f64,
}

#[derive(Clone, Debug)]
struct Node<P> {
    state: P,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    // the move that led from the parent to this node
    last_move: Option<usize>,
    visits: u32,
    // accumulated first-player scores
    value: f64,
}

impl<P> Node<P> {
    fn new(state: P, parent: Option<NodeId>, last_move: Option<usize>) -> Self {
        Self {
            state,
            parent,
            children: Vec::new(),
            last_move,
            visits: 0,
            value: 0.0,
        }
    }
}

/// A Monte Carlo search tree rooted at a copy of a position
///
/// Values are accumulated as raw first-player scores. Whenever a node's
/// children are compared the values are read from the point of view of the
/// player to move at that node.
pub struct Mcts<P> {
    nodes: Vec<Node<P>>,
    config: MctsConfig,
    rng: StdRng,
}

impl<P: Position> Mcts<P> {
    /// Creates a tree whose root is a copy of `root_state`
    pub fn new(root_state: &P, config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            nodes: vec![Node::new(root_state.clone(), None, None)],
            config,
            rng,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Runs the configured number of iterations
    pub fn search(&mut self) {
        for _ in 0..self.config.iterations {
            let leaf = self.select();
            let result = self.simulate(leaf);
            self.backpropagate(leaf, result);
        }
        debug!(
            "MCTS: {} iterations, {} nodes, root visits: {}",
            self.config.iterations,
            self.nodes.len(),
            self.root_visits()
        );
    }

    /// Selection step, returns the node to simulate from
    ///
    /// Descends while the game is not over. The first node found with untried
    /// moves is expanded and the new child returned.
    pub fn select(&mut self) -> NodeId {
        let mut id = ROOT;
        while !self.nodes[id].state.is_terminal() {
            if !self.is_fully_expanded(id) {
                return self.expand(id);
            }
            match self.uct_child(id) {
                Some(child) => id = child,
                None => break,
            }
        }
        id
    }

    fn is_fully_expanded(&self, id: NodeId) -> bool {
        self.untried_moves(id).is_empty()
    }

    fn untried_moves(&self, id: NodeId) -> MoveList {
        let node = &self.nodes[id];
        let mut untried = MoveList::new();
        for &column in node.state.legal_moves().iter() {
            let tried = node
                .children
                .iter()
                .any(|&child| self.nodes[child].last_move == Some(column));
            if !tried {
                untried.push(column);
            }
        }
        untried
    }

    /// Expansion step, adds a child for a random untried move
    ///
    /// Returns `id` itself when every move has been tried already.
    pub fn expand(&mut self, id: NodeId) -> NodeId {
        let untried = self.untried_moves(id);
        let column = match untried.choose(&mut self.rng) {
            Some(&column) => column,
            None => return id,
        };

        let mut state = self.nodes[id].state.clone();
        state.play(column);

        let child = self.nodes.len();
        self.nodes.push(Node::new(state, Some(id), Some(column)));
        self.nodes[id].children.push(child);
        child
    }

    // UCT: value / visits + c * sqrt(ln(parent visits) / visits)
    fn uct_child(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        let sign = node.state.turn().sign() as f64;
        let log_visits = (node.visits as f64).ln();

        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        for &child_id in &node.children {
            let child = &self.nodes[child_id];
            // unvisited children have infinite priority
            if child.visits == 0 {
                return Some(child_id);
            }
            let visits = child.visits as f64;
            let score = sign * child.value / visits
                + self.config.exploration_weight * (log_visits / visits).sqrt();
            if score > best_score {
                best_score = score;
                best = Some(child_id);
            }
        }
        best
    }

    /// Simulation step, plays random moves from the node until the game ends
    ///
    /// Returns the final score from the first player's point of view.
    pub fn simulate(&mut self, id: NodeId) -> i32 {
        let mut state = self.nodes[id].state.clone();
        while !state.is_terminal() {
            match state.legal_moves().choose(&mut self.rng) {
                Some(&column) => state.play(column),
                None => break,
            }
        }
        state.score()
    }

    /// Backpropagation step, updates every node from `id` up to the root
    pub fn backpropagate(&mut self, id: NodeId, result: i32) {
        let mut current = Some(id);
        while let Some(index) = current {
            let node = &mut self.nodes[index];
            node.visits += 1;
            node.value += result as f64;
            current = node.parent;
        }
    }

    /// The move chosen by the configured [`SelectionCriterion`]
    pub fn best_move(&self) -> Option<usize> {
        match self.config.criterion {
            SelectionCriterion::HighestValue => self.highest_value_move(),
            SelectionCriterion::MostVisits => self.most_visited_move(),
        }
    }

    /// The root move with the best accumulated value for the player to move
    pub fn highest_value_move(&self) -> Option<usize> {
        let sign = self.nodes[ROOT].state.turn().sign() as f64;
        self.best_root_child(|child| sign * child.value)
    }

    /// The root move that was visited most often
    pub fn most_visited_move(&self) -> Option<usize> {
        self.best_root_child(|child| child.visits as f64)
    }

    // first child with the highest key wins ties
    fn best_root_child<F: Fn(&Node<P>) -> f64>(&self, key: F) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        for &child_id in &self.nodes[ROOT].children {
            let child = &self.nodes[child_id];
            let score = key(child);
            if best.map_or(true, |(best_score, _)| score > best_score) {
                if let Some(column) = child.last_move {
                    best = Some((score, column));
                }
            }
        }
        best.map(|(_, column)| column)
    }

    pub fn root_visits(&self) -> u32 {
        self.nodes[ROOT].visits
    }

    /// Number of nodes in the tree, root included
    pub fn tree_size(&self) -> usize {
        self.nodes.len()
    }

    /// Statistics of the children of the root, in expansion order
    pub fn child_stats(&self) -> Vec<ChildStats> {
        self.nodes[ROOT]
            .children
            .iter()
            .filter_map(|&child_id| {
                let child = &self.nodes[child_id];
                child.last_move.map(|column| ChildStats {
                    column,
                    visits: child.visits,
                    value: child.value,
                })
            })
            .collect()
    }
}
