//! Interchangeable move selection for game loops

use crate::{
    mcts::{Mcts, MctsConfig},
    negamax::{Negamax, INFINITY},
    position::Position,
};

/// Something that picks a move for the player to move
///
/// Implementations may play and take back moves while thinking but must
/// return the position unchanged. Returns `None` once the game is over.
pub trait Strategy<P: Position> {
    fn choose_move(&mut self, position: &mut P) -> Option<usize>;
}

/// Picks moves with a full-window, depth-limited negamax search
#[derive(Clone, Debug, Default)]
pub struct NegamaxPlayer {
    depth: Option<u32>,
    search: Negamax,
    last_value: Option<i32>,
}

impl NegamaxPlayer {
    /// `depth` limits the search in plies, `None` searches to the end of the game
    pub fn new(depth: Option<u32>) -> Self {
        Self {
            depth,
            search: Negamax::new(),
            last_value: None,
        }
    }

    /// Value of the last searched position for the player who was to move
    ///
    /// A non-zero value is a proven result: the horizon is scored as a draw,
    /// so only forced wins and losses move the value away from 0.
    pub fn last_value(&self) -> Option<i32> {
        self.last_value
    }

    pub fn node_count(&self) -> usize {
        self.search.node_count
    }
}

impl<P: Position> Strategy<P> for NegamaxPlayer {
    fn choose_move(&mut self, position: &mut P) -> Option<usize> {
        if position.is_terminal() {
            self.last_value = None;
            return None;
        }
        let (value, best_move) = self
            .search
            .search(position, self.depth, -INFINITY, INFINITY);
        self.last_value = Some(value);
        best_move
    }
}

/// Picks moves with a fresh Monte Carlo search for every call
#[derive(Clone, Debug, Default)]
pub struct MctsPlayer {
    config: MctsConfig,
}

impl MctsPlayer {
    pub fn new(config: MctsConfig) -> Self {
        Self { config }
    }
}

impl<P: Position> Strategy<P> for MctsPlayer {
    fn choose_move(&mut self, position: &mut P) -> Option<usize> {
        if position.is_terminal() {
            return None;
        }
        let mut mcts = Mcts::new(position, self.config.clone());
        mcts.search();
        mcts.best_move()
    }
}
