//! An agent to solve Connect 4 positions exactly

use crate::{
    bitboard::{win_base, BitBoard},
    negamax::{Negamax, INFINITY},
    position::Position,
};

use log::debug;
use std::cmp::Ordering;

/// An agent to compute the exact score of a position
///
/// # Notes
/// The exact score is found with a binary search over the range of possible
/// scores. Every step runs a null-window negamax search (`beta = alpha + 1`),
/// which only answers whether the score is above or below a value but prunes
/// far more of the tree than a full-window search.
///
/// # Position Scoring
/// Scores are given from the point of view of the player to move. A win with
/// the winner's `n`-th stone is worth `(width * height + 1 - m) / 2`, where
/// `m` is the number of moves before the winning one. On a 7x6 board a win
/// with the last stone scores 1 and a win with the 4th stone scores 18.
/// Losses are the negation, a draw scores 0.
#[derive(Clone, Debug)]
pub struct Solver<P = BitBoard> {
    position: P,
    search: Negamax,
    depth_limit: Option<u32>,
}

impl<P: Position> Solver<P> {
    /// Creates a new `Solver` searching to the end of the game
    pub fn new(position: P) -> Self {
        Self {
            position,
            search: Negamax::new(),
            depth_limit: None,
        }
    }

    /// Limits every negamax search to `depth` plies, `None` removes the limit
    ///
    /// A limited search treats unfinished games at the horizon as draws, so
    /// `solve` is no longer exact.
    pub fn with_depth_limit(mut self, depth: Option<u32>) -> Self {
        self.depth_limit = depth;
        self
    }

    /// The number of nodes searched by this `Solver` so far (for diagnostics only)
    pub fn node_count(&self) -> usize {
        self.search.node_count
    }

    pub fn position(&self) -> &P {
        &self.position
    }

    pub fn into_inner(self) -> P {
        self.position
    }

    /// Runs a single negamax search of the position with the given window
    pub fn negamax(&mut self, alpha: i32, beta: i32) -> (i32, Option<usize>) {
        self.search
            .search(&mut self.position, self.depth_limit, alpha, beta)
    }

    /// Full-window search, returns the value and best move of the position
    pub fn search_full(&mut self) -> (i32, Option<usize>) {
        self.negamax(-INFINITY, INFINITY)
    }

    /// Lower bound on the score of a non-terminal position
    pub fn min_score(&self) -> i32 {
        -(self.position.num_cells() as i32 - self.position.num_moves() as i32) / 2
    }

    /// Upper bound on the score of a non-terminal position
    pub fn max_score(&self) -> i32 {
        (self.position.num_cells() as i32 + 1 - self.position.num_moves() as i32) / 2
    }

    /// Calculates the exact score of the position (see [Position Scoring])
    ///
    /// [Position Scoring]: #position-scoring
    pub fn solve(&mut self) -> i32 {
        // the score bounds only hold while the game is still running
        if self.position.is_terminal() {
            return self.position.relative_score();
        }

        let mut min = self.min_score();
        let mut max = self.max_score();

        // iteratively narrow the search window
        while min < max {
            let mid = probe_point(min, max);

            debug!(
                "Search window: [{}, {}], probing {}, uncertainty: {}, nodes: {}",
                min,
                max,
                mid,
                max - min,
                self.search.node_count
            );

            // use a null-window to determine if the actual score is greater or less than mid
            let (r, _) = self.negamax(mid, mid + 1);

            // r is not necessarily the exact true score, but its value indicates
            // whether the true score is above or below the search target
            if r <= mid {
                // actual score <= r <= mid
                max = r
            } else {
                // actual score >= r > mid
                min = r;
            }
        }
        // min and max are equal here
        min
    }

    /// Converts a position score to the number of stones the winner still has to play
    ///
    /// For a drawn score this is the number of empty cells left.
    pub fn score_to_win_distance(&self, score: i32) -> usize {
        let num_cells = self.position.num_cells();
        let num_moves = self.position.num_moves() as i32;
        let turn = self.position.turn();
        let distance = match score.cmp(&0) {
            Ordering::Equal => num_cells as i32 - num_moves,
            // the player to move wins, they have played num_moves / 2 stones
            Ordering::Greater => win_base(num_cells, turn) - score - num_moves / 2,
            // the opponent wins, they have played (num_moves + 1) / 2 stones
            Ordering::Less => {
                win_base(num_cells, turn.opponent()) + score - (num_moves + 1) / 2
            }
        };
        distance.max(0) as usize
    }
}

// the value tested by the next null-window search of the window [min, max]
fn probe_point(min: i32, max: i32) -> i32 {
    let mid = min + (max - min) / 2;
    // scores close to 0 are the most common, probe nearer to them
    if mid <= 0 && min.div_euclid(2) < mid {
        min.div_euclid(2)
    } else if mid >= 0 && max.div_euclid(2) > mid {
        max.div_euclid(2)
    } else {
        mid
    }
}

impl<P> std::ops::Deref for Solver<P> {
    type Target = P;

    fn deref(&self) -> &Self::Target {
        &self.position
    }
}
