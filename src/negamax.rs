//! Depth-limited negamax search with alpha-beta pruning

use crate::{
    move_order::order_moves,
    position::{Position, ScopedMove},
};

/// A bound larger than any reachable score, safe to negate
pub const INFINITY: i32 = i32::MAX;

/// Fail-soft alpha-beta search over a [`Position`]
///
/// The position is played and taken back in place, it is bit-identical
/// before and after every call.
#[derive(Clone, Debug, Default)]
pub struct Negamax {
    /// The number of nodes searched so far (for diagnostics only)
    pub node_count: usize,
}

impl Negamax {
    pub fn new() -> Self {
        Self { node_count: 0 }
    }

    /// Searches `position` to at most `depth` plies (`None` for no limit)
    ///
    /// Returns the value of the position for the player to move together with
    /// the move achieving it. The move is `None` when the position is terminal
    /// or the depth limit is reached. When the true value lies outside
    /// `(alpha, beta)` the returned value is a bound on it: at most `alpha`
    /// when failing low, at least `beta` when failing high.
    pub fn search<P: Position>(
        &mut self,
        position: &mut P,
        depth: Option<u32>,
        mut alpha: i32,
        beta: i32,
    ) -> (i32, Option<usize>) {
        self.node_count += 1;

        if depth == Some(0) || position.is_terminal() {
            return (position.relative_score(), None);
        }

        let mut moves = position.legal_moves();
        order_moves(&mut moves, position.width());

        let mut value = -INFINITY;
        let mut best_move = None;
        for &column in moves.iter() {
            // the search window is flipped for the other player
            let score = {
                let mut child = ScopedMove::new(position, column);
                -self
                    .search(&mut *child, depth.map(|d| d - 1), -beta, -alpha)
                    .0
            };
            if score > value {
                value = score;
                best_move = Some(column);
            }
            if value > alpha {
                alpha = value;
            }
            // a perfect opponent will not let the game reach this branch
            if alpha >= beta {
                break;
            }
        }

        (value, best_move)
    }
}
