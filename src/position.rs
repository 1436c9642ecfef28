//! The capabilities a search needs from a game state

use crate::{bitboard::Player, move_order::MoveList};

use std::ops::{Deref, DerefMut};

/// A game state the search strategies can walk
///
/// Provides the legal moves and the score of a position, plus in-place
/// play/undo so that a depth-first search never has to copy the state.
pub trait Position: Clone {
    /// Number of columns
    fn width(&self) -> usize;

    /// Number of playable cells on the board
    fn num_cells(&self) -> usize;

    fn num_moves(&self) -> usize;

    /// The player to move
    fn turn(&self) -> Player;

    fn is_valid_move(&self, column: usize) -> bool;

    /// Playable columns in ascending order
    fn legal_moves(&self) -> MoveList;

    /// Plays a move known to be valid
    fn play(&mut self, column: usize);

    /// Takes back the last move, returning its column
    fn undo(&mut self) -> Option<usize>;

    fn is_terminal(&self) -> bool;

    /// Score from the first player's point of view
    fn score(&self) -> i32;

    /// Score from the point of view of the player to move
    fn relative_score(&self) -> i32 {
        self.turn().sign() * self.score()
    }
}

/// A move that is taken back when the guard goes out of scope
///
/// Dereferences to the position with the move played, so a recursive search
/// can descend through it and the board is restored on every exit path,
/// including an early `break` on a cutoff.
pub struct ScopedMove<'a, P: Position> {
    position: &'a mut P,
}

impl<'a, P: Position> ScopedMove<'a, P> {
    /// Plays `column`, which must be a valid move
    pub fn new(position: &'a mut P, column: usize) -> Self {
        position.play(column);
        Self { position }
    }
}

impl<'a, P: Position> Deref for ScopedMove<'a, P> {
    type Target = P;

    fn deref(&self) -> &Self::Target {
        self.position
    }
}

impl<'a, P: Position> DerefMut for ScopedMove<'a, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.position
    }
}

impl<'a, P: Position> Drop for ScopedMove<'a, P> {
    fn drop(&mut self) {
        let undone = self.position.undo();
        debug_assert!(undone.is_some());
    }
}
