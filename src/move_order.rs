//! Centre-first move ordering
//!
//! Searching the centre columns first finds strong moves earlier, which
//! tightens the alpha-beta window sooner and prunes more of the tree.

use crate::MAX_WIDTH;

use std::ops::{Deref, DerefMut};

/// A list of columns with a fixed capacity of [`MAX_WIDTH`]
///
/// Lives entirely on the stack so that generating the moves of a node
/// never allocates.
///
/// [`MAX_WIDTH`]: crate::MAX_WIDTH
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveList {
    size: usize,
    moves: [usize; MAX_WIDTH],
}

impl MoveList {
    pub fn new() -> Self {
        Self {
            size: 0,
            moves: [0; MAX_WIDTH],
        }
    }

    /// Creates a list holding every column of a board of the given width, in ascending order
    pub fn full(width: usize) -> Self {
        let mut list = Self::new();
        for column in 0..width.min(MAX_WIDTH) {
            list.push(column);
        }
        list
    }

    pub fn push(&mut self, column: usize) {
        debug_assert!(self.size < MAX_WIDTH, "move list overflow");
        self.moves[self.size] = column;
        self.size += 1;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MoveList {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.moves[..self.size]
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.moves[..self.size]
    }
}

fn centre_distance(column: usize, centre: usize) -> usize {
    if column > centre {
        column - centre
    } else {
        centre - column
    }
}

/// Reorders `moves` by distance to the centre column (`width / 2`), closest first
///
/// The sort is stable: columns at the same distance keep their relative order,
/// so an ascending list puts the left neighbour of the centre before the right one.
pub fn order_moves(moves: &mut [usize], width: usize) {
    let centre = width / 2;
    // insertion sort, the lists are never longer than MAX_WIDTH
    for i in 1..moves.len() {
        let column = moves[i];
        let distance = centre_distance(column, centre);
        let mut pos = i;
        while pos != 0 && centre_distance(moves[pos - 1], centre) > distance {
            moves[pos] = moves[pos - 1];
            pos -= 1;
        }
        moves[pos] = column;
    }
}
