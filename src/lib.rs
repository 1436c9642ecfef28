//! A Connect 4 engine for boards from 4x4 up to 10 columns wide
//!
//! Positions are stored as bitboards. On top of them sit an exact solver
//! (negamax with alpha-beta pruning, driven by a binary search of null-window
//! searches) and a Monte Carlo Tree Search for positions too deep to solve.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_engine::{bitboard::BitBoard, solver::Solver};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! // the first player can win with their 4th stone in the 4th column
//! let mut solver = Solver::new(BitBoard::from_moves("112233")?);
//! assert_eq!(solver.solve(), 18);
//!# Ok(())
//!# }
//! ```

use static_assertions::*;

pub mod error;

pub mod bitboard;

pub mod position;

pub mod move_order;

pub mod negamax;

pub mod solver;

pub mod mcts;

pub mod strategy;

pub mod fixture;

mod test;

/// The smallest supported number of columns
pub const MIN_WIDTH: usize = 4;

/// The largest supported number of columns, one digit per move in a move string
pub const MAX_WIDTH: usize = 10;

/// The smallest supported number of rows
pub const MIN_HEIGHT: usize = 4;

/// The width of the standard game board in tiles
pub const DEFAULT_WIDTH: usize = 7;

/// The height of the standard game board in tiles
pub const DEFAULT_HEIGHT: usize = 6;

// ensure that the widest board fits in a u128 for the bitboard representation
const_assert!(MAX_WIDTH * (MIN_HEIGHT + 1) <= 128);
const_assert!(DEFAULT_WIDTH * (DEFAULT_HEIGHT + 1) <= 128);
