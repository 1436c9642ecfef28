//! Bit-packed Connect 4 positions
//!
//! Each column occupies `height + 1` consecutive bits. The extra bit on top of
//! every column (the sentinel row) is never set in a player's mask, so runs of
//! stones can't continue across a column boundary when masks are shifted.
//!
//! Bit indices of the standard 7x6 board, column 0 on the left:
//!
//! ```text
//! 48 41 34 27 20 13  6   <- sentinel row
//! 47 40 33 26 19 12  5
//! 46 39 32 25 18 11  4
//! 45 38 31 24 17 10  3
//! 44 37 30 23 16  9  2
//! 43 36 29 22 15  8  1
//! 42 35 28 21 14  7  0   <- bottom row
//! ```

use crate::{
    error::{Connect4Error, Result},
    move_order::MoveList,
    position::Position,
    DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH,
};

/// Integer type holding one bit per cell
pub type Bits = u128;

mod masks {
    use super::Bits;

    /// Bit index of the bottom cell of a column
    pub fn column_base(width: usize, height: usize, column: usize) -> usize {
        (width - column - 1) * (height + 1)
    }

    /// One bit at the bottom cell of every column
    pub fn bottom_mask(width: usize, height: usize) -> Bits {
        let mut mask = 0;
        for column in 0..width {
            mask |= 1 << column_base(width, height, column);
        }
        mask
    }

    /// One bit at the sentinel cell of every column
    pub fn top_mask(width: usize, height: usize) -> Bits {
        bottom_mask(width, height) << height
    }

    /// Every cell of a column, sentinel included
    pub fn column_mask(width: usize, height: usize, column: usize) -> Bits {
        ((1 << (height + 1)) - 1) << column_base(width, height, column)
    }
}

/// Returns true if `bits` holds four set bits in a row in any direction
///
/// `padded_height` is the number of bits per column. Adjacent columns are
/// `padded_height` bits apart, so the shift for each direction is:
/// vertical 1, horizontal `padded_height`, and the two diagonals
/// `padded_height - 1` and `padded_height + 1`.
pub fn has_four_in_a_row(bits: Bits, padded_height: usize) -> bool {
    aligned(bits, 1)
        || aligned(bits, padded_height)
        || aligned(bits, padded_height - 1)
        || aligned(bits, padded_height + 1)
}

fn aligned(bits: Bits, shift: usize) -> bool {
    // mark all runs of 2
    let pairs = bits & (bits >> shift);
    // check for runs of 2 * (runs of 2)
    pairs & (pairs >> (2 * shift)) != 0
}

/// Score offset of a win by `player` on a board of `num_cells` cells
///
/// The winning stone is the winner's `n`-th and a win is worth
/// `(num_cells + 1 - moves before the winning one) / 2`, which is
/// `win_base - n`. Both players share `(num_cells + 2) / 2` on even boards.
/// On odd boards the first player gets one more, so that filling the last
/// cell with a win still scores 1.
pub fn win_base(num_cells: usize, player: Player) -> i32 {
    ((num_cells + 3 - player.index()) / 2) as i32
}

/// One of the two players, `First` always makes the opening move
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    First,
    Second,
}

impl Player {
    /// 0 for the first player, 1 for the second
    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }

    /// Multiplier turning a first-player score into this player's point of view
    pub fn sign(self) -> i32 {
        match self {
            Player::First => 1,
            Player::Second => -1,
        }
    }
}

/// A Connect 4 position stored as bitboards
///
/// `bottom_mask` marks the lowest free cell of every column. When a column
/// fills up its marker moves onto the sentinel bit, so a column is full iff
/// its sentinel is set in `bottom_mask`, and the game is drawn once every
/// marker sits on a sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitBoard {
    width: usize,
    height: usize,
    player_masks: [Bits; 2],
    bottom_mask: Bits,
    top_mask: Bits,
    turn: Player,
    // columns played so far, needed to locate the cell to remove on undo
    history: Vec<usize>,
}

impl BitBoard {
    /// Creates an empty board, checking that the dimensions are supported
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let fits = width
            .checked_mul(height.saturating_add(1))
            .map_or(false, |bits| bits <= Bits::BITS as usize);
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) || height < MIN_HEIGHT || !fits {
            return Err(Connect4Error::Configuration { width, height });
        }
        Ok(Self::with_dimensions(width, height))
    }

    /// Creates an empty 7x6 board
    pub fn standard() -> Self {
        Self::with_dimensions(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    fn with_dimensions(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            player_masks: [0, 0],
            bottom_mask: masks::bottom_mask(width, height),
            top_mask: masks::top_mask(width, height),
            turn: Player::First,
            history: Vec::with_capacity(width * height),
        }
    }

    /// Replays a move string on an empty 7x6 board
    ///
    /// Each character is a 1-based column number, see [`BitBoard::play_moves`]
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::standard();
        board.play_moves(moves)?;
        Ok(board)
    }

    /// Replays a move string on an empty board of the given size
    pub fn with_moves<S: AsRef<str>>(width: usize, height: usize, moves: S) -> Result<Self> {
        let mut board = Self::new(width, height)?;
        board.play_moves(moves)?;
        Ok(board)
    }

    /// Plays every move of a move string
    ///
    /// Columns are written 1-based, `'1'` being the leftmost column. On a
    /// 10-wide board the tenth column is written `'0'`. If any move is invalid
    /// the board is left untouched and the offending index is reported.
    pub fn play_moves<S: AsRef<str>>(&mut self, moves: S) -> Result<()> {
        let mut board = self.clone();
        for (index, token) in moves.as_ref().chars().enumerate() {
            match Self::parse_column(token, self.width) {
                Some(column) if board.is_valid_move(column) => board.play(column),
                _ => return Err(Connect4Error::InvalidMoveInSequence { index, token }),
            }
        }
        *self = board;
        Ok(())
    }

    fn parse_column(token: char, width: usize) -> Option<usize> {
        let column = match token.to_digit(10)? {
            0 => 9,
            digit => digit as usize - 1,
        };
        if column < width {
            Some(column)
        } else {
            None
        }
    }

    /// The moves played so far as a 1-based move string
    pub fn to_move_string(&self) -> String {
        self.history
            .iter()
            .filter_map(|&column| std::char::from_digit((column as u32 + 1) % 10, 10))
            .collect()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bits per column, including the sentinel
    pub fn padded_height(&self) -> usize {
        self.height + 1
    }

    /// The player to move
    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn num_moves(&self) -> usize {
        self.history.len()
    }

    /// Columns played so far, 0-based
    pub fn moves(&self) -> &[usize] {
        &self.history
    }

    pub fn player_mask(&self, player: Player) -> Bits {
        self.player_masks[player.index()]
    }

    pub fn bottom_mask(&self) -> Bits {
        self.bottom_mask
    }

    pub fn top_mask(&self) -> Bits {
        self.top_mask
    }

    /// The score offset of a win by `player`
    ///
    /// A win with `n` stones of the winner on the board is worth
    /// `win_base - n`, see [`win_base`].
    pub fn win_base(&self, player: Player) -> i32 {
        win_base(self.width * self.height, player)
    }

    fn column_mask(&self, column: usize) -> Bits {
        masks::column_mask(self.width, self.height, column)
    }

    fn sentinel(&self, column: usize) -> Bits {
        1 << (masks::column_base(self.width, self.height, column) + self.height)
    }

    /// The owner of a cell, rows counted from the bottom
    pub fn cell(&self, column: usize, row: usize) -> Option<Player> {
        if column >= self.width || row >= self.height {
            return None;
        }
        let bit: Bits = 1 << (masks::column_base(self.width, self.height, column) + row);
        if self.player_masks[0] & bit != 0 {
            Some(Player::First)
        } else if self.player_masks[1] & bit != 0 {
            Some(Player::Second)
        } else {
            None
        }
    }

    pub fn is_valid_move(&self, column: usize) -> bool {
        column < self.width && self.bottom_mask & self.sentinel(column) == 0
    }

    /// Playable columns in ascending order
    pub fn legal_moves(&self) -> MoveList {
        // no column full yet
        if self.bottom_mask & self.top_mask == 0 {
            return MoveList::full(self.width);
        }
        let mut moves = MoveList::new();
        for column in 0..self.width {
            if self.is_valid_move(column) {
                moves.push(column);
            }
        }
        moves
    }

    /// Drops a stone of the player to move into `column`
    pub fn make_move(&mut self, column: usize) -> Result<()> {
        if !self.is_valid_move(column) {
            return Err(Connect4Error::InvalidMove {
                column,
                width: self.width,
            });
        }
        self.play(column);
        Ok(())
    }

    /// Plays a move without checking it, `column` must be valid
    pub fn play(&mut self, column: usize) {
        debug_assert!(self.is_valid_move(column));
        let move_mask = self.bottom_mask & self.column_mask(column);
        // the free marker moves up to the cell above the new stone
        self.bottom_mask ^= move_mask | (move_mask << 1);
        self.player_masks[self.turn.index()] |= move_mask;
        self.turn = self.turn.opponent();
        self.history.push(column);
    }

    /// Takes back the last move, returning its column
    pub fn undo_move(&mut self) -> Result<usize> {
        self.undo().ok_or(Connect4Error::EmptyHistory)
    }

    /// Takes back the last move if there is one
    pub fn undo(&mut self) -> Option<usize> {
        let column = self.history.pop()?;
        let free_cell = self.bottom_mask & self.column_mask(column);
        let last_stone = free_cell >> 1;
        self.bottom_mask ^= free_cell | last_stone;
        // the player who made the move gets the turn back
        self.turn = self.turn.opponent();
        self.player_masks[self.turn.index()] &= !last_stone;
        Some(column)
    }

    pub fn is_win(&self, player: Player) -> bool {
        has_four_in_a_row(self.player_masks[player.index()], self.padded_height())
    }

    pub fn is_draw(&self) -> bool {
        self.bottom_mask == self.top_mask
    }

    /// True once the last mover has connected four or the board is full
    pub fn is_terminal(&self) -> bool {
        self.is_win(self.turn.opponent()) || self.is_draw()
    }

    /// Score from the first player's point of view
    ///
    /// Positive if the first player has won, negative if the second player
    /// has won, 0 otherwise. Faster wins are further from 0.
    pub fn score(&self) -> i32 {
        if self.is_win(Player::First) {
            self.win_base(Player::First) - self.player_masks[0].count_ones() as i32
        } else if self.is_win(Player::Second) {
            self.player_masks[1].count_ones() as i32 - self.win_base(Player::Second)
        } else {
            0
        }
    }
}

impl Default for BitBoard {
    fn default() -> Self {
        Self::standard()
    }
}

impl Position for BitBoard {
    fn width(&self) -> usize {
        self.width
    }

    fn num_cells(&self) -> usize {
        self.width * self.height
    }

    fn num_moves(&self) -> usize {
        self.history.len()
    }

    fn turn(&self) -> Player {
        self.turn
    }

    fn is_valid_move(&self, column: usize) -> bool {
        BitBoard::is_valid_move(self, column)
    }

    fn legal_moves(&self) -> MoveList {
        BitBoard::legal_moves(self)
    }

    fn play(&mut self, column: usize) {
        BitBoard::play(self, column)
    }

    fn undo(&mut self) -> Option<usize> {
        BitBoard::undo(self)
    }

    fn is_terminal(&self) -> bool {
        BitBoard::is_terminal(self)
    }

    fn score(&self) -> i32 {
        BitBoard::score(self)
    }
}
