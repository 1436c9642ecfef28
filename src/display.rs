use anyhow::Result;
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use connect4_engine::bitboard::{BitBoard, Player};

/// Draws the board to stdout, column numbers on top and the bottom row last
pub fn display(board: &BitBoard) -> Result<()> {
    let mut stdout = stdout();

    // the tenth column is numbered 0, as in move strings
    let cols: String = (1..=board.width()).map(|x| (x % 10).to_string()).collect();
    stdout.queue(PrintStyledContent(style(cols + "\n")))?;

    for row in (0..board.height()).rev() {
        for column in 0..board.width() {
            stdout.queue(PrintStyledContent(
                style("O")
                    .attribute(Attribute::Bold)
                    .on(Color::DarkBlue)
                    .with(match board.cell(column, row) {
                        Some(Player::First) => Color::Red,
                        Some(Player::Second) => Color::Yellow,
                        None => Color::DarkBlue,
                    }),
            ))?;
        }
        stdout.queue(PrintStyledContent(style("\n")))?;
    }
    stdout.flush()?;
    Ok(())
}
