use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use std::cmp::Ordering;
use std::io::{stdin, stdout, Stdin, Write};
use std::path::PathBuf;
use std::time::Duration;

use connect4_engine::{
    bitboard::{BitBoard, Player},
    mcts::MctsConfig,
    solver::Solver,
    strategy::{MctsPlayer, NegamaxPlayer, Strategy},
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};

mod benchmark;
mod display;
use display::display;

#[derive(Parser)]
#[command(name = "connect4", version, about = "Play Connect 4 against the engine or benchmark its solver")]
struct Cli {
    /// Log search progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a game in the terminal
    Play(PlayArgs),
    /// Solve fixture files of `<moves> <score>` lines and check every score
    Bench {
        /// Fixture files, processed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Seconds after which no new case of a file is started
        #[arg(long, default_value_t = 300)]
        time_limit: u64,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum Engine {
    Negamax,
    Mcts,
}

#[derive(Args)]
struct PlayArgs {
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
    /// Opening moves as 1-based column numbers, e.g. 4453
    #[arg(long, default_value = "")]
    moves: String,
    #[arg(long, value_enum, default_value_t = Engine::Negamax)]
    engine: Engine,
    /// Search depth of the negamax engine in plies
    #[arg(long, default_value_t = 10)]
    depth: u32,
    /// Iterations per move of the MCTS engine
    #[arg(long, default_value_t = 20_000)]
    iterations: usize,
    /// Let the engine play for player 1
    #[arg(long)]
    first_player_ai: bool,
    /// Let the engine play for player 2
    #[arg(long)]
    second_player_ai: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Play(args) => play(args),
        Command::Bench { files, time_limit } => {
            for file in files.iter() {
                if !benchmark::run_file(file, Duration::from_secs(time_limit))? {
                    println!("Terminating {}...", file.display());
                    break;
                }
            }
            Ok(())
        }
    }
}

fn ask_yes_no(stdin: &Stdin, question: &str) -> Result<bool> {
    loop {
        let mut buffer = String::new();
        print!("{}", question);
        stdout().flush()?;
        stdin.read_line(&mut buffer)?;
        match buffer.to_lowercase().chars().next() {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}

// the AI players given on the command line, None if neither flag was set
fn ai_flags(args: &PlayArgs) -> Option<(bool, bool)> {
    if args.first_player_ai || args.second_player_ai {
        Some((args.first_player_ai, args.second_player_ai))
    } else {
        None
    }
}

fn report_value(board: &BitBoard, value: i32) {
    // depth-limited searches score the horizon as a draw, only wins and losses are proven
    if value == 0 {
        return;
    }
    let win_distance = Solver::new(board.clone()).score_to_win_distance(value);
    let move_string = if win_distance == 1 { "move" } else { "moves" };
    let player = match (value.cmp(&0), board.turn()) {
        (Ordering::Greater, Player::First) | (Ordering::Less, Player::Second) => 1,
        _ => 2,
    };
    println!(
        "Player {} can force a win in at most {} {}.",
        player, win_distance, move_string
    );
}

fn play(args: PlayArgs) -> Result<()> {
    let mut board = BitBoard::with_moves(args.width, args.height, &args.moves)?;
    let mut negamax = NegamaxPlayer::new(Some(args.depth));
    let mut mcts = MctsPlayer::new(MctsConfig {
        iterations: args.iterations,
        ..MctsConfig::default()
    });

    let stdin = stdin();

    println!("Welcome to Connect 4\n");

    let ai_players = match ai_flags(&args) {
        Some(ai_players) => ai_players,
        None => (
            ask_yes_no(&stdin, "Is player 1 AI controlled? y/n: ")?,
            ask_yes_no(&stdin, "Is player 2 AI controlled? y/n: ")?,
        ),
    };

    // game loop
    while !board.is_terminal() {
        display(&board)?;

        let player_one = board.turn() == Player::First;
        let next_move =
            // AI player
            if (player_one && ai_players.0) || (!player_one && ai_players.1) {
                println!("AI is thinking...");
                stdout().flush()?;

                // slow down play if both players are AI
                if ai_players == (true, true) {
                    std::thread::sleep(Duration::new(1, 0));
                }

                let best_move = match args.engine {
                    Engine::Negamax => {
                        let best_move = negamax.choose_move(&mut board);
                        if let Some(value) = negamax.last_value() {
                            report_value(&board, value);
                        }
                        best_move
                    }
                    Engine::Mcts => mcts.choose_move(&mut board),
                }
                .ok_or_else(|| anyhow!("the engine found no move in a running game"))?;

                println!("Best move: {}", best_move + 1);
                best_move

            // human player
            } else {
                print!("Move input > ");
                stdout().flush()?;
                let mut input_str = String::new();
                stdin.read_line(&mut input_str)?;

                match input_str.trim().parse::<usize>().ok().and_then(|c| c.checked_sub(1)) {
                    None => {
                        println!(
                            "Invalid number: {}. Columns must be between 1 and {}",
                            input_str.trim(),
                            board.width()
                        );
                        continue;
                    }
                    Some(column) => column,
                }
            };

        if let Err(err) = board.make_move(next_move) {
            println!("{}", err);
            // try the move again
            continue;
        }
    }

    // end states
    display(&board)?;
    if board.is_win(Player::First) {
        println!("Player 1 wins!");
    } else if board.is_win(Player::Second) {
        println!("Player 2 wins!");
    } else {
        println!("Draw!");
    }
    println!("Game: {}", board.to_move_string());
    Ok(())
}
