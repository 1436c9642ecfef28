#[cfg(test)]
pub mod test {
    use anyhow::{anyhow, Result};
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use std::time::{Duration, Instant};

    use crate::{
        bitboard::{has_four_in_a_row, BitBoard, Player},
        error::Connect4Error,
        fixture::FixtureCase,
        mcts::MctsConfig,
        negamax::{Negamax, INFINITY},
        position::ScopedMove,
        solver::Solver,
        strategy::{MctsPlayer, NegamaxPlayer, Strategy},
    };

    fn read_fixture(path: &str) -> Result<Vec<FixtureCase>> {
        let file = BufReader::new(File::open(path)?);
        let mut cases = vec![];
        for line in file.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            cases.push(FixtureCase::parse(&line)?);
        }
        if cases.is_empty() {
            return Err(anyhow!("no test cases in {}", path));
        }
        Ok(cases)
    }

    // plays random games, calling `visit` on every position reached
    fn random_positions<F: FnMut(&mut BitBoard)>(
        width: usize,
        height: usize,
        games: usize,
        mut visit: F,
    ) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        for _ in 0..games {
            let mut board = BitBoard::new(width, height)?;
            visit(&mut board);
            while !board.is_terminal() {
                let column = *board
                    .legal_moves()
                    .choose(&mut rng)
                    .ok_or_else(|| anyhow!("no legal moves on a running game"))?;
                board.make_move(column)?;
                visit(&mut board);
            }
        }
        Ok(())
    }

    #[test]
    pub fn empty_board() -> Result<()> {
        let board = BitBoard::standard();

        assert_eq!(&*board.legal_moves(), &[0, 1, 2, 3, 4, 5, 6]);
        assert!(!board.is_terminal());
        assert!(!board.is_draw());
        assert_eq!(board.turn(), Player::First);
        assert_eq!(board.num_moves(), 0);
        assert_eq!(board.score(), 0);
        assert_eq!(board.win_base(Player::First), 22);
        assert_eq!(board.win_base(Player::Second), 22);
        assert_eq!(board.bottom_mask(), 4432676798593);
        assert_eq!(board.top_mask(), 283691315109952);
        assert_eq!(board, BitBoard::default());
        Ok(())
    }

    #[test]
    pub fn masks_for_other_sizes() -> Result<()> {
        let board = BitBoard::new(4, 4)?;
        assert_eq!(board.bottom_mask(), 33825);
        assert_eq!(board.top_mask(), 541200);
        assert_eq!(board.win_base(Player::First), 9);

        let board = BitBoard::new(5, 5)?;
        assert_eq!(board.win_base(Player::First), 14);
        assert_eq!(board.win_base(Player::Second), 13);

        let board = BitBoard::new(6, 7)?;
        assert_eq!(board.bottom_mask(), 1103823438081);
        assert_eq!(board.top_mask(), 141289400074368);

        let board = BitBoard::new(10, 11)?;
        assert_eq!(board.bottom_mask(), 324597801168477624640734324854785);
        assert_eq!(board.top_mask(), 664776296793042175264223897302599680);
        assert_eq!(board.legal_moves().len(), 10);
        Ok(())
    }

    #[test]
    pub fn invalid_dimensions() {
        let invalid = [
            (3, 6),
            (11, 6),
            (7, 3),
            (0, 0),
            (10, 12),
            (7, 18),
            (4, usize::MAX),
        ];
        for &(width, height) in invalid.iter() {
            assert_eq!(
                BitBoard::new(width, height),
                Err(Connect4Error::Configuration { width, height })
            );
        }
        assert!(BitBoard::new(10, 11).is_ok());
        assert!(BitBoard::new(7, 17).is_ok());
        assert!(BitBoard::new(4, 4).is_ok());
    }

    #[test]
    pub fn replay_is_reproducible() -> Result<()> {
        let moves = "11233566724171221527127745";
        let first = BitBoard::from_moves(moves)?;
        let second = BitBoard::from_moves(moves)?;

        assert_eq!(first, second);
        assert_eq!(first.player_mask(Player::First), 216226376712331);
        assert_eq!(first.player_mask(Player::Second), 63016028717332);
        assert_eq!(first.bottom_mask(), 283675082228256);
        assert_eq!(first.turn(), Player::First);
        assert_eq!(first.num_moves(), 26);
        assert!(!first.is_terminal());
        assert_eq!(first.to_move_string(), moves);
        Ok(())
    }

    #[test]
    pub fn replay_masks() -> Result<()> {
        let board = BitBoard::from_moves("1234567765432")?;
        assert_eq!(board.player_mask(Player::First), 4467038634241);
        assert_eq!(board.player_mask(Player::Second), 34898739330);
        assert_eq!(board.bottom_mask(), 8934614172164);
        assert_eq!(board.turn(), Player::Second);
        assert_eq!(board.cell(0, 0), Some(Player::First));
        assert_eq!(board.cell(1, 0), Some(Player::Second));
        assert_eq!(board.cell(1, 1), Some(Player::First));
        assert_eq!(board.cell(6, 1), Some(Player::Second));
        assert_eq!(board.cell(6, 2), None);
        assert_eq!(board.cell(0, 1), None);
        assert_eq!(board.cell(7, 0), None);

        // the tenth column is written '0'
        let board = BitBoard::with_moves(10, 4, "1234567890")?;
        assert_eq!(board.player_mask(Player::First), 35218765414432);
        assert_eq!(board.player_mask(Player::Second), 1100586419201);
        assert_eq!(board.bottom_mask(), 72638703667266);
        assert_eq!(board.top_mask(), 581109629338128);
        assert_eq!(board.to_move_string(), "1234567890");
        Ok(())
    }

    #[test]
    pub fn invalid_replays() -> Result<()> {
        let cases = [
            ("1111111", 6, '1'),
            ("128", 2, '8'),
            ("12a4", 2, 'a'),
            ("440", 2, '0'),
        ];
        for &(moves, index, token) in cases.iter() {
            assert_eq!(
                BitBoard::from_moves(moves),
                Err(Connect4Error::InvalidMoveInSequence { index, token })
            );
        }

        // a failed replay leaves the board as it was
        let mut board = BitBoard::from_moves("4455")?;
        let before = board.clone();
        assert!(board.play_moves("3377777777").is_err());
        assert_eq!(board, before);
        board.play_moves("33")?;
        assert_eq!(board.to_move_string(), "445533");
        Ok(())
    }

    #[test]
    pub fn invalid_moves() -> Result<()> {
        let mut board = BitBoard::standard();
        assert_eq!(board.undo_move(), Err(Connect4Error::EmptyHistory));
        assert_eq!(
            board.make_move(7),
            Err(Connect4Error::InvalidMove { column: 7, width: 7 })
        );

        for _ in 0..6 {
            board.make_move(2)?;
        }
        assert!(!board.is_valid_move(2));
        assert_eq!(
            board.make_move(2),
            Err(Connect4Error::InvalidMove { column: 2, width: 7 })
        );
        assert_eq!(&*board.legal_moves(), &[0, 1, 3, 4, 5, 6]);

        assert_eq!(board.undo_move(), Ok(2));
        assert!(board.is_valid_move(2));
        Ok(())
    }

    #[test]
    pub fn make_undo_inverse() -> Result<()> {
        for &(width, height) in &[(7, 6), (4, 4), (5, 4), (10, 11), (8, 7)] {
            random_positions(width, height, 20, |board| {
                let before = board.clone();
                let moves = board.legal_moves();
                for &column in moves.iter() {
                    board.play(column);
                    assert_ne!(*board, before);
                    assert_eq!(board.undo(), Some(column));
                    assert_eq!(*board, before);
                }
            })?;
        }
        Ok(())
    }

    #[test]
    pub fn legal_moves_agree_with_valid_moves() -> Result<()> {
        for &(width, height) in &[(7, 6), (4, 4), (9, 5)] {
            random_positions(width, height, 20, |board| {
                let legal = board.legal_moves();
                for column in 0..width + 2 {
                    assert_eq!(legal.contains(&column), board.is_valid_move(column));
                }
                let mut sorted = legal;
                sorted.sort_unstable();
                assert_eq!(sorted, legal);
            })?;
        }
        Ok(())
    }

    #[test]
    pub fn disjoint_masks_and_move_count() -> Result<()> {
        random_positions(7, 6, 50, |board| {
            let first = board.player_mask(Player::First);
            let second = board.player_mask(Player::Second);
            assert_eq!(first & second, 0);
            assert_eq!((first | second).count_ones() as usize, board.num_moves());
            assert!(board.bottom_mask().count_ones() as usize <= board.width());
        })
    }

    #[test]
    pub fn win_detection() -> Result<()> {
        // (before the winning move, after it, winner, score)
        let cases = [
            // horizontal
            ("112233", "1122334", Player::First, 18),
            // vertical
            ("4434242", "44342424", Player::Second, -18),
            // diagonal /
            ("1223433454", "12234334544", Player::First, 16),
            // diagonal \
            ("7665455434", "76654554344", Player::First, 16),
        ];
        for &(before, after, winner, score) in cases.iter() {
            let board = BitBoard::from_moves(before)?;
            assert!(!board.is_win(Player::First), "{}", before);
            assert!(!board.is_win(Player::Second), "{}", before);
            assert!(!board.is_terminal());
            assert_eq!(board.score(), 0);

            let board = BitBoard::from_moves(after)?;
            assert!(board.is_win(winner), "{}", after);
            assert!(!board.is_win(winner.opponent()), "{}", after);
            assert!(board.is_terminal());
            assert_eq!(board.score(), score);
        }
        Ok(())
    }

    #[test]
    pub fn no_wins_across_columns() -> Result<()> {
        // first player holds the top two cells of column 1 and the bottom two of column 2
        let board = BitBoard::from_moves("11111717272")?;
        assert!(!board.is_win(Player::First));
        assert!(!board.is_win(Player::Second));

        // runs of three along every direction
        let padded_height = 7;
        for &shift in &[1, padded_height, padded_height - 1, padded_height + 1] {
            let three: u128 = 1 | 1 << shift | 1 << (2 * shift);
            assert!(!has_four_in_a_row(three << 8, padded_height));
            assert!(has_four_in_a_row((three | 1 << (3 * shift)) << 8, padded_height));
        }
        Ok(())
    }

    #[test]
    pub fn draws() -> Result<()> {
        let board = BitBoard::from_moves("126613431456475467333341527215612225546777")?;
        assert!(board.is_draw());
        assert!(board.is_terminal());
        assert!(!board.is_win(Player::First));
        assert!(!board.is_win(Player::Second));
        assert_eq!(board.score(), 0);
        assert!(board.legal_moves().is_empty());
        assert_eq!(Solver::new(board).solve(), 0);

        let board = BitBoard::with_moves(4, 4, "1233233441242411")?;
        assert!(board.is_draw());
        assert!(board.is_terminal());
        assert_eq!(board.score(), 0);
        Ok(())
    }

    #[test]
    pub fn scoped_move_restores_board() -> Result<()> {
        let mut board = BitBoard::from_moves("4455")?;
        let before = board.clone();
        {
            let mut child = ScopedMove::new(&mut board, 3);
            assert_eq!(child.num_moves(), 5);
            let grandchild = ScopedMove::new(&mut *child, 0);
            assert_eq!(grandchild.turn(), Player::First);
        }
        assert_eq!(board, before);
        Ok(())
    }

    #[test]
    pub fn terminal_positions() -> Result<()> {
        // the second player is to move and has already lost
        let mut solver = Solver::new(BitBoard::from_moves("1122334")?);
        assert_eq!(solver.solve(), -18);
        assert_eq!(solver.negamax(-INFINITY, INFINITY), (-18, None));
        Ok(())
    }

    #[test]
    pub fn win_distance() -> Result<()> {
        let solver = Solver::new(BitBoard::from_moves("112233")?);
        assert_eq!(solver.score_to_win_distance(18), 1);
        assert_eq!(solver.score_to_win_distance(0), 36);

        // the first player threatens both ends of a three
        let solver = Solver::new(BitBoard::from_moves("22334")?);
        assert_eq!(solver.score_to_win_distance(-18), 1);

        let solver = Solver::new(BitBoard::from_moves("1727576")?);
        assert_eq!(solver.score_to_win_distance(18), 1);
        Ok(())
    }

    #[test]
    pub fn immediate_wins() -> Result<()> {
        let mut solver = Solver::new(BitBoard::from_moves("112233")?);
        assert_eq!(solver.solve(), 18);
        assert_eq!(solver.num_moves(), 6);
        Ok(())
    }

    #[test]
    pub fn solver_agrees_with_full_search() -> Result<()> {
        for case in read_fixture("test_data/end_game")? {
            let board = BitBoard::from_moves(&case.moves)?;

            let mut solver = Solver::new(board.clone());
            let solved = solver.solve();
            // the board is untouched by the search
            assert_eq!(*solver.position(), board);

            let (value, best_move) = solver.search_full();
            assert_eq!(solver.into_inner(), board);

            assert_eq!(solved, value, "{}", case.moves);
            let best_move = best_move.ok_or_else(|| anyhow!("no best move for {}", case.moves))?;
            assert!(board.is_valid_move(best_move));
        }
        Ok(())
    }

    #[test]
    pub fn small_board_solver_agrees_with_full_search() -> Result<()> {
        random_positions(4, 4, 10, |board| {
            if board.is_terminal() || board.num_moves() < 4 {
                return;
            }
            let expected = Negamax::new().search(board, None, -INFINITY, INFINITY).0;
            assert_eq!(Solver::new(board.clone()).solve(), expected);
        })
    }

    #[test]
    pub fn odd_board_last_cell_win() -> Result<()> {
        // the first player wins by filling the last cell of a 5x5 board
        let moves = "5554423221143515211243334";
        let finished = BitBoard::with_moves(5, 5, moves)?;
        assert!(finished.is_win(Player::First));
        assert!(finished.is_draw());
        assert_eq!(finished.score(), 1);

        let board = BitBoard::with_moves(5, 5, &moves[..moves.len() - 1])?;
        assert!(!board.is_terminal());
        let mut solver = Solver::new(board);
        assert_eq!(solver.solve(), 1);
        assert_eq!(solver.search_full(), (1, Some(3)));
        assert_eq!(solver.score_to_win_distance(1), 1);

        let mut search = Negamax::new();
        let mut finished = finished;
        assert_eq!(search.search(&mut finished, None, -INFINITY, INFINITY), (-1, None));
        Ok(())
    }

    #[test]
    pub fn wins_never_score_zero() -> Result<()> {
        for &(width, height) in [(5, 5), (4, 5), (7, 5), (4, 4)].iter() {
            random_positions(width, height, 200, |board| {
                let score = board.score();
                if board.is_win(Player::First) {
                    assert!(score > 0, "{}", board.to_move_string());
                } else if board.is_win(Player::Second) {
                    assert!(score < 0, "{}", board.to_move_string());
                } else {
                    assert_eq!(score, 0);
                }
            })?;
        }
        Ok(())
    }

    #[test]
    pub fn odd_board_solver_agrees_with_full_search() -> Result<()> {
        random_positions(5, 5, 10, |board| {
            if board.is_terminal() || board.num_moves() < 13 {
                return;
            }
            let expected = Negamax::new().search(board, None, -INFINITY, INFINITY).0;
            assert_eq!(Solver::new(board.clone()).solve(), expected, "{}", board.to_move_string());
        })
    }

    #[test]
    pub fn depth_limited_search() -> Result<()> {
        let mut board = BitBoard::from_moves("112233")?;
        let before = board.clone();

        let mut search = Negamax::new();
        assert_eq!(search.search(&mut board, Some(0), -INFINITY, INFINITY), (0, None));
        assert_eq!(search.search(&mut board, Some(1), -INFINITY, INFINITY), (18, Some(3)));
        assert_eq!(board, before);

        let mut solver = Solver::new(board).with_depth_limit(Some(2));
        assert_eq!(solver.solve(), 18);
        Ok(())
    }

    #[test]
    pub fn strategies_leave_board_unchanged() -> Result<()> {
        let mut board = BitBoard::from_moves("112233")?;
        let before = board.clone();

        let mut negamax = NegamaxPlayer::new(Some(4));
        assert_eq!(negamax.choose_move(&mut board), Some(3));
        assert_eq!(negamax.last_value(), Some(18));
        assert_eq!(board, before);

        let mut mcts = MctsPlayer::new(MctsConfig {
            iterations: 1500,
            seed: Some(9),
            ..MctsConfig::default()
        });
        assert_eq!(mcts.choose_move(&mut board), Some(3));
        assert_eq!(board, before);

        let mut finished = BitBoard::from_moves("1122334")?;
        assert_eq!(negamax.choose_move(&mut finished), None);
        assert_eq!(mcts.choose_move(&mut finished), None);
        Ok(())
    }

    #[test]
    pub fn end_easy() -> Result<()> {
        let mut times = vec![];
        let mut posis = vec![];

        for case in read_fixture("test_data/end_game")? {
            let board = BitBoard::from_moves(&case.moves)?;
            let mut solver = Solver::new(board);
            let start_time = Instant::now();
            let calc = solver.solve();
            let finish_time = Instant::now();
            assert_eq!(case.expected_score, calc, "{}", case.moves);
            times.push(finish_time - start_time);
            posis.push(solver.node_count());
        }

        println!(
            "End-easy:\nMean time: {:.6}ms, Mean no. of positions: {}, kpos/s: {}",
            (times.iter().sum::<Duration>() / times.len() as u32).as_secs_f64() * 1000.0,
            posis.iter().sum::<usize>() as f64 / posis.len() as f64,
            posis
                .iter()
                .zip(times.iter())
                .map(|(p, t)| *p as f64 / t.as_secs_f64().max(1e-9))
                .sum::<f64>()
                / (1000.0 * posis.len() as f64)
        );
        Ok(())
    }
}
