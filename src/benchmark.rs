use anyhow::{anyhow, Context, Result};
use indicatif::*;
use log::info;
use rayon::prelude::*;

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use connect4_engine::{bitboard::BitBoard, fixture::FixtureCase, solver::Solver};

struct CaseResult {
    moves: String,
    expected: i32,
    calculated: i32,
    time: Duration,
    nodes: usize,
}

fn read_cases(path: &Path) -> Result<Vec<FixtureCase>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read fixture file {}", path.display()))?;
    let mut cases = vec![];
    for line in contents.lines().filter(|line| !line.trim().is_empty()) {
        cases.push(FixtureCase::parse(line)?);
    }
    Ok(cases)
}

fn solve_case(case: &FixtureCase) -> Result<CaseResult> {
    // every worker owns its board and solver
    let board = BitBoard::from_moves(&case.moves)
        .with_context(|| format!("invalid position {}", case.moves))?;
    let mut solver = Solver::new(board);

    let start_time = Instant::now();
    let calculated = solver.solve();
    let finish_time = Instant::now();

    Ok(CaseResult {
        moves: case.moves.clone(),
        expected: case.expected_score,
        calculated,
        time: finish_time - start_time,
        nodes: solver.node_count(),
    })
}

/// Solves every case of a fixture file in parallel and checks the scores
///
/// No new case is started once `time_limit` has passed since the file was
/// started. Returns `false` if any case was skipped for that reason.
pub fn run_file(path: &Path, time_limit: Duration) -> Result<bool> {
    let cases = read_cases(path)?;
    println!("\nProcessing file {}...", path.display());
    println!("Running {} test cases...", cases.len());

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Solving: {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    let start = Instant::now();
    let results = cases
        .par_iter()
        .map(|case| {
            if start.elapsed() > time_limit {
                return None;
            }
            let result = solve_case(case);
            progress.inc(1);
            Some(result)
        })
        .collect::<Vec<_>>();
    progress.finish();

    let mut solved = vec![];
    let mut skipped = 0;
    for result in results {
        match result {
            Some(result) => solved.push(result?),
            None => skipped += 1,
        }
    }

    let failures: Vec<&CaseResult> = solved
        .iter()
        .filter(|result| result.calculated != result.expected)
        .collect();
    for failure in failures.iter() {
        println!(
            "Mismatch for {}: expected {}, calculated {}",
            failure.moves, failure.expected, failure.calculated
        );
    }

    if !solved.is_empty() {
        let times: Vec<Duration> = solved.iter().map(|result| result.time).collect();
        let posis: Vec<usize> = solved.iter().map(|result| result.nodes).collect();
        println!(
            "Mean time: {:.6}ms, Mean no. of positions: {}, kpos/s: {}",
            (times.iter().sum::<Duration>() / times.len() as u32).as_secs_f64() * 1000.0,
            posis.iter().sum::<usize>() as f64 / posis.len() as f64,
            posis
                .iter()
                .zip(times.iter())
                .map(|(p, t)| *p as f64 / t.as_secs_f64().max(1e-9))
                .sum::<f64>()
                / (1000.0 * posis.len() as f64)
        );
    }
    info!(
        "{}: {} solved, {} failed, {} skipped in {:.1}s",
        path.display(),
        solved.len(),
        failures.len(),
        skipped,
        start.elapsed().as_secs_f64()
    );

    if !failures.is_empty() {
        return Err(anyhow!(
            "{} of {} cases in {} returned the wrong score",
            failures.len(),
            solved.len(),
            path.display()
        ));
    }
    if skipped > 0 {
        println!(
            "Time limit of {}s reached, {} cases skipped",
            time_limit.as_secs(),
            skipped
        );
        return Ok(false);
    }
    Ok(true)
}
