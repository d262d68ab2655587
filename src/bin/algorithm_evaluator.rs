use eight_puzzle_solver::engine::{Board, PuzzleState};
use eight_puzzle_solver::heuristics::{true_distance, Heuristic};
use eight_puzzle_solver::solver::{search, Algorithm, SearchOptions, DEFAULT_DEPTH_LIMIT};
use std::collections::HashMap;
use std::time::Instant;

const NUM_RANDOM_BOARDS_FOR_EVALUATION: usize = 20;
const SCRAMBLE_MOVES: usize = 18;
const START_SEED: u64 = 0;

#[derive(Default)]
struct AlgorithmStats {
    expansions: Vec<usize>,
    path_lengths: Vec<usize>,
    suboptimal: usize,
    unsolved: usize,
    seconds: f64,
}

fn average(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<usize>() as f64 / values.len() as f64
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let algorithms = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::Iddfs {
            max_depth: DEFAULT_DEPTH_LIMIT,
        },
        Algorithm::AStar(Heuristic::Manhattan),
        Algorithm::AStar(Heuristic::Euclidean),
    ];
    let goal_board = Board::ordered(3);
    let goal = PuzzleState::new(goal_board.clone());

    let mut all_stats: HashMap<String, AlgorithmStats> = HashMap::new();

    println!(
        "Starting algorithm evaluation for {} boards ({} scramble moves each)...",
        NUM_RANDOM_BOARDS_FOR_EVALUATION, SCRAMBLE_MOVES
    );

    for board_idx in 0..NUM_RANDOM_BOARDS_FOR_EVALUATION {
        let current_seed = START_SEED + board_idx as u64;
        let initial_board = Board::scrambled(&goal_board, SCRAMBLE_MOVES, current_seed);
        let optimal = true_distance(&initial_board, &goal_board);
        let initial = PuzzleState::new(initial_board);

        println!(
            "\nEvaluating Board {} (Seed: {}, optimal moves: {})",
            board_idx,
            current_seed,
            optimal.map_or_else(|| "-".to_string(), |d| d.to_string())
        );

        for algorithm in algorithms {
            let options = SearchOptions {
                algorithm,
                trace: false,
            };
            let start = Instant::now();
            let result = match search(&initial, &goal, &options) {
                Ok(result) => result,
                Err(err) => {
                    eprintln!("Error: {} failed on board {}: {}", algorithm, board_idx, err);
                    continue;
                }
            };
            let elapsed = start.elapsed().as_secs_f64();

            let stats = all_stats.entry(algorithm.to_string()).or_default();
            stats.expansions.push(result.expanded.len());
            stats.seconds += elapsed;
            match result.move_count() {
                Some(moves) => {
                    stats.path_lengths.push(moves);
                    if optimal.map_or(false, |d| moves > d) {
                        stats.suboptimal += 1;
                    }
                    println!(
                        "  Algorithm: {:<26} Moves: {:<6} Expanded: {:<8} Time: {:.4}s",
                        algorithm.to_string(),
                        moves,
                        result.expanded.len(),
                        elapsed
                    );
                }
                None => {
                    stats.unsolved += 1;
                    println!(
                        "  Algorithm: {:<26} No solution  Expanded: {:<8} Time: {:.4}s",
                        algorithm.to_string(),
                        result.expanded.len(),
                        elapsed
                    );
                }
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of boards evaluated: {}", NUM_RANDOM_BOARDS_FOR_EVALUATION);
    println!(
        "Algorithms evaluated: {}",
        algorithms
            .iter()
            .map(Algorithm::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("\n--- Average Expansions ---");

    let mut sorted_stats: Vec<(&String, &AlgorithmStats)> = all_stats.iter().collect();
    // Fewest expansions first.
    sorted_stats.sort_by(|a, b| {
        average(&a.1.expansions)
            .partial_cmp(&average(&b.1.expansions))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for (name, stats) in sorted_stats {
        println!(
            "{:<26}: Expanded = {:>10.1}, Moves = {:>6.2}, Suboptimal = {:>2}, Unsolved = {:>2}, Total Time = {:.3}s",
            name,
            average(&stats.expansions),
            average(&stats.path_lengths),
            stats.suboptimal,
            stats.unsolved,
            stats.seconds
        );
    }
}
