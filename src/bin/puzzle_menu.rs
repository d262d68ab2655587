use eight_puzzle_solver::engine::{Board, PuzzleState};
use eight_puzzle_solver::heuristics::Heuristic;
use eight_puzzle_solver::solver::{search, Algorithm, SearchOptions, DEFAULT_DEPTH_LIMIT};
use eight_puzzle_solver::utils::{
    expansion_log_name, format_admissibility_table, format_solution, parse_board,
    write_expanded_boards,
};
use std::io::{self, Write};
use std::time::Instant;

const SEPARATOR: &str = "==================================================";

fn prompt(message: &str) -> io::Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None); // EOF
    }
    Ok(Some(input.trim().to_string()))
}

fn read_initial_board() -> io::Result<Option<Board>> {
    println!("\nEnter initial state as comma-separated numbers (0 for blank)");
    println!("Example: 1,2,0,3,4,5,6,7,8");
    loop {
        let Some(input) = prompt("Initial state: ")? else {
            return Ok(None);
        };
        match parse_board(&input) {
            Ok(board) => return Ok(Some(board)),
            Err(err) => println!("{}. Please try again.", err),
        }
    }
}

fn read_heuristic() -> io::Result<Option<Heuristic>> {
    loop {
        let Some(input) = prompt("Choose heuristic (manhattan/euclidean): ")? else {
            return Ok(None);
        };
        match input.parse::<Heuristic>() {
            Ok(heuristic) => return Ok(Some(heuristic)),
            Err(_) => println!("Invalid choice. Please enter 'manhattan' or 'euclidean'."),
        }
    }
}

fn run_algorithm(initial: &PuzzleState, goal: &PuzzleState, algorithm: Algorithm) {
    println!("\nRunning {}...", algorithm);
    let options = SearchOptions {
        algorithm,
        trace: matches!(algorithm, Algorithm::AStar(_)),
    };

    let start = Instant::now();
    let result = match search(initial, goal, &options) {
        Ok(result) => result,
        Err(err) => {
            println!("Search failed: {}", err);
            return;
        }
    };
    let elapsed = start.elapsed();

    if let Some(name) = result.heuristic_name {
        println!("\nUsing {}", name);
    }
    println!("\nStates explored: {}", result.explored_count);
    match &result.solution {
        Some(path) => {
            println!("\n{}", format_solution(path));
            println!("{}", SEPARATOR);
        }
        None => println!("\nNo solution found!"),
    }
    if result.heuristic_name.is_some() {
        println!("\nDetailed Trace (Admissibility Check):");
        print!("{}", format_admissibility_table(&result.trace));
    }
    println!("Execution Time : {:.6}s", elapsed.as_secs_f64());
    println!("Max Depth : {}", result.max_depth);

    let log_name = expansion_log_name(&algorithm);
    if let Err(err) = write_expanded_boards(&log_name, &result.expanded) {
        println!("Could not write {}: {}", log_name, err);
    } else {
        println!("Expanded boards written to {}", log_name);
    }
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("8-Puzzle Solver");
    println!("{}", SEPARATOR);

    let Some(initial_board) = read_initial_board()? else {
        return Ok(());
    };
    let goal_board = Board::ordered(initial_board.size());
    if !initial_board.is_reachable_from(&goal_board) {
        println!("\nWarning: this board cannot reach the goal; searches will report no solution.");
    }

    let initial = PuzzleState::new(initial_board);
    let goal = PuzzleState::new(goal_board);

    println!("\nInitial State:\n{}", initial);
    println!("\nGoal State:\n{}", goal);
    println!("\n{}", SEPARATOR);

    println!("\nSelect Search Algorithm:");
    println!("1. BFS");
    println!("2. DFS");
    println!("3. IDDFS");
    println!("4. A*");
    println!("5. Exit");

    let Some(choice) = prompt("\nEnter your choice (1-5): ")? else {
        return Ok(());
    };
    let algorithm = match choice.as_str() {
        "1" => Algorithm::Bfs,
        "2" => Algorithm::Dfs,
        "3" => Algorithm::Iddfs {
            max_depth: DEFAULT_DEPTH_LIMIT,
        },
        "4" => match read_heuristic()? {
            Some(heuristic) => Algorithm::AStar(heuristic),
            None => return Ok(()),
        },
        "5" => {
            println!("\nExiting...");
            return Ok(());
        }
        _ => {
            println!("\nInvalid choice!");
            return Ok(());
        }
    };

    run_algorithm(&initial, &goal, algorithm);
    Ok(())
}
