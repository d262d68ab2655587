use clap::Parser;
use eight_puzzle_solver::engine::{Board, PuzzleState};
use eight_puzzle_solver::heuristics::Heuristic;
use eight_puzzle_solver::solver::{search, Algorithm, SearchOptions, DEFAULT_DEPTH_LIMIT};
use eight_puzzle_solver::utils::{
    expansion_log_name, format_admissibility_table, format_solution, parse_board,
    write_expanded_boards,
};
use eight_puzzle_solver::PuzzleError;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Initial board as comma-separated row-major tiles, 0 for the blank (e.g. 1,2,0,3,4,5,6,7,8)
    initial: String,

    /// Goal board in the same format. Defaults to 0,1,2,...,N-1
    #[clap(short, long)]
    goal: Option<String>,

    /// Search algorithm: bfs, dfs, iddfs or astar
    #[clap(short, long, default_value = "bfs")]
    algorithm: String,

    /// Heuristic used by astar: manhattan or euclidean
    #[clap(long, default_value = "manhattan")]
    heuristic: String,

    /// Depth ceiling for iddfs
    #[clap(short, long, default_value_t = DEFAULT_DEPTH_LIMIT)]
    depth: usize,

    /// Record the step-by-step trace and print it after the solution
    #[clap(short, long)]
    trace: bool,

    /// Write every expanded board to this file
    #[clap(short, long)]
    expanded_out: Option<PathBuf>,

    /// Write the expanded boards to the default file for the algorithm (e.g. bfs.txt)
    #[clap(long, conflicts_with = "expanded_out")]
    log_expanded: bool,

    /// Print the whole search result as JSON instead of text
    #[clap(long)]
    json: bool,

    /// Log progress at info level (RUST_LOG overrides)
    #[clap(short, long)]
    verbose: bool,
}

fn search_options(args: &Args) -> Result<SearchOptions, PuzzleError> {
    let algorithm = match args.algorithm.parse::<Algorithm>()? {
        Algorithm::Iddfs { .. } => Algorithm::Iddfs {
            max_depth: args.depth,
        },
        Algorithm::AStar(_) => Algorithm::AStar(args.heuristic.parse::<Heuristic>()?),
        other => other,
    };
    Ok(SearchOptions {
        algorithm,
        trace: args.trace || args.json,
    })
}

fn run(args: Args) -> Result<(), PuzzleError> {
    let options = search_options(&args)?;
    let initial_board = parse_board(&args.initial)?;
    let goal_board = match &args.goal {
        Some(goal) => parse_board(goal)?,
        None => Board::ordered(initial_board.size()),
    };
    if !initial_board.is_reachable_from(&goal_board) {
        log::warn!("The goal is not reachable from the initial board; the search will exhaust its state space");
    }

    let initial = PuzzleState::new(initial_board);
    let goal = PuzzleState::new(goal_board);

    let start = Instant::now();
    let result = search(&initial, &goal, &options)?;
    let elapsed = start.elapsed();

    let expanded_path = match (&args.expanded_out, args.log_expanded) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(expansion_log_name(&options.algorithm))),
        (None, false) => None,
    };
    if let Some(path) = expanded_path {
        write_expanded_boards(&path, &result.expanded)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Initial State:\n{}\n", initial);
    println!("Goal State:\n{}\n", goal);
    println!("Running {}...", options.algorithm);

    match &result.solution {
        Some(path) => println!("\n{}", format_solution(path)),
        None => println!("\nNo solution found!"),
    }
    println!("States explored: {}", result.explored_count);
    println!("States expanded: {}", result.expanded.len());
    println!("Max Depth : {}", result.max_depth);
    println!("Execution Time : {:.6}s", elapsed.as_secs_f64());

    if args.trace {
        println!("\nTrace ({} entries):", result.trace.len());
        for entry in &result.trace {
            println!("  {}", entry);
        }
        if let Some(name) = result.heuristic_name {
            println!("\nDetailed Trace (Admissibility Check, {}):", name);
            print!("{}", format_admissibility_table(&result.trace));
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
