//! # 8-Puzzle Solver Library
//!
//! This library provides the sliding-tile puzzle model and four interchangeable
//! graph-search strategies over it: breadth-first search, depth-first search,
//! iterative-deepening depth-first search and A* (Manhattan or Euclidean heuristic).
//!
//! Every search returns the reconstructed solution path (if any), the boards it
//! expanded, the deepest depth it reached and, when tracing is enabled, a
//! step-by-step trace suitable for auditing heuristic admissibility.
//!
//! It is used by three binaries:
//! - `puzzle_menu`: interactive menu that reads a board and runs one algorithm.
//! - `solve`: one-shot command line solver with JSON and expansion-log output.
//! - `algorithm_evaluator`: compares all strategies on seeded scrambled boards.
//!
//! ## Modules
//! - `engine`: Board representation (`Board`), moves (`Move`), search nodes
//!   (`PuzzleState`) stored in a per-run `StateArena`, and path reconstruction.
//! - `heuristics`: Manhattan and Euclidean estimators and the BFS true-distance oracle.
//! - `trace`: Trace records emitted by the searches.
//! - `solver`: The `search` entry point and the `bfs`, `dfs`, `iddfs` and `astar` wrappers.
//! - `utils`: Parsing boards from strings and writing expanded-board logs.

pub mod engine;
pub mod heuristics;
pub mod solver;
pub mod trace;
pub mod utils;

/// Errors raised while building puzzle inputs or configuring a search.
///
/// An unreachable goal is not an error: the search returns no solution and its
/// trace ends with a `Failed` entry.
#[derive(thiserror::Error, Debug)]
pub enum PuzzleError {
    /// The board is not a square permutation of `0..N`.
    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    /// A board token could not be read as a tile value.
    #[error("Cannot parse tile value '{0}'")]
    ParseCell(String),

    /// Initial and goal boards have different widths.
    #[error("Board size mismatch: initial is {initial}x{initial}, goal is {goal}x{goal}")]
    SizeMismatch { initial: usize, goal: usize },

    /// Heuristic name outside the recognised set.
    #[error("Unknown heuristic '{0}' (expected 'manhattan' or 'euclidean')")]
    UnknownHeuristic(String),

    /// Algorithm name outside the recognised set.
    #[error("Unknown algorithm '{0}' (expected 'bfs', 'dfs', 'iddfs' or 'astar')")]
    UnknownAlgorithm(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
