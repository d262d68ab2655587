//! Remaining-distance estimates for A* and the exact distance used to audit them.
//!
//! `GoalPositions` is built once per goal; Manhattan and Euclidean estimates are a
//! single pass over the board against it.
use crate::engine::{Board, Move, Tile};
use crate::PuzzleError;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

/// Distance estimators available to A*.
///
/// Both ignore the blank and are admissible and consistent under unit-cost slides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Heuristic {
    Manhattan,
    Euclidean,
}

impl Heuristic {
    pub const ALL: [Heuristic; 2] = [Heuristic::Manhattan, Heuristic::Euclidean];

    /// Short name accepted by `FromStr`.
    pub fn key(&self) -> &'static str {
        match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::Euclidean => "euclidean",
        }
    }

    /// Human readable name reported in search results.
    pub fn display_name(&self) -> &'static str {
        match self {
            Heuristic::Manhattan => "Manhattan Distance",
            Heuristic::Euclidean => "Euclidean Distance",
        }
    }

    /// Estimates the remaining slides from `board` to the goal described by `goal`.
    pub fn estimate(&self, board: &Board, goal: &GoalPositions) -> f64 {
        match self {
            Heuristic::Manhattan => goal.manhattan(board) as f64,
            Heuristic::Euclidean => goal.euclidean(board),
        }
    }
}

impl FromStr for Heuristic {
    type Err = PuzzleError;

    /// Parses `"manhattan"` or `"euclidean"`, ignoring case and surrounding whitespace.
    ///
    /// ```
    /// use eight_puzzle_solver::heuristics::Heuristic;
    /// assert_eq!(" Manhattan ".parse::<Heuristic>().unwrap(), Heuristic::Manhattan);
    /// assert!("hamming".parse::<Heuristic>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Heuristic::ALL
            .into_iter()
            .find(|h| h.key() == wanted)
            .ok_or_else(|| PuzzleError::UnknownHeuristic(s.trim().to_string()))
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tile-value to goal-position lookup.
///
/// Built once per search so each heuristic evaluation is a single scan of the board.
#[derive(Clone, Debug)]
pub struct GoalPositions {
    positions: Vec<(usize, usize)>,
}

impl GoalPositions {
    pub fn new(goal: &Board) -> Self {
        let mut positions = vec![(0, 0); goal.cells().len()];
        for (i, &tile) in goal.cells().iter().enumerate() {
            positions[tile as usize] = (i / goal.size(), i % goal.size());
        }
        GoalPositions { positions }
    }

    /// Goal `(row, column)` of `tile`.
    ///
    /// # Panics
    /// Panics if `tile` does not exist on the goal board.
    pub fn position(&self, tile: Tile) -> (usize, usize) {
        self.positions[tile as usize]
    }

    /// Row and column displacement of every non-blank tile of `board`.
    fn displacements<'a>(&'a self, board: &'a Board) -> impl Iterator<Item = (usize, usize)> + 'a {
        let size = board.size();
        board
            .cells()
            .iter()
            .enumerate()
            .filter(|&(_, &tile)| tile != 0)
            .map(move |(i, &tile)| {
                let (goal_r, goal_c) = self.position(tile);
                ((i / size).abs_diff(goal_r), (i % size).abs_diff(goal_c))
            })
    }

    pub fn manhattan(&self, board: &Board) -> u32 {
        self.displacements(board)
            .map(|(dr, dc)| (dr + dc) as u32)
            .sum()
    }

    pub fn euclidean(&self, board: &Board) -> f64 {
        self.displacements(board)
            .map(|(dr, dc)| ((dr * dr + dc * dc) as f64).sqrt())
            .sum()
    }
}

/// Sum over non-blank tiles of `|Δrow| + |Δcol|` between `board` and `goal`.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::engine::Board;
/// use eight_puzzle_solver::heuristics::manhattan_distance;
/// let goal = Board::ordered(3);
/// let board = Board::from_flat(vec![1, 2, 0, 3, 4, 5, 6, 7, 8]).unwrap();
/// assert_eq!(manhattan_distance(&board, &goal), 2);
/// assert_eq!(manhattan_distance(&goal, &goal), 0);
/// ```
pub fn manhattan_distance(board: &Board, goal: &Board) -> u32 {
    GoalPositions::new(goal).manhattan(board)
}

/// Sum over non-blank tiles of the straight-line distance between `board` and `goal`.
pub fn euclidean_distance(board: &Board, goal: &Board) -> f64 {
    GoalPositions::new(goal).euclidean(board)
}

/// Exact shortest-path distance from boards to a fixed goal.
///
/// Runs a breadth-first search outward from the goal and memoises every distance it
/// settles. Slides are reversible, so the distance from a board to the goal equals the
/// distance from the goal to that board. Repeated queries during one search reuse the
/// layers already expanded, and boards of the wrong parity are rejected without search.
#[derive(Debug)]
pub struct DistanceOracle {
    goal: Board,
    distances: HashMap<Board, usize>,
    queue: VecDeque<Board>,
}

impl DistanceOracle {
    pub fn new(goal: Board) -> Self {
        let mut distances = HashMap::new();
        distances.insert(goal.clone(), 0);
        let queue = VecDeque::from([goal.clone()]);
        DistanceOracle {
            goal,
            distances,
            queue,
        }
    }

    /// Minimum number of slides from `board` to the goal, or `None` if unreachable.
    pub fn distance(&mut self, board: &Board) -> Option<usize> {
        if let Some(&d) = self.distances.get(board) {
            return Some(d);
        }
        if !board.is_reachable_from(&self.goal) {
            return None;
        }

        while let Some(current) = self.queue.pop_front() {
            let depth = self.distances[&current];
            for mv in Move::ALL {
                let Some(next) = current.apply_move(mv) else {
                    continue;
                };
                if self.distances.contains_key(&next) {
                    continue;
                }
                let found = &next == board;
                self.distances.insert(next.clone(), depth + 1);
                self.queue.push_back(next);
                if found {
                    return Some(depth + 1);
                }
            }
        }
        None
    }

    /// Number of boards whose distance is already known.
    pub fn settled(&self) -> usize {
        self.distances.len()
    }
}

/// Shortest-path distance between two boards, by breadth-first search.
///
/// Used to audit heuristic admissibility; returns `None` if `goal` cannot be reached.
pub fn true_distance(board: &Board, goal: &Board) -> Option<usize> {
    DistanceOracle::new(goal.clone()).distance(board)
}
