//! Core puzzle model for the sliding-tile search engine.
//!
//! This module defines the fundamental components shared by every search strategy:
//! - `Move`: The four directions the blank can slide in.
//! - `Board`: A validated square grid of tiles with exactly one blank (`0`).
//! - `PuzzleState`: A search node (board plus the move, depth and parent that produced it).
//! - `StateArena`: Per-run storage of states; parents are referenced by `StateId`.
//! - `SolutionPath`: The root-to-goal sequence produced by `reconstruct_path`.
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::PuzzleError;

/// Value stored in a board cell. `0` is the blank.
pub type Tile = u8;

/// Direction the blank slides in.
///
/// `Move::Up` swaps the blank with the tile above it, and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Successor generation order. Traces are only reproducible if this order is kept.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Returns the `(row, column)` delta applied to the blank.
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Move::Up => (-1, 0),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
            Move::Right => (0, 1),
        }
    }

    /// Returns the move that undoes this one.
    pub fn opposite(&self) -> Self {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Move::Up => "Up",
            Move::Down => "Down",
            Move::Left => "Left",
            Move::Right => "Right",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A square grid of tiles stored row-major.
///
/// A `Board` can only be built through validating constructors, so every board holds
/// each value of `0..size*size` exactly once. Boards compare and hash by their cells,
/// which makes them usable directly as explored-set and frontier keys.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::engine::Board;
/// let board = Board::from_flat(vec![1, 2, 0, 3, 4, 5, 6, 7, 8]).unwrap();
/// assert_eq!(board.size(), 3);
/// assert_eq!(board.blank_position(), (0, 2));
/// assert!(Board::from_flat(vec![1, 1, 0, 3]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Board {
    size: usize,
    cells: Vec<Tile>,
}

impl Board {
    /// Creates a board of width `size` from row-major `cells`.
    ///
    /// # Returns
    /// * `Err(PuzzleError::InvalidBoard)` if the cell count is not `size * size`, or if any
    ///   value of `0..size*size` is missing or duplicated.
    pub fn new(size: usize, cells: Vec<Tile>) -> Result<Self, PuzzleError> {
        if size == 0 {
            return Err(PuzzleError::InvalidBoard("board must have at least one cell".to_string()));
        }
        let expected = size * size;
        if cells.len() != expected {
            return Err(PuzzleError::InvalidBoard(format!(
                "expected {} cells for a {}x{} board, found {}",
                expected,
                size,
                size,
                cells.len()
            )));
        }
        if expected > Tile::MAX as usize + 1 {
            return Err(PuzzleError::InvalidBoard(format!(
                "a {}x{} board does not fit in {}-bit tiles",
                size,
                size,
                Tile::BITS
            )));
        }

        let mut seen = vec![false; expected];
        for &tile in &cells {
            let value = tile as usize;
            if value >= expected {
                return Err(PuzzleError::InvalidBoard(format!(
                    "tile {} is out of range 0..{}",
                    tile,
                    expected - 1
                )));
            }
            if seen[value] {
                return Err(PuzzleError::InvalidBoard(format!("tile {} appears more than once", tile)));
            }
            seen[value] = true;
        }
        // With the length fixed and no duplicates, every value is present.
        Ok(Board { size, cells })
    }

    /// Creates a board from a flat row-major list, inferring the width.
    pub fn from_flat(cells: Vec<Tile>) -> Result<Self, PuzzleError> {
        let size = (1..=cells.len()).find(|s| s * s >= cells.len()).unwrap_or(0);
        if size * size != cells.len() {
            return Err(PuzzleError::InvalidBoard(format!(
                "{} cells cannot form a square board",
                cells.len()
            )));
        }
        Board::new(size, cells)
    }

    /// Creates a board from explicit rows.
    pub fn from_rows(rows: &[Vec<Tile>]) -> Result<Self, PuzzleError> {
        let size = rows.len();
        if let Some((r, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(PuzzleError::InvalidBoard(format!(
                "row {} has {} cells, expected {}",
                r,
                row.len(),
                size
            )));
        }
        Board::new(size, rows.concat())
    }

    /// The canonical goal: tiles in ascending order with the blank top-left.
    ///
    /// # Panics
    /// Panics if `size` is 0 or if `size * size` tiles do not fit in `Tile`
    /// (widths above 16).
    ///
    /// ```
    /// use eight_puzzle_solver::engine::Board;
    /// assert_eq!(Board::ordered(3).cells(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    /// ```
    pub fn ordered(size: usize) -> Self {
        assert!(
            size >= 1 && size * size <= Tile::MAX as usize + 1,
            "cannot build an ordered {}x{} board",
            size,
            size
        );
        Board {
            size,
            cells: (0..size * size).map(|v| v as Tile).collect(),
        }
    }

    /// Width (and height) of the board.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major cell values. This is the board's canonical key.
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    /// Returns the tile at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if `r` or `c` are outside the board.
    pub fn get(&self, r: usize, c: usize) -> Tile {
        assert!(r < self.size && c < self.size, "({}, {}) is outside the board", r, c);
        self.cells[r * self.size + c]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks(self.size)
    }

    /// Position of `tile` as `(row, column)`, or `None` if it is not on this board.
    pub fn position_of(&self, tile: Tile) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|&t| t == tile)
            .map(|i| (i / self.size, i % self.size))
    }

    pub fn blank_position(&self) -> (usize, usize) {
        self.position_of(0)
            .expect("a validated board always contains the blank")
    }

    /// Cell the blank at `blank` would move into, if it stays on the board.
    fn slide_target(&self, blank: (usize, usize), mv: Move) -> Option<(usize, usize)> {
        let (dr, dc) = mv.offset();
        let r = blank.0 as isize + dr;
        let c = blank.1 as isize + dc;
        if r >= 0 && r < self.size as isize && c >= 0 && c < self.size as isize {
            Some((r as usize, c as usize))
        } else {
            None
        }
    }

    fn swapped(&self, a: (usize, usize), b: (usize, usize)) -> Board {
        let mut cells = self.cells.clone();
        cells.swap(a.0 * self.size + a.1, b.0 * self.size + b.1);
        Board {
            size: self.size,
            cells,
        }
    }

    /// Returns the board after sliding the blank in direction `mv`, or `None` if the
    /// blank would leave the grid.
    pub fn apply_move(&self, mv: Move) -> Option<Board> {
        let blank = self.blank_position();
        self.slide_target(blank, mv)
            .map(|target| self.swapped(blank, target))
    }

    /// Number of tile pairs (blank excluded) that appear in the opposite order of their values.
    pub fn inversions(&self) -> usize {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &val)| val != 0)
            .map(|(i, &val)| {
                self.cells[i + 1..]
                    .iter()
                    .filter(|&&next| next != 0 && next < val)
                    .count()
            })
            .sum()
    }

    /// Parity invariant preserved by every legal slide.
    ///
    /// Horizontal slides never change the inversion count. A vertical slide moves one
    /// tile past `size - 1` others, so on odd widths the inversion parity is invariant,
    /// while on even widths it flips together with the blank's row.
    fn parity(&self) -> usize {
        let row_term = if self.size % 2 == 0 {
            self.blank_position().0
        } else {
            0
        };
        (self.inversions() + row_term) % 2
    }

    /// Returns `true` if this board can be turned into `other` by legal slides.
    ///
    /// Boards of different widths are never reachable from each other.
    pub fn is_reachable_from(&self, other: &Board) -> bool {
        self.size == other.size && self.parity() == other.parity()
    }

    /// Scrambles `goal` with a seeded random walk of `moves` slides.
    ///
    /// The walk never immediately undoes its previous slide. The result is always
    /// reachable from `goal`, and the same seed always produces the same board.
    ///
    /// # Examples
    /// ```
    /// use eight_puzzle_solver::engine::Board;
    /// let goal = Board::ordered(3);
    /// let a = Board::scrambled(&goal, 20, 7);
    /// assert_eq!(a, Board::scrambled(&goal, 20, 7));
    /// assert!(a.is_reachable_from(&goal));
    /// ```
    pub fn scrambled(goal: &Board, moves: usize, seed: u64) -> Board {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = goal.clone();
        let mut last: Option<Move> = None;

        for _ in 0..moves {
            let blank = board.blank_position();
            let candidates: Vec<Move> = Move::ALL
                .iter()
                .copied()
                .filter(|mv| last.map_or(true, |l| *mv != l.opposite()))
                .filter(|mv| board.slide_target(blank, *mv).is_some())
                .collect();
            if candidates.is_empty() {
                break;
            }
            let mv = candidates[rng.gen_range(0..candidates.len())];
            if let Some(next) = board.apply_move(mv) {
                board = next;
                last = Some(mv);
            }
        }
        board
    }
}

impl fmt::Display for Board {
    /// One row per line, tiles separated by single spaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row.iter().map(|t| t.to_string()).collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Handle to a `PuzzleState` stored in a `StateArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateId(usize);

/// A search node: a board plus the path metadata that produced it.
///
/// Two states are equal iff their boards are equal. Parent, move and depth are not
/// part of equality or hashing, so revisiting a configuration along a different
/// path is recognised as a duplicate.
#[derive(Clone, Debug)]
pub struct PuzzleState {
    board: Board,
    parent: Option<StateId>,
    action: Option<Move>,
    depth: usize,
    cost: usize,
    blank: (usize, usize),
}

impl PuzzleState {
    /// Creates a root state (no parent, no move, depth and cost 0).
    pub fn new(board: Board) -> Self {
        PuzzleState::with_parent(board, None, None, 0, 0)
    }

    /// Creates a state with explicit path metadata.
    pub fn with_parent(
        board: Board,
        parent: Option<StateId>,
        action: Option<Move>,
        depth: usize,
        cost: usize,
    ) -> Self {
        let blank = board.blank_position();
        PuzzleState {
            board,
            parent,
            action,
            depth,
            cost,
            blank,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    /// The move that produced this state; `None` for the root.
    pub fn action(&self) -> Option<Move> {
        self.action
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Path cost accrued from the root. Every move costs 1, so this equals `depth`.
    pub fn cost(&self) -> usize {
        self.cost
    }

    pub fn blank_position(&self) -> (usize, usize) {
        self.blank
    }

    /// Generates the legal single-slide successors of this state.
    ///
    /// `id` is this state's handle in its arena and becomes the successors' parent.
    /// Successors are emitted in `Move::ALL` order (Up, Down, Left, Right), skipping
    /// directions that would push the blank off the grid, so a corner blank yields 2
    /// successors, an edge blank 3 and an interior blank 4.
    pub fn neighbors(&self, id: StateId) -> Vec<PuzzleState> {
        Move::ALL
            .iter()
            .filter_map(|&mv| {
                self.board.slide_target(self.blank, mv).map(|target| PuzzleState {
                    board: self.board.swapped(self.blank, target),
                    parent: Some(id),
                    action: Some(mv),
                    depth: self.depth + 1,
                    cost: self.cost + 1,
                    blank: target,
                })
            })
            .collect()
    }
}

impl PartialEq for PuzzleState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
    }
}

impl Eq for PuzzleState {}

impl Hash for PuzzleState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.board.hash(state);
    }
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}

/// Append-only storage for the states created during one search run.
///
/// Parents are referenced by `StateId` instead of by pointer, so discarding a state
/// never affects its parent and many children can share one parent.
#[derive(Debug, Default)]
pub struct StateArena {
    states: Vec<PuzzleState>,
}

impl StateArena {
    pub fn new() -> Self {
        StateArena::default()
    }

    /// Stores `state` and returns its handle.
    pub fn insert(&mut self, state: PuzzleState) -> StateId {
        self.states.push(state);
        StateId(self.states.len() - 1)
    }

    /// Returns the state behind `id`.
    ///
    /// # Panics
    /// Panics if `id` was issued by a different arena and is out of range.
    pub fn get(&self, id: StateId) -> &PuzzleState {
        &self.states[id.0]
    }

    /// Successors of the state behind `id`, parented to `id`.
    pub fn expand(&self, id: StateId) -> Vec<PuzzleState> {
        self.get(id).neighbors(id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// One element of a solution: the board after `action` was applied at `depth`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolutionStep {
    pub board: Board,
    /// `None` for the initial board.
    pub action: Option<Move>,
    pub depth: usize,
}

/// Ordered root-to-goal sequence of boards.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SolutionPath {
    steps: Vec<SolutionStep>,
}

impl SolutionPath {
    pub fn steps(&self) -> &[SolutionStep] {
        &self.steps
    }

    /// Number of slides from the initial board to the goal.
    pub fn move_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// The slides in order, without the initial board.
    pub fn moves(&self) -> Vec<Move> {
        self.steps.iter().filter_map(|step| step.action).collect()
    }

    pub fn initial_board(&self) -> Option<&Board> {
        self.steps.first().map(|step| &step.board)
    }

    pub fn final_board(&self) -> Option<&Board> {
        self.steps.last().map(|step| &step.board)
    }
}

/// Walks parent links from `goal` back to the root and returns the path root-first.
///
/// The root step has no move and depth 0.
pub fn reconstruct_path(arena: &StateArena, goal: StateId) -> SolutionPath {
    let mut steps = Vec::new();
    let mut current = Some(goal);

    while let Some(id) = current {
        let state = arena.get(id);
        steps.push(SolutionStep {
            board: state.board().clone(),
            action: state.action(),
            depth: state.depth(),
        });
        current = state.parent();
    }

    steps.reverse();
    SolutionPath { steps }
}
