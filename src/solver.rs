//! Search strategies over the sliding-tile state space.
//!
//! `search` is the single entry point. BFS and DFS share one graph search that differs
//! only in frontier discipline, IDDFS runs repeated depth-limited passes, and A* orders
//! its frontier by `f = g + h`. Every strategy reports through the same `SearchRun`
//! bookkeeping, so traces and statistics look the same whichever one ran.
use crate::engine::{reconstruct_path, Board, PuzzleState, SolutionPath, StateArena, StateId};
use crate::heuristics::{DistanceOracle, GoalPositions, Heuristic};
use crate::trace::{Costs, TraceEntry, TraceEvent, Tracer};
use crate::PuzzleError;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

/// Depth ceiling used by IDDFS when none is given.
pub const DEFAULT_DEPTH_LIMIT: usize = 35;

/// The search strategies the solver can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Algorithm {
    /// Breadth-first search; optimal under unit move cost.
    Bfs,
    /// Depth-first search; no optimality guarantee.
    Dfs,
    /// Iterative-deepening DFS up to and including `max_depth`.
    Iddfs { max_depth: usize },
    /// A* with the given heuristic.
    AStar(Heuristic),
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Bfs => "BFS",
            Algorithm::Dfs => "DFS",
            Algorithm::Iddfs { .. } => "IDDFS",
            Algorithm::AStar(_) => "A*",
        }
    }
}

impl FromStr for Algorithm {
    type Err = PuzzleError;

    /// Parses `bfs`, `dfs`, `iddfs` or `astar` (also `a*`), ignoring case.
    ///
    /// IDDFS gets `DEFAULT_DEPTH_LIMIT` and A* the Manhattan heuristic.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            "iddfs" => Ok(Algorithm::Iddfs {
                max_depth: DEFAULT_DEPTH_LIMIT,
            }),
            "astar" | "a*" => Ok(Algorithm::AStar(Heuristic::Manhattan)),
            _ => Err(PuzzleError::UnknownAlgorithm(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Iddfs { max_depth } => write!(f, "IDDFS (depth limit {})", max_depth),
            Algorithm::AStar(h) => write!(f, "A* ({})", h),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Configuration for one call to `search`.
#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub algorithm: Algorithm,
    /// Record a step-by-step trace. When `false` no snapshots are taken.
    pub trace: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            algorithm: Algorithm::Bfs,
            trace: true,
        }
    }
}

/// Everything a search reports back to its caller.
#[derive(Clone, Debug, Serialize)]
pub struct SearchResult {
    pub algorithm: Algorithm,
    /// Root-to-goal path, `None` if the goal was not reached.
    pub solution: Option<SolutionPath>,
    /// Empty unless tracing was enabled.
    pub trace: Vec<TraceEntry>,
    /// Boards in the order they were taken off the frontier. For IDDFS each board is
    /// listed once, the first time any iteration expanded it.
    pub expanded: Vec<Board>,
    /// Deepest depth of any expanded state.
    pub max_depth: usize,
    /// Size of the explored set when the search stopped (last iteration for IDDFS).
    pub explored_count: usize,
    /// Display name of the A* heuristic.
    pub heuristic_name: Option<&'static str>,
}

impl SearchResult {
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    /// Number of slides in the solution, if one was found.
    pub fn move_count(&self) -> Option<usize> {
        self.solution.as_ref().map(SolutionPath::move_count)
    }
}

/// Runs one search from `initial` to `goal` with the strategy in `options`.
///
/// Goal testing and duplicate detection compare boards only. An unreachable goal is
/// reported as `solution: None` with a trace ending in a `failed` entry.
///
/// # Returns
/// * `Err(PuzzleError::SizeMismatch)` if the boards have different widths.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::engine::{Board, PuzzleState};
/// use eight_puzzle_solver::solver::{search, Algorithm, SearchOptions};
///
/// let initial = PuzzleState::new(Board::from_flat(vec![1, 2, 0, 3, 4, 5, 6, 7, 8]).unwrap());
/// let goal = PuzzleState::new(Board::ordered(3));
/// let options = SearchOptions { algorithm: Algorithm::Bfs, trace: false };
/// let result = search(&initial, &goal, &options).unwrap();
/// assert_eq!(result.move_count(), Some(2));
/// assert!(result.trace.is_empty());
/// ```
pub fn search(
    initial: &PuzzleState,
    goal: &PuzzleState,
    options: &SearchOptions,
) -> Result<SearchResult, PuzzleError> {
    let (initial_size, goal_size) = (initial.board().size(), goal.board().size());
    if initial_size != goal_size {
        return Err(PuzzleError::SizeMismatch {
            initial: initial_size,
            goal: goal_size,
        });
    }

    log::info!("Running {} on a {}x{} board", options.algorithm, initial_size, initial_size);
    let mut run = SearchRun::new(options.trace);
    let solution = match options.algorithm {
        Algorithm::Bfs => run.graph_search(initial, goal, Discipline::Fifo),
        Algorithm::Dfs => run.graph_search(initial, goal, Discipline::Lifo),
        Algorithm::Iddfs { max_depth } => run.iterative_deepening(initial, goal, max_depth),
        Algorithm::AStar(heuristic) => run.astar(initial, goal, heuristic),
    };

    match &solution {
        Some(path) => log::info!(
            "{} found a {}-move solution after {} expansions",
            options.algorithm,
            path.move_count(),
            run.expanded.len()
        ),
        None => log::info!(
            "{} found no solution after {} expansions",
            options.algorithm,
            run.expanded.len()
        ),
    }

    let heuristic_name = match options.algorithm {
        Algorithm::AStar(h) => Some(h.display_name()),
        _ => None,
    };
    Ok(SearchResult {
        algorithm: options.algorithm,
        solution,
        trace: run.tracer.into_entries(),
        expanded: run.expanded,
        max_depth: run.max_depth,
        explored_count: run.explored_count,
        heuristic_name,
    })
}

/// Breadth-first search with tracing enabled.
pub fn bfs(initial: &PuzzleState, goal: &PuzzleState) -> Result<SearchResult, PuzzleError> {
    search(initial, goal, &SearchOptions::default())
}

/// Depth-first search with tracing enabled.
pub fn dfs(initial: &PuzzleState, goal: &PuzzleState) -> Result<SearchResult, PuzzleError> {
    search(
        initial,
        goal,
        &SearchOptions {
            algorithm: Algorithm::Dfs,
            trace: true,
        },
    )
}

/// Iterative-deepening DFS over depth limits `0..=max_depth_limit`.
///
/// Returns no solution once the ceiling is passed; this does not prove the goal is
/// unreachable.
pub fn iddfs(
    initial: &PuzzleState,
    goal: &PuzzleState,
    max_depth_limit: usize,
    trace: bool,
) -> Result<SearchResult, PuzzleError> {
    search(
        initial,
        goal,
        &SearchOptions {
            algorithm: Algorithm::Iddfs {
                max_depth: max_depth_limit,
            },
            trace,
        },
    )
}

/// A* with the heuristic named `heuristic` (`"manhattan"` or `"euclidean"`).
///
/// Fails with `PuzzleError::UnknownHeuristic` before any search work for other names.
pub fn astar(
    initial: &PuzzleState,
    goal: &PuzzleState,
    heuristic: &str,
    trace: bool,
) -> Result<SearchResult, PuzzleError> {
    let heuristic: Heuristic = heuristic.parse()?;
    search(
        initial,
        goal,
        &SearchOptions {
            algorithm: Algorithm::AStar(heuristic),
            trace,
        },
    )
}

/// Frontier order for the uninformed graph search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Discipline {
    /// Queue: breadth-first.
    Fifo,
    /// Stack: depth-first.
    Lifo,
}

/// A* frontier entry. The heap pops the lowest `f`, and among equal `f` the entry
/// pushed first.
#[derive(Debug)]
struct SearchNode {
    f: OrderedFloat<f64>,
    g: usize,
    h: f64,
    seq: u64,
    id: StateId,
}

impl SearchNode {
    fn new(id: StateId, g: usize, h: f64, seq: u64) -> Self {
        SearchNode {
            f: OrderedFloat(g as f64 + h),
            g,
            h,
            seq,
            id,
        }
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

/// Bookkeeping shared by every strategy: trace, expansion log and statistics.
struct SearchRun {
    tracer: Tracer,
    expanded: Vec<Board>,
    /// Set for IDDFS, where repeated passes would otherwise list boards many times.
    unique_expansions: Option<HashSet<Board>>,
    max_depth: usize,
    explored_count: usize,
    step: usize,
}

impl SearchRun {
    fn new(trace: bool) -> Self {
        SearchRun {
            tracer: Tracer::new(trace),
            expanded: Vec::new(),
            unique_expansions: None,
            max_depth: 0,
            explored_count: 0,
            step: 0,
        }
    }

    fn note_pop(&mut self, state: &PuzzleState) {
        self.max_depth = self.max_depth.max(state.depth());
        match self.unique_expansions.as_mut() {
            Some(seen) => {
                if seen.insert(state.board().clone()) {
                    self.expanded.push(state.board().clone());
                }
            }
            None => self.expanded.push(state.board().clone()),
        }
    }

    fn goal_found(&mut self, arena: &StateArena, id: StateId, total_cost: usize) -> SolutionPath {
        let path = reconstruct_path(arena, id);
        let step = self.step + 1;
        self.tracer.record(step, || TraceEvent::GoalFound {
            board: arena.get(id).board().clone(),
            solution_length: path.move_count(),
            total_cost,
        });
        path
    }

    fn failed(&mut self, reason: String) {
        let step = self.step + 1;
        self.tracer.record(step, || TraceEvent::Failed { reason });
    }

    /// BFS and DFS. A board is never put on the frontier twice: successors already
    /// explored or already waiting on the frontier are skipped.
    fn graph_search(
        &mut self,
        initial: &PuzzleState,
        goal: &PuzzleState,
        discipline: Discipline,
    ) -> Option<SolutionPath> {
        let mut arena = StateArena::new();
        let root = arena.insert(PuzzleState::new(initial.board().clone()));
        let mut frontier = VecDeque::from([root]);
        let mut frontier_keys = HashSet::from([initial.board().clone()]);
        let mut explored: HashSet<Board> = HashSet::new();

        self.tracer.record(0, || TraceEvent::Initialize {
            board: initial.board().clone(),
            frontier_size: 1,
            explored_size: 0,
            costs: None,
        });

        loop {
            let next = match discipline {
                Discipline::Fifo => frontier.pop_front(),
                Discipline::Lifo => frontier.pop_back(),
            };
            let Some(id) = next else {
                break;
            };
            self.step += 1;
            let state = arena.get(id);
            // Off the frontier now, so a later path may queue it again only if it is
            // not explored below.
            frontier_keys.remove(state.board());
            self.note_pop(state);
            log::trace!("pop depth {}:\n{}", state.depth(), state);
            self.tracer.record(self.step, || TraceEvent::Pop {
                board: state.board().clone(),
                depth: state.depth(),
                action: state.action(),
                frontier_size: frontier.len(),
                explored_size: explored.len(),
                costs: None,
            });

            if state == goal {
                let cost = state.cost();
                self.explored_count = explored.len();
                return Some(self.goal_found(&arena, id, cost));
            }
            explored.insert(state.board().clone());

            let mut successors = arena.expand(id);
            if discipline == Discipline::Lifo {
                // Pushed last, popped first: Up is explored before Down, Left, Right.
                successors.reverse();
            }
            let mut added = 0;
            for successor in successors {
                // Never queue a board twice.
                if explored.contains(successor.board()) || frontier_keys.contains(successor.board()) {
                    continue;
                }
                frontier_keys.insert(successor.board().clone());
                frontier.push_back(arena.insert(successor));
                added += 1;
            }

            if added > 0 {
                self.tracer.record(self.step, || TraceEvent::Expand {
                    added,
                    updated: 0,
                    frontier_size: frontier.len(),
                    explored_size: explored.len(),
                });
            }
        }

        log::debug!("Frontier exhausted with {} states stored", arena.len());
        self.explored_count = explored.len();
        self.failed(format!(
            "Goal not found - frontier exhausted after exploring {} states",
            explored.len()
        ));
        None
    }

    fn iterative_deepening(
        &mut self,
        initial: &PuzzleState,
        goal: &PuzzleState,
        max_depth: usize,
    ) -> Option<SolutionPath> {
        self.unique_expansions = Some(HashSet::new());

        for depth_limit in 0..=max_depth {
            log::debug!("IDDFS: starting pass with depth limit {}", depth_limit);
            self.tracer
                .record(self.step, || TraceEvent::StartIteration { depth_limit });
            if let Some(path) = self.depth_limited(initial, goal, depth_limit) {
                return Some(path);
            }
        }

        self.failed(format!("Goal not found within depth limit {}", max_depth));
        None
    }

    /// One depth-limited DFS pass with its own arena and explored map.
    ///
    /// States at `limit` are goal-tested but not expanded. The explored map records the
    /// shallowest depth each board was expanded at in this pass, so a board reached
    /// again by a shorter path is expanded again.
    fn depth_limited(
        &mut self,
        initial: &PuzzleState,
        goal: &PuzzleState,
        limit: usize,
    ) -> Option<SolutionPath> {
        let mut arena = StateArena::new();
        let root = arena.insert(PuzzleState::new(initial.board().clone()));
        let mut stack = vec![root];
        let mut explored: HashMap<Board, usize> = HashMap::new();
        let already_expanded = |explored: &HashMap<Board, usize>, state: &PuzzleState| {
            explored
                .get(state.board())
                .map_or(false, |&depth| depth <= state.depth())
        };

        while let Some(id) = stack.pop() {
            let state = arena.get(id);
            // Pushed before a shallower copy of the same board was expanded.
            if already_expanded(&explored, state) {
                continue;
            }
            self.step += 1;
            self.note_pop(state);
            self.tracer.record(self.step, || TraceEvent::Pop {
                board: state.board().clone(),
                depth: state.depth(),
                action: state.action(),
                frontier_size: stack.len(),
                explored_size: explored.len(),
                costs: None,
            });

            if state == goal {
                let cost = state.cost();
                self.explored_count = explored.len();
                return Some(self.goal_found(&arena, id, cost));
            }
            // At the limit: goal-tested above, never expanded.
            if state.depth() >= limit {
                continue;
            }
            explored.insert(state.board().clone(), state.depth());

            let mut successors = arena.expand(id);
            successors.reverse();
            let mut added = 0;
            for successor in successors {
                if already_expanded(&explored, &successor) {
                    continue;
                }
                stack.push(arena.insert(successor));
                added += 1;
            }

            if added > 0 {
                self.tracer.record(self.step, || TraceEvent::Expand {
                    added,
                    updated: 0,
                    frontier_size: stack.len(),
                    explored_size: explored.len(),
                });
            }
        }

        self.explored_count = explored.len();
        None
    }

    /// A* with lazy decrease-key: a cheaper path to a queued board pushes a fresh
    /// entry, and the outdated one is dropped when popped because its board is
    /// already explored by then.
    fn astar(
        &mut self,
        initial: &PuzzleState,
        goal: &PuzzleState,
        heuristic: Heuristic,
    ) -> Option<SolutionPath> {
        let positions = GoalPositions::new(goal.board());
        let mut oracle = self
            .tracer
            .is_enabled()
            .then(|| DistanceOracle::new(goal.board().clone()));

        let mut arena = StateArena::new();
        let root = arena.insert(PuzzleState::new(initial.board().clone()));
        let root_h = heuristic.estimate(initial.board(), &positions);
        let mut seq = 0;
        let mut frontier = BinaryHeap::from([SearchNode::new(root, 0, root_h, seq)]);
        // Best g of every board currently waiting on the frontier.
        let mut frontier_g: HashMap<Board, usize> = HashMap::from([(initial.board().clone(), 0)]);
        let mut explored: HashSet<Board> = HashSet::new();

        self.tracer.record(0, || TraceEvent::Initialize {
            board: initial.board().clone(),
            frontier_size: 1,
            explored_size: 0,
            costs: Some(Costs {
                g: 0,
                h: root_h,
                f: root_h,
                true_distance: oracle.as_mut().and_then(|o| o.distance(initial.board())),
            }),
        });

        while let Some(node) = frontier.pop() {
            let state = arena.get(node.id);
            // Stale entry left behind by a cheaper reinsertion.
            if explored.contains(state.board()) {
                continue;
            }
            frontier_g.remove(state.board());
            self.step += 1;
            self.note_pop(state);
            self.tracer.record(self.step, || TraceEvent::Pop {
                board: state.board().clone(),
                depth: state.depth(),
                action: state.action(),
                frontier_size: frontier_g.len(),
                explored_size: explored.len(),
                costs: Some(Costs {
                    g: node.g,
                    h: node.h,
                    f: node.f.into_inner(),
                    true_distance: oracle.as_mut().and_then(|o| o.distance(state.board())),
                }),
            });

            if state == goal {
                self.explored_count = explored.len();
                return Some(self.goal_found(&arena, node.id, node.g));
            }
            explored.insert(state.board().clone());

            let (mut added, mut updated) = (0, 0);
            for successor in arena.expand(node.id) {
                if explored.contains(successor.board()) {
                    continue;
                }
                let g = node.g + 1;
                match frontier_g.get(successor.board()) {
                    Some(&queued) if queued <= g => continue,
                    Some(&queued) => {
                        log::debug!("A*: cheaper path to queued board (g {} -> {})", queued, g);
                        updated += 1;
                    }
                    None => added += 1,
                }
                // Updates overwrite the map entry, so the frontier size stays the
                // number of distinct queued boards.
                let h = heuristic.estimate(successor.board(), &positions);
                frontier_g.insert(successor.board().clone(), g);
                seq += 1;
                let id = arena.insert(successor);
                frontier.push(SearchNode::new(id, g, h, seq));
            }

            if added > 0 || updated > 0 {
                self.tracer.record(self.step, || TraceEvent::Expand {
                    added,
                    updated,
                    frontier_size: frontier_g.len(),
                    explored_size: explored.len(),
                });
            }
        }

        self.explored_count = explored.len();
        self.failed(format!(
            "Goal not found - no solution exists ({} states explored)",
            explored.len()
        ));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Move, Tile};
    use crate::heuristics::true_distance;

    fn state(cells: &[Tile]) -> PuzzleState {
        PuzzleState::new(Board::from_flat(cells.to_vec()).unwrap())
    }

    fn goal3() -> PuzzleState {
        PuzzleState::new(Board::ordered(3))
    }

    fn run(initial: &PuzzleState, goal: &PuzzleState, algorithm: Algorithm, trace: bool) -> SearchResult {
        search(initial, goal, &SearchOptions { algorithm, trace }).unwrap()
    }

    fn all_algorithms() -> Vec<Algorithm> {
        vec![
            Algorithm::Bfs,
            Algorithm::Dfs,
            Algorithm::Iddfs {
                max_depth: DEFAULT_DEPTH_LIMIT,
            },
            Algorithm::AStar(Heuristic::Manhattan),
            Algorithm::AStar(Heuristic::Euclidean),
        ]
    }

    /// Checks the path starts at `initial`, ends at `goal`, and each step is one slide.
    fn assert_valid_path(path: &SolutionPath, initial: &PuzzleState, goal: &PuzzleState) {
        assert_eq!(path.initial_board(), Some(initial.board()));
        assert_eq!(path.final_board(), Some(goal.board()));
        assert_eq!(path.steps()[0].action, None);
        for (i, pair) in path.steps().windows(2).enumerate() {
            let mv = pair[1].action.expect("Every step after the root has a move");
            assert_eq!(pair[0].board.apply_move(mv).as_ref(), Some(&pair[1].board));
            assert_eq!(pair[1].depth, i + 1);
        }
    }

    #[test]
    fn test_two_slide_scenario() {
        let initial = state(&[1, 2, 0, 3, 4, 5, 6, 7, 8]);
        let goal = goal3();

        for algorithm in all_algorithms() {
            let result = run(&initial, &goal, algorithm, true);
            let path = result.solution.as_ref().expect("Solvable instance");
            assert_valid_path(path, &initial, &goal);
            if algorithm == Algorithm::Dfs {
                assert!(path.move_count() >= 2);
            } else {
                assert_eq!(path.moves(), vec![Move::Left, Move::Left], "{}", algorithm);
            }
        }
    }

    #[test]
    fn test_initial_equals_goal() {
        let goal = goal3();
        for algorithm in all_algorithms() {
            let result = run(&goal, &goal, algorithm, true);
            let path = result.solution.expect("Goal is the initial state");
            assert_eq!(path.move_count(), 0);
            assert_eq!(path.steps().len(), 1);
            assert_eq!(result.expanded, vec![Board::ordered(3)]);
            assert_eq!(result.max_depth, 0);
            assert_eq!(result.trace.last().unwrap().event.kind(), "goal_found");
        }
    }

    #[test]
    fn test_unreachable_goal_exhausts_component() {
        let initial = state(&[0, 2, 1, 3]);
        let goal = PuzzleState::new(Board::ordered(2));

        for algorithm in [
            Algorithm::Bfs,
            Algorithm::Dfs,
            Algorithm::AStar(Heuristic::Manhattan),
            Algorithm::AStar(Heuristic::Euclidean),
        ] {
            let result = run(&initial, &goal, algorithm, true);
            assert!(result.solution.is_none());
            // A 2x2 puzzle has 12 configurations per parity class.
            assert_eq!(result.expanded.len(), 12, "{}", algorithm);
            assert_eq!(result.explored_count, 12);
            let last = result.trace.last().unwrap();
            assert_eq!(last.event.kind(), "failed");
        }
    }

    #[test]
    fn test_iddfs_stops_at_depth_ceiling() {
        let initial = state(&[0, 2, 1, 3]);
        let goal = PuzzleState::new(Board::ordered(2));

        let result = iddfs(&initial, &goal, 10, true).unwrap();
        assert!(result.solution.is_none());
        let iterations = result
            .trace
            .iter()
            .filter(|e| e.event.kind() == "start_iteration")
            .count();
        assert_eq!(iterations, 11, "Limits 0 through 10");
        assert_eq!(result.trace.last().unwrap().event.kind(), "failed");
        assert_eq!(result.expanded.len(), 12, "Each board listed once across passes");
        assert!(result.max_depth <= 10);
    }

    #[test]
    fn test_iddfs_finds_goal_at_shallowest_limit() {
        let goal = goal3();
        let initial = PuzzleState::new(Board::scrambled(goal.board(), 14, 5));
        let distance = true_distance(initial.board(), goal.board()).unwrap();

        let result = iddfs(&initial, &goal, DEFAULT_DEPTH_LIMIT, true).unwrap();
        assert_eq!(result.move_count(), Some(distance));

        let limits: Vec<usize> = result
            .trace
            .iter()
            .filter_map(|e| match e.event {
                TraceEvent::StartIteration { depth_limit } => Some(depth_limit),
                _ => None,
            })
            .collect();
        assert_eq!(limits, (0..=distance).collect::<Vec<_>>());

        let mut unique = HashSet::new();
        assert!(result.expanded.iter().all(|b| unique.insert(b.clone())));
    }

    #[test]
    fn test_optimal_algorithms_match_true_distance() {
        let goal = goal3();
        for seed in 0..6u64 {
            let initial = PuzzleState::new(Board::scrambled(goal.board(), 12, seed));
            let distance = true_distance(initial.board(), goal.board()).unwrap();

            for algorithm in [
                Algorithm::Bfs,
                Algorithm::Iddfs {
                    max_depth: DEFAULT_DEPTH_LIMIT,
                },
                Algorithm::AStar(Heuristic::Manhattan),
                Algorithm::AStar(Heuristic::Euclidean),
            ] {
                let result = run(&initial, &goal, algorithm, false);
                let path = result.solution.as_ref().unwrap();
                assert_eq!(path.move_count(), distance, "{} on seed {}", algorithm, seed);
                assert_valid_path(path, &initial, &goal);
            }
        }
    }

    #[test]
    fn test_dfs_path_is_valid_and_not_shorter_than_optimal() {
        let goal = goal3();
        for seed in 0..2u64 {
            let initial = PuzzleState::new(Board::scrambled(goal.board(), 8, seed));
            let distance = true_distance(initial.board(), goal.board()).unwrap();

            let result = run(&initial, &goal, Algorithm::Dfs, false);
            let path = result.solution.as_ref().unwrap();
            assert!(path.move_count() >= distance);
            assert_valid_path(path, &initial, &goal);
            assert!(result.max_depth >= path.move_count());
        }
    }

    #[test]
    fn test_searches_are_deterministic() {
        let goal = goal3();
        let initial = PuzzleState::new(Board::scrambled(goal.board(), 10, 99));
        for algorithm in all_algorithms() {
            let first = run(&initial, &goal, algorithm, true);
            let second = run(&initial, &goal, algorithm, true);
            assert_eq!(first.solution, second.solution, "{}", algorithm);
            assert_eq!(first.expanded, second.expanded);
            assert_eq!(first.trace, second.trace);
        }
    }

    #[test]
    fn test_bfs_trace_structure() {
        let initial = state(&[1, 2, 0, 3, 4, 5, 6, 7, 8]);
        let result = bfs(&initial, &goal3()).unwrap();

        let first = &result.trace[0];
        assert_eq!(first.step, 0);
        assert_eq!(first.event.kind(), "initialize");
        assert_eq!(first.event.board(), Some(initial.board()));

        let pops: Vec<&TraceEntry> = result
            .trace
            .iter()
            .filter(|e| e.event.kind() == "pop")
            .collect();
        assert_eq!(pops.len(), result.expanded.len());
        for (i, pop) in pops.iter().enumerate() {
            assert_eq!(pop.step, i + 1);
        }

        let last = result.trace.last().unwrap();
        match &last.event {
            TraceEvent::GoalFound {
                solution_length,
                total_cost,
                ..
            } => {
                assert_eq!(*solution_length, 2);
                assert_eq!(*total_cost, 2);
            }
            other => panic!("Expected goal_found, got {:?}", other),
        }
        assert_eq!(last.step, pops.len() + 1);
    }

    /// Pairs every `expand` entry with the `pop` it follows.
    fn pop_expand_pairs(trace: &[TraceEntry]) -> Vec<(&TraceEntry, &TraceEntry)> {
        trace
            .windows(2)
            .filter(|w| w[0].event.kind() == "pop" && w[1].event.kind() == "expand")
            .map(|w| (&w[0], &w[1]))
            .collect()
    }

    #[test]
    fn test_trace_sizes_for_graph_searches() {
        let goal = goal3();
        let initial = PuzzleState::new(Board::scrambled(goal.board(), 10, 11));

        for algorithm in [
            Algorithm::Bfs,
            Algorithm::Dfs,
            Algorithm::AStar(Heuristic::Manhattan),
        ] {
            let result = run(&initial, &goal, algorithm, true);
            assert_eq!(result.trace[0].event.sizes(), Some((1, 0)), "{}", algorithm);

            let pops: Vec<&TraceEntry> = result
                .trace
                .iter()
                .filter(|e| e.event.kind() == "pop")
                .collect();
            for (k, pop) in pops.iter().enumerate() {
                let (_, explored) = pop.event.sizes().unwrap();
                assert_eq!(explored, k, "{}: pop {} sees the earlier pops explored", algorithm, k + 1);
            }

            for (pop, expand) in pop_expand_pairs(&result.trace) {
                let (frontier_before, explored_before) = pop.event.sizes().unwrap();
                let (frontier_after, explored_after) = expand.event.sizes().unwrap();
                let TraceEvent::Expand { added, .. } = expand.event else {
                    unreachable!()
                };
                assert_eq!(explored_after, explored_before + 1);
                assert_eq!(frontier_after, frontier_before + added, "{}", algorithm);
            }
        }
    }

    #[test]
    fn test_astar_decrease_key_keeps_distinct_frontier_and_optimal_path() {
        let goal = goal3();
        let mut saw_update = false;

        for seed in 0..40u64 {
            let initial = PuzzleState::new(Board::scrambled(goal.board(), 30, seed));
            let result = astar(&initial, &goal, "manhattan", true).unwrap();
            let updates = result
                .trace
                .iter()
                .filter(|e| matches!(e.event, TraceEvent::Expand { updated, .. } if updated > 0))
                .count();
            if updates == 0 {
                continue;
            }
            saw_update = true;

            assert_eq!(result.move_count(), true_distance(initial.board(), goal.board()));
            // Updated boards were already queued, so only additions grow the frontier.
            for (pop, expand) in pop_expand_pairs(&result.trace) {
                let (frontier_before, _) = pop.event.sizes().unwrap();
                let (frontier_after, _) = expand.event.sizes().unwrap();
                let TraceEvent::Expand { added, .. } = expand.event else {
                    unreachable!()
                };
                assert_eq!(frontier_after, frontier_before + added);
            }
            break;
        }
        assert!(saw_update, "Some 30-move scramble should reach a queued board more cheaply");
    }

    #[test]
    fn test_default_options_run_traced_bfs() {
        let options = SearchOptions::default();
        assert_eq!(options.algorithm, Algorithm::Bfs);
        assert!(options.trace);

        let initial = state(&[1, 2, 0, 3, 4, 5, 6, 7, 8]);
        let result = search(&initial, &goal3(), &options).unwrap();
        assert_eq!(result.algorithm, Algorithm::Bfs);
        assert!(!result.trace.is_empty());
    }

    #[test]
    fn test_astar_trace_audits_admissibility() {
        let goal = goal3();
        let initial = PuzzleState::new(Board::scrambled(goal.board(), 10, 3));

        for name in ["manhattan", "euclidean"] {
            let result = astar(&initial, &goal, name, true).unwrap();
            assert!(result.heuristic_name.is_some());
            let mut audited = 0;
            for entry in &result.trace {
                if let Some(costs) = entry.event.costs() {
                    assert!(costs.true_distance.is_some());
                    assert!(costs.is_admissible(), "{} overestimated at step {}", name, entry.step);
                    assert!((costs.f - (costs.g as f64 + costs.h)).abs() < 1e-9);
                    audited += 1;
                }
            }
            assert_eq!(audited, result.expanded.len() + 1, "One audit per pop plus the root");
        }
    }

    #[test]
    fn test_disabled_trace_still_reports_statistics() {
        let goal = goal3();
        let initial = state(&[1, 2, 0, 3, 4, 5, 6, 7, 8]);
        for algorithm in all_algorithms() {
            let result = run(&initial, &goal, algorithm, false);
            assert!(result.trace.is_empty());
            assert!(!result.expanded.is_empty());
            assert!(result.is_solved());
        }
    }

    #[test]
    fn test_unknown_heuristic_fails_fast() {
        let goal = goal3();
        let err = astar(&goal, &goal, "hamming", true).unwrap_err();
        assert!(matches!(err, PuzzleError::UnknownHeuristic(_)));
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let err = bfs(&goal3(), &PuzzleState::new(Board::ordered(2))).unwrap_err();
        assert!(matches!(err, PuzzleError::SizeMismatch { initial: 3, goal: 2 }));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("BFS".parse::<Algorithm>().unwrap(), Algorithm::Bfs);
        assert_eq!(
            "iddfs".parse::<Algorithm>().unwrap(),
            Algorithm::Iddfs {
                max_depth: DEFAULT_DEPTH_LIMIT
            }
        );
        assert_eq!(
            "a*".parse::<Algorithm>().unwrap(),
            Algorithm::AStar(Heuristic::Manhattan)
        );
        assert!(matches!(
            "greedy".parse::<Algorithm>(),
            Err(PuzzleError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_astar_tie_break_prefers_earlier_entries() {
        let mut arena = StateArena::new();
        let ids: Vec<StateId> = (0..3).map(|_| arena.insert(goal3())).collect();
        // a and b tie on f = 3; c has f = 2.5 but was pushed last.
        let a = SearchNode::new(ids[0], 1, 2.0, 1);
        let b = SearchNode::new(ids[1], 2, 1.0, 2);
        let c = SearchNode::new(ids[2], 0, 2.5, 3);
        let mut heap = BinaryHeap::from([b, c, a]);
        assert_eq!(heap.pop().unwrap().seq, 3);
        assert_eq!(heap.pop().unwrap().seq, 1);
        assert_eq!(heap.pop().unwrap().seq, 2);
    }
}
