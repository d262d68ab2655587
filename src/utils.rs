//! Text input and output around the engine: board parsing, expansion logs and
//! solution printing shared by the binaries.
use crate::engine::{Board, SolutionPath, Tile};
use crate::solver::Algorithm;
use crate::trace::{TraceEntry, TraceEvent};
use crate::PuzzleError;
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// Parses a flat board such as `"1,2,0,3,4,5,6,7,8"` into a `Board`.
///
/// Values may be separated by commas, whitespace, or both. The width is inferred
/// from the number of values, which must be a perfect square.
///
/// # Returns
/// * `Err(PuzzleError::ParseCell)` if a token is not a tile value.
/// * `Err(PuzzleError::InvalidBoard)` if the values do not form a square permutation
///   of `0..N`.
///
/// # Examples
/// ```
/// use eight_puzzle_solver::utils::parse_board;
///
/// let board = parse_board("1,2,0,3,4,5,6,7,8").unwrap();
/// assert_eq!(board.size(), 3);
/// assert_eq!(board.get(0, 2), 0);
///
/// assert!(parse_board("1,2,x,3").is_err());
/// assert!(parse_board("1,2,0").is_err());
/// ```
pub fn parse_board(input: &str) -> Result<Board, PuzzleError> {
    let cells = parse_cells(input)?;
    Board::from_flat(cells)
}

/// Parses a board given as one string per row, e.g. `["1 2 0", "3 4 5", "6 7 8"]`.
///
/// Every row must have as many values as there are rows.
pub fn board_from_str_array(rows: &[&str]) -> Result<Board, PuzzleError> {
    let parsed = rows
        .iter()
        .map(|row| parse_cells(row))
        .collect::<Result<Vec<_>, _>>()?;
    Board::from_rows(&parsed)
}

fn parse_cells(input: &str) -> Result<Vec<Tile>, PuzzleError> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<Tile>()
                .map_err(|_| PuzzleError::ParseCell(token.to_string()))
        })
        .collect()
}

/// Renders expanded boards as the expansion log: one block per board, rows of
/// space-separated tiles, a blank line after each board.
pub fn format_expanded_boards(boards: &[Board]) -> String {
    let mut output = String::new();
    for board in boards {
        output.push_str(&board.to_string());
        output.push_str("\n\n");
    }
    output
}

/// Writes `boards` to `path` in the expansion-log format.
pub fn write_expanded_boards<P: AsRef<Path>>(path: P, boards: &[Board]) -> Result<(), PuzzleError> {
    fs::write(path.as_ref(), format_expanded_boards(boards))?;
    log::info!("Wrote {} expanded boards to {}", boards.len(), path.as_ref().display());
    Ok(())
}

/// Default expansion-log file name for a run, e.g. `bfs.txt` or `astar_euclidean.txt`.
pub fn expansion_log_name(algorithm: &Algorithm) -> String {
    match algorithm {
        Algorithm::Bfs => "bfs.txt".to_string(),
        Algorithm::Dfs => "dfs.txt".to_string(),
        Algorithm::Iddfs { .. } => "iddfs.txt".to_string(),
        Algorithm::AStar(h) => format!("astar_{}.txt", h.key()),
    }
}

/// Renders a solution as numbered steps, each followed by its board.
pub fn format_solution(path: &SolutionPath) -> String {
    let mut output = format!("Solution found with {} moves:\n", path.move_count());
    for (i, step) in path.steps().iter().enumerate() {
        match step.action {
            Some(mv) => writeln!(output, "\nMove {}: {}", i, mv),
            None => writeln!(output, "\nStep {}: Initial State", i),
        }
        .expect("writing to a String cannot fail");
        writeln!(output, "{}", step.board).expect("writing to a String cannot fail");
    }
    output
}

/// Renders the pop entries of an A* trace as a table comparing `h(n)` with the true
/// remaining distance `d*`.
pub fn format_admissibility_table(trace: &[TraceEntry]) -> String {
    let mut output = format!(
        "{:<6} {:<6} {:<8} {:<8} {:<9} {:<12} {:<10} {:<10}\n",
        "Step", "g(n)", "h(n)", "f(n)", "True d*", "Admissible", "Frontier", "Explored"
    );
    for entry in trace {
        let TraceEvent::Pop {
            frontier_size,
            explored_size,
            costs: Some(costs),
            ..
        } = &entry.event
        else {
            continue;
        };
        let true_distance = costs
            .true_distance
            .map_or_else(|| "inf".to_string(), |d| d.to_string());
        let admissible = if costs.is_admissible() { "Yes" } else { "No" };
        writeln!(
            output,
            "{:<6} {:<6} {:<8.2} {:<8.2} {:<9} {:<12} {:<10} {:<10}",
            entry.step, costs.g, costs.h, costs.f, true_distance, admissible, frontier_size, explored_size
        )
        .expect("writing to a String cannot fail");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::Heuristic;

    #[test]
    fn test_parse_board_valid() {
        let board = parse_board("1,2,0,3,4,5,6,7,8").unwrap();
        assert_eq!(board.cells(), &[1, 2, 0, 3, 4, 5, 6, 7, 8]);

        let spaced = parse_board(" 1, 2, 0,\n3 4 5 6 7 8 ").unwrap();
        assert_eq!(spaced, board);

        let four = parse_board("1,2,3,0,4,5,6,7,8,9,10,11,12,13,14,15").unwrap();
        assert_eq!(four.size(), 4);
    }

    #[test]
    fn test_parse_board_invalid_token() {
        let err = parse_board("1,2,0,3,4,5,6,7,-8").unwrap_err();
        assert!(matches!(err, PuzzleError::ParseCell(ref t) if t == "-8"));
    }

    #[test]
    fn test_parse_board_invalid_shape_or_values() {
        assert!(matches!(parse_board("1,2,0,3,4,5,6,7"), Err(PuzzleError::InvalidBoard(_))));
        assert!(matches!(parse_board("1,1,0,3,4,5,6,7,8"), Err(PuzzleError::InvalidBoard(_))));
        assert!(matches!(parse_board(""), Err(PuzzleError::InvalidBoard(_))));
    }

    #[test]
    fn test_board_from_str_array() {
        let board = board_from_str_array(&["1 2 0", "3 4 5", "6 7 8"]).unwrap();
        assert_eq!(board, parse_board("1,2,0,3,4,5,6,7,8").unwrap());
        assert!(board_from_str_array(&["1 2 0", "3 4", "5 6 7 8"]).is_err());
    }

    #[test]
    fn test_format_expanded_boards() {
        let boards = vec![Board::ordered(2), parse_board("1,0,2,3").unwrap()];
        assert_eq!(format_expanded_boards(&boards), "0 1\n2 3\n\n1 0\n2 3\n\n");
        assert_eq!(format_expanded_boards(&[]), "");
    }

    #[test]
    fn test_write_expanded_boards() {
        let path = std::env::temp_dir().join(format!("expanded_{}.txt", std::process::id()));
        write_expanded_boards(&path, &[Board::ordered(2)]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "0 1\n2 3\n\n");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_format_solution() {
        let initial = crate::engine::PuzzleState::new(parse_board("1,0,2,3").unwrap());
        let goal = crate::engine::PuzzleState::new(Board::ordered(2));
        let result = crate::solver::bfs(&initial, &goal).unwrap();
        let text = format_solution(result.solution.as_ref().unwrap());
        assert_eq!(
            text,
            "Solution found with 1 moves:\n\nStep 0: Initial State\n1 0\n2 3\n\nMove 1: Left\n0 1\n2 3\n"
        );
    }

    #[test]
    fn test_format_admissibility_table() {
        let initial = crate::engine::PuzzleState::new(parse_board("1,0,2,3").unwrap());
        let goal = crate::engine::PuzzleState::new(Board::ordered(2));
        let result = crate::solver::astar(&initial, &goal, "manhattan", true).unwrap();
        let table = format_admissibility_table(&result.trace);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("Step"));
        assert_eq!(lines.len(), 1 + result.expanded.len());
        assert!(lines[1..].iter().all(|l| l.contains("Yes")));
    }

    #[test]
    fn test_expansion_log_name() {
        assert_eq!(expansion_log_name(&Algorithm::Bfs), "bfs.txt");
        assert_eq!(
            expansion_log_name(&Algorithm::AStar(Heuristic::Euclidean)),
            "astar_euclidean.txt"
        );
    }
}
