//! Line queries on the 3x3 board used by the tic-tac-toe reward shaping

use crate::types::{Cell, Player};

/// Board indices of one row, column or diagonal
pub type Line = [usize; 3];

/// The eight lines of the board: rows, then columns, then diagonals
pub const WINNING_LINES: [Line; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Stateless queries over a row-major `[Cell; 9]`
pub struct LineAnalyzer;

impl LineAnalyzer {
    /// Marks of `player` and empty cells on `line`.
    fn tally(cells: &[Cell; 9], line: &Line, player: Player) -> (usize, usize) {
        let own = Cell::from(player);
        line.iter().fold((0, 0), |(marks, empty), &index| match cells[index] {
            cell if cell == own => (marks + 1, empty),
            Cell::Empty => (marks, empty + 1),
            _ => (marks, empty),
        })
    }

    pub fn has_won(cells: &[Cell; 9], player: Player) -> bool {
        WINNING_LINES
            .iter()
            .any(|line| Self::tally(cells, line, player).0 == 3)
    }

    /// Lines that contain board index `index` (two to four of them).
    pub fn lines_through(index: usize) -> impl Iterator<Item = &'static Line> {
        WINNING_LINES
            .iter()
            .filter(move |line| line.contains(&index))
    }

    pub fn count(cells: &[Cell; 9], line: &Line, player: Player) -> usize {
        Self::tally(cells, line, player).0
    }

    /// Whether a line through `index` holds exactly two of `player`'s marks.
    ///
    /// The third cell may be empty or taken by the other side.
    pub fn pair_through(cells: &[Cell; 9], index: usize, player: Player) -> bool {
        Self::lines_through(index).any(|line| Self::count(cells, line, player) == 2)
    }

    /// Empty cell that would complete a line for `player`, if any.
    pub fn threat(cells: &[Cell; 9], player: Player) -> Option<usize> {
        WINNING_LINES.iter().find_map(|line| {
            let (marks, empty) = Self::tally(cells, line, player);
            if marks == 2 && empty == 1 {
                line.iter().copied().find(|&index| cells[index] == Cell::Empty)
            } else {
                None
            }
        })
    }

    /// Whether `player` could win with their next mark.
    pub fn has_immediate_win(cells: &[Cell; 9], player: Player) -> bool {
        Self::threat(cells, player).is_some()
    }
}
