//! Connect four with gravity drops and shaped rewards

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    error::{Error, Result},
    ports::{Environment, TwoPlayerGame},
    types::{Cell, GameOutcome, Player, StateId},
};

const NAME: &str = "connect-four";

/// Discs in a row needed to win
pub const CONNECT: usize = 4;

const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Dropping a disc into a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Column(pub usize);

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectFourRewards {
    pub win: f64,
    pub penalty: f64,
    /// Three in an open window of four
    pub small: f64,
}

impl Default for ConnectFourRewards {
    fn default() -> Self {
        Self {
            win: 1.0,
            penalty: -1.0,
            small: 0.2,
        }
    }
}

/// Connect four environment
///
/// Rows are counted from the bottom. The state id packs every column as a
/// bit stack of `rows + 1` bits: one bit per disc (1 for X, 0 for O) from
/// the bottom up, then a single sentinel 1 above the top disc. That keeps
/// the id injective as long as the whole board fits in 64 bits.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectFour {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    heights: Vec<usize>,
    to_move: Player,
    outcome: Option<GameOutcome>,
    rewards: ConnectFourRewards,
}

impl ConnectFour {
    pub const DEFAULT_ROWS: usize = 6;
    pub const DEFAULT_COLS: usize = 7;

    /// The standard 6x7 board.
    pub fn new() -> Self {
        Self::empty(Self::DEFAULT_ROWS, Self::DEFAULT_COLS)
    }

    /// A custom board size.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] if either side is shorter than four
    /// or the board does not fit the 64-bit state id.
    pub fn with_size(rows: usize, cols: usize) -> Result<Self> {
        Self::check_size(rows, cols)?;
        Ok(Self::empty(rows, cols))
    }

    pub fn with_rewards(mut self, rewards: ConnectFourRewards) -> Self {
        self.rewards = rewards;
        self
    }

    /// Build a position from rows given top first, as the board is printed.
    ///
    /// Cells use `X`, `O` and `.` (or `E`/space). Floating discs are rejected.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        Self::check_size(height, width)?;

        let mut game = Self::empty(height, width);
        for (printed, row) in rows.iter().enumerate() {
            let r = height - 1 - printed;
            let chars: Vec<char> = row.chars().collect();
            if chars.len() != width {
                return Err(Self::invalid(format!(
                    "row {printed} has {} cells, expected {width}",
                    chars.len()
                )));
            }
            for (c, ch) in chars.into_iter().enumerate() {
                let cell = Cell::from_char(ch)
                    .ok_or_else(|| Self::invalid(format!("unknown cell '{ch}'")))?;
                game.cells[r * width + c] = cell;
            }
        }

        for c in 0..width {
            let filled = (0..height)
                .take_while(|&r| game.cells[r * width + c] != Cell::Empty)
                .count();
            if (filled..height).any(|r| game.cells[r * width + c] != Cell::Empty) {
                return Err(Self::invalid(format!("floating disc in column {c}")));
            }
            game.heights[c] = filled;
        }

        let (x, o) = game.counts();
        game.to_move = if x > o { Player::O } else { Player::X };
        game.outcome = game.evaluate_outcome();
        Ok(game)
    }

    fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
            heights: vec![0; cols],
            to_move: Player::X,
            outcome: None,
            rewards: ConnectFourRewards::default(),
        }
    }

    fn check_size(rows: usize, cols: usize) -> Result<()> {
        if rows < CONNECT || cols < CONNECT {
            return Err(Error::InvalidConfiguration {
                message: format!("a {rows}x{cols} board cannot hold {CONNECT} in a row"),
            });
        }
        if (rows + 1) * cols > 64 {
            return Err(Error::InvalidConfiguration {
                message: format!("a {rows}x{cols} board does not fit a 64-bit state id"),
            });
        }
        Ok(())
    }

    fn invalid(reason: String) -> Error {
        Error::InvalidState {
            environment: NAME,
            reason,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rewards(&self) -> ConnectFourRewards {
        self.rewards
    }

    pub fn set_rewards(&mut self, rewards: ConnectFourRewards) {
        self.rewards = rewards;
    }

    /// Cell at `row` (from the bottom) and `col`.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    fn at(&self, row: isize, col: isize) -> Option<Cell> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            None
        } else {
            Some(self.cell(row as usize, col as usize))
        }
    }

    fn counts(&self) -> (usize, usize) {
        self.cells.iter().fold((0, 0), |(x, o), cell| match cell {
            Cell::X => (x + 1, o),
            Cell::O => (x, o + 1),
            Cell::Empty => (x, o),
        })
    }

    fn validate(&self) -> Result<()> {
        let (x, o) = self.counts();
        if x == o || x == o + 1 {
            Ok(())
        } else {
            Err(Self::invalid(format!("{x} X discs and {o} O discs")))
        }
    }

    fn is_full(&self) -> bool {
        self.heights.iter().all(|&height| height == self.rows)
    }

    /// Run of `player` discs through (row, col) along a direction, not
    /// counting the cell itself.
    fn run_length(&self, row: usize, col: usize, (dr, dc): (isize, isize), player: Player) -> usize {
        let target = Cell::from(player);
        let mut length = 0;
        for sign in [1, -1] {
            let (mut r, mut c) = (row as isize, col as isize);
            loop {
                r += sign * dr;
                c += sign * dc;
                if self.at(r, c) != Some(target) {
                    break;
                }
                length += 1;
            }
        }
        length
    }

    /// Whether a `player` disc at (row, col) would complete a line.
    fn completes_line(&self, row: usize, col: usize, player: Player) -> bool {
        DIRECTIONS
            .iter()
            .any(|&dir| self.run_length(row, col, dir, player) + 1 >= CONNECT)
    }

    /// Whether `player` could win with the next drop.
    fn has_winning_drop(&self, player: Player) -> bool {
        (0..self.cols).any(|col| {
            let row = self.heights[col];
            row < self.rows && self.completes_line(row, col, player)
        })
    }

    /// Whether some window through (row, col) holds `CONNECT - 1` of the
    /// player's discs and one empty cell.
    fn open_window_through(&self, row: usize, col: usize, player: Player) -> bool {
        let target = Cell::from(player);
        DIRECTIONS.iter().any(|&(dr, dc)| {
            (0..CONNECT as isize).any(|offset| {
                let start = (row as isize - offset * dr, col as isize - offset * dc);
                let window: Option<Vec<Cell>> = (0..CONNECT as isize)
                    .map(|i| self.at(start.0 + i * dr, start.1 + i * dc))
                    .collect();
                window.is_some_and(|cells| {
                    let own = cells.iter().filter(|&&cell| cell == target).count();
                    let empty = cells.iter().filter(|&&cell| cell == Cell::Empty).count();
                    own == CONNECT - 1 && empty == 1
                })
            })
        })
    }

    fn evaluate_outcome(&self) -> Option<GameOutcome> {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if let Some(player) = self.cell(row, col).owner()
                    && self.completes_line(row, col, player)
                {
                    return Some(GameOutcome::Win(player));
                }
            }
        }
        self.is_full().then_some(GameOutcome::Draw)
    }
}

impl Default for ConnectFour {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for ConnectFour {
    type Action = Column;

    fn state_id(&self) -> Result<StateId> {
        self.validate()?;
        let stride = self.rows + 1;
        let mut id = 0u64;
        for col in 0..self.cols {
            let base = col * stride;
            let height = self.heights[col];
            for row in 0..height {
                if self.cell(row, col) == Cell::X {
                    id |= 1u64 << (base + row);
                }
            }
            id |= 1u64 << (base + height);
        }
        Ok(StateId::new(id))
    }

    fn legal_actions(&self) -> Vec<Column> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        (0..self.cols)
            .filter(|&col| self.heights[col] < self.rows)
            .map(Column)
            .collect()
    }

    fn execute(&mut self, action: &Column) -> Result<f64> {
        if self.outcome.is_some() {
            return Err(Error::EpisodeFinished {
                state: self.state_id()?,
            });
        }
        let Column(col) = *action;
        if col >= self.cols || self.heights[col] == self.rows {
            return Err(Error::IllegalAction {
                environment: NAME,
                action: action.to_string(),
            });
        }

        let mover = self.to_move;
        let opponent = mover.opponent();
        let row = self.heights[col];
        self.cells[row * self.cols + col] = Cell::from(mover);
        self.heights[col] += 1;
        self.validate()?;

        let won = self.completes_line(row, col, mover);
        let mut reward = 0.0;
        if self.open_window_through(row, col, mover) {
            reward += self.rewards.small;
        }
        let blocked = self.completes_line(row, col, opponent);
        if self.has_winning_drop(opponent) && !blocked {
            reward = self.rewards.penalty;
        }
        if won {
            reward += self.rewards.win;
            self.outcome = Some(GameOutcome::Win(mover));
        } else if self.is_full() {
            self.outcome = Some(GameOutcome::Draw);
        }
        self.to_move = opponent;

        trace!(%mover, col, row, reward, outcome = ?self.outcome, "drop");
        Ok(reward)
    }

    fn reset(&mut self) {
        self.cells.fill(Cell::Empty);
        self.heights.fill(0);
        self.to_move = Player::X;
        self.outcome = None;
    }

    fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    fn name(&self) -> &str {
        NAME
    }

    fn layout(&self) -> Option<String> {
        Some(format!("{}x{}", self.rows, self.cols))
    }
}

impl TwoPlayerGame for ConnectFour {
    fn to_move(&self) -> Player {
        self.to_move
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }
}

impl fmt::Display for ConnectFour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.rows).rev() {
            let line: String = (0..self.cols).map(|col| self.cell(row, col).to_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limits() {
        assert!(ConnectFour::with_size(3, 7).is_err());
        assert!(ConnectFour::with_size(7, 8).is_ok());
        assert!(ConnectFour::with_size(8, 8).is_err());
    }

    #[test]
    fn test_empty_board_id_is_sentinels() {
        let game = ConnectFour::with_size(4, 4).unwrap();
        let expected = 1 | 1 << 5 | 1 << 10 | 1 << 15;
        assert_eq!(game.state_id().unwrap(), StateId::new(expected));
    }

    #[test]
    fn test_ids_differ_by_colour_and_height() {
        let mut a = ConnectFour::new();
        a.execute(&Column(0)).unwrap();
        let mut b = ConnectFour::new();
        b.execute(&Column(1)).unwrap();
        assert_ne!(a.state_id().unwrap(), b.state_id().unwrap());

        let x_then_o = ConnectFour::from_rows(&[
            ".......", ".......", ".......", ".......", "O......", "X......",
        ])
        .unwrap();
        let o_then_x = ConnectFour::from_rows(&[
            ".......", ".......", ".......", ".......", "X......", "O......",
        ])
        .unwrap();
        assert_ne!(x_then_o.state_id().unwrap(), o_then_x.state_id().unwrap());
    }

    #[test]
    fn test_floating_disc_rejected() {
        let result = ConnectFour::from_rows(&["....", "X...", "....", "O..."]);
        assert!(matches!(result, Err(Error::InvalidState { .. })));
    }

    #[test]
    fn test_full_column_is_illegal() {
        let mut game = ConnectFour::with_size(4, 4).unwrap();
        for _ in 0..4 {
            game.execute(&Column(0)).unwrap();
        }
        assert!(!game.legal_actions().contains(&Column(0)));
        assert!(matches!(
            game.execute(&Column(0)),
            Err(Error::IllegalAction { .. })
        ));
    }

    #[test]
    fn test_vertical_win() {
        let mut game = ConnectFour::from_rows(&[
            ".......", ".......", ".......", "X......", "XO.....", "XO.....",
        ])
        .unwrap();
        assert_eq!(game.to_move(), Player::O);
        game.execute(&Column(2)).unwrap();

        // The new column also leaves an open three below the top, so the
        // small reward stacks on the win.
        let rewards = game.rewards();
        let reward = game.execute(&Column(0)).unwrap();
        assert_eq!(reward, rewards.small + rewards.win);
        assert_eq!(game.outcome(), Some(GameOutcome::Win(Player::X)));
        assert!(game.legal_actions().is_empty());
    }

    #[test]
    fn test_win_leaving_open_threat_is_penalized_first() {
        let mut game = ConnectFour::from_rows(&[
            ".......", ".......", ".......", "......O", "......O", "XXX...O",
        ])
        .unwrap();
        assert_eq!(game.to_move(), Player::X);
        let rewards = game.rewards();

        // X completes the bottom row while O can still top off column 6. The
        // penalty also replaces the open-three bonus the drop earns.
        let reward = game.execute(&Column(3)).unwrap();
        assert_eq!(reward, rewards.penalty + rewards.win);
        assert_eq!(game.outcome(), Some(GameOutcome::Win(Player::X)));
    }

    #[test]
    fn test_diagonal_win_detected_from_rows() {
        let game = ConnectFour::from_rows(&[
            ".......", ".......", "...X...", "..XO...", ".XOO...", "XOOX.X.",
        ])
        .unwrap();
        assert_eq!(game.outcome(), Some(GameOutcome::Win(Player::X)));
    }

    #[test]
    fn test_three_in_open_window_pays_small_reward() {
        let mut game = ConnectFour::from_rows(&[
            ".......", ".......", ".......", ".......", ".......", "XX..OO.",
        ])
        .unwrap();
        let reward = game.execute(&Column(2)).unwrap();
        assert_eq!(reward, 0.2);
    }

    #[test]
    fn test_ignoring_threat_is_penalized() {
        let mut game = ConnectFour::from_rows(&[
            ".......", ".......", ".......", ".......", "O......", "XXX.O..",
        ])
        .unwrap();
        assert_eq!(game.to_move(), Player::O);

        let mut ignoring = game.clone();
        assert_eq!(ignoring.execute(&Column(6)).unwrap(), -1.0);

        assert_eq!(game.execute(&Column(3)).unwrap(), 0.0);
    }

    #[test]
    fn test_draw_on_full_board() {
        let mut game = ConnectFour::from_rows(&[
            "XOX.", "XOXO", "OXOX", "OXOX",
        ])
        .unwrap();
        assert!(!game.is_terminal());
        game.execute(&Column(3)).unwrap();
        assert_eq!(game.outcome(), Some(GameOutcome::Draw));
    }
}
