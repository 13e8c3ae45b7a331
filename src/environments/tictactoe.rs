//! Tic-tac-toe on a 3x3 board with shaped rewards

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::lines::LineAnalyzer;
use crate::{
    error::{Error, Result},
    ports::{Environment, TwoPlayerGame},
    types::{Cell, GameOutcome, Player, StateId},
};

const NAME: &str = "tic-tac-toe";

/// Placing the current player's mark on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Placement {
    pub row: usize,
    pub col: usize,
}

impl Placement {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major board index
    pub const fn index(self) -> usize {
        self.row * 3 + self.col
    }

    fn from_index(index: usize) -> Self {
        Self::new(index / 3, index % 3)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x:{}y:{}", self.row, self.col)
    }
}

/// Reward magnitudes handed to the mover
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TicTacToeRewards {
    /// Completing three in a row
    pub win: f64,
    /// Leaving the opponent an unanswered immediate win
    pub penalty: f64,
    /// Creating two in a row through the placed mark
    pub small: f64,
}

impl Default for TicTacToeRewards {
    fn default() -> Self {
        Self {
            win: 1.0,
            penalty: -1.0,
            small: 0.6,
        }
    }
}

/// Tic-tac-toe environment, X moves first
///
/// The state id is the base-3 number `Σ cell_i · 3^i` over the row-major
/// cells with empty = 0, X = 1 and O = 2. The player to move is implied by
/// the mark counts, so the id carries it too.
#[derive(Debug, Clone, PartialEq)]
pub struct TicTacToe {
    cells: [Cell; 9],
    to_move: Player,
    outcome: Option<GameOutcome>,
    rewards: TicTacToeRewards,
}

impl TicTacToe {
    pub fn new() -> Self {
        Self::with_rewards(TicTacToeRewards::default())
    }

    pub fn with_rewards(rewards: TicTacToeRewards) -> Self {
        Self {
            cells: [Cell::Empty; 9],
            to_move: Player::X,
            outcome: None,
            rewards,
        }
    }

    /// Build a board from three rows of `X`, `O` and `.` (or `E`/space).
    ///
    /// The side to move is derived from the mark counts. Counts that no game
    /// could produce are accepted here and reported by
    /// [`Environment::state_id`].
    pub fn from_rows(rows: [&str; 3]) -> Result<Self> {
        let mut game = Self::new();
        for (r, row) in rows.iter().enumerate() {
            let chars: Vec<char> = row.chars().collect();
            if chars.len() != 3 {
                return Err(Error::InvalidState {
                    environment: NAME,
                    reason: format!("row {r} has {} cells, expected 3", chars.len()),
                });
            }
            for (c, ch) in chars.into_iter().enumerate() {
                game.cells[r * 3 + c] = Cell::from_char(ch).ok_or_else(|| Error::InvalidState {
                    environment: NAME,
                    reason: format!("unknown cell '{ch}' at {r},{c}"),
                })?;
            }
        }

        let (x, o) = game.counts();
        game.to_move = if x > o { Player::O } else { Player::X };
        game.outcome = game.evaluate_outcome();
        Ok(game)
    }

    pub fn rewards(&self) -> TicTacToeRewards {
        self.rewards
    }

    pub fn set_rewards(&mut self, rewards: TicTacToeRewards) {
        self.rewards = rewards;
    }

    pub fn cell(&self, placement: Placement) -> Cell {
        self.cells[placement.index()]
    }

    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
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
            Err(Error::InvalidState {
                environment: NAME,
                reason: format!("{x} X marks and {o} O marks"),
            })
        }
    }

    fn evaluate_outcome(&self) -> Option<GameOutcome> {
        if LineAnalyzer::has_won(&self.cells, Player::X) {
            Some(GameOutcome::Win(Player::X))
        } else if LineAnalyzer::has_won(&self.cells, Player::O) {
            Some(GameOutcome::Win(Player::O))
        } else if self.cells.iter().all(|&cell| cell != Cell::Empty) {
            Some(GameOutcome::Draw)
        } else {
            None
        }
    }

    /// Shaped reward for `mover` having just placed a mark at `index`.
    fn shaped_reward(&self, index: usize, mover: Player, won: bool) -> f64 {
        let opponent = mover.opponent();
        let mut reward = 0.0;

        if LineAnalyzer::pair_through(&self.cells, index, mover) {
            reward += self.rewards.small;
        }

        // An open opponent threat overwrites the pair bonus, even on a win.
        let blocked = LineAnalyzer::pair_through(&self.cells, index, opponent);
        if LineAnalyzer::has_immediate_win(&self.cells, opponent) && !blocked {
            reward = self.rewards.penalty;
        }

        if won {
            reward += self.rewards.win;
        }
        reward
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for TicTacToe {
    type Action = Placement;

    fn state_id(&self) -> Result<StateId> {
        self.validate()?;
        let id = self
            .cells
            .iter()
            .rev()
            .fold(0u64, |acc, cell| acc * 3 + *cell as u64);
        Ok(StateId::new(id))
    }

    fn legal_actions(&self) -> Vec<Placement> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        (0..9)
            .filter(|&index| self.cells[index] == Cell::Empty)
            .map(Placement::from_index)
            .collect()
    }

    fn execute(&mut self, action: &Placement) -> Result<f64> {
        if self.outcome.is_some() {
            return Err(Error::EpisodeFinished {
                state: self.state_id()?,
            });
        }
        if action.row >= 3 || action.col >= 3 || self.cell(*action) != Cell::Empty {
            return Err(Error::IllegalAction {
                environment: NAME,
                action: action.to_string(),
            });
        }

        let mover = self.to_move;
        let index = action.index();
        self.cells[index] = Cell::from(mover);
        self.validate()?;

        let won = LineAnalyzer::has_won(&self.cells, mover);
        let reward = self.shaped_reward(index, mover, won);

        self.outcome = if won {
            Some(GameOutcome::Win(mover))
        } else if self.cells.iter().all(|&cell| cell != Cell::Empty) {
            Some(GameOutcome::Draw)
        } else {
            None
        };
        self.to_move = mover.opponent();

        trace!(%mover, %action, reward, outcome = ?self.outcome, "placement");
        Ok(reward)
    }

    fn reset(&mut self) {
        self.cells = [Cell::Empty; 9];
        self.to_move = Player::X;
        self.outcome = None;
    }

    fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    fn name(&self) -> &str {
        NAME
    }
}

impl TwoPlayerGame for TicTacToe {
    fn to_move(&self) -> Player {
        self.to_move
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(3) {
            let line: String = row.iter().map(|cell| cell.to_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_id_is_zero() {
        let game = TicTacToe::new();
        assert_eq!(game.state_id().unwrap(), StateId::new(0));
        assert_eq!(game.legal_actions().len(), 9);
        assert_eq!(game.to_move(), Player::X);
    }

    #[test]
    fn test_id_is_base_three() {
        let mut game = TicTacToe::new();
        game.execute(&Placement::new(0, 0)).unwrap();
        assert_eq!(game.state_id().unwrap(), StateId::new(1));
        game.execute(&Placement::new(0, 1)).unwrap();
        assert_eq!(game.state_id().unwrap(), StateId::new(1 + 2 * 3));
    }

    #[test]
    fn test_invalid_counts_rejected() {
        let game = TicTacToe::from_rows(["XX.", "X..", "..."]).unwrap();
        assert!(matches!(
            game.state_id(),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_occupied_cell_is_illegal() {
        let mut game = TicTacToe::new();
        game.execute(&Placement::new(1, 1)).unwrap();
        assert!(matches!(
            game.execute(&Placement::new(1, 1)),
            Err(Error::IllegalAction { .. })
        ));
    }

    #[test]
    fn test_winning_move() {
        let mut game = TicTacToe::from_rows(["XX.", "O..", "..O"]).unwrap();
        assert_eq!(game.to_move(), Player::X);

        let reward = game.execute(&Placement::new(0, 2)).unwrap();
        assert_eq!(reward, 1.0);
        assert!(game.is_terminal());
        assert_eq!(game.outcome(), Some(GameOutcome::Win(Player::X)));
        assert!(game.legal_actions().is_empty());
    }

    #[test]
    fn test_win_leaving_open_threat_is_penalized_first() {
        let mut game = TicTacToe::from_rows(["XX.", "OO.", "..."]).unwrap();
        let rewards = game.rewards();

        let reward = game.execute(&Placement::new(0, 2)).unwrap();
        assert_eq!(reward, rewards.penalty + rewards.win);
        assert_eq!(reward, 0.0);
        assert_eq!(game.outcome(), Some(GameOutcome::Win(Player::X)));
    }

    #[test]
    fn test_two_in_a_row_pays_small_reward() {
        let mut game = TicTacToe::from_rows(["X..", ".O.", "..."]).unwrap();
        let reward = game.execute(&Placement::new(0, 1)).unwrap();
        assert_eq!(reward, 0.6);
    }

    #[test]
    fn test_ignoring_threat_is_penalized() {
        let mut game = TicTacToe::from_rows(["XX.", "O..", "..."]).unwrap();
        assert_eq!(game.to_move(), Player::O);
        let reward = game.execute(&Placement::new(2, 2)).unwrap();
        assert_eq!(reward, -1.0);
    }

    #[test]
    fn test_blocking_threat_is_not_penalized() {
        let mut game = TicTacToe::from_rows(["XX.", "O..", "..."]).unwrap();
        let reward = game.execute(&Placement::new(0, 2)).unwrap();
        assert_eq!(reward, 0.0);
    }

    #[test]
    fn test_draw() {
        let mut game = TicTacToe::from_rows(["XOX", "XO.", "OX."]).unwrap();
        game.execute(&Placement::new(1, 2)).unwrap();
        assert!(!game.is_terminal());
        game.execute(&Placement::new(2, 2)).unwrap();
        assert_eq!(game.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn test_step_after_end_fails() {
        let mut game = TicTacToe::from_rows(["XXX", "OO.", "..."]).unwrap();
        assert!(game.is_terminal());
        assert!(matches!(
            game.execute(&Placement::new(2, 2)),
            Err(Error::EpisodeFinished { .. })
        ));

        game.reset();
        assert!(!game.is_terminal());
        assert_eq!(game.state_id().unwrap(), StateId::new(0));
    }

    #[test]
    fn test_placement_display() {
        assert_eq!(Placement::new(2, 1).to_string(), "x:2y:1");
    }
}
