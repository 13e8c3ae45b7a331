//! Newtype wrappers and small value types shared across the crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an environment configuration.
///
/// Produced by the environment and unique per reachable configuration. The
/// learning engine never looks inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(u64);

impl StateId {
    pub const fn new(value: u64) -> Self {
        StateId(value)
    }

    /// Get the inner value.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for StateId {
    fn from(value: u64) -> Self {
        StateId(value)
    }
}

impl From<StateId> for u64 {
    fn from(id: StateId) -> Self {
        id.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The three learning hyperparameters.
///
/// The agent keeps these as plain fields and reads them on every step; this
/// bundle exists for configuration and persistence. No range checks happen
/// here, see [`crate::config::AgentConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Step size α for blending the TD target into the current estimate
    pub learning_rate: f64,
    /// Probability ε of a uniformly random legal action
    pub exploration_rate: f64,
    /// Weight γ of the bootstrapped next-state value
    pub discount_rate: f64,
}

impl Hyperparameters {
    pub const fn new(learning_rate: f64, exploration_rate: f64, discount_rate: f64) -> Self {
        Self {
            learning_rate,
            exploration_rate,
            discount_rate,
        }
    }

    /// Same discount, no learning and no exploration.
    pub const fn frozen(self) -> Self {
        Self {
            learning_rate: 0.0,
            exploration_rate: 0.0,
            discount_rate: self.discount_rate,
        }
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self::new(0.5, 1.0, 0.9)
    }
}

/// A player in a two-player game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A cell on a two-player game board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    /// Parse a board character. `E` is accepted as empty.
    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | ' ' | 'E' | 'e' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }

    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

/// Outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

impl GameOutcome {
    pub fn label(self) -> &'static str {
        match self {
            GameOutcome::Win(Player::X) => "x_win",
            GameOutcome::Win(Player::O) => "o_win",
            GameOutcome::Draw => "draw",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_id_roundtrip() {
        let id = StateId::new(4242);
        assert_eq!(u64::from(id), 4242);
        assert_eq!(StateId::from(4242), id);
        assert_eq!(id.to_string(), "#4242");
    }

    #[test]
    fn test_frozen_keeps_discount() {
        let params = Hyperparameters::new(0.4, 0.7, 0.95).frozen();
        assert_eq!(params.learning_rate, 0.0);
        assert_eq!(params.exploration_rate, 0.0);
        assert_eq!(params.discount_rate, 0.95);
    }

    #[test]
    fn test_cell_chars() {
        assert_eq!(Cell::from_char('E'), Some(Cell::Empty));
        assert_eq!(Cell::from_char('x'), Some(Cell::X));
        assert_eq!(Cell::from_char('?'), None);
        assert_eq!(Cell::from(Player::O).owner(), Some(Player::O));
        assert_eq!(GameOutcome::Win(Player::O).label(), "o_win");
    }
}
