//! Tabular Q-learning
//!
//! Off-policy temporal difference control over any [`Environment`]:
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') − Q(s,a)]
//! ```
//!
//! The table is sparse and defaults unseen entries to 0.0, exploration is
//! ε-greedy, and ties between equally valued actions are broken uniformly.
//!
//! ## Usage Example
//!
//! ```no_run
//! use qlearn::{
//!     Hyperparameters,
//!     environments::tictactoe::TicTacToe,
//!     q_learning::QLearningAgent,
//! };
//!
//! let mut agent = QLearningAgent::new(Hyperparameters::new(
//!     0.5, // learning_rate
//!     1.0, // exploration_rate
//!     0.9, // discount_rate
//! ))
//! .with_environment(TicTacToe::new());
//!
//! agent.learn(1).unwrap();
//! ```
//!
//! [`Environment`]: crate::ports::Environment

pub mod agent;
pub mod q_table;
pub mod serialization;
pub mod tie_breaker;

// Public re-exports
pub use agent::{LearnStats, QLearningAgent, Transition};
pub use q_table::{QKey, QTable};
pub use serialization::SavedQTable;
pub use tie_breaker::TieBreaker;
