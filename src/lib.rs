//! Tabular Q-learning toolkit
//!
//! This crate provides:
//! - A generic Q-learning agent over any environment exposing discrete
//!   states and a finite set of legal actions
//! - Tic-tac-toe, connect four and a treasure-hunt grid world
//! - Alternating self-play, folded-opponent play and frozen evaluation
//! - An annealing curriculum, observers and table persistence
//!
//! ```
//! use qlearn::{
//!     config::AgentConfig,
//!     environments::treasure_hunt::{TreasureHunt, levels},
//!     q_learning::QLearningAgent,
//! };
//!
//! let level = TreasureHunt::new(levels::LEVEL_0).unwrap();
//! let mut agent = QLearningAgent::from_config(&AgentConfig::new().with_seed(7))
//!     .with_environment(level);
//! agent.learn(500).unwrap();
//! assert!(!agent.q_table().is_empty());
//! ```

pub mod cli;
pub mod config;
pub mod environments;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use error::{Error, Result};
pub use types::{Cell, GameOutcome, Hyperparameters, Player, StateId};
