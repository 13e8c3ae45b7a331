//! Ports (trait boundaries) between the learning engine and its collaborators.
//!
//! The engine owns these traits; games, opponents and training observers are
//! adapters that implement them.

pub mod environment;
pub mod observer;
pub mod opponent;

pub use environment::{Environment, TwoPlayerGame};
pub use observer::Observer;
pub use opponent::Opponent;
