//! Opponent port - move selection for the side the agent does not control

use crate::{Result, ports::Environment};

/// Opponent trait - picks a move for the current position of a game
///
/// Opponents are consulted by [`crate::environments::Versus`] after each of
/// the agent's moves, so that the next state the agent observes is its own
/// turn again.
pub trait Opponent<G: Environment> {
    /// Choose one of `game.legal_actions()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the position offers no legal move or its state id
    /// cannot be computed.
    fn choose(&mut self, game: &G) -> Result<G::Action>;

    /// Get the opponent's name.
    fn name(&self) -> &str;
}

impl<G: Environment, O: Opponent<G> + ?Sized> Opponent<G> for Box<O> {
    fn choose(&mut self, game: &G) -> Result<G::Action> {
        (**self).choose(game)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
