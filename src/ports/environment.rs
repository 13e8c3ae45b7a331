//! Environment port - the capability contract every learning environment fulfils
//!
//! The agent is generic over this trait and never looks past it: board
//! layouts, win detection and reward shaping all stay behind these methods.

use std::{fmt::Debug, hash::Hash};

use crate::{
    Result,
    types::{GameOutcome, Player, StateId},
};

/// Environment trait - discrete states, discrete actions, scalar rewards
///
/// # Contract
///
/// * [`state_id`](Environment::state_id) is collision-free over reachable
///   configurations. Two configurations share an id iff they are equivalent
///   for decision making.
/// * [`legal_actions`](Environment::legal_actions) may only be empty while
///   [`is_terminal`](Environment::is_terminal) reports `true`.
/// * [`execute`](Environment::execute) applies an action, advances any
///   internal turn state (including built-in opponent moves) and returns the
///   reward for the acting side. Environments that restart episodes on their
///   own may do so inside `execute`.
/// * [`reset`](Environment::reset) is called by the orchestration layer,
///   never by the agent.
///
/// # Errors
///
/// Environments that detect an impossible configuration must return
/// [`crate::Error::InvalidState`] instead of producing an id, so drivers can
/// stop training on a corrupted state.
///
/// # Examples
///
/// ```
/// use qlearn::{Result, StateId, ports::Environment};
///
/// /// A counter that pays 1.0 whenever it is incremented.
/// struct Counter(u64);
///
/// impl Environment for Counter {
///     type Action = ();
///
///     fn state_id(&self) -> Result<StateId> {
///         Ok(StateId::new(self.0 % 4))
///     }
///
///     fn legal_actions(&self) -> Vec<()> {
///         vec![()]
///     }
///
///     fn execute(&mut self, _action: &()) -> Result<f64> {
///         self.0 += 1;
///         Ok(1.0)
///     }
///
///     fn reset(&mut self) {
///         self.0 = 0;
///     }
/// }
/// ```
pub trait Environment {
    /// Opaque action token supplied by the environment
    type Action: Clone + Eq + Hash + Debug;

    /// Identifier of the current configuration.
    fn state_id(&self) -> Result<StateId>;

    /// Actions that may be executed in the current configuration.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Apply an action and return the resulting reward.
    fn execute(&mut self, action: &Self::Action) -> Result<f64>;

    /// Return to the initial configuration.
    fn reset(&mut self);

    /// Out-of-band terminal signal (win, draw or equivalent).
    ///
    /// # Default Implementation
    ///
    /// Returns `false`, suitable for environments that restart episodes
    /// inside [`execute`](Environment::execute).
    fn is_terminal(&self) -> bool {
        false
    }

    /// Short name used in logs and saved tables.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Fingerprint of the concrete layout when the name alone does not pin
    /// it down, such as a board size or a level map.
    ///
    /// Saved tables record it and refuse to load into a different layout.
    ///
    /// # Default Implementation
    ///
    /// Returns `None`: every instance shares one layout.
    fn layout(&self) -> Option<String> {
        None
    }
}

/// Two-player turn-based games that can report whose turn it is and how the
/// game ended.
pub trait TwoPlayerGame: Environment {
    /// Player whose move is next.
    fn to_move(&self) -> Player;

    /// Outcome once the game is over, `None` while it is running.
    fn outcome(&self) -> Option<GameOutcome>;
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    type Action = E::Action;

    fn state_id(&self) -> Result<StateId> {
        (**self).state_id()
    }

    fn legal_actions(&self) -> Vec<Self::Action> {
        (**self).legal_actions()
    }

    fn execute(&mut self, action: &Self::Action) -> Result<f64> {
        (**self).execute(action)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn layout(&self) -> Option<String> {
        (**self).layout()
    }
}
