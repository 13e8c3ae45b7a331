//! A game shared between two agents

use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

use crate::{
    Result,
    ports::{Environment, TwoPlayerGame},
    types::{GameOutcome, Player, StateId},
};

/// Handle to one game instance bound to several agents at once.
///
/// Each agent owns a `Shared` handle; all handles see the same board, so
/// after X's agent executes a move, O's agent observes the position with O
/// to move. Cloning a handle never clones the game.
pub struct Shared<E> {
    inner: Rc<RefCell<E>>,
    name: String,
}

impl<E: Environment> Shared<E> {
    pub fn new(environment: E) -> Self {
        let name = environment.name().to_string();
        Self {
            inner: Rc::new(RefCell::new(environment)),
            name,
        }
    }

    pub fn borrow(&self) -> Ref<'_, E> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, E> {
        self.inner.borrow_mut()
    }

    /// Whether two handles refer to the same game.
    pub fn same_game(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E> Clone for Shared<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            name: self.name.clone(),
        }
    }
}

impl<E: Environment> Environment for Shared<E> {
    type Action = E::Action;

    fn state_id(&self) -> Result<StateId> {
        self.inner.borrow().state_id()
    }

    fn legal_actions(&self) -> Vec<Self::Action> {
        self.inner.borrow().legal_actions()
    }

    fn execute(&mut self, action: &Self::Action) -> Result<f64> {
        self.inner.borrow_mut().execute(action)
    }

    fn reset(&mut self) {
        self.inner.borrow_mut().reset()
    }

    fn is_terminal(&self) -> bool {
        self.inner.borrow().is_terminal()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn layout(&self) -> Option<String> {
        self.inner.borrow().layout()
    }
}

impl<G: TwoPlayerGame> TwoPlayerGame for Shared<G> {
    fn to_move(&self) -> Player {
        self.inner.borrow().to_move()
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.inner.borrow().outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environments::tictactoe::{Placement, TicTacToe};

    #[test]
    fn test_handles_see_the_same_board() {
        let mut first = Shared::new(TicTacToe::new());
        let second = first.clone();
        assert!(first.same_game(&second));

        first.execute(&Placement::new(1, 1)).unwrap();
        assert_eq!(second.to_move(), Player::O);
        assert_eq!(second.legal_actions().len(), 8);
        assert_eq!(second.name(), "tic-tac-toe");
    }
}
