//! Single-agent view of a two-player game

use tracing::trace;

use crate::{
    Result,
    ports::{Environment, Opponent, TwoPlayerGame},
    types::{GameOutcome, Player, StateId},
};

/// A two-player game with the second side played by an [`Opponent`].
///
/// The agent always moves first. After each agent move that does not end
/// the game the opponent replies at once, so every state the agent observes
/// has the agent to move. The reward is the agent's shaped reward minus the
/// reward the game hands the opponent for its reply.
pub struct Versus<G, O> {
    game: G,
    opponent: O,
}

impl<G, O> Versus<G, O>
where
    G: TwoPlayerGame,
    O: Opponent<G>,
{
    pub fn new(game: G, opponent: O) -> Self {
        Self { game, opponent }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn opponent(&self) -> &O {
        &self.opponent
    }

    pub fn opponent_mut(&mut self) -> &mut O {
        &mut self.opponent
    }

    pub fn into_parts(self) -> (G, O) {
        (self.game, self.opponent)
    }

    /// The side the agent plays.
    pub fn agent_player(&self) -> Player {
        Player::X
    }
}

impl<G, O> Environment for Versus<G, O>
where
    G: TwoPlayerGame,
    O: Opponent<G>,
{
    type Action = G::Action;

    fn state_id(&self) -> Result<StateId> {
        self.game.state_id()
    }

    fn legal_actions(&self) -> Vec<Self::Action> {
        self.game.legal_actions()
    }

    fn execute(&mut self, action: &Self::Action) -> Result<f64> {
        let mut reward = self.game.execute(action)?;
        if !self.game.is_terminal() {
            let reply = self.opponent.choose(&self.game)?;
            let opponent_reward = self.game.execute(&reply)?;
            trace!(opponent = self.opponent.name(), ?reply, opponent_reward, "reply");
            reward -= opponent_reward;
        }
        Ok(reward)
    }

    fn reset(&mut self) {
        self.game.reset()
    }

    fn is_terminal(&self) -> bool {
        self.game.is_terminal()
    }

    fn name(&self) -> &str {
        self.game.name()
    }

    fn layout(&self) -> Option<String> {
        self.game.layout()
    }
}

impl<G, O> TwoPlayerGame for Versus<G, O>
where
    G: TwoPlayerGame,
    O: Opponent<G>,
{
    fn to_move(&self) -> Player {
        self.game.to_move()
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.game.outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        environments::tictactoe::{Placement, TicTacToe},
        pipeline::opponents::RandomOpponent,
    };

    /// Always plays the first legal placement.
    struct FirstFree;

    impl Opponent<TicTacToe> for FirstFree {
        fn choose(&mut self, game: &TicTacToe) -> Result<Placement> {
            game.legal_actions()
                .into_iter()
                .next()
                .ok_or(crate::Error::NoLegalActions {
                    state: game.state_id()?,
                })
        }

        fn name(&self) -> &str {
            "first-free"
        }
    }

    #[test]
    fn test_agent_always_to_move() {
        let mut env = Versus::new(TicTacToe::new(), RandomOpponent::with_seed(3));
        while !env.is_terminal() {
            assert_eq!(env.to_move(), env.agent_player());
            let action = env.legal_actions()[0];
            env.execute(&action).unwrap();
        }
        assert!(env.outcome().is_some());
    }

    #[test]
    fn test_reward_nets_out_opponent_reward() {
        // X . .      O answers at (0,1), making no pair and facing no threat
        let mut env = Versus::new(TicTacToe::new(), FirstFree);
        let reward = env.execute(&Placement::new(0, 0)).unwrap();
        assert_eq!(reward, 0.0);

        // X takes (1,1): diagonal pair pays 0.6. O's reply at (0,2) leaves the
        // diagonal open, costing it the -1.0 penalty, so the net is 1.6.
        let reward = env.execute(&Placement::new(1, 1)).unwrap();
        assert!((reward - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_no_reply_after_winning_move() {
        let game = TicTacToe::from_rows(["XX.", "O..", "..O"]).unwrap();
        let mut env = Versus::new(game, FirstFree);
        let reward = env.execute(&Placement::new(0, 2)).unwrap();
        assert_eq!(reward, 1.0);
        assert!(env.is_terminal());
        assert_eq!(env.outcome(), Some(GameOutcome::Win(Player::X)));
    }
}
