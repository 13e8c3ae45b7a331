//! Opponent adapters for single-agent play against a built-in side

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    Error, Result,
    ports::{Environment, Opponent},
    q_learning::{QTable, TieBreaker},
};

/// Random opponent - plays a uniformly random legal move
pub struct RandomOpponent {
    name: String,
    rng: StdRng,
}

impl RandomOpponent {
    pub fn new() -> Self {
        Self {
            name: "random".to_string(),
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Create with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            name: "random".to_string(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomOpponent {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Environment> Opponent<G> for RandomOpponent {
    fn choose(&mut self, game: &G) -> Result<G::Action> {
        let actions = game.legal_actions();
        match actions.choose(&mut self.rng) {
            Some(action) => Ok(action.clone()),
            None => Err(Error::NoLegalActions {
                state: game.state_id()?,
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Greedy opponent - plays the best move of a fixed Q-table
///
/// Typically built from a snapshot of a previously trained agent so the
/// learner can practise against an earlier version of itself. Ties are
/// broken uniformly.
pub struct GreedyOpponent<A> {
    name: String,
    table: QTable<A>,
    tie_breaker: TieBreaker,
}

impl<A> GreedyOpponent<A> {
    pub fn new(table: QTable<A>) -> Self {
        Self {
            name: "greedy".to_string(),
            table,
            tie_breaker: TieBreaker::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.tie_breaker = TieBreaker::seeded(seed);
        self
    }

    pub fn table(&self) -> &QTable<A> {
        &self.table
    }
}

impl<G: Environment> Opponent<G> for GreedyOpponent<G::Action> {
    fn choose(&mut self, game: &G) -> Result<G::Action> {
        let state = game.state_id()?;
        let best = self.table.best_actions(state, &game.legal_actions());
        self.tie_breaker
            .pick_one(&best)
            .cloned()
            .ok_or(Error::NoLegalActions { state })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
