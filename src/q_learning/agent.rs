//! Q-learning agent
//!
//! The agent owns its Q-table and the environment it is bound to. Each step
//! it reads the current state and legal actions, picks an action ε-greedily,
//! executes it and applies the TD(0) update for the (state, action) it just
//! left.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    config::AgentConfig,
    error::{Error, Result},
    ports::Environment,
    q_learning::{q_table::QTable, tie_breaker::TieBreaker},
    types::{Hyperparameters, StateId},
};

/// Record of a single learning step
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<A> {
    pub state: StateId,
    pub action: A,
    pub reward: f64,
    pub next_state: StateId,
    /// Whether the environment flagged the next state as terminal
    pub terminal: bool,
    /// TD error `target - Q(s,a)` before the update
    pub td_error: f64,
}

/// Aggregate of a [`QLearningAgent::learn`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnStats {
    pub steps: u64,
    pub total_reward: f64,
    /// Steps whose next state was terminal
    pub terminal_transitions: u64,
}

impl LearnStats {
    fn record<A>(&mut self, transition: &Transition<A>) {
        self.steps += 1;
        self.total_reward += transition.reward;
        if transition.terminal {
            self.terminal_transitions += 1;
        }
    }

    /// Fold another batch into this one.
    pub fn merge(&mut self, other: LearnStats) {
        self.steps += other.steps;
        self.total_reward += other.total_reward;
        self.terminal_transitions += other.terminal_transitions;
    }
}

/// Q-learning agent (off-policy TD control)
///
/// Hyperparameters are plain public fields. They are read on every step and
/// never cached, so a driver may change them between (or during a series of)
/// [`learn`](Self::learn) calls and the next step picks the new values up.
/// The agent does not clamp them.
///
/// # Examples
///
/// ```
/// use qlearn::{
///     Hyperparameters,
///     environments::treasure_hunt::{TreasureHunt, levels},
///     q_learning::QLearningAgent,
/// };
///
/// let level = TreasureHunt::new(levels::LEVEL_0).unwrap();
/// let mut agent = QLearningAgent::new(Hyperparameters::default())
///     .with_seed(7)
///     .with_environment(level);
///
/// agent.learn(500).unwrap();
/// agent.exploration_rate = 0.3;
/// agent.learn(500).unwrap();
/// assert!(!agent.q_table().is_empty());
/// ```
pub struct QLearningAgent<E: Environment> {
    /// Learning rate α
    pub learning_rate: f64,
    /// Exploration rate ε
    pub exploration_rate: f64,
    /// Discount rate γ
    pub discount_rate: f64,
    q_table: QTable<E::Action>,
    environment: Option<E>,
    tie_breaker: TieBreaker,
    last_observed: Option<(StateId, E::Action)>,
    steps_taken: u64,
}

impl<E: Environment> QLearningAgent<E> {
    /// Create an unbound agent with an empty table.
    pub fn new(params: Hyperparameters) -> Self {
        Self {
            learning_rate: params.learning_rate,
            exploration_rate: params.exploration_rate,
            discount_rate: params.discount_rate,
            q_table: QTable::new(),
            environment: None,
            tie_breaker: TieBreaker::new(),
            last_observed: None,
            steps_taken: 0,
        }
    }

    /// Create an unbound agent from a configuration.
    pub fn from_config(config: &AgentConfig) -> Self {
        let agent = Self::new(config.hyperparameters);
        match config.seed {
            Some(seed) => agent.with_seed(seed),
            None => agent,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    /// Restart the exploration and tie-breaking stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.tie_breaker = TieBreaker::seeded(seed);
    }

    pub fn with_environment(mut self, environment: E) -> Self {
        self.bind(environment);
        self
    }

    /// Bind a new environment, returning the previous one.
    ///
    /// A new environment means a new state space: the table starts empty.
    pub fn bind(&mut self, environment: E) -> Option<E> {
        debug!(environment = environment.name(), "binding environment");
        self.q_table = QTable::new();
        self.last_observed = None;
        self.environment.replace(environment)
    }

    /// Detach the environment, keeping the learned table.
    pub fn unbind(&mut self) -> Option<E> {
        self.last_observed = None;
        self.environment.take()
    }

    pub fn environment(&self) -> Option<&E> {
        self.environment.as_ref()
    }

    pub fn environment_mut(&mut self) -> Option<&mut E> {
        self.environment.as_mut()
    }

    /// Snapshot of the current hyperparameters.
    pub fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters::new(
            self.learning_rate,
            self.exploration_rate,
            self.discount_rate,
        )
    }

    pub fn set_hyperparameters(&mut self, params: Hyperparameters) {
        self.learning_rate = params.learning_rate;
        self.exploration_rate = params.exploration_rate;
        self.discount_rate = params.discount_rate;
    }

    /// Stop learning and exploring; the agent plays its greedy policy.
    pub fn freeze(&mut self) {
        self.set_hyperparameters(self.hyperparameters().frozen());
    }

    pub fn q_table(&self) -> &QTable<E::Action> {
        &self.q_table
    }

    /// Replace the table with a previously saved one.
    pub fn restore_table(&mut self, table: QTable<E::Action>) {
        self.q_table = table;
    }

    /// The (state, action) pair of the most recent step.
    pub fn last_observed(&self) -> Option<&(StateId, E::Action)> {
        self.last_observed.as_ref()
    }

    /// Total transitions performed since construction.
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// ε-greedy action for the bound environment's current state.
    ///
    /// Does not execute the action and does not touch the table.
    ///
    /// # Errors
    ///
    /// * [`Error::Unbound`] when no environment is bound
    /// * [`Error::EpisodeFinished`] when the environment reports a terminal state
    /// * [`Error::NoLegalActions`] when a non-terminal state offers no action
    /// * any error raised by the environment while computing its state id
    pub fn select_action(&mut self) -> Result<E::Action> {
        let environment = self.environment.as_ref().ok_or(Error::Unbound)?;
        let (_, action) = Self::choose_action(
            environment,
            &self.q_table,
            &mut self.tie_breaker,
            self.exploration_rate,
        )?;
        Ok(action)
    }

    /// Perform one transition and its TD update.
    ///
    /// ```text
    /// target  = r + γ · max_a' Q(s', a')     (0 for terminal s')
    /// Q(s,a) += α · (target − Q(s,a))
    /// ```
    pub fn step(&mut self) -> Result<Transition<E::Action>> {
        let environment = self.environment.as_mut().ok_or(Error::Unbound)?;
        let (state, action) = Self::choose_action(
            environment,
            &self.q_table,
            &mut self.tie_breaker,
            self.exploration_rate,
        )?;

        let reward = environment.execute(&action)?;
        let next_state = environment.state_id()?;
        let terminal = environment.is_terminal();
        let next_actions = if terminal {
            Vec::new()
        } else {
            environment.legal_actions()
        };

        let next_value = self.q_table.best_value(next_state, &next_actions);
        let current = self.q_table.get(state, &action);
        let target = reward + self.discount_rate * next_value;
        let td_error = target - current;
        self.q_table
            .set(state, action.clone(), current + self.learning_rate * td_error);

        self.steps_taken += 1;
        self.last_observed = Some((state, action.clone()));
        trace!(%state, ?action, reward, %next_state, terminal, td_error, "q update");
        if terminal {
            debug!(
                environment = environment.name(),
                %next_state,
                reward,
                "episode reached a terminal state"
            );
        }

        Ok(Transition {
            state,
            action,
            reward,
            next_state,
            terminal,
            td_error,
        })
    }

    /// Advance training by `steps` transitions.
    ///
    /// Steps are transitions, not episodes. Environments that restart
    /// episodes inside `execute` are simply followed across the boundary.
    /// Environments that stop at a terminal state make the next step fail
    /// with [`Error::EpisodeFinished`] until the driver resets them.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] for `steps == 0`, otherwise anything
    /// [`step`](Self::step) returns. Steps completed before the error keep
    /// their updates.
    pub fn learn(&mut self, steps: u64) -> Result<LearnStats> {
        if steps == 0 {
            return Err(Error::InvalidConfiguration {
                message: "learn requires a positive number of steps".to_string(),
            });
        }

        let mut stats = LearnStats::default();
        for _ in 0..steps {
            let transition = self.step()?;
            stats.record(&transition);
        }
        Ok(stats)
    }

    fn choose_action(
        environment: &E,
        q_table: &QTable<E::Action>,
        tie_breaker: &mut TieBreaker,
        exploration_rate: f64,
    ) -> Result<(StateId, E::Action)> {
        let state = environment.state_id()?;
        if environment.is_terminal() {
            return Err(Error::EpisodeFinished { state });
        }

        let legal_actions = environment.legal_actions();
        if legal_actions.is_empty() {
            return Err(Error::NoLegalActions { state });
        }

        let action = if tie_breaker.uniform() < exploration_rate {
            tie_breaker.pick_one(&legal_actions).cloned()
        } else {
            let best = q_table.best_actions(state, &legal_actions);
            tie_breaker.pick_one(&best).cloned()
        };

        action
            .map(|action| (state, action))
            .ok_or(Error::NoLegalActions { state })
    }
}

impl<E: Environment> fmt::Debug for QLearningAgent<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QLearningAgent")
            .field("learning_rate", &self.learning_rate)
            .field("exploration_rate", &self.exploration_rate)
            .field("discount_rate", &self.discount_rate)
            .field("entries", &self.q_table.len())
            .field(
                "environment",
                &self.environment.as_ref().map(|env| env.name()),
            )
            .field("steps_taken", &self.steps_taken)
            .finish()
    }
}
