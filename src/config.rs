//! Configuration types for agent creation.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, types::Hyperparameters};

/// Configuration for creating a Q-learning agent.
///
/// Builder-style, so the CLI and tests can start from the defaults and
/// override only what they need.
///
/// # Examples
///
/// ```
/// use qlearn::config::AgentConfig;
///
/// let config = AgentConfig::new()
///     .with_learning_rate(0.4)
///     .with_discount_rate(0.95)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Initial learning, exploration and discount rates
    pub hyperparameters: Hyperparameters,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    /// Create a configuration with default values:
    /// - learning rate 0.5
    /// - exploration rate 1.0 (pure exploration)
    /// - discount rate 0.9
    /// - no seed (non-deterministic)
    pub fn new() -> Self {
        Self {
            hyperparameters: Hyperparameters::default(),
            seed: None,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.hyperparameters.learning_rate = learning_rate;
        self
    }

    pub fn with_exploration_rate(mut self, exploration_rate: f64) -> Self {
        self.hyperparameters.exploration_rate = exploration_rate;
        self
    }

    pub fn with_discount_rate(mut self, discount_rate: f64) -> Self {
        self.hyperparameters.discount_rate = discount_rate;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that every rate lies in [0, 1].
    ///
    /// The agent never clamps its rates; callers that take rates from users
    /// run this first.
    pub fn validate(&self) -> Result<()> {
        let Hyperparameters {
            learning_rate,
            exploration_rate,
            discount_rate,
        } = self.hyperparameters;

        for (name, value) in [
            ("learning rate", learning_rate),
            ("exploration rate", exploration_rate),
            ("discount rate", discount_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}
