//! Serialization support for learned Q-tables.

use std::{
    fs::File,
    hash::Hash,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    ports::Environment,
    q_learning::{agent::QLearningAgent, q_table::QTable},
    types::{Hyperparameters, StateId},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedEntry<A> {
    state: StateId,
    action: A,
    value: f64,
}

/// On-disk form of an agent's table and rates.
///
/// Entries are stored as a flat list of `(state, action, value)` triples,
/// ordered by state id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQTable<A> {
    pub version: u32,
    /// Name of the environment the table was learned on
    pub environment: String,
    pub hyperparameters: Hyperparameters,
    pub steps_taken: u64,
    entries: Vec<SavedEntry<A>>,
    /// Layout fingerprint of the environment, see [`Environment::layout`]
    #[serde(default)]
    pub layout: Option<String>,
}

impl<A> SavedQTable<A> {
    pub const VERSION: u32 = 1;

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A: Clone + Eq + Hash> SavedQTable<A> {
    pub fn from_agent<E>(agent: &QLearningAgent<E>) -> Self
    where
        E: Environment<Action = A>,
    {
        let env = agent.environment();
        let environment = env.map(|env| env.name().to_string()).unwrap_or_default();
        let saved = Self::from_table(
            agent.q_table(),
            environment,
            agent.hyperparameters(),
            agent.steps_taken(),
        );
        Self {
            layout: env.and_then(|env| env.layout()),
            ..saved
        }
    }

    pub fn from_table(
        table: &QTable<A>,
        environment: impl Into<String>,
        hyperparameters: Hyperparameters,
        steps_taken: u64,
    ) -> Self {
        let mut entries: Vec<SavedEntry<A>> = table
            .iter()
            .map(|(state, action, value)| SavedEntry {
                state,
                action: action.clone(),
                value,
            })
            .collect();
        entries.sort_by_key(|entry| entry.state);

        Self {
            version: Self::VERSION,
            environment: environment.into(),
            hyperparameters,
            steps_taken,
            entries,
            layout: None,
        }
    }

    pub fn to_table(&self) -> Result<QTable<A>> {
        if self.version != Self::VERSION {
            return Err(anyhow!(
                "Unsupported Q-table save format version: {}. Expected {}",
                self.version,
                Self::VERSION
            ));
        }

        Ok(self
            .entries
            .iter()
            .map(|entry| (entry.state, entry.action.clone(), entry.value))
            .collect())
    }

    /// Load the saved table and rates into `agent`.
    ///
    /// The agent's bound environment is kept. A name or layout mismatch is
    /// rejected.
    pub fn restore_into<E>(&self, agent: &mut QLearningAgent<E>) -> Result<()>
    where
        E: Environment<Action = A>,
    {
        if let Some(env) = agent.environment()
            && !self.environment.is_empty()
            && env.name() != self.environment
        {
            return Err(anyhow!(
                "Q-table was learned on '{}' but the agent is bound to '{}'",
                self.environment,
                env.name()
            ));
        }
        if let Some(env) = agent.environment()
            && let (Some(saved), Some(bound)) = (&self.layout, env.layout())
            && *saved != bound
        {
            return Err(anyhow!(
                "Q-table was learned on a different {} layout ({saved}) than the agent's ({bound})",
                self.environment
            ));
        }

        let table = self.to_table()?;
        agent.restore_table(table);
        agent.set_hyperparameters(self.hyperparameters);
        Ok(())
    }
}

impl<A: Serialize> SavedQTable<A> {
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file: {}", path.as_ref().display()))?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, self).context("Failed to serialize Q-table")?;

        Ok(())
    }
}

impl<A: DeserializeOwned> SavedQTable<A> {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).context("Failed to deserialize Q-table")
    }
}
