//! Sparse Q-table keyed by (state, action)

use std::{
    collections::{HashMap, HashSet, hash_map},
    hash::Hash,
};

use serde::{Deserialize, Serialize};

use crate::types::StateId;

/// Composite key of a Q-table entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QKey<A> {
    pub state: StateId,
    pub action: A,
}

/// Q-table mapping (state, action) pairs to value estimates
///
/// Storage is a hash map over the pairs actually visited, so id spaces with
/// large gaps (bit-packed positions) cost nothing for the ids never reached.
/// Missing entries read as 0.0, meaning "no information".
///
/// The table only grows: there is no removal operation.
#[derive(Debug, Clone)]
pub struct QTable<A> {
    q_values: HashMap<QKey<A>, f64>,
}

impl<A: Clone + Eq + Hash> QTable<A> {
    /// Value of entries that have never been written
    pub const DEFAULT_VALUE: f64 = 0.0;

    /// Create an empty Q-table
    pub fn new() -> Self {
        Self {
            q_values: HashMap::new(),
        }
    }

    /// Rebuild a table from enumerated `(state, action, value)` triples.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (StateId, A, f64)>,
    {
        entries.into_iter().collect()
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: StateId, action: &A) -> f64 {
        self.q_values
            .get(&QKey {
                state,
                action: action.clone(),
            })
            .copied()
            .unwrap_or(Self::DEFAULT_VALUE)
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: StateId, action: A, value: f64) {
        self.q_values.insert(QKey { state, action }, value);
    }

    /// Maximum Q-value over the candidate actions.
    ///
    /// An empty candidate set (terminal state) is worth 0.0.
    pub fn best_value(&self, state: StateId, candidates: &[A]) -> f64 {
        if candidates.is_empty() {
            return Self::DEFAULT_VALUE;
        }
        candidates
            .iter()
            .map(|action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Candidates attaining [`best_value`](Self::best_value), in candidate order.
    ///
    /// Ties are expected: early in training every entry is 0.0 and all
    /// candidates come back.
    pub fn best_actions(&self, state: StateId, candidates: &[A]) -> Vec<A> {
        let values: Vec<f64> = candidates.iter().map(|a| self.get(state, a)).collect();
        let best = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        candidates
            .iter()
            .zip(values)
            .filter(|&(_, value)| value == best)
            .map(|(action, _)| action.clone())
            .collect()
    }

    /// Number of stored (state, action) entries
    pub fn len(&self) -> usize {
        self.q_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }

    /// Enumerate every stored `(state, action, value)` triple.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &A, f64)> + '_ {
        self.q_values
            .iter()
            .map(|(key, &value)| (key.state, &key.action, value))
    }

    /// Number of distinct states with at least one stored entry
    pub fn state_count(&self) -> usize {
        self.q_values
            .keys()
            .map(|key| key.state)
            .collect::<HashSet<_>>()
            .len()
    }
}

impl<A: Clone + Eq + Hash> Default for QTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone + Eq + Hash> FromIterator<(StateId, A, f64)> for QTable<A> {
    fn from_iter<I: IntoIterator<Item = (StateId, A, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (state, action, value) in iter {
            table.set(state, action, value);
        }
        table
    }
}

impl<'a, A> IntoIterator for &'a QTable<A> {
    type Item = (&'a QKey<A>, &'a f64);
    type IntoIter = hash_map::Iter<'a, QKey<A>, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.q_values.iter()
    }
}
