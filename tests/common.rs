//! Common test utilities for the qlearn test suite.
//!
//! Small environments with known optimal behaviour, plus a χ² goodness of
//! fit helper for the uniformity checks.

#![allow(dead_code)]

use qlearn::{Error, Result, StateId, ports::Environment};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Single-state bandit: action 1 pays 1.0, action 0 pays nothing.
#[derive(Debug, Default)]
pub struct Bandit {
    pub pulls: u64,
}

impl Environment for Bandit {
    type Action = usize;

    fn state_id(&self) -> Result<StateId> {
        Ok(StateId::new(0))
    }

    fn legal_actions(&self) -> Vec<usize> {
        vec![0, 1]
    }

    fn execute(&mut self, action: &usize) -> Result<f64> {
        self.pulls += 1;
        match action {
            0 => Ok(0.0),
            1 => Ok(1.0),
            other => Err(Error::IllegalAction {
                environment: "bandit",
                action: other.to_string(),
            }),
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "bandit"
    }
}

/// Single state with `arms` actions that all pay nothing, so every action
/// stays tied forever.
#[derive(Debug)]
pub struct Flat {
    pub arms: usize,
}

impl Environment for Flat {
    type Action = usize;

    fn state_id(&self) -> Result<StateId> {
        Ok(StateId::new(0))
    }

    fn legal_actions(&self) -> Vec<usize> {
        (0..self.arms).collect()
    }

    fn execute(&mut self, _action: &usize) -> Result<f64> {
        Ok(0.0)
    }

    fn reset(&mut self) {}
}

/// One move episode: state 0 offers a single action paying `reward`, after
/// which state 1 is terminal with no actions.
#[derive(Debug)]
pub struct OneShot {
    pub reward: f64,
    pub done: bool,
}

impl OneShot {
    pub fn new(reward: f64) -> Self {
        Self {
            reward,
            done: false,
        }
    }
}

impl Environment for OneShot {
    type Action = u8;

    fn state_id(&self) -> Result<StateId> {
        Ok(StateId::new(u64::from(self.done)))
    }

    fn legal_actions(&self) -> Vec<u8> {
        if self.done { Vec::new() } else { vec![0] }
    }

    fn execute(&mut self, _action: &u8) -> Result<f64> {
        self.done = true;
        Ok(self.reward)
    }

    fn reset(&mut self) {
        self.done = false;
    }

    fn is_terminal(&self) -> bool {
        self.done
    }
}

/// Pearson χ² test of `counts` against a uniform distribution.
///
/// Returns `true` when uniformity is not rejected at significance `alpha`.
pub fn looks_uniform(counts: &[u64], alpha: f64) -> bool {
    let total: u64 = counts.iter().sum();
    let expected = total as f64 / counts.len() as f64;
    let statistic: f64 = counts
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum();

    let distribution = ChiSquared::new((counts.len() - 1) as f64).unwrap();
    let critical = distribution.inverse_cdf(1.0 - alpha);
    statistic < critical
}
