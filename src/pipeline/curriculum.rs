//! Annealing schedule for the learning and exploration rates
//!
//! Training is split into equal phases, each with fixed α and ε. Once the
//! last phase is over the agent stops learning and exploring and plays its
//! greedy policy.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Rates applied for one phase of training
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub learning_rate: f64,
    pub exploration_rate: f64,
}

impl Phase {
    pub const fn new(learning_rate: f64, exploration_rate: f64) -> Self {
        Self {
            learning_rate,
            exploration_rate,
        }
    }

    /// Rates once the schedule is exhausted.
    pub const FINISHED: Phase = Phase::new(0.0, 0.0);
}

/// Default four-phase schedule
pub const STANDARD_PHASES: [Phase; 4] = [
    Phase::new(0.5, 1.0),
    Phase::new(0.4, 0.7),
    Phase::new(0.3, 0.5),
    Phase::new(0.2, 0.3),
];

/// Equal-length phases over a fixed number of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    total_steps: u64,
    phases: Vec<Phase>,
}

impl Curriculum {
    /// Create a schedule over `total_steps`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] for zero steps or no phases.
    pub fn new(total_steps: u64, phases: Vec<Phase>) -> Result<Self> {
        if total_steps == 0 {
            return Err(Error::InvalidConfiguration {
                message: "curriculum needs a positive number of steps".to_string(),
            });
        }
        if phases.is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "curriculum needs at least one phase".to_string(),
            });
        }
        Ok(Self {
            total_steps,
            phases,
        })
    }

    /// The four-phase α = 0.5..0.2, ε = 1.0..0.3 schedule.
    pub fn standard(total_steps: u64) -> Result<Self> {
        Self::new(total_steps, STANDARD_PHASES.to_vec())
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Steps per phase, at least one.
    pub fn phase_length(&self) -> u64 {
        (self.total_steps / self.phases.len() as u64).max(1)
    }

    /// Phase index for a step count: `floor(step / phase_length)`.
    pub fn index_at(&self, step: u64) -> usize {
        usize::try_from(step / self.phase_length()).unwrap_or(usize::MAX)
    }

    /// Phase in force at `step`, `None` once the schedule is exhausted.
    pub fn phase_at(&self, step: u64) -> Option<Phase> {
        self.phases.get(self.index_at(step)).copied()
    }

    /// Rates at `step`, falling back to [`Phase::FINISHED`].
    pub fn rates_at(&self, step: u64) -> Phase {
        self.phase_at(step).unwrap_or(Phase::FINISHED)
    }

    pub fn is_finished(&self, step: u64) -> bool {
        self.index_at(step) >= self.phases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schedule() {
        let curriculum = Curriculum::standard(400).unwrap();
        assert_eq!(curriculum.phase_length(), 100);
        assert_eq!(curriculum.rates_at(0), Phase::new(0.5, 1.0));
        assert_eq!(curriculum.rates_at(99), Phase::new(0.5, 1.0));
        assert_eq!(curriculum.rates_at(100), Phase::new(0.4, 0.7));
        assert_eq!(curriculum.rates_at(250), Phase::new(0.3, 0.5));
        assert_eq!(curriculum.rates_at(399), Phase::new(0.2, 0.3));
        assert!(!curriculum.is_finished(399));
        assert_eq!(curriculum.rates_at(400), Phase::FINISHED);
        assert!(curriculum.is_finished(400));
    }

    #[test]
    fn test_uneven_split_uses_floor() {
        let curriculum = Curriculum::standard(10).unwrap();
        assert_eq!(curriculum.phase_length(), 2);
        assert_eq!(curriculum.index_at(7), 3);
        assert!(curriculum.is_finished(8));
    }

    #[test]
    fn test_short_runs_still_progress() {
        let curriculum = Curriculum::standard(2).unwrap();
        assert_eq!(curriculum.phase_length(), 1);
        assert_eq!(curriculum.index_at(1), 1);
    }

    #[test]
    fn test_rejects_empty_schedules() {
        assert!(Curriculum::standard(0).is_err());
        assert!(Curriculum::new(10, Vec::new()).is_err());
    }
}
