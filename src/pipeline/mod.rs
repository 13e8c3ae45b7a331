//! Training and evaluation pipeline
//!
//! This module provides:
//! - The annealing curriculum for learning and exploration rates
//! - The training driver for self-resetting, folded-opponent and alternating play
//! - Opponent adapters for folded-opponent play
//! - Observers recording progress and outcomes during training

pub mod curriculum;
pub mod observers;
pub mod opponents;
pub mod training;

pub use curriculum::{Curriculum, Phase, STANDARD_PHASES};
// Re-export observer implementations (adapters)
pub use observers::{
    EpisodeRecord, JsonlObserver, OutcomeSample, OutcomeSampler, ProgressObserver,
};
// Re-export opponent implementations (adapters)
pub use opponents::{GreedyOpponent, RandomOpponent};
pub use training::{TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::{Observer, Opponent};
