//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training runs, allowing
//! composable data collection without coupling the driver to specific output
//! formats.

use crate::{
    Result,
    pipeline::{curriculum::Phase, training::TrainingResult},
    types::GameOutcome,
};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_steps)` - once at the beginning
/// 2. `on_phase_change(...)` - whenever the curriculum moves to another phase
/// 3. `on_episode_end(...)` - after every finished game (board games only)
/// 4. `on_training_end(result)` - once at the end
///
/// # Examples
///
/// ```no_run
/// use qlearn::{GameOutcome, ports::Observer};
///
/// struct DrawCounter {
///     draws: usize,
/// }
///
/// impl Observer for DrawCounter {
///     fn on_episode_end(
///         &mut self,
///         _episode: usize,
///         _step: u64,
///         outcome: GameOutcome,
///     ) -> qlearn::Result<()> {
///         if outcome == GameOutcome::Draw {
///             self.draws += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer {
    /// Called when training starts.
    ///
    /// # Default Implementation
    ///
    /// Does nothing.
    fn on_training_start(&mut self, _total_steps: u64) -> Result<()> {
        Ok(())
    }

    /// Called when the curriculum enters a new phase.
    ///
    /// `phase` is `None` once all phases are complete and the rates have been
    /// zeroed.
    fn on_phase_change(&mut self, _step: u64, _index: usize, _phase: Option<Phase>) -> Result<()> {
        Ok(())
    }

    /// Called for every finished game.
    fn on_episode_end(&mut self, _episode: usize, _step: u64, _outcome: GameOutcome) -> Result<()> {
        Ok(())
    }

    /// Called after the driver advanced training by a batch of steps.
    fn on_progress(&mut self, _step: u64) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    fn on_training_end(&mut self, _result: &TrainingResult) -> Result<()> {
        Ok(())
    }
}
