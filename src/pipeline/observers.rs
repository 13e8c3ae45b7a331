//! Observer adapters for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::{curriculum::Phase, training::TrainingResult};
use crate::{
    Result,
    ports::Observer,
    types::{GameOutcome, Player},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    first_wins: usize,
    draws: usize,
    second_wins: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            first_wins: 0,
            draws: 0,
            second_wins: 0,
        }
    }

    fn message(&self) -> String {
        format!(
            "X:{} D:{} O:{}",
            self.first_wins, self.draws, self.second_wins
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_steps: u64) -> Result<()> {
        let pb = ProgressBar::new(total_steps);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} steps {msg}")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_phase_change(&mut self, _step: u64, index: usize, phase: Option<Phase>) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            match phase {
                Some(phase) => pb.println(format!(
                    "phase {}: learning rate {:.2}, exploration rate {:.2}",
                    index + 1,
                    phase.learning_rate,
                    phase.exploration_rate
                )),
                None => pb.println("learning finished"),
            }
        }
        Ok(())
    }

    fn on_episode_end(&mut self, _episode: usize, _step: u64, outcome: GameOutcome) -> Result<()> {
        match outcome {
            GameOutcome::Win(Player::X) => self.first_wins += 1,
            GameOutcome::Win(Player::O) => self.second_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
        if let Some(pb) = &self.progress_bar {
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_progress(&mut self, step: u64) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(step);
        }
        Ok(())
    }

    fn on_training_end(&mut self, result: &TrainingResult) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(result.total_steps);
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Cumulative outcome counts at one point of training
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSample {
    /// Games finished so far
    pub games: usize,
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
}

/// Outcome sampler - records cumulative win and draw counts every
/// `interval` games, for plotting learning curves
pub struct OutcomeSampler {
    interval: usize,
    current: OutcomeSample,
    samples: Vec<OutcomeSample>,
    output: Option<PathBuf>,
}

impl OutcomeSampler {
    /// Create a sampler; an interval of zero is treated as one.
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            current: OutcomeSample::default(),
            samples: Vec::new(),
            output: None,
        }
    }

    /// Write the samples as JSON to `path` when training ends.
    pub fn with_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    pub fn samples(&self) -> &[OutcomeSample] {
        &self.samples
    }

    /// Save samples to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &self.samples)?;
        Ok(())
    }
}

impl Observer for OutcomeSampler {
    fn on_training_start(&mut self, _total_steps: u64) -> Result<()> {
        self.current = OutcomeSample::default();
        self.samples.clear();
        Ok(())
    }

    fn on_episode_end(&mut self, _episode: usize, _step: u64, outcome: GameOutcome) -> Result<()> {
        self.current.games += 1;
        match outcome {
            GameOutcome::Win(Player::X) => self.current.first_wins += 1,
            GameOutcome::Win(Player::O) => self.current.second_wins += 1,
            GameOutcome::Draw => self.current.draws += 1,
        }
        if self.current.games % self.interval == 0 {
            self.samples.push(self.current);
        }
        Ok(())
    }

    fn on_training_end(&mut self, _result: &TrainingResult) -> Result<()> {
        if let Some(path) = &self.output {
            self.save(path)?;
        }
        Ok(())
    }
}

/// One finished game as written by [`JsonlObserver`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: usize,
    /// Training step at which the game ended
    pub step: u64,
    /// Steps taken in this game
    pub length: u64,
    pub outcome: String,
}

/// JSONL observer - Writes one JSON object per finished game
pub struct JsonlObserver {
    writer: BufWriter<File>,
    last_step: u64,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self {
            writer,
            last_step: 0,
        })
    }
}

impl Observer for JsonlObserver {
    fn on_training_start(&mut self, _total_steps: u64) -> Result<()> {
        self.last_step = 0;
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, step: u64, outcome: GameOutcome) -> Result<()> {
        let record = EpisodeRecord {
            episode,
            step,
            length: step - self.last_step,
            outcome: outcome.label().to_string(),
        };
        self.last_step = step;

        serde_json::to_writer(&mut self.writer, &record)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self, _result: &TrainingResult) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_interval() {
        let mut sampler = OutcomeSampler::new(2);
        sampler.on_training_start(100).unwrap();
        for outcome in [
            GameOutcome::Win(Player::X),
            GameOutcome::Draw,
            GameOutcome::Win(Player::O),
            GameOutcome::Win(Player::X),
            GameOutcome::Draw,
        ] {
            sampler.on_episode_end(0, 0, outcome).unwrap();
        }

        assert_eq!(
            sampler.samples(),
            &[
                OutcomeSample {
                    games: 2,
                    first_wins: 1,
                    second_wins: 0,
                    draws: 1
                },
                OutcomeSample {
                    games: 4,
                    first_wins: 2,
                    second_wins: 1,
                    draws: 1
                },
            ]
        );
    }

    #[test]
    fn test_jsonl_observer_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.jsonl");

        let mut observer = JsonlObserver::new(&path).unwrap();
        observer.on_training_start(10).unwrap();
        observer
            .on_episode_end(0, 5, GameOutcome::Win(Player::X))
            .unwrap();
        observer.on_episode_end(1, 14, GameOutcome::Draw).unwrap();
        let result = TrainingResult::new("tic-tac-toe");
        observer.on_training_end(&result).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: EpisodeRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.length, 9);
        assert_eq!(second.outcome, "draw");
    }
}
