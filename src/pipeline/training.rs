//! Training pipeline for Q-learning agents
//!
//! The driver owns the step budget and the curriculum. It advances agents one
//! `learn` call at a time, re-applies the phase rates, resets board games
//! once they end and reports progress to observers.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::curriculum::{Curriculum, Phase, STANDARD_PHASES};
use crate::{
    Error, Result,
    environments::Shared,
    ports::{Environment, Observer, TwoPlayerGame},
    q_learning::{LearnStats, QLearningAgent},
    types::{GameOutcome, Player},
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of learning steps (transitions) in the run
    pub total_steps: u64,

    /// Steps per `learn` call for self-resetting environments. Defaults to
    /// one hundredth of a curriculum phase.
    #[serde(default)]
    pub steps_per_tick: Option<u64>,

    /// Random seed
    #[serde(default)]
    pub seed: Option<u64>,

    /// Games between two outcome samples
    #[serde(default = "default_sample_every")]
    pub sample_every: usize,

    /// Rates per curriculum phase
    #[serde(default = "default_phases")]
    pub phases: Vec<Phase>,
}

fn default_sample_every() -> usize {
    100
}

fn default_phases() -> Vec<Phase> {
    STANDARD_PHASES.to_vec()
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            total_steps: 100_000,
            steps_per_tick: None,
            seed: None,
            sample_every: default_sample_every(),
            phases: default_phases(),
        }
    }
}

impl TrainingConfig {
    pub fn new(total_steps: u64) -> Self {
        Self {
            total_steps,
            ..Self::default()
        }
    }

    /// Steps per `learn` call in [`TrainingPipeline::run_continuing`].
    pub fn tick_size(&self) -> u64 {
        let phases = self.phases.len().max(1) as u64;
        self.steps_per_tick
            .unwrap_or(self.total_steps / phases / 100)
            .max(1)
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }
}

/// Result of a training or evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Environment name
    pub environment: String,

    /// Learning steps performed
    pub total_steps: u64,

    /// Finished games (zero for self-resetting environments)
    pub episodes: usize,

    /// Games won by the first player (X)
    pub first_wins: usize,

    /// Games won by the second player (O)
    pub second_wins: usize,

    /// Drawn games
    pub draws: usize,

    pub first_win_rate: f64,
    pub second_win_rate: f64,
    pub draw_rate: f64,

    /// Sum of the rewards observed by the trained agent
    pub total_reward: f64,

    /// Learning rate at the end of the run
    pub learning_rate: f64,

    /// Exploration rate at the end of the run
    pub exploration_rate: f64,

    /// Entries in the trained agent's table
    pub table_entries: usize,
}

impl TrainingResult {
    pub(crate) fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            total_steps: 0,
            episodes: 0,
            first_wins: 0,
            second_wins: 0,
            draws: 0,
            first_win_rate: 0.0,
            second_win_rate: 0.0,
            draw_rate: 0.0,
            total_reward: 0.0,
            learning_rate: 0.0,
            exploration_rate: 0.0,
            table_entries: 0,
        }
    }

    fn record(&mut self, outcome: GameOutcome) {
        self.episodes += 1;
        match outcome {
            GameOutcome::Win(Player::X) => self.first_wins += 1,
            GameOutcome::Win(Player::O) => self.second_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }

    fn finish<E: Environment>(mut self, agent: &QLearningAgent<E>) -> Self {
        if self.episodes > 0 {
            let games = self.episodes as f64;
            self.first_win_rate = self.first_wins as f64 / games;
            self.second_win_rate = self.second_wins as f64 / games;
            self.draw_rate = self.draws as f64 / games;
        }
        self.learning_rate = agent.learning_rate;
        self.exploration_rate = agent.exploration_rate;
        self.table_entries = agent.q_table().len();
        self
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Training pipeline driving one or two agents through a curriculum
pub struct TrainingPipeline {
    config: TrainingConfig,
    curriculum: Curriculum,
    observers: Vec<Box<dyn Observer>>,
    phase_index: Option<usize>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] for a zero step budget or an empty
    /// phase list.
    pub fn new(config: TrainingConfig) -> Result<Self> {
        let curriculum = Curriculum::new(config.total_steps, config.phases.clone())?;
        Ok(Self {
            config,
            curriculum,
            observers: Vec::new(),
            phase_index: None,
        })
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// Train on an environment that restarts its own episodes.
    ///
    /// Every tick runs `learn(tick_size)` and then re-applies the rates of
    /// the phase the step count has reached.
    pub fn run_continuing<E: Environment>(
        &mut self,
        agent: &mut QLearningAgent<E>,
    ) -> Result<TrainingResult> {
        let environment = Self::bound_name(agent)?;
        self.start(&environment)?;
        if let Some(seed) = self.config.seed {
            agent.reseed(seed);
        }

        let total = self.config.total_steps;
        let tick = self.config.tick_size();
        let mut result = TrainingResult::new(environment.as_str());
        let mut stats = LearnStats::default();

        let rates = self.advance_phase(0)?;
        apply(agent, rates);

        let mut step = 0;
        while step < total {
            let batch = tick.min(total - step);
            let learned = agent
                .learn(batch)
                .inspect_err(|err| report(&environment, step, err))?;
            stats.merge(learned);
            step += batch;

            let rates = self.advance_phase(step)?;
            apply(agent, rates);
            for observer in &mut self.observers {
                observer.on_progress(step)?;
            }
        }

        result.total_steps = stats.steps;
        result.total_reward = stats.total_reward;
        self.end(result.finish(agent))
    }

    /// Train one agent on a single-agent view of a board game, such as
    /// [`crate::environments::Versus`].
    ///
    /// The game is reset whenever it ends; each finished game is reported
    /// to the observers.
    pub fn run_versus<G: TwoPlayerGame>(
        &mut self,
        agent: &mut QLearningAgent<G>,
    ) -> Result<TrainingResult> {
        let environment = Self::bound_name(agent)?;
        self.start(&environment)?;
        if let Some(seed) = self.config.seed {
            agent.reseed(seed);
        }

        let mut result = TrainingResult::new(environment.as_str());
        for step in 0..self.config.total_steps {
            let rates = self.advance_phase(step)?;
            apply(agent, rates);

            let stats = agent
                .learn(1)
                .inspect_err(|err| report(&environment, step, err))?;
            result.total_steps += 1;
            result.total_reward += stats.total_reward;

            let game = agent.environment_mut().ok_or(Error::Unbound)?;
            if let Some(outcome) = finished(&*game) {
                game.reset();
                self.episode_end(&mut result, step + 1, outcome)?;
            }
        }

        let rates = self.advance_phase(self.config.total_steps)?;
        apply(agent, rates);
        self.end(result.finish(agent))
    }

    /// Train two agents that share one game and take turns.
    ///
    /// On every step the agent whose side is to move calls `learn(1)`; the
    /// other agent later sees the resulting position as its own state. Both
    /// agents follow the same curriculum.
    pub fn run_alternating<G: TwoPlayerGame>(
        &mut self,
        first: &mut QLearningAgent<Shared<G>>,
        second: &mut QLearningAgent<Shared<G>>,
    ) -> Result<TrainingResult> {
        let environment = Self::shared_name(first, second)?;
        self.start(&environment)?;
        if let Some(seed) = self.config.seed {
            first.reseed(seed);
            second.reseed(seed.wrapping_add(1));
        }

        let mut result = TrainingResult::new(environment.as_str());
        for step in 0..self.config.total_steps {
            let rates = self.advance_phase(step)?;
            apply(first, rates);
            apply(second, rates);

            let mover = Self::to_move(first)?;
            let agent = match mover {
                Player::X => &mut *first,
                Player::O => &mut *second,
            };
            let stats = agent
                .learn(1)
                .inspect_err(|err| report(&environment, step, err))?;
            result.total_steps += 1;
            if mover == Player::X {
                result.total_reward += stats.total_reward;
            }

            let game = first.environment_mut().ok_or(Error::Unbound)?;
            if let Some(outcome) = finished(&*game) {
                game.reset();
                self.episode_end(&mut result, step + 1, outcome)?;
            }
        }

        let rates = self.advance_phase(self.config.total_steps)?;
        apply(first, rates);
        apply(second, rates);
        self.end(result.finish(first))
    }

    /// Play `games` games between two frozen agents sharing one game.
    ///
    /// Both agents have their learning and exploration rates set to zero and
    /// play their greedy policies; the tables are only read. The game is
    /// reset before the first game.
    pub fn evaluate_alternating<G: TwoPlayerGame>(
        &mut self,
        agent: &mut QLearningAgent<Shared<G>>,
        bot: &mut QLearningAgent<Shared<G>>,
        games: usize,
    ) -> Result<TrainingResult> {
        let environment = Self::shared_name(agent, bot)?;
        agent.freeze();
        bot.freeze();
        if let Some(seed) = self.config.seed {
            agent.reseed(seed);
            bot.reseed(seed.wrapping_add(1));
        }

        let mut result = TrainingResult::new(environment.as_str());
        agent.environment_mut().ok_or(Error::Unbound)?.reset();

        let mut step = 0;
        while result.episodes < games {
            let mover = Self::to_move(agent)?;
            let player = match mover {
                Player::X => &mut *agent,
                Player::O => &mut *bot,
            };
            let action = player.select_action()?;
            let reward = player
                .environment_mut()
                .ok_or(Error::Unbound)?
                .execute(&action)
                .inspect_err(|err| report(&environment, step, err))?;
            step += 1;
            if mover == Player::X {
                result.total_reward += reward;
            }

            let game = agent.environment_mut().ok_or(Error::Unbound)?;
            if let Some(outcome) = finished(&*game) {
                game.reset();
                self.episode_end(&mut result, step, outcome)?;
            }
        }

        result.total_steps = step;
        let result = result.finish(agent);
        info!(
            environment = %result.environment,
            games = result.episodes,
            first_win_rate = result.first_win_rate,
            draw_rate = result.draw_rate,
            "evaluation complete"
        );
        Ok(result)
    }

    /// Walk a frozen agent through a self-resetting environment for `steps`
    /// steps and collect the rewards.
    pub fn evaluate_continuing<E: Environment>(
        &mut self,
        agent: &mut QLearningAgent<E>,
        steps: u64,
    ) -> Result<TrainingResult> {
        let environment = Self::bound_name(agent)?;
        agent.freeze();
        if let Some(seed) = self.config.seed {
            agent.reseed(seed);
        }

        let mut result = TrainingResult::new(environment.as_str());
        for step in 0..steps {
            let action = agent.select_action()?;
            result.total_reward += agent
                .environment_mut()
                .ok_or(Error::Unbound)?
                .execute(&action)
                .inspect_err(|err| report(&environment, step, err))?;
            result.total_steps += 1;
        }
        Ok(result.finish(agent))
    }

    fn bound_name<E: Environment>(agent: &QLearningAgent<E>) -> Result<String> {
        agent
            .environment()
            .map(|env| env.name().to_string())
            .ok_or(Error::Unbound)
    }

    fn shared_name<G: TwoPlayerGame>(
        first: &QLearningAgent<Shared<G>>,
        second: &QLearningAgent<Shared<G>>,
    ) -> Result<String> {
        match (first.environment(), second.environment()) {
            (Some(a), Some(b)) if a.same_game(b) => Ok(a.name().to_string()),
            (Some(_), Some(_)) => Err(Error::InvalidConfiguration {
                message: "alternating play needs both agents bound to the same game".to_string(),
            }),
            _ => Err(Error::Unbound),
        }
    }

    fn to_move<G: TwoPlayerGame>(agent: &QLearningAgent<Shared<G>>) -> Result<Player> {
        agent
            .environment()
            .map(|game| game.to_move())
            .ok_or(Error::Unbound)
    }

    fn start(&mut self, environment: &str) -> Result<()> {
        info!(
            environment,
            total_steps = self.config.total_steps,
            phases = self.curriculum.phases().len(),
            "training started"
        );
        self.phase_index = None;
        for observer in &mut self.observers {
            observer.on_training_start(self.config.total_steps)?;
        }
        Ok(())
    }

    /// Rates for `step`, notifying observers when the phase changes.
    fn advance_phase(&mut self, step: u64) -> Result<Phase> {
        let index = self.curriculum.index_at(step).min(self.curriculum.phases().len());
        if self.phase_index != Some(index) {
            self.phase_index = Some(index);
            let phase = self.curriculum.phase_at(step);
            match phase {
                Some(phase) => info!(
                    step,
                    index,
                    learning_rate = phase.learning_rate,
                    exploration_rate = phase.exploration_rate,
                    "curriculum phase"
                ),
                None => info!(step, "curriculum finished, learning and exploration off"),
            }
            for observer in &mut self.observers {
                observer.on_phase_change(step, index, phase)?;
            }
        }
        Ok(self.curriculum.rates_at(step))
    }

    fn episode_end(
        &mut self,
        result: &mut TrainingResult,
        step: u64,
        outcome: GameOutcome,
    ) -> Result<()> {
        let episode = result.episodes;
        result.record(outcome);
        debug!(episode, step, outcome = outcome.label(), "game finished");
        for observer in &mut self.observers {
            observer.on_episode_end(episode, step, outcome)?;
            observer.on_progress(step)?;
        }
        Ok(())
    }

    fn end(&mut self, result: TrainingResult) -> Result<TrainingResult> {
        info!(
            environment = %result.environment,
            steps = result.total_steps,
            episodes = result.episodes,
            entries = result.table_entries,
            "training complete"
        );
        for observer in &mut self.observers {
            observer.on_training_end(&result)?;
        }
        Ok(result)
    }
}

fn apply<E: Environment>(agent: &mut QLearningAgent<E>, rates: Phase) {
    agent.learning_rate = rates.learning_rate;
    agent.exploration_rate = rates.exploration_rate;
}

fn finished<G: TwoPlayerGame>(game: &G) -> Option<GameOutcome> {
    if game.is_terminal() {
        game.outcome()
    } else {
        None
    }
}

fn report(environment: &str, step: u64, err: &Error) {
    if err.is_environment_fault() {
        warn!(environment, step, error = %err, "environment fault, stopping training");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        environments::{TicTacToe, TreasureHunt, Versus, levels},
        pipeline::opponents::RandomOpponent,
        types::Hyperparameters,
    };

    #[test]
    fn test_tick_size_defaults_to_hundredth_of_phase() {
        let config = TrainingConfig::new(40_000);
        assert_eq!(config.tick_size(), 100);
        assert_eq!(TrainingConfig::new(10).tick_size(), 1);

        let config = TrainingConfig {
            steps_per_tick: Some(7),
            ..TrainingConfig::new(10)
        };
        assert_eq!(config.tick_size(), 7);
    }

    #[test]
    fn test_zero_budget_rejected() {
        assert!(TrainingPipeline::new(TrainingConfig::new(0)).is_err());
    }

    #[test]
    fn test_continuing_run_ends_frozen() {
        let config = TrainingConfig {
            seed: Some(1),
            ..TrainingConfig::new(2_000)
        };
        let mut pipeline = TrainingPipeline::new(config).unwrap();
        let mut agent = QLearningAgent::new(Hyperparameters::default())
            .with_environment(TreasureHunt::new(levels::LEVEL_0).unwrap());

        let result = pipeline.run_continuing(&mut agent).unwrap();
        assert_eq!(result.total_steps, 2_000);
        assert_eq!(result.episodes, 0);
        assert_eq!(agent.learning_rate, 0.0);
        assert_eq!(agent.exploration_rate, 0.0);
        assert_eq!(agent.steps_taken(), 2_000);
    }

    #[test]
    fn test_versus_run_counts_games() {
        let config = TrainingConfig {
            seed: Some(2),
            ..TrainingConfig::new(500)
        };
        let mut pipeline = TrainingPipeline::new(config).unwrap();
        let mut agent = QLearningAgent::new(Hyperparameters::default())
            .with_environment(Versus::new(TicTacToe::new(), RandomOpponent::with_seed(9)));

        let result = pipeline.run_versus(&mut agent).unwrap();
        assert_eq!(result.total_steps, 500);
        assert!(result.episodes > 0);
        assert_eq!(
            result.first_wins + result.second_wins + result.draws,
            result.episodes
        );
    }

    #[test]
    fn test_alternating_requires_same_game() {
        let mut pipeline = TrainingPipeline::new(TrainingConfig::new(10)).unwrap();
        let mut first = QLearningAgent::new(Hyperparameters::default())
            .with_environment(Shared::new(TicTacToe::new()));
        let mut second = QLearningAgent::new(Hyperparameters::default())
            .with_environment(Shared::new(TicTacToe::new()));

        assert!(matches!(
            pipeline.run_alternating(&mut first, &mut second),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
