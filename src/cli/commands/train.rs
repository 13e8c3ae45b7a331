//! Train command - Train a Q-learning agent on one of the built-in environments

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::to_writer_pretty;

use crate::{
    cli::{
        config::{GameKind, RewardOverrides, TrainingMode, agent_config},
        output::{format_number, print_kv, print_result, print_section, print_subsection},
    },
    config::AgentConfig,
    environments::{ConnectFour, Direction, Shared, TicTacToe, TreasureHunt, Versus},
    pipeline::{
        JsonlObserver, OutcomeSampler, ProgressObserver, RandomOpponent, TrainingConfig,
        TrainingPipeline, TrainingResult,
    },
    ports::TwoPlayerGame,
    q_learning::{QLearningAgent, SavedQTable},
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    game: GameKind,
    mode: Option<TrainingMode>,
    agent: AgentConfig,
    config: TrainingConfig,
    training: TrainingResult,
    evaluation: Option<TrainingResult>,
}

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Environment to learn
    #[arg(value_enum)]
    pub game: GameKind,

    /// Number of learning steps
    #[arg(long, short = 's', default_value_t = 100_000)]
    pub steps: u64,

    /// How board games are played during training
    #[arg(long, short = 'm', value_enum, default_value_t = TrainingMode::Alternating)]
    pub mode: TrainingMode,

    /// Discount rate γ (0.0-1.0)
    #[arg(long, default_value_t = 0.9)]
    pub discount: f64,

    /// Reward for winning (or reaching the treasure)
    #[arg(long)]
    pub win_reward: Option<f64>,

    /// Penalty for leaving an immediate win open (or stepping on a trap)
    #[arg(long)]
    pub penalty: Option<f64>,

    /// Reward for building a line one short of a win
    #[arg(long)]
    pub small_reward: Option<f64>,

    /// Built-in treasure hunt level
    #[arg(long, default_value_t = 0)]
    pub level: usize,

    /// Steps per learn call for the treasure hunt
    #[arg(long)]
    pub steps_per_tick: Option<u64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file for the learned Q-table
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional file for one JSON line per finished game
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional file for cumulative outcome samples
    #[arg(long)]
    pub samples: Option<PathBuf>,

    /// Games between two outcome samples
    #[arg(long, default_value_t = 100)]
    pub sample_every: usize,

    /// Games against an untrained bot after training (0 to skip)
    #[arg(long, default_value_t = 1000)]
    pub evaluation_games: usize,

    /// Greedy treasure hunt steps after training (0 to skip)
    #[arg(long, default_value_t = 10_000)]
    pub evaluation_steps: u64,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

impl TrainArgs {
    fn rewards(&self) -> RewardOverrides {
        RewardOverrides {
            win: self.win_reward,
            penalty: self.penalty,
            small: self.small_reward,
        }
    }

    fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            total_steps: self.steps,
            steps_per_tick: self.steps_per_tick,
            seed: self.seed,
            sample_every: self.sample_every,
            ..TrainingConfig::default()
        }
    }

    fn pipeline(&self) -> Result<TrainingPipeline> {
        let mut pipeline = TrainingPipeline::new(self.training_config())?;
        if self.progress {
            pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
        }
        if let Some(path) = &self.observations {
            let observer = JsonlObserver::new(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            pipeline = pipeline.with_observer(Box::new(observer));
        }
        if let Some(path) = &self.samples {
            let sampler = OutcomeSampler::new(self.sample_every).with_output(path);
            pipeline = pipeline.with_observer(Box::new(sampler));
        }
        Ok(pipeline)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let agent = agent_config(args.discount, args.seed);
    agent.validate()?;

    print_section(&format!(
        "Training on {} for {} steps",
        args.game,
        format_number(args.steps)
    ));

    let rewards = args.rewards();
    let (training, evaluation) = match args.game {
        GameKind::TicTacToe => {
            train_board(TicTacToe::with_rewards(rewards.tictactoe()), &args, &agent)?
        }
        GameKind::ConnectFour => train_board(
            ConnectFour::new().with_rewards(rewards.connect_four()),
            &args,
            &agent,
        )?,
        GameKind::TreasureHunt => {
            let level = TreasureHunt::builtin(args.level)?.with_rewards(rewards.treasure_hunt());
            train_treasure(level, &args, &agent)?
        }
    };

    if let Some(path) = &args.summary {
        let summary = TrainingSummaryFile {
            game: args.game,
            mode: (args.game != GameKind::TreasureHunt).then_some(args.mode),
            agent,
            config: args.training_config(),
            training,
            evaluation,
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
        to_writer_pretty(file, &summary).context("Failed to write training summary")?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}

fn train_board<G>(
    game: G,
    args: &TrainArgs,
    agent_config: &AgentConfig,
) -> Result<(TrainingResult, Option<TrainingResult>)>
where
    G: TwoPlayerGame + Clone,
    G::Action: Serialize + DeserializeOwned,
{
    let template = game.clone();
    let mut pipeline = args.pipeline()?;

    let (training, saved) = match args.mode {
        TrainingMode::Alternating => {
            let shared = Shared::new(game);
            let second_config = AgentConfig {
                seed: agent_config.seed.map(|seed| seed.wrapping_add(1)),
                ..*agent_config
            };
            let mut first = QLearningAgent::from_config(agent_config).with_environment(shared.clone());
            let mut second = QLearningAgent::from_config(&second_config).with_environment(shared);
            let result = pipeline.run_alternating(&mut first, &mut second)?;
            (result, SavedQTable::from_agent(&first))
        }
        TrainingMode::Versus => {
            let opponent = match args.seed {
                Some(seed) => RandomOpponent::with_seed(seed.wrapping_add(1)),
                None => RandomOpponent::new(),
            };
            let mut agent = QLearningAgent::from_config(agent_config)
                .with_environment(Versus::new(game, opponent));
            let result = pipeline.run_versus(&mut agent)?;
            (result, SavedQTable::from_agent(&agent))
        }
    };

    print_subsection(&format!("Training ({})", args.mode.label()));
    print_result(&training);
    save_table(&saved, args)?;

    if args.evaluation_games == 0 {
        return Ok((training, None));
    }
    let evaluation = evaluate_board(&saved, template, args.evaluation_games, args.seed)?;
    print_subsection("Frozen play against an untrained bot");
    print_result(&evaluation);
    Ok((training, Some(evaluation)))
}

fn train_treasure(
    level: TreasureHunt,
    args: &TrainArgs,
    agent_config: &AgentConfig,
) -> Result<(TrainingResult, Option<TrainingResult>)> {
    let template = level.clone();
    let mut pipeline = args.pipeline()?;
    let mut agent = QLearningAgent::from_config(agent_config).with_environment(level);
    let training = pipeline.run_continuing(&mut agent)?;

    print_subsection("Training");
    print_result(&training);
    if let Some(level) = agent.environment() {
        print_kv("Treasures found", &format_number(level.treasures_found()));
        print_kv("Lives lost", &format_number(level.lives_lost()));
    }

    let saved = SavedQTable::from_agent(&agent);
    save_table(&saved, args)?;

    if args.evaluation_steps == 0 {
        return Ok((training, None));
    }
    let (evaluation, found, lost) =
        evaluate_treasure(&saved, template, args.evaluation_steps, args.seed)?;
    print_subsection("Greedy walk");
    print_result(&evaluation);
    print_kv("Treasures found", &format_number(found));
    print_kv("Lives lost", &format_number(lost));
    Ok((training, Some(evaluation)))
}

fn save_table<A: Serialize>(saved: &SavedQTable<A>, args: &TrainArgs) -> Result<()> {
    if let Some(path) = &args.output {
        saved.save_to_file(path)?;
        println!("\nQ-table ({} entries) saved to {}", saved.len(), path.display());
    }
    Ok(())
}

/// Play a saved table against an untrained bot, both frozen.
pub(crate) fn evaluate_board<G>(
    saved: &SavedQTable<G::Action>,
    game: G,
    games: usize,
    seed: Option<u64>,
) -> Result<TrainingResult>
where
    G: TwoPlayerGame,
{
    let shared = Shared::new(game);
    let mut agent = QLearningAgent::new(saved.hyperparameters).with_environment(shared.clone());
    saved.restore_into(&mut agent)?;
    let mut bot = QLearningAgent::new(saved.hyperparameters).with_environment(shared);

    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        seed,
        ..TrainingConfig::default()
    })?;
    Ok(pipeline.evaluate_alternating(&mut agent, &mut bot, games)?)
}

/// Walk a saved treasure hunt table greedily; returns the run result with
/// the treasures found and lives lost.
pub(crate) fn evaluate_treasure(
    saved: &SavedQTable<Direction>,
    level: TreasureHunt,
    steps: u64,
    seed: Option<u64>,
) -> Result<(TrainingResult, u64, u64)> {
    let mut agent = QLearningAgent::new(saved.hyperparameters).with_environment(level);
    saved.restore_into(&mut agent)?;

    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        seed,
        ..TrainingConfig::default()
    })?;
    let result = pipeline.evaluate_continuing(&mut agent, steps)?;
    let (found, lost) = agent
        .environment()
        .map(|level| (level.treasures_found(), level.lives_lost()))
        .unwrap_or_default();
    Ok((result, found, lost))
}
