//! Shared configuration types for CLI commands

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    config::AgentConfig,
    environments::{ConnectFourRewards, TicTacToeRewards, TreasureRewards},
};

/// Environment to train or evaluate on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    /// 3x3 tic-tac-toe
    TicTacToe,
    /// 6x7 connect four
    ConnectFour,
    /// Grid world with traps and a treasure
    TreasureHunt,
}

impl GameKind {
    pub fn label(self) -> &'static str {
        match self {
            GameKind::TicTacToe => "tic-tac-toe",
            GameKind::ConnectFour => "connect-four",
            GameKind::TreasureHunt => "treasure-hunt",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a board game is learned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TrainingMode {
    /// Two agents share one board and take turns
    Alternating,
    /// One agent against a random opponent folded into the environment
    Versus,
}

impl TrainingMode {
    pub fn label(self) -> &'static str {
        match self {
            TrainingMode::Alternating => "alternating",
            TrainingMode::Versus => "versus",
        }
    }
}

/// Reward overrides collected from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardOverrides {
    pub win: Option<f64>,
    pub penalty: Option<f64>,
    pub small: Option<f64>,
}

impl RewardOverrides {
    pub fn tictactoe(&self) -> TicTacToeRewards {
        let defaults = TicTacToeRewards::default();
        TicTacToeRewards {
            win: self.win.unwrap_or(defaults.win),
            penalty: self.penalty.unwrap_or(defaults.penalty),
            small: self.small.unwrap_or(defaults.small),
        }
    }

    pub fn connect_four(&self) -> ConnectFourRewards {
        let defaults = ConnectFourRewards::default();
        ConnectFourRewards {
            win: self.win.unwrap_or(defaults.win),
            penalty: self.penalty.unwrap_or(defaults.penalty),
            small: self.small.unwrap_or(defaults.small),
        }
    }

    /// `win` pays the treasure, `penalty` applies to every trap.
    pub fn treasure_hunt(&self) -> TreasureRewards {
        let defaults = TreasureRewards::default();
        TreasureRewards {
            treasure: self.win.unwrap_or(defaults.treasure),
            penalties: self
                .penalty
                .map(|penalty| [penalty; 3])
                .unwrap_or(defaults.penalties),
        }
    }
}

/// Agent configuration for a command line run
///
/// Learning and exploration rates start at the first curriculum phase; only
/// the discount is user supplied.
pub fn agent_config(discount: f64, seed: Option<u64>) -> AgentConfig {
    let config = AgentConfig::new().with_discount_rate(discount);
    match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    }
}
