//! Evaluate command - Play a saved Q-table with learning and exploration off

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use super::train::{evaluate_board, evaluate_treasure};
use crate::{
    cli::{
        config::GameKind,
        output::{format_number, print_kv, print_result, print_section},
    },
    environments::{Column, ConnectFour, Direction, Placement, TicTacToe, TreasureHunt},
    pipeline::TrainingResult,
    q_learning::SavedQTable,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a saved Q-table")]
pub struct EvaluateArgs {
    /// Environment the table was learned on
    #[arg(value_enum)]
    pub game: GameKind,

    /// Path to the saved Q-table
    #[arg(long, short = 't')]
    pub table: PathBuf,

    /// Number of games against an untrained bot
    #[arg(long, short = 'g', default_value_t = 1000)]
    pub games: usize,

    /// Greedy steps for the treasure hunt
    #[arg(long, default_value_t = 10_000)]
    pub steps: u64,

    /// Built-in treasure hunt level
    #[arg(long, default_value_t = 0)]
    pub level: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export results to file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EvaluationExport {
    game: GameKind,
    table: PathBuf,
    result: TrainingResult,
    treasures_found: Option<u64>,
    lives_lost: Option<u64>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    print_section(&format!(
        "Evaluating {} on {}",
        args.table.display(),
        args.game
    ));

    let (result, treasures_found, lives_lost) = match args.game {
        GameKind::TicTacToe => {
            let saved: SavedQTable<Placement> = load(&args)?;
            let result = evaluate_board(&saved, TicTacToe::new(), args.games, args.seed)?;
            (result, None, None)
        }
        GameKind::ConnectFour => {
            let saved: SavedQTable<Column> = load(&args)?;
            let result = evaluate_board(&saved, ConnectFour::new(), args.games, args.seed)?;
            (result, None, None)
        }
        GameKind::TreasureHunt => {
            let saved: SavedQTable<Direction> = load(&args)?;
            let level = TreasureHunt::builtin(args.level)?;
            let (result, found, lost) = evaluate_treasure(&saved, level, args.steps, args.seed)?;
            (result, Some(found), Some(lost))
        }
    };

    print_result(&result);
    if let (Some(found), Some(lost)) = (treasures_found, lives_lost) {
        print_kv("Treasures found", &format_number(found));
        print_kv("Lives lost", &format_number(lost));
    }

    if let Some(path) = &args.export {
        let export = EvaluationExport {
            game: args.game,
            table: args.table.clone(),
            result,
            treasures_found,
            lives_lost,
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create export file: {}", path.display()))?;
        to_writer_pretty(file, &export).context("Failed to write evaluation results")?;
        println!("\nResults exported to {}", path.display());
    }

    Ok(())
}

fn load<A: serde::de::DeserializeOwned>(args: &EvaluateArgs) -> Result<SavedQTable<A>> {
    let saved = SavedQTable::load_from_file(&args.table)?;
    print_kv("Entries", &format_number(saved.len() as u64));
    print_kv("Trained steps", &format_number(saved.steps_taken));
    Ok(saved)
}
