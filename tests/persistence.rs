//! Saving learned tables to disk and restoring them into fresh agents.

use qlearn::{
    Hyperparameters,
    environments::{Column, ConnectFour, Direction, TreasureHunt, levels},
    ports::Environment,
    q_learning::{QLearningAgent, SavedQTable},
};
use tempfile::tempdir;

#[test]
fn treasure_table_survives_a_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treasure.qtable");

    let mut agent = QLearningAgent::new(Hyperparameters::new(0.4, 0.7, 0.9))
        .with_seed(21)
        .with_environment(TreasureHunt::new(levels::LEVEL_1).unwrap());
    agent.learn(2_000).unwrap();
    SavedQTable::from_agent(&agent).save_to_file(&path).unwrap();

    let loaded: SavedQTable<Direction> = SavedQTable::load_from_file(&path).unwrap();
    assert_eq!(loaded.environment, "treasure-hunt");
    assert_eq!(loaded.steps_taken, 2_000);
    assert_eq!(loaded.hyperparameters, agent.hyperparameters());
    assert_eq!(loaded.layout, agent.environment().unwrap().layout());

    let mut restored = QLearningAgent::new(Hyperparameters::default())
        .with_environment(TreasureHunt::new(levels::LEVEL_1).unwrap());
    loaded.restore_into(&mut restored).unwrap();

    assert_eq!(restored.q_table().len(), agent.q_table().len());
    for (state, action, value) in agent.q_table().iter() {
        assert_eq!(restored.q_table().get(state, action), value);
    }
    assert_eq!(restored.hyperparameters(), agent.hyperparameters());
}

#[test]
fn restored_agent_plays_like_the_trained_one() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("connect.qtable");

    let mut agent = QLearningAgent::new(Hyperparameters::new(0.5, 1.0, 0.9))
        .with_seed(22)
        .with_environment(ConnectFour::new());
    agent.learn(6).unwrap();
    SavedQTable::from_agent(&agent).save_to_file(&path).unwrap();

    let loaded: SavedQTable<Column> = SavedQTable::load_from_file(&path).unwrap();
    let mut restored = QLearningAgent::new(Hyperparameters::default())
        .with_seed(23)
        .with_environment(ConnectFour::new());
    loaded.restore_into(&mut restored).unwrap();

    agent.freeze();
    restored.freeze();
    agent.environment_mut().unwrap().reset();
    let expected = agent.q_table().best_actions(
        agent.environment().unwrap().state_id().unwrap(),
        &agent.environment().unwrap().legal_actions(),
    );
    let choice = restored.select_action().unwrap();
    assert!(expected.contains(&choice));
}

#[test]
fn loading_into_another_environment_fails() {
    let saved = SavedQTable::<Column>::from_table(
        &Default::default(),
        "treasure-hunt",
        Hyperparameters::default(),
        0,
    );
    let mut board =
        QLearningAgent::new(Hyperparameters::default()).with_environment(ConnectFour::new());

    let message = saved.restore_into(&mut board).unwrap_err().to_string();
    assert!(message.contains("treasure-hunt"));
    assert!(message.contains("connect-four"));
}

#[test]
fn table_from_another_level_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("level1.qtable");

    let mut agent = QLearningAgent::new(Hyperparameters::new(0.4, 0.7, 0.9))
        .with_seed(24)
        .with_environment(TreasureHunt::builtin(1).unwrap());
    agent.learn(200).unwrap();
    SavedQTable::from_agent(&agent).save_to_file(&path).unwrap();
    let loaded: SavedQTable<Direction> = SavedQTable::load_from_file(&path).unwrap();

    let mut other_level = QLearningAgent::new(Hyperparameters::default())
        .with_environment(TreasureHunt::builtin(0).unwrap());
    let message = loaded.restore_into(&mut other_level).unwrap_err().to_string();
    assert!(message.contains("layout"));
    assert!(other_level.q_table().is_empty());

    let mut same_level = QLearningAgent::new(Hyperparameters::default())
        .with_environment(TreasureHunt::builtin(1).unwrap());
    loaded.restore_into(&mut same_level).unwrap();
    assert_eq!(same_level.q_table().len(), agent.q_table().len());
}

#[test]
fn table_from_another_board_size_is_rejected() {
    let mut agent = QLearningAgent::new(Hyperparameters::new(0.5, 1.0, 0.9))
        .with_seed(25)
        .with_environment(ConnectFour::with_size(4, 5).unwrap());
    // A win needs at least seven drops.
    agent.learn(6).unwrap();
    let saved = SavedQTable::from_agent(&agent);
    assert_eq!(saved.layout.as_deref(), Some("4x5"));

    let mut standard =
        QLearningAgent::new(Hyperparameters::default()).with_environment(ConnectFour::new());
    assert!(saved.restore_into(&mut standard).is_err());
}

#[test]
fn missing_file_is_reported() {
    let dir = tempdir().unwrap();
    let result: anyhow::Result<SavedQTable<Direction>> =
        SavedQTable::load_from_file(dir.path().join("absent.qtable"));
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("absent.qtable"));
}
