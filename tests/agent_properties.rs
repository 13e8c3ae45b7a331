//! Behavioural properties of the Q-learning agent on small environments
//! whose correct values are known in closed form.

mod common;

use common::{Bandit, Flat, OneShot, looks_uniform};
use qlearn::{
    Hyperparameters, StateId,
    ports::Environment,
    q_learning::{QLearningAgent, QTable},
};

const STATE: StateId = StateId::new(0);

#[test]
fn unseen_entries_read_zero() {
    let agent = QLearningAgent::new(Hyperparameters::default())
        .with_seed(1)
        .with_environment(Bandit::default());

    assert_eq!(agent.q_table().get(STATE, &0), 0.0);
    assert_eq!(agent.q_table().get(StateId::new(99), &1), 0.0);
    assert_eq!(agent.q_table().best_value(STATE, &[0, 1]), 0.0);
}

#[test]
fn full_learning_rate_replaces_estimate() {
    let mut agent = QLearningAgent::new(Hyperparameters::new(1.0, 0.0, 0.9))
        .with_seed(2)
        .with_environment(Bandit::default());
    agent.restore_table(QTable::from_entries([(STATE, 1, 5.0), (STATE, 0, -3.0)]));

    let transition = agent.step().unwrap();

    // Greedy pick is arm 1; target = 1.0 + 0.9 * max(5.0, -3.0)
    assert_eq!(transition.action, 1);
    assert_eq!(agent.q_table().get(STATE, &1), 1.0 + 0.9 * 5.0);
    assert_eq!(agent.q_table().get(STATE, &0), -3.0);
}

#[test]
fn ties_are_broken_uniformly() {
    let arms = 5;
    let mut agent = QLearningAgent::new(Hyperparameters::new(0.5, 0.0, 0.9))
        .with_seed(3)
        .with_environment(Flat { arms });

    let mut counts = vec![0u64; arms];
    for _ in 0..10_000 {
        counts[agent.select_action().unwrap()] += 1;
    }

    assert!(counts.iter().all(|&count| count > 0));
    assert!(looks_uniform(&counts, 0.001), "counts: {counts:?}");
}

#[test]
fn greedy_agent_never_leaves_best_action() {
    let mut agent = QLearningAgent::new(Hyperparameters::new(0.0, 0.0, 0.9))
        .with_seed(4)
        .with_environment(Flat { arms: 4 });
    agent.restore_table(QTable::from_entries([(STATE, 2, 0.25)]));

    for _ in 0..2_000 {
        assert_eq!(agent.select_action().unwrap(), 2);
    }
}

#[test]
fn full_exploration_is_uniform_over_legal_actions() {
    let arms = 4;
    let mut agent = QLearningAgent::new(Hyperparameters::new(0.0, 1.0, 0.9))
        .with_seed(5)
        .with_environment(Flat { arms });
    agent.restore_table(QTable::from_entries([(STATE, 2, 10.0)]));

    let mut counts = vec![0u64; arms];
    for _ in 0..8_000 {
        counts[agent.select_action().unwrap()] += 1;
    }

    assert!(looks_uniform(&counts, 0.001), "counts: {counts:?}");
}

#[test]
fn table_only_grows() {
    let mut agent = QLearningAgent::new(Hyperparameters::new(0.5, 1.0, 0.9))
        .with_seed(6)
        .with_environment(Flat { arms: 6 });

    let mut previous = 0;
    for _ in 0..200 {
        agent.step().unwrap();
        let len = agent.q_table().len();
        assert!(len >= previous);
        previous = len;
    }
    assert_eq!(previous, 6);
}

#[test]
fn terminal_state_does_not_bootstrap() {
    let mut agent = QLearningAgent::new(Hyperparameters::new(1.0, 0.0, 0.9))
        .with_seed(7)
        .with_environment(OneShot::new(2.5));
    // A stale value stored for the terminal state must be ignored.
    agent.restore_table(QTable::from_entries([(StateId::new(1), 0, 100.0)]));

    let transition = agent.step().unwrap();

    assert!(transition.terminal);
    assert_eq!(agent.q_table().get(STATE, &0), 2.5);
    assert!(agent.step().is_err());

    agent.environment_mut().unwrap().reset();
    agent.step().unwrap();
    assert_eq!(agent.q_table().get(STATE, &0), 2.5);
}

#[test]
fn bandit_learns_rewarding_arm() {
    let mut agent = QLearningAgent::new(Hyperparameters::new(0.3, 0.3, 0.5))
        .with_seed(8)
        .with_environment(Bandit::default());

    agent.learn(3_000).unwrap();

    let table = agent.q_table();
    // Fixed points: Q(1) = 1 / (1 - γ) = 2.0, Q(0) = γ Q(1) = 1.0
    assert!((table.get(STATE, &1) - 2.0).abs() < 0.3);
    assert!(table.get(STATE, &1) > table.get(STATE, &0));

    agent.freeze();
    for _ in 0..50 {
        assert_eq!(agent.select_action().unwrap(), 1);
    }
    assert_eq!(agent.environment().unwrap().pulls, 3_000);
}
