//! Integration tests for the tabular TD core.
//!
//! The workhorse fixture is a two-state deterministic MDP where the chosen
//! action is the next state and action 1 pays reward 1. With γ = 0.5 the
//! analytic fixed point is Q*(s, 1) = 2 and Q*(s, 0) = 1 for both states.

mod common;

use common::FreeEnv;
use reinforce::{Error, SavedTdAgent, Solver, TdConfig, TdSolver, UpdateRule};

/// Drive the two-state MDP: the next state equals the chosen action, and
/// choosing action 1 pays reward 1.
fn drive_two_state_mdp(solver: &mut TdSolver<FreeEnv>, steps: usize) {
    let mut state = 0usize;
    for _ in 0..steps {
        let action = solver.decide(&state).expect("decide should succeed");
        let reward = if action == 1 { 1.0 } else { 0.0 };
        solver.learn(reward).expect("learn should succeed");
        state = action;
    }
}

#[test]
fn test_qlearn_converges_to_analytic_fixed_point() {
    let config = TdConfig::default()
        .with_alpha(0.2)
        .with_epsilon(0.2)
        .with_gamma(0.5);
    let mut solver = TdSolver::new(config, FreeEnv { states: 2, actions: 2 })
        .unwrap()
        .with_seed(7);

    drive_two_state_mdp(&mut solver, 8000);

    for state in 0..2 {
        assert!(
            (solver.q_value(state, 1) - 2.0).abs() < 0.05,
            "Q({state}, 1) = {}, expected 2.0",
            solver.q_value(state, 1)
        );
        assert!(
            (solver.q_value(state, 0) - 1.0).abs() < 0.05,
            "Q({state}, 0) = {}, expected 1.0",
            solver.q_value(state, 0)
        );
    }
}

#[test]
fn test_sarsa_converges_to_its_on_policy_fixed_point() {
    let config = TdConfig::default()
        .with_update(UpdateRule::Sarsa)
        .with_alpha(0.05)
        .with_epsilon(0.1)
        .with_gamma(0.5);
    let mut solver = TdSolver::new(config, FreeEnv { states: 2, actions: 2 })
        .unwrap()
        .with_seed(3);

    drive_two_state_mdp(&mut solver, 40_000);

    // Under the ε-greedy behavior policy (ε = 0.1) the on-policy values are
    // Q(s, 1) = 1.95 and Q(s, 0) = 0.95, slightly below the greedy optimum.
    for state in 0..2 {
        assert!(
            (solver.q_value(state, 1) - 1.95).abs() < 0.15,
            "Q({state}, 1) = {}, expected ~1.95",
            solver.q_value(state, 1)
        );
        assert!(
            (solver.q_value(state, 0) - 0.95).abs() < 0.15,
            "Q({state}, 0) = {}, expected ~0.95",
            solver.q_value(state, 0)
        );
    }
}

#[test]
fn test_lambda_zero_matches_plain_one_step_td() {
    let alpha = 0.1;
    let gamma = 0.5;
    let config = TdConfig::default()
        .with_alpha(alpha)
        .with_gamma(gamma)
        .with_lambda(0.0);
    let mut solver = TdSolver::new(config, FreeEnv { states: 2, actions: 2 })
        .unwrap()
        .with_seed(11);

    // Shadow the solver with a hand-rolled one-step Q-learning table, fed
    // the exact transitions the solver experiences.
    let index = |state: usize, action: usize| action * 2 + state;
    let mut shadow_q = vec![0.0f64; 4];
    let mut previous: Option<(usize, usize)> = None;
    let mut previous_reward: Option<f64> = None;

    let mut state = 0usize;
    for _ in 0..200 {
        let action = solver.decide(&state).unwrap();
        if let (Some((s0, a0)), Some(r0)) = (previous, previous_reward) {
            let max_next = shadow_q[index(state, 0)].max(shadow_q[index(state, 1)]);
            let target = r0 + gamma * max_next;
            let update = alpha * (target - shadow_q[index(s0, a0)]);
            shadow_q[index(s0, a0)] += update;
        }
        let reward = if action == 1 { 1.0 } else { 0.0 };
        solver.learn(reward).unwrap();
        previous = Some((state, action));
        previous_reward = Some(reward);
        state = action;
    }

    for state in 0..2 {
        for action in 0..2 {
            assert_eq!(
                solver.q_value(state, action),
                shadow_q[index(state, action)],
                "one-step shadow diverged at ({state}, {action})"
            );
            assert_eq!(
                solver.trace_value(state, action),
                0.0,
                "trace table must stay untouched with lambda = 0"
            );
        }
    }
}

#[test]
fn test_planning_step_adds_exactly_one_backup() {
    // Single-action chain: 0 -> 1 -> 1, reward 1 everywhere. With a single
    // allowed action the drive is fully deterministic.
    let base = TdConfig::default().with_alpha(0.1).with_gamma(0.5);
    let mut without_planning = TdSolver::new(
        base.clone().with_planning_steps(0),
        FreeEnv { states: 2, actions: 1 },
    )
    .unwrap()
    .with_seed(5);
    let mut with_planning = TdSolver::new(
        base.with_planning_steps(1),
        FreeEnv { states: 2, actions: 1 },
    )
    .unwrap()
    .with_seed(5);

    for solver in [&mut without_planning, &mut with_planning] {
        solver.decide(&0).unwrap();
        solver.learn(1.0).unwrap();
        solver.decide(&1).unwrap();
        solver.learn(1.0).unwrap();
        solver.decide(&1).unwrap();
        solver.learn(1.0).unwrap();
    }

    // Both solvers apply the same two direct updates. The third learning
    // cycle raises the priority of (0, 0) — its modeled successor just
    // changed — and the planning solver backs it up once more:
    // Q(0,0) = 0.1 + 0.1 * (1 + 0.5*0.1 - 0.1) = 0.195.
    assert!((without_planning.q_value(0, 0) - 0.1).abs() < 1e-12);
    assert!((with_planning.q_value(0, 0) - 0.195).abs() < 1e-12);
    // The backed-up entry is consumed.
    assert_eq!(
        with_planning.q_value(1, 0),
        without_planning.q_value(1, 0)
    );
}

#[test]
fn test_sarsa_planning_draws_a_next_action() {
    let config = TdConfig::default()
        .with_update(UpdateRule::Sarsa)
        .with_alpha(0.1)
        .with_gamma(0.5)
        .with_planning_steps(1);
    let mut solver = TdSolver::new(config, FreeEnv { states: 2, actions: 1 })
        .unwrap()
        .with_seed(5);

    solver.decide(&0).unwrap();
    solver.learn(1.0).unwrap();
    solver.decide(&1).unwrap();
    solver.learn(1.0).unwrap();
    solver.decide(&1).unwrap();
    solver.learn(1.0).unwrap();

    // Same arithmetic as the qlearn case: with one allowed action the drawn
    // next action is forced, so the planned backup lands on 0.195.
    assert!((solver.q_value(0, 0) - 0.195).abs() < 1e-12);
}

#[test]
fn test_epsilon_one_is_uniform_over_allowed_actions() {
    let config = TdConfig::default().with_epsilon(1.0);
    let mut solver = TdSolver::new(config, FreeEnv { states: 1, actions: 3 })
        .unwrap()
        .with_seed(42);

    let trials = 3000;
    let mut counts = [0usize; 3];
    for _ in 0..trials {
        counts[solver.decide(&0).unwrap()] += 1;
    }
    for (action, &count) in counts.iter().enumerate() {
        assert!(
            count > trials / 4,
            "action {action} drawn {count} times out of {trials}, expected ~{}",
            trials / 3
        );
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let config = TdConfig::default().with_epsilon(0.5).with_alpha(0.1);
    let mut first = TdSolver::new(config.clone(), FreeEnv { states: 2, actions: 2 })
        .unwrap()
        .with_seed(9);
    let mut second = TdSolver::new(config, FreeEnv { states: 2, actions: 2 })
        .unwrap()
        .with_seed(9);

    let mut state = 0usize;
    for _ in 0..100 {
        let a = first.decide(&state).unwrap();
        let b = second.decide(&state).unwrap();
        assert_eq!(a, b);
        first.learn(1.0).unwrap();
        second.learn(1.0).unwrap();
        state = a;
    }
}

#[test]
fn test_persistence_roundtrip_preserves_learned_state() {
    let config = TdConfig::default()
        .with_alpha(0.2)
        .with_gamma(0.5)
        .with_lambda(0.3)
        .with_planning_steps(2);
    let mut solver = TdSolver::new(config, FreeEnv { states: 2, actions: 2 })
        .unwrap()
        .with_seed(13);
    drive_two_state_mdp(&mut solver, 500);

    let saved = SavedTdAgent::from_solver(&solver);

    // MessagePack file round-trip
    let dir = tempfile::TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("td_agent.msgpack");
    saved.save_to_file(&path).expect("failed to save");
    let loaded = SavedTdAgent::load_from_file(&path).expect("failed to load");
    let restored = loaded
        .to_solver(FreeEnv { states: 2, actions: 2 })
        .unwrap();

    for state in 0..2 {
        for action in 0..2 {
            assert_eq!(
                restored.q_value(state, action),
                solver.q_value(state, action)
            );
            assert_eq!(
                restored.policy_probability(state, action),
                solver.policy_probability(state, action)
            );
            assert_eq!(
                restored.trace_value(state, action),
                solver.trace_value(state, action)
            );
        }
    }

    // JSON round-trip
    let json = saved.to_json().unwrap();
    let from_json = SavedTdAgent::from_json(&json).unwrap();
    let restored = from_json
        .to_solver(FreeEnv { states: 2, actions: 2 })
        .unwrap();
    assert_eq!(restored.q_value(0, 1), solver.q_value(0, 1));
}

#[test]
fn test_restore_rejects_mismatched_environment() {
    let solver = TdSolver::new(TdConfig::default(), FreeEnv { states: 2, actions: 2 }).unwrap();
    let saved = SavedTdAgent::from_solver(&solver);

    let result = saved.to_solver(FreeEnv { states: 3, actions: 2 });
    assert!(matches!(result, Err(Error::SavedAgentShapeMismatch { .. })));
}

#[test]
fn test_reset_restores_a_fresh_agent() {
    let config = TdConfig::default().with_alpha(0.2).with_gamma(0.5);
    let mut solver = TdSolver::new(config, FreeEnv { states: 2, actions: 2 })
        .unwrap()
        .with_seed(21);
    drive_two_state_mdp(&mut solver, 500);
    assert!(solver.q_value(0, 1) > 0.0);

    solver.reset().unwrap();

    for state in 0..2 {
        for action in 0..2 {
            assert_eq!(solver.q_value(state, action), 0.0);
            assert_eq!(solver.policy_probability(state, action), 0.5);
        }
    }
}

#[test]
fn test_solver_names_follow_the_update_rule() {
    let qlearn = TdSolver::new(TdConfig::default(), FreeEnv { states: 1, actions: 1 }).unwrap();
    assert_eq!(qlearn.name(), "Q-learning");

    let sarsa = TdSolver::new(
        TdConfig::default().with_update(UpdateRule::Sarsa),
        FreeEnv { states: 1, actions: 1 },
    )
    .unwrap();
    assert_eq!(sarsa.name(), "SARSA");
}
