//! Reinforcement-learning solvers that learn a state/action value function
//! from streamed experience
//!
//! This crate provides:
//! - A function-approximation Q-learning core with epsilon-greedy
//!   exploration, experience replay and clipped TD error ([`DqnSolver`])
//! - A tabular TD control core with eligibility traces, a learned
//!   environment model and Dyna-style prioritized planning ([`TdSolver`])
//! - Shared exploration policies ([`policy`]) and the trait contracts the
//!   cores require from their collaborators ([`ports`])
//! - MessagePack and JSON persistence for trained agents
//!
//! Both cores are driven by an external control loop alternating
//! [`Solver::decide`] and [`Solver::learn`]; neither spawns threads nor
//! requires locking.

pub mod dqn;
pub mod error;
pub mod policy;
pub mod ports;
pub mod td;

pub use dqn::{DqnConfig, DqnSolver, ReplayMemory, SarsaExperience, SavedDqnAgent};
pub use error::{Error, Result};
pub use ports::{DiscreteEnvironment, Solver, ValueApproximator};
pub use td::{EnvironmentModel, PriorityPlanner, SavedTdAgent, TdConfig, TdSolver, UpdateRule};
