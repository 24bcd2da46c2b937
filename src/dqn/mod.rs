//! Deep Q-learning with experience replay
//!
//! This module implements a Q-learning core on top of an external
//! value-function approximator. Each act/learn cycle performs one online
//! TD update with a clipped error, then replays a small uniformly sampled
//! minibatch from a fixed-capacity ring buffer of past transitions — the
//! amortized replay is what differentiates this core from pure online TD.
//!
//! The approximator itself (forward/backward/update on weight matrices) is a
//! collaborator supplied through [`crate::ports::ValueApproximator`].

pub mod config;
pub mod replay;
pub mod serialization;
pub mod solver;

// Public re-exports
pub use config::DqnConfig;
pub use replay::{ReplayMemory, SarsaExperience};
pub use serialization::SavedDqnAgent;
pub use solver::DqnSolver;
