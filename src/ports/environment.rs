//! Environment port consumed by the tabular TD core.

/// A finite environment with integer states and actions.
///
/// The TD core never transitions the environment itself; the driving loop
/// does that. The solver only needs the dimensions of the state/action space
/// and, per state, which actions are legal.
pub trait DiscreteEnvironment {
    /// Total number of states.
    fn num_states(&self) -> usize;

    /// Maximum number of actions across all states.
    fn num_actions(&self) -> usize;

    /// Ordered list of action indices valid in `state`.
    ///
    /// Action indices must be below [`num_actions`](DiscreteEnvironment::num_actions).
    fn allowed_actions(&self, state: usize) -> Vec<usize>;
}
