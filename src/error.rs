//! Error types for the reinforce crate

use thiserror::Error;

/// Main error type for the reinforce crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("state vector has {got} entries, expected {expected}")]
    StateDimensionMismatch { expected: usize, got: usize },

    #[error("state {state} is out of range (environment has {limit} states)")]
    StateOutOfRange { state: usize, limit: usize },

    #[error("no allowed actions available in state {state}")]
    NoAllowedActions { state: usize },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid update rule '{input}'. Expected one of: qlearn, sarsa")]
    ParseUpdateRule { input: String },

    #[error(
        "approximator maps {input_len} inputs to {output_len} outputs, \
         expected {expected_inputs} inputs and {expected_outputs} outputs"
    )]
    ApproximatorShapeMismatch {
        input_len: usize,
        output_len: usize,
        expected_inputs: usize,
        expected_outputs: usize,
    },

    #[error(
        "saved agent covers {saved_states} states and {saved_actions} actions, \
         target has {target_states} states and {target_actions} actions"
    )]
    SavedAgentShapeMismatch {
        saved_states: usize,
        saved_actions: usize,
        target_states: usize,
        target_actions: usize,
    },

    #[error("unsupported save format version {found}, expected {expected}")]
    UnsupportedSaveVersion { found: u32, expected: u32 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
