//! Serialization support for tabular TD agents.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    ports::DiscreteEnvironment,
    td::{
        config::TdConfig,
        solver::{TdSolver, TdSolverState},
    },
};

/// Persistable snapshot of a TD agent.
///
/// Carries the full learned state — Q-table, policy table, trace table,
/// environment model, priorities — together with the configuration and the
/// table dimensions, so a restored agent continues exactly where it stopped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTdAgent {
    pub version: u32,
    pub config: TdConfig,
    state: TdSolverState,
}

impl SavedTdAgent {
    pub const VERSION: u32 = 1;

    /// Snapshot a solver.
    pub fn from_solver<E: DiscreteEnvironment>(solver: &TdSolver<E>) -> Self {
        Self {
            version: Self::VERSION,
            config: solver.config().clone(),
            state: solver.export_state(),
        }
    }

    /// Rebuild a solver against `env`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSaveVersion`] for format mismatches and
    /// [`Error::SavedAgentShapeMismatch`] when the environment dimensions
    /// disagree with the saved tables.
    pub fn to_solver<E: DiscreteEnvironment>(&self, env: E) -> Result<TdSolver<E>> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedSaveVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        if env.num_states() != self.state.num_states || env.num_actions() != self.state.num_actions
        {
            return Err(Error::SavedAgentShapeMismatch {
                saved_states: self.state.num_states,
                saved_actions: self.state.num_actions,
                target_states: env.num_states(),
                target_actions: env.num_actions(),
            });
        }

        let mut solver = TdSolver::new(self.config.clone(), env)?;
        solver.apply_state(self.state.clone());
        Ok(solver)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot to a MessagePack file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file: {}", path.as_ref().display()))?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, self).context("Failed to serialize TD agent")?;

        Ok(())
    }

    /// Read a snapshot back from a MessagePack file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).context("Failed to deserialize TD agent")
    }
}
