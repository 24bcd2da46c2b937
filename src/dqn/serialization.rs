//! Serialization support for DQN agents.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::Context;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    dqn::{config::DqnConfig, solver::DqnSolver},
    error::{Error, Result},
    ports::ValueApproximator,
};

/// Persistable snapshot of a DQN agent: the network dimensions plus the
/// approximator state itself.
///
/// The approximator serializes through serde, so any `N` whose learned
/// weights derive `Serialize`/`Deserialize` round-trips without the solver
/// knowing its internals. Replay memory and the short-term transition window
/// are deliberately not part of the format; a restored agent resumes with an
/// empty memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedDqnAgent<N> {
    pub version: u32,
    pub state_count: usize,
    pub hidden_units: Vec<usize>,
    pub action_count: usize,
    net: N,
}

impl<N> SavedDqnAgent<N>
where
    N: ValueApproximator + Clone + Serialize + DeserializeOwned,
{
    pub const VERSION: u32 = 1;

    /// Snapshot a solver's approximator together with its dimensions.
    pub fn from_solver(solver: &DqnSolver<N>) -> Self {
        let config = solver.config();
        Self {
            version: Self::VERSION,
            state_count: config.state_count,
            hidden_units: config.hidden_units.clone(),
            action_count: config.action_count,
            net: solver.net().clone(),
        }
    }

    /// Rebuild a solver around the saved approximator.
    ///
    /// The configuration supplies the hyperparameters; its dimensions must
    /// match the saved ones. The hidden layer widths are taken from the save
    /// since they describe the network actually carried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSaveVersion`] for format mismatches and
    /// [`Error::SavedAgentShapeMismatch`] when the configured dimensions
    /// disagree with the saved ones.
    pub fn to_solver(self, mut config: DqnConfig) -> Result<DqnSolver<N>> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedSaveVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        if config.state_count != self.state_count || config.action_count != self.action_count {
            return Err(Error::SavedAgentShapeMismatch {
                saved_states: self.state_count,
                saved_actions: self.action_count,
                target_states: config.state_count,
                target_actions: config.action_count,
            });
        }

        config.hidden_units = self.hidden_units;
        DqnSolver::new(config, self.net)
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

        rmp_serde::encode::write(&mut writer, self).context("Failed to serialize DQN agent")?;

        Ok(())
    }

    /// Read a snapshot back from a MessagePack file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).context("Failed to deserialize DQN agent")
    }
}
