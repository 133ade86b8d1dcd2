use std::{fs, path::Path};

use log::info;
use serde::{Deserialize, Serialize};
use specs::CompiledNetwork;

use crate::{error::Result, session::TrainingReport, storage::ObjectStore};

/// What a training node stores once it stops, and what a later run resumes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub network: CompiledNetwork,
    pub report: TrainingReport,
}

impl Artifact {
    /// Writes the artifact as JSON to `path`, creating its parent directories.
    ///
    /// # Errors
    /// Returns `NodeError::Io` if the file can't be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Reads a previously saved artifact.
    ///
    /// # Errors
    /// Returns `NodeError::Io` if the file can't be read and `NodeError::Json`
    /// if it doesn't hold an artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let artifact: Self = serde_json::from_str(&content)?;

        info!(
            epochs = artifact.report.epochs;
            "loaded artifact from {}",
            path.as_ref().display()
        );
        Ok(artifact)
    }
}

/// Produces the network to train: the one stored under `resume_key` when set,
/// otherwise a fresh compilation of the document under `network_key`.
///
/// # Errors
/// Returns any fetch, load or compilation error.
pub fn resolve_network<S: ObjectStore>(
    store: &S,
    network_key: &str,
    resume_key: Option<&str>,
) -> Result<CompiledNetwork> {
    if let Some(key) = resume_key {
        info!("resuming training from '{key}'");
        return Ok(Artifact::load(store.fetch(key)?)?.network);
    }

    let path = store.fetch(network_key)?;
    Ok(compiler::compile_file(path)?)
}
