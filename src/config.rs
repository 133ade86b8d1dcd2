use std::{env, num::NonZeroUsize, path::PathBuf};

use crate::error::{NodeError, Result};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8080";
const DEFAULT_LABELS_FILE: &str = "csvfile.txt";
const DEFAULT_ARTIFACT: &str = "network.json";

/// Runtime settings of the training node, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Root of the object store standing in for the remote bucket.
    pub store_root: PathBuf,
    /// Local directory fetched objects are materialized into.
    pub cache_dir: PathBuf,
    /// Object key of the network document.
    pub network_key: String,
    /// Object key of the directory holding the training samples.
    pub data_key: String,
    /// File name of the label table inside the data directory.
    pub labels_file: String,
    /// Object key the training artifact is stored under.
    pub artifact_key: String,
    /// Object key of a stored artifact to resume from instead of compiling.
    pub resume_key: Option<String>,
    /// Address the control endpoint listens on.
    pub control_addr: String,
    pub max_epochs: Option<NonZeroUsize>,
}

impl NodeConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `NodeError::Config` if `NETWORK_PATH` or `DATA_PATH` is unset or
    /// `MAX_EPOCHS` isn't a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| NodeError::Config(format!("missing variable {key}")))
        };
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let max_epochs = match lookup("MAX_EPOCHS") {
            Some(v) => Some(v.parse::<NonZeroUsize>().map_err(|e| {
                NodeError::Config(format!("MAX_EPOCHS must be a positive integer: {e}"))
            })?),
            None => None,
        };

        Ok(Self {
            store_root: or("STORE_ROOT", ".").into(),
            cache_dir: or("CACHE_DIR", "work").into(),
            network_key: required("NETWORK_PATH")?,
            data_key: required("DATA_PATH")?,
            labels_file: or("LABELS_FILE", DEFAULT_LABELS_FILE),
            artifact_key: or("ARTIFACT_PATH", DEFAULT_ARTIFACT),
            resume_key: lookup("RESUME_PATH"),
            control_addr: format!(
                "{}:{}",
                or("HOST", DEFAULT_HOST),
                or("PORT", DEFAULT_PORT)
            ),
            max_epochs,
        })
    }
}
