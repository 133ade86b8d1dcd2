//! A training node: fetches a network document and its dataset, compiles the
//! network and trains it until stopped.

pub mod artifact;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod labels;
pub mod samples;
pub mod session;
pub mod storage;

pub use artifact::Artifact;
pub use config::NodeConfig;
pub use engine::{DryRunEngine, Engine};
pub use error::{NodeError, Result};
pub use labels::LabelSource;
pub use samples::Record;
pub use session::{TrainingReport, TrainingSession};
pub use storage::{LocalStore, ObjectStore};
