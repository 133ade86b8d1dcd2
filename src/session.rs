use std::num::NonZeroUsize;

use log::info;
use serde::{Deserialize, Serialize};
use specs::CompiledNetwork;
use tokio_util::sync::CancellationToken;

use crate::{
    engine::Engine,
    error::{NodeError, Result},
    samples::Record,
};

/// Summary of a finished training session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs: usize,
    pub last_score: Option<f32>,
}

/// Repeatedly fits a network over a fixed set of records until told to stop.
pub struct TrainingSession {
    network: CompiledNetwork,
    records: Vec<Record>,
    max_epochs: Option<NonZeroUsize>,
}

impl TrainingSession {
    /// Creates a new `TrainingSession`.
    ///
    /// # Arguments
    /// * `network` - The compiled network to train.
    /// * `records` - The labelled samples of every epoch.
    /// * `max_epochs` - An upper bound on the epochs to run, unbounded if `None`.
    pub fn new(
        network: CompiledNetwork,
        records: Vec<Record>,
        max_epochs: Option<NonZeroUsize>,
    ) -> Self {
        Self {
            network,
            records,
            max_epochs,
        }
    }

    /// Runs epochs until `token` is cancelled or `max_epochs` is reached.
    ///
    /// The token is checked before every epoch, so a running epoch is always
    /// finished before the session stops.
    ///
    /// # Errors
    /// Returns `NodeError::Engine` if there are no records to train on, otherwise
    /// the first error reported by the engine.
    pub fn run<E: Engine>(&self, engine: &mut E, token: &CancellationToken) -> Result<TrainingReport> {
        if self.records.is_empty() {
            return Err(NodeError::Engine("no labelled samples to train on".into()));
        }

        let mut report = TrainingReport::default();

        while !token.is_cancelled() {
            if self.max_epochs.is_some_and(|max| report.epochs >= max.get()) {
                info!("reached the maximum of {} epoch(s)", report.epochs);
                break;
            }

            let score = engine.fit(&self.network, &self.records)?;
            report.epochs += 1;
            report.last_score = Some(score);
            info!(epoch = report.epochs, score = score; "finished epoch");
        }

        info!(epochs = report.epochs; "training stopped");
        Ok(report)
    }
}
