use log::debug;
use specs::CompiledNetwork;

use crate::{
    error::{NodeError, Result},
    samples::Record,
};

/// A training engine able to run passes of a compiled network over labelled records.
pub trait Engine {
    /// Runs a single pass over `records`.
    ///
    /// # Returns
    /// The pass' score as reported by the engine.
    fn fit(&mut self, network: &CompiledNetwork, records: &[Record]) -> Result<f32>;
}

/// An engine that doesn't train, it only checks the records fit the network.
///
/// Every record's label must be as wide as the network's output layer. The
/// score is the amount of records checked.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunEngine;

impl Engine for DryRunEngine {
    fn fit(&mut self, network: &CompiledNetwork, records: &[Record]) -> Result<f32> {
        let width = network
            .output_width()
            .ok_or_else(|| NodeError::Engine("network has no output layer".into()))?;

        if let Some(record) = records.iter().find(|r| r.label.len() != width) {
            return Err(NodeError::Engine(format!(
                "label of {} has {} values, the output layer produces {width}",
                record.path.display(),
                record.label.len()
            )));
        }

        debug!(records = records.len(); "dry run pass");
        Ok(records.len() as f32)
    }
}
