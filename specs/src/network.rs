use serde::{Deserialize, Serialize};

use crate::layer::{ActFnSpec, AdapterSpec, LayerSpec};

/// Describes the parameter update algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    #[default]
    Adam,
    AdaGrad,
    AdaDelta,
    AdaMax,
    Nesterovs,
    RmsProp,
    Sgd,
}

/// The representation the first stage of the network expects its input in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSpec {
    FeedForward {
        size: usize,
    },
    Convolutional {
        height: usize,
        width: usize,
        channels: usize,
    },
}

/// A single element of the compiled pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSpec {
    Layer(LayerSpec),
    Adapter(AdapterSpec),
}

impl StageSpec {
    pub fn expects_map(&self) -> bool {
        match self {
            Self::Layer(layer) => layer.expects_map(),
            Self::Adapter(adapter) => adapter.expects_map(),
        }
    }
}

/// A fully resolved network, ready to be instantiated by a training engine.
///
/// The last stage is always the `Output` layer and adapters never appear
/// back to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledNetwork {
    pub activation: Option<ActFnSpec>,
    pub optimizer: OptimizerSpec,
    pub input: InputSpec,
    pub classification: bool,
    pub stages: Vec<StageSpec>,
}

impl CompiledNetwork {
    /// Returns the terminal output layer, if the pipeline is not empty.
    pub fn output(&self) -> Option<&LayerSpec> {
        match self.stages.last()? {
            StageSpec::Layer(layer @ LayerSpec::Output { .. }) => Some(layer),
            _ => None,
        }
    }

    /// Returns the amount of values the output layer produces per sample.
    pub fn output_width(&self) -> Option<usize> {
        match self.output()? {
            LayerSpec::Output { outputs, .. } => Some(*outputs),
            _ => None,
        }
    }

    /// Iterates over the layers of the pipeline, skipping adapters.
    pub fn layers(&self) -> impl Iterator<Item = &LayerSpec> {
        self.stages.iter().filter_map(|stage| match stage {
            StageSpec::Layer(layer) => Some(layer),
            StageSpec::Adapter(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{LossFnSpec, RegularizationSpec};

    fn network() -> CompiledNetwork {
        CompiledNetwork {
            activation: Some(ActFnSpec::Relu),
            optimizer: OptimizerSpec::Sgd,
            input: InputSpec::FeedForward { size: 4 },
            classification: true,
            stages: vec![
                StageSpec::Layer(LayerSpec::Dense {
                    outputs: 8,
                    act_fn: None,
                    regularization: RegularizationSpec::default(),
                }),
                StageSpec::Layer(LayerSpec::Output {
                    outputs: 3,
                    loss: LossFnSpec::Mcxent,
                    act_fn: Some(ActFnSpec::Softmax),
                    regularization: RegularizationSpec::default(),
                }),
            ],
        }
    }

    #[test]
    fn output_is_the_last_stage() {
        let net = network();
        assert_eq!(net.output_width(), Some(3));
        assert_eq!(net.layers().count(), 2);
    }

    #[test]
    fn output_is_none_when_pipeline_ends_in_adapter() {
        let mut net = network();
        net.stages.push(StageSpec::Adapter(AdapterSpec::MapToVector));
        assert!(net.output().is_none());
        assert!(net.output_width().is_none());
    }

    #[test]
    fn serializes_with_snake_case_tags() {
        let json = serde_json::to_value(network()).unwrap();
        assert_eq!(json["optimizer"], "sgd");
        assert_eq!(json["input"]["feed_forward"]["size"], 4);
        assert_eq!(json["stages"][1]["layer"]["output"]["loss"], "mcxent");

        let back: CompiledNetwork = serde_json::from_value(json).unwrap();
        assert_eq!(back, network());
    }
}
