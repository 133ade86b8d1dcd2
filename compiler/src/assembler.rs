use std::collections::{BTreeMap, btree_map::Entry};

use log::debug;
use specs::{AdapterSpec, CompiledNetwork, InputSpec, LayerSpec, StageSpec};

use crate::{
    error::{CompileError, Result},
    ingest::{LayerKind, NetworkDecl},
    layers::{Adapter, CompiledLayers},
    optimizer,
};

/// Threads compiled layers and their adapters into the final pipeline.
pub struct Assembler;

impl Assembler {
    pub fn new() -> Self {
        Self
    }

    /// Builds the compiled network.
    ///
    /// # Arguments
    /// * `network` - The document's global parameters.
    /// * `first` - The kind of the network's first layer.
    /// * `layers` - The compiled layers, hidden ones sorted by index.
    ///
    /// # Errors
    /// Returns `AssemblyError` if there's no output layer, if two adapters target
    /// the same layer, if an adapter targets a layer that doesn't exist or if the
    /// first hidden stage can't read the network's input.
    pub fn assemble(
        &self,
        network: &NetworkDecl,
        first: LayerKind,
        layers: CompiledLayers,
    ) -> Result<CompiledNetwork> {
        let CompiledLayers {
            hidden,
            adapters,
            output,
        } = layers;

        let (output_index, output) = output
            .ok_or_else(|| CompileError::AssemblyError("no output layer was compiled".into()))?;

        let mut pending = self.index_adapters(adapters)?;
        let mut stages = Vec::with_capacity(hidden.len() + pending.len() + 1);

        for (index, layer) in hidden.into_iter().chain([(output_index, output)]) {
            if let Some(adapter) = pending.remove(&index) {
                stages.push(StageSpec::Adapter(adapter));
            }
            stages.push(StageSpec::Layer(layer));
        }

        if let Some(target) = pending.keys().next() {
            return Err(CompileError::AssemblyError(format!(
                "adapter targets index {target} which has no layer"
            )));
        }

        let input = self.input(network, first);
        self.check_input(&input, &stages)?;

        debug!(stages = stages.len(); "assembled pipeline");
        Ok(CompiledNetwork {
            activation: network.activation,
            optimizer: optimizer::resolve(network.optimizer.as_deref()),
            input,
            classification: network.classification,
            stages,
        })
    }

    /// A dense first layer reads flat vectors, anything else reads volumetric maps.
    fn input(&self, network: &NetworkDecl, first: LayerKind) -> InputSpec {
        let [height, width, channels, _] = network.data_shape;

        match first {
            LayerKind::Dense => InputSpec::FeedForward { size: height },
            LayerKind::Convolutional | LayerKind::Pooling | LayerKind::Output => {
                InputSpec::Convolutional {
                    height,
                    width,
                    channels,
                }
            }
        }
    }

    /// The first stage must read the representation `input` provides. A lone
    /// output layer is exempt, it reads whatever it is given.
    fn check_input(&self, input: &InputSpec, stages: &[StageSpec]) -> Result<()> {
        let reads_map = matches!(input, InputSpec::Convolutional { .. });

        match stages.first() {
            None | Some(StageSpec::Layer(LayerSpec::Output { .. })) => Ok(()),
            Some(stage) if stage.expects_map() == reads_map => Ok(()),
            Some(_) => Err(CompileError::AssemblyError(format!(
                "first stage does not accept a {} input",
                if reads_map { "volumetric" } else { "flat" }
            ))),
        }
    }

    fn index_adapters(
        &self,
        adapters: Vec<Adapter>,
    ) -> Result<BTreeMap<usize, AdapterSpec>> {
        let mut indexed = BTreeMap::new();

        for adapter in adapters {
            match indexed.entry(adapter.target) {
                Entry::Vacant(entry) => {
                    entry.insert(adapter.spec);
                }
                Entry::Occupied(_) => {
                    return Err(CompileError::AssemblyError(format!(
                        "more than one adapter targets index {}",
                        adapter.target
                    )));
                }
            }
        }

        Ok(indexed)
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use specs::{ActFnSpec, LayerSpec, LossFnSpec, OptimizerSpec, RegularizationSpec};

    use super::*;

    fn network(optimizer: Option<&str>) -> NetworkDecl {
        NetworkDecl {
            activation: Some(ActFnSpec::Tanh),
            optimizer: optimizer.map(str::to_string),
            data_shape: [28, 32, 3, 1],
            outputs: 10,
            classification: false,
        }
    }

    fn dense(outputs: usize) -> LayerSpec {
        LayerSpec::Dense {
            outputs,
            act_fn: None,
            regularization: RegularizationSpec::default(),
        }
    }

    fn output() -> LayerSpec {
        LayerSpec::Output {
            outputs: 10,
            loss: LossFnSpec::Mse,
            act_fn: None,
            regularization: RegularizationSpec::default(),
        }
    }

    #[test]
    fn input_follows_first_layer() {
        let assembler = Assembler::new();
        let net = network(None);

        assert_eq!(
            assembler.input(&net, LayerKind::Dense),
            InputSpec::FeedForward { size: 28 }
        );
        assert_eq!(
            assembler.input(&net, LayerKind::Pooling),
            InputSpec::Convolutional {
                height: 28,
                width: 32,
                channels: 3
            }
        );
    }

    #[test]
    fn adapters_go_right_before_their_target() {
        let layers = CompiledLayers {
            hidden: vec![(0, dense(12)), (1, dense(4))],
            adapters: vec![Adapter {
                target: 2,
                spec: AdapterSpec::MapToVector,
            }],
            output: Some((2, output())),
        };

        let compiled = Assembler::new()
            .assemble(&network(Some("nesterovs")), LayerKind::Dense, layers)
            .unwrap();

        assert_eq!(
            compiled.stages,
            [
                StageSpec::Layer(dense(12)),
                StageSpec::Layer(dense(4)),
                StageSpec::Adapter(AdapterSpec::MapToVector),
                StageSpec::Layer(output()),
            ]
        );
        assert_eq!(compiled.optimizer, OptimizerSpec::Nesterovs);
        assert_eq!(compiled.activation, Some(ActFnSpec::Tanh));
        assert!(!compiled.classification);
    }

    #[test]
    fn missing_output_is_an_assembly_error() {
        let layers = CompiledLayers {
            hidden: vec![(0, dense(4))],
            ..Default::default()
        };

        assert!(matches!(
            Assembler::new().assemble(&network(None), LayerKind::Dense, layers),
            Err(CompileError::AssemblyError(_))
        ));
    }

    #[test]
    fn colliding_adapters_are_an_assembly_error() {
        let layers = CompiledLayers {
            hidden: vec![(0, dense(4))],
            adapters: vec![
                Adapter {
                    target: 1,
                    spec: AdapterSpec::MapToVector,
                },
                Adapter {
                    target: 1,
                    spec: AdapterSpec::MapToVector,
                },
            ],
            output: Some((1, output())),
        };

        assert!(matches!(
            Assembler::new().assemble(&network(None), LayerKind::Dense, layers),
            Err(CompileError::AssemblyError(msg)) if msg.contains("index 1")
        ));
    }

    #[test]
    fn first_stage_must_read_the_input() {
        let layers = || CompiledLayers {
            hidden: vec![(0, dense(4))],
            output: Some((1, output())),
            ..Default::default()
        };

        assert!(matches!(
            Assembler::new().assemble(&network(None), LayerKind::Convolutional, layers()),
            Err(CompileError::AssemblyError(msg)) if msg.contains("volumetric")
        ));
        assert!(Assembler::new()
            .assemble(&network(None), LayerKind::Dense, layers())
            .is_ok());

        let lone_output = CompiledLayers {
            output: Some((0, output())),
            ..Default::default()
        };
        let compiled = Assembler::new()
            .assemble(&network(None), LayerKind::Output, lone_output)
            .unwrap();
        assert!(matches!(compiled.input, InputSpec::Convolutional { .. }));
    }

    #[test]
    fn dangling_adapter_is_an_assembly_error() {
        let layers = CompiledLayers {
            hidden: vec![(0, dense(4))],
            adapters: vec![Adapter {
                target: 7,
                spec: AdapterSpec::MapToVector,
            }],
            output: Some((1, output())),
        };

        assert!(matches!(
            Assembler::new().assemble(&network(None), LayerKind::Dense, layers),
            Err(CompileError::AssemblyError(msg)) if msg.contains("index 7")
        ));
    }
}
