use log::{debug, warn};
use specs::{ActFnSpec, AdapterSpec, ConvolutionModeSpec, LayerSpec, RegularizationSpec};

use crate::{
    error::{CompileError, Result},
    fields::Fields,
    idents,
    ingest::{LayerDecl, LayerKind},
    shape,
};

/// An adapter the compiler decided to insert right before the layer at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adapter {
    pub target: usize,
    pub spec: AdapterSpec,
}

/// The outcome of compiling a single layer declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    Hidden {
        layer: LayerSpec,
        adapter: Option<Adapter>,
    },
    /// The terminal layer, handed to the assembler instead of being sequenced.
    Output(LayerSpec),
}

/// Every layer of a network, compiled and split by role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledLayers {
    pub hidden: Vec<(usize, LayerSpec)>,
    pub adapters: Vec<Adapter>,
    pub output: Option<(usize, LayerSpec)>,
}

/// Turns layer declarations into typed layer specs.
pub struct LayerCompiler {
    outputs: usize,
}

impl LayerCompiler {
    /// Creates a new `LayerCompiler`.
    ///
    /// # Arguments
    /// * `outputs` - The width of the network's output layer.
    pub fn new(outputs: usize) -> Self {
        Self { outputs }
    }

    /// Compiles every layer in order, pairing each one with the layer after it.
    ///
    /// # Errors
    /// Returns `MalformedSpec` if any layer is invalid or more than one output
    /// layer is declared.
    pub fn compile_all(&self, layers: &[LayerDecl]) -> Result<CompiledLayers> {
        let mut compiled = CompiledLayers::default();

        for (i, decl) in layers.iter().enumerate() {
            match self.compile(decl, layers.get(i + 1))? {
                Compiled::Hidden { layer, adapter } => {
                    compiled.hidden.push((decl.index, layer));
                    compiled.adapters.extend(adapter);
                }
                Compiled::Output(layer) => {
                    if let Some((prev, _)) = compiled.output {
                        return Err(CompileError::malformed(format!(
                            "layer {}: output layer already declared at index {prev}",
                            decl.index
                        )));
                    }
                    compiled.output = Some((decl.index, layer));
                }
            }
        }

        Ok(compiled)
    }

    /// Compiles a single layer.
    ///
    /// # Arguments
    /// * `decl` - The layer to compile.
    /// * `next` - The layer that follows it, if any.
    ///
    /// # Returns
    /// The typed layer and, for hidden layers, the adapter needed between it and `next`.
    ///
    /// # Errors
    /// Returns `MalformedSpec` naming the layer index if a required field is missing
    /// or holds an unknown identifier, and `InvalidFieldType` if a field has the
    /// wrong kind.
    pub fn compile(&self, decl: &LayerDecl, next: Option<&LayerDecl>) -> Result<Compiled> {
        let fields = decl.fields();

        let compiled = match decl.kind {
            LayerKind::Convolutional => Compiled::Hidden {
                layer: self.convolutional(&fields)?,
                adapter: next
                    .filter(|next| !next.kind.is_volumetric())
                    .map(|next| Adapter {
                        target: next.index,
                        spec: AdapterSpec::MapToVector,
                    }),
            },
            LayerKind::Pooling => Compiled::Hidden {
                layer: self.pooling(&fields)?,
                adapter: next
                    .filter(|next| !next.kind.is_volumetric())
                    .map(|next| Adapter {
                        target: next.index,
                        spec: AdapterSpec::MapToVector,
                    }),
            },
            LayerKind::Dense => {
                let layer = self.dense(&fields)?;
                let adapter = match (&layer, next) {
                    (LayerSpec::Dense { outputs, .. }, Some(next)) if next.kind.is_volumetric() => {
                        Some(Adapter {
                            target: next.index,
                            spec: vector_to_map(*outputs, &fields)?,
                        })
                    }
                    _ => None,
                };

                Compiled::Hidden { layer, adapter }
            }
            LayerKind::Output => Compiled::Output(self.output(&fields)?),
        };

        debug!(index = decl.index; "compiled {} layer", decl.kind);
        Ok(compiled)
    }

    fn convolutional(&self, fields: &Fields) -> Result<LayerSpec> {
        Ok(LayerSpec::Convolutional {
            kernel: shape::read(fields, "filterShape", shape::WINDOW)?,
            channels: fields.positive("filterChannels")?,
            stride: shape::read(fields, "stride", shape::WINDOW)?,
            mode: convolution_mode(fields)?,
            act_fn: act_fn(fields)?,
            regularization: regularization(fields)?,
        })
    }

    fn pooling(&self, fields: &Fields) -> Result<LayerSpec> {
        let ident = fields.str("poolingType")?;
        let pooling = idents::pooling(ident).ok_or_else(|| {
            CompileError::malformed(format!("{}: unknown pooling type {ident}", fields.scope()))
        })?;

        Ok(LayerSpec::Pooling {
            window: shape::read(fields, "poolingShape", shape::WINDOW)?,
            stride: shape::read(fields, "stride", shape::WINDOW)?,
            pooling,
            mode: convolution_mode(fields)?,
            dropout: fields.opt_f64("dropoutRate")?,
        })
    }

    fn dense(&self, fields: &Fields) -> Result<LayerSpec> {
        Ok(LayerSpec::Dense {
            outputs: fields.positive("outputs")?,
            act_fn: act_fn(fields)?,
            regularization: regularization(fields)?,
        })
    }

    fn output(&self, fields: &Fields) -> Result<LayerSpec> {
        let ident = fields.str("lossFunction")?;
        let loss = idents::loss_fn(ident).ok_or_else(|| {
            CompileError::malformed(format!("{}: unknown loss function {ident}", fields.scope()))
        })?;

        Ok(LayerSpec::Output {
            outputs: self.outputs,
            loss,
            act_fn: act_fn(fields)?,
            regularization: regularization(fields)?,
        })
    }
}

/// Factors `n` into the most square `(width, height)` pair with `width <= height`.
///
/// Returns `None` when `n` is zero.
pub fn factor(n: usize) -> Option<(usize, usize)> {
    if n == 0 {
        return None;
    }

    let mut width = n.isqrt();
    while n % width != 0 {
        width -= 1;
    }

    Some((width, n / width))
}

fn vector_to_map(outputs: usize, fields: &Fields) -> Result<AdapterSpec> {
    let (width, height) = factor(outputs).ok_or_else(|| {
        CompileError::malformed(format!(
            "{}: cannot reshape {outputs} outputs into a map",
            fields.scope()
        ))
    })?;

    Ok(AdapterSpec::VectorToMap {
        width,
        height,
        depth: 1,
    })
}

/// Resolves `convolutionMode`. Unknown modes are ignored instead of rejected.
fn convolution_mode(fields: &Fields) -> Result<Option<ConvolutionModeSpec>> {
    let mode = fields.str("convolutionMode")?;

    if mode.eq_ignore_ascii_case("truncated") {
        let padding = shape::read(fields, "paddingShape", shape::WINDOW)?;
        Ok(Some(ConvolutionModeSpec::Truncate { padding }))
    } else if mode.eq_ignore_ascii_case("same") {
        Ok(Some(ConvolutionModeSpec::Same))
    } else {
        warn!("{}: ignoring unknown convolution mode {mode}", fields.scope());
        Ok(None)
    }
}

fn act_fn(fields: &Fields) -> Result<Option<ActFnSpec>> {
    let Some(ident) = fields.opt_str("activation")? else {
        return Ok(None);
    };

    idents::act_fn(ident).map(Some).ok_or_else(|| {
        CompileError::malformed(format!("{}: unknown activation {ident}", fields.scope()))
    })
}

fn regularization(fields: &Fields) -> Result<RegularizationSpec> {
    Ok(RegularizationSpec {
        dropout: fields.opt_f64("dropoutRate")?,
        l1: fields.opt_f64("regularisationRateL1")?,
        l2: fields.opt_f64("regularisationRateL2")?,
    })
}
