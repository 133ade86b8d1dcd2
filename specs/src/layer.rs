use serde::{Deserialize, Serialize};

/// Describes a layer's activation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnSpec {
    Cube,
    Elu,
    Gelu,
    HardSigmoid,
    HardTanh,
    Identity,
    LeakyRelu,
    Mish,
    RationalTanh,
    RectifiedTanh,
    Relu,
    Relu6,
    RRelu,
    Selu,
    Sigmoid,
    Softmax,
    Softplus,
    Softsign,
    Swish,
    Tanh,
    ThresholdedRelu,
}

/// Describes the objective minimized by the output layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFnSpec {
    CosineProximity,
    Hinge,
    KlDivergence,
    L1,
    L2,
    Mcxent,
    MeanAbsoluteError,
    MeanAbsolutePercentageError,
    MeanSquaredLogarithmicError,
    Mse,
    NegativeLogLikelihood,
    Poisson,
    ReconstructionCrossentropy,
    SparseMcxent,
    SquaredHinge,
    SquaredLoss,
    Wasserstein,
    Xent,
}

/// The reduction applied by a pooling layer over its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolingSpec {
    Max,
    Avg,
    Sum,
    Pnorm,
}

/// How a convolution or pooling window treats the borders of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvolutionModeSpec {
    /// Explicit padding, partial windows are dropped.
    Truncate { padding: [usize; 2] },
    /// Padding is chosen so that `out = ceil(in / stride)`.
    Same,
}

/// Optional regularization hyperparameters, each one present only if declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RegularizationSpec {
    pub dropout: Option<f64>,
    pub l1: Option<f64>,
    pub l2: Option<f64>,
}

/// Describes a trainable (or subsampling) layer of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSpec {
    Convolutional {
        kernel: [usize; 2],
        channels: usize,
        stride: [usize; 2],
        mode: Option<ConvolutionModeSpec>,
        act_fn: Option<ActFnSpec>,
        regularization: RegularizationSpec,
    },
    Pooling {
        window: [usize; 2],
        stride: [usize; 2],
        pooling: PoolingSpec,
        mode: Option<ConvolutionModeSpec>,
        dropout: Option<f64>,
    },
    Dense {
        outputs: usize,
        act_fn: Option<ActFnSpec>,
        regularization: RegularizationSpec,
    },
    Output {
        outputs: usize,
        loss: LossFnSpec,
        act_fn: Option<ActFnSpec>,
        regularization: RegularizationSpec,
    },
}

impl LayerSpec {
    /// Whether this layer consumes a volumetric map rather than a flat vector.
    pub fn expects_map(&self) -> bool {
        matches!(self, Self::Convolutional { .. } | Self::Pooling { .. })
    }
}

/// A reshaping stage inserted between layers of different dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterSpec {
    /// Flattens a `height x width x channels` map into a vector.
    MapToVector,
    /// Reshapes a vector into a `width x height x depth` map.
    VectorToMap {
        width: usize,
        height: usize,
        depth: usize,
    },
}

impl AdapterSpec {
    pub fn expects_map(&self) -> bool {
        matches!(self, Self::MapToVector)
    }
}
