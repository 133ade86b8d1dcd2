pub mod layer;
pub mod network;

pub use layer::{
    ActFnSpec, AdapterSpec, ConvolutionModeSpec, LayerSpec, LossFnSpec, PoolingSpec,
    RegularizationSpec,
};
pub use network::{CompiledNetwork, InputSpec, OptimizerSpec, StageSpec};
