//! Case-insensitive lookups from document identifiers to their typed specs.
//!
//! Underscores and dashes are ignored, so `leaky_relu`, `LEAKYRELU` and
//! `leaky-relu` all resolve to the same activation.

use specs::{ActFnSpec, LossFnSpec, PoolingSpec};

fn normalize(ident: &str) -> String {
    ident
        .chars()
        .filter(|c| !matches!(c, '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn act_fn(ident: &str) -> Option<ActFnSpec> {
    let act_fn = match normalize(ident).as_str() {
        "cube" => ActFnSpec::Cube,
        "elu" => ActFnSpec::Elu,
        "gelu" => ActFnSpec::Gelu,
        "hardsigmoid" => ActFnSpec::HardSigmoid,
        "hardtanh" => ActFnSpec::HardTanh,
        "identity" => ActFnSpec::Identity,
        "leakyrelu" => ActFnSpec::LeakyRelu,
        "mish" => ActFnSpec::Mish,
        "rationaltanh" => ActFnSpec::RationalTanh,
        "rectifiedtanh" => ActFnSpec::RectifiedTanh,
        "relu" => ActFnSpec::Relu,
        "relu6" => ActFnSpec::Relu6,
        "rrelu" => ActFnSpec::RRelu,
        "selu" => ActFnSpec::Selu,
        "sigmoid" => ActFnSpec::Sigmoid,
        "softmax" => ActFnSpec::Softmax,
        "softplus" => ActFnSpec::Softplus,
        "softsign" => ActFnSpec::Softsign,
        "swish" => ActFnSpec::Swish,
        "tanh" => ActFnSpec::Tanh,
        "thresholdedrelu" => ActFnSpec::ThresholdedRelu,
        _ => return None,
    };

    Some(act_fn)
}

pub fn loss_fn(ident: &str) -> Option<LossFnSpec> {
    let loss_fn = match normalize(ident).as_str() {
        "cosineproximity" => LossFnSpec::CosineProximity,
        "hinge" => LossFnSpec::Hinge,
        "kldivergence" => LossFnSpec::KlDivergence,
        "l1" => LossFnSpec::L1,
        "l2" => LossFnSpec::L2,
        "mcxent" => LossFnSpec::Mcxent,
        "meanabsoluteerror" => LossFnSpec::MeanAbsoluteError,
        "meanabsolutepercentageerror" => LossFnSpec::MeanAbsolutePercentageError,
        "meansquaredlogarithmicerror" => LossFnSpec::MeanSquaredLogarithmicError,
        "mse" => LossFnSpec::Mse,
        "negativeloglikelihood" => LossFnSpec::NegativeLogLikelihood,
        "poisson" => LossFnSpec::Poisson,
        "reconstructioncrossentropy" => LossFnSpec::ReconstructionCrossentropy,
        "sparsemcxent" => LossFnSpec::SparseMcxent,
        "squaredhinge" => LossFnSpec::SquaredHinge,
        "squaredloss" => LossFnSpec::SquaredLoss,
        "wasserstein" => LossFnSpec::Wasserstein,
        "xent" => LossFnSpec::Xent,
        _ => return None,
    };

    Some(loss_fn)
}

pub fn pooling(ident: &str) -> Option<PoolingSpec> {
    let pooling = match normalize(ident).as_str() {
        "max" => PoolingSpec::Max,
        "avg" | "average" => PoolingSpec::Avg,
        "sum" => PoolingSpec::Sum,
        "pnorm" => PoolingSpec::Pnorm,
        _ => return None,
    };

    Some(pooling)
}
