use log::warn;
use specs::OptimizerSpec;

/// Maps the document's `updater` to an optimizer, falling back to Adam.
///
/// Matching is case-insensitive. Absent or unknown names never fail.
pub fn resolve(updater: Option<&str>) -> OptimizerSpec {
    let Some(name) = updater else {
        return OptimizerSpec::default();
    };

    match name.to_lowercase().as_str() {
        "adam" => OptimizerSpec::Adam,
        "adagrad" => OptimizerSpec::AdaGrad,
        "adadelta" => OptimizerSpec::AdaDelta,
        "adamax" => OptimizerSpec::AdaMax,
        "nesterovs" => OptimizerSpec::Nesterovs,
        "rmsprop" => OptimizerSpec::RmsProp,
        "sgd" => OptimizerSpec::Sgd,
        _ => {
            warn!("unknown updater {name}, falling back to adam");
            OptimizerSpec::default()
        }
    }
}
