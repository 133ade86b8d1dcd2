use std::fmt;

use log::debug;
use serde_json::{Map, Value};
use specs::ActFnSpec;

use crate::{
    error::{CompileError, Result},
    fields::{Fields, Scope},
    idents, shape,
};

/// The closed set of layer kinds a document may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Convolutional,
    Pooling,
    Dense,
    Output,
}

impl LayerKind {
    fn parse(ident: &str) -> Option<Self> {
        let kind = match ident.to_lowercase().as_str() {
            "convolutional" => Self::Convolutional,
            "pooling" => Self::Pooling,
            "dense" => Self::Dense,
            "output" => Self::Output,
            _ => return None,
        };

        Some(kind)
    }

    /// Whether the layer works on volumetric maps instead of flat vectors.
    pub fn is_volumetric(&self) -> bool {
        matches!(self, Self::Convolutional | Self::Pooling)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Convolutional => "convolutional",
            Self::Pooling => "pooling",
            Self::Dense => "dense",
            Self::Output => "output",
        };

        write!(f, "{s}")
    }
}

/// The global parameters of a network document.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkDecl {
    pub activation: Option<ActFnSpec>,
    pub optimizer: Option<String>,
    pub data_shape: [usize; 4],
    pub outputs: usize,
    pub classification: bool,
}

/// A single user declared layer, still holding its raw fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDecl {
    pub index: usize,
    pub kind: LayerKind,
    pub fields: Map<String, Value>,
}

impl LayerDecl {
    pub fn fields(&self) -> Fields<'_> {
        Fields::new(Scope::Layer(self.index), &self.fields)
    }
}

/// Splits a network document into its global parameters and its layers sorted by index.
///
/// Layers are either the object-valued top level entries of the document or the
/// entries of a top level `layers` array.
///
/// # Errors
/// Returns `MalformedSpec` if a global parameter or a layer's `index`/`type` is
/// missing, if the indices aren't exactly `0..n`, or if the network doesn't end in
/// its single output layer. Returns `InvalidFieldType` if a global parameter has
/// the wrong kind.
pub fn ingest(doc: &Value) -> Result<(NetworkDecl, Vec<LayerDecl>)> {
    let root = doc
        .as_object()
        .ok_or_else(|| CompileError::malformed("document must be an object"))?;

    let network = parse_network(&Fields::new(Scope::Network, root))?;
    let layers = collect_layers(root)?;
    validate_layers(&layers)?;

    debug!(layers = layers.len(), outputs = network.outputs; "ingested network document");
    Ok((network, layers))
}

fn parse_network(fields: &Fields) -> Result<NetworkDecl> {
    let activation = match fields.opt_str("activation")? {
        Some(ident) => Some(idents::act_fn(ident).ok_or_else(|| {
            CompileError::malformed(format!("network: unknown activation {ident}"))
        })?),
        None => None,
    };

    if !fields.contains("dataShape") {
        return Err(fields.missing("dataShape"));
    }

    Ok(NetworkDecl {
        activation,
        optimizer: fields.opt_str("updater")?.map(str::to_string),
        data_shape: shape::read(fields, "dataShape", shape::DATA_SHAPE)?,
        outputs: fields.positive("outputs")?,
        classification: fields.bool("isNotRegression")?,
    })
}

fn collect_layers(root: &Map<String, Value>) -> Result<Vec<LayerDecl>> {
    let nested = root.values().filter_map(Value::as_object);

    let listed = match root.get("layers") {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| {
                entry.as_object().ok_or_else(|| {
                    CompileError::malformed("every entry of layers must be an object")
                })
            })
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };

    let mut layers = nested
        .chain(listed)
        .enumerate()
        .map(|(i, map)| parse_layer(i, map))
        .collect::<Result<Vec<_>>>()?;

    layers.sort_by_key(|layer| layer.index);
    Ok(layers)
}

fn parse_layer(position: usize, map: &Map<String, Value>) -> Result<LayerDecl> {
    let index = map
        .get("index")
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| {
            CompileError::malformed(format!("layer entry #{position} has no integer index"))
        })?;

    let ident = map.get("type").and_then(Value::as_str).ok_or_else(|| {
        CompileError::malformed(format!("layer {index}: missing field type"))
    })?;

    let kind = LayerKind::parse(ident).ok_or_else(|| {
        CompileError::malformed(format!("layer {index}: unknown layer type {ident}"))
    })?;

    Ok(LayerDecl {
        index,
        kind,
        fields: map.clone(),
    })
}

/// Checks the sorted layers form `0..n` and end in their only output layer.
fn validate_layers(layers: &[LayerDecl]) -> Result<()> {
    for (expected, layer) in layers.iter().enumerate() {
        if layer.index != expected {
            let msg = if layer.index < expected {
                format!("layer index {} is declared more than once", layer.index)
            } else {
                format!("layer indices must be contiguous, index {expected} is missing")
            };

            return Err(CompileError::MalformedSpec(msg));
        }
    }

    let outputs: Vec<_> = layers
        .iter()
        .filter(|layer| layer.kind == LayerKind::Output)
        .map(|layer| layer.index)
        .collect();

    match outputs[..] {
        [] => Err(CompileError::malformed("network has no output layer")),
        [index] if index + 1 == layers.len() => Ok(()),
        [index] => Err(CompileError::malformed(format!(
            "output layer must be the last layer, found it at index {index} of {}",
            layers.len()
        ))),
        _ => Err(CompileError::malformed(format!(
            "network must have exactly one output layer, found {}",
            outputs.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(layers: Value) -> Value {
        let mut doc = json!({
            "activation": "relu",
            "updater": "sgd",
            "dataShape": [28, 28, 1],
            "outputs": 10,
            "isNotRegression": true,
        });
        doc["layers"] = layers;
        doc
    }

    fn assert_malformed(doc: &Value, needle: &str) {
        match ingest(doc) {
            Err(CompileError::MalformedSpec(msg)) => {
                assert!(msg.contains(needle), "{msg:?} does not contain {needle:?}")
            }
            other => panic!("expected MalformedSpec, got {other:?}"),
        }
    }

    #[test]
    fn parses_globals() {
        let doc = doc(json!([{ "index": 0, "type": "output", "lossFunction": "mse" }]));
        let (network, layers) = ingest(&doc).unwrap();

        assert_eq!(
            network,
            NetworkDecl {
                activation: Some(ActFnSpec::Relu),
                optimizer: Some("sgd".into()),
                data_shape: [28, 28, 1, 1],
                outputs: 10,
                classification: true,
            }
        );
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].kind, LayerKind::Output);
    }

    #[test]
    fn nested_objects_are_layers_sorted_by_index() {
        let doc = json!({
            "dataShape": [4],
            "outputs": 2,
            "isNotRegression": false,
            "second": { "index": 1, "type": "Output", "lossFunction": "mse" },
            "first": { "index": 0, "type": "DENSE", "outputs": 3 },
        });
        let (network, layers) = ingest(&doc).unwrap();

        assert_eq!(network.activation, None);
        assert_eq!(network.optimizer, None);
        assert_eq!(network.data_shape, [4, 4, 1, 1]);
        assert!(!network.classification);
        let kinds: Vec<_> = layers.iter().map(|l| (l.index, l.kind)).collect();
        assert_eq!(kinds, [(0, LayerKind::Dense), (1, LayerKind::Output)]);
    }

    #[test]
    fn rejects_gaps_and_duplicates() {
        let gap = doc(json!([
            { "index": 0, "type": "dense", "outputs": 3 },
            { "index": 2, "type": "output", "lossFunction": "mse" },
        ]));
        assert_malformed(&gap, "index 1 is missing");

        let dup = doc(json!([
            { "index": 0, "type": "dense", "outputs": 3 },
            { "index": 0, "type": "dense", "outputs": 3 },
            { "index": 1, "type": "output", "lossFunction": "mse" },
        ]));
        assert_malformed(&dup, "more than once");
    }

    #[test]
    fn rejects_layers_without_index_or_type() {
        assert_malformed(&doc(json!([{ "type": "dense" }])), "no integer index");
        assert_malformed(&doc(json!([{ "index": -1, "type": "dense" }])), "no integer index");
        assert_malformed(&doc(json!([{ "index": 1e20, "type": "dense" }])), "no integer index");
        assert_malformed(&doc(json!([{ "index": 0 }])), "missing field type");
        assert_malformed(
            &doc(json!([{ "index": 0, "type": "recurrent" }])),
            "unknown layer type recurrent",
        );
    }

    #[test]
    fn output_layer_must_be_unique_and_last() {
        assert_malformed(&doc(json!([])), "no output layer");
        assert_malformed(
            &doc(json!([{ "index": 0, "type": "dense", "outputs": 3 }])),
            "no output layer",
        );

        let misplaced = doc(json!([
            { "index": 0, "type": "output", "lossFunction": "mse" },
            { "index": 1, "type": "dense", "outputs": 3 },
        ]));
        assert_malformed(&misplaced, "must be the last layer");

        let twice = doc(json!([
            { "index": 0, "type": "output", "lossFunction": "mse" },
            { "index": 1, "type": "output", "lossFunction": "mse" },
        ]));
        assert_malformed(&twice, "exactly one output layer");
    }

    #[test]
    fn required_globals() {
        let layers = json!([{ "index": 0, "type": "output", "lossFunction": "mse" }]);

        for key in ["dataShape", "outputs", "isNotRegression"] {
            let mut d = doc(layers.clone());
            d.as_object_mut().unwrap().remove(key);
            assert_malformed(&d, key);
        }

        let mut d = doc(layers.clone());
        d["outputs"] = json!(0);
        assert_malformed(&d, "outputs must be greater than zero");

        let mut d = doc(layers);
        d["isNotRegression"] = json!("yes");
        assert!(matches!(
            ingest(&d),
            Err(CompileError::InvalidFieldType { .. })
        ));
    }

    #[test]
    fn rejects_unknown_activation() {
        let mut d = doc(json!([{ "index": 0, "type": "output", "lossFunction": "mse" }]));
        d["activation"] = json!("sparkle");
        assert_malformed(&d, "unknown activation sparkle");
    }

    #[test]
    fn rejects_non_object_document() {
        assert_malformed(&json!([1, 2, 3]), "must be an object");
    }
}
