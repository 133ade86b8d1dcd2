pub mod assembler;
pub mod error;
pub mod fields;
mod idents;
pub mod ingest;
pub mod layers;
pub mod optimizer;
pub mod shape;

use std::{fs, path::Path};

use serde_json::Value;
use specs::CompiledNetwork;

use assembler::Assembler;
use ingest::LayerKind;
use layers::LayerCompiler;

pub use error::{CompileError, Result};

/// Compiles a parsed network document into a resolved pipeline.
///
/// # Errors
/// Returns a `CompileError` if the document is malformed. Nothing is returned
/// for partially valid documents.
pub fn compile(doc: &Value) -> Result<CompiledNetwork> {
    let (network, layers) = ingest::ingest(doc)?;
    let first = layers.first().map_or(LayerKind::Output, |layer| layer.kind);

    log::info!("compiling {} layer(s)", layers.len());
    let compiled = LayerCompiler::new(network.outputs).compile_all(&layers)?;
    let network = Assembler::new().assemble(&network, first, compiled)?;

    log::info!(
        "compiled pipeline with {} stage(s), optimizer {:?}",
        network.stages.len(),
        network.optimizer
    );
    Ok(network)
}

/// Parses `content` as JSON and compiles it.
///
/// # Errors
/// Returns `CompileError::Json` if `content` isn't valid JSON, otherwise see [`compile`].
pub fn compile_str(content: &str) -> Result<CompiledNetwork> {
    let doc: Value = serde_json::from_str(content)?;
    compile(&doc)
}

/// Reads the document at `path` and compiles it.
///
/// # Errors
/// Returns `CompileError::Io` if the file can't be read, otherwise see [`compile_str`].
pub fn compile_file<P: AsRef<Path>>(path: P) -> Result<CompiledNetwork> {
    let content = fs::read_to_string(path)?;
    compile_str(&content)
}
