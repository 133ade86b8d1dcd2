use std::{error::Error, fmt, io};

use compiler::CompileError;

/// The training node's result type.
pub type Result<T> = std::result::Result<T, NodeError>;

/// Failures of the collaborators surrounding the compiler.
#[derive(Debug)]
pub enum NodeError {
    Io(io::Error),
    Compile(CompileError),
    /// A stored training artifact isn't valid JSON.
    Json(serde_json::Error),
    /// The label table has an invalid line.
    Labels { line: usize, msg: String },
    /// A required setting is missing or unparsable.
    Config(String),
    /// The engine refused the records it was given.
    Engine(String),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Io(e) => write!(f, "io error: {e}"),
            NodeError::Compile(e) => write!(f, "compile error: {e}"),
            NodeError::Json(e) => write!(f, "invalid artifact: {e}"),
            NodeError::Labels { line, msg } => write!(f, "label table line {line}: {msg}"),
            NodeError::Config(msg) => write!(f, "invalid config: {msg}"),
            NodeError::Engine(msg) => write!(f, "engine error: {msg}"),
        }
    }
}

impl Error for NodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NodeError::Io(e) => Some(e),
            NodeError::Compile(e) => Some(e),
            NodeError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for NodeError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CompileError> for NodeError {
    fn from(value: CompileError) -> Self {
        Self::Compile(value)
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
