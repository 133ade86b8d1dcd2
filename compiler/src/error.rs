use std::{error::Error, fmt, io};

/// The compiler module's result type.
pub type Result<T> = std::result::Result<T, CompileError>;

/// All errors that can abort a compilation run.
#[derive(Debug)]
pub enum CompileError {
    /// The document is structurally invalid or incomplete.
    MalformedSpec(String),
    /// A field holds a value of the wrong kind.
    InvalidFieldType {
        field: String,
        expected: &'static str,
    },
    /// The compiled layers could not be threaded into a pipeline.
    AssemblyError(String),
    /// The document is not valid JSON.
    Json(serde_json::Error),
    /// The document could not be read.
    Io(io::Error),
}

impl CompileError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSpec(msg.into())
    }

    pub(crate) fn invalid_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidFieldType {
            field: field.into(),
            expected,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedSpec(msg) => write!(f, "malformed spec: {msg}"),
            Self::InvalidFieldType { field, expected } => {
                write!(f, "invalid field type: {field} must be {expected}")
            }
            Self::AssemblyError(msg) => write!(f, "assembly error: {msg}"),
            Self::Json(e) => write!(f, "invalid JSON: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for CompileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CompileError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for CompileError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
