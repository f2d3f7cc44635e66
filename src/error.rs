use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type LstmResult<T> = Result<T, LstmError>;

#[derive(Debug, Error)]
pub enum LstmError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parameter mismatch: {0}")]
    ParameterMismatch(String),

    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Shape mismatch for {what}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        what: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Malformed trajectory: {0}")]
    MalformedTrajectory(String),

    #[error("Unknown symbol {0:?}")]
    UnknownSymbol(char),

    #[error("Generation needs a non-empty seed")]
    EmptySeed,
}

impl LstmError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LstmError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn shape(what: impl Into<String>, expected: &[usize], got: &[usize]) -> Self {
        LstmError::ShapeMismatch {
            what: what.into(),
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }
}
