// Error type for dataset helpers that read files.

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum DatasetError {
    Io(io::Error),
    Json(serde_json::Error),
    /// A score file whose contents do not fit the expected shape, or that
    /// disagrees with the others on stats or metrics.
    MalformedScores { path: PathBuf, reason: String },
    /// Nothing to aggregate.
    NoScores,
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::MalformedScores { path, reason } => {
                write!(f, "{}: {reason}", path.display())
            }
            Self::NoScores => write!(f, "no score files to aggregate"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DatasetError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
