use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum BiomapperError {
    /// Raised before matching begins when a caller supplies an empty source
    /// collection or an empty reverse index. The only error the core raises;
    /// all per-record problems degrade to unmatched/invalid statuses instead.
    EmptyInput(String),
    String(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Serde(serde_json::Error),
}

impl Error for BiomapperError {}

impl fmt::Display for BiomapperError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BiomapperError::EmptyInput(what) => write!(f, "empty input: {what}"),
            BiomapperError::String(s) => write!(f, "{s}"),
            BiomapperError::Io(e) => write!(f, "{e}"),
            BiomapperError::Csv(e) => write!(f, "{e}"),
            BiomapperError::Serde(e) => write!(f, "{e}"),
        }
    }
}

impl From<String> for BiomapperError {
    fn from(err: String) -> Self {
        BiomapperError::String(err)
    }
}

impl From<std::io::Error> for BiomapperError {
    fn from(err: std::io::Error) -> Self {
        BiomapperError::Io(err)
    }
}

impl From<csv::Error> for BiomapperError {
    fn from(err: csv::Error) -> Self {
        BiomapperError::Csv(err)
    }
}

impl From<serde_json::Error> for BiomapperError {
    fn from(err: serde_json::Error) -> Self {
        BiomapperError::Serde(err)
    }
}
