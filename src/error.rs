use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A value that is not text was handed to the counter.
    #[error("invalid argument: expected text, got {0}")]
    InvalidArgument(&'static str),

    #[error("count for {word:?} does not fit in a u32")]
    CountOverflow { word: String },

    #[error("JSON pointer {0:?} does not resolve to a value")]
    MissingField(String),

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("response from {url} exceeds {max_bytes} bytes")]
    TooLarge { url: String, max_bytes: u64 },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
