use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to open file: {}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file: {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type SummarizeResult<T> = Result<T, SummarizeError>;
