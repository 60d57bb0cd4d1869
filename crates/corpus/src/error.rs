use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorpusError>;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Corpus has no training examples")]
    EmptyCorpus,

    #[error("Invalid training example #{index}: {reason}")]
    InvalidExample { index: usize, reason: String },

    #[error("Duplicate response for topic '{0}'")]
    DuplicateTopic(String),

    #[error("Unsupported corpus schema_version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
