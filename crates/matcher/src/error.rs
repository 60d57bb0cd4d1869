use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatcherError>;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Corpus error: {0}")]
    CorpusError(#[from] intent_corpus::CorpusError),

    #[error("Training phrases produced no vocabulary terms")]
    EmptyVocabulary,

    #[error("Invalid threshold {0}: expected a finite value in [0, 1)")]
    InvalidThreshold(f64),
}
