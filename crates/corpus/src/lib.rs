//! # Intent Corpus
//!
//! Static training data for the intent matcher: a fixed, ordered list of
//! `(topic, phrase)` examples and the canned response for each topic.
//!
//! The shipped Spanish solar-energy corpus is compiled in; a corpus document
//! with the same JSON shape can be loaded instead.
//!
//! ```
//! use intent_corpus::CorpusIndex;
//!
//! let corpus = CorpusIndex::builtin().unwrap();
//! assert_eq!(corpus.topic_at(2), Some("Incentivos"));
//! assert_eq!(corpus.response_for(None), intent_corpus::FALLBACK_RESPONSE);
//! ```

mod corpus;
mod error;
mod types;

pub use corpus::{CorpusIndex, CORPUS_SCHEMA_VERSION, FALLBACK_RESPONSE};
pub use error::{CorpusError, Result};
pub use types::{TopicResponseTable, TrainingExample};
