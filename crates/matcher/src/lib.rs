//! # Intent Matcher
//!
//! Lexical nearest-neighbour classification of free-text questions against a
//! fixed [`CorpusIndex`](intent_corpus::CorpusIndex).
//!
//! ```text
//! training phrases ──> Tokenizer ──> TermWeightModel (IDF) ──> phrase vectors (cached)
//!                                                                    │
//! question ──> Tokenizer ──> query vector ──> cosine vs. every phrase ┘
//!                                                  │
//!                              first maximum > threshold ? topic : no match
//! ```
//!
//! ```
//! use intent_corpus::CorpusIndex;
//! use intent_matcher::SimilarityMatcher;
//! use std::sync::Arc;
//!
//! let corpus = Arc::new(CorpusIndex::builtin().unwrap());
//! let matcher = SimilarityMatcher::build(corpus).unwrap();
//!
//! let topic = matcher.classify("¿Qué incentivos hay para paneles solares?");
//! assert_eq!(topic, Some("Incentivos"));
//! assert_eq!(matcher.classify("¿cuál es la capital de Francia?"), None);
//! ```

mod error;
mod matcher;
mod tokenizer;
mod vector;
mod weights;

pub use error::{MatcherError, Result};
pub use matcher::{
    MatcherConfig, PhraseScore, RankedPhrase, SimilarityMatcher, DEFAULT_THRESHOLD,
};
pub use tokenizer::Tokenizer;
pub use vector::WeightedTermVector;
pub use weights::TermWeightModel;
