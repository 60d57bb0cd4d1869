use crate::error::{MatcherError, Result};
use crate::tokenizer::Tokenizer;
use crate::vector::WeightedTermVector;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone)]
struct TermStats {
    term: String,
    doc_freq: usize,
    idf: f64,
}

/// Vocabulary and inverse-document-frequency weights fitted once over the
/// training phrases.
///
/// Weights use the smoothed form `ln((1 + n) / (1 + df)) + 1`, so a term that
/// occurs in every phrase still keeps a positive weight. Terms outside the
/// vocabulary weigh nothing.
#[derive(Debug, Clone)]
pub struct TermWeightModel {
    tokenizer: Tokenizer,
    ids: HashMap<String, usize>,
    terms: Vec<TermStats>,
    documents: usize,
}

impl TermWeightModel {
    pub fn fit<'a>(
        tokenizer: Tokenizer,
        phrases: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let mut ids: HashMap<String, usize> = HashMap::new();
        let mut terms: Vec<TermStats> = Vec::new();
        let mut documents = 0usize;

        for phrase in phrases {
            documents += 1;
            let unique: HashSet<String> = tokenizer.tokenize(phrase).into_iter().collect();
            // Sorted so ids do not depend on hash order.
            let mut unique: Vec<String> = unique.into_iter().collect();
            unique.sort();
            for term in unique {
                match ids.get(&term) {
                    Some(&id) => terms[id].doc_freq += 1,
                    None => {
                        ids.insert(term.clone(), terms.len());
                        terms.push(TermStats {
                            term,
                            doc_freq: 1,
                            idf: 0.0,
                        });
                    }
                }
            }
        }

        if terms.is_empty() {
            return Err(MatcherError::EmptyVocabulary);
        }

        let n = documents as f64;
        for stats in &mut terms {
            stats.idf = ((1.0 + n) / (1.0 + stats.doc_freq as f64)).ln() + 1.0;
        }

        Ok(Self {
            tokenizer,
            ids,
            terms,
            documents,
        })
    }

    #[must_use]
    pub const fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    #[must_use]
    pub fn term_id(&self, term: &str) -> Option<usize> {
        self.ids.get(term).copied()
    }

    #[must_use]
    pub fn term(&self, id: usize) -> Option<&str> {
        self.terms.get(id).map(|stats| stats.term.as_str())
    }

    /// Global weight of an already-normalized term; 0 when unseen.
    #[must_use]
    pub fn weight(&self, term: &str) -> f64 {
        self.term_id(term).map_or(0.0, |id| self.terms[id].idf)
    }

    #[must_use]
    pub fn doc_freq(&self, term: &str) -> usize {
        self.term_id(term).map_or(0, |id| self.terms[id].doc_freq)
    }

    #[must_use]
    pub fn vocabulary_len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub const fn document_count(&self) -> usize {
        self.documents
    }

    /// Weighted-term vector for raw text: `idf × count` for every known term.
    #[must_use]
    pub fn vectorize(&self, text: &str) -> WeightedTermVector {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for term in self.tokenizer.tokenize(text) {
            if let Some(id) = self.term_id(&term) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        WeightedTermVector::from_weights(
            counts
                .into_iter()
                .map(|(id, count)| (id, count as f64 * self.terms[id].idf)),
        )
    }
}
