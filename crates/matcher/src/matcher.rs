use crate::error::{MatcherError, Result};
use crate::tokenizer::Tokenizer;
use crate::vector::WeightedTermVector;
use crate::weights::TermWeightModel;
use intent_corpus::CorpusIndex;
use std::sync::Arc;

/// Score a best match must strictly exceed to be accepted.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    pub threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MatcherConfig {
    fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || !(0.0..1.0).contains(&self.threshold) {
            return Err(MatcherError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

/// Similarity of a question against one training phrase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhraseScore {
    /// Position of the phrase in corpus order.
    pub index: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedPhrase<'a> {
    pub index: usize,
    pub topic: &'a str,
    pub phrase: &'a str,
    pub score: f64,
}

/// Classifies questions into corpus topics by cosine similarity of
/// IDF-weighted term vectors.
///
/// Built once over an immutable corpus. Every query method takes `&self`
/// and only allocates per-call state, so a single matcher can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    corpus: Arc<CorpusIndex>,
    model: TermWeightModel,
    phrase_vectors: Vec<WeightedTermVector>,
    config: MatcherConfig,
}

impl SimilarityMatcher {
    pub fn build(corpus: Arc<CorpusIndex>) -> Result<Self> {
        Self::with_config(corpus, MatcherConfig::default())
    }

    pub fn with_config(corpus: Arc<CorpusIndex>, config: MatcherConfig) -> Result<Self> {
        config.validate()?;

        let phrases = corpus.all_phrases();
        let model = TermWeightModel::fit(Tokenizer::new(), phrases.iter().copied())?;
        let phrase_vectors: Vec<WeightedTermVector> =
            phrases.iter().map(|phrase| model.vectorize(phrase)).collect();

        for (index, vector) in phrase_vectors.iter().enumerate() {
            if vector.is_zero() {
                log::warn!(
                    "Training phrase #{index} has no terms and can never be matched: {:?}",
                    phrases[index]
                );
            }
        }

        log::info!(
            "Built term weight model: {} phrases, {} terms, threshold {}",
            model.document_count(),
            model.vocabulary_len(),
            config.threshold
        );

        Ok(Self {
            corpus,
            model,
            phrase_vectors,
            config,
        })
    }

    #[must_use]
    pub fn corpus(&self) -> &CorpusIndex {
        &self.corpus
    }

    #[must_use]
    pub const fn model(&self) -> &TermWeightModel {
        &self.model
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Normalized terms of `question` that the model knows about.
    #[must_use]
    pub fn known_terms(&self, question: &str) -> Vec<String> {
        self.model
            .tokenizer()
            .tokenize(question)
            .into_iter()
            .filter(|term| self.model.term_id(term).is_some())
            .collect()
    }

    /// Cosine similarity of `question` against every phrase, in corpus order.
    #[must_use]
    pub fn scores(&self, question: &str) -> Vec<f64> {
        let query = self.model.vectorize(question);
        self.phrase_vectors
            .iter()
            .map(|phrase| query.cosine(phrase))
            .collect()
    }

    /// Highest-scoring phrase; the earliest one wins a tie.
    #[must_use]
    pub fn best_match(&self, question: &str) -> PhraseScore {
        let mut best = PhraseScore {
            index: 0,
            score: 0.0,
        };
        for (index, score) in self.scores(question).into_iter().enumerate() {
            if score > best.score {
                best = PhraseScore { index, score };
            }
        }
        best
    }

    /// Topic of the best phrase when its score is strictly above the threshold.
    #[must_use]
    pub fn classify(&self, question: &str) -> Option<&str> {
        let best = self.best_match(question);
        let accepted = best.score > self.config.threshold;
        log::debug!(
            "classify: best=#{} score={:.4} threshold={} accepted={}",
            best.index,
            best.score,
            self.config.threshold,
            accepted
        );
        if accepted {
            self.corpus.topic_at(best.index)
        } else {
            None
        }
    }

    /// Canned response for `question`, or the corpus fallback text.
    #[must_use]
    pub fn answer(&self, question: &str) -> &str {
        self.corpus.response_for(self.classify(question))
    }

    /// All phrases ordered by descending score, ties kept in corpus order.
    #[must_use]
    pub fn rank(&self, question: &str, limit: usize) -> Vec<RankedPhrase<'_>> {
        let mut ranked: Vec<RankedPhrase<'_>> = self
            .scores(question)
            .into_iter()
            .zip(self.corpus.examples())
            .enumerate()
            .map(|(index, (score, example))| RankedPhrase {
                index,
                topic: example.topic.as_str(),
                phrase: example.phrase.as_str(),
                score,
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_corpus::{TopicResponseTable, TrainingExample};
    use pretty_assertions::assert_eq;

    fn corpus(examples: &[(&str, &str)]) -> Arc<CorpusIndex> {
        let examples = examples
            .iter()
            .map(|(topic, phrase)| TrainingExample::new(*topic, *phrase))
            .collect();
        let responses =
            TopicResponseTable::from_pairs([("t1", "first answer"), ("t2", "second answer")])
                .unwrap();
        Arc::new(CorpusIndex::new(examples, responses).unwrap())
    }

    fn matcher_with_threshold(examples: &[(&str, &str)], threshold: f64) -> SimilarityMatcher {
        SimilarityMatcher::with_config(corpus(examples), MatcherConfig { threshold }).unwrap()
    }

    #[test]
    fn score_exactly_at_threshold_is_no_match() {
        let m = matcher_with_threshold(&[("t1", "aa bb"), ("t2", "cc dd")], 0.5);
        assert_eq!(m.scores("aa cc"), vec![0.5, 0.5]);
        assert_eq!(m.classify("aa cc"), None);
        assert_eq!(m.answer("aa cc"), intent_corpus::FALLBACK_RESPONSE);
    }

    #[test]
    fn ties_go_to_the_first_phrase_in_corpus_order() {
        let m = matcher_with_threshold(&[("t1", "aa bb"), ("t2", "cc dd")], 0.4);
        assert_eq!(m.best_match("aa cc"), PhraseScore { index: 0, score: 0.5 });
        assert_eq!(m.classify("aa cc"), Some("t1"));

        let swapped = matcher_with_threshold(&[("t2", "cc dd"), ("t1", "aa bb")], 0.4);
        assert_eq!(swapped.classify("aa cc"), Some("t2"));
    }

    #[test]
    fn threshold_is_strict_for_any_observed_score() {
        let m = SimilarityMatcher::build(corpus(&[("t1", "aa bb cc"), ("t2", "dd ee")])).unwrap();
        let score = m.best_match("aa bb").score;
        assert!(score > 0.5 && score < 1.0);
        assert_eq!(m.classify("aa bb"), Some("t1"));

        let at_boundary = matcher_with_threshold(&[("t1", "aa bb cc"), ("t2", "dd ee")], score);
        assert_eq!(at_boundary.classify("aa bb"), None);
    }

    #[test]
    fn unseen_and_empty_questions_score_zero() {
        let m = SimilarityMatcher::build(corpus(&[("t1", "aa bb"), ("t2", "cc dd")])).unwrap();
        for question in ["", "   ", "zzxq999 qqzxx", "¿?"] {
            assert_eq!(m.scores(question), vec![0.0, 0.0]);
            assert_eq!(m.best_match(question), PhraseScore { index: 0, score: 0.0 });
            assert_eq!(m.classify(question), None);
        }
    }

    #[test]
    fn answer_uses_response_table() {
        let m = SimilarityMatcher::build(corpus(&[("t1", "aa bb"), ("t2", "cc dd")])).unwrap();
        assert_eq!(m.answer("CC dd"), "second answer");
    }

    #[test]
    fn rank_orders_by_score_and_keeps_ties_stable() {
        let m = matcher_with_threshold(&[("t1", "aa bb"), ("t2", "cc dd"), ("t1", "aa cc")], 0.5);
        let ranked = m.rank("aa cc", 10);
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![2, 0, 1]);
        assert_eq!(ranked[0].phrase, "aa cc");
        assert!(ranked[1].score == ranked[2].score);

        assert_eq!(m.rank("aa cc", 1).len(), 1);
    }

    #[test]
    fn known_terms_skip_unseen_vocabulary() {
        let m = SimilarityMatcher::build(corpus(&[("t1", "aa bb"), ("t2", "cc dd")])).unwrap();
        assert_eq!(m.known_terms("AA zz cc ¿?"), vec!["aa", "cc"]);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        for threshold in [f64::NAN, -0.1, 1.0, 2.0] {
            let err = SimilarityMatcher::with_config(
                corpus(&[("t1", "aa bb")]),
                MatcherConfig { threshold },
            )
            .unwrap_err();
            assert!(matches!(err, MatcherError::InvalidThreshold(_)));
        }
    }

    #[test]
    fn corpus_without_terms_fails_to_build() {
        let err = SimilarityMatcher::build(corpus(&[("t1", "¿?"), ("t2", "a b")])).unwrap_err();
        assert!(matches!(err, MatcherError::EmptyVocabulary));
    }
}
