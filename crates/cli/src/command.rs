use anyhow::{Context as AnyhowContext, Result};
use intent_corpus::{CorpusError, CorpusIndex};
use intent_matcher::{MatcherError, SimilarityMatcher};
use intent_protocol::{
    AnswerOutput, ClassifyOutput, CommandResponse, ExplainOutput, ExportOutput,
    RankedPhraseOutput, TopicSummary, TopicsOutput,
};
use std::path::Path;
use std::sync::Arc;

/// Matcher plus corpus, built once per process.
pub struct Engine {
    matcher: SimilarityMatcher,
}

impl Engine {
    pub async fn load(corpus_path: Option<&Path>) -> Result<Self> {
        let corpus = match corpus_path {
            Some(path) => CorpusIndex::load(path)
                .await
                .with_context(|| format!("Failed to load corpus from {}", path.display()))?,
            None => CorpusIndex::builtin().context("Built-in corpus is invalid")?,
        };
        let matcher =
            SimilarityMatcher::build(Arc::new(corpus)).context("Failed to build the matcher")?;
        Ok(Self { matcher })
    }

    #[must_use]
    pub fn from_matcher(matcher: SimilarityMatcher) -> Self {
        Self { matcher }
    }

    #[must_use]
    pub const fn matcher(&self) -> &SimilarityMatcher {
        &self.matcher
    }

    #[must_use]
    pub fn corpus(&self) -> &CorpusIndex {
        self.matcher.corpus()
    }

    #[must_use]
    pub fn classify(&self, question: &str) -> ClassifyOutput {
        let best = self.matcher.best_match(question);
        let topic = self.matcher.classify(question).map(str::to_string);
        let best_phrase = self
            .corpus()
            .example_at(best.index)
            .map(|example| example.phrase.clone())
            .unwrap_or_default();
        ClassifyOutput {
            question: question.to_string(),
            topic,
            score: best.score,
            threshold: self.matcher.threshold(),
            best_phrase,
        }
    }

    #[must_use]
    pub fn ask(&self, question: &str) -> AnswerOutput {
        let topic = self.matcher.classify(question);
        AnswerOutput {
            question: question.to_string(),
            topic: topic.map(str::to_string),
            response: self.corpus().response_for(topic).to_string(),
        }
    }

    #[must_use]
    pub fn explain(&self, question: &str, limit: usize) -> ExplainOutput {
        let ranked = self
            .matcher
            .rank(question, limit.max(1))
            .into_iter()
            .enumerate()
            .map(|(rank, phrase)| RankedPhraseOutput {
                rank: rank + 1,
                index: phrase.index,
                topic: phrase.topic.to_string(),
                phrase: phrase.phrase.to_string(),
                score: phrase.score,
            })
            .collect();
        ExplainOutput {
            question: question.to_string(),
            terms: self.matcher.known_terms(question),
            threshold: self.matcher.threshold(),
            topic: self.matcher.classify(question).map(str::to_string),
            ranked,
        }
    }

    #[must_use]
    pub fn topics(&self) -> TopicsOutput {
        let corpus = self.corpus();
        let topics = corpus
            .topics()
            .into_iter()
            .map(|topic| TopicSummary {
                topic: topic.to_string(),
                examples: corpus
                    .examples()
                    .iter()
                    .filter(|example| example.topic == topic)
                    .count(),
                response: corpus.responses().get(topic).map(str::to_string),
            })
            .collect();
        TopicsOutput {
            corpus: corpus.name().map(str::to_string),
            phrases: corpus.len(),
            vocabulary: self.matcher.model().vocabulary_len(),
            topics,
        }
    }

    /// Writes the active corpus as a corpus document that `--corpus` accepts.
    pub async fn export(&self, path: &Path) -> Result<ExportOutput> {
        let corpus = self.corpus();
        corpus
            .save(path)
            .await
            .with_context(|| format!("Failed to write corpus to {}", path.display()))?;
        log::info!("Exported corpus to {}", path.display());
        Ok(ExportOutput {
            path: path.display().to_string(),
            phrases: corpus.len(),
            topics: corpus.topics().len(),
        })
    }
}

/// Maps a startup or runtime failure onto an error envelope code and hint.
pub fn error_response(err: &anyhow::Error) -> CommandResponse {
    let message = format!("{err:#}");
    let (code, hint) = if let Some(corpus) = err.downcast_ref::<CorpusError>() {
        corpus_error_code(corpus)
    } else if let Some(matcher) = err.downcast_ref::<MatcherError>() {
        match matcher {
            MatcherError::CorpusError(corpus) => corpus_error_code(corpus),
            MatcherError::EmptyVocabulary => (
                "invalid_corpus",
                Some("Training phrases need at least one word of two or more letters."),
            ),
            MatcherError::InvalidThreshold(_) => ("invalid_config", None),
        }
    } else {
        ("internal", None)
    };
    CommandResponse::error(code, message, hint.map(str::to_string))
}

fn corpus_error_code(err: &CorpusError) -> (&'static str, Option<&'static str>) {
    match err {
        CorpusError::IoError(_) => (
            "corpus_unreadable",
            Some("Check the --corpus path or the INTENT_CORPUS variable."),
        ),
        CorpusError::SerializationError(_) => (
            "invalid_corpus",
            Some("The corpus must be JSON with schema_version, examples and responses."),
        ),
        CorpusError::UnsupportedSchema { .. } => {
            ("invalid_corpus", Some("Set \"schema_version\": 1 in the corpus."))
        }
        CorpusError::EmptyCorpus
        | CorpusError::InvalidExample { .. }
        | CorpusError::DuplicateTopic(_) => ("invalid_corpus", None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_corpus::FALLBACK_RESPONSE;
    use pretty_assertions::assert_eq;

    fn engine() -> Engine {
        let corpus = Arc::new(CorpusIndex::builtin().unwrap());
        Engine::from_matcher(SimilarityMatcher::build(corpus).unwrap())
    }

    #[test]
    fn classify_reports_best_phrase_even_without_match() {
        let out = engine().classify("¿cuál es la capital de Francia?");
        assert_eq!(out.topic, None);
        assert_eq!(out.threshold, 0.5);
        assert_eq!(
            out.best_phrase,
            "¿Es útil la energía solar para una finca hotel?"
        );
        assert!(out.score > 0.0 && out.score <= 0.5);
    }

    #[test]
    fn ask_returns_fallback_for_unknown_questions() {
        let out = engine().ask("zzxq999 qqzxx");
        assert_eq!(out.topic, None);
        assert_eq!(out.response, FALLBACK_RESPONSE);
    }

    #[test]
    fn explain_lists_exact_phrase_first() {
        let out = engine().explain("¿Qué incentivos hay para paneles solares?", 3);
        assert_eq!(out.ranked.len(), 3);
        assert_eq!(out.ranked[0].rank, 1);
        assert_eq!(out.ranked[0].topic, "Incentivos");
        assert_eq!(out.topic.as_deref(), Some("Incentivos"));
        assert!(out.terms.contains(&"incentivos".to_string()));
    }

    #[test]
    fn topics_count_examples_per_topic() {
        let out = engine().topics();
        assert_eq!(out.corpus.as_deref(), Some("solar"));
        assert_eq!(out.phrases, 6);
        let agri = out
            .topics
            .iter()
            .find(|t| t.topic == "Sector agrícola")
            .unwrap();
        assert_eq!(agri.examples, 3);
        assert!(agri.response.is_some());
    }

    #[tokio::test]
    async fn exported_corpus_loads_back_unchanged() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("solar.json");

        let engine = engine();
        let out = engine.export(&path).await.unwrap();
        assert_eq!(out.phrases, 6);
        assert_eq!(out.topics, 4);

        let reloaded = Engine::load(Some(path.as_path())).await.unwrap();
        assert_eq!(reloaded.corpus().examples(), engine.corpus().examples());
        assert_eq!(reloaded.corpus().responses(), engine.corpus().responses());
        assert_eq!(reloaded.corpus().name(), Some("solar"));
    }

    #[test]
    fn corpus_errors_map_to_invalid_corpus() {
        let err = anyhow::Error::new(CorpusError::EmptyCorpus).context("Failed to load corpus");
        let response = error_response(&err);
        assert!(response.is_error());
        assert_eq!(response.error.unwrap().code, "invalid_corpus");
    }
}
