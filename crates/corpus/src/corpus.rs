use crate::error::{CorpusError, Result};
use crate::types::{TopicResponseTable, TrainingExample};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const CORPUS_SCHEMA_VERSION: u32 = 1;

/// Text returned when no topic was recognized or a topic has no response.
pub const FALLBACK_RESPONSE: &str = "Lo siento, no entiendo la pregunta. ¿Puedes reformularla?";

const BUILTIN_SOLAR: &str = include_str!("../../../corpora/solar.json");

/// Immutable set of training examples plus the topic → response table.
///
/// Example order is fixed at construction; phrase positions returned by
/// [`CorpusIndex::all_phrases`] and [`CorpusIndex::topic_at`] always agree.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    name: Option<String>,
    examples: Vec<TrainingExample>,
    responses: TopicResponseTable,
    fallback: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCorpus {
    schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fallback: Option<String>,
    examples: Vec<TrainingExample>,
    #[serde(default)]
    responses: TopicResponseTable,
}

impl CorpusIndex {
    pub fn new(examples: Vec<TrainingExample>, responses: TopicResponseTable) -> Result<Self> {
        if examples.is_empty() {
            return Err(CorpusError::EmptyCorpus);
        }
        for (index, example) in examples.iter().enumerate() {
            if example.topic.trim().is_empty() {
                return Err(CorpusError::InvalidExample {
                    index,
                    reason: "topic is empty".to_string(),
                });
            }
            if example.phrase.trim().is_empty() {
                return Err(CorpusError::InvalidExample {
                    index,
                    reason: "phrase is empty".to_string(),
                });
            }
        }

        let corpus = Self {
            name: None,
            examples,
            responses,
            fallback: FALLBACK_RESPONSE.to_string(),
        };
        for topic in corpus.missing_responses() {
            log::warn!("Topic '{topic}' has no response; answers will use the fallback text");
        }
        Ok(corpus)
    }

    /// The Spanish solar-energy corpus compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_SOLAR)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let persisted: PersistedCorpus = serde_json::from_str(raw)?;
        if persisted.schema_version != CORPUS_SCHEMA_VERSION {
            return Err(CorpusError::UnsupportedSchema {
                found: persisted.schema_version,
                expected: CORPUS_SCHEMA_VERSION,
            });
        }

        let mut corpus = Self::new(persisted.examples, persisted.responses)?;
        corpus.name = persisted.name.filter(|name| !name.trim().is_empty());
        if let Some(fallback) = persisted.fallback.filter(|text| !text.trim().is_empty()) {
            corpus.fallback = fallback;
        }
        Ok(corpus)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading corpus from {}", path.display());
        let raw = tokio::fs::read_to_string(path).await?;
        let corpus = Self::from_json_str(&raw)?;
        log::info!(
            "Loaded {} examples across {} topics",
            corpus.len(),
            corpus.topics().len()
        );
        Ok(corpus)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let persisted = PersistedCorpus {
            schema_version: CORPUS_SCHEMA_VERSION,
            name: self.name.clone(),
            fallback: Some(self.fallback.clone()),
            examples: self.examples.clone(),
            responses: self.responses.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mapped response for `topic`, or the fallback text when the topic is
    /// absent or has no entry.
    #[must_use]
    pub fn response_for(&self, topic: Option<&str>) -> &str {
        topic
            .and_then(|topic| self.responses.get(topic))
            .unwrap_or(self.fallback.as_str())
    }

    #[must_use]
    pub fn all_phrases(&self) -> Vec<&str> {
        self.examples.iter().map(|e| e.phrase.as_str()).collect()
    }

    #[must_use]
    pub fn topic_at(&self, index: usize) -> Option<&str> {
        self.examples.get(index).map(|e| e.topic.as_str())
    }

    #[must_use]
    pub fn example_at(&self, index: usize) -> Option<&TrainingExample> {
        self.examples.get(index)
    }

    /// Distinct topics in first-seen order.
    #[must_use]
    pub fn topics(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.examples
            .iter()
            .map(|e| e.topic.as_str())
            .filter(|topic| seen.insert(*topic))
            .collect()
    }

    /// Topics that occur in examples but have no response entry.
    #[must_use]
    pub fn missing_responses(&self) -> Vec<&str> {
        self.topics()
            .into_iter()
            .filter(|topic| !self.responses.contains(topic))
            .collect()
    }

    #[must_use]
    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    #[must_use]
    pub const fn responses(&self) -> &TopicResponseTable {
        &self.responses
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Always `false`: construction rejects an empty example list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}
