use crate::error::{CorpusError, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One hand-authored example question and the topic it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub topic: String,
    pub phrase: String,
}

impl TrainingExample {
    pub fn new(topic: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            phrase: phrase.into(),
        }
    }
}

/// Canned response text keyed by topic. Topics are unique, also when read
/// from a corpus document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopicResponseTable {
    responses: BTreeMap<String, String>,
}

impl TopicResponseTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table, rejecting a topic that appears twice.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut responses = BTreeMap::new();
        for (topic, response) in pairs {
            let topic = topic.into();
            if responses.contains_key(&topic) {
                return Err(CorpusError::DuplicateTopic(topic));
            }
            responses.insert(topic, response.into());
        }
        Ok(Self { responses })
    }

    #[must_use]
    pub fn get(&self, topic: &str) -> Option<&str> {
        self.responses.get(topic).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, topic: &str) -> bool {
        self.responses.contains_key(topic)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.responses
            .iter()
            .map(|(topic, response)| (topic.as_str(), response.as_str()))
    }
}

impl<'de> Deserialize<'de> for TopicResponseTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = TopicResponseTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of topic to response text")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut responses = BTreeMap::new();
                while let Some((topic, response)) = map.next_entry::<String, String>()? {
                    if responses.contains_key(&topic) {
                        return Err(de::Error::custom(CorpusError::DuplicateTopic(topic)));
                    }
                    responses.insert(topic, response);
                }
                Ok(TopicResponseTable { responses })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_topics_are_rejected() {
        let err = TopicResponseTable::from_pairs([("a", "one"), ("b", "two"), ("a", "three")])
            .unwrap_err();
        assert!(matches!(err, CorpusError::DuplicateTopic(topic) if topic == "a"));
    }

    #[test]
    fn lookup_is_exact() {
        let table = TopicResponseTable::from_pairs([("Incentivos", "sí")]).unwrap();
        assert_eq!(table.get("Incentivos"), Some("sí"));
        assert_eq!(table.get("incentivos"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn deserialized_table_rejects_repeated_topic() {
        let err = serde_json::from_str::<TopicResponseTable>(r#"{"a": "first", "a": "second"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate response for topic 'a'"));

        let table: TopicResponseTable =
            serde_json::from_str(r#"{"a": "first", "b": "second"}"#).unwrap();
        assert_eq!(table.get("b"), Some("second"));
    }
}
