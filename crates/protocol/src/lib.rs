use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const RESPONSE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Envelope printed on stdout by every `--json` command.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct CommandResponse {
    pub schema_version: u32,
    pub status: CommandStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl CommandResponse {
    pub fn ok<T: Serialize>(data: &T) -> Result<Self> {
        Ok(Self {
            schema_version: RESPONSE_SCHEMA_VERSION,
            status: CommandStatus::Ok,
            message: None,
            error: None,
            data: serde_json::to_value(data)?,
        })
    }

    #[must_use]
    pub fn error(code: &str, message: String, hint: Option<String>) -> Self {
        Self {
            schema_version: RESPONSE_SCHEMA_VERSION,
            status: CommandStatus::Error,
            message: Some(message.clone()),
            error: Some(ErrorEnvelope {
                code: code.to_string(),
                message,
                hint,
            }),
            data: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ClassifyOutput {
    pub question: String,
    pub topic: Option<String>,
    pub score: f64,
    pub threshold: f64,
    /// Phrase that produced the best score, reported even when it did not clear the threshold.
    pub best_phrase: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct AnswerOutput {
    pub question: String,
    pub topic: Option<String>,
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct RankedPhraseOutput {
    pub rank: usize,
    pub index: usize,
    pub topic: String,
    pub phrase: String,
    pub score: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ExplainOutput {
    pub question: String,
    pub terms: Vec<String>,
    pub threshold: f64,
    pub topic: Option<String>,
    pub ranked: Vec<RankedPhraseOutput>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct TopicSummary {
    pub topic: String,
    pub examples: usize,
    pub response: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct TopicsOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus: Option<String>,
    pub phrases: usize,
    pub vocabulary: usize,
    pub topics: Vec<TopicSummary>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ExportOutput {
    pub path: String,
    pub phrases: usize,
    pub topics: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct EvalCaseResult {
    pub id: String,
    pub question: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub score: f64,
    pub passed: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct EvalSummary {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct EvalOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    pub summary: EvalSummary,
    pub cases: Vec<EvalCaseResult>,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

/// JSON Schema of [`CommandResponse`], as printed by `intent schema`.
pub fn command_response_schema() -> Result<String> {
    let schema = schemars::schema_for!(CommandResponse);
    serialize_json_pretty(&schema)
}
