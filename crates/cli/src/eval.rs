use crate::command::Engine;
use anyhow::{Context as AnyhowContext, Result};
use intent_protocol::{EvalCaseResult, EvalOutput, EvalSummary};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct EvalDatasetFile {
    schema_version: u32,
    #[serde(default)]
    name: Option<String>,
    cases: Vec<EvalDatasetCase>,
}

#[derive(Debug, Deserialize)]
struct EvalDatasetCase {
    #[serde(default)]
    id: Option<String>,
    question: String,
    /// `null` means the question must not match any topic.
    #[serde(default)]
    expected: Option<String>,
}

impl EvalDatasetFile {
    fn validate(&self) -> Result<()> {
        if self.schema_version != 1 {
            anyhow::bail!(
                "Unsupported eval dataset schema_version {} (expected 1)",
                self.schema_version
            );
        }
        if self.cases.is_empty() {
            anyhow::bail!("Eval dataset must contain at least one case");
        }
        Ok(())
    }
}

async fn load_dataset(path: &Path) -> Result<EvalDatasetFile> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read eval dataset {}", path.display()))?;
    let dataset: EvalDatasetFile = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid eval dataset JSON in {}", path.display()))?;
    dataset.validate()?;
    Ok(dataset)
}

pub async fn run_eval(engine: &Engine, dataset_path: &Path) -> Result<EvalOutput> {
    let dataset = load_dataset(dataset_path).await?;
    Ok(evaluate(engine, dataset))
}

fn evaluate(engine: &Engine, dataset: EvalDatasetFile) -> EvalOutput {
    let cases: Vec<EvalCaseResult> = dataset
        .cases
        .into_iter()
        .enumerate()
        .map(|(idx, case)| {
            let classified = engine.classify(&case.question);
            let passed = classified.topic == case.expected;
            EvalCaseResult {
                id: case.id.unwrap_or_else(|| format!("case-{}", idx + 1)),
                question: case.question,
                expected: case.expected,
                actual: classified.topic,
                score: classified.score,
                passed,
            }
        })
        .collect();

    let total = cases.len();
    let correct = cases.iter().filter(|case| case.passed).count();
    // validate() guarantees at least one case.
    let accuracy = correct as f64 / total as f64;
    log::info!("Eval: {correct}/{total} cases passed");

    EvalOutput {
        dataset: dataset.name,
        summary: EvalSummary {
            total,
            correct,
            accuracy,
        },
        cases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_corpus::CorpusIndex;
    use intent_matcher::SimilarityMatcher;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn engine() -> Engine {
        let corpus = Arc::new(CorpusIndex::builtin().unwrap());
        Engine::from_matcher(SimilarityMatcher::build(corpus).unwrap())
    }

    #[tokio::test]
    async fn eval_scores_expected_topics_and_no_match_cases() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("golden.json");
        std::fs::write(
            &path,
            r#"{
                "schema_version": 1,
                "name": "golden",
                "cases": [
                    {"id": "incentives", "question": "¿Qué incentivos hay para paneles solares?", "expected": "Incentivos"},
                    {"question": "¿cuál es la capital de Francia?", "expected": null},
                    {"question": "paneles solares", "expected": "Incentivos"}
                ]
            }"#,
        )
        .unwrap();

        let out = run_eval(&engine(), &path).await.unwrap();
        assert_eq!(out.dataset.as_deref(), Some("golden"));
        assert_eq!(out.summary.total, 3);
        assert_eq!(out.summary.correct, 2);
        assert!((out.summary.accuracy - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(out.cases[0].id, "incentives");
        assert_eq!(out.cases[1].id, "case-2");
        assert!(out.cases[1].passed);
        assert!(!out.cases[2].passed);
        assert_eq!(out.cases[2].actual, None);
    }

    #[tokio::test]
    async fn empty_dataset_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.json");
        std::fs::write(&path, r#"{"schema_version": 1, "cases": []}"#).unwrap();

        let err = run_eval(&engine(), &path).await.unwrap_err();
        assert!(err.to_string().contains("at least one case"));
    }
}
