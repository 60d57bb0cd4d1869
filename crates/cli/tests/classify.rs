use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

#[allow(deprecated)]
fn intent() -> Command {
    let mut cmd = Command::cargo_bin("intent").expect("binary");
    cmd.env_remove("INTENT_CORPUS").arg("--quiet");
    cmd
}

fn run_json(args: &[&str]) -> Value {
    let output = intent().args(args).arg("--json").output().expect("command run");
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn classify_prints_topic() {
    intent()
        .args(["classify", "¿Qué incentivos hay para paneles solares?"])
        .assert()
        .success()
        .stdout("Incentivos\n");
}

#[test]
fn classify_prints_no_match_for_off_topic_question() {
    intent()
        .args(["classify", "¿cuál es la capital de Francia?"])
        .assert()
        .success()
        .stdout("no match\n");
}

#[test]
fn ask_prints_canned_answer_and_fallback() {
    intent()
        .args(["ask", "¿Qué incentivos hay para paneles solares?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("incentivos fiscales en Colombia"));

    intent()
        .args(["ask", "zzxq999 qqzxx"])
        .assert()
        .success()
        .stdout("Lo siento, no entiendo la pregunta. ¿Puedes reformularla?\n");
}

#[test]
fn classify_json_envelope_reports_score_and_threshold() {
    let body = run_json(&["classify", "¿cuál es la capital de Francia?"]);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["topic"], Value::Null);
    assert_eq!(body["data"]["threshold"].as_f64(), Some(0.5));
    let score = body["data"]["score"].as_f64().unwrap();
    assert!(score > 0.0 && score <= 0.5);
}

#[test]
fn ask_json_with_empty_question_falls_back() {
    let body = run_json(&["ask", ""]);
    assert_eq!(body["data"]["topic"], Value::Null);
    assert_eq!(
        body["data"]["response"],
        "Lo siento, no entiendo la pregunta. ¿Puedes reformularla?"
    );
}

#[test]
fn explain_ranks_phrases_and_shows_decision() {
    let body = run_json(&["explain", "¿Hay incentivos?", "-n", "2"]);
    let ranked = body["data"]["ranked"].as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["topic"], "Incentivos");
    assert_eq!(body["data"]["topic"], "Incentivos");

    intent()
        .args(["explain", "¿Hay incentivos?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Decision (> 0.5): Incentivos"));
}

#[test]
fn topics_lists_builtin_corpus() {
    let body = run_json(&["topics"]);
    assert_eq!(body["data"]["corpus"], "solar");
    assert_eq!(body["data"]["phrases"], 6);
    assert_eq!(body["data"]["topics"].as_array().unwrap().len(), 4);
}

#[test]
fn schema_describes_envelope() {
    intent()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("schema_version"));
}
