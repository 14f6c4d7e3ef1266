//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bandscore() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("bandscore").unwrap()
}

fn fixture(path: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(path)
}

/// Config pointing the store at the shared exam fixtures and writing
/// everything else into `dir`.
fn write_config(dir: &Path) -> PathBuf {
    let exams = std::fs::canonicalize(fixture("exam-sets")).unwrap();
    let config = format!(
        "data_dir = {:?}\nexams_dir = {:?}\noutput_dir = {:?}\nparallelism = 2\n",
        dir.display().to_string(),
        exams.display().to_string(),
        dir.join("results").display().to_string(),
    );
    let path = dir.join("bandscore.toml");
    std::fs::write(&path, config).unwrap();
    path
}

#[test]
fn grade_perfect_listening_text() {
    bandscore()
        .arg("grade")
        .arg("--exam")
        .arg(fixture("exam-sets/listening-sample.json"))
        .arg("--answers")
        .arg(fixture("submission-sets/listening-perfect.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 10/10 (100.0%)"))
        .stdout(predicate::str::contains("Band: 9.0"));
}

#[test]
fn grade_partial_listening_json() {
    let output = bandscore()
        .arg("grade")
        .arg("--exam")
        .arg(fixture("exam-sets/listening-sample.json"))
        .arg("--answers")
        .arg(fixture("submission-sets/listening-partial.json"))
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let report = &record["report"];
    assert_eq!(report["correct_answers"], 7);
    assert_eq!(report["total_questions"], 10);
    assert_eq!(report["band_score"], 7.0);
    assert_eq!(report["detailed_results"]["8"]["is_correct"], false);
    assert_eq!(report["detailed_results"]["10"]["is_correct"], false);
    assert_eq!(record["candidate"], "cand-002");
}

#[test]
fn grade_toml_reading_exam() {
    bandscore()
        .arg("grade")
        .arg("--exam")
        .arg(fixture("exam-sets/reading-sample.toml"))
        .arg("--answers")
        .arg(fixture("submission-sets/reading-sample.json"))
        .arg("--no-band")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 5/6 (83.3%)"))
        .stdout(predicate::str::contains("Band:").not());
}

#[test]
fn grade_writing_is_manual() {
    bandscore()
        .arg("grade")
        .arg("--exam")
        .arg(fixture("exam-sets/writing-sample.json"))
        .arg("--answers")
        .arg(fixture("submission-sets/writing-sample.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("await manual grading"));
}

#[test]
fn grade_html_to_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.html");

    bandscore()
        .arg("grade")
        .arg("--exam")
        .arg(fixture("exam-sets/listening-sample.json"))
        .arg("--answers")
        .arg(fixture("submission-sets/listening-partial.json"))
        .arg("--format")
        .arg("html")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains("Listening Practice Test 1"));
    assert!(html.contains("cand-002"));
}

#[test]
fn grade_unknown_format_fails() {
    bandscore()
        .arg("grade")
        .arg("--exam")
        .arg(fixture("exam-sets/listening-sample.json"))
        .arg("--answers")
        .arg(fixture("submission-sets/listening-perfect.json"))
        .arg("--format")
        .arg("pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn validate_directory() {
    bandscore()
        .arg("validate")
        .arg("--exam")
        .arg(fixture("exam-sets"))
        .assert()
        .success()
        .stdout(predicate::str::contains("listening-sample [listening] (10 questions)"))
        .stdout(predicate::str::contains("reading-sample [reading] (6 questions)"))
        .stdout(predicate::str::contains("writing-sample [writing] (2 questions)"))
        .stdout(predicate::str::contains("All exams valid"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("draft.json");
    std::fs::write(
        &path,
        r#"{
            "id": "draft",
            "questions": [
                {"index": 1, "type": "map_labeling", "payload": {}},
                {"index": 1, "type": "multiple_choice_multiple_reading", "payload": {"answer_key": "A"}},
                {"index": 3, "type": "essay_plan", "payload": {"answer_key": "x"}}
            ]
        }"#,
    )
    .unwrap();

    bandscore()
        .arg("validate")
        .arg("--exam")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("has no answer_key"))
        .stdout(predicate::str::contains("duplicate question index"))
        .stdout(predicate::str::contains("unknown question type 'essay_plan'"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    bandscore()
        .arg("validate")
        .arg("--exam")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn types_for_listening() {
    bandscore()
        .arg("types")
        .arg("--section")
        .arg("listening")
        .assert()
        .success()
        .stdout(predicate::str::contains("form_completion"))
        .stdout(predicate::str::contains("10 question type(s)"))
        .stdout(predicate::str::contains("writing_task_1").not());
}

#[test]
fn types_unknown_section_fails() {
    bandscore()
        .arg("types")
        .arg("--section")
        .arg("speaking")
        .assert()
        .failure()
        .stderr(predicate::str::contains("speaking"));
}

#[test]
fn band_lookup() {
    bandscore()
        .arg("band")
        .arg("67")
        .assert()
        .success()
        .stdout("6.5\n");

    bandscore()
        .arg("band")
        .arg("150")
        .assert()
        .failure();
}

#[test]
fn batch_grades_and_persists() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    bandscore()
        .arg("batch")
        .arg("--submissions")
        .arg(fixture("submission-sets"))
        .arg("--config")
        .arg(&config)
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stderr(predicate::str::contains("4/5 graded, 1 failed"))
        .stderr(predicate::str::contains("listening-2019"));

    let saved = std::fs::read_dir(dir.path().join("submissions/listening-sample"))
        .unwrap()
        .count();
    assert_eq!(saved, 2);

    let results: Vec<_> = std::fs::read_dir(dir.path().join("results"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert!(results.iter().any(|p| p.extension().is_some_and(|e| e == "json")));
    assert!(results.iter().any(|p| p.extension().is_some_and(|e| e == "md")));

    bandscore()
        .arg("history")
        .arg("--exam")
        .arg("listening-sample")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("cand-001"))
        .stdout(predicate::str::contains("2 submission(s)"));
}

#[test]
fn exams_lists_store() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    bandscore()
        .arg("exams")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("listening-sample"))
        .stdout(predicate::str::contains("Reading Practice Test 1"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    bandscore()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created bandscore.toml"))
        .stdout(predicate::str::contains(
            "Created bandscore-data/exams/listening-sample.json",
        ));

    assert!(dir.path().join("bandscore.toml").exists());
    assert!(dir.path().join("incoming/listening-sample-answers.json").exists());

    // The generated example grades end to end.
    bandscore()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--exam")
        .arg("bandscore-data/exams/listening-sample.json")
        .arg("--answers")
        .arg("incoming/listening-sample-answers.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 4/5 (80.0%)"))
        .stdout(predicate::str::contains("Band: 8.0"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    bandscore()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    bandscore()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
