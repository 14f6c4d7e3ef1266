//! Exam and submission document loading.
//!
//! Loads exams from JSON or TOML files and directories, validates them, and
//! detects question types for documents that omit a known `type`.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::{AnswerShape, Exam, Submission};
use crate::registry::{self, Grading, MatcherKind};

/// On-disk document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(DocumentFormat::Json),
            Some("toml") => Some(DocumentFormat::Toml),
            _ => None,
        }
    }
}

fn parse_document<T: DeserializeOwned>(
    content: &str,
    format: DocumentFormat,
    source_path: &Path,
) -> Result<T> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display())),
        DocumentFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display())),
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = DocumentFormat::from_path(path).with_context(|| {
        format!(
            "unsupported file type (expected .json or .toml): {}",
            path.display()
        )
    })?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    parse_document(&content, format, path)
}

/// Parse a single exam file.
pub fn parse_exam(path: &Path) -> Result<Exam> {
    read_document(path)
}

/// Parse an exam from a string (useful for testing and stores).
pub fn parse_exam_str(content: &str, format: DocumentFormat, source_path: &Path) -> Result<Exam> {
    parse_document(content, format, source_path)
}

/// Parse a submission file.
pub fn parse_submission(path: &Path) -> Result<Submission> {
    read_document(path)
}

/// Recursively load all `.json`/`.toml` exam files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<Exam>> {
    load_directory(dir, parse_exam)
}

/// Recursively load all submission files from a directory.
pub fn load_submission_directory(dir: &Path) -> Result<Vec<(String, Submission)>> {
    load_directory(dir, |path| {
        parse_submission(path).map(|s| (path.display().to_string(), s))
    })
}

fn load_directory<T>(dir: &Path, load: impl Fn(&Path) -> Result<T> + Copy) -> Result<Vec<T>> {
    let mut items = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            items.extend(load_directory(&path, load)?);
        } else if DocumentFormat::from_path(&path).is_some() {
            match load(&path) {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(items)
}

/// A warning from exam validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question index (if applicable).
    pub question_index: Option<u32>,
    /// Warning message.
    pub message: String,
}

fn expected_shapes(grading: Grading) -> &'static [AnswerShape] {
    match grading {
        Grading::ManualOnly => &[],
        Grading::Auto(MatcherKind::SetMatch) => &[AnswerShape::List],
        Grading::Auto(_) => &[AnswerShape::Text, AnswerShape::Map],
    }
}

/// Validate an exam for common authoring mistakes.
pub fn validate_exam(exam: &Exam) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let warn = |index: u32, message: String| ValidationWarning {
        question_index: Some(index),
        message,
    };

    if exam.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_index: None,
            message: "exam has no questions".into(),
        });
    }

    let mut seen = HashSet::new();
    for q in &exam.questions {
        if !seen.insert(q.index) {
            warnings.push(warn(q.index, format!("duplicate question index: {}", q.index)));
        }
    }

    for q in &exam.questions {
        let Some(info) = registry::lookup(&q.question_type) else {
            warnings.push(warn(
                q.index,
                format!(
                    "unknown question type '{}' (graded case-insensitively)",
                    q.question_type
                ),
            ));
            continue;
        };

        match (info.grading, q.answer_key()) {
            (Grading::ManualOnly, Some(_)) => warnings.push(warn(
                q.index,
                format!("{} is graded manually; its answer_key is ignored", info.tag),
            )),
            (Grading::Auto(_), None) => warnings.push(warn(
                q.index,
                format!("{} is auto-gradable but has no answer_key", info.tag),
            )),
            (grading, Some(key)) => {
                let shapes = expected_shapes(grading);
                if !shapes.contains(&key.shape()) {
                    let expected: Vec<String> = shapes.iter().map(|s| s.to_string()).collect();
                    warnings.push(warn(
                        q.index,
                        format!(
                            "answer_key is a {} but {} expects {}",
                            key.shape(),
                            info.tag,
                            expected.join(" or ")
                        ),
                    ));
                }
                if key.is_empty() {
                    warnings.push(warn(q.index, "answer_key is empty".into()));
                }
            }
            (Grading::ManualOnly, None) => {}
        }

        if q.payload.max_words == Some(0) {
            warnings.push(warn(
                q.index,
                "max_words is 0; no word limit will be applied".into(),
            ));
        }
    }

    if exam.exam_type.is_some_and(|k| k.is_manually_graded()) {
        let auto = exam
            .questions
            .iter()
            .filter(|q| registry::is_auto_gradable(&q.question_type))
            .count();
        if auto > 0 {
            warnings.push(ValidationWarning {
                question_index: None,
                message: format!(
                    "writing exam contains {auto} auto-gradable question(s) that will not be graded"
                ),
            });
        }
    }

    warnings
}

fn has_all(options: &[&str], labels: &[&str]) -> bool {
    labels.iter().all(|label| options.contains(label))
}

/// Infer a question type tag from a raw question document.
///
/// A known explicit `type` wins. Otherwise option lists identify
/// TRUE/FALSE/NOT GIVEN, YES/NO/NOT GIVEN and generic multiple choice, and a
/// bare `answer_key` is treated as a reading short answer.
pub fn detect_question_type(question: &Value) -> Option<&'static str> {
    if let Some(tag) = question.get("type").and_then(Value::as_str) {
        if let Some(info) = registry::lookup(tag) {
            return Some(info.tag);
        }
    }

    if let Some(options) = question.get("options").and_then(Value::as_array) {
        if !options.is_empty() {
            let labels: Vec<&str> = options.iter().filter_map(Value::as_str).collect();
            if has_all(&labels, &["TRUE", "FALSE", "NOT GIVEN"]) {
                return Some("true_false_not_given");
            }
            if has_all(&labels, &["YES", "NO", "NOT GIVEN"]) {
                return Some("yes_no_not_given");
            }
            return Some("multiple_choice");
        }
    }

    if question.get("answer_key").is_some() {
        return Some("short_answer_reading");
    }

    None
}
