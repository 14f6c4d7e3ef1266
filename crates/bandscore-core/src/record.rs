//! Persisted submission records.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grader::GradingReport;
use crate::model::{Exam, ExamKind, ExamSummary};

/// A graded submission as stored by an exam store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// When the submission was graded.
    pub created_at: DateTime<Utc>,
    pub exam: ExamSummary,
    #[serde(default)]
    pub candidate: Option<String>,
    pub report: GradingReport,
}

impl SubmissionRecord {
    pub fn new(exam: &Exam, candidate: Option<String>, report: GradingReport) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            exam: exam.summary(),
            candidate,
            report,
        }
    }

    pub fn exam_kind(&self) -> Option<ExamKind> {
        self.exam.exam_type
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize record")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write record to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read record from {}", path.display()))?;
        let record: SubmissionRecord =
            serde_json::from_str(&content).context("failed to parse record JSON")?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grader::grade;
    use crate::model::{Question, SubmittedAnswers};

    fn make_exam() -> Exam {
        Exam {
            id: "reading-1".into(),
            title: "Reading 1".into(),
            exam_type: Some(ExamKind::Reading),
            questions: vec![
                Question::new(1, "true_false_not_given", Some("FALSE".into())),
                Question::new(2, "summary_completion_text", Some("coral reefs".into())),
            ],
        }
    }

    #[test]
    fn json_roundtrip() {
        let exam = make_exam();
        let answers: SubmittedAnswers = [("1".to_string(), "false".into())].into_iter().collect();
        let report = grade(&exam.questions, &answers, exam.exam_type);
        let record = SubmissionRecord::new(&exam, Some("cand-7".into()), report);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records/r.json");
        record.save_json(&path).unwrap();
        let loaded = SubmissionRecord::load_json(&path).unwrap();

        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.exam.question_count, 2);
        assert_eq!(loaded.exam_kind(), Some(ExamKind::Reading));
        assert_eq!(loaded.report.correct_answers, 1);
        assert_eq!(loaded.report.detailed_results[&2].is_correct, Some(false));
    }

    #[test]
    fn load_missing_file() {
        let err = SubmissionRecord::load_json(Path::new("/nonexistent/record.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read record"));
    }
}
