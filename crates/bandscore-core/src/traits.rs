//! Document-store collaborator trait.
//!
//! Grading is pure; the store is the only I/O boundary. It is read once per
//! submission for the exam and written once for the graded record.
//! Implemented by the `bandscore-store` crate.

use async_trait::async_trait;

use crate::model::{Exam, ExamSummary};
use crate::record::SubmissionRecord;

/// Trait for backends that hold exams and graded submissions.
///
/// Implementations should return [`crate::error::StoreError`] (wrapped in
/// `anyhow`) so callers can classify failures.
#[async_trait]
pub trait ExamStore: Send + Sync {
    /// Human-readable store name (e.g. "filesystem").
    fn name(&self) -> &str;

    /// Fetch an exam with its questions and answer keys.
    async fn load_exam(&self, exam_id: &str) -> anyhow::Result<Exam>;

    /// List the exams held by this store.
    async fn list_exams(&self) -> anyhow::Result<Vec<ExamSummary>>;

    /// Persist a graded submission.
    async fn save_submission(&self, record: &SubmissionRecord) -> anyhow::Result<()>;

    /// Load all graded submissions for an exam.
    async fn list_submissions(&self, exam_id: &str) -> anyhow::Result<Vec<SubmissionRecord>>;
}
