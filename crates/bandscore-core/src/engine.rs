//! Batch grading engine.
//!
//! Grades many submissions against an [`ExamStore`] with bounded
//! parallelism. Each submission is independent: a failure (unknown exam,
//! storage error) is reported and the rest of the batch continues.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::error::StoreError;
use crate::grader::grade;
use crate::model::Submission;
use crate::record::SubmissionRecord;
use crate::statistics::{compute_cohort_stats, CohortStats};
use crate::traits::ExamStore;

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum submissions graded concurrently.
    pub parallelism: usize,
    /// Include the derived band score in reports.
    pub band_scoring: bool,
    /// Persist each graded record through the store.
    pub persist: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            band_scoring: true,
            persist: true,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_submission_start(&self, label: &str, exam_id: &str);
    fn on_submission_complete(&self, label: &str, record: &SubmissionRecord);
    fn on_submission_error(&self, label: &str, exam_id: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_submission_start(&self, _: &str, _: &str) {}
    fn on_submission_complete(&self, _: &str, _: &SubmissionRecord) {}
    fn on_submission_error(&self, _: &str, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// A submission that could not be graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Caller-supplied label (usually the source file).
    pub label: String,
    pub exam_id: String,
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub records: Vec<SubmissionRecord>,
    pub failures: Vec<BatchFailure>,
    pub stats: CohortStats,
    pub duration_ms: u64,
}

impl BatchReport {
    /// Save the batch report as JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize batch report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write batch report to {}", path.display()))?;
        Ok(())
    }

    /// Load a batch report from JSON.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read batch report from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse batch report JSON")
    }
}

/// The batch grading engine.
pub struct GradingEngine {
    store: Arc<dyn ExamStore>,
    config: EngineConfig,
}

impl GradingEngine {
    pub fn new(store: Arc<dyn ExamStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Grade a single submission: load its exam, grade, and persist.
    pub async fn grade_submission(&self, submission: &Submission) -> Result<SubmissionRecord> {
        grade_with_store(self.store.as_ref(), &self.config, submission).await
    }

    /// Grade labelled submissions concurrently.
    pub async fn run(
        &self,
        submissions: Vec<(String, Submission)>,
        progress: &dyn ProgressReporter,
    ) -> Result<BatchReport> {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let mut futures = FuturesUnordered::new();

        for (label, submission) in submissions {
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let config = self.config.clone();

            progress.on_submission_start(&label, &submission.exam_id);
            futures.push(async move {
                let inner = async {
                    let _permit = semaphore
                        .clone()
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    grade_with_store(store.as_ref(), &config, &submission).await
                };
                let result = inner.await;
                (label, submission.exam_id, result)
            });
        }

        let total = futures.len();
        let mut records = Vec::new();
        let mut failures = Vec::new();

        while let Some((label, exam_id, result)) = futures.next().await {
            match result {
                Ok(record) => {
                    progress.on_submission_complete(&label, &record);
                    records.push(record);
                }
                Err(e) => {
                    let not_found = e
                        .downcast_ref::<StoreError>()
                        .is_some_and(StoreError::is_not_found);
                    if not_found {
                        tracing::warn!("{label}: exam '{exam_id}' is not in the store");
                    } else {
                        tracing::error!("grading failed for {label}: {e:#}");
                    }
                    progress.on_submission_error(&label, &exam_id, &format!("{e:#}"));
                    failures.push(BatchFailure {
                        label,
                        exam_id,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, records.len(), failures.len(), elapsed);

        let stats = compute_cohort_stats(records.iter().map(|r| &r.report));

        Ok(BatchReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            records,
            failures,
            stats,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

async fn grade_with_store(
    store: &dyn ExamStore,
    config: &EngineConfig,
    submission: &Submission,
) -> Result<SubmissionRecord> {
    let exam = store.load_exam(&submission.exam_id).await?;

    let mut report = grade(&exam.questions, &submission.answers, exam.exam_type);
    if !config.band_scoring {
        report = report.without_band();
    }

    let record = SubmissionRecord::new(&exam, submission.candidate.clone(), report);
    if config.persist {
        store.save_submission(&record).await?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exam, ExamKind, ExamSummary, Question};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct OneExamStore {
        exam: Exam,
        saved: Mutex<Vec<SubmissionRecord>>,
    }

    #[async_trait]
    impl ExamStore for OneExamStore {
        fn name(&self) -> &str {
            "one-exam"
        }

        async fn load_exam(&self, exam_id: &str) -> Result<Exam> {
            if exam_id == self.exam.id {
                Ok(self.exam.clone())
            } else {
                Err(StoreError::ExamNotFound(exam_id.to_string()).into())
            }
        }

        async fn list_exams(&self) -> Result<Vec<ExamSummary>> {
            Ok(vec![self.exam.summary()])
        }

        async fn save_submission(&self, record: &SubmissionRecord) -> Result<()> {
            self.saved.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn list_submissions(&self, _: &str) -> Result<Vec<SubmissionRecord>> {
            Ok(self.saved.lock().unwrap().clone())
        }
    }

    fn store() -> Arc<OneExamStore> {
        Arc::new(OneExamStore {
            exam: Exam {
                id: "listening-1".into(),
                title: "Listening 1".into(),
                exam_type: Some(ExamKind::Listening),
                questions: vec![
                    Question::new(1, "map_labeling", Some("C".into())),
                    Question::new(2, "form_completion", Some("Sarah Wilson".into())),
                ],
            },
            saved: Mutex::new(Vec::new()),
        })
    }

    fn submission(exam_id: &str, answer: &str) -> Submission {
        Submission {
            exam_id: exam_id.into(),
            candidate: None,
            answers: [("1".to_string(), answer.into())].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn batch_grades_and_persists() {
        let store = store();
        let engine = GradingEngine::new(store.clone(), EngineConfig::default());

        let batch = engine
            .run(
                vec![
                    ("a.json".into(), submission("listening-1", "C")),
                    ("b.json".into(), submission("listening-1", "B")),
                    ("c.json".into(), submission("missing", "C")),
                ],
                &NoopReporter,
            )
            .await
            .unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].label, "c.json");
        assert!(batch.failures[0].error.contains("exam not found"));
        assert_eq!(batch.stats.submissions, 2);
        assert_eq!(store.saved.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn band_scoring_can_be_disabled() {
        let engine = GradingEngine::new(
            store(),
            EngineConfig {
                band_scoring: false,
                persist: false,
                ..Default::default()
            },
        );
        let record = engine
            .grade_submission(&submission("listening-1", "C"))
            .await
            .unwrap();
        assert_eq!(record.report.correct_answers, 1);
        assert_eq!(record.report.percentage, Some(50.0));
        assert!(record.report.band_score.is_none());
    }

    #[tokio::test]
    async fn batch_report_json_round_trip() {
        let engine = GradingEngine::new(store(), EngineConfig::default());
        let batch = engine
            .run(vec![("a".into(), submission("listening-1", "C"))], &NoopReporter)
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/batch.json");
        batch.save_json(&path).unwrap();
        let loaded = BatchReport::load_json(&path).unwrap();
        assert_eq!(loaded.id, batch.id);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.stats.submissions, 1);
    }
}
