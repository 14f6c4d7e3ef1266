//! In-memory exam store for tests and one-shot grading.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use bandscore_core::error::StoreError;
use bandscore_core::model::{Exam, ExamSummary};
use bandscore_core::record::SubmissionRecord;
use bandscore_core::traits::ExamStore;

/// An exam store holding everything in memory.
///
/// Counts exam loads so tests can assert how often the engine hit the store.
#[derive(Default)]
pub struct MemoryExamStore {
    exams: HashMap<String, Exam>,
    submissions: Mutex<Vec<SubmissionRecord>>,
    load_count: AtomicU32,
}

impl MemoryExamStore {
    pub fn new(exams: impl IntoIterator<Item = Exam>) -> Self {
        Self {
            exams: exams.into_iter().map(|e| (e.id.clone(), e)).collect(),
            ..Default::default()
        }
    }

    /// Number of `load_exam` calls made.
    pub fn load_count(&self) -> u32 {
        self.load_count.load(Ordering::Relaxed)
    }

    /// All records saved so far, in save order.
    pub fn saved(&self) -> Vec<SubmissionRecord> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ExamStore for MemoryExamStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load_exam(&self, exam_id: &str) -> Result<Exam> {
        self.load_count.fetch_add(1, Ordering::Relaxed);
        self.exams
            .get(exam_id)
            .cloned()
            .ok_or_else(|| StoreError::ExamNotFound(exam_id.to_string()).into())
    }

    async fn list_exams(&self) -> Result<Vec<ExamSummary>> {
        let mut summaries: Vec<_> = self.exams.values().map(Exam::summary).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    async fn save_submission(&self, record: &SubmissionRecord) -> Result<()> {
        self.submissions
            .lock()
            .map_err(|_| anyhow::anyhow!("submission store lock poisoned"))?
            .push(record.clone());
        Ok(())
    }

    async fn list_submissions(&self, exam_id: &str) -> Result<Vec<SubmissionRecord>> {
        let submissions = self
            .submissions
            .lock()
            .map_err(|_| anyhow::anyhow!("submission store lock poisoned"))?;
        Ok(submissions
            .iter()
            .filter(|r| r.exam.id == exam_id)
            .cloned()
            .collect())
    }
}
