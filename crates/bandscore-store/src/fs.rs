//! Filesystem-backed exam store.
//!
//! Layout under the data directory:
//!
//! ```text
//! exams/<exam-id>.json | <exam-id>.toml
//! submissions/<exam-id>/<record-id>.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use bandscore_core::error::StoreError;
use bandscore_core::model::{Exam, ExamSummary};
use bandscore_core::parser::{parse_exam_str, DocumentFormat};
use bandscore_core::record::SubmissionRecord;
use bandscore_core::traits::ExamStore;

/// Exam store reading JSON/TOML exam documents from a directory.
pub struct FsExamStore {
    exams_dir: PathBuf,
    submissions_dir: PathBuf,
}

impl FsExamStore {
    pub fn new(exams_dir: impl Into<PathBuf>, submissions_dir: impl Into<PathBuf>) -> Self {
        Self {
            exams_dir: exams_dir.into(),
            submissions_dir: submissions_dir.into(),
        }
    }

    /// Store rooted at `data_dir` using the default sub-directory names.
    pub fn at(data_dir: &Path) -> Self {
        Self::new(data_dir.join("exams"), data_dir.join("submissions"))
    }

    pub fn exams_dir(&self) -> &Path {
        &self.exams_dir
    }

    pub fn submissions_dir(&self) -> &Path {
        &self.submissions_dir
    }

    async fn read_exam(&self, path: &Path, format: DocumentFormat) -> Result<Exam, StoreError> {
        let content = tokio::fs::read_to_string(path).await?;
        parse_exam_str(&content, format, path).map_err(|e| StoreError::MalformedExam {
            exam_id: path.display().to_string(),
            message: format!("{e:#}"),
        })
    }

    /// Exam documents in the exams directory, sorted by path.
    async fn exam_files(&self) -> Result<Vec<(PathBuf, DocumentFormat)>, StoreError> {
        let mut files = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.exams_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if let Some(format) = DocumentFormat::from_path(&path) {
                files.push((path, format));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

impl Default for FsExamStore {
    fn default() -> Self {
        Self::at(Path::new("./bandscore-data"))
    }
}

/// Exam ids become file names; anything that could escape the directory is rejected.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\']) && id != "." && id != ".."
}

#[async_trait]
impl ExamStore for FsExamStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn load_exam(&self, exam_id: &str) -> Result<Exam> {
        if !is_safe_id(exam_id) {
            return Err(StoreError::ExamNotFound(exam_id.to_string()).into());
        }

        for (ext, format) in [("json", DocumentFormat::Json), ("toml", DocumentFormat::Toml)] {
            let path = self.exams_dir.join(format!("{exam_id}.{ext}"));
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                let exam = self.read_exam(&path, format).await?;
                if exam.id == exam_id {
                    return Ok(exam);
                }
                tracing::warn!(
                    "{} declares id '{}' but was looked up as '{}'",
                    path.display(),
                    exam.id,
                    exam_id
                );
                break;
            }
        }

        // File names need not match ids; fall back to scanning.
        for (path, format) in self.exam_files().await? {
            match self.read_exam(&path, format).await {
                Ok(exam) if exam.id == exam_id => return Ok(exam),
                Ok(_) => {}
                Err(e) => tracing::debug!("skipping {}: {e}", path.display()),
            }
        }

        Err(StoreError::ExamNotFound(exam_id.to_string()).into())
    }

    async fn list_exams(&self) -> Result<Vec<ExamSummary>> {
        let mut summaries = Vec::new();
        for (path, format) in self.exam_files().await? {
            match self.read_exam(&path, format).await {
                Ok(exam) => summaries.push(exam.summary()),
                Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
            }
        }
        Ok(summaries)
    }

    async fn save_submission(&self, record: &SubmissionRecord) -> Result<()> {
        if !is_safe_id(&record.exam.id) {
            anyhow::bail!("refusing to store submission for exam id '{}'", record.exam.id);
        }
        let dir = self.submissions_dir.join(&record.exam.id);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let path = dir.join(format!("{}.json", record.id));
        let json = serde_json::to_string_pretty(record).map_err(StoreError::from)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write record to {}", path.display()))?;
        tracing::debug!("saved submission {} to {}", record.id, path.display());
        Ok(())
    }

    async fn list_submissions(&self, exam_id: &str) -> Result<Vec<SubmissionRecord>> {
        if !is_safe_id(exam_id) {
            return Ok(Vec::new());
        }
        let dir = self.submissions_dir.join(exam_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", dir.display()))
            }
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<SubmissionRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
            }
        }
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }
}
