//! Error types for bandscore.
//!
//! Grading itself is infallible: missing or mismatched answers grade as
//! incorrect. These errors cover malformed input documents and failures of
//! the document-store collaborator. `StoreError` lives here so the batch
//! engine can downcast and classify failures without string matching.

use thiserror::Error;

/// Errors raised while interpreting exam or submission input.
#[derive(Debug, Error)]
pub enum GradeError {
    /// An exam kind tag that is not listening, reading, writing or mixed.
    #[error("unknown exam kind: {0}")]
    UnknownExamKind(String),

    /// A test section tag that is not listening, reading or writing.
    #[error("unknown test section: {0}")]
    UnknownSection(String),

    /// A value that cannot be read as a string, a list of strings, or a
    /// string-to-string mapping.
    #[error("invalid answer value: {0}")]
    InvalidAnswer(String),
}

/// Errors that can occur when talking to an exam store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No exam with the requested id exists in the store.
    #[error("exam not found: {0}")]
    ExamNotFound(String),

    /// The stored exam document could not be parsed.
    #[error("malformed exam document {exam_id}: {message}")]
    MalformedExam { exam_id: String, message: String },

    /// Reading from or writing to the backing storage failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized for persistence.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns `true` if the failure means the requested exam does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::ExamNotFound(_))
    }

    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            StoreError::ExamNotFound(_) | StoreError::MalformedExam { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_classification() {
        assert!(StoreError::ExamNotFound("x".into()).is_not_found());
        assert!(StoreError::ExamNotFound("x".into()).is_permanent());

        let io = StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!io.is_not_found());
        assert!(!io.is_permanent());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            GradeError::UnknownExamKind("speaking".into()).to_string(),
            "unknown exam kind: speaking"
        );
        assert_eq!(
            StoreError::ExamNotFound("mock-1".into()).to_string(),
            "exam not found: mock-1"
        );
    }
}
