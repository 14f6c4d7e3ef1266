//! bandscore-core: Answer grading engine for IELTS-style practice tests.
//!
//! This crate defines the question/answer data model, the answer normalizer,
//! the per-kind matchers, the static question-type registry, and the
//! submission grader that ties them together. Everything except the batch
//! engine and the store trait is synchronous and free of I/O.

pub mod band;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod grader;
pub mod matchers;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod record;
pub mod registry;
pub mod statistics;
pub mod traits;

pub use band::band_score;
pub use dispatch::{grade_question, grade_with, select_matcher, Outcome};
pub use error::{GradeError, StoreError};
pub use grader::{grade, GradingReport, QuestionResult};
pub use model::{AnswerValue, Exam, ExamKind, Question, QuestionPayload, Submission, SubmittedAnswers};
pub use normalize::normalize;
pub use registry::{Grading, MatcherKind, QuestionTypeInfo, TestSection};
