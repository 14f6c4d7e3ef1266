//! Type dispatcher: question type tag to grading policy.

use serde::{Deserialize, Serialize};

use crate::model::AnswerValue;
use crate::registry::{self, Grading, MatcherKind};

/// Matcher used for tags missing from the registry.
pub const DEFAULT_MATCHER: MatcherKind = MatcherKind::CaseInsensitive;

/// Select the grading policy for a type tag.
///
/// Unknown tags degrade to [`DEFAULT_MATCHER`] rather than blocking grading.
pub fn select_matcher(tag: &str) -> Grading {
    match registry::lookup(tag) {
        Some(info) => info.grading,
        None => {
            tracing::warn!("unknown question type '{tag}', using {DEFAULT_MATCHER}");
            Grading::Auto(DEFAULT_MATCHER)
        }
    }
}

/// Result of grading one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Not auto-gradable; an examiner must mark it.
    ManualReview,
}

impl Outcome {
    /// `Some(true/false)` for auto-graded outcomes, `None` for manual review.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Outcome::Correct => Some(true),
            Outcome::Incorrect => Some(false),
            Outcome::ManualReview => None,
        }
    }
}

impl From<bool> for Outcome {
    fn from(correct: bool) -> Self {
        if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }
}

/// Grade one answer against its key under the policy for `question_type`.
///
/// Manual-only types short-circuit before any matcher runs. A missing or
/// empty submission, or a missing key, is [`Outcome::Incorrect`].
pub fn grade_question(
    question_type: &str,
    submitted: Option<&AnswerValue>,
    correct: Option<&AnswerValue>,
    max_words: Option<u32>,
) -> Outcome {
    grade_with(select_matcher(question_type), submitted, correct, max_words)
}

/// Grade one answer under an already selected policy.
pub fn grade_with(
    grading: Grading,
    submitted: Option<&AnswerValue>,
    correct: Option<&AnswerValue>,
    max_words: Option<u32>,
) -> Outcome {
    let kind = match grading {
        Grading::ManualOnly => return Outcome::ManualReview,
        Grading::Auto(kind) => kind,
    };

    match (submitted, correct) {
        (Some(s), Some(c)) if !s.is_empty() => kind.matches(s, c, max_words).into(),
        _ => Outcome::Incorrect,
    }
}
