//! Submission grader.
//!
//! Drives the dispatcher over every question of an exam and aggregates the
//! per-question outcomes into a [`GradingReport`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::band::{band_score, percentage};
use crate::dispatch::{grade_with, select_matcher, Outcome};
use crate::model::{AnswerValue, ExamKind, Question, SubmittedAnswers};
use crate::registry::Grading;

/// Per-question grading record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    /// `None` when the question needs manual grading.
    pub is_correct: Option<bool>,
    /// Matcher name, or `manual_only`.
    pub grading_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_answer: Option<AnswerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<AnswerValue>,
    pub question_type: String,
}

impl QuestionResult {
    pub fn needs_manual_grading(&self) -> bool {
        self.is_correct.is_none()
    }
}

/// Result of grading one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Raw score (equal to `correct_answers`).
    pub score: u32,
    /// Number of questions in the exam.
    pub total_questions: u32,
    /// Questions that were auto-graded; the percentage denominator.
    pub graded_questions: u32,
    pub correct_answers: u32,
    /// `correct_answers / graded_questions * 100`, absent if nothing was graded.
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub band_score: Option<f64>,
    /// Results keyed by question index.
    pub detailed_results: BTreeMap<u32, QuestionResult>,
    /// False when the whole exam is manually graded.
    pub auto_graded: bool,
}

impl GradingReport {
    /// Questions awaiting an examiner. Every question of a manually graded
    /// exam counts.
    pub fn pending_manual(&self) -> usize {
        if !self.auto_graded {
            return self.total_questions as usize;
        }
        self.detailed_results
            .values()
            .filter(|r| r.needs_manual_grading())
            .count()
    }

    /// Drop the derived band score.
    pub fn without_band(mut self) -> Self {
        self.band_score = None;
        self
    }
}

/// Grade a submission.
///
/// Writing exams short-circuit to an un-graded report. Otherwise every
/// question is graded independently: questions without an answer key (or of
/// a manual-only type) are recorded as needing manual grading and excluded
/// from the percentage denominator.
pub fn grade(
    questions: &[Question],
    answers: &SubmittedAnswers,
    exam_kind: Option<ExamKind>,
) -> GradingReport {
    let total_questions = questions.len() as u32;

    if exam_kind.is_some_and(ExamKind::is_manually_graded) {
        tracing::info!("{total_questions} questions left for manual grading");
        return GradingReport {
            score: 0,
            total_questions,
            graded_questions: 0,
            correct_answers: 0,
            percentage: None,
            band_score: None,
            detailed_results: BTreeMap::new(),
            auto_graded: false,
        };
    }

    let mut correct_answers = 0u32;
    let mut graded_questions = 0u32;
    let mut detailed_results = BTreeMap::new();

    for question in questions {
        let Some(correct) = question.answer_key() else {
            detailed_results.insert(
                question.index,
                QuestionResult {
                    is_correct: None,
                    grading_method: Grading::ManualOnly.to_string(),
                    student_answer: None,
                    correct_answer: None,
                    question_type: question.question_type.clone(),
                },
            );
            continue;
        };

        let submitted = answers.get(&question.key());
        let grading = select_matcher(&question.question_type);
        let outcome = grade_with(grading, submitted, Some(correct), question.max_words());

        tracing::debug!(
            index = question.index,
            question_type = %question.question_type,
            method = %grading,
            ?outcome,
            "graded question"
        );

        match outcome {
            Outcome::Correct => {
                correct_answers += 1;
                graded_questions += 1;
            }
            Outcome::Incorrect => graded_questions += 1,
            Outcome::ManualReview => {}
        }

        detailed_results.insert(
            question.index,
            QuestionResult {
                is_correct: outcome.as_bool(),
                grading_method: grading.to_string(),
                student_answer: submitted.cloned(),
                correct_answer: Some(correct.clone()),
                question_type: question.question_type.clone(),
            },
        );
    }

    let percentage = percentage(correct_answers, graded_questions);
    let band_score = percentage.map(band_score);

    tracing::info!(
        "graded {correct_answers}/{graded_questions} correct ({} questions total)",
        total_questions
    );

    GradingReport {
        score: correct_answers,
        total_questions,
        graded_questions,
        correct_answers,
        percentage,
        band_score,
        detailed_results,
        auto_graded: true,
    }
}
