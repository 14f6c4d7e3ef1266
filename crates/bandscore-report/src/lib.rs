//! bandscore-report: Rendering of graded submissions and batches.

pub mod html;
pub mod markdown;

pub use html::{generate_batch_html, generate_html, write_batch_html_report, write_html_report};
pub use markdown::{render_batch_markdown, render_markdown};

use bandscore_core::grader::QuestionResult;

/// Short status label for a question result.
pub(crate) fn status_label(result: &QuestionResult) -> &'static str {
    match result.is_correct {
        Some(true) => "correct",
        Some(false) => "incorrect",
        None => "manual",
    }
}

pub(crate) fn format_answer(value: Option<&bandscore_core::AnswerValue>) -> String {
    value.map(ToString::to_string).unwrap_or_else(|| "-".into())
}

pub(crate) fn format_percentage(p: Option<f64>) -> String {
    p.map(|p| format!("{p:.1}%")).unwrap_or_else(|| "-".into())
}

pub(crate) fn format_band(b: Option<f64>) -> String {
    b.map(|b| format!("{b:.1}")).unwrap_or_else(|| "-".into())
}
