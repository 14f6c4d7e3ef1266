//! Markdown rendering, suited to pasting into issues or feedback emails.

use bandscore_core::engine::BatchReport;
use bandscore_core::record::SubmissionRecord;

use crate::{format_answer, format_band, format_percentage, status_label};

/// Pipes would break table cells.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Render one graded submission as Markdown.
pub fn render_markdown(record: &SubmissionRecord) -> String {
    let report = &record.report;
    let mut out = String::new();

    let title = if record.exam.title.is_empty() {
        &record.exam.id
    } else {
        &record.exam.title
    };
    out.push_str(&format!("## {title}\n\n"));
    out.push_str(&format!(
        "Exam `{}` | candidate {} | graded {}\n\n",
        record.exam.id,
        record.candidate.as_deref().unwrap_or("anonymous"),
        record.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    if !report.auto_graded {
        out.push_str(&format!(
            "All {} questions await manual grading.\n",
            report.total_questions
        ));
        return out;
    }

    out.push_str("| Correct | Graded | Percentage | Band |\n");
    out.push_str("|---|---|---|---|\n");
    out.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        report.correct_answers,
        report.graded_questions,
        format_percentage(report.percentage),
        format_band(report.band_score)
    ));

    let pending = report.pending_manual();
    if pending > 0 {
        out.push_str(&format!("{pending} question(s) need manual grading.\n\n"));
    }

    out.push_str("| # | Type | Answer | Key | Result |\n");
    out.push_str("|---|---|---|---|---|\n");
    for (index, result) in &report.detailed_results {
        out.push_str(&format!(
            "| {index} | {} | {} | {} | {} |\n",
            result.question_type,
            cell(&format_answer(result.student_answer.as_ref())),
            cell(&format_answer(result.correct_answer.as_ref())),
            status_label(result)
        ));
    }
    out
}

/// Render a batch summary as Markdown.
pub fn render_batch_markdown(batch: &BatchReport) -> String {
    let stats = &batch.stats;
    let mut out = String::from("## Batch grading summary\n\n");

    out.push_str("| Submissions | Failed | Mean % | Mean band | Pending manual |\n");
    out.push_str("|---|---|---|---|---|\n");
    out.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        stats.submissions,
        batch.failures.len(),
        format_percentage(stats.mean_percentage),
        format_band(stats.mean_band),
        stats.pending_manual
    ));

    if !stats.band_distribution.is_empty() {
        out.push_str("| Band | Count |\n|---|---|\n");
        for (band, count) in stats.band_distribution.iter().rev() {
            out.push_str(&format!("| {band} | {count} |\n"));
        }
        out.push('\n');
    }

    for failure in &batch.failures {
        out.push_str(&format!(
            "- `{}` ({}): {}\n",
            failure.label,
            failure.exam_id,
            cell(&failure.error)
        ));
    }
    out
}
