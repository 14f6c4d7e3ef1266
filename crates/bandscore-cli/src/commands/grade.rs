//! The `bandscore grade` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use bandscore_core::grader::grade;
use bandscore_core::parser;
use bandscore_core::record::SubmissionRecord;
use bandscore_report::{generate_html, render_markdown};

pub fn execute(
    exam_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    output: Option<PathBuf>,
    no_band: bool,
) -> Result<()> {
    let exam = parser::parse_exam(&exam_path)?;
    let submission = parser::parse_submission(&answers_path)?;

    if submission.exam_id != exam.id {
        tracing::warn!(
            "submission is for exam '{}' but grading against '{}'",
            submission.exam_id,
            exam.id
        );
    }

    let mut report = grade(&exam.questions, &submission.answers, exam.exam_type);
    if no_band {
        report = report.without_band();
    }
    let record = SubmissionRecord::new(&exam, submission.candidate.clone(), report);

    let rendered = match format.as_str() {
        "text" => render_text(&record),
        "json" => serde_json::to_string_pretty(&record)?,
        "markdown" | "md" => render_markdown(&record),
        "html" => generate_html(&record),
        other => anyhow::bail!("unknown format '{other}' (expected text, json, markdown or html)"),
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)?;
            eprintln!("Report written to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn render_text(record: &SubmissionRecord) -> String {
    let report = &record.report;
    let mut out = format!(
        "Exam: {} ({} questions)\n",
        record.exam.id, report.total_questions
    );

    if !report.auto_graded {
        out.push_str("Writing exam: all questions await manual grading.\n");
        return out;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Type", "Answer", "Key", "Result"]);
    for (index, result) in &report.detailed_results {
        let status = match result.is_correct {
            Some(true) => "correct",
            Some(false) => "incorrect",
            None => "manual",
        };
        table.add_row(vec![
            Cell::new(index),
            Cell::new(&result.question_type),
            Cell::new(answer_text(result.student_answer.as_ref())),
            Cell::new(answer_text(result.correct_answer.as_ref())),
            Cell::new(status),
        ]);
    }
    out.push_str(&format!("{table}\n"));

    out.push_str(&format!(
        "Score: {}/{}",
        report.correct_answers, report.graded_questions
    ));
    if let Some(p) = report.percentage {
        out.push_str(&format!(" ({p:.1}%)"));
    }
    out.push('\n');
    if let Some(band) = report.band_score {
        out.push_str(&format!("Band: {band:.1}\n"));
    }
    let pending = report.pending_manual();
    if pending > 0 {
        out.push_str(&format!("Pending manual grading: {pending}\n"));
    }
    out
}

fn answer_text(value: Option<&bandscore_core::AnswerValue>) -> String {
    value.map(ToString::to_string).unwrap_or_else(|| "-".into())
}
