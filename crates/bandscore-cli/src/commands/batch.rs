//! The `bandscore batch` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table};

use bandscore_core::engine::{BatchReport, GradingEngine, ProgressReporter};
use bandscore_core::parser;
use bandscore_core::record::SubmissionRecord;
use bandscore_report::html::write_batch_html_report;
use bandscore_report::render_batch_markdown;
use bandscore_store::{create_store, load_config_from};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_submission_start(&self, label: &str, exam_id: &str) {
        eprintln!("  Grading: {label} ({exam_id})");
    }

    fn on_submission_complete(&self, label: &str, record: &SubmissionRecord) {
        let report = &record.report;
        let band = report
            .band_score
            .map(|b| format!(" band {b:.1}"))
            .unwrap_or_default();
        eprintln!(
            "  Done: {label} {}/{}{band}",
            report.correct_answers, report.graded_questions
        );
    }

    fn on_submission_error(&self, label: &str, exam_id: &str, error: &str) {
        eprintln!("  ERROR: {label} ({exam_id}): {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    submissions_dir: PathBuf,
    config_path: Option<PathBuf>,
    parallelism: Option<usize>,
    format: String,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(parallelism) = parallelism {
        anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
        config.parallelism = parallelism;
    }

    let submissions = parser::load_submission_directory(&submissions_dir)?;
    anyhow::ensure!(
        !submissions.is_empty(),
        "no submission files found in {}",
        submissions_dir.display()
    );

    let store = create_store(&config);
    eprintln!(
        "bandscore v{}: grading {} submissions against {}",
        env!("CARGO_PKG_VERSION"),
        submissions.len(),
        config.exams_path().display()
    );
    eprintln!();

    let engine = GradingEngine::new(store, config.engine_config());
    let batch = engine.run(submissions, &ConsoleReporter).await?;

    print_summary(&batch);

    let output = &config.output_dir;
    std::fs::create_dir_all(output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let json_path = output.join(format!("batch-{timestamp}.json"));
    batch.save_json(&json_path)?;
    eprintln!("Results saved to: {}", json_path.display());

    match format.as_str() {
        "json" => {}
        "html" => {
            let path = output.join(format!("batch-{timestamp}.html"));
            write_batch_html_report(&batch, &path)?;
            eprintln!("HTML report: {}", path.display());
        }
        "markdown" | "md" => {
            let path = output.join(format!("batch-{timestamp}.md"));
            std::fs::write(&path, render_batch_markdown(&batch))?;
            eprintln!("Markdown report: {}", path.display());
        }
        other => eprintln!("Unknown format: {other}"),
    }

    Ok(())
}

fn print_summary(batch: &BatchReport) {
    let mut table = Table::new();
    table.set_header(vec!["Submission", "Exam", "Correct", "Percentage", "Band"]);

    for record in &batch.records {
        let report = &record.report;
        table.add_row(vec![
            Cell::new(record.candidate.as_deref().unwrap_or("-")),
            Cell::new(&record.exam.id),
            Cell::new(format!(
                "{}/{}",
                report.correct_answers, report.graded_questions
            )),
            Cell::new(
                report
                    .percentage
                    .map(|p| format!("{p:.1}%"))
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(
                report
                    .band_score
                    .map(|b| format!("{b:.1}"))
                    .unwrap_or_else(|| "-".into()),
            ),
        ]);
    }
    for failure in &batch.failures {
        table.add_row(vec![
            Cell::new(&failure.label),
            Cell::new(&failure.exam_id),
            Cell::new("FAILED"),
            Cell::new("-"),
            Cell::new("-"),
        ]);
    }

    eprintln!("\n{table}");
    if let Some(mean) = batch.stats.mean_band {
        eprintln!("Mean band: {mean:.1}");
    }
}
