//! The `bandscore exams` and `bandscore history` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use bandscore_store::{create_store, load_config_from};

pub async fn list(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = create_store(&config);
    let exams = store.list_exams().await?;

    if exams.is_empty() {
        println!(
            "No exams found in {}. Run `bandscore init` to create an example.",
            config.exams_path().display()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Title", "Type", "Questions"]);
    for exam in &exams {
        table.add_row(vec![
            Cell::new(&exam.id),
            Cell::new(&exam.title),
            Cell::new(
                exam.exam_type
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(exam.question_count),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn history(exam_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = create_store(&config);
    let records = store.list_submissions(&exam_id).await?;

    if records.is_empty() {
        println!("No graded submissions for exam '{exam_id}'.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Record", "Graded at", "Candidate", "Correct", "Band"]);
    for record in &records {
        let report = &record.report;
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(record.candidate.as_deref().unwrap_or("-")),
            Cell::new(format!(
                "{}/{}",
                report.correct_answers, report.graded_questions
            )),
            Cell::new(
                report
                    .band_score
                    .map(|b| format!("{b:.1}"))
                    .unwrap_or_else(|| "-".into()),
            ),
        ]);
    }
    println!("{table}");
    println!("{} submission(s)", records.len());
    Ok(())
}
