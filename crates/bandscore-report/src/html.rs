//! HTML report generator.
//!
//! Produces self-contained HTML files with all CSS/JS inlined.

use std::path::Path;

use anyhow::Result;

use bandscore_core::engine::BatchReport;
use bandscore_core::record::SubmissionRecord;
use bandscore_core::statistics::TypeStats;

use crate::{format_answer, format_band, format_percentage, status_label};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn head(html: &mut String, title: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");
}

fn tail(html: &mut String, raw_json: String) {
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(&raw_json));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");
    html.push_str("</body>\n</html>");
}

/// Generate an HTML report for one graded submission.
pub fn generate_html(record: &SubmissionRecord) -> String {
    let report = &record.report;
    let mut html = String::new();
    head(
        &mut html,
        &format!("bandscore report: {}", display_title(record)),
    );

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(display_title(record))));
    html.push_str(&format!(
        "<p class=\"meta\">Exam: <strong>{}</strong> | Candidate: {} | {} questions | {}</p>\n",
        html_escape(&record.exam.id),
        html_escape(record.candidate.as_deref().unwrap_or("anonymous")),
        report.total_questions,
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    if report.auto_graded {
        html.push_str("<table class=\"summary\">\n");
        html.push_str("<thead><tr><th>Correct</th><th>Graded</th><th>Percentage</th><th>Band</th><th>Pending manual</th></tr></thead>\n");
        html.push_str(&format!(
            "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td class=\"band\">{}</td><td>{}</td></tr></tbody></table>\n",
            report.correct_answers,
            report.graded_questions,
            format_percentage(report.percentage),
            format_band(report.band_score),
            report.pending_manual(),
        ));
    } else {
        html.push_str("<p class=\"manual\">This exam is graded manually by an examiner.</p>\n");
    }
    html.push_str("</section>\n");

    if !report.detailed_results.is_empty() {
        html.push_str("<section class=\"results\">\n");
        html.push_str("<h2>Questions</h2>\n");
        html.push_str("<table class=\"results-table\" id=\"results\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Type</th><th onclick=\"sortTable(2)\">Answer</th><th onclick=\"sortTable(3)\">Key</th><th onclick=\"sortTable(4)\">Result</th><th onclick=\"sortTable(5)\">Method</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for (index, result) in &report.detailed_results {
            let class = match result.is_correct {
                Some(true) => "pass",
                Some(false) => "fail",
                None => "manual",
            };
            html.push_str(&format!(
                "<tr class=\"{class}\"><td>{index}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&result.question_type),
                html_escape(&format_answer(result.student_answer.as_ref())),
                html_escape(&format_answer(result.correct_answer.as_ref())),
                status_label(result),
                html_escape(&result.grading_method),
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    tail(
        &mut html,
        serde_json::to_string_pretty(record).unwrap_or_default(),
    );
    html
}

/// Generate an HTML report for a batch run.
pub fn generate_batch_html(batch: &BatchReport) -> String {
    let stats = &batch.stats;
    let mut html = String::new();
    head(&mut html, "bandscore batch report");

    html.push_str("<header>\n");
    html.push_str("<h1>bandscore batch report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} submissions | {} failed | {}ms | {}</p>\n",
        stats.submissions,
        batch.failures.len(),
        batch.duration_ms,
        batch.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Submissions</th><th>Auto-graded</th><th>Mean %</th><th>Mean band</th><th>Pending manual</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></tbody></table>\n",
        stats.submissions,
        stats.auto_graded,
        format_percentage(stats.mean_percentage),
        format_band(stats.mean_band),
        stats.pending_manual,
    ));
    if !stats.band_distribution.is_empty() {
        html.push_str("<h3>Band distribution</h3>\n");
        html.push_str(&generate_band_chart(&stats.band_distribution));
    }
    html.push_str("</section>\n");

    if !stats.per_type.is_empty() {
        let mut types: Vec<(&String, &TypeStats)> = stats.per_type.iter().collect();
        types.sort_by(|a, b| a.0.cmp(b.0));

        html.push_str("<section class=\"types\">\n");
        html.push_str("<h2>Accuracy by question type</h2>\n");
        html.push_str("<table>\n");
        html.push_str("<thead><tr><th>Type</th><th>Graded</th><th>Correct</th><th>Accuracy</th></tr></thead>\n<tbody>\n");
        for (tag, t) in types {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                html_escape(tag),
                t.graded,
                t.correct,
                t.accuracy * 100.0
            ));
        }
        html.push_str("</tbody></table>\n</section>\n");
    }

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Submissions</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Exam</th><th onclick=\"sortTable(1)\">Candidate</th><th onclick=\"sortTable(2)\">Correct</th><th onclick=\"sortTable(3)\">Percentage</th><th onclick=\"sortTable(4)\">Band</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for record in &batch.records {
        let report = &record.report;
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}/{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&record.exam.id),
            html_escape(record.candidate.as_deref().unwrap_or("-")),
            report.correct_answers,
            report.graded_questions,
            format_percentage(report.percentage),
            format_band(report.band_score),
        ));
    }
    html.push_str("</tbody></table>\n");

    if !batch.failures.is_empty() {
        html.push_str("<h2>Failures</h2>\n<table>\n");
        html.push_str("<thead><tr><th>Submission</th><th>Exam</th><th>Error</th></tr></thead>\n<tbody>\n");
        for f in &batch.failures {
            html.push_str(&format!(
                "<tr class=\"fail\"><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&f.label),
                html_escape(&f.exam_id),
                html_escape(&f.error)
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    tail(
        &mut html,
        serde_json::to_string_pretty(batch).unwrap_or_default(),
    );
    html
}

/// Write an HTML report for one submission to a file.
pub fn write_html_report(record: &SubmissionRecord, path: &Path) -> Result<()> {
    write_file(path, generate_html(record))
}

/// Write an HTML report for a batch to a file.
pub fn write_batch_html_report(batch: &BatchReport, path: &Path) -> Result<()> {
    write_file(path, generate_batch_html(batch))
}

fn write_file(path: &Path, html: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn display_title(record: &SubmissionRecord) -> &str {
    if record.exam.title.is_empty() {
        &record.exam.id
    } else {
        &record.exam.title
    }
}

fn generate_band_chart(distribution: &std::collections::BTreeMap<String, usize>) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 60;

    let max_count = distribution.values().copied().max().unwrap_or(1).max(1);
    // Highest band first.
    let bands: Vec<(&String, usize)> = distribution.iter().rev().map(|(b, c)| (b, *c)).collect();
    let total_height = bands.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (band, count)) in bands.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = count * max_width / max_count;
        let color = match band.parse::<f64>().unwrap_or(0.0) {
            b if b >= 7.0 => "#22c55e",
            b if b >= 5.5 => "#eab308",
            _ => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(band)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{label_width}\" y=\"{y}\" width=\"{width}\" height=\"{bar_height}\" fill=\"{color}\" rx=\"4\"/>\n"
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{count}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --manual: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --manual: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.band { font-size: 1.5rem; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.manual { background: var(--manual); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
