//! Aggregate statistics across many graded submissions.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::grader::GradingReport;

/// Accuracy for one question type across a cohort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeStats {
    pub graded: u32,
    pub correct: u32,
    /// `correct / graded`, 0.0 when nothing was graded.
    pub accuracy: f64,
}

/// Statistics over a set of submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortStats {
    pub submissions: usize,
    /// Submissions that were auto-graded (writing exams excluded).
    pub auto_graded: usize,
    pub mean_percentage: Option<f64>,
    pub mean_band: Option<f64>,
    /// Number of submissions per band, keyed by the band formatted as `"6.5"`.
    pub band_distribution: BTreeMap<String, usize>,
    /// Per question type tag.
    pub per_type: HashMap<String, TypeStats>,
    /// Questions waiting for an examiner, across all submissions.
    pub pending_manual: usize,
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Compute cohort statistics from grading reports.
pub fn compute_cohort_stats<'a>(reports: impl IntoIterator<Item = &'a GradingReport>) -> CohortStats {
    let mut submissions = 0usize;
    let mut auto_graded = 0usize;
    let mut percentages = Vec::new();
    let mut bands = Vec::new();
    let mut band_distribution = BTreeMap::new();
    let mut per_type: HashMap<String, TypeStats> = HashMap::new();
    let mut pending_manual = 0usize;

    for report in reports {
        submissions += 1;
        if report.auto_graded {
            auto_graded += 1;
        }
        if let Some(p) = report.percentage {
            percentages.push(p);
        }
        if let Some(band) = report.band_score {
            bands.push(band);
            *band_distribution.entry(format!("{band:.1}")).or_insert(0) += 1;
        }
        pending_manual += report.pending_manual();

        for result in report.detailed_results.values() {
            let Some(correct) = result.is_correct else {
                continue;
            };
            let stats = per_type.entry(result.question_type.clone()).or_default();
            stats.graded += 1;
            if correct {
                stats.correct += 1;
            }
        }
    }

    for stats in per_type.values_mut() {
        stats.accuracy = if stats.graded == 0 {
            0.0
        } else {
            stats.correct as f64 / stats.graded as f64
        };
    }

    CohortStats {
        submissions,
        auto_graded,
        mean_percentage: mean(&percentages),
        mean_band: mean(&bands),
        band_distribution,
        per_type,
        pending_manual,
    }
}
