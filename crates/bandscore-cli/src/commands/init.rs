//! The `bandscore init` command.

use std::path::Path;

use anyhow::Result;

const FILES: &[(&str, &str)] = &[
    ("bandscore.toml", SAMPLE_CONFIG),
    ("bandscore-data/exams/listening-sample.json", EXAMPLE_EXAM),
    ("incoming/listening-sample-answers.json", EXAMPLE_SUBMISSION),
];

pub fn execute() -> Result<()> {
    for (path, content) in FILES {
        let path = Path::new(path);
        if path.exists() {
            println!("{} already exists, skipping.", path.display());
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }

    println!("\nNext steps:");
    println!("  1. Run: bandscore validate --exam bandscore-data/exams");
    println!(
        "  2. Run: bandscore grade --exam bandscore-data/exams/listening-sample.json --answers incoming/listening-sample-answers.json"
    );
    println!("  3. Run: bandscore batch --submissions incoming");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# bandscore configuration

# Root of the exam store. Overridden by BANDSCORE_DATA_DIR.
data_dir = "./bandscore-data"
exams_dir = "exams"
submissions_dir = "submissions"

parallelism = 4
band_scoring = true
output_dir = "./bandscore-results"
"#;

const EXAMPLE_EXAM: &str = r#"{
  "id": "listening-sample",
  "title": "Listening Sample Test",
  "exam_type": "listening",
  "questions": [
    {
      "index": 1,
      "type": "form_completion",
      "payload": { "prompt": "Name of caller", "answer_key": "Sarah Wilson", "max_words": 2 }
    },
    {
      "index": 2,
      "type": "multiple_choice_single_listening",
      "payload": { "options": ["A", "B", "C"], "answer_key": "B" }
    },
    {
      "index": 3,
      "type": "multiple_choice_multiple_listening",
      "payload": { "options": ["A", "B", "C", "D", "E"], "answer_key": ["A", "D"] }
    },
    {
      "index": 4,
      "type": "matching_listening",
      "payload": { "answer_key": { "Dr. Smith": "C", "Ms. Jones": "A" } }
    },
    {
      "index": 5,
      "type": "map_labeling",
      "payload": { "answer_key": "F" }
    }
  ]
}
"#;

const EXAMPLE_SUBMISSION: &str = r#"{
  "exam_id": "listening-sample",
  "candidate": "sample-candidate",
  "answers": {
    "1": "sarah  wilson",
    "2": "b",
    "3": ["D", "A"],
    "4": { "Ms. Jones": "a", "Dr. Smith": "C" },
    "5": "E"
  }
}
"#;
