//! The `bandscore types` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use bandscore_core::registry::{self, TestSection};

pub fn execute(section: Option<String>) -> Result<()> {
    let section = section
        .as_deref()
        .map(str::parse::<TestSection>)
        .transpose()?;

    let mut table = Table::new();
    table.set_header(vec!["Tag", "Name", "Section", "Grading"]);

    let mut count = 0;
    for info in registry::all_types() {
        if section.is_some() && info.section != section {
            continue;
        }
        count += 1;
        table.add_row(vec![
            Cell::new(info.tag),
            Cell::new(info.name),
            Cell::new(
                info.section
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "legacy".into()),
            ),
            Cell::new(info.grading),
        ]);
    }

    println!("{table}");
    println!("{count} question type(s)");
    Ok(())
}
