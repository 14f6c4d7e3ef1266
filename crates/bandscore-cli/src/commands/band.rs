//! The `bandscore band` command.

use anyhow::Result;

pub fn execute(percentage: f64) -> Result<()> {
    anyhow::ensure!(
        (0.0..=100.0).contains(&percentage),
        "percentage must be between 0 and 100"
    );
    println!("{:.1}", bandscore_core::band_score(percentage));
    Ok(())
}
