//! Console display and YAML persistence of results.

use std::io::Write;
use std::path::Path;

use allergex_nlp::ResultRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Result;

/// On-disk layout of a results file: one record list per input text.
#[derive(Debug, Serialize, Deserialize)]
pub struct SavedResults {
    pub date: DateTime<Utc>,
    pub result: Vec<Vec<ResultRecord>>,
}

pub fn print_records<W: Write>(mut out: W, records: &[ResultRecord]) -> Result<()> {
    writeln!(out, "Species with Allergens and Sentiment (with positions):")?;
    for record in records {
        writeln!(out, "{record}")?;
    }
    Ok(())
}

pub fn save_results(path: &Path, results: Vec<Vec<ResultRecord>>) -> Result<()> {
    let saved = SavedResults {
        date: Utc::now(),
        result: results,
    };
    let file = std::fs::File::create(path)?;
    serde_yaml::to_writer(file, &saved)?;
    info!("Saved result to {}", path.display());
    Ok(())
}
