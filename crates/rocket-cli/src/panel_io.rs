//! CSV panels: one series per row, no header

use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer};
use ndarray::Array2;

/// Read a panel, skipping a leading label column when `labelled`
pub fn read_panel(path: &Path, labelled: bool) -> Result<Vec<Vec<f64>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open panel {}", path.display()))?;

    let skip = usize::from(labelled);
    let mut panel = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("bad CSV record at row {}", row))?;
        let series = record
            .iter()
            .skip(skip)
            .enumerate()
            .map(|(col, field)| {
                field
                    .parse::<f64>()
                    .with_context(|| format!("row {} column {}: {:?} is not a number", row, col, field))
            })
            .collect::<Result<Vec<f64>>>()?;
        panel.push(series);
    }

    Ok(panel)
}

/// Write a feature matrix, one row per series
pub fn write_features(path: &Path, features: &Array2<f64>) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for row in features.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}
