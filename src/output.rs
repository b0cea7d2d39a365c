//! Output formatting and persistence for processed scorecards.
//!
//! Supports the indented JSON summary document, a flat CSV of indicator
//! details, and logging a per-group overview.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::scoring::types::{GroupAggregate, Summary};
use crate::source::Row;

/// Writes `value` as JSON indented with four spaces, replacing any existing file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    value
        .serialize(&mut ser)
        .with_context(|| format!("failed to write JSON to {}", path.display()))?;

    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Persists a processed [`Summary`].
pub fn write_summary(path: &Path, summary: &Summary) -> Result<()> {
    debug!(path = %path.display(), groups = summary.groups.len(), "Writing summary");
    write_json(path, summary)
}

/// Loads a [`Summary`] previously written by [`write_summary`].
pub fn read_summary(path: &Path) -> Result<Summary> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let summary = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a processed scorecard", path.display()))?;
    Ok(summary)
}

/// Writes normalized input rows as a JSON array of records.
pub fn write_records(path: &Path, rows: &[Row]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing records");
    write_json(path, &rows)
}

/// Writes every indicator detail as one CSV row, with the header written once.
///
/// The columns are the normalized record columns, so the file can be fed
/// back in as a record source.
pub fn write_details_csv(path: &Path, summary: &Summary) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let records = summary.records();
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = records.len(), "Details CSV written");
    Ok(())
}

fn display_name(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or("(none)")
}

/// Logs one line per group.
pub fn log_group(group: &GroupAggregate) {
    info!(
        group = display_name(&group.name),
        achieved = group.total_achieved,
        maximum = group.total_maximum,
        percentage = group.percentage,
        indicators = group.indicators.len(),
        active = group.is_active(),
        "Group"
    );
}

/// Logs the overall totals followed by every group.
pub fn log_summary(summary: &Summary) {
    info!(
        score = summary.overall_achieved,
        max_score = summary.overall_maximum,
        percentage = summary.overall_percentage,
        rank = %summary.overall_rank,
        groups = summary.groups.len(),
        "Scorecard"
    );

    for group in &summary.groups {
        log_group(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::scoring::aggregate::aggregate;
    use crate::source::load_records;
    use serde_json::Value;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample() -> Summary {
        aggregate(vec![
            Record::new("G1", "I1", 50.0, 100.0).with_placement("Vendas", "Ativo"),
            Record::new("G1", "I1", 30.0, 50.0),
            Record::new("G2", "I2", 5.0, 10.0).with_sub_group("SG", "SC"),
        ])
    }

    #[test]
    fn test_log_summary_does_not_panic() {
        log_summary(&sample());
    }

    #[test]
    fn test_summary_document_shape() {
        let path = temp_path("scorecard_rater_test_shape.json");
        let _ = fs::remove_file(&path);

        write_summary(Path::new(&path), &sample()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n    \"overall_score\""));

        let doc: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(doc["overall_score"], Value::from(85.0));
        assert_eq!(doc["overall_max_score"], Value::from(160.0));
        assert_eq!(doc["overall_rank"], Value::from("STANDARD"));

        let group = &doc["groups"][0];
        assert_eq!(group["name"], Value::from("G1"));
        assert_eq!(group["total_atingida"], Value::from(80.0));
        assert_eq!(group["total_maxima"], Value::from(150.0));
        assert_eq!(group["percentage"], Value::from(53.33));

        let detail = &group["indicators"][0]["details"][0];
        assert_eq!(detail["Departamento"], Value::from("Vendas"));
        assert_eq!(detail["Pontuação Atingida"], Value::from(50.0));
        assert_eq!(detail["Sub-Grupo"], Value::Null);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_summary_round_trip() {
        let path = temp_path("scorecard_rater_test_round_trip.json");
        let summary = sample();

        write_summary(Path::new(&path), &summary).unwrap();
        let loaded = read_summary(Path::new(&path)).unwrap();
        assert_eq!(loaded, summary);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_summary_rejects_other_documents() {
        let path = temp_path("scorecard_rater_test_not_summary.json");
        fs::write(&path, "[]").unwrap();

        assert!(read_summary(Path::new(&path)).is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_details_csv_writes_header_once() {
        let path = temp_path("scorecard_rater_test_details.csv");
        let _ = fs::remove_file(&path);

        write_details_csv(Path::new(&path), &sample()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines.iter().filter(|l| l.starts_with("Grupo,")).count(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_details_csv_reaggregates() {
        let path = temp_path("scorecard_rater_test_details_again.csv");
        let summary = sample();

        write_details_csv(Path::new(&path), &summary).unwrap();
        let again = aggregate(load_records(Path::new(&path)).unwrap());
        assert_eq!(again, summary);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_records() {
        let path = temp_path("scorecard_rater_test_records.json");
        let mut row = Row::new();
        row.insert("Grupo".to_string(), Value::from("G1"));
        row.insert("Pontuação_Atingida".to_string(), Value::from(4));

        write_records(Path::new(&path), &[row]).unwrap();

        let records = load_records(Path::new(&path)).unwrap();
        assert_eq!(records, vec![Record {
            group: Some("G1".to_string()),
            achieved: 4.0,
            ..Default::default()
        }]);

        fs::remove_file(&path).unwrap();
    }
}
