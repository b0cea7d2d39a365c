use crate::output::{read_summary, write_details_csv, write_records, write_summary};
use crate::scoring::aggregate::aggregate;
use crate::scoring::filter::GroupFilter;
use crate::scoring::types::{GroupAggregate, Summary};
use crate::source::{load_records, load_rows};
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Converts a spreadsheet (or CSV) into a JSON array of records with
/// normalized column names. Returns the number of records written.
#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn convert_file(input: &Path, output: &Path) -> Result<usize> {
    let rows = load_rows(input)?;
    write_records(output, &rows)?;

    info!(records = rows.len(), "Records written");
    Ok(rows.len())
}

/// Loads records, aggregates them, and writes the summary document and,
/// when requested, the flat details CSV.
#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn process_file(input: &Path, output: &Path, details_csv: Option<&Path>) -> Result<Summary> {
    let records = load_records(input)?;
    let summary = aggregate(records);

    write_summary(output, &summary)?;
    if let Some(path) = details_csv {
        write_details_csv(path, &summary)?;
        info!(path = %path.display(), "Details CSV written");
    }

    info!(
        score = summary.overall_achieved,
        percentage = summary.overall_percentage,
        rank = %summary.overall_rank,
        "Scorecard processed"
    );
    Ok(summary)
}

/// Loads a processed summary and returns the groups matching `filter`.
#[tracing::instrument(skip_all, fields(input = %input.display()))]
pub fn report_file(input: &Path, filter: &GroupFilter) -> Result<(Summary, Vec<GroupAggregate>)> {
    let summary = read_summary(input)?;
    let groups: Vec<GroupAggregate> = filter.apply(&summary).into_iter().cloned().collect();

    info!(
        total = summary.groups.len(),
        matching = groups.len(),
        "Groups selected"
    );
    Ok((summary, groups))
}
