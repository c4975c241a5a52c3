use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::WriterBuilder;
use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use super::record::{QueryRecord, HEADERS};
use crate::diet::{DietSelector, ALL_DIETS_LABEL};

/// Name of the file produced when exporting a filtered view.
pub const EXPORT_FILE_NAME: &str = "filtered_recipe_history.csv";

/// Predicates for narrowing the history. A `None`/empty field disables that predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub diet: DietSelector,
    pub keyword: Option<String>,
}

impl HistoryQuery {
    fn active_keyword(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
    }
}

fn record_matches(record: &QueryRecord, query: &HistoryQuery, keyword: Option<&str>) -> bool {
    let day = record.timestamp.date();
    if query.start_date.is_some_and(|start| day < start) {
        return false;
    }
    if query.end_date.is_some_and(|end| day > end) {
        return false;
    }
    if !query.diet.matches(record.diet) {
        return false;
    }
    match keyword {
        Some(keyword) => record.query.to_lowercase().contains(keyword),
        None => true,
    }
}

/// Records matching every predicate, newest first. Equal timestamps keep reverse file order.
pub fn filter(records: &[QueryRecord], query: &HistoryQuery) -> Vec<QueryRecord> {
    let keyword = query.active_keyword();
    let mut matched: Vec<QueryRecord> = records
        .iter()
        .rev()
        .filter(|record| record_matches(record, query, keyword.as_deref()))
        .cloned()
        .collect();
    matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matched
}

/// Earliest and latest day present, used as the default date range.
pub fn date_bounds(records: &[QueryRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|r| r.timestamp.date()).min()?;
    let max = records.iter().map(|r| r.timestamp.date()).max()?;
    Some((min, max))
}

/// `"All"` followed by the distinct diet labels present, sorted.
pub fn diet_options(records: &[QueryRecord]) -> Vec<String> {
    let labels: BTreeSet<&str> = records.iter().map(|r| r.diet.label()).collect();
    std::iter::once(ALL_DIETS_LABEL)
        .chain(labels)
        .map(str::to_string)
        .collect()
}

pub fn export_csv<W: io::Write>(records: &[QueryRecord], writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(HEADERS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush().context("Failed to flush exported history")?;
    Ok(())
}

/// Writes `records` to `dir/filtered_recipe_history.csv` and returns that path.
pub fn export_to_dir(records: &[QueryRecord], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(EXPORT_FILE_NAME);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create export file {:?}", path))?;
    export_csv(records, file).with_context(|| format!("Failed to export history to {:?}", path))?;
    Ok(path)
}
