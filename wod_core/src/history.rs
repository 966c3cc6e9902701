//! Performance history loading with a rolling window.
//!
//! Merges the live journal with the CSV archive so the CLI can show what
//! was done recently regardless of rollup timing.

use crate::{PerformedWorkout, Result};
use chrono::{DateTime, Duration, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// CSV row format for reading archived performances
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    entry_id: String,
    performed_at: String,
    duration_minutes: Option<u32>,
    notes: Option<String>,
}

impl TryFrom<CsvRow> for PerformedWorkout {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let performed_at = DateTime::parse_from_rfc3339(&row.performed_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(PerformedWorkout {
            id,
            entry_id: row.entry_id,
            performed_at,
            duration_minutes: row.duration_minutes,
            notes: row.notes,
        })
    }
}

/// Load performances from the last N days from both journal and CSV
///
/// Returns records sorted by performed_at (newest first), deduplicated
/// by id across the two sources.
pub fn load_recent_performed(
    journal_path: &Path,
    csv_path: &Path,
    days: i64,
) -> Result<Vec<PerformedWorkout>> {
    let cutoff = Utc::now() - Duration::days(days);
    let mut performed = Vec::new();
    let mut seen_ids = HashSet::new();

    if journal_path.exists() {
        for record in crate::journal::read_performed(journal_path)? {
            if record.performed_at >= cutoff {
                seen_ids.insert(record.id);
                performed.push(record);
            }
        }
        tracing::debug!("Loaded {} performances from journal", performed.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for record in load_performed_from_csv(csv_path)? {
            if record.performed_at >= cutoff && !seen_ids.contains(&record.id) {
                seen_ids.insert(record.id);
                performed.push(record);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} performances from CSV", csv_count);
    }

    performed.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));

    tracing::info!(
        "Loaded {} total performances from last {} days",
        performed.len(),
        days
    );

    Ok(performed)
}

/// Load all performances from a CSV archive
fn load_performed_from_csv(path: &Path) -> Result<Vec<PerformedWorkout>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut performed = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match PerformedWorkout::try_from(row) {
                Ok(record) => performed.push(record),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(performed)
}

/// Most recent performance of a given pool entry, if any
pub fn find_last_performed<'a>(
    performed: &'a [PerformedWorkout],
    entry_id: &str,
) -> Option<&'a PerformedWorkout> {
    // Records are sorted newest first
    performed.iter().find(|p| p.entry_id == entry_id)
}
