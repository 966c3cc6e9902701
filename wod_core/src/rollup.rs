//! CSV rollup for archiving journaled performances.
//!
//! Converts the append-only journal into a long-term CSV archive without
//! losing records on a partial failure.

use crate::{PerformedWorkout, Result};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV archive
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    entry_id: String,
    performed_at: String,
    duration_minutes: Option<u32>,
    notes: Option<String>,
}

impl From<&PerformedWorkout> for CsvRow {
    fn from(performed: &PerformedWorkout) -> Self {
        CsvRow {
            id: performed.id.to_string(),
            entry_id: performed.entry_id.clone(),
            performed_at: performed.performed_at.to_rfc3339(),
            duration_minutes: performed.duration_minutes,
            notes: performed.notes.clone(),
        }
    }
}

/// Roll up journal records into CSV and archive the journal atomically
///
/// The CSV is fsynced before the journal is renamed to `.processed`, so a
/// crash between the two steps can duplicate records but never lose them
/// (reads deduplicate by id). Returns the number of records processed.
pub fn journal_to_csv_and_archive(journal_path: &Path, csv_path: &Path) -> Result<usize> {
    let records = crate::journal::read_performed(journal_path)?;

    if records.is_empty() {
        tracing::info!("No performances in journal to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only when the file is brand new
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in &records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} performances to CSV", records.len());

    let processed_path = journal_path.with_extension("jsonl.processed");
    std::fs::rename(journal_path, &processed_path)?;

    tracing::info!("Archived journal to {:?}", processed_path);

    Ok(records.len())
}

/// Remove processed journal files in the given directory
pub fn cleanup_processed_journals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed journal: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journal files", count);
    }

    Ok(count)
}
