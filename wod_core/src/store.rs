//! Storage collaborators for cadence records and the workout pool.
//!
//! The engine never touches storage globals; it is handed a store value
//! implementing the narrow `CadenceStore`/`PoolStore` contracts. Two
//! implementations ship here: an in-memory store (tests, ephemeral runs)
//! and a JSON file store with locked atomic saves.

use crate::{CadenceRecord, Error, Result, WorkoutPoolEntry};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Read/write contract for cadence records
pub trait CadenceStore {
    fn cadence(&self, entity_id: &str) -> Result<Option<CadenceRecord>>;
    fn upsert_cadence(&mut self, record: CadenceRecord) -> Result<()>;
}

/// Read/write contract for workout-pool entries
pub trait PoolStore {
    fn all_entries(&self) -> Result<Vec<WorkoutPoolEntry>>;
    fn enabled_entries(&self) -> Result<Vec<WorkoutPoolEntry>>;
    fn entry(&self, id: &str) -> Result<Option<WorkoutPoolEntry>>;
    fn create_entry(&mut self, entry: WorkoutPoolEntry) -> Result<()>;
    fn update_entry(&mut self, entry: WorkoutPoolEntry) -> Result<()>;
}

/// Serialized store contents: all cadence records plus the full pool
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub cadence: HashMap<String, CadenceRecord>,

    #[serde(default)]
    pub entries: HashMap<String, WorkoutPoolEntry>,
}

fn sorted_entries(state: &StoreState) -> Vec<WorkoutPoolEntry> {
    let mut entries: Vec<_> = state.entries.values().cloned().collect();
    entries.sort_by(|a, b| a.id.cmp(&b.id));
    entries
}

fn create_entry_in(state: &mut StoreState, entry: WorkoutPoolEntry) -> Result<()> {
    if state.entries.contains_key(&entry.id) {
        return Err(Error::Storage(format!(
            "pool entry '{}' already exists",
            entry.id
        )));
    }
    state.entries.insert(entry.id.clone(), entry);
    Ok(())
}

fn update_entry_in(state: &mut StoreState, entry: WorkoutPoolEntry) -> Result<()> {
    if !state.entries.contains_key(&entry.id) {
        return Err(Error::Storage(format!(
            "pool entry '{}' does not exist",
            entry.id
        )));
    }
    state.entries.insert(entry.id.clone(), entry);
    Ok(())
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory store, used by tests and ephemeral invocations
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: StoreState,
}

impl CadenceStore for MemoryStore {
    fn cadence(&self, entity_id: &str) -> Result<Option<CadenceRecord>> {
        Ok(self.state.cadence.get(entity_id).cloned())
    }

    fn upsert_cadence(&mut self, record: CadenceRecord) -> Result<()> {
        self.state.cadence.insert(record.entity_id.clone(), record);
        Ok(())
    }
}

impl PoolStore for MemoryStore {
    fn all_entries(&self) -> Result<Vec<WorkoutPoolEntry>> {
        Ok(sorted_entries(&self.state))
    }

    fn enabled_entries(&self) -> Result<Vec<WorkoutPoolEntry>> {
        Ok(sorted_entries(&self.state)
            .into_iter()
            .filter(|e| e.is_enabled)
            .collect())
    }

    fn entry(&self, id: &str) -> Result<Option<WorkoutPoolEntry>> {
        Ok(self.state.entries.get(id).cloned())
    }

    fn create_entry(&mut self, entry: WorkoutPoolEntry) -> Result<()> {
        create_entry_in(&mut self.state, entry)
    }

    fn update_entry(&mut self, entry: WorkoutPoolEntry) -> Result<()> {
        update_entry_in(&mut self.state, entry)
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// JSON file store with shared-lock loads and locked atomic saves
///
/// Mutations land in memory; `save` persists the whole state through a
/// locked temp file renamed over the original, so a mark-performed batch
/// (entry timestamp plus every movement record) becomes durable together
/// or not at all.
pub struct FileStore {
    path: PathBuf,
    state: StoreState,
}

impl FileStore {
    /// Open a store file, degrading to an empty state when the file is
    /// missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = Self::load_state(&path)?;
        Ok(Self { path, state })
    }

    fn load_state(path: &Path) -> Result<StoreState> {
        if !path.exists() {
            tracing::info!("No store file found at {:?}, starting empty", path);
            return Ok(StoreState::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open store file {:?}: {}. Starting empty.", path, e);
                return Ok(StoreState::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock store file {:?}: {}. Starting empty.", path, e);
            return Ok(StoreState::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read store file {:?}: {}. Starting empty.", path, e);
            return Ok(StoreState::default());
        }

        file.unlock()?;

        match serde_json::from_str::<StoreState>(&contents) {
            Ok(state) => {
                tracing::debug!(
                    "Loaded store from {:?} ({} entries, {} cadence records)",
                    path,
                    state.entries.len(),
                    state.cadence.len()
                );
                Ok(state)
            }
            Err(e) => {
                tracing::warn!("Failed to parse store file {:?}: {}. Starting empty.", path, e);
                Ok(StoreState::default())
            }
        }
    }

    /// Persist the full state atomically
    ///
    /// Writes to a locked temp file in the same directory, syncs, then
    /// renames over the original.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "store path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(&self.state)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved store to {:?}", self.path);
        Ok(())
    }

    /// Load the store, apply a mutation, and save it back
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut store = Self::open(path)?;
        f(&mut store)?;
        store.save()?;
        Ok(store)
    }
}

impl CadenceStore for FileStore {
    fn cadence(&self, entity_id: &str) -> Result<Option<CadenceRecord>> {
        Ok(self.state.cadence.get(entity_id).cloned())
    }

    fn upsert_cadence(&mut self, record: CadenceRecord) -> Result<()> {
        self.state.cadence.insert(record.entity_id.clone(), record);
        Ok(())
    }
}

impl PoolStore for FileStore {
    fn all_entries(&self) -> Result<Vec<WorkoutPoolEntry>> {
        Ok(sorted_entries(&self.state))
    }

    fn enabled_entries(&self) -> Result<Vec<WorkoutPoolEntry>> {
        Ok(sorted_entries(&self.state)
            .into_iter()
            .filter(|e| e.is_enabled)
            .collect())
    }

    fn entry(&self, id: &str) -> Result<Option<WorkoutPoolEntry>> {
        Ok(self.state.entries.get(id).cloned())
    }

    fn create_entry(&mut self, entry: WorkoutPoolEntry) -> Result<()> {
        create_entry_in(&mut self.state, entry)
    }

    fn update_entry(&mut self, entry: WorkoutPoolEntry) -> Result<()> {
        update_entry_in(&mut self.state, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FormatConfig, Intensity, PoolMovement, WorkoutFormat};
    use chrono::Utc;

    fn entry(id: &str, enabled: bool) -> WorkoutPoolEntry {
        WorkoutPoolEntry {
            id: id.into(),
            name: format!("Entry {}", id),
            description: String::new(),
            format: WorkoutFormat::Amrap,
            format_config: FormatConfig::Amrap {
                time_cap_minutes: 10,
            },
            intensity: Intensity::Medium,
            movements: vec![PoolMovement::reps("burpee", 10)],
            duration_minutes: 10,
            rounds: None,
            cadence_days: 3,
            is_enabled: enabled,
            last_performed: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::default();
        store.create_entry(entry("a", true)).unwrap();

        let loaded = store.entry("a").unwrap().unwrap();
        assert_eq!(loaded.id, "a");
        assert!(store.entry("missing").unwrap().is_none());
    }

    #[test]
    fn test_create_duplicate_entry_fails() {
        let mut store = MemoryStore::default();
        store.create_entry(entry("a", true)).unwrap();
        assert!(store.create_entry(entry("a", true)).is_err());
    }

    #[test]
    fn test_update_missing_entry_fails() {
        let mut store = MemoryStore::default();
        assert!(store.update_entry(entry("ghost", true)).is_err());
    }

    #[test]
    fn test_enabled_filter() {
        let mut store = MemoryStore::default();
        store.create_entry(entry("a", true)).unwrap();
        store.create_entry(entry("b", false)).unwrap();

        assert_eq!(store.all_entries().unwrap().len(), 2);
        let enabled = store.enabled_entries().unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id, "a");
    }

    #[test]
    fn test_entries_sorted_by_id() {
        let mut store = MemoryStore::default();
        store.create_entry(entry("zulu", true)).unwrap();
        store.create_entry(entry("alpha", true)).unwrap();

        let ids: Vec<_> = store
            .all_entries()
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["alpha", "zulu"]);
    }

    #[test]
    fn test_file_store_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pool.json");

        let mut store = FileStore::open(&path).unwrap();
        store.create_entry(entry("a", true)).unwrap();
        store
            .upsert_cadence(CadenceRecord {
                entity_id: "burpee".into(),
                minimum_interval_days: 3,
                last_performed_at: None,
            })
            .unwrap();
        store.save().unwrap();

        let reloaded = FileStore::open(&path).unwrap();
        assert_eq!(reloaded.all_entries().unwrap().len(), 1);
        assert!(reloaded.cadence("burpee").unwrap().is_some());
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp_dir.path().join("nonexistent.json")).unwrap();
        assert!(store.all_entries().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_file_starts_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pool.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(store.all_entries().unwrap().is_empty());
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pool.json");

        let store = FileStore::open(&path).unwrap();
        store.save().unwrap();

        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "pool.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only pool.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pool.json");

        FileStore::open(&path).unwrap().save().unwrap();

        FileStore::update(&path, |store| store.create_entry(entry("a", true))).unwrap();

        let reloaded = FileStore::open(&path).unwrap();
        assert_eq!(reloaded.all_entries().unwrap().len(), 1);
    }
}
