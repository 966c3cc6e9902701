//! Selection engine: choose today's workout from the eligible pool.
//!
//! Selection combines three time-decayed signals (entry recency, cadence
//! overrun, movement variety) plus a small jitter, then picks with
//! weighted randomness among the top-scoring bracket. All durable state
//! lives in the storage collaborator; the engine only carries its RNG.

use crate::cadence;
use crate::store::{CadenceStore, PoolStore};
use crate::{Catalog, Error, Intensity, Result, WorkoutFormat, WorkoutPoolEntry};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Preferences for a selection request
///
/// Equipment is a hard constraint; intensity and format are soft and fall
/// back to the full eligible set when nothing matches.
#[derive(Clone, Debug, Default)]
pub struct SelectionPrefs {
    pub equipment: Option<Vec<String>>,
    pub intensity: Option<Intensity>,
    pub format: Option<WorkoutFormat>,
}

/// Scoring and bracket constants
///
/// The never-performed scores keep the source behavior of strongly
/// preferring untouched entries and movements; exact values are tunable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectionTuning {
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,

    #[serde(default = "default_overrun_weight")]
    pub overrun_weight: f64,

    #[serde(default = "default_variety_weight")]
    pub variety_weight: f64,

    #[serde(default = "default_never_performed_entry_score")]
    pub never_performed_entry_score: f64,

    #[serde(default = "default_never_performed_movement_score")]
    pub never_performed_movement_score: f64,

    #[serde(default = "default_jitter_max")]
    pub jitter_max: f64,

    #[serde(default = "default_bracket_ratio")]
    pub bracket_ratio: f64,

    #[serde(default = "default_bracket_min")]
    pub bracket_min: usize,
}

impl Default for SelectionTuning {
    fn default() -> Self {
        Self {
            recency_weight: default_recency_weight(),
            overrun_weight: default_overrun_weight(),
            variety_weight: default_variety_weight(),
            never_performed_entry_score: default_never_performed_entry_score(),
            never_performed_movement_score: default_never_performed_movement_score(),
            jitter_max: default_jitter_max(),
            bracket_ratio: default_bracket_ratio(),
            bracket_min: default_bracket_min(),
        }
    }
}

fn default_recency_weight() -> f64 {
    2.0
}

fn default_overrun_weight() -> f64 {
    3.0
}

fn default_variety_weight() -> f64 {
    1.0
}

fn default_never_performed_entry_score() -> f64 {
    100.0
}

fn default_never_performed_movement_score() -> f64 {
    50.0
}

fn default_jitter_max() -> f64 {
    5.0
}

fn default_bracket_ratio() -> f64 {
    0.25
}

fn default_bracket_min() -> usize {
    3
}

/// The selection engine
///
/// Holds the injected random source. Constructed without one, every
/// operation degrades to the deterministic highest-scoring choice.
pub struct Selector {
    tuning: SelectionTuning,
    rng: Option<StdRng>,
}

impl Selector {
    /// Deterministic selector: zero jitter, always the top candidate
    pub fn new(tuning: SelectionTuning) -> Self {
        Self { tuning, rng: None }
    }

    /// Production selector seeded from OS entropy
    pub fn from_entropy(tuning: SelectionTuning) -> Self {
        Self {
            tuning,
            rng: Some(StdRng::from_entropy()),
        }
    }

    /// Reproducible selector for tests and `--seed` runs
    pub fn from_seed(tuning: SelectionTuning, seed: u64) -> Self {
        Self {
            tuning,
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    /// Pick a workout for `as_of`, or `None` when nothing is eligible
    pub fn select_workout<S: CadenceStore + PoolStore>(
        &mut self,
        store: &S,
        catalog: &Catalog,
        as_of: DateTime<Utc>,
        prefs: &SelectionPrefs,
    ) -> Result<Option<WorkoutPoolEntry>> {
        let eligible = eligible_entries(store, catalog, as_of, prefs)?;
        if eligible.is_empty() {
            tracing::info!("No eligible pool entries for {}", as_of.date_naive());
            return Ok(None);
        }

        // Intensity/format preferences are soft: an empty match falls back
        // to the full eligible set instead of returning nothing.
        let narrowed: Vec<WorkoutPoolEntry> = eligible
            .iter()
            .filter(|e| prefs.intensity.map_or(true, |i| e.intensity == i))
            .filter(|e| prefs.format.map_or(true, |f| e.format == f))
            .cloned()
            .collect();

        let candidates = if narrowed.is_empty() {
            tracing::debug!("Preferences matched no entries, using full eligible set");
            eligible
        } else {
            narrowed
        };

        let mut scored = Vec::with_capacity(candidates.len());
        for entry in candidates {
            let base = score_entry(store, &entry, as_of, &self.tuning)?;
            let jitter = match &mut self.rng {
                Some(rng) if self.tuning.jitter_max > 0.0 => {
                    rng.gen_range(0.0..self.tuning.jitter_max)
                }
                _ => 0.0,
            };
            scored.push((entry, base + jitter));
        }

        // Highest score first; ties broken by id so runs without an RNG
        // are fully deterministic.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });

        let bracket = bracket_size(scored.len(), &self.tuning);
        let index = match &mut self.rng {
            Some(rng) => rng.gen_range(0..bracket),
            None => 0,
        };

        let (chosen, score) = &scored[index];
        tracing::info!(
            "Selected '{}' (score {:.1}, bracket {} of {})",
            chosen.id,
            score,
            bracket,
            scored.len()
        );

        Ok(Some(chosen.clone()))
    }
}

/// Top bracket: `max(bracket_min, ceil(bracket_ratio × N))`, clamped to N
fn bracket_size(n: usize, tuning: &SelectionTuning) -> usize {
    let scaled = (tuning.bracket_ratio * n as f64).ceil() as usize;
    scaled.max(tuning.bracket_min).min(n).max(1)
}

/// Entries passing the hard constraints: enabled, equipment-satisfiable,
/// entry cadence met, and every referenced movement individually eligible
fn eligible_entries<S: CadenceStore + PoolStore>(
    store: &S,
    catalog: &Catalog,
    as_of: DateTime<Utc>,
    prefs: &SelectionPrefs,
) -> Result<Vec<WorkoutPoolEntry>> {
    let mut eligible = Vec::new();

    for entry in store.enabled_entries()? {
        if let Some(ref available) = prefs.equipment {
            match required_equipment(catalog, &entry) {
                Some(required) => {
                    if !required.iter().all(|eq| available.contains(eq)) {
                        continue;
                    }
                }
                None => continue,
            }
        }

        if cadence::entry_available(store, &entry, as_of)? {
            eligible.push(entry);
        }
    }

    Ok(eligible)
}

/// Combined equipment required by an entry's movements
///
/// `None` when a movement id cannot be resolved against the catalog; such
/// an entry is treated as unsatisfiable and logged.
fn required_equipment(catalog: &Catalog, entry: &WorkoutPoolEntry) -> Option<BTreeSet<String>> {
    let mut required = BTreeSet::new();
    for slot in &entry.movements {
        match catalog.get(&slot.movement_id) {
            Some(movement) => {
                required.extend(movement.required_equipment.iter().cloned());
            }
            None => {
                tracing::warn!(
                    "Pool entry '{}' references unknown movement '{}'",
                    entry.id,
                    slot.movement_id
                );
                return None;
            }
        }
    }
    Some(required)
}

/// Scalar score for one candidate entry (before jitter)
fn score_entry<S: CadenceStore>(
    store: &S,
    entry: &WorkoutPoolEntry,
    as_of: DateTime<Utc>,
    tuning: &SelectionTuning,
) -> Result<f64> {
    let recency = match entry.last_performed {
        None => tuning.never_performed_entry_score,
        Some(performed) => {
            let days = cadence::days_since(performed, as_of).max(0) as f64;
            let mut score = tuning.recency_weight * days;
            let overrun = days - f64::from(entry.cadence_days);
            if overrun >= 0.0 {
                score += tuning.overrun_weight * overrun;
            }
            score
        }
    };

    let mut variety_total = 0.0;
    for slot in &entry.movements {
        let last = store
            .cadence(&slot.movement_id)?
            .and_then(|r| r.last_performed_at);
        variety_total += match last {
            None => tuning.never_performed_movement_score,
            Some(performed) => {
                tuning.variety_weight * cadence::days_since(performed, as_of).max(0) as f64
            }
        };
    }
    let variety = if entry.movements.is_empty() {
        0.0
    } else {
        variety_total / entry.movements.len() as f64
    };

    Ok(recency + variety)
}

/// Record a completed workout as one logical unit
///
/// Updates the entry's `last_performed` and every referenced movement's
/// cadence record. Mutations land in the store's in-memory state; the
/// file-backed store persists them together in a single atomic save.
pub fn mark_performed<S: CadenceStore + PoolStore>(
    store: &mut S,
    entry_id: &str,
    as_of: DateTime<Utc>,
) -> Result<()> {
    let Some(mut entry) = store.entry(entry_id)? else {
        return Err(Error::Selection(format!("unknown pool entry '{}'", entry_id)));
    };

    entry.last_performed = Some(as_of);
    entry.updated_at = as_of;
    store.update_entry(entry.clone())?;

    for slot in &entry.movements {
        cadence::mark_movement_performed(store, &slot.movement_id, as_of)?;
    }

    tracing::info!(
        "Marked '{}' performed at {} ({} movements updated)",
        entry_id,
        as_of.date_naive(),
        entry.movements.len()
    );

    Ok(())
}
