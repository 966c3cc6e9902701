//! Cadence tracking: minimum-interval recurrence rules for movements and
//! pool entries.
//!
//! All date comparisons are whole-day differences on calendar dates.
//! Fractional or timezone-sensitive arithmetic would shift eligibility
//! across midnight boundaries.

use crate::store::CadenceStore;
use crate::{CadenceRecord, Catalog, Movement, MovementGroup, Result, WorkoutPoolEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default minimum intervals per movement class, in days
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CadenceDefaults {
    #[serde(default = "default_heavy_compound_days")]
    pub heavy_compound_days: u32,

    #[serde(default = "default_high_intensity_days")]
    pub high_intensity_days: u32,

    #[serde(default = "default_bodyweight_accessory_days")]
    pub bodyweight_accessory_days: u32,

    #[serde(default = "default_cardio_days")]
    pub cardio_days: u32,
}

impl Default for CadenceDefaults {
    fn default() -> Self {
        Self {
            heavy_compound_days: default_heavy_compound_days(),
            high_intensity_days: default_high_intensity_days(),
            bodyweight_accessory_days: default_bodyweight_accessory_days(),
            cardio_days: default_cardio_days(),
        }
    }
}

fn default_heavy_compound_days() -> u32 {
    7
}

fn default_high_intensity_days() -> u32 {
    2
}

fn default_bodyweight_accessory_days() -> u32 {
    3
}

fn default_cardio_days() -> u32 {
    1
}

/// Whole-day difference between two timestamps
///
/// Negative when `as_of` falls on an earlier calendar day than `earlier`.
pub fn days_since(earlier: DateTime<Utc>, as_of: DateTime<Utc>) -> i64 {
    (as_of.date_naive() - earlier.date_naive()).num_days()
}

/// Core availability rule
///
/// An entity is available when it has never been performed, or when at
/// least `cadence_days` whole days have elapsed since its last performance.
pub fn is_available(
    cadence_days: u32,
    last_performed: Option<DateTime<Utc>>,
    as_of: DateTime<Utc>,
) -> bool {
    match last_performed {
        None => true,
        Some(performed) => days_since(performed, as_of) >= i64::from(cadence_days),
    }
}

/// Derive the default minimum interval for a movement from its groups
///
/// Cardio recovers fastest, olympic lifts sit at the high-intensity
/// interval, heavy main lifts rest a full week, everything else falls to
/// the bodyweight/accessory interval.
pub fn default_interval_days(movement: &Movement, defaults: &CadenceDefaults) -> u32 {
    if movement.in_group(MovementGroup::Cardio) {
        return defaults.cardio_days;
    }
    if movement.in_group(MovementGroup::Olympic) {
        return defaults.high_intensity_days;
    }

    let heavy = movement.is_main_movement
        && [
            MovementGroup::Deadlift,
            MovementGroup::Squat,
            MovementGroup::Press,
            MovementGroup::Pull,
        ]
        .iter()
        .any(|g| movement.in_group(*g));

    if heavy {
        defaults.heavy_compound_days
    } else {
        defaults.bodyweight_accessory_days
    }
}

/// Create cadence records for catalog movements that have none
///
/// Idempotent: existing records are untouched. Returns the number of
/// records created.
pub fn initialize_defaults<S: CadenceStore>(
    store: &mut S,
    catalog: &Catalog,
    defaults: &CadenceDefaults,
) -> Result<usize> {
    let mut created = 0;

    let mut ids: Vec<_> = catalog.movements.keys().collect();
    ids.sort();

    for id in ids {
        if store.cadence(id)?.is_some() {
            continue;
        }
        let movement = &catalog.movements[id];
        let record = CadenceRecord {
            entity_id: id.clone(),
            minimum_interval_days: default_interval_days(movement, defaults),
            last_performed_at: None,
        };
        store.upsert_cadence(record)?;
        created += 1;
    }

    if created > 0 {
        tracing::info!("Initialized {} default cadence records", created);
    }

    Ok(created)
}

/// Record a performance of a movement at `as_of`
///
/// Upserts the movement's cadence record. A movement without an existing
/// record gets one with a zero interval; `initialize_defaults` is the
/// place where group-derived intervals are assigned.
pub fn mark_movement_performed<S: CadenceStore>(
    store: &mut S,
    movement_id: &str,
    as_of: DateTime<Utc>,
) -> Result<()> {
    let record = match store.cadence(movement_id)? {
        Some(existing) => CadenceRecord {
            last_performed_at: Some(as_of),
            ..existing
        },
        None => {
            tracing::debug!(
                "No cadence record for '{}', creating with zero interval",
                movement_id
            );
            CadenceRecord {
                entity_id: movement_id.to_string(),
                minimum_interval_days: 0,
                last_performed_at: Some(as_of),
            }
        }
    };

    store.upsert_cadence(record)
}

/// Whether a movement is individually eligible on `as_of`
///
/// A movement with no cadence record has never been performed and is
/// always eligible.
pub fn movement_available<S: CadenceStore>(
    store: &S,
    movement_id: &str,
    as_of: DateTime<Utc>,
) -> Result<bool> {
    Ok(match store.cadence(movement_id)? {
        None => true,
        Some(record) => is_available(
            record.minimum_interval_days,
            record.last_performed_at,
            as_of,
        ),
    })
}

/// Whether a pool entry is available on `as_of`
///
/// Checks the entry's enablement, its own cadence, and every movement it
/// references.
pub fn entry_available<S: CadenceStore>(
    store: &S,
    entry: &WorkoutPoolEntry,
    as_of: DateTime<Utc>,
) -> Result<bool> {
    if !entry.is_enabled {
        return Ok(false);
    }
    if !is_available(entry.cadence_days, entry.last_performed, as_of) {
        return Ok(false);
    }
    for slot in &entry.movements {
        if !movement_available(store, &slot.movement_id, as_of)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_never_performed_is_available() {
        assert!(is_available(7, None, day(1)));
    }

    #[test]
    fn test_cadence_boundary() {
        let performed = day(1);
        // 6 whole days elapsed - not yet eligible under a 7-day cadence
        assert!(!is_available(7, Some(performed), day(7)));
        // Exactly 7 whole days - eligible
        assert!(is_available(7, Some(performed), day(8)));
    }

    #[test]
    fn test_zero_cadence_always_available() {
        assert!(is_available(0, Some(day(1)), day(1)));
    }

    #[test]
    fn test_day_granularity_ignores_time_of_day() {
        let late_evening = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        let early_morning = Utc.with_ymd_and_hms(2024, 3, 2, 0, 15, 0).unwrap();
        // Less than an hour apart, but a full calendar day boundary crossed
        assert_eq!(days_since(late_evening, early_morning), 1);
        assert!(is_available(1, Some(late_evening), early_morning));
    }

    #[test]
    fn test_default_intervals_by_group() {
        let catalog = build_default_catalog();
        let defaults = CadenceDefaults::default();

        let deadlift = catalog.get("barbell_deadlift").unwrap();
        assert_eq!(default_interval_days(deadlift, &defaults), 7);

        let snatch = catalog.get("power_snatch").unwrap();
        assert_eq!(default_interval_days(snatch, &defaults), 2);

        let pushup = catalog.get("pushup").unwrap();
        assert_eq!(default_interval_days(pushup, &defaults), 3);

        let run = catalog.get("run").unwrap();
        assert_eq!(default_interval_days(run, &defaults), 1);
    }

    #[test]
    fn test_initialize_defaults_is_idempotent() {
        let catalog = build_default_catalog();
        let defaults = CadenceDefaults::default();
        let mut store = MemoryStore::default();

        let first = initialize_defaults(&mut store, &catalog, &defaults).unwrap();
        assert_eq!(first, catalog.movements.len());

        // Mutate one record, then re-run; it must survive untouched
        mark_movement_performed(&mut store, "burpee", day(5)).unwrap();
        let second = initialize_defaults(&mut store, &catalog, &defaults).unwrap();
        assert_eq!(second, 0);

        let record = store.cadence("burpee").unwrap().unwrap();
        assert_eq!(record.last_performed_at, Some(day(5)));
    }

    #[test]
    fn test_mark_performed_updates_record() {
        let mut store = MemoryStore::default();
        mark_movement_performed(&mut store, "kb_swing", day(3)).unwrap();

        let record = store.cadence("kb_swing").unwrap().unwrap();
        assert_eq!(record.last_performed_at, Some(day(3)));
        assert_eq!(record.minimum_interval_days, 0);
    }

    #[test]
    fn test_movement_availability_follows_record() {
        let mut store = MemoryStore::default();
        store
            .upsert_cadence(CadenceRecord {
                entity_id: "pullup".into(),
                minimum_interval_days: 3,
                last_performed_at: Some(day(1)),
            })
            .unwrap();

        assert!(!movement_available(&store, "pullup", day(2)).unwrap());
        assert!(movement_available(&store, "pullup", day(4)).unwrap());
        // No record at all - never performed, always available
        assert!(movement_available(&store, "situp", day(2)).unwrap());
    }

    #[test]
    fn test_days_since_spans_months() {
        let jan = Utc.with_ymd_and_hms(2024, 1, 31, 8, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 2, 20, 0, 0).unwrap();
        assert_eq!(days_since(jan, feb), 2);
    }
}
