//! Core domain types for the workout pool system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Movements, functional groups and difficulty
//! - Workout formats and their typed configurations
//! - Workout pool entries and cadence records
//! - Performed-workout journal records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Movement Types
// ============================================================================

/// Functional group a movement belongs to.
///
/// Groups are committed once at catalog construction; nothing downstream
/// re-derives them from names or id substrings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MovementGroup {
    Deadlift,
    Squat,
    Press,
    Pull,
    Olympic,
    Bodyweight,
    Cardio,
    Kettlebell,
    Gymnastic,
    Accessory,
    Core,
}

impl MovementGroup {
    /// All groups, in a stable order
    pub const ALL: [MovementGroup; 11] = [
        MovementGroup::Deadlift,
        MovementGroup::Squat,
        MovementGroup::Press,
        MovementGroup::Pull,
        MovementGroup::Olympic,
        MovementGroup::Bodyweight,
        MovementGroup::Cardio,
        MovementGroup::Kettlebell,
        MovementGroup::Gymnastic,
        MovementGroup::Accessory,
        MovementGroup::Core,
    ];
}

/// Movement difficulty, ordered from easiest to hardest
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// An immutable catalog record for a single movement
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Movement {
    pub id: String,
    pub name: String,
    pub groups: Vec<MovementGroup>,
    pub required_equipment: Vec<String>,
    pub difficulty: Difficulty,
    pub is_main_movement: bool,
    pub reference_url: Option<String>,
}

impl Movement {
    /// Whether the movement carries the given functional group tag
    pub fn in_group(&self, group: MovementGroup) -> bool {
        self.groups.contains(&group)
    }
}

// ============================================================================
// Workout Format Types
// ============================================================================

/// Workout format family
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutFormat {
    Emom,
    Amrap,
    RoundsForTime,
    ForTime,
    ForReps,
    Intervals,
    SteadyState,
}

/// Workout intensity level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

/// Typed per-format settings, validated at construction
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormatConfig {
    Emom {
        interval_seconds: u32,
        total_minutes: u32,
    },
    Amrap {
        time_cap_minutes: u32,
    },
    RoundsForTime {
        rounds: u32,
    },
    ForTime {
        time_cap_minutes: u32,
    },
    ForReps {
        sets: u32,
    },
    Intervals {
        work_seconds: u32,
        rest_seconds: u32,
        rounds: u32,
    },
    SteadyState {
        total_minutes: u32,
    },
}

impl FormatConfig {
    /// The format family this configuration belongs to
    pub fn format(&self) -> WorkoutFormat {
        match self {
            FormatConfig::Emom { .. } => WorkoutFormat::Emom,
            FormatConfig::Amrap { .. } => WorkoutFormat::Amrap,
            FormatConfig::RoundsForTime { .. } => WorkoutFormat::RoundsForTime,
            FormatConfig::ForTime { .. } => WorkoutFormat::ForTime,
            FormatConfig::ForReps { .. } => WorkoutFormat::ForReps,
            FormatConfig::Intervals { .. } => WorkoutFormat::Intervals,
            FormatConfig::SteadyState { .. } => WorkoutFormat::SteadyState,
        }
    }

    /// Validate that all timing/count fields are non-zero
    pub fn validate(&self) -> std::result::Result<(), String> {
        let ok = match *self {
            FormatConfig::Emom {
                interval_seconds,
                total_minutes,
            } => interval_seconds > 0 && total_minutes > 0,
            FormatConfig::Amrap { time_cap_minutes } => time_cap_minutes > 0,
            FormatConfig::RoundsForTime { rounds } => rounds > 0,
            FormatConfig::ForTime { time_cap_minutes } => time_cap_minutes > 0,
            FormatConfig::ForReps { sets } => sets > 0,
            FormatConfig::Intervals {
                work_seconds,
                rest_seconds,
                rounds,
            } => work_seconds > 0 && rest_seconds > 0 && rounds > 0,
            FormatConfig::SteadyState { total_minutes } => total_minutes > 0,
        };

        if ok {
            Ok(())
        } else {
            Err(format!("format config has zero-valued field: {:?}", self))
        }
    }
}

// ============================================================================
// Workout Pool Entry Types
// ============================================================================

/// One movement slot inside a pool entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PoolMovement {
    pub movement_id: String,
    pub reps: u32,
    pub time_seconds: Option<u32>,
    pub weight: Option<f64>,
}

impl PoolMovement {
    /// Rep-scheme slot with no time or load component
    pub fn reps(movement_id: impl Into<String>, reps: u32) -> Self {
        Self {
            movement_id: movement_id.into(),
            reps,
            time_seconds: None,
            weight: None,
        }
    }

    /// Timed slot (e.g., a cardio interval or a hold)
    pub fn timed(movement_id: impl Into<String>, time_seconds: u32) -> Self {
        Self {
            movement_id: movement_id.into(),
            reps: 0,
            time_seconds: Some(time_seconds),
            weight: None,
        }
    }
}

/// A predefined workout in the pool
///
/// Entries are created in bulk by the pool generator and thereafter mutated
/// only by enable/disable toggles and mark-performed events. Disabling is
/// the soft-delete mechanism; entries are never removed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutPoolEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub format: WorkoutFormat,
    pub format_config: FormatConfig,
    pub intensity: Intensity,
    pub movements: Vec<PoolMovement>,
    pub duration_minutes: u32,
    pub rounds: Option<u32>,
    pub cadence_days: u32,
    pub is_enabled: bool,
    pub last_performed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutPoolEntry {
    /// Validate internal consistency (format/config agreement, movement list)
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.id.is_empty() {
            return Err("pool entry has empty id".into());
        }
        if self.movements.is_empty() {
            return Err(format!("pool entry '{}' has no movements", self.id));
        }
        if self.format_config.format() != self.format {
            return Err(format!(
                "pool entry '{}' format {:?} does not match config {:?}",
                self.id, self.format, self.format_config
            ));
        }
        self.format_config.validate()?;
        Ok(())
    }
}

// ============================================================================
// Cadence Record Types
// ============================================================================

/// Recurrence state for a trackable entity (movement id or pool-entry id)
///
/// `minimum_interval_days == 0` means always eligible.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CadenceRecord {
    pub entity_id: String,
    pub minimum_interval_days: u32,
    pub last_performed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Journal Types
// ============================================================================

/// A recorded performance of a pool entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PerformedWorkout {
    pub id: Uuid,
    pub entry_id: String,
    pub performed_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The complete catalog of movements
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub movements: HashMap<String, Movement>,
}

impl Catalog {
    /// Look up a movement by id
    pub fn get(&self, id: &str) -> Option<&Movement> {
        self.movements.get(id)
    }

    /// Whether the catalog contains no movements
    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Movements carrying the given group tag, sorted by id for
    /// deterministic downstream iteration
    pub fn in_group(&self, group: MovementGroup) -> Vec<&Movement> {
        let mut movements: Vec<_> = self
            .movements
            .values()
            .filter(|m| m.in_group(group))
            .collect();
        movements.sort_by(|a, b| a.id.cmp(&b.id));
        movements
    }
}
