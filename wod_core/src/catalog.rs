//! Default catalog of movements.
//!
//! This module provides the built-in movements the pool generator and
//! selection engine operate over. Functional group tags are committed here,
//! at construction, and are never re-derived from names later.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of movements
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn add(movements: &mut HashMap<String, Movement>, movement: Movement) {
    movements.insert(movement.id.clone(), movement);
}

fn build_default_catalog_internal() -> Catalog {
    use Difficulty::*;
    use MovementGroup::*;

    let mut movements = HashMap::new();

    // ========================================================================
    // Barbell lifts
    // ========================================================================

    add(
        &mut movements,
        Movement {
            id: "barbell_deadlift".into(),
            name: "Barbell Deadlift".into(),
            groups: vec![Deadlift],
            required_equipment: vec!["barbell".into()],
            difficulty: Advanced,
            is_main_movement: true,
            reference_url: Some("https://www.youtube.com/watch?v=op9kVnSso6Q".into()),
        },
    );

    add(
        &mut movements,
        Movement {
            id: "romanian_deadlift".into(),
            name: "Romanian Deadlift".into(),
            groups: vec![Deadlift],
            required_equipment: vec!["barbell".into()],
            difficulty: Intermediate,
            is_main_movement: true,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "back_squat".into(),
            name: "Back Squat".into(),
            groups: vec![Squat],
            required_equipment: vec!["barbell".into(), "rack".into()],
            difficulty: Advanced,
            is_main_movement: true,
            reference_url: Some("https://www.youtube.com/watch?v=ultWZbUMPL8".into()),
        },
    );

    add(
        &mut movements,
        Movement {
            id: "front_squat".into(),
            name: "Front Squat".into(),
            groups: vec![Squat],
            required_equipment: vec!["barbell".into(), "rack".into()],
            difficulty: Advanced,
            is_main_movement: true,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "overhead_press".into(),
            name: "Overhead Press".into(),
            groups: vec![Press],
            required_equipment: vec!["barbell".into()],
            difficulty: Intermediate,
            is_main_movement: true,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "push_press".into(),
            name: "Push Press".into(),
            groups: vec![Press],
            required_equipment: vec!["barbell".into()],
            difficulty: Intermediate,
            is_main_movement: true,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "bench_press".into(),
            name: "Bench Press".into(),
            groups: vec![Press],
            required_equipment: vec!["barbell".into(), "bench".into()],
            difficulty: Intermediate,
            is_main_movement: true,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "barbell_row".into(),
            name: "Barbell Row".into(),
            groups: vec![Pull],
            required_equipment: vec!["barbell".into()],
            difficulty: Intermediate,
            is_main_movement: true,
            reference_url: None,
        },
    );

    // ========================================================================
    // Olympic lifts
    // ========================================================================

    add(
        &mut movements,
        Movement {
            id: "power_clean".into(),
            name: "Power Clean".into(),
            groups: vec![Olympic],
            required_equipment: vec!["barbell".into()],
            difficulty: Advanced,
            is_main_movement: true,
            reference_url: Some("https://www.youtube.com/watch?v=KjGvwQl8tis".into()),
        },
    );

    add(
        &mut movements,
        Movement {
            id: "power_snatch".into(),
            name: "Power Snatch".into(),
            groups: vec![Olympic],
            required_equipment: vec!["barbell".into()],
            difficulty: Advanced,
            is_main_movement: true,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "clean_and_jerk".into(),
            name: "Clean and Jerk".into(),
            groups: vec![Olympic],
            required_equipment: vec!["barbell".into()],
            difficulty: Advanced,
            is_main_movement: true,
            reference_url: None,
        },
    );

    // ========================================================================
    // Kettlebell movements
    // ========================================================================

    add(
        &mut movements,
        Movement {
            id: "kb_swing".into(),
            name: "Kettlebell Swing".into(),
            groups: vec![Kettlebell, Cardio],
            required_equipment: vec!["kettlebell".into()],
            difficulty: Intermediate,
            is_main_movement: true,
            reference_url: Some("https://www.youtube.com/watch?v=YSxHifyI6s8".into()),
        },
    );

    add(
        &mut movements,
        Movement {
            id: "goblet_squat".into(),
            name: "Goblet Squat".into(),
            groups: vec![Kettlebell, Squat],
            required_equipment: vec!["kettlebell".into()],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "kb_deadlift".into(),
            name: "Kettlebell Deadlift".into(),
            groups: vec![Kettlebell, Deadlift],
            required_equipment: vec!["kettlebell".into()],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "turkish_getup".into(),
            name: "Turkish Get-Up".into(),
            groups: vec![Kettlebell, Accessory],
            required_equipment: vec!["kettlebell".into()],
            difficulty: Advanced,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "farmer_carry".into(),
            name: "Farmer Carry".into(),
            groups: vec![Accessory, Kettlebell],
            required_equipment: vec!["kettlebell".into()],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    // ========================================================================
    // Bodyweight and gymnastic movements
    // ========================================================================

    add(
        &mut movements,
        Movement {
            id: "burpee".into(),
            name: "Burpee".into(),
            groups: vec![Bodyweight, Cardio],
            required_equipment: vec![],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: Some("https://www.youtube.com/watch?v=TU8QYVW0gDU".into()),
        },
    );

    add(
        &mut movements,
        Movement {
            id: "air_squat".into(),
            name: "Air Squat".into(),
            groups: vec![Bodyweight, Squat],
            required_equipment: vec![],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "pushup".into(),
            name: "Push-Up".into(),
            groups: vec![Bodyweight, Press],
            required_equipment: vec![],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "walking_lunge".into(),
            name: "Walking Lunge".into(),
            groups: vec![Bodyweight, Accessory],
            required_equipment: vec![],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "situp".into(),
            name: "Sit-Up".into(),
            groups: vec![Core, Bodyweight],
            required_equipment: vec![],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "plank".into(),
            name: "Plank".into(),
            groups: vec![Core, Bodyweight],
            required_equipment: vec![],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "hollow_hold".into(),
            name: "Hollow Hold".into(),
            groups: vec![Core, Gymnastic],
            required_equipment: vec![],
            difficulty: Intermediate,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "pullup".into(),
            name: "Pull-Up".into(),
            groups: vec![Pull, Gymnastic],
            required_equipment: vec!["pullup_bar".into()],
            difficulty: Intermediate,
            is_main_movement: true,
            reference_url: Some("https://www.youtube.com/watch?v=eGo4IYlbE5g".into()),
        },
    );

    add(
        &mut movements,
        Movement {
            id: "ring_row".into(),
            name: "Ring Row".into(),
            groups: vec![Pull, Gymnastic],
            required_equipment: vec!["rings".into()],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "ring_dip".into(),
            name: "Ring Dip".into(),
            groups: vec![Gymnastic, Press],
            required_equipment: vec!["rings".into()],
            difficulty: Advanced,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "handstand_pushup".into(),
            name: "Handstand Push-Up".into(),
            groups: vec![Gymnastic, Press],
            required_equipment: vec![],
            difficulty: Advanced,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "toes_to_bar".into(),
            name: "Toes-to-Bar".into(),
            groups: vec![Gymnastic, Core],
            required_equipment: vec!["pullup_bar".into()],
            difficulty: Intermediate,
            is_main_movement: false,
            reference_url: None,
        },
    );

    // ========================================================================
    // Cardio movements
    // ========================================================================

    add(
        &mut movements,
        Movement {
            id: "row_erg".into(),
            name: "Rowing (Erg)".into(),
            groups: vec![Cardio],
            required_equipment: vec!["rower".into()],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "assault_bike".into(),
            name: "Assault Bike".into(),
            groups: vec![Cardio],
            required_equipment: vec!["bike".into()],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "run".into(),
            name: "Running".into(),
            groups: vec![Cardio],
            required_equipment: vec![],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    add(
        &mut movements,
        Movement {
            id: "jump_rope".into(),
            name: "Jump Rope (Double-Unders)".into(),
            groups: vec![Cardio],
            required_equipment: vec!["jump_rope".into()],
            difficulty: Intermediate,
            is_main_movement: false,
            reference_url: None,
        },
    );

    // ========================================================================
    // Accessory movements
    // ========================================================================

    add(
        &mut movements,
        Movement {
            id: "band_pull_apart".into(),
            name: "Band Pull-Apart".into(),
            groups: vec![Accessory],
            required_equipment: vec!["bands".into()],
            difficulty: Beginner,
            is_main_movement: false,
            reference_url: None,
        },
    );

    Catalog { movements }
}

impl Catalog {
    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, movement) in &self.movements {
            if id.is_empty() || movement.id.is_empty() {
                errors.push("Movement has empty ID".to_string());
            }
            if id != &movement.id {
                errors.push(format!(
                    "Movement key '{}' doesn't match movement.id '{}'",
                    id, movement.id
                ));
            }
            if movement.name.is_empty() {
                errors.push(format!("Movement '{}' has empty name", id));
            }
            if movement.groups.is_empty() {
                errors.push(format!("Movement '{}' has no functional groups", id));
            }
        }

        // Every functional group should be represented, otherwise whole
        // template families silently fall away at generation time.
        for group in MovementGroup::ALL {
            if !self.movements.values().any(|m| m.in_group(group)) {
                errors.push(format!("Catalog has no movements in group {:?}", group));
            }
        }

        errors
    }
}
