use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use wod_core::*;

#[derive(Parser)]
#[command(name = "wodpick")]
#[command(about = "Workout pool selection system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick today's workout from the pool (default)
    Today {
        /// Preferred intensity (low, medium, high)
        #[arg(long)]
        intensity: Option<String>,

        /// Preferred format (emom, amrap, rounds_for_time, for_time,
        /// for_reps, intervals, steady_state)
        #[arg(long)]
        format: Option<String>,

        /// Available equipment override, comma-separated
        #[arg(long, value_delimiter = ',')]
        equipment: Option<Vec<String>>,

        /// Fixed RNG seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,

        /// Dry run - show the pick without logging
        #[arg(long)]
        dry_run: bool,

        /// Auto-complete (for testing) - automatically mark as done
        #[arg(long)]
        auto_complete: bool,
    },

    /// Populate the pool from the movement catalog
    Generate,

    /// List pool entries
    List {
        /// Include disabled entries
        #[arg(long)]
        all: bool,
    },

    /// Enable a pool entry
    Enable { id: String },

    /// Disable a pool entry
    Disable { id: String },

    /// Show recently performed workouts
    History {
        /// Window in days
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Roll up journal records to CSV
    Rollup {
        /// Clean up processed journal files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

struct Paths {
    store: PathBuf,
    journal: PathBuf,
    csv: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        Self {
            store: data_dir.join("pool.json"),
            journal: data_dir.join("journal").join("performed.jsonl"),
            csv: data_dir.join("performed.csv"),
        }
    }
}

fn main() -> Result<()> {
    wod_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Today {
            intensity,
            format,
            equipment,
            seed,
            dry_run,
            auto_complete,
        }) => cmd_today(
            &data_dir,
            intensity,
            format,
            equipment,
            seed,
            dry_run,
            auto_complete,
            &config,
        ),
        Some(Commands::Generate) => cmd_generate(&data_dir, &config),
        Some(Commands::List { all }) => cmd_list(&data_dir, all),
        Some(Commands::Enable { id }) => cmd_toggle(&data_dir, &id, true),
        Some(Commands::Disable { id }) => cmd_toggle(&data_dir, &id, false),
        Some(Commands::History { days }) => cmd_history(&data_dir, days),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&data_dir, cleanup),
        None => cmd_today(&data_dir, None, None, None, None, false, false, &config),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_today(
    data_dir: &Path,
    intensity: Option<String>,
    format: Option<String>,
    equipment: Option<Vec<String>>,
    seed: Option<u64>,
    dry_run: bool,
    auto_complete: bool,
    config: &Config,
) -> Result<()> {
    const MAX_SKIPS: usize = 10;

    std::fs::create_dir_all(data_dir)?;
    let paths = Paths::new(data_dir);

    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    let mut store = FileStore::open(&paths.store)?;

    // First run populates the pool; any later run is a no-op here
    let created = generate_pool(&mut store, catalog, &config.cadence, chrono::Utc::now())?;
    if created > 0 {
        store.save()?;
        println!("Generated {} workouts into the pool.", created);
    }

    let prefs = SelectionPrefs {
        equipment: Some(equipment.unwrap_or_else(|| config.equipment.available.clone())),
        intensity: intensity.as_deref().and_then(parse_intensity),
        format: format.as_deref().and_then(parse_format),
    };

    let tuning = config.selection.tuning.clone();
    let mut selector = match seed.or(config.selection.seed) {
        Some(seed) => Selector::from_seed(tuning, seed),
        None => Selector::from_entropy(tuning),
    };

    let now = chrono::Utc::now();
    let mut skipped_ids = std::collections::HashSet::new();
    let mut rerolls = 0;

    loop {
        let Some(entry) = selector.select_workout(&store, catalog, now, &prefs)? else {
            println!("No workout available today - everything is resting or filtered out.");
            return Ok(());
        };

        // A re-pick can land on an already-skipped entry; bounded retries
        // keep a one-entry bracket from looping forever.
        if skipped_ids.contains(&entry.id) {
            rerolls += 1;
            if rerolls >= MAX_SKIPS {
                println!("\nNo further alternatives today.");
                return Ok(());
            }
            continue;
        }
        rerolls = 0;

        display_entry(&entry, catalog);

        if dry_run {
            println!("\n[Dry run - not logging workout]");
            return Ok(());
        }

        let action = if auto_complete {
            UserAction::Done
        } else {
            prompt_user_action()?
        };

        match action {
            UserAction::Skip => {
                skipped_ids.insert(entry.id.clone());
                println!("\nShowing next option...\n");
                continue;
            }

            UserAction::Done => {
                // Entry timestamp and every movement record move together;
                // the save below persists them as one unit.
                mark_performed(&mut store, &entry.id, now)?;
                store.save()?;

                let performed = PerformedWorkout {
                    id: uuid::Uuid::new_v4(),
                    entry_id: entry.id.clone(),
                    performed_at: now,
                    duration_minutes: Some(entry.duration_minutes),
                    notes: None,
                };
                let mut journal = JsonlJournal::new(&paths.journal);
                journal.append(&performed)?;

                println!("\n✓ Workout logged!");
                return Ok(());
            }
        }
    }
}

fn cmd_generate(data_dir: &Path, config: &Config) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let paths = Paths::new(data_dir);

    let catalog = get_default_catalog();
    let mut store = FileStore::open(&paths.store)?;

    let created = generate_pool(&mut store, catalog, &config.cadence, chrono::Utc::now())?;
    if created > 0 {
        store.save()?;
        println!("✓ Generated {} workouts into the pool.", created);
    } else {
        println!("Pool already populated - nothing to generate.");
    }

    Ok(())
}

fn cmd_list(data_dir: &Path, all: bool) -> Result<()> {
    let paths = Paths::new(data_dir);
    let store = FileStore::open(&paths.store)?;

    let entries = if all {
        store.all_entries()?
    } else {
        store.enabled_entries()?
    };

    if entries.is_empty() {
        println!("Pool is empty - run `wodpick generate` first.");
        return Ok(());
    }

    println!("{} pool entries:", entries.len());
    for entry in entries {
        let last = entry
            .last_performed
            .map(|t| t.date_naive().to_string())
            .unwrap_or_else(|| "never".into());
        let state = if entry.is_enabled { "" } else { " [disabled]" };
        println!(
            "  {:<45} {:?}/{:?}, every {}d, last {}{}",
            entry.id, entry.format, entry.intensity, entry.cadence_days, last, state
        );
    }

    Ok(())
}

fn cmd_toggle(data_dir: &Path, id: &str, enable: bool) -> Result<()> {
    let paths = Paths::new(data_dir);

    FileStore::update(&paths.store, |store| {
        let Some(mut entry) = store.entry(id)? else {
            return Err(Error::Storage(format!("pool entry '{}' does not exist", id)));
        };
        entry.is_enabled = enable;
        entry.updated_at = chrono::Utc::now();
        store.update_entry(entry)
    })?;

    println!(
        "✓ {} '{}'",
        if enable { "Enabled" } else { "Disabled" },
        id
    );
    Ok(())
}

fn cmd_history(data_dir: &Path, days: i64) -> Result<()> {
    let paths = Paths::new(data_dir);

    let performed = load_recent_performed(&paths.journal, &paths.csv, days)?;

    if performed.is_empty() {
        println!("No workouts performed in the last {} days.", days);
        return Ok(());
    }

    println!("{} workouts in the last {} days:", performed.len(), days);
    for record in performed {
        let duration = record
            .duration_minutes
            .map(|m| format!(" ({} min)", m))
            .unwrap_or_default();
        println!(
            "  {}  {}{}",
            record.performed_at.date_naive(),
            record.entry_id,
            duration
        );
    }

    Ok(())
}

fn cmd_rollup(data_dir: &Path, cleanup: bool) -> Result<()> {
    let paths = Paths::new(data_dir);

    if !paths.journal.exists() {
        println!("No journal file found - nothing to roll up.");
        return Ok(());
    }

    let count = wod_core::rollup::journal_to_csv_and_archive(&paths.journal, &paths.csv)?;

    println!("✓ Rolled up {} performances to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        if let Some(journal_dir) = paths.journal.parent() {
            let cleaned = wod_core::rollup::cleanup_processed_journals(journal_dir)?;
            if cleaned > 0 {
                println!("✓ Cleaned up {} processed journal files", cleaned);
            }
        }
    }

    Ok(())
}

fn parse_intensity(s: &str) -> Option<Intensity> {
    match s.to_lowercase().as_str() {
        "low" => Some(Intensity::Low),
        "medium" => Some(Intensity::Medium),
        "high" => Some(Intensity::High),
        other => {
            eprintln!("Unknown intensity: {}. Ignoring preference.", other);
            None
        }
    }
}

fn parse_format(s: &str) -> Option<WorkoutFormat> {
    match s.to_lowercase().as_str() {
        "emom" => Some(WorkoutFormat::Emom),
        "amrap" => Some(WorkoutFormat::Amrap),
        "rounds_for_time" | "rft" => Some(WorkoutFormat::RoundsForTime),
        "for_time" => Some(WorkoutFormat::ForTime),
        "for_reps" => Some(WorkoutFormat::ForReps),
        "intervals" => Some(WorkoutFormat::Intervals),
        "steady_state" | "steady" => Some(WorkoutFormat::SteadyState),
        other => {
            eprintln!("Unknown format: {}. Ignoring preference.", other);
            None
        }
    }
}

fn format_line(config: &FormatConfig) -> String {
    match *config {
        FormatConfig::Emom {
            interval_seconds,
            total_minutes,
        } => format!(
            "EMOM: every {}s for {} minutes",
            interval_seconds, total_minutes
        ),
        FormatConfig::Amrap { time_cap_minutes } => {
            format!("AMRAP: {} minutes", time_cap_minutes)
        }
        FormatConfig::RoundsForTime { rounds } => format!("{} rounds for time", rounds),
        FormatConfig::ForTime { time_cap_minutes } => {
            format!("For time, {} minute cap", time_cap_minutes)
        }
        FormatConfig::ForReps { sets } => format!("{} working sets", sets),
        FormatConfig::Intervals {
            work_seconds,
            rest_seconds,
            rounds,
        } => format!(
            "{} intervals: {}s on / {}s off",
            rounds, work_seconds, rest_seconds
        ),
        FormatConfig::SteadyState { total_minutes } => {
            format!("Steady state: {} minutes", total_minutes)
        }
    }
}

fn display_entry(entry: &WorkoutPoolEntry, catalog: &Catalog) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  TODAY'S WORKOUT ({:?})", entry.intensity);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", entry.name);
    println!("  {}", format_line(&entry.format_config));
    println!("  ~{} minutes", entry.duration_minutes);
    println!();

    for slot in &entry.movements {
        let name = catalog
            .get(&slot.movement_id)
            .map(|m| m.name.as_str())
            .unwrap_or(slot.movement_id.as_str());

        if let Some(seconds) = slot.time_seconds {
            println!("  → {} for {}s", name, seconds);
        } else {
            println!("  → {} x {}", slot.reps, name);
        }
    }

    if !entry.description.is_empty() {
        println!();
        println!("  ℹ {}", entry.description);
    }

    println!();
}

enum UserAction {
    Done,
    Skip,
}

fn prompt_user_action() -> Result<UserAction> {
    println!("─────────────────────────────────────────");
    println!("Press Enter when done");
    println!("  's' + Enter to skip and see another option");
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let action = match input.trim().to_lowercase().as_str() {
        "s" => UserAction::Skip,
        _ => UserAction::Done,
    };

    Ok(action)
}
