use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use study_groups::config::SchedulerConfig;
use study_groups::display::{print_schedule, write_outcome_json_file, write_schedule_csv_file};
use study_groups::logger;
use study_groups::parser::load_roster;
use study_groups::schedule::run_scheduler;

#[derive(Parser)]
#[command(name = "study-groups")]
#[command(about = "Assigns group leaders and students to weekly time slots")]
struct Cli {
    /// Roster CSV, one row per person
    roster: PathBuf,

    /// JSON configuration file (slot definitions, column names, search limits)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Time budget for the leader search, in seconds
    #[arg(long, env = "SCHEDULER_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Random seed for reproducible runs
    #[arg(long, env = "SCHEDULER_SEED")]
    seed: Option<u64>,

    /// Stop the leader search after this many restarts
    #[arg(long)]
    max_restarts: Option<u64>,

    /// Write the schedule as CSV
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Write the full outcome as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Also append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.log_file.as_deref());

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> study_groups::Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            log::info!("Loading configuration from '{}'", path.display());
            SchedulerConfig::load(path)?
        }
        None => SchedulerConfig::default(),
    };
    if let Some(timeout) = cli.timeout {
        config.search.time_budget_secs = timeout;
    }
    if cli.seed.is_some() {
        config.search.seed = cli.seed;
    }
    if cli.max_restarts.is_some() {
        config.search.max_restarts = cli.max_restarts;
    }

    let catalog = config.catalog()?;
    let loaded = load_roster(&cli.roster, &catalog, &config.columns)?;

    let mut rng = match config.search.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let outcome = run_scheduler(
        &loaded.roster,
        &loaded.leader_ids,
        &loaded.student_ids,
        &catalog,
        &config.search_settings(),
        &mut rng,
    )?;

    print_schedule(&outcome, &loaded.roster, &catalog)?;

    if let Some(path) = &cli.csv_out {
        write_schedule_csv_file(&outcome, &loaded.roster, &catalog, path)?;
        log::info!("Schedule written to '{}'", path.display());
    }
    if let Some(path) = &cli.json_out {
        write_outcome_json_file(&outcome, &loaded.roster, &catalog, path)?;
        log::info!("Outcome written to '{}'", path.display());
    }

    Ok(())
}
