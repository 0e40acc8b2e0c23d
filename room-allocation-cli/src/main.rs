use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use room_allocation_config::{get_config, get_config_from};
use room_allocation_optimizer::report::{check_oasis, check_rooms, summarize};
use room_allocation_optimizer::{AllocationEngine, FairnessRng, Snapshot};
use room_allocation_telemetry::setup_telemetry;
use tracing::{error, info};

/// Allocates team rooms and oasis seats for one period.
#[derive(Parser, Debug)]
#[command(name = "room-allocation", version, about)]
struct Cli {
    /// JSON file with the teams and people of the period
    #[arg(long)]
    snapshot: PathBuf,

    /// TOML file with rooms and oasis settings [default: room-allocation.toml if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the tie-breaks, overrides the configured one
    #[arg(long)]
    seed: Option<u64>,

    /// Print counts and utilisation instead of the full allocation
    #[arg(long)]
    summary: bool,
}

fn execute(cli: &Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => get_config_from(path)?,
        None => get_config()?,
    };
    let resources = config.resources();

    let raw = std::fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("failed to read {}", cli.snapshot.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("invalid snapshot: {}", cli.snapshot.display()))?;

    let mut rng = match cli.seed.or(config.seed) {
        Some(seed) => FairnessRng::from_seed(seed),
        None => FairnessRng::from_entropy(),
    };
    info!(
        period = %snapshot.period,
        seed = rng.seed(),
        teams = snapshot.teams.len(),
        people = snapshot.people.len(),
        "starting allocation"
    );
    let run = AllocationEngine.run(&snapshot, &resources, &mut rng)?;

    let mut violations = check_rooms(&snapshot.teams, &resources.rooms, &run.rooms);
    violations.extend(check_oasis(
        &snapshot.people,
        resources.daily_capacity,
        &run.oasis,
    ));
    if !violations.is_empty() {
        for violation in &violations {
            error!(%violation, "allocation audit failed");
        }
        bail!("allocation audit found {} violations", violations.len());
    }

    let output = if cli.summary {
        serde_json::to_string_pretty(&summarize(&run, &resources))?
    } else {
        serde_json::to_string_pretty(&run)?
    };
    Ok(output)
}

fn main() -> ExitCode {
    setup_telemetry();
    let cli = Cli::parse();
    match execute(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::CommandFactory;
    use room_allocation_optimizer::AllocationRun;
    use serde_json::Value;

    use super::*;

    const SNAPSHOT: &str = r#"{
        "period": "2026-W42",
        "teams": [
            {"id": "t1", "name": "Kite", "contact_person": "Ana", "size": 6,
             "preferred_day_pair": "mon-wed"},
            {"id": "t2", "name": "Lark", "contact_person": "Ben", "size": 4,
             "preferred_day_pair": "tue-thu"}
        ],
        "people": [
            {"id": "p1", "name": "Cleo", "preferred_days": ["monday", "friday"]},
            {"id": "p2", "name": "Dario", "preferred_days": ["wednesday"]}
        ]
    }"#;

    const CONFIG: &str = r#"
        [oasis]
        daily_capacity = 2
        weekdays = ["monday", "tuesday", "wednesday", "thursday", "friday"]

        [[rooms]]
        id = "atlas"
        capacity = 6
        day_pair = "mon-wed"

        [[rooms]]
        id = "borealis"
        capacity = 4
        day_pair = "tue-thu"
    "#;

    fn cli(dir: &tempfile::TempDir, snapshot: &str, seed: Option<u64>, summary: bool) -> Cli {
        let snapshot_path = dir.path().join("snapshot.json");
        let config_path = dir.path().join("room-allocation.toml");
        fs::write(&snapshot_path, snapshot).unwrap();
        fs::write(&config_path, CONFIG).unwrap();
        Cli {
            snapshot: snapshot_path,
            config: Some(config_path),
            seed,
            summary,
        }
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn prints_the_whole_run() {
        let dir = tempfile::tempdir().unwrap();
        let output = execute(&cli(&dir, SNAPSHOT, Some(5), false)).unwrap();
        let run: AllocationRun = serde_json::from_str(&output).unwrap();
        assert_eq!(run.seed, 5);
        assert_eq!(run.period.as_str(), "2026-W42");
        assert_eq!(run.rooms.allocations.len(), 2);
        assert!(run.rooms.waitlist.is_empty());
        assert_eq!(run.oasis.allocations.len(), 3);
    }

    #[test]
    fn prints_a_summary() {
        let dir = tempfile::tempdir().unwrap();
        let output = execute(&cli(&dir, SNAPSHOT, Some(5), true)).unwrap();
        let summary: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(summary["teams_placed"], 2);
        assert_eq!(summary["rooms_used"], 2);
        assert_eq!(summary["people_allocated"], 2);
        assert_eq!(summary["oasis_daily_usage"]["monday"], 1);
    }

    #[test]
    fn same_seed_same_output() {
        let dir = tempfile::tempdir().unwrap();
        let first = execute(&cli(&dir, SNAPSHOT, Some(11), false)).unwrap();
        let second = execute(&cli(&dir, SNAPSHOT, Some(11), false)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_broken_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(&cli(&dir, "{\"teams\": 3}", Some(1), false)).unwrap_err();
        assert!(err.to_string().starts_with("invalid snapshot"));
    }

    #[test]
    fn named_config_has_to_exist() {
        let dir = tempfile::tempdir().unwrap();
        let mut cli = cli(&dir, SNAPSHOT, Some(1), true);
        let missing = dir.path().join("typo.toml");
        cli.config = Some(missing.clone());
        let err = execute(&cli).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("config file {} does not exist", missing.display())
        );
    }

    #[test]
    fn rejects_invalid_team() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SNAPSHOT.replace("\"size\": 6", "\"size\": 9");
        let err = execute(&cli(&dir, &snapshot, Some(1), false)).unwrap_err();
        assert!(err.to_string().contains("t1"));
    }
}
