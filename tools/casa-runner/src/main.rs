//! casa-runner: run enemy scenarios headlessly and inspect configuration.
//!
//! Usage:
//!   casa-runner run [--scenario hallway.json] [--ticks 1800] [--seed 42] [--dump]
//!   casa-runner config
//!   casa-runner scenario

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use casa_core::config::EnemyConfig;
use casa_core::events::EnemyEvent;
use casa_sim::{Scenario, SimConfig, SimulationEngine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "config" => cmd_config(),
        "scenario" => cmd_scenario(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!(
        "casa-runner: headless runner for Casa enemy scenarios\n\
         \n\
         Commands:\n\
         \n\
         run       Run a scenario and log enemy state changes\n\
         \n\
           --scenario <path>  Scenario JSON (default: built-in hallway)\n\
           --ticks <N>        Ticks to simulate (default: scenario length)\n\
           --seed <S>         RNG seed (default: 42)\n\
           --dump             Print the final snapshot as JSON on stdout\n\
         \n\
         config    Print the default enemy configuration as JSON\n\
         \n\
         scenario  Print the built-in hallway scenario as JSON\n\
         \n\
         Logging is controlled with RUST_LOG (default: info).\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(&args[i + 1]);
        }
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_number<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<Option<T>> {
    match flag_value(args, flag) {
        Some(raw) => match raw.parse::<T>() {
            Ok(n) => Ok(Some(n)),
            Err(_) => bail!("{flag} expects a number, got {raw:?}"),
        },
        None => Ok(None),
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) -> Result<()> {
    let scenario = match flag_value(args, "--scenario") {
        Some(path) => {
            let path = PathBuf::from(path);
            Scenario::load(&path)
                .with_context(|| format!("loading scenario {}", path.display()))?
        }
        None => Scenario::hallway(),
    };
    let seed = parse_number::<u64>(args, "--seed")?.unwrap_or(42);
    let ticks = parse_number::<u64>(args, "--ticks")?.unwrap_or(scenario.ticks);

    info!(scenario = %scenario.name, seed, ticks, "starting run");

    let config = SimConfig {
        seed,
        ..Default::default()
    };
    let mut engine = SimulationEngine::from_scenario(&scenario, config)?;

    let mut last = None;
    let mut transitions = 0usize;
    for _ in 0..ticks {
        let snapshot = engine.tick();
        for record in &snapshot.events {
            if let EnemyEvent::StateChanged { from, to } = record.event {
                transitions += 1;
                info!(
                    tick = record.tick,
                    enemy = record.enemy_id,
                    "{from:?} -> {to:?}"
                );
            }
        }
        last = Some(snapshot);
    }

    let Some(snapshot) = last else {
        info!("no ticks simulated");
        return Ok(());
    };

    for enemy in &snapshot.enemies {
        info!(
            enemy = enemy.enemy_id,
            state = ?enemy.state,
            detection = enemy.detection,
            position = ?enemy.position,
            "final"
        );
    }
    info!(
        transitions,
        elapsed_secs = snapshot.time.elapsed_secs,
        "run complete"
    );

    if has_flag(args, "--dump") {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

// --- Config and scenario commands ---

fn cmd_config() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&EnemyConfig::default())?);
    Ok(())
}

fn cmd_scenario() -> Result<()> {
    println!("{}", Scenario::hallway().to_json()?);
    Ok(())
}
