#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that plays Tank Battlegrounds levels.

mod autopilot;

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use glam::Vec2;
use tank_battlegrounds_core::{SimulationConfig, UnitId};
use tank_battlegrounds_session::{Intent, Mode, Observer, Orchestrator, Overlay, Tally};
use tank_battlegrounds_world::query;
use tracing::{debug, info};

/// Command-line arguments accepted by the Tank Battlegrounds binary.
#[derive(Debug, Parser)]
#[command(
    name = "tank-battlegrounds",
    about = "Play Tank Battlegrounds levels headlessly."
)]
struct Args {
    /// Tiled JSON maps listed in the main menu, in order.
    #[arg(required = true)]
    levels: Vec<String>,
    /// Optional TOML file overriding the simulation parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum number of frames to run before giving up.
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// Aim at and fire on the nearest live enemy every frame.
    #[arg(long)]
    autopilot: bool,
    /// Zero-based index of the level to start.
    #[arg(long, default_value_t = 0)]
    level_index: usize,
}

/// Entry point for the Tank Battlegrounds command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let name = args
        .levels
        .get(args.level_index)
        .cloned()
        .with_context(|| {
            format!(
                "level index {} is out of range for {} levels",
                args.level_index,
                args.levels.len()
            )
        })?;

    let loader = |path: &str| tank_battlegrounds_tiled::load_level(path);
    let mut orchestrator = Orchestrator::new(loader, args.levels.clone(), config);
    let tally = Rc::new(RefCell::new(Tally::default()));
    orchestrator.subscribe(Box::new(EventLog));
    orchestrator.subscribe(Box::new(Rc::clone(&tally)));

    orchestrator
        .load_level(&name)
        .with_context(|| format!("failed to start level {name}"))?;

    let mut outcome = None;
    for _ in 0..args.frames {
        let intent = match orchestrator.session() {
            Some(session) if args.autopilot => autopilot::intent(session),
            _ => Intent::aim_only(Vec2::ZERO),
        };
        outcome = orchestrator.frame(&intent);
        if outcome.is_some() || orchestrator.mode() != Mode::Playing {
            break;
        }
    }

    let Some(session) = orchestrator.session() else {
        let reason = match orchestrator.overlay() {
            Overlay::Message(text) => text.as_str(),
            Overlay::Menu(_) => "session ended",
        };
        bail!("{name}: {reason}");
    };

    let Tally { shots, kills } = *tally.borrow();
    let ticks = query::tick(session.world()).get();
    match outcome {
        Some(outcome) => println!("{name}: {outcome:?} after {ticks} ticks"),
        None => println!("{name}: undecided after {ticks} ticks"),
    }
    println!("shots fired: {shots}, units destroyed: {kills}");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&contents)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn parse_config(contents: &str) -> Result<SimulationConfig> {
    let config: SimulationConfig = toml::from_str(contents).context("malformed config")?;
    config.validate()?;
    Ok(config)
}

/// Observer that mirrors gameplay events into the log.
struct EventLog;

impl Observer for EventLog {
    fn on_unit_destroyed(&mut self, unit: UnitId, position: Vec2) {
        info!(
            unit = unit.get(),
            x = position.x,
            y = position.y,
            "unit destroyed"
        );
    }

    fn on_bullet_fired(&mut self, unit: UnitId, origin: Vec2, target: Vec2) {
        debug!(
            unit = unit.get(),
            origin = ?origin,
            target = ?target,
            "bullet fired"
        );
    }
}
