//! Gap Runner entry point
//!
//! Headless native runner: plays seeded runs through the fixed-rate
//! scheduler, feeding it simulated 60 Hz host frames, and prints a
//! leaderboard. Set `RUST_LOG=debug` to trace spawns and autopilot rules.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};

use gap_runner::consts::PHYSICS_DT;
use gap_runner::highscores::RunEntry;
use gap_runner::sim::{ControlMode, Phase, RenderSnapshot, Session, SimEvent};
use gap_runner::{Difficulty, HighScores, Scheduler, SimConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Manual,
    Autopilot,
}

#[derive(Parser, Debug)]
#[command(name = "gap-runner", about = "Play headless gap runner sessions")]
struct Args {
    /// Seed of the first run; later runs use consecutive seeds
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Number of runs to play
    #[arg(long, default_value_t = 5)]
    runs: u32,
    /// Stop a run after this many physics ticks even if still alive
    #[arg(long, default_value_t = 18_000)]
    max_ticks: u64,
    #[arg(long, value_enum, default_value_t = ModeArg::Autopilot)]
    mode: ModeArg,
    /// In manual mode, jump every N physics ticks
    #[arg(long)]
    flap_every: Option<u64>,
    /// Difficulty preset (relaxed, classic, frantic)
    #[arg(long, default_value = "classic")]
    preset: String,
    /// JSON configuration file; overrides --preset
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print each run's final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<SimConfig> {
    if let Some(path) = &args.config {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = SimConfig::from_json(&json)
            .with_context(|| format!("loading config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        return Ok(config);
    }

    let preset = Difficulty::from_str(&args.preset)
        .ok_or_else(|| anyhow!("unknown preset '{}'", args.preset))?;
    let config = SimConfig::from_preset(preset);
    config.validate()?;
    log::info!("Using {} preset", preset.as_str());
    Ok(config)
}

/// Play one run to completion (or the tick limit)
fn play_run(config: &SimConfig, seed: u64, args: &Args) -> (RunEntry, RenderSnapshot) {
    let mut session = Session::new(config.clone(), seed);
    let mut scheduler = Scheduler::default();

    match args.mode {
        ModeArg::Autopilot => {
            session.set_mode(ControlMode::Autopilot);
        }
        ModeArg::Manual => {
            session.jump();
        }
    }

    // Frames are exactly one physics period, so this only guards against a stalled session
    let max_frames = args.max_ticks.saturating_mul(2);
    let mut frames = 0;
    let mut last_flap = 0;
    while session.phase() != Phase::Over && session.ticks() < args.max_ticks && frames < max_frames {
        if let Some(every) = args.flap_every.filter(|&n| n > 0) {
            let ticks = session.ticks();
            if args.mode == ModeArg::Manual && ticks >= last_flap + every {
                session.jump();
                last_flap = ticks;
            }
        }

        let report = scheduler.advance(&mut session, PHYSICS_DT);
        for event in &report.events {
            if let SimEvent::Scored { score, .. } = event {
                log::debug!("Seed {seed}: score {score} at tick {}", session.ticks());
            }
        }
        frames += 1;
    }
    scheduler.shutdown();

    let entry = RunEntry {
        score: session.score(),
        ticks: session.ticks(),
        seed,
        mode: session.mode(),
    };
    (entry, session.snapshot())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;
    log::info!("Gap Runner (headless) starting: {} runs from seed {}", args.runs, args.seed);

    let mut high_scores = HighScores::new();
    for i in 0..args.runs {
        let seed = args.seed.wrapping_add(u64::from(i));
        let (entry, snapshot) = play_run(&config, seed, &args);
        let outcome = match snapshot.phase {
            Phase::Over => "crashed",
            _ => "survived",
        };
        println!(
            "run {:>3}  seed {:>6}  score {:>4}  ticks {:>6}  {}",
            i + 1,
            seed,
            entry.score,
            entry.ticks,
            outcome
        );
        if args.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        if let Some(rank) = high_scores.add_run(entry) {
            log::info!("Seed {seed} placed #{rank}");
        }
    }

    println!();
    if high_scores.is_empty() {
        println!("No run scored.");
    } else {
        println!("Leaderboard:");
        for (rank, entry) in high_scores.entries.iter().enumerate() {
            println!(
                "{:>3}. {:>4}  (seed {}, {} ticks, {:?})",
                rank + 1,
                entry.score,
                entry.seed,
                entry.ticks,
                entry.mode
            );
        }
    }
    Ok(())
}
