//! Headless course runner.
//!
//! Usage: `parkour-sim [config.json] [seconds]`
//!
//! Rolls the ball forward with periodic jumps until it finishes, runs out of
//! attempts or time, then prints a JSON summary.

use std::time::Instant;

use anyhow::{Context, Result, bail};
use parkour_core::{CourseConfig, CourseStatus, InputIntent, PHYSICS_DT, Simulation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SECONDS: f32 = 30.0;
const MAX_ATTEMPTS: u32 = 3;

/// Seconds between jump presses.
const JUMP_PERIOD: f32 = 1.5;
/// Ticks the jump key stays down per press.
const JUMP_HOLD_TICKS: u64 = 3;

/// Scripted input for tick `tick`: always forward, jump pressed briefly once
/// per [`JUMP_PERIOD`].
fn scripted_intent(tick: u64) -> InputIntent {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let period_ticks = (JUMP_PERIOD / PHYSICS_DT).round() as u64;
    InputIntent {
        forward: true,
        jump: tick % period_ticks < JUMP_HOLD_TICKS,
        ..InputIntent::IDLE
    }
}

fn load_config(path: Option<&str>) -> Result<CourseConfig> {
    match path {
        Some(path) => CourseConfig::load(path).with_context(|| format!("loading {path}")),
        None => Ok(CourseConfig::default()),
    }
}

fn parse_seconds(arg: Option<&str>) -> Result<f32> {
    let Some(arg) = arg else {
        return Ok(DEFAULT_SECONDS);
    };
    let seconds: f32 = arg
        .parse()
        .with_context(|| format!("invalid duration {arg:?}"))?;
    if !(seconds.is_finite() && seconds > 0.0) {
        bail!("duration must be positive, got {seconds}");
    }
    Ok(seconds)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let seconds = parse_seconds(args.get(1).map(String::as_str))?;

    let mut simulation = Simulation::new(config).context("building course")?;
    tracing::info!(
        "Running course for up to {seconds}s: {:?}",
        simulation.level().archetypes()
    );

    let started = Instant::now();
    let mut tick = 0u64;
    let mut attempts = 1;
    let mut total_time = 0.0f32;

    while total_time < seconds {
        let report = simulation.tick(PHYSICS_DT, &scripted_intent(tick));
        tick += 1;
        total_time += report.delta;

        match report.status {
            CourseStatus::Running => {}
            CourseStatus::Finished => break,
            CourseStatus::Fallen if attempts < MAX_ATTEMPTS => {
                tracing::info!("Attempt {attempts} fell at {:.2}s, restarting", report.elapsed);
                simulation.restart().context("restarting course")?;
                attempts += 1;
            }
            CourseStatus::Fallen => break,
        }
    }

    let position = simulation
        .player()
        .map(|state| state.last_known_position)
        .context("player was never spawned")?;

    tracing::info!(
        "Done: {:?} after {tick} ticks ({:.1?} wall time)",
        simulation.status(),
        started.elapsed()
    );

    let summary = serde_json::json!({
        "seed": simulation.config().seed,
        "status": simulation.status(),
        "attempts": attempts,
        "ticks": tick,
        "course_time": simulation.elapsed(),
        "position": [position.x, position.y, position.z],
        "track": simulation.level().archetypes(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
