//! headless — terminal front end for the rust_travelers simulation.
//!
//! Builds a random world, starts one thread per traveler and prints an ASCII
//! frame plus a status line at a fixed interval until every traveler has
//! left through the exit (or hit `--max-iterations`).
//!
//! ```text
//! headless --rows 20 --cols 40 --agents 8 --think-us 20000
//! headless --config run.json --no-grid
//! RUST_LOG=tv_grid=debug headless
//! ```

mod render;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tv_core::{ReversalPolicy, SimConfig};
use tv_sim::SimBuilder;

use render::TerminalObserver;

// ── CLI ───────────────────────────────────────────────────────────────────────

/// Concurrent grid travelers, one thread each, rendered as ASCII.
#[derive(Parser, Debug)]
#[command(name = "headless", version, about)]
struct Args {
    /// JSON `SimConfig` to start from; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    rows: Option<u32>,

    #[arg(long)]
    cols: Option<u32>,

    /// Number of travelers.
    #[arg(long)]
    agents: Option<u32>,

    /// Initial pause between traveler iterations, in microseconds.
    #[arg(long)]
    think_us: Option<u64>,

    /// Floor for the pause, in microseconds.
    #[arg(long)]
    min_think_us: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Segments each traveler starts with.
    #[arg(long)]
    segments: Option<u32>,

    /// Grow by one segment every N moves (0 = never).
    #[arg(long)]
    growth: Option<u32>,

    /// Never pick the direction straight back over the head.
    #[arg(long)]
    forbid_reversal: bool,

    /// Stop each traveler after this many iterations.
    #[arg(long)]
    max_iterations: Option<u64>,

    /// Milliseconds between frames.
    #[arg(long, default_value_t = 250)]
    frame_ms: u64,

    /// Print status lines only.
    #[arg(long)]
    no_grid: bool,

    /// Plain output: no screen clearing, no color.
    #[arg(long)]
    plain: bool,

    /// Print the resolved config as JSON and exit.
    #[arg(long)]
    dump_config: bool,

    /// Print the final status as JSON.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => SimConfig::default(),
        };

        if let Some(v) = self.rows           { config.rows = v; }
        if let Some(v) = self.cols           { config.cols = v; }
        if let Some(v) = self.agents         { config.agent_count = v; }
        if let Some(v) = self.think_us       { config.initial_think_micros = v; }
        if let Some(v) = self.min_think_us   { config.min_think_micros = v; }
        if let Some(v) = self.seed           { config.seed = v; }
        if let Some(v) = self.segments       { config.initial_segments = v; }
        if let Some(v) = self.growth         { config.growth_interval = v; }
        if self.max_iterations.is_some()     { config.max_iterations = self.max_iterations; }
        if self.forbid_reversal              { config.reversal = ReversalPolicy::Forbid; }

        config.validate()?;
        Ok(config)
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = args.resolve_config()?;
    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!(
        rows = config.rows,
        cols = config.cols,
        agents = config.agent_count,
        seed = config.seed,
        "building simulation"
    );
    let mut sim = SimBuilder::new(config).build()?;
    sim.start()?;

    let mut observer = TerminalObserver::new(!args.no_grid, !args.plain);
    sim.observe(Duration::from_millis(args.frame_ms), &mut observer);

    let status = sim.join()?;
    info!(frames = observer.frames(), "simulation complete");
    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!(
            "{} of {} travelers left in {:.2}s",
            status.finished, status.created, status.elapsed_secs
        );
    }
    Ok(())
}
