//! gridwalk: agents walking a shared N×N grid, one thread each.
//!
//! Same-group agents never share a cell; agents of different groups pass
//! through each other.  Every dwell prints two lines on stdout:
//!
//! ```text
//!   0 [  1 @( 0, 0) z   0
//!   0 )  1 @( 0, 0) z   0
//! ```
//!
//! Diagnostics go to stderr (`-v` or `RUST_LOG` to see more).
//!
//! ```text
//! gridwalk scenario.txt
//! gridwalk --csv --grid-size 5 steps.csv --events-csv out/
//! gridwalk --random --agents 12 --groups 2 --seed 7 --tenth-ms 20
//! ```

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gw_core::SimConfig;
use gw_output::{ConsoleWriter, CsvWriter, EventLogObserver, EventWriter};
use gw_route::{
    GeneratorParams, RouteGenerator, Scenario, load_agents_csv_reader, load_scenario_reader,
};
use gw_sim::{SimBuilder, SimReport};

#[cfg(test)]
mod tests;

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "gridwalk")]
#[command(about = "Grid walk with same-group cell exclusion, one thread per agent")]
struct Cli {
    /// Scenario file; stdin when omitted or "-"
    input: Option<PathBuf>,

    /// Input is per-step CSV (agent_id,group_id,step,x,y,dwell_tenths)
    #[arg(long)]
    csv: bool,

    /// Grid side for CSV or random input
    #[arg(long)]
    grid_size: Option<u32>,

    /// Generate a random population instead of reading input
    #[arg(long, conflicts_with_all = ["input", "csv"])]
    random: bool,

    /// Random mode: number of agents
    #[arg(long, default_value = "8")]
    agents: u32,

    /// Random mode: number of groups
    #[arg(long, default_value = "2")]
    groups: u32,

    /// Random mode: longest route
    #[arg(long, default_value = "6")]
    max_steps: u32,

    /// Random mode: longest dwell in tenths
    #[arg(long, default_value = "5")]
    max_dwell: u64,

    /// Seed for random mode
    #[arg(long)]
    seed: Option<u64>,

    /// Real milliseconds per tenth
    #[arg(long)]
    tenth_ms: Option<u64>,

    /// Largest accepted grid side
    #[arg(long, conflicts_with = "no_grid_cap")]
    max_grid_size: Option<u32>,

    /// Accept any grid size
    #[arg(long)]
    no_grid_cap: bool,

    /// TOML file with SimConfig fields; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write dwell_events.csv into this directory
    #[arg(long)]
    events_csv: Option<PathBuf>,

    /// Also write events.db into this directory
    #[cfg(feature = "sqlite")]
    #[arg(long)]
    events_db: Option<PathBuf>,

    /// Per-agent summary on stderr after the run
    #[arg(long)]
    summary: bool,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = build_settings(&cli)?;
    let scenario = load_input(&cli, &settings)?;
    let config = settings.config;
    info!(
        grid = scenario.grid_size,
        agents = scenario.agents.len(),
        "scenario loaded"
    );

    let log = EventLogObserver::new(open_writers(&cli)?);
    let sim = SimBuilder::from_scenario(config, scenario)
        .observer(&log)
        .build()
        .context("invalid scenario")?;

    let outcome = sim.run();
    log.finish();
    if let Some(e) = log.take_error() {
        return Err(e).context("writing event log");
    }
    let report = outcome.context("simulation failed")?;

    if cli.summary {
        print_summary(&report);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Effective configuration after the config file and flag overrides.
struct Settings {
    config:          SimConfig,
    /// `grid_size` came from `--grid-size` or the config file rather than
    /// the built-in default.
    grid_size_given: bool,
}

fn build_settings(cli: &Cli) -> Result<Settings> {
    let (mut config, mut grid_size_given) = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => (SimConfig::default(), false),
    };

    if let Some(n) = cli.grid_size {
        config.grid_size = n;
        grid_size_given = true;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(ms) = cli.tenth_ms {
        config.tenth_millis = ms;
    }
    if cli.no_grid_cap {
        config.max_grid_size = None;
    } else if let Some(max) = cli.max_grid_size {
        config.max_grid_size = Some(max);
    }
    debug!(?config, grid_size_given, "configuration");
    Ok(Settings { config, grid_size_given })
}

fn load_config_file(path: &Path) -> Result<(SimConfig, bool)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// Parse a TOML config; the flag reports whether it sets `grid_size`.
fn parse_config(text: &str) -> Result<(SimConfig, bool)> {
    let table: toml::Table = toml::from_str(text)?;
    let grid_size_given = table.contains_key("grid_size");
    let config: SimConfig = toml::Value::Table(table).try_into()?;
    Ok((config, grid_size_given))
}

// ── Input ─────────────────────────────────────────────────────────────────────

fn load_input(cli: &Cli, settings: &Settings) -> Result<Scenario> {
    let config = &settings.config;
    if cli.random {
        let params = GeneratorParams {
            grid_size: cli.grid_size.unwrap_or(GeneratorParams::default().grid_size),
            agents: cli.agents,
            groups: cli.groups,
            max_steps: cli.max_steps,
            max_dwell: cli.max_dwell,
            ..GeneratorParams::default()
        };
        let generator = RouteGenerator::new(params, config.seed)?;
        return Ok(generator.generate());
    }

    if cli.csv && !settings.grid_size_given {
        bail!("CSV input needs --grid-size (or grid_size in --config)");
    }
    let source = open_input(cli.input.as_deref())?;
    let scenario = if cli.csv {
        load_agents_csv_reader(source, config.grid_size)?
    } else {
        load_scenario_reader(source)?
    };
    Ok(scenario)
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        None => Ok(Box::new(io::stdin().lock())),
        Some(p) if p.as_os_str() == "-" => Ok(Box::new(io::stdin().lock())),
        Some(p) => {
            let file = File::open(p).with_context(|| format!("opening {}", p.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

fn open_writers(cli: &Cli) -> Result<Vec<Box<dyn EventWriter + Send>>> {
    let mut writers: Vec<Box<dyn EventWriter + Send>> = vec![Box::new(ConsoleWriter::stdout())];

    if let Some(dir) = &cli.events_csv {
        std::fs::create_dir_all(dir)?;
        writers.push(Box::new(CsvWriter::new(dir)?));
    }

    #[cfg(feature = "sqlite")]
    if let Some(dir) = &cli.events_db {
        std::fs::create_dir_all(dir)?;
        writers.push(Box::new(gw_output::SqliteWriter::new(dir)?));
    }

    Ok(writers)
}

fn print_summary(report: &SimReport) {
    eprintln!();
    eprintln!(
        "{:<8} {:<6} {:>7} {:>8} {:>6} {:>9}",
        "Agent", "Group", "Claims", "Releases", "Waits", "Finished"
    );
    eprintln!("{}", "-".repeat(49));
    for a in &report.agents {
        eprintln!(
            "{:<8} {:<6} {:>7} {:>8} {:>6} {:>9}",
            a.agent.0,
            a.group.0,
            a.claims + a.reclaims,
            a.releases,
            a.waits,
            a.finished_at.to_string(),
        );
    }
    eprintln!();
    eprintln!(
        "{} agents, {} waits, elapsed {}",
        report.agents.len(),
        report.total_waits(),
        report.elapsed
    );
}
