//! # Butterfly-grid CLI
//!
//! Command-line interface for the butterfly-grid library.
//! Generates street-grid scenarios and ranks the best routes across them.

use anyhow::Context;
use butterfly_grid::{
    export_csv, find_routes_with_progress, generate_blocked_streets, generate_crossing_times,
    hazard_zones, render_table, Coord, Criterion, Error, GridConfig, Scenario,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_ZONE_MIN_SIZE,
};
use clap::{Args, Parser, Subcommand};
use log::{debug, error};
use std::path::PathBuf;

mod cli;

use cli::{parse_coord, CriterionArg};

/// Neighbor radius for hazard zones on the doubled grid, where two streets
/// meeting at one intersection are two steps apart
const ZONE_RADIUS: u32 = 2;

/// Command-line interface for butterfly-grid
#[derive(Parser)]
#[command(name = "butterfly-grid")]
#[command(about = "K best loop-free routes on a street grid with blocked streets")]
#[command(long_about = "Generates grid scenarios and ranks routes across them:
  butterfly-grid generate --rows 10 --cols 10 --output city.json
  butterfly-grid route --scenario city.json --from 0,0 --to 9,9
  butterfly-grid route --scenario city.json --from 0,0 --to 9,9 --k 10 --criterion time --csv routes.csv

Logging:
  --verbose                        # Debug output on stderr
  RUST_LOG=trace                   # Per-iteration search details")]
#[command(version = env!("BUTTERFLY_VERSION"))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a scenario with random blocked streets and crossing times
    Generate(GenerateArgs),

    /// Rank the best routes between two intersections of a scenario
    Route(RouteArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Number of rows of intersections
    #[arg(long)]
    rows: u32,

    /// Number of columns of intersections
    #[arg(long)]
    cols: u32,

    /// Share of streets to block, between 0 and 1
    #[arg(long, default_value_t = 0.2)]
    density: f64,

    /// Seed for the random generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Intersection that must stay connected to --to (default: top-left corner)
    #[arg(long, value_parser = parse_coord)]
    from: Option<Coord>,

    /// Intersection that must stay reachable from --from (default: bottom-right corner)
    #[arg(long, value_parser = parse_coord)]
    to: Option<Coord>,

    /// Shortest crossing time in seconds
    #[arg(long, default_value_t = 1)]
    time_min: u32,

    /// Longest crossing time in seconds
    #[arg(long, default_value_t = 5)]
    time_max: u32,

    /// Scenario file to write
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct RouteArgs {
    /// Scenario file to read
    #[arg(short, long)]
    scenario: PathBuf,

    /// Start intersection as ROW,COL
    #[arg(long, value_parser = parse_coord)]
    from: Coord,

    /// Goal intersection as ROW,COL
    #[arg(long, value_parser = parse_coord)]
    to: Coord,

    /// Maximum number of routes
    #[arg(short, long, default_value_t = 5)]
    k: usize,

    /// What the ranking minimises
    #[arg(long, value_enum, default_value_t = CriterionArg::Distance)]
    criterion: CriterionArg,

    /// Also write the routes to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Report hazard zones formed by blocked streets
    #[arg(long)]
    zones: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("❌ Error: {e:#}");
        if e.downcast_ref::<Error>().is_some_and(Error::is_misuse) {
            eprintln!("💡 Check the coordinates and the scenario against the grid size");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let mut builder = env_logger::Builder::from_default_env();
    if cli.verbose && std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    if cli.verbose {
        eprintln!("🦋 Butterfly-grid v{} starting...", env!("BUTTERFLY_VERSION"));
    }

    match cli.command {
        Commands::Generate(args) => generate(args),
        Commands::Route(args) => route(args),
    }
}

/// Default endpoints are opposite corners of the grid
fn resolve_endpoints(grid: GridConfig, from: Option<Coord>, to: Option<Coord>) -> (Coord, Coord) {
    let corner = Coord::new(grid.rows as i32 - 1, grid.cols as i32 - 1);
    (from.unwrap_or(Coord::new(0, 0)), to.unwrap_or(corner))
}

fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let grid = GridConfig::new(args.rows, args.cols);
    grid.validate()?;
    let (from, to) = resolve_endpoints(grid, args.from, args.to);
    grid.check(from)?;
    grid.check(to)?;

    eprintln!(
        "🗺️  Generating {}x{} grid, density {}, seed {}",
        grid.rows, grid.cols, args.density, args.seed
    );

    let blocked =
        generate_blocked_streets(grid, args.density, args.seed, from, to, DEFAULT_MAX_ATTEMPTS);
    let times = generate_crossing_times(grid, args.seed, args.time_min, args.time_max);
    let scenario = Scenario::from_parts(grid, &blocked, &times);

    scenario
        .save(&args.output)
        .with_context(|| format!("Failed to write scenario {}", args.output.display()))?;

    eprintln!(
        "🚧 Blocked {} of {} streets",
        blocked.len(),
        grid.edge_count()
    );
    eprintln!("📁 Saved to: {}", args.output.display());
    Ok(())
}

fn route(args: RouteArgs) -> anyhow::Result<()> {
    let scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario {}", args.scenario.display()))?;
    let network = scenario.into_network();
    let grid = network.grid();
    let criterion = Criterion::from(args.criterion);
    grid.check(args.from)?;
    grid.check(args.to)?;

    debug!(
        "Scenario {}: {}x{} grid, {} blocked streets",
        args.scenario.display(),
        grid.rows,
        grid.cols,
        network.blocked().len()
    );

    if args.from == args.to {
        eprintln!("📍 Start and goal are the same intersection: the route has 0 steps");
    }

    let progress = cli::ProgressManager::new(
        args.k as u64,
        &format!(
            "🧭 Searching up to {} route(s) from {} to {} by {}",
            args.k, args.from, args.to, criterion
        ),
    );
    let routes = find_routes_with_progress(
        &network,
        args.from,
        args.to,
        args.k,
        criterion,
        progress.tracker(),
    )?;
    progress.finish(routes.len());

    if routes.is_empty() {
        if args.k == 0 {
            eprintln!("⚠️  --k 0 requests no routes");
        } else {
            eprintln!(
                "⚠️  No route from {} to {}: every way is cut by blocked streets. \
                 Try other endpoints or regenerate the scenario with a lower --density.",
                args.from, args.to
            );
        }
    } else {
        print!("{}", render_table(&routes));
    }

    if let Some(path) = &args.csv {
        export_csv(&routes, path)
            .with_context(|| format!("Failed to export routes to {}", path.display()))?;
        eprintln!("📁 Saved {} route(s) to: {}", routes.len(), path.display());
    }

    if args.zones {
        report_zones(&network);
    }

    Ok(())
}

fn report_zones(network: &butterfly_grid::StreetNetwork) {
    let zones = hazard_zones(network, ZONE_RADIUS, DEFAULT_ZONE_MIN_SIZE);
    if zones.is_empty() {
        println!("No hazard zones of {DEFAULT_ZONE_MIN_SIZE} or more blocked streets");
        return;
    }
    println!("zone  streets  centroid          bbox");
    for zone in &zones {
        // back from the doubled grid to intersection units
        let (r, c) = zone.centroid();
        let bbox = zone
            .bbox()
            .map(|(r0, c0, r1, c1)| {
                format!(
                    "({:.1}, {:.1}) - ({:.1}, {:.1})",
                    f64::from(r0) / 2.0,
                    f64::from(c0) / 2.0,
                    f64::from(r1) / 2.0,
                    f64::from(c1) / 2.0
                )
            })
            .unwrap_or_default();
        println!(
            "{:>4}  {:>7}  ({:>6.2}, {:>6.2})  {}",
            zone.zone_id,
            zone.size(),
            r / 2.0,
            c / 2.0,
            bbox
        );
    }
}
