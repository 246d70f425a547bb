use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use env_logger::{Builder, Target};
use log::{info, warn, LevelFilter};

use fort14::{datatypes::BoundaryKind, parse_mesh, post_processor, Mesh};

/// Inspect and export ADCIRC fort.14 meshes
#[derive(Parser)]
#[command(name = "fort14")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and export ADCIRC fort.14 meshes", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). Falls back to RUST_LOG
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a mesh
    Info(InfoArgs),
    /// Write mesh nodes and elements as CSV
    Export(ExportArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Path to the fort.14 file
    mesh: PathBuf,

    /// Print the summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the fort.14 file
    mesh: PathBuf,

    /// Output nodes csv
    #[arg(long, default_value = "nodes.csv")]
    nodes: PathBuf,

    /// Output elements csv
    #[arg(long, default_value = "elements.csv")]
    elements: PathBuf,
}

fn init_logging(level: Option<&str>) {
    let level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| {
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|v| v.parse::<LevelFilter>().ok())
        })
        .unwrap_or(LevelFilter::Info);

    Builder::new()
        .filter_level(level)
        .target(Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [mesh]: {}",
                record.level().as_str().to_lowercase(),
                record.args()
            )
        })
        .init();
}

fn load(path: &Path) -> anyhow::Result<Mesh> {
    let mesh = parse_mesh(path).with_context(|| format!("failed to load {}", path.display()))?;

    info!(
        "loaded {} nodes, {} elements and {} boundary segments",
        mesh.nodes.len(),
        mesh.elements.len(),
        mesh.boundaries.len()
    );

    let clockwise = mesh
        .elements
        .iter()
        .filter(|e| mesh.element_area(e) <= 0.0)
        .count();
    if clockwise > 0 {
        warn!("{} elements have clockwise or degenerate winding", clockwise);
    }

    Ok(mesh)
}

fn info_command(args: InfoArgs) -> anyhow::Result<()> {
    let mesh = load(&args.mesh)?;

    if args.json {
        println!("{}", post_processor::summary(&mesh).pretty(2));
        return Ok(());
    }

    info!("description: {}", mesh.description.trim());
    info!("open ocean segments: {}", mesh.boundaries.ocean.len());
    for kind in BoundaryKind::ALL {
        info!("{} segments: {}", kind.name(), mesh.boundaries.count(kind));
    }

    Ok(())
}

fn export_command(args: ExportArgs) -> anyhow::Result<()> {
    let mesh = load(&args.mesh)?;
    post_processor::csv_output(&mesh, &args.nodes, &args.elements)?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::Info(args) => info_command(args),
        Commands::Export(args) => export_command(args),
    }
}
