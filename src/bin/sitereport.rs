use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use sitereport::{ExportGate, ExportOutcome, ReportStyle, compose_plan, export_report};

#[derive(Parser, Debug)]
#[command(name = "sitereport", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the full PDF report from a project snapshot.
    Report(ReportArgs),
    /// Composite a single floor plan with its pins (debugging aid).
    Composite(CompositeArgs),
}

#[derive(Parser, Debug)]
struct ReportArgs {
    /// Input project snapshot JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory; the file name is derived from the project name.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CompositeArgs {
    /// Input project snapshot JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Floor plan id to composite.
    #[arg(long)]
    plan: String,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Report(args) => cmd_report(args),
        Command::Composite(args) => cmd_composite(args),
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<sitereport::ProjectSnapshot> {
    let f = File::open(path).with_context(|| format!("open snapshot '{}'", path.display()))?;
    let snapshot = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse snapshot '{}'", path.display()))?;
    Ok(snapshot)
}

fn cmd_report(args: ReportArgs) -> anyhow::Result<()> {
    let snapshot = read_snapshot(&args.in_path)?;
    let gate = ExportGate::new();
    let style = ReportStyle::default();

    match export_report(&gate, &snapshot, &style)? {
        ExportOutcome::Completed(artifact) => {
            std::fs::create_dir_all(&args.out)
                .with_context(|| format!("create output dir '{}'", args.out.display()))?;
            let out_path = args.out.join(&artifact.file_name);
            std::fs::write(&out_path, &artifact.bytes)
                .with_context(|| format!("write report '{}'", out_path.display()))?;
            println!("{} ({} pages)", out_path.display(), artifact.page_count);
        }
        ExportOutcome::NothingToExport => {
            println!("nothing to export: project has no findings");
        }
        ExportOutcome::Busy => {
            anyhow::bail!("another export is already in flight");
        }
    }
    Ok(())
}

fn cmd_composite(args: CompositeArgs) -> anyhow::Result<()> {
    let snapshot = read_snapshot(&args.in_path)?;
    let style = ReportStyle::default();

    let plan = snapshot
        .plans
        .iter()
        .find(|p| p.id == args.plan)
        .with_context(|| format!("plan '{}' not found in snapshot", args.plan))?;
    let observations = snapshot.observations_for_plan(&plan.id);

    let composed = compose_plan(plan, &observations, &style)?;
    let jpeg = composed.encode_jpeg(style.plan_jpeg_quality)?;
    std::fs::write(&args.out, jpeg)
        .with_context(|| format!("write composite '{}'", args.out.display()))?;
    println!(
        "{} ({}x{}, {} pins)",
        args.out.display(),
        composed.width,
        composed.height,
        observations
            .iter()
            .filter(|n| n.observation.pin.is_some())
            .count()
    );
    Ok(())
}
