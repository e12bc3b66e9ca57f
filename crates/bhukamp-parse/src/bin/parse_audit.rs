//! Batch parse audit over a source registry.
//!
//! Parses every source the registry resolves (optionally narrowed by
//! region, type or name), logs progress, and writes the per-source
//! [`ParseReport`] records as a JSON array. A source that fails to parse
//! is reported, not fatal; the exit code reflects whether all sources
//! parsed cleanly.
//!
//! Usage:
//!   cargo run --bin parse_audit -- --manifest model/manifest.json

use anyhow::{bail, Context, Result};
use bhukamp_models::registry::SourceRegistry;
use bhukamp_models::types::{SourceRegion, SourceType};
use bhukamp_parse::report::ParseReport;
use bhukamp_parse::{parse_cluster, parse_fault, parse_grid, parse_subduction, FileRegistry};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "parse_audit")]
#[command(about = "Parse NSHM source files and write an audit report")]
struct Args {
    /// Registry manifest JSON
    #[arg(long)]
    manifest: PathBuf,

    /// Restrict to one region (ca, wus, ceus, casc)
    #[arg(long)]
    region: Option<String>,

    /// Restrict to one source type (fault, gridded, subduction, cluster)
    #[arg(long, value_name = "TYPE")]
    source_type: Option<String>,

    /// Restrict to one source file by name
    #[arg(long)]
    name: Option<String>,

    /// Output report JSON
    #[arg(long, default_value = "parse_audit.json")]
    output: PathBuf,
}

fn region_from(s: &str) -> Result<SourceRegion> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "ca" => SourceRegion::Ca,
        "wus" => SourceRegion::Wus,
        "ceus" => SourceRegion::Ceus,
        "casc" => SourceRegion::Casc,
        other => bail!("unknown region {other:?}"),
    })
}

fn type_from(s: &str) -> Result<SourceType> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "fault" => SourceType::Fault,
        "gridded" => SourceType::Gridded,
        "subduction" => SourceType::Subduction,
        "cluster" => SourceType::Cluster,
        other => bail!("unknown source type {other:?}"),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::level_filters::LevelFilter::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let region = args.region.as_deref().map(region_from).transpose()?;
    let source_type = args.source_type.as_deref().map(type_from).transpose()?;

    let registry = FileRegistry::open(&args.manifest)
        .with_context(|| format!("opening manifest {}", args.manifest.display()))?;
    let masks = registry.craton_masks();
    if masks.is_none() {
        info!("no craton/margin masks in registry");
    }

    let sources = registry.resolve(region, source_type, args.name.as_deref());
    if sources.is_empty() {
        bail!("no sources matched the given filters");
    }
    info!(count = sources.len(), "resolved sources");

    let mut reports = Vec::with_capacity(sources.len());
    let mut failures = 0usize;
    for src in &sources {
        let mut report = ParseReport::new(&src.name);
        let outcome = match src.source_type {
            SourceType::Fault => parse_fault(src, &mut report).map(drop),
            SourceType::Cluster => parse_cluster(src, &mut report).map(drop),
            SourceType::Subduction => parse_subduction(src, &mut report).map(drop),
            SourceType::Gridded => {
                parse_grid(src, &registry, masks.as_ref(), &mut report).map(drop)
            }
        };
        if let Err(err) = outcome {
            error!(source = %src.name, %err, "parse failed");
            report.fail(&err);
            failures += 1;
        }
        reports.push(report);
    }

    let json = serde_json::to_string_pretty(&reports)?;
    fs::write(&args.output, json)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(
        sources = reports.len(),
        failures,
        output = %args.output.display(),
        "audit complete"
    );

    if failures > 0 {
        bail!("{failures} of {} sources failed to parse", reports.len());
    }
    Ok(())
}
