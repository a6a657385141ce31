use anyhow::{bail, Context, Result};
use cacheblock::cli::{Cli, Commands, InspectArgs, LayoutArgs};
use cacheblock::{LayoutDocument, LayoutPipeline};
use cacheblock_layout::{parse_vector, read_matrix_market_file};
use clap::Parser;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Layout(args) => layout(args),
        Commands::Inspect(args) => inspect(args),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`)
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn layout(args: LayoutArgs) -> Result<()> {
    let label = args.label()?;
    let config = args.config();
    let pipeline = LayoutPipeline::new(config).context("invalid configuration")?;

    let matrix = read_matrix_market_file(&args.matrix)
        .with_context(|| format!("failed to read {}", args.matrix.display()))?;
    info!(
        label = %label,
        rows = matrix.rows(),
        cols = matrix.cols(),
        nnz = matrix.nnz(),
        "loaded matrix"
    );

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    let report = pipeline
        .run_to_dir(&label, &matrix, &args.out_dir)
        .with_context(|| format!("failed to lay out {label}"))?;

    let json = serde_json::to_string_pretty(&report)?;
    match &args.report {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let doc = LayoutDocument::read_file(&args.layout, args.tile_overhead)
        .with_context(|| format!("failed to parse {}", args.layout.display()))?;
    doc.check_disjoint()?;

    let stats = doc.stats();
    println!("matrix:       {} x {}", doc.rows, doc.cols);
    println!("superblocks:  {}", doc.superblocks.len());
    println!("tiles:        {}", stats.tile_count);
    println!("value slots:  {}", stats.value_slots);
    println!("stored nnz:   {}", stats.stored_nonzeros);
    if stats.value_slots > 0 {
        println!(
            "fill:         {:.3}",
            stats.stored_nonzeros as f64 / stats.value_slots as f64
        );
    }

    if let Some(expected) = &args.expected {
        let text = fs::read_to_string(expected)
            .with_context(|| format!("failed to read {}", expected.display()))?;
        let want = parse_vector(&text)?;
        if want.len() != doc.rows {
            bail!("expected result has {} entries, matrix has {} rows", want.len(), doc.rows);
        }
        let got = doc.row_sums();
        let worst = got
            .iter()
            .zip(&want)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        if worst > args.tolerance {
            bail!("layout product differs from expected result by up to {worst}");
        }
        println!("product:      matches expected (max error {worst:e})");
    }
    Ok(())
}
