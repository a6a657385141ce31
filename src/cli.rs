//! Command-line interface definitions

use anyhow::{anyhow, Result};
use cacheblock_core::{LayoutConfig, VisitOrder};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cacheblock")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cache-aware blocking and layout of sparse matrices for SpMV kernels")]
#[command(
    long_about = "Cache-aware blocking and layout of sparse matrices for SpMV kernels\n\n\
    Reads a Matrix Market file, groups its nonzeros into small dense tiles using\n\
    sampled local density, orders the tiles of each page-sized cache region for\n\
    locality and writes the layout document consumed by the multiply kernel.\n\n\
    Examples:\n\
      cacheblock layout bcsstk01.mtx -o out --seed 42\n\
      cacheblock inspect out/bcsstk01_output.txt --expected out/bcsstk01_expected_result.txt"
)]
pub struct Cli {
    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Block a matrix and write its layout, input vector and expected result
    Layout(LayoutArgs),

    /// Parse a layout document, validate it and print a summary
    Inspect(InspectArgs),
}

/// Nonzero visiting order
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    /// Order of entries in the input file
    Input,
    /// Ascending row, then column
    RowMajor,
}

impl From<OrderArg> for VisitOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Input => VisitOrder::Input,
            OrderArg::RowMajor => VisitOrder::RowMajor,
        }
    }
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Matrix Market coordinate file
    #[arg(value_name = "MATRIX")]
    pub matrix: PathBuf,

    /// Prefix for output files (default: matrix file stem)
    #[arg(short, long)]
    pub label: Option<String>,

    /// Directory for the output files
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Seed for density sampling; omit for a random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of the sampling window drawn per tile
    #[arg(long, default_value_t = 0.2)]
    pub sampling_rate: f64,

    /// Fraction of a quadrant drawn when refining its density
    #[arg(long, default_value_t = 0.2)]
    pub refine_rate: f64,

    /// Quadrant density above which a 4x4 tile is attempted
    #[arg(long, default_value_t = 0.5)]
    pub threshold: f64,

    /// Cache line size in bytes
    #[arg(long, default_value_t = 64)]
    pub cache_line_bytes: usize,

    /// Page budget per cache region in bytes
    #[arg(long, default_value_t = 80)]
    pub page_bytes: usize,

    /// Order in which nonzeros seed tiles
    #[arg(long, value_enum, default_value_t = OrderArg::Input)]
    pub order: OrderArg,

    /// Write the JSON run report here instead of stdout
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl LayoutArgs {
    /// Explicit label, or the matrix file stem
    pub fn label(&self) -> Result<String> {
        if let Some(label) = &self.label {
            return Ok(label.clone());
        }
        self.matrix
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("cannot derive a label from {}", self.matrix.display()))
    }

    pub fn config(&self) -> LayoutConfig {
        let mut config = LayoutConfig::new()
            .with_sampling_rate(self.sampling_rate)
            .with_refine_rate(self.refine_rate)
            .with_quadrant_threshold(self.threshold)
            .with_budgets(self.cache_line_bytes, self.page_bytes)
            .with_visit_order(self.order.into());
        config.seed = self.seed;
        config
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Layout document to inspect
    #[arg(value_name = "LAYOUT")]
    pub layout: PathBuf,

    /// Per-tile overhead the layout was written with
    #[arg(long, default_value_t = 3)]
    pub tile_overhead: usize,

    /// Expected result vector to check the layout's product against
    #[arg(long, value_name = "FILE")]
    pub expected: Option<PathBuf>,

    /// Largest accepted absolute difference per entry
    #[arg(long, default_value_t = 1e-9)]
    pub tolerance: f64,
}
