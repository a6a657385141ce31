//! End-to-end layout pipeline
//!
//! Blocking, arrangement and serialization run strictly in sequence: the
//! arranger needs the finished region lists, and the writer needs the
//! arranged order.

use cacheblock_arrange::{StepCounts, Superblock, SuperblockArranger};
use cacheblock_blocking::{BlockingSummary, MatrixBlocker};
use cacheblock_core::{BlockedMatrix, CooMatrix, LayoutConfig, Result};
use cacheblock_layout::{write_expected_result, write_ones_vector, LayoutSerializer, LayoutStats};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Blocked and arranged matrix, ready to serialize
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub blocked: BlockedMatrix,
    pub superblocks: Vec<Superblock>,
    pub blocking: BlockingSummary,
    pub timings: StageTimings,
}

impl PipelineOutput {
    /// Arrangement step counts summed over all superblocks
    pub fn arrangement(&self) -> StepCounts {
        let mut total = StepCounts::default();
        for superblock in &self.superblocks {
            total += superblock.steps;
        }
        total
    }
}

/// Wall-clock seconds per stage
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub blocking: f64,
    pub arrangement: f64,
    pub writing: f64,
}

/// Files written for one matrix
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub layout: PathBuf,
    pub vector: PathBuf,
    pub expected: PathBuf,
}

impl ArtifactPaths {
    /// `<label>_output.txt`, `<label>_vector.txt` and
    /// `<label>_expected_result.txt` inside `dir`
    pub fn for_label(dir: &Path, label: &str) -> Self {
        Self {
            layout: dir.join(format!("{label}_output.txt")),
            vector: dir.join(format!("{label}_vector.txt")),
            expected: dir.join(format!("{label}_expected_result.txt")),
        }
    }
}

/// Machine-readable summary of one run
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub label: String,
    pub rows: usize,
    pub cols: usize,
    pub nnz: usize,
    pub regions: usize,
    pub layout: LayoutStats,
    pub blocking: BlockingSummary,
    pub arrangement: StepCounts,
    pub timings: StageTimings,
    pub artifacts: ArtifactPaths,
    pub config: LayoutConfig,
}

/// Runs blocking, arrangement and serialization with one configuration
///
/// # Examples
///
/// ```
/// use cacheblock::{CooMatrix, LayoutConfig, LayoutPipeline};
///
/// let matrix = CooMatrix::from_triplets(8, 8, &[(0, 0, 1.0), (7, 7, 2.0)]).unwrap();
/// let pipeline = LayoutPipeline::new(LayoutConfig::new().with_seed(5)).unwrap();
///
/// let mut text = Vec::new();
/// let stats = pipeline.write_layout(&matrix, &mut text).unwrap();
/// assert_eq!(stats.stored_nonzeros, 2);
/// ```
#[derive(Clone, Debug)]
pub struct LayoutPipeline {
    config: LayoutConfig,
}

impl LayoutPipeline {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Block and arrange `matrix`
    #[instrument(skip_all, fields(rows = matrix.rows(), cols = matrix.cols(), nnz = matrix.nnz()))]
    pub fn build(&self, matrix: &CooMatrix) -> Result<PipelineOutput> {
        let started = Instant::now();
        let (blocked, blocking) = MatrixBlocker::new(matrix, &self.config)?.run_with_summary()?;
        let blocked_at = Instant::now();

        let superblocks = SuperblockArranger::from_config(&self.config).arrange_all(&blocked)?;
        let arranged_at = Instant::now();

        Ok(PipelineOutput {
            blocked,
            superblocks,
            blocking,
            timings: StageTimings {
                blocking: secs(blocked_at - started),
                arrangement: secs(arranged_at - blocked_at),
                writing: 0.0,
            },
        })
    }

    /// Block, arrange and write the layout document to `out`
    pub fn write_layout<W: Write>(&self, matrix: &CooMatrix, out: W) -> Result<LayoutStats> {
        let output = self.build(matrix)?;
        let stats = LayoutSerializer::write(&output.superblocks, &output.blocked, out)?;
        check_stored(matrix, &stats);
        Ok(stats)
    }

    /// Write the layout and both vector artifacts for `matrix` into `dir`
    #[instrument(skip(self, matrix), fields(dir = %dir.display()))]
    pub fn run_to_dir(&self, label: &str, matrix: &CooMatrix, dir: &Path) -> Result<RunReport> {
        let mut output = self.build(matrix)?;
        let artifacts = ArtifactPaths::for_label(dir, label);

        let write_started = Instant::now();
        let layout =
            LayoutSerializer::write_file(&artifacts.layout, &output.superblocks, &output.blocked)?;
        write_ones_vector(matrix.cols(), File::create(&artifacts.vector)?)?;
        write_expected_result(matrix, File::create(&artifacts.expected)?)?;
        output.timings.writing = secs(write_started.elapsed());
        check_stored(matrix, &layout);

        let report = RunReport {
            label: label.to_string(),
            rows: matrix.rows(),
            cols: matrix.cols(),
            nnz: matrix.nnz(),
            regions: output.blocked.regions().len(),
            layout,
            arrangement: output.arrangement(),
            blocking: output.blocking,
            timings: output.timings,
            artifacts,
            config: self.config.clone(),
        };
        info!(
            tiles = report.layout.tile_count,
            area = report.layout.value_slots,
            stored = report.layout.stored_nonzeros,
            regions = report.regions,
            "layout written"
        );
        Ok(report)
    }
}

fn secs(duration: Duration) -> f64 {
    duration.as_secs_f64()
}

/// Warn when the layout does not store every nonzero of the input
fn check_stored(matrix: &CooMatrix, stats: &LayoutStats) {
    let expected = matrix.entries().iter().filter(|e| e.value != 0.0).count();
    if stats.stored_nonzeros != expected {
        warn!(
            expected,
            stored = stats.stored_nonzeros,
            "layout nonzero count differs from input"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected_up_front() {
        assert!(LayoutPipeline::new(LayoutConfig::new().with_window_radius(9)).is_err());
    }

    #[test]
    fn test_artifact_names_follow_label() {
        let paths = ArtifactPaths::for_label(Path::new("/tmp/out"), "bcsstk01");
        assert_eq!(paths.layout, Path::new("/tmp/out/bcsstk01_output.txt"));
        assert_eq!(paths.vector, Path::new("/tmp/out/bcsstk01_vector.txt"));
        assert_eq!(
            paths.expected,
            Path::new("/tmp/out/bcsstk01_expected_result.txt")
        );
    }

    #[test]
    fn test_build_counts_steps() {
        let triplets: Vec<_> = (0..40).map(|i| (i, i, 1.0)).collect();
        let matrix = CooMatrix::from_triplets(40, 40, &triplets).unwrap();
        let pipeline = LayoutPipeline::new(LayoutConfig::new().with_seed(4)).unwrap();

        let output = pipeline.build(&matrix).unwrap();
        let steps = output.arrangement();
        let tiles = output.blocked.n_tiles();
        let regions = output.superblocks.len();
        assert_eq!(steps.local() + steps.arbitrary, tiles - regions);
    }
}
