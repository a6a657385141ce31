//! End-to-end runs through the layout pipeline

use cacheblock::prelude::*;
use cacheblock_layout::parse_vector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::fs;

/// Banded matrix with some scattered noise, like a discretized operator
fn banded_matrix(n: usize, seed: u64) -> CooMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cells = BTreeSet::new();
    for i in 0..n {
        for d in 0..3 {
            if i + d < n {
                cells.insert((i, i + d));
                cells.insert((i + d, i));
            }
        }
    }
    for _ in 0..n / 2 {
        cells.insert((rng.gen_range(0..n), rng.gen_range(0..n)));
    }
    let triplets: Vec<_> = cells
        .into_iter()
        .map(|(r, c)| (r, c, (r * n + c) as f64 % 7.0 + 1.0))
        .collect();
    CooMatrix::from_triplets(n, n, &triplets).unwrap()
}

#[test]
fn test_run_to_dir_writes_consistent_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let matrix = banded_matrix(64, 1);
    let pipeline = LayoutPipeline::new(LayoutConfig::new().with_seed(21)).unwrap();

    let report = pipeline.run_to_dir("band", &matrix, dir.path()).unwrap();
    assert_eq!(report.nnz, matrix.nnz());
    assert_eq!(report.layout.stored_nonzeros, matrix.nnz());
    assert_eq!(report.artifacts.layout, dir.path().join("band_output.txt"));

    let doc = LayoutDocument::read_file(&report.artifacts.layout, 3).unwrap();
    assert_eq!(doc.stats(), report.layout);
    assert_eq!(doc.superblocks.len(), report.regions);
    doc.check_disjoint().unwrap();

    let vector = parse_vector(&fs::read_to_string(&report.artifacts.vector).unwrap()).unwrap();
    assert_eq!(vector[0] as usize, 64);
    assert_eq!(vector.len(), 65);
    assert!(vector[1..].iter().all(|&v| v == 1.0));

    let expected = parse_vector(&fs::read_to_string(&report.artifacts.expected).unwrap()).unwrap();
    let product = doc.multiply(&vector[1..]).unwrap();
    assert_eq!(product, expected);
}

#[test]
fn test_report_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let matrix = banded_matrix(30, 2);
    let pipeline = LayoutPipeline::new(LayoutConfig::new().with_seed(3)).unwrap();
    let report = pipeline.run_to_dir("small", &matrix, dir.path()).unwrap();

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["label"], "small");
    assert_eq!(json["config"]["seed"], 3);
    assert_eq!(json["config"]["visit_order"], "input");
    assert_eq!(
        json["layout"]["tile_count"].as_u64().unwrap() as usize,
        report.layout.tile_count
    );
    assert!(json["timings"]["blocking"].as_f64().unwrap() >= 0.0);
}

#[test]
fn test_same_seed_same_document() {
    let matrix = banded_matrix(80, 3);
    let config = LayoutConfig::new().with_seed(77);
    let render = || {
        let mut buffer = Vec::new();
        LayoutPipeline::new(config.clone())
            .unwrap()
            .write_layout(&matrix, &mut buffer)
            .unwrap();
        buffer
    };
    assert_eq!(render(), render());
}

#[test]
fn test_regions_partition_large_matrix() {
    let matrix = banded_matrix(100, 4);
    let pipeline = LayoutPipeline::new(LayoutConfig::new().with_seed(8)).unwrap();
    let output = pipeline.build(&matrix).unwrap();

    // 100 / 20 = 5 regions along the diagonal at least
    assert!(output.superblocks.len() >= 5);
    for superblock in &output.superblocks {
        for origin in &superblock.order {
            assert_eq!(origin.row / 20, superblock.region.row);
            assert_eq!(origin.col / 20, superblock.region.col);
        }
    }
    let arranged: usize = output.superblocks.iter().map(|s| s.tile_count()).sum();
    assert_eq!(arranged, output.blocked.n_tiles());
}

#[test]
fn test_scenarios_through_pipeline() {
    let exhaustive = LayoutPipeline::new(LayoutConfig::new().with_rates(1.0).with_seed(0)).unwrap();

    let corner = CooMatrix::from_triplets(5, 5, &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (4, 4, 1.0)]).unwrap();
    let output = exhaustive.build(&corner).unwrap();
    assert_eq!(output.blocked.tile_stats().nnz, 4);
    assert!(output.blocked.contains_origin(Coord::new(4, 4)));

    let lonely = CooMatrix::from_triplets(100, 100, &[(50, 50, 1.0)]).unwrap();
    let output = exhaustive.build(&lonely).unwrap();
    assert_eq!(output.blocked.n_tiles(), 1);
    assert_eq!(output.blocked.tile(Coord::new(50, 50)).unwrap().edge().get(), 1);
}
