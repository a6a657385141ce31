//! Reproducibility of whole-pipeline runs

use cacheblock::prelude::*;
use cacheblock::SamplingEngine;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

/// Random matrix drawn from a portable generator
fn chacha_matrix(n: usize, density: f64, seed: u64) -> CooMatrix {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cells = BTreeSet::new();
    for row in 0..n {
        for col in 0..n {
            if rng.gen_bool(density) {
                cells.insert((row, col));
            }
        }
    }
    let triplets: Vec<_> = cells
        .into_iter()
        .map(|(r, c)| (r, c, rng.gen_range(1..10) as f64))
        .collect();
    CooMatrix::from_triplets(n, n, &triplets).unwrap()
}

fn render(matrix: &CooMatrix, config: &LayoutConfig) -> (Vec<u8>, LayoutStats) {
    let mut buffer = Vec::new();
    let stats = LayoutPipeline::new(config.clone())
        .unwrap()
        .write_layout(matrix, &mut buffer)
        .unwrap();
    (buffer, stats)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_fixed_seed_gives_identical_layout(
        n in 1usize..45,
        density in 0.02f64..0.6,
        matrix_seed in any::<u64>(),
        sampling_seed in any::<u64>(),
    ) {
        let matrix = chacha_matrix(n, density, matrix_seed);
        let config = LayoutConfig::new().with_seed(sampling_seed);

        let (first, stats) = render(&matrix, &config);
        let (second, _) = render(&matrix, &config);
        prop_assert_eq!(&first, &second);

        let doc = LayoutDocument::parse(std::str::from_utf8(&first).unwrap(), config.tile_overhead)
            .unwrap();
        prop_assert_eq!(doc.stats(), stats);
        prop_assert_eq!(stats.stored_nonzeros, matrix.nnz());
        prop_assert_eq!(doc.row_sums(), matrix.row_sums());
    }

    #[test]
    fn prop_chacha_sampler_is_reproducible(
        n in 1usize..40,
        matrix_seed in any::<u64>(),
        sampling_seed in any::<u64>(),
    ) {
        let matrix = chacha_matrix(n, 0.25, matrix_seed);
        let config = LayoutConfig::new();
        let run = || {
            let sampler = SamplingEngine::new(ChaCha8Rng::seed_from_u64(sampling_seed));
            MatrixBlocker::with_sampler(&matrix, &config, sampler)
                .unwrap()
                .run()
                .unwrap()
        };
        let (a, b) = (run(), run());
        let tiles_a: Vec<_> = a.tiles().map(|t| (t.origin(), t.edge().get())).collect();
        let tiles_b: Vec<_> = b.tiles().map(|t| (t.origin(), t.edge().get())).collect();
        prop_assert_eq!(tiles_a, tiles_b);
        prop_assert_eq!(a.tile_stats().nnz, matrix.nnz());
    }
}
