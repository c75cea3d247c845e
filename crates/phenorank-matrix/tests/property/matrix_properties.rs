//! Property tests for matrix compilation.

use phenorank_core::models::{Association, Condition, Feature, MatrixVariant, Tables};
use phenorank_matrix::{CsrMatrix, IndexCompiler};
use proptest::prelude::*;

fn edges() -> impl Strategy<Value = Vec<(usize, usize, f64)>> {
    prop::collection::vec((0usize..6, 0usize..5, 0.0f64..=1.0), 0..40)
}

fn tables_from(edges: &[(usize, usize, f64)]) -> Tables {
    Tables::new(
        (0..6).map(|i| Condition::new(format!("ORPHA:{i}"), "")).collect(),
        (0..5)
            .map(|j| Feature::new(format!("HP:{j:07}"), None, 0.5 + j as f64))
            .collect(),
        edges
            .iter()
            .map(|&(r, c, w)| Association::new(format!("ORPHA:{r}"), format!("HP:{c:07}"), w))
            .collect(),
    )
}

proptest! {
    #[test]
    fn permutation_of_triplets_is_bit_identical(
        edges in edges(),
        seed in any::<u64>(),
    ) {
        let mut shuffled = edges.clone();
        // deterministic Fisher-Yates from the seed
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            shuffled.swap(i, j);
        }
        let a = CsrMatrix::from_triplets(6, 5, edges);
        let b = CsrMatrix::from_triplets(6, 5, shuffled);
        prop_assert_eq!(a.indptr, b.indptr);
        prop_assert_eq!(a.indices, b.indices);
        let bits = |m: &[f64]| m.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        prop_assert_eq!(bits(&a.data), bits(&b.data));
    }

    #[test]
    fn cells_hold_the_sum_of_their_duplicates(edges in edges()) {
        let m = CsrMatrix::from_triplets(6, 5, edges.clone());
        prop_assert!(m.validate().is_ok());
        for r in 0..6 {
            for c in 0..5 {
                let expected: f64 = edges.iter().filter(|e| e.0 == r && e.1 == c).map(|e| e.2).sum();
                prop_assert!((m.get(r, c) - expected).abs() < 1e-9);
            }
        }
        prop_assert!(m.data.iter().all(|v| *v != 0.0));
    }

    #[test]
    fn normalized_rows_have_unit_or_zero_norm(edges in edges()) {
        let compiled = IndexCompiler::new().compile(&tables_from(&edges)).artifacts;
        for variant in [MatrixVariant::WeightNorm, MatrixVariant::WeightIcNorm] {
            let m = compiled.matrix(variant).unwrap();
            for r in 0..m.n_rows {
                let norm = m.row(r).map(|(_, v)| v * v).sum::<f64>().sqrt();
                prop_assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-9, "row {} norm {}", r, norm);
            }
        }
    }

    #[test]
    fn compiled_shape_follows_the_entity_tables(edges in edges()) {
        let output = IndexCompiler::new().compile(&tables_from(&edges));
        prop_assert_eq!(output.report.dropped_edges, 0);
        for m in output.artifacts.matrices.values() {
            prop_assert_eq!(m.shape(), (6, 5));
        }
    }
}
