//! Property tests for ranking.

use phenorank_core::models::{Association, Condition, Feature, MatrixVariant, Tables};
use phenorank_matrix::IndexCompiler;
use phenorank_retrieval::RetrievalEngine;
use proptest::prelude::*;

fn tables_from(edges: &[(usize, usize, f64)], n_conditions: usize, n_features: usize) -> Tables {
    Tables::new(
        (0..n_conditions)
            .map(|i| Condition::new(format!("ORPHA:{i:03}"), format!("condition {i}")))
            .collect(),
        (0..n_features)
            .map(|j| Feature::new(format!("HP:{j:07}"), None, 1.0 + j as f64 / 10.0))
            .collect(),
        edges
            .iter()
            .map(|&(r, c, w)| Association::new(format!("ORPHA:{r:03}"), format!("HP:{c:07}"), w))
            .collect(),
    )
}

fn engine(tables: &Tables, variant: MatrixVariant) -> RetrievalEngine {
    let artifacts = IndexCompiler::new().compile(tables).artifacts;
    RetrievalEngine::new(&artifacts, variant, tables).unwrap()
}

proptest! {
    #[test]
    fn results_are_ordered_positive_and_bounded(
        edges in prop::collection::vec((0usize..8, 0usize..6, 0.0f64..=1.0), 1..40),
        query in prop::collection::vec(0usize..6, 1..4),
        top_k in 1usize..10,
        use_ic in any::<bool>(),
    ) {
        let tables = tables_from(&edges, 8, 6);
        let engine = engine(&tables, MatrixVariant::Weight);
        let codes: Vec<String> = query.iter().map(|j| format!("HP:{j:07}")).collect();
        let outcome = engine.retrieve(&codes, top_k, use_ic).unwrap();

        let nonzero = (0..8)
            .filter(|r| edges.iter().any(|e| e.0 == *r && query.contains(&e.1) && e.2 > 0.0))
            .count();
        prop_assert_eq!(outcome.results.len(), top_k.min(nonzero));
        for pair in outcome.results.windows(2) {
            prop_assert!(pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].condition_id < pair[1].condition_id));
        }
        prop_assert!(outcome.results.iter().all(|r| r.score > 0.0));
    }

    #[test]
    fn diagonal_condition_ranks_first(n in 2usize..12, pick in 0usize..12) {
        let pick = pick % n;
        let edges: Vec<_> = (0..n).map(|i| (i, i, 1.0)).collect();
        let tables = tables_from(&edges, n, n);
        for variant in MatrixVariant::ALL {
            let outcome = engine(&tables, variant)
                .retrieve(&[format!("hp:{pick:07}")], 3, false)
                .unwrap();
            prop_assert_eq!(&outcome.results[0].condition_id, &format!("ORPHA:{pick:03}"));
        }
    }

    #[test]
    fn query_order_does_not_change_ranking(
        edges in prop::collection::vec((0usize..8, 0usize..6, 0.0f64..=1.0), 1..40),
        query in prop::collection::vec(0usize..6, 1..5),
    ) {
        let tables = tables_from(&edges, 8, 6);
        let engine = engine(&tables, MatrixVariant::WeightNorm);
        let codes: Vec<String> = query.iter().map(|j| format!("HP:{j:07}")).collect();
        let mut reversed = codes.clone();
        reversed.reverse();
        let a = engine.retrieve(&codes, 8, true).unwrap();
        let b = engine.retrieve(&reversed, 8, true).unwrap();
        let ids = |o: &phenorank_retrieval::RetrievalOutcome| {
            o.results.iter().map(|r| r.condition_id.clone()).collect::<Vec<_>>()
        };
        prop_assert_eq!(ids(&a), ids(&b));
    }
}
