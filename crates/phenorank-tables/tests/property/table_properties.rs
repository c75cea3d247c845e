//! Property tests for frequency decoding and IC smoothing.

use phenorank_core::config::WeightConfig;
use phenorank_core::models::{Association, SourceProfile};
use phenorank_tables::ic::{assign_ic, smoothed_ic};
use phenorank_tables::WeightCodec;
use proptest::prelude::*;
use rustc_hash::FxHashMap;

proptest! {
    #[test]
    fn ratio_is_clamped_quotient(n in 0u32..10_000, m in 1u32..10_000) {
        let codec = WeightCodec::from_config(&WeightConfig::default(), SourceProfile::Hpo);
        let w = codec.decode(Some(&format!("{n}/{m}")));
        let expected = (n as f64 / m as f64).clamp(0.0, 1.0);
        prop_assert!((w - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_denominator_is_default(n in 0u32..10_000, default in 0.0f64..=1.0) {
        let config = WeightConfig { default_weight: Some(default), ..Default::default() };
        let codec = WeightCodec::from_config(&config, SourceProfile::Orpha);
        prop_assert_eq!(codec.decode(Some(&format!("{n}/0"))), default);
    }

    #[test]
    fn decode_stays_in_unit_interval(token in ".{0,24}") {
        let codec = WeightCodec::from_config(&WeightConfig::default(), SourceProfile::Hpo);
        let w = codec.decode(Some(&token));
        prop_assert!((0.0..=1.0).contains(&w));
    }

    #[test]
    fn ic_is_non_negative_and_monotone(n in 1usize..5_000, df in 1usize..5_000) {
        let df = df.min(n);
        let ic = smoothed_ic(df, n);
        prop_assert!(ic >= 0.0 && ic.is_finite());
        if df < n {
            prop_assert!(smoothed_ic(df, n) > smoothed_ic(df + 1, n));
        }
    }

    #[test]
    fn ubiquitous_feature_has_lowest_ic(n in 2usize..40, extra in proptest::collection::vec(0usize..40, 1..10)) {
        // "F0" appears in every condition; each other feature in a subset.
        let mut associations = Vec::new();
        for c in 0..n {
            associations.push(Association::new(format!("C{c}"), "F0", 1.0));
        }
        let mut ids = vec!["F0".to_string()];
        for (i, k) in extra.iter().enumerate() {
            let fid = format!("F{}", i + 1);
            for c in 0..(k % n) + 1 {
                associations.push(Association::new(format!("C{c}"), fid.clone(), 1.0));
            }
            ids.push(fid);
        }
        let (ic, _) = assign_ic(&ids, &associations, n, &FxHashMap::default());
        for v in &ic[1..] {
            prop_assert!(ic[0] <= *v);
        }
    }
}
