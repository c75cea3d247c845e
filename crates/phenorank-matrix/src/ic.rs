//! IC vector aligned to the column mapping.

use phenorank_core::models::Feature;
use rustc_hash::FxHashMap;

use crate::mapping::IndexMapping;

/// IC used when no column has a finite value.
pub const FALLBACK_IC: f64 = 1.0;

/// One IC per column, in column order.
///
/// Columns whose feature is absent or has a non-finite IC get the median of
/// the finite values. Returns the vector and how many columns were filled.
pub fn align_ic_vector(mapping: &IndexMapping, features: &[Feature]) -> (Vec<f64>, usize) {
    let by_id: FxHashMap<&str, f64> = features
        .iter()
        .map(|f| (f.feature_id.as_str(), f.ic))
        .collect();
    let raw: Vec<Option<f64>> = mapping
        .feature_ids()
        .iter()
        .map(|id| by_id.get(id.as_str()).copied().filter(|v| v.is_finite()))
        .collect();

    let fill = median(raw.iter().flatten().copied().collect()).unwrap_or(FALLBACK_IC);
    let filled = raw.iter().filter(|v| v.is_none()).count();
    if filled > 0 {
        tracing::debug!(filled, fill, "filled missing IC values with the median");
    }
    (raw.into_iter().map(|v| v.unwrap_or(fill)).collect(), filled)
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}
