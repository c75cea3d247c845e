//! Query code normalization.

use rustc_hash::FxHashSet;

/// Trim and upper-case each code, dropping blanks and repeats. First
/// occurrence order is kept.
pub fn normalize_query<S: AsRef<str>>(codes: &[S]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    codes
        .iter()
        .map(|c| c.as_ref().trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
