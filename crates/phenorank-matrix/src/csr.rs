//! Compressed sparse row matrix.

use serde::{Deserialize, Serialize};

/// Row-major sparse matrix. Column indices within a row are strictly
/// increasing and stored values are never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    pub n_rows: usize,
    pub n_cols: usize,
    /// `indptr[r]..indptr[r + 1]` spans row `r`. Length `n_rows + 1`.
    pub indptr: Vec<usize>,
    pub indices: Vec<usize>,
    pub data: Vec<f64>,
}

impl CsrMatrix {
    pub fn empty(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            indptr: vec![0; n_rows + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Build from `(row, col, value)` triplets.
    ///
    /// Triplets are sorted by `(row, col, value)` before duplicates are summed,
    /// so any permutation of the input gives bit-identical output. Cells that
    /// sum to zero are dropped. Out-of-range triplets are the caller's bug and
    /// are skipped.
    pub fn from_triplets(n_rows: usize, n_cols: usize, mut triplets: Vec<(usize, usize, f64)>) -> Self {
        triplets.retain(|&(r, c, _)| r < n_rows && c < n_cols);
        triplets.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)).then(a.2.total_cmp(&b.2)));

        let mut indptr = vec![0usize; n_rows + 1];
        let mut indices = Vec::with_capacity(triplets.len());
        let mut data = Vec::with_capacity(triplets.len());

        let mut i = 0;
        while i < triplets.len() {
            let (row, col, _) = triplets[i];
            let mut sum = 0.0;
            while i < triplets.len() && triplets[i].0 == row && triplets[i].1 == col {
                sum += triplets[i].2;
                i += 1;
            }
            if sum != 0.0 {
                indices.push(col);
                data.push(sum);
                indptr[row + 1] += 1;
            }
        }
        for r in 0..n_rows {
            indptr[r + 1] += indptr[r];
        }

        Self {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// `(col, value)` pairs of row `row`.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.indptr[row]..self.indptr[row + 1];
        self.indices[span.clone()]
            .iter()
            .copied()
            .zip(self.data[span].iter().copied())
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.n_rows {
            return 0.0;
        }
        let span = self.indptr[row]..self.indptr[row + 1];
        match self.indices[span.clone()].binary_search(&col) {
            Ok(k) => self.data[span.start + k],
            Err(_) => 0.0,
        }
    }

    /// Multiply column `c` by `factors[c]`, dropping cells that become zero.
    pub fn scale_columns(&self, factors: &[f64]) -> Self {
        let triplets = self
            .triplets()
            .map(|(r, c, v)| (r, c, v * factors.get(c).copied().unwrap_or(0.0)))
            .collect();
        Self::from_triplets(self.n_rows, self.n_cols, triplets)
    }

    /// Scale each row to unit L2 norm. All-zero rows stay zero.
    pub fn normalize_rows(&self) -> Self {
        let mut out = self.clone();
        for r in 0..self.n_rows {
            let span = self.indptr[r]..self.indptr[r + 1];
            let norm = out.data[span.clone()].iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 && norm.is_finite() {
                for v in &mut out.data[span] {
                    *v /= norm;
                }
            }
        }
        out
    }

    /// `M · x` for a dense column vector `x` of length `n_cols`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        (0..self.n_rows)
            .map(|r| {
                self.row(r)
                    .map(|(c, v)| v * x.get(c).copied().unwrap_or(0.0))
                    .sum()
            })
            .collect()
    }

    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n_rows).flat_map(move |r| self.row(r).map(move |(c, v)| (r, c, v)))
    }

    /// Check the structural invariants. Returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.indptr.len() != self.n_rows + 1 {
            return Err(format!(
                "indptr has {} entries, expected {}",
                self.indptr.len(),
                self.n_rows + 1
            ));
        }
        if self.indices.len() != self.data.len() {
            return Err(format!(
                "{} indices but {} values",
                self.indices.len(),
                self.data.len()
            ));
        }
        if self.indptr.first() != Some(&0) || self.indptr.last() != Some(&self.data.len()) {
            return Err("indptr does not span the stored values".to_string());
        }
        for r in 0..self.n_rows {
            let (start, end) = (self.indptr[r], self.indptr[r + 1]);
            if start > end {
                return Err(format!("indptr decreases at row {r}"));
            }
            let cols = &self.indices[start..end];
            if cols.iter().any(|&c| c >= self.n_cols) {
                return Err(format!("row {r} has a column index out of range"));
            }
            if cols.windows(2).any(|w| w[0] >= w[1]) {
                return Err(format!("row {r} column indices are not strictly increasing"));
            }
        }
        if self.data.iter().any(|v| !v.is_finite()) {
            return Err("non-finite stored value".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_sum_and_zeros_prune() {
        let m = CsrMatrix::from_triplets(
            3,
            3,
            vec![(2, 1, 0.25), (0, 2, 0.5), (2, 1, 0.25), (1, 0, 0.0), (0, 0, 1.0)],
        );
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.indptr, vec![0, 2, 2, 3]);
        assert_eq!(m.indices, vec![0, 2, 1]);
        assert_eq!(m.get(2, 1), 0.5);
        assert_eq!(m.get(1, 0), 0.0);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn normalize_keeps_zero_rows() {
        let m = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 3.0), (0, 1, 4.0)]).normalize_rows();
        assert!((m.get(0, 0) - 0.6).abs() < 1e-12);
        assert!((m.get(0, 1) - 0.8).abs() < 1e-12);
        assert_eq!(m.row(1).count(), 0);
    }

    #[test]
    fn scale_columns_drops_zeroed_cells() {
        let m = CsrMatrix::from_triplets(1, 2, vec![(0, 0, 1.0), (0, 1, 1.0)]);
        let scaled = m.scale_columns(&[0.0, 2.0]);
        assert_eq!(scaled.nnz(), 1);
        assert_eq!(scaled.get(0, 1), 2.0);
    }

    #[test]
    fn mul_vec_sums_selected_columns() {
        let m = CsrMatrix::from_triplets(2, 3, vec![(0, 0, 1.0), (0, 2, 0.5), (1, 1, 1.0)]);
        assert_eq!(m.mul_vec(&[1.0, 0.0, 2.0]), vec![2.0, 0.0]);
    }

    #[test]
    fn validate_rejects_broken_structure() {
        let mut m = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 1.0), (0, 1, 1.0)]);
        m.indices.swap(0, 1);
        assert!(m.validate().is_err());
        let mut m = CsrMatrix::empty(2, 2);
        m.indptr.pop();
        assert!(m.validate().is_err());
    }
}
