//! A square sparse matrix stored as its dense diagonal plus compressed off-diagonal rows.
//!
//! The off-diagonal entries of row `i` are `columns[row_offsets[i]..row_offsets[i + 1]]` and the matching
//! `values`, sorted by column. No off-diagonal entry lies on the diagonal and no stored value is zero.
//! Keeping the diagonal apart makes the Jacobi preconditioner and the degeneracy test a plain vector operation.

use crate::{solver::SolverError, types::VecD};

/// Diagonal magnitude below which a system is considered degenerate.
pub const PIVOT_TOLERANCE: f64 = 1e-14;

#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    diagonal: VecD,
    row_offsets: Vec<usize>,
    columns: Vec<usize>,
    values: Vec<f64>,
}

/// Collects entries row by row and compresses them into a [`SparseMatrix`].
///
/// Repeated entries at the same position are summed.
#[derive(Debug, Clone)]
pub struct SparseMatrixBuilder {
    diagonal: VecD,
    rows: Vec<Vec<(usize, f64)>>,
}

impl SparseMatrixBuilder {
    pub fn new(dim: usize) -> Self {
        SparseMatrixBuilder { diagonal: VecD::zeros(dim), rows: vec![Vec::new(); dim] }
    }

    pub fn dim(&self) -> usize {
        self.diagonal.len()
    }

    /// Adds `value` to the entry at (`row`, `col`).
    pub fn add(&mut self, row: usize, col: usize, value: f64) -> &mut Self {
        let dim = self.dim();
        assert!(row < dim && col < dim, "Entry ({}, {}) lies outside a {}×{} matrix", row, col, dim, dim);

        if row == col {
            self.diagonal[row] += value;
        } else {
            self.rows[row].push((col, value));
        }
        self
    }

    /// Adds `value` to the entries at (`row`, `col`) and (`col`, `row`).
    pub fn add_symmetric(&mut self, row: usize, col: usize, value: f64) -> &mut Self {
        self.add(row, col, value);
        if row != col {
            self.add(col, row, value);
        }
        self
    }

    pub fn diagonal_mut(&mut self) -> &mut VecD {
        &mut self.diagonal
    }

    pub fn build(self) -> SparseMatrix {
        let nnz = self.rows.iter().map(Vec::len).sum();

        let mut row_offsets = Vec::with_capacity(self.diagonal.len() + 1);
        let mut columns = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);
        row_offsets.push(0);

        for mut row in self.rows {
            row.sort_by_key(|&(col, _)| col);

            let mut merged: Option<(usize, f64)> = None;
            for (col, value) in row {
                merged = match merged {
                    Some((c, v)) if c == col => Some((c, v + value)),
                    Some((c, v)) => {
                        if v != 0.0 {
                            columns.push(c);
                            values.push(v);
                        }
                        Some((col, value))
                    }
                    None => Some((col, value)),
                };
            }
            if let Some((c, v)) = merged {
                if v != 0.0 {
                    columns.push(c);
                    values.push(v);
                }
            }
            row_offsets.push(columns.len());
        }

        SparseMatrix { diagonal: self.diagonal, row_offsets, columns, values }
    }
}

impl SparseMatrix {
    pub fn dim(&self) -> usize {
        self.diagonal.len()
    }

    pub fn diagonal(&self) -> &VecD {
        &self.diagonal
    }

    /// Returns the number of stored off-diagonal entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns the off-diagonal entries of row `i` as `(column, value)` pairs.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_offsets[i]..self.row_offsets[i + 1];
        self.columns[range.clone()].iter().copied().zip(self.values[range].iter().copied())
    }

    /// Returns the entry at (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row == col {
            return self.diagonal[row];
        }
        self.row(row).find(|&(c, _)| c == col).map_or(0.0, |(_, v)| v)
    }

    /// Fails with [`SolverError::DegenerateSystem`] if a diagonal entry vanishes.
    pub fn check_diagonal(&self) -> Result<(), SolverError> {
        match self.diagonal.iter().enumerate().find(|(_, d)| d.abs() < PIVOT_TOLERANCE) {
            Some((row, &value)) => Err(SolverError::DegenerateSystem { row, value }),
            None => Ok(()),
        }
    }

    /// Returns `A x`.
    pub fn multiply(&self, x: &VecD) -> Result<VecD, SolverError> {
        self.check_len(x)?;
        let mut out = self.diagonal.component_mul(x);
        for (i, value) in out.iter_mut().enumerate() {
            *value += self.row(i).map(|(j, a)| a * x[j]).sum::<f64>();
        }
        Ok(out)
    }

    /// Returns `Aᵀ x`.
    pub fn multiply_transpose(&self, x: &VecD) -> Result<VecD, SolverError> {
        self.check_len(x)?;
        let mut out = self.diagonal.component_mul(x);
        for i in 0..self.dim() {
            for (j, a) in self.row(i) {
                out[j] += a * x[i];
            }
        }
        Ok(out)
    }

    /// Returns `x ./ diag(A)`, the Jacobi preconditioner applied to `x`.
    pub fn precondition(&self, x: &VecD) -> VecD {
        x.component_div(&self.diagonal)
    }

    fn check_len(&self, x: &VecD) -> Result<(), SolverError> {
        match x.len() {
            len if len == self.dim() => Ok(()),
            found => Err(SolverError::DimensionMismatch { expected: self.dim(), found }),
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{dmatrix, dvector};

    use super::*;

    fn example() -> SparseMatrix {
        // ⎡ 4 1 0 ⎤
        // ⎢ 2 5 0 ⎥
        // ⎣ 0 3 6 ⎦
        let mut builder = SparseMatrixBuilder::new(3);
        builder.add(0, 0, 4.0).add(1, 1, 5.0).add(2, 2, 6.0);
        builder.add(0, 1, 1.0).add(1, 0, 2.0).add(2, 1, 3.0);
        builder.build()
    }

    #[test]
    fn layout() {
        let a = example();
        assert_eq!(a.dim(), 3);
        assert_eq!(a.nnz(), 3);
        assert_eq!(a.diagonal(), &dvector![4., 5., 6.]);
        assert_eq!(a.row(2).collect::<Vec<_>>(), vec![(1, 3.0)]);
        assert_eq!(a.get(0, 1), 1.0);
        assert_eq!(a.get(0, 2), 0.0);
    }

    #[test]
    fn merges_duplicates_and_drops_zeros() {
        let mut builder = SparseMatrixBuilder::new(3);
        builder.add(0, 2, 1.0).add(0, 1, 0.5).add(0, 2, 2.0).add(1, 2, 1.0).add(1, 2, -1.0).add(2, 2, 1.0);
        let a = builder.build();

        assert_eq!(a.row(0).collect::<Vec<_>>(), vec![(1, 0.5), (2, 3.0)]);
        assert_eq!(a.row(1).count(), 0);
        assert_eq!(a.nnz(), 2);
    }

    #[test]
    fn symmetric_entries() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add_symmetric(0, 1, 2.0).add_symmetric(1, 1, 3.0);
        let a = builder.build();
        assert_eq!(a.get(0, 1), 2.0);
        assert_eq!(a.get(1, 0), 2.0);
        assert_eq!(a.get(1, 1), 3.0);
    }

    #[test]
    fn products() {
        let a = example();
        let dense = dmatrix![
            4., 1., 0.;
            2., 5., 0.;
            0., 3., 6.;
        ];
        let x = dvector![1., -2., 0.5];

        assert_eq!(a.multiply(&x).unwrap(), &dense * &x);
        assert_eq!(a.multiply_transpose(&x).unwrap(), dense.transpose() * &x);
        assert_eq!(a.precondition(&x), dvector![0.25, -0.4, 0.5 / 6.]);
    }

    #[test]
    fn dimension_mismatch() {
        assert_eq!(example().multiply(&dvector![1., 2.]), Err(SolverError::DimensionMismatch { expected: 3, found: 2 }));
    }

    #[test]
    fn degenerate_diagonal() {
        let mut builder = SparseMatrixBuilder::new(3);
        builder.add(0, 0, 1.0).add(1, 1, 1e-15).add(2, 2, 1.0).add(0, 1, 1.0);
        assert_eq!(builder.build().check_diagonal(), Err(SolverError::DegenerateSystem { row: 1, value: 1e-15 }));
        assert_eq!(example().check_diagonal(), Ok(()));
    }
}
