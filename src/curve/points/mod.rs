//! Implements the data points to be approximated and the control points constituting the control polygon of the curve.
//!
//! Both store one point per column of a `dim × count` matrix.
//! Control points are generated as the result of the [least-squares fit][methods::fit].

use crate::types::{MatD, VecD, VecDView, VecDViewMut};

pub mod methods;

#[derive(PartialEq, Debug, Clone)]
pub struct ControlPoints {
    matrix: MatD,
}

#[derive(PartialEq, Debug, Clone)]
pub struct DataPoints {
    pub(self) matrix: MatD,
}

pub trait Points {
    fn matrix(&self) -> &MatD;
    fn matrix_mut(&mut self) -> &mut MatD;

    fn get(&self, i: usize) -> VecDView {
        self.matrix().column(i)
    }

    fn get_mut(&mut self, i: usize) -> VecDViewMut {
        self.matrix_mut().column_mut(i)
    }

    fn first(&self) -> VecDView {
        self.get(0)
    }

    fn last(&self) -> VecDView {
        self.get(self.count() - 1)
    }

    fn dimension(&self) -> usize {
        self.matrix().nrows()
    }

    fn count(&self) -> usize {
        self.matrix().ncols()
    }

    fn is_empty(&self) -> bool {
        self.matrix().is_empty()
    }
}

impl Points for DataPoints {
    fn matrix(&self) -> &MatD {
        &self.matrix
    }

    fn matrix_mut(&mut self) -> &mut MatD {
        &mut self.matrix
    }
}

impl DataPoints {
    pub fn new(matrix: MatD) -> Self {
        DataPoints { matrix }
    }

    /// Creates a three-dimensional point cloud from coordinate triples.
    ///
    /// # Examples
    /// ```
    /// use cloudfit::curve::points::{DataPoints, Points};
    ///
    /// let cloud = DataPoints::from_xyz(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]]);
    /// assert_eq!(cloud.dimension(), 3);
    /// assert_eq!(cloud.count(), 2);
    /// ```
    pub fn from_xyz(points: &[[f64; 3]]) -> Self {
        DataPoints { matrix: MatD::from_fn(3, points.len(), |r, c| points[c][r]) }
    }

    pub fn segments(&self) -> usize {
        self.count().saturating_sub(1)
    }

    /// Returns the index and value of the first non-finite coordinate.
    pub(crate) fn find_non_finite(&self) -> Option<(usize, f64)> {
        self.matrix
            .column_iter()
            .enumerate()
            .find_map(|(i, col)| col.iter().find(|x| !x.is_finite()).map(|&x| (i, x)))
    }

    /// Returns the sum of the distances between consecutive points.
    pub fn chord_length(&self) -> f64 {
        (1..self.count()).map(|g| (self.get(g) - self.get(g - 1)).norm()).sum()
    }
}

impl Points for ControlPoints {
    fn matrix(&self) -> &MatD {
        &self.matrix
    }

    fn matrix_mut(&mut self) -> &mut MatD {
        &mut self.matrix
    }
}

impl ControlPoints {
    pub fn new(matrix: MatD) -> Self {
        ControlPoints { matrix }
    }

    /// Creates `count` control points with the first and last one set to `first` and `last`.
    /// The interior points are zero.
    pub fn pinned(first: VecDView, last: VecDView, count: usize) -> Self {
        let mut matrix = MatD::zeros(first.len(), count);
        matrix.column_mut(0).copy_from(&first);
        matrix.column_mut(count - 1).copy_from(&last);
        ControlPoints { matrix }
    }

    pub fn segments(&self) -> usize {
        self.count() - 1
    }

    /// Returns the control point coordinates in column order `[x0, y0, z0, x1, ...]`.
    pub fn to_flat(&self) -> Vec<f64> {
        self.matrix.as_slice().to_vec()
    }

    pub fn into_matrix(self) -> MatD {
        self.matrix
    }
}

/// An affine map into a frame centered in the bounding box of the points and
/// scaled so that the largest bounding box extent becomes one.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    center: VecD,
    scale: f64,
}

impl Normalization {
    pub fn of(points: &impl Points) -> Self {
        let mat = points.matrix();
        let dim = mat.nrows();

        let mut center = VecD::zeros(dim);
        let mut extent: f64 = 0.0;

        for (r, row) in mat.row_iter().enumerate() {
            let lower = row.min();
            let upper = row.max();
            center[r] = (lower + upper) / 2.0;
            extent = extent.max(upper - lower);
        }

        // all points coincide
        let scale = if extent > 0.0 { 1.0 / extent } else { 1.0 };

        Normalization { center, scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn center(&self) -> &VecD {
        &self.center
    }

    /// Maps the columns of `points` into the normalized frame.
    pub fn apply(&self, points: &mut MatD) {
        for mut col in points.column_iter_mut() {
            col -= &self.center;
            col *= self.scale;
        }
    }

    /// Maps the columns of `points` from the normalized frame back to the original one.
    pub fn revert(&self, points: &mut MatD) {
        for mut col in points.column_iter_mut() {
            col /= self.scale;
            col += &self.center;
        }
    }

    /// Converts a distance measured in the normalized frame into original units.
    pub fn revert_length(&self, length: f64) -> f64 {
        length / self.scale
    }
}
