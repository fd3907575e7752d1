//! Implements the parameter assignment of the data points, i.e. the curve parameter `t_k ∈ [0, n-3]`
//! at which data point `k` is believed to lie.
//!
//! - Chord-length method for ordered data
//! - Projection onto the control polygon for unordered data

use crate::{
    curve::points::{ControlPoints, DataPoints, Points},
    types::VecD,
};

pub mod methods;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    vector: VecD,
    upper_bound: f64,
}

impl Parameters {
    pub fn new(vector: VecD, upper_bound: f64) -> Self {
        Parameters { vector, upper_bound }
    }

    pub fn vector(&self) -> &VecD {
        &self.vector
    }

    pub fn into_vector(self) -> VecD {
        self.vector
    }

    /// Returns the upper bound `n-3` of the parameter domain.
    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn count(&self) -> usize {
        self.vector.len()
    }
}

pub enum Method<'a> {
    /// Cumulative chord length of the ordered data points.
    ChordLength,
    /// Closest point on the given control polygon.
    Projection { polygon: &'a ControlPoints },
}

/// Assigns a parameter to every data point for a curve with `control_points` control points.
///
/// # Examples
/// ```
/// use nalgebra::dmatrix;
/// use cloudfit::curve::parameters::{generate, Method::ChordLength};
/// use cloudfit::curve::points::DataPoints;
///
/// let points = DataPoints::new(dmatrix![0.0, 1.0, 3.0, 4.0;]);
/// let params = generate(&points, 6, ChordLength);
/// assert_eq!(params.vector().as_slice(), [0.0, 0.75, 2.25, 3.0]);
/// ```
pub fn generate(points: &DataPoints, control_points: usize, method: Method) -> Parameters {
    let upper_bound = control_points.saturating_sub(3) as f64;
    match method {
        Method::ChordLength => methods::chord_length(points, upper_bound),
        Method::Projection { polygon } => {
            debug_assert_eq!(polygon.count(), control_points);
            methods::projection(points, polygon, upper_bound)
        }
    }
}
