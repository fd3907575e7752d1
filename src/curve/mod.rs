#![cfg_attr(feature = "doc-images",
cfg_attr(all(),
doc = ::embed_doc_image::embed_image!("img-curve", "doc-images/plots/curve.svg")))]
//! Implements the clamped, uniform, cubic B-spline curve.
//!
//! The curve is defined by
//!
//! `C(t) = Σ_i N_i(t) P_i`
//!
//! with the
//! - parameter `t ∈ [0, n-3]` defining a point on the curve,
//! - `n` control points `P` forming the [control polygon][points],
//! - `n` [cubic basis functions][basis] `N` of the implicit [knot vector][knots].
//!
//! Only four basis functions are nonzero for any `t`, hence evaluation touches four control points.
//!
//! ![A cubic curve with its control polygon.][img-curve]

use thiserror::Error;

use crate::{
    curve::{
        basis::{Basis, DEGREE},
        knots::Knots,
        points::{methods::fit::FitError, ControlPoints, Points},
    },
    types::{MatD, VecD},
};

pub mod basis;
pub mod generation;
pub mod knots;
pub mod parameters;
pub mod points;

#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub knots: Knots,
    pub points: ControlPoints,
}

#[derive(Error, Debug, PartialEq)]
pub enum CurveError {
    #[error("Parameter `t = {t}` lies outside the interval `[{lower_bound}, {upper_bound}]`.")]
    ParameterOutOfBounds { t: f64, lower_bound: f64, upper_bound: f64 },

    #[error("A cubic curve requires at least `{min}` control points, but `n = {n}` were given.")]
    TooFewControlPoints { n: usize, min: usize },

    #[error("The derivative order `k = {k}` is not available, the maximal order is `{k_max}`.")]
    DerivativeNotAvailable { k: usize, k_max: usize },

    #[error("Curve generation failed with error {err}.")]
    FitError { err: FitError },
}

impl From<FitError> for CurveError {
    fn from(err: FitError) -> Self {
        CurveError::FitError { err }
    }
}

/// The position and first derivative of a curve at a parameter, together with the active basis functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub position: VecD,
    pub tangent: VecD,
    pub basis: Basis,
}

impl Evaluation {
    /// Returns the derivative of the position with respect to each control point,
    /// i.e. the basis function values of all `ncp` control points.
    ///
    /// The derivative with respect to coordinate `c` of control point `i` is `weights[i]` times the unit vector `e_c`.
    pub fn weights(&self, ncp: usize) -> VecD {
        let mut weights = VecD::zeros(ncp);
        for (j, i) in self.basis.indices().enumerate() {
            weights[i] = self.basis.values[j];
        }
        weights
    }
}

/// Evaluates the cubic curve with the control points stored column-wise in `points` at `t`.
///
/// Parameters outside of `[0, n-3]` are clamped into the domain.
pub fn evaluate(points: &MatD, t: f64) -> Evaluation {
    let n = points.ncols();
    debug_assert!(n > DEGREE, "A cubic curve needs more than {} control points, got {}.", DEGREE, n);

    let basis = basis::cubic(n, t);
    let mut position = VecD::zeros(points.nrows());
    let mut tangent = VecD::zeros(points.nrows());

    for (j, i) in basis.indices().enumerate() {
        position.axpy(basis.values[j], &points.column(i), 1.0);
        tangent.axpy(basis.derivatives[j], &points.column(i), 1.0);
    }

    Evaluation { position, tangent, basis }
}

impl Curve {
    /// Returns a cubic B-spline with a clamped, uniform knot vector.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::{dmatrix, dvector};
    /// use cloudfit::curve::Curve;
    /// use cloudfit::curve::points::ControlPoints;
    ///
    /// // Create a coordinate matrix containing five 3D points.
    /// let points = ControlPoints::new(dmatrix![
    /// // 1    2    3    4    5
    ///  -2.0,-2.0,-1.0, 0.5, 1.5; // x
    ///  -1.0, 0.0, 1.0, 1.0, 2.0; // y
    ///   0.0, 0.5, 1.5,-0.5,-1.0; // z
    /// ]);
    /// let curve = Curve::new(points).unwrap();
    /// assert_eq!(curve.domain(), (0.0, 2.0));
    /// assert_eq!(curve.evaluate(0.0).unwrap(), dvector![-2.0, -1.0, 0.0]);
    /// ```
    pub fn new(points: ControlPoints) -> Result<Self, CurveError> {
        match points.count() {
            n if n <= DEGREE => Err(CurveError::TooFewControlPoints { n, min: DEGREE + 1 }),
            n => Ok(Curve { knots: Knots::new(n), points }),
        }
    }

    pub fn degree(&self) -> usize {
        DEGREE
    }

    /// Returns the number of polynomial segments.
    pub fn segments(&self) -> usize {
        self.knots.segments()
    }

    /// Returns the dimension of the curve.
    pub fn dimension(&self) -> usize {
        self.points.dimension()
    }

    pub fn domain(&self) -> (f64, f64) {
        self.knots.domain()
    }

    pub fn evaluate(&self, t: f64) -> Result<VecD, CurveError> {
        self.evaluate_derivative(t, 0)
    }

    /// Evaluates the `k`-th derivative with `k ∈ {0, 1}` at `t`.
    pub fn evaluate_derivative(&self, t: f64, k: usize) -> Result<VecD, CurveError> {
        if !self.knots.contains(t) {
            let (lower_bound, upper_bound) = self.domain();
            return Err(CurveError::ParameterOutOfBounds { t, lower_bound, upper_bound });
        }

        let evaluation = evaluate(self.points.matrix(), t);
        match k {
            0 => Ok(evaluation.position),
            1 => Ok(evaluation.tangent),
            k => Err(CurveError::DerivativeNotAvailable { k, k_max: 1 }),
        }
    }

    /// Evaluates position and tangent at `t` in one pass.
    pub fn evaluation(&self, t: f64) -> Result<Evaluation, CurveError> {
        if !self.knots.contains(t) {
            let (lower_bound, upper_bound) = self.domain();
            return Err(CurveError::ParameterOutOfBounds { t, lower_bound, upper_bound });
        }
        Ok(evaluate(self.points.matrix(), t))
    }
}
