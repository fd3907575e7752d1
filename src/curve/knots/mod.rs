//! Implements the implicit knot vector of a clamped, uniform cubic curve.
//!
//! A curve with `n` control points has the `n+4` knots
//!
//! `U = [0, 0, 0, 0, 1, 2, ..., n-4, n-3, n-3, n-3, n-3]`,
//!
//! that is `u_j = min(max(j-3, 0), n-3)`.
//! The head and tail contain `p+1 = 4` knots of value `0` and `n-3`, respectively,
//! and the `n-4` internal knots are spaced by one.
//! The interval `[0, n-3]` is called 'domain'; it is split into `n-3` polynomial segments.
//!
//! Since the knots follow from the control point count alone, they are never stored
//! while fitting. [`Knots::vector`] materializes them for consumers that need the full vector,
//! e.g. a BREP kernel creating the curve geometry.

use crate::{
    curve::basis::{self, DEGREE},
    types::VecD,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Knots {
    ncp: usize,
}

impl Knots {
    /// Returns the knots of a cubic curve with `ncp > 3` control points.
    pub fn new(ncp: usize) -> Self {
        assert!(ncp > DEGREE, "A cubic curve requires at least {} control points, got {}.", DEGREE + 1, ncp);
        Knots { ncp }
    }

    pub fn degree(&self) -> usize {
        DEGREE
    }

    /// Returns the number of control points the knots belong to.
    pub fn control_points(&self) -> usize {
        self.ncp
    }

    /// Returns the number of polynomial segments, `n-3`.
    pub fn segments(&self) -> usize {
        self.ncp - DEGREE
    }

    pub fn len(&self) -> usize {
        self.ncp + DEGREE + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the `j`-th knot.
    pub fn knot(&self, j: usize) -> f64 {
        assert!(j < self.len(), "Knot index {} exceeds the knot vector length {}.", j, self.len());
        (j.saturating_sub(DEGREE)).min(self.segments()) as f64
    }

    pub fn vector(&self) -> VecD {
        VecD::from_fn(self.len(), |j, _| self.knot(j))
    }

    /// Returns the lower and upper bound of the parameter domain.
    pub fn domain(&self) -> (f64, f64) {
        (0.0, self.segments() as f64)
    }

    pub fn contains(&self, t: f64) -> bool {
        let (lower, upper) = self.domain();
        (lower..=upper).contains(&t)
    }

    /// Clamps `t` into the parameter domain.
    pub fn clamp(&self, t: f64) -> f64 {
        let (lower, upper) = self.domain();
        t.clamp(lower, upper)
    }

    /// Returns the index of the first control point influencing the curve at `t`.
    pub fn span(&self, t: f64) -> usize {
        basis::span(self.ncp, t)
    }

    /// Returns the internal knots, i.e. the unique knots without the domain bounds.
    pub fn internal(&self) -> VecD {
        VecD::from_fn(self.segments() - 1, |i, _| (i + 1) as f64)
    }
}
