#![cfg_attr(feature = "doc-images",
cfg_attr(all(),
doc = ::embed_doc_image::embed_image!("points", "doc-images/plots/generation/points.svg"),
doc = ::embed_doc_image::embed_image!("manual", "doc-images/plots/generation/manual.svg"),
doc = ::embed_doc_image::embed_image!("fit", "doc-images/plots/generation/fit.svg")))]
//! Generates a curve from a given control polygon or from a point cloud.
//!
//! ## Methods
//!
//! - Manual control polygon
//! - Least-squares fit to a point cloud
//!   - ordered, unordered or periodic data
//!   - first and last control point pinned to the first and last data point
//!
//! | Raw Data | Manual Control Polygon | Least-Squares Fit |
//! |:---------|:-----------------------|:------------------|
//! | ![][points] | ![][manual] | ![][fit] |
//! | Scattered, 2-dimensional data points<br>(`m = 18`). | Curve with `n = m` control points<br>taken directly from the data points. | Curve with `n = 7` control points<br>approximating the ordered data points. |

use crate::curve::{
    points::{
        methods::fit::{self, Ordering},
        ControlPoints, DataPoints,
    },
    Curve, CurveError,
};

pub enum Generation<'a> {
    Manual {
        points: ControlPoints,
    },
    LeastSquaresFit {
        points: &'a DataPoints,
        control_points: usize,
        ordering: Ordering,
    },
}

/// Returns a clamped, uniform, cubic B-spline curve.
///
/// # Examples
/// ```
/// use nalgebra::dmatrix;
/// use cloudfit::curve::generation::{generate, Generation::{LeastSquaresFit, Manual}};
/// use cloudfit::curve::points::{methods::fit::Ordering, ControlPoints, DataPoints};
///
/// // Create a coordinate matrix containing five 2D points.
/// let points = ControlPoints::new(dmatrix![
/// // 1    2    3    4    5
///  -2.0,-2.0,-1.0, 0.5, 1.5; // x
///  -1.0, 0.0, 1.0, 1.0, 2.0; // y
/// ]);
/// let curve = generate(Manual { points }).unwrap();
/// println!("{:?}", curve.evaluate(0.5));
///
/// let cloud = DataPoints::new(dmatrix![
///   0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0;
///   0.0, 0.8, 1.4, 1.6, 1.4, 0.8, 0.0;
/// ]);
/// let fitted = generate(LeastSquaresFit { points: &cloud, control_points: 5, ordering: Ordering::Ordered }).unwrap();
/// assert_eq!(fitted.domain(), (0.0, 2.0));
/// ```
pub fn generate(generation: Generation) -> Result<Curve, CurveError> {
    match generation {
        Generation::Manual { points } => Curve::new(points),
        Generation::LeastSquaresFit { points, control_points, ordering } => {
            let result = fit::fit(points, control_points, ordering)?;
            result.into_curve()
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::dmatrix;

    use super::*;
    use crate::curve::points::{methods::fit::FitError, Points};

    #[test]
    fn manual() {
        let points = ControlPoints::new(dmatrix![0., 1., 2., 3.; 0., 1., 1., 0.;]);
        let curve = generate(Generation::Manual { points: points.clone() }).unwrap();
        assert_eq!(curve.points, points);
        assert_eq!(curve.segments(), 1);
    }

    #[test]
    fn least_squares_fit() {
        let cloud = DataPoints::from_xyz(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.5, 0.1],
            [2.0, 0.8, 0.3],
            [3.0, 0.9, 0.6],
            [4.0, 0.8, 1.0],
            [5.0, 0.5, 1.5],
        ]);
        let curve = generate(Generation::LeastSquaresFit { points: &cloud, control_points: 4, ordering: Ordering::Ordered })
            .unwrap();

        assert_eq!(curve.dimension(), 3);
        assert_eq!(curve.points.first(), cloud.first());
        assert_eq!(curve.evaluate(1.0).unwrap(), cloud.last().clone_owned());
    }

    #[test]
    fn fit_errors_are_forwarded() {
        let cloud = DataPoints::from_xyz(&[[0.0; 3]]);
        assert_eq!(
            generate(Generation::LeastSquaresFit { points: &cloud, control_points: 4, ordering: Ordering::Unordered }),
            Err(CurveError::FitError { err: FitError::TooFewDataPoints { m: 1 } })
        );
    }

    #[test]
    fn linear_fallback_is_no_cubic_curve() {
        let cloud = DataPoints::from_xyz(&[[0.0; 3], [1.0; 3]]);
        assert_eq!(
            generate(Generation::LeastSquaresFit { points: &cloud, control_points: 3, ordering: Ordering::Ordered }),
            Err(CurveError::TooFewControlPoints { n: 3, min: 4 })
        );
    }
}
