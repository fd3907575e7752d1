#![cfg_attr(feature = "doc-images",
cfg_attr(all(),
doc = ::embed_doc_image::embed_image!("fit-ordered", "doc-images/plots/fit/ordered.svg"),
doc = ::embed_doc_image::embed_image!("fit-unordered", "doc-images/plots/fit/unordered.svg"),
doc = ::embed_doc_image::embed_image!("fit-periodic", "doc-images/plots/fit/periodic.svg")))]
//! Fits a clamped, uniform, cubic curve with `n` control points to a cloud of `m` points.
//!
//! The first and last control point are pinned to the first and last cloud point.
//! The remaining unknowns, one curve parameter `t_k` per cloud point and the `n-2` interior control points,
//! are found together by minimizing the distances
//!
//! `f_k = Q_k - C(t_k)`
//!
//! with a damped Gauss-Newton (Levenberg-Marquardt) iteration, see [levenberg_marquardt].
//! The cloud is moved into a unit frame before the iteration and the result is mapped back afterwards.
//!
//! | Ordered | Unordered | Periodic |
//! |:--------|:----------|:---------|
//! | ![][fit-ordered] | ![][fit-unordered] | ![][fit-periodic] |
//! | Points sampled along the curve,<br>seeded by chord length. | The same points shuffled,<br>seeded from the farthest point. | A closed loop with matching<br>end tangents. |

use thiserror::Error;

use crate::{
    curve::{
        parameters::Parameters,
        points::{ControlPoints, DataPoints, Normalization, Points},
        Curve, CurveError,
    },
    solver::{bicg::BiCgSettings, SolverError},
    types::VecD,
};

pub mod levenberg_marquardt;
pub mod linear;
pub mod seed;

#[derive(Error, Debug, PartialEq)]
pub enum FitError {
    #[error("At least two data points are required, but `m = {m}` were given.")]
    TooFewDataPoints { m: usize },

    #[error("At least three control points are required, but `n = {n}` were requested.")]
    TooFewControlPoints { n: usize },

    #[error("The data points have no coordinates.")]
    EmptyDimension,

    #[error("Data point `{index}` has the non-finite coordinate `{value}`.")]
    NonFinitePoint { index: usize, value: f64 },

    #[error("The initial damping `lambda = {lambda}` must be positive.")]
    NonPositiveLambda { lambda: f64 },

    #[error("The initial relaxation `omega = {omega}` must lie in `(0, 1]`.")]
    InvalidRelaxation { omega: f64 },

    #[error("Solving the normal equations failed with error {err}.")]
    Solver { err: SolverError },
}

impl From<SolverError> for FitError {
    fn from(err: SolverError) -> Self {
        FitError::Solver { err }
    }
}

/// How the cloud points relate to the curve parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ordering {
    /// The points are scattered along the curve in no particular order.
    Unordered,
    /// The points follow the curve from its start to its end.
    Ordered,
    /// Ordered points of a closed curve, the tangents at both ends are kept equal.
    Periodic,
}

/// Settings of the Levenberg-Marquardt iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitOptions {
    /// Bound for both the step length `|delta|` and the objective `|f| / m`.
    pub tolerance: f64,
    pub max_iterations: usize,
    pub initial_lambda: f64,
    /// Initial relaxation of the control point steps.
    pub initial_omega: f64,
    /// Factor applied to `omega` after every iteration, the relaxation never exceeds one.
    pub omega_growth: f64,
    /// Lower bound of the diagonal of the control point block of `JᵀJ`.
    pub hessian_floor: f64,
    pub bicg: BiCgSettings,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            tolerance: 1e-6,
            max_iterations: 501,
            initial_lambda: 1.0,
            initial_omega: 0.25,
            omega_growth: 1.01,
            hessian_floor: 1e-6,
            bicg: BiCgSettings::default(),
        }
    }
}

/// Why the fit stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// Too few points for a cubic fit, the control points lie on the line between the endpoints.
    LinearFallback,
    /// The Newton step became shorter than the tolerance.
    StepTolerance,
    /// The objective fell below the tolerance.
    ObjectiveTolerance,
    /// The iteration budget was exhausted, the last accepted state is returned.
    IterationLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// The fitted control points in the frame of the input cloud.
    pub points: ControlPoints,
    /// The curve parameter of every cloud point.
    pub parameters: Parameters,
    /// `sqrt(Σ|f_k|² / m)` in the units of the input cloud.
    pub rms: f64,
    pub iterations: usize,
    pub termination: Termination,
    /// The objective `|f| / m` of the seed followed by that of every accepted step, in the unit frame.
    pub objectives: Vec<f64>,
}

impl FitResult {
    /// Returns the fitted curve, failing for the three control points of a linear fallback.
    pub fn into_curve(self) -> Result<Curve, CurveError> {
        Curve::new(self.points)
    }
}

/// RMS reported for a linear fallback.
pub const FALLBACK_RMS: f64 = 1e-12;

fn input_checks(points: &DataPoints, control_points: usize, options: &FitOptions) -> Result<(), FitError> {
    if let Some((index, value)) = points.find_non_finite() {
        return Err(FitError::NonFinitePoint { index, value });
    }

    match (points.dimension(), points.count(), control_points) {
        (0, _, _) => Err(FitError::EmptyDimension),
        (_, m, _) if m < 2 => Err(FitError::TooFewDataPoints { m }),
        (_, _, n) if n < 3 => Err(FitError::TooFewControlPoints { n }),
        _ => match (options.initial_lambda, options.initial_omega) {
            (lambda, _) if lambda.is_nan() || lambda <= 0.0 => Err(FitError::NonPositiveLambda { lambda }),
            (_, omega) if omega.is_nan() || omega <= 0.0 || omega > 1.0 => Err(FitError::InvalidRelaxation { omega }),
            _ => Ok(()),
        },
    }
}

/// Fits `control_points` control points to the cloud with the default [`FitOptions`].
///
/// # Examples
/// ```
/// use nalgebra::dmatrix;
/// use cloudfit::curve::points::{methods::fit::{fit, Ordering, Termination}, DataPoints, Points};
///
/// let cloud = DataPoints::new(dmatrix![
///     0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0;
///     0.0, 0.8, 1.4, 1.6, 1.4, 0.8, 0.0;
/// ]);
/// let result = fit(&cloud, 5, Ordering::Ordered).unwrap();
///
/// assert_eq!(result.points.first(), cloud.first());
/// assert_eq!(result.points.last(), cloud.last());
/// assert_ne!(result.termination, Termination::LinearFallback);
/// assert!(result.rms < 0.05);
/// ```
pub fn fit(points: &DataPoints, control_points: usize, ordering: Ordering) -> Result<FitResult, FitError> {
    fit_with_options(points, control_points, ordering, &FitOptions::default())
}

pub fn fit_with_options(
    points: &DataPoints,
    control_points: usize,
    ordering: Ordering,
    options: &FitOptions,
) -> Result<FitResult, FitError> {
    input_checks(points, control_points, options)?;

    let (m, n) = (points.count(), control_points);
    if m < n || n == 3 {
        log::warn!("No cubic fit of {} control points to {} data points, falling back to a line", n, m);
        return Ok(FitResult {
            points: linear::fit(points, n),
            parameters: Parameters::new(VecD::zeros(m), n.saturating_sub(3) as f64),
            rms: FALLBACK_RMS,
            iterations: 0,
            termination: Termination::LinearFallback,
            objectives: Vec::new(),
        });
    }

    let normalization = Normalization::of(points);
    let mut normalized = points.clone();
    normalization.apply(normalized.matrix_mut());

    let seed = match ordering {
        Ordering::Unordered => seed::unordered(&normalized, n),
        Ordering::Ordered | Ordering::Periodic => seed::ordered(&normalized, n),
    };

    let minimum = levenberg_marquardt::minimize(&normalized, seed, ordering == Ordering::Periodic, options)?;

    let mut fitted = minimum.points;
    normalization.revert(fitted.matrix_mut());
    // the endpoints are exact copies, not round trips through the unit frame
    fitted.get_mut(0).copy_from(&points.first());
    fitted.get_mut(n - 1).copy_from(&points.last());

    let rms = normalization.revert_length(minimum.residuals.norm() / (m as f64).sqrt());
    log::info!(
        "Fitted {} control points to {} data points after {} iterations ({:?}), rms = {:e}",
        n,
        m,
        minimum.iterations,
        minimum.termination,
        rms
    );

    Ok(FitResult {
        points: fitted,
        parameters: minimum.parameters,
        rms,
        iterations: minimum.iterations,
        termination: minimum.termination,
        objectives: minimum.objectives,
    })
}
