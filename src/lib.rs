#![allow(non_snake_case)]
#![cfg_attr(feature = "doc-images",
cfg_attr(all(),
doc = ::embed_doc_image::embed_image!("img-fit", "doc-images/plots/fit/unordered.svg")))]
//! **cloudfit** fits clamped, uniform, cubic B-spline curves to point clouds based on [nalgebra].
//!
//! ## Features
//! - Fit `N`-dimensional (`N = 1, 2, 3,...`) point clouds with a prescribed number of control points
//!   by a [Levenberg-Marquardt iteration][curve::points::methods::fit] over the curve parameters and
//!   the control points together.
//! - Ordered, unordered and periodic (closed) clouds.
//! - First and last control point pinned to the first and last data point.
//! - [Curve evaluation][curve::Curve] of positions and tangents on the implicit [knot vector][curve::knots].
//! - Sparse normal equations solved with a [preconditioned biconjugate gradient method][solver::bicg].
//!
//! ## Fitting a cloud
//!
//! Every cloud point `Q_k` gets a curve parameter `t_k` and the sum of the squared distances
//! `|Q_k - C(t_k)|²` is minimized with respect to both the parameters and the interior control points.
//! Good starting values matter, so the cloud is first seeded:
//! ordered clouds by chord length, unordered clouds from the point farthest away from both endpoints.
//!
//! ![An unordered cloud and the fitted curve.][img-fit]
//!
//! The [result][curve::points::methods::fit::FitResult] holds the control points, the RMS distance
//! of the cloud to the curve and the reason the iteration stopped.
//! Together with [`Knots::vector`](curve::knots::Knots::vector) it describes the curve completely.
//!
//! ## Literature:
//! |            |                                                                                                                          |
//! |-----------:|:-------------------------------------------------------------------------------------------------------------------------|
//! | Piegl1997  | Piegl, L., Tiller, W. The NURBS Book. Monographs in Visual Communication. Springer, Berlin, Heidelberg, 2nd ed., 1997.   |
//! | Press2007  | Press, W. H., Teukolsky, S. A., Vetterling, W. T., Flannery, B. P. Numerical Recipes. Cambridge University Press, 3rd ed., 2007. |

pub mod curve;
pub mod solver;
pub mod types;
