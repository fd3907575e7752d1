//! Initial guesses of the control polygon and the parameters for the Levenberg-Marquardt iteration.

use crate::{
    curve::{
        parameters::{self, Method, Parameters},
        points::{ControlPoints, DataPoints, Points},
    },
    types::MatD,
};

/// A starting point of the iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    pub points: ControlPoints,
    pub parameters: Parameters,
}

/// Seeds ordered data.
///
/// Interior control point `j` is placed on data point `⌊j(m-1)/(n-1)⌋` and the parameters follow
/// the cumulative chord length.
pub fn ordered(points: &DataPoints, control_points: usize) -> Seed {
    let (m, n) = (points.count(), control_points);
    let mut cp = ControlPoints::pinned(points.first(), points.last(), n);

    for j in 1..n - 1 {
        cp.get_mut(j).copy_from(&points.get(j * (m - 1) / (n - 1)));
    }

    Seed { parameters: parameters::generate(points, n, Method::ChordLength), points: cp }
}

/// Seeds scattered data.
///
/// The middle control point `⌊(n-1)/2⌋` is placed on the data point farthest from both endpoints and
/// the other interior points are spread linearly in between. Each data point then takes the parameter
/// of its projection onto that polygon.
pub fn unordered(points: &DataPoints, control_points: usize) -> Seed {
    let n = control_points;
    let (first, last) = (points.first(), points.last());

    let farthest = points
        .matrix()
        .column_iter()
        .map(|q| (q - first).norm().min((q - last).norm()))
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (k, d)| if d > best.1 { (k, d) } else { best });
    let apex = points.get(farthest.0);

    let middle = (n - 1) / 2;
    let mut cp = ControlPoints::pinned(first, last, n);
    for j in 1..n - 1 {
        let (a, b, s) = if j <= middle {
            (first, apex, j as f64 / middle as f64)
        } else {
            (apex, last, (j - middle) as f64 / (n - 1 - middle) as f64)
        };
        cp.get_mut(j).copy_from(&(a * (1.0 - s) + b * s));
    }

    let parameters = parameters::generate(points, n, Method::Projection { polygon: &cp });
    Seed { points: cp, parameters }
}

/// Replaces the first and last leg of the control polygon by their mean so that both end tangents agree.
///
/// With `d = ((P_1 - P_0) + (P_{n-1} - P_{n-2})) / 2` the points become `P_1 = P_0 + d` and
/// `P_{n-2} = P_{n-1} - d`.
pub fn symmetrize(points: &mut MatD) {
    let n = points.ncols();
    if n < 4 {
        return;
    }

    let d = ((points.column(1) - points.column(0)) + (points.column(n - 1) - points.column(n - 2))) / 2.0;
    let head = points.column(0) + &d;
    let tail = points.column(n - 1) - &d;
    points.set_column(1, &head);
    points.set_column(n - 2, &tail);
}
