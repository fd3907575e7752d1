use crate::curve::points::{ControlPoints, DataPoints, Points};

/// Places the control points equally spaced on the line from the first to the last data point.
///
/// Used whenever a cubic fit is not possible, i.e. for fewer data points than control points
/// or for three control points.
pub fn fit(points: &DataPoints, control_points: usize) -> ControlPoints {
    let n = control_points;
    let mut cp = ControlPoints::pinned(points.first(), points.last(), n);

    let start = points.first();
    let direction = points.last() - points.first();
    for j in 1..n - 1 {
        let mut col = cp.get_mut(j);
        col.copy_from(&start);
        col.axpy(j as f64 / (n - 1) as f64, &direction, 1.0);
    }
    cp
}
