use crate::{
    curve::{
        parameters::Parameters,
        points::{ControlPoints, DataPoints, Points},
    },
    types::VecD,
};

/// Distributes the parameters according to the cumulative chord length, scaled to `[0, upper_bound]`.
///
/// Falls back to equally spaced parameters if all points coincide.
///  see eqs. (9.4) and (9.5) in `Piegl1997`
pub fn chord_length(points: &DataPoints, upper_bound: f64) -> Parameters {
    let m = points.segments();
    let sum = points.chord_length();

    let mut t_bar = VecD::zeros(points.count());
    if m == 0 {
        return Parameters::new(t_bar, upper_bound);
    }

    if sum <= f64::EPSILON {
        for g in 1..=m {
            t_bar[g] = upper_bound * g as f64 / m as f64;
        }
        return Parameters::new(t_bar, upper_bound);
    }

    let mut accum = 0.0;
    for g in 1..m {
        accum += (points.get(g) - points.get(g - 1)).norm();
        t_bar[g] = upper_bound * accum / sum;
    }
    t_bar[m] = upper_bound;

    Parameters::new(t_bar, upper_bound)
}

/// Assigns every point the parameter of its closest point on the piecewise linear control polygon.
///
/// A point on polygon leg `j` at fraction `s` maps to `(j + s) · upper_bound / legs`.
pub fn projection(points: &DataPoints, polygon: &ControlPoints, upper_bound: f64) -> Parameters {
    let legs = polygon.segments();

    let t_bar = VecD::from_iterator(
        points.count(),
        points.matrix().column_iter().map(|q| {
            let mut best = f64::INFINITY;
            let mut t = 0.0;

            for j in 0..legs {
                let a = polygon.get(j);
                let d = polygon.get(j + 1) - a;
                let dd = d.norm_squared();

                let s = if dd > 0.0 { ((q - a).dot(&d) / dd).clamp(0.0, 1.0) } else { 0.0 };
                let dist = (q - a - s * &d).norm();

                if dist < best {
                    best = dist;
                    t = (j as f64 + s) * upper_bound / legs as f64;
                }
            }
            t
        }),
    );

    Parameters::new(t_bar, upper_bound)
}
