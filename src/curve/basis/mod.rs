#![cfg_attr(feature = "doc-images",
cfg_attr(all(),
doc = ::embed_doc_image::embed_image!("basis-functions", "doc-images/plots/basis.svg")))]
//! Evaluates the cubic basis spline functions of the clamped, uniform [knot vector][crate::curve::knots]
//! together with their first derivative.
//!
//! Only the four functions that are nonzero on the knot span containing `t` are computed.
//! They are obtained from the triangular Cox-de Boor scheme (see A2.2 in `Piegl1997`),
//! differentiated term by term so that values and slopes come out of a single sweep.
//!
//! ![The seven basis functions for `ncp = 7`][basis-functions]

/// Polynomial degree of all curves handled by this crate.
pub const DEGREE: usize = 3;

/// The nonzero basis functions on a single knot span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    /// Index of the first active control point, `min(floor(t), ncp - 4)`.
    pub span: usize,
    /// `N_{span+j}(t)` for `j = 0..=3`.
    pub values: [f64; DEGREE + 1],
    /// `dN_{span+j}/dt` for `j = 0..=3`.
    pub derivatives: [f64; DEGREE + 1],
}

impl Basis {
    /// Returns the indices of the four active control points.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.span..self.span + DEGREE + 1
    }
}

/// Returns the index of the first control point influencing the curve at `t`.
pub fn span(ncp: usize, t: f64) -> usize {
    debug_assert!(ncp > DEGREE, "A cubic curve needs at least four control points, got {}", ncp);
    let last = ncp - DEGREE - 1;

    if t <= 0.0 {
        return 0;
    }
    (t.floor() as usize).min(last)
}

/// Evaluates the four cubic basis functions of a curve with `ncp` control points at `t ∈ [0, ncp-3]`.
///
/// The knots surrounding the span are `u = max(0, span+1-j)` to the left and `u = min(ncp-3, span+j)` to the right,
/// which reproduces the four-fold knots at both ends of the clamped knot vector.
///
/// # Examples
/// ```
/// use cloudfit::curve::basis::cubic;
///
/// // Four control points describe a single Bézier segment.
/// let basis = cubic(4, 0.5);
/// assert_eq!(basis.span, 0);
/// assert_eq!(basis.values, [0.125, 0.375, 0.375, 0.125]);
/// ```
pub fn cubic(ncp: usize, t: f64) -> Basis {
    let upper = (ncp - DEGREE) as f64;
    let t = t.clamp(0.0, upper);
    let span = span(ncp, t);

    let mut N = [1.0, 0.0, 0.0, 0.0];
    let mut dN = [0.0; DEGREE + 1];
    let mut left = [0.0; DEGREE + 1];
    let mut right = [0.0; DEGREE + 1];

    for j in 1..=DEGREE {
        left[j] = t - (span + 1).saturating_sub(j) as f64;
        right[j] = ((span + j) as f64).min(upper) - t;

        let mut saved = 0.0;
        let mut dsaved = 0.0;

        for r in 0..j {
            // d(left)/dt = 1 and d(right)/dt = -1, the knot difference itself is constant
            let den = right[r + 1] + left[j - r];
            let temp = N[r] / den;
            let dtemp = dN[r] / den;

            N[r] = saved + right[r + 1] * temp;
            dN[r] = dsaved - temp + right[r + 1] * dtemp;

            saved = left[j - r] * temp;
            dsaved = temp + left[j - r] * dtemp;
        }

        N[j] = saved;
        dN[j] = dsaved;
    }

    Basis { span, values: N, derivatives: dN }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    const EPS: f64 = 1e-12;

    #[rstest]
    fn partition_of_unity(
        #[values(4, 5, 8, 13)] ncp: usize,
        #[values(0.0, 0.1, 0.5, 0.999, 1.0, 1.7, 3.25, 10.0)] fraction: f64,
    ) {
        let t = fraction.min((ncp - 3) as f64);
        let basis = cubic(ncp, t);

        assert_relative_eq!(basis.values.iter().sum::<f64>(), 1.0, epsilon = EPS);
        assert_relative_eq!(basis.derivatives.iter().sum::<f64>(), 0.0, epsilon = EPS);
        assert!(basis.values.iter().all(|&v| v >= -EPS));
    }

    #[test]
    fn bezier_segment() {
        // ncp = 4 yields the Bernstein polynomials on [0, 1]
        let t: f64 = 0.3;
        let s = 1.0 - t;
        let basis = cubic(4, t);

        assert_relative_eq!(basis.values[0], s * s * s, epsilon = EPS);
        assert_relative_eq!(basis.values[1], 3.0 * t * s * s, epsilon = EPS);
        assert_relative_eq!(basis.values[2], 3.0 * t * t * s, epsilon = EPS);
        assert_relative_eq!(basis.values[3], t * t * t, epsilon = EPS);

        assert_relative_eq!(basis.derivatives[0], -3.0 * s * s, epsilon = EPS);
        assert_relative_eq!(basis.derivatives[1], 3.0 * s * s - 6.0 * t * s, epsilon = EPS);
        assert_relative_eq!(basis.derivatives[2], 6.0 * t * s - 3.0 * t * t, epsilon = EPS);
        assert_relative_eq!(basis.derivatives[3], 3.0 * t * t, epsilon = EPS);
    }

    #[test]
    fn uniform_interior_span() {
        // far from the clamped ends the uniform cubic B-spline weights apply
        let basis = cubic(8, 2.5);
        assert_eq!(basis.span, 2);
        assert_relative_eq!(basis.values[0], 1. / 48., epsilon = EPS);
        assert_relative_eq!(basis.values[1], 23. / 48., epsilon = EPS);
        assert_relative_eq!(basis.values[2], 23. / 48., epsilon = EPS);
        assert_relative_eq!(basis.values[3], 1. / 48., epsilon = EPS);

        let knot = cubic(8, 2.0);
        assert_relative_eq!(knot.values[0], 1. / 6., epsilon = EPS);
        assert_relative_eq!(knot.values[1], 2. / 3., epsilon = EPS);
        assert_relative_eq!(knot.values[2], 1. / 6., epsilon = EPS);
        assert_relative_eq!(knot.values[3], 0.0, epsilon = EPS);
    }

    #[test]
    fn clamped_ends() {
        let ncp = 8;

        let start = cubic(ncp, 0.0);
        assert_eq!(start.span, 0);
        assert_eq!(start.values, [1.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(start.derivatives[0], -3.0, epsilon = EPS);
        assert_relative_eq!(start.derivatives[1], 3.0, epsilon = EPS);

        let end = cubic(ncp, 5.0);
        assert_eq!(end.span, 4);
        assert_relative_eq!(end.values[3], 1.0, epsilon = EPS);
        assert_relative_eq!(end.values[0] + end.values[1] + end.values[2], 0.0, epsilon = EPS);
        assert_relative_eq!(end.derivatives[2], -3.0, epsilon = EPS);
        assert_relative_eq!(end.derivatives[3], 3.0, epsilon = EPS);
    }

    #[rstest]
    #[case(0.2)]
    #[case(0.7)]
    #[case(1.3)]
    #[case(3.9)]
    #[case(4.5)]
    fn derivatives_match_finite_differences(#[case] t: f64) {
        let h = 1e-7;
        let ncp = 8;
        let basis = cubic(ncp, t);
        let lower = cubic(ncp, t - h);
        let upper = cubic(ncp, t + h);

        assert_eq!(lower.span, upper.span);
        for j in 0..=DEGREE {
            let fd = (upper.values[j] - lower.values[j]) / (2.0 * h);
            assert_relative_eq!(basis.derivatives[j], fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn out_of_range_parameters_are_clamped() {
        assert_eq!(cubic(6, -0.5), cubic(6, 0.0));
        assert_eq!(cubic(6, 3.5), cubic(6, 3.0));
    }
}
