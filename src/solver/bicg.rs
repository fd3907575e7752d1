//! Preconditioned biconjugate gradient method (see `linbcg` in `Press2007`).
//!
//! The method only needs products with `A` and `Aᵀ`, so the normal equations never have to be factorized.
//! The preconditioner is the diagonal of `A`.

use log::trace;

use crate::{
    solver::{sparse::SparseMatrix, SolverError},
    types::VecD,
};

/// The error estimate compared against the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Criterion {
    /// `|b - A x| / |b|`
    Residual,
    /// `|Ã⁻¹ (b - A x)| / |Ã⁻¹ b|` with the preconditioner `Ã`
    PreconditionedResidual,
    /// Estimated relative change of the solution, `|x - x_exact| / |x|`
    SolutionChange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BiCgSettings {
    pub tolerance: f64,
    /// The iteration limit, `0` selects twice the system dimension.
    pub max_iterations: usize,
    pub criterion: Criterion,
}

impl Default for BiCgSettings {
    fn default() -> Self {
        BiCgSettings { tolerance: 1e-10, max_iterations: 0, criterion: Criterion::Residual }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiCgSolution {
    /// The error estimate of the returned solution according to the chosen [`Criterion`].
    pub error: f64,
    pub iterations: usize,
}

/// Solves `A x = b` in place, starting from the initial guess in `x`.
///
/// # Examples
/// ```
/// use nalgebra::dvector;
/// use cloudfit::solver::{bicg, sparse::SparseMatrixBuilder};
///
/// let mut builder = SparseMatrixBuilder::new(2);
/// builder.add(0, 0, 4.0).add(1, 1, 3.0).add_symmetric(0, 1, 1.0);
/// let a = builder.build();
///
/// let mut x = dvector![0.0, 0.0];
/// let solution = bicg::solve(&a, &dvector![1.0, 2.0], &mut x, &Default::default()).unwrap();
/// assert!(solution.error <= 1e-10);
/// assert!((x[0] - 1.0 / 11.0).abs() < 1e-12);
/// assert!((x[1] - 7.0 / 11.0).abs() < 1e-12);
/// ```
pub fn solve(a: &SparseMatrix, b: &VecD, x: &mut VecD, settings: &BiCgSettings) -> Result<BiCgSolution, SolverError> {
    let n = a.dim();
    if b.len() != n {
        return Err(SolverError::DimensionMismatch { expected: n, found: b.len() });
    }
    a.check_diagonal()?;

    let max_iterations = match settings.max_iterations {
        0 => 2 * n.max(1),
        limit => limit,
    };
    let tol = settings.tolerance;

    let mut r = b - a.multiply(x)?;
    let mut rr = r.clone();

    let bnrm = match settings.criterion {
        Criterion::Residual => b.norm(),
        Criterion::PreconditionedResidual | Criterion::SolutionChange => a.precondition(b).norm(),
    };
    if bnrm == 0.0 {
        x.fill(0.0);
        return Ok(BiCgSolution { error: 0.0, iterations: 0 });
    }

    let mut z = a.precondition(&r);
    let mut znrm = z.norm();

    let mut p = VecD::zeros(n);
    let mut pp = VecD::zeros(n);
    let mut bkden = 1.0;
    let mut err = r.norm() / bnrm;
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        let zz = a.precondition(&rr);
        let bknum = z.dot(&rr);

        if iterations == 1 {
            p.copy_from(&z);
            pp.copy_from(&zz);
        } else {
            if bkden == 0.0 {
                trace!("bicg breakdown, rho vanished after {} iterations", iterations - 1);
                break;
            }
            let bk = bknum / bkden;
            p.axpy(1.0, &z, bk);
            pp.axpy(1.0, &zz, bk);
        }
        bkden = bknum;

        let ap = a.multiply(&p)?;
        let akden = ap.dot(&pp);
        if akden == 0.0 {
            trace!("bicg breakdown, pᵀAp vanished after {} iterations", iterations);
            break;
        }
        let ak = bknum / akden;
        let atpp = a.multiply_transpose(&pp)?;

        x.axpy(ak, &p, 1.0);
        r.axpy(-ak, &ap, 1.0);
        rr.axpy(-ak, &atpp, 1.0);

        z = a.precondition(&r);

        err = match settings.criterion {
            Criterion::Residual => r.norm() / bnrm,
            Criterion::PreconditionedResidual => z.norm() / bnrm,
            Criterion::SolutionChange => {
                let zm1nrm = znrm;
                znrm = z.norm();
                let change = (zm1nrm - znrm).abs();

                let xnrm = x.norm();
                let estimate = if change > f64::EPSILON * znrm { Some(ak.abs() * p.norm() * znrm / change) } else { None };
                match estimate {
                    Some(dx) if dx <= 0.5 * xnrm => dx / xnrm,
                    _ => {
                        // no reliable estimate of the change, report the residual but do not stop on it
                        err = znrm / bnrm;
                        continue;
                    }
                }
            }
        };

        if err <= tol {
            break;
        }
    }

    trace!("bicg finished after {} iterations with error {:e}", iterations, err);
    Ok(BiCgSolution { error: err, iterations })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};
    use rstest::rstest;

    use crate::solver::sparse::SparseMatrixBuilder;

    use super::*;

    /// A symmetric, diagonally dominant system with a bordered structure,
    /// a diagonal block coupled to a dense block.
    fn bordered() -> (SparseMatrix, crate::types::MatD) {
        let dense = dmatrix![
            4.0, 0.0, 0.0, 1.0, 0.5;
            0.0, 3.0, 0.0, 0.2, 1.0;
            0.0, 0.0, 5.0, 1.0, 1.0;
            1.0, 0.2, 1.0, 6.0, 2.0;
            0.5, 1.0, 1.0, 2.0, 7.0;
        ];
        let mut builder = SparseMatrixBuilder::new(5);
        for i in 0..5 {
            for j in 0..5 {
                if dense[(i, j)] != 0.0 {
                    builder.add(i, j, dense[(i, j)]);
                }
            }
        }
        (builder.build(), dense)
    }

    #[rstest]
    fn converges(
        #[values(Criterion::Residual, Criterion::PreconditionedResidual, Criterion::SolutionChange)] criterion: Criterion,
    ) {
        let (a, dense) = bordered();
        let b = dvector![1.0, -2.0, 0.5, 3.0, 1.0];
        let mut x = VecD::zeros(5);

        let settings = BiCgSettings { tolerance: 1e-12, max_iterations: 50, criterion };
        let solution = solve(&a, &b, &mut x, &settings).unwrap();

        let expected = dense.lu().solve(&b).unwrap();
        assert_relative_eq!(x, expected, epsilon = 1e-9);
        assert!(solution.iterations <= 50);
    }

    #[test]
    fn nonsymmetric() {
        let mut builder = SparseMatrixBuilder::new(3);
        builder.add(0, 0, 4.0).add(1, 1, 5.0).add(2, 2, 6.0);
        builder.add(0, 1, 1.0).add(1, 0, 2.0).add(2, 1, 3.0);
        let a = builder.build();
        let dense = dmatrix![4., 1., 0.; 2., 5., 0.; 0., 3., 6.;];
        let b = dvector![1.0, 2.0, 3.0];

        let mut x = VecD::zeros(3);
        solve(&a, &b, &mut x, &Default::default()).unwrap();
        assert_relative_eq!(x, dense.lu().solve(&b).unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn zero_rhs() {
        let (a, _) = bordered();
        let mut x = dvector![1.0, 1.0, 1.0, 1.0, 1.0];
        let solution = solve(&a, &VecD::zeros(5), &mut x, &Default::default()).unwrap();

        assert_eq!(solution, BiCgSolution { error: 0.0, iterations: 0 });
        assert_eq!(x, VecD::zeros(5));
    }

    #[test]
    fn iteration_limit() {
        let (a, _) = bordered();
        let mut x = VecD::zeros(5);
        let settings = BiCgSettings { tolerance: 0.0, max_iterations: 2, criterion: Criterion::Residual };
        let solution = solve(&a, &dvector![1.0, -2.0, 0.5, 3.0, 1.0], &mut x, &settings).unwrap();
        assert_eq!(solution.iterations, 2);
        assert!(solution.error > 0.0);
    }

    #[test]
    fn degenerate() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 1.0).add_symmetric(0, 1, 1.0);
        let mut x = VecD::zeros(2);
        assert_eq!(
            solve(&builder.build(), &dvector![1.0, 1.0], &mut x, &Default::default()),
            Err(SolverError::DegenerateSystem { row: 1, value: 0.0 })
        );
    }

    #[test]
    fn dimension_mismatch() {
        let (a, _) = bordered();
        let mut x = VecD::zeros(5);
        assert_eq!(
            solve(&a, &dvector![1.0], &mut x, &Default::default()),
            Err(SolverError::DimensionMismatch { expected: 5, found: 1 })
        );
    }
}
