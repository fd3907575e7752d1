//! The Levenberg-Marquardt iteration of the cloud fit (see sec. 15.5 in `Press2007`).
//!
//! The design variables `β = [t_0, ..., t_{m-1}, P_1, ..., P_{n-2}]` hold the `m` curve parameters followed by
//! the coordinates of the interior control points. With the residuals `f_k = Q_k - C(t_k)` the normal equations
//! `(JᵀJ + λ diag(JᵀJ)) δ = Jᵀf` have the bordered structure
//!
//! ```text
//! ⎡ AA   BB ⎤ ⎡ δt ⎤   ⎡ C'(t_k)·f_k      ⎤
//! ⎣ BBᵀ  CC ⎦ ⎣ δP ⎦ = ⎣ Σ_k N_j(t_k) f_k ⎦
//! ```
//!
//! where
//! - `AA` is diagonal with `AA_k = |C'(t_k)|²`,
//! - `BB` couples parameter `k` to the four active control points, `BB_{k,(j,c)} = C'_c(t_k) N_j(t_k)`,
//! - `CC_{(i,c),(j,c)} = Σ_k N_i(t_k) N_j(t_k)` is banded and identical for every coordinate `c`.
//!
//! Only the nonzero entries are stored and the system is solved with [`bicg`].

use log::{debug, warn};

use crate::{
    curve::{
        basis::DEGREE,
        evaluate,
        parameters::Parameters,
        points::{
            methods::fit::{seed, seed::Seed, FitError, FitOptions, Termination},
            ControlPoints, DataPoints, Points,
        },
    },
    solver::{
        bicg,
        sparse::{SparseMatrix, SparseMatrixBuilder},
    },
    types::{MatD, VecD, VecHelpers},
};

/// Damping change after an accepted (divided) or rejected (multiplied) step.
const LAMBDA_FACTOR: f64 = 2.0;

/// The last accepted state of the iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub points: ControlPoints,
    pub parameters: Parameters,
    /// The residuals `f_k` column by column.
    pub residuals: MatD,
    pub iterations: usize,
    pub termination: Termination,
    pub objectives: Vec<f64>,
}

/// Index of coordinate `c` of interior control point `i ∈ [1, n-2]` in the design variables.
fn column(m: usize, dim: usize, i: usize, c: usize) -> usize {
    m + dim * (i - 1) + c
}

/// Returns `Q_k - C(t_k)` for every data point.
pub fn residuals(data: &DataPoints, params: &VecD, points: &MatD) -> MatD {
    let mut f = data.matrix().clone();
    for (k, mut col) in f.column_iter_mut().enumerate() {
        col -= evaluate(points, params[k]).position;
    }
    f
}

/// Returns `|f| / m`.
pub fn objective(residuals: &MatD) -> f64 {
    residuals.norm() / residuals.ncols() as f64
}

/// Assembles the damped normal equations at the current state.
pub fn normal_equations(
    params: &VecD,
    points: &MatD,
    residuals: &MatD,
    lambda: f64,
    hessian_floor: f64,
) -> (SparseMatrix, VecD) {
    let (dim, m, n) = (points.nrows(), params.len(), points.ncols());
    let nvar = m + dim * (n - 2);
    let interior = 1..n - 1;

    let mut builder = SparseMatrixBuilder::new(nvar);
    let mut rhs = VecD::zeros(nvar);

    for k in 0..m {
        let eval = evaluate(points, params[k]);
        let (N, dC, f) = (&eval.basis.values, &eval.tangent, residuals.column(k));

        builder.add(k, k, dC.norm_squared());
        rhs[k] = dC.dot(&f);

        for (a, i) in eval.basis.indices().enumerate().filter(|(_, i)| interior.contains(i)) {
            for c in 0..dim {
                builder.add_symmetric(k, column(m, dim, i, c), dC[c] * N[a]);
                rhs[column(m, dim, i, c)] += N[a] * f[c];
            }

            for (b, j) in eval.basis.indices().enumerate().filter(|(_, j)| interior.contains(j)) {
                for c in 0..dim {
                    builder.add(column(m, dim, i, c), column(m, dim, j, c), N[a] * N[b]);
                }
            }
        }
    }

    let damping = 1.0 + lambda;
    let diagonal = builder.diagonal_mut();
    diagonal.head_mut(m).scale_mut(damping);
    diagonal.tail_mut(nvar - m).apply(|d| *d = d.max(hessian_floor) * damping);

    (builder.build(), rhs)
}

/// Minimizes `|f|` starting from `seed`, keeping the end tangents equal if `periodic` is set.
///
/// The data are expected in the unit frame of [`Normalization`](crate::curve::points::Normalization),
/// the tolerances of `options` refer to that frame.
pub fn minimize(data: &DataPoints, seed: Seed, periodic: bool, options: &FitOptions) -> Result<Minimum, FitError> {
    let Seed { points, parameters } = seed;
    let upper_bound = parameters.upper_bound();
    let mut params = parameters.into_vector();
    let mut cp = points.into_matrix();

    let (dim, m, n) = (cp.nrows(), params.len(), cp.ncols());
    debug_assert!(n > DEGREE && m >= n, "A cubic fit needs n > {} and m >= n, got n = {}, m = {}", DEGREE, n, m);

    if periodic {
        seed::symmetrize(&mut cp);
    }

    let mut f = residuals(data, &params, &cp);
    let mut normf = objective(&f);
    let mut objectives = vec![normf];

    let mut lambda = options.initial_lambda;
    let mut omega = options.initial_omega;
    let mut termination = Termination::IterationLimit;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        iterations += 1;

        let (a, rhs) = normal_equations(&params, &cp, &f, lambda, options.hessian_floor);
        let mut delta = VecD::zeros(rhs.len());
        let solution = bicg::solve(&a, &rhs, &mut delta, &options.bicg)?;

        let step = delta.norm();
        if step < options.tolerance {
            termination = Termination::StepTolerance;
            break;
        }

        let mut trial_params = &params + delta.head(m);
        trial_params.apply(|t| *t = t.clamp(0.0, upper_bound));

        let mut trial_cp = cp.clone();
        for i in 1..n - 1 {
            let mut col = trial_cp.column_mut(i);
            col.axpy(omega, &delta.segment(column(m, dim, i, 0), dim), 1.0);
        }
        omega = (omega * options.omega_growth).min(1.0);

        if periodic {
            seed::symmetrize(&mut trial_cp);
        }

        let trial_f = residuals(data, &trial_params, &trial_cp);
        let trial_normf = objective(&trial_f);
        let accepted = trial_normf < normf;

        debug!(
            "iteration {}: lambda = {:e}, omega = {:.4}, |delta| = {:e}, objective = {:e} ({}, {} bicg iterations)",
            iterations,
            lambda,
            omega,
            step,
            trial_normf,
            if accepted { "accepted" } else { "rejected" },
            solution.iterations
        );

        if !accepted {
            lambda *= LAMBDA_FACTOR;
            continue;
        }

        lambda /= LAMBDA_FACTOR;
        params = trial_params;
        cp = trial_cp;
        f = trial_f;
        normf = trial_normf;
        objectives.push(normf);

        if normf < options.tolerance {
            termination = Termination::ObjectiveTolerance;
            break;
        }
    }

    if termination == Termination::IterationLimit {
        warn!("The fit did not converge within {} iterations, objective = {:e}", iterations, normf);
    }

    Ok(Minimum {
        points: ControlPoints::new(cp),
        parameters: Parameters::new(params, upper_bound),
        residuals: f,
        iterations,
        termination,
        objectives,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};

    use crate::solver::SolverError;

    use super::*;

    fn polygon() -> MatD {
        dmatrix![
            0.0, 1.0, 2.0, 4.0, 5.0;
            0.0, 2.0, 3.0, 2.0, 0.0;
        ]
    }

    /// Builds `JᵀJ` and `Jᵀf` densely from the Jacobian of `f` with respect to `β`.
    fn dense_normal_equations(params: &VecD, points: &MatD, f: &MatD) -> (MatD, VecD) {
        let (dim, m, n) = (points.nrows(), params.len(), points.ncols());
        let nvar = m + dim * (n - 2);

        // derivatives of `C(t_k)`, i.e. `-∂f/∂β`
        let mut J = MatD::zeros(dim * m, nvar);
        for k in 0..m {
            let eval = evaluate(points, params[k]);
            let weights = eval.weights(n);
            for c in 0..dim {
                J[(dim * k + c, k)] = eval.tangent[c];
                for i in 1..n - 1 {
                    J[(dim * k + c, column(m, dim, i, c))] = weights[i];
                }
            }
        }
        let flat = VecD::from_column_slice(f.as_slice());
        (J.transpose() * &J, J.transpose() * flat)
    }

    #[test]
    fn normal_equations_match_dense_jacobian() {
        let points = polygon();
        let params = dvector![0.0, 0.4, 1.1, 1.5, 1.9, 2.0];
        let data = DataPoints::new(dmatrix![
            0.0, 1.0, 2.0, 3.0, 4.0, 5.0;
            0.0, 1.5, 2.4, 2.2, 1.0, 0.0;
        ]);
        let f = residuals(&data, &params, &points);

        let lambda = 0.5;
        let (sparse, rhs) = normal_equations(&params, &points, &f, lambda, 0.0);
        let (mut dense, expected_rhs) = dense_normal_equations(&params, &points, &f);
        for i in 0..dense.nrows() {
            dense[(i, i)] *= 1.0 + lambda;
        }

        assert_relative_eq!(rhs, expected_rhs, epsilon = 1e-12);
        for i in 0..dense.nrows() {
            for j in 0..dense.ncols() {
                assert_relative_eq!(sparse.get(i, j), dense[(i, j)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn hessian_floor() {
        // all parameters sit at the start, where the interior control points have no weight
        let points = dmatrix![0.0, 1.0, 2.0, 3.0, 4.0, 5.0;];
        let params = dvector![0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let f = MatD::zeros(1, 6);

        let (a, _) = normal_equations(&params, &points, &f, 1.0, 1e-6);
        assert_eq!(a.get(6 + 3, 6 + 3), 2e-6);
    }

    #[test]
    fn residuals_and_objective() {
        let points = polygon();
        let data = DataPoints::new(dmatrix![0.0, 5.0; 1.0, 0.0;]);
        let f = residuals(&data, &dvector![0.0, 2.0], &points);

        assert_relative_eq!(f, dmatrix![0.0, 0.0; 1.0, 0.0;], epsilon = 1e-14);
        assert_relative_eq!(objective(&f), 0.5, epsilon = 1e-14);
    }

    #[test]
    fn vanishing_tangent_is_degenerate() {
        // all control points coincide, hence the tangent and the parameter block vanish
        let data = DataPoints::new(dmatrix![0.0, 1.0, 2.0, 3.0, 4.0;]);
        let seed = Seed {
            points: ControlPoints::new(MatD::zeros(1, 4)),
            parameters: Parameters::new(dvector![0.0, 0.25, 0.5, 0.75, 1.0], 1.0),
        };

        assert_eq!(
            minimize(&data, seed, false, &FitOptions::default()),
            Err(FitError::Solver { err: SolverError::DegenerateSystem { row: 0, value: 0.0 } })
        );
    }

    #[test]
    fn converged_seed_stops_on_step() {
        let points = polygon();
        let params = dvector![0.0, 0.3, 0.8, 1.2, 1.7, 2.0];
        let data = DataPoints::new(MatD::from_columns(
            &params.iter().map(|&t| evaluate(&points, t).position).collect::<Vec<_>>(),
        ));
        let seed = Seed { points: ControlPoints::new(points.clone()), parameters: Parameters::new(params.clone(), 2.0) };

        let minimum = minimize(&data, seed, false, &FitOptions::default()).unwrap();
        assert_eq!(minimum.termination, Termination::StepTolerance);
        assert_eq!(minimum.iterations, 1);
        assert_eq!(minimum.objectives.len(), 1);
        assert_eq!(minimum.points.matrix(), &points);
        assert_eq!(minimum.parameters.vector(), &params);
    }
}
