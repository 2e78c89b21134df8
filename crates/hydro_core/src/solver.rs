//! Bounded nonlinear least squares for the equilibrium solves.
//!
//! Levenberg-Marquardt on a finite-difference Jacobian, with every trial point
//! projected back into the box bounds. The residual closure may fail; its error
//! is returned as-is.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HydroError, HydroResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub max_steps: usize,
    /// Converged once the residual norm is at or below this.
    pub tolerance: f64,
    /// A step shorter than this (relative to |x|) counts as stalled.
    pub step_tolerance: f64,
    /// Relative forward-difference step for the Jacobian.
    pub fd_step: f64,
    /// A stalled solve is still accepted if the residual norm is below this.
    pub residual_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_steps: 100,
            tolerance: 1e-9,
            step_tolerance: 1e-12,
            fd_step: 1.49e-8,
            residual_tolerance: 1e-6,
        }
    }
}

impl SolverSettings {
    fn validate(&self) -> HydroResult<()> {
        if self.max_steps == 0 {
            return Err(HydroError::Validation(
                "max_steps must be greater than zero".to_string(),
            ));
        }
        for (name, value) in [
            ("tolerance", self.tolerance),
            ("step_tolerance", self.step_tolerance),
            ("fd_step", self.fd_step),
            ("residual_tolerance", self.residual_tolerance),
        ] {
            if !(value > 0.0) {
                return Err(HydroError::Validation(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverReport {
    pub x: Vec<f64>,
    pub residual: Vec<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
    pub evaluations: usize,
}

const INITIAL_DAMPING: f64 = 1e-3;
const MAX_DAMPING: f64 = 1e12;
/// Floor on the diagonal scaling so a flat direction still yields a solvable system.
const MIN_CURVATURE: f64 = 1e-12;

/// Minimises `|residual(x)|^2` over the box `bounds`, starting from `initial_guess`
/// clamped into the box.
pub fn solve_bounded_least_squares<F>(
    problem: &'static str,
    mut residual: F,
    initial_guess: &[f64],
    bounds: &[(f64, f64)],
    settings: &SolverSettings,
) -> HydroResult<SolverReport>
where
    F: FnMut(&[f64]) -> HydroResult<Vec<f64>>,
{
    let dim = initial_guess.len();
    if dim == 0 {
        return Err(HydroError::Validation(format!(
            "{problem} solve has no unknowns"
        )));
    }
    if bounds.len() != dim {
        return Err(HydroError::Validation(format!(
            "{problem} bounds dimension mismatch: expected {dim}, got {}",
            bounds.len()
        )));
    }
    if let Some((lo, hi)) = bounds.iter().find(|(lo, hi)| !(lo <= hi)) {
        return Err(HydroError::Validation(format!(
            "{problem} bounds must satisfy lower <= upper, got ({lo}, {hi})"
        )));
    }
    settings.validate()?;

    let mut x: Vec<f64> = initial_guess
        .iter()
        .zip(bounds)
        .map(|(v, (lo, hi))| v.clamp(*lo, *hi))
        .collect();
    let mut r = residual(&x)?;
    let mut evaluations = 1usize;
    let mut residual_norm = l2_norm(&r);
    let mut damping = INITIAL_DAMPING;
    let mut iterations = 0usize;

    let failure = |iterations: usize, residual_norm: f64| HydroError::NonConvergence {
        problem,
        iterations,
        residual: residual_norm,
        target: None,
    };

    loop {
        if residual_norm <= settings.tolerance {
            break;
        }
        if iterations >= settings.max_steps {
            debug!(problem, iterations, residual_norm, "solver exhausted its steps");
            return Err(failure(iterations, residual_norm));
        }

        let jacobian = finite_difference_jacobian(&mut residual, &x, &r, bounds, settings.fd_step)?;
        evaluations += dim;

        let j = DMatrix::from_row_slice(r.len(), dim, &jacobian);
        let rv = DVector::from_column_slice(&r);
        let jtj = j.transpose() * &j;
        let descent = -(j.transpose() * rv);

        // Inner loop raises the damping until a step reduces the residual.
        let mut accepted = false;
        let mut stalled = false;
        while damping <= MAX_DAMPING {
            let mut lhs = jtj.clone();
            for i in 0..dim {
                lhs[(i, i)] += damping * jtj[(i, i)].max(MIN_CURVATURE);
            }
            let delta = lhs
                .lu()
                .solve(&descent)
                .ok_or_else(|| failure(iterations, residual_norm))?;

            let trial: Vec<f64> = x
                .iter()
                .zip(delta.iter())
                .zip(bounds)
                .map(|((xi, di), (lo, hi))| (xi + di).clamp(*lo, *hi))
                .collect();
            let step = l2_norm(
                &trial
                    .iter()
                    .zip(&x)
                    .map(|(a, b)| a - b)
                    .collect::<Vec<_>>(),
            );
            if step <= settings.step_tolerance * (1.0 + l2_norm(&x)) {
                stalled = true;
                break;
            }

            let trial_r = residual(&trial)?;
            evaluations += 1;
            let trial_norm = l2_norm(&trial_r);
            if trial_norm < residual_norm {
                x = trial;
                r = trial_r;
                residual_norm = trial_norm;
                damping = (damping * 0.1).max(f64::EPSILON);
                accepted = true;
                break;
            }
            damping *= 10.0;
        }

        iterations += 1;
        debug!(problem, iterations, ?x, residual_norm, damping, "solver step");

        if !accepted || stalled {
            if residual_norm <= settings.residual_tolerance {
                break;
            }
            debug!(problem, iterations, residual_norm, "solver stalled");
            return Err(failure(iterations, residual_norm));
        }
    }

    debug!(problem, iterations, evaluations, residual_norm, "solver converged");
    Ok(SolverReport {
        x,
        residual: r,
        residual_norm,
        iterations,
        evaluations,
    })
}

/// Forward differences, stepping backwards where a forward step would leave the box.
/// Row-major `residuals x unknowns`.
fn finite_difference_jacobian<F>(
    residual: &mut F,
    x: &[f64],
    r: &[f64],
    bounds: &[(f64, f64)],
    fd_step: f64,
) -> HydroResult<Vec<f64>>
where
    F: FnMut(&[f64]) -> HydroResult<Vec<f64>>,
{
    let dim = x.len();
    let rows = r.len();
    let mut jacobian = vec![0.0; rows * dim];
    let mut probe = x.to_vec();

    for j in 0..dim {
        let (lo, hi) = bounds[j];
        let mut h = fd_step * x[j].abs().max(1.0);
        if x[j] + h > hi && x[j] - h >= lo {
            h = -h;
        }
        probe[j] = x[j] + h;
        let shifted = residual(&probe)?;
        probe[j] = x[j];
        for i in 0..rows {
            jacobian[i * dim + j] = (shifted[i] - r[i]) / h;
        }
    }

    Ok(jacobian)
}

fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}
