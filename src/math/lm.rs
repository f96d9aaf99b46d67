//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `Σ r_i(p)^2` with `r_i = y_i - f(x_i; p)` given an analytic
//! Jacobian of `f`. Each step solves
//!
//! ```text
//! (JᵀJ + λ·diag(JᵀJ)) δ = Jᵀ r
//! ```
//!
//! (Marquardt scaling, so the damping is invariant to parameter units). The
//! damping shrinks after an accepted step and grows after a rejected one.
//!
//! Termination follows the MINPACK conventions:
//! - `ftol`: relative reduction of the sum of squares on an accepted, lightly
//!   damped step
//! - `xtol`: relative size of the trial step
//! - `max_evaluations`: budget of residual evaluations

use log::trace;
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// A least-squares problem with a fixed number of observations and parameters.
pub trait LeastSquaresProblem {
    fn observation_count(&self) -> usize;
    fn param_count(&self) -> usize;

    /// Write `y_i - f(x_i; p)` into `out`.
    fn residuals(&self, params: &[f64], out: &mut DVector<f64>);

    /// Write `∂f(x_i; p)/∂p_j` into row `i`, column `j` of `out`.
    fn jacobian(&self, params: &[f64], out: &mut DMatrix<f64>);
}

#[derive(Debug, Clone)]
pub struct LmOptions {
    pub ftol: f64,
    pub xtol: f64,
    /// Residual evaluations allowed. `None` means `200 * (p + 1)`.
    pub max_evaluations: Option<usize>,
    pub initial_damping: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            max_evaluations: None,
            initial_damping: 1e-3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Residuals are exactly zero.
    ExactFit,
    /// Relative reduction in the sum of squares fell below `ftol`.
    SumOfSquares,
    /// Relative step size fell below `xtol`.
    StepSize,
}

#[derive(Debug, Clone)]
pub struct LmReport {
    pub params: Vec<f64>,
    pub sse: f64,
    /// `JᵀJ` at the returned parameters.
    pub jtj: DMatrix<f64>,
    pub evaluations: usize,
    pub termination: Termination,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LmFailure {
    #[error("initial parameters are not finite")]
    InvalidStart,
    #[error("residuals are not finite at the initial guess")]
    NonFiniteResiduals,
    #[error("singular Jacobian")]
    SingularJacobian,
    #[error("exceeded iteration budget ({evaluations} evaluations)")]
    BudgetExceeded { evaluations: usize },
    #[error("damping grew without reducing the sum of squares")]
    Stalled,
}

const DAMPING_UP: f64 = 10.0;
const DAMPING_DOWN: f64 = 10.0;
const DAMPING_MIN: f64 = 1e-15;
const DAMPING_MAX: f64 = 1e16;

/// Run Levenberg–Marquardt from `initial`.
pub fn levenberg_marquardt<P: LeastSquaresProblem>(
    problem: &P,
    initial: &[f64],
    opts: &LmOptions,
) -> Result<LmReport, LmFailure> {
    let n = problem.observation_count();
    let p = problem.param_count();
    if initial.len() != p || initial.iter().any(|v| !v.is_finite()) {
        return Err(LmFailure::InvalidStart);
    }

    let budget = opts.max_evaluations.unwrap_or(200 * (p + 1));

    let mut params = DVector::from_column_slice(initial);
    let mut r = DVector::<f64>::zeros(n);
    let mut jac = DMatrix::<f64>::zeros(n, p);

    problem.residuals(params.as_slice(), &mut r);
    let mut evaluations = 1usize;
    let mut sse = r.norm_squared();
    if !sse.is_finite() {
        return Err(LmFailure::NonFiniteResiduals);
    }

    problem.jacobian(params.as_slice(), &mut jac);
    let mut jtj = jac.transpose() * &jac;
    let mut grad = jac.transpose() * &r;
    let mut damping = opts.initial_damping;

    let mut r_try = DVector::<f64>::zeros(n);

    loop {
        if sse == 0.0 {
            return Ok(report(params, sse, jtj, evaluations, Termination::ExactFit));
        }

        let scale = damping_scale(&jtj).ok_or(LmFailure::SingularJacobian)?;

        let mut lhs = jtj.clone();
        for j in 0..p {
            lhs[(j, j)] += damping * scale[j];
        }

        let Some(chol) = lhs.cholesky() else {
            damping *= DAMPING_UP;
            if damping > DAMPING_MAX {
                return Err(LmFailure::SingularJacobian);
            }
            continue;
        };
        let delta = chol.solve(&grad);
        let trial = &params + &delta;
        let step_small = delta.norm() <= opts.xtol * (params.norm() + opts.xtol);

        problem.residuals(trial.as_slice(), &mut r_try);
        evaluations += 1;
        let sse_try = r_try.norm_squared();

        trace!(
            "lm eval={evaluations} damping={damping:.3e} sse={sse:.6e} trial_sse={sse_try:.6e} params={:?}",
            trial.as_slice()
        );

        if sse_try.is_finite() && sse_try < sse {
            let reduction = (sse - sse_try) / sse;
            params = trial;
            std::mem::swap(&mut r, &mut r_try);
            sse = sse_try;
            problem.jacobian(params.as_slice(), &mut jac);
            jtj = jac.transpose() * &jac;
            grad = jac.transpose() * &r;
            damping = (damping / DAMPING_DOWN).max(DAMPING_MIN);

            // Only trust a small reduction once the step is close to Gauss-Newton.
            if reduction <= opts.ftol && damping < 1.0 {
                return Ok(report(params, sse, jtj, evaluations, Termination::SumOfSquares));
            }
            if step_small {
                return Ok(report(params, sse, jtj, evaluations, Termination::StepSize));
            }
        } else {
            if step_small {
                return Ok(report(params, sse, jtj, evaluations, Termination::StepSize));
            }
            damping *= DAMPING_UP;
            if damping > DAMPING_MAX {
                return Err(LmFailure::Stalled);
            }
        }

        if evaluations >= budget {
            return Err(LmFailure::BudgetExceeded { evaluations });
        }
    }
}

fn report(
    params: DVector<f64>,
    sse: f64,
    jtj: DMatrix<f64>,
    evaluations: usize,
    termination: Termination,
) -> LmReport {
    LmReport {
        params: params.iter().copied().collect(),
        sse,
        jtj,
        evaluations,
        termination,
    }
}

/// Diagonal of `JᵀJ`, floored so a weakly identified parameter still gets damped.
///
/// Returns `None` when every column of the Jacobian is zero.
fn damping_scale(jtj: &DMatrix<f64>) -> Option<Vec<f64>> {
    let diag: Vec<f64> = (0..jtj.nrows()).map(|j| jtj[(j, j)]).collect();
    let max = diag.iter().copied().fold(0.0_f64, f64::max);
    if !(max.is_finite() && max > 0.0) {
        return None;
    }
    let floor = max * 1e-12;
    Some(diag.into_iter().map(|d| d.max(floor)).collect())
}
