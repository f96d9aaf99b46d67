//! Nonlinear least-squares fit of a kinetic model to a measurement table.
//!
//! Given:
//! - substrate concentrations `[S]_i`
//! - observed initial velocities `v0_i`
//! - a fixed enzyme concentration `[E]`
//!
//! we minimize `Σ (v0_i - f([S]_i; [E], p))^2` over the model's free
//! parameters with Levenberg–Marquardt, then derive standard errors from
//!
//! ```text
//! pcov = s² (JᵀJ)⁻¹,   s² = SS_res / (n - p)
//! ```

use log::{debug, warn};
use nalgebra::DMatrix;

use crate::domain::{FitResult, KineticModel, TidyMeasurement};
use crate::error::AppError;
use crate::math::{LeastSquaresProblem, LmOptions, distinct_count, fit_line, levenberg_marquardt, median};
use crate::models::{fill_jacobian_row, predict};

/// Tolerance for treating two substrate concentrations as the same point.
const DISTINCT_REL_TOL: f64 = 1e-12;

/// Point estimates and uncertainty for one fit.
#[derive(Debug, Clone)]
pub struct FitParameters {
    pub model: KineticModel,
    /// `[kcat, km]` (hyperbolic) or `[cat_eff]` (linear).
    pub params: Vec<f64>,
    /// `sqrt(diag(pcov))`.
    pub std_errors: Vec<f64>,
    pub covariance: DMatrix<f64>,
    pub sse: f64,
    pub residual_variance: f64,
    pub evaluations: usize,
}

impl FitParameters {
    pub fn kcat(&self) -> Option<f64> {
        self.hyperbolic_param(0)
    }

    pub fn km(&self) -> Option<f64> {
        self.hyperbolic_param(1)
    }

    pub fn kcat_err(&self) -> Option<f64> {
        self.hyperbolic_error(0)
    }

    pub fn km_err(&self) -> Option<f64> {
        self.hyperbolic_error(1)
    }

    /// Off-diagonal `cov(kcat, km)`.
    pub fn kcat_km_covariance(&self) -> Option<f64> {
        match self.model {
            KineticModel::Hyperbolic => Some(self.covariance[(0, 1)]),
            KineticModel::Linear => None,
        }
    }

    /// `(kcat/km, error)`.
    ///
    /// For the linear model this is the fitted parameter itself.
    pub fn catalytic_efficiency(&self) -> Result<(f64, f64), AppError> {
        match self.model {
            KineticModel::Hyperbolic => propagate_ratio_error(
                self.params[0],
                self.std_errors[0],
                self.params[1],
                self.std_errors[1],
                self.covariance[(0, 1)],
            ),
            KineticModel::Linear => Ok((self.params[0], self.std_errors[0])),
        }
    }

    /// Package with the goodness of fit.
    pub fn to_result(&self, r_sq: f64) -> Result<FitResult, AppError> {
        let (cat_eff, cat_eff_err) = self.catalytic_efficiency()?;
        Ok(FitResult {
            model: self.model,
            kcat: self.kcat(),
            kcat_err: self.kcat_err(),
            km: self.km(),
            km_err: self.km_err(),
            cat_eff,
            cat_eff_err,
            r_sq,
        })
    }

    fn hyperbolic_param(&self, idx: usize) -> Option<f64> {
        match self.model {
            KineticModel::Hyperbolic => Some(self.params[idx]),
            KineticModel::Linear => None,
        }
    }

    fn hyperbolic_error(&self, idx: usize) -> Option<f64> {
        match self.model {
            KineticModel::Hyperbolic => Some(self.std_errors[idx]),
            KineticModel::Linear => None,
        }
    }
}

/// `kcat/km` and its first-order propagated error including the covariance term:
///
/// ```text
/// σ = |kcat/km| · sqrt((σ_kcat/kcat)² + (σ_km/km)² + 2·cov/(kcat·km))
/// ```
pub fn propagate_ratio_error(
    kcat: f64,
    kcat_err: f64,
    km: f64,
    km_err: f64,
    covar: f64,
) -> Result<(f64, f64), AppError> {
    if kcat == 0.0 {
        return Err(AppError::degenerate("fitted kcat is zero; kcat/km error is undefined"));
    }
    if km == 0.0 {
        return Err(AppError::degenerate("fitted km is zero; kcat/km is undefined"));
    }

    let cat_eff = kcat / km;
    let mut radicand = (kcat_err / kcat).powi(2) + (km_err / km).powi(2) + 2.0 * covar / (kcat * km);
    if radicand < 0.0 {
        warn!("negative variance in kcat/km propagation ({radicand:.3e}); clamping to 0");
        radicand = 0.0;
    }
    Ok((cat_eff, cat_eff.abs() * radicand.sqrt()))
}

struct AssayProblem<'a> {
    model: KineticModel,
    enz: f64,
    sub: &'a [f64],
    obs: &'a [f64],
}

impl LeastSquaresProblem for AssayProblem<'_> {
    fn observation_count(&self) -> usize {
        self.sub.len()
    }

    fn param_count(&self) -> usize {
        self.model.param_count()
    }

    fn residuals(&self, params: &[f64], out: &mut nalgebra::DVector<f64>) {
        for (i, (&s, &v)) in self.sub.iter().zip(self.obs).enumerate() {
            out[i] = v - predict(self.model, s, self.enz, params);
        }
    }

    fn jacobian(&self, params: &[f64], out: &mut DMatrix<f64>) {
        let mut row = vec![0.0; self.model.param_count()];
        for (i, &s) in self.sub.iter().enumerate() {
            fill_jacobian_row(self.model, s, self.enz, params, &mut row);
            for (j, &d) in row.iter().enumerate() {
                out[(i, j)] = d;
            }
        }
    }
}

/// Fit `model` to the table with `enz_rxn_mm` held fixed.
pub fn fit(
    measurements: &[TidyMeasurement],
    enz_rxn_mm: f64,
    model: KineticModel,
) -> Result<FitParameters, AppError> {
    let (sub, obs) = validated_columns(measurements, enz_rxn_mm, model)?;
    let guess = initial_guess(model, &sub, &obs, enz_rxn_mm);
    debug!("initial guess for {:?}: {:?}", model, guess);
    fit_columns(model, &sub, &obs, enz_rxn_mm, &guess)
}

/// Fit starting from an explicit parameter vector.
pub fn fit_from(
    measurements: &[TidyMeasurement],
    enz_rxn_mm: f64,
    model: KineticModel,
    initial: &[f64],
) -> Result<FitParameters, AppError> {
    let (sub, obs) = validated_columns(measurements, enz_rxn_mm, model)?;
    fit_columns(model, &sub, &obs, enz_rxn_mm, initial)
}

fn validated_columns(
    measurements: &[TidyMeasurement],
    enz_rxn_mm: f64,
    model: KineticModel,
) -> Result<(Vec<f64>, Vec<f64>), AppError> {
    if !(enz_rxn_mm.is_finite() && enz_rxn_mm > 0.0) {
        return Err(AppError::invalid(format!(
            "enzyme concentration must be positive and finite, got {enz_rxn_mm}"
        )));
    }

    let sub: Vec<f64> = measurements.iter().map(|m| m.cofa_conc_mm).collect();
    let obs: Vec<f64> = measurements.iter().map(|m| m.v0_mm_s).collect();
    if sub.iter().chain(&obs).any(|v| !v.is_finite()) {
        return Err(AppError::convergence("measurement table contains non-finite values"));
    }

    let needed = model.param_count() + 1;
    let distinct = distinct_count(&sub, DISTINCT_REL_TOL);
    if distinct < needed {
        return Err(AppError::convergence(format!(
            "{} model needs at least {needed} distinct substrate concentrations, found {distinct}",
            model.display_name()
        )));
    }

    Ok((sub, obs))
}

fn fit_columns(
    model: KineticModel,
    sub: &[f64],
    obs: &[f64],
    enz: f64,
    initial: &[f64],
) -> Result<FitParameters, AppError> {
    let problem = AssayProblem { model, enz, sub, obs };
    let report = levenberg_marquardt(&problem, initial, &LmOptions::default())
        .map_err(|e| AppError::convergence(e.to_string()))?;

    if report.params.iter().any(|v| !v.is_finite()) {
        return Err(AppError::convergence("optimizer returned non-finite parameters"));
    }

    let n = sub.len();
    let p = model.param_count();
    let residual_variance = report.sse / (n - p) as f64;

    let inv = report
        .jtj
        .clone()
        .cholesky()
        .map(|c| c.inverse())
        .ok_or_else(|| AppError::convergence("singular Jacobian at the solution"))?;
    let covariance = inv * residual_variance;
    let std_errors: Vec<f64> = (0..p).map(|j| covariance[(j, j)].max(0.0).sqrt()).collect();

    let estimates: Vec<String> = model
        .param_names()
        .iter()
        .zip(report.params.iter().zip(&std_errors))
        .map(|(name, (value, err))| format!("{name}={value:.6e}±{err:.3e}"))
        .collect();
    debug!(
        "{} fit: {} sse={:.6e} evaluations={} ({:?})",
        model.display_name(),
        estimates.join(" "),
        report.sse,
        report.evaluations,
        report.termination
    );

    Ok(FitParameters {
        model,
        params: report.params,
        std_errors,
        covariance,
        sse: report.sse,
        residual_variance,
        evaluations: report.evaluations,
    })
}

/// Starting point for the solver.
///
/// Hyperbolic: Hanes–Woolf line `[S]/v = [S]/Vmax + km/Vmax` when it gives a
/// physical answer, otherwise `km = median [S]`, `kcat = max v / [E]`.
/// Linear: `cat_eff = max v / ([E] · max [S])`.
pub fn initial_guess(model: KineticModel, sub: &[f64], obs: &[f64], enz: f64) -> Vec<f64> {
    let max_v = obs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let max_s = sub.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    match model {
        KineticModel::Hyperbolic => {
            if let Some(guess) = hanes_woolf_guess(sub, obs, enz) {
                return guess;
            }
            let km = median(sub)
                .filter(|m| *m > 0.0)
                .unwrap_or_else(|| if max_s > 0.0 { max_s / 2.0 } else { 1.0 });
            let kcat = if max_v.is_finite() && max_v != 0.0 { max_v / enz } else { 1.0 };
            vec![kcat, km]
        }
        KineticModel::Linear => {
            if max_v.is_finite() && max_s > 0.0 && max_v != 0.0 {
                vec![max_v / (enz * max_s)]
            } else {
                vec![1.0]
            }
        }
    }
}

fn hanes_woolf_guess(sub: &[f64], obs: &[f64], enz: f64) -> Option<Vec<f64>> {
    let (x, y): (Vec<f64>, Vec<f64>) = sub
        .iter()
        .zip(obs)
        .filter(|(s, v)| **s > 0.0 && **v > 0.0)
        .map(|(&s, &v)| (s, s / v))
        .unzip();
    if distinct_count(&x, DISTINCT_REL_TOL) < 2 {
        return None;
    }

    let (intercept, slope) = fit_line(&x, &y)?;
    if !(slope > 0.0 && intercept > 0.0) {
        return None;
    }
    let vmax = 1.0 / slope;
    let km = intercept * vmax;
    let kcat = vmax / enz;
    if kcat.is_finite() && km.is_finite() {
        Some(vec![kcat, km])
    } else {
        None
    }
}
