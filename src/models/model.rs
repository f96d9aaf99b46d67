//! Michaelis-Menten rate laws.
//!
//! The fitter relies on two primitive operations:
//! - predict v0 given the free parameters (for residuals/plots)
//! - fill a Jacobian row of partial derivatives (for the LM step)
//!
//! The enzyme concentration is always a fixed input, never a free parameter.

use crate::domain::KineticModel;

/// Full Michaelis-Menten velocity: `kcat * [E] * [S] / (km + [S])`.
///
/// Undefined (NaN/inf) when `km + [S] == 0`.
pub fn velocity(sub: f64, enz: f64, kcat: f64, km: f64) -> f64 {
    (kcat * enz * sub) / (km + sub)
}

/// First-order limit for `km >> [S]`: `[E] * (kcat/km) * [S]`.
pub fn lin_velocity(sub: f64, enz: f64, cat_eff: f64) -> f64 {
    enz * cat_eff * sub
}

/// Predict v0 for the given model kind.
///
/// `params` is `[kcat, km]` for hyperbolic and `[cat_eff]` for linear.
pub fn predict(model: KineticModel, sub: f64, enz: f64, params: &[f64]) -> f64 {
    match model {
        KineticModel::Hyperbolic => velocity(sub, enz, params[0], params[1]),
        KineticModel::Linear => lin_velocity(sub, enz, params[0]),
    }
}

/// Fill `out` with `∂v/∂p_j` at `sub`.
///
/// # Panics
/// Panics if `out` or `params` is shorter than `model.param_count()`.
pub fn fill_jacobian_row(model: KineticModel, sub: f64, enz: f64, params: &[f64], out: &mut [f64]) {
    match model {
        KineticModel::Hyperbolic => {
            let kcat = params[0];
            let denom = params[1] + sub;
            out[0] = enz * sub / denom;
            out[1] = -kcat * enz * sub / (denom * denom);
        }
        KineticModel::Linear => {
            out[0] = enz * sub;
        }
    }
}
