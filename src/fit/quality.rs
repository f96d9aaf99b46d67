//! Goodness of fit.

use crate::domain::{KineticModel, TidyMeasurement};
use crate::error::AppError;
use crate::math::mean;
use crate::models::predict;

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// Can be negative for fits worse than the mean.
pub fn r_squared(
    measurements: &[TidyMeasurement],
    enz_rxn_mm: f64,
    params: &[f64],
    model: KineticModel,
) -> Result<f64, AppError> {
    let obs: Vec<f64> = measurements.iter().map(|m| m.v0_mm_s).collect();
    let Some(mean_obs) = mean(&obs) else {
        return Err(AppError::degenerate("no observations to score"));
    };

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    let mut scale = 0.0_f64;
    for m in measurements {
        let v_fit = predict(model, m.cofa_conc_mm, enz_rxn_mm, params);
        if !v_fit.is_finite() {
            return Err(AppError::degenerate(format!(
                "model prediction is not finite at [S] = {}",
                m.cofa_conc_mm
            )));
        }
        let r = m.v0_mm_s - v_fit;
        ss_res += r * r;
        let d = m.v0_mm_s - mean_obs;
        ss_tot += d * d;
        scale = scale.max(m.v0_mm_s.abs());
    }

    // Identical observations can leave rounding residue in the mean.
    let floor = obs.len() as f64 * (4.0 * f64::EPSILON * scale).powi(2);
    if ss_tot <= floor {
        return Err(AppError::degenerate(
            "observed velocities have zero variance; R² is undefined",
        ));
    }

    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::velocity;
    use approx::assert_relative_eq;

    fn row(s: f64, v: f64) -> TidyMeasurement {
        TidyMeasurement {
            trial: "t1".to_string(),
            cofa_conc_mm: s,
            slope_a_s: 0.0,
            v0_mm_s: v,
        }
    }

    #[test]
    fn perfect_fit_scores_one() {
        let data: Vec<_> = [0.5, 1.0, 2.0, 4.0]
            .iter()
            .map(|&s| row(s, velocity(s, 0.001, 5.0, 2.0)))
            .collect();
        let r2 = r_squared(&data, 0.001, &[5.0, 2.0], KineticModel::Hyperbolic).unwrap();
        assert_relative_eq!(r2, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn matches_hand_computed_value() {
        // Predictions are [1, 2, 3]; observations [1, 2, 4] with mean 7/3.
        let data = vec![row(0.5, 1.0), row(1.0, 2.0), row(1.5, 4.0)];
        let r2 = r_squared(&data, 1.0, &[2.0], KineticModel::Linear).unwrap();
        let ss_res = 1.0;
        let ss_tot = (1.0 - 7.0 / 3.0_f64).powi(2) + (2.0 - 7.0 / 3.0_f64).powi(2) + (4.0 - 7.0 / 3.0_f64).powi(2);
        assert_relative_eq!(r2, 1.0 - ss_res / ss_tot, max_relative = 1e-12);
    }

    #[test]
    fn poor_fit_can_be_negative() {
        let data = vec![row(1.0, 1.0), row(2.0, 2.0), row(3.0, 3.0)];
        let r2 = r_squared(&data, 1.0, &[-1.0], KineticModel::Linear).unwrap();
        assert!(r2 < 0.0);
    }

    #[test]
    fn constant_observations_are_degenerate() {
        let v = 1.0e-5 / 3.11;
        let data = vec![row(1.0, v), row(2.0, v), row(4.0, v)];
        let err = r_squared(&data, 0.001, &[5.0, 2.0], KineticModel::Hyperbolic).unwrap_err();
        assert!(matches!(err, AppError::DegenerateParameter(_)));
    }

    #[test]
    fn non_finite_prediction_is_degenerate() {
        let data = vec![row(0.0, 0.0), row(1.0, 1.0)];
        let err = r_squared(&data, 0.001, &[5.0, 0.0], KineticModel::Hyperbolic).unwrap_err();
        assert!(matches!(err, AppError::DegenerateParameter(_)));
    }
}
