//! Flow similarity numbers, skin-friction correlations and unit helpers.

use crate::error::{HydroError, HydroResult};

const KNOT_MPS: f64 = 1852.0 / 3600.0;
const SCHOENHERR_MAX_STEPS: usize = 50;
const SCHOENHERR_TOLERANCE: f64 = 1e-12;

pub fn reynolds_number(speed: f64, kinematic_viscosity: f64, reference_length: f64) -> f64 {
    speed * reference_length / kinematic_viscosity
}

pub fn froude_number(speed: f64, gravity: f64, reference_length: f64) -> f64 {
    speed / (gravity * reference_length).sqrt()
}

/// Laminar flat-plate friction coefficient.
pub fn blasius_friction_coefficient(reynolds: f64) -> f64 {
    1.328 / reynolds.sqrt()
}

/// Residual of the Schoenherr line, 0.242 / sqrt(Cf) - log10(Re * Cf).
pub fn schoenherr_residual(cf: f64, reynolds: f64) -> f64 {
    0.242 / cf.sqrt() - (reynolds * cf).log10()
}

/// Solves the implicit Schoenherr equation for the turbulent friction coefficient
/// with a Newton iteration seeded at `initial_guess`.
pub fn schoenherr_friction_coefficient(reynolds: f64, initial_guess: f64) -> HydroResult<f64> {
    if !(reynolds > 0.0 && reynolds.is_finite()) {
        return Err(HydroError::Validation(format!(
            "Reynolds number must be positive and finite, got {reynolds}"
        )));
    }
    if initial_guess <= 0.0 {
        return Err(HydroError::Validation(format!(
            "Schoenherr initial guess must be positive, got {initial_guess}"
        )));
    }

    let mut cf = initial_guess;
    let mut residual = schoenherr_residual(cf, reynolds);
    for _ in 0..SCHOENHERR_MAX_STEPS {
        if residual.abs() <= SCHOENHERR_TOLERANCE {
            return Ok(cf);
        }
        let slope = -0.121 * cf.powf(-1.5) - 1.0 / (cf * std::f64::consts::LN_10);
        let mut next = cf - residual / slope;
        // The function is convex and decreasing; an overshoot past zero only
        // happens from the right of the root.
        if next <= 0.0 {
            next = 0.5 * cf;
        }
        cf = next;
        residual = schoenherr_residual(cf, reynolds);
    }

    if residual.abs() <= SCHOENHERR_TOLERANCE * 1e3 {
        Ok(cf)
    } else {
        Err(HydroError::NonConvergence {
            problem: "Schoenherr friction",
            iterations: SCHOENHERR_MAX_STEPS,
            residual,
            target: None,
        })
    }
}

/// Power needed to overcome `drag` [N] at `speed` [m/s], in W.
pub fn propulsive_power(speed: f64, drag: f64) -> f64 {
    speed * drag
}

pub fn knots_to_mps(knots: f64) -> f64 {
    knots * KNOT_MPS
}

pub fn mps_to_knots(mps: f64) -> f64 {
    mps / KNOT_MPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schoenherr_satisfies_its_equation_across_reynolds_range() {
        for exponent in 6..=10 {
            for mantissa in [1.0, 3.0, 7.0] {
                let re = mantissa * 10f64.powi(exponent);
                let cf = schoenherr_friction_coefficient(re, 0.002).expect("should converge");
                assert!(cf > 0.0 && cf < 0.01, "Re={re} Cf={cf}");
                assert!(schoenherr_residual(cf, re).abs() < 1e-6, "Re={re}");
            }
        }
    }

    #[test]
    fn schoenherr_decreases_with_reynolds() {
        let low = schoenherr_friction_coefficient(1e6, 0.002).unwrap();
        let high = schoenherr_friction_coefficient(1e9, 0.002).unwrap();
        assert!(low > high);
        // Tabulated Schoenherr value at Re = 1e6 is about 4.41e-3.
        assert!((low - 4.41e-3).abs() < 5e-5, "{low}");
    }

    #[test]
    fn schoenherr_rejects_non_physical_reynolds() {
        let err = schoenherr_friction_coefficient(0.0, 0.002).unwrap_err();
        assert!(err.to_string().contains("Reynolds number"));
    }

    #[test]
    fn blasius_matches_closed_form() {
        assert!((blasius_friction_coefficient(1e6) - 1.328e-3).abs() < 1e-12);
    }

    #[test]
    fn knots_round_trip() {
        assert!((knots_to_mps(26.0) - 13.3756).abs() < 1e-4);
        assert!((mps_to_knots(knots_to_mps(12.5)) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn similarity_numbers() {
        assert!((reynolds_number(15.0, 1.2e-6, 35.5) - 4.4375e8).abs() < 1.0);
        assert!((froude_number(10.0, 10.0, 10.0) - 1.0).abs() < 1e-12);
        assert_eq!(propulsive_power(10.0, 2000.0), 20_000.0);
    }
}
