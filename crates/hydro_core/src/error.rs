//! Error types for the hydrodynamic core.
//!
//! Every fallible model or solver operation returns `HydroResult<T>`. None of the
//! variants are fatal: sweep drivers match on them and skip the sample.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HydroError {
    /// Geometry or parameter outside its valid range.
    #[error("Invalid parameter: {0}")]
    Validation(String),

    /// The spar wall thickness equation has no real solution for the requested load.
    #[error(
        "Foil spar cannot carry the load: required section modulus {required_modulus:.3e} m^3 \
         exceeds {max_modulus:.3e} m^3 available at spar height {spar_height:.3} m"
    )]
    StructuralInfeasibility {
        required_modulus: f64,
        max_modulus: f64,
        spar_height: f64,
    },

    /// Sink or angle-of-attack solve failed to meet its tolerance.
    #[error(
        "{problem} solve did not converge after {iterations} iterations (residual: {residual:.3e}){}",
        target_suffix(.target)
    )]
    NonConvergence {
        problem: &'static str,
        iterations: usize,
        residual: f64,
        target: Option<f64>,
    },

    /// Foil load density above the cavitation limit.
    #[error("Foil load density {load_density:.0} Pa exceeds cavitation limit {limit:.0} Pa")]
    Cavitation { load_density: f64, limit: f64 },
}

pub type HydroResult<T> = Result<T, HydroError>;

fn target_suffix(target: &Option<f64>) -> String {
    match target {
        Some(t) => format!(", target {t:.1} N not met"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_convergence_message_names_target() {
        let err = HydroError::NonConvergence {
            problem: "Foil angle-of-attack",
            iterations: 12,
            residual: 0.5,
            target: Some(500_000.0),
        };
        let message = err.to_string();
        assert!(message.contains("Foil angle-of-attack"));
        assert!(message.contains("target 500000.0 N not met"), "{message}");
    }

    #[test]
    fn non_convergence_message_without_target() {
        let err = HydroError::NonConvergence {
            problem: "Sink",
            iterations: 3,
            residual: 1.0,
            target: None,
        };
        assert!(!err.to_string().contains("target"));
    }
}
