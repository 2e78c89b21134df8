//! Equilibrium solves: hull sink for vertical force balance, and the foil angle
//! of attack that produces a target lift.
//!
//! Both solves leave the body in the solved state, with its diagnostics
//! refreshed, so the caller can read drag and power straight off it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assembly::VesselAssembly;
use crate::error::{HydroError, HydroResult};
use crate::foil::HydroFoil;
use crate::frame::Frame;
use crate::solver::{solve_bounded_least_squares, SolverSettings};

const SINK_PROBLEM: &str = "Sink equilibrium";
const AOA_PROBLEM: &str = "Foil angle-of-attack";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkSolveConfig {
    /// Deepest allowed sink [m].
    pub lower: f64,
    /// Shallowest allowed sink [m]; kept below zero so the hull stays wet.
    pub upper: f64,
    /// Divides the vertical force to condition the residual [N].
    pub force_scale: f64,
    pub settings: SolverSettings,
}

impl Default for SinkSolveConfig {
    fn default() -> Self {
        Self {
            lower: -15.0,
            upper: -0.01,
            force_scale: 1e7,
            settings: SolverSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AoaSolveConfig {
    pub lower_deg: f64,
    pub upper_deg: f64,
    /// Lift residual unit [N]; 1000 reports the residual in kN.
    pub force_scale: f64,
    /// Largest accepted final residual, in `force_scale` units.
    pub success_tolerance: f64,
    pub settings: SolverSettings,
}

impl Default for AoaSolveConfig {
    fn default() -> Self {
        Self {
            lower_deg: -25.0,
            upper_deg: 25.0,
            force_scale: 1000.0,
            success_tolerance: 0.1,
            settings: SolverSettings::default(),
        }
    }
}

impl AoaSolveConfig {
    /// Bounds in radians.
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower_deg.to_radians(), self.upper_deg.to_radians())
    }
}

/// Sink at which the net waterplane vertical force vanishes, at zero trim.
pub fn solve_sink_equilibrium(
    assembly: &mut VesselAssembly,
    speed: f64,
    initial_guess: f64,
) -> HydroResult<f64> {
    solve_sink_equilibrium_with_config(assembly, speed, initial_guess, &SinkSolveConfig::default())
}

pub fn solve_sink_equilibrium_with_config(
    assembly: &mut VesselAssembly,
    speed: f64,
    initial_guess: f64,
    config: &SinkSolveConfig,
) -> HydroResult<f64> {
    if !(config.force_scale > 0.0) {
        return Err(HydroError::Validation(format!(
            "sink force scale must be positive, got {}",
            config.force_scale
        )));
    }

    let report = solve_bounded_least_squares(
        SINK_PROBLEM,
        |x| {
            assembly.set_state(x[0], 0.0);
            let wrench = assembly.force_moment_waterplane(speed)?;
            Ok(vec![wrench.fz / config.force_scale])
        },
        &[initial_guess],
        &[(config.lower, config.upper)],
        &config.settings,
    )?;

    let sink = report.x[0];
    assembly.set_state(sink, 0.0);
    let wrench = assembly.force_moment_waterplane(speed)?;
    debug!(
        speed,
        sink,
        fz = wrench.fz,
        iterations = report.iterations,
        "sink equilibrium found"
    );
    Ok(sink)
}

/// Angle of attack in [`lower`, `upper`] (radians) at which the foil's lift,
/// resolved onto the datum vertical, equals `target_lift` [N].
///
/// The candidate angle is applied as the foil's local rotation (`rot_y = -aoa`),
/// so for a foil on a trimmed hull it is relative to the hull. On failure the
/// foil is left exactly as it was passed in.
pub fn solve_foil_angle_of_attack(
    foil: &mut HydroFoil,
    target_lift: f64,
    speed: f64,
    initial_guess: f64,
    lower: f64,
    upper: f64,
) -> HydroResult<f64> {
    let config = AoaSolveConfig {
        lower_deg: lower.to_degrees(),
        upper_deg: upper.to_degrees(),
        ..AoaSolveConfig::default()
    };
    solve_foil_angle_of_attack_with_config(foil, target_lift, speed, initial_guess, &config)
}

pub fn solve_foil_angle_of_attack_with_config(
    foil: &mut HydroFoil,
    target_lift: f64,
    speed: f64,
    initial_guess: f64,
    config: &AoaSolveConfig,
) -> HydroResult<f64> {
    if !(config.force_scale > 0.0 && config.success_tolerance > 0.0) {
        return Err(HydroError::Validation(format!(
            "angle-of-attack force scale and tolerance must be positive, got {} and {}",
            config.force_scale, config.success_tolerance
        )));
    }

    let entry = foil.clone();
    let (x, z, _) = foil.location();
    let settings = SolverSettings {
        residual_tolerance: config.success_tolerance,
        ..config.settings
    };
    let with_target = |err: HydroError| match err {
        HydroError::NonConvergence {
            problem,
            iterations,
            residual,
            ..
        } => HydroError::NonConvergence {
            problem,
            iterations,
            residual,
            target: Some(target_lift),
        },
        other => other,
    };

    let result = solve_bounded_least_squares(
        AOA_PROBLEM,
        |aoa| {
            let lift = vertical_lift(foil, x, z, aoa[0], speed)?;
            Ok(vec![(lift - target_lift) / config.force_scale])
        },
        &[initial_guess],
        &[config.bounds()],
        &settings,
    );

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            *foil = entry;
            return Err(with_target(err));
        }
    };

    let aoa = report.x[0];
    let lift = match vertical_lift(foil, x, z, aoa, speed) {
        Ok(lift) => lift,
        Err(err) => {
            *foil = entry;
            return Err(err);
        }
    };
    let residual = ((lift - target_lift) / config.force_scale).abs();
    if !(residual < config.success_tolerance) {
        *foil = entry;
        return Err(with_target(HydroError::NonConvergence {
            problem: AOA_PROBLEM,
            iterations: report.iterations,
            residual,
            target: None,
        }));
    }
    debug!(speed, target_lift, lift, aoa, "foil angle of attack found");
    Ok(aoa)
}

/// Places the foil at `aoa` and returns its force along the datum vertical.
fn vertical_lift(foil: &mut HydroFoil, x: f64, z: f64, aoa: f64, speed: f64) -> HydroResult<f64> {
    foil.set_location(x, z, -aoa);
    let wrench = foil.force_moment(speed)?;
    let (_, fz) = foil
        .frame()
        .vector_to_frame(wrench.fx, wrench.fz, &Frame::datum());
    Ok(fz)
}

/// Solves the sink at each speed in turn, seeding each solve with the last
/// converged sink. Failed points are `None` and do not move the seed.
pub fn sweep_sink_equilibrium(
    assembly: &mut VesselAssembly,
    speeds: &[f64],
    initial_guess: f64,
) -> Vec<Option<f64>> {
    sweep_sink_equilibrium_with_config(assembly, speeds, initial_guess, &SinkSolveConfig::default())
}

pub fn sweep_sink_equilibrium_with_config(
    assembly: &mut VesselAssembly,
    speeds: &[f64],
    initial_guess: f64,
    config: &SinkSolveConfig,
) -> Vec<Option<f64>> {
    let mut guess = initial_guess;
    speeds
        .iter()
        .map(|&speed| {
            match solve_sink_equilibrium_with_config(assembly, speed, guess, config) {
                Ok(sink) => {
                    guess = sink;
                    Some(sink)
                }
                Err(err) => {
                    warn!(speed, %err, "no sink equilibrium");
                    None
                }
            }
        })
        .collect()
}

/// Angle of attack for `target_lift` at each speed, warm-started from the last
/// converged angle. Failed points are `None`.
pub fn sweep_foil_angle_of_attack(
    foil: &mut HydroFoil,
    target_lift: f64,
    speeds: &[f64],
    initial_guess: f64,
    config: &AoaSolveConfig,
) -> Vec<Option<f64>> {
    let mut guess = initial_guess;
    speeds
        .iter()
        .map(|&speed| {
            match solve_foil_angle_of_attack_with_config(foil, target_lift, speed, guess, config) {
                Ok(aoa) => {
                    guess = aoa;
                    Some(aoa)
                }
                Err(err) => {
                    warn!(speed, target_lift, %err, "no foil angle of attack");
                    None
                }
            }
        })
        .collect()
}
