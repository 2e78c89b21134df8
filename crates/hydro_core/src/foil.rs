//! Hydrofoil lift, drag and pitching moment from finite-wing theory.
//!
//! The foil origin is at the quarter chord with x along the chord (forward)
//! and z normal to it. The free stream runs along the datum x axis, so the
//! angle of attack is minus the foil's absolute rotation (nose-down trim
//! reduces lift).

use std::f64::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assembly::MassComponent;
use crate::channels::ChannelSource;
use crate::environment::Environment;
use crate::error::{HydroError, HydroResult};
use crate::flow::{blasius_friction_coefficient, reynolds_number, schoenherr_friction_coefficient};
use crate::frame::Frame;
use crate::material::Material;
use crate::wrench::Wrench;

/// Foil load density above which sheet cavitation is expected [Pa].
pub const CAVITATION_LOAD_DENSITY: f64 = 60e3;
/// Depth at which the foil develops its full force [m].
const FULL_SUBMERSION_DEPTH: f64 = 0.1;
const SCHOENHERR_SEED: f64 = 0.002;
/// Below this effective aspect ratio the blended lift slope switches to Helmbold.
const HELMBOLD_ASPECT_RATIO: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrictionModel {
    /// Laminar flat plate, 1.328 / sqrt(Re).
    Blasius,
    /// Turbulent flat plate, solved from the Schoenherr line.
    Schoenherr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiftSlopeModel {
    /// Prandtl lifting line at every aspect ratio.
    LiftingLine,
    /// Helmbold below aspect ratio 4, lifting line above.
    Blended,
}

/// Construction options for a [`HydroFoil`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoilOptions {
    pub thickness_ratio: f64,
    pub oswald_efficiency: f64,
    pub friction_model: FrictionModel,
    pub lift_slope_model: LiftSlopeModel,
    /// Multiplier on aspect ratio for end plates or hull-side mounting.
    pub end_plate_factor: f64,
    /// Bounds applied to `end_plate_factor`.
    pub end_plate_bounds: (f64, f64),
}

impl Default for FoilOptions {
    fn default() -> Self {
        Self {
            thickness_ratio: 0.12,
            oswald_efficiency: 0.9,
            friction_model: FrictionModel::Blasius,
            lift_slope_model: LiftSlopeModel::LiftingLine,
            end_plate_factor: 1.0,
            end_plate_bounds: (1.0, 2.0),
        }
    }
}

/// Quantities from the last `force_moment` evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FoilDiagnostics {
    pub angle_of_attack: f64,
    pub lift_coefficient: f64,
    pub drag_coefficient: f64,
    pub lift: f64,
    pub drag: f64,
    pub moment: f64,
    pub submersion_factor: f64,
    pub load_density: f64,
    pub cavitating: bool,
}

/// Unscaled hydrodynamic loads in wind axes.
#[derive(Debug, Clone, Copy)]
struct FoilLoads {
    cl: f64,
    cd: f64,
    lift: f64,
    drag: f64,
    moment: f64,
}

#[derive(Debug, Clone)]
pub struct HydroFoil {
    span: f64,
    chord: f64,
    frame: Arc<Frame>,
    options: FoilOptions,
    environment: Environment,
    last: FoilDiagnostics,
    spar_thickness: Option<f64>,
}

impl HydroFoil {
    pub fn new(span: f64, chord: f64, frame: Arc<Frame>) -> HydroResult<Self> {
        Self::with_options(span, chord, frame, FoilOptions::default())
    }

    pub fn with_options(
        span: f64,
        chord: f64,
        frame: Arc<Frame>,
        mut options: FoilOptions,
    ) -> HydroResult<Self> {
        validate_planform(span, chord, options.thickness_ratio)?;
        if !(options.oswald_efficiency > 0.0 && options.oswald_efficiency <= 1.0) {
            return Err(HydroError::Validation(format!(
                "Oswald efficiency must be in (0, 1], got {}",
                options.oswald_efficiency
            )));
        }
        let (lo, hi) = options.end_plate_bounds;
        if !(lo > 0.0 && lo <= hi) {
            return Err(HydroError::Validation(format!(
                "end plate bounds must satisfy 0 < lower <= upper, got ({lo}, {hi})"
            )));
        }
        options.end_plate_factor = options.end_plate_factor.clamp(lo, hi);

        Ok(Self {
            span,
            chord,
            frame,
            options,
            environment: Environment::default(),
            last: FoilDiagnostics::default(),
            spar_thickness: None,
        })
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn span(&self) -> f64 {
        self.span
    }

    pub fn chord(&self) -> f64 {
        self.chord
    }

    pub fn thickness_ratio(&self) -> f64 {
        self.options.thickness_ratio
    }

    pub fn options(&self) -> &FoilOptions {
        &self.options
    }

    pub fn reference_area(&self) -> f64 {
        self.span * self.chord
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.span * self.span / self.reference_area()
    }

    pub fn effective_aspect_ratio(&self) -> f64 {
        self.aspect_ratio() * self.options.end_plate_factor
    }

    pub fn frame(&self) -> &Arc<Frame> {
        &self.frame
    }

    pub fn diagnostics(&self) -> &FoilDiagnostics {
        &self.last
    }

    /// Spar wall thickness from the last successful `structural_mass` call [m].
    pub fn spar_thickness(&self) -> Option<f64> {
        self.spar_thickness
    }

    /// Local (x, z, rot_y) relative to the parent frame.
    pub fn location(&self) -> (f64, f64, f64) {
        self.frame.location()
    }

    /// Moves the foil within its current parent frame.
    pub fn set_location(&mut self, pos_x: f64, pos_z: f64, rot_y: f64) {
        let parent = self.frame.parent().cloned().unwrap_or_else(Frame::datum);
        self.frame = Frame::new(parent, pos_x, pos_z, rot_y);
    }

    /// Keeps the local location and hangs the foil from `parent`.
    pub fn attach_to(&mut self, parent: Arc<Frame>) {
        self.frame = self.frame.reparented(parent);
    }

    pub fn resize(&mut self, span: f64, chord: f64, thickness_ratio: f64) -> HydroResult<()> {
        validate_planform(span, chord, thickness_ratio)?;
        self.span = span;
        self.chord = chord;
        self.options.thickness_ratio = thickness_ratio;
        self.spar_thickness = None;
        Ok(())
    }

    pub fn position_on_hull(&self, hull_frame: &Frame) -> (f64, f64) {
        self.frame.point_to_frame(0.0, 0.0, hull_frame)
    }

    pub fn trim_on_hull(&self, hull_frame: &Frame) -> f64 {
        self.frame.rotation_in_datum() - hull_frame.rotation_in_datum()
    }

    pub fn angle_of_attack(&self) -> f64 {
        -self.frame.rotation_in_datum()
    }

    /// 0 at or above the free surface, ramping to 1 at 100 mm depth.
    pub fn submersion_factor(&self) -> f64 {
        let depth = -self.frame.origin_in_datum().1;
        (depth / FULL_SUBMERSION_DEPTH).clamp(0.0, 1.0)
    }

    /// Lift-curve slope per radian for the finite wing.
    pub fn lift_slope(&self) -> f64 {
        let a0 = 2.0 * PI;
        let ar = self.effective_aspect_ratio();
        let e = self.options.oswald_efficiency;
        match self.options.lift_slope_model {
            LiftSlopeModel::Blended if ar < HELMBOLD_ASPECT_RATIO => {
                let ratio = a0 / (PI * ar);
                a0 / ((1.0 + ratio * ratio).sqrt() + ratio)
            }
            _ => a0 / (1.0 + a0 / (PI * ar * e)),
        }
    }

    /// Forces and moment in the foil frame at `speed` [m/s].
    pub fn force_moment(&mut self, speed: f64) -> HydroResult<Wrench> {
        let aoa = self.angle_of_attack();
        let factor = self.submersion_factor();
        let loads = self.loads(aoa, speed)?;

        let lift = loads.lift * factor;
        let drag = loads.drag * factor;
        let moment = loads.moment * factor;

        // Wind axes are datum-aligned: lift along +z, drag along -x.
        let (fx, fz) = self.frame.vector_from_frame(-drag, lift, &Frame::datum());

        let load_density = lift / self.reference_area();
        self.last = FoilDiagnostics {
            angle_of_attack: aoa,
            lift_coefficient: loads.cl,
            drag_coefficient: loads.cd,
            lift,
            drag,
            moment,
            submersion_factor: factor,
            load_density,
            cavitating: load_density.abs() > CAVITATION_LOAD_DENSITY,
        };
        Ok(Wrench::new(fx, fz, moment))
    }

    /// Whether the last evaluated load density exceeds the cavitation limit.
    pub fn is_cavitating(&self) -> bool {
        self.last.cavitating
    }

    /// Reports the last evaluated load density as an error when it exceeds the
    /// cavitation limit. Callers decide whether that rejects the configuration.
    pub fn cavitation_check(&self) -> HydroResult<()> {
        if self.last.cavitating {
            warn!(
                load_density = self.last.load_density,
                limit = CAVITATION_LOAD_DENSITY,
                "foil loading above cavitation limit"
            );
            return Err(HydroError::Cavitation {
                load_density: self.last.load_density.abs(),
                limit: CAVITATION_LOAD_DENSITY,
            });
        }
        Ok(())
    }

    /// Mass of a square hollow-section steel spar sized as a cantilever for the
    /// worst-case load at (`max_aoa`, `max_speed`).
    ///
    /// `fos` multiplies the design bending moment, `share_frac` is the fraction
    /// of that moment carried by other structure, and `scaling_factor` covers
    /// skins, ribs and fittings. The returned component sits at mid chord in
    /// foil coordinates.
    pub fn structural_mass(
        &mut self,
        max_aoa: f64,
        max_speed: f64,
        material: &Material,
        fos: f64,
        scaling_factor: f64,
        share_frac: f64,
    ) -> HydroResult<MassComponent> {
        if !(max_speed > 0.0) {
            return Err(HydroError::Validation(format!(
                "structural sizing speed must be positive, got {max_speed}"
            )));
        }
        if !(fos > 0.0 && scaling_factor > 0.0) {
            return Err(HydroError::Validation(format!(
                "factor of safety and scaling factor must be positive, got {fos} and {scaling_factor}"
            )));
        }
        if !(0.0..1.0).contains(&share_frac) {
            return Err(HydroError::Validation(format!(
                "load share fraction must be in [0, 1), got {share_frac}"
            )));
        }

        let (x, z, _) = self.location();
        // Local rotation that puts the foil at `max_aoa` to the free stream.
        let parent_rotation = self.frame.parent().map_or(0.0, |p| p.rotation_in_datum());
        let loads = self.with_orientation(-max_aoa - parent_rotation, |foil| {
            let aoa = foil.angle_of_attack();
            foil.loads(aoa, max_speed)
        })?;

        let load = loads.lift.hypot(loads.drag);
        let root_moment = fos * (1.0 - share_frac) * load * self.span / 2.0;
        let required_modulus = root_moment / material.yield_strength;

        let spar_height = self.options.thickness_ratio * self.chord;
        let h4 = spar_height.powi(4);
        let discriminant = h4 - 6.0 * spar_height * required_modulus;
        if discriminant < 0.0 || !discriminant.is_finite() {
            let max_modulus = spar_height.powi(3) / 6.0;
            warn!(
                span = self.span,
                chord = self.chord,
                required_modulus,
                max_modulus,
                "foil spar cannot carry the design load"
            );
            return Err(HydroError::StructuralInfeasibility {
                required_modulus,
                max_modulus,
                spar_height,
            });
        }

        let inner = discriminant.powf(0.25);
        let wall = 0.5 * (spar_height - inner);
        let section_area = spar_height * spar_height - inner * inner;
        let mass = material.density * section_area * self.span * scaling_factor;
        debug!(
            load,
            root_moment,
            wall,
            mass,
            at = ?(x, z),
            "sized foil spar"
        );

        self.spar_thickness = Some(wall);
        Ok(MassComponent::new(mass, -self.chord / 4.0, 0.0))
    }

    /// Runs `f` with the foil's local rotation temporarily set to `rot_y`,
    /// restoring the original frame and diagnostics on every exit path.
    fn with_orientation<F, R>(&mut self, rot_y: f64, f: F) -> HydroResult<R>
    where
        F: FnOnce(&mut HydroFoil) -> HydroResult<R>,
    {
        let original_frame = self.frame.clone();
        let original_last = self.last;
        let (x, z, _) = original_frame.location();
        self.set_location(x, z, rot_y);
        let result = f(self);
        self.frame = original_frame;
        self.last = original_last;
        result
    }

    fn loads(&self, aoa: f64, speed: f64) -> HydroResult<FoilLoads> {
        if speed <= 0.0 {
            return Ok(FoilLoads {
                cl: self.lift_slope() * aoa,
                cd: 0.0,
                lift: 0.0,
                drag: 0.0,
                moment: 0.0,
            });
        }

        let env = &self.environment;
        let q_area = env.dynamic_pressure(speed) * self.reference_area();

        let cl = self.lift_slope() * aoa;

        let re = reynolds_number(speed, env.kinematic_viscosity, self.chord);
        let cd_friction = match self.options.friction_model {
            FrictionModel::Blasius => blasius_friction_coefficient(re),
            FrictionModel::Schoenherr => schoenherr_friction_coefficient(re, SCHOENHERR_SEED)?,
        };
        let cd_induced =
            cl * cl / (PI * self.effective_aspect_ratio() * self.options.oswald_efficiency);
        let cd = cd_friction + cd_induced;

        // Flat plate: lift acting aft of the leading edge pitches the nose down.
        let cm = PI * aoa / 2.0;

        Ok(FoilLoads {
            cl,
            cd,
            lift: cl * q_area,
            drag: cd * q_area,
            moment: cm * q_area * self.chord,
        })
    }
}

fn validate_planform(span: f64, chord: f64, thickness_ratio: f64) -> HydroResult<()> {
    if !(span > 0.0 && span.is_finite()) {
        return Err(HydroError::Validation(format!(
            "foil span must be positive, got {span}"
        )));
    }
    if !(chord > 0.0 && chord.is_finite()) {
        return Err(HydroError::Validation(format!(
            "foil chord must be positive, got {chord}"
        )));
    }
    if !(thickness_ratio > 0.0 && thickness_ratio < 1.0) {
        return Err(HydroError::Validation(format!(
            "foil thickness ratio must be in (0, 1), got {thickness_ratio}"
        )));
    }
    Ok(())
}

impl ChannelSource for HydroFoil {
    fn channels(&self) -> Vec<(&'static str, f64)> {
        let d = &self.last;
        vec![
            ("Span_m", self.span),
            ("Chord_m", self.chord),
            ("AoA_rad", d.angle_of_attack),
            ("Cl", d.lift_coefficient),
            ("Cd", d.drag_coefficient),
            ("Lift_N", d.lift),
            ("Drag_N", d.drag),
            ("Moment_Nm", d.moment),
            ("SubmersionFactor", d.submersion_factor),
            ("LoadDensity_Pa", d.load_density),
            ("Cavitating", if d.cavitating { 1.0 } else { 0.0 }),
        ]
    }
}
