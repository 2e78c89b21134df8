//! Hull hydrostatics and resistance.
//!
//! The hull is a box with a triangular-prism bow and a V-shaped bottom running
//! the full length. The V and bow overlap, so the bow contribution to volume and
//! area is halved to approximate a faired shape. End faces of the prisms are
//! ignored in the area sums.
//!
//! The hull origin is at the transom, on the keel. Forces are returned in the
//! hull frame; trim is not coupled into force direction (buoyancy is taken
//! along hull z and drag along hull -x).

use std::sync::Arc;

use serde::Serialize;

use crate::channels::ChannelSource;
use crate::environment::Environment;
use crate::error::{HydroError, HydroResult};
use crate::flow::{froude_number, reynolds_number, schoenherr_friction_coefficient};
use crate::frame::Frame;
use crate::wrench::Wrench;

/// Drafts below this are treated as the hull sitting on the surface.
const DRY_DRAFT: f64 = 1e-6;
const SCHOENHERR_SEED: f64 = 0.002;
/// Position of the LCB forward of midships, percent of L.
const LCB_PERCENT: f64 = 0.0;
/// Smallest 1 - Cp and 1 - Cwp fed to the entrance angle regression.
const MIN_FULLNESS_MARGIN: f64 = 1e-3;
/// Half angle of entrance upper limit [deg]; c1 is singular at 90.
const MAX_ENTRANCE_ANGLE: f64 = 89.0;

/// Quantities from the last `force_moment` evaluation, kept for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HullDiagnostics {
    pub fx: f64,
    pub fz: f64,
    pub cd_skin_friction: f64,
    pub friction_drag: f64,
    pub wave_drag: f64,
    pub drag: f64,
    pub buoyancy: f64,
    pub wetted_area: f64,
    pub displaced_volume: f64,
    pub cp: f64,
    pub cm: f64,
    pub cwp: f64,
}

#[derive(Debug, Clone)]
pub struct Hull {
    length: f64,
    beam: f64,
    height: f64,
    bow_fraction: f64,
    chine_fraction: f64,
    v_depth: f64,
    environment: Environment,
    frame: Arc<Frame>,
    draft: f64,
    last: HullDiagnostics,
}

impl Hull {
    pub fn new(
        length: f64,
        beam: f64,
        height: f64,
        bow_fraction: f64,
        chine_fraction: f64,
    ) -> HydroResult<Self> {
        for (name, value) in [("length", length), ("beam", beam), ("height", height)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(HydroError::Validation(format!(
                    "hull {name} must be positive, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&chine_fraction) {
            return Err(HydroError::Validation(format!(
                "chine fraction must be in range [0, 1], got {chine_fraction}"
            )));
        }
        if !(0.0..=1.0).contains(&bow_fraction) {
            return Err(HydroError::Validation(format!(
                "bow fraction must be in range [0, 1], got {bow_fraction}"
            )));
        }

        let mut hull = Self {
            length,
            beam,
            height,
            bow_fraction,
            chine_fraction,
            v_depth: chine_fraction * height,
            environment: Environment::default(),
            frame: Frame::datum(),
            draft: 0.0,
            last: HullDiagnostics::default(),
        };
        // Start with some submersion.
        hull.set_state(-height / 3.0, 0.0);
        Ok(hull)
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Places the hull relative to the datum.
    /// `sink` is the z position of the hull origin (up positive), `trim` is bow-down positive.
    pub fn set_state(&mut self, sink: f64, trim: f64) {
        self.frame = Frame::new(Frame::datum(), 0.0, sink, trim);
        self.draft = (-self.frame.origin_in_datum().1).max(0.0);
    }

    pub fn frame(&self) -> &Arc<Frame> {
        &self.frame
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn beam(&self) -> f64 {
        self.beam
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn bow_fraction(&self) -> f64 {
        self.bow_fraction
    }

    pub fn chine_fraction(&self) -> f64 {
        self.chine_fraction
    }

    pub fn draft(&self) -> f64 {
        self.draft
    }

    pub fn diagnostics(&self) -> &HullDiagnostics {
        &self.last
    }

    /// Estimated centre of mass: half length, one third height (hull coordinates).
    pub fn mass_reference_point(&self) -> (f64, f64) {
        (self.length / 2.0, self.height / 3.0)
    }

    /// Drag and buoyancy at the current state, in hull coordinates.
    pub fn force_moment(&mut self, speed: f64) -> HydroResult<Wrench> {
        let mut d = HullDiagnostics::default();

        if self.draft >= DRY_DRAFT {
            d.wetted_area = self.wetted_surface_area();
            d.displaced_volume = self.displaced_volume();

            let section = self.submerged_cross_section();
            d.cp = d.displaced_volume / (section * self.length);
            d.cm = section / (self.beam * self.draft);
            d.cwp = self.waterplane_area() / (self.beam * self.length);

            if speed > 0.0 {
                let env = &self.environment;
                let re = reynolds_number(speed, env.kinematic_viscosity, self.length);
                d.cd_skin_friction = schoenherr_friction_coefficient(re, SCHOENHERR_SEED)?;
                d.friction_drag =
                    d.cd_skin_friction * env.dynamic_pressure(speed) * d.wetted_area;
                d.wave_drag = self.wave_resistance(speed, &d);
            }
            d.drag = d.friction_drag + d.wave_drag;
            d.buoyancy =
                d.displaced_volume * self.environment.water_density * self.environment.gravity;
        }

        d.fx = -d.drag;
        d.fz = d.buoyancy;
        self.last = d;
        Ok(Wrench::new(d.fx, d.fz, 0.0))
    }

    /// Holtrop-Mennen wave-making resistance plus transom immersion resistance.
    /// The measured draft stands in for the moulded draft T.
    fn wave_resistance(&self, speed: f64, d: &HullDiagnostics) -> f64 {
        let env = &self.environment;
        let fn_ = froude_number(speed, env.gravity, self.length);
        let aspect_ratio = self.beam / self.length;
        let draft = self.draft;
        let volume = d.displaced_volume;
        let (cp, cm, cwp) = (d.cp, d.cm, d.cwp);
        let lcb = LCB_PERCENT;

        let c7 = if aspect_ratio < 0.11 {
            0.229577 * aspect_ratio.powf(1.0 / 3.0)
        } else if aspect_ratio < 0.25 {
            aspect_ratio
        } else {
            0.5 - 0.0625 / aspect_ratio
        };

        // Prismatic and waterplane coefficients reach 1 on a bowless hull.
        let run = (1.0 - cp).max(MIN_FULLNESS_MARGIN);
        let l_r = self.length * (run + 0.06 * cp * lcb / (4.0 * cp - 1.0)).max(0.0);
        let i_e = (1.0
            + 89.0
                * (-(1.0 / aspect_ratio).powf(0.80856)
                    * (1.0 - cwp).max(MIN_FULLNESS_MARGIN).powf(0.30484)
                    * (run - 0.0225 * lcb).max(MIN_FULLNESS_MARGIN).powf(0.6367)
                    * (l_r / self.beam).powf(0.34574)
                    * (100.0 * volume / self.length.powi(3)).powf(0.16302))
                .exp())
        .min(MAX_ENTRANCE_ANGLE);

        let c1 = 2223105.0
            * c7.powf(3.78613)
            * (draft / self.beam).powf(1.07961)
            * (90.0 - i_e).powf(-1.37565);
        // No bulbous bow.
        let c2 = 1.0;

        // Half the midship section, for a realistic transom.
        let transom_area = self.submerged_cross_section() * 0.5;
        let c5 = 1.0 - 0.8 * transom_area / (self.beam * draft * cm);

        let lambda = if 1.0 / aspect_ratio < 12.0 {
            1.446 * cp - 0.03 / aspect_ratio
        } else {
            1.446 * cp - 0.36
        };

        let c16 = if cp < 0.8 {
            8.07981 * cp - 13.8673 * cp.powi(2) + 6.984388 * cp.powi(3)
        } else {
            1.73014 - 0.7067 * cp
        };

        let m1 = 0.0140407 * self.length / draft
            - 1.75254 * volume.cbrt() / self.length
            - 4.79323 * aspect_ratio
            - c16;

        let slenderness = self.length.powi(3) / volume;
        let c15 = if slenderness < 512.0 {
            -1.69385
        } else if slenderness < 1727.0 {
            -1.69385 + (self.length / volume.cbrt() - 8.0) / 2.36
        } else {
            0.0
        };

        let m2 = c15 * cp.powi(2) * (-0.1 * fn_.powi(-2)).exp();

        // m1 turns positive at very shallow drafts; a NaN exponent also maps to 0.
        let exponent = (m1 * fn_.powf(-0.9) + m2 * (lambda * fn_.powi(-2)).cos()).min(0.0);
        let wave = c1 * c2 * c5 * volume * env.water_density * env.gravity * exponent.exp();

        let fn_transom =
            speed / (2.0 * env.gravity * transom_area / (self.beam * (1.0 + cwp))).sqrt();
        // Zero from a transom Froude number of 5.
        let c6 = (0.2 * (1.0 - 0.2 * fn_transom)).max(0.0);
        let transom = env.dynamic_pressure(speed) * transom_area * c6;

        wave + transom
    }

    fn wetted_surface_area(&self) -> f64 {
        let draft = self.draft;
        let wp_beam = self.waterplane_beam();

        // V sides, bow portion halved.
        let v_side = self.v_depth.min(draft).hypot(wp_beam / 2.0);
        let mut area = 2.0 * v_side * self.length * (1.0 - 0.5 * self.bow_fraction);

        if draft > self.v_depth {
            let bow_sides = 2.0 * (self.length * self.bow_fraction).hypot(0.5 * self.beam);
            let perimeter = bow_sides + 2.0 * self.length * (1.0 - self.bow_fraction) + self.beam;
            area += perimeter * (draft - self.v_depth);
        }
        area
    }

    fn displaced_volume(&self) -> f64 {
        self.submerged_cross_section() * self.length * (1.0 - 0.5 * self.bow_fraction)
    }

    /// Beam at the waterline; narrower than the full beam while the V is not fully immersed.
    fn waterplane_beam(&self) -> f64 {
        if self.draft >= self.v_depth {
            self.beam
        } else {
            self.beam * self.draft / self.v_depth
        }
    }

    /// Immersed transverse section, constant along the length.
    fn submerged_cross_section(&self) -> f64 {
        let draft = self.draft;
        let mut section = 0.5 * self.waterplane_beam() * draft.min(self.v_depth);
        if draft > self.v_depth {
            section += (draft - self.v_depth) * self.beam;
        }
        section
    }

    fn waterplane_area(&self) -> f64 {
        self.waterplane_beam() * self.length * (1.0 - 0.5 * self.bow_fraction)
    }
}

impl ChannelSource for Hull {
    fn channels(&self) -> Vec<(&'static str, f64)> {
        let d = &self.last;
        vec![
            ("Fx_N", d.fx),
            ("Fz_N", d.fz),
            ("Cd_SkinFriction", d.cd_skin_friction),
            ("FrictionDrag_N", d.friction_drag),
            ("WaveDrag_N", d.wave_drag),
            ("Drag_N", d.drag),
            ("Buoyancy_N", d.buoyancy),
            ("WettedArea_m2", d.wetted_area),
            ("DisplacedVolume_m3", d.displaced_volume),
            ("Draft_m", self.draft),
            ("Cp", d.cp),
            ("Cwp", d.cwp),
            ("Cm", d.cm),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply_hull() -> Hull {
        Hull::new(35.5, 7.9, 3.0, 0.2, 0.1).expect("valid hull")
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: HydroResult<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn rejects_out_of_range_fractions() {
        assert_err_contains(Hull::new(35.5, 7.9, 3.0, 1.2, 0.1), "bow fraction");
        assert_err_contains(Hull::new(35.5, 7.9, 3.0, 0.2, -0.1), "chine fraction");
        assert_err_contains(Hull::new(0.0, 7.9, 3.0, 0.2, 0.1), "length");
    }

    #[test]
    fn draft_is_clamped_above_water() {
        let mut hull = supply_hull();
        hull.set_state(0.5, 0.0);
        assert_eq!(hull.draft(), 0.0);
        hull.set_state(-1.25, 0.0);
        assert!((hull.draft() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn zero_draft_produces_no_force() {
        let mut hull = supply_hull();
        hull.set_state(0.0, 0.0);
        for speed in [0.0, 5.0, 15.0] {
            let wrench = hull.force_moment(speed).unwrap();
            let d = hull.diagnostics();
            assert_eq!(d.wetted_area, 0.0);
            assert_eq!(d.displaced_volume, 0.0);
            assert_eq!(wrench, Wrench::ZERO);
            assert!(d.cp == 0.0 && d.cm == 0.0 && d.cwp == 0.0);
        }
    }

    #[test]
    fn buoyancy_increases_with_sink() {
        let mut hull = supply_hull();
        let mut previous = 0.0;
        let mut sink = -0.05;
        while sink > -3.0 {
            hull.set_state(sink, 0.0);
            let wrench = hull.force_moment(10.0).unwrap();
            assert!(wrench.fz > previous, "sink {sink}: {} <= {previous}", wrench.fz);
            assert!(wrench.fz.is_finite() && wrench.fx.is_finite());
            previous = wrench.fz;
            sink -= 0.1;
        }
    }

    #[test]
    fn displaced_volume_matches_section_geometry() {
        let mut hull = supply_hull();
        hull.set_state(-1.5, 0.0);
        hull.force_moment(0.0).unwrap();
        // V section 0.5 * 7.9 * 0.3, box section 1.2 * 7.9, bow halved over 20 % of length.
        let section = 0.5 * 7.9 * 0.3 + 1.2 * 7.9;
        let expected = section * 35.5 * 0.9;
        let d = hull.diagnostics();
        assert!((d.displaced_volume - expected).abs() < 1e-9);
        assert!((d.buoyancy - expected * 1026.0 * 9.8066).abs() < 1e-6);
        assert!((d.cp - 0.9).abs() < 1e-12);
    }

    #[test]
    fn drag_opposes_motion_and_grows_with_speed() {
        let mut hull = supply_hull();
        hull.set_state(-1.5, 0.0);
        let slow = hull.force_moment(5.0).unwrap();
        let slow_friction = hull.diagnostics().friction_drag;
        let fast = hull.force_moment(15.0).unwrap();
        let d = *hull.diagnostics();
        assert!(slow.fx < 0.0 && fast.fx < slow.fx);
        assert!(d.friction_drag > slow_friction);
        assert!(d.wave_drag > 0.0 && d.wave_drag.is_finite());
        assert!((d.drag - d.friction_drag - d.wave_drag).abs() < 1e-6);
    }

    #[test]
    fn partially_immersed_v_narrows_waterplane() {
        let mut hull = supply_hull();
        hull.set_state(-0.15, 0.0);
        hull.force_moment(8.0).unwrap();
        let d = *hull.diagnostics();
        // Half the chine depth gives half the beam at the waterline.
        let expected_cwp = 0.5 * 0.9;
        assert!((d.cwp - expected_cwp).abs() < 1e-12);
        assert!(d.wetted_area > 0.0);
    }

    #[test]
    fn bowless_hull_has_finite_resistance() {
        let mut hull = Hull::new(35.5, 7.9, 3.0, 0.0, 0.1).unwrap();
        hull.set_state(-1.5, 0.0);
        let wrench = hull.force_moment(15.0).unwrap();
        let d = *hull.diagnostics();
        assert!((d.cp - 1.0).abs() < 1e-12 && (d.cwp - 1.0).abs() < 1e-12);
        assert!(d.wave_drag.is_finite() && d.wave_drag >= 0.0);
        assert!(wrench.fx.is_finite() && wrench.fx < 0.0);
    }

    #[test]
    fn barely_wet_hull_has_finite_resistance() {
        let mut hull = supply_hull();
        for (sink, speed) in [(-2.0 * DRY_DRAFT, 15.0), (-1e-4, 15.0), (-0.015, 0.5)] {
            hull.set_state(sink, 0.0);
            let wrench = hull.force_moment(speed).unwrap();
            let d = hull.diagnostics();
            assert!(
                wrench.fx.is_finite() && wrench.fz.is_finite(),
                "sink {sink}, speed {speed}: {wrench:?}"
            );
            assert!(d.wave_drag.is_finite() && d.friction_drag.is_finite());
            assert!(wrench.fz > 0.0);
        }
    }

    #[test]
    fn exposes_named_channels() {
        let mut hull = supply_hull();
        hull.set_state(-1.0, 0.0);
        hull.force_moment(12.0).unwrap();
        let channels = hull.channels();
        let draft = channels.iter().find(|(name, _)| *name == "Draft_m").unwrap().1;
        assert!((draft - 1.0).abs() < 1e-12);
        assert_eq!(channels.len(), 13);
    }
}
