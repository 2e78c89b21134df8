//! A hull, its hydrofoils and point masses, combined into one net wrench.

use serde::{Deserialize, Serialize};

use crate::channels::ChannelSource;
use crate::error::HydroResult;
use crate::foil::HydroFoil;
use crate::frame::Frame;
use crate::hull::Hull;
use crate::wrench::Wrench;

/// Point mass at (`pos_x`, `pos_z`) in some frame the owner keeps track of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassComponent {
    /// [kg]
    pub mass: f64,
    /// [m]
    pub pos_x: f64,
    /// [m]
    pub pos_z: f64,
}

impl MassComponent {
    pub fn new(mass: f64, pos_x: f64, pos_z: f64) -> Self {
        Self { mass, pos_x, pos_z }
    }
}

#[derive(Debug, Clone)]
pub struct VesselAssembly {
    hull: Hull,
    /// Foils with their mass, the mass position already in hull coordinates.
    foils: Vec<(HydroFoil, MassComponent)>,
    /// Standalone masses in hull coordinates.
    mass_components: Vec<MassComponent>,
    last_body: Wrench,
    last_waterplane: Wrench,
}

impl VesselAssembly {
    pub fn new(hull: Hull) -> Self {
        Self {
            hull,
            foils: Vec::new(),
            mass_components: Vec::new(),
            last_body: Wrench::ZERO,
            last_waterplane: Wrench::ZERO,
        }
    }

    pub fn hull(&self) -> &Hull {
        &self.hull
    }

    pub fn hull_mut(&mut self) -> &mut Hull {
        &mut self.hull
    }

    pub fn foils(&self) -> impl Iterator<Item = &HydroFoil> {
        self.foils.iter().map(|(foil, _)| foil)
    }

    pub fn foil(&self, index: usize) -> Option<&HydroFoil> {
        self.foils.get(index).map(|(foil, _)| foil)
    }

    /// Mutable access to a mounted foil. Moving it does not move its stored mass.
    pub fn foil_mut(&mut self, index: usize) -> Option<&mut HydroFoil> {
        self.foils.get_mut(index).map(|(foil, _)| foil)
    }

    pub fn foil_count(&self) -> usize {
        self.foils.len()
    }

    /// Mounts `foil` on the hull. `foil_mass` is given in foil coordinates and is
    /// converted to hull coordinates once, here; foils are treated as rigidly
    /// mounted, so later relocation of the foil leaves the mass where it was.
    pub fn add_foil(&mut self, mut foil: HydroFoil, foil_mass: MassComponent) {
        foil.attach_to(self.hull.frame().clone());
        let (pos_x, pos_z) =
            foil.frame()
                .point_to_frame(foil_mass.pos_x, foil_mass.pos_z, self.hull.frame());
        self.foils
            .push((foil, MassComponent::new(foil_mass.mass, pos_x, pos_z)));
    }

    /// Adds a point mass given in hull coordinates.
    pub fn add_mass_component(&mut self, mass: MassComponent) {
        self.mass_components.push(mass);
    }

    pub fn mass_components(&self) -> impl Iterator<Item = &MassComponent> {
        self.foils
            .iter()
            .map(|(_, mass)| mass)
            .chain(self.mass_components.iter())
    }

    pub fn total_mass(&self) -> f64 {
        self.mass_components().map(|m| m.mass).sum()
    }

    /// Places the hull; mounted foils follow it.
    pub fn set_state(&mut self, sink: f64, trim: f64) {
        self.hull.set_state(sink, trim);
        let hull_frame = self.hull.frame().clone();
        for (foil, _) in &mut self.foils {
            foil.attach_to(hull_frame.clone());
        }
    }

    /// Weight of every mass component, in hull coordinates with moments about the hull origin.
    pub fn gravity_wrench(&self) -> Wrench {
        let datum = Frame::datum();
        let hull_frame = self.hull.frame();
        let g = self.hull.environment().gravity;
        self.mass_components()
            .map(|m| {
                let (fx, fz) = hull_frame.vector_from_frame(0.0, -m.mass * g, &datum);
                Wrench::new(fx, fz, Wrench::moment_of_force(m.pos_x, m.pos_z, fx, fz))
            })
            .sum()
    }

    /// Net wrench in hull coordinates, moments about the hull origin.
    pub fn force_moment_body(&mut self, speed: f64) -> HydroResult<Wrench> {
        let mut total = self.gravity_wrench();
        total += self.hull.force_moment(speed)?;

        let hull_frame = self.hull.frame().clone();
        for (foil, _) in &mut self.foils {
            let local = foil.force_moment(speed)?;
            let (fx, fz) = foil.frame().vector_to_frame(local.fx, local.fz, &hull_frame);
            let (px, pz) = foil.position_on_hull(&hull_frame);
            total += Wrench::new(fx, fz, local.my + Wrench::moment_of_force(px, pz, fx, fz));
        }

        self.last_body = total;
        Ok(total)
    }

    /// Net wrench with the force in datum coordinates. The moment is carried
    /// through unchanged since the two frames differ by a pure rotation.
    pub fn force_moment_waterplane(&mut self, speed: f64) -> HydroResult<Wrench> {
        let body = self.force_moment_body(speed)?;
        let waterplane = body.rotated(self.hull.frame(), &Frame::datum());
        self.last_waterplane = waterplane;
        Ok(waterplane)
    }
}

impl ChannelSource for VesselAssembly {
    fn channels(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("TotalMass_kg", self.total_mass()),
            ("BodyFx_N", self.last_body.fx),
            ("BodyFz_N", self.last_body.fz),
            ("BodyMy_Nm", self.last_body.my),
            ("Fx_N", self.last_waterplane.fx),
            ("Fz_N", self.last_waterplane.fz),
            ("My_Nm", self.last_waterplane.my),
        ]
    }
}
