use serde::Serialize;

/// Structural material used when sizing foil spars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub name: &'static str,
    /// [kg/m^3]
    pub density: f64,
    /// [Pa]
    pub yield_strength: f64,
}

pub const STEEL: Material = Material {
    name: "Steel",
    density: 7800.0,
    yield_strength: 400e6,
};

/// Annealed AISI 1340.
pub const STEEL_AISI_1340: Material = Material {
    name: "Steel AISI 1340",
    density: 7850.0,
    yield_strength: 434e6,
};
