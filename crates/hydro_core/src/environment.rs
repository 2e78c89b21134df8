use serde::{Deserialize, Serialize};

/// Water properties and gravity for the bodies of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// [m/s^2]
    pub gravity: f64,
    /// [kg/m^3]
    pub water_density: f64,
    /// [m^2/s]
    pub kinematic_viscosity: f64,
}

impl Environment {
    /// ITTC sea water at 15 degC.
    pub const fn sea_water() -> Self {
        Self {
            gravity: 9.8066,
            water_density: 1026.0,
            kinematic_viscosity: 1.2e-6,
        }
    }

    pub const fn fresh_water() -> Self {
        Self {
            gravity: 9.8066,
            water_density: 999.0,
            kinematic_viscosity: 1.14e-6,
        }
    }

    /// Dynamic pressure 0.5 * rho * V^2 [Pa].
    pub fn dynamic_pressure(&self, speed: f64) -> f64 {
        0.5 * self.water_density * speed * speed
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::sea_water()
    }
}
