//! The `hydro_core` crate models a displacement hull with optional hydrofoils and
//! solves for its steady state at a given forward speed.
//!
//! Key components:
//! - **Frames**: `Frame` (2D x-z rigid transforms chained to a fixed datum) and `Wrench`.
//! - **Bodies**: `Hull` (hydrostatics, Schoenherr friction, Holtrop-Mennen wave resistance)
//!   and `HydroFoil` (lifting-line lift, drag and moment; spar sizing; cavitation check).
//! - **Assembly**: `VesselAssembly` sums gravity, hull and foil loads about the hull origin.
//! - **VPP**: bounded least-squares sink and angle-of-attack solves, plus warm-started sweeps.
//! - **Channels**: `ChannelSource` / `ResultsLog` for recording named scalar outputs.
pub mod assembly;
pub mod channels;
pub mod config;
pub mod environment;
pub mod error;
pub mod flow;
pub mod foil;
pub mod frame;
pub mod hull;
pub mod material;
pub mod solver;
pub mod vpp;
pub mod wrench;

pub use assembly::{MassComponent, VesselAssembly};
pub use channels::{ChannelSource, ResultsLog};
pub use config::AnalysisConfig;
pub use environment::Environment;
pub use error::{HydroError, HydroResult};
pub use foil::{FoilOptions, FrictionModel, HydroFoil, LiftSlopeModel};
pub use frame::Frame;
pub use hull::Hull;
pub use material::Material;
pub use solver::SolverSettings;
pub use vpp::{
    solve_foil_angle_of_attack, solve_sink_equilibrium, sweep_foil_angle_of_attack,
    sweep_sink_equilibrium, AoaSolveConfig, SinkSolveConfig,
};
pub use wrench::Wrench;
