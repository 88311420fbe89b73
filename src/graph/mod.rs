pub mod builder;
pub mod detour;
pub mod waypoint;

pub use builder::{Bounds, BuildStep, GraphBuilder};
pub use detour::DetourEstimator;
pub use waypoint::{NavGraph, Waypoint};
