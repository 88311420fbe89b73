//! Crag Pursuit - terrain-aware chase agent
//!
//! A pursuit controller for an agent chasing a moving target across
//! irregular 3D terrain. Steering prefers the host engine's mesh
//! pathfinding, degrades to a self-built waypoint graph, and finally to
//! straight lines; a utility brain layered on top decides when to rest,
//! sprint, hop, jump gaps, or climb walls.

pub mod brain;
pub mod control;
pub mod core;
pub mod graph;
pub mod perception;
pub mod world;

pub use brain::{Action, Brain, Decision};
pub use control::Follower;
pub use core::{PursuitConfig, PursuitError, Result};
pub use graph::{Bounds, NavGraph};
pub use perception::Blackboard;
pub use world::{Actuator, PathStatus, RayHit, SteeringOracle, TerrainQuery};
