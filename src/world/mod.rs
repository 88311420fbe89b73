//! External collaborator interfaces
//!
//! The core treats the engine as three narrow capabilities: geometry queries
//! (`TerrainQuery`), the primary mesh pathfinding service (`SteeringOracle`),
//! and the locomotion actuator (`Actuator`). The control loop owns concrete
//! implementations and passes them down; nothing in the core reaches for
//! ambient globals.

use glam::{Vec2, Vec3};

use crate::core::types::{BodyDims, Seconds};

/// Result of a ray intersection against world geometry
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Ray/segment intersection and walkable-surface projection
///
/// Probes and the graph builder are pure functions of this capability plus
/// the agent's pose; tests supply synthetic implementations.
pub trait TerrainQuery {
    /// Cast a ray against world geometry. `None` is a plain miss, not an
    /// error.
    fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit>;

    /// Whether any geometry blocks the segment from `a` to `b`.
    fn segment_blocked(&self, a: Vec3, b: Vec3) -> bool;

    /// Project a point onto the nearest walkable surface within
    /// `max_distance`, or `None` if there is none.
    fn project_walkable(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Vertices of the walkable surface triangulation. Fallback sampling
    /// source when grid projection finds nothing.
    fn walkable_vertices(&self) -> Vec<Vec3>;
}

/// Status of the mesh oracle's current path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    /// No path at all
    None,
    /// A path exists but does not reach the destination
    Partial,
    /// A full path to the destination
    Complete,
}

/// The primary mesh pathfinding service, consumed opaquely
///
/// The core only asks for a next steering point and the corner polyline; it
/// falls back to its own graph when the oracle cannot produce a complete
/// path.
pub trait SteeringOracle {
    /// Request (re)pathing toward `target`. Called at the configured
    /// refresh period, not every tick.
    fn set_destination(&mut self, target: Vec3);

    fn status(&self) -> PathStatus;

    /// Next point to steer toward along the current path, if any.
    fn steering_point(&self) -> Option<Vec3>;

    /// Corner sequence of the current path; empty when there is no path.
    /// Primary source for the detour ratio.
    fn corners(&self) -> &[Vec3];
}

/// Read access to the character's pose and resources, write access to its
/// movement intent and maneuver triggers
pub trait Actuator {
    fn position(&self) -> Vec3;
    fn body(&self) -> BodyDims;

    fn is_grounded(&self) -> bool;
    fn is_climbing(&self) -> bool;
    /// Seconds spent attached to the current climbable surface
    fn since_climb(&self) -> Seconds;
    /// Whether the current climb hold is a static anchor that survives
    /// quieted inputs (resting keeps the grip instead of releasing it)
    fn on_static_grip(&self) -> bool;

    fn stamina(&self) -> f32;
    fn stamina_max(&self) -> f32;
    /// Seconds the stamina bar has been empty; 0 while any remains
    fn out_of_stamina_for(&self) -> Seconds;

    fn is_sprinting(&self) -> bool;
    fn set_sprinting(&mut self, on: bool);

    /// Movement intent in the character's local frame (x strafe, y forward)
    fn set_movement(&mut self, input: Vec2);
    /// Face the given world-space direction
    fn set_look(&mut self, dir: Vec3);

    /// Whether a jump issued right now would pass the actuator's own
    /// legality checks (jumps remaining, airborne time, charge state).
    /// The core pre-checks this and silently skips the maneuver when false.
    fn can_jump(&self) -> bool;
    /// Idempotent jump trigger; the actuator applies its own gating again.
    fn attempt_jump(&mut self);
    /// Try to latch onto a climbable surface in front of the character.
    fn attempt_climb(&mut self);
    /// Let go of the current climb hold.
    fn release_climb(&mut self);

    /// Transform a world-space direction into the local movement frame.
    /// Default assumes the local frame is world-aligned (x strafe, z
    /// forward), which suits actuators steered by `set_look`.
    fn to_local(&self, world_dir: Vec3) -> Vec2 {
        Vec2::new(world_dir.x, world_dir.z)
    }

    /// Stamina as a fraction of the maximum, safe against a zero max.
    fn stamina_frac(&self) -> f32 {
        self.stamina() / self.stamina_max().max(1e-4)
    }
}
