//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for waypoints in the spatial graph
///
/// Dense index assigned at graph build time; only valid against the graph
/// that issued it. A rebuilt graph issues fresh ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WaypointId(pub u32);

impl WaypointId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Simulation time in seconds since startup
pub type Seconds = f32;

/// Body dimensions of the pursuing agent, refreshed from the actuator each
/// tick so probes track posture changes (crouching, grounding).
#[derive(Debug, Clone, Copy)]
pub struct BodyDims {
    /// World-space Y of the feet line (ground contact when grounded)
    pub feet_y: f32,
    /// World-space Y of the chest probe line
    pub chest_y: f32,
    /// World-space Y of the head probe line
    pub head_y: f32,
    /// Standing height in world units
    pub height: f32,
    /// Horizontal capsule radius in world units
    pub radius: f32,
}

impl BodyDims {
    /// Fraction of body height where the chest probes originate
    pub const CHEST_FRAC: f32 = 0.60;
    /// Chest fraction while crouching (probes ride a little lower)
    pub const CHEST_FRAC_CROUCHED: f32 = 0.54;

    /// Derive probe lines from a feet position and posture.
    pub fn from_posture(feet_y: f32, height: f32, radius: f32, crouching: bool) -> Self {
        let height = height.clamp(1.0, 2.6);
        let frac = if crouching {
            Self::CHEST_FRAC_CROUCHED
        } else {
            Self::CHEST_FRAC
        };
        Self {
            feet_y,
            chest_y: feet_y + height * frac,
            head_y: feet_y + height,
            height,
            radius: radius.clamp(0.10, 0.60),
        }
    }
}

impl Default for BodyDims {
    fn default() -> Self {
        Self::from_posture(0.0, 1.8, 0.30, false)
    }
}
