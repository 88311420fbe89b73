//! Pursuit tuning configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every field has a literal default
//! so a missing file or missing key degrades to the shipped tuning instead
//! of failing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{PursuitError, Result};

/// Flat set of named numeric thresholds driving the pursuit agent
///
/// These values have been tuned against steep, broken terrain. Changing them
/// shifts how eagerly the agent rests, sprints, and commits to climbs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    // === STAMINA THRESHOLDS ===
    /// Stamina fraction (0..1) at or below which the agent enters a
    /// regen-rest state
    pub rest_frac: f32,

    /// Recovery margin added to `rest_frac` before rest is allowed to end
    ///
    /// Asymmetric enter/exit thresholds; without the margin the agent
    /// chatters between resting and moving right at the boundary.
    pub rest_hysteresis: f32,

    /// Minimum stamina fraction to start or keep sprinting
    pub sprint_frac: f32,

    /// Minimum stamina fraction to attempt hops, ledge jumps, and to stay
    /// attached to a wall
    pub climb_frac: f32,

    /// Minimum absolute stamina to attempt a wall attach (must cover the
    /// attach tax, one burst, and headroom below)
    pub attach_abs: f32,

    /// Post-exhaustion lockout: consumptive maneuvers are suppressed while
    /// the actuator reports being out of stamina longer than this (seconds)
    pub exhaustion_lockout: f32,

    // === SPRINT HYSTERESIS ===
    /// Distance to the target at which sprinting starts
    pub sprint_enter_dist: f32,

    /// Sprint exit distance as a fraction of the enter distance
    ///
    /// Exit below enter gives the sprint decision inertia; at 0.7 a sprint
    /// begun at 18 units only releases once within ~12.6.
    pub sprint_exit_factor: f32,

    /// Debounce between sprint on/off toggles (seconds)
    pub sprint_toggle_cooldown: f32,

    // === GRAPH BUILD ===
    /// Grid spacing between candidate waypoints (world units)
    ///
    /// Smaller spacing gives denser graphs and better detour estimates at
    /// the cost of build time and per-estimate node counts.
    pub node_spacing: f32,

    /// Candidate points processed per `advance()` call
    ///
    /// Bounds the per-tick cost of an in-progress build; the builder yields
    /// back to the caller after each batch.
    pub build_batch: usize,

    /// Neighbors are kept within `nearest_neighbor_dist * connect_factor`
    ///
    /// Produces locally uniform connectivity instead of a dense mesh,
    /// bounding branching factor without an explicit cap.
    pub connect_factor: f32,

    /// Vertical offset applied to line-of-sight checks between waypoints
    /// so thin ground geometry does not register as an obstruction
    pub los_offset: f32,

    // === DETOUR ESTIMATION ===
    /// Maneuvers are only worth it when the graph route is this many times
    /// longer than the straight line
    pub detour_factor: f32,

    /// Hard cap on A* node expansions per estimate
    ///
    /// Keeps worst-case estimate latency bounded; a capped search reports
    /// an infinite detour, which callers read as "do not prefer this route".
    pub max_expansions: usize,

    /// Seconds between detour-ratio recomputations
    pub detour_recalc_period: f32,

    /// Either endpoint moving farther than this forces an early
    /// detour-ratio recomputation (world units)
    pub detour_move_epsilon: f32,

    // === STEP PROBE ===
    /// Forward ray length for the chest-height step probe
    pub step_probe_dist: f32,

    /// Lateral offset of the left/right step rays from center
    pub step_lateral: f32,

    /// Minimum obstacle height considered hoppable (below this the agent
    /// just walks over it)
    pub step_min_hop: f32,

    /// Maximum obstacle height considered hoppable (above this a wall
    /// attach is the right tool)
    pub step_max_hop: f32,

    // === WALL PROBE ===
    /// Forward cast range for the head/chest wall probes
    pub wall_probe_range: f32,

    /// Maximum planar distance at which a wall is considered attachable
    /// (tighter than the cast range)
    pub wall_reach: f32,

    /// Acceptance tolerance past vertical on the overhang side (degrees)
    ///
    /// The band is asymmetric: hanging under an overhang is easier than
    /// clinging to a shallow underhang, so the overhang side is wider.
    pub wall_overhang_tolerance_deg: f32,

    /// Acceptance tolerance short of vertical on the underhang side (degrees)
    pub wall_underhang_tolerance_deg: f32,

    // === GAP PROBE ===
    /// Horizontal jitter radius used to derive the gap-probe step size
    pub ledge_radius: f32,

    /// Height above the origin from which landing downcasts start
    pub ledge_height: f32,

    /// Maximum distance at which a ledge landing is still considered
    pub ledge_max_dist: f32,

    /// Minimum horizontal distance for a landing to count as a gap jump
    /// (prevents treating the current plateau as a landing)
    pub gap_min_dist: f32,

    /// Maximum height a landing may sit above the origin
    pub gap_max_rise: f32,

    // === WALL ATTACH COSTS ===
    /// Stamina charged per world unit of planar distance to the wall
    pub attach_tax_per_unit: f32,

    /// Flat stamina cost of the attach burst itself
    pub attach_burst_cost: f32,

    /// Safety margin kept on top of tax + burst
    pub attach_headroom: f32,

    // === CLIMB HANG LIMITS ===
    /// Maximum wall-hang time with a full stamina bar (seconds)
    pub max_wall_hang: f32,

    /// Wall-hang cap when stamina is empty (seconds); the effective cap is
    /// interpolated between this and `max_wall_hang` by stamina fraction
    pub min_wall_hang: f32,

    // === ACTION COOLDOWNS ===
    /// Refractory period after a hop (seconds)
    pub hop_cooldown: f32,

    /// Refractory period after a gap jump (seconds)
    pub gap_jump_cooldown: f32,

    /// Base refractory period after a wall attach attempt (seconds);
    /// doubles on consecutive failures up to `wall_attach_backoff_max`
    pub wall_attach_cooldown: f32,

    /// Ceiling for the wall-attach failure backoff (seconds)
    pub wall_attach_backoff_max: f32,

    // === STEERING / CONTROL LOOP ===
    /// Reaching a graph node within this distance advances to the next node
    pub node_reach: f32,

    /// Seconds between repath requests to the mesh steering oracle
    pub path_refresh: f32,

    /// Movement below this per tick accumulates stuck time
    pub stuck_move_epsilon: f32,

    /// Stuck time that triggers a climb nudge (seconds)
    pub stuck_trigger_time: f32,

    /// Constant utility of the Follow action; the guaranteed default every
    /// other action has to beat
    pub follow_baseline: f32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            // Stamina (rest > sprint > climb so rest wins as the bar drains)
            rest_frac: 0.30,
            rest_hysteresis: 0.10,
            sprint_frac: 0.25,
            climb_frac: 0.20,
            attach_abs: 0.40,
            exhaustion_lockout: 0.3,

            // Sprint hysteresis
            sprint_enter_dist: 18.0,
            sprint_exit_factor: 0.7,
            sprint_toggle_cooldown: 0.25,

            // Graph build
            node_spacing: 15.0,
            build_batch: 50,
            connect_factor: 1.5,
            los_offset: 0.1,

            // Detour
            detour_factor: 1.4,
            max_expansions: 200,
            detour_recalc_period: 0.35,
            detour_move_epsilon: 0.5,

            // Step probe
            step_probe_dist: 0.9,
            step_lateral: 0.30,
            step_min_hop: 0.12,
            step_max_hop: 0.60,

            // Wall probe
            wall_probe_range: 1.3,
            wall_reach: 0.8,
            wall_overhang_tolerance_deg: 80.0,
            wall_underhang_tolerance_deg: 40.0,

            // Gap probe
            ledge_radius: 1.0,
            ledge_height: 1.5,
            ledge_max_dist: 4.0,
            gap_min_dist: 0.8,
            gap_max_rise: 0.4,

            // Wall attach costs
            attach_tax_per_unit: 0.15,
            attach_burst_cost: 0.20,
            attach_headroom: 0.10,

            // Hang limits
            max_wall_hang: 3.0,
            min_wall_hang: 1.5,

            // Cooldowns
            hop_cooldown: 0.25,
            gap_jump_cooldown: 0.5,
            wall_attach_cooldown: 1.0,
            wall_attach_backoff_max: 4.0,

            // Steering / control
            node_reach: 1.0,
            path_refresh: 0.5,
            stuck_move_epsilon: 0.2,
            stuck_trigger_time: 1.5,
            follow_baseline: 0.05,
        }
    }
}

impl PursuitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sprint exit distance derived from the enter distance
    pub fn sprint_exit_dist(&self) -> f32 {
        self.sprint_enter_dist * self.sprint_exit_factor
    }

    /// Radius searched for candidate neighbors during graph build
    pub fn connection_search_radius(&self) -> f32 {
        self.node_spacing * 4.0
    }

    /// Parse a config from TOML. Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: Self =
            toml::from_str(content).map_err(|e| PursuitError::Config(e.to_string()))?;
        cfg.validate().map_err(PursuitError::Config)?;
        Ok(cfg)
    }

    /// Load a config file. A missing file is not an error: the defaults are
    /// returned and a warning is logged once.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.rest_frac) {
            return Err(format!("rest_frac ({}) must be in 0..1", self.rest_frac));
        }
        if self.rest_hysteresis <= 0.0 {
            return Err("rest_hysteresis must be positive or resting will chatter".into());
        }
        if self.step_min_hop >= self.step_max_hop {
            return Err(format!(
                "step_min_hop ({}) should be < step_max_hop ({})",
                self.step_min_hop, self.step_max_hop
            ));
        }
        if self.detour_factor < 1.0 {
            return Err(format!(
                "detour_factor ({}) below 1 would favor detours over the direct route",
                self.detour_factor
            ));
        }
        if self.connect_factor < 1.0 {
            return Err(format!(
                "connect_factor ({}) below 1 would disconnect even the nearest neighbor",
                self.connect_factor
            ));
        }
        if self.sprint_exit_factor >= 1.0 {
            return Err(format!(
                "sprint_exit_factor ({}) must be < 1 for hysteresis",
                self.sprint_exit_factor
            ));
        }
        if self.min_wall_hang > self.max_wall_hang {
            return Err(format!(
                "min_wall_hang ({}) should be <= max_wall_hang ({})",
                self.min_wall_hang, self.max_wall_hang
            ));
        }
        if self.wall_reach > self.wall_probe_range {
            return Err(format!(
                "wall_reach ({}) should be <= wall_probe_range ({})",
                self.wall_reach, self.wall_probe_range
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PursuitConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let cfg = PursuitConfig::from_toml_str("detour_factor = 2.0\n").unwrap();
        assert_eq!(cfg.detour_factor, 2.0);
        // untouched keys keep their documented defaults
        assert_eq!(cfg.rest_frac, 0.30);
        assert_eq!(cfg.max_expansions, 200);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let cfg = PursuitConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.sprint_enter_dist, PursuitConfig::default().sprint_enter_dist);
    }

    #[test]
    fn test_invalid_band_rejected() {
        let err = PursuitConfig::from_toml_str("step_min_hop = 0.9\nstep_max_hop = 0.5\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = PursuitConfig::load(Path::new("/nonexistent/pursuit.toml")).unwrap();
        assert_eq!(cfg.node_spacing, 15.0);
    }

    #[test]
    fn test_sprint_exit_below_enter() {
        let cfg = PursuitConfig::default();
        assert!(cfg.sprint_exit_dist() < cfg.sprint_enter_dist);
    }
}
