//! Per-tick perception snapshot consumed by the decision core

use glam::Vec3;

/// Which of the lateral step rays saw the obstacle
///
/// Used to suppress hops at oblique wall corners that only one ray grazed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LateralAgreement {
    /// Neither side ray hit (center-only detection)
    #[default]
    None,
    /// Only the left ray hit
    Left,
    /// Only the right ray hit
    Right,
    /// Both side rays agree
    Both,
}

/// Result of the chest-height step probe
#[derive(Debug, Clone, Copy, Default)]
pub struct StepInfo {
    /// A small obstacle is ahead that a hop would clear
    pub can_hop: bool,
    /// Obstacle height above the feet line
    pub height: f32,
    pub lateral: LateralAgreement,
}

/// Result of the wall probe
#[derive(Debug, Clone, Copy, Default)]
pub struct WallInfo {
    /// Close enough and within the climbable angle band
    pub can_attach: bool,
    /// Surface normal at the probe hit
    pub normal: Vec3,
    /// Planar (XZ) distance from the agent to the surface
    pub planar_dist: f32,
    /// Incidence angle of the surface from up; 0 is flat ground, 90 is
    /// vertical, past 90 is overhung
    pub angle_deg: f32,
}

/// Result of the gap probe
#[derive(Debug, Clone, Copy, Default)]
pub struct GapInfo {
    /// A plausible landing was found across a drop
    pub has_landing: bool,
    pub landing: Vec3,
    /// Horizontal distance to the landing
    pub distance: f32,
}

/// Read-only snapshot of everything the brain needs to decide
///
/// Built fresh by perception every tick, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Blackboard {
    // Core pose
    pub self_pos: Vec3,
    pub target_pos: Vec3,
    pub distance: f32,

    // Posture
    pub grounded: bool,
    pub climbing: bool,

    /// Short-term post-exhaustion lockout on consumptive maneuvers
    pub recently_exhausted: bool,

    // Stamina
    pub stamina: f32,
    pub stamina_frac: f32,

    /// Steering suggestion from the control loop
    pub move_dir: Vec3,

    // Mesh oracle status
    pub has_mesh_path: bool,
    pub mesh_path_complete: bool,
    /// Path length over straight-line distance; INFINITY when unknown
    pub detour_ratio: f32,

    // Opportunities
    pub step: StepInfo,
    pub wall: WallInfo,
    pub gap: GapInfo,
}

impl Default for Blackboard {
    fn default() -> Self {
        Self {
            self_pos: Vec3::ZERO,
            target_pos: Vec3::ZERO,
            distance: 0.0,
            grounded: true,
            climbing: false,
            recently_exhausted: false,
            stamina: 1.0,
            stamina_frac: 1.0,
            move_dir: Vec3::Z,
            has_mesh_path: false,
            mesh_path_complete: false,
            detour_ratio: f32::INFINITY,
            step: StepInfo::default(),
            wall: WallInfo::default(),
            gap: GapInfo::default(),
        }
    }
}
