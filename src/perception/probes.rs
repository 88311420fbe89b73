//! Environment probes
//!
//! Each probe is a small pure function of the agent's pose, its movement
//! direction, and the terrain query capability. A missed ray is a default
//! result, never an error.

use glam::{Vec2, Vec3};

use crate::core::config::PursuitConfig;
use crate::core::types::BodyDims;
use crate::perception::blackboard::{GapInfo, LateralAgreement, StepInfo, WallInfo};
use crate::world::TerrainQuery;

/// Flatten a direction onto the XZ plane, normalized; `None` when the
/// flattened direction degenerates.
fn flat_dir(dir: Vec3) -> Option<Vec3> {
    let d = Vec3::new(dir.x, 0.0, dir.z);
    (d.length_squared() > 1e-6).then(|| d.normalize())
}

fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Three forward rays at chest height (center, left, right) looking for a
/// hoppable obstacle. Records the maximum contact height above the feet
/// line and whether the side rays agree.
pub fn probe_step<W: TerrainQuery>(
    world: &W,
    body: &BodyDims,
    origin: Vec3,
    move_dir: Vec3,
    cfg: &PursuitConfig,
) -> StepInfo {
    let Some(dir) = flat_dir(move_dir) else {
        return StepInfo::default();
    };

    let chest = Vec3::new(origin.x, body.chest_y, origin.z);
    let side = Vec3::Y.cross(dir);

    // Dip the rays slightly to catch sloped lips.
    let cast = |start: Vec3| -> Option<f32> {
        world
            .raycast(start - Vec3::Y * 0.05, dir, cfg.step_probe_dist)
            .map(|hit| (hit.point.y - body.feet_y).max(0.0))
    };

    let center = cast(chest);
    let left = cast(chest - side * cfg.step_lateral);
    let right = cast(chest + side * cfg.step_lateral);

    let height = [center, left, right]
        .into_iter()
        .flatten()
        .fold(0.0_f32, f32::max);

    let lateral = match (left.is_some(), right.is_some()) {
        (true, true) => LateralAgreement::Both,
        (true, false) => LateralAgreement::Left,
        (false, true) => LateralAgreement::Right,
        (false, false) => LateralAgreement::None,
    };

    let any_hit = center.is_some() || left.is_some() || right.is_some();
    let can_hop = any_hit && height >= cfg.step_min_hop && height <= cfg.step_max_hop;

    StepInfo {
        can_hop,
        height,
        lateral,
    }
}

/// Whether a surface angle (degrees from up) is grabbable. The band around
/// vertical is asymmetric: overhangs are easier to hold than shallow
/// underhangs, so the overhang side gets the wider tolerance.
pub fn acceptable_grab_angle(angle_deg: f32, cfg: &PursuitConfig) -> bool {
    let from_vertical = angle_deg - 90.0;
    if from_vertical > 0.0 {
        from_vertical <= cfg.wall_overhang_tolerance_deg
    } else {
        -from_vertical <= cfg.wall_underhang_tolerance_deg
    }
}

/// Head-height ray, then chest-height, along the movement direction. A hit
/// is attachable when its incidence angle sits in the grab band and the
/// planar distance is within reach.
pub fn probe_wall<W: TerrainQuery>(
    world: &W,
    body: &BodyDims,
    origin: Vec3,
    move_dir: Vec3,
    cfg: &PursuitConfig,
) -> WallInfo {
    let Some(dir) = flat_dir(move_dir) else {
        return WallInfo::default();
    };

    let head = Vec3::new(origin.x, body.head_y, origin.z);
    let chest = Vec3::new(origin.x, body.chest_y, origin.z);

    let hit = world
        .raycast(head, dir, cfg.wall_probe_range)
        .or_else(|| world.raycast(chest, dir, cfg.wall_probe_range));

    let Some(hit) = hit else {
        return WallInfo::default();
    };

    let angle_deg = hit.normal.angle_between(Vec3::Y).to_degrees();
    let planar = planar_distance(hit.point, origin);
    let can_attach = acceptable_grab_angle(angle_deg, cfg) && planar <= cfg.wall_reach;

    WallInfo {
        can_attach,
        normal: hit.normal,
        planar_dist: planar,
        angle_deg,
    }
}

/// Walk outward in discrete steps along the movement direction, casting
/// down at each step. A landing counts when it is not much higher than the
/// origin and far enough away that it cannot be the current plateau.
pub fn probe_gap<W: TerrainQuery>(
    world: &W,
    origin: Vec3,
    move_dir: Vec3,
    cfg: &PursuitConfig,
) -> GapInfo {
    let Some(dir) = flat_dir(move_dir) else {
        return GapInfo::default();
    };

    let step = (cfg.ledge_radius * 0.8).max(0.3);
    let steps = (cfg.ledge_max_dist / step).ceil() as usize;
    let drop_range = cfg.ledge_height + 1.5;

    for i in 1..=steps {
        let sample = origin + dir * (i as f32 * step) + Vec3::Y * 0.4;
        if let Some(ground) = world.raycast(sample, Vec3::NEG_Y, drop_range) {
            let rise = ground.point.y - origin.y;
            if rise <= cfg.gap_max_rise {
                let horiz = planar_distance(ground.point, origin);
                if horiz >= cfg.gap_min_dist {
                    return GapInfo {
                        has_landing: true,
                        landing: ground.point,
                        distance: horiz,
                    };
                }
            }
        }
    }

    GapInfo::default()
}
