//! Per-action utility functions
//!
//! Every scorer maps a Blackboard to [0, 1]. Gates return 0 outright; past
//! the gates the score expresses how attractive the maneuver is right now.
//! Follow is a constant low baseline, so any maneuver that clears its gates
//! with conviction wins, and nothing ever leaves the brain empty-handed.

use crate::core::config::PursuitConfig;
use crate::perception::blackboard::{Blackboard, LateralAgreement};

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// How far the detour ratio clears the worth-it threshold, normalized.
fn detour_favor(ratio: f32, cfg: &PursuitConfig) -> Option<f32> {
    (ratio.is_finite() && ratio > cfg.detour_factor)
        .then(|| ((ratio - cfg.detour_factor) / cfg.detour_factor).clamp(0.0, 1.0))
}

/// Rises smoothly as stamina falls below the rest ceiling (threshold plus
/// hysteresis). Halved while airborne: resting mid-air achieves nothing.
pub fn score_rest(bb: &Blackboard, cfg: &PursuitConfig) -> f32 {
    let ceiling = cfg.rest_frac + cfg.rest_hysteresis;
    if bb.stamina_frac >= ceiling {
        return 0.0;
    }
    let mut s = smoothstep((ceiling - bb.stamina_frac) / ceiling);
    if !bb.grounded {
        s *= 0.5;
    }
    s
}

/// Binary-ish gate with inertia: entering needs the full enter distance,
/// but an ongoing sprint keeps partial credit down to the exit distance so
/// the decision does not chatter at the boundary.
pub fn score_sprint(bb: &Blackboard, currently_sprinting: bool, cfg: &PursuitConfig) -> f32 {
    let fundable = !bb.climbing && bb.stamina_frac >= cfg.sprint_frac;
    if !fundable {
        return 0.0;
    }
    if bb.distance >= cfg.sprint_enter_dist {
        0.7
    } else if currently_sprinting && bb.distance >= cfg.sprint_exit_dist() {
        0.55
    } else {
        0.0
    }
}

/// Hop over a small obstacle. Scales with how central the obstacle height
/// sits in the hoppable band, damped without lateral consensus so a wall
/// corner grazed by one ray does not trigger a jump into it.
pub fn score_hop(bb: &Blackboard, cfg: &PursuitConfig) -> f32 {
    let gated = bb.grounded
        && !bb.climbing
        && !bb.recently_exhausted
        && bb.stamina_frac >= cfg.climb_frac
        && bb.step.can_hop;
    if !gated {
        return 0.0;
    }

    let mid = (cfg.step_min_hop + cfg.step_max_hop) * 0.5;
    let half = (cfg.step_max_hop - cfg.step_min_hop) * 0.5;
    let centrality = (1.0 - ((bb.step.height - mid).abs() / half)).clamp(0.0, 1.0);

    let consensus = match bb.step.lateral {
        LateralAgreement::Both => 1.0,
        _ => 0.6,
    };

    0.8 * centrality * consensus
}

/// Commit to a climb only when going around is clearly worse and the
/// stamina budget covers the attach tax, the burst, and a safety margin.
pub fn score_wall_attach(bb: &Blackboard, cfg: &PursuitConfig) -> f32 {
    let gated = bb.grounded
        && !bb.climbing
        && !bb.recently_exhausted
        && bb.wall.can_attach
        && bb.stamina >= cfg.attach_abs;
    if !gated {
        return 0.0;
    }

    let needed = cfg.attach_tax_per_unit * bb.wall.planar_dist
        + cfg.attach_burst_cost
        + cfg.attach_headroom;
    if bb.stamina < needed {
        return 0.0;
    }

    let Some(favor) = detour_favor(bb.detour_ratio, cfg) else {
        return 0.0;
    };

    let mut s = 0.9 * favor.max(0.25);
    if bb.mesh_path_complete {
        // A full mesh route exists; prefer the cheap way around.
        s *= 0.5;
    }
    if bb.stamina_frac < cfg.climb_frac + 0.1 {
        // Only marginally above the climbing floor.
        s *= 0.6;
    }
    s
}

/// Jump a gap when the graph route around it is long enough to justify the
/// commitment. Mid-range landings are preferred over extremes.
pub fn score_gap_jump(bb: &Blackboard, cfg: &PursuitConfig) -> f32 {
    let gated = bb.grounded
        && !bb.climbing
        && !bb.recently_exhausted
        && bb.stamina_frac >= cfg.climb_frac
        && bb.gap.has_landing;
    if !gated {
        return 0.0;
    }

    let Some(favor) = detour_favor(bb.detour_ratio, cfg) else {
        return 0.0;
    };

    let mid = (cfg.gap_min_dist + cfg.ledge_max_dist) * 0.5;
    let half = (cfg.ledge_max_dist - cfg.gap_min_dist) * 0.5;
    let dist_pref = (1.0 - ((bb.gap.distance - mid).abs() / half)).clamp(0.0, 1.0);

    0.8 * (0.5 * favor.max(0.25) + 0.5 * dist_pref)
}

/// The guaranteed default.
pub fn score_follow(cfg: &PursuitConfig) -> f32 {
    cfg.follow_baseline
}
