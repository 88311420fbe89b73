//! Utility-based decision core
//!
//! One evaluation per tick: score every action against the Blackboard, zero
//! the ones still inside a cooldown window, and take the highest. Ties go to
//! the earlier action in declaration order, so the ranking is deterministic
//! for a given snapshot.

use crate::brain::cooldowns::Cooldowns;
use crate::brain::decision::{Action, Decision};
use crate::brain::scoring;
use crate::core::config::PursuitConfig;
use crate::core::types::Seconds;
use crate::perception::blackboard::Blackboard;

pub struct Brain {
    cfg: PursuitConfig,
}

impl Brain {
    pub fn new(cfg: PursuitConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &PursuitConfig {
        &self.cfg
    }

    /// Score all actions and pick the winner. A cooled-down action scores
    /// zero regardless of its raw utility.
    pub fn evaluate(
        &self,
        bb: &Blackboard,
        now: Seconds,
        currently_sprinting: bool,
        cooldowns: &Cooldowns,
    ) -> Decision {
        let cfg = &self.cfg;
        let mut scores = Vec::with_capacity(Action::ALL.len());

        for action in Action::ALL {
            let raw = match action {
                Action::Rest => scoring::score_rest(bb, cfg),
                Action::Sprint => scoring::score_sprint(bb, currently_sprinting, cfg),
                Action::Hop => scoring::score_hop(bb, cfg),
                Action::WallAttach => scoring::score_wall_attach(bb, cfg),
                Action::GapJump => scoring::score_gap_jump(bb, cfg),
                Action::Follow => scoring::score_follow(cfg),
            };
            let score = if action.has_cooldown() && !cooldowns.ready(action, now) {
                0.0
            } else {
                raw
            };
            scores.push((action, score));
        }

        // First strictly-greater wins, so earlier declarations break ties.
        let mut best = scores[0];
        for &entry in &scores[1..] {
            if entry.1 > best.1 {
                best = entry;
            }
        }

        Decision {
            action: best.0,
            why: self.explain(best.0, bb),
            scores,
        }
    }

    fn explain(&self, action: Action, bb: &Blackboard) -> String {
        match action {
            Action::Rest => format!("stamina {:.2} below rest ceiling", bb.stamina_frac),
            Action::Sprint => format!("target {:.1} away, bar can fund it", bb.distance),
            Action::Hop => format!("step {:.2} high in hop band", bb.step.height),
            Action::WallAttach => format!(
                "wall at {:.1}, detour x{:.1} around",
                bb.wall.planar_dist, bb.detour_ratio
            ),
            Action::GapJump => format!(
                "landing {:.1} out, detour x{:.1} around",
                bb.gap.distance, bb.detour_ratio
            ),
            Action::Follow => "nothing better to do".to_string(),
        }
    }
}
