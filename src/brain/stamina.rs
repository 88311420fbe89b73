//! Locomotion state machine with stamina hysteresis
//!
//! Resting and sprinting transitions are driven directly by the stamina
//! fraction, independent of per-tick decision scores. The asymmetric
//! enter/exit thresholds and the sprint toggle debounce keep the machine
//! from chattering when the bar hovers at a boundary.

use crate::brain::decision::Action;
use crate::core::config::PursuitConfig;
use crate::core::types::Seconds;
use crate::perception::blackboard::Blackboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Idle,
    Sprinting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocomotionState {
    /// Stand still and regenerate; no sprinting, no maneuvers
    Resting,
    Active(Motion),
}

pub struct StaminaMachine {
    state: LocomotionState,
    next_sprint_toggle: Seconds,
}

impl Default for StaminaMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StaminaMachine {
    pub fn new() -> Self {
        Self {
            state: LocomotionState::Active(Motion::Idle),
            next_sprint_toggle: 0.0,
        }
    }

    pub fn state(&self) -> LocomotionState {
        self.state
    }

    pub fn is_resting(&self) -> bool {
        self.state == LocomotionState::Resting
    }

    pub fn wants_sprint(&self) -> bool {
        self.state == LocomotionState::Active(Motion::Sprinting)
    }

    /// Advance the machine one tick. The decision only steers the sprint
    /// bit; rest entry and exit are hard thresholds on the stamina bar.
    pub fn update(&mut self, now: Seconds, bb: &Blackboard, action: Action, cfg: &PursuitConfig) {
        match self.state {
            LocomotionState::Resting => {
                if bb.stamina_frac >= cfg.rest_frac + cfg.rest_hysteresis {
                    tracing::debug!(frac = bb.stamina_frac, "rest over, resuming pursuit");
                    self.state = LocomotionState::Active(Motion::Idle);
                }
            }
            LocomotionState::Active(motion) => {
                // Entered purely on the fraction, climbing included; the
                // control loop decides whether a held grip is released or
                // merely quieted.
                if bb.stamina_frac <= cfg.rest_frac {
                    tracing::debug!(frac = bb.stamina_frac, "stamina low, resting");
                    self.state = LocomotionState::Resting;
                    return;
                }

                let want_sprint = action == Action::Sprint && bb.stamina_frac >= cfg.sprint_frac;
                let is_sprinting = motion == Motion::Sprinting;
                if want_sprint != is_sprinting && now >= self.next_sprint_toggle {
                    self.next_sprint_toggle = now + cfg.sprint_toggle_cooldown;
                    self.state = LocomotionState::Active(if want_sprint {
                        Motion::Sprinting
                    } else {
                        Motion::Idle
                    });
                }
            }
        }
    }
}

/// Maximum climb-hang time for the current stamina fraction, interpolated
/// between the empty-bar and full-bar caps.
pub fn hang_cap(stamina_frac: f32, cfg: &PursuitConfig) -> Seconds {
    let t = stamina_frac.clamp(0.0, 1.0);
    cfg.min_wall_hang + (cfg.max_wall_hang - cfg.min_wall_hang) * t
}

/// Whether an ongoing climb must be released: either the bar fell below the
/// climbing floor, or the hang has exceeded its stamina-scaled cap.
pub fn climb_interrupt(stamina_frac: f32, since_climb: Seconds, cfg: &PursuitConfig) -> bool {
    stamina_frac < cfg.climb_frac || since_climb > hang_cap(stamina_frac, cfg)
}
