//! Per-action cooldown ledger
//!
//! Maps each stateful maneuver to the next time it may fire. The brain
//! zeroes the score of any action still inside its window, so a maneuver
//! cannot re-trigger before its physical effect has resolved.
//!
//! Wall attaches additionally carry a failure backoff: each consecutive
//! failed attach doubles the delay (up to a ceiling) and a successful latch
//! resets it.

use ahash::AHashMap;

use crate::brain::decision::Action;
use crate::core::config::PursuitConfig;
use crate::core::types::Seconds;

#[derive(Debug, Clone)]
pub struct Cooldowns {
    next_ok: AHashMap<Action, Seconds>,
    attach_delay: Seconds,
}

impl Cooldowns {
    pub fn new(cfg: &PursuitConfig) -> Self {
        Self {
            next_ok: AHashMap::new(),
            attach_delay: cfg.wall_attach_cooldown,
        }
    }

    /// Whether the action is outside its refractory window.
    pub fn ready(&self, action: Action, now: Seconds) -> bool {
        self.next_ok.get(&action).is_none_or(|&t| now >= t)
    }

    /// Record that the action fired and start its window. Actions without
    /// a cooldown are a no-op.
    pub fn fired(&mut self, action: Action, now: Seconds, cfg: &PursuitConfig) {
        let window = match action {
            Action::Hop => cfg.hop_cooldown,
            Action::GapJump => cfg.gap_jump_cooldown,
            Action::WallAttach => {
                let window = self.attach_delay;
                // Assume failure until the control loop reports a latch.
                self.attach_delay = (self.attach_delay * 2.0).min(cfg.wall_attach_backoff_max);
                window
            }
            _ => return,
        };
        self.next_ok.insert(action, now + window);
    }

    /// A wall attach latched: drop the backoff to the base window.
    pub fn attach_succeeded(&mut self, cfg: &PursuitConfig) {
        self.attach_delay = cfg.wall_attach_cooldown;
    }

    /// Current attach delay; exposed for diagnostics and tests.
    pub fn attach_delay(&self) -> Seconds {
        self.attach_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_ready_initially() {
        let cfg = PursuitConfig::default();
        let cd = Cooldowns::new(&cfg);
        for action in Action::ALL {
            assert!(cd.ready(action, 0.0));
        }
    }

    #[test]
    fn test_fired_blocks_until_elapsed() {
        let cfg = PursuitConfig::default();
        let mut cd = Cooldowns::new(&cfg);
        cd.fired(Action::GapJump, 1.0, &cfg);

        assert!(!cd.ready(Action::GapJump, 1.0));
        assert!(!cd.ready(Action::GapJump, 1.4));
        assert!(cd.ready(Action::GapJump, 1.0 + cfg.gap_jump_cooldown));
        // Other maneuvers unaffected.
        assert!(cd.ready(Action::Hop, 1.0));
    }

    #[test]
    fn test_follow_never_gated() {
        let cfg = PursuitConfig::default();
        let mut cd = Cooldowns::new(&cfg);
        cd.fired(Action::Follow, 0.0, &cfg);
        assert!(cd.ready(Action::Follow, 0.0));
    }

    #[test]
    fn test_attach_backoff_doubles_and_caps() {
        let cfg = PursuitConfig::default();
        let mut cd = Cooldowns::new(&cfg);
        assert_eq!(cd.attach_delay(), 1.0);

        cd.fired(Action::WallAttach, 0.0, &cfg);
        assert!(!cd.ready(Action::WallAttach, 0.5));
        assert!(cd.ready(Action::WallAttach, 1.0));
        assert_eq!(cd.attach_delay(), 2.0);

        cd.fired(Action::WallAttach, 10.0, &cfg);
        assert_eq!(cd.attach_delay(), 4.0);
        cd.fired(Action::WallAttach, 20.0, &cfg);
        // Clamped at the ceiling.
        assert_eq!(cd.attach_delay(), cfg.wall_attach_backoff_max);
    }

    #[test]
    fn test_attach_success_resets_backoff() {
        let cfg = PursuitConfig::default();
        let mut cd = Cooldowns::new(&cfg);
        cd.fired(Action::WallAttach, 0.0, &cfg);
        cd.fired(Action::WallAttach, 10.0, &cfg);
        assert!(cd.attach_delay() > cfg.wall_attach_cooldown);

        cd.attach_succeeded(&cfg);
        assert_eq!(cd.attach_delay(), cfg.wall_attach_cooldown);
    }
}
