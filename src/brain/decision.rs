//! Action set and decision output

/// One action per tick. Declaration order is the tie-break order: when two
/// actions score equally, the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Rest,
    Sprint,
    Hop,
    WallAttach,
    GapJump,
    Follow,
}

impl Action {
    /// Evaluation order; Follow last so it only wins as the default.
    pub const ALL: [Action; 6] = [
        Action::Rest,
        Action::Sprint,
        Action::Hop,
        Action::WallAttach,
        Action::GapJump,
        Action::Follow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Rest => "rest",
            Action::Sprint => "sprint",
            Action::Hop => "hop",
            Action::WallAttach => "wall_attach",
            Action::GapJump => "gap_jump",
            Action::Follow => "follow",
        }
    }

    /// Stateful maneuvers carry a per-action cooldown; steady locomotion
    /// choices do not.
    pub fn has_cooldown(self) -> bool {
        matches!(self, Action::Hop | Action::WallAttach | Action::GapJump)
    }
}

/// Outcome of one brain evaluation
#[derive(Debug, Clone)]
pub struct Decision {
    pub action: Action,
    /// Human-readable rationale; diagnostic only, never parsed.
    pub why: String,
    /// Full score map in declaration order, kept for tests and debugging.
    pub scores: Vec<(Action, f32)>,
}

impl Decision {
    pub fn score_of(&self, action: Action) -> f32 {
        self.scores
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, s)| *s)
            .unwrap_or(0.0)
    }
}
