pub mod cooldowns;
pub mod decision;
pub mod evaluator;
pub mod scoring;
pub mod stamina;

pub use evaluator::Brain;
pub use cooldowns::Cooldowns;
pub use decision::{Action, Decision};
pub use stamina::{LocomotionState, Motion, StaminaMachine};
