pub mod blackboard;
pub mod probes;
pub mod sensors;

pub use blackboard::{Blackboard, GapInfo, LateralAgreement, StepInfo, WallInfo};
pub use sensors::Perception;
