pub mod follower;
pub mod steering;

pub use follower::Follower;
pub use steering::GraphSteering;
