pub mod config;
pub mod error;
pub mod types;

pub use config::PursuitConfig;
pub use error::{PursuitError, Result};
