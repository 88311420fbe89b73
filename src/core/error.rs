use thiserror::Error;

/// Hard failures only. Steady-state conditions (unreachable detours, probe
/// misses, failed graph builds) are modeled as data, not errors.
#[derive(Error, Debug)]
pub enum PursuitError {
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PursuitError>;
