use thiserror::Error;

/// Rejected arena configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tick rate must be positive and finite, got {0}")]
    TickRate(f64),
    #[error("max_targets must be at least 1")]
    ZeroTargetCap,
    #[error("{field} must be non-negative and finite, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("spawn radius range [{min}, {max}] is invalid")]
    SpawnRadius { min: f32, max: f32 },
    #[error("malformed config: {0}")]
    Parse(String),
}

/// Failure of an arena operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArenaError {
    #[error("launch direction {0:?} cannot be normalized")]
    InvalidDirection([f32; 3]),
    #[error("launch origin {0:?} is not finite")]
    InvalidOrigin([f32; 3]),
}
