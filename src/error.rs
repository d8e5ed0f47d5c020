use thiserror::Error;

/// Conditions reported to callers of the simulation.
///
/// Everything else (out-of-bounds insertion, coincident bodies, double merges)
/// is recovered locally and never surfaces as an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl SimulationError {
    pub fn invalid_body(reason: impl Into<String>) -> Self {
        Self::InvalidBody {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
