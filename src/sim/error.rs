//! Simulation error types

use thiserror::Error;

use super::world::BlobId;

/// Errors surfaced by world construction, generation and stepping
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Rectangle with non-positive or non-finite dimensions
    #[error("invalid rectangle {width}x{height}: dimensions must be finite and positive")]
    InvalidRect { width: f32, height: f32 },
    /// Construction or generation option outside its valid range
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
    /// Step called with a NaN or infinite delta
    #[error("non-finite timestep {0}")]
    InvalidTimestep(f32),
    /// A blob's position or velocity stopped being finite
    #[error("blob {0:?} has a non-finite position or velocity")]
    NonFinite(BlobId),
    /// Collision resolution did not reach a fixed point
    #[error("collision resolution did not settle after {sweeps} sweeps")]
    CollisionsUnresolved { sweeps: u32 },
}

impl SimError {
    pub(crate) fn option(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}
