//! Blob Arena - simulation core for a 2D blob arena game
//!
//! Core modules:
//! - `sim`: Simulation (integration, wall bounces, pairwise blob interactions)
//! - `renderer`: Drawing surface abstraction and world/screen mapping
//! - `platform`: Input events dispatched by the host
//! - `settings`: Data-driven world configuration

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{Blob, BlobId, Rect, SimError, World, WorldEvent};

/// Game configuration constants
pub mod consts {
    /// Milliseconds per simulated second (step input is in ms)
    pub const MS_PER_SECOND: f32 = 1000.0;
    /// Sweeps allowed per step before collision resolution is abandoned
    pub const MAX_RESOLVE_SWEEPS: u32 = 64;

    /// Overlap below this distance does not count as contact
    pub const CONTACT_EPSILON: f32 = 1e-3;
    /// Blobs shrunk to this radius or less are absorbed outright
    pub const MIN_BLOB_RADIUS: f32 = 0.5;

    /// Player blob radius relative to the generation radius
    pub const PLAYER_RADIUS_FACTOR: f32 = 0.5;
    /// Smallest generated blob relative to the generation radius
    pub const MIN_SPAWN_RADIUS_FACTOR: f32 = 0.1;

    /// Fraction of a blob's area ejected by a squirt
    pub const SQUIRT_AREA_FRACTION: f32 = 0.04;
    /// Ejection speed of a squirt relative to its parent (units/s)
    pub const SQUIRT_SPEED: f32 = 120.0;
    /// Gap left between parent and squirt at spawn
    pub const SQUIRT_GAP: f32 = 0.5;
}
