//! Simulation module
//!
//! All gameplay logic lives here:
//! - Constant-velocity motion scaled by a time multiplier
//! - Elastic wall reflection against the arena extents
//! - Pairwise blob interactions resolved to a fixed point each step
//! - Seeded RNG only, so generation is reproducible
//! - No rendering or platform dependencies beyond the `Surface` trait

pub mod blob;
pub mod body;
pub mod error;
pub mod geometry;
pub mod tick;
pub mod world;

pub use blob::Blob;
pub use body::{BlobEvent, BlobSpawn, Body, Emitter, Party};
pub use error::SimError;
pub use geometry::{Rect, Vector2d};
pub use tick::StepReport;
pub use world::{BlobId, GenerateOptions, Listener, World, WorldEvent, WorldOptions};
