//! Rendering support
//!
//! Surface abstraction the world draws into, plus the viewport mapping.

pub mod mapper;
pub mod surface;

pub use mapper::ViewMapper;
pub use surface::{Color, CommandSurface, DrawCommand, PixelRect, Surface, with_transform};
