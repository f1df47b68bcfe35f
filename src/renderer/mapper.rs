//! World <-> screen coordinate mapping
//!
//! A linear map from the logical viewport rectangle onto a fixed-size surface.
//! No clamping: points outside the viewport land outside the surface.

use glam::Vec2;

use crate::sim::{Rect, SimError};

/// Maps between world units and surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMapper {
    pub viewport: Rect,
    /// Surface size in pixels
    pub surface: Vec2,
}

impl ViewMapper {
    pub fn new(viewport: Rect, surface_width: f32, surface_height: f32) -> Result<Self, SimError> {
        viewport.validate()?;
        // Same invariant as a rect, so reuse its check
        Rect::new(Vec2::ZERO, surface_width, surface_height)?;
        Ok(Self {
            viewport,
            surface: Vec2::new(surface_width, surface_height),
        })
    }

    pub fn world_to_screen(&self, v: Vec2) -> Vec2 {
        (v - self.viewport.corner) / self.viewport.size() * self.surface
    }

    pub fn screen_to_world(&self, v: Vec2) -> Vec2 {
        v / self.surface * self.viewport.size() + self.viewport.corner
    }

    /// Scale a world length to pixels.
    ///
    /// Only the width axis is used, so a viewport whose aspect ratio differs
    /// from the surface's scales lengths differently than y coordinates.
    pub fn scalar_to_screen(&self, s: f32) -> f32 {
        s / self.viewport.width * self.surface.x
    }
}
