//! Drawing surface abstraction
//!
//! The simulation never touches pixels. It issues clears, transform pushes and
//! circle fills against a `Surface`; the host decides how those reach a screen.

use glam::Vec2;

/// RGBA color, components in 0-1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Pixel rectangle on a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A fixed-size 2D drawing surface with a save/restore transform stack
pub trait Surface {
    /// Width in pixels
    fn width(&self) -> f32;
    /// Height in pixels
    fn height(&self) -> f32;

    /// Fill a pixel rectangle (ignores the current transform)
    fn clear(&mut self, color: Color, rect: PixelRect);

    /// Push the current transform
    fn save(&mut self);
    /// Pop back to the last saved transform
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    /// Uniform scale
    fn scale(&mut self, factor: f32);

    /// Fill a circle in the current transform's local space
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Rectangle covering the whole surface
    fn bounds(&self) -> PixelRect {
        PixelRect {
            x: 0.0,
            y: 0.0,
            width: self.width(),
            height: self.height(),
        }
    }
}

/// Run `draw` inside a translated and scaled scope.
///
/// The transform is always restored afterwards, so nothing drawn inside can
/// leak its transform into the next draw call.
pub fn with_transform<S, F>(surface: &mut S, offset: Vec2, scale: f32, draw: F)
where
    S: Surface + ?Sized,
    F: FnOnce(&mut S),
{
    surface.save();
    surface.translate(offset);
    surface.scale(scale);
    draw(surface);
    surface.restore();
}

/// Affine transform tracked by `CommandSurface`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    offset: Vec2,
    scale: f32,
}

impl Transform {
    const IDENTITY: Transform = Transform {
        offset: Vec2::ZERO,
        scale: 1.0,
    };

    fn apply(&self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }
}

/// A resolved draw call, in surface pixel space
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { color: Color, rect: PixelRect },
    Circle { center: Vec2, radius: f32, color: Color },
}

/// Surface that records draw calls instead of rasterizing them.
///
/// Used headless (native runner, tests). Transforms are resolved at record
/// time so each command is in absolute pixel coordinates.
#[derive(Debug, Clone)]
pub struct CommandSurface {
    width: f32,
    height: f32,
    current: Transform,
    stack: Vec<Transform>,
    commands: Vec<DrawCommand>,
}

impl CommandSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            current: Transform::IDENTITY,
            stack: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the list empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of unmatched `save` calls
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Surface for CommandSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self, color: Color, rect: PixelRect) {
        self.commands.push(DrawCommand::Clear { color, rect });
    }

    fn save(&mut self) {
        self.stack.push(self.current);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(t) => self.current = t,
            None => log::warn!("restore() without matching save()"),
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.current.offset += offset * self.current.scale;
    }

    fn scale(&mut self, factor: f32) {
        self.current.scale *= factor;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center: self.current.apply(center),
            radius: radius * self.current.scale,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_applies_and_restores() {
        let mut surface = CommandSurface::new(200.0, 100.0);
        with_transform(&mut surface, Vec2::new(50.0, 20.0), 2.0, |s| {
            s.fill_circle(Vec2::new(1.0, 0.0), 3.0, Color::BLACK);
        });
        surface.fill_circle(Vec2::ZERO, 1.0, Color::BLACK);

        assert_eq!(surface.depth(), 0);
        let cmds = surface.commands();
        assert_eq!(
            cmds[0],
            DrawCommand::Circle {
                center: Vec2::new(52.0, 20.0),
                radius: 6.0,
                color: Color::BLACK
            }
        );
        // Second draw is back in identity space
        assert_eq!(
            cmds[1],
            DrawCommand::Circle {
                center: Vec2::ZERO,
                radius: 1.0,
                color: Color::BLACK
            }
        );
    }

    #[test]
    fn test_unbalanced_restore_is_harmless() {
        let mut surface = CommandSurface::new(10.0, 10.0);
        surface.restore();
        surface.fill_circle(Vec2::new(2.0, 2.0), 1.0, Color::BLACK);
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.commands().len(), 1);
    }

    #[test]
    fn test_bounds_cover_surface() {
        let surface = CommandSurface::new(320.0, 240.0);
        let b = surface.bounds();
        assert_eq!((b.x, b.y, b.width, b.height), (0.0, 0.0, 320.0, 240.0));
    }
}
