//! Default blob: area-conserving absorption and squirting
//!
//! When two blobs of different size overlap, the larger one pulls area out of
//! the smaller one until the two circles just touch. Total area and momentum
//! are conserved. If the smaller blob would be left with almost nothing, it is
//! absorbed completely.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{BlobSpawn, Body, Emitter, Party};
use crate::consts::*;
use crate::renderer::{Color, Surface};

/// Color of player-controlled blobs
pub const PLAYER_COLOR: Color = Color::rgb(0.35, 0.85, 1.0);
/// Blobs larger than the reference blob (dangerous)
pub const THREAT_COLOR: Color = Color::rgb(0.95, 0.3, 0.25);
/// Blobs smaller than the reference blob (edible)
pub const PREY_COLOR: Color = Color::rgb(0.3, 0.45, 0.95);
/// Used when there is no reference blob to compare against
pub const NEUTRAL_COLOR: Color = Color::rgb(0.7, 0.7, 0.7);

/// A circular blob moving at constant velocity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub position: Vec2,
    pub radius: f32,
    /// Velocity (units/sec)
    pub speed: Vec2,
    pub is_player: bool,
}

impl Blob {
    pub fn new(position: Vec2, radius: f32, speed: Vec2, is_player: bool) -> Self {
        Self {
            position,
            radius,
            speed,
            is_player,
        }
    }

    /// Area without the constant π factor (mass proxy)
    #[inline]
    fn mass(&self) -> f32 {
        self.radius * self.radius
    }

    /// Display color relative to the reference blob
    pub fn color_against(&self, reference: Option<&Blob>) -> Color {
        if self.is_player {
            return PLAYER_COLOR;
        }
        match reference {
            Some(r) if self.radius > r.radius => THREAT_COLOR,
            Some(_) => PREY_COLOR,
            None => NEUTRAL_COLOR,
        }
    }
}

impl Body for Blob {
    fn spawn(spawn: BlobSpawn) -> Self {
        Blob::new(spawn.position, spawn.radius, spawn.speed, spawn.is_player)
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn speed(&self) -> Vec2 {
        self.speed
    }

    fn set_speed(&mut self, speed: Vec2) {
        self.speed = speed;
    }

    fn is_player(&self) -> bool {
        self.is_player
    }

    fn intersect(&mut self, other: &mut Self, emit: &mut Emitter<Self>) -> bool {
        let d = self.position.distance(other.position);
        if d + CONTACT_EPSILON >= self.radius + other.radius {
            return false;
        }
        // Equal blobs cannot eat each other
        if self.radius == other.radius {
            return false;
        }

        let eaten = if self.radius > other.radius {
            Party::Other
        } else {
            Party::This
        };
        let (big, small) = match eaten {
            Party::Other => (self, other),
            Party::This => (other, self),
        };

        let total = big.mass() + small.mass();
        // Radii that just touch at distance d with the same total area
        let big_r = (d + (2.0 * total - d * d).max(0.0).sqrt()) * 0.5;
        let small_r = d - big_r;

        if small_r <= MIN_BLOB_RADIUS {
            big.speed = (big.speed * big.mass() + small.speed * small.mass()) / total;
            big.radius = total.sqrt();
            small.radius = 0.0;
            small.speed = Vec2::ZERO;
            emit.absorbed(eaten);
        } else {
            let transferred = small.mass() - small_r * small_r;
            let big_mass = big_r * big_r;
            big.speed = (big.speed * big.mass() + small.speed * transferred) / big_mass;
            big.radius = big_r;
            small.radius = small_r;
            emit.slurped(eaten);
        }
        true
    }

    fn squirt(&mut self, target: Vec2, emit: &mut Emitter<Self>) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }

        let child_r = self.radius * SQUIRT_AREA_FRACTION.sqrt();
        if child_r <= MIN_BLOB_RADIUS {
            log::trace!("squirt refused: blob of radius {} too small", self.radius);
            return;
        }
        let parent_r = self.radius * (1.0 - SQUIRT_AREA_FRACTION).sqrt();

        let child_speed = self.speed + dir * SQUIRT_SPEED;
        // Recoil: the parent keeps the momentum the child didn't take
        let parent_speed =
            (self.speed * self.mass() - child_speed * child_r * child_r) / (parent_r * parent_r);
        let child_pos = self.position + dir * (parent_r + child_r + SQUIRT_GAP);

        self.radius = parent_r;
        self.speed = parent_speed;
        emit.squirt(Blob::new(child_pos, child_r, child_speed, false));
    }

    fn render(&self, surface: &mut dyn Surface, reference: Option<&Self>) {
        surface.fill_circle(Vec2::ZERO, self.radius, self.color_against(reference));
    }
}
