//! What the world needs from a blob
//!
//! The world integrates motion, bounces blobs off walls and decides when two
//! blobs are tested against each other. What happens on contact (who eats whom,
//! how much) and how a blob squirts belong to the blob type. The blob reports
//! those outcomes as `BlobEvent`s; the world owns the collection and applies
//! the collection changes.

use glam::Vec2;

use crate::renderer::Surface;

/// Side of an `intersect` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// The receiver (`self`)
    This,
    /// The argument (`other`)
    Other,
}

/// Events a blob can emit
#[derive(Debug, Clone, PartialEq)]
pub enum BlobEvent<B> {
    /// `eaten` was consumed entirely by the opposite party
    Absorbed { eaten: Party },
    /// `eaten` lost part of itself to the opposite party but survives
    Slurped { eaten: Party },
    /// A new blob split off
    Squirt(B),
}

/// Collects the events a blob emits during one call
#[derive(Debug)]
pub struct Emitter<B> {
    events: Vec<BlobEvent<B>>,
}

impl<B> Default for Emitter<B> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<B> Emitter<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorbed(&mut self, eaten: Party) {
        self.events.push(BlobEvent::Absorbed { eaten });
    }

    pub fn slurped(&mut self, eaten: Party) {
        self.events.push(BlobEvent::Slurped { eaten });
    }

    pub fn squirt(&mut self, blob: B) {
        self.events.push(BlobEvent::Squirt(blob));
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, BlobEvent<B>> {
        self.events.drain(..)
    }
}

/// Initial attributes for a generated blob
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobSpawn {
    pub position: Vec2,
    pub radius: f32,
    /// Velocity in world units per second
    pub speed: Vec2,
    pub is_player: bool,
}

/// Capability surface the world requires of a blob
pub trait Body: Sized {
    fn spawn(spawn: BlobSpawn) -> Self;

    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    fn radius(&self) -> f32;
    /// Velocity in world units per second
    fn speed(&self) -> Vec2;
    fn set_speed(&mut self, speed: Vec2);
    fn is_player(&self) -> bool;

    /// Test and resolve contact with `other`.
    ///
    /// Returns true if anything changed. The outcome must not depend on which
    /// of the two blobs is the receiver.
    fn intersect(&mut self, other: &mut Self, emit: &mut Emitter<Self>) -> bool;

    /// Split off a blob aimed at `target` (world coordinates)
    fn squirt(&mut self, target: Vec2, emit: &mut Emitter<Self>);

    /// Draw in local space: origin at the blob center, one unit per world unit.
    /// `reference` is the blob the view is centered on (usually the player).
    fn render(&self, surface: &mut dyn Surface, reference: Option<&Self>);
}
