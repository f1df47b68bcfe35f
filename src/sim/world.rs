//! World state: the blob collection and everything that mutates it
//!
//! The world owns every blob. Blobs never reference the world; they report
//! outcomes as `BlobEvent`s which the world applies here. Per-frame motion
//! and collision resolution live in `tick`.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::blob::Blob;
use super::body::{BlobEvent, BlobSpawn, Body, Emitter, Party};
use super::error::SimError;
use super::geometry::Rect;
use crate::consts::*;
use crate::platform::InputEvent;
use crate::renderer::{Color, Surface, ViewMapper, with_transform};

/// Stable handle to a blob in a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobId(pub u32);

/// Events the world reports to its listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    /// A player blob was absorbed and removed
    PlayerDied { blob: BlobId },
}

/// Listener callback registered with `World::subscribe`
pub type Listener = Box<dyn FnMut(&WorldEvent)>;

/// Construction options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldOptions {
    /// Visible window into the arena
    pub viewport: Rect,
    /// Arena bounds
    pub extents: Rect,
    /// Drawing surface size in pixels
    pub surface_width: f32,
    pub surface_height: f32,
    /// Simulation speed factor (1 = real time, 0 = frozen)
    pub time_multiplier: f32,
    /// RNG seed for `generate`
    pub seed: u64,
    /// Collision sweeps allowed per step
    pub max_resolve_sweeps: u32,
}

impl WorldOptions {
    /// Options with default multiplier, seed and sweep cap
    pub fn new(viewport: Rect, extents: Rect, surface_width: f32, surface_height: f32) -> Self {
        Self {
            viewport,
            extents,
            surface_width,
            surface_height,
            time_multiplier: 1.0,
            seed: 0,
            max_resolve_sweeps: MAX_RESOLVE_SWEEPS,
        }
    }
}

/// Options for `World::generate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Number of blobs (the first one is the player)
    pub count: u32,
    /// Reference radius: player gets half, others 10%-100%
    pub radius: f32,
    /// Max speed per axis (units/sec)
    pub speed: f32,
}

impl GenerateOptions {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.count == 0 {
            return Err(SimError::option("count", "must be at least 1"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SimError::option("radius", format!("{} is not positive", self.radius)));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(SimError::option("speed", format!("{} is negative", self.speed)));
        }
        Ok(())
    }
}

/// A blob slot. `removed` marks blobs absorbed mid-sweep until compaction.
#[derive(Debug, Clone)]
pub(super) struct Entry<B> {
    pub id: BlobId,
    pub blob: B,
    pub removed: bool,
}

/// The simulated arena
pub struct World<B: Body = Blob> {
    pub(super) mapper: ViewMapper,
    pub(super) extents: Rect,
    pub(super) time_multiplier: f32,
    pub(super) max_resolve_sweeps: u32,
    /// Draw order = insertion order
    pub(super) blobs: Vec<Entry<B>>,
    pub(super) emitter: Emitter<B>,
    next_id: u32,
    rng: Pcg32,
    listeners: Vec<Listener>,
}

impl<B: Body> fmt::Debug for World<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("viewport", &self.mapper.viewport)
            .field("extents", &self.extents)
            .field("time_multiplier", &self.time_multiplier)
            .field("blobs", &self.blobs.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<B: Body> World<B> {
    pub fn new(options: WorldOptions) -> Result<Self, SimError> {
        options.extents.validate()?;
        let mapper = ViewMapper::new(options.viewport, options.surface_width, options.surface_height)?;
        validate_multiplier(options.time_multiplier)?;
        if options.max_resolve_sweeps == 0 {
            return Err(SimError::option("max_resolve_sweeps", "must be at least 1"));
        }

        Ok(Self {
            mapper,
            extents: options.extents,
            time_multiplier: options.time_multiplier,
            max_resolve_sweeps: options.max_resolve_sweeps,
            blobs: Vec::new(),
            emitter: Emitter::new(),
            next_id: 1,
            rng: Pcg32::seed_from_u64(options.seed),
            listeners: Vec::new(),
        })
    }

    pub fn viewport(&self) -> Rect {
        self.mapper.viewport
    }

    /// Move the visible window (e.g. to follow the player)
    pub fn set_viewport(&mut self, viewport: Rect) -> Result<(), SimError> {
        viewport.validate()?;
        self.mapper.viewport = viewport;
        Ok(())
    }

    pub fn extents(&self) -> Rect {
        self.extents
    }

    pub fn mapper(&self) -> &ViewMapper {
        &self.mapper
    }

    /// Surface was resized; keep mapping onto its full area
    pub fn resize_surface(&mut self, width: f32, height: f32) -> Result<(), SimError> {
        self.mapper = ViewMapper::new(self.mapper.viewport, width, height)?;
        Ok(())
    }

    pub fn time_multiplier(&self) -> f32 {
        self.time_multiplier
    }

    pub fn set_time_multiplier(&mut self, multiplier: f32) -> Result<(), SimError> {
        validate_multiplier(multiplier)?;
        self.time_multiplier = multiplier;
        Ok(())
    }

    /// Register a listener for world events
    pub fn subscribe(&mut self, listener: impl FnMut(&WorldEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // === Collection ===

    /// Add a blob; its events are handled by this world from now on
    pub fn add_blob(&mut self, blob: B) -> BlobId {
        if !is_well_formed(&blob) {
            log::warn!(
                "Adding malformed blob: radius {}, position {}, speed {}",
                blob.radius(),
                blob.position(),
                blob.speed()
            );
        }
        let id = BlobId(self.next_id);
        self.next_id += 1;
        self.blobs.push(Entry {
            id,
            blob,
            removed: false,
        });
        id
    }

    /// Remove a blob, returning it. Absent ids are ignored.
    pub fn remove_blob(&mut self, id: BlobId) -> Option<B> {
        let index = self.index_of(id)?;
        Some(self.blobs.remove(index).blob)
    }

    pub fn clear_blobs(&mut self) {
        self.blobs.clear();
    }

    pub fn len(&self) -> usize {
        self.blobs.iter().filter(|e| !e.removed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn blob(&self, id: BlobId) -> Option<&B> {
        self.index_of(id).map(|i| &self.blobs[i].blob)
    }

    pub fn blob_mut(&mut self, id: BlobId) -> Option<&mut B> {
        self.index_of(id).map(|i| &mut self.blobs[i].blob)
    }

    /// All blobs in draw order
    pub fn blobs(&self) -> impl Iterator<Item = (BlobId, &B)> + '_ {
        self.blobs
            .iter()
            .filter(|e| !e.removed)
            .map(|e| (e.id, &e.blob))
    }

    /// Player blobs, in collection order
    pub fn player_blobs(&self) -> impl Iterator<Item = (BlobId, &B)> + '_ {
        self.blobs().filter(|(_, b)| b.is_player())
    }

    pub(super) fn index_of(&self, id: BlobId) -> Option<usize> {
        self.blobs.iter().position(|e| e.id == id && !e.removed)
    }

    /// Drop blobs marked as removed
    pub(super) fn compact(&mut self) {
        self.blobs.retain(|e| !e.removed);
    }

    /// Populate the arena with random blobs. The first one is the player.
    pub fn generate(&mut self, options: &GenerateOptions) -> Result<(), SimError> {
        options.validate()?;

        let (min, max) = self.extents.inset(options.radius);
        if min.x == max.x || min.y == max.y {
            log::warn!(
                "Spawn radius {} does not fit extents {}x{}, spawning at center",
                options.radius,
                self.extents.width,
                self.extents.height
            );
        }

        for i in 0..options.count {
            let is_player = i == 0;
            let position = Vec2::new(
                sample(&mut self.rng, min.x, max.x),
                sample(&mut self.rng, min.y, max.y),
            );
            let radius = if is_player {
                options.radius * PLAYER_RADIUS_FACTOR
            } else {
                sample(&mut self.rng, options.radius * MIN_SPAWN_RADIUS_FACTOR, options.radius)
            };
            let speed = Vec2::new(
                sample(&mut self.rng, -options.speed, options.speed),
                sample(&mut self.rng, -options.speed, options.speed),
            );
            self.add_blob(B::spawn(BlobSpawn {
                position,
                radius,
                speed,
                is_player,
            }));
        }

        log::info!(
            "Generated {} blobs (radius {}, speed {})",
            options.count,
            options.radius,
            options.speed
        );
        Ok(())
    }

    // === Event handling ===

    /// Apply everything in the emitter. `this`/`other` name the two parties
    /// of the call that produced the events. Returns the number of absorptions.
    pub(super) fn dispatch_emitted(&mut self, this: BlobId, other: BlobId) -> usize {
        let mut emitter = std::mem::take(&mut self.emitter);
        let mut absorbed = 0;
        for event in emitter.drain() {
            match event {
                BlobEvent::Absorbed { eaten } => {
                    let (eater, eaten) = resolve_parties(this, other, eaten);
                    if self.handle_absorbed(eater, eaten) {
                        absorbed += 1;
                    }
                }
                BlobEvent::Slurped { eaten } => {
                    let (eater, eaten) = resolve_parties(this, other, eaten);
                    self.handle_slurped(eater, eaten);
                }
                BlobEvent::Squirt(child) => self.handle_squirt(child),
            }
        }
        self.emitter = emitter;
        absorbed
    }

    fn handle_absorbed(&mut self, eater: BlobId, eaten: BlobId) -> bool {
        let Some(index) = self.index_of(eaten) else {
            return false;
        };
        let entry = &mut self.blobs[index];
        entry.removed = true;
        log::trace!("{eater:?} absorbed {eaten:?}");

        if entry.blob.is_player() {
            log::info!("Player blob {eaten:?} was absorbed by {eater:?}");
            self.emit(WorldEvent::PlayerDied { blob: eaten });
        }
        true
    }

    fn handle_slurped(&mut self, eater: BlobId, eaten: BlobId) {
        // Size changes are applied by the blobs themselves
        log::trace!("{eater:?} slurped {eaten:?}");
    }

    fn handle_squirt(&mut self, mut child: B) {
        // A squirt aimed at a nearby wall would spawn outside the arena;
        // pull it back inside
        let (min, max) = self.extents.inset(child.radius());
        let pos = child.position();
        let clamped = pos.clamp(min, max);
        if clamped != pos {
            log::trace!("squirt moved from {pos} to {clamped} to stay in the arena");
            child.set_position(clamped);
        }
        let id = self.add_blob(child);
        log::trace!("squirt spawned {id:?}");
    }

    fn emit(&mut self, event: WorldEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    // === Input ===

    /// Squirt every player blob toward a point on the surface
    pub fn pointer_down(&mut self, screen: Vec2) {
        let target = self.mapper.screen_to_world(screen);
        let players: Vec<BlobId> = self.player_blobs().map(|(id, _)| id).collect();

        for id in players {
            let Some(index) = self.index_of(id) else {
                continue;
            };
            self.blobs[index].blob.squirt(target, &mut self.emitter);
            self.dispatch_emitted(id, id);
        }
        self.compact();
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { .. } => {
                if let Some(screen) = event.pointer() {
                    self.pointer_down(screen);
                }
            }
            InputEvent::PointerMove { .. } | InputEvent::KeyDown { .. } => {}
        }
    }

    // === Drawing ===

    /// Fill the whole surface with black
    pub fn clear(&self, surface: &mut dyn Surface) {
        let bounds = surface.bounds();
        surface.clear(Color::BLACK, bounds);
    }

    /// Draw all blobs, each in its own transform scope
    pub fn draw(&self, surface: &mut dyn Surface) {
        self.clear(surface);

        let reference = self.player_blobs().next().map(|(_, b)| b);
        let scale = self.mapper.scalar_to_screen(1.0);
        for (_, blob) in self.blobs() {
            let mapped = self.mapper.world_to_screen(blob.position());
            with_transform(&mut *surface, mapped, scale, |s| blob.render(s, reference));
        }
    }

    /// Drop all blobs and blank the surface
    pub fn reset(&mut self, surface: &mut dyn Surface) {
        self.clear_blobs();
        self.clear(surface);
        log::info!("World reset");
    }
}

fn validate_multiplier(multiplier: f32) -> Result<(), SimError> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(SimError::option(
            "time_multiplier",
            format!("{multiplier} must be finite and non-negative"),
        ));
    }
    Ok(())
}

/// Positive finite radius and finite motion state
pub(super) fn is_well_formed<B: Body>(blob: &B) -> bool {
    let r = blob.radius();
    r.is_finite() && r > 0.0 && blob.position().is_finite() && blob.speed().is_finite()
}

/// (eater, eaten) ids for an event emitted from `this.intersect(other)`
fn resolve_parties(this: BlobId, other: BlobId, eaten: Party) -> (BlobId, BlobId) {
    match eaten {
        Party::This => (other, this),
        Party::Other => (this, other),
    }
}

/// Uniform in `[lo, hi)`, or `lo` when the range is empty
fn sample(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if lo < hi { rng.random_range(lo..hi) } else { lo }
}
