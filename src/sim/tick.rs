//! Per-frame simulation step
//!
//! Each step runs three phases:
//! 1. Integrate velocity into position (explicit Euler)
//! 2. Reflect velocities off the arena walls
//! 3. Sweep all blob pairs until a full sweep finds no interaction
//!
//! Wall reflection happens after the move, so a blob can sit past a wall by up
//! to one frame's displacement before it turns around. Positions are never
//! clamped.

use super::body::Body;
use super::error::SimError;
use super::world::World;
use crate::consts::MS_PER_SECOND;

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Collision sweeps run (the last one found nothing)
    pub sweeps: u32,
    /// Blobs absorbed and removed
    pub absorbed: usize,
}

impl<B: Body> World<B> {
    /// Advance the world by `dt_ms` milliseconds of wall time.
    ///
    /// Zero or negative deltas skip motion but still settle collisions.
    /// If any blob's new state would be non-finite, no blob is moved.
    pub fn step(&mut self, dt_ms: f32) -> Result<StepReport, SimError> {
        if !dt_ms.is_finite() {
            return Err(SimError::InvalidTimestep(dt_ms));
        }

        let dt = dt_ms * self.time_multiplier / MS_PER_SECOND;
        if dt > 0.0 {
            self.integrate(dt)?;
        }

        let report = self.resolve_collisions()?;
        // Interaction policies can break finiteness too
        self.check_finite()?;
        if report.absorbed > 0 || report.sweeps > 1 {
            log::debug!(
                "Step: {} sweeps, {} absorbed, {} blobs left",
                report.sweeps,
                report.absorbed,
                self.blobs.len()
            );
        }
        Ok(report)
    }

    /// Move every blob and bounce it off the walls
    fn integrate(&mut self, dt: f32) -> Result<(), SimError> {
        let min = self.extents.min();
        let max = self.extents.max();

        let mut moved = Vec::with_capacity(self.blobs.len());
        for entry in &self.blobs {
            let blob = &entry.blob;
            let pos = blob.position() + blob.speed() * dt;
            let r = blob.radius();
            let mut speed = blob.speed();

            // Only flip while still heading outward, so a blob past the wall
            // doesn't oscillate on the boundary
            if (pos.x - r < min.x && speed.x < 0.0) || (pos.x + r > max.x && speed.x > 0.0) {
                speed.x = -speed.x;
            }
            if (pos.y - r < min.y && speed.y < 0.0) || (pos.y + r > max.y && speed.y > 0.0) {
                speed.y = -speed.y;
            }

            if !pos.is_finite() || !speed.is_finite() {
                return Err(SimError::NonFinite(entry.id));
            }
            moved.push((pos, speed));
        }

        for (entry, (pos, speed)) in self.blobs.iter_mut().zip(moved) {
            entry.blob.set_position(pos);
            entry.blob.set_speed(speed);
        }
        Ok(())
    }

    /// First blob whose position, velocity or radius is not finite
    fn check_finite(&self) -> Result<(), SimError> {
        for entry in &self.blobs {
            let b = &entry.blob;
            if !b.position().is_finite() || !b.speed().is_finite() || !b.radius().is_finite() {
                return Err(SimError::NonFinite(entry.id));
            }
        }
        Ok(())
    }

    /// Sweep until a fixed point, or fail once the sweep cap is hit
    fn resolve_collisions(&mut self) -> Result<StepReport, SimError> {
        let mut report = StepReport::default();

        loop {
            if report.sweeps >= self.max_resolve_sweeps {
                log::error!(
                    "Collisions still changing after {} sweeps ({} blobs), giving up this frame",
                    report.sweeps,
                    self.blobs.len()
                );
                return Err(SimError::CollisionsUnresolved {
                    sweeps: report.sweeps,
                });
            }

            report.sweeps += 1;
            let found = self.sweep(&mut report.absorbed);
            self.compact();
            if !found {
                return Ok(report);
            }
        }
    }

    /// One pass over every unordered pair present at the start of the pass.
    ///
    /// Absorbed blobs are only marked during the pass and skipped from then
    /// on; blobs squirted mid-pass are appended and first seen next pass.
    fn sweep(&mut self, absorbed: &mut usize) -> bool {
        let n = self.blobs.len();
        let mut found = false;

        for i in 0..n {
            for j in (i + 1)..n {
                if self.blobs[i].removed {
                    break;
                }
                if self.blobs[j].removed {
                    continue;
                }

                let (head, tail) = self.blobs.split_at_mut(j);
                let (a, b) = (&mut head[i], &mut tail[0]);
                if !a.blob.intersect(&mut b.blob, &mut self.emitter) {
                    continue;
                }
                found = true;

                let (this, other) = (a.id, b.id);
                *absorbed += self.dispatch_emitted(this, other);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Surface;
    use crate::sim::body::{BlobSpawn, Emitter, Party};
    use crate::sim::{Blob, BlobId, Rect, WorldEvent, WorldOptions};
    use glam::Vec2;
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME_MS: f32 = 16.0;

    fn arena() -> Rect {
        Rect::new(Vec2::ZERO, 100.0, 100.0).unwrap()
    }

    fn world<B: Body>() -> World<B> {
        World::new(WorldOptions::new(arena(), arena(), 400.0, 400.0)).unwrap()
    }

    /// How a `Gulper` reacts to contact
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        /// Larger eats smaller
        Eat,
        /// Reports contact forever without changing
        Sticky,
        /// First contact splits off an eater at the given point
        Split(Vec2),
        /// Split already happened; ignores contact
        Spent,
        /// First contact corrupts its own speed
        Poison,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Gulper {
        pos: Vec2,
        r: f32,
        v: Vec2,
        player: bool,
        mode: Mode,
    }

    impl Gulper {
        fn new(x: f32, y: f32, r: f32) -> Self {
            Self {
                pos: Vec2::new(x, y),
                r,
                v: Vec2::ZERO,
                player: false,
                mode: Mode::Eat,
            }
        }

        fn with_mode(mut self, mode: Mode) -> Self {
            self.mode = mode;
            self
        }
    }

    impl Body for Gulper {
        fn spawn(s: BlobSpawn) -> Self {
            Self {
                pos: s.position,
                r: s.radius,
                v: s.speed,
                player: s.is_player,
                mode: Mode::Eat,
            }
        }
        fn position(&self) -> Vec2 {
            self.pos
        }
        fn set_position(&mut self, p: Vec2) {
            self.pos = p;
        }
        fn radius(&self) -> f32 {
            self.r
        }
        fn speed(&self) -> Vec2 {
            self.v
        }
        fn set_speed(&mut self, v: Vec2) {
            self.v = v;
        }
        fn is_player(&self) -> bool {
            self.player
        }
        fn intersect(&mut self, other: &mut Self, emit: &mut Emitter<Self>) -> bool {
            if self.pos.distance(other.pos) >= self.r + other.r {
                return false;
            }
            match (self.mode, other.mode) {
                (Mode::Sticky, _) | (_, Mode::Sticky) => return true,
                (Mode::Split(at), _) => {
                    self.mode = Mode::Spent;
                    emit.squirt(Gulper::new(at.x, at.y, 3.0));
                    return true;
                }
                (_, Mode::Split(at)) => {
                    other.mode = Mode::Spent;
                    emit.squirt(Gulper::new(at.x, at.y, 3.0));
                    return true;
                }
                (Mode::Spent, _) | (_, Mode::Spent) => return false,
                (Mode::Poison, _) => {
                    self.v = Vec2::NAN;
                    self.mode = Mode::Spent;
                    return true;
                }
                (_, Mode::Poison) => {
                    other.v = Vec2::NAN;
                    other.mode = Mode::Spent;
                    return true;
                }
                (Mode::Eat, Mode::Eat) => {}
            }
            let total = self.r * self.r + other.r * other.r;
            if self.r >= other.r {
                self.r = total.sqrt();
                emit.absorbed(Party::Other);
            } else {
                other.r = total.sqrt();
                emit.absorbed(Party::This);
            }
            true
        }
        fn squirt(&mut self, _target: Vec2, _emit: &mut Emitter<Self>) {}
        fn render(&self, _surface: &mut dyn Surface, _reference: Option<&Self>) {}
    }

    #[test]
    fn test_integrates_with_time_multiplier() {
        let mut world: World = world();
        let id = world.add_blob(Blob::new(Vec2::new(50.0, 50.0), 1.0, Vec2::new(10.0, -5.0), false));

        world.step(100.0).unwrap();
        let b = world.blob(id).unwrap();
        assert!((b.position - Vec2::new(51.0, 49.5)).length() < 1e-5);

        world.set_time_multiplier(2.0).unwrap();
        world.step(100.0).unwrap();
        let b = world.blob(id).unwrap();
        assert!((b.position - Vec2::new(53.0, 48.5)).length() < 1e-5);
    }

    #[test]
    fn test_zero_and_negative_dt_do_not_move() {
        let mut world: World = world();
        let id = world.add_blob(Blob::new(Vec2::new(50.0, 50.0), 1.0, Vec2::new(10.0, 10.0), false));
        world.step(0.0).unwrap();
        world.step(-16.0).unwrap();
        assert_eq!(world.blob(id).unwrap().position, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_non_finite_dt_is_rejected() {
        let mut world: World = world();
        assert!(matches!(world.step(f32::NAN), Err(SimError::InvalidTimestep(_))));
        assert!(matches!(world.step(f32::INFINITY), Err(SimError::InvalidTimestep(_))));
    }

    #[test]
    fn test_non_finite_velocity_is_reported() {
        let mut world: World = world();
        let id = world.add_blob(Blob::new(Vec2::new(50.0, 50.0), 1.0, Vec2::new(f32::INFINITY, 0.0), false));
        assert_eq!(world.step(FRAME_MS), Err(SimError::NonFinite(id)));
    }

    #[test]
    fn test_wall_reflection_flips_once() {
        let mut world: World = world();
        let id = world.add_blob(Blob::new(Vec2::new(10.0, 50.0), 5.0, Vec2::new(-100.0, 0.0), false));

        let mut flips = 0;
        let mut last = world.blob(id).unwrap().speed.x;
        for _ in 0..30 {
            world.step(FRAME_MS).unwrap();
            let vx = world.blob(id).unwrap().speed.x;
            if vx.signum() != last.signum() {
                flips += 1;
            }
            last = vx;
        }
        assert_eq!(flips, 1);
        assert!(last > 0.0);
    }

    #[test]
    fn test_blob_past_wall_moving_inward_is_left_alone() {
        let mut world: World = world();
        // Overlapping the right wall but already heading back in
        let id = world.add_blob(Blob::new(Vec2::new(98.0, 50.0), 5.0, Vec2::new(-10.0, 0.0), false));
        world.step(FRAME_MS).unwrap();
        assert_eq!(world.blob(id).unwrap().speed.x, -10.0);
    }

    #[test]
    fn test_reflects_both_axes_in_corner() {
        let mut world: World = world();
        let id = world.add_blob(Blob::new(Vec2::new(99.0, 99.0), 2.0, Vec2::new(10.0, 10.0), false));
        world.step(FRAME_MS).unwrap();
        assert_eq!(world.blob(id).unwrap().speed, Vec2::new(-10.0, -10.0));
    }

    #[test]
    fn test_absorption_removes_exactly_one() {
        let mut world: World = world();
        let big = world.add_blob(Blob::new(Vec2::new(50.0, 50.0), 10.0, Vec2::ZERO, false));
        let small = world.add_blob(Blob::new(Vec2::new(53.0, 50.0), 3.0, Vec2::ZERO, false));
        world.add_blob(Blob::new(Vec2::new(10.0, 10.0), 2.0, Vec2::ZERO, false));

        let report = world.step(FRAME_MS).unwrap();
        assert_eq!(report.absorbed, 1);
        assert_eq!(world.len(), 2);
        assert!(world.blob(small).is_none());
        assert!(world.blob(big).is_some());
    }

    #[test]
    fn test_player_death_fires_once() {
        let mut world: World = world();
        let deaths = Rc::new(Cell::new(0));
        let died: Rc<Cell<Option<BlobId>>> = Rc::new(Cell::new(None));
        let (d, who) = (deaths.clone(), died.clone());
        world.subscribe(move |ev| match *ev {
            WorldEvent::PlayerDied { blob } => {
                d.set(d.get() + 1);
                who.set(Some(blob));
            }
        });

        world.add_blob(Blob::new(Vec2::new(50.0, 50.0), 10.0, Vec2::ZERO, false));
        let player = world.add_blob(Blob::new(Vec2::new(52.0, 50.0), 3.0, Vec2::ZERO, true));

        world.step(FRAME_MS).unwrap();
        world.step(FRAME_MS).unwrap();

        assert_eq!(deaths.get(), 1);
        assert_eq!(died.get(), Some(player));
        assert_eq!(world.player_blobs().count(), 0);
    }

    #[test]
    fn test_cascade_resolves_in_one_step() {
        let mut world: World<Gulper> = world();
        // C only overlaps A once A has grown by eating B, and is scanned first
        let c = world.add_blob(Gulper::new(62.2, 50.0, 2.0));
        let a = world.add_blob(Gulper::new(50.0, 50.0, 10.0));
        let b = world.add_blob(Gulper::new(55.0, 50.0, 3.0));

        let report = world.step(0.0).unwrap();

        assert_eq!(report.absorbed, 2);
        assert_eq!(report.sweeps, 3);
        assert_eq!(world.len(), 1);
        assert!(world.blob(a).is_some());
        assert!(world.blob(b).is_none());
        assert!(world.blob(c).is_none());
        assert!((world.blob(a).unwrap().r - 113.0f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_no_contact_is_single_sweep() {
        let mut world: World<Gulper> = world();
        world.add_blob(Gulper::new(10.0, 10.0, 2.0));
        world.add_blob(Gulper::new(90.0, 90.0, 2.0));
        let report = world.step(FRAME_MS).unwrap();
        assert_eq!(report, StepReport { sweeps: 1, absorbed: 0 });
    }

    #[test]
    fn test_endless_interaction_hits_sweep_cap() {
        let mut opts = WorldOptions::new(arena(), arena(), 400.0, 400.0);
        opts.max_resolve_sweeps = 5;
        let mut world: World<Gulper> = World::new(opts).unwrap();
        world.add_blob(Gulper::new(50.0, 50.0, 5.0).with_mode(Mode::Sticky));
        world.add_blob(Gulper::new(52.0, 50.0, 5.0));

        assert_eq!(world.step(FRAME_MS), Err(SimError::CollisionsUnresolved { sweeps: 5 }));
        // The world is still usable
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_squirt_spawned_blobs_join_the_world() {
        let mut world: World = world();
        world.add_blob(Blob::new(Vec2::new(50.0, 50.0), 20.0, Vec2::ZERO, true));
        world.pointer_down(Vec2::new(0.0, 200.0));
        assert_eq!(world.len(), 2);

        // The squirt flies off and keeps bouncing like everything else
        for _ in 0..120 {
            world.step(FRAME_MS).unwrap();
        }
        assert!(world.blobs().all(|(_, b)| b.position.is_finite()));
    }

    #[test]
    fn test_failed_integration_moves_nothing() {
        let mut world: World = world();
        let good = world.add_blob(Blob::new(Vec2::new(50.0, 50.0), 1.0, Vec2::new(100.0, 0.0), false));
        let bad = world.add_blob(Blob::new(Vec2::new(20.0, 20.0), 1.0, Vec2::new(f32::INFINITY, 0.0), false));
        let late = world.add_blob(Blob::new(Vec2::new(80.0, 80.0), 1.0, Vec2::new(100.0, 0.0), false));

        assert_eq!(world.step(FRAME_MS), Err(SimError::NonFinite(bad)));
        assert_eq!(world.blob(good).unwrap().position, Vec2::new(50.0, 50.0));
        assert_eq!(world.blob(late).unwrap().position, Vec2::new(80.0, 80.0));
    }

    #[test]
    fn test_non_finite_after_collisions_is_reported() {
        let mut world: World<Gulper> = world();
        let poisoned = world.add_blob(Gulper::new(50.0, 50.0, 5.0).with_mode(Mode::Poison));
        world.add_blob(Gulper::new(52.0, 50.0, 3.0));

        // No motion this step, so only the post-collision check can catch it
        assert_eq!(world.step(0.0), Err(SimError::NonFinite(poisoned)));
    }

    #[test]
    fn test_blob_split_mid_sweep_is_tested_next_sweep() {
        let mut world: World<Gulper> = world();
        // Prey sits where the split child will appear
        let prey = world.add_blob(Gulper::new(21.0, 20.0, 1.0));
        let splitter = world.add_blob(Gulper::new(50.0, 50.0, 5.0).with_mode(Mode::Split(Vec2::new(20.0, 20.0))));
        let partner = world.add_blob(Gulper::new(55.0, 50.0, 5.0).with_mode(Mode::Spent));

        let report = world.step(0.0).unwrap();

        // Sweep 1 splits, sweep 2 the child eats the prey, sweep 3 is quiet.
        // Had the child been tested in sweep 1, only two sweeps would run.
        assert_eq!(report, StepReport { sweeps: 3, absorbed: 1 });
        assert_eq!(world.len(), 3);
        assert!(world.blob(prey).is_none());
        assert!(world.blob(splitter).is_some());
        assert!(world.blob(partner).is_some());
        let (_, child) = world.blobs().last().unwrap();
        assert_eq!(child.pos, Vec2::new(20.0, 20.0));
        assert!((child.r - 10.0f32.sqrt()).abs() < 1e-5);
    }
}
