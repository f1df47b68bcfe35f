//! Blob Arena headless runner
//!
//! Builds a world from settings (defaults, or the JSON file named by
//! `BLOB_ARENA_SETTINGS`), then drives the frame loop into a recording
//! surface until the player dies or the frame budget runs out.

use std::cell::Cell;
use std::rc::Rc;

use blob_arena::platform::InputEvent;
use blob_arena::renderer::CommandSurface;
use blob_arena::sim::{World, WorldEvent};
use blob_arena::{SimError, settings::Settings};

/// 60 Hz frame time in milliseconds
const FRAME_MS: f32 = 1000.0 / 60.0;
/// Frames to simulate (one minute)
const MAX_FRAMES: u32 = 60 * 60;
/// Squirt toward the surface center this often
const SQUIRT_EVERY: u32 = 90;

fn main() {
    env_logger::init();
    log::info!("Blob Arena (headless) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = match std::env::var("BLOB_ARENA_SETTINGS") {
        Ok(path) => Settings::load(&path)?,
        Err(_) => Settings::default(),
    };

    let mut world: World = World::new(settings.world_options())?;
    let player_died = Rc::new(Cell::new(false));
    let flag = player_died.clone();
    world.subscribe(move |event| match event {
        WorldEvent::PlayerDied { blob } => {
            log::info!("Player blob {blob:?} died");
            flag.set(true);
        }
    });

    let mut surface = CommandSurface::new(settings.surface_width, settings.surface_height);
    world.reset(&mut surface);
    world.generate(&settings.generate)?;

    let center = (settings.surface_width / 2.0, settings.surface_height / 2.0);
    let mut frames = 0;
    while frames < MAX_FRAMES && !player_died.get() {
        if frames % SQUIRT_EVERY == 0 {
            world.handle_input(&InputEvent::PointerDown {
                x: center.0,
                y: center.1,
            });
        }

        match world.step(FRAME_MS) {
            Ok(_) => {}
            // Already logged; the next frame retries
            Err(SimError::CollisionsUnresolved { .. }) => {}
            Err(e) => return Err(e.into()),
        }
        world.draw(&mut surface);
        surface.take_commands();
        frames += 1;
    }

    let biggest = world
        .blobs()
        .map(|(_, b)| b.radius)
        .fold(0.0f32, f32::max);
    log::info!(
        "Finished after {} frames: {} blobs left, largest radius {:.1}, player {}",
        frames,
        world.len(),
        biggest,
        if player_died.get() { "dead" } else { "alive" }
    );
    Ok(())
}
