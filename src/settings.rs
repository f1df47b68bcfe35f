//! World settings
//!
//! Everything needed to build and populate a world, loadable from JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_RESOLVE_SWEEPS;
use crate::sim::{GenerateOptions, Rect, SimError, WorldOptions};

/// Failure to load settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Invalid(#[from] SimError),
}

/// World configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed for blob generation
    pub seed: u64,

    // === Time ===
    /// Simulation speed factor (1 = real time)
    pub time_multiplier: f32,
    /// Collision sweeps allowed per step before giving up
    pub max_resolve_sweeps: u32,

    // === Space ===
    /// Arena bounds (world units)
    pub arena: Rect,
    /// Visible part of the arena
    pub viewport: Rect,
    /// Drawing surface size (pixels)
    pub surface_width: f32,
    pub surface_height: f32,

    // === Population ===
    pub generate: GenerateOptions,
}

impl Default for Settings {
    fn default() -> Self {
        let arena = Rect {
            corner: Vec2::ZERO,
            width: 800.0,
            height: 600.0,
        };
        Self {
            seed: 0,

            time_multiplier: 1.0,
            max_resolve_sweeps: MAX_RESOLVE_SWEEPS,

            arena,
            viewport: arena,
            surface_width: 800.0,
            surface_height: 600.0,

            generate: GenerateOptions {
                count: 20,
                radius: 40.0,
                speed: 30.0,
            },
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &str) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {path}");
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.arena.validate()?;
        self.viewport.validate()?;
        self.generate.validate()
    }

    /// Options for `World::new`
    pub fn world_options(&self) -> WorldOptions {
        WorldOptions {
            viewport: self.viewport,
            extents: self.arena,
            surface_width: self.surface_width,
            surface_height: self.surface_height,
            time_multiplier: self.time_multiplier,
            seed: self.seed,
            max_resolve_sweeps: self.max_resolve_sweeps,
        }
    }
}
