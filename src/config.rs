//! Game configuration
//!
//! Loaded from a JSON file; every field has a default so a partial file (or
//! no file at all) is valid. Command-line flags override on top.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "starglitch.json";

/// Where the sprite and image assets live on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub ship: PathBuf,
    /// 4x1 spritesheet of thruster flames
    pub fire: PathBuf,
    /// Image revealed by the ending sequence
    pub end_image: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            ship: PathBuf::from("res/tiles/starship.png"),
            fire: PathBuf::from("res/images/fire.png"),
            end_image: PathBuf::from("res/images/end1.png"),
        }
    }
}

/// What fills the frame before anything else is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundConfig {
    Solid { color: (u8, u8, u8) },
    Gradient { top: (u8, u8, u8), bottom: (u8, u8, u8) },
    /// Image stretched over the whole frame with point sampling
    Image { path: PathBuf },
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        BackgroundConfig::Solid { color: (0, 0, 0) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// RNG seed; a random one is picked (and logged) when absent
    pub seed: Option<u64>,

    pub noise_octaves: u32,
    pub noise_persistence: f32,

    pub max_stars: usize,
    pub max_projectiles: usize,
    pub max_enemies: usize,
    pub max_particles: usize,

    /// Ship speed in pixels per second
    pub ship_speed: f32,
    /// Highest row the ship may fly up to
    pub ship_ceiling: i32,

    /// Only allow the laser while every projectile slot is in flight
    pub laser_requires_full_volley: bool,

    pub assets: AssetPaths,
    pub background: BackgroundConfig,
    /// Directory `save<N>.png` snapshots are written to
    pub snapshot_dir: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
            seed: None,
            noise_octaves: 10,
            noise_persistence: 0.7,
            max_stars: 100,
            max_projectiles: 3,
            max_enemies: 1,
            max_particles: 20,
            ship_speed: 150.0,
            ship_ceiling: 550,
            laser_requires_full_volley: true,
            assets: AssetPaths::default(),
            background: BackgroundConfig::default(),
            snapshot_dir: PathBuf::from("."),
        }
    }
}

impl GameConfig {
    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }
}
