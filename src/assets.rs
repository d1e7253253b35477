//! Asset loading
//!
//! Every asset has a procedural stand-in, so a missing or broken file only
//! costs a warning and the game still starts.

use std::path::Path;

use crate::config::{BackgroundConfig, GameConfig};
use crate::game::Background;
use crate::texture::{SpriteSheet, Texture, MAGIC_PINK};

/// Frames in the thruster spritesheet (laid out in one row)
pub const FIRE_FRAMES: u32 = 4;

const PLACEHOLDER_SHIP_SIZE: u32 = 64;
const PLACEHOLDER_FIRE_FRAME: (u32, u32) = (64, 16);

/// Decoded images the game needs at startup
pub struct GameAssets {
    pub ship: Texture,
    pub fire: SpriteSheet,
    pub end_image: Texture,
    pub background: Background,
}

impl GameAssets {
    /// Load everything named in the config, substituting placeholders for
    /// anything that fails to load
    pub fn load(config: &GameConfig) -> Self {
        let paths = &config.assets;

        let ship = load_or(&paths.ship, "ship", placeholder_ship);
        let fire = load_or(&paths.fire, "fire", placeholder_fire);
        let end_image = load_or(&paths.end_image, "end image", || {
            placeholder_end_image(config.width, config.height)
        });

        let background = match &config.background {
            BackgroundConfig::Solid { color } => Background::Solid(*color),
            BackgroundConfig::Gradient { top, bottom } => Background::Gradient {
                top: *top,
                bottom: *bottom,
            },
            BackgroundConfig::Image { path } => match Texture::load_png(path) {
                Ok(texture) => Background::Image(texture),
                Err(e) => {
                    log::warn!(
                        "Failed to load background {}: {}, using solid black",
                        path.display(),
                        e
                    );
                    Background::Solid((0, 0, 0))
                },
            },
        };

        Self {
            ship,
            fire: SpriteSheet::new(fire, FIRE_FRAMES, 1),
            end_image,
            background,
        }
    }

    /// Procedural assets only, no file access
    #[cfg(test)]
    pub fn placeholder(width: u32, height: u32) -> Self {
        Self {
            ship: placeholder_ship(),
            fire: SpriteSheet::new(placeholder_fire(), FIRE_FRAMES, 1),
            end_image: placeholder_end_image(width, height),
            background: Background::Solid((0, 0, 0)),
        }
    }
}

/// Load a PNG and key out magic pink, or fall back to `placeholder`
fn load_or(path: &Path, what: &str, placeholder: impl FnOnce() -> Texture) -> Texture {
    match Texture::load_png(path) {
        Ok(texture) => {
            log::info!(
                "Loaded {} from {} ({}x{})",
                what,
                path.display(),
                texture.width(),
                texture.height()
            );
            texture.with_color_key(MAGIC_PINK)
        },
        Err(e) => {
            log::warn!(
                "Failed to load {} from {}: {}, using placeholder",
                what,
                path.display(),
                e
            );
            placeholder()
        },
    }
}

/// Grey arrowhead pointing up, transparent elsewhere
fn placeholder_ship() -> Texture {
    let size = PLACEHOLDER_SHIP_SIZE;
    let mut tex = Texture::new(size, size);
    let centre = size as i32 / 2;

    for y in 0..size {
        let half = (y as i32 + 1) / 2;
        for x in 0..size {
            if (x as i32 - centre).abs() <= half {
                let shade = 140 + (y * 100 / size) as u8;
                tex.set_pixel(x, y, shade, shade, shade + 10, 255);
            }
        }
    }
    tex
}

/// Four flame frames of growing length, yellow fading to red
fn placeholder_fire() -> Texture {
    let (fw, fh) = PLACEHOLDER_FIRE_FRAME;
    let mut tex = Texture::new(fw * FIRE_FRAMES, fh);
    let centre = fw as i32 / 2;

    for frame in 0..FIRE_FRAMES {
        let length = fh / 2 + frame * fh / (2 * FIRE_FRAMES);
        for y in 0..length {
            let half = ((length - y) as i32 / 2).max(1);
            let g = 220u32.saturating_sub(y * 200 / length.max(1)) as u8;
            for dx in -half..=half {
                let x = centre + dx;
                if x >= 0 && x < fw as i32 {
                    tex.set_pixel(frame * fw + x as u32, y, 255, g, 0, 255);
                }
            }
        }
    }
    tex
}

fn placeholder_end_image(width: u32, height: u32) -> Texture {
    let size = width.min(height).max(1);
    Texture::checkerboard(size, (size / 8).max(1), (230, 230, 230), (40, 40, 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_fall_back() {
        let config = GameConfig {
            assets: crate::config::AssetPaths {
                ship: "does/not/exist.png".into(),
                fire: "does/not/exist.png".into(),
                end_image: "does/not/exist.png".into(),
            },
            background: BackgroundConfig::Image {
                path: "does/not/exist.png".into(),
            },
            width: 320,
            height: 240,
            ..GameConfig::default()
        };
        let assets = GameAssets::load(&config);
        assert_eq!(assets.ship.width(), PLACEHOLDER_SHIP_SIZE);
        assert_eq!(assets.fire.frame_count(), FIRE_FRAMES);
        assert_eq!(assets.fire.frame_width(), PLACEHOLDER_FIRE_FRAME.0);
        assert_eq!(assets.end_image.width(), 240);
        assert!(matches!(assets.background, Background::Solid((0, 0, 0))));
    }

    #[test]
    fn test_placeholder_ship_has_transparency() {
        let ship = placeholder_ship();
        assert!(ship.is_transparent(0, 0));
        assert!(!ship.is_transparent(32, 63));
    }

    #[test]
    fn test_placeholder_fire_frames_differ() {
        let fire = placeholder_fire();
        let (fw, fh) = PLACEHOLDER_FIRE_FRAME;
        let centre = fw / 2;
        // First frame is shorter than the last
        assert!(fire.is_transparent(centre, fh * 5 / 8));
        assert!(!fire.is_transparent(3 * fw + centre, fh * 5 / 8));
    }
}
