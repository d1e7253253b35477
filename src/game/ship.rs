//! The player's starship and its scripted intro
//!
//! The intro runs a small state machine: the ship flickers between its
//! normal sprite and a chromatic glitch until `GLITCH_DURATION` ticks have
//! passed, then lights its thrusters for good and accepts movement input.

use crate::display::{Channel, PixelBuffer};
use crate::texture::{SpriteSheet, Texture};

use super::FrameInput;

/// Intro length in ticks before the thrusters ignite
pub const GLITCH_DURATION: u32 = 200;
/// The glitch lets up for `GLITCH_FREE_TICKS` ticks every `GLITCH_PERIOD`
pub const GLITCH_PERIOD: u32 = 67;
pub const GLITCH_FREE_TICKS: u32 = 3;
/// Ticks each thruster frame stays on screen
pub const FIRE_FRAME_TICKS: u32 = 6;

const GLITCH_AMPLITUDE: f32 = 5.0;
const GLITCH_FREQUENCY: f32 = 0.9;
/// How far the flames tuck up under the hull
const FIRE_OVERLAP: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipMode {
    Normal { tick: u32 },
    Glitching { tick: u32 },
    /// Terminal: thrusters animating, ship under player control
    FireAnimating { frame: u32, countdown: u32 },
}

impl ShipMode {
    /// Intro mode for a given tick
    pub fn for_intro_tick(tick: u32) -> Self {
        if tick >= GLITCH_DURATION {
            ShipMode::FireAnimating {
                frame: 0,
                countdown: FIRE_FRAME_TICKS - 1,
            }
        } else if tick % GLITCH_PERIOD < GLITCH_FREE_TICKS {
            ShipMode::Normal { tick }
        } else {
            ShipMode::Glitching { tick }
        }
    }

    fn next(self, fire_frames: u32) -> Self {
        match self {
            ShipMode::Normal { tick } | ShipMode::Glitching { tick } => {
                Self::for_intro_tick(tick + 1)
            },
            ShipMode::FireAnimating { frame, countdown: 0 } => ShipMode::FireAnimating {
                frame: (frame + 1) % fire_frames.max(1),
                countdown: FIRE_FRAME_TICKS - 1,
            },
            ShipMode::FireAnimating { frame, countdown } => ShipMode::FireAnimating {
                frame,
                countdown: countdown - 1,
            },
        }
    }
}

/// Per-texel RGB of the ship sprite, `None` where it is transparent
struct GlitchCache {
    width: u32,
    texels: Vec<Option<[u8; 3]>>,
}

impl GlitchCache {
    fn from_sprite(sprite: &Texture) -> Self {
        let mut texels = Vec::with_capacity((sprite.width() * sprite.height()) as usize);
        for y in 0..sprite.height() {
            for x in 0..sprite.width() {
                if sprite.is_transparent(x, y) {
                    texels.push(None);
                    continue;
                }
                texels.push(sprite.pixel(x, y).map(|(r, g, b, _)| [r, g, b]));
            }
        }
        Self {
            width: sprite.width(),
            texels,
        }
    }

    #[inline]
    fn get(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.texels
            .get((y * self.width + x) as usize)
            .copied()
            .flatten()
    }
}

pub struct Ship {
    pub x: f32,
    pub y: f32,
    speed: f32,
    ceiling: f32,
    sprite: Texture,
    glitch: GlitchCache,
    fire: SpriteSheet,
    mode: ShipMode,
}

impl Ship {
    /// Place the ship in the lower middle of a `width x height` frame
    pub fn new(sprite: Texture, fire: SpriteSheet, width: u32, height: u32) -> Self {
        let glitch = GlitchCache::from_sprite(&sprite);
        Self {
            x: (width as f32 / 2.2).floor(),
            y: (height as f32 / 1.2).floor(),
            speed: 150.0,
            ceiling: 0.0,
            sprite,
            glitch,
            fire,
            mode: ShipMode::for_intro_tick(0),
        }
    }

    /// Pixels per second
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Highest row the ship may move up to
    pub fn with_ceiling(mut self, ceiling: i32) -> Self {
        self.ceiling = ceiling as f32;
        self
    }

    #[cfg(test)]
    pub fn mode(&self) -> ShipMode {
        self.mode
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.sprite.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.sprite.height()
    }

    /// Movement is only accepted once the intro is over
    pub fn controllable(&self) -> bool {
        matches!(self.mode, ShipMode::FireAnimating { .. })
    }

    /// Centre of the sprite, where projectiles and the laser leave from
    pub fn muzzle(&self) -> (f32, f32) {
        (
            self.x + (self.width() / 2) as f32,
            self.y + (self.height() / 2) as f32,
        )
    }

    /// Advance the intro / thruster animation by one tick
    pub fn advance(&mut self) {
        self.mode = self.mode.next(self.fire.frame_count());
    }

    /// Apply directional input for a frame of `dt` seconds, clamped to the
    /// frame and below the ceiling
    pub fn steer(&mut self, input: &FrameInput, dt: f32, width: u32, height: u32) {
        let step = self.speed * dt;
        let max_x = (width as f32 - self.width() as f32).max(0.0);
        let max_y = (height as f32 - self.height() as f32).max(0.0);
        let min_y = self.ceiling.min(max_y);

        if input.up {
            self.y = (self.y - step).max(min_y);
        }
        if input.down {
            self.y = (self.y + step).min(max_y);
        }
        if input.left {
            self.x = (self.x - step).max(0.0);
        }
        if input.right {
            self.x = (self.x + step).min(max_x);
        }
    }

    /// Fly straight up, ignoring bounds (used by the ending)
    pub fn lift(&mut self, amount: f32) {
        self.y -= amount;
    }

    /// True once the whole sprite is above the top edge
    pub fn is_above_screen(&self) -> bool {
        self.y + (self.height() as f32) < 0.0
    }

    pub fn render(&self, buffer: &mut PixelBuffer) {
        let x = self.x as i32;
        let y = self.y as i32;

        match self.mode {
            ShipMode::Normal { .. } => buffer.blit_sprite(&self.sprite, x, y),
            ShipMode::Glitching { .. } => self.render_glitch(buffer, x, y),
            ShipMode::FireAnimating { frame, .. } => {
                let (fx, fy) = self.fire.frame_origin(frame, 0);
                buffer.blit_sprite_region(
                    self.fire.texture(),
                    fx,
                    fy,
                    self.fire.frame_width(),
                    self.fire.frame_height(),
                    x,
                    y + self.height() as i32 - FIRE_OVERLAP,
                );
                buffer.blit_sprite(&self.sprite, x, y);
            },
        }
    }

    /// Scatter the sprite's channels through a sinusoidal warp: blue a
    /// quarter-width left, red displaced on both axes, green a quarter-width
    /// right
    fn render_glitch(&self, buffer: &mut PixelBuffer, origin_x: i32, origin_y: i32) {
        let quarter = (self.width() / 4) as i32;

        for j in 0..self.height() {
            let y = origin_y + j as i32;
            let shift_x = (y as f32 * GLITCH_FREQUENCY).sin() * GLITCH_AMPLITUDE;

            for i in 0..self.width() {
                let Some([r, g, b]) = self.glitch.get(i, j) else {
                    continue;
                };
                let x = origin_x + i as i32;
                let x_new = (x as f32 + shift_x) as i32;
                let y_new = (y as f32 + (x as f32 * GLITCH_FREQUENCY).sin() * GLITCH_AMPLITUDE) as i32;

                buffer.set_channel(x_new - quarter, y, Channel::Blue, b);
                buffer.set_channel(x_new, y_new, Channel::Red, r);
                buffer.set_channel(x_new + quarter, y, Channel::Green, g);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_sprite(width: u32, height: u32, color: (u8, u8, u8)) -> Texture {
        let mut tex = Texture::new(width, height);
        for y in 0..height {
            for x in 0..width {
                tex.set_pixel(x, y, color.0, color.1, color.2, 255);
            }
        }
        tex
    }

    fn ship() -> Ship {
        // 4 flame frames of 2x16
        let fire = SpriteSheet::new(solid_sprite(8, 16, (255, 128, 0)), 4, 1);
        Ship::new(solid_sprite(8, 8, (10, 20, 30)), fire, 100, 100).with_ceiling(20)
    }

    #[test]
    fn test_intro_schedule() {
        assert_eq!(ShipMode::for_intro_tick(0), ShipMode::Normal { tick: 0 });
        assert_eq!(ShipMode::for_intro_tick(2), ShipMode::Normal { tick: 2 });
        assert_eq!(ShipMode::for_intro_tick(3), ShipMode::Glitching { tick: 3 });
        assert_eq!(ShipMode::for_intro_tick(66), ShipMode::Glitching { tick: 66 });
        assert_eq!(ShipMode::for_intro_tick(67), ShipMode::Normal { tick: 67 });
        assert_eq!(ShipMode::for_intro_tick(69), ShipMode::Normal { tick: 69 });
        assert_eq!(ShipMode::for_intro_tick(70), ShipMode::Glitching { tick: 70 });
        assert_eq!(ShipMode::for_intro_tick(199), ShipMode::Glitching { tick: 199 });
        assert!(matches!(
            ShipMode::for_intro_tick(200),
            ShipMode::FireAnimating { frame: 0, .. }
        ));
    }

    #[test]
    fn test_fire_animation_is_terminal_and_cycles() {
        let mut ship = ship();
        for _ in 0..GLITCH_DURATION {
            assert!(!ship.controllable());
            ship.advance();
        }
        assert!(ship.controllable());

        let mut frames = Vec::new();
        for _ in 0..(FIRE_FRAME_TICKS * 5) {
            if let ShipMode::FireAnimating { frame, .. } = ship.mode() {
                frames.push(frame);
            }
            ship.advance();
            assert!(ship.controllable());
        }
        // Each frame is held for FIRE_FRAME_TICKS ticks, wrapping after 4
        assert_eq!(frames[0], 0);
        assert_eq!(frames[FIRE_FRAME_TICKS as usize - 1], 0);
        assert_eq!(frames[FIRE_FRAME_TICKS as usize], 1);
        assert_eq!(frames[FIRE_FRAME_TICKS as usize * 4], 0);
    }

    #[test]
    fn test_steer_respects_bounds() {
        let mut ship = ship();
        let up_left = FrameInput {
            up: true,
            left: true,
            ..FrameInput::default()
        };
        ship.steer(&up_left, 10.0, 100, 100);
        assert_eq!(ship.x, 0.0);
        assert_eq!(ship.y, 20.0);

        let down_right = FrameInput {
            down: true,
            right: true,
            ..FrameInput::default()
        };
        ship.steer(&down_right, 10.0, 100, 100);
        assert_eq!(ship.x, 92.0);
        assert_eq!(ship.y, 92.0);
    }

    #[test]
    fn test_muzzle_is_sprite_centre() {
        let mut ship = ship();
        ship.x = 10.0;
        ship.y = 40.0;
        assert_eq!(ship.muzzle(), (14.0, 44.0));
    }

    #[test]
    fn test_normal_render_blits_sprite() {
        let ship = ship();
        let mut buffer = PixelBuffer::with_size(100, 100);
        ship.render(&mut buffer);
        let (x, y) = (ship.x as i32, ship.y as i32);
        assert_eq!(buffer.get_pixel(x, y), Some((10, 20, 30)));
        assert_eq!(buffer.get_pixel(x + 7, y + 7), Some((10, 20, 30)));
    }

    #[test]
    fn test_glitch_render_writes_single_channels() {
        let mut ship = ship();
        for _ in 0..GLITCH_FREE_TICKS {
            ship.advance();
        }
        assert!(matches!(ship.mode(), ShipMode::Glitching { .. }));

        let mut buffer = PixelBuffer::with_size(100, 100);
        ship.render(&mut buffer);

        let (x, y) = (ship.x as i32, ship.y as i32);
        let x_new = (x as f32 + (y as f32 * GLITCH_FREQUENCY).sin() * GLITCH_AMPLITUDE) as i32;
        // Blue lands two pixels left of the warped column (quarter of 8)
        let (_, _, b) = buffer.get_pixel(x_new - 2, y).unwrap();
        assert_eq!(b, 30);
    }

    #[test]
    fn test_fire_render_draws_flames_below() {
        let mut ship = ship();
        for _ in 0..GLITCH_DURATION {
            ship.advance();
        }
        let mut buffer = PixelBuffer::with_size(100, 100);
        ship.x = 10.0;
        ship.y = 10.0;
        ship.render(&mut buffer);
        // Flames start 8px above the bottom edge, hidden under the hull
        assert_eq!(buffer.get_pixel(10, 17), Some((10, 20, 30)));
        assert_eq!(buffer.get_pixel(10, 18), Some((255, 128, 0)));
        assert_eq!(buffer.get_pixel(11, 25), Some((255, 128, 0)));
        assert_eq!(buffer.get_pixel(12, 25), Some((0, 0, 0)));
    }

    #[test]
    fn test_leaves_screen_when_lifted() {
        let mut ship = ship();
        ship.y = 0.0;
        ship.lift(8.0);
        assert!(!ship.is_above_screen());
        ship.lift(1.0);
        assert!(ship.is_above_screen());
    }
}
