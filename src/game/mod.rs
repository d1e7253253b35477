//! Game core
//!
//! `Game` owns every entity and advances them one tick per frame. It never
//! touches SDL: input arrives as a `FrameInput` snapshot and output is
//! written into a `PixelBuffer`.

mod background;
mod ending;
mod enemies;
mod ship;
mod stars;
mod weapons;

pub use background::Background;
pub use ending::{Ending, EndingPhase};
pub use enemies::EnemyWave;
pub use ship::Ship;
pub use stars::Starfield;
pub use weapons::Weapons;

use rand_pcg::Pcg32;

use crate::assets::GameAssets;
use crate::config::GameConfig;
use crate::display::PixelBuffer;
use crate::noise::generate_perlin_noise;
use crate::particles::ParticleSystem;

const PARTICLE_DRAG: f32 = 0.995;
const PARTICLE_GRAVITY: f32 = 0.05;

/// Width of the debug selector strip at the right edge
const SELECTOR_WIDTH: u32 = 15;
/// Rows painted on either side of the mouse
const SELECTOR_REACH: i32 = 2;
const SELECTOR_COLOR: (u8, u8, u8) = (255, 0, 0);

/// Everything the core reads from the player in one frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// Shift+S this frame
    pub snapshot: bool,
    pub mouse_x: i32,
    pub mouse_y: i32,
    pub left_button: bool,
    pub right_button: bool,
}

pub struct Game {
    width: u32,
    height: u32,
    tick: u64,
    rng: Pcg32,

    background: Background,
    starfield: Starfield,
    ship: Ship,
    weapons: Weapons,
    enemies: EnemyWave,
    particles: ParticleSystem,
    ending: Ending,

    /// Mouse row while both buttons are held
    selector: Option<i32>,
}

impl Game {
    pub fn new(config: &GameConfig, assets: GameAssets, mut rng: Pcg32) -> Self {
        let (width, height) = (config.width, config.height);

        let noise = generate_perlin_noise(config.noise_octaves, config.noise_persistence, &mut rng);
        log::debug!(
            "Generated {}x{} noise ({} octaves, persistence {})",
            noise.width(),
            noise.height(),
            config.noise_octaves,
            config.noise_persistence
        );

        let starfield = Starfield::new(config.max_stars, width, height, &mut rng);
        let enemies = EnemyWave::new(config.max_enemies, width, height, &mut rng);
        let ship = Ship::new(assets.ship, assets.fire, width, height)
            .with_speed(config.ship_speed)
            .with_ceiling(config.ship_ceiling);
        let weapons =
            Weapons::new(config.max_projectiles).with_laser_gate(config.laser_requires_full_volley);
        let particles = ParticleSystem::new(config.max_particles)
            .with_drag(PARTICLE_DRAG)
            .with_gravity(PARTICLE_GRAVITY);

        Self {
            width,
            height,
            tick: 0,
            rng,
            background: assets.background,
            starfield,
            ship,
            weapons,
            enemies,
            particles,
            ending: Ending::new(assets.end_image, noise),
            selector: None,
        }
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[cfg(test)]
    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn weapons(&self) -> &Weapons {
        &self.weapons
    }

    #[cfg(test)]
    pub fn enemies(&self) -> &EnemyWave {
        &self.enemies
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn ending_phase(&self) -> EndingPhase {
        self.ending.phase()
    }

    /// Advance the simulation one tick. `dt` (seconds) only scales ship
    /// movement; everything else moves a fixed step per tick.
    pub fn update(&mut self, input: &FrameInput, dt: f32) {
        self.selector = (input.left_button && input.right_button).then_some(input.mouse_y);

        let playing = self.ending.is_playing();
        if playing && self.ship.controllable() {
            self.ship.steer(input, dt, self.width, self.height);
        }

        let laser_target = (playing && input.left_button).then_some((input.mouse_x, input.mouse_y));
        self.weapons.trigger(playing && input.fire, self.ship.muzzle());

        self.starfield.update(&mut self.rng);
        self.ship.advance();

        match laser_target {
            Some(target) => {
                self.weapons.fire_laser(
                    self.ship.muzzle(),
                    target,
                    self.width,
                    self.height,
                    &mut self.enemies,
                );
            },
            None => self.weapons.holster(),
        }

        let hits = self.weapons.update(&mut self.enemies);
        if hits > 0 {
            log::debug!("{} projectile hit(s) on tick {}", hits, self.tick);
        }
        self.enemies.update(self.width, &mut self.particles, &mut self.rng);

        if self.enemies.all_defeated() {
            self.ending.start();
        }
        self.ending.update(&mut self.ship, self.height);

        self.particles.update(self.width, self.height);
        self.tick += 1;
    }

    /// Composite the frame, back to front
    pub fn render(&self, buffer: &mut PixelBuffer) {
        self.background.render(buffer);
        self.render_selector(buffer);
        self.starfield.render(buffer);
        self.ship.render(buffer);
        self.weapons.render(buffer);
        self.enemies.render(buffer);
        self.particles.render(buffer);
        self.ending.render(buffer);
    }

    fn render_selector(&self, buffer: &mut PixelBuffer) {
        let Some(y) = self.selector else {
            return;
        };
        let (r, g, b) = SELECTOR_COLOR;
        let x = buffer.width().saturating_sub(SELECTOR_WIDTH) as i32;
        buffer.fill_rect(
            x,
            y - SELECTOR_REACH,
            SELECTOR_WIDTH,
            (SELECTOR_REACH * 2 + 1) as u32,
            r,
            g,
            b,
        );
    }
}
