//! Particle System for explosion bursts
//!
//! Particles are integrated once per tick (not per second): velocity is
//! damped by `drag` and pulled down by `gravity` every step.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::display::PixelBuffer;
use crate::pool::SlotPool;

const PARTICLE_COLOR: (u8, u8, u8) = (255, 0, 0);

/// A single particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining lifetime in ticks
    pub life: u32,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, life: u32) -> Self {
        Self { pos, vel, life }
    }

    /// Check if particle is still alive
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0
    }
}

/// Particle system manager
pub struct ParticleSystem {
    particles: SlotPool<Particle>,
    gravity: f32,
    drag: f32,
}

impl ParticleSystem {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: SlotPool::with_capacity(capacity),
            gravity: 0.0,
            drag: 1.0,
        }
    }

    /// Set downward acceleration added to vertical velocity each tick
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the per-tick velocity multiplier (0.995 = slight drag)
    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    /// Emit a single particle; dropped if every slot is taken
    #[cfg(test)]
    pub fn emit(&mut self, particle: Particle) -> bool {
        self.particles.insert(particle).is_ok()
    }

    /// Fill every free slot with a particle flying out of `pos` at a random
    /// angle. Speed is `max_speed * [0.3, 1.0)`, lifetime is
    /// `[min_life, 2 * min_life)` ticks. Returns the number emitted.
    pub fn emit_burst_random(
        &mut self,
        pos: Vec2,
        max_speed: f32,
        min_life: u32,
        rng: &mut impl Rng,
    ) -> usize {
        self.particles.fill(|| {
            let angle = rng.random::<f32>() * TAU;
            let speed = (0.3 + 0.7 * rng.random::<f32>()) * max_speed;
            let life = min_life + rng.random_range(0..min_life.max(1));
            let vel = Vec2::new(angle.cos() * speed, angle.sin() * speed);
            Particle::new(pos, vel, life.max(1))
        })
    }

    /// Advance all particles one tick; particles leaving `width x height`
    /// or running out of life are released
    pub fn update(&mut self, width: u32, height: u32) {
        let (w, h) = (width as f32, height as f32);
        let drag = self.drag;
        let gravity = self.gravity;

        self.particles.retain(|p| {
            p.life = p.life.saturating_sub(1);
            p.pos += p.vel;
            p.vel *= drag;
            p.vel.y += gravity;

            let inside = p.pos.x >= 0.0 && p.pos.x <= w && p.pos.y >= 0.0 && p.pos.y <= h;
            p.is_alive() && inside
        });
    }

    /// Render each particle as a streak from its previous position
    pub fn render(&self, buffer: &mut PixelBuffer) {
        let (r, g, b) = PARTICLE_COLOR;
        for (_, p) in self.particles.iter() {
            let tail = p.pos - p.vel;
            buffer.line(
                tail.x as i32,
                tail.y as i32,
                p.pos.x as i32,
                p.pos.y as i32,
                r,
                g,
                b,
            );
        }
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().map(|(_, p)| p)
    }

    /// Get particle count
    pub fn count(&self) -> usize {
        self.particles.len()
    }
}
