use glam::Vec2;
use rand::Rng;

use crate::display::PixelBuffer;
use crate::particles::ParticleSystem;

pub const ENEMY_RADIUS: i32 = 15;
pub const ENEMY_HEALTH: u32 = 3;
/// Horizontal drift in pixels per tick
const DRIFT: i32 = 2;
/// Ticks between radius decrements while dying
const SHRINK_TICKS: u32 = 5;
const EXPLOSION_SPEED: f32 = 10.0;
const EXPLOSION_MIN_LIFE: u32 = 100;

const ENEMY_COLOR: (u8, u8, u8) = (255, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Alive { health: u32 },
    /// Shrinking one pixel of radius every `SHRINK_TICKS` ticks
    Dying { countdown: u32 },
    Defeated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    state: EnemyState,
}

impl Enemy {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            radius: ENEMY_RADIUS,
            state: EnemyState::Alive {
                health: ENEMY_HEALTH,
            },
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    /// Remaining health, `None` once the enemy can no longer be hit
    pub fn health(&self) -> Option<u32> {
        match self.state {
            EnemyState::Alive { health } => Some(health),
            _ => None,
        }
    }

    pub fn hit(&mut self) {
        if let EnemyState::Alive { health } = self.state {
            self.state = match health.saturating_sub(1) {
                0 => EnemyState::Dying { countdown: 0 },
                health => EnemyState::Alive { health },
            };
        }
    }

    /// Take all remaining health at once
    pub fn kill(&mut self) {
        if matches!(self.state, EnemyState::Alive { .. }) {
            self.state = EnemyState::Dying { countdown: 0 };
        }
    }

    /// Returns true on the tick the enemy finishes dying
    fn update(&mut self, width: u32) -> bool {
        if self.state != EnemyState::Defeated && self.radius > 0 {
            self.x = (self.x + DRIFT).rem_euclid(width.max(1) as i32);
        }

        let EnemyState::Dying { countdown } = self.state else {
            return false;
        };
        if countdown > 0 {
            self.state = EnemyState::Dying {
                countdown: countdown - 1,
            };
            return false;
        }

        self.radius -= 1;
        if self.radius <= 0 {
            self.radius = 0;
            self.state = EnemyState::Defeated;
            true
        } else {
            self.state = EnemyState::Dying {
                countdown: SHRINK_TICKS - 1,
            };
            false
        }
    }

    fn render(&self, buffer: &mut PixelBuffer) {
        let radius = match self.state {
            EnemyState::Alive { health } => self.radius * health as i32,
            EnemyState::Dying { .. } => self.radius,
            EnemyState::Defeated => return,
        };
        let (r, g, b) = ENEMY_COLOR;
        buffer.draw_circle(self.x, self.y, radius, r, g, b);
    }
}

/// The set of enemies on screen
pub struct EnemyWave {
    enemies: Vec<Enemy>,
}

impl EnemyWave {
    /// Spawn `count` enemies in the upper half of the frame
    pub fn new(count: usize, width: u32, height: u32, rng: &mut impl Rng) -> Self {
        let max_x = (width as i32).max(51);
        let max_y = (height as i32 / 2).max(101);
        let enemies = (0..count)
            .map(|_| Enemy::new(rng.random_range(50..max_x), rng.random_range(100..max_y)))
            .collect();
        Self { enemies }
    }

    #[cfg(test)]
    pub fn from_enemies(enemies: Vec<Enemy>) -> Self {
        Self { enemies }
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.enemies.iter_mut()
    }

    pub fn all_defeated(&self) -> bool {
        self.enemies
            .iter()
            .all(|e| e.state == EnemyState::Defeated)
    }

    /// Drift, shrink the dying and blow up the ones that just finished
    pub fn update(&mut self, width: u32, particles: &mut ParticleSystem, rng: &mut impl Rng) {
        for enemy in &mut self.enemies {
            if enemy.update(width) {
                let at = Vec2::new(enemy.x as f32, enemy.y as f32);
                let emitted =
                    particles.emit_burst_random(at, EXPLOSION_SPEED, EXPLOSION_MIN_LIFE, rng);
                log::debug!("Enemy destroyed at ({}, {}), {} particles", enemy.x, enemy.y, emitted);
            }
        }
    }

    pub fn render(&self, buffer: &mut PixelBuffer) {
        for enemy in &self.enemies {
            enemy.render(buffer);
        }
    }
}
