use crate::display::PixelBuffer;
use crate::pool::SlotPool;
use crate::util::distance;

use super::enemies::EnemyWave;

/// Initial projectile speed in pixels per tick
pub const PROJECTILE_SPEED: f32 = 10.0;
/// Projectiles accelerate by `1 / PROJECTILE_DRAG` each tick
const PROJECTILE_DRAG: f32 = 0.995;

const PROJECTILE_COLOR: (u8, u8, u8) = (255, 0, 0);
const LASER_COLOR: (u8, u8, u8) = (255, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

/// Fixed-capacity projectile volley with a trigger latch: holding fire
/// spawns exactly one projectile per press
pub struct Weapons {
    projectiles: SlotPool<Projectile>,
    latched: bool,
    laser: Option<Beam>,
    laser_requires_full_volley: bool,
}

/// A laser beam drawn for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

impl Weapons {
    pub fn new(capacity: usize) -> Self {
        Self {
            projectiles: SlotPool::with_capacity(capacity),
            latched: false,
            laser: None,
            laser_requires_full_volley: true,
        }
    }

    /// With `false` the laser fires regardless of how many projectiles are
    /// in flight
    pub fn with_laser_gate(mut self, requires_full_volley: bool) -> Self {
        self.laser_requires_full_volley = requires_full_volley;
        self
    }

    #[cfg(test)]
    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter().map(|(_, p)| p)
    }

    pub fn in_flight(&self) -> usize {
        self.projectiles.len()
    }

    #[cfg(test)]
    pub fn beam(&self) -> Option<Beam> {
        self.laser
    }

    /// Feed the fire button state. A projectile spawns at `muzzle` on the
    /// first held frame that finds a free slot; the latch then holds until
    /// the button is released.
    pub fn trigger(&mut self, held: bool, muzzle: (f32, f32)) -> bool {
        if !held {
            self.latched = false;
            return false;
        }
        if self.latched {
            return false;
        }

        let projectile = Projectile {
            x: muzzle.0,
            y: muzzle.1,
            speed: PROJECTILE_SPEED,
        };
        match self.projectiles.insert(projectile) {
            Ok(_) => {
                self.latched = true;
                true
            },
            Err(_) => false,
        }
    }

    /// Drop the beam drawn last frame
    pub fn holster(&mut self) {
        self.laser = None;
    }

    /// Fire the laser from `muzzle` at `target` if the gate allows it.
    /// Every living enemy whose hit radius covers the target is destroyed.
    pub fn fire_laser(
        &mut self,
        muzzle: (f32, f32),
        target: (i32, i32),
        width: u32,
        height: u32,
        enemies: &mut EnemyWave,
    ) -> bool {
        self.laser = None;
        if self.laser_requires_full_volley && !self.projectiles.is_full() {
            return false;
        }

        let tx = target.0.clamp(0, width as i32 - 1);
        let ty = target.1.clamp(0, height as i32 - 1);

        for enemy in enemies.iter_mut() {
            let Some(health) = enemy.health() else {
                continue;
            };
            let reach = enemy.radius as f32 * health as f32;
            if distance(tx as f32, ty as f32, enemy.x as f32, enemy.y as f32) <= reach {
                enemy.kill();
            }
        }

        self.laser = Some(Beam {
            from: (muzzle.0 as i32, muzzle.1 as i32),
            to: (tx, ty),
        });
        true
    }

    /// Move projectiles, resolve hits and release those that left the top
    /// edge or struck an enemy. Returns the number of hits.
    pub fn update(&mut self, enemies: &mut EnemyWave) -> usize {
        if self.projectiles.is_empty() {
            return 0;
        }

        let mut hits = 0;
        self.projectiles.retain(|p| {
            p.y -= p.speed;
            p.speed /= PROJECTILE_DRAG;
            if p.y < 0.0 {
                return false;
            }

            let struck = enemies.iter_mut().find(|enemy| {
                enemy.health().is_some_and(|health| {
                    let reach = enemy.radius as f32 * health as f32;
                    distance(p.x, p.y, enemy.x as f32, enemy.y as f32) <= reach
                })
            });
            match struck {
                Some(enemy) => {
                    enemy.hit();
                    hits += 1;
                    false
                },
                None => true,
            }
        });
        hits
    }

    pub fn render(&self, buffer: &mut PixelBuffer) {
        let (r, g, b) = PROJECTILE_COLOR;
        for (_, p) in self.projectiles.iter() {
            let (x, y) = (p.x as i32, p.y as i32);
            buffer.line(x, (p.y - p.speed) as i32, x, y, r, g, b);
        }

        if let Some(beam) = self.laser {
            let (r, g, b) = LASER_COLOR;
            buffer.line(beam.from.0, beam.from.1, beam.to.0, beam.to.1, r, g, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::enemies::Enemy;

    fn wave_with(x: i32, y: i32) -> EnemyWave {
        EnemyWave::from_enemies(vec![Enemy::new(x, y)])
    }

    #[test]
    fn test_trigger_latch() {
        let mut weapons = Weapons::new(3);
        assert!(weapons.trigger(true, (132.0, 532.0)));
        // Still held: no auto-fire
        assert!(!weapons.trigger(true, (132.0, 532.0)));
        assert!(!weapons.trigger(false, (132.0, 532.0)));
        assert!(weapons.trigger(true, (132.0, 532.0)));
        assert_eq!(weapons.in_flight(), 2);

        let p = *weapons.projectiles().next().unwrap();
        assert_eq!((p.x, p.y, p.speed), (132.0, 532.0, PROJECTILE_SPEED));
    }

    #[test]
    fn test_full_pool_leaves_latch_open() {
        let mut weapons = Weapons::new(1);
        assert!(weapons.trigger(true, (32.0, 532.0)));
        weapons.trigger(false, (32.0, 532.0));
        // Pool full: the press is not consumed
        assert!(!weapons.trigger(true, (32.0, 532.0)));

        let mut wave = EnemyWave::from_enemies(Vec::new());
        for _ in 0..60 {
            weapons.update(&mut wave);
        }
        assert_eq!(weapons.in_flight(), 0);
        // Same press, now with a free slot
        assert!(weapons.trigger(true, (32.0, 532.0)));
    }

    #[test]
    fn test_projectiles_accelerate_and_leave() {
        let mut weapons = Weapons::new(3);
        let mut wave = EnemyWave::from_enemies(Vec::new());
        weapons.trigger(true, (32.0, 40.0));

        weapons.update(&mut wave);
        let p = *weapons.projectiles().next().unwrap();
        assert_eq!(p.y, 30.0);
        assert!(p.speed > PROJECTILE_SPEED);

        for _ in 0..3 {
            weapons.update(&mut wave);
        }
        assert_eq!(weapons.in_flight(), 0);
    }

    #[test]
    fn test_flight_matches_geometric_sum() {
        let mut weapons = Weapons::new(3);
        let mut wave = EnemyWave::from_enemies(Vec::new());
        weapons.trigger(true, (100.0, 700.0));

        let ticks = 20;
        for _ in 0..ticks {
            weapons.update(&mut wave);
        }

        // y_n = y_0 - sum_{k<n} v / drag^k
        let expected = 700.0
            - (0..ticks)
                .map(|k| f64::from(PROJECTILE_SPEED) / f64::from(PROJECTILE_DRAG).powi(k))
                .sum::<f64>();
        let p = *weapons.projectiles().next().unwrap();
        assert!((f64::from(p.y) - expected).abs() < 1e-2, "{} vs {}", p.y, expected);
        assert_eq!(p.x, 100.0);
    }

    #[test]
    fn test_projectile_hits_once() {
        let mut weapons = Weapons::new(3);
        // Projectile travels straight up the column x = 132
        let mut wave = wave_with(132, 300);
        weapons.trigger(true, (132.0, 332.0));

        let mut hits = 0;
        for _ in 0..40 {
            hits += weapons.update(&mut wave);
        }
        assert_eq!(hits, 1);
        assert_eq!(weapons.in_flight(), 0);
        assert_eq!(wave.iter().next().unwrap().health(), Some(2));
    }

    #[test]
    fn test_laser_gated_on_full_volley() {
        let mut weapons = Weapons::new(2);
        let mut wave = wave_with(400, 200);

        assert!(!weapons.fire_laser((0.0, 0.0), (400, 200), 800, 800, &mut wave));
        assert!(weapons.beam().is_none());

        weapons.trigger(true, (32.0, 732.0));
        weapons.trigger(false, (32.0, 732.0));
        weapons.trigger(true, (32.0, 732.0));
        assert!(weapons.fire_laser((10.0, 10.0), (400, 200), 800, 800, &mut wave));
        assert_eq!(wave.iter().next().unwrap().health(), None);
        assert_eq!(
            weapons.beam(),
            Some(Beam {
                from: (10, 10),
                to: (400, 200)
            })
        );
    }

    #[test]
    fn test_ungated_laser_clamps_target() {
        let mut weapons = Weapons::new(3).with_laser_gate(false);
        let mut wave = wave_with(50, 50);
        assert!(weapons.fire_laser((0.0, 0.0), (2000, -5), 800, 600, &mut wave));
        assert_eq!(weapons.beam().unwrap().to, (799, 0));
        // Out of reach
        assert_eq!(wave.iter().next().unwrap().health(), Some(3));
    }

    #[test]
    fn test_render_streak() {
        let mut weapons = Weapons::new(3);
        weapons.trigger(true, (32.0, 32.0));
        let mut buffer = PixelBuffer::with_size(64, 64);
        weapons.render(&mut buffer);
        assert_eq!(buffer.get_pixel(32, 32), Some((255, 0, 0)));
        assert_eq!(buffer.get_pixel(32, 22), Some((255, 0, 0)));
        assert_eq!(buffer.get_pixel(32, 33), Some((0, 0, 0)));
    }
}
