use rand::Rng;

use crate::display::PixelBuffer;

/// Ticks between brightness refreshes
pub const TWINKLE_PERIOD: u32 = 30;
/// Stars brighter than this get a sparkle cross
const SPARKLE_THRESHOLD: u16 = 220;
/// Keeps stars off the top and left edges
const EDGE_MARGIN: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Star {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    /// 1..=256; clamped to 255 when drawn
    pub brightness: u16,
}

/// Static starfield whose brightness twinkles every `TWINKLE_PERIOD` ticks
pub struct Starfield {
    stars: Vec<Star>,
    countdown: u32,
}

impl Starfield {
    pub fn new(count: usize, width: u32, height: u32, rng: &mut impl Rng) -> Self {
        let max_x = (width as i32).max(EDGE_MARGIN + 1);
        let max_y = (height as i32).max(EDGE_MARGIN + 1);
        let stars = (0..count)
            .map(|_| Star {
                x: rng.random_range(EDGE_MARGIN..max_x),
                y: rng.random_range(EDGE_MARGIN..max_y),
                radius: 1,
                brightness: random_brightness(rng),
            })
            .collect();

        Self {
            stars,
            countdown: TWINKLE_PERIOD - 1,
        }
    }

    #[cfg(test)]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Re-roll every brightness at once when the countdown expires
    pub fn update(&mut self, rng: &mut impl Rng) {
        if self.countdown == 0 {
            for star in &mut self.stars {
                star.brightness = random_brightness(rng);
            }
            self.countdown = TWINKLE_PERIOD - 1;
        } else {
            self.countdown -= 1;
        }
    }

    pub fn render(&self, buffer: &mut PixelBuffer) {
        for star in &self.stars {
            let v = star.brightness.min(255) as u8;
            buffer.draw_circle(star.x, star.y, star.radius, v, v, v);
            if star.brightness > SPARKLE_THRESHOLD {
                buffer.line(star.x - 2, star.y, star.x + 2, star.y, v, v, v);
                buffer.line(star.x, star.y - 2, star.x, star.y + 2, v, v, v);
            }
        }
    }
}

#[inline]
fn random_brightness(rng: &mut impl Rng) -> u16 {
    rng.random_range(1..=256)
}
