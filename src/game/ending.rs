//! Ending sequence
//!
//! Once the last enemy is down the ship flies off the top of the screen,
//! two white bands close in from the top and bottom, and the end image
//! bleeds through wherever its brightness is close to the noise field's.
//! The closeness threshold widens each tick until the whole image shows.

use crate::display::PixelBuffer;
use crate::texture::Texture;
use crate::util::brightness_delta;

use super::ship::Ship;

/// Height the top band grows to
pub const BAND_TOP: u32 = 300;
/// Row the bottom band's upper edge rises to
pub const BAND_BOTTOM: u32 = 500;
/// Starting brightness-difference cutoff
pub const REVEAL_START: u32 = 15;
/// Ship climb speed while departing, pixels per tick
const DEPART_SPEED: f32 = 3.0;

const BAND_COLOR: (u8, u8, u8) = (255, 255, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndingPhase {
    Playing,
    Departing,
    Converging { top: u32, bottom: u32 },
    Revealing { threshold: u32 },
    Done,
}

pub struct Ending {
    phase: EndingPhase,
    image: Texture,
    noise: Texture,
    revealed: Vec<bool>,
}

impl Ending {
    pub fn new(image: Texture, noise: Texture) -> Self {
        let revealed = vec![false; (image.width() * image.height()) as usize];
        Self {
            phase: EndingPhase::Playing,
            image,
            noise,
            revealed,
        }
    }

    #[inline]
    pub fn phase(&self) -> EndingPhase {
        self.phase
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == EndingPhase::Playing
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|&&r| r).count()
    }

    /// Leave `Playing`; later calls are no-ops
    pub fn start(&mut self) {
        if self.is_playing() {
            log::info!("All enemies defeated, starting ending");
            self.phase = EndingPhase::Departing;
        }
    }

    pub fn update(&mut self, ship: &mut Ship, height: u32) {
        let top_limit = BAND_TOP.min(height);
        let bottom_limit = BAND_BOTTOM.min(height);

        self.phase = match self.phase {
            EndingPhase::Playing | EndingPhase::Done => return,
            EndingPhase::Departing => {
                ship.lift(DEPART_SPEED);
                if ship.is_above_screen() {
                    log::info!("Ship departed, closing bands");
                    EndingPhase::Converging {
                        top: 0,
                        bottom: height,
                    }
                } else {
                    EndingPhase::Departing
                }
            },
            EndingPhase::Converging { top, bottom } => {
                let top = (top + 1).min(top_limit);
                let bottom = bottom.saturating_sub(1).max(bottom_limit);
                if top == top_limit && bottom == bottom_limit {
                    log::info!("Bands closed, revealing end image");
                    EndingPhase::Revealing {
                        threshold: REVEAL_START,
                    }
                } else {
                    EndingPhase::Converging { top, bottom }
                }
            },
            EndingPhase::Revealing { threshold } => {
                self.reveal(threshold);
                if threshold >= 255 {
                    log::info!("End image fully revealed ({} pixels)", self.revealed_count());
                    EndingPhase::Done
                } else {
                    EndingPhase::Revealing {
                        threshold: threshold + 1,
                    }
                }
            },
        };
    }

    /// Mark every opaque end-image pixel within `threshold` brightness of
    /// the (tiled) noise field
    fn reveal(&mut self, threshold: u32) {
        let (nw, nh) = (self.noise.width().max(1), self.noise.height().max(1));
        let width = self.image.width();

        for j in 0..self.image.height() {
            for i in 0..width {
                let idx = (j * width + i) as usize;
                if self.revealed[idx] {
                    continue;
                }
                let Some((r, g, b, a)) = self.image.pixel(i, j) else {
                    continue;
                };
                if a == 0 {
                    continue;
                }
                let noise = self
                    .noise
                    .pixel(i % nw, j % nh)
                    .map_or((0, 0, 0), |(nr, ng, nb, _)| (nr, ng, nb));
                if u32::from(brightness_delta(noise, (r, g, b))) <= threshold {
                    self.revealed[idx] = true;
                }
            }
        }
    }

    pub fn render(&self, buffer: &mut PixelBuffer) {
        let height = buffer.height();
        let (top, bottom) = match self.phase {
            EndingPhase::Playing | EndingPhase::Departing => return,
            EndingPhase::Converging { top, bottom } => (top, bottom),
            EndingPhase::Revealing { .. } | EndingPhase::Done => {
                (BAND_TOP.min(height), BAND_BOTTOM.min(height))
            },
        };

        let width = buffer.width();
        let (r, g, b) = BAND_COLOR;
        buffer.fill_rect(0, 0, width, top, r, g, b);
        if bottom + 1 < height {
            buffer.fill_rect(0, bottom as i32 + 1, width, height - bottom - 1, r, g, b);
        }

        let image_width = self.image.width();
        for (idx, &shown) in self.revealed.iter().enumerate() {
            if !shown {
                continue;
            }
            let i = idx as u32 % image_width;
            let j = idx as u32 / image_width;
            if let Some((r, g, b, _)) = self.image.pixel(i, j) {
                buffer.set_pixel(i as i32, j as i32, r, g, b);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::SpriteSheet;

    fn ship() -> Ship {
        let mut sprite = Texture::new(4, 4);
        sprite.set_pixel(0, 0, 255, 255, 255, 255);
        let fire = SpriteSheet::new(Texture::new(4, 1), 4, 1);
        Ship::new(sprite, fire, 100, 800)
    }

    fn gray(width: u32, height: u32, value: u8) -> Texture {
        Texture::from_grayscale(width, height, &vec![value; (width * height) as usize]).unwrap()
    }

    fn run_until(
        ending: &mut Ending,
        ship: &mut Ship,
        height: u32,
        done: impl Fn(EndingPhase) -> bool,
    ) -> u32 {
        let mut ticks = 0;
        while !done(ending.phase()) {
            ending.update(ship, height);
            ticks += 1;
            assert!(ticks < 10_000, "ending stuck in {:?}", ending.phase());
        }
        ticks
    }

    #[test]
    fn test_playing_is_inert() {
        let mut ending = Ending::new(gray(4, 4, 0), gray(4, 4, 0));
        let mut ship = ship();
        let y = ship.y;
        ending.update(&mut ship, 800);
        assert_eq!(ending.phase(), EndingPhase::Playing);
        assert_eq!(ship.y, y);
    }

    #[test]
    fn test_full_sequence() {
        let mut ending = Ending::new(gray(4, 4, 100), gray(2, 2, 0));
        let mut ship = ship();
        ending.start();
        ending.start();
        assert_eq!(ending.phase(), EndingPhase::Departing);

        run_until(&mut ending, &mut ship, 800, |p| {
            matches!(p, EndingPhase::Converging { .. })
        });
        assert!(ship.is_above_screen());
        assert_eq!(
            ending.phase(),
            EndingPhase::Converging {
                top: 0,
                bottom: 800
            }
        );

        // Both bands move one pixel per tick; the bottom one needs 300 ticks
        let ticks = run_until(&mut ending, &mut ship, 800, |p| {
            matches!(p, EndingPhase::Revealing { .. })
        });
        assert_eq!(ticks, 300);
        assert_eq!(ending.revealed_count(), 0);

        // Delta is 100: nothing until the threshold reaches it
        let ticks = run_until(&mut ending, &mut ship, 800, |p| {
            p == EndingPhase::Revealing { threshold: 101 }
        });
        assert_eq!(ticks, 86);
        assert_eq!(ending.revealed_count(), 16);

        run_until(&mut ending, &mut ship, 800, |p| p == EndingPhase::Done);
        ending.update(&mut ship, 800);
        assert_eq!(ending.phase(), EndingPhase::Done);
    }

    #[test]
    fn test_transparent_pixels_never_revealed() {
        let mut image = gray(2, 1, 0);
        image.set_pixel(1, 0, 0, 0, 0, 0);
        let mut ending = Ending::new(image, gray(1, 1, 0));
        ending.phase = EndingPhase::Revealing { threshold: 15 };
        let mut ship = ship();
        run_until(&mut ending, &mut ship, 800, |p| p == EndingPhase::Done);
        assert_eq!(ending.revealed_count(), 1);
    }

    #[test]
    fn test_render_bands_and_reveal() {
        let mut ending = Ending::new(gray(2, 2, 40), gray(2, 2, 40));
        ending.phase = EndingPhase::Converging { top: 2, bottom: 5 };
        let mut buffer = PixelBuffer::with_size(8, 8);
        ending.render(&mut buffer);
        assert_eq!(buffer.get_pixel(0, 1), Some((255, 255, 255)));
        assert_eq!(buffer.get_pixel(0, 2), Some((0, 0, 0)));
        assert_eq!(buffer.get_pixel(0, 5), Some((0, 0, 0)));
        assert_eq!(buffer.get_pixel(7, 6), Some((255, 255, 255)));

        ending.phase = EndingPhase::Revealing { threshold: 15 };
        let mut ship = ship();
        ending.update(&mut ship, 8);
        let mut buffer = PixelBuffer::with_size(8, 8);
        ending.render(&mut buffer);
        // Revealed image sits on top of the (clamped) top band
        assert_eq!(buffer.get_pixel(1, 1), Some((40, 40, 40)));
        assert_eq!(buffer.get_pixel(3, 3), Some((255, 255, 255)));
    }
}
