use super::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::texture::Texture;

// ============================================================================
// Utility Functions
// ============================================================================

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8) {
    dest[0] = 255; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

/// A single color channel of a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Byte offset of the channel inside an ABGR pixel
    #[inline]
    fn offset(self) -> usize {
        match self {
            Channel::Red => 3,
            Channel::Green => 2,
            Channel::Blue => 1,
        }
    }
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering
/// This is the frame raster - every layer of the game draws into it
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a new pixel buffer with default resolution
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Create a new pixel buffer with custom resolution
    pub fn with_size(width: u32, height: u32) -> Self {
        let mut buffer = Self {
            pixels: vec![0; (width * height * 4) as usize],
            width,
            height,
        };
        buffer.clear(0, 0, 0);
        buffer
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Clear to a solid color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            write_pixel(chunk, r, g, b);
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
        }
    }

    /// Overwrite one channel of a pixel, leaving the other two untouched
    #[inline]
    pub fn set_channel(&mut self, x: i32, y: i32, channel: Channel, value: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            self.pixels[idx + channel.offset()] = value;
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[cfg(test)]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
            ))
        } else {
            None
        }
    }

    /// Draw a horizontal line
    /// Optimized: computes starting index once, then increments by 4
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, r: u8, g: u8, b: u8) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let x1 = x1.max(0);
        let x2 = x2.min(self.width as i32 - 1);
        if x1 > x2 {
            return;
        }

        let start = self.pixel_index(x1 as u32, y as u32);
        let end = self.pixel_index(x2 as u32, y as u32) + 4;
        for chunk in self.pixels[start..end].chunks_exact_mut(4) {
            write_pixel(chunk, r, g, b);
        }
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, r: u8, g: u8, b: u8) {
        for row in 0..h as i32 {
            self.hline(x, x + w as i32 - 1, y + row, r, g, b);
        }
    }

    /// Draw a line using Bresenham's algorithm with Cohen-Sutherland clipping
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, r: u8, g: u8, b: u8) {
        let Some((cx0, cy0, cx1, cy1)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };

        let dx = (cx1 - cx0).abs();
        let dy = -((cy1 - cy0).abs());
        let sx = if cx0 < cx1 { 1i32 } else { -1i32 };
        let sy = if cy0 < cy1 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = cx0;
        let mut y = cy0;

        loop {
            self.set_pixel(x, y, r, g, b);
            if x == cx1 && y == cy1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Cohen-Sutherland line clipping algorithm
    /// Returns the clipped endpoints, or None if the line is fully outside
    fn clip_line(
        &self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
    ) -> Option<(i32, i32, i32, i32)> {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const BOTTOM: u8 = 4;
        const TOP: u8 = 8;
        // Algorithm converges in at most 4 iterations for valid input
        const MAX_ITERATIONS: u32 = 16;

        let w = self.width as i32;
        let h = self.height as i32;

        let outcode = |x: i32, y: i32| -> u8 {
            let mut code = INSIDE;
            if x < 0 {
                code |= LEFT;
            } else if x >= w {
                code |= RIGHT;
            }
            if y < 0 {
                code |= TOP;
            } else if y >= h {
                code |= BOTTOM;
            }
            code
        };

        let mut code0 = outcode(x0, y0);
        let mut code1 = outcode(x1, y1);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == 0 {
                return Some((x0, y0, x1, y1));
            }
            if (code0 & code1) != 0 {
                return None;
            }

            let code_out = if code0 != 0 { code0 } else { code1 };
            let (x, y);

            let dy = y1 - y0;
            let dx = x1 - x0;

            if (code_out & BOTTOM) != 0 {
                if dy == 0 {
                    return None;
                }
                x = x0 + dx * (h - 1 - y0) / dy;
                y = h - 1;
            } else if (code_out & TOP) != 0 {
                if dy == 0 {
                    return None;
                }
                x = x0 + dx * (0 - y0) / dy;
                y = 0;
            } else if (code_out & RIGHT) != 0 {
                if dx == 0 {
                    return None;
                }
                y = y0 + dy * (w - 1 - x0) / dx;
                x = w - 1;
            } else {
                // LEFT
                if dx == 0 {
                    return None;
                }
                y = y0 + dy * (0 - x0) / dx;
                x = 0;
            }

            if code_out == code0 {
                x0 = x;
                y0 = y;
                code0 = outcode(x0, y0);
            } else {
                x1 = x;
                y1 = y;
                code1 = outcode(x1, y1);
            }
        }

        None
    }

    /// Draw a circle outline (1px thick)
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, r: u8, g: u8, b: u8) {
        if radius < 0 {
            return;
        }

        // Midpoint circle algorithm
        let mut x = radius;
        let mut y = 0;
        let mut err = 0;

        while x >= y {
            self.set_pixel(cx + x, cy + y, r, g, b);
            self.set_pixel(cx + y, cy + x, r, g, b);
            self.set_pixel(cx - y, cy + x, r, g, b);
            self.set_pixel(cx - x, cy + y, r, g, b);
            self.set_pixel(cx - x, cy - y, r, g, b);
            self.set_pixel(cx - y, cy - x, r, g, b);
            self.set_pixel(cx + y, cy - x, r, g, b);
            self.set_pixel(cx + x, cy - y, r, g, b);

            y += 1;
            err += 1 + 2 * y;
            if 2 * (err - x) + 1 > 0 {
                x -= 1;
                err += 1 - 2 * x;
            }
        }
    }

    // ========================================================================
    // Sprite Operations
    // ========================================================================

    /// Draw a texture at (x, y), skipping transparent texels
    pub fn blit_sprite(&mut self, src: &Texture, x: i32, y: i32) {
        self.blit_sprite_region(src, 0, 0, src.width(), src.height(), x, y);
    }

    /// Draw a sub-rectangle of a texture at (x, y), skipping transparent texels
    pub fn blit_sprite_region(
        &mut self,
        src: &Texture,
        src_x: u32,
        src_y: u32,
        w: u32,
        h: u32,
        x: i32,
        y: i32,
    ) {
        let dst_w = self.width as i32;
        let dst_h = self.height as i32;

        for sy in 0..h {
            let dy = y + sy as i32;
            if dy < 0 || dy >= dst_h {
                continue;
            }

            for sx in 0..w {
                let dx = x + sx as i32;
                if dx < 0 || dx >= dst_w {
                    continue;
                }

                let (tx, ty) = (src_x + sx, src_y + sy);
                if src.is_transparent(tx, ty) {
                    continue;
                }
                if let Some((r, g, b, _)) = src.pixel(tx, ty) {
                    self.set_pixel(dx, dy, r, g, b);
                }
            }
        }
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Tightly packed RGB bytes, row-major (for image export)
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
        for chunk in self.pixels.chunks_exact(4) {
            rgb.extend_from_slice(&[chunk[3], chunk[2], chunk[1]]);
        }
        rgb
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}
