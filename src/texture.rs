//! Texture storage for sprites, spritesheets and generated images
//!
//! Textures carry an explicit alpha channel. Alpha 0 means "do not draw";
//! the legacy magic-pink colour key is converted to alpha on load.

use std::fs;
use std::io::{BufRead, Cursor, Seek};
use std::path::Path;

use png::{BitDepth, ColorType, Decoder, Transformations};

/// The colour key used by legacy sprite assets for "transparent"
pub const MAGIC_PINK: (u8, u8, u8) = (255, 0, 254);

/// A texture stored as RGBA pixels
#[derive(Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u8>, // RGBA format, 4 bytes per pixel
}

impl Texture {
    /// Create a new fully transparent texture
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// Create texture from raw RGBA data
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() == (width * height * 4) as usize {
            Some(Self {
                width,
                height,
                pixels: data,
            })
        } else {
            None
        }
    }

    /// Load a PNG file from disk
    pub fn load_png(path: impl AsRef<Path>) -> Result<Self, String> {
        let bytes = fs::read(path).map_err(|e| e.to_string())?;
        Self::from_png_bytes(&bytes)
    }

    /// Decode PNG data held in memory
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, String> {
        Self::decode_png(Cursor::new(bytes))
    }

    fn decode_png<R: BufRead + Seek>(source: R) -> Result<Self, String> {
        let mut decoder = Decoder::new(source);
        decoder.set_ignore_text_chunk(true);
        // Expand palettes and low bit depths, always produce an alpha channel
        decoder
            .set_transformations(Transformations::normalize_to_color8() | Transformations::ALPHA);

        let mut reader = decoder.read_info().map_err(|e| e.to_string())?;
        let (color_type, bits) = reader.output_color_type();
        if bits != BitDepth::Eight {
            return Err(format!("unsupported PNG bit depth {:?}", bits));
        }

        let mut raw = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut raw).map_err(|e| e.to_string())?;
        raw.truncate(info.buffer_size());

        let pixels = match color_type {
            ColorType::Rgba => raw,
            ColorType::Rgb => raw
                .chunks_exact(3)
                .flat_map(|c| [c[0], c[1], c[2], 255])
                .collect(),
            ColorType::GrayscaleAlpha => raw
                .chunks_exact(2)
                .flat_map(|c| [c[0], c[0], c[0], c[1]])
                .collect(),
            ColorType::Grayscale => raw.iter().flat_map(|&v| [v, v, v, 255]).collect(),
            ColorType::Indexed => return Err("indexed PNG was not expanded".to_string()),
        };

        Self::from_rgba(info.width, info.height, pixels)
            .ok_or_else(|| "PNG frame size does not match its dimensions".to_string())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set a pixel in the texture
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8, a: u8) {
        if x < self.width && y < self.height {
            let idx = ((y * self.width + x) * 4) as usize;
            self.pixels[idx] = r;
            self.pixels[idx + 1] = g;
            self.pixels[idx + 2] = b;
            self.pixels[idx + 3] = a;
        }
    }

    /// Read a texel as (r, g, b, a), or None outside the texture
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        if x < self.width && y < self.height {
            let idx = ((y * self.width + x) * 4) as usize;
            Some((
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            ))
        } else {
            None
        }
    }

    /// True when the texel has zero alpha (or lies outside the texture)
    #[inline]
    pub fn is_transparent(&self, x: u32, y: u32) -> bool {
        self.pixel(x, y).map_or(true, |(_, _, _, a)| a == 0)
    }

    /// Turn every pixel matching `key` fully transparent
    pub fn apply_color_key(&mut self, key: (u8, u8, u8)) {
        for px in self.pixels.chunks_exact_mut(4) {
            if (px[0], px[1], px[2]) == key {
                px[3] = 0;
            }
        }
    }

    /// Builder form of `apply_color_key`
    pub fn with_color_key(mut self, key: (u8, u8, u8)) -> Self {
        self.apply_color_key(key);
        self
    }

    /// Sample texture with UV coordinates (0.0 to 1.0, wrapping)
    /// Returns (r, g, b) - alpha is discarded for simplicity
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> (u8, u8, u8) {
        // Wrap UV coordinates using rem_euclid for correct negative handling
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        let x = (u * self.width as f32) as u32 % self.width;
        let y = (v * self.height as f32) as u32 % self.height;

        let idx = ((y * self.width + x) * 4) as usize;
        (self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2])
    }
}

// ============================================================================
// SpriteSheet: a texture cut into a grid of equally sized frames
// ============================================================================

/// A texture split into `columns x rows` animation frames
#[derive(Clone)]
pub struct SpriteSheet {
    texture: Texture,
    columns: u32,
    rows: u32,
}

impl SpriteSheet {
    pub fn new(texture: Texture, columns: u32, rows: u32) -> Self {
        Self {
            texture,
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    #[inline]
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    #[inline]
    pub fn frame_width(&self) -> u32 {
        self.texture.width() / self.columns
    }

    #[inline]
    pub fn frame_height(&self) -> u32 {
        self.texture.height() / self.rows
    }

    /// Number of frames in the sheet
    pub fn frame_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Top-left texel of a frame given its column and row
    pub fn frame_origin(&self, column: u32, row: u32) -> (u32, u32) {
        (
            (column % self.columns) * self.frame_width(),
            (row % self.rows) * self.frame_height(),
        )
    }
}

// ============================================================================
// Procedural Texture Generators
// ============================================================================

impl Texture {
    /// Generate a checkerboard pattern
    pub fn checkerboard(size: u32, tile_size: u32, c1: (u8, u8, u8), c2: (u8, u8, u8)) -> Self {
        let mut tex = Self::new(size, size);
        for y in 0..size {
            for x in 0..size {
                let checker = ((x / tile_size) + (y / tile_size)) % 2 == 0;
                let (r, g, b) = if checker { c1 } else { c2 };
                tex.set_pixel(x, y, r, g, b, 255);
            }
        }
        tex
    }

    /// Grayscale texture from one intensity per pixel, row-major
    pub fn from_grayscale(width: u32, height: u32, values: &[u8]) -> Option<Self> {
        let data = values.iter().flat_map(|&v| [v, v, v, 255]).collect();
        Self::from_rgba(width, height, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, color: ColorType, data: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, width, height);
            encoder.set_color(color);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        bytes
    }

    #[test]
    fn test_color_key_becomes_transparent() {
        let mut tex = Texture::new(2, 1);
        tex.set_pixel(0, 0, 255, 0, 254, 255);
        tex.set_pixel(1, 0, 255, 0, 255, 255);
        let tex = tex.with_color_key(MAGIC_PINK);
        assert!(tex.is_transparent(0, 0));
        assert!(!tex.is_transparent(1, 0));
    }

    #[test]
    fn test_out_of_range_is_transparent() {
        let tex = Texture::checkerboard(4, 2, (255, 255, 255), (0, 0, 0));
        assert!(!tex.is_transparent(3, 3));
        assert!(tex.is_transparent(4, 0));
        assert_eq!(tex.pixel(0, 4), None);
    }

    #[test]
    fn test_rgb_png_gains_opaque_alpha() {
        let bytes = encode_png(2, 1, ColorType::Rgb, &[1, 2, 3, 4, 5, 6]);
        let tex = Texture::from_png_bytes(&bytes).unwrap();
        assert_eq!(tex.width(), 2);
        assert_eq!(tex.pixel(0, 0), Some((1, 2, 3, 255)));
        assert_eq!(tex.pixel(1, 0), Some((4, 5, 6, 255)));
    }

    #[test]
    fn test_grayscale_png_expands_to_rgba() {
        let bytes = encode_png(1, 2, ColorType::Grayscale, &[7, 200]);
        let tex = Texture::from_png_bytes(&bytes).unwrap();
        assert_eq!(tex.pixel(0, 1), Some((200, 200, 200, 255)));
    }

    #[test]
    fn test_garbage_png_is_an_error() {
        assert!(Texture::from_png_bytes(b"not a png").is_err());
    }

    #[test]
    fn test_load_png_from_disk() {
        let path = std::env::temp_dir().join(format!("starglitch-load-{}.png", std::process::id()));
        fs::write(&path, encode_png(1, 1, ColorType::Rgba, &[9, 8, 7, 0])).unwrap();
        let tex = Texture::load_png(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(tex.is_transparent(0, 0));

        assert!(Texture::load_png(&path).is_err());
    }

    #[test]
    fn test_spritesheet_frames() {
        let sheet = SpriteSheet::new(Texture::new(64, 16), 4, 1);
        assert_eq!(sheet.frame_width(), 16);
        assert_eq!(sheet.frame_height(), 16);
        assert_eq!(sheet.frame_count(), 4);
        assert_eq!(sheet.frame_origin(2, 0), (32, 0));
        assert_eq!(sheet.frame_origin(5, 0), (16, 0));
    }
}
