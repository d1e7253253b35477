//! Perlin-style Noise Generation
//!
//! Builds a square grayscale field by summing progressively finer octaves of
//! random lattice values, each upsampled to full resolution with cosine
//! interpolation. The ending sequence dissolves its image through this field.

use std::f32::consts::PI;

use rand::Rng;

use crate::texture::Texture;

/// Largest accepted octave count (4096 x 4096 samples)
pub const MAX_OCTAVES: u32 = 12;

/// Cosine interpolation between `a` and `b`.
/// Zero first derivative at s = 0 and s = 1, so octave lattices blend
/// without the creases linear interpolation leaves.
#[inline]
pub fn cosine_interpolate(a: f32, b: f32, s: f32) -> f32 {
    let f = (1.0 - (s * PI).cos()) * 0.5;
    a + (b - a) * f
}

/// Resample `src` (src_w x src_h) into `dst` (dst_w x dst_h) using separable
/// cosine interpolation: along x on the two neighbouring rows, then along y.
///
/// The upper neighbour index is clamped to the last row/column; the lattice
/// never wraps around.
pub fn rescale_cosine(
    dst: &mut [f32],
    dst_w: usize,
    dst_h: usize,
    src: &[f32],
    src_w: usize,
    src_h: usize,
) {
    debug_assert_eq!(dst.len(), dst_w * dst_h);
    debug_assert_eq!(src.len(), src_w * src_h);

    for y in 0..dst_h {
        let fys = (y * src_h) as f32 / dst_h as f32;
        let iy0 = fys as usize;
        let iy1 = (iy0 + 1).min(src_h - 1);
        let ty = fys - iy0 as f32;

        for x in 0..dst_w {
            let fxs = (x * src_w) as f32 / dst_w as f32;
            let ix0 = fxs as usize;
            let ix1 = (ix0 + 1).min(src_w - 1);
            let tx = fxs - ix0 as f32;

            let upper = cosine_interpolate(src[iy0 * src_w + ix0], src[iy0 * src_w + ix1], tx);
            let lower = cosine_interpolate(src[iy1 * src_w + ix0], src[iy1 * src_w + ix1], tx);

            dst[y * dst_w + x] = cosine_interpolate(upper, lower, ty);
        }
    }
}

/// Accumulated multi-octave noise, before normalisation
pub struct NoiseField {
    size: usize,
    samples: Vec<f32>,
}

impl NoiseField {
    /// Generate a `2^octaves` square field.
    ///
    /// Octave k uses a `2^(k+1)` lattice of uniform values in [-1, 1] and is
    /// weighted by `persistence^k`. `octaves` is clamped to `1..=MAX_OCTAVES`.
    pub fn generate(octaves: u32, persistence: f32, rng: &mut impl Rng) -> Self {
        let octaves = octaves.clamp(1, MAX_OCTAVES);
        let size = 1usize << octaves;

        let mut samples = vec![0.0; size * size];
        let mut scratch = vec![0.0; size * size];
        let mut lattice_size = 2;
        let mut amplitude = 1.0;

        for _ in 0..octaves {
            let lattice: Vec<f32> = (0..lattice_size * lattice_size)
                .map(|_| rng.random::<f32>() * 2.0 - 1.0)
                .collect();

            rescale_cosine(
                &mut scratch,
                size,
                size,
                &lattice,
                lattice_size,
                lattice_size,
            );
            for (acc, s) in samples.iter_mut().zip(&scratch) {
                *acc += s * amplitude;
            }

            lattice_size *= 2;
            amplitude *= persistence;
        }

        Self { size, samples }
    }

    /// Side length in samples
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Map [-1, 1] to [0, 255], clamping anything the octave sum pushed outside
    pub fn to_gray_values(&self) -> Vec<u8> {
        self.samples()
            .iter()
            .map(|&s| (((s + 1.0) / 2.0).clamp(0.0, 1.0) * 255.0) as u8)
            .collect()
    }

    /// Grayscale image of the field
    pub fn to_texture(&self) -> Texture {
        let side = self.size() as u32;
        Texture::from_grayscale(side, side, &self.to_gray_values())
            .unwrap_or_else(|| Texture::new(side, side))
    }
}

/// Generate a `2^octaves` square grayscale Perlin noise image
pub fn generate_perlin_noise(octaves: u32, persistence: f32, rng: &mut impl Rng) -> Texture {
    NoiseField::generate(octaves, persistence, rng).to_texture()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_cosine_interpolate_endpoints() {
        assert!((cosine_interpolate(-0.3, 0.8, 0.0) - -0.3).abs() < 1e-6);
        assert!((cosine_interpolate(-0.3, 0.8, 1.0) - 0.8).abs() < 1e-6);
        assert!((cosine_interpolate(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_interpolate_flat_at_endpoints() {
        // Zero slope at the lattice points, unlike a linear ramp
        let near_start = cosine_interpolate(0.0, 1.0, 0.01);
        let near_end = cosine_interpolate(0.0, 1.0, 0.99);
        assert!(near_start < 0.01 * 0.1);
        assert!(1.0 - near_end < 0.01 * 0.1);
    }

    #[test]
    fn test_rescale_same_size_is_identity() {
        let src = [0.1, -0.4, 0.7, 0.9];
        let mut dst = [0.0; 4];
        rescale_cosine(&mut dst, 2, 2, &src, 2, 2);
        for (a, b) in src.iter().zip(&dst) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rescale_clamps_last_cell() {
        // The last destination column falls past the last lattice column;
        // it must interpolate towards that column, not wrap to column 0.
        let src = [0.0, 1.0];
        let mut dst = [0.0; 8];
        rescale_cosine(&mut dst, 8, 1, &src, 2, 1);
        assert!((dst[0] - 0.0).abs() < 1e-6);
        assert!((dst[7] - 1.0).abs() < 1e-6);
        for pair in dst.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_generate_is_deterministic_per_seed() {
        let a = NoiseField::generate(5, 0.7, &mut Pcg32::seed_from_u64(7));
        let b = NoiseField::generate(5, 0.7, &mut Pcg32::seed_from_u64(7));
        let c = NoiseField::generate(5, 0.7, &mut Pcg32::seed_from_u64(8));
        assert_eq!(a.samples(), b.samples());
        assert_ne!(a.samples(), c.samples());
    }

    #[test]
    fn test_zero_octaves_clamped_to_one() {
        let field = NoiseField::generate(0, 0.5, &mut Pcg32::seed_from_u64(1));
        assert_eq!(field.size(), 2);
        assert_eq!(field.samples().len(), 4);
    }

    #[test]
    fn test_texture_is_gray() {
        let tex = generate_perlin_noise(4, 0.7, &mut Pcg32::seed_from_u64(3));
        assert_eq!(tex.width(), 16);
        assert_eq!(tex.height(), 16);
        for y in 0..16 {
            for x in 0..16 {
                let (r, g, b, a) = tex.pixel(x, y).unwrap();
                assert!(r == g && g == b);
                assert_eq!(a, 255);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_field_size_and_range(octaves in 1u32..=7, persistence in 0.0f32..1.5, seed in any::<u64>()) {
            let field = NoiseField::generate(octaves, persistence, &mut Pcg32::seed_from_u64(seed));
            let side = 1usize << octaves;
            prop_assert_eq!(field.size(), side);
            prop_assert_eq!(field.samples().len(), side * side);

            // Saturates outside [-1, 1]
            let gray = field.to_gray_values();
            prop_assert_eq!(gray.len(), side * side);
            for (s, g) in field.samples().iter().zip(&gray) {
                if *s <= -1.0 {
                    prop_assert_eq!(*g, 0);
                }
                if *s >= 1.0 {
                    prop_assert_eq!(*g, 255);
                }
            }
        }
    }
}
