//! Frame export to numbered PNG files

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use png::{BitDepth, ColorType, Encoder};

use crate::display::PixelBuffer;

/// Writes `save<N>.png` files into a directory, N continuing after the
/// highest index already there
pub struct SnapshotWriter {
    dir: PathBuf,
    next: u32,
}

impl SnapshotWriter {
    /// Numbering starts after the highest `save<N>.png` already in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let next = highest_index(&dir).map_or(0, |n| n + 1);
        Self { dir, next }
    }

    /// Path the next snapshot will be written to
    pub fn next_path(&self) -> PathBuf {
        self.dir.join(format!("save{}.png", self.next))
    }

    pub fn save(&mut self, buffer: &PixelBuffer) -> Result<PathBuf, String> {
        let path = self.next_path();
        write_png(&path, buffer)?;
        self.next += 1;
        log::info!("Saved snapshot to {}", path.display());
        Ok(path)
    }
}

fn highest_index(dir: &Path) -> Option<u32> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            name.strip_prefix("save")?
                .strip_suffix(".png")?
                .parse::<u32>()
                .ok()
        })
        .max()
}

/// Encode the buffer as an 8-bit RGB PNG
pub fn write_png(path: &Path, buffer: &PixelBuffer) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut encoder = Encoder::new(BufWriter::new(file), buffer.width(), buffer.height());
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder.write_header().map_err(|e| e.to_string())?;
    writer
        .write_image_data(&buffer.to_rgb_bytes())
        .map_err(|e| e.to_string())?;
    writer.finish().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::Texture;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("starglitch-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_saves_numbered_files() {
        let dir = scratch_dir("numbered");
        let mut writer = SnapshotWriter::new(&dir);

        let mut buffer = PixelBuffer::with_size(3, 2);
        buffer.set_pixel(1, 0, 10, 20, 30);

        let first = writer.save(&buffer).unwrap();
        let second = writer.save(&buffer).unwrap();
        assert_eq!(first, dir.join("save0.png"));
        assert_eq!(second, dir.join("save1.png"));

        let loaded = Texture::load_png(&first).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (3, 2));
        assert_eq!(loaded.pixel(1, 0), Some((10, 20, 30, 255)));
        assert_eq!(loaded.pixel(0, 0), Some((0, 0, 0, 255)));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_continues_after_existing_files() {
        let dir = scratch_dir("continue");
        fs::write(dir.join("save4.png"), b"").unwrap();
        fs::write(dir.join("savefile.png"), b"").unwrap();

        let writer = SnapshotWriter::new(&dir);
        assert_eq!(writer.next_path(), dir.join("save5.png"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let mut writer = SnapshotWriter::new("/nonexistent/starglitch/snapshots");
        let buffer = PixelBuffer::with_size(1, 1);
        assert!(writer.save(&buffer).is_err());
    }
}
