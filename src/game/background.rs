use crate::display::PixelBuffer;
use crate::texture::Texture;
use crate::util::lerp_color;

/// Bottom layer of every frame
pub enum Background {
    Solid((u8, u8, u8)),
    /// Vertical gradient from `top` to `bottom`
    Gradient {
        top: (u8, u8, u8),
        bottom: (u8, u8, u8),
    },
    /// Image point-sampled to the frame size
    Image(Texture),
}

impl Background {
    pub fn render(&self, buffer: &mut PixelBuffer) {
        match self {
            Background::Solid((r, g, b)) => buffer.clear(*r, *g, *b),
            Background::Gradient { top, bottom } => {
                let h = buffer.height();
                let w = buffer.width() as i32;
                for y in 0..h {
                    let t = y as f32 / h.saturating_sub(1).max(1) as f32;
                    let (r, g, b) = lerp_color(*top, *bottom, t);
                    buffer.hline(0, w - 1, y as i32, r, g, b);
                }
            },
            Background::Image(texture) => {
                let w = buffer.width();
                let h = buffer.height();
                for y in 0..h {
                    let v = y as f32 / h as f32;
                    for x in 0..w {
                        let (r, g, b) = texture.sample(x as f32 / w as f32, v);
                        buffer.set_pixel(x as i32, y as i32, r, g, b);
                    }
                }
            },
        }
    }
}
