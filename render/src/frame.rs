//! The framebuffer the renderers write into and the platform uploads to the
//! window each frame.
//!
//! Pixel format is 32 bpp, byte order `R,G,B,A` — viewed as a little-endian
//! `u32` that is `(A<<24)|(B<<16)|(G<<8)|R`.

#[cfg(feature = "d2")]
use embedded_graphics::{pixelcolor::Rgb888, prelude::*};

/// Upper bound on a framebuffer's width. Per-column renderer state (the
/// portal caster's `y_top`/`y_bot` bounds) is sized against this constant so
/// it can live on the stack instead of the heap.
pub const MAX_WIDTH: usize = 1280;

pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (a as u32) << 24 | (b as u32) << 16 | (g as u32) << 8 | (r as u32)
}

pub const CLEAR_COLOR: u32 = pack_rgba(0x00, 0x00, 0x00, 0xff);
pub const FALLBACK_GRAY: u32 = pack_rgba(0x80, 0x80, 0x80, 0xff);

/// An owned `width * height` pixel buffer. Width is capped at [`MAX_WIDTH`];
/// attempting to construct a wider one panics, since the portal renderer's
/// per-column buffers could not represent it.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            width <= MAX_WIDTH,
            "framebuffer width {} exceeds MAX_WIDTH {}",
            width,
            MAX_WIDTH
        );
        Self {
            width,
            height,
            pixels: vec![CLEAR_COLOR; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = CLEAR_COLOR);
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(self.pixels[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

/// Adapts a [`Framebuffer`] to `embedded-graphics`' `DrawTarget`, for the 2D
/// map view's primitive drawing (lines, rectangles, text).
#[cfg(feature = "d2")]
pub(crate) struct EgFrame<'a>(pub &'a mut Framebuffer);

#[cfg(feature = "d2")]
impl DrawTarget<Rgb888> for EgFrame<'_> {
    type Error = std::convert::Infallible;

    fn draw_pixel(&mut self, Pixel(point, color): Pixel<Rgb888>) -> Result<(), Self::Error> {
        self.0.set(
            point.x,
            point.y,
            pack_rgba(color.r(), color.g(), color.b(), 0xff),
        );
        Ok(())
    }

    fn size(&self) -> Size {
        Size::new(self.0.width() as u32, self.0.height() as u32)
    }
}
