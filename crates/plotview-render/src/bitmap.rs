//! Owned RGBA pixel buffers.

use crate::canvas::{CanvasError, CanvasResult};

/// Unpremultiplied RGBA8 pixels, row-major, no padding.
///
/// The buffer always holds `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

impl Bitmap {
    /// Wrap an existing buffer. Fails when the buffer length does not match
    /// the dimensions.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> CanvasResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidSize {
                width: width as f64,
                height: height as f64,
            });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CanvasError::BufferSize {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// A fully transparent bitmap.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }

    /// Pixel at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn byte_len(&self) -> usize {
        self.rgba.len()
    }
}
