//! Canvas peer contract: surface allocation, painting and snapshots.

mod raster;
mod recording;

pub use raster::{RasterCanvas, RasterCanvasPeer, RasterContext, RasterSnapshot};
pub use recording::{DrawCommand, RecordingContext};

use crate::bitmap::Bitmap;
use crate::renderer::Context2d;
use kurbo::Size;
use thiserror::Error;

/// Canvas and snapshot failures.
#[derive(Debug, Error, PartialEq)]
pub enum CanvasError {
    #[error("Invalid canvas size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("Invalid content scale {0}")]
    InvalidScale(f64),
    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("Could not allocate a {width}x{height} surface")]
    Allocation { width: u32, height: u32 },
    /// The backend cannot perform this operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
    #[error("Resource already disposed")]
    Disposed,
}

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Immutable pixel capture of a canvas.
pub trait Snapshot: Sized {
    /// Size in pixels.
    fn size(&self) -> (u32, u32);

    fn bitmap(&self) -> CanvasResult<&Bitmap>;

    /// Deep copy of the pixel data. Backends that cannot duplicate a snapshot
    /// keep the default.
    fn copy(&self) -> CanvasResult<Self> {
        Err(CanvasError::Unsupported("snapshot copy"))
    }

    /// Release the pixel data. Later calls are no-ops.
    fn dispose(&mut self);
}

/// A paintable raster surface.
pub trait Canvas {
    type Snapshot: Snapshot;

    /// Logical size, before content scaling.
    fn size(&self) -> Size;

    fn content_scale(&self) -> f64;

    /// Size of the backing store in pixels.
    fn pixel_size(&self) -> (u32, u32);

    /// Drawing context in logical coordinates.
    fn context2d(&mut self) -> CanvasResult<&mut dyn Context2d>;

    /// Capture the current pixels. Painting is synchronous, so every
    /// completed draw call is visible.
    fn take_snapshot(&self) -> CanvasResult<Self::Snapshot>;

    /// Release the backing store. Later calls are no-ops.
    fn dispose(&mut self);
}

/// Backend entry point.
pub trait CanvasPeer {
    type Canvas: Canvas;

    /// Allocate a surface of `size * content_scale` pixels. The scale
    /// defaults to 1.
    fn create_canvas(&self, size: Size, content_scale: Option<f64>) -> CanvasResult<Self::Canvas>;

    /// Wrap existing pixels as a snapshot.
    fn create_snapshot(&self, bitmap: Bitmap) -> CanvasResult<<Self::Canvas as Canvas>::Snapshot>;

    fn decode_png(&self, _bytes: &[u8]) -> CanvasResult<<Self::Canvas as Canvas>::Snapshot> {
        Err(CanvasError::Unsupported("PNG decoding"))
    }

    fn decode_data_image_url(&self, _url: &str) -> CanvasResult<<Self::Canvas as Canvas>::Snapshot> {
        Err(CanvasError::Unsupported("data URL decoding"))
    }
}

/// Validate a logical size and scale, returning the pixel dimensions.
pub(crate) fn pixel_dimensions(size: Size, content_scale: f64) -> CanvasResult<(u32, u32)> {
    if !(size.width.is_finite() && size.height.is_finite()) || size.width <= 0.0 || size.height <= 0.0 {
        return Err(CanvasError::InvalidSize {
            width: size.width,
            height: size.height,
        });
    }
    if !content_scale.is_finite() || content_scale <= 0.0 {
        return Err(CanvasError::InvalidScale(content_scale));
    }
    let width = (size.width * content_scale).ceil();
    let height = (size.height * content_scale).ceil();
    if width > u32::MAX as f64 || height > u32::MAX as f64 {
        return Err(CanvasError::InvalidSize { width, height });
    }
    Ok((width as u32, height as u32))
}
