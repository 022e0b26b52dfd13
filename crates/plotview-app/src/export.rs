//! Two-phase PNG export.
//!
//! Phase one ([`render_snapshot`]) paints the figure on the thread that owns
//! it. Phase two ([`ExportJob`]) only touches the captured pixels and can be
//! moved to any thread for encoding and writing.

use crate::error::{AppError, AppResult};
use crate::figure::PlotFigure;
use plotview_render::{Bitmap, Canvas, CanvasPeer, RasterCanvasPeer};
use std::path::Path;
use std::sync::Arc;

/// Paint `figure` at `scale` pixels per logical pixel and capture the result.
pub fn render_snapshot(figure: &PlotFigure, scale: f64) -> AppResult<ExportJob> {
    if !figure.has_plot() {
        return Err(AppError::NoPlot);
    }
    let mut canvas = RasterCanvasPeer.create_canvas(figure.size(), Some(scale))?;
    let painted = canvas.context2d().map(|ctx| figure.paint(ctx));
    let snapshot = painted.and_then(|_| canvas.take_snapshot());
    canvas.dispose();

    let bitmap = snapshot?.shared_bitmap()?;
    log::debug!("Captured {}x{} export snapshot", bitmap.width(), bitmap.height());
    Ok(ExportJob { bitmap })
}

/// Captured pixels awaiting encoding.
#[derive(Debug, Clone)]
pub struct ExportJob {
    bitmap: Arc<Bitmap>,
}

impl ExportJob {
    pub fn new(bitmap: Arc<Bitmap>) -> Self {
        Self { bitmap }
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Encode the pixels as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> AppResult<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.bitmap.width(), self.bitmap.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(self.bitmap.rgba())?;
        }
        Ok(png_data)
    }

    /// Encode and write to `path`. Returns the number of bytes written.
    pub fn write_to(&self, path: &Path) -> AppResult<usize> {
        let png_data = self.encode_png()?;
        std::fs::write(path, &png_data)?;
        log::info!("PNG export complete: {} bytes to {}", png_data.len(), path.display());
        Ok(png_data.len())
    }
}
