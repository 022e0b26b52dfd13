//! PlotView Render Library
//!
//! Mirrors an [`SvgDocument`](plotview_core::SvgDocument) into a tree of
//! drawable primitives and paints that tree onto a 2D canvas.
//! The bundled canvas backend rasterizes on the CPU with tiny-skia, drawing
//! text with the embedded fonts in [`font`].

pub mod attr;
pub mod bitmap;
pub mod canvas;
pub mod font;
pub mod mapper;
pub mod primitives;
pub mod renderer;

pub use attr::{AttributeError, set_attribute};
pub use bitmap::Bitmap;
pub use canvas::{
    Canvas, CanvasError, CanvasPeer, CanvasResult, DrawCommand, RasterCanvas, RasterCanvasPeer,
    RasterSnapshot, RecordingContext, Snapshot,
};
pub use mapper::{SceneMapper, SyncError, SyncResult};
pub use primitives::{Primitive, PrimitiveId, PrimitiveKind, PrimitiveTree};
pub use renderer::{Context2d, TextRun, paint};
