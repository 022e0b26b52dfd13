//! A processed plot hosted in a resizable panel.

use crate::engine::ProcessedSpec;
use crate::error::{AppError, AppResult};
use crate::sizing::SizingPolicy;
use kurbo::{Affine, Point, Rect, Shape, Size, Vec2};
use peniko::Color;
use plotview_core::{PointerConfig, PointerEventMapper, SvgDocument};
use plotview_render::primitives::FillRule;
use plotview_render::{Context2d, SceneMapper};

/// Owns the scene document of the current plot, its primitive mirror and
/// the pointer mapper feeding interactions back to it.
#[derive(Debug)]
pub struct PlotFigure {
    document: Option<SvgDocument>,
    mapper: SceneMapper,
    pointer: PointerEventMapper,
    sizing: SizingPolicy,
    intrinsic_size: Size,
    container: Option<Size>,
    plot_size: Size,
    background: Color,
    background_override: Option<Color>,
    messages_delivered: bool,
}

impl Default for PlotFigure {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotFigure {
    pub fn new() -> Self {
        Self::with_pointer_config(PointerConfig::default())
    }

    pub fn with_pointer_config(config: PointerConfig) -> Self {
        Self {
            document: None,
            mapper: SceneMapper::new(),
            pointer: PointerEventMapper::new(config),
            sizing: SizingPolicy::default(),
            intrinsic_size: Size::ZERO,
            container: None,
            plot_size: Size::ZERO,
            background: crate::engine::DEFAULT_BACKGROUND,
            background_override: None,
            messages_delivered: false,
        }
    }

    /// Replace the plot. Computation messages are handed to `on_messages`
    /// the first time a plot carrying any is shown by this figure.
    pub fn update(
        &mut self,
        processed: ProcessedSpec,
        sizing: SizingPolicy,
        on_messages: impl FnOnce(&[String]),
    ) -> AppResult<()> {
        let ProcessedSpec {
            mut document,
            style_sheet,
            background,
            size,
            messages,
        } = processed;

        self.mapper.set_style_sheet(Some(style_sheet));
        self.mapper.attach(&mut document)?;
        self.document = Some(document);
        self.background = background;
        self.intrinsic_size = size;
        self.sizing = sizing;
        self.layout();

        if !self.messages_delivered && !messages.is_empty() {
            self.messages_delivered = true;
            on_messages(&messages);
        }
        Ok(())
    }

    /// Tell the figure the size of the panel hosting it.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.container = Some(Size::new(width, height));
        self.layout();
    }

    /// Laid-out plot size in logical pixels.
    pub fn size(&self) -> Size {
        self.plot_size
    }

    pub fn has_plot(&self) -> bool {
        self.document.is_some()
    }

    /// Offset that centers the plot in its panel.
    pub fn content_offset(&self) -> Vec2 {
        self.pointer.content_offset()
    }

    pub fn background(&self) -> Color {
        self.background_override.unwrap_or(self.background)
    }

    /// Use `color` instead of the plot's own background.
    pub fn set_background_override(&mut self, color: Option<Color>) {
        self.background_override = color;
    }

    pub fn set_pointer_config(&mut self, config: PointerConfig) {
        self.pointer.set_config(config);
    }

    pub fn pointer(&self) -> &PointerEventMapper {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut PointerEventMapper {
        &mut self.pointer
    }

    pub fn document(&self) -> Option<&SvgDocument> {
        self.document.as_ref()
    }

    /// Scene document for interaction handlers. Call [`PlotFigure::sync`]
    /// after mutating it.
    pub fn document_mut(&mut self) -> Option<&mut SvgDocument> {
        self.document.as_mut()
    }

    pub fn mapper(&self) -> &SceneMapper {
        &self.mapper
    }

    /// Push pending document changes into the primitive tree.
    pub fn sync(&mut self) -> AppResult<usize> {
        let document = self.document.as_ref().ok_or(AppError::NoPlot)?;
        Ok(self.mapper.update(document)?)
    }

    /// Paint the background and the scene into `(0, 0, size)`.
    pub fn paint(&self, ctx: &mut dyn Context2d) {
        if self.document.is_none() || self.plot_size.is_zero_area() {
            log::debug!("Nothing to paint");
            return;
        }
        let plot_area = Rect::from_origin_size(Point::ORIGIN, self.plot_size).to_path(0.1);

        ctx.save();
        ctx.clip(&plot_area);
        ctx.fill_path(&plot_area, self.background(), FillRule::NonZero);
        let scale = self.content_scale();
        if scale != Vec2::new(1.0, 1.0) {
            ctx.transform(Affine::scale_non_uniform(scale.x, scale.y));
        }
        plotview_render::paint(self.mapper.tree(), ctx);
        ctx.restore();
    }

    /// Paint into a panel of the size last passed to [`PlotFigure::resize`],
    /// centered by the content offset.
    pub fn paint_in_panel(&self, ctx: &mut dyn Context2d) {
        ctx.save();
        ctx.transform(Affine::translate(self.content_offset()));
        self.paint(ctx);
        ctx.restore();
    }

    /// Drop the plot and reset pointer gesture state.
    pub fn dispose(&mut self) {
        self.mapper.dispose();
        self.document = None;
        self.pointer.reset();
        self.plot_size = Size::ZERO;
    }

    fn layout(&mut self) {
        self.plot_size = self.sizing.plot_size(self.intrinsic_size, self.container);
        let offset = match self.container {
            Some(panel) => Vec2::new(
                ((panel.width - self.plot_size.width) / 2.0).max(0.0),
                ((panel.height - self.plot_size.height) / 2.0).max(0.0),
            ),
            None => Vec2::ZERO,
        };
        self.pointer.set_content_offset(offset);
        self.pointer.set_content_scale(self.content_scale());
        log::trace!("Plot laid out at {:?}, offset {:?}", self.plot_size, offset);
    }

    /// Laid-out size over intrinsic size, per axis.
    fn content_scale(&self) -> Vec2 {
        if self.intrinsic_size.width > 0.0 && self.intrinsic_size.height > 0.0 {
            Vec2::new(
                self.plot_size.width / self.intrinsic_size.width,
                self.plot_size.height / self.intrinsic_size.height,
            )
        } else {
            Vec2::new(1.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PlotEngine, SceneSpecEngine, SpecOptions};
    use plotview_core::{MouseEventSpec, RawPointerEvent};
    use plotview_render::{DrawCommand, RecordingContext};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn processed(messages: &[&str]) -> ProcessedSpec {
        SceneSpecEngine
            .process_spec(
                &json!({
                    "width": 100, "height": 50,
                    "background": "#101010",
                    "messages": messages,
                    "elements": [ { "tag": "rect", "attributes": { "width": 10, "height": 10 } } ]
                }),
                &SpecOptions::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_content_offset_centers_plot() {
        let mut figure = PlotFigure::new();
        figure.update(processed(&[]), SizingPolicy::Fixed, |_| {}).unwrap();
        assert_eq!(figure.content_offset(), Vec2::ZERO);

        figure.resize(300.0, 250.0);
        assert_eq!(figure.size(), Size::new(100.0, 50.0));
        assert_eq!(figure.content_offset(), Vec2::new(100.0, 100.0));
        assert_eq!(figure.pointer().content_offset(), Vec2::new(100.0, 100.0));

        // Smaller panel: never negative.
        figure.resize(50.0, 20.0);
        assert_eq!(figure.content_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_fit_container_rescales_on_resize() {
        let mut figure = PlotFigure::new();
        figure.resize(400.0, 400.0);
        figure
            .update(processed(&[]), SizingPolicy::fit_container(true), |_| {})
            .unwrap();
        assert_eq!(figure.size(), Size::new(400.0, 200.0));
        assert_eq!(figure.content_offset(), Vec2::new(0.0, 100.0));
        assert_eq!(figure.pointer().content_scale(), Vec2::new(4.0, 4.0));
    }

    #[test]
    fn test_click_on_scaled_figure_lands_in_scene_units() {
        let mut figure = PlotFigure::new();
        figure
            .update(processed(&[]), SizingPolicy::fit_container(true), |_| {})
            .unwrap();
        figure.resize(200.0, 200.0);
        assert_eq!(figure.size(), Size::new(200.0, 100.0));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _reg = figure
            .pointer()
            .event_peer()
            .add_event_handler(MouseEventSpec::Clicked, move |e| {
                sink.borrow_mut().push((e.x(), e.y()))
            });
        let at = Point::new(150.0, 100.0);
        figure.pointer_mut().handle(RawPointerEvent::press(at, Duration::ZERO));
        figure
            .pointer_mut()
            .handle(RawPointerEvent::release(at, Duration::from_millis(30)));
        // Offset (0, 50), scale 2: panel (150, 100) is scene (75, 25).
        assert_eq!(*seen.borrow(), vec![(75, 25)]);
    }

    #[test]
    fn test_messages_delivered_once() {
        let mut figure = PlotFigure::new();
        let mut calls = Vec::new();
        figure
            .update(processed(&["first"]), SizingPolicy::Fixed, |m| calls.push(m.to_vec()))
            .unwrap();
        figure
            .update(processed(&["second"]), SizingPolicy::Fixed, |m| calls.push(m.to_vec()))
            .unwrap();
        assert_eq!(calls, vec![vec!["first".to_string()]]);
    }

    #[test]
    fn test_paint_draws_background_then_scene() {
        let mut figure = PlotFigure::new();
        let mut ctx = RecordingContext::new();
        figure.paint(&mut ctx);
        assert!(ctx.commands().is_empty());

        figure.update(processed(&[]), SizingPolicy::Fixed, |_| {}).unwrap();
        figure.resize(120.0, 50.0);
        figure.paint_in_panel(&mut ctx);

        let fills: Vec<_> = ctx
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillPath { color, .. } => Some(color.to_rgba8()),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0], Color::from_rgba8(16, 16, 16, 255).to_rgba8());
        assert!(ctx
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Transform(t) if *t == Affine::translate((10.0, 0.0)))));

        figure.set_background_override(Some(Color::WHITE));
        assert_eq!(figure.background().to_rgba8(), Color::WHITE.to_rgba8());
    }

    #[test]
    fn test_pointer_uses_figure_offset() {
        let mut figure = PlotFigure::new();
        figure.update(processed(&[]), SizingPolicy::Fixed, |_| {}).unwrap();
        figure.resize(120.0, 70.0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _reg = figure
            .pointer()
            .event_peer()
            .add_event_handler(MouseEventSpec::Moved, move |e| {
                sink.borrow_mut().push((e.x(), e.y()))
            });
        figure
            .pointer_mut()
            .handle(RawPointerEvent::moved(Point::new(30.0, 40.0), false, Duration::ZERO));
        assert_eq!(*seen.borrow(), vec![(20, 30)]);
    }

    #[test]
    fn test_sync_and_dispose() {
        let mut figure = PlotFigure::new();
        assert!(matches!(figure.sync(), Err(AppError::NoPlot)));
        figure.update(processed(&[]), SizingPolicy::Fixed, |_| {}).unwrap();

        let doc = figure.document_mut().unwrap();
        let rect = doc.children(doc.root())[0];
        doc.set_attribute(rect, "width", 30.0).unwrap();
        assert_eq!(figure.sync().unwrap(), 1);

        figure.dispose();
        assert!(!figure.has_plot());
        assert!(figure.mapper().tree().is_empty());
    }
}
