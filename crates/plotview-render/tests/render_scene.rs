//! End-to-end: scene document -> primitive tree -> pixels.

use kurbo::Size;
use peniko::Color;
use plotview_core::{ElementId, ElementKind, SvgDocument};
use plotview_render::{
    Canvas, CanvasPeer, RasterCanvasPeer, RasterSnapshot, RecordingContext, SceneMapper, Snapshot,
    paint,
};

fn paint_to_pixels(mapper: &SceneMapper, scale: f64) -> RasterSnapshot {
    let mut canvas = RasterCanvasPeer
        .create_canvas(Size::new(20.0, 10.0), Some(scale))
        .unwrap();
    {
        let ctx = canvas.context2d().unwrap();
        ctx.clear(Color::WHITE);
        paint(mapper.tree(), ctx);
    }
    let snapshot = canvas.take_snapshot().unwrap();
    canvas.dispose();
    snapshot
}

fn scene() -> (SvgDocument, ElementId) {
    let mut doc = SvgDocument::new();
    let root = doc.root();
    doc.set_attribute(root, "width", 20.0).unwrap();
    doc.set_attribute(root, "height", 10.0).unwrap();

    let rect = doc.create_element(ElementKind::Rect);
    doc.set_attribute(rect, "width", 10.0).unwrap();
    doc.set_attribute(rect, "height", 10.0).unwrap();
    doc.set_attribute(rect, "fill", "#ff0000").unwrap();
    doc.append_child(root, rect).unwrap();
    (doc, rect)
}

#[test]
fn test_scene_paints_to_scaled_pixels() {
    let (mut doc, _) = scene();
    let mut mapper = SceneMapper::new();
    mapper.attach(&mut doc).unwrap();

    let snapshot = paint_to_pixels(&mapper, 2.0);
    assert_eq!(snapshot.size(), (40, 20));
    let bitmap = snapshot.bitmap().unwrap();
    assert_eq!(bitmap.pixel(5, 5), Some([255, 0, 0, 255]));
    assert_eq!(bitmap.pixel(19, 19), Some([255, 0, 0, 255]));
    assert_eq!(bitmap.pixel(30, 5), Some([255, 255, 255, 255]));
}

#[test]
fn test_source_mutations_reach_the_pixels() {
    let (mut doc, rect) = scene();
    let mut mapper = SceneMapper::new();
    mapper.attach(&mut doc).unwrap();

    doc.set_attribute(rect, "fill", "#0000ff").unwrap();
    doc.set_attribute(rect, "x", 10.0).unwrap();
    assert_eq!(mapper.update(&doc).unwrap(), 2);

    let snapshot = paint_to_pixels(&mapper, 1.0);
    let bitmap = snapshot.bitmap().unwrap();
    assert_eq!(bitmap.pixel(2, 2), Some([255, 255, 255, 255]));
    assert_eq!(bitmap.pixel(15, 5), Some([0, 0, 255, 255]));

    doc.detach(rect).unwrap();
    mapper.update(&doc).unwrap();
    assert!(mapper.primitive_for(rect).is_none());
    let snapshot = paint_to_pixels(&mapper, 1.0);
    assert_eq!(snapshot.bitmap().unwrap().pixel(15, 5), Some([255, 255, 255, 255]));
}

#[test]
fn test_hidden_group_is_not_painted() {
    let (mut doc, rect) = scene();
    let group = doc.create_element(ElementKind::G);
    doc.set_attribute(group, "visibility", "hidden").unwrap();
    doc.detach(rect).unwrap();
    doc.append_child(group, rect).unwrap();
    doc.append_child(doc.root(), group).unwrap();

    let mut mapper = SceneMapper::new();
    mapper.attach(&mut doc).unwrap();
    let snapshot = paint_to_pixels(&mapper, 1.0);
    assert_eq!(snapshot.bitmap().unwrap().pixel(5, 5), Some([255, 255, 255, 255]));
}

#[test]
fn test_snapshot_outlives_canvas() {
    let (mut doc, _) = scene();
    let mut mapper = SceneMapper::new();
    mapper.attach(&mut doc).unwrap();

    let snapshot = paint_to_pixels(&mapper, 1.0);
    let copy = snapshot.copy().unwrap();
    mapper.dispose();
    assert_eq!(copy.bitmap().unwrap().pixel(0, 0), Some([255, 0, 0, 255]));
}

#[test]
fn test_text_spans_become_runs() {
    let mut doc = SvgDocument::new();
    let text = doc.create_element(ElementKind::Text);
    doc.set_attribute(text, "x", 4.0).unwrap();
    doc.set_attribute(text, "y", 12.0).unwrap();
    for line in ["alpha", "beta"] {
        let span = doc.create_element(ElementKind::TSpan);
        let node = doc.create_text_node(line);
        doc.append_child(span, node).unwrap();
        doc.append_child(text, span).unwrap();
    }
    doc.append_child(doc.root(), text).unwrap();

    let mut mapper = SceneMapper::new();
    mapper.attach(&mut doc).unwrap();
    let mut ctx = RecordingContext::new();
    paint(mapper.tree(), &mut ctx);
    assert_eq!(ctx.texts(), vec!["alpha", "beta"]);

    let first_node = doc.children(doc.children(text)[0])[0];
    doc.set_text(first_node, "gamma").unwrap();
    mapper.update(&doc).unwrap();
    let mut ctx = RecordingContext::new();
    paint(mapper.tree(), &mut ctx);
    assert_eq!(ctx.texts(), vec!["gamma", "beta"]);
}

#[test]
fn test_text_element_reaches_the_pixels() {
    let mut doc = SvgDocument::new();
    let text = doc.create_element(ElementKind::Text);
    doc.set_attribute(text, "x", 1.0).unwrap();
    doc.set_attribute(text, "y", 8.0).unwrap();
    doc.set_attribute(text, "font-size", 9.0).unwrap();
    doc.set_attribute(text, "fill", "#000000").unwrap();
    let node = doc.create_text_node("HH");
    doc.append_child(text, node).unwrap();
    doc.append_child(doc.root(), text).unwrap();

    let mut mapper = SceneMapper::new();
    mapper.attach(&mut doc).unwrap();
    let snapshot = paint_to_pixels(&mapper, 2.0);
    let dark = snapshot
        .bitmap()
        .unwrap()
        .rgba()
        .chunks_exact(4)
        .filter(|p| p[0] < 128)
        .count();
    assert!(dark > 20, "only {dark} dark pixels");
}
