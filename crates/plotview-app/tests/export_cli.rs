//! Scene file -> PNG through the command-line path, plus an interaction
//! round trip through the figure.

use kurbo::Point;
use plotview_app::{
    CliArgs, PlotEngine, PlotFigure, SceneSpecEngine, SizingPolicy, SpecOptions, cli,
    render_snapshot,
};
use plotview_core::{MouseEventSpec, RawPointerEvent};
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use std::time::Duration;

const SCENE: &str = r##"{
    "width": 6, "height": 4,
    "background": "#000000",
    "elements": [
        { "tag": "rect", "attributes": { "id": "bar", "width": 3, "height": 4, "fill": "#00ff00" } }
    ]
}"##;

const LABELLED: &str = r##"{
    "width": 80, "height": 30,
    "background": "#ffffff",
    "css": ".title { font-size: 20px; font-weight: bold; fill: #000000; }",
    "elements": [
        { "tag": "text", "attributes": { "class": "title", "x": 4, "y": 22 }, "text": "Sales" }
    ]
}"##;

fn decode(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
    let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    (info.width, info.height, buf)
}

fn pixel(rgba: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
}

#[test]
fn test_cli_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let scene = dir.path().join("scene.json");
    let config = dir.path().join("config.json");
    let output = dir.path().join("out.png");
    fs::write(&scene, SCENE).unwrap();
    fs::write(&config, r##"{ "export_scale": 2.0, "background": "#ffffff" }"##).unwrap();

    let args = CliArgs::parse([
        scene.display().to_string(),
        output.display().to_string(),
        "--config".to_string(),
        config.display().to_string(),
    ])
    .unwrap();
    let written = cli::run(&args).unwrap();

    let bytes = fs::read(&output).unwrap();
    assert_eq!(bytes.len(), written);
    let (width, height, rgba) = decode(&bytes);
    assert_eq!((width, height), (12, 8));
    assert_eq!(pixel(&rgba, width, 1, 1), [0, 255, 0, 255]);
    // Config background replaces the scene's black.
    assert_eq!(pixel(&rgba, width, 10, 6), [255, 255, 255, 255]);
}

#[test]
fn test_cli_renders_text_labels() {
    let dir = tempfile::tempdir().unwrap();
    let scene = dir.path().join("labelled.json");
    let output = dir.path().join("labelled.png");
    fs::write(&scene, LABELLED).unwrap();

    let args = CliArgs::parse([scene.display().to_string(), output.display().to_string()]).unwrap();
    cli::run(&args).unwrap();

    let (width, height, rgba) = decode(&fs::read(&output).unwrap());
    assert_eq!((width, height), (80, 30));
    let dark = rgba.chunks_exact(4).filter(|p| p[0] < 128).count();
    assert!(dark > 40, "only {dark} dark pixels");
    // Right of the label stays background.
    assert_eq!(pixel(&rgba, width, 78, 15), [255, 255, 255, 255]);
}

#[test]
fn test_cli_reports_engine_failure() {
    let dir = tempfile::tempdir().unwrap();
    let scene = dir.path().join("scene.json");
    fs::write(&scene, r##"{ "error": "Data column `x` not found" }"##).unwrap();
    let args = CliArgs::parse([
        scene.display().to_string(),
        dir.path().join("out.png").display().to_string(),
    ])
    .unwrap();

    let err = cli::run(&args).unwrap_err();
    assert_eq!(err.to_string(), "Data column `x` not found");
    assert!(!dir.path().join("out.png").exists());
}

#[test]
fn test_click_handler_mutates_scene() {
    let engine = SceneSpecEngine;
    let processed = engine
        .process_spec(&serde_json::from_str(SCENE).unwrap(), &SpecOptions::default())
        .unwrap();
    let mut figure = PlotFigure::new();
    figure.update(processed, SizingPolicy::Fixed, |_| {}).unwrap();
    figure.resize(10.0, 4.0);

    let clicks = Rc::new(RefCell::new(Vec::new()));
    let sink = clicks.clone();
    let _registration = figure
        .pointer()
        .event_peer()
        .add_event_handler(MouseEventSpec::Clicked, move |e| sink.borrow_mut().push((e.x(), e.y())));

    // Host pixels at density 2; the plot is centered 2px in.
    let at = Point::new(6.0, 2.0);
    let pointer = figure.pointer_mut();
    pointer.handle(RawPointerEvent::press(at, Duration::ZERO).with_density(2.0));
    pointer.handle(RawPointerEvent::release(at, Duration::from_millis(40)).with_density(2.0));
    assert_eq!(*clicks.borrow(), vec![(1, 1)]);

    let doc = figure.document_mut().unwrap();
    let bar = doc.children(doc.root())[0];
    doc.set_attribute(bar, "fill", "#0000ff").unwrap();
    figure.sync().unwrap();

    // Export ignores the panel offset.
    let job = render_snapshot(&figure, 1.0).unwrap();
    assert_eq!(job.bitmap().pixel(1, 1), Some([0, 0, 255, 255]));
    assert_eq!(job.bitmap().pixel(4, 1), Some([0, 0, 0, 255]));
}

#[test]
fn test_click_on_fitted_figure_hits_painted_pixel() {
    let engine = SceneSpecEngine;
    let spec = serde_json::json!({
        "width": 100, "height": 100,
        "background": "#ffffff",
        "elements": [
            { "tag": "rect", "attributes": { "width": 50, "height": 50, "fill": "#ff0000" } }
        ]
    });
    let processed = engine.process_spec(&spec, &SpecOptions::default()).unwrap();
    let mut figure = PlotFigure::new();
    figure
        .update(processed, SizingPolicy::fit_container(true), |_| {})
        .unwrap();
    figure.resize(200.0, 200.0);

    let clicks = Rc::new(RefCell::new(Vec::new()));
    let sink = clicks.clone();
    let _registration = figure
        .pointer()
        .event_peer()
        .add_event_handler(MouseEventSpec::Clicked, move |e| sink.borrow_mut().push((e.x(), e.y())));

    for (x, y) in [(150.0, 150.0), (40.0, 40.0)] {
        let at = Point::new(x, y);
        let pointer = figure.pointer_mut();
        pointer.handle(RawPointerEvent::press(at, Duration::from_secs(1)));
        pointer.handle(RawPointerEvent::release(at, Duration::from_millis(1040)));
        pointer.reset();
    }
    assert_eq!(*clicks.borrow(), vec![(75, 75), (20, 20)]);

    // The exported pixels under those clicks agree with the scene.
    let job = render_snapshot(&figure, 1.0).unwrap();
    assert_eq!((job.width(), job.height()), (200, 200));
    assert_eq!(job.bitmap().pixel(150, 150), Some([255, 255, 255, 255]));
    assert_eq!(job.bitmap().pixel(40, 40), Some([255, 0, 0, 255]));
}
