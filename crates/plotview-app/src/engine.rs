//! Plotting engine contract and a JSON scene engine.
//!
//! A plotting engine turns a declarative spec into a scene document plus the
//! metadata a host needs to present it. [`SceneSpecEngine`] accepts scenes
//! already expressed as nested JSON elements:
//!
//! ```json
//! {
//!   "width": 200, "height": 100, "background": "#ffffff",
//!   "css": ".title { font-size: 16px; font-weight: bold; }",
//!   "elements": [
//!     { "tag": "rect", "attributes": { "id": "bar", "width": 40, "height": 80, "fill": "steelblue" } },
//!     { "tag": "text", "attributes": { "class": "title", "y": 20 }, "text": "Sales" }
//!   ]
//! }
//! ```

use indexmap::IndexMap;
use kurbo::Size;
use peniko::Color;
use plotview_core::svg::{
    AttributeValue, ElementId, ElementKind, StyleSheet, SvgDocument, attr, parse_css_color,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Background used when a spec names none.
pub const DEFAULT_BACKGROUND: Color = Color::WHITE;

/// A spec the engine could not process. The message is meant for users.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineFailure {
    pub message: String,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Options passed alongside a spec.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpecOptions {
    /// Replaces the size declared by the spec.
    pub size: Option<Size>,
}

/// Output of a successful [`PlotEngine::process_spec`].
#[derive(Debug)]
pub struct ProcessedSpec {
    pub document: SvgDocument,
    pub style_sheet: StyleSheet,
    pub background: Color,
    /// Intrinsic plot size in logical pixels.
    pub size: Size,
    /// Non-fatal diagnostics produced while processing.
    pub messages: Vec<String>,
}

/// Attribute edits addressed to the element whose `id` attribute matches
/// `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecOverride {
    pub target: String,
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
}

/// Spec in, scene out.
pub trait PlotEngine {
    fn process_spec(&self, spec: &Value, options: &SpecOptions) -> Result<ProcessedSpec, EngineFailure>;

    fn apply_override(
        &self,
        processed: ProcessedSpec,
        overrides: &[SpecOverride],
    ) -> Result<ProcessedSpec, EngineFailure>;
}

#[derive(Debug, Clone, Deserialize)]
struct SceneSpec {
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    css: Option<String>,
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default)]
    elements: Vec<ElementSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct ElementSpec {
    tag: String,
    #[serde(default)]
    attributes: IndexMap<String, Value>,
    #[serde(default)]
    children: Vec<ElementSpec>,
    #[serde(default)]
    text: Option<String>,
}

/// Engine for scenes written as JSON element trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneSpecEngine;

impl SceneSpecEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PlotEngine for SceneSpecEngine {
    fn process_spec(&self, spec: &Value, options: &SpecOptions) -> Result<ProcessedSpec, EngineFailure> {
        if let Some(error) = spec.get("error").and_then(Value::as_str) {
            return Err(EngineFailure::new(error));
        }
        let scene = SceneSpec::deserialize(spec)?;

        let size = options.size.unwrap_or(Size::new(
            scene.width.unwrap_or_default(),
            scene.height.unwrap_or_default(),
        ));
        if !(size.width > 0.0 && size.height > 0.0) {
            return Err(EngineFailure::new(format!(
                "Plot size must be positive, got {}x{}",
                size.width, size.height
            )));
        }

        let mut messages = scene.messages;
        let background = match scene.background.as_deref() {
            Some(css) => parse_css_color(css).unwrap_or_else(|| {
                messages.push(format!("Invalid background color `{css}`, using white"));
                DEFAULT_BACKGROUND
            }),
            None => DEFAULT_BACKGROUND,
        };
        let style_sheet = scene
            .css
            .as_deref()
            .map(StyleSheet::parse_css)
            .unwrap_or_default();

        let mut document = SvgDocument::new();
        let root = document.root();
        set_scene_attribute(&mut document, root, attr::WIDTH, AttributeValue::Number(size.width))?;
        set_scene_attribute(&mut document, root, attr::HEIGHT, AttributeValue::Number(size.height))?;
        for element in &scene.elements {
            build_element(&mut document, root, element, &mut messages)?;
        }
        log::debug!(
            "Processed scene spec: {} elements, {} messages",
            document.len(),
            messages.len()
        );

        Ok(ProcessedSpec {
            document,
            style_sheet,
            background,
            size,
            messages,
        })
    }

    fn apply_override(
        &self,
        mut processed: ProcessedSpec,
        overrides: &[SpecOverride],
    ) -> Result<ProcessedSpec, EngineFailure> {
        for spec_override in overrides {
            let Some(target) = find_by_id(&processed.document, &spec_override.target) else {
                processed
                    .messages
                    .push(format!("Override target `{}` not found", spec_override.target));
                continue;
            };
            for (name, value) in &spec_override.attributes {
                match json_to_attribute(value) {
                    Ok(Some(value)) => set_scene_attribute(&mut processed.document, target, name, value)?,
                    Ok(None) => {
                        if let Err(e) = processed.document.remove_attribute(target, name) {
                            return Err(EngineFailure::new(e.to_string()));
                        }
                    }
                    Err(reason) => processed.messages.push(format!("Attribute `{name}` {reason}")),
                }
            }
        }
        Ok(processed)
    }
}

impl From<serde_json::Error> for EngineFailure {
    fn from(e: serde_json::Error) -> Self {
        EngineFailure::new(format!("Invalid scene spec: {e}"))
    }
}

fn build_element(
    doc: &mut SvgDocument,
    parent: ElementId,
    spec: &ElementSpec,
    messages: &mut Vec<String>,
) -> Result<(), EngineFailure> {
    let Some(kind) = ElementKind::from_tag(&spec.tag) else {
        messages.push(format!("Unknown element <{}> skipped", spec.tag));
        return Ok(());
    };
    if kind == ElementKind::TextNode {
        let node = doc.create_text_node(spec.text.clone().unwrap_or_default());
        return attach(doc, parent, node);
    }

    let id = doc.create_element(kind);
    for (name, value) in &spec.attributes {
        match json_to_attribute(value) {
            Ok(Some(value)) => set_scene_attribute(doc, id, name, value)?,
            Ok(None) => {}
            Err(reason) => messages.push(format!("Attribute `{name}` on <{}> {reason}", spec.tag)),
        }
    }
    if let Some(text) = &spec.text {
        let node = doc.create_text_node(text.clone());
        attach(doc, id, node)?;
    }
    for child in &spec.children {
        build_element(doc, id, child, messages)?;
    }
    attach(doc, parent, id)
}

fn attach(doc: &mut SvgDocument, parent: ElementId, child: ElementId) -> Result<(), EngineFailure> {
    doc.append_child(parent, child)
        .map_err(|e| EngineFailure::new(e.to_string()))
}

fn set_scene_attribute(
    doc: &mut SvgDocument,
    id: ElementId,
    name: &str,
    value: AttributeValue,
) -> Result<(), EngineFailure> {
    doc.set_attribute(id, name, value)
        .map_err(|e| EngineFailure::new(e.to_string()))
}

/// `Ok(None)` for `null`, which means "no value".
fn json_to_attribute(value: &Value) -> Result<Option<AttributeValue>, &'static str> {
    let value = match value {
        Value::Null => return Ok(None),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::Number(n.as_f64().ok_or("is not a finite number")?),
        Value::String(s) => AttributeValue::Text(s.clone()),
        Value::Array(items) => {
            let parts = items
                .iter()
                .map(|item| match item {
                    Value::Number(n) => Ok(n.to_string()),
                    Value::String(s) => Ok(s.clone()),
                    _ => Err("has a non-scalar list item"),
                })
                .collect::<Result<Vec<_>, _>>()?;
            AttributeValue::Text(parts.join(" "))
        }
        Value::Object(_) => return Err("has an object value"),
    };
    Ok(Some(value))
}

fn find_by_id(doc: &SvgDocument, target: &str) -> Option<ElementId> {
    doc.subtree(doc.root())
        .into_iter()
        .find(|id| doc.attribute(*id, attr::ID).and_then(AttributeValue::as_str) == Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn process(spec: Value) -> Result<ProcessedSpec, EngineFailure> {
        SceneSpecEngine::new().process_spec(&spec, &SpecOptions::default())
    }

    #[test]
    fn test_builds_document() {
        let processed = process(json!({
            "width": 200, "height": 100,
            "elements": [
                { "tag": "g", "children": [
                    { "tag": "rect", "attributes": { "width": 10, "fill": "red" } }
                ]},
                { "tag": "text", "text": "hello" }
            ]
        }))
        .unwrap();

        let doc = &processed.document;
        let root = doc.root();
        assert_eq!(processed.size, Size::new(200.0, 100.0));
        assert_eq!(doc.attribute(root, attr::WIDTH), Some(&AttributeValue::Number(200.0)));
        let children = doc.children(root);
        assert_eq!(children.len(), 2);
        assert_eq!(doc.kind(children[0]), Some(ElementKind::G));
        let rect = doc.children(children[0])[0];
        assert_eq!(doc.attribute(rect, "fill").and_then(AttributeValue::as_str), Some("red"));
        let node = doc.children(children[1])[0];
        assert_eq!(doc.text(node), Some("hello"));
        assert!(processed.messages.is_empty());
    }

    #[test]
    fn test_failure_message() {
        let err = process(json!({ "error": "No data" })).unwrap_err();
        assert_eq!(err.message, "No data");

        let err = process(json!({ "width": 0, "height": 10 })).unwrap_err();
        assert!(err.message.contains("positive"));

        let err = process(json!({ "elements": "nope", "width": 1, "height": 1 })).unwrap_err();
        assert!(err.message.starts_with("Invalid scene spec"));
    }

    #[test]
    fn test_options_override_size() {
        let options = SpecOptions {
            size: Some(Size::new(50.0, 40.0)),
        };
        let processed = SceneSpecEngine
            .process_spec(&json!({ "width": 200, "height": 100 }), &options)
            .unwrap();
        assert_eq!(processed.size, Size::new(50.0, 40.0));
    }

    #[test]
    fn test_unknown_tags_and_bad_values_become_messages() {
        let processed = process(json!({
            "width": 10, "height": 10,
            "background": "chartreuse-ish",
            "elements": [
                { "tag": "marquee" },
                { "tag": "path", "attributes": { "d": { "bad": true }, "stroke-dasharray": [4, 2] } }
            ]
        }))
        .unwrap();
        assert_eq!(processed.messages.len(), 3);
        assert_eq!(processed.background.to_rgba8(), DEFAULT_BACKGROUND.to_rgba8());

        let path = processed.document.children(processed.document.root())[0];
        assert_eq!(
            processed.document.attribute(path, "stroke-dasharray"),
            Some(&AttributeValue::Text("4 2".to_string()))
        );
    }

    #[test]
    fn test_style_sheet_and_background() {
        let processed = process(json!({
            "width": 10, "height": 10,
            "background": "#000000",
            "css": ".title { font-size: 20px; }"
        }))
        .unwrap();
        assert_eq!(processed.background.to_rgba8(), Color::BLACK.to_rgba8());
        let style = processed.style_sheet.text_style("title").unwrap();
        assert!((style.size - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_override() {
        let engine = SceneSpecEngine;
        let processed = process(json!({
            "width": 10, "height": 10,
            "elements": [ { "tag": "rect", "attributes": { "id": "bar", "fill": "red", "opacity": 0.5 } } ]
        }))
        .unwrap();
        let overrides = vec![
            SpecOverride {
                target: "bar".to_string(),
                attributes: IndexMap::from([
                    ("fill".to_string(), json!("blue")),
                    ("opacity".to_string(), Value::Null),
                ]),
            },
            SpecOverride {
                target: "missing".to_string(),
                attributes: IndexMap::new(),
            },
        ];
        let processed = engine.apply_override(processed, &overrides).unwrap();
        let doc = &processed.document;
        let rect = doc.children(doc.root())[0];
        assert_eq!(doc.attribute(rect, "fill").and_then(AttributeValue::as_str), Some("blue"));
        assert!(doc.attribute(rect, "opacity").is_none());
        assert_eq!(processed.messages, vec!["Override target `missing` not found".to_string()]);
    }
}
