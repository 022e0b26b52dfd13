//! Tree synchronizer: keeps a primitive tree in step with an abstract
//! element tree.

use crate::attr::{self, parse_font_family};
use crate::primitives::{Primitive, PrimitiveId, PrimitiveKind, PrimitiveTree, StructureError};
use plotview_core::svg::{
    self, AttributeValue, ChangeFeed, ElementId, ElementKind, SceneError, StyleSheet, SvgChange,
    SvgDocument, color_to_hex,
};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that abort a sync. Attribute problems never do; they are logged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error("Root element <{0}> has no primitive counterpart")]
    UnsupportedRoot(&'static str),
    #[error("Scene mapper is not attached")]
    NotAttached,
}

/// Result type for synchronization.
pub type SyncResult<T> = Result<T, SyncError>;

/// Primitive kind created for an element kind. `None` for kinds that are
/// folded into their text owner or not supported.
pub fn primitive_kind_for(kind: ElementKind) -> Option<PrimitiveKind> {
    let kind = match kind {
        ElementKind::Svg => PrimitiveKind::Pane,
        ElementKind::G | ElementKind::Style | ElementKind::Defs => PrimitiveKind::Group,
        ElementKind::Rect => PrimitiveKind::Rect,
        ElementKind::Ellipse => PrimitiveKind::Ellipse,
        ElementKind::Circle => PrimitiveKind::Circle,
        ElementKind::Line => PrimitiveKind::Line,
        ElementKind::Path => PrimitiveKind::Path,
        ElementKind::Text => PrimitiveKind::Text,
        ElementKind::Image => PrimitiveKind::Image,
        ElementKind::TSpan | ElementKind::TextNode | ElementKind::ClipPath => return None,
    };
    Some(kind)
}

/// Maps an [`SvgDocument`] onto a [`PrimitiveTree`] and keeps it current.
///
/// Each element is either unmapped, mapped to exactly one primitive, or
/// disposed. Text nodes and spans below a text element are not mapped; they
/// are owned by the text element and flattened into its content.
#[derive(Debug, Default)]
pub struct SceneMapper {
    tree: PrimitiveTree,
    mapped: HashMap<ElementId, PrimitiveId>,
    /// Text node or span -> text element whose content it feeds.
    text_owners: HashMap<ElementId, ElementId>,
    feed: Option<ChangeFeed>,
    style_sheet: Option<StyleSheet>,
}

impl SceneMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style_sheet(mut self, style_sheet: StyleSheet) -> Self {
        self.style_sheet = Some(style_sheet);
        self
    }

    /// Style sheet consulted for text elements. Takes effect on the next
    /// attach.
    pub fn set_style_sheet(&mut self, style_sheet: Option<StyleSheet>) {
        self.style_sheet = style_sheet;
    }

    pub fn tree(&self) -> &PrimitiveTree {
        &self.tree
    }

    pub fn root(&self) -> Option<PrimitiveId> {
        self.tree.root()
    }

    pub fn is_attached(&self) -> bool {
        self.feed.is_some()
    }

    /// Primitive currently rendering `element`.
    pub fn primitive_for(&self, element: ElementId) -> Option<PrimitiveId> {
        self.mapped.get(&element).copied()
    }

    pub fn mapped_count(&self) -> usize {
        self.mapped.len()
    }

    /// Map the whole document, replacing any previous mapping.
    pub fn attach(&mut self, doc: &mut SvgDocument) -> SyncResult<PrimitiveId> {
        self.dispose();
        self.feed = Some(doc.subscribe());

        let root = doc.root();
        let kind = doc.kind(root).ok_or(SceneError::UnknownElement(root))?;
        let id = self
            .map_element(doc, root)?
            .ok_or(SyncError::UnsupportedRoot(kind.tag()))?;
        self.tree.set_root(id)?;
        log::debug!("Mapped scene: {} primitives", self.tree.len());
        Ok(id)
    }

    /// Apply pending source changes. Returns the number of changes handled.
    pub fn update(&mut self, doc: &SvgDocument) -> SyncResult<usize> {
        let changes = self.feed.as_ref().ok_or(SyncError::NotAttached)?.drain();
        let count = changes.len();
        for change in changes {
            self.apply_change(doc, change)?;
        }
        Ok(count)
    }

    /// Drop every primitive and stop observing the source.
    pub fn dispose(&mut self) {
        if let Some(root) = self.tree.root() {
            log::trace!("Disposing {} primitives", self.tree.subtree(root).len());
        }
        self.tree = PrimitiveTree::new();
        self.mapped.clear();
        self.text_owners.clear();
        self.feed = None;
    }

    fn apply_change(&mut self, doc: &SvgDocument, change: SvgChange) -> SyncResult<()> {
        match change {
            SvgChange::AttributeChanged { element, name } => {
                let Some(&id) = self.mapped.get(&element) else {
                    return Ok(());
                };
                let is_text = self.tree.get(id).map(Primitive::kind) == Some(PrimitiveKind::Text);
                match doc.attribute(element, &name) {
                    Some(value) if !is_text => {
                        if let Some(prim) = self.tree.get_mut(id) {
                            translate(prim, &name, value);
                        }
                    }
                    _ => self.refresh(doc, element, id)?,
                }
            }
            SvgChange::ChildAdded { parent, .. } | SvgChange::ChildRemoved { parent, .. } => {
                if let Some(&owner) = self.text_owners.get(&parent) {
                    self.sync_text(doc, owner)?;
                } else if let Some(&id) = self.mapped.get(&parent) {
                    match self.tree.get(id).map(Primitive::kind) {
                        Some(PrimitiveKind::Text) => self.sync_text(doc, parent)?,
                        Some(kind) if kind.is_container() => self.sync_children(doc, parent)?,
                        _ => {}
                    }
                }
            }
            SvgChange::TextChanged { element } => {
                if let Some(&owner) = self.text_owners.get(&element) {
                    self.sync_text(doc, owner)?;
                }
            }
        }
        Ok(())
    }

    /// Create the primitive for `element` and, recursively, its children.
    /// Returns `None` for elements that have no counterpart.
    fn map_element(&mut self, doc: &SvgDocument, element: ElementId) -> SyncResult<Option<PrimitiveId>> {
        let kind = doc.kind(element).ok_or(SceneError::UnknownElement(element))?;
        let Some(prim_kind) = primitive_kind_for(kind) else {
            log::warn!("Unsupported element <{}> skipped", kind.tag());
            return Ok(None);
        };

        let mut prim = Primitive::new(prim_kind).with_source(element);
        apply_properties(doc, self.style_sheet.as_ref(), element, &mut prim);
        let id = self.tree.insert(prim);
        self.mapped.insert(element, id);
        self.watch(element);

        if prim_kind == PrimitiveKind::Text {
            self.sync_text(doc, element)?;
        } else if prim_kind.is_container() {
            self.sync_children(doc, element)?;
        }
        Ok(Some(id))
    }

    /// Make the primitive children of `element` match its source children.
    fn sync_children(&mut self, doc: &SvgDocument, element: ElementId) -> SyncResult<()> {
        let parent = *self.mapped.get(&element).ok_or(SceneError::UnknownElement(element))?;
        let desired: Vec<ElementId> = doc
            .children(element)
            .iter()
            .copied()
            .filter(|c| match doc.kind(*c) {
                Some(kind) if primitive_kind_for(kind).is_some() => true,
                Some(ElementKind::TextNode | ElementKind::TSpan) => false,
                Some(kind) => {
                    log::warn!("Unsupported element <{}> skipped", kind.tag());
                    false
                }
                None => false,
            })
            .collect();

        let current = self.tree.children(parent).to_vec();
        for child in current {
            let source = self.tree.get(child).and_then(Primitive::source);
            if source.is_none_or(|s| !desired.contains(&s)) {
                self.unmap(child)?;
            }
        }

        for (index, source) in desired.into_iter().enumerate() {
            if let Some(&existing) = self.mapped.get(&source) {
                if self.tree.parent(existing) == Some(parent) {
                    self.tree.move_child(existing, index)?;
                    continue;
                }
                // Moved here from elsewhere: start from a fresh primitive.
                self.unmap(existing)?;
            }
            if let Some(id) = self.map_element(doc, source)? {
                self.tree.insert_child(parent, index, id)?;
            }
        }
        Ok(())
    }

    /// Recompute the content of a text element from its text nodes and
    /// one level of spans, joined with newlines.
    fn sync_text(&mut self, doc: &SvgDocument, element: ElementId) -> SyncResult<()> {
        let id = *self.mapped.get(&element).ok_or(SceneError::UnknownElement(element))?;
        self.release_text_nodes(element);

        let mut owned = Vec::new();
        let mut leaves = Vec::new();
        for &child in doc.children(element) {
            match doc.kind(child) {
                Some(ElementKind::TextNode) => {
                    owned.push(child);
                    leaves.extend(doc.text(child));
                }
                Some(ElementKind::TSpan) => {
                    owned.push(child);
                    for &leaf in doc.children(child) {
                        if doc.kind(leaf) == Some(ElementKind::TextNode) {
                            owned.push(leaf);
                            leaves.extend(doc.text(leaf));
                        }
                    }
                }
                Some(other) => log::debug!("Ignoring <{}> inside <text>", other.tag()),
                None => {}
            }
        }
        for node in owned {
            self.text_owners.insert(node, element);
            self.watch(node);
        }

        let content = leaves.join("\n");
        if let Some(text) = self.tree.get_mut(id).and_then(Primitive::as_text_mut) {
            text.content = content;
        }
        Ok(())
    }

    /// Re-derive every property of a mapped element from scratch.
    fn refresh(&mut self, doc: &SvgDocument, element: ElementId, id: PrimitiveId) -> SyncResult<()> {
        let Some(prim) = self.tree.get_mut(id) else {
            return Ok(());
        };
        prim.reset_properties();
        apply_properties(doc, self.style_sheet.as_ref(), element, prim);
        if prim.kind() == PrimitiveKind::Text {
            self.sync_text(doc, element)?;
        }
        Ok(())
    }

    /// Dispose a primitive subtree and forget its sources.
    fn unmap(&mut self, id: PrimitiveId) -> SyncResult<()> {
        for prim in self.tree.dispose(id)? {
            if let Some(source) = prim.source() {
                self.mapped.remove(&source);
                self.unwatch(source);
                self.release_text_nodes(source);
            }
        }
        Ok(())
    }

    fn release_text_nodes(&mut self, owner: ElementId) {
        let feed = self.feed.as_ref();
        self.text_owners.retain(|node, o| {
            if *o != owner {
                return true;
            }
            if let Some(feed) = feed {
                feed.unwatch(*node);
            }
            false
        });
    }

    fn watch(&self, element: ElementId) {
        if let Some(feed) = &self.feed {
            feed.watch(element);
        }
    }

    fn unwatch(&self, element: ElementId) {
        if let Some(feed) = &self.feed {
            feed.unwatch(element);
        }
    }
}

/// Apply the style sheet (text only) and then every source attribute, so
/// an element's own `fill` or inline style wins over its class style.
fn apply_properties(
    doc: &SvgDocument,
    style_sheet: Option<&StyleSheet>,
    element: ElementId,
    prim: &mut Primitive,
) {
    let style = style_sheet.zip(doc.attribute(element, svg::attr::CLASS)).and_then(
        |(sheet, class)| match (prim.kind(), class.as_str()) {
            (PrimitiveKind::Text, Some(class)) => sheet.text_style(class).cloned(),
            _ => None,
        },
    );

    if let Some(style) = &style {
        if let Some(text) = prim.as_text_mut() {
            text.font_family = parse_font_family(&style.family);
            text.font_size = style.size;
            text.face = style.face;
        }
        let fill = AttributeValue::Text(format!("fill:{};", color_to_hex(style.color)));
        translate(prim, svg::attr::STYLE, &fill);
    }

    for (name, value) in doc.attributes(element) {
        translate(prim, name, value);
    }
}

fn translate(prim: &mut Primitive, name: &str, value: &AttributeValue) {
    if let Err(e) = attr::set_attribute(prim, name, value) {
        log::warn!("Failed to map `{}` on {}: {}", name, prim.kind().name(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Drawing;
    use peniko::Color;
    use plotview_core::svg::{FontFace, TextStyle};

    fn kinds(mapper: &SceneMapper, parent: PrimitiveId) -> Vec<PrimitiveKind> {
        mapper
            .tree()
            .children(parent)
            .iter()
            .map(|c| mapper.tree().get(*c).unwrap().kind())
            .collect()
    }

    fn text_content(mapper: &SceneMapper, element: ElementId) -> String {
        let id = mapper.primitive_for(element).unwrap();
        mapper.tree().get(id).unwrap().as_text().unwrap().content.clone()
    }

    #[test]
    fn test_initial_mapping_is_isomorphic() {
        let mut doc = SvgDocument::new();
        let root = doc.root();
        let g = doc.create_element(ElementKind::G);
        let rect = doc.create_element(ElementKind::Rect);
        let circle = doc.create_element(ElementKind::Circle);
        let clip = doc.create_element(ElementKind::ClipPath);
        doc.append_child(root, rect).unwrap();
        doc.append_child(root, g).unwrap();
        doc.append_child(root, clip).unwrap();
        doc.append_child(g, circle).unwrap();

        let mut mapper = SceneMapper::new();
        let pane = mapper.attach(&mut doc).unwrap();

        assert_eq!(mapper.tree().get(pane).unwrap().kind(), PrimitiveKind::Pane);
        assert_eq!(kinds(&mapper, pane), vec![PrimitiveKind::Rect, PrimitiveKind::Group]);
        let group = mapper.primitive_for(g).unwrap();
        assert_eq!(kinds(&mapper, group), vec![PrimitiveKind::Circle]);
        assert!(mapper.primitive_for(clip).is_none());
        assert_eq!(mapper.tree().len(), 4);
    }

    #[test]
    fn test_attribute_changes_are_synced() {
        let mut doc = SvgDocument::new();
        let rect = doc.create_element(ElementKind::Rect);
        doc.set_attribute(rect, "width", 10.0).unwrap();
        doc.append_child(doc.root(), rect).unwrap();

        let mut mapper = SceneMapper::new();
        mapper.attach(&mut doc).unwrap();
        doc.set_attribute(rect, "width", 25.0).unwrap();
        doc.set_attribute(rect, "bogus", "x").unwrap();
        assert_eq!(mapper.update(&doc).unwrap(), 2);

        let prim = mapper.tree().get(mapper.primitive_for(rect).unwrap()).unwrap();
        match prim.drawing() {
            Drawing::Rect(r) => assert!((r.width - 25.0).abs() < f64::EPSILON),
            other => panic!("unexpected drawing {other:?}"),
        }
    }

    #[test]
    fn test_removed_attribute_resets_property() {
        let mut doc = SvgDocument::new();
        let rect = doc.create_element(ElementKind::Rect);
        doc.set_attribute(rect, "visibility", "hidden").unwrap();
        doc.append_child(doc.root(), rect).unwrap();

        let mut mapper = SceneMapper::new();
        mapper.attach(&mut doc).unwrap();
        let id = mapper.primitive_for(rect).unwrap();
        assert!(!mapper.tree().get(id).unwrap().visible);

        doc.remove_attribute(rect, "visibility").unwrap();
        mapper.update(&doc).unwrap();
        assert!(mapper.tree().get(id).unwrap().visible);
    }

    #[test]
    fn test_child_insert_remove_and_reorder() {
        let mut doc = SvgDocument::new();
        let root = doc.root();
        let a = doc.create_element(ElementKind::Rect);
        let b = doc.create_element(ElementKind::Circle);
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();

        let mut mapper = SceneMapper::new();
        let pane = mapper.attach(&mut doc).unwrap();

        let line = doc.create_element(ElementKind::Line);
        doc.insert_child(root, 1, line).unwrap();
        mapper.update(&doc).unwrap();
        assert_eq!(
            kinds(&mapper, pane),
            vec![PrimitiveKind::Rect, PrimitiveKind::Line, PrimitiveKind::Circle]
        );

        doc.move_child(root, 2, 0).unwrap();
        mapper.update(&doc).unwrap();
        assert_eq!(
            kinds(&mapper, pane),
            vec![PrimitiveKind::Circle, PrimitiveKind::Rect, PrimitiveKind::Line]
        );

        doc.remove_child(root, 1).unwrap();
        mapper.update(&doc).unwrap();
        assert_eq!(kinds(&mapper, pane), vec![PrimitiveKind::Circle, PrimitiveKind::Line]);
        assert!(mapper.primitive_for(a).is_none());
        assert_eq!(mapper.tree().len(), 3);
    }

    #[test]
    fn test_reattach_elsewhere_maps_fresh() {
        let mut doc = SvgDocument::new();
        let root = doc.root();
        let g1 = doc.create_element(ElementKind::G);
        let g2 = doc.create_element(ElementKind::G);
        let rect = doc.create_element(ElementKind::Rect);
        doc.append_child(root, g1).unwrap();
        doc.append_child(root, g2).unwrap();
        doc.append_child(g1, rect).unwrap();

        let mut mapper = SceneMapper::new();
        mapper.attach(&mut doc).unwrap();
        let before = mapper.primitive_for(rect).unwrap();

        doc.detach(rect).unwrap();
        mapper.update(&doc).unwrap();
        assert!(mapper.primitive_for(rect).is_none());
        assert!(!mapper.tree().contains(before));

        doc.append_child(g2, rect).unwrap();
        mapper.update(&doc).unwrap();
        let after = mapper.primitive_for(rect).unwrap();
        assert_ne!(before, after);
        assert_eq!(mapper.tree().parent(after), mapper.primitive_for(g2));
        assert_eq!(mapper.tree().len(), 4);
    }

    #[test]
    fn test_move_between_groups_in_one_batch() {
        let mut doc = SvgDocument::new();
        let root = doc.root();
        let g1 = doc.create_element(ElementKind::G);
        let g2 = doc.create_element(ElementKind::G);
        let rect = doc.create_element(ElementKind::Rect);
        doc.append_child(root, g1).unwrap();
        doc.append_child(root, g2).unwrap();
        doc.append_child(g1, rect).unwrap();

        let mut mapper = SceneMapper::new();
        mapper.attach(&mut doc).unwrap();
        doc.detach(rect).unwrap();
        doc.append_child(g2, rect).unwrap();
        mapper.update(&doc).unwrap();

        let g1_prim = mapper.primitive_for(g1).unwrap();
        let g2_prim = mapper.primitive_for(g2).unwrap();
        assert!(mapper.tree().children(g1_prim).is_empty());
        assert_eq!(mapper.tree().children(g2_prim).len(), 1);
        assert_eq!(mapper.tree().len(), 4);
    }

    #[test]
    fn test_text_content_flattens_spans() {
        let mut doc = SvgDocument::new();
        let text = doc.create_element(ElementKind::Text);
        doc.append_child(doc.root(), text).unwrap();
        let mut spans = Vec::new();
        for n in 0..2 {
            let span = doc.create_element(ElementKind::TSpan);
            for m in 0..2 {
                let node = doc.create_text_node(format!("{n}{m}"));
                doc.append_child(span, node).unwrap();
            }
            doc.append_child(text, span).unwrap();
            spans.push(span);
        }

        let mut mapper = SceneMapper::new();
        mapper.attach(&mut doc).unwrap();
        assert_eq!(text_content(&mapper, text), "00\n01\n10\n11");
        assert_eq!(mapper.tree().len(), 2);

        let leaf = doc.children(spans[1])[0];
        doc.set_text(leaf, "X").unwrap();
        mapper.update(&doc).unwrap();
        assert_eq!(text_content(&mapper, text), "00\n01\nX\n11");

        let extra = doc.create_text_node("tail");
        doc.append_child(spans[0], extra).unwrap();
        mapper.update(&doc).unwrap();
        assert_eq!(text_content(&mapper, text), "00\n01\ntail\nX\n11");

        doc.remove_child(text, 0).unwrap();
        mapper.update(&doc).unwrap();
        assert_eq!(text_content(&mapper, text), "X\n11");
    }

    #[test]
    fn test_style_sheet_applies_to_text() {
        let sheet = StyleSheet::new().with_style(
            "title",
            TextStyle {
                family: "\"Fira Sans\", serif".to_string(),
                face: FontFace::BOLD,
                size: 18.0,
                color: Color::from_rgba8(0, 0, 255, 255),
            },
        );
        let mut doc = SvgDocument::new();
        let text = doc.create_element(ElementKind::Text);
        doc.set_attribute(text, "class", "plot title").unwrap();
        doc.append_child(doc.root(), text).unwrap();
        let red = doc.create_element(ElementKind::Text);
        doc.set_attribute(red, "class", "title").unwrap();
        doc.set_attribute(red, "fill", "#ff0000").unwrap();
        doc.append_child(doc.root(), red).unwrap();
        let inline = doc.create_element(ElementKind::Text);
        doc.set_attribute(inline, "class", "title").unwrap();
        doc.set_attribute(inline, "style", "fill: #00ff00").unwrap();
        doc.append_child(doc.root(), inline).unwrap();

        let mut mapper = SceneMapper::new().with_style_sheet(sheet);
        mapper.attach(&mut doc).unwrap();
        let fill_of = |element: ElementId| {
            let prim = mapper.tree().get(mapper.primitive_for(element).unwrap()).unwrap();
            let c = prim.paint.fill.unwrap().to_rgba8();
            [c.r, c.g, c.b]
        };
        let prim = mapper.tree().get(mapper.primitive_for(text).unwrap()).unwrap();
        let t = prim.as_text().unwrap();
        assert_eq!(t.font_family, vec!["Fira Sans", "serif"]);
        assert!((t.font_size - 18.0).abs() < f64::EPSILON);
        assert_eq!(t.face, FontFace::BOLD);
        assert_eq!(fill_of(text), [0, 0, 255]);
        assert_eq!(fill_of(red), [255, 0, 0]);
        assert_eq!(fill_of(inline), [0, 255, 0]);
    }

    #[test]
    fn test_update_requires_attach() {
        let doc = SvgDocument::new();
        let mut mapper = SceneMapper::new();
        assert_eq!(mapper.update(&doc), Err(SyncError::NotAttached));
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut doc = SvgDocument::new();
        let rect = doc.create_element(ElementKind::Rect);
        doc.append_child(doc.root(), rect).unwrap();
        let mut mapper = SceneMapper::new();
        mapper.attach(&mut doc).unwrap();
        mapper.dispose();
        mapper.dispose();
        assert!(mapper.tree().is_empty());
        assert!(!mapper.is_attached());
        assert_eq!(mapper.mapped_count(), 0);
    }
}
