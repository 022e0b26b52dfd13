//! Element arena, structural edits and change notification.

use super::{AttributeValue, ElementKind};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::{Rc, Weak};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Structural invariant violations. These are programming errors: callers
/// propagate them, nothing in the crate recovers from them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),
    #[error("Element {child} is already attached to {parent}")]
    AlreadyParented { child: ElementId, parent: ElementId },
    #[error("Child index {index} out of range (len {len})")]
    ChildIndexOutOfRange { index: usize, len: usize },
    #[error("Element {0} cannot hold children")]
    NotAContainer(ElementId),
    #[error("Element {0} is not a text node")]
    NotATextNode(ElementId),
    #[error("Attaching {child} under {parent} would create a cycle")]
    WouldCreateCycle { child: ElementId, parent: ElementId },
    #[error("The root element cannot be attached or removed")]
    RootImmovable,
}

/// Result type for scene graph operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// A change notification.
#[derive(Debug, Clone, PartialEq)]
pub enum SvgChange {
    AttributeChanged { element: ElementId, name: String },
    ChildAdded { parent: ElementId, index: usize, child: ElementId },
    ChildRemoved { parent: ElementId, index: usize, child: ElementId },
    TextChanged { element: ElementId },
}

impl SvgChange {
    /// The element whose observers receive this change.
    pub fn subject(&self) -> ElementId {
        match self {
            SvgChange::AttributeChanged { element, .. } => *element,
            SvgChange::ChildAdded { parent, .. } => *parent,
            SvgChange::ChildRemoved { parent, .. } => *parent,
            SvgChange::TextChanged { element } => *element,
        }
    }
}

#[derive(Debug, Default)]
struct FeedState {
    watched: HashSet<ElementId>,
    pending: VecDeque<SvgChange>,
}

/// Observer handle. The document holds feeds weakly: dropping the last clone
/// of a feed unsubscribes it.
#[derive(Debug, Clone, Default)]
pub struct ChangeFeed {
    state: Rc<RefCell<FeedState>>,
}

impl ChangeFeed {
    /// Start receiving changes whose subject is `id`.
    pub fn watch(&self, id: ElementId) {
        self.state.borrow_mut().watched.insert(id);
    }

    pub fn unwatch(&self, id: ElementId) {
        self.state.borrow_mut().watched.remove(&id);
    }

    pub fn is_watching(&self, id: ElementId) -> bool {
        self.state.borrow().watched.contains(&id)
    }

    pub fn watched_count(&self) -> usize {
        self.state.borrow().watched.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.state.borrow().pending.is_empty()
    }

    /// Take the next pending change.
    pub fn pop(&self) -> Option<SvgChange> {
        self.state.borrow_mut().pending.pop_front()
    }

    /// Take all pending changes.
    pub fn drain(&self) -> Vec<SvgChange> {
        self.state.borrow_mut().pending.drain(..).collect()
    }

    fn offer(&self, change: &SvgChange) {
        let mut state = self.state.borrow_mut();
        if state.watched.contains(&change.subject()) {
            state.pending.push_back(change.clone());
        }
    }
}

#[derive(Debug)]
struct Node {
    kind: ElementKind,
    attributes: IndexMap<String, AttributeValue>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    text: String,
}

impl Node {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent: None,
            text: String::new(),
        }
    }
}

/// Owner of the abstract element tree.
///
/// Children are owned through the parent's ordered child list; the parent
/// link on a child is a plain id. Detached elements stay in the arena until
/// [`SvgDocument::delete`] drops them, so they can be attached elsewhere.
#[derive(Debug)]
pub struct SvgDocument {
    nodes: HashMap<ElementId, Node>,
    root: ElementId,
    feeds: Vec<Weak<RefCell<FeedState>>>,
}

impl Default for SvgDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgDocument {
    /// Create a document with an empty `svg` root.
    pub fn new() -> Self {
        let root = Uuid::new_v4();
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::new(ElementKind::Svg));
        Self {
            nodes,
            root,
            feeds: Vec::new(),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Create a detached element.
    pub fn create_element(&mut self, kind: ElementKind) -> ElementId {
        let id = Uuid::new_v4();
        self.nodes.insert(id, Node::new(kind));
        id
    }

    /// Create a detached text node.
    pub fn create_text_node(&mut self, text: impl Into<String>) -> ElementId {
        let id = Uuid::new_v4();
        let mut node = Node::new(ElementKind::TextNode);
        node.text = text.into();
        self.nodes.insert(id, node);
        id
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.nodes.get(&id).map(|n| n.kind)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Children of `id`, in order. Empty for unknown ids.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&AttributeValue> {
        self.nodes.get(&id).and_then(|n| n.attributes.get(name))
    }

    /// Attributes of `id` in the order they were first set.
    pub fn attributes(&self, id: ElementId) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|n| n.attributes.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Content of a text node.
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.nodes
            .get(&id)
            .filter(|n| n.kind == ElementKind::TextNode)
            .map(|n| n.text.as_str())
    }

    /// Subscribe to changes. The feed watches nothing until told to.
    pub fn subscribe(&mut self) -> ChangeFeed {
        let feed = ChangeFeed::default();
        self.feeds.push(Rc::downgrade(&feed.state));
        feed
    }

    pub fn set_attribute(
        &mut self,
        id: ElementId,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> SceneResult<()> {
        let node = self.node_mut(id)?;
        node.attributes.insert(name.to_string(), value.into());
        self.notify(SvgChange::AttributeChanged {
            element: id,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> SceneResult<Option<AttributeValue>> {
        let node = self.node_mut(id)?;
        let old = node.attributes.shift_remove(name);
        if old.is_some() {
            self.notify(SvgChange::AttributeChanged {
                element: id,
                name: name.to_string(),
            });
        }
        Ok(old)
    }

    /// Replace the content of a text node.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> SceneResult<()> {
        let node = self.node_mut(id)?;
        if node.kind != ElementKind::TextNode {
            return Err(SceneError::NotATextNode(id));
        }
        node.text = text.into();
        self.notify(SvgChange::TextChanged { element: id });
        Ok(())
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> SceneResult<()> {
        let len = self.node(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Insert a detached `child` into `parent` at `index`.
    pub fn insert_child(&mut self, parent: ElementId, index: usize, child: ElementId) -> SceneResult<()> {
        if child == self.root {
            return Err(SceneError::RootImmovable);
        }
        let parent_node = self.node(parent)?;
        if !parent_node.kind.is_container() {
            return Err(SceneError::NotAContainer(parent));
        }
        let len = parent_node.children.len();
        if index > len {
            return Err(SceneError::ChildIndexOutOfRange { index, len });
        }
        if let Some(existing) = self.node(child)?.parent {
            return Err(SceneError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::WouldCreateCycle { child, parent });
        }

        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.notify(SvgChange::ChildAdded {
            parent,
            index,
            child,
        });
        Ok(())
    }

    /// Detach and return the child at `index`.
    pub fn remove_child(&mut self, parent: ElementId, index: usize) -> SceneResult<ElementId> {
        let node = self.node_mut(parent)?;
        let len = node.children.len();
        if index >= len {
            return Err(SceneError::ChildIndexOutOfRange { index, len });
        }
        let child = node.children.remove(index);
        self.node_mut(child)?.parent = None;
        self.notify(SvgChange::ChildRemoved {
            parent,
            index,
            child,
        });
        Ok(child)
    }

    /// Detach `child` from its parent, if it has one.
    pub fn detach(&mut self, child: ElementId) -> SceneResult<()> {
        if child == self.root {
            return Err(SceneError::RootImmovable);
        }
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        let index = self
            .children(parent)
            .iter()
            .position(|c| *c == child)
            .ok_or(SceneError::UnknownElement(child))?;
        self.remove_child(parent, index).map(|_| ())
    }

    /// Move a child within its parent's list.
    pub fn move_child(&mut self, parent: ElementId, from: usize, to: usize) -> SceneResult<()> {
        let len = self.node(parent)?.children.len();
        if to >= len {
            return Err(SceneError::ChildIndexOutOfRange { index: to, len });
        }
        let child = self.remove_child(parent, from)?;
        self.insert_child(parent, to, child)
    }

    /// Drop a detached subtree from the arena.
    pub fn delete(&mut self, id: ElementId) -> SceneResult<()> {
        if id == self.root {
            return Err(SceneError::RootImmovable);
        }
        if let Some(parent) = self.node(id)?.parent {
            return Err(SceneError::AlreadyParented { child: id, parent });
        }
        for descendant in self.subtree(id) {
            self.nodes.remove(&descendant);
        }
        Ok(())
    }

    /// `id` and all of its descendants, depth-first, pre-order.
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    fn is_ancestor(&self, candidate: ElementId, of: ElementId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn node(&self, id: ElementId) -> SceneResult<&Node> {
        self.nodes.get(&id).ok_or(SceneError::UnknownElement(id))
    }

    fn node_mut(&mut self, id: ElementId) -> SceneResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(SceneError::UnknownElement(id))
    }

    fn notify(&mut self, change: SvgChange) {
        self.feeds.retain(|weak| weak.strong_count() > 0);
        for weak in &self.feeds {
            if let Some(state) = weak.upgrade() {
                ChangeFeed { state }.offer(&change);
            }
        }
    }
}
