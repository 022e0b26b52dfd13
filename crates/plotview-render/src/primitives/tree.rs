//! Ownership and structure of the concrete primitive tree.

use super::{Primitive, PrimitiveId, PrimitiveKind};
use kurbo::{Affine, Rect};
use std::collections::HashMap;
use thiserror::Error;

/// Concrete tree invariant violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("Unknown primitive: {0}")]
    UnknownPrimitive(PrimitiveId),
    #[error("Primitive {child} is already attached to {parent}")]
    AlreadyParented {
        child: PrimitiveId,
        parent: PrimitiveId,
    },
    #[error("Child index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{kind} primitive {id} cannot hold children")]
    NotAContainer { id: PrimitiveId, kind: &'static str },
}

/// Result type for primitive tree operations.
pub type StructureResult<T> = Result<T, StructureError>;

/// Arena of primitives. Children are owned through the parent's ordered
/// child list; the parent link on a child is a plain id.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveTree {
    nodes: HashMap<PrimitiveId, Primitive>,
    root: Option<PrimitiveId>,
}

impl PrimitiveTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached primitive to the arena.
    pub fn insert(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = primitive.id();
        self.nodes.insert(id, primitive);
        id
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<PrimitiveId> {
        self.root
    }

    /// Make a detached primitive the root of the tree.
    pub fn set_root(&mut self, id: PrimitiveId) -> StructureResult<()> {
        if let Some(parent) = self.node(id)?.parent {
            return Err(StructureError::AlreadyParented { child: id, parent });
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn parent(&self, id: PrimitiveId) -> Option<PrimitiveId> {
        self.nodes.get(&id).and_then(|p| p.parent)
    }

    /// Children of `id`, in paint order. Empty for unknown ids.
    pub fn children(&self, id: PrimitiveId) -> &[PrimitiveId] {
        self.nodes
            .get(&id)
            .map(|p| p.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn append_child(&mut self, parent: PrimitiveId, child: PrimitiveId) -> StructureResult<()> {
        let len = self.node(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Attach a detached `child` at `index`.
    pub fn insert_child(
        &mut self,
        parent: PrimitiveId,
        index: usize,
        child: PrimitiveId,
    ) -> StructureResult<()> {
        let parent_node = self.node(parent)?;
        let kind = parent_node.kind();
        if !kind.is_container() {
            return Err(StructureError::NotAContainer {
                id: parent,
                kind: kind.name(),
            });
        }
        let len = parent_node.children.len();
        if index > len {
            return Err(StructureError::IndexOutOfRange { index, len });
        }
        if let Some(existing) = self.node(child)?.parent {
            return Err(StructureError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if self.root == Some(child) {
            self.root = None;
        }

        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach and return the child at `index`.
    pub fn remove_child(&mut self, parent: PrimitiveId, index: usize) -> StructureResult<PrimitiveId> {
        let node = self.node_mut(parent)?;
        let len = node.children.len();
        if index >= len {
            return Err(StructureError::IndexOutOfRange { index, len });
        }
        let child = node.children.remove(index);
        self.node_mut(child)?.parent = None;
        Ok(child)
    }

    /// Detach `child` from its parent, if any.
    pub fn detach(&mut self, child: PrimitiveId) -> StructureResult<()> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        let index = self
            .children(parent)
            .iter()
            .position(|c| *c == child)
            .ok_or(StructureError::UnknownPrimitive(child))?;
        self.remove_child(parent, index).map(|_| ())
    }

    /// Move an attached child to `index` within its current parent.
    pub fn move_child(&mut self, child: PrimitiveId, index: usize) -> StructureResult<()> {
        let parent = self
            .parent(child)
            .ok_or(StructureError::UnknownPrimitive(child))?;
        let children = &mut self.node_mut(parent)?.children;
        let len = children.len();
        if index >= len {
            return Err(StructureError::IndexOutOfRange { index, len });
        }
        let from = children
            .iter()
            .position(|c| *c == child)
            .ok_or(StructureError::UnknownPrimitive(child))?;
        if from != index {
            let moved = children.remove(from);
            children.insert(index, moved);
        }
        Ok(())
    }

    /// Detach a primitive and drop it and its descendants from the arena.
    /// Returns the removed primitives, parents before children.
    pub fn dispose(&mut self, id: PrimitiveId) -> StructureResult<Vec<Primitive>> {
        self.detach(id)?;
        if self.root == Some(id) {
            self.root = None;
        }
        Ok(self
            .subtree(id)
            .into_iter()
            .filter_map(|p| self.nodes.remove(&p))
            .collect())
    }

    /// `id` and its descendants, depth-first, pre-order.
    pub fn subtree(&self, id: PrimitiveId) -> Vec<PrimitiveId> {
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

    /// Number of primitives of `kind` in the arena.
    pub fn count_kind(&self, kind: PrimitiveKind) -> usize {
        self.nodes.values().filter(|p| p.kind() == kind).count()
    }

    /// Transform from `id`'s local coordinates to root coordinates.
    pub fn world_transform(&self, id: PrimitiveId) -> Affine {
        let mut transform = Affine::IDENTITY;
        let mut current = Some(id);
        while let Some(pid) = current {
            let Some(node) = self.nodes.get(&pid) else {
                break;
            };
            transform = node.transform * transform;
            current = node.parent;
        }
        transform
    }

    /// Bounds of `id` and its descendants in its parent's coordinates.
    /// Invisible primitives contribute nothing.
    pub fn bounds(&self, id: PrimitiveId) -> Option<Rect> {
        let node = self.nodes.get(&id)?;
        if !node.visible {
            return None;
        }
        let own = node.local_bounds();
        let local = node
            .children
            .iter()
            .filter_map(|c| self.bounds(*c))
            .fold(own, |acc, r| Some(acc.map_or(r, |a| a.union(r))))?;
        let bounds = node.transform.transform_rect_bbox(local);
        match &node.clip {
            Some(clip) => {
                let clip_box = node.transform.transform_rect_bbox(kurbo::Shape::bounding_box(clip));
                let clipped = bounds.intersect(clip_box);
                (clipped.area() > 0.0).then_some(clipped)
            }
            None => Some(bounds),
        }
    }

    fn node(&self, id: PrimitiveId) -> StructureResult<&Primitive> {
        self.nodes.get(&id).ok_or(StructureError::UnknownPrimitive(id))
    }

    fn node_mut(&mut self, id: PrimitiveId) -> StructureResult<&mut Primitive> {
        self.nodes
            .get_mut(&id)
            .ok_or(StructureError::UnknownPrimitive(id))
    }
}
