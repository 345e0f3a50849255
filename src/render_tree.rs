//! The render tree: the mirror of the mounted part of the frame tree on the backend side.

use crate::backend::RenderBackend;
use crate::canvas::Canvas;
use crate::error::RenderError;
use crate::frame_node::NodeId;
use crate::render_context::RenderContext;
use std::collections::HashMap;

/// Patches for the render tree, emitted by the frame tree.
#[derive(Debug, Clone)]
pub enum RenderPatch {
    /// Sets the root node.
    SetRoot(NodeId),
    /// Updates or creates a node.
    Update(NodeId, RenderContext),
    /// Replaces a node’s children.
    Children(NodeId, Vec<NodeId>),
    /// Removes a node and all of its descendants.
    Remove(NodeId),
}

struct RenderNode<R> {
    context: RenderContext,
    backing_ref: R,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The render tree.
pub struct RenderTree<B: RenderBackend> {
    nodes: HashMap<NodeId, RenderNode<B::NodeRef>>,
    root: Option<NodeId>,
    backend: B,
}

impl<B: RenderBackend> RenderTree<B> {
    pub fn new(backend: B) -> RenderTree<B> {
        RenderTree {
            nodes: HashMap::new(),
            root: None,
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(&id).map(|node| &*node.children)
    }

    /// Patches the render tree.
    pub fn patch(&mut self, patch: RenderPatch) -> Result<(), RenderError> {
        match patch {
            RenderPatch::SetRoot(id) => self.set_root(id),
            RenderPatch::Update(id, context) => self.update_node(id, context),
            RenderPatch::Children(id, children) => self.set_children(id, children),
            RenderPatch::Remove(id) => self.remove_node(id, true),
        }
    }

    fn set_root(&mut self, id: NodeId) -> Result<(), RenderError> {
        let node = self.nodes.get_mut(&id).ok_or(RenderError::NoSuchNode(id))?;
        self.backend
            .set_root(&mut node.backing_ref)
            .map_err(|err| RenderError::Backend(err.to_string()))?;
        self.root = Some(id);
        Ok(())
    }

    fn update_node(&mut self, id: NodeId, context: RenderContext) -> Result<(), RenderError> {
        if let Some(node) = self.nodes.get_mut(&id) {
            self.backend
                .update_node(&mut node.backing_ref, &context)
                .map_err(|err| RenderError::Backend(err.to_string()))?;
            node.context = context;
        } else {
            let backing_ref = self
                .backend
                .new_node(id, &context)
                .map_err(|err| RenderError::Backend(err.to_string()))?;
            self.nodes.insert(
                id,
                RenderNode {
                    context,
                    backing_ref,
                    parent: None,
                    children: Vec::new(),
                },
            );
        }
        Ok(())
    }

    /// Removes a node and its descendants, and unlinks it from its parent.
    fn remove_node(&mut self, id: NodeId, unlink: bool) -> Result<(), RenderError> {
        let node = self.nodes.remove(&id).ok_or(RenderError::NoSuchNode(id))?;
        for child in &node.children {
            self.remove_node(*child, false)?;
        }
        if unlink {
            if let Some(parent) = node.parent.and_then(|parent| self.nodes.get_mut(&parent)) {
                parent.children.retain(|child| *child != id);
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.backend
            .remove_node(node.backing_ref)
            .map_err(|err| RenderError::Backend(err.to_string()))
    }

    fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) -> Result<(), RenderError> {
        if !self.nodes.contains_key(&id) {
            return Err(RenderError::NoSuchNode(id));
        }
        for child in &children {
            if !self.nodes.contains_key(child) {
                return Err(RenderError::NoSuchNode(*child));
            }
            if self.is_ancestor_or_self(*child, id) {
                return Err(RenderError::Cycle(*child));
            }
        }

        let mut node = self.nodes.remove(&id).ok_or(RenderError::NoSuchNode(id))?;
        for old in &node.children {
            if let Some(old) = self.nodes.get_mut(old) {
                old.parent = None;
            }
        }
        for child in &children {
            if let Some(child) = self.nodes.get_mut(child) {
                child.parent = Some(id);
            }
        }

        let nodes = &self.nodes;
        let refs = children
            .iter()
            .filter_map(|child| nodes.get(child))
            .map(|child| &child.backing_ref)
            .collect();
        let result = self
            .backend
            .set_children(&mut node.backing_ref, refs)
            .map_err(|err| RenderError::Backend(err.to_string()));
        node.children = children;
        self.nodes.insert(id, node);
        result
    }

    /// Returns true if `node` is `of` or one of its ancestors.
    fn is_ancestor_or_self(&self, node: NodeId, of: NodeId) -> bool {
        let mut cursor = Some(of);
        while let Some(id) = cursor {
            if id == node {
                return true;
            }
            cursor = self.nodes.get(&id).and_then(|node| node.parent);
        }
        false
    }

    /// Paints the tree, root first, children in order.
    pub fn paint(&self, canvas: &mut dyn Canvas, now_ms: u64) {
        if let Some(root) = self.root {
            self.paint_node(root, canvas, now_ms);
        }
    }

    fn paint_node(&self, id: NodeId, canvas: &mut dyn Canvas, now_ms: u64) {
        let node = match self.nodes.get(&id) {
            Some(node) => node,
            None => return,
        };
        let frame = node.context.frame();
        let opacity = node.context.opacity(now_ms);
        if opacity <= 0. {
            return;
        }

        canvas.save();
        canvas.translate(frame.origin.x, frame.origin.y);
        if opacity < 1. {
            canvas.save_layer_alpha(opacity);
        }
        node.context.paint_content(canvas, now_ms);
        for child in &node.children {
            self.paint_node(*child, canvas, now_ms);
        }
        node.context.paint_overlay(canvas, now_ms);
        if opacity < 1. {
            canvas.restore();
        }
        canvas.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendOp, RecordingBackend};

    #[test]
    fn rejects_cycles() {
        let mut tree = RenderTree::new(RecordingBackend::new());
        let (a, b) = (NodeId(1), NodeId(2));
        tree.patch(RenderPatch::Update(a, RenderContext::new())).unwrap();
        tree.patch(RenderPatch::Update(b, RenderContext::new())).unwrap();
        tree.patch(RenderPatch::Children(a, vec![b])).unwrap();
        assert_eq!(
            tree.patch(RenderPatch::Children(b, vec![a])),
            Err(RenderError::Cycle(a))
        );
    }

    #[test]
    fn remove_takes_descendants() {
        let mut tree = RenderTree::new(RecordingBackend::new());
        let (a, b, c) = (NodeId(1), NodeId(2), NodeId(3));
        for id in &[a, b, c] {
            tree.patch(RenderPatch::Update(*id, RenderContext::new())).unwrap();
        }
        tree.patch(RenderPatch::Children(a, vec![b])).unwrap();
        tree.patch(RenderPatch::Children(b, vec![c])).unwrap();
        tree.patch(RenderPatch::Remove(b)).unwrap();

        assert!(!tree.contains(c));
        assert_eq!(tree.children(a), Some(&[][..]));
        assert!(tree.backend().ops.contains(&BackendOp::Remove(c)));
        assert_eq!(
            tree.patch(RenderPatch::Remove(c)),
            Err(RenderError::NoSuchNode(c))
        );
    }
}
