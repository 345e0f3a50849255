//! Traits for render backends.

use crate::frame_node::NodeId;
use crate::render_context::RenderContext;
use core::fmt;

/// A render backend: the native side of the render tree.
pub trait RenderBackend {
    /// A reference to a node in the backend.
    type NodeRef;

    /// Error type.
    type Error: fmt::Display;

    /// Creates a new node.
    fn new_node(
        &mut self,
        id: NodeId,
        context: &RenderContext,
    ) -> Result<Self::NodeRef, Self::Error>;

    /// Pushes the current properties of a node’s render context.
    fn update_node(
        &mut self,
        node: &mut Self::NodeRef,
        context: &RenderContext,
    ) -> Result<(), Self::Error>;

    /// Replaces a node’s children.
    fn set_children(
        &mut self,
        node: &mut Self::NodeRef,
        children: Vec<&Self::NodeRef>,
    ) -> Result<(), Self::Error>;

    /// Deletes a node. Its children have already been removed.
    fn remove_node(&mut self, node: Self::NodeRef) -> Result<(), Self::Error>;

    /// Sets the root node.
    fn set_root(&mut self, node: &mut Self::NodeRef) -> Result<(), Self::Error>;
}

/// An operation seen by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOp {
    New(NodeId),
    Update(NodeId),
    SetChildren(NodeId, Vec<NodeId>),
    Remove(NodeId),
    SetRoot(NodeId),
}

/// A backend that keeps a log of operations instead of drawing anything.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub ops: Vec<BackendOp>,
}

impl RecordingBackend {
    pub fn new() -> RecordingBackend {
        RecordingBackend::default()
    }
}

impl RenderBackend for RecordingBackend {
    type NodeRef = NodeId;
    type Error = String;

    fn new_node(&mut self, id: NodeId, _: &RenderContext) -> Result<NodeId, String> {
        self.ops.push(BackendOp::New(id));
        Ok(id)
    }

    fn update_node(&mut self, node: &mut NodeId, _: &RenderContext) -> Result<(), String> {
        self.ops.push(BackendOp::Update(*node));
        Ok(())
    }

    fn set_children(&mut self, node: &mut NodeId, children: Vec<&NodeId>) -> Result<(), String> {
        self.ops
            .push(BackendOp::SetChildren(*node, children.into_iter().copied().collect()));
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> Result<(), String> {
        self.ops.push(BackendOp::Remove(node));
        Ok(())
    }

    fn set_root(&mut self, node: &mut NodeId) -> Result<(), String> {
        self.ops.push(BackendOp::SetRoot(*node));
        Ok(())
    }
}
