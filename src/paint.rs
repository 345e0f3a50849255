//! Paint methods.

use crate::frame_node::NodeId;
use crate::geometry_node::GeometryNode;
use crate::rect::Offset;
use crate::render_context::RenderContext;
use crate::theme::Theme;

/// What a paint method may look at while updating modifiers.
pub struct PaintWrapper<'a> {
    pub node: NodeId,
    pub geometry: &'a GeometryNode,
    /// Global offset of the node’s frame.
    pub global_offset: Offset,
    pub render_context: &'a RenderContext,
    pub theme: &'a Theme,
    pub density: f64,
    pub now_ms: u64,
}

/// Copies pattern state into the node’s modifiers once per render pass.
pub trait NodePaintMethod {
    fn update_content_modifier(&mut self, wrapper: &PaintWrapper);

    fn update_overlay_modifier(&mut self, wrapper: &PaintWrapper) {
        let _ = wrapper;
    }
}
