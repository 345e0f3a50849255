//! Per-node geometry.

use crate::rect::{Offset, Rect, Size};
use cgmath::Vector2;

/// Margins around a node’s frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Geometry of one frame node, written by layout and read by everything else.
///
/// The frame offset is relative to the parent’s frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryNode {
    frame: Rect,
    content: Option<Rect>,
    margin: Margin,
}

impl GeometryNode {
    pub fn new() -> GeometryNode {
        GeometryNode {
            frame: Rect::zero(),
            content: None,
            margin: Margin::default(),
        }
    }

    pub fn frame_rect(&self) -> Rect {
        self.frame
    }

    pub fn set_frame_rect(&mut self, rect: Rect) {
        self.frame = rect;
    }

    pub fn frame_offset(&self) -> Offset {
        self.frame.origin
    }

    pub fn set_frame_offset(&mut self, offset: Offset) {
        self.frame.origin = offset;
    }

    pub fn frame_size(&self) -> Size {
        self.frame.size
    }

    pub fn set_frame_size(&mut self, size: Size) {
        self.frame.size = size;
    }

    pub fn content_rect(&self) -> Option<Rect> {
        self.content
    }

    pub fn set_content_rect(&mut self, rect: Option<Rect>) {
        self.content = rect;
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn set_margin(&mut self, margin: Margin) {
        self.margin = margin;
    }

    /// Frame size including margins.
    pub fn margin_frame_size(&self) -> Size {
        self.frame.size
            + Vector2::new(
                self.margin.left + self.margin.right,
                self.margin.top + self.margin.bottom,
            )
    }

    /// Places the margin box (rather than the frame) at the given offset.
    pub fn set_margin_frame_offset(&mut self, offset: Offset) {
        self.frame.origin = offset + Vector2::new(self.margin.left, self.margin.top);
    }

    pub fn margin_frame_offset(&self) -> Offset {
        self.frame.origin - Vector2::new(self.margin.left, self.margin.top)
    }

    pub fn reset(&mut self) {
        self.frame = Rect::zero();
        self.content = None;
    }
}

impl Default for GeometryNode {
    fn default() -> GeometryNode {
        GeometryNode::new()
    }
}

#[test]
fn test_margin_frame() {
    use cgmath::Point2;

    let mut geometry = GeometryNode::new();
    geometry.set_margin(Margin {
        left: 2.,
        top: 3.,
        right: 4.,
        bottom: 5.,
    });
    geometry.set_frame_size(Vector2::new(10., 10.));
    geometry.set_margin_frame_offset(Point2::new(0., 0.));

    assert_eq!(geometry.frame_offset(), Point2::new(2., 3.));
    assert_eq!(geometry.margin_frame_size(), Vector2::new(16., 18.));
    assert_eq!(geometry.margin_frame_offset(), Point2::new(0., 0.));
}
