//! Layout.
//!
//! Layout runs on a snapshot of the dirty subtree: a [`LayoutWrapper`] is built from the tree,
//! measured and laid out by each node’s [`LayoutAlgorithm`], and then swapped back into the tree
//! in one go. Algorithms never see the tree mutably.

use crate::frame_node::NodeId;
use crate::frame_tree::FrameTree;
use crate::geometry_node::GeometryNode;
use crate::rect::{Rect, Size};
use crate::theme::Theme;
use cgmath::{Point2, Vector2};
use core::any::Any;

/// How a node chooses its own size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureType {
    /// Fit the children.
    Content,
    /// Take the maximum size allowed by the parent.
    MatchParent,
}

/// Size bounds handed from parent to child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraint {
    pub min_size: Size,
    pub max_size: Size,
}

impl LayoutConstraint {
    pub fn loose(max_size: Size) -> LayoutConstraint {
        LayoutConstraint {
            min_size: Vector2::new(0., 0.),
            max_size,
        }
    }

    pub fn constrain(&self, size: Size) -> Size {
        Vector2::new(
            size.x.max(self.min_size.x).min(self.max_size.x),
            size.y.max(self.min_size.y).min(self.max_size.y),
        )
    }
}

/// Layout inputs of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutProperty {
    pub measure_type: MeasureType,
    /// Preferred size, clamped by the constraint.
    pub ideal_size: Option<Size>,
    /// The constraint used in the last layout pass.
    pub layout_constraint: Option<LayoutConstraint>,
    /// Visible region for content scrolled inside this node, in global coordinates.
    pub view_port: Option<Rect>,
    pub z_index: i32,
}

impl Default for LayoutProperty {
    fn default() -> LayoutProperty {
        LayoutProperty {
            measure_type: MeasureType::Content,
            ideal_size: None,
            layout_constraint: None,
            view_port: None,
            z_index: 0,
        }
    }
}

/// Read-only context available during layout.
pub struct LayoutEnv<'a> {
    pub tree: &'a FrameTree,
    pub theme: &'a Theme,
    pub density: f64,
    /// Height of the system status bar.
    pub safe_area_top: f64,
}

/// Computes sizes and positions for a node and its children.
pub trait LayoutAlgorithm: Any {
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    fn measure(&mut self, wrapper: &mut LayoutWrapper, env: &LayoutEnv) {
        measure_box(wrapper, env);
    }

    fn layout(&mut self, wrapper: &mut LayoutWrapper, env: &LayoutEnv) {
        layout_box(wrapper, env);
    }
}

/// Measures every active child against the node’s constraint, then sizes the node.
pub fn measure_box(wrapper: &mut LayoutWrapper, env: &LayoutEnv) {
    let constraint = wrapper.constraint();
    let child_constraint = LayoutConstraint::loose(constraint.max_size);
    for child in wrapper.children_mut() {
        if child.is_active() {
            child.measure(child_constraint, env);
        }
    }

    let size = match (wrapper.layout_property.measure_type, wrapper.layout_property.ideal_size) {
        (MeasureType::MatchParent, _) => constraint.max_size,
        (MeasureType::Content, Some(ideal)) => constraint.constrain(ideal),
        (MeasureType::Content, None) => {
            let mut extent = Vector2::<f64>::new(0., 0.);
            for child in wrapper.children().iter().filter(|c| c.is_active()) {
                let frame = child.geometry.frame_rect();
                extent.x = extent.x.max(frame.right());
                extent.y = extent.y.max(frame.bottom());
            }
            constraint.constrain(extent)
        }
    };
    wrapper.geometry.set_frame_size(size);
}

/// Lays out every active child at the offset it already has.
pub fn layout_box(wrapper: &mut LayoutWrapper, env: &LayoutEnv) {
    for child in wrapper.children_mut() {
        if child.is_active() {
            child.layout(env);
        }
    }
}

/// The default algorithm: children stay where they were put.
#[derive(Debug, Default)]
pub struct BoxLayoutAlgorithm;

impl LayoutAlgorithm for BoxLayoutAlgorithm {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Main axis of a linear layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearAxis {
    Row,
    Column,
}

/// Stacks active children along one axis, with uniform padding around them.
#[derive(Debug)]
pub struct LinearLayoutAlgorithm {
    pub axis: LinearAxis,
    pub padding: f64,
}

impl LayoutAlgorithm for LinearLayoutAlgorithm {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn measure(&mut self, wrapper: &mut LayoutWrapper, env: &LayoutEnv) {
        let constraint = wrapper.constraint();
        let child_constraint = LayoutConstraint::loose(constraint.max_size);
        let mut main = 0.;
        let mut cross: f64 = 0.;
        for child in wrapper.children_mut() {
            if !child.is_active() {
                continue;
            }
            child.measure(child_constraint, env);
            let size = child.geometry.margin_frame_size();
            match self.axis {
                LinearAxis::Row => {
                    main += size.x;
                    cross = cross.max(size.y);
                }
                LinearAxis::Column => {
                    main += size.y;
                    cross = cross.max(size.x);
                }
            }
        }
        let content = match self.axis {
            LinearAxis::Row => Vector2::new(main, cross),
            LinearAxis::Column => Vector2::new(cross, main),
        };
        let size = wrapper
            .layout_property
            .ideal_size
            .unwrap_or_else(|| content + Vector2::new(2. * self.padding, 2. * self.padding));
        wrapper.geometry.set_frame_size(constraint.constrain(size));
    }

    fn layout(&mut self, wrapper: &mut LayoutWrapper, env: &LayoutEnv) {
        let mut cursor = self.padding;
        for child in wrapper.children_mut() {
            if !child.is_active() {
                continue;
            }
            let size = child.geometry.margin_frame_size();
            let offset = match self.axis {
                LinearAxis::Row => Point2::new(cursor, self.padding),
                LinearAxis::Column => Point2::new(self.padding, cursor),
            };
            child.geometry.set_margin_frame_offset(offset);
            cursor += match self.axis {
                LinearAxis::Row => size.x,
                LinearAxis::Column => size.y,
            };
            child.layout(env);
        }
    }
}

/// A snapshot of one node during layout.
pub struct LayoutWrapper {
    node: NodeId,
    tag: &'static str,
    pub geometry: GeometryNode,
    pub layout_property: LayoutProperty,
    active: bool,
    children: Vec<LayoutWrapper>,
    algorithm: Option<Box<dyn LayoutAlgorithm>>,
}

impl LayoutWrapper {
    /// Snapshots a subtree. Returns `None` if the node no longer exists.
    pub fn build(tree: &FrameTree, id: NodeId) -> Option<LayoutWrapper> {
        let node = tree.get(id)?;
        let algorithm: Box<dyn LayoutAlgorithm> = match node.pattern.as_ref() {
            Some(pattern) => pattern.create_layout_algorithm(),
            None => Box::new(BoxLayoutAlgorithm),
        };
        let children = node
            .children()
            .iter()
            .filter_map(|child| LayoutWrapper::build(tree, *child))
            .collect();
        Some(LayoutWrapper {
            node: id,
            tag: node.tag(),
            geometry: node.geometry_node().clone(),
            layout_property: node.layout_property().clone(),
            active: node.is_active(),
            children,
            algorithm: Some(algorithm),
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn children(&self) -> &[LayoutWrapper] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [LayoutWrapper] {
        &mut self.children
    }

    pub fn child(&self, index: usize) -> Option<&LayoutWrapper> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut LayoutWrapper> {
        self.children.get_mut(index)
    }

    pub fn algorithm(&self) -> Option<&dyn LayoutAlgorithm> {
        self.algorithm.as_ref().map(|algorithm| &**algorithm)
    }

    /// The constraint of the current pass.
    pub fn constraint(&self) -> LayoutConstraint {
        self.layout_property
            .layout_constraint
            .unwrap_or_else(|| LayoutConstraint::loose(self.geometry.frame_size()))
    }

    /// Measures this node with its own algorithm.
    pub fn measure(&mut self, constraint: LayoutConstraint, env: &LayoutEnv) {
        self.layout_property.layout_constraint = Some(constraint);
        if let Some(mut algorithm) = self.algorithm.take() {
            algorithm.measure(self, env);
            self.algorithm = Some(algorithm);
        }
    }

    /// Lays out this node’s children with its own algorithm.
    pub fn layout(&mut self, env: &LayoutEnv) {
        if let Some(mut algorithm) = self.algorithm.take() {
            algorithm.layout(self, env);
            self.algorithm = Some(algorithm);
        }
    }

    pub(crate) fn take_algorithm(&mut self) -> Option<Box<dyn LayoutAlgorithm>> {
        self.algorithm.take()
    }

    /// Flattens the snapshot, parents before children.
    pub(crate) fn into_flat(self, out: &mut Vec<LayoutWrapper>) {
        let mut this = self;
        let children = std::mem::replace(&mut this.children, Vec::new());
        out.push(this);
        for child in children {
            child.into_flat(out);
        }
    }
}
