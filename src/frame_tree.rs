//! The frame tree: an arena of frame nodes.

use crate::frame_node::{FrameNode, NodeId, PropertyChangeFlag};
use crate::layout::{LayoutAlgorithm, LayoutWrapper};
use crate::pattern::Pattern;
use crate::rect::{Offset, Rect};
use crate::render_tree::RenderPatch;
use cgmath::{EuclideanSpace, Point2};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace};

/// A frame tree; owns every frame node, tracks which ones are dirty, and emits patches for the
/// render tree.
///
/// Parents own their children. Every other reference to a node, including a child’s reference
/// to its parent, is a [`NodeId`] that may fail to resolve once the node is gone.
pub struct FrameTree {
    nodes: HashMap<NodeId, FrameNode>,
    next_id: i32,
    root: Option<NodeId>,
    dirty_layout: Vec<NodeId>,
    dirty_render: Vec<NodeId>,
    patches: VecDeque<RenderPatch>,
}

impl FrameTree {
    pub fn new() -> FrameTree {
        FrameTree {
            nodes: HashMap::new(),
            next_id: 0,
            root: None,
            dirty_layout: Vec::new(),
            dirty_render: Vec::new(),
            patches: VecDeque::new(),
        }
    }

    /// Returns an iterator over available patches.
    ///
    /// Does not drain the queue immediately.
    /// Calling `next` will always remove a patch from the queue.
    pub fn patches(&mut self) -> impl Iterator<Item = RenderPatch> + '_ {
        struct PatchIterator<'a>(&'a mut FrameTree);
        impl<'a> Iterator for PatchIterator<'a> {
            type Item = RenderPatch;
            fn next(&mut self) -> Option<RenderPatch> {
                self.0.patches.pop_front()
            }
        }

        PatchIterator(self)
    }

    /// Allocates a fresh node id.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Creates a detached node.
    pub fn create_frame_node(
        &mut self,
        tag: &'static str,
        pattern: Option<Box<dyn Pattern>>,
    ) -> NodeId {
        let id = self.next_id();
        trace!("creating {} {}", tag, id);
        self.nodes.insert(id, FrameNode::new(id, tag, pattern));
        id
    }

    /// Returns the node with the given id if it exists with the same tag; otherwise creates it.
    ///
    /// The second value is true if the node was created.
    pub fn get_or_create_frame_node<F>(
        &mut self,
        tag: &'static str,
        id: NodeId,
        make_pattern: F,
    ) -> (NodeId, bool)
    where
        F: FnOnce() -> Option<Box<dyn Pattern>>,
    {
        if let Some(node) = self.nodes.get(&id) {
            if node.tag() == tag {
                return (id, false);
            }
            debug!("{} exists with tag {}, replacing it with {}", id, node.tag(), tag);
            self.remove_node(id);
        }
        self.nodes.insert(id, FrameNode::new(id, tag, make_pattern()));
        if id.0 >= self.next_id {
            self.next_id = id.0 + 1;
        }
        (id, true)
    }

    pub fn get(&self, id: NodeId) -> Option<&FrameNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut FrameNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Makes a detached node the root and mounts it.
    pub fn set_root(&mut self, id: NodeId) {
        if !self.nodes.contains_key(&id) {
            return;
        }
        self.root = Some(id);
        self.attach_to_main_tree(id);
        self.patches.push_back(RenderPatch::SetRoot(id));
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id)?.parent()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[][..], |node| node.children())
    }

    /// Appends a child.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.mount_to_parent(child, parent, None);
    }

    /// Inserts `child` into `parent`’s children at `slot`, or at the end if `slot` is `None` or
    /// out of range. The child is first removed from its previous parent.
    pub fn mount_to_parent(&mut self, child: NodeId, parent: NodeId, slot: Option<usize>) {
        if child == parent
            || !self.nodes.contains_key(&child)
            || !self.nodes.contains_key(&parent)
        {
            debug!("cannot mount {} to {}", child, parent);
            return;
        }
        if self.is_ancestor(child, parent) {
            debug!("cannot mount {} into its own descendant {}", child, parent);
            return;
        }
        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child);
        }

        let parent_on_main_tree = match self.nodes.get_mut(&parent) {
            Some(node) => {
                let index = slot.unwrap_or(node.children.len()).min(node.children.len());
                node.children.insert(index, child);
                node.on_main_tree
            }
            None => return,
        };
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if parent_on_main_tree {
            self.attach_to_main_tree(child);
            self.rebuild_render_context_tree(parent);
        }
    }

    /// Unlinks a child from its parent without destroying it.
    ///
    /// Returns false if `child` was not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let removed = match self.nodes.get_mut(&parent) {
            Some(node) => {
                let before = node.children.len();
                node.children.retain(|id| *id != child);
                node.children.len() != before
            }
            None => false,
        };
        if !removed {
            return false;
        }

        let was_mounted = match self.nodes.get_mut(&child) {
            Some(node) => {
                node.parent = None;
                node.on_main_tree
            }
            None => false,
        };
        if was_mounted {
            self.detach_from_main_tree(child);
            self.patches.push_back(RenderPatch::Remove(child));
            self.rebuild_render_context_tree(parent);
        }
        true
    }

    /// Destroys a node and all of its descendants.
    ///
    /// Destroy callbacks run first, then each pattern’s detach hook.
    pub fn remove_node(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        } else if self.nodes.get(&id).map_or(false, |node| node.on_main_tree) {
            self.detach_from_main_tree(id);
            self.patches.push_back(RenderPatch::Remove(id));
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.destroy(id);
    }

    fn destroy(&mut self, id: NodeId) {
        let mut node = match self.nodes.remove(&id) {
            Some(node) => node,
            None => return,
        };
        trace!("destroying {} {}", node.tag(), id);
        for callback in node.destroy_callbacks.drain(..) {
            callback();
        }
        if let Some(pattern) = node.pattern.as_mut() {
            pattern.on_detach_from_frame_node(id);
        }
        for child in node.children.drain(..) {
            self.destroy(child);
        }
    }

    fn attach_to_main_tree(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => {
                node.on_main_tree = true;
                self.patches
                    .push_back(RenderPatch::Update(id, node.render_context().clone()));
                node.children.clone()
            }
            None => return,
        };
        for child in &children {
            self.attach_to_main_tree(*child);
        }
        if !children.is_empty() {
            self.rebuild_render_context_tree(id);
        }
    }

    fn detach_from_main_tree(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => {
                node.on_main_tree = false;
                node.children.clone()
            }
            None => return,
        };
        for child in children {
            self.detach_from_main_tree(child);
        }
    }

    /// Re-sends a mounted node’s children to the render tree, in z order.
    pub fn rebuild_render_context_tree(&mut self, id: NodeId) {
        if !self.nodes.get(&id).map_or(false, |node| node.on_main_tree) {
            return;
        }
        let children = self
            .frame_children_by_z(id)
            .into_iter()
            .filter(|child| self.nodes.get(child).map_or(false, |node| node.on_main_tree))
            .collect();
        self.patches.push_back(RenderPatch::Children(id, children));
    }

    /// Returns true if `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = self.parent(id);
        while let Some(node) = cursor {
            if node == ancestor {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    /// Finds the closest proper ancestor with the given tag.
    pub fn find_ancestor_with_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(id);
        while let Some(node) = cursor {
            if self.nodes.get(&node)?.tag() == tag {
                return Some(node);
            }
            cursor = self.parent(node);
        }
        None
    }

    /// Returns the children sorted by z-index; ties keep insertion order.
    pub fn frame_children_by_z(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = self.children(id).to_vec();
        children.sort_by_key(|child| {
            self.nodes
                .get(child)
                .map_or(0, |node| node.layout_property().z_index)
        });
        children
    }

    /// Offset of the node’s frame in window coordinates.
    pub fn global_offset(&self, id: NodeId) -> Offset {
        let mut offset = Point2::origin();
        let mut cursor = Some(id);
        while let Some(node) = cursor.and_then(|id| self.nodes.get(&id)) {
            offset += node.geometry_node().frame_offset().to_vec();
            cursor = node.parent();
        }
        offset
    }

    /// The node’s frame in window coordinates.
    pub fn global_frame_rect(&self, id: NodeId) -> Option<Rect> {
        let node = self.nodes.get(&id)?;
        Some(Rect::new(self.global_offset(id), node.geometry_node().frame_size()))
    }

    /// The closest view port set on the node or one of its ancestors.
    pub fn view_port(&self, id: NodeId) -> Option<Rect> {
        let mut cursor = Some(id);
        while let Some(node) = cursor.and_then(|id| self.nodes.get(&id)) {
            if let Some(view_port) = node.layout_property().view_port {
                return Some(view_port);
            }
            cursor = node.parent();
        }
        None
    }

    /// Marks a node dirty. `MEASURE` also marks the parent, since the node’s size may change.
    pub fn mark_dirty_node(&mut self, id: NodeId, flag: PropertyChangeFlag) {
        let parent = match self.nodes.get_mut(&id) {
            Some(node) => {
                if flag.contains(PropertyChangeFlag::RENDER) && !node.is_render_dirty_marked {
                    node.is_render_dirty_marked = true;
                    self.dirty_render.push(id);
                }
                if flag.needs_layout() && !node.is_layout_dirty_marked {
                    node.is_layout_dirty_marked = true;
                    self.dirty_layout.push(id);
                }
                node.parent()
            }
            None => return,
        };
        if flag.contains(PropertyChangeFlag::MEASURE) {
            if let Some(parent) = parent {
                self.mark_dirty_node(parent, PropertyChangeFlag::MEASURE_SELF);
            }
        }
    }

    /// Takes the layout-dirty nodes that still exist, dropping those covered by a dirty ancestor.
    pub fn take_dirty_layout_nodes(&mut self) -> Vec<NodeId> {
        let nodes = &self.nodes;
        let dirty: Vec<NodeId> = self
            .dirty_layout
            .drain(..)
            .filter(|id| nodes.contains_key(id))
            .collect();
        for id in &dirty {
            if let Some(node) = self.nodes.get_mut(id) {
                node.is_layout_dirty_marked = false;
            }
        }
        dirty
            .iter()
            .copied()
            .filter(|id| !dirty.iter().any(|other| self.is_ancestor(*other, *id)))
            .collect()
    }

    /// Takes the render-dirty nodes that still exist.
    pub fn take_dirty_render_nodes(&mut self) -> Vec<NodeId> {
        let nodes = &self.nodes;
        let dirty: Vec<NodeId> = self
            .dirty_render
            .drain(..)
            .filter(|id| nodes.contains_key(id))
            .collect();
        for id in &dirty {
            if let Some(node) = self.nodes.get_mut(id) {
                node.is_render_dirty_marked = false;
            }
        }
        dirty
    }

    /// Takes a node’s pattern out so it can be called with mutable access to the rest of the
    /// world. Must be followed by [`restore_pattern`](Self::restore_pattern).
    pub fn take_pattern(&mut self, id: NodeId) -> Option<Box<dyn Pattern>> {
        self.nodes.get_mut(&id)?.pattern.take()
    }

    /// Puts a pattern back. Returns it if its node no longer exists.
    pub fn restore_pattern(
        &mut self,
        id: NodeId,
        pattern: Box<dyn Pattern>,
    ) -> Result<(), Box<dyn Pattern>> {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.pattern = Some(pattern);
                Ok(())
            }
            None => Err(pattern),
        }
    }

    /// Writes the results of a layout pass back into the tree.
    ///
    /// Returns the algorithm of every node that still exists, parents first.
    pub fn swap_layout_wrapper(
        &mut self,
        wrapper: LayoutWrapper,
    ) -> Vec<(NodeId, Box<dyn LayoutAlgorithm>)> {
        let mut flat = Vec::new();
        wrapper.into_flat(&mut flat);

        let mut algorithms = Vec::with_capacity(flat.len());
        for mut wrapper in flat {
            let id = wrapper.node();
            let node = match self.nodes.get_mut(&id) {
                Some(node) => node,
                None => continue,
            };
            let frame_changed = *node.geometry_node() != wrapper.geometry;
            let activity_changed = node.is_active() != wrapper.is_active();
            *node.geometry_node_mut() = wrapper.geometry.clone();
            *node.layout_property_mut() = wrapper.layout_property.clone();
            node.set_active(wrapper.is_active());
            node.mark_built();
            node.render_context().set_frame(wrapper.geometry.frame_rect());
            if frame_changed || activity_changed {
                self.mark_dirty_node(id, PropertyChangeFlag::RENDER);
            }
            if activity_changed {
                if let Some(parent) = self.parent(id) {
                    self.sync_active_children(parent);
                }
            }
            if let Some(algorithm) = wrapper.take_algorithm() {
                algorithms.push((id, algorithm));
            }
        }
        algorithms
    }

    /// Only active children are painted.
    fn sync_active_children(&mut self, parent: NodeId) {
        if !self.nodes.get(&parent).map_or(false, |node| node.on_main_tree) {
            return;
        }
        let children = self
            .frame_children_by_z(parent)
            .into_iter()
            .filter(|child| {
                self.nodes
                    .get(child)
                    .map_or(false, |node| node.on_main_tree && node.is_active())
            })
            .collect();
        self.patches.push_back(RenderPatch::Children(parent, children));
    }

    /// Queues an update of a mounted node’s render peer.
    ///
    /// Render contexts are shared, so an update that is still queued already carries the latest
    /// properties and another one is not queued.
    pub(crate) fn push_render_update(&mut self, id: NodeId) {
        if self.has_pending_update(id) {
            return;
        }
        if let Some(node) = self.nodes.get(&id) {
            if node.on_main_tree {
                self.patches
                    .push_back(RenderPatch::Update(id, node.render_context().clone()));
            }
        }
    }

    fn has_pending_update(&self, id: NodeId) -> bool {
        for patch in self.patches.iter().rev() {
            match patch {
                RenderPatch::Update(other, _) if *other == id => return true,
                RenderPatch::Remove(other) if *other == id => return false,
                _ => (),
            }
        }
        false
    }
}

impl Default for FrameTree {
    fn default() -> FrameTree {
        FrameTree::new()
    }
}
