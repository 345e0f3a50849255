//! Owns the one select overlay of a window.

use super::info::{SelectOverlayInfo, SelectionHost};
use super::node;
use super::pattern::SelectOverlayPattern;
use super::proxy::SelectOverlayProxy;
use crate::accessibility::AccessibilityEventType;
use crate::events::{Axis, TouchEvent, TouchType};
use crate::frame_node::{tags, NodeId, PropertyChangeFlag};
use crate::pipeline::PipelineContext;
use crate::rect::Offset;
use cgmath::{EuclideanSpace, MetricSpace};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Called when a scrollable ancestor of the selection scrolls, with the scroll axis, offset, and
/// source.
pub type ScrollCallback = Rc<dyn Fn(Axis, f64, i32)>;

/// The select overlay manager.
///
/// At most one overlay is active at a time. Creating another one replaces it, and every
/// operation on a stale overlay id does nothing.
///
/// Operations that touch the tree are associated functions taking the pipeline, since the
/// manager itself lives inside it.
pub struct SelectOverlayManager {
    root: NodeId,
    select_overlay_item: Option<NodeId>,
    select_overlay_info: SelectOverlayInfo,
    host: Option<Weak<dyn SelectionHost>>,
    touch_down_points: Vec<TouchEvent>,
    parent_scroll_callbacks: BTreeMap<i32, BTreeMap<i32, ScrollCallback>>,
}

impl SelectOverlayManager {
    pub fn new(root: NodeId) -> SelectOverlayManager {
        SelectOverlayManager {
            root,
            select_overlay_item: None,
            select_overlay_info: SelectOverlayInfo::default(),
            host: None,
            touch_down_points: Vec::new(),
            parent_scroll_callbacks: BTreeMap::new(),
        }
    }

    /// The active overlay, if it still exists.
    pub fn select_overlay_item(&self) -> Option<NodeId> {
        self.select_overlay_item
    }

    /// The info the active overlay was created with.
    pub fn select_overlay_info(&self) -> &SelectOverlayInfo {
        &self.select_overlay_info
    }

    fn current(ctx: &PipelineContext) -> Option<NodeId> {
        let id = ctx.select_overlay_manager().select_overlay_item?;
        if ctx.tree().contains(id) {
            Some(id)
        } else {
            trace!("select overlay {} is gone", id);
            None
        }
    }

    fn selection_host(&self) -> Option<Rc<dyn SelectionHost>> {
        self.host.as_ref().and_then(|host| host.upgrade())
    }

    fn is_same_select_overlay_info(&self, info: &SelectOverlayInfo) -> bool {
        let current = &self.select_overlay_info;
        !current.menu_info.is_icon_changed(&info.menu_info)
            && current.is_using_mouse == info.is_using_mouse
            && current.right_click_offset == info.right_click_offset
    }

    /// Creates an overlay and schedules mounting it.
    ///
    /// Any active overlay is closed first, unless this is a repeated mouse request for the same
    /// menu, in which case the active overlay is returned as is. The overlay is inserted into the
    /// tree on the next turn of the task queue.
    pub fn create_and_show_select_overlay(
        ctx: &mut PipelineContext,
        info: SelectOverlayInfo,
        host: Option<Weak<dyn SelectionHost>>,
        animate: bool,
    ) -> SelectOverlayProxy {
        if let Some(current) = SelectOverlayManager::current(ctx) {
            if info.is_using_mouse
                && ctx.select_overlay_manager().is_same_select_overlay_info(&info)
            {
                trace!("reusing select overlay {}", current);
                return SelectOverlayProxy::new(current.0);
            }
            SelectOverlayManager::notify_overlay_closed(ctx, true);
            SelectOverlayManager::destroy_select_overlay(ctx, false);
        }

        let mut select_info = info.clone();
        let manager = ctx.select_overlay_manager_mut();
        manager.select_overlay_info = info;
        manager.host = host;
        if let Some(caller) = manager.selection_host().and_then(|host| host.frame_node()) {
            select_info.caller_frame_node = Some(caller);
        }
        let is_using_mouse = select_info.is_using_mouse;
        let caller = select_info.caller_frame_node;

        let overlay = node::create_select_overlay_node(ctx, select_info);
        ctx.select_overlay_manager_mut().select_overlay_item = Some(overlay);
        debug!("created select overlay {}", overlay);

        ctx.post_task(move |ctx| {
            if ctx.select_overlay_manager().select_overlay_item != Some(overlay) {
                debug!("select overlay {} was superseded before mounting", overlay);
                ctx.tree_mut().remove_node(overlay);
                return;
            }
            if !ctx.tree().contains(overlay) {
                return;
            }
            let parent = SelectOverlayManager::mount_parent(ctx, caller);
            let slot = ctx
                .tree()
                .children(parent)
                .iter()
                .position(|child| {
                    ctx.tree()
                        .get(*child)
                        .map_or(false, |node| node.tag() == tags::KEYBOARD)
                });
            ctx.tree_mut().mount_to_parent(overlay, parent, slot);
            ctx.mark_dirty_node(parent, PropertyChangeFlag::MEASURE_SELF);
            if !is_using_mouse {
                node::show_select_overlay(ctx, overlay, animate);
            }
            let root = ctx.root();
            ctx.add_after_layout_task(move |ctx| {
                ctx.send_accessibility_event(root, AccessibilityEventType::PageChange)
            });
        });

        SelectOverlayProxy::new(overlay.0)
    }

    /// The root, or the caller’s window scene if windows are composed.
    fn mount_parent(ctx: &PipelineContext, caller: Option<NodeId>) -> NodeId {
        let root = ctx.select_overlay_manager().root;
        if !ctx.config().scene_board_window {
            return root;
        }
        caller
            .and_then(|caller| ctx.tree().find_ancestor_with_tag(caller, tags::WINDOW_SCENE))
            .unwrap_or(root)
    }

    /// Destroys the active overlay.
    pub fn destroy_select_overlay(ctx: &mut PipelineContext, animate: bool) {
        let overlay = match SelectOverlayManager::current(ctx) {
            Some(overlay) => overlay,
            None => {
                ctx.select_overlay_manager_mut().clear_select_overlay();
                return;
            }
        };
        let is_using_mouse = ctx.select_overlay_manager().select_overlay_info.is_using_mouse;
        debug!("destroying select overlay {}", overlay);
        ctx.select_overlay_manager_mut().clear_select_overlay();
        if animate && !is_using_mouse {
            node::hide_select_overlay(ctx, overlay, move |ctx| {
                SelectOverlayManager::destroy_helper(ctx, overlay)
            });
        } else {
            SelectOverlayManager::destroy_helper(ctx, overlay);
        }
    }

    /// Destroys the active overlay if it has the given id.
    pub fn destroy_select_overlay_by_id(ctx: &mut PipelineContext, overlay_id: i32, animate: bool) {
        match SelectOverlayManager::current(ctx) {
            Some(current) if current.0 == overlay_id => {
                SelectOverlayManager::destroy_select_overlay(ctx, animate)
            }
            _ => trace!("select overlay {} is not active", overlay_id),
        }
    }

    fn destroy_helper(ctx: &mut PipelineContext, overlay: NodeId) {
        let parent = ctx.tree().parent(overlay);
        ctx.tree_mut().remove_node(overlay);
        if let Some(parent) = parent {
            ctx.mark_dirty_node(parent, PropertyChangeFlag::MEASURE_SELF);
            ctx.tree_mut().rebuild_render_context_tree(parent);
        }
        let root = ctx.root();
        ctx.add_after_render_task(move |ctx| {
            ctx.send_accessibility_event(root, AccessibilityEventType::PageChange)
        });
    }

    fn clear_select_overlay(&mut self) {
        self.select_overlay_item = None;
        self.host = None;
        self.touch_down_points.clear();
        self.select_overlay_info.caller_frame_node = None;
    }

    /// True if `overlay_id` is the active overlay.
    pub fn has_select_overlay(&self, overlay_id: i32) -> bool {
        self.select_overlay_item.map_or(false, |item| item.0 == overlay_id)
    }

    /// Tells the active overlay whether it is being closed by a tap elsewhere.
    pub fn notify_overlay_closed(ctx: &mut PipelineContext, closed_by_global_event: bool) {
        if let Some(overlay) = SelectOverlayManager::current(ctx) {
            ctx.with_pattern::<SelectOverlayPattern, _, _>(overlay, |pattern, _| {
                pattern.set_closed_by_global_event(closed_by_global_event)
            });
        }
    }

    /// True if a window point is on the selection or on the overlay.
    pub fn is_in_selected_or_select_overlay_area(ctx: &PipelineContext, point: Offset) -> bool {
        let manager = ctx.select_overlay_manager();
        if let Some(host) = manager.selection_host() {
            if host.between_selected_position(point) {
                return true;
            }
        }
        match SelectOverlayManager::current(ctx) {
            Some(overlay) => node::is_in_selected_or_select_overlay_area(ctx, overlay, point),
            None => false,
        }
    }

    /// True if a window point is on the node that owns the selection.
    pub fn is_touch_in_caller_area(ctx: &PipelineContext, point: Offset) -> bool {
        let manager = ctx.select_overlay_manager();
        let caller = manager
            .selection_host()
            .and_then(|host| host.frame_node())
            .or(manager.select_overlay_info.caller_frame_node);
        caller
            .and_then(|caller| ctx.tree().global_frame_rect(caller))
            .map_or(false, |rect| rect.contains(point))
    }

    fn is_dragging(ctx: &PipelineContext, overlay: NodeId) -> bool {
        ctx.tree()
            .get(overlay)
            .and_then(|node| node.pattern::<SelectOverlayPattern>())
            .map_or(false, |pattern| pattern.is_handle_dragging())
    }

    /// Closes the overlay on a tap or click outside of it.
    ///
    /// A touch counts as a tap only if it lifts within the move threshold of where it went down;
    /// anything longer is a drag or a scroll and leaves the overlay alone.
    pub fn handle_global_event(ctx: &mut PipelineContext, event: &TouchEvent, root_offset: Offset) {
        let overlay = match SelectOverlayManager::current(ctx) {
            Some(overlay) => overlay,
            None => return,
        };
        ctx.with_pattern::<SelectOverlayPattern, _, _>(overlay, |pattern, ctx| {
            pattern.on_global_touch(overlay, ctx, event)
        });

        let is_touch = event.device.is_touch_like();
        let mut point = event.location - root_offset.to_vec();
        match (event.kind, is_touch) {
            (TouchType::Down, true) => {
                let record = ctx.select_overlay_manager().touch_down_points.is_empty()
                    && !SelectOverlayManager::is_dragging(ctx, overlay)
                    && !SelectOverlayManager::is_touch_in_caller_area(ctx, point)
                    && !SelectOverlayManager::is_in_selected_or_select_overlay_area(ctx, point);
                if record {
                    trace!("tracking possible tap outside at {:?}", point);
                    ctx.select_overlay_manager_mut().touch_down_points.push(*event);
                }
                return;
            }
            (TouchType::Move, true) => {
                let threshold = ctx.to_px(ctx.theme().text_overlay.move_threshold);
                let manager = ctx.select_overlay_manager_mut();
                let down = match manager.touch_down_points.last() {
                    Some(down) if down.id == event.id => *down,
                    _ => return,
                };
                if event.location.distance(down.location) > threshold {
                    trace!("touch {} is a drag, not a tap", event.id);
                    manager.touch_down_points.clear();
                }
                return;
            }
            (TouchType::Cancel, _) => {
                ctx.select_overlay_manager_mut().touch_down_points.clear();
                return;
            }
            _ => {}
        }

        let no_touch_tracked = ctx.select_overlay_manager().touch_down_points.is_empty();
        let accept_touch_up = event.kind == TouchType::Up && is_touch && !no_touch_tracked;
        if accept_touch_up {
            let manager = ctx.select_overlay_manager_mut();
            let down = match manager.touch_down_points.last() {
                Some(down) if down.id == event.id => *down,
                _ => return,
            };
            point = down.location - root_offset.to_vec();
            manager.touch_down_points.pop();
        }
        let is_mouse_down = event.kind == TouchType::Down && !is_touch && no_touch_tracked;
        if !is_mouse_down && !accept_touch_up {
            return;
        }
        if !SelectOverlayManager::is_in_selected_or_select_overlay_area(ctx, point) {
            debug!("closing select overlay {} after a tap at {:?}", overlay, point);
            SelectOverlayManager::notify_overlay_closed(ctx, true);
            SelectOverlayManager::destroy_select_overlay(ctx, false);
        }
    }

    /// Registers a callback for scrolls of the scrollable node `scrollable_id`.
    pub fn register_scroll_callback(
        &mut self,
        scrollable_id: i32,
        callback_id: i32,
        callback: ScrollCallback,
    ) {
        self.parent_scroll_callbacks
            .entry(scrollable_id)
            .or_insert_with(BTreeMap::new)
            .insert(callback_id, callback);
    }

    /// Removes a callback from every scrollable it was registered for.
    pub fn remove_scroll_callback(&mut self, callback_id: i32) {
        for callbacks in self.parent_scroll_callbacks.values_mut() {
            callbacks.remove(&callback_id);
        }
        self.parent_scroll_callbacks.retain(|_, callbacks| !callbacks.is_empty());
    }

    /// Calls every callback registered for `scrollable_id`.
    pub fn notify_on_scroll_callback(
        &self,
        scrollable_id: i32,
        axis: Axis,
        offset: f64,
        source: i32,
    ) {
        let callbacks: Vec<_> = match self.parent_scroll_callbacks.get(&scrollable_id) {
            Some(callbacks) => callbacks.values().cloned().collect(),
            None => return,
        };
        for callback in callbacks {
            callback(axis, offset, source);
        }
    }

    pub fn has_scroll_callbacks_for(&self, scrollable_id: i32) -> bool {
        self.parent_scroll_callbacks.contains_key(&scrollable_id)
    }
}

impl Default for SelectOverlayManager {
    fn default() -> SelectOverlayManager {
        SelectOverlayManager::new(NodeId(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn removing_last_callback_prunes_scrollable() {
        let mut manager = SelectOverlayManager::new(NodeId(0));
        let calls = Rc::new(RefCell::new(Vec::new()));
        for callback_id in &[1, 2] {
            let (calls, callback_id) = (calls.clone(), *callback_id);
            manager.register_scroll_callback(
                7,
                callback_id,
                Rc::new(move |axis, offset, _| {
                    calls.borrow_mut().push((callback_id, axis, offset))
                }),
            );
        }

        manager.notify_on_scroll_callback(7, Axis::Vertical, 12., 0);
        assert_eq!(
            *calls.borrow(),
            vec![(1, Axis::Vertical, 12.), (2, Axis::Vertical, 12.)]
        );

        manager.remove_scroll_callback(1);
        assert!(manager.has_scroll_callbacks_for(7));
        manager.remove_scroll_callback(2);
        assert!(!manager.has_scroll_callbacks_for(7));
        manager.notify_on_scroll_callback(7, Axis::Vertical, 3., 0);
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn stale_ids_are_not_active() {
        let manager = SelectOverlayManager::new(NodeId(0));
        assert!(!manager.has_select_overlay(0));
        assert!(!manager.has_select_overlay(34));
    }
}
