//! The select overlay pattern: handle dragging, menu visibility, and the auto-hide timer.

use super::content_modifier::SelectOverlayContentModifier;
use super::info::{SelectHandleInfo, SelectMenuInfo, SelectOverlayInfo};
use super::layout_algorithm::SelectOverlayLayoutAlgorithm;
use super::menu_wrapper::MenuWrapper;
use super::node;
use super::overlay_modifier::SelectOverlayModifier;
use super::paint_method::SelectOverlayPaintMethod;
use crate::event_hub::{GestureCallback, PanEvent};
use crate::events::{GestureEvent, TouchEvent};
use crate::frame_node::{NodeId, PropertyChangeFlag};
use crate::layout::LayoutAlgorithm;
use crate::paint::NodePaintMethod;
use crate::pattern::Pattern;
use crate::pipeline::PipelineContext;
use crate::rect::{near_equal, Offset, Rect};
use crate::task::CancelableTask;
use cgmath::{EuclideanSpace, Point2, Vector2};
use parking_lot::Mutex;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A single handle without a line indicator hides itself after this long without interaction.
pub const HIDDEN_HANDLE_DELAY_MS: u64 = 4000;

/// Which handle, if any, is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleDragState {
    Idle,
    DraggingFirst,
    DraggingSecond,
}

/// What the menu shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Hidden,
    Shown,
    /// The default menu is collapsed into the back button and the extension menu is open.
    ExtensionShown,
}

/// Visibility of a single handle, driven by the auto-hide timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleVisibility {
    Visible,
    Hidden,
}

/// Pattern of a select overlay node.
///
/// Handle hot zones are kept relative to the overlay; everything in `info` is in window
/// coordinates.
pub struct SelectOverlayPattern {
    info: SelectOverlayInfo,
    first_handle_region: Option<Rect>,
    second_handle_region: Option<Rect>,
    hot_zone_radius: f64,
    drag_state: HandleDragState,
    menu_state: MenuState,
    menu_state_before_drag: Option<MenuState>,
    handle_visibility: HandleVisibility,
    hidden_handle_task: Option<CancelableTask>,

    default_menu_end_offset: Offset,
    menu_width: Option<f64>,
    menu_height: Option<f64>,
    overlay_offset: Offset,
    view_port: Rect,
    more_button_rect: Option<Rect>,

    menu_wrapper: Option<MenuWrapper>,
    closed_by_global_event: bool,
    content_modifier: Arc<Mutex<SelectOverlayContentModifier>>,
    overlay_modifier: Arc<Mutex<SelectOverlayModifier>>,
}

impl SelectOverlayPattern {
    pub fn new(info: SelectOverlayInfo) -> SelectOverlayPattern {
        let menu_state = if info.menu_info.menu_is_show {
            MenuState::Shown
        } else {
            MenuState::Hidden
        };
        SelectOverlayPattern {
            info,
            first_handle_region: None,
            second_handle_region: None,
            hot_zone_radius: 0.,
            drag_state: HandleDragState::Idle,
            menu_state,
            menu_state_before_drag: None,
            handle_visibility: HandleVisibility::Visible,
            hidden_handle_task: None,
            default_menu_end_offset: Point2::origin(),
            menu_width: None,
            menu_height: None,
            overlay_offset: Point2::origin(),
            view_port: Rect::zero(),
            more_button_rect: None,
            menu_wrapper: None,
            closed_by_global_event: false,
            content_modifier: Arc::new(Mutex::new(SelectOverlayContentModifier::new())),
            overlay_modifier: Arc::new(Mutex::new(SelectOverlayModifier::new())),
        }
    }

    pub fn info(&self) -> &SelectOverlayInfo {
        &self.info
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu_state
    }

    pub fn drag_state(&self) -> HandleDragState {
        self.drag_state
    }

    pub fn is_handle_dragging(&self) -> bool {
        self.drag_state != HandleDragState::Idle
    }

    pub fn is_hidden_handle(&self) -> bool {
        self.handle_visibility == HandleVisibility::Hidden
    }

    pub fn is_menu_show(&self) -> bool {
        self.menu_state != MenuState::Hidden
    }

    pub fn is_handle_show(&self) -> bool {
        self.info.first_handle.is_show || self.info.second_handle.is_show
    }

    /// Remembers whether the overlay is being closed by a tap somewhere else.
    pub fn set_closed_by_global_event(&mut self, value: bool) {
        self.closed_by_global_event = value;
    }

    pub(crate) fn set_menu_wrapper(&mut self, wrapper: MenuWrapper) {
        self.menu_wrapper = Some(wrapper);
    }

    /// Hot zone of a handle, in window coordinates.
    pub fn handle_region(&self, is_first: bool) -> Option<Rect> {
        let region = if is_first {
            self.first_handle_region
        } else {
            self.second_handle_region
        };
        region.map(|region| region + self.overlay_offset.to_vec())
    }

    pub fn overlay_offset(&self) -> Offset {
        self.overlay_offset
    }

    pub fn default_menu_end_offset(&self) -> Offset {
        self.default_menu_end_offset
    }

    pub fn menu_width(&self) -> Option<f64> {
        self.menu_width
    }

    pub fn menu_height(&self) -> Option<f64> {
        self.menu_height
    }

    fn update_handle_hot_zone(&mut self) {
        let r = self.hot_zone_radius;
        let size = Vector2::new(r * 2., r * 2.);
        let local = self.overlay_offset.to_vec();
        let first = self.info.first_handle.paint_rect - local;
        let second = self.info.second_handle.paint_rect - local;
        let center_x = |rect: Rect| (rect.left() + rect.right()) / 2.;
        let below = |rect: Rect| Rect::new(Point2::new(center_x(rect) - r, rect.bottom()), size);
        let above =
            |rect: Rect| Rect::new(Point2::new(center_x(rect) - r, rect.top() - r * 2.), size);

        if self.info.is_single_handle {
            if !self.info.first_handle.is_show && self.info.second_handle.is_show {
                self.first_handle_region = None;
                self.second_handle_region = Some(below(second));
            } else {
                self.first_handle_region = Some(below(first));
                self.second_handle_region = None;
            }
        } else if self.info.handle_reverse {
            self.first_handle_region = Some(below(first));
            self.second_handle_region = Some(above(second));
        } else {
            self.first_handle_region = Some(above(first));
            self.second_handle_region = Some(below(second));
        }
    }

    fn apply_response_regions(&self, host: NodeId, ctx: &mut PipelineContext) {
        let regions = self
            .first_handle_region
            .iter()
            .chain(self.second_handle_region.iter())
            .cloned()
            .collect();
        if let Some(node) = ctx.tree_mut().get_mut(host) {
            node.event_hub_mut().set_response_regions(regions);
        }
    }

    /// Recomputes whether the handles are in reverse order, and tells the caller if that changed.
    pub fn check_handle_reverse(&mut self) -> bool {
        let first = self.info.first_handle.paint_rect;
        let second = self.info.second_handle.paint_rect;
        let handle_reverse = if near_equal(first.top(), second.top(), self.info.line_tolerance()) {
            first.left() > second.left()
        } else {
            first.top() > second.top()
        };
        if handle_reverse == self.info.handle_reverse {
            return false;
        }
        trace!("handle reverse is now {}", handle_reverse);
        self.info.handle_reverse = handle_reverse;
        if let Some(on_handle_reverse) = &self.info.on_handle_reverse {
            on_handle_reverse(handle_reverse);
        }
        true
    }

    fn set_menu_state(&mut self, host: NodeId, ctx: &mut PipelineContext, state: MenuState) {
        if self.menu_state == state {
            return;
        }
        trace!("menu {:?} -> {:?}", self.menu_state, state);
        self.menu_state = state;
        self.info.menu_info.menu_is_show = state != MenuState::Hidden;
        ctx.mark_dirty_node(host, PropertyChangeFlag::MEASURE_SELF);
    }

    /// Hides the menu, or shows it again if a handle is visible.
    pub fn show_or_hidden_menu(
        &mut self,
        host: NodeId,
        ctx: &mut PipelineContext,
        is_hidden: bool,
    ) {
        if self.is_menu_show() && is_hidden {
            self.set_menu_state(host, ctx, MenuState::Hidden);
        } else if !self.is_menu_show() && !is_hidden && self.is_handle_show() {
            self.set_menu_state(host, ctx, MenuState::Shown);
        }
    }

    /// Opens or closes the extension menu.
    pub fn toggle_extension_menu(&mut self, host: NodeId, ctx: &mut PipelineContext) {
        let next = match self.menu_state {
            MenuState::Shown => MenuState::ExtensionShown,
            MenuState::ExtensionShown => MenuState::Shown,
            MenuState::Hidden => return,
        };
        self.set_menu_state(host, ctx, next);
        self.overlay_modifier
            .lock()
            .set_line_end_offset(next != MenuState::ExtensionShown, ctx.now());
        ctx.mark_dirty_node(host, PropertyChangeFlag::RENDER);
    }

    fn should_auto_hide(&self) -> bool {
        self.info.is_single_handle && !self.info.is_handle_line_show
    }

    fn start_hidden_handle_task(&mut self, host: NodeId, ctx: &mut PipelineContext) {
        if !self.should_auto_hide() || self.is_hidden_handle() {
            return;
        }
        let task = ctx.post_cancelable_delayed_task(
            move |ctx| {
                ctx.with_pattern::<SelectOverlayPattern, _, _>(host, |pattern, ctx| {
                    pattern.hidden_handle(host, ctx)
                });
            },
            HIDDEN_HANDLE_DELAY_MS,
        );
        self.hidden_handle_task = Some(task);
    }

    fn stop_hidden_handle_task(&mut self) {
        if let Some(task) = self.hidden_handle_task.take() {
            task.cancel();
        }
    }

    fn hidden_handle(&mut self, host: NodeId, ctx: &mut PipelineContext) {
        debug!("hiding idle handle of {}", host);
        self.hidden_handle_task = None;
        self.handle_visibility = HandleVisibility::Hidden;
        if let Some(node) = ctx.tree_mut().get_mut(host) {
            let hub = node.event_hub_mut();
            hub.remove_click_event();
            hub.remove_pan_event();
        }
        ctx.mark_dirty_node(host, PropertyChangeFlag::RENDER);
    }

    fn handle_on_click(&mut self, host: NodeId, ctx: &mut PipelineContext) {
        let next = if self.is_menu_show() {
            MenuState::Hidden
        } else {
            MenuState::Shown
        };
        self.set_menu_state(host, ctx, next);
        if self.should_auto_hide() {
            self.stop_hidden_handle_task();
            self.start_hidden_handle_task(host, ctx);
        }
    }

    fn handle_pan_start(&mut self, host: NodeId, ctx: &mut PipelineContext, event: &GestureEvent) {
        let point = event.local_location;
        let in_region =
            |region: Option<Rect>| region.map_or(false, |region| region.contains(point));
        self.drag_state = if in_region(self.first_handle_region) {
            HandleDragState::DraggingFirst
        } else if in_region(self.second_handle_region) {
            HandleDragState::DraggingSecond
        } else {
            debug!("point {:?} is not in drag area", point);
            return;
        };
        let is_first = self.drag_state == HandleDragState::DraggingFirst;
        if let Some(on_handle_move_start) = &self.info.on_handle_move_start {
            on_handle_move_start(is_first);
        }
        self.menu_state_before_drag = Some(self.menu_state);
        self.set_menu_state(host, ctx, MenuState::Hidden);
        self.stop_hidden_handle_task();
    }

    fn handle_pan_move(&mut self, host: NodeId, ctx: &mut PipelineContext, event: &GestureEvent) {
        let delta = event.delta;
        let (handle, region, is_first) = match self.drag_state {
            HandleDragState::DraggingFirst => (
                &mut self.info.first_handle,
                &mut self.first_handle_region,
                true,
            ),
            HandleDragState::DraggingSecond => (
                &mut self.info.second_handle,
                &mut self.second_handle_region,
                false,
            ),
            HandleDragState::Idle => {
                debug!("the move point is not in drag area");
                return;
            }
        };
        handle.paint_rect = handle.paint_rect + delta;
        *region = region.map(|region| region + delta);
        let paint_rect = handle.paint_rect;

        if self.check_handle_reverse() {
            self.update_handle_hot_zone();
            self.apply_response_regions(host, ctx);
        }
        ctx.mark_dirty_node(host, PropertyChangeFlag::RENDER);
        if let Some(on_handle_move) = &self.info.on_handle_move {
            on_handle_move(paint_rect, is_first);
        }
    }

    fn handle_pan_end(&mut self, host: NodeId, ctx: &mut PipelineContext) {
        let (rect, is_first) = match self.drag_state {
            HandleDragState::DraggingFirst => (self.info.first_handle.paint_rect, true),
            HandleDragState::DraggingSecond => (self.info.second_handle.paint_rect, false),
            HandleDragState::Idle => return,
        };
        if let Some(state) = self.menu_state_before_drag.take() {
            self.set_menu_state(host, ctx, state);
        }
        self.drag_state = HandleDragState::Idle;
        if let Some(on_handle_move_done) = &self.info.on_handle_move_done {
            on_handle_move_done(rect, is_first);
        }
        self.start_hidden_handle_task(host, ctx);
    }

    /// Replaces the first handle. Lays out again if the handle asks for it, otherwise repaints.
    pub fn update_first_select_handle_info(
        &mut self,
        host: NodeId,
        ctx: &mut PipelineContext,
        handle: SelectHandleInfo,
    ) {
        if self.info.first_handle == handle {
            return;
        }
        self.info.first_handle = handle;
        self.after_handle_update(host, ctx, handle.need_layout);
    }

    pub fn update_second_select_handle_info(
        &mut self,
        host: NodeId,
        ctx: &mut PipelineContext,
        handle: SelectHandleInfo,
    ) {
        if self.info.second_handle == handle {
            return;
        }
        self.info.second_handle = handle;
        self.after_handle_update(host, ctx, handle.need_layout);
    }

    fn after_handle_update(&mut self, host: NodeId, ctx: &mut PipelineContext, need_layout: bool) {
        self.check_handle_reverse();
        self.update_handle_hot_zone();
        self.apply_response_regions(host, ctx);
        let flag = if need_layout {
            PropertyChangeFlag::MEASURE_SELF
        } else {
            PropertyChangeFlag::RENDER
        };
        ctx.mark_dirty_node(host, flag);
    }

    /// Replaces the menu description, rebuilding the option buttons if the set of options changed.
    pub fn update_select_menu_info(
        &mut self,
        host: NodeId,
        ctx: &mut PipelineContext,
        menu_info: SelectMenuInfo,
    ) {
        let icon_changed = self.info.menu_info.is_icon_changed(&menu_info);
        let state = match (menu_info.menu_is_show, self.menu_state) {
            (false, _) => MenuState::Hidden,
            (true, MenuState::Hidden) => MenuState::Shown,
            (true, state) => state,
        };
        self.info.menu_info = menu_info;
        if icon_changed {
            self.menu_state = state;
            node::update_tool_bar(ctx, host, &self.info, true);
        } else {
            self.set_menu_state(host, ctx, state);
            node::update_tool_bar(ctx, host, &self.info, false);
        }
    }

    pub fn update_show_area(&mut self, host: NodeId, ctx: &mut PipelineContext, area: Rect) {
        if self.info.show_area != area {
            self.info.show_area = area;
            ctx.mark_dirty_node(host, PropertyChangeFlag::MEASURE_SELF);
        }
    }

    /// Lets the custom menu hide itself when a touch lands outside it.
    pub(crate) fn on_global_touch(
        &mut self,
        host: NodeId,
        ctx: &mut PipelineContext,
        event: &TouchEvent,
    ) {
        let outside = match &self.menu_wrapper {
            Some(wrapper) => wrapper.is_outside_menu(ctx, event),
            None => return,
        };
        if outside {
            self.show_or_hidden_menu(host, ctx, true);
        }
    }

    fn gesture_callback<F>(host: NodeId, f: F) -> GestureCallback
    where
        F: 'static + Fn(&mut SelectOverlayPattern, &mut PipelineContext, &GestureEvent),
    {
        Rc::new(move |ctx: &mut PipelineContext, event: &GestureEvent| {
            let handled = ctx.with_pattern::<SelectOverlayPattern, _, _>(host, |pattern, ctx| {
                f(pattern, ctx, event)
            });
            if handled.is_none() {
                trace!("select overlay {} is gone", host);
            }
        })
    }
}

impl Pattern for SelectOverlayPattern {
    impl_pattern_any!();

    fn create_layout_algorithm(&self) -> Box<dyn LayoutAlgorithm> {
        Box::new(SelectOverlayLayoutAlgorithm::new(
            self.info.clone(),
            self.menu_state,
            self.default_menu_end_offset,
            self.menu_width,
            self.menu_height,
        ))
    }

    fn create_node_paint_method(&self) -> Option<Box<dyn NodePaintMethod>> {
        Some(Box::new(SelectOverlayPaintMethod::new(
            self.content_modifier.clone(),
            self.overlay_modifier.clone(),
            self.info.clone(),
            self.is_hidden_handle(),
            self.view_port,
            self.more_button_rect,
            self.menu_state == MenuState::ExtensionShown,
        )))
    }

    fn on_attach_to_frame_node(&mut self, host: NodeId, ctx: &mut PipelineContext) {
        self.hot_zone_radius = ctx.to_px(ctx.theme().text_overlay.handle_hot_zone_radius);
        self.update_handle_hot_zone();

        if let Some(node) = ctx.tree_mut().get_mut(host) {
            let render_context = node.render_context();
            render_context.set_content_modifier(self.content_modifier.clone());
            render_context.set_overlay_modifier(self.overlay_modifier.clone());
        }
        self.overlay_modifier.lock().set_line_end_offset(true, ctx.now());

        if !self.info.is_using_mouse {
            let pan = PanEvent {
                on_start: SelectOverlayPattern::gesture_callback(host, move |pattern, ctx, event| {
                    pattern.handle_pan_start(host, ctx, event)
                }),
                on_update: SelectOverlayPattern::gesture_callback(host, move |pattern, ctx, event| {
                    pattern.handle_pan_move(host, ctx, event)
                }),
                on_end: SelectOverlayPattern::gesture_callback(host, move |pattern, ctx, _| {
                    pattern.handle_pan_end(host, ctx)
                }),
                on_cancel: SelectOverlayPattern::gesture_callback(host, move |pattern, ctx, _| {
                    pattern.handle_pan_end(host, ctx)
                }),
            };
            let click = if self.info.is_single_handle {
                Some(SelectOverlayPattern::gesture_callback(host, move |pattern, ctx, _| {
                    pattern.handle_on_click(host, ctx)
                }))
            } else {
                None
            };
            if let Some(node) = ctx.tree_mut().get_mut(host) {
                let hub = node.event_hub_mut();
                hub.set_pan_event(pan);
                if let Some(click) = click {
                    hub.set_click_event(click);
                }
            }
            self.apply_response_regions(host, ctx);
        }

        self.start_hidden_handle_task(host, ctx);
    }

    fn on_detach_from_frame_node(&mut self, host: NodeId) {
        trace!("select overlay {} detached", host);
        self.stop_hidden_handle_task();
        if let Some(on_close) = &self.info.on_close {
            on_close(self.closed_by_global_event);
        }
    }

    fn on_dirty_layout_wrapper_swap(
        &mut self,
        host: NodeId,
        algorithm: &dyn LayoutAlgorithm,
        ctx: &mut PipelineContext,
    ) -> bool {
        let algorithm = match algorithm.as_any().downcast_ref::<SelectOverlayLayoutAlgorithm>() {
            Some(algorithm) => algorithm,
            None => {
                warn!("select overlay {} was laid out by a foreign algorithm", host);
                return false;
            }
        };
        self.default_menu_end_offset = algorithm.default_menu_end_offset();
        self.menu_width = algorithm.menu_width();
        self.menu_height = algorithm.menu_height();
        self.view_port = algorithm.view_port();
        self.more_button_rect = algorithm.more_button_rect();
        if self.overlay_offset != algorithm.overlay_offset() {
            self.overlay_offset = algorithm.overlay_offset();
            self.update_handle_hot_zone();
            self.apply_response_regions(host, ctx);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TouchType;
    use crate::frame_node::tags;
    use crate::pipeline::PipelineConfig;
    use crate::theme::Theme;
    use std::cell::RefCell;

    fn pipeline() -> PipelineContext {
        PipelineContext::new(PipelineConfig::default(), Theme::default())
    }

    fn mount(ctx: &mut PipelineContext, info: SelectOverlayInfo) -> NodeId {
        let pattern = SelectOverlayPattern::new(info);
        let id = ctx.create_frame_node(tags::SELECT_OVERLAY, Some(Box::new(pattern)));
        let root = ctx.root();
        ctx.tree_mut().add_child(root, id);
        ctx.mark_dirty_node(root, PropertyChangeFlag::MEASURE_SELF);
        ctx.flush_frame();
        id
    }

    fn two_handles() -> SelectOverlayInfo {
        let mut info = SelectOverlayInfo::default();
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 300., 2., 20.));
        info.second_handle = SelectHandleInfo::new(Rect::from_xywh(300., 300., 2., 20.));
        info
    }

    fn pattern<R>(
        ctx: &mut PipelineContext,
        id: NodeId,
        f: impl FnOnce(&mut SelectOverlayPattern) -> R,
    ) -> R {
        ctx.with_pattern::<SelectOverlayPattern, _, _>(id, |pattern, _| f(pattern)).unwrap()
    }

    #[test]
    fn hot_zones_sit_above_first_and_below_second() {
        let mut ctx = pipeline();
        let id = mount(&mut ctx, two_handles());
        let (first, second) =
            pattern(&mut ctx, id, |p| (p.handle_region(true), p.handle_region(false)));
        assert_eq!(first, Some(Rect::from_xywh(81., 260., 40., 40.)));
        assert_eq!(second, Some(Rect::from_xywh(281., 320., 40., 40.)));
    }

    #[test]
    fn reverse_fires_once_per_flip() {
        let flips = Rc::new(RefCell::new(Vec::new()));
        let mut info = SelectOverlayInfo::default();
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 50., 10., 10.));
        info.second_handle = SelectHandleInfo::new(Rect::from_xywh(50., 50., 10., 10.));
        let log = flips.clone();
        info.on_handle_reverse = Some(Rc::new(move |reverse| log.borrow_mut().push(reverse)));

        let mut pattern = SelectOverlayPattern::new(info);
        assert!(pattern.check_handle_reverse());
        assert!(!pattern.check_handle_reverse());
        assert!(!pattern.check_handle_reverse());
        assert!(pattern.info().handle_reverse);
        assert_eq!(*flips.borrow(), vec![true]);
    }

    #[test]
    fn lower_first_handle_is_reversed() {
        let mut info = SelectOverlayInfo::default();
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(10., 100., 2., 20.));
        info.second_handle = SelectHandleInfo::new(Rect::from_xywh(300., 40., 2., 20.));
        let mut pattern = SelectOverlayPattern::new(info);
        assert!(pattern.check_handle_reverse());

        // within one line height the horizontal order decides
        pattern.info.first_handle.paint_rect = Rect::from_xywh(10., 45., 2., 20.);
        assert!(pattern.check_handle_reverse());
        assert!(!pattern.info().handle_reverse);
    }

    #[test]
    fn drag_moves_handle_and_restores_menu() {
        let moves = Rc::new(RefCell::new(Vec::new()));
        let mut info = two_handles();
        let log = moves.clone();
        info.on_handle_move_done =
            Some(Rc::new(move |rect, is_first| log.borrow_mut().push((rect, is_first))));
        let mut ctx = pipeline();
        let id = mount(&mut ctx, info);

        ctx.dispatch_touch(TouchEvent::touch(0, 301., 340., TouchType::Down));
        ctx.dispatch_touch(TouchEvent::touch(0, 321., 340., TouchType::Move));
        ctx.flush_frame();
        let (state, menu) = pattern(&mut ctx, id, |p| (p.drag_state(), p.menu_state()));
        assert_eq!(state, HandleDragState::DraggingSecond);
        assert_eq!(menu, MenuState::Hidden);

        ctx.dispatch_touch(TouchEvent::touch(0, 321., 340., TouchType::Up));
        ctx.flush_frame();
        let (state, menu) = pattern(&mut ctx, id, |p| (p.drag_state(), p.menu_state()));
        assert_eq!(state, HandleDragState::Idle);
        assert_eq!(menu, MenuState::Shown);
        assert_eq!(*moves.borrow(), vec![(Rect::from_xywh(320., 300., 2., 20.), false)]);
    }

    #[test]
    fn pan_outside_hot_zones_is_ignored() {
        let mut ctx = pipeline();
        let id = mount(&mut ctx, two_handles());
        // inside the overlay frame but outside both response regions
        assert_eq!(ctx.hit_test(Point2::new(200., 200.)), None);
        pattern(&mut ctx, id, |p| {
            assert_eq!(p.drag_state(), HandleDragState::Idle);
        });
    }

    #[test]
    fn idle_single_handle_hides_itself() {
        let mut info = SelectOverlayInfo::default();
        info.is_single_handle = true;
        info.is_handle_line_show = false;
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 300., 2., 20.));
        let mut ctx = pipeline();
        let id = mount(&mut ctx, info);
        assert!(ctx.tree().get(id).unwrap().event_hub().has_click_event());

        ctx.advance_time(HIDDEN_HANDLE_DELAY_MS - 1);
        assert!(!pattern(&mut ctx, id, |p| p.is_hidden_handle()));
        ctx.advance_time(1);
        assert!(pattern(&mut ctx, id, |p| p.is_hidden_handle()));
        let hub = ctx.tree().get(id).unwrap().event_hub();
        assert!(!hub.has_click_event());
        assert!(!hub.has_pan_event());
    }

    #[test]
    fn detach_reports_how_the_overlay_closed() {
        let closed = Rc::new(RefCell::new(None));
        let mut info = two_handles();
        let log = closed.clone();
        info.on_close = Some(Rc::new(move |global| *log.borrow_mut() = Some(global)));
        let mut ctx = pipeline();
        let id = mount(&mut ctx, info);
        pattern(&mut ctx, id, |p| p.set_closed_by_global_event(true));
        ctx.tree_mut().remove_node(id);
        assert_eq!(*closed.borrow(), Some(true));
    }
}
