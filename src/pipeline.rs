//! The pipeline context: one per window.
//!
//! It owns the frame tree, the task queue, the theme, and the select overlay manager, and it
//! drives every frame: tasks, then layout, then paint.

use crate::accessibility::{AccessibilityEventType, AccessibilityNotifier, LoggingNotifier};
use crate::events::{GestureEvent, PointerDevice, TouchEvent, TouchEventInfo, TouchType};
use crate::frame_node::{tags, NodeId, PropertyChangeFlag};
use crate::frame_tree::FrameTree;
use crate::layout::{LayoutConstraint, LayoutEnv, LayoutWrapper, MeasureType};
use crate::paint::PaintWrapper;
use crate::pattern::Pattern;
use crate::rect::{Offset, Size};
use crate::select_overlay::SelectOverlayManager;
use crate::task::{CancelableTask, Task, TaskExecutor, TaskRunner};
use crate::theme::{Dimension, Theme};
use cgmath::{EuclideanSpace, MetricSpace, Vector2};
use tracing::{debug, trace};

/// Window-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Pixels per vp.
    pub density: f64,
    /// Height of the system status bar.
    pub safe_area_top: f64,
    pub window_size: Size,
    /// Multi-window composition is active; overlays mount into their window scene.
    pub scene_board_window: bool,
}

impl Default for PipelineConfig {
    fn default() -> PipelineConfig {
        PipelineConfig {
            density: 1.,
            safe_area_top: 0.,
            window_size: Vector2::new(720., 1280.),
            scene_board_window: false,
        }
    }
}

/// The pointer currently being tracked by the gesture recognizer.
#[derive(Debug, Clone, Copy)]
struct GestureTracking {
    pointer: i32,
    target: NodeId,
    down: Offset,
    last: Offset,
    panning: bool,
    device: PointerDevice,
}

/// The pipeline context.
pub struct PipelineContext {
    tree: FrameTree,
    root: NodeId,
    theme: Theme,
    config: PipelineConfig,
    executor: TaskExecutor,
    select_overlay_manager: SelectOverlayManager,
    accessibility: Box<dyn AccessibilityNotifier>,
    after_layout_tasks: Vec<Task>,
    after_render_tasks: Vec<Task>,
    gesture: Option<GestureTracking>,
}

impl PipelineContext {
    /// Creates a pipeline with a mounted root node that fills the window.
    pub fn new(config: PipelineConfig, theme: Theme) -> PipelineContext {
        let mut tree = FrameTree::new();
        let root = tree.create_frame_node(tags::ROOT, None);
        if let Some(node) = tree.get_mut(root) {
            node.layout_property_mut().measure_type = MeasureType::MatchParent;
            node.geometry_node_mut().set_frame_size(config.window_size);
        }
        tree.set_root(root);
        tree.mark_dirty_node(root, PropertyChangeFlag::MEASURE_SELF);

        PipelineContext {
            tree,
            root,
            theme,
            config,
            executor: TaskExecutor::new(),
            select_overlay_manager: SelectOverlayManager::new(root),
            accessibility: Box::new(LoggingNotifier),
            after_layout_tasks: Vec::new(),
            after_render_tasks: Vec::new(),
            gesture: None,
        }
    }

    pub fn tree(&self) -> &FrameTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut FrameTree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.tree.mark_dirty_node(self.root, PropertyChangeFlag::MEASURE_SELF);
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Converts a dimension to pixels at this window’s density.
    pub fn to_px(&self, dimension: Dimension) -> f64 {
        dimension.to_px(self.config.density)
    }

    pub fn select_overlay_manager(&self) -> &SelectOverlayManager {
        &self.select_overlay_manager
    }

    pub fn select_overlay_manager_mut(&mut self) -> &mut SelectOverlayManager {
        &mut self.select_overlay_manager
    }

    pub fn set_accessibility_notifier<N: 'static + AccessibilityNotifier>(&mut self, notifier: N) {
        self.accessibility = Box::new(notifier);
    }

    pub fn send_accessibility_event(&self, node: NodeId, event: AccessibilityEventType) {
        self.accessibility.send_event(node, event);
    }

    /// Creates a node and runs its pattern’s attach hook.
    pub fn create_frame_node(
        &mut self,
        tag: &'static str,
        pattern: Option<Box<dyn Pattern>>,
    ) -> NodeId {
        let id = self.tree.create_frame_node(tag, pattern);
        self.attach_pattern(id);
        id
    }

    fn attach_pattern(&mut self, id: NodeId) {
        if let Some(mut pattern) = self.tree.take_pattern(id) {
            pattern.on_attach_to_frame_node(id, self);
            if let Err(mut pattern) = self.tree.restore_pattern(id, pattern) {
                pattern.on_detach_from_frame_node(id);
            }
        }
    }

    pub fn mark_dirty_node(&mut self, id: NodeId, flag: PropertyChangeFlag) {
        self.tree.mark_dirty_node(id, flag);
    }

    /// Calls `f` with the node’s pattern, if it is a `P`, and the rest of the pipeline.
    ///
    /// Returns `None` if the node is gone or its pattern is of a different type or already lent
    /// out. If `f` destroys the node, the pattern is detached afterwards.
    pub fn with_pattern<P, R, F>(&mut self, id: NodeId, f: F) -> Option<R>
    where
        P: Pattern,
        F: FnOnce(&mut P, &mut PipelineContext) -> R,
    {
        let mut pattern = self.tree.take_pattern(id)?;
        let result = match pattern.as_any_mut().downcast_mut::<P>() {
            Some(concrete) => Some(f(concrete, self)),
            None => None,
        };
        if let Err(mut pattern) = self.tree.restore_pattern(id, pattern) {
            pattern.on_detach_from_frame_node(id);
        }
        result
    }

    pub fn task_runner(&self) -> TaskRunner {
        self.executor.runner()
    }

    /// The current time in milliseconds.
    pub fn now(&self) -> u64 {
        self.executor.now()
    }

    pub fn post_task<F: 'static + FnOnce(&mut PipelineContext)>(&self, task: F) {
        self.executor.runner().post_task(task);
    }

    pub fn post_delayed_task<F>(&self, task: F, delay_ms: u64)
    where
        F: 'static + FnOnce(&mut PipelineContext),
    {
        self.executor.runner().post_delayed_task(task, delay_ms);
    }

    pub fn post_cancelable_delayed_task<F>(&self, task: F, delay_ms: u64) -> CancelableTask
    where
        F: 'static + FnOnce(&mut PipelineContext),
    {
        self.executor.runner().post_cancelable_delayed_task(task, delay_ms)
    }

    /// Runs `task` right after the next layout pass.
    pub fn add_after_layout_task<F: 'static + FnOnce(&mut PipelineContext)>(&mut self, task: F) {
        self.after_layout_tasks.push(Box::new(task));
    }

    /// Runs `task` right after the next render pass.
    pub fn add_after_render_task<F: 'static + FnOnce(&mut PipelineContext)>(&mut self, task: F) {
        self.after_render_tasks.push(Box::new(task));
    }

    /// Runs every task that is due.
    pub fn flush_tasks(&mut self) {
        while let Some(task) = self.executor.pop_ready() {
            task(self);
        }
    }

    /// Moves the clock forward, running delayed tasks and frames in between.
    pub fn advance_time(&mut self, ms: u64) {
        let target = self.now() + ms;
        loop {
            self.flush_tasks();
            self.flush_frame();
            match self.executor.next_due() {
                Some(due) if due <= target => self.executor.set_now(due),
                _ => break,
            }
        }
        self.executor.set_now(target);
        self.flush_tasks();
        self.flush_frame();
    }

    /// Runs pending tasks, then lays out and paints whatever is dirty.
    pub fn flush_frame(&mut self) {
        self.flush_tasks();
        self.flush_layout();
        for task in std::mem::replace(&mut self.after_layout_tasks, Vec::new()) {
            task(self);
        }
        self.flush_render();
        for task in std::mem::replace(&mut self.after_render_tasks, Vec::new()) {
            task(self);
        }
    }

    fn layout_constraint_for(&self, id: NodeId) -> LayoutConstraint {
        if id == self.root {
            return LayoutConstraint {
                min_size: self.config.window_size,
                max_size: self.config.window_size,
            };
        }
        let node = self.tree.get(id);
        if let Some(constraint) = node.and_then(|node| node.layout_property().layout_constraint) {
            return constraint;
        }
        let parent_size = self
            .tree
            .parent(id)
            .and_then(|parent| self.tree.get(parent))
            .map_or(self.config.window_size, |parent| parent.geometry_node().frame_size());
        LayoutConstraint::loose(parent_size)
    }

    fn flush_layout(&mut self) {
        for id in self.tree.take_dirty_layout_nodes() {
            let constraint = self.layout_constraint_for(id);
            let mut wrapper = match LayoutWrapper::build(&self.tree, id) {
                Some(wrapper) => wrapper,
                None => continue,
            };
            trace!("layout {} with {:?}", id, constraint);
            {
                let env = LayoutEnv {
                    tree: &self.tree,
                    theme: &self.theme,
                    density: self.config.density,
                    safe_area_top: self.config.safe_area_top,
                };
                wrapper.measure(constraint, &env);
                wrapper.layout(&env);
            }

            for (node, algorithm) in self.tree.swap_layout_wrapper(wrapper) {
                let mut pattern = match self.tree.take_pattern(node) {
                    Some(pattern) => pattern,
                    None => continue,
                };
                let needs_render = pattern.on_dirty_layout_wrapper_swap(node, &*algorithm, self);
                if let Err(mut pattern) = self.tree.restore_pattern(node, pattern) {
                    pattern.on_detach_from_frame_node(node);
                    continue;
                }
                if needs_render {
                    self.tree.mark_dirty_node(node, PropertyChangeFlag::RENDER);
                }
            }
        }
    }

    fn flush_render(&mut self) {
        let now_ms = self.now();
        for id in self.tree.take_dirty_render_nodes() {
            let method = self
                .tree
                .get(id)
                .and_then(|node| node.pattern.as_ref())
                .and_then(|pattern| pattern.create_node_paint_method());
            if let (Some(mut method), Some(node)) = (method, self.tree.get(id)) {
                let wrapper = PaintWrapper {
                    node: id,
                    geometry: node.geometry_node(),
                    global_offset: self.tree.global_offset(id),
                    render_context: node.render_context(),
                    theme: &self.theme,
                    density: self.config.density,
                    now_ms,
                };
                method.update_content_modifier(&wrapper);
                method.update_overlay_modifier(&wrapper);
            }
            self.tree.push_render_update(id);
        }
    }

    /// Finds the top-most interactive node under a point.
    pub fn hit_test(&self, point: Offset) -> Option<NodeId> {
        self.hit_test_node(self.root, point, Offset::origin())
    }

    fn hit_test_node(&self, id: NodeId, point: Offset, parent_offset: Offset) -> Option<NodeId> {
        let node = self.tree.get(id)?;
        if !node.is_active() {
            return None;
        }
        let offset = parent_offset + node.geometry_node().frame_offset().to_vec();
        for child in self.tree.frame_children_by_z(id).into_iter().rev() {
            if let Some(hit) = self.hit_test_node(child, point, offset) {
                return Some(hit);
            }
        }

        let hub = node.event_hub();
        if !hub.is_interactive() {
            return None;
        }
        let local = point - offset.to_vec();
        let frame = node.geometry_node().frame_rect().with_origin(Offset::origin());
        let hit = if hub.response_regions().is_empty() {
            frame.contains(local)
        } else {
            hub.response_regions().iter().any(|region| region.contains(local))
        };
        if hit {
            Some(id)
        } else {
            None
        }
    }

    fn gesture_event(
        &self,
        target: NodeId,
        location: Offset,
        delta: Vector2<f64>,
        device: PointerDevice,
    ) -> GestureEvent {
        GestureEvent {
            global_location: location,
            local_location: location - self.tree.global_offset(target).to_vec(),
            delta,
            device,
        }
    }

    fn fire_touch(&mut self, target: NodeId, event: &TouchEvent) {
        let callback = self.tree.get(target).and_then(|node| node.event_hub().touch_event());
        if let Some(callback) = callback {
            let info = TouchEventInfo {
                kind: event.kind,
                global_location: event.location,
                local_location: event.location - self.tree.global_offset(target).to_vec(),
                device: event.device,
            };
            callback(self, &info);
        }
    }

    /// Feeds a raw pointer event through the global filters and the gesture recognizer.
    pub fn dispatch_touch(&mut self, event: TouchEvent) {
        SelectOverlayManager::handle_global_event(self, &event, Offset::origin());

        match event.kind {
            TouchType::Down => {
                if self.gesture.is_some() {
                    return;
                }
                let target = match self.hit_test(event.location) {
                    Some(target) => target,
                    None => return,
                };
                trace!("pointer {} down on {}", event.id, target);
                self.gesture = Some(GestureTracking {
                    pointer: event.id,
                    target,
                    down: event.location,
                    last: event.location,
                    panning: false,
                    device: event.device,
                });
                self.fire_touch(target, &event);
            }
            TouchType::Move => {
                let mut tracking = match self.gesture {
                    Some(tracking) if tracking.pointer == event.id => tracking,
                    _ => return,
                };
                self.fire_touch(tracking.target, &event);
                let pan = self
                    .tree
                    .get(tracking.target)
                    .and_then(|node| node.event_hub().pan_event());
                if let Some(pan) = pan {
                    if !tracking.panning {
                        let pan_distance = self.to_px(self.theme.text_overlay.pan_distance);
                        if event.location.distance(tracking.down) > pan_distance {
                            tracking.panning = true;
                            let start = self.gesture_event(
                                tracking.target,
                                tracking.down,
                                Vector2::new(0., 0.),
                                tracking.device,
                            );
                            (pan.on_start)(self, &start);
                        }
                    }
                    if tracking.panning {
                        let update = self.gesture_event(
                            tracking.target,
                            event.location,
                            event.location - tracking.last,
                            tracking.device,
                        );
                        tracking.last = event.location;
                        (pan.on_update)(self, &update);
                    }
                }
                if let Some(current) = self.gesture.as_mut() {
                    if current.pointer == tracking.pointer {
                        *current = tracking;
                    }
                }
            }
            TouchType::Up => {
                let tracking = match self.gesture {
                    Some(tracking) if tracking.pointer == event.id => tracking,
                    _ => return,
                };
                self.gesture = None;
                self.fire_touch(tracking.target, &event);
                let hub = self.tree.get(tracking.target).map(|node| node.event_hub());
                let pan = hub.and_then(|hub| hub.pan_event());
                let click = hub.and_then(|hub| hub.click_event());
                let gesture = self.gesture_event(
                    tracking.target,
                    event.location,
                    Vector2::new(0., 0.),
                    tracking.device,
                );
                if tracking.panning {
                    if let Some(pan) = pan {
                        (pan.on_end)(self, &gesture);
                    }
                } else if let Some(click) = click {
                    debug!("click on {}", tracking.target);
                    click(self, &gesture);
                }
            }
            TouchType::Cancel => {
                let tracking = match self.gesture.take() {
                    Some(tracking) => tracking,
                    None => return,
                };
                self.fire_touch(tracking.target, &event);
                if tracking.panning {
                    let pan = self
                        .tree
                        .get(tracking.target)
                        .and_then(|node| node.event_hub().pan_event());
                    if let Some(pan) = pan {
                        let gesture = self.gesture_event(
                            tracking.target,
                            event.location,
                            Vector2::new(0., 0.),
                            tracking.device,
                        );
                        (pan.on_cancel)(self, &gesture);
                    }
                }
            }
        }
    }

    /// True while a pointer is being tracked.
    pub fn is_tracking_pointer(&self) -> bool {
        self.gesture.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_hub::PanEvent;
    use crate::rect::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn pipeline() -> PipelineContext {
        PipelineContext::new(PipelineConfig::default(), Theme::default())
    }

    fn button(ctx: &mut PipelineContext, rect: Rect) -> NodeId {
        let id = ctx.create_frame_node(tags::MENU_OPTION, None);
        let root = ctx.root();
        ctx.tree_mut().add_child(root, id);
        let node = ctx.tree_mut().get_mut(id).unwrap();
        node.geometry_node_mut().set_frame_rect(rect);
        node.layout_property_mut().ideal_size = Some(rect.size);
        id
    }

    #[test]
    fn click_goes_to_topmost_node() {
        let mut ctx = pipeline();
        let below = button(&mut ctx, Rect::from_xywh(0., 0., 100., 100.));
        let above = button(&mut ctx, Rect::from_xywh(0., 0., 100., 100.));
        let clicks = Rc::new(RefCell::new(Vec::new()));
        for id in &[below, above] {
            let (id, clicks) = (*id, clicks.clone());
            ctx.tree_mut()
                .get_mut(id)
                .unwrap()
                .event_hub_mut()
                .set_click_event(Rc::new(move |_: &mut PipelineContext, _: &GestureEvent| {
                    clicks.borrow_mut().push(id)
                }));
        }

        ctx.dispatch_touch(TouchEvent::touch(0, 50., 50., TouchType::Down));
        ctx.dispatch_touch(TouchEvent::touch(0, 50., 50., TouchType::Up));
        assert_eq!(*clicks.borrow(), vec![above]);
    }

    #[test]
    fn pan_starts_after_pan_distance() {
        let mut ctx = pipeline();
        let target = button(&mut ctx, Rect::from_xywh(0., 0., 100., 100.));
        let log = Rc::new(RefCell::new(Vec::new()));
        let phase = |name: &'static str| {
            let log = log.clone();
            Rc::new(move |_: &mut PipelineContext, event: &GestureEvent| {
                log.borrow_mut().push((name, event.local_location, event.delta))
            })
        };
        ctx.tree_mut()
            .get_mut(target)
            .unwrap()
            .event_hub_mut()
            .set_pan_event(PanEvent {
                on_start: phase("start"),
                on_update: phase("update"),
                on_end: phase("end"),
                on_cancel: phase("cancel"),
            });

        ctx.dispatch_touch(TouchEvent::touch(0, 10., 10., TouchType::Down));
        ctx.dispatch_touch(TouchEvent::touch(0, 12., 10., TouchType::Move));
        assert!(log.borrow().is_empty());
        ctx.dispatch_touch(TouchEvent::touch(0, 20., 10., TouchType::Move));
        ctx.dispatch_touch(TouchEvent::touch(0, 25., 10., TouchType::Move));
        ctx.dispatch_touch(TouchEvent::touch(0, 25., 10., TouchType::Up));

        let log = log.borrow();
        let names: Vec<_> = log.iter().map(|entry| entry.0).collect();
        assert_eq!(names, vec!["start", "update", "update", "end"]);
        assert_eq!(log[0].1, Offset::new(10., 10.));
        assert_eq!(log[1].2, Vector2::new(10., 0.));
        assert_eq!(log[2].2, Vector2::new(5., 0.));
    }

    #[test]
    fn with_pattern_detaches_pattern_of_destroyed_node() {
        #[derive(Default)]
        struct Probe(Rc<RefCell<bool>>);
        impl Pattern for Probe {
            impl_pattern_any!();
            fn on_detach_from_frame_node(&mut self, _: NodeId) {
                *self.0.borrow_mut() = true;
            }
        }

        let mut ctx = pipeline();
        let detached = Rc::new(RefCell::new(false));
        let id = ctx.create_frame_node(tags::PAGE, Some(Box::new(Probe(detached.clone()))));
        let ran = ctx.with_pattern::<Probe, _, _>(id, |_, ctx| ctx.tree_mut().remove_node(id));
        assert!(ran.is_some());
        assert!(*detached.borrow());
        assert!(ctx.with_pattern::<Probe, _, _>(id, |_, _| ()).is_none());
    }

    #[test]
    fn delayed_tasks_run_in_order_of_due_time() {
        let mut ctx = pipeline();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, name) in &[(300, "c"), (100, "a"), (200, "b")] {
            let (log, name) = (log.clone(), *name);
            ctx.post_delayed_task(move |ctx| log.borrow_mut().push((name, ctx.now())), *delay);
        }
        ctx.advance_time(250);
        assert_eq!(*log.borrow(), vec![("a", 100), ("b", 200)]);
        ctx.advance_time(50);
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(ctx.now(), 300);
    }
}
