use arkng::accessibility::{AccessibilityEventType, RecordingNotifier};
use arkng::events::{TouchEvent, TouchType};
use arkng::rect::{Offset, Rect};
use arkng::select_overlay::info::SelectionHost;
use arkng::select_overlay::{
    SelectHandleInfo, SelectOverlayInfo, SelectOverlayManager, SelectOverlayPattern,
    SelectOverlayProxy,
};
use arkng::{tags, NodeId, PipelineConfig, PipelineContext, PropertyChangeFlag, Theme};
use cgmath::Point2;
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn pipeline() -> PipelineContext {
    init_tracing();
    PipelineContext::new(PipelineConfig::default(), Theme::default())
}

fn two_handles() -> SelectOverlayInfo {
    let mut info = SelectOverlayInfo::default();
    info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 300., 2., 20.));
    info.second_handle = SelectHandleInfo::new(Rect::from_xywh(300., 300., 2., 20.));
    info
}

fn show(ctx: &mut PipelineContext, info: SelectOverlayInfo) -> SelectOverlayProxy {
    let proxy = SelectOverlayManager::create_and_show_select_overlay(ctx, info, None, false);
    ctx.flush_frame();
    proxy
}

fn overlays_under(ctx: &PipelineContext, parent: NodeId) -> Vec<NodeId> {
    ctx.tree()
        .children(parent)
        .iter()
        .copied()
        .filter(|id| ctx.tree().get(*id).map_or(false, |node| node.tag() == tags::SELECT_OVERLAY))
        .collect()
}

fn tap(ctx: &mut PipelineContext, x: f64, y: f64) {
    ctx.dispatch_touch(TouchEvent::touch(0, x, y, TouchType::Down));
    ctx.dispatch_touch(TouchEvent::touch(0, x, y, TouchType::Up));
    ctx.flush_frame();
}

fn pattern<R>(ctx: &PipelineContext, id: i32, f: impl FnOnce(&SelectOverlayPattern) -> R) -> R {
    let node = ctx.tree().get(NodeId(id)).expect("overlay node");
    f(node.pattern::<SelectOverlayPattern>().expect("overlay pattern"))
}

struct TextHost {
    node: NodeId,
    selected: Rect,
}

impl SelectionHost for TextHost {
    fn frame_node(&self) -> Option<NodeId> {
        Some(self.node)
    }

    fn between_selected_position(&self, global: Offset) -> bool {
        self.selected.contains(global)
    }
}

fn text_node(ctx: &mut PipelineContext, parent: NodeId, rect: Rect) -> NodeId {
    let text = ctx.create_frame_node(tags::TEXT, None);
    if let Some(node) = ctx.tree_mut().get_mut(text) {
        node.layout_property_mut().ideal_size = Some(rect.size);
        node.geometry_node_mut().set_frame_offset(rect.origin);
    }
    ctx.tree_mut().add_child(parent, text);
    ctx.mark_dirty_node(parent, PropertyChangeFlag::MEASURE_SELF);
    ctx.flush_frame();
    text
}

#[test]
fn only_one_overlay_is_active() {
    let mut ctx = pipeline();
    let first = show(&mut ctx, two_handles());
    let second = show(&mut ctx, two_handles());

    let root = ctx.root();
    assert_eq!(overlays_under(&ctx, root), vec![NodeId(second.get_select_overlay_id())]);
    assert!(first.is_closed(&ctx));
    assert!(!second.is_closed(&ctx));
    assert!(!ctx.tree().contains(NodeId(first.get_select_overlay_id())));
}

#[test]
fn replaced_overlay_reports_global_close() {
    let mut ctx = pipeline();
    let closed = Rc::new(RefCell::new(Vec::new()));
    let mut info = two_handles();
    let log = closed.clone();
    info.on_close = Some(Rc::new(move |global| log.borrow_mut().push(global)));
    show(&mut ctx, info);
    show(&mut ctx, two_handles());
    assert_eq!(*closed.borrow(), vec![true]);
}

#[test]
fn repeated_mouse_request_reuses_overlay() {
    let mut ctx = pipeline();
    let mut info = two_handles();
    info.is_using_mouse = true;
    info.right_click_offset = Point2::new(200., 400.);

    let first = show(&mut ctx, info.clone());
    let second = show(&mut ctx, info);
    assert_eq!(first.get_select_overlay_id(), second.get_select_overlay_id());
    let root = ctx.root();
    assert_eq!(overlays_under(&ctx, root).len(), 1);
}

#[test]
fn destroyed_overlay_is_gone() {
    let mut ctx = pipeline();
    let proxy = show(&mut ctx, two_handles());
    let id = proxy.get_select_overlay_id();
    assert!(ctx.select_overlay_manager().has_select_overlay(id));

    proxy.close(&mut ctx);
    ctx.flush_frame();
    assert!(!ctx.select_overlay_manager().has_select_overlay(id));
    assert!(proxy.is_closed(&ctx));
    let root = ctx.root();
    assert!(overlays_under(&ctx, root).is_empty());
    assert!(!proxy.is_menu_show(&mut ctx));
}

#[test]
fn destroy_with_wrong_id_keeps_overlay() {
    let mut ctx = pipeline();
    let mut info = two_handles();
    info.single_line_height = 143.;
    let proxy = show(&mut ctx, info);
    let stale = proxy.get_select_overlay_id() + 1000;

    SelectOverlayManager::destroy_select_overlay_by_id(&mut ctx, stale, false);
    ctx.flush_frame();
    assert!(!proxy.is_closed(&ctx));
    assert_eq!(ctx.select_overlay_manager().select_overlay_info().single_line_height, 143.);

    let mut info = two_handles();
    info.single_line_height = 601.;
    let replacement = show(&mut ctx, info);
    assert_eq!(ctx.select_overlay_manager().select_overlay_info().single_line_height, 601.);
    assert!(proxy.is_closed(&ctx));
    assert!(!replacement.is_closed(&ctx));
}

#[test]
fn overlay_replaced_before_mounting_never_mounts() {
    let mut ctx = pipeline();
    let first =
        SelectOverlayManager::create_and_show_select_overlay(&mut ctx, two_handles(), None, false);
    let second =
        SelectOverlayManager::create_and_show_select_overlay(&mut ctx, two_handles(), None, false);
    ctx.flush_frame();

    let root = ctx.root();
    assert_eq!(overlays_under(&ctx, root), vec![NodeId(second.get_select_overlay_id())]);
    assert!(!ctx.tree().contains(NodeId(first.get_select_overlay_id())));
}

#[test]
fn overlay_mounts_below_the_keyboard() {
    let mut ctx = pipeline();
    let root = ctx.root();
    let page = ctx.create_frame_node(tags::PAGE, None);
    let keyboard = ctx.create_frame_node(tags::KEYBOARD, None);
    ctx.tree_mut().add_child(root, page);
    ctx.tree_mut().add_child(root, keyboard);

    let proxy = show(&mut ctx, two_handles());
    let overlay = NodeId(proxy.get_select_overlay_id());
    assert_eq!(ctx.tree().children(root), &[page, overlay, keyboard][..]);
}

#[test]
fn overlay_mounts_into_the_callers_window_scene() {
    init_tracing();
    let mut config = PipelineConfig::default();
    config.scene_board_window = true;
    let mut ctx = PipelineContext::new(config, Theme::default());
    let root = ctx.root();
    let scene = ctx.create_frame_node(tags::WINDOW_SCENE, None);
    ctx.tree_mut().add_child(root, scene);
    let text = text_node(&mut ctx, scene, Rect::from_xywh(0., 250., 720., 100.));

    let host: Rc<dyn SelectionHost> = Rc::new(TextHost {
        node: text,
        selected: Rect::zero(),
    });
    let proxy = SelectOverlayManager::create_and_show_select_overlay(
        &mut ctx,
        two_handles(),
        Some(Rc::downgrade(&host)),
        false,
    );
    ctx.flush_frame();

    let overlay = NodeId(proxy.get_select_overlay_id());
    assert_eq!(ctx.tree().parent(overlay), Some(scene));
    assert_eq!(pattern(&ctx, overlay.0, |p| p.info().caller_frame_node), Some(text));
}

#[test]
fn tap_outside_closes_overlay() {
    let mut ctx = pipeline();
    let closed = Rc::new(RefCell::new(Vec::new()));
    let mut info = two_handles();
    let log = closed.clone();
    info.on_close = Some(Rc::new(move |global| log.borrow_mut().push(global)));
    let proxy = show(&mut ctx, info);

    tap(&mut ctx, 600., 1000.);
    assert!(proxy.is_closed(&ctx));
    assert_eq!(*closed.borrow(), vec![true]);
}

#[test]
fn drag_outside_keeps_overlay() {
    let mut ctx = pipeline();
    let proxy = show(&mut ctx, two_handles());

    ctx.dispatch_touch(TouchEvent::touch(0, 600., 1000., TouchType::Down));
    ctx.dispatch_touch(TouchEvent::touch(0, 600., 1100., TouchType::Move));
    ctx.dispatch_touch(TouchEvent::touch(0, 600., 1100., TouchType::Up));
    ctx.flush_frame();
    assert!(!proxy.is_closed(&ctx));

    // a small wobble still counts as a tap
    ctx.dispatch_touch(TouchEvent::touch(1, 600., 1000., TouchType::Down));
    ctx.dispatch_touch(TouchEvent::touch(1, 602., 1001., TouchType::Move));
    ctx.dispatch_touch(TouchEvent::touch(1, 602., 1001., TouchType::Up));
    ctx.flush_frame();
    assert!(proxy.is_closed(&ctx));
}

#[test]
fn taps_on_the_selection_or_caller_keep_overlay() {
    let mut ctx = pipeline();
    let root = ctx.root();
    let text = text_node(&mut ctx, root, Rect::from_xywh(0., 250., 720., 100.));
    let host: Rc<dyn SelectionHost> = Rc::new(TextHost {
        node: text,
        selected: Rect::from_xywh(100., 300., 202., 20.),
    });
    let proxy = SelectOverlayManager::create_and_show_select_overlay(
        &mut ctx,
        two_handles(),
        Some(Rc::downgrade(&host)),
        false,
    );
    ctx.flush_frame();

    assert!(SelectOverlayManager::is_in_selected_or_select_overlay_area(
        &ctx,
        Point2::new(200., 310.)
    ));
    assert!(SelectOverlayManager::is_touch_in_caller_area(&ctx, Point2::new(600., 260.)));
    tap(&mut ctx, 600., 260.);
    assert!(!proxy.is_closed(&ctx));

    tap(&mut ctx, 600., 1000.);
    assert!(proxy.is_closed(&ctx));
}

#[test]
fn handle_drag_reverses_once() {
    let mut ctx = pipeline();
    let flips = Rc::new(RefCell::new(Vec::new()));
    let mut info = two_handles();
    let log = flips.clone();
    info.on_handle_reverse = Some(Rc::new(move |reverse| log.borrow_mut().push(reverse)));
    let proxy = show(&mut ctx, info);
    let id = proxy.get_select_overlay_id();

    // the first handle's hot zone sits above it
    ctx.dispatch_touch(TouchEvent::touch(0, 101., 290., TouchType::Down));
    ctx.dispatch_touch(TouchEvent::touch(0, 121., 290., TouchType::Move));
    ctx.dispatch_touch(TouchEvent::touch(0, 341., 290., TouchType::Move));
    ctx.dispatch_touch(TouchEvent::touch(0, 361., 290., TouchType::Move));
    ctx.dispatch_touch(TouchEvent::touch(0, 361., 290., TouchType::Up));
    ctx.flush_frame();

    assert_eq!(*flips.borrow(), vec![true]);
    assert!(!proxy.is_closed(&ctx));
    let (reverse, first) =
        pattern(&ctx, id, |p| (p.info().handle_reverse, p.info().first_handle.paint_rect));
    assert!(reverse);
    assert_eq!(first, Rect::from_xywh(360., 300., 2., 20.));
}

#[test]
fn handle_update_reverses_once() {
    let mut ctx = pipeline();
    let flips = Rc::new(RefCell::new(Vec::new()));
    let mut info = two_handles();
    let log = flips.clone();
    info.on_handle_reverse = Some(Rc::new(move |reverse| log.borrow_mut().push(reverse)));
    let proxy = show(&mut ctx, info);

    let moved = SelectHandleInfo::new(Rect::from_xywh(400., 300., 2., 20.));
    proxy.update_first_select_handle_info(&mut ctx, moved);
    proxy.update_first_select_handle_info(&mut ctx, moved);
    let further = SelectHandleInfo::new(Rect::from_xywh(420., 300., 2., 20.));
    proxy.update_first_select_handle_info(&mut ctx, further);
    ctx.flush_frame();
    assert_eq!(*flips.borrow(), vec![true]);

    let id = proxy.get_select_overlay_id();
    let regions = pattern(&ctx, id, |p| (p.handle_region(true), p.handle_region(false)));
    assert_eq!(
        regions,
        (Some(Rect::from_xywh(401., 320., 40., 40.)), Some(Rect::from_xywh(281., 260., 40., 40.)))
    );
}

#[test]
fn clicking_the_handle_restarts_the_hide_timer() {
    let mut ctx = pipeline();
    let mut info = SelectOverlayInfo::default();
    info.is_single_handle = true;
    info.is_handle_line_show = false;
    info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 300., 2., 20.));
    let proxy = show(&mut ctx, info);
    let id = proxy.get_select_overlay_id();
    assert!(proxy.is_menu_show(&mut ctx));

    ctx.advance_time(2000);
    // the single handle's hot zone sits below it
    tap(&mut ctx, 101., 340.);
    assert!(!proxy.is_menu_show(&mut ctx));
    assert!(!proxy.is_closed(&ctx));

    ctx.advance_time(3999);
    assert!(!pattern(&ctx, id, |p| p.is_hidden_handle()));
    ctx.advance_time(1);
    assert!(pattern(&ctx, id, |p| p.is_hidden_handle()));
}

#[test]
fn animated_destroy_waits_for_the_fade() {
    let mut ctx = pipeline();
    let proxy = show(&mut ctx, two_handles());
    let overlay = NodeId(proxy.get_select_overlay_id());

    SelectOverlayManager::destroy_select_overlay(&mut ctx, true);
    assert!(proxy.is_closed(&ctx));
    ctx.advance_time(149);
    assert!(ctx.tree().contains(overlay));
    ctx.advance_time(1);
    assert!(!ctx.tree().contains(overlay));
}

#[test]
fn mount_and_unmount_announce_page_changes() {
    let mut ctx = pipeline();
    let notifier = RecordingNotifier::new();
    ctx.set_accessibility_notifier(notifier.clone());
    let root = ctx.root();

    show(&mut ctx, two_handles());
    assert_eq!(notifier.events(), vec![(root, AccessibilityEventType::PageChange)]);

    SelectOverlayManager::destroy_select_overlay(&mut ctx, false);
    ctx.flush_frame();
    assert_eq!(notifier.events().len(), 2);
}

#[test]
fn hidden_menu_can_be_shown_again() {
    let mut ctx = pipeline();
    let proxy = show(&mut ctx, two_handles());
    let id = proxy.get_select_overlay_id();
    let menu = ctx.tree().children(NodeId(id))[0];

    proxy.show_or_hidden_menu(&mut ctx, true);
    ctx.flush_frame();
    assert!(!proxy.is_menu_show(&mut ctx));
    assert!(!ctx.tree().get(menu).map_or(true, |node| node.is_active()));

    proxy.show_or_hidden_menu(&mut ctx, false);
    ctx.flush_frame();
    assert!(proxy.is_menu_show(&mut ctx));
    assert!(ctx.tree().get(menu).map_or(false, |node| node.is_active()));
}

#[test]
fn leaving_the_show_area_hides_the_menu() {
    let mut ctx = pipeline();
    let mut info = two_handles();
    info.use_full_screen = false;
    info.show_area = Rect::from_xywh(0., 200., 720., 400.);
    let proxy = show(&mut ctx, info);
    let menu = ctx.tree().children(NodeId(proxy.get_select_overlay_id()))[0];
    assert!(ctx.tree().get(menu).map_or(false, |node| node.is_active()));

    proxy.update_show_area(&mut ctx, Rect::from_xywh(0., 400., 720., 400.));
    ctx.flush_frame();
    assert!(!ctx.tree().get(menu).map_or(true, |node| node.is_active()));
}

fn menu_rect(ctx: &PipelineContext, proxy: &SelectOverlayProxy) -> Rect {
    let menu = ctx.tree().children(NodeId(proxy.get_select_overlay_id()))[0];
    ctx.tree().global_frame_rect(menu).expect("menu node")
}

#[test]
fn menu_offset_overrides_the_computed_position() {
    let mut ctx = pipeline();
    let mut info = two_handles();
    info.menu_info.menu_offset = Some(Point2::new(50., 600.));
    let proxy = show(&mut ctx, info);

    assert_eq!(menu_rect(&ctx, &proxy).origin, Point2::new(50., 600.));
}

#[test]
fn mouse_menu_opens_at_the_click_and_stays_inside() {
    let mut ctx = pipeline();
    let mut info = two_handles();
    info.is_using_mouse = true;
    info.right_click_offset = Point2::new(200., 400.);
    let proxy = show(&mut ctx, info);
    assert_eq!(menu_rect(&ctx, &proxy).origin, Point2::new(200., 400.));

    let mut ctx = pipeline();
    let mut info = two_handles();
    info.is_using_mouse = true;
    info.right_click_offset = Point2::new(700., 1270.);
    let proxy = show(&mut ctx, info);
    let rect = menu_rect(&ctx, &proxy);
    assert_eq!(rect.origin, Point2::new(720. - rect.width(), 1280. - rect.height()));
}

#[test]
fn mouse_press_outside_closes_overlay() {
    let mut ctx = pipeline();
    let proxy = show(&mut ctx, two_handles());

    ctx.dispatch_touch(TouchEvent::mouse(600., 1000., TouchType::Down));
    ctx.flush_frame();
    assert!(proxy.is_closed(&ctx));
}

#[test]
fn mouse_press_waits_for_a_pending_tap() {
    let mut ctx = pipeline();
    let proxy = show(&mut ctx, two_handles());

    ctx.dispatch_touch(TouchEvent::touch(0, 600., 1000., TouchType::Down));
    ctx.dispatch_touch(TouchEvent::mouse(600., 1000., TouchType::Down));
    ctx.flush_frame();
    assert!(!proxy.is_closed(&ctx));

    ctx.dispatch_touch(TouchEvent::touch(0, 600., 1000., TouchType::Up));
    ctx.flush_frame();
    assert!(proxy.is_closed(&ctx));
}

#[test]
fn press_outside_custom_menu_hides_it() {
    let mut ctx = pipeline();
    let mut info = two_handles();
    info.menu_info.menu_builder = Some(Rc::new(|ctx: &mut PipelineContext| {
        let menu = ctx.create_frame_node(tags::CUSTOM_MENU, None);
        if let Some(node) = ctx.tree_mut().get_mut(menu) {
            node.layout_property_mut().ideal_size = Some(cgmath::Vector2::new(200., 60.));
            node.geometry_node_mut().set_frame_offset(Point2::new(100., 200.));
        }
        menu
    }));
    let proxy = show(&mut ctx, info);
    assert!(proxy.is_menu_show(&mut ctx));
    let rect = menu_rect(&ctx, &proxy);
    assert_eq!(rect, Rect::from_xywh(100., 200., 200., 60.));

    let inside = rect.center();
    tap(&mut ctx, inside.x, inside.y);
    assert!(proxy.is_menu_show(&mut ctx));

    ctx.dispatch_touch(TouchEvent::touch(0, 600., 1000., TouchType::Down));
    ctx.flush_frame();
    assert!(!proxy.is_menu_show(&mut ctx));
    assert!(!proxy.is_closed(&ctx));
}
