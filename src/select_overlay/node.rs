//! Builds the node subtree of a select overlay.
//!
//! Children of the overlay node, in order:
//!
//! 0. the default menu, a row of option buttons (or the caller’s custom menu),
//! 1. the more/back button,
//! 2. the extension menu with every option that did not fit into the default menu.

use super::info::SelectOverlayInfo;
use super::menu_wrapper::MenuWrapper;
use super::pattern::SelectOverlayPattern;
use crate::animation::{AnimationOption, Curve};
use crate::event_hub::GestureCallback;
use crate::events::GestureEvent;
use crate::frame_node::{tags, NodeId, PropertyChangeFlag};
use crate::layout::MeasureType;
use crate::pattern::{LinearLayoutPattern, Pattern};
use crate::pipeline::PipelineContext;
use crate::rect::Offset;
use cgmath::Vector2;
use std::rc::Rc;
use tracing::{debug, trace};

/// Duration of the fade when the overlay appears or goes away.
pub const OVERLAY_FADE_DURATION_MS: u64 = 150;

/// Pattern of one menu option button.
#[derive(Debug)]
pub struct MenuOptionPattern {
    label: String,
}

impl MenuOptionPattern {
    pub fn new(label: impl Into<String>) -> MenuOptionPattern {
        MenuOptionPattern { label: label.into() }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Pattern for MenuOptionPattern {
    impl_pattern_any!();
}

/// Creates a detached select overlay node with its menu children.
pub fn create_select_overlay_node(ctx: &mut PipelineContext, info: SelectOverlayInfo) -> NodeId {
    let builder = info.menu_info.menu_builder.clone();
    let overlay = ctx.create_frame_node(
        tags::SELECT_OVERLAY,
        Some(Box::new(SelectOverlayPattern::new(info.clone()))),
    );
    if let Some(node) = ctx.tree_mut().get_mut(overlay) {
        node.layout_property_mut().measure_type = MeasureType::MatchParent;
    }

    if let Some(builder) = builder {
        let menu = builder(ctx);
        ctx.tree_mut().add_child(overlay, menu);
        ctx.with_pattern::<SelectOverlayPattern, _, _>(overlay, |pattern, _| {
            pattern.set_menu_wrapper(MenuWrapper::new(menu))
        });
        debug!("created select overlay {} with custom menu {}", overlay, menu);
        return overlay;
    }

    let theme = ctx.theme().text_overlay.clone();
    let padding = ctx.to_px(theme.menu_padding);
    let button_height = ctx.to_px(theme.menu_button_height);

    let menu = ctx.create_frame_node(
        tags::SELECT_MENU,
        Some(Box::new(LinearLayoutPattern::row(padding))),
    );
    let more_size = button_height + padding * 2.;
    let more = ctx.create_frame_node(tags::SELECT_MENU_BUTTON, None);
    let extension = ctx.create_frame_node(
        tags::SELECT_EXTENSION_MENU,
        Some(Box::new(LinearLayoutPattern::column(padding))),
    );

    let tree = ctx.tree_mut();
    if let Some(node) = tree.get_mut(menu) {
        node.render_context()
            .set_background(theme.menu_background_color, more_size / 2.);
    }
    if let Some(node) = tree.get_mut(more) {
        node.layout_property_mut().ideal_size = Some(Vector2::new(more_size, more_size));
        node.render_context()
            .set_background(theme.menu_background_color, more_size / 2.);
        let toggle: GestureCallback = Rc::new(move |ctx: &mut PipelineContext, _: &GestureEvent| {
            ctx.with_pattern::<SelectOverlayPattern, _, _>(overlay, |pattern, ctx| {
                pattern.toggle_extension_menu(overlay, ctx)
            });
        });
        node.event_hub_mut().set_click_event(toggle);
    }
    if let Some(node) = tree.get_mut(extension) {
        node.render_context().set_background(theme.menu_background_color, padding * 2.);
    }
    for child in &[menu, more, extension] {
        tree.add_child(overlay, *child);
    }

    update_tool_bar(ctx, overlay, &info, true);
    debug!("created select overlay {}", overlay);
    overlay
}

type OptionAction = Option<Rc<dyn Fn()>>;

fn menu_options(info: &SelectOverlayInfo) -> Vec<(String, OptionAction)> {
    let menu = &info.menu_info;
    let callbacks = &info.menu_callback;
    let mut options: Vec<(String, OptionAction)> = Vec::new();
    if menu.show_cut {
        options.push(("Cut".into(), callbacks.on_cut.clone()));
    }
    if menu.show_copy {
        options.push(("Copy".into(), callbacks.on_copy.clone()));
    }
    if menu.show_paste {
        options.push(("Paste".into(), callbacks.on_paste.clone()));
    }
    if menu.show_copy_all {
        options.push(("Select all".into(), callbacks.on_select_all.clone()));
    }
    for item in &info.menu_option_items {
        let action = item.action.clone().map(|action| {
            let content = item.content.clone();
            Rc::new(move || action(&content)) as Rc<dyn Fn()>
        });
        options.push((item.content.clone(), action));
    }
    options
}

fn create_option_button(
    ctx: &mut PipelineContext,
    overlay: NodeId,
    label: String,
    action: OptionAction,
    size: Vector2<f64>,
) -> NodeId {
    let button = ctx.create_frame_node(
        tags::MENU_OPTION,
        Some(Box::new(MenuOptionPattern::new(label))),
    );
    if let Some(node) = ctx.tree_mut().get_mut(button) {
        node.layout_property_mut().ideal_size = Some(size);
        let on_click: GestureCallback = Rc::new(move |ctx: &mut PipelineContext, _: &GestureEvent| {
            if let Some(action) = &action {
                action();
            }
            ctx.with_pattern::<SelectOverlayPattern, _, _>(overlay, |pattern, ctx| {
                if pattern.info().menu_info.hide_menu_on_click {
                    pattern.show_or_hidden_menu(overlay, ctx, true);
                }
            });
        });
        node.event_hub_mut().set_click_event(on_click);
    }
    button
}

/// Refreshes the menu of an overlay. If the set of options changed, the buttons are rebuilt and
/// split between the default menu and the extension menu by the available width.
pub fn update_tool_bar(
    ctx: &mut PipelineContext,
    overlay: NodeId,
    info: &SelectOverlayInfo,
    menu_item_changed: bool,
) {
    ctx.mark_dirty_node(overlay, PropertyChangeFlag::MEASURE_SELF);
    if !menu_item_changed || info.menu_info.menu_builder.is_some() {
        return;
    }
    let (menu, extension) = match ctx.tree().children(overlay) {
        [menu, _, extension, ..] => (*menu, *extension),
        _ => {
            trace!("select overlay {} has no tool bar", overlay);
            return;
        }
    };
    for parent in &[menu, extension] {
        for child in ctx.tree().children(*parent).to_vec() {
            ctx.tree_mut().remove_node(child);
        }
    }

    let theme = ctx.theme().text_overlay.clone();
    let padding = ctx.to_px(theme.menu_padding);
    let button_width = ctx.to_px(theme.menu_button_width);
    let button_height = ctx.to_px(theme.menu_button_height);
    let more_width = button_height + padding * 2.;
    let available = ctx.config().window_size.x
        - 2. * ctx.to_px(theme.default_menu_position_x)
        - 2. * padding;

    let options = menu_options(info);
    let fitting = if options.len() as f64 * button_width <= available {
        options.len()
    } else {
        ((available - more_width) / button_width).floor().max(0.) as usize
    };
    trace!("{} of {} menu options fit", fitting, options.len());

    let button_size = Vector2::new(button_width, button_height);
    let item_size = Vector2::new(
        ctx.to_px(theme.extension_menu_width),
        ctx.to_px(theme.extension_menu_item_height),
    );
    for (index, (label, action)) in options.into_iter().enumerate() {
        let (parent, size) = if index < fitting {
            (menu, button_size)
        } else {
            (extension, item_size)
        };
        let button = create_option_button(ctx, overlay, label, action, size);
        ctx.tree_mut().add_child(parent, button);
    }
}

/// Fades the overlay in, or shows it right away.
pub fn show_select_overlay(ctx: &mut PipelineContext, overlay: NodeId, animate: bool) {
    let now = ctx.now();
    if let Some(node) = ctx.tree().get(overlay) {
        let render_context = node.render_context();
        if animate {
            render_context.set_opacity(0.);
            render_context.animate_opacity(
                1.,
                now,
                AnimationOption::new(OVERLAY_FADE_DURATION_MS, Curve::FastOutSlowIn),
            );
        } else {
            render_context.set_opacity(1.);
        }
    }
    ctx.mark_dirty_node(overlay, PropertyChangeFlag::RENDER);
}

/// Fades the overlay out, then runs `on_finish`.
pub fn hide_select_overlay<F>(ctx: &mut PipelineContext, overlay: NodeId, on_finish: F)
where
    F: 'static + FnOnce(&mut PipelineContext),
{
    let now = ctx.now();
    if let Some(node) = ctx.tree().get(overlay) {
        node.render_context().animate_opacity(
            0.,
            now,
            AnimationOption::new(OVERLAY_FADE_DURATION_MS, Curve::FastOutSlowIn),
        );
    }
    ctx.mark_dirty_node(overlay, PropertyChangeFlag::RENDER);
    ctx.post_delayed_task(on_finish, OVERLAY_FADE_DURATION_MS);
}

/// True if a window point hits a handle hot zone or any visible part of the menu.
pub fn is_in_selected_or_select_overlay_area(
    ctx: &PipelineContext,
    overlay: NodeId,
    point: Offset,
) -> bool {
    let tree = ctx.tree();
    let node = match tree.get(overlay) {
        Some(node) => node,
        None => return false,
    };
    if let Some(pattern) = node.pattern::<SelectOverlayPattern>() {
        if !pattern.is_hidden_handle() {
            let in_handle = [true, false]
                .iter()
                .filter_map(|is_first| pattern.handle_region(*is_first))
                .any(|region| region.contains(point));
            if in_handle {
                return true;
            }
        }
    }
    node.children()
        .iter()
        .filter(|child| tree.get(**child).map_or(false, |child| child.is_active()))
        .filter_map(|child| tree.global_frame_rect(*child))
        .any(|rect| rect.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineConfig;
    use crate::select_overlay::info::{MenuOptionItem, SelectHandleInfo};
    use crate::rect::Rect;
    use crate::theme::Theme;

    fn labels(ctx: &PipelineContext, parent: NodeId) -> Vec<String> {
        ctx.tree()
            .children(parent)
            .iter()
            .filter_map(|id| ctx.tree().get(*id)?.pattern::<MenuOptionPattern>())
            .map(|pattern| pattern.label().to_string())
            .collect()
    }

    #[test]
    fn default_options_fit_in_one_row() {
        let mut ctx = PipelineContext::new(PipelineConfig::default(), Theme::default());
        let overlay = create_select_overlay_node(&mut ctx, SelectOverlayInfo::default());
        let children = ctx.tree().children(overlay).to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(labels(&ctx, children[0]), vec!["Cut", "Copy", "Paste", "Select all"]);
        assert!(ctx.tree().children(children[2]).is_empty());
    }

    #[test]
    fn overflowing_options_go_to_extension_menu() {
        let mut config = PipelineConfig::default();
        config.window_size = Vector2::new(360., 640.);
        let mut ctx = PipelineContext::new(config, Theme::default());
        let mut info = SelectOverlayInfo::default();
        for name in &["Translate", "Share", "Search"] {
            info.menu_option_items.push(MenuOptionItem {
                content: name.to_string(),
                action: None,
            });
        }
        let overlay = create_select_overlay_node(&mut ctx, info);
        let children = ctx.tree().children(overlay).to_vec();
        // 360 - 20 - 8 = 332 available; the more button takes 48, leaving room for 5 buttons
        assert_eq!(
            labels(&ctx, children[0]),
            vec!["Cut", "Copy", "Paste", "Select all", "Translate"]
        );
        assert_eq!(labels(&ctx, children[2]), vec!["Share", "Search"]);
    }

    #[test]
    fn option_click_runs_action_and_may_hide_menu() {
        let mut ctx = PipelineContext::new(PipelineConfig::default(), Theme::default());
        let copied = Rc::new(std::cell::Cell::new(0));
        let mut info = SelectOverlayInfo::default();
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 300., 2., 20.));
        info.second_handle = SelectHandleInfo::new(Rect::from_xywh(300., 300., 2., 20.));
        info.menu_info.hide_menu_on_click = true;
        let counter = copied.clone();
        info.menu_callback.on_copy = Some(Rc::new(move || counter.set(counter.get() + 1)));
        let overlay = create_select_overlay_node(&mut ctx, info);
        let root = ctx.root();
        ctx.tree_mut().add_child(root, overlay);
        ctx.mark_dirty_node(root, PropertyChangeFlag::MEASURE_SELF);
        ctx.flush_frame();

        let menu = ctx.tree().children(overlay)[0];
        let copy = ctx.tree().children(menu)[1];
        let center = ctx.tree().global_frame_rect(copy).unwrap().center();
        let touch = |kind| crate::events::TouchEvent::touch(0, center.x, center.y, kind);
        ctx.dispatch_touch(touch(crate::events::TouchType::Down));
        ctx.dispatch_touch(touch(crate::events::TouchType::Up));
        ctx.flush_frame();

        assert_eq!(copied.get(), 1);
        let menu_shown = ctx
            .with_pattern::<SelectOverlayPattern, _, _>(overlay, |pattern, _| {
                pattern.is_menu_show()
            })
            .unwrap();
        assert!(!menu_shown);
        assert!(!ctx.tree().get(menu).unwrap().is_active());
    }
}
