//! Copies select overlay state into its modifiers.

use super::content_modifier::SelectOverlayContentModifier;
use super::info::SelectOverlayInfo;
use super::overlay_modifier::SelectOverlayModifier;
use crate::paint::{NodePaintMethod, PaintWrapper};
use crate::rect::Rect;
use cgmath::EuclideanSpace;
use parking_lot::Mutex;
use std::sync::Arc;

/// Paint method of a select overlay; one per render pass.
pub struct SelectOverlayPaintMethod {
    content_modifier: Arc<Mutex<SelectOverlayContentModifier>>,
    overlay_modifier: Arc<Mutex<SelectOverlayModifier>>,
    info: SelectOverlayInfo,
    is_hidden_handle: bool,
    /// Relative to the overlay.
    view_port: Rect,
    more_button_rect: Option<Rect>,
    extension_shown: bool,
}

impl SelectOverlayPaintMethod {
    pub fn new(
        content_modifier: Arc<Mutex<SelectOverlayContentModifier>>,
        overlay_modifier: Arc<Mutex<SelectOverlayModifier>>,
        info: SelectOverlayInfo,
        is_hidden_handle: bool,
        view_port: Rect,
        more_button_rect: Option<Rect>,
        extension_shown: bool,
    ) -> SelectOverlayPaintMethod {
        SelectOverlayPaintMethod {
            content_modifier,
            overlay_modifier,
            info,
            is_hidden_handle,
            view_port,
            more_button_rect,
            extension_shown,
        }
    }
}

impl NodePaintMethod for SelectOverlayPaintMethod {
    fn update_content_modifier(&mut self, wrapper: &PaintWrapper) {
        let theme = &wrapper.theme.text_overlay;
        let local = wrapper.global_offset.to_vec();
        let info = &self.info;

        let mut modifier = self.content_modifier.lock();
        modifier.set_in_show_area(info.check_in_show_area());
        modifier.set_handle_reverse(info.handle_reverse);
        modifier.set_is_single_handle(info.is_single_handle);
        modifier.set_first_handle_is_show(info.first_handle.is_show);
        modifier.set_second_handle_is_show(info.second_handle.is_show);
        modifier.set_is_handle_line_show(info.is_handle_line_show);
        modifier.set_is_hidden_handle(self.is_hidden_handle);
        modifier.set_is_using_mouse(info.is_using_mouse);
        modifier.set_first_handle(info.first_handle.paint_rect - local);
        modifier.set_second_handle(info.second_handle.paint_rect - local);
        modifier.set_view_port(self.view_port);
        modifier.set_handle_color(theme.handle_color);
        modifier.set_inner_handle_color(theme.handle_color_inner);
        modifier.set_handle_radius(theme.handle_diameter.to_px(wrapper.density) / 2.);
        modifier.set_inner_handle_radius(theme.handle_diameter_inner.to_px(wrapper.density) / 2.);
        modifier.set_handle_line_width(theme.handle_line_width.to_px(wrapper.density));
    }

    fn update_overlay_modifier(&mut self, wrapper: &PaintWrapper) {
        let theme = &wrapper.theme.text_overlay;
        let mut modifier = self.overlay_modifier.lock();
        modifier.set_has_extension_menu(self.more_button_rect.is_some());
        if let Some(rect) = self.more_button_rect {
            modifier.set_menu_option_offset(rect.center());
        }
        modifier.set_point_radius(theme.more_icon_dot_radius.to_px(wrapper.density));
        modifier.set_coordinate(theme.more_icon_coordinate.to_px(wrapper.density));
        modifier.set_icon_color(theme.icon_color);
        modifier.set_line_end_offset(!self.extension_shown, wrapper.now_ms);
    }
}
