//! Placement of the selection menu relative to the handles.

use super::info::SelectOverlayInfo;
use super::pattern::MenuState;
use crate::layout::{layout_box, measure_box, LayoutAlgorithm, LayoutEnv, LayoutWrapper};
use crate::rect::{near_equal, Offset, Rect, Size};
use cgmath::{EuclideanSpace, Point2, Vector2};
use core::any::Any;
use tracing::trace;

const MENU_INDEX: usize = 0;
const MORE_BUTTON_INDEX: usize = 1;
const EXTENSION_MENU_INDEX: usize = 2;

/// Lays out the children of a select overlay node.
///
/// The menu width, height, and end offset survive across passes through the pattern: when the
/// extension menu is open the default menu collapses to a circle, and the circle stays anchored
/// to where the full menu ended.
#[derive(Debug)]
pub struct SelectOverlayLayoutAlgorithm {
    info: SelectOverlayInfo,
    menu_state: MenuState,
    default_menu_end_offset: Offset,
    menu_width: Option<f64>,
    menu_height: Option<f64>,
    overlay_offset: Offset,
    view_port: Rect,
    more_button_rect: Option<Rect>,
}

impl SelectOverlayLayoutAlgorithm {
    pub fn new(
        info: SelectOverlayInfo,
        menu_state: MenuState,
        default_menu_end_offset: Offset,
        menu_width: Option<f64>,
        menu_height: Option<f64>,
    ) -> SelectOverlayLayoutAlgorithm {
        SelectOverlayLayoutAlgorithm {
            info,
            menu_state,
            default_menu_end_offset,
            menu_width,
            menu_height,
            overlay_offset: Point2::origin(),
            view_port: Rect::zero(),
            more_button_rect: None,
        }
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

    /// Window offset of the overlay in the last pass.
    pub fn overlay_offset(&self) -> Offset {
        self.overlay_offset
    }

    /// The view port the menu was clamped to, relative to the overlay.
    pub fn view_port(&self) -> Rect {
        self.view_port
    }

    /// Frame of the more/back button relative to the overlay, if it is shown.
    pub fn more_button_rect(&self) -> Option<Rect> {
        self.more_button_rect
    }

    fn is_extension_shown(&self) -> bool {
        self.menu_state == MenuState::ExtensionShown && self.info.menu_info.menu_builder.is_none()
    }

    /// Computes where the default menu goes, relative to the overlay.
    ///
    /// `menu_size` is the size of the menu as it is right now: a pill normally, a circle while the
    /// extension menu is shown.
    pub fn compute_select_menu_position(
        &mut self,
        overlay_size: Size,
        view_port: Rect,
        menu_size: Size,
        env: &LayoutEnv,
    ) -> Offset {
        let theme = &env.theme.text_overlay;
        let spacing_text = theme.menu_spacing_with_text.to_px(env.density);
        let spacing_handle = theme.handle_diameter.to_px(env.density);
        let default_position_x = theme.default_menu_position_x.to_px(env.density);

        let mut is_extension = false;
        if menu_size.x > menu_size.y {
            self.menu_width = Some(menu_size.x);
            self.menu_height = Some(menu_size.y);
        } else {
            is_extension = true;
        }
        let menu_width = self.menu_width.unwrap_or(menu_size.x);
        let menu_height = self.menu_height.unwrap_or(menu_size.y);

        let info = &self.info;
        let local = self.overlay_offset.to_vec();
        let first = info.first_handle.paint_rect - local;
        let second = info.second_handle.paint_rect - local;
        let single = if info.first_handle.is_show || !info.second_handle.is_show {
            first
        } else {
            second
        };
        let both_shown = info.first_handle.is_show && info.second_handle.is_show;
        let different_lines =
            both_shown && !near_equal(first.top(), second.top(), info.line_tolerance());

        let mut position;
        if info.is_single_handle {
            position = Point2::new(
                (single.left() + single.right() - menu_width) / 2.,
                single.top() - spacing_text - menu_height,
            );
        } else {
            let spacing = spacing_text + spacing_handle;
            position = Point2::new(
                (first.left() + second.left() - menu_width) / 2.,
                first.top() - spacing - menu_height,
            );
            if !info.first_handle.is_show && info.second_handle.is_show && !info.handle_reverse {
                position.y = second.bottom() + spacing;
            }
            if info.first_handle.is_show && !info.second_handle.is_show && info.handle_reverse {
                position.y = first.bottom() + spacing;
            }
            if different_lines {
                position.y = first.top().min(second.top()) - spacing - menu_height;
            }
            if !info.first_handle.is_show && info.second_handle.is_show {
                position.x = second.left() - menu_width / 2.;
            }
            if info.first_handle.is_show && !info.second_handle.is_show {
                position.x = first.left() - menu_width / 2.;
            }
        }

        if position.x <= view_port.left() {
            position.x = default_position_x;
        } else if position.x + menu_width >= view_port.right() {
            position.x = overlay_size.x - menu_width - default_position_x;
        }

        if position.y < menu_height {
            position.y = single.bottom() + spacing_text + spacing_handle;
        }
        if position.y < view_port.top() - spacing_text - menu_height || position.y < spacing_text {
            let menu_offset_y = view_port.top() - spacing_text - menu_height;
            position.y = if menu_offset_y > spacing_text {
                menu_offset_y
            } else {
                spacing_text
            };
        } else if position.y >= view_port.bottom() + spacing_text {
            position.y = view_port.bottom() + spacing_text;
        }

        if position.y < env.safe_area_top {
            position.y = env.safe_area_top;
        }

        if !info.is_single_handle && different_lines {
            let menu_rect = Rect::new(position, Vector2::new(menu_width, menu_height));
            let down_handle = if first.top() > second.top() { first } else { second };
            let diameter = spacing_handle;
            let circle = Rect::from_xywh(
                down_handle.left() - (diameter - down_handle.width()) / 2.,
                down_handle.bottom(),
                diameter,
                diameter,
            );
            if menu_rect.intersects(down_handle) || menu_rect.inner_intersects(circle) {
                position.y = down_handle.bottom() + spacing_text + diameter;
            }
        }

        if let Some(menu_offset) = info.menu_info.menu_offset {
            position = menu_offset - local;
        }

        self.default_menu_end_offset = position + Vector2::new(menu_width, 0.);
        trace!("menu at {:?}, ends at {:?}", position, self.default_menu_end_offset);
        if is_extension {
            return self.default_menu_end_offset - Vector2::new(menu_size.x, 0.);
        }
        position
    }

    /// Places the extension menu below the end of the default menu, or above it if it would not
    /// fit below.
    pub fn compute_extension_menu_position(
        &self,
        extension_size: Size,
        menu_height: f64,
        max_height: f64,
        env: &LayoutEnv,
    ) -> Offset {
        let interval = env.theme.text_overlay.more_menu_interval.to_px(env.density);
        let end = self.default_menu_end_offset;
        let mut offset = Point2::new(end.x - extension_size.x, end.y + menu_height + interval);
        if offset.y + extension_size.y > max_height {
            offset.y = end.y - extension_size.y - interval;
        }
        offset
    }

    /// Mouse menus go to the right-click position, kept inside the overlay.
    fn compute_mouse_menu_position(&mut self, overlay_size: Size, menu_size: Size) -> Offset {
        let mut position = self.info.right_click_offset - self.overlay_offset.to_vec();
        if position.x + menu_size.x > overlay_size.x {
            position.x = overlay_size.x - menu_size.x;
        }
        if position.y + menu_size.y > overlay_size.y {
            position.y = overlay_size.y - menu_size.y;
        }
        position.x = position.x.max(0.);
        position.y = position.y.max(0.);
        self.default_menu_end_offset = position + Vector2::new(menu_size.x, 0.);
        position
    }

    fn deactivate_menu(wrapper: &mut LayoutWrapper) {
        for child in wrapper.children_mut() {
            child.set_active(false);
        }
    }
}

impl LayoutAlgorithm for SelectOverlayLayoutAlgorithm {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn measure(&mut self, wrapper: &mut LayoutWrapper, env: &LayoutEnv) {
        let menu_info = &self.info.menu_info;
        let menu_visible = self.menu_state != MenuState::Hidden && !menu_info.menu_disable;
        let extension_shown = self.is_extension_shown();
        let has_overflow = wrapper
            .child(EXTENSION_MENU_INDEX)
            .map_or(false, |extension| !extension.children().is_empty());

        if let Some(menu) = wrapper.child_mut(MENU_INDEX) {
            menu.set_active(menu_visible && !extension_shown);
        }
        if let Some(more) = wrapper.child_mut(MORE_BUTTON_INDEX) {
            more.set_active(menu_visible && has_overflow);
        }
        if let Some(extension) = wrapper.child_mut(EXTENSION_MENU_INDEX) {
            extension.set_active(menu_visible && extension_shown);
        }
        measure_box(wrapper, env);

        // the more button sits inside the right end of the menu
        let padding = env.theme.text_overlay.menu_padding.to_px(env.density);
        let more_width = wrapper
            .child(MORE_BUTTON_INDEX)
            .filter(|more| more.is_active())
            .map(|more| more.geometry.frame_size().x);
        if let (Some(more_width), Some(menu)) = (more_width, wrapper.child_mut(MENU_INDEX)) {
            if menu.is_active() {
                let size = menu.geometry.frame_size();
                menu.geometry
                    .set_frame_size(Vector2::new(size.x + more_width - padding, size.y));
            }
        }
    }

    fn layout(&mut self, wrapper: &mut LayoutWrapper, env: &LayoutEnv) {
        let parent_offset = env
            .tree
            .parent(wrapper.node())
            .map_or(Point2::origin(), |parent| env.tree.global_offset(parent));
        self.overlay_offset = parent_offset + wrapper.geometry.frame_offset().to_vec();
        let overlay_size = wrapper.geometry.frame_size();
        self.view_port = self
            .info
            .caller_frame_node
            .and_then(|caller| env.tree.view_port(caller))
            .map(|view_port| view_port - self.overlay_offset.to_vec())
            .unwrap_or_else(|| Rect::new(Point2::origin(), overlay_size));
        self.more_button_rect = None;

        let info = &self.info;
        let nothing_shown =
            !info.first_handle.is_show && !info.second_handle.is_show && !info.is_selection_visible;
        if (!info.check_in_show_area() || nothing_shown) && !info.is_using_mouse {
            trace!("select overlay out of show area, hiding menu");
            SelectOverlayLayoutAlgorithm::deactivate_menu(wrapper);
            return;
        }

        if info.menu_info.menu_builder.is_some() {
            if info.is_using_mouse {
                let menu_size = wrapper
                    .child(MENU_INDEX)
                    .map_or(Vector2::new(0., 0.), |menu| menu.geometry.margin_frame_size());
                let position = self.compute_mouse_menu_position(overlay_size, menu_size);
                if let Some(menu) = wrapper.child_mut(MENU_INDEX) {
                    menu.geometry.set_margin_frame_offset(position);
                }
            }
            layout_box(wrapper, env);
            return;
        }

        let extension_shown = self.is_extension_shown();
        let menu_size = if extension_shown {
            wrapper
                .child(MORE_BUTTON_INDEX)
                .filter(|more| more.is_active())
                .map(|more| more.geometry.margin_frame_size())
        } else {
            wrapper
                .child(MENU_INDEX)
                .filter(|menu| menu.is_active())
                .map(|menu| menu.geometry.margin_frame_size())
        };
        let menu_size = match menu_size {
            Some(size) => size,
            None => {
                layout_box(wrapper, env);
                return;
            }
        };

        let position = if info.is_using_mouse {
            self.compute_mouse_menu_position(overlay_size, menu_size)
        } else {
            let view_port = self.view_port;
            self.compute_select_menu_position(overlay_size, view_port, menu_size, env)
        };

        if extension_shown {
            if let Some(more) = wrapper.child_mut(MORE_BUTTON_INDEX) {
                more.geometry.set_margin_frame_offset(position);
                self.more_button_rect = Some(more.geometry.frame_rect());
            }
            let extension_offset = wrapper.child(EXTENSION_MENU_INDEX).map(|extension| {
                self.compute_extension_menu_position(
                    extension.geometry.margin_frame_size(),
                    menu_size.y,
                    extension.constraint().max_size.y,
                    env,
                )
            });
            if let (Some(offset), Some(extension)) =
                (extension_offset, wrapper.child_mut(EXTENSION_MENU_INDEX))
            {
                extension.geometry.set_margin_frame_offset(offset);
            }
        } else {
            if let Some(menu) = wrapper.child_mut(MENU_INDEX) {
                menu.geometry.set_margin_frame_offset(position);
            }
            if let Some(more) = wrapper.child_mut(MORE_BUTTON_INDEX) {
                if more.is_active() {
                    let width = more.geometry.margin_frame_size().x;
                    more.geometry.set_margin_frame_offset(Point2::new(
                        position.x + menu_size.x - width,
                        position.y,
                    ));
                    self.more_button_rect = Some(more.geometry.frame_rect());
                }
            }
        }
        layout_box(wrapper, env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_tree::FrameTree;
    use crate::select_overlay::info::SelectHandleInfo;
    use crate::theme::Theme;

    fn env<'a>(tree: &'a FrameTree, theme: &'a Theme) -> LayoutEnv<'a> {
        LayoutEnv {
            tree,
            theme,
            density: 1.,
            safe_area_top: 0.,
        }
    }

    fn algorithm(info: SelectOverlayInfo) -> SelectOverlayLayoutAlgorithm {
        SelectOverlayLayoutAlgorithm::new(info, MenuState::Shown, Point2::origin(), None, None)
    }

    fn window() -> Rect {
        Rect::from_xywh(0., 0., 720., 1280.)
    }

    #[test]
    fn menu_left_of_view_port_is_clamped_to_default_x() {
        let mut info = SelectOverlayInfo::default();
        info.is_single_handle = true;
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(48., 300., 4., 20.));
        let (tree, theme) = (FrameTree::new(), Theme::default());

        let mut algorithm = algorithm(info);
        let position = algorithm.compute_select_menu_position(
            window().size,
            window(),
            Vector2::new(200., 48.),
            &env(&tree, &theme),
        );
        assert_eq!(position.x, 10.);
        assert_eq!(position.y, 300. - 8. - 48.);
    }

    #[test]
    fn menu_past_right_edge_is_right_aligned() {
        let mut info = SelectOverlayInfo::default();
        info.is_single_handle = true;
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(700., 300., 4., 20.));
        let (tree, theme) = (FrameTree::new(), Theme::default());

        let mut algorithm = algorithm(info);
        let position = algorithm.compute_select_menu_position(
            window().size,
            window(),
            Vector2::new(200., 48.),
            &env(&tree, &theme),
        );
        assert_eq!(position.x, 720. - 200. - 10.);
    }

    #[test]
    fn menu_is_centered_above_handles_on_one_line() {
        let mut info = SelectOverlayInfo::default();
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 300., 2., 20.));
        info.second_handle = SelectHandleInfo::new(Rect::from_xywh(300., 300., 2., 20.));
        let (tree, theme) = (FrameTree::new(), Theme::default());

        let mut algorithm = algorithm(info);
        let position = algorithm.compute_select_menu_position(
            window().size,
            window(),
            Vector2::new(200., 48.),
            &env(&tree, &theme),
        );
        assert_eq!(position, Point2::new(100., 300. - 22. - 48.));
        assert_eq!(algorithm.default_menu_end_offset(), Point2::new(300., 230.));
        assert_eq!(algorithm.menu_width(), Some(200.));
    }

    #[test]
    fn menu_moves_below_lower_handle_on_collision() {
        let mut info = SelectOverlayInfo::default();
        info.single_line_height = 20.;
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 30., 2., 20.));
        info.second_handle = SelectHandleInfo::new(Rect::from_xywh(250., 60., 2., 20.));
        let (tree, theme) = (FrameTree::new(), Theme::default());

        let mut algorithm = algorithm(info);
        let position = algorithm.compute_select_menu_position(
            window().size,
            window(),
            Vector2::new(200., 48.),
            &env(&tree, &theme),
        );
        assert_eq!(position, Point2::new(75., 80. + 8. + 14.));
    }

    #[test]
    fn menu_offset_is_taken_as_given() {
        let mut info = SelectOverlayInfo::default();
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 300., 2., 20.));
        info.second_handle = SelectHandleInfo::new(Rect::from_xywh(300., 300., 2., 20.));
        info.menu_info.menu_offset = Some(Point2::new(50., 600.));
        let (tree, theme) = (FrameTree::new(), Theme::default());

        let mut algorithm = algorithm(info);
        algorithm.overlay_offset = Point2::new(0., 100.);
        let position = algorithm.compute_select_menu_position(
            window().size,
            window(),
            Vector2::new(200., 48.),
            &env(&tree, &theme),
        );
        assert_eq!(position, Point2::new(50., 500.));
        assert_eq!(algorithm.default_menu_end_offset(), Point2::new(250., 500.));
    }

    #[test]
    fn safe_area_wins() {
        let mut info = SelectOverlayInfo::default();
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 300., 2., 20.));
        info.second_handle = SelectHandleInfo::new(Rect::from_xywh(300., 300., 2., 20.));
        let (tree, theme) = (FrameTree::new(), Theme::default());
        let mut env = env(&tree, &theme);
        env.safe_area_top = 250.;

        let mut algorithm = algorithm(info);
        let position = algorithm.compute_select_menu_position(
            window().size,
            window(),
            Vector2::new(200., 48.),
            &env,
        );
        assert_eq!(position.y, 250.);
    }

    #[test]
    fn collapsed_menu_keeps_its_end_anchor() {
        let mut info = SelectOverlayInfo::default();
        info.first_handle = SelectHandleInfo::new(Rect::from_xywh(100., 300., 2., 20.));
        info.second_handle = SelectHandleInfo::new(Rect::from_xywh(300., 300., 2., 20.));
        let (tree, theme) = (FrameTree::new(), Theme::default());
        let env = env(&tree, &theme);

        let mut algorithm = algorithm(info);
        algorithm.compute_select_menu_position(
            window().size,
            window(),
            Vector2::new(200., 48.),
            &env,
        );
        let circle = algorithm.compute_select_menu_position(
            window().size,
            window(),
            Vector2::new(48., 48.),
            &env,
        );
        assert_eq!(circle, Point2::new(300. - 48., 230.));
        assert_eq!(algorithm.menu_width(), Some(200.));

        let extension = Vector2::new(160., 96.);
        let below = algorithm.compute_extension_menu_position(extension, 48., 1280., &env);
        assert_eq!(below, Point2::new(140., 230. + 48. + 8.));
        let above = algorithm.compute_extension_menu_position(extension, 48., 300., &env);
        assert_eq!(above, Point2::new(140., 230. - 96. - 8.));
    }
}
