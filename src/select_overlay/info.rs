//! Value types describing one selection overlay.

use crate::frame_node::NodeId;
use crate::pipeline::PipelineContext;
use crate::rect::{Offset, Rect};
use cgmath::{EuclideanSpace, Point2};
use core::fmt;
use std::rc::Rc;

/// Called with a handle’s paint rect and whether it is the first handle.
pub type HandleMoveCallback = Rc<dyn Fn(Rect, bool)>;
/// Called with a single flag; see the field it is stored in.
pub type FlagCallback = Rc<dyn Fn(bool)>;
pub type MenuActionCallback = Rc<dyn Fn()>;
/// Builds a custom menu and returns its (detached) root node.
pub type MenuBuilder = Rc<dyn Fn(&mut PipelineContext) -> NodeId>;

/// One selection handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectHandleInfo {
    pub is_show: bool,
    pub need_layout: bool,
    /// In window coordinates.
    pub paint_rect: Rect,
}

impl SelectHandleInfo {
    pub fn new(paint_rect: Rect) -> SelectHandleInfo {
        SelectHandleInfo {
            is_show: true,
            need_layout: false,
            paint_rect,
        }
    }
}

impl Default for SelectHandleInfo {
    fn default() -> SelectHandleInfo {
        SelectHandleInfo::new(Rect::zero())
    }
}

/// What the selection menu shows.
#[derive(Clone)]
pub struct SelectMenuInfo {
    pub menu_disable: bool,
    pub menu_is_show: bool,
    pub show_copy: bool,
    pub show_paste: bool,
    pub show_copy_all: bool,
    pub show_cut: bool,
    /// Hide the menu after any option is clicked.
    pub hide_menu_on_click: bool,
    pub menu_offset: Option<Offset>,
    pub menu_builder: Option<MenuBuilder>,
}

impl SelectMenuInfo {
    /// True if the set of menu items differs. A custom builder always counts as a change.
    pub fn is_icon_changed(&self, other: &SelectMenuInfo) -> bool {
        if self.menu_builder.is_some() || other.menu_builder.is_some() {
            return true;
        }
        self.show_copy != other.show_copy
            || self.show_paste != other.show_paste
            || self.show_copy_all != other.show_copy_all
            || self.show_cut != other.show_cut
    }
}

impl Default for SelectMenuInfo {
    fn default() -> SelectMenuInfo {
        SelectMenuInfo {
            menu_disable: false,
            menu_is_show: true,
            show_copy: true,
            show_paste: true,
            show_copy_all: true,
            show_cut: true,
            hide_menu_on_click: false,
            menu_offset: None,
            menu_builder: None,
        }
    }
}

struct DebugifyOption<'a, T>(&'a Option<T>);
impl<'a, T> fmt::Debug for DebugifyOption<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_some() {
            write!(f, "Some(..)")
        } else {
            write!(f, "None")
        }
    }
}

impl fmt::Debug for SelectMenuInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SelectMenuInfo")
            .field("menu_disable", &self.menu_disable)
            .field("menu_is_show", &self.menu_is_show)
            .field("show_copy", &self.show_copy)
            .field("show_paste", &self.show_paste)
            .field("show_copy_all", &self.show_copy_all)
            .field("show_cut", &self.show_cut)
            .field("menu_offset", &self.menu_offset)
            .field("menu_builder", &DebugifyOption(&self.menu_builder))
            .finish()
    }
}

/// Callbacks of the built-in menu options.
#[derive(Clone, Default)]
pub struct SelectMenuCallback {
    pub on_copy: Option<MenuActionCallback>,
    pub on_paste: Option<MenuActionCallback>,
    pub on_select_all: Option<MenuActionCallback>,
    pub on_cut: Option<MenuActionCallback>,
}

/// An extra option appended after the built-in ones.
#[derive(Clone)]
pub struct MenuOptionItem {
    pub content: String,
    pub action: Option<Rc<dyn Fn(&str)>>,
}

impl fmt::Debug for MenuOptionItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MenuOptionItem")
            .field("content", &self.content)
            .field("action", &DebugifyOption(&self.action))
            .finish()
    }
}

/// Everything the overlay needs to know about a selection.
#[derive(Clone)]
pub struct SelectOverlayInfo {
    pub first_handle: SelectHandleInfo,
    pub second_handle: SelectHandleInfo,
    pub is_single_handle: bool,
    pub handle_reverse: bool,
    pub is_handle_line_show: bool,
    /// Selected content is visible even if neither handle is.
    pub is_selection_visible: bool,
    pub is_using_mouse: bool,
    /// Where the menu goes in mouse mode, in window coordinates.
    pub right_click_offset: Offset,
    pub single_line_height: f64,
    /// Handles outside this region hide the menu, unless `use_full_screen` is set.
    pub show_area: Rect,
    pub use_full_screen: bool,
    pub menu_info: SelectMenuInfo,
    pub menu_callback: SelectMenuCallback,
    pub menu_option_items: Vec<MenuOptionItem>,
    /// The node that owns the selection.
    pub caller_frame_node: Option<NodeId>,
    pub on_handle_move_start: Option<FlagCallback>,
    pub on_handle_move: Option<HandleMoveCallback>,
    pub on_handle_move_done: Option<HandleMoveCallback>,
    /// Called with the new value whenever the handles swap order.
    pub on_handle_reverse: Option<FlagCallback>,
    /// Called once when the overlay goes away, with true if a global event closed it.
    pub on_close: Option<FlagCallback>,
}

impl Default for SelectOverlayInfo {
    fn default() -> SelectOverlayInfo {
        SelectOverlayInfo {
            first_handle: SelectHandleInfo::default(),
            second_handle: SelectHandleInfo::default(),
            is_single_handle: false,
            handle_reverse: false,
            is_handle_line_show: true,
            is_selection_visible: false,
            is_using_mouse: false,
            right_click_offset: Point2::origin(),
            single_line_height: 0.,
            show_area: Rect::zero(),
            use_full_screen: true,
            menu_info: SelectMenuInfo::default(),
            menu_callback: SelectMenuCallback::default(),
            menu_option_items: Vec::new(),
            caller_frame_node: None,
            on_handle_move_start: None,
            on_handle_move: None,
            on_handle_move_done: None,
            on_handle_reverse: None,
            on_close: None,
        }
    }
}

impl SelectOverlayInfo {
    /// How far apart the tops of two handles may be while still counting as one line.
    pub fn line_tolerance(&self) -> f64 {
        let height = self
            .first_handle
            .paint_rect
            .height()
            .max(self.second_handle.paint_rect.height())
            .max(self.single_line_height);
        (height - 0.5).max(0.)
    }

    /// True if the menu may show: the handles are inside the show area, or the overlay ignores it.
    pub fn check_in_show_area(&self) -> bool {
        if self.use_full_screen {
            return true;
        }
        if self.is_single_handle {
            return self.first_handle.paint_rect.is_wrapped_by(self.show_area);
        }
        self.first_handle.paint_rect.is_wrapped_by(self.show_area)
            && self.second_handle.paint_rect.is_wrapped_by(self.show_area)
    }
}

impl fmt::Debug for SelectOverlayInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SelectOverlayInfo")
            .field("first_handle", &self.first_handle)
            .field("second_handle", &self.second_handle)
            .field("is_single_handle", &self.is_single_handle)
            .field("handle_reverse", &self.handle_reverse)
            .field("is_handle_line_show", &self.is_handle_line_show)
            .field("is_using_mouse", &self.is_using_mouse)
            .field("right_click_offset", &self.right_click_offset)
            .field("single_line_height", &self.single_line_height)
            .field("show_area", &self.show_area)
            .field("menu_info", &self.menu_info)
            .field("menu_option_items", &self.menu_option_items)
            .field("caller_frame_node", &self.caller_frame_node)
            .field("on_handle_move", &DebugifyOption(&self.on_handle_move))
            .field("on_handle_move_done", &DebugifyOption(&self.on_handle_move_done))
            .field("on_handle_reverse", &DebugifyOption(&self.on_handle_reverse))
            .field("on_close", &DebugifyOption(&self.on_close))
            .finish()
    }
}

/// The widget that owns a selection, as seen by the overlay manager.
pub trait SelectionHost {
    /// The host’s frame node.
    fn frame_node(&self) -> Option<NodeId>;

    /// True if a point in window coordinates lies on selected content.
    fn between_selected_position(&self, global: Offset) -> bool;
}
