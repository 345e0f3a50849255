//! Text selection handles and the selection menu.
//!
//! A text widget describes its selection with a [`SelectOverlayInfo`] and asks the window’s
//! [`SelectOverlayManager`] to show it. It gets back a [`SelectOverlayProxy`] to update the
//! handles and menu while the selection changes.

pub mod content_modifier;
pub mod info;
pub mod layout_algorithm;
pub mod manager;
pub mod menu_wrapper;
pub mod node;
pub mod overlay_modifier;
pub mod paint_method;
pub mod pattern;
pub mod proxy;

pub use self::info::{
    FlagCallback, HandleMoveCallback, MenuActionCallback, MenuBuilder, MenuOptionItem,
    SelectHandleInfo, SelectMenuCallback, SelectMenuInfo, SelectOverlayInfo, SelectionHost,
};
pub use self::layout_algorithm::SelectOverlayLayoutAlgorithm;
pub use self::manager::{ScrollCallback, SelectOverlayManager};
pub use self::pattern::{HandleDragState, HandleVisibility, MenuState, SelectOverlayPattern};
pub use self::proxy::SelectOverlayProxy;
