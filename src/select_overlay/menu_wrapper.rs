//! Touch-outside handling for custom selection menus.

use crate::events::{TouchEvent, TouchType};
use crate::frame_node::NodeId;
use crate::pipeline::PipelineContext;
use tracing::trace;

/// Wraps a custom menu built by the caller.
///
/// A press anywhere outside the menu closes it. The overlay itself stays; only the menu goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuWrapper {
    menu: NodeId,
}

impl MenuWrapper {
    pub fn new(menu: NodeId) -> MenuWrapper {
        MenuWrapper { menu }
    }

    pub fn menu(&self) -> NodeId {
        self.menu
    }

    /// True if the event is a press that landed outside the visible menu.
    pub fn is_outside_menu(&self, ctx: &PipelineContext, event: &TouchEvent) -> bool {
        if event.kind != TouchType::Down {
            return false;
        }
        let tree = ctx.tree();
        let visible = tree.get(self.menu).map_or(false, |menu| menu.is_active());
        if !visible {
            return false;
        }
        match tree.global_frame_rect(self.menu) {
            Some(rect) => {
                let outside = !rect.contains(event.location);
                trace!("press at {:?} outside custom menu: {}", event.location, outside);
                outside
            }
            None => false,
        }
    }
}
