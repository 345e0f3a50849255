//! Handles to select overlays held by callers.

use super::info::{SelectHandleInfo, SelectMenuInfo};
use super::manager::SelectOverlayManager;
use super::pattern::SelectOverlayPattern;
use crate::frame_node::NodeId;
use crate::pipeline::PipelineContext;
use crate::rect::Rect;
use tracing::trace;

/// A caller’s handle to the overlay it created.
///
/// The proxy only knows the overlay’s id. Every operation resolves it through the manager, and
/// does nothing once the overlay has been replaced or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOverlayProxy {
    select_overlay_id: i32,
}

impl SelectOverlayProxy {
    pub fn new(select_overlay_id: i32) -> SelectOverlayProxy {
        SelectOverlayProxy { select_overlay_id }
    }

    pub fn get_select_overlay_id(&self) -> i32 {
        self.select_overlay_id
    }

    fn with_pattern<R, F>(&self, ctx: &mut PipelineContext, f: F) -> Option<R>
    where
        F: FnOnce(&mut SelectOverlayPattern, NodeId, &mut PipelineContext) -> R,
    {
        if self.is_closed(ctx) {
            trace!("select overlay {} is closed", self.select_overlay_id);
            return None;
        }
        let id = NodeId(self.select_overlay_id);
        ctx.with_pattern::<SelectOverlayPattern, _, _>(id, |pattern, ctx| f(pattern, id, ctx))
    }

    pub fn update_first_select_handle_info(
        &self,
        ctx: &mut PipelineContext,
        info: SelectHandleInfo,
    ) {
        self.with_pattern(ctx, |pattern, id, ctx| {
            pattern.update_first_select_handle_info(id, ctx, info)
        });
    }

    pub fn update_second_select_handle_info(
        &self,
        ctx: &mut PipelineContext,
        info: SelectHandleInfo,
    ) {
        self.with_pattern(ctx, |pattern, id, ctx| {
            pattern.update_second_select_handle_info(id, ctx, info)
        });
    }

    pub fn update_select_menu_info(&self, ctx: &mut PipelineContext, info: SelectMenuInfo) {
        self.with_pattern(ctx, |pattern, id, ctx| pattern.update_select_menu_info(id, ctx, info));
    }

    pub fn update_show_area(&self, ctx: &mut PipelineContext, area: Rect) {
        self.with_pattern(ctx, |pattern, id, ctx| pattern.update_show_area(id, ctx, area));
    }

    pub fn show_or_hidden_menu(&self, ctx: &mut PipelineContext, is_hidden: bool) {
        self.with_pattern(ctx, |pattern, id, ctx| {
            pattern.show_or_hidden_menu(id, ctx, is_hidden)
        });
    }

    pub fn is_menu_show(&self, ctx: &mut PipelineContext) -> bool {
        self.with_pattern(ctx, |pattern, _, _| pattern.is_menu_show())
            .unwrap_or(false)
    }

    pub fn is_handle_show(&self, ctx: &mut PipelineContext) -> bool {
        self.with_pattern(ctx, |pattern, _, _| pattern.is_handle_show())
            .unwrap_or(false)
    }

    /// Closes the overlay if it is still the active one.
    pub fn close(&self, ctx: &mut PipelineContext) {
        SelectOverlayManager::destroy_select_overlay_by_id(ctx, self.select_overlay_id, false);
    }

    pub fn is_closed(&self, ctx: &PipelineContext) -> bool {
        !ctx.select_overlay_manager().has_select_overlay(self.select_overlay_id)
            || !ctx.tree().contains(NodeId(self.select_overlay_id))
    }
}
