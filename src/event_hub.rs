//! Per-node gesture listeners.
//!
//! Listeners do not capture the node or its pattern; they receive the pipeline and resolve
//! whatever they need by id, so a listener that outlives its target degrades to a no-op.

use crate::events::{GestureEvent, TouchEventInfo};
use crate::pipeline::PipelineContext;
use crate::rect::Rect;
use core::fmt;
use std::rc::Rc;

pub type GestureCallback = Rc<dyn Fn(&mut PipelineContext, &GestureEvent)>;
pub type TouchCallback = Rc<dyn Fn(&mut PipelineContext, &TouchEventInfo)>;

/// The four phases of a pan gesture.
#[derive(Clone)]
pub struct PanEvent {
    pub on_start: GestureCallback,
    pub on_update: GestureCallback,
    pub on_end: GestureCallback,
    pub on_cancel: GestureCallback,
}

/// Gesture listeners of one frame node.
#[derive(Default)]
pub struct GestureEventHub {
    click: Option<GestureCallback>,
    pan: Option<PanEvent>,
    touch: Option<TouchCallback>,
    /// Hit-test regions relative to the node’s frame. If empty, the whole frame is used.
    response_regions: Vec<Rect>,
}

impl GestureEventHub {
    pub fn set_click_event(&mut self, callback: GestureCallback) {
        self.click = Some(callback);
    }

    pub fn remove_click_event(&mut self) {
        self.click = None;
    }

    pub fn set_pan_event(&mut self, pan: PanEvent) {
        self.pan = Some(pan);
    }

    pub fn remove_pan_event(&mut self) {
        self.pan = None;
    }

    pub fn set_touch_event(&mut self, callback: TouchCallback) {
        self.touch = Some(callback);
    }

    pub fn remove_touch_event(&mut self) {
        self.touch = None;
    }

    pub fn click_event(&self) -> Option<GestureCallback> {
        self.click.clone()
    }

    pub fn pan_event(&self) -> Option<PanEvent> {
        self.pan.clone()
    }

    pub fn touch_event(&self) -> Option<TouchCallback> {
        self.touch.clone()
    }

    pub fn has_click_event(&self) -> bool {
        self.click.is_some()
    }

    pub fn has_pan_event(&self) -> bool {
        self.pan.is_some()
    }

    /// True if the node takes part in hit testing at all.
    pub fn is_interactive(&self) -> bool {
        self.click.is_some() || self.pan.is_some() || self.touch.is_some()
    }

    pub fn set_response_regions(&mut self, regions: Vec<Rect>) {
        self.response_regions = regions;
    }

    pub fn response_regions(&self) -> &[Rect] {
        &self.response_regions
    }
}

impl fmt::Debug for GestureEventHub {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("GestureEventHub")
            .field("click", &self.click.is_some())
            .field("pan", &self.pan.is_some())
            .field("touch", &self.touch.is_some())
            .field("response_regions", &self.response_regions)
            .finish()
    }
}
