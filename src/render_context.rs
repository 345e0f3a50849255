//! Render contexts: the paint-side peer of a frame node.

use crate::animation::{AnimatableProperty, AnimationOption};
use crate::canvas::Canvas;
use crate::color::Color;
use crate::rect::Rect;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// A paint-property holder drawn once per frame by the render backend.
pub trait Modifier: Send {
    fn on_draw(&self, canvas: &mut dyn Canvas, now_ms: u64);
}

/// A shared handle to a modifier.
pub type ModifierRef = Arc<Mutex<dyn Modifier>>;

/// Paint properties of one node.
pub struct RenderProperties {
    /// Frame relative to the parent.
    pub frame: Rect,
    pub background: Color,
    pub corner_radius: f64,
    pub clip_contents: bool,
    pub opacity: AnimatableProperty<f64>,
    pub content_modifier: Option<ModifierRef>,
    pub overlay_modifier: Option<ModifierRef>,
}

/// A render context, shared between a frame node and its render-tree peer.
#[derive(Clone)]
pub struct RenderContext(Arc<Mutex<RenderProperties>>);

impl RenderContext {
    pub fn new() -> RenderContext {
        RenderContext(Arc::new(Mutex::new(RenderProperties {
            frame: Rect::zero(),
            background: Color::TRANSPARENT,
            corner_radius: 0.,
            clip_contents: false,
            opacity: AnimatableProperty::new(1.),
            content_modifier: None,
            overlay_modifier: None,
        })))
    }

    /// Returns true if both handles refer to the same peer.
    pub fn ptr_eq(&self, other: &RenderContext) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn frame(&self) -> Rect {
        self.0.lock().frame
    }

    pub fn set_frame(&self, frame: Rect) {
        self.0.lock().frame = frame;
    }

    pub fn set_background(&self, color: Color, corner_radius: f64) {
        let mut props = self.0.lock();
        props.background = color;
        props.corner_radius = corner_radius;
    }

    pub fn set_clip_contents(&self, clip: bool) {
        self.0.lock().clip_contents = clip;
    }

    pub fn set_opacity(&self, opacity: f64) {
        self.0.lock().opacity.set(opacity);
    }

    pub fn animate_opacity(&self, opacity: f64, now_ms: u64, option: AnimationOption) {
        self.0.lock().opacity.animate_to(opacity, now_ms, option);
    }

    pub fn opacity(&self, now_ms: u64) -> f64 {
        self.0.lock().opacity.get(now_ms)
    }

    pub fn set_content_modifier(&self, modifier: ModifierRef) {
        self.0.lock().content_modifier = Some(modifier);
    }

    pub fn set_overlay_modifier(&self, modifier: ModifierRef) {
        self.0.lock().overlay_modifier = Some(modifier);
    }

    /// Paints background and content. The canvas origin must be at the frame’s origin.
    pub fn paint_content(&self, canvas: &mut dyn Canvas, now_ms: u64) {
        let (background, corner_radius, size, clip, content) = {
            let props = self.0.lock();
            (
                props.background,
                props.corner_radius,
                props.frame.size,
                props.clip_contents,
                props.content_modifier.clone(),
            )
        };
        let local = Rect::new((0., 0.).into(), size);
        if clip {
            canvas.clip_rect(local);
        }
        if background.a > 0. {
            canvas.draw_rect(local, corner_radius, background);
        }
        if let Some(content) = content {
            content.lock().on_draw(canvas, now_ms);
        }
    }

    /// Paints the overlay layer, above all children.
    pub fn paint_overlay(&self, canvas: &mut dyn Canvas, now_ms: u64) {
        let overlay = self.0.lock().overlay_modifier.clone();
        if let Some(overlay) = overlay {
            overlay.lock().on_draw(canvas, now_ms);
        }
    }
}

impl Default for RenderContext {
    fn default() -> RenderContext {
        RenderContext::new()
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let props = self.0.lock();
        f.debug_struct("RenderContext")
            .field("frame", &props.frame)
            .field("background", &props.background)
            .field("opacity", &props.opacity.target())
            .field("content_modifier", &props.content_modifier.is_some())
            .field("overlay_modifier", &props.overlay_modifier.is_some())
            .finish()
    }
}
