//! The drawing capability handed to modifiers.
//!
//! Actual rasterization belongs to a graphics backend; this crate only issues commands.

use crate::color::Color;
use crate::rect::{Offset, Rect};

/// Line end caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
}

/// An abstract 2D canvas.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    /// Rotates by `degrees` around the current origin.
    fn rotate(&mut self, degrees: f64);
    fn clip_rect(&mut self, rect: Rect);
    /// Multiplies the alpha of everything drawn until the matching `restore`.
    fn save_layer_alpha(&mut self, alpha: f64);
    fn draw_rect(&mut self, rect: Rect, corner_radius: f64, color: Color);
    fn draw_circle(&mut self, center: Offset, radius: f64, color: Color);
    fn draw_line(&mut self, from: Offset, to: Offset, width: f64, cap: LineCap, color: Color);
}

/// A recorded canvas command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    ClipRect(Rect),
    SaveLayerAlpha(f64),
    Rect(Rect, f64, Color),
    Circle(Offset, f64, Color),
    Line(Offset, Offset, f64, LineCap, Color),
}

/// A canvas that records commands instead of drawing them.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new() -> RecordingCanvas {
        RecordingCanvas::default()
    }

    pub fn circles(&self) -> impl Iterator<Item = (Offset, f64, Color)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Circle(center, radius, color) => Some((*center, *radius, *color)),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Offset, Offset)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line(from, to, ..) => Some((*from, *to)),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }
    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }
    fn translate(&mut self, dx: f64, dy: f64) {
        self.commands.push(DrawCommand::Translate(dx, dy));
    }
    fn rotate(&mut self, degrees: f64) {
        self.commands.push(DrawCommand::Rotate(degrees));
    }
    fn clip_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClipRect(rect));
    }
    fn save_layer_alpha(&mut self, alpha: f64) {
        self.commands.push(DrawCommand::SaveLayerAlpha(alpha));
    }
    fn draw_rect(&mut self, rect: Rect, corner_radius: f64, color: Color) {
        self.commands.push(DrawCommand::Rect(rect, corner_radius, color));
    }
    fn draw_circle(&mut self, center: Offset, radius: f64, color: Color) {
        self.commands.push(DrawCommand::Circle(center, radius, color));
    }
    fn draw_line(&mut self, from: Offset, to: Offset, width: f64, cap: LineCap, color: Color) {
        self.commands
            .push(DrawCommand::Line(from, to, width, cap, color));
    }
}
