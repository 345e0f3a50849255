//! Draws the selection handles.

use crate::canvas::{Canvas, LineCap};
use crate::color::Color;
use crate::rect::Rect;
use crate::render_context::Modifier;
use cgmath::{Point2, Vector2};

/// Paint properties of the handles. All rects are relative to the overlay.
#[derive(Debug, Clone)]
pub struct SelectOverlayContentModifier {
    in_show_area: bool,
    handle_reverse: bool,
    is_single_handle: bool,
    first_handle_is_show: bool,
    second_handle_is_show: bool,
    is_handle_line_show: bool,
    is_hidden_handle: bool,
    is_using_mouse: bool,
    first_handle: Rect,
    second_handle: Rect,
    view_port: Rect,
    handle_color: Color,
    inner_handle_color: Color,
    handle_radius: f64,
    inner_handle_radius: f64,
    handle_line_width: f64,
}

impl SelectOverlayContentModifier {
    pub fn new() -> SelectOverlayContentModifier {
        SelectOverlayContentModifier {
            in_show_area: false,
            handle_reverse: false,
            is_single_handle: false,
            first_handle_is_show: false,
            second_handle_is_show: false,
            is_handle_line_show: false,
            is_hidden_handle: false,
            is_using_mouse: false,
            first_handle: Rect::zero(),
            second_handle: Rect::zero(),
            view_port: Rect::zero(),
            handle_color: Color::BLACK,
            inner_handle_color: Color::WHITE,
            handle_radius: 0.,
            inner_handle_radius: 0.,
            handle_line_width: 0.,
        }
    }

    pub fn set_in_show_area(&mut self, value: bool) {
        self.in_show_area = value;
    }

    pub fn set_handle_reverse(&mut self, value: bool) {
        self.handle_reverse = value;
    }

    pub fn set_is_single_handle(&mut self, value: bool) {
        self.is_single_handle = value;
    }

    pub fn set_first_handle_is_show(&mut self, value: bool) {
        self.first_handle_is_show = value;
    }

    pub fn set_second_handle_is_show(&mut self, value: bool) {
        self.second_handle_is_show = value;
    }

    pub fn set_is_handle_line_show(&mut self, value: bool) {
        self.is_handle_line_show = value;
    }

    pub fn set_is_hidden_handle(&mut self, value: bool) {
        self.is_hidden_handle = value;
    }

    pub fn set_is_using_mouse(&mut self, value: bool) {
        self.is_using_mouse = value;
    }

    pub fn set_first_handle(&mut self, rect: Rect) {
        self.first_handle = rect;
    }

    pub fn set_second_handle(&mut self, rect: Rect) {
        self.second_handle = rect;
    }

    pub fn set_view_port(&mut self, rect: Rect) {
        self.view_port = rect;
    }

    pub fn set_handle_color(&mut self, color: Color) {
        self.handle_color = color;
    }

    pub fn set_inner_handle_color(&mut self, color: Color) {
        self.inner_handle_color = color;
    }

    pub fn set_handle_radius(&mut self, radius: f64) {
        self.handle_radius = radius;
    }

    pub fn set_inner_handle_radius(&mut self, radius: f64) {
        self.inner_handle_radius = radius;
    }

    pub fn set_handle_line_width(&mut self, width: f64) {
        self.handle_line_width = width;
    }

    /// Draws one handle: a ring of two concentric circles above or below `rect`, and optionally
    /// a line from the circle along the rect.
    fn paint_handle(
        &self,
        canvas: &mut dyn Canvas,
        rect: Rect,
        handle_on_top: bool,
        line_show: bool,
    ) {
        let radius = self.handle_radius;
        let center_x = (rect.left() + rect.right()) / 2.;
        let (center, start, end) = if handle_on_top {
            (
                Point2::new(center_x, rect.top() - radius),
                Point2::new(0., radius - 1.),
                Point2::new(0., radius + rect.height()),
            )
        } else {
            (
                Point2::new(center_x, rect.bottom() + radius),
                Point2::new(0., -radius + 1.),
                Point2::new(0., -radius - rect.height()),
            )
        };

        canvas.save();
        canvas.translate(center.x, center.y);
        canvas.draw_circle(Point2::new(0., 0.), radius, self.handle_color);
        canvas.draw_circle(Point2::new(0., 0.), self.inner_handle_radius, self.inner_handle_color);
        if line_show {
            canvas.draw_line(start, end, self.handle_line_width, LineCap::Round, self.handle_color);
        }
        canvas.restore();
    }

    fn clip_rect(&self) -> Rect {
        let diameter = self.handle_radius * 2.;
        Rect::new(
            self.view_port.origin - Vector2::new(self.handle_radius, diameter),
            self.view_port.size + Vector2::new(diameter, diameter * 2.),
        )
    }
}

impl Default for SelectOverlayContentModifier {
    fn default() -> SelectOverlayContentModifier {
        SelectOverlayContentModifier::new()
    }
}

impl Modifier for SelectOverlayContentModifier {
    fn on_draw(&self, canvas: &mut dyn Canvas, _: u64) {
        if self.is_using_mouse || !self.in_show_area || self.is_hidden_handle {
            return;
        }

        canvas.save();
        canvas.clip_rect(self.clip_rect());
        if self.is_single_handle {
            if self.first_handle_is_show {
                self.paint_handle(canvas, self.first_handle, false, self.is_handle_line_show);
            } else if self.second_handle_is_show {
                self.paint_handle(canvas, self.second_handle, false, self.is_handle_line_show);
            }
        } else {
            if self.first_handle_is_show {
                self.paint_handle(canvas, self.first_handle, !self.handle_reverse, true);
            }
            if self.second_handle_is_show {
                self.paint_handle(canvas, self.second_handle, self.handle_reverse, true);
            }
        }
        canvas.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};

    fn modifier() -> SelectOverlayContentModifier {
        let mut modifier = SelectOverlayContentModifier::new();
        modifier.set_in_show_area(true);
        modifier.set_first_handle_is_show(true);
        modifier.set_second_handle_is_show(true);
        modifier.set_first_handle(Rect::from_xywh(100., 100., 2., 20.));
        modifier.set_second_handle(Rect::from_xywh(200., 100., 2., 20.));
        modifier.set_view_port(Rect::from_xywh(0., 0., 720., 1280.));
        modifier.set_handle_radius(7.);
        modifier.set_inner_handle_radius(5.5);
        modifier.set_handle_line_width(2.);
        modifier
    }

    #[test]
    fn first_handle_is_on_top_unless_reversed() {
        let mut canvas = RecordingCanvas::new();
        modifier().on_draw(&mut canvas, 0);
        let translations: Vec<_> = canvas
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Translate(x, y) => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(translations, vec![(101., 93.), (201., 127.)]);
        assert_eq!(canvas.circles().count(), 4);
        assert_eq!(canvas.lines().count(), 2);
        assert_eq!(
            canvas.commands[1],
            DrawCommand::ClipRect(Rect::from_xywh(-7., -14., 734., 1308.))
        );

        let mut reversed = modifier();
        reversed.set_handle_reverse(true);
        let mut canvas = RecordingCanvas::new();
        reversed.on_draw(&mut canvas, 0);
        assert!(canvas.commands.contains(&DrawCommand::Translate(101., 127.)));
    }

    #[test]
    fn hidden_or_mouse_draws_nothing() {
        let mut hidden = modifier();
        hidden.set_is_hidden_handle(true);
        let mut canvas = RecordingCanvas::new();
        hidden.on_draw(&mut canvas, 0);
        assert!(canvas.commands.is_empty());

        let mut mouse = modifier();
        mouse.set_is_using_mouse(true);
        mouse.on_draw(&mut canvas, 0);
        assert!(canvas.commands.is_empty());
    }

    #[test]
    fn single_handle_line_is_optional() {
        let mut single = modifier();
        single.set_is_single_handle(true);
        let mut canvas = RecordingCanvas::new();
        single.on_draw(&mut canvas, 0);
        assert_eq!(canvas.circles().count(), 2);
        assert_eq!(canvas.lines().count(), 0);

        single.set_is_handle_line_show(true);
        let mut canvas = RecordingCanvas::new();
        single.on_draw(&mut canvas, 0);
        assert_eq!(canvas.lines().count(), 1);
    }
}
