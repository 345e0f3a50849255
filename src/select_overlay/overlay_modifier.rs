//! Draws the more/back icon of the selection menu.
//!
//! The icon is four dots and three lines that all start at dot 0. As a back arrow, dot 0 is the
//! tip and the lines reach the other three dots. As a more icon, the dots pull in and the lines
//! collapse onto dot 0, and the whole icon turns by 45°.

use crate::animation::{AnimatableProperty, AnimationOption, Curve};
use crate::canvas::{Canvas, LineCap};
use crate::color::Color;
use crate::rect::Offset;
use crate::render_context::Modifier;
use cgmath::Point2;

/// Length of the more/back morph.
pub const ICON_ANIMATION_DURATION_MS: u64 = 300;

const MORE_ROTATION: f64 = 45.;
const BACK_ROTATION: f64 = 0.;

/// Paint properties of the more/back icon.
#[derive(Debug, Clone)]
pub struct SelectOverlayModifier {
    /// Center of the icon, relative to the overlay.
    menu_option_offset: Offset,
    point_radius: f64,
    coordinate: f64,
    icon_color: Color,
    has_extension_menu: bool,
    is_more: Option<bool>,
    rotation: AnimatableProperty<f64>,
    circle_offsets: Vec<AnimatableProperty<Offset>>,
    line_end_offsets: Vec<AnimatableProperty<Offset>>,
}

impl SelectOverlayModifier {
    pub fn new() -> SelectOverlayModifier {
        SelectOverlayModifier {
            menu_option_offset: Point2::new(0., 0.),
            point_radius: 0.,
            coordinate: 0.,
            icon_color: Color::BLACK,
            has_extension_menu: false,
            is_more: None,
            rotation: AnimatableProperty::new(MORE_ROTATION),
            circle_offsets: (0..4).map(|_| AnimatableProperty::new(Point2::new(0., 0.))).collect(),
            line_end_offsets: (0..3)
                .map(|_| AnimatableProperty::new(Point2::new(0., 0.)))
                .collect(),
        }
    }

    pub fn set_menu_option_offset(&mut self, offset: Offset) {
        self.menu_option_offset = offset;
    }

    pub fn set_point_radius(&mut self, radius: f64) {
        self.point_radius = radius;
    }

    /// Sets the dot spacing. A change snaps the icon to its current shape without animating.
    pub fn set_coordinate(&mut self, coordinate: f64) {
        if self.coordinate == coordinate {
            return;
        }
        self.coordinate = coordinate;
        if let Some(is_more) = self.is_more {
            let (circles, line_ends, rotation) = self.layout(is_more);
            for (property, target) in self.circle_offsets.iter_mut().zip(circles.iter()) {
                property.set(*target);
            }
            for (property, target) in self.line_end_offsets.iter_mut().zip(line_ends.iter()) {
                property.set(*target);
            }
            self.rotation.set(rotation);
        }
    }

    pub fn set_icon_color(&mut self, color: Color) {
        self.icon_color = color;
    }

    pub fn set_has_extension_menu(&mut self, value: bool) {
        self.has_extension_menu = value;
    }

    pub fn is_more(&self) -> Option<bool> {
        self.is_more
    }

    fn layout(&self, is_more: bool) -> ([Offset; 4], [Offset; 3], f64) {
        let d = self.coordinate;
        if is_more {
            let h = d / 2.;
            let circles = [
                Point2::new(-h, 0.),
                Point2::new(0., -h),
                Point2::new(h, 0.),
                Point2::new(0., h),
            ];
            (circles, [circles[0]; 3], MORE_ROTATION)
        } else {
            let circles = [
                Point2::new(-d, 0.),
                Point2::new(0., -d),
                Point2::new(d, 0.),
                Point2::new(0., d),
            ];
            (circles, [circles[1], circles[2], circles[3]], BACK_ROTATION)
        }
    }

    /// Morphs the icon into the more icon or the back arrow.
    ///
    /// The first call snaps; later changes animate with a friction curve. Setting the current
    /// shape again does nothing.
    pub fn set_line_end_offset(&mut self, is_more: bool, now_ms: u64) {
        if self.is_more == Some(is_more) {
            return;
        }
        let (circles, line_ends, rotation) = self.layout(is_more);
        let option = match self.is_more {
            Some(_) => AnimationOption::new(ICON_ANIMATION_DURATION_MS, Curve::Friction),
            None => AnimationOption::new(0, Curve::Linear),
        };
        for (property, target) in self.circle_offsets.iter_mut().zip(circles.iter()) {
            property.animate_to(*target, now_ms, option);
        }
        for (property, target) in self.line_end_offsets.iter_mut().zip(line_ends.iter()) {
            property.animate_to(*target, now_ms, option);
        }
        self.rotation.animate_to(rotation, now_ms, option);
        self.is_more = Some(is_more);
    }

    pub fn rotation(&self, now_ms: u64) -> f64 {
        self.rotation.get(now_ms)
    }
}

impl Default for SelectOverlayModifier {
    fn default() -> SelectOverlayModifier {
        SelectOverlayModifier::new()
    }
}

impl Modifier for SelectOverlayModifier {
    fn on_draw(&self, canvas: &mut dyn Canvas, now_ms: u64) {
        if !self.has_extension_menu {
            return;
        }
        canvas.save();
        canvas.translate(self.menu_option_offset.x, self.menu_option_offset.y);
        canvas.rotate(self.rotation.get(now_ms));
        for circle in &self.circle_offsets {
            canvas.draw_circle(circle.get(now_ms), self.point_radius, self.icon_color);
        }
        let start = self.circle_offsets[0].get(now_ms);
        for end in &self.line_end_offsets {
            canvas.draw_line(
                start,
                end.get(now_ms),
                self.point_radius * 2.,
                LineCap::Round,
                self.icon_color,
            );
        }
        canvas.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;

    fn modifier() -> SelectOverlayModifier {
        let mut modifier = SelectOverlayModifier::new();
        modifier.set_coordinate(8.);
        modifier.set_point_radius(1.75);
        modifier.set_has_extension_menu(true);
        modifier
    }

    #[test]
    fn back_arrow_lines_reach_the_other_dots() {
        let mut modifier = modifier();
        modifier.set_line_end_offset(false, 0);
        let mut canvas = RecordingCanvas::new();
        modifier.on_draw(&mut canvas, 0);

        let circles: Vec<_> = canvas.circles().map(|circle| circle.0).collect();
        assert_eq!(
            circles,
            vec![
                Point2::new(-8., 0.),
                Point2::new(0., -8.),
                Point2::new(8., 0.),
                Point2::new(0., 8.)
            ]
        );
        let ends: Vec<_> = canvas.lines().map(|line| line.1).collect();
        assert_eq!(ends, circles[1..].to_vec());
        assert_eq!(modifier.rotation(0), 0.);
    }

    #[test]
    fn morph_animates_over_300ms() {
        let mut modifier = modifier();
        modifier.set_line_end_offset(true, 0);
        assert_eq!(modifier.rotation(0), 45.);

        modifier.set_line_end_offset(false, 1000);
        let halfway = modifier.rotation(1150);
        assert!(halfway > 0. && halfway < 45.);
        assert_eq!(modifier.rotation(1300), 0.);

        let mut canvas = RecordingCanvas::new();
        modifier.on_draw(&mut canvas, 1300);
        let lines: Vec<_> = canvas.lines().collect();
        assert_eq!(lines[0], (Point2::new(-8., 0.), Point2::new(0., -8.)));
    }

    #[test]
    fn spacing_change_snaps_current_shape() {
        let mut modifier = SelectOverlayModifier::new();
        modifier.set_has_extension_menu(true);
        modifier.set_line_end_offset(false, 0);
        modifier.set_coordinate(10.);
        let mut canvas = RecordingCanvas::new();
        modifier.on_draw(&mut canvas, 0);
        let first = canvas.circles().next().map(|circle| circle.0);
        assert_eq!(first, Some(Point2::new(-10., 0.)));
    }

    #[test]
    fn more_icon_collapses_lines() {
        let mut modifier = modifier();
        modifier.set_line_end_offset(true, 0);
        let mut canvas = RecordingCanvas::new();
        modifier.on_draw(&mut canvas, 0);
        assert!(canvas.lines().all(|(from, to)| from == to));
    }
}
