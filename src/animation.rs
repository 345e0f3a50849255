//! Animatable properties.
//!
//! Animations are evaluated lazily against the pipeline clock: a property stores where it came
//! from, where it is going, and when it started, and computes its current value on read.

use crate::color::Color;
use crate::rect::{Offset, Rect};
use cgmath::Point2;

/// Timing curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    /// `cubic-bezier(0.2, 0, 0.2, 1)`
    Friction,
    /// `cubic-bezier(0.4, 0, 0.2, 1)`
    FastOutSlowIn,
    /// `cubic-bezier(x1, y1, x2, y2)`
    CubicBezier(f64, f64, f64, f64),
}

impl Curve {
    /// Maps linear progress in `[0, 1]` to eased progress.
    pub fn transform(&self, t: f64) -> f64 {
        let t = t.max(0.).min(1.);
        match *self {
            Curve::Linear => t,
            Curve::Friction => cubic_bezier(0.2, 0., 0.2, 1., t),
            Curve::FastOutSlowIn => cubic_bezier(0.4, 0., 0.2, 1., t),
            Curve::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }
}

fn bezier_component(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1. - s;
    3. * inv * inv * s * p1 + 3. * inv * s * s * p2 + s * s * s
}

/// Solves the bezier for x = t by bisection and returns y.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    let (mut lo, mut hi) = (0., 1.);
    let mut s = t;
    for _ in 0..32 {
        let x = bezier_component(x1, x2, s);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.;
    }
    bezier_component(y1, y2, s)
}

/// Values that can be interpolated.
pub trait Interpolate: Copy {
    fn interpolate(self, to: Self, fraction: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(self, to: f64, fraction: f64) -> f64 {
        self + (to - self) * fraction
    }
}

impl Interpolate for Offset {
    fn interpolate(self, to: Offset, fraction: f64) -> Offset {
        Point2::new(
            self.x.interpolate(to.x, fraction),
            self.y.interpolate(to.y, fraction),
        )
    }
}

impl Interpolate for Rect {
    fn interpolate(self, to: Rect, fraction: f64) -> Rect {
        Rect::from_xywh(
            self.left().interpolate(to.left(), fraction),
            self.top().interpolate(to.top(), fraction),
            self.width().interpolate(to.width(), fraction),
            self.height().interpolate(to.height(), fraction),
        )
    }
}

impl Interpolate for Color {
    fn interpolate(self, to: Color, fraction: f64) -> Color {
        Color {
            r: self.r.interpolate(to.r, fraction),
            g: self.g.interpolate(to.g, fraction),
            b: self.b.interpolate(to.b, fraction),
            a: self.a.interpolate(to.a, fraction),
        }
    }
}

/// How a property change is animated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationOption {
    pub duration_ms: u64,
    pub curve: Curve,
}

impl AnimationOption {
    pub fn new(duration_ms: u64, curve: Curve) -> AnimationOption {
        AnimationOption { duration_ms, curve }
    }
}

/// A property that may be set directly or animated towards a target.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatableProperty<T> {
    from: T,
    to: T,
    start_ms: u64,
    option: Option<AnimationOption>,
}

impl<T: Interpolate> AnimatableProperty<T> {
    pub fn new(value: T) -> AnimatableProperty<T> {
        AnimatableProperty {
            from: value,
            to: value,
            start_ms: 0,
            option: None,
        }
    }

    /// Sets the value immediately, canceling any running animation.
    pub fn set(&mut self, value: T) {
        self.from = value;
        self.to = value;
        self.option = None;
    }

    /// Animates from the current value to `target`.
    ///
    /// Retargeting a running animation starts from wherever it currently is.
    pub fn animate_to(&mut self, target: T, now_ms: u64, option: AnimationOption) {
        self.from = self.get(now_ms);
        self.to = target;
        self.start_ms = now_ms;
        self.option = if option.duration_ms == 0 {
            None
        } else {
            Some(option)
        };
        if self.option.is_none() {
            self.from = target;
        }
    }

    /// The value the property is heading towards.
    pub fn target(&self) -> T {
        self.to
    }

    /// The value at the given time.
    pub fn get(&self, now_ms: u64) -> T {
        match self.option {
            Some(option) => {
                let elapsed = now_ms.saturating_sub(self.start_ms);
                if elapsed >= option.duration_ms {
                    self.to
                } else {
                    let t = elapsed as f64 / option.duration_ms as f64;
                    self.from.interpolate(self.to, option.curve.transform(t))
                }
            }
            None => self.to,
        }
    }

    pub fn is_running(&self, now_ms: u64) -> bool {
        match self.option {
            Some(option) => now_ms.saturating_sub(self.start_ms) < option.duration_ms,
            None => false,
        }
    }
}
