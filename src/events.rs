//! Events.

use crate::rect::Offset;
use cgmath::{InnerSpace, Point2, Vector2};

/// Phases of a touch or mouse-button event.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchType {
    Down = 0,
    Move = 1,
    Up = 2,
    Cancel = 3,
}

/// Types of pointing devices or mechanisms.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDevice {
    /// Touch input from a finger or something of the sort; is expected to be imprecise.
    Touch = 0,

    /// Pen input. Reported like touch input, but precise.
    Pen = 1,

    /// A mouse or any other indirect input mechanism.
    Mouse = 2,
}

impl PointerDevice {
    /// If true, events from this device take part in touch gesture recognition.
    ///
    /// Mouse events only ever act on button presses.
    pub fn is_touch_like(&self) -> bool {
        match self {
            PointerDevice::Touch | PointerDevice::Pen => true,
            PointerDevice::Mouse => false,
        }
    }
}

/// A raw pointer event as delivered to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Pointer id. Stable from down to up.
    pub id: i32,

    /// Location in the window coordinate system.
    pub location: Point2<f64>,

    pub kind: TouchType,

    /// The device type that emitted this event.
    pub device: PointerDevice,

    /// Event time in milliseconds.
    pub time: u64,
}

impl TouchEvent {
    pub fn new(id: i32, x: f64, y: f64, kind: TouchType, device: PointerDevice) -> TouchEvent {
        TouchEvent {
            id,
            location: Point2::new(x, y),
            kind,
            device,
            time: 0,
        }
    }

    pub fn touch(id: i32, x: f64, y: f64, kind: TouchType) -> TouchEvent {
        TouchEvent::new(id, x, y, kind, PointerDevice::Touch)
    }

    pub fn mouse(x: f64, y: f64, kind: TouchType) -> TouchEvent {
        TouchEvent::new(0, x, y, kind, PointerDevice::Mouse)
    }

    /// Distance travelled from another event.
    pub fn distance_from(&self, other: &TouchEvent) -> f64 {
        (self.location - other.location).magnitude()
    }
}

/// A recognized gesture (click or pan phase) delivered to a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    /// Location in the window coordinate system.
    pub global_location: Offset,

    /// Location relative to the receiving node’s frame.
    pub local_location: Offset,

    /// Movement since the previous pan update. Zero for clicks.
    pub delta: Vector2<f64>,

    pub device: PointerDevice,
}

/// A touch event as seen by a node’s touch listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEventInfo {
    pub kind: TouchType,
    pub global_location: Offset,
    pub local_location: Offset,
    pub device: PointerDevice,
}

/// Scroll axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Vertical,
    Horizontal,
}

#[test]
fn test_distance() {
    let a = TouchEvent::touch(1, 0., 0., TouchType::Down);
    let b = TouchEvent::touch(1, 3., 4., TouchType::Move);
    assert_eq!(b.distance_from(&a), 5.);
}
