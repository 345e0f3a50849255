use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const TRANSPARENT: Color = Color {
        r: 0.,
        g: 0.,
        b: 0.,
        a: 0.,
    };
    pub const WHITE: Color = Color {
        r: 1.,
        g: 1.,
        b: 1.,
        a: 1.,
    };
    pub const BLACK: Color = Color {
        r: 0.,
        g: 0.,
        b: 0.,
        a: 1.,
    };

    /// Creates a color from a packed `0xAARRGGBB` value.
    pub fn from_argb(argb: u32) -> Color {
        let channel = |shift: u32| f64::from((argb >> shift) & 0xff) / 255.;
        Color {
            r: channel(16),
            g: channel(8),
            b: channel(0),
            a: channel(24),
        }
    }

    /// Returns the same color with its alpha multiplied by `opacity`.
    pub fn with_opacity(self, opacity: f64) -> Color {
        Color {
            a: self.a * opacity.max(0.).min(1.),
            ..self
        }
    }
}

#[test]
fn test_from_argb() {
    let c = Color::from_argb(0xff00_7dff);
    assert_eq!(c.a, 1.);
    assert_eq!(c.r, 0.);
    assert!((c.g - 125. / 255.).abs() < 1e-9);
    assert_eq!(c.b, 1.);
}
