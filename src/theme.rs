//! Theme tokens.
//!
//! Dimensions are resolved to pixels at the point of use, so the same theme can be shared by
//! pipelines with different densities.

use crate::color::Color;
use crate::error::Error;
use serde::Deserialize;

/// Units a [`Dimension`] may be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    /// Physical pixels.
    Px,
    /// Virtual pixels; multiplied by the display density.
    Vp,
}

/// A length with a unit.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Dimension {
    pub value: f64,
    pub unit: DimensionUnit,
}

impl Dimension {
    pub const fn vp(value: f64) -> Dimension {
        Dimension {
            value,
            unit: DimensionUnit::Vp,
        }
    }

    pub const fn px(value: f64) -> Dimension {
        Dimension {
            value,
            unit: DimensionUnit::Px,
        }
    }

    /// Converts this dimension to pixels.
    pub fn to_px(self, density: f64) -> f64 {
        match self.unit {
            DimensionUnit::Px => self.value,
            DimensionUnit::Vp => self.value * density,
        }
    }
}

/// Tokens for text selection handles and the selection menu.
///
/// Every field has a default, so a JSON document only needs to list the tokens it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextOverlayTheme {
    /// Outer diameter of a handle circle.
    pub handle_diameter: Dimension,
    /// Diameter of the inner (filled) handle circle.
    pub handle_diameter_inner: Dimension,
    /// Radius of the square hit zone around a handle.
    pub handle_hot_zone_radius: Dimension,
    /// Width of the line connecting a handle circle with the selection.
    pub handle_line_width: Dimension,
    /// Vertical gap between the selection and the menu.
    pub menu_spacing_with_text: Dimension,
    /// Inner padding of the default menu.
    pub menu_padding: Dimension,
    /// Horizontal inset used when the menu would leave the viewport.
    pub default_menu_position_x: Dimension,
    /// Gap between the default menu and the extension menu.
    pub more_menu_interval: Dimension,
    pub menu_button_width: Dimension,
    pub menu_button_height: Dimension,
    /// Height of one row in the extension menu.
    pub extension_menu_item_height: Dimension,
    pub extension_menu_width: Dimension,
    /// How far a pointer may move before a tap becomes a drag.
    pub move_threshold: Dimension,
    /// Minimum distance a pointer must move to start a pan.
    pub pan_distance: Dimension,
    /// Spacing of the dots in the more/back icon.
    pub more_icon_coordinate: Dimension,
    pub more_icon_dot_radius: Dimension,
    pub handle_color: Color,
    pub handle_color_inner: Color,
    pub menu_background_color: Color,
    pub icon_color: Color,
}

impl Default for TextOverlayTheme {
    fn default() -> TextOverlayTheme {
        TextOverlayTheme {
            handle_diameter: Dimension::vp(14.),
            handle_diameter_inner: Dimension::vp(11.),
            handle_hot_zone_radius: Dimension::vp(20.),
            handle_line_width: Dimension::vp(2.),
            menu_spacing_with_text: Dimension::vp(8.),
            menu_padding: Dimension::vp(4.),
            default_menu_position_x: Dimension::vp(10.),
            more_menu_interval: Dimension::vp(8.),
            menu_button_width: Dimension::vp(56.),
            menu_button_height: Dimension::vp(40.),
            extension_menu_item_height: Dimension::vp(48.),
            extension_menu_width: Dimension::vp(160.),
            move_threshold: Dimension::vp(5.),
            pan_distance: Dimension::vp(5.),
            more_icon_coordinate: Dimension::vp(8.13),
            more_icon_dot_radius: Dimension::vp(1.75),
            handle_color: Color::from_argb(0xff00_7dff),
            handle_color_inner: Color::WHITE,
            menu_background_color: Color::WHITE,
            icon_color: Color::from_argb(0xe500_0000),
        }
    }
}

/// All theme tokens used by the pipeline.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub text_overlay: TextOverlayTheme,
}

impl Theme {
    /// Parses a theme from JSON. Missing tokens keep their defaults.
    pub fn from_json(json: &str) -> Result<Theme, Error> {
        Ok(serde_json::from_str(json)?)
    }
}
