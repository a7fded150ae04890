//! Fill colors for flowchart nodes.
//!
//! Colors accept any CSS color string on input and are always persisted and
//! displayed as lowercase `#rrggbb`, which is the format saved flowcharts use.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::{DynamicColor, Srgb};
use serde::{Deserialize, Serialize};

/// Swatches offered for recoloring a node, in display order.
pub const PALETTE: [&str; 10] = [
    "#ffffff", "#ffadad", "#ffd6a5", "#fdffb6", "#caffbf", "#9bf6ff", "#a0c4ff", "#bdb2ff",
    "#ffc6ff", "#dee2e6",
];

/// Wrapper around the `DynamicColor` type from the color crate.
///
/// # Examples
///
/// ```
/// use flowprompt_core::color::Color;
///
/// let red = Color::new("red").unwrap();
/// assert_eq!(red.to_hex(), "#ff0000");
///
/// let same = Color::new("#FF0000").unwrap();
/// assert_eq!(red, same);
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a string.
    ///
    /// This parses CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Color { color }),
            Err(err) => Err(format!("Invalid color '{color_str}': {err}")),
        }
    }

    /// Returns the swatch palette as parsed colors.
    pub fn palette() -> impl Iterator<Item = Color> {
        PALETTE
            .iter()
            .filter_map(|swatch| Color::new(swatch).ok())
    }

    /// Returns the color as `#rrggbb`, dropping any alpha component.
    pub fn to_hex(&self) -> String {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("#ffffff").expect("'#ffffff' is a valid CSS color")
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.to_hex() == other.to_hex()
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_hex().hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::new(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_new() {
        assert!(Color::new("#ff0000").is_ok());
        assert!(Color::new("not-a-color").is_err());
    }

    #[test]
    fn test_color_default_is_white() {
        assert_eq!(Color::default().to_hex(), "#ffffff");
    }

    #[test]
    fn test_color_hex_normalization() {
        assert_eq!(Color::new("#FFADAD").unwrap().to_hex(), "#ffadad");
        assert_eq!(Color::new("rgb(0, 128, 255)").unwrap().to_hex(), "#0080ff");
        assert_eq!(Color::new("black").unwrap().to_string(), "#000000");
    }

    #[test]
    fn test_palette_parses_completely() {
        let swatches: Vec<String> = Color::palette().map(|c| c.to_hex()).collect();
        assert_eq!(swatches.len(), PALETTE.len());
        assert_eq!(swatches, PALETTE.to_vec());
    }

    #[test]
    fn test_color_eq_hash() {
        use std::collections::HashSet;

        let color1 = Color::new("red").unwrap();
        let color2 = Color::new("#ff0000").unwrap();
        let color3 = Color::new("blue").unwrap();

        assert_eq!(color1, color2);
        assert_ne!(color1, color3);

        let mut set = HashSet::new();
        set.insert(color1);
        assert!(set.contains(&color2));
        assert!(!set.contains(&color3));
    }

    #[test]
    fn test_color_string_conversions() {
        let color = Color::try_from(String::from("#caffbf")).unwrap();
        assert_eq!(String::from(color), "#caffbf");
        assert!(Color::try_from(String::from("#zzzzzz")).is_err());
    }
}
