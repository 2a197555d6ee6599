//! Colors for gauge and host screen rendering

use std::fmt;

use serde::{Deserialize, Serialize};
use tiny_skia::ColorU8;

use crate::error::Error;

// Style attribute defaults
pub mod defaults {
    // Border around the whole gauge, also used for tick marks
    pub const OUTER: &str = "#888888";

    // Background of the tube and bulb
    pub const MIDDLE: &str = "#FFFFFF";

    // Fill level
    pub const INNER: &str = "#FF0000";
}

// Host screen page
pub mod page {
    pub const BACKGROUND: &str = "#FAFAFA";
    pub const TEXT_PRIMARY: &str = "#4A4A4A";
    pub const TEXT_SECONDARY: &str = "#888888";
}

// Named colors accepted in style files, same values as android.graphics.Color
const NAMED: &[(&str, u32)] = &[
    ("black", 0xFF000000),
    ("darkgray", 0xFF444444),
    ("darkgrey", 0xFF444444),
    ("gray", 0xFF888888),
    ("grey", 0xFF888888),
    ("lightgray", 0xFFCCCCCC),
    ("lightgrey", 0xFFCCCCCC),
    ("white", 0xFFFFFFFF),
    ("red", 0xFFFF0000),
    ("green", 0xFF00FF00),
    ("blue", 0xFF0000FF),
    ("yellow", 0xFFFFFF00),
    ("cyan", 0xFF00FFFF),
    ("magenta", 0xFFFF00FF),
    ("transparent", 0x00000000),
];

/// An 8-bit ARGB color as written in style files (`#RRGGBB`, `#AARRGGBB`, or a name).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(ColorU8);

impl Color {
    pub fn from_argb(argb: u32) -> Self {
        Self(ColorU8::from_rgba(
            (argb >> 16) as u8,
            (argb >> 8) as u8,
            argb as u8,
            (argb >> 24) as u8,
        ))
    }

    pub fn parse(value: &str) -> Result<Self, Error> {
        let value = value.trim();

        if let Some(hex) = value.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::Config(format!("invalid color '{}'", value)));
            }
            let bits = u32::from_str_radix(hex, 16)
                .map_err(|_| Error::Config(format!("invalid color '{}'", value)))?;
            return match hex.len() {
                6 => Ok(Self::from_argb(0xFF00_0000 | bits)),
                8 => Ok(Self::from_argb(bits)),
                _ => Err(Error::Config(format!(
                    "color '{}' must be #RRGGBB or #AARRGGBB",
                    value
                ))),
            };
        }

        let lower = value.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|&(_, argb)| Self::from_argb(argb))
            .ok_or_else(|| Error::Config(format!("unknown color '{}'", value)))
    }

    /// `#RRGGBB`, for SVG `fill`/`stroke` attributes.
    pub fn rgb_hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            self.0.red(),
            self.0.green(),
            self.0.blue()
        )
    }

    /// Alpha in `0.0..=1.0`, for SVG `*-opacity` attributes.
    pub fn opacity(&self) -> f32 {
        self.0.alpha() as f32 / 255.0
    }

    pub fn is_opaque(&self) -> bool {
        self.0.alpha() == u8::MAX
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            f.write_str(&self.rgb_hex())
        } else {
            write!(f, "#{:02X}{}", self.0.alpha(), &self.rgb_hex()[1..])
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb_hex_is_opaque() {
        let color = Color::parse("#DC143C").unwrap();
        assert!(color.is_opaque());
        assert_eq!(color.rgb_hex(), "#DC143C");
        assert_eq!(color.to_string(), "#DC143C");
    }

    #[test]
    fn test_parse_argb_hex_keeps_alpha() {
        let color = Color::parse("#80FF0000").unwrap();
        assert!(!color.is_opaque());
        assert_eq!(color.rgb_hex(), "#FF0000");
        assert!((color.opacity() - 128.0 / 255.0).abs() < f32::EPSILON);
        assert_eq!(color.to_string(), "#80FF0000");
    }

    #[test]
    fn test_named_colors_match_defaults() {
        assert_eq!(Color::parse("gray").unwrap(), Color::parse(defaults::OUTER).unwrap());
        assert_eq!(Color::parse("White").unwrap(), Color::parse(defaults::MIDDLE).unwrap());
        assert_eq!(Color::parse(" RED ").unwrap(), Color::parse(defaults::INNER).unwrap());
    }

    #[test]
    fn test_rejects_malformed_colors() {
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#GGGGGG").is_err());
        assert!(Color::parse("mauve").is_err());
        assert!(Color::parse("").is_err());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let color: Color = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(color, Color::parse("green").unwrap());
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#00FF00\"");
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }
}
