//! Style Values
//!
//! Tagged CSS value objects shared by themes, templates and the component
//! style table, plus parsing between author-facing strings (hex colors,
//! CSS lengths) and the typed forms.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// CSS length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Px,
    Rem,
    Em,
    #[serde(rename = "%")]
    Percent,
    Vw,
    Vh,
    Svh,
    /// Unitless number (line heights, flex factors)
    Number,
}

impl Unit {
    fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Rem => "rem",
            Unit::Em => "em",
            Unit::Percent => "%",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
            Unit::Svh => "svh",
            Unit::Number => "",
        }
    }
}

/// A numeric CSS value with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitValue {
    pub value: f64,
    pub unit: Unit,
}

impl UnitValue {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Render back to the author-facing CSS string (`1.5rem`, `0px`, `1.2`)
    pub fn to_css(&self) -> String {
        format!("{}{}", format_number(self.value), self.unit.suffix())
    }
}

/// An RGB color with 0..=255 channels and 0.0..=1.0 alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbValue {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl RgbValue {
    pub fn new(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self { r, g, b, alpha }
    }

    /// Transparent black, the fallback for unparsable model colors
    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0.0)
    }
}

/// Image reference carried by image-typed style values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ImageSource {
    Url { url: String },
}

/// A single CSS value in tagged form.
///
/// The `invalid` variant preserves text the parser could not understand so a
/// round trip never loses author input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleValue {
    Keyword { value: String },
    Unit(UnitValue),
    Rgb(RgbValue),
    FontFamily { value: Vec<String> },
    Layers { value: Vec<StyleValue> },
    Image { value: ImageSource },
    Invalid { value: String },
}

impl StyleValue {
    pub fn keyword(value: impl Into<String>) -> Self {
        Self::Keyword {
            value: value.into(),
        }
    }

    pub fn unit(value: f64, unit: Unit) -> Self {
        Self::Unit(UnitValue::new(value, unit))
    }

    pub fn rgb(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self::Rgb(RgbValue::new(r, g, b, alpha))
    }

    pub fn font_family(fonts: Vec<String>) -> Self {
        Self::FontFamily { value: fonts }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::Image {
            value: ImageSource::Url { url: url.into() },
        }
    }

    pub fn invalid(value: impl Into<String>) -> Self {
        Self::Invalid {
            value: value.into(),
        }
    }
}

/// A CSS declaration: one property with one value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDecl {
    pub property: String,
    pub value: StyleValue,
}

impl StyleDecl {
    pub fn new(property: impl Into<String>, value: StyleValue) -> Self {
        Self {
            property: property.into(),
            value,
        }
    }
}

/// Parse a `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` hex color.
pub fn parse_color(input: &str) -> Option<RgbValue> {
    let digits = input.trim().strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |c: char| c.to_digit(16).map(|d| d as u8);
    let chars: Vec<char> = digits.chars().collect();
    match chars.len() {
        3 | 4 => {
            let r = nibble(chars[0])?;
            let g = nibble(chars[1])?;
            let b = nibble(chars[2])?;
            let alpha = if chars.len() == 4 {
                f64::from(nibble(chars[3])? * 17) / 255.0
            } else {
                1.0
            };
            Some(RgbValue::new(r * 17, g * 17, b * 17, alpha))
        }
        6 | 8 => {
            let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
            let r = byte(0)?;
            let g = byte(2)?;
            let b = byte(4)?;
            let alpha = if chars.len() == 8 {
                f64::from(byte(6)?) / 255.0
            } else {
                1.0
            };
            Some(RgbValue::new(r, g, b, alpha))
        }
        _ => None,
    }
}

/// Render an RGB value back to lowercase hex, appending the alpha pair only
/// when alpha is below 1.
pub fn rgb_to_hex(color: &RgbValue) -> String {
    let mut hex = format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b);
    if color.alpha < 1.0 {
        let a = (color.alpha * 255.0).round().clamp(0.0, 255.0) as u8;
        hex.push_str(&format!("{a:02x}"));
    }
    hex
}

/// Parse a CSS length such as `1.5rem`, `0px`, `50%` or a bare number.
pub fn parse_length(input: &str) -> CoreResult<UnitValue> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(CoreError::style_parse("empty length"));
    }
    for unit in [
        Unit::Rem,
        Unit::Em,
        Unit::Px,
        Unit::Percent,
        Unit::Svh,
        Unit::Vw,
        Unit::Vh,
    ] {
        if let Some(number) = raw.strip_suffix(unit.suffix()) {
            let value = number
                .trim()
                .parse::<f64>()
                .map_err(|_| CoreError::style_parse(format!("bad length: {raw}")))?;
            return Ok(UnitValue::new(value, unit));
        }
    }
    let value = raw
        .parse::<f64>()
        .map_err(|_| CoreError::style_parse(format!("bad length: {raw}")))?;
    Ok(UnitValue::new(value, Unit::Number))
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
