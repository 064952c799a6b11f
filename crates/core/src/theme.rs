//! Theme
//!
//! Design-token themes produced by the theme generation stage. A theme exists
//! in two shapes: `RawTheme` uses author-facing strings (hex colors, CSS
//! lengths) and is what the model emits; `Theme` is the typed form the rest of
//! the pipeline consumes. Conversion between the two is total for valid input
//! and lossless up to hex alpha precision (1/255).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{CoreError, CoreResult};
use crate::style::{parse_color, parse_length, rgb_to_hex, RgbValue, StyleValue, UnitValue};

/// Scale names of every color group
pub const COLOR_SCALE_KEYS: [&str; 7] = [
    "base",
    "elevate",
    "primary",
    "secondary",
    "accent",
    "muted",
    "destructive",
];

/// Named font sizes, smallest to largest
pub const FONT_SIZE_KEYS: [&str; 13] = [
    "xs", "sm", "base", "lg", "xl", "2xl", "3xl", "4xl", "5xl", "6xl", "7xl", "8xl", "9xl",
];

/// Named border radii. `none` and `full` are pinned to `0px` and `9999px`.
pub const BORDER_RADIUS_KEYS: [&str; 9] = [
    "none", "sm", "DEFAULT", "md", "lg", "xl", "2xl", "3xl", "full",
];

/// The fixed spacing scale
pub const SPACING_KEYS: [&str; 35] = [
    "px", "0", "0.5", "1", "1.5", "2", "2.5", "3", "3.5", "4", "5", "6", "7", "8", "9", "10",
    "11", "12", "14", "16", "20", "24", "28", "32", "36", "40", "44", "48", "52", "56", "60",
    "64", "72", "80", "96",
];

/// One color group: the same seven-role scale for every group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ColorScale<T> {
    pub base: T,
    pub elevate: T,
    pub primary: T,
    pub secondary: T,
    pub accent: T,
    pub muted: T,
    pub destructive: T,
}

impl<T> ColorScale<T> {
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> ColorScale<U> {
        ColorScale {
            base: f(&self.base),
            elevate: f(&self.elevate),
            primary: f(&self.primary),
            secondary: f(&self.secondary),
            accent: f(&self.accent),
            muted: f(&self.muted),
            destructive: f(&self.destructive),
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        match name {
            "base" => Some(&self.base),
            "elevate" => Some(&self.elevate),
            "primary" => Some(&self.primary),
            "secondary" => Some(&self.secondary),
            "accent" => Some(&self.accent),
            "muted" => Some(&self.muted),
            "destructive" => Some(&self.destructive),
            _ => None,
        }
    }

    pub fn entries(&self) -> [(&'static str, &T); 7] {
        [
            ("base", &self.base),
            ("elevate", &self.elevate),
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
            ("muted", &self.muted),
            ("destructive", &self.destructive),
        ]
    }
}

/// Base and heading font stacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontFamilies {
    pub base: Vec<String>,
    pub headings: Vec<String>,
}

/// Raw font size entry: `["1rem", { "lineHeight": "1.5rem" }]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLineHeight {
    #[serde(rename = "lineHeight")]
    pub line_height: String,
}

/// Typed font size entry companion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineHeight {
    #[serde(rename = "lineHeight")]
    pub line_height: UnitValue,
}

/// The string-facing theme shape the model produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTheme {
    pub background_color: ColorScale<String>,
    pub color: ColorScale<String>,
    pub border: ColorScale<String>,
    pub box_shadow_color: ColorScale<String>,
    pub gradient_color_stops: [[String; 2]; 3],
    pub font_family: FontFamilies,
    pub font_size: BTreeMap<String, (String, RawLineHeight)>,
    pub border_radius: BTreeMap<String, String>,
    pub spacing: BTreeMap<String, String>,
}

/// The typed theme shape the pipeline consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub background_color: ColorScale<RgbValue>,
    pub color: ColorScale<RgbValue>,
    pub border: ColorScale<RgbValue>,
    pub box_shadow_color: ColorScale<RgbValue>,
    pub gradient_color_stops: [[RgbValue; 2]; 3],
    pub font_family: FontFamilies,
    pub font_size: BTreeMap<String, (UnitValue, LineHeight)>,
    pub border_radius: BTreeMap<String, UnitValue>,
    pub spacing: BTreeMap<String, UnitValue>,
}

fn check_keys<V>(map: &BTreeMap<String, V>, expected: &[&str], what: &str) -> CoreResult<()> {
    if map.len() != expected.len() || !expected.iter().all(|key| map.contains_key(*key)) {
        return Err(CoreError::theme(format!(
            "{what} must have exactly the named keys {expected:?}"
        )));
    }
    Ok(())
}

impl RawTheme {
    /// Structural validation beyond what deserialization enforces.
    pub fn validate(&self) -> CoreResult<()> {
        check_keys(&self.font_size, &FONT_SIZE_KEYS, "fontSize")?;
        check_keys(&self.border_radius, &BORDER_RADIUS_KEYS, "borderRadius")?;
        check_keys(&self.spacing, &SPACING_KEYS, "spacing")?;
        if self.border_radius.get("none").map(String::as_str) != Some("0px") {
            return Err(CoreError::theme("borderRadius.none must be 0px"));
        }
        if self.border_radius.get("full").map(String::as_str) != Some("9999px") {
            return Err(CoreError::theme("borderRadius.full must be 9999px"));
        }
        Ok(())
    }
}

// Unparsable colors degrade to transparent black instead of failing the
// whole theme.
fn color_or_transparent(hex: &str) -> RgbValue {
    parse_color(hex).unwrap_or_else(RgbValue::transparent)
}

impl Theme {
    /// Convert the model's raw theme into the typed form.
    pub fn from_raw(raw: &RawTheme) -> CoreResult<Theme> {
        raw.validate()?;

        let gradient_color_stops = [0, 1, 2].map(|i| {
            [0, 1].map(|j| color_or_transparent(&raw.gradient_color_stops[i][j]))
        });

        let mut font_size = BTreeMap::new();
        for (name, (size, raw_line_height)) in &raw.font_size {
            let size = parse_length(size)?;
            let line_height = if raw_line_height.line_height.is_empty() {
                parse_length("1.4")?
            } else {
                parse_length(&raw_line_height.line_height)?
            };
            font_size.insert(name.clone(), (size, LineHeight { line_height }));
        }

        let mut border_radius = BTreeMap::new();
        for (name, value) in &raw.border_radius {
            border_radius.insert(name.clone(), parse_length(value)?);
        }

        let mut spacing = BTreeMap::new();
        for (name, value) in &raw.spacing {
            spacing.insert(name.clone(), parse_length(value)?);
        }

        Ok(Theme {
            background_color: raw.background_color.map(|hex| color_or_transparent(hex)),
            color: raw.color.map(|hex| color_or_transparent(hex)),
            border: raw.border.map(|hex| color_or_transparent(hex)),
            box_shadow_color: raw.box_shadow_color.map(|hex| color_or_transparent(hex)),
            gradient_color_stops,
            font_family: raw.font_family.clone(),
            font_size,
            border_radius,
            spacing,
        })
    }

    /// Convert back to the string-facing form.
    pub fn to_raw(&self) -> RawTheme {
        let gradient_color_stops =
            [0, 1, 2].map(|i| [0, 1].map(|j| rgb_to_hex(&self.gradient_color_stops[i][j])));

        let font_size = self
            .font_size
            .iter()
            .map(|(name, (size, line_height))| {
                (
                    name.clone(),
                    (
                        size.to_css(),
                        RawLineHeight {
                            line_height: line_height.line_height.to_css(),
                        },
                    ),
                )
            })
            .collect();

        let border_radius = self
            .border_radius
            .iter()
            .map(|(name, value)| {
                let css = match name.as_str() {
                    "none" => "0px".to_string(),
                    "full" => "9999px".to_string(),
                    _ => value.to_css(),
                };
                (name.clone(), css)
            })
            .collect();

        let spacing = self
            .spacing
            .iter()
            .map(|(name, value)| (name.clone(), value.to_css()))
            .collect();

        RawTheme {
            background_color: self.background_color.map(rgb_to_hex),
            color: self.color.map(rgb_to_hex),
            border: self.border.map(rgb_to_hex),
            box_shadow_color: self.box_shadow_color.map(rgb_to_hex),
            gradient_color_stops,
            font_family: self.font_family.clone(),
            font_size,
            border_radius,
            spacing,
        }
    }

    /// Resolve a dotted token path (`backgroundColor.primary`,
    /// `borderRadius.DEFAULT`) to a style value.
    pub fn lookup(&self, path: &str) -> Option<StyleValue> {
        let (property, name) = match path.split_once('.') {
            Some(parts) => parts,
            None => (path, ""),
        };
        match property {
            "backgroundColor" => self.background_color.get(name).map(|c| StyleValue::Rgb(*c)),
            "color" => self.color.get(name).map(|c| StyleValue::Rgb(*c)),
            "border" => self.border.get(name).map(|c| StyleValue::Rgb(*c)),
            "boxShadowColor" => self.box_shadow_color.get(name).map(|c| StyleValue::Rgb(*c)),
            "fontFamily" => match name {
                "base" => Some(StyleValue::font_family(self.font_family.base.clone())),
                "headings" => Some(StyleValue::font_family(self.font_family.headings.clone())),
                _ => None,
            },
            "fontSize" => self
                .font_size
                .get(name)
                .map(|(size, _)| StyleValue::Unit(*size)),
            "borderRadius" => self.border_radius.get(name).map(|v| StyleValue::Unit(*v)),
            "spacing" => self.spacing.get(name).map(|v| StyleValue::Unit(*v)),
            _ => None,
        }
    }
}

/// Project a theme into a token map of tagged style values, keeping only the
/// top-level properties the filter accepts. This is the JSON handed back to
/// clients and embedded in follow-up prompts.
pub fn to_tokens_theme(theme: &Theme, filter: Option<&dyn Fn(&str) -> bool>) -> Value {
    let keep = |property: &str| filter.map_or(true, |f| f(property));
    let mut out = serde_json::Map::new();

    let mut scale = |property: &str, colors: &ColorScale<RgbValue>| {
        if keep(property) {
            let entries: serde_json::Map<String, Value> = colors
                .entries()
                .iter()
                .map(|(name, color)| {
                    (name.to_string(), json!({ "type": "rgb", "r": color.r, "g": color.g, "b": color.b, "alpha": color.alpha }))
                })
                .collect();
            out.insert(property.to_string(), Value::Object(entries));
        }
    };
    scale("backgroundColor", &theme.background_color);
    scale("color", &theme.color);
    scale("border", &theme.border);
    scale("boxShadowColor", &theme.box_shadow_color);

    if keep("gradientColorStops") {
        let stops: Vec<Value> = theme
            .gradient_color_stops
            .iter()
            .map(|pair| {
                Value::Array(
                    pair.iter()
                        .map(|c| serde_json::to_value(StyleValue::Rgb(*c)).unwrap_or(Value::Null))
                        .collect(),
                )
            })
            .collect();
        out.insert("gradientColorStops".to_string(), Value::Array(stops));
    }

    if keep("fontFamily") {
        out.insert(
            "fontFamily".to_string(),
            json!({
                "base": { "type": "fontFamily", "value": theme.font_family.base },
                "headings": { "type": "fontFamily", "value": theme.font_family.headings },
            }),
        );
    }

    if keep("fontSize") {
        let sizes: serde_json::Map<String, Value> = theme
            .font_size
            .iter()
            .map(|(name, (size, line_height))| {
                (
                    name.clone(),
                    json!([
                        serde_json::to_value(StyleValue::Unit(*size)).unwrap_or(Value::Null),
                        { "lineHeight": serde_json::to_value(StyleValue::Unit(line_height.line_height)).unwrap_or(Value::Null) },
                    ]),
                )
            })
            .collect();
        out.insert("fontSize".to_string(), Value::Object(sizes));
    }

    let mut lengths = |property: &str, map: &BTreeMap<String, UnitValue>| {
        if keep(property) {
            let entries: serde_json::Map<String, Value> = map
                .iter()
                .map(|(name, value)| {
                    (
                        name.clone(),
                        serde_json::to_value(StyleValue::Unit(*value)).unwrap_or(Value::Null),
                    )
                })
                .collect();
            out.insert(property.to_string(), Value::Object(entries));
        }
    };
    lengths("borderRadius", &theme.border_radius);
    lengths("spacing", &theme.spacing);

    Value::Object(out)
}

/// The fontSize/borderRadius/spacing scales merged under the model's palette
/// output before parsing. The model only has to produce colors, gradients and
/// font stacks.
pub fn theme_defaults() -> Value {
    json!({
        "fontSize": {
            "xs": ["0.75rem", { "lineHeight": "1rem" }],
            "sm": ["0.875rem", { "lineHeight": "1.25rem" }],
            "base": ["1rem", { "lineHeight": "1.5rem" }],
            "lg": ["1.125rem", { "lineHeight": "1.75rem" }],
            "xl": ["1.25rem", { "lineHeight": "1.75rem" }],
            "2xl": ["1.5rem", { "lineHeight": "2rem" }],
            "3xl": ["1.875rem", { "lineHeight": "2.25rem" }],
            "4xl": ["2.25rem", { "lineHeight": "2.5rem" }],
            "5xl": ["3rem", { "lineHeight": "1" }],
            "6xl": ["3.75rem", { "lineHeight": "1" }],
            "7xl": ["4.5rem", { "lineHeight": "1" }],
            "8xl": ["6rem", { "lineHeight": "1" }],
            "9xl": ["8rem", { "lineHeight": "1" }],
        },
        "borderRadius": {
            "none": "0px",
            "sm": "0.125rem",
            "DEFAULT": "0.25rem",
            "md": "0.375rem",
            "lg": "0.5rem",
            "xl": "0.75rem",
            "2xl": "1rem",
            "3xl": "1.5rem",
            "full": "9999px",
        },
        "spacing": {
            "px": "1px",
            "0": "0px",
            "0.5": "0.125rem",
            "1": "0.25rem",
            "1.5": "0.375rem",
            "2": "0.5rem",
            "2.5": "0.625rem",
            "3": "0.75rem",
            "3.5": "0.875rem",
            "4": "1rem",
            "5": "1.25rem",
            "6": "1.5rem",
            "7": "1.75rem",
            "8": "2rem",
            "9": "2.25rem",
            "10": "2.5rem",
            "11": "2.75rem",
            "12": "3rem",
            "14": "3.5rem",
            "16": "4rem",
            "20": "5rem",
            "24": "6rem",
            "28": "7rem",
            "32": "8rem",
            "36": "9rem",
            "40": "10rem",
            "44": "11rem",
            "48": "12rem",
            "52": "13rem",
            "56": "14rem",
            "60": "15rem",
            "64": "16rem",
            "72": "18rem",
            "80": "20rem",
            "96": "24rem",
        },
    })
}

/// Overlay a model-produced raw theme object on top of the defaults. Keys the
/// model does emit win over the defaults.
pub fn with_defaults(model_output: Value) -> Value {
    let mut merged = theme_defaults();
    if let (Value::Object(base), Value::Object(overlay)) = (&mut merged, model_output) {
        for (key, value) in overlay {
            base.insert(key, value);
        }
    }
    merged
}
