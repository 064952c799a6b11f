//! Built-in Component Styles
//!
//! The static style table for the builder's component library. Every
//! component has a `base` look plus named variants; the UI stage resolves a
//! generated tree against this table so the model only ever picks variants
//! instead of writing CSS.

use rand::Rng;
use webforge_core::{rgb_to_hex, RgbValue, StyleDecl, StyleValue, Theme, Unit, UnitValue};

/// Light or dark surroundings, used by pattern backgrounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Light,
    Dark,
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Light
    }
}

/// Components that carry styles in the table, in prompt order.
pub const COMPONENTS: [&str; 16] = [
    "Blockquote",
    "Bold",
    "Box",
    "Button",
    "CodeText",
    "Heading",
    "Image",
    "Input",
    "Italic",
    "Link",
    "List",
    "ListItem",
    "RichTextLink",
    "Separator",
    "Text",
    "Textarea",
];

/// Variant names (beyond `base`) for a component. Unknown components have
/// none.
pub fn variants(component: &str) -> &'static [&'static str] {
    match component {
        "Box" => &[
            "columns",
            "testimonialsContainer",
            "sectionContainer",
            "sectionContent",
            "horizontalLinks",
            "rightAlignedNavigation",
            "logoNav",
            "card",
            "gradientVertical",
            "gradient45degrees",
            "withBackgroundPattern",
        ],
        "Button" => &["primary", "secondary", "outline", "round", "square"],
        "CodeText" => &["block"],
        "Heading" => &["small", "medium", "large", "hero"],
        "Image" => &["noRounded", "roundedSmall", "circle"],
        "Link" => &["navLink"],
        "Text" => &["subtle", "small", "medium", "large"],
        _ => &[],
    }
}

/// Whether the table knows the component at all.
pub fn is_known(component: &str) -> bool {
    COMPONENTS.contains(&component)
}

/// The component list as embedded in generation prompts, one bullet per
/// component with its selectable variants.
pub fn prompt_listing() -> String {
    COMPONENTS
        .iter()
        .map(|component| {
            let names = variants(component);
            if names.is_empty() {
                format!("- {component}")
            } else {
                format!("- {component}: {}", names.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Expand a shorthand property into its longhand declarations.
pub fn expand(property: &str, value: StyleValue) -> Vec<StyleDecl> {
    if let Some(stem) = property.strip_suffix("Horizontal") {
        return ["Right", "Left"]
            .iter()
            .map(|side| StyleDecl::new(format!("{stem}{side}"), value.clone()))
            .collect();
    }
    if let Some(stem) = property.strip_suffix("Vertical") {
        return ["Top", "Bottom"]
            .iter()
            .map(|side| StyleDecl::new(format!("{stem}{side}"), value.clone()))
            .collect();
    }
    if property == "margin" || property == "padding" {
        return ["Top", "Right", "Bottom", "Left"]
            .iter()
            .map(|side| StyleDecl::new(format!("{property}{side}"), value.clone()))
            .collect();
    }
    if property == "borderRadius" {
        return ["TopRight", "TopLeft", "BottomRight", "BottomLeft"]
            .iter()
            .map(|corner| StyleDecl::new(format!("border{corner}Radius"), value.clone()))
            .collect();
    }
    if let Some(rest) = property.strip_prefix("border") {
        return ["Top", "Right", "Bottom", "Left"]
            .iter()
            .map(|side| StyleDecl::new(format!("border{side}{rest}"), value.clone()))
            .collect();
    }
    vec![StyleDecl::new(property, value)]
}

fn system_font() -> StyleValue {
    StyleValue::font_family(
        [
            "system-ui",
            "Segoe UI",
            "Roboto",
            "Helvetica",
            "Arial",
            "sans-serif",
            "Apple Color Emoji",
            "Segoe UI Emoji",
            "Segoe UI Symbol",
        ]
        .iter()
        .map(ToString::to_string)
        .collect(),
    )
}

fn keyword(value: &str) -> StyleValue {
    StyleValue::keyword(value)
}

fn px(value: f64) -> StyleValue {
    StyleValue::unit(value, Unit::Px)
}

fn percent(value: f64) -> StyleValue {
    StyleValue::unit(value, Unit::Percent)
}

fn rgb(color: RgbValue) -> StyleValue {
    StyleValue::Rgb(color)
}

fn spacing(theme: &Theme, name: &str) -> StyleValue {
    StyleValue::Unit(
        theme
            .spacing
            .get(name)
            .copied()
            .unwrap_or(UnitValue::new(1.0, Unit::Rem)),
    )
}

fn radius(theme: &Theme, name: &str) -> StyleValue {
    StyleValue::Unit(
        theme
            .border_radius
            .get(name)
            .copied()
            .unwrap_or(UnitValue::new(0.25, Unit::Rem)),
    )
}

fn font_size(theme: &Theme, name: &str) -> (StyleValue, StyleValue) {
    match theme.font_size.get(name) {
        Some((size, line_height)) => (
            StyleValue::Unit(*size),
            StyleValue::Unit(line_height.line_height),
        ),
        None => (
            StyleValue::unit(1.0, Unit::Rem),
            StyleValue::unit(1.5, Unit::Rem),
        ),
    }
}

fn text_sized(theme: &Theme, name: &str) -> Vec<StyleDecl> {
    let (size, line_height) = font_size(theme, name);
    vec![
        StyleDecl::new("fontSize", size),
        StyleDecl::new("lineHeight", line_height),
    ]
}

fn random_gradient(theme: &Theme) -> [RgbValue; 2] {
    let index = rand::thread_rng().gen_range(0..theme.gradient_color_stops.len());
    theme.gradient_color_stops[index]
}

fn gradient_layer(theme: &Theme, angle: u32) -> Vec<StyleDecl> {
    let gradient = random_gradient(theme);
    vec![StyleDecl::new(
        "backgroundImage",
        StyleValue::Layers {
            value: vec![keyword(&format!(
                "linear-gradient({angle}deg, {}, {})",
                rgb_to_hex(&gradient[0]),
                rgb_to_hex(&gradient[1])
            ))],
        },
    )]
}

/// Repeating SVG backgrounds as data URIs. Kept deliberately tiny; the color
/// adapts to the surrounding color mode.
pub fn background_patterns(color: &str) -> Vec<String> {
    let dots = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 1000 1000'><defs><pattern id='p' width='20' height='20' patternUnits='userSpaceOnUse'><circle cx='10' cy='10' r='1' fill='{color}'/></pattern></defs><rect width='100%' height='100%' fill='url(#p)'/></svg>"
    );
    let cross = format!(
        "<svg width='60' height='60' viewBox='0 0 60 60' xmlns='http://www.w3.org/2000/svg'><g fill='{color}'><path d='M36 34v-4h-2v4h-4v2h4v4h2v-4h4v-2h-4zM6 4V0H4v4H0v2h4v4h2V6h4V4H6z'/></g></svg>"
    );
    [dots, cross]
        .iter()
        .map(|svg| format!("data:image/svg+xml;utf8,{}", svg.replace('#', "%23")))
        .collect()
}

fn pattern_layer(color_mode: ColorMode) -> Vec<StyleDecl> {
    let color = match color_mode {
        ColorMode::Light => "rgba(0,0,0,0.2)",
        ColorMode::Dark => "rgba(255,255,255,0.2)",
    };
    let patterns = background_patterns(color);
    let index = rand::thread_rng().gen_range(0..patterns.len());
    vec![StyleDecl::new(
        "backgroundImage",
        StyleValue::Layers {
            value: vec![StyleValue::image_url(patterns[index].clone())],
        },
    )]
}

/// Style declarations for one component variant, or `None` when the table
/// has no entry for the pair.
pub fn styles(
    component: &str,
    variant: &str,
    theme: &Theme,
    color_mode: ColorMode,
) -> Option<Vec<StyleDecl>> {
    let decls = match (component, variant) {
        ("Blockquote", "base") => {
            let mut decls = vec![
                StyleDecl::new("borderLeftWidth", px(2.0)),
                StyleDecl::new("borderLeftStyle", keyword("solid")),
                StyleDecl::new("borderLeftColor", rgb(theme.color.base)),
            ];
            decls.push(StyleDecl::new("paddingLeft", spacing(theme, "4")));
            decls
        }
        ("Bold", "base") => vec![
            StyleDecl::new("color", rgb(theme.color.base)),
            StyleDecl::new("fontWeight", keyword("bold")),
        ],
        ("Box", "base") => {
            let (size, line_height) = font_size(theme, "base");
            let mut decls = vec![
                StyleDecl::new("display", keyword("flex")),
                StyleDecl::new("flexDirection", keyword("column")),
                StyleDecl::new("color", rgb(theme.color.base)),
                StyleDecl::new("fontSize", size),
                StyleDecl::new("lineHeight", line_height),
                StyleDecl::new("fontFamily", system_font()),
                StyleDecl::new("width", percent(100.0)),
            ];
            decls.extend(expand("marginHorizontal", keyword("auto")));
            decls.extend(expand("borderRadius", radius(theme, "none")));
            decls
        }
        ("Box", "columns") => vec![
            StyleDecl::new("display", keyword("flex")),
            StyleDecl::new("columnGap", spacing(theme, "6")),
        ],
        ("Box", "testimonialsContainer") => {
            let mut decls = vec![
                StyleDecl::new("display", keyword("flex")),
                StyleDecl::new("columnGap", spacing(theme, "6")),
            ];
            decls.extend(expand("padding", spacing(theme, "8")));
            decls
        }
        ("Box", "sectionContainer") => expand("padding", spacing(theme, "8")),
        ("Box", "sectionContent") => {
            let mut decls = vec![StyleDecl::new("maxWidth", px(1024.0))];
            decls.extend(expand("paddingHorizontal", spacing(theme, "8")));
            decls.extend(expand("paddingVertical", spacing(theme, "4")));
            decls
        }
        ("Box", "horizontalLinks") => vec![
            StyleDecl::new("display", keyword("flex")),
            StyleDecl::new("rowGap", spacing(theme, "8")),
            StyleDecl::new("columnGap", spacing(theme, "4")),
        ],
        ("Box", "rightAlignedNavigation") => vec![
            StyleDecl::new("display", keyword("flex")),
            StyleDecl::new("justifyContent", keyword("flex-end")),
        ],
        ("Box", "logoNav") => vec![
            StyleDecl::new("display", keyword("flex")),
            StyleDecl::new("justifyContent", keyword("space-between")),
            StyleDecl::new("alignItems", keyword("center")),
        ],
        ("Box", "card") => {
            let mut decls = vec![
                StyleDecl::new("backgroundColor", rgb(theme.background_color.base)),
                StyleDecl::new("color", rgb(theme.color.base)),
                StyleDecl::new(
                    "boxShadow",
                    keyword(&format!(
                        "0 3px 8px {}",
                        rgb_to_hex(&theme.box_shadow_color.base)
                    )),
                ),
            ];
            decls.extend(expand("borderRadius", radius(theme, "lg")));
            decls.extend(expand("padding", spacing(theme, "4")));
            decls
        }
        ("Box", "gradientVertical") => gradient_layer(theme, 180),
        ("Box", "gradient45degrees") => gradient_layer(theme, 135),
        ("Box", "withBackgroundPattern") => pattern_layer(color_mode),
        ("Button", "base") => {
            let mut decls = vec![
                StyleDecl::new("backgroundColor", rgb(theme.background_color.base)),
                StyleDecl::new("color", rgb(theme.color.base)),
                StyleDecl::new("cursor", keyword("pointer")),
            ];
            decls.extend(expand("borderWidth", px(1.0)));
            decls.push(StyleDecl::new("whiteSpace", keyword("nowrap")));
            decls.extend(expand("borderStyle", keyword("solid")));
            decls.extend(expand("borderColor", rgb(theme.background_color.base)));
            decls.extend(expand("borderRadius", radius(theme, "DEFAULT")));
            decls.extend(expand("paddingHorizontal", spacing(theme, "3")));
            decls.extend(expand("paddingVertical", spacing(theme, "2")));
            decls
        }
        ("Button", "primary") => {
            let mut decls = vec![
                StyleDecl::new("backgroundColor", rgb(theme.background_color.accent)),
                StyleDecl::new("color", rgb(theme.color.accent)),
            ];
            decls.extend(expand("borderColor", rgb(theme.background_color.accent)));
            decls
        }
        ("Button", "secondary") => {
            let mut decls = vec![
                StyleDecl::new("backgroundColor", rgb(theme.background_color.secondary)),
                StyleDecl::new("color", rgb(theme.color.secondary)),
            ];
            decls.extend(expand("borderColor", rgb(theme.background_color.secondary)));
            decls
        }
        ("Button", "outline") => {
            let mut decls = vec![StyleDecl::new("backgroundColor", rgb(RgbValue::transparent()))];
            decls.extend(expand("borderWidth", px(1.0)));
            decls.extend(expand("borderStyle", keyword("solid")));
            decls.extend(expand("borderColor", rgb(theme.color.base)));
            decls
        }
        ("Button", "round") => expand("borderRadius", StyleValue::unit(1.3, Unit::Em)),
        ("Button", "square") => expand("borderRadius", radius(theme, "none")),
        ("CodeText", "base") => {
            let mut decls = vec![
                StyleDecl::new("display", keyword("inline-block")),
                StyleDecl::new(
                    "fontFamily",
                    StyleValue::font_family(vec!["monospace".to_string()]),
                ),
                StyleDecl::new("backgroundColor", rgb(theme.background_color.secondary)),
                StyleDecl::new("color", rgb(theme.color.secondary)),
            ];
            decls.extend(expand("borderRadius", radius(theme, "DEFAULT")));
            decls
        }
        ("CodeText", "block") => {
            let mut decls = vec![StyleDecl::new("display", keyword("inline-block"))];
            decls.extend(expand("borderRadius", radius(theme, "DEFAULT")));
            decls.extend(expand("paddingHorizontal", spacing(theme, "4")));
            decls.extend(expand("paddingVertical", spacing(theme, "2")));
            decls
        }
        ("Heading", "base") => {
            let mut decls = vec![StyleDecl::new(
                "fontFamily",
                StyleValue::font_family(theme.font_family.headings.clone()),
            )];
            decls.extend(text_sized(theme, "3xl"));
            decls
        }
        ("Heading", "small") => text_sized(theme, "xl"),
        ("Heading", "medium") => text_sized(theme, "4xl"),
        ("Heading", "large") => text_sized(theme, "5xl"),
        ("Heading", "hero") => text_sized(theme, "7xl"),
        ("Image", "base") => {
            let mut decls = vec![
                StyleDecl::new("maxWidth", percent(100.0)),
                StyleDecl::new("maxHeight", percent(100.0)),
                StyleDecl::new("minWidth", px(1.0)),
            ];
            decls.extend(expand("borderRadius", radius(theme, "xl")));
            decls
        }
        ("Image", "noRounded") => expand("borderRadius", radius(theme, "none")),
        ("Image", "roundedSmall") => expand("borderRadius", radius(theme, "md")),
        ("Image", "circle") => expand("borderRadius", radius(theme, "full")),
        ("Input", "base") | ("Textarea", "base") => {
            let mut decls = vec![
                StyleDecl::new("width", percent(100.0)),
                StyleDecl::new("backgroundColor", rgb(theme.background_color.elevate)),
                StyleDecl::new("color", rgb(theme.color.elevate)),
            ];
            decls.extend(expand("borderRadius", radius(theme, "md")));
            decls.extend(expand("borderWidth", px(1.0)));
            decls.extend(expand("borderStyle", keyword("solid")));
            decls.extend(expand("borderColor", rgb(theme.background_color.elevate)));
            decls.extend(expand("paddingHorizontal", spacing(theme, "3")));
            decls.extend(expand("paddingVertical", spacing(theme, "2")));
            decls.push(StyleDecl::new("marginBottom", spacing(theme, "4")));
            decls
        }
        ("Italic", "base") => vec![StyleDecl::new("fontStyle", keyword("italic"))],
        ("Link", "base") | ("RichTextLink", "base") => vec![
            StyleDecl::new("color", rgb(theme.color.accent)),
            StyleDecl::new("textDecorationLine", keyword("none")),
        ],
        ("Link", "navLink") => {
            let mut decls = vec![StyleDecl::new("whiteSpace", keyword("nowrap"))];
            decls.extend(expand("paddingHorizontal", spacing(theme, "3")));
            decls.extend(expand("paddingVertical", spacing(theme, "2")));
            decls
        }
        ("List", "base") => {
            let mut decls = vec![StyleDecl::new("listStyleType", keyword("none"))];
            decls.extend(expand("padding", spacing(theme, "0")));
            decls
        }
        ("ListItem", "base") => vec![StyleDecl::new("listStyleType", keyword("none"))],
        ("Separator", "base") => vec![
            StyleDecl::new("backgroundColor", rgb(theme.background_color.elevate)),
            StyleDecl::new("height", px(1.0)),
        ],
        ("Text", "base") => {
            let mut decls = text_sized(theme, "base");
            decls.push(StyleDecl::new("fontFamily", system_font()));
            decls
        }
        ("Text", "subtle") => vec![StyleDecl::new("color", rgb(theme.color.muted))],
        ("Text", "small") => text_sized(theme, "sm"),
        ("Text", "medium") => text_sized(theme, "lg"),
        ("Text", "large") => text_sized(theme, "2xl"),
        _ => return None,
    };
    Some(decls)
}
