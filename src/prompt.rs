//! Prompt Formatting
//!
//! `{key}` substitution into the static stage prompt templates. Values are
//! backtick-escaped so model-facing markdown fences survive interpolation;
//! placeholders without a matching variable are left untouched.

use std::collections::HashMap;

/// Replace each `{key}` placeholder with its variable value.
pub fn format_prompt(vars: &HashMap<String, String>, template: &str) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{key}}}");
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, &value.replace('`', "\\`"));
        }
    }
    out
}

/// Theme stage: palette, gradients and font stacks as raw JSON.
pub const THEME_TEMPLATE: &str = r#"You are a design assistant for a visual website builder.

Your task is to create a color theme for the following project:

```
{request}
```

Produce a theme object of this exact shape:

```typescript
type ThemeRaw = {types};
```

## Strict Rules

- Colors are hex strings. Use an 8 digit hex value only when transparency is required.
- Every color group uses all seven scale names.
- Pick font stacks that are widely available and fit the project tone.
- Do not include fontSize, borderRadius or spacing. Those come from the design system.

Respond with a valid JSON object. Start with ```json
"#;

/// The raw theme shape embedded in the theme prompt.
pub const THEME_TYPES: &str = r#"{
  backgroundColor: Record<"base" | "elevate" | "primary" | "secondary" | "accent" | "muted" | "destructive", HexColor>;
  color: Record<"base" | "elevate" | "primary" | "secondary" | "accent" | "muted" | "destructive", HexColor>;
  border: Record<"base" | "elevate" | "primary" | "secondary" | "accent" | "muted" | "destructive", HexColor>;
  boxShadowColor: Record<"base" | "elevate" | "primary" | "secondary" | "accent" | "muted" | "destructive", HexColor>;
  gradientColorStops: [[HexColor, HexColor], [HexColor, HexColor], [HexColor, HexColor]];
  fontFamily: { base: string[]; headings: string[] };
}"#;

/// Sections stage: break the request into page sections.
pub const SECTIONS_TEMPLATE: &str = r#"You are planning the structure of a web page for the following project:

```
{request}
```

Decide whether the request describes a full page. If it does, list the sections the page needs, top to bottom, each as a short self-contained description that a designer could work from without seeing the others.

Respond with a valid JSON object of this shape:

```typescript
type Response = {
  type: "full-page";
  subject: string;
  sections: string[];
};
```

If the request is not about a full page respond with `{ "type": "other" }`.

Respond with a valid JSON object. Start with ```json
"#;

/// Per-section user prompt assembled by the sections chain.
pub const SECTION_PROMPT_TEMPLATE: &str = "We are working on the following project:\n{subject}.\n\nAt this stage we want you to create the following part of the UI:\n{section}";

/// UI stage system prompt: available components and the raw theme.
pub const UI_SYSTEM_TEMPLATE: &str = r#"You are a user interface designer working inside a visual website builder.

You build interfaces exclusively with the following components. Where a component lists variants you may pick any of them with a `variants` prop, for example `variants={["primary"]}`:

{components}

The design follows this theme:

```json
{theme}
```

## Strict Rules

- Respond with JSX only, using exclusively the components above. No imports, no scripts, no event handlers.
- Express styling only through variants. Never write inline styles or class names.
- For every Image set an `alt` prop describing the picture, prefixed with the intended size, for example `alt="600x400: a lighthouse at dusk"`.
- Produce complete, self-contained markup for the requested section only.

Respond with a single JSX fragment. Start with ```jsx
"#;

/// UI stage user prompt.
pub const UI_USER_TEMPLATE: &str = "{request}";

/// Customize stage system prompt: token overrides from the theme.
pub const CUSTOMIZE_SYSTEM_TEMPLATE: &str = r#"You are given a comma separated list of CSS token names and a customization request.

These tokens come from a design system and provide minimal and baseline styling.

Your task is to interpret the user request and write overriding CSS tokens to customize some of the baseline styles ignoring those who don't need overrides or are primarily about layout.

To do so you will reference values in the following theme:

```typescript
type Theme = {theme} as const;
```

and represent the overrides as a custom JSON format:

```typescript
type InputCSSClassName = string;
type CSSPropertyName = {customizableProperties};

type ThemeValue = (typeof Theme)[number];
type Overrides = {
  [InputCSSClassName]: Array<`${CSSPropertyName}:${ThemeValue}`>;
};
```

Example input:

```
Button,Navigation Link,Heading,Image,Padding
```

Example output response:

```json
{
  "Button": [
    "backgroundColor:backgroundColor.base",
    "color:color.base",
    "borderRadius:borderRadius.md"
  ],
  "Heading": ["fontSize:fontSize.3xl", "color:color.accent"],
  "Image": ["borderRadius:borderRadius.md"],
  "Navigation Link": ["color:color.accent"]
}
```

## Strict Rules

- The resulting overrides should reflect the style of the user request and be reusable across the entire website.
- Only the CSSPropertyNames in the types can be overriden.
- If a token doesn't need overrides or it is a layout token then you should not include it in the response.
- The overridden values can only be the ones in the theme above. You cannot invent new ones.

Respond with a valid JSON object. Start with ```json
"#;

/// Customize stage user prompt: the token list then the request.
pub const CUSTOMIZE_USER_TEMPLATE: &str = "```\n{tokens}\n```\n\n{request}";

/// Tweak stage system prompt: edit the selected instance with transform
/// operations.
pub const TWEAK_SYSTEM_TEMPLATE: &str = r#"You are editing an existing user interface inside a visual website builder.

The available components are:

{components}

The user selected the following element and its subtree, in color mode "{colorMode}":

```json
{selectedInstance}
```

Interpret the edit request and respond with a list of transform operations of this shape:

```typescript
type Operation =
  | { op: "set_prop"; component?: string; name: string; value: string | number | boolean }
  | { op: "remove_prop"; component?: string; name: string }
  | { op: "set_style"; component?: string; property: string; value: StyleValue }
  | { op: "remove_style"; component?: string; property: string }
  | { op: "set_text"; component?: string; value: string };
```

## Strict Rules

- When `component` is present the operation applies to every instance of that component in the subtree, otherwise to the root of the selection.
- Only use components, props and CSS properties that already make sense for the selection.
- Never invent operations outside the list above.

Respond with a valid JSON array. Start with ```json
"#;
