//! JSX Reader
//!
//! A minimal reader for the JSX fragments the UI stage asks the model to
//! produce: nested capitalized elements, string and `{...}` expression
//! attributes, text children. The output is a template tree; anything the
//! reader cannot make sense of fails the whole fragment.

use serde_json::Value;
use webforge_core::{EmbedTemplate, TemplateChild, TemplateInstance, TemplateProp};

use crate::error::{AppError, AppResult};

/// Parse a JSX fragment into a template.
pub fn parse(jsx: &str) -> AppResult<EmbedTemplate> {
    let mut parser = Parser {
        chars: jsx.chars().collect(),
        pos: 0,
    };
    parser.skip_whitespace();
    let nodes = parser.parse_nodes()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error("trailing content after root element"));
    }
    if !nodes
        .iter()
        .any(|node| matches!(node, TemplateChild::Instance(_)))
    {
        return Err(AppError::validation("no elements in fragment"));
    }
    Ok(nodes)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, message: &str) -> AppError {
        AppError::validation(format!("jsx: {message} at offset {}", self.pos))
    }

    fn expect(&mut self, expected: char) -> AppResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            _ => Err(self.error(&format!("expected '{expected}'"))),
        }
    }

    /// Nodes until a closing tag or the end of input.
    fn parse_nodes(&mut self) -> AppResult<Vec<TemplateChild>> {
        let mut nodes = Vec::new();
        loop {
            if self.at_end() {
                return Ok(nodes);
            }
            if self.peek() == Some('<') {
                if self.peek_at(1) == Some('/') {
                    return Ok(nodes);
                }
                nodes.push(self.parse_element()?);
            } else if self.peek() == Some('{') {
                if let Some(text) = self.parse_expression_child()? {
                    nodes.push(TemplateChild::Text { value: text });
                }
            } else {
                let text = self.parse_text();
                if !text.is_empty() {
                    nodes.push(TemplateChild::Text { value: text });
                }
            }
        }
    }

    fn parse_text(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '<' || c == '{' {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// `{"text"}` becomes a text child; other expressions are dropped.
    fn parse_expression_child(&mut self) -> AppResult<Option<String>> {
        let raw = self.parse_braced()?;
        let trimmed = raw.trim();
        if let Ok(Value::String(text)) = serde_json::from_str::<Value>(trimmed) {
            return Ok(Some(text));
        }
        Ok(None)
    }

    fn parse_element(&mut self) -> AppResult<TemplateChild> {
        self.expect('<')?;
        let component = self.parse_name()?;
        let mut instance = TemplateInstance::new(component.clone());
        let mut props: Vec<TemplateProp> = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('/') => {
                    self.pos += 1;
                    self.expect('>')?;
                    if !props.is_empty() {
                        instance.props = Some(props);
                    }
                    return Ok(TemplateChild::Instance(instance));
                }
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    props.push(self.parse_attribute()?);
                }
                _ => return Err(self.error(&format!("malformed tag <{component}"))),
            }
        }

        self.skip_whitespace();
        instance.children = self.parse_nodes()?;
        self.expect('<')?;
        self.expect('/')?;
        let closing = self.parse_name()?;
        if closing != component {
            return Err(self.error(&format!("mismatched closing tag </{closing}> for <{component}>")));
        }
        self.skip_whitespace();
        self.expect('>')?;

        if !props.is_empty() {
            instance.props = Some(props);
        }
        Ok(TemplateChild::Instance(instance))
    }

    fn parse_name(&mut self) -> AppResult<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attribute(&mut self) -> AppResult<TemplateProp> {
        let name = self.parse_name()?;
        self.skip_whitespace();
        if self.peek() != Some('=') {
            // Bare attribute is a boolean flag
            return Ok(TemplateProp::Boolean { name, value: true });
        }
        self.pos += 1;
        self.skip_whitespace();
        match self.peek() {
            Some('"') | Some('\'') => {
                let value = self.parse_string()?;
                Ok(TemplateProp::String { name, value })
            }
            Some('{') => {
                let raw = self.parse_braced()?;
                Ok(expression_prop(name, raw.trim()))
            }
            _ => Err(self.error(&format!("expected a value for attribute {name}"))),
        }
    }

    fn parse_string(&mut self) -> AppResult<String> {
        let quote = self
            .bump()
            .ok_or_else(|| self.error("unterminated string"))?;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(value);
            }
            self.pos += 1;
        }
        Err(self.error("unterminated string"))
    }

    /// Consume a balanced `{...}` block and return its inner text.
    fn parse_braced(&mut self) -> AppResult<String> {
        self.expect('{')?;
        let start = self.pos;
        let mut depth = 1usize;
        let mut in_string: Option<char> = None;
        while let Some(c) = self.peek() {
            match in_string {
                Some(quote) => {
                    if c == '\\' {
                        self.pos += 1;
                    } else if c == quote {
                        in_string = None;
                    }
                }
                None => match c {
                    '"' | '\'' => in_string = Some(c),
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            let inner = self.chars[start..self.pos].iter().collect();
                            self.pos += 1;
                            return Ok(inner);
                        }
                    }
                    _ => {}
                },
            }
            self.pos += 1;
        }
        Err(self.error("unterminated expression"))
    }
}

/// Turn a `{...}` attribute expression into a typed prop. JSON arrays of
/// strings become `string[]` props (the `variants` convention), scalars map
/// to their natural type, everything else is kept as raw JSON.
fn expression_prop(name: String, raw: &str) -> TemplateProp {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(value)) => TemplateProp::String { name, value },
        Ok(Value::Bool(value)) => TemplateProp::Boolean { name, value },
        Ok(Value::Number(number)) => TemplateProp::Number {
            name,
            value: number.as_f64().unwrap_or(0.0),
        },
        Ok(Value::Array(items))
            if !items.is_empty() && items.iter().all(|item| item.is_string()) =>
        {
            TemplateProp::StringArray {
                name,
                value: items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            }
        }
        Ok(value) => TemplateProp::Json { name, value },
        Err(_) => TemplateProp::String {
            name,
            value: raw.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_text() {
        let template = parse("<Box><Heading>Welcome</Heading><Text>hi there</Text></Box>").unwrap();
        let TemplateChild::Instance(root) = &template[0] else {
            panic!("expected instance");
        };
        assert_eq!(root.component, "Box");
        assert_eq!(root.children.len(), 2);
        let TemplateChild::Instance(heading) = &root.children[0] else {
            panic!("expected heading");
        };
        assert_eq!(
            heading.children,
            vec![TemplateChild::Text {
                value: "Welcome".to_string()
            }]
        );
    }

    #[test]
    fn parses_self_closing_with_attributes() {
        let template =
            parse(r#"<Image alt="600x400: a harbor" width={600} rounded />"#).unwrap();
        let TemplateChild::Instance(image) = &template[0] else {
            panic!("expected instance");
        };
        let props = image.props.as_deref().unwrap();
        assert_eq!(props.len(), 3);
        assert_eq!(props[0].as_str(), Some("600x400: a harbor"));
        assert!(matches!(
            props[1],
            TemplateProp::Number { value, .. } if value == 600.0
        ));
        assert!(matches!(props[2], TemplateProp::Boolean { value: true, .. }));
    }

    #[test]
    fn variants_become_string_arrays() {
        let template = parse(r#"<Button variants={["primary", "round"]}>Go</Button>"#).unwrap();
        let TemplateChild::Instance(button) = &template[0] else {
            panic!("expected instance");
        };
        match button.prop("variants") {
            Some(TemplateProp::StringArray { value, .. }) => {
                assert_eq!(value, &["primary".to_string(), "round".to_string()]);
            }
            other => panic!("expected string[] prop, got {other:?}"),
        }
    }

    #[test]
    fn string_expression_children_become_text() {
        let template = parse(r#"<Text>{"quoted"}</Text>"#).unwrap();
        let TemplateChild::Instance(text) = &template[0] else {
            panic!("expected instance");
        };
        assert_eq!(
            text.children,
            vec![TemplateChild::Text {
                value: "quoted".to_string()
            }]
        );
    }

    #[test]
    fn rejects_mismatched_tags() {
        assert!(parse("<Box><Heading></Box></Heading>").is_err());
        assert!(parse("<Box>").is_err());
        assert!(parse("plain text").is_err());
    }

    #[test]
    fn allows_sibling_roots() {
        let template = parse("<Box></Box><Box></Box>").unwrap();
        assert_eq!(template.len(), 2);
    }
}
