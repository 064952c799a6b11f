//! Image Resolution
//!
//! Generated templates describe pictures through their `alt` prop using a
//! `"400x300: a lighthouse at dusk"` convention. This module collects those
//! descriptions, turns each into a stock photo URL, and writes the URLs back
//! into the template.

use webforge_core::{
    for_each_instance, for_each_instance_mut, EmbedTemplate, TemplateProp,
};

const STOCK_PHOTO_BASE: &str = "https://source.unsplash.com/random/";
const FALLBACK_SIZE: u32 = 250;

fn alt_description(props: &[TemplateProp]) -> Option<(usize, String)> {
    props.iter().enumerate().find_map(|(index, prop)| match prop {
        TemplateProp::String { name, value } if name == "alt" && !value.trim().is_empty() => {
            Some((index, value.clone()))
        }
        _ => None,
    })
}

/// Collect every non-empty `alt` description, in traversal order.
pub fn collect_descriptions(template: &EmbedTemplate) -> Vec<String> {
    let mut descriptions = Vec::new();
    for_each_instance(template, &mut |instance| {
        if let Some((_, description)) = instance.props.as_deref().and_then(alt_description) {
            descriptions.push(description);
        }
    });
    descriptions
}

/// Split a `"WxH: text"` description into its size prefix and query text.
/// Descriptions without a size prefix keep the full text as query.
fn split_description(description: &str) -> (Option<(u32, u32)>, &str) {
    if let Some(colon) = description.find(':') {
        let size = &description[..colon];
        if let Some((w, h)) = size.split_once('x') {
            if let (Ok(width), Ok(height)) = (w.trim().parse(), h.trim().parse()) {
                return (Some((width, height)), description[colon + 1..].trim_start());
            }
        }
    }
    (None, description)
}

fn encode_query(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// Build one stock photo URL per description.
pub fn generate_image_urls(descriptions: &[String]) -> Vec<String> {
    descriptions
        .iter()
        .map(|description| match split_description(description) {
            (Some((width, height)), query) => format!(
                "{STOCK_PHOTO_BASE}?{}&w={width}&h={height}",
                encode_query(query)
            ),
            (None, query) => format!(
                "{STOCK_PHOTO_BASE}?{}&w={FALLBACK_SIZE}&h={FALLBACK_SIZE}",
                encode_query(query)
            ),
        })
        .collect()
}

/// Rewrite each matching `alt` to the bare description and append a `src`
/// prop with the resolved URL. Descriptions without a resolved URL are left
/// alone.
pub fn insert_image_urls(template: &mut EmbedTemplate, descriptions: &[String], urls: &[String]) {
    for_each_instance_mut(template, &mut |instance| {
        let Some(props) = instance.props.as_mut() else {
            return;
        };
        let Some((alt_index, description)) = alt_description(props) else {
            return;
        };
        let Some(position) = descriptions.iter().position(|d| d == &description) else {
            return;
        };
        let Some(url) = urls.get(position) else {
            return;
        };

        let (_, bare) = split_description(&description);
        props[alt_index] = TemplateProp::String {
            name: "alt".to_string(),
            value: bare.to_string(),
        };
        props.push(TemplateProp::String {
            name: "src".to_string(),
            value: url.clone(),
        });
    });
}
