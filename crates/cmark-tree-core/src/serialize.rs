//! Element tree serialization
//!
//! Converts an element tree into HTML or XHTML text.

use crate::escape::{escape_attribute, escape_cdata};
use crate::options::OutputFormat;
use crate::tree::{Element, Text};
use crate::utilities::is_void;
use crate::{Error, Result};

/// Serialize an element, including its tail, to a string
pub fn serialize(element: &Element, format: OutputFormat) -> String {
    let mut output = String::with_capacity(4096);
    serialize_element(element, format, &mut output);
    output
}

fn serialize_element(element: &Element, format: OutputFormat, out: &mut String) {
    if element.is_unsafe() {
        // raw markup: written verbatim, never as an empty tag
        if let Some(text) = &element.text {
            for span in text.spans() {
                out.push_str(&span.value);
            }
        }
    } else {
        serialize_tag(element, format, out);
    }

    if let Some(tail) = &element.tail {
        serialize_text(tail, out);
    }
}

fn serialize_tag(element: &Element, format: OutputFormat, out: &mut String) {
    let tag = element.tag.as_str();
    let void = is_void(tag);

    out.push('<');
    out.push_str(tag);

    let mut attrs: Vec<_> = element.attrs.iter().collect();
    attrs.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }

    let has_text = element.text.as_ref().is_some_and(|t| !t.is_empty());
    if !has_text && element.children.is_empty() && void {
        match format {
            OutputFormat::Xhtml => out.push_str(" />"),
            OutputFormat::Html => out.push('>'),
        }
        return;
    }

    out.push('>');
    if let Some(text) = &element.text {
        serialize_text(text, out);
    }
    for child in &element.children {
        serialize_element(child, format, out);
    }
    if !void {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

fn serialize_text(text: &Text, out: &mut String) {
    for span in text.spans() {
        if span.escaped {
            out.push_str(&span.value);
        } else {
            out.push_str(&escape_cdata(&span.value));
        }
    }
}

/// Remove the start and end tags of the wrapper element from serialized
/// output, keeping its inner content (trimmed).
///
/// An empty self-closed wrapper yields an empty string. Any other output
/// that lacks the wrapper tags is an error.
pub fn strip_root(output: &str, tag: &str) -> Result<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let start = output.find(&open).map(|i| i + open.len());
    let end = output.rfind(&close);

    match (start, end) {
        (Some(start), Some(end)) if start <= end => Ok(output[start..end].trim().to_string()),
        _ if output.trim().ends_with(&format!("<{} />", tag)) => Ok(String::new()),
        _ => Err(Error::MalformedTree {
            tag: tag.to_string(),
            output: output.trim().to_string(),
        }),
    }
}
