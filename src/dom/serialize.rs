//! Serialize a [`Dom`] back to platform markup.
//!
//! The output dialect is the subset chat platforms accept: only `&`, `<`,
//! `>` and `"` are escaped, as named entities, and everything else is written
//! raw. Lengths are counted in characters of the serialized form, which is
//! what message size ceilings are checked against.

use std::fmt::Write;

use super::arena::{Dom, NodeData, NodeId};

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose first newline is swallowed by the parser.
const NEWLINE_SENSITIVE: &[&str] = &["pre", "textarea", "listing"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Serialize the children of `id`.
pub fn inner_html(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    for child in dom.children(id) {
        write_node(dom, child, &mut out);
    }
    out
}

/// Serialize `id` itself, including its own tags.
pub fn outer_html(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

/// Serialize the whole tree.
pub fn to_html(dom: &Dom) -> String {
    inner_html(dom, dom.root())
}

fn write_node(dom: &Dom, id: NodeId, out: &mut String) {
    let Some(node) = dom.get(id) else {
        return;
    };
    match &node.data {
        NodeData::Document => {
            for child in dom.children(id) {
                write_node(dom, child, out);
            }
        }
        NodeData::Text(text) => out.push_str(&escape_text(text)),
        NodeData::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        NodeData::Element { name, attrs } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in attrs {
                let _ = write!(
                    out,
                    " {}=\"{}\"",
                    attr.local_name(),
                    escape_attr(&attr.value)
                );
            }
            out.push('>');
            if is_void_element(tag) {
                return;
            }
            if needs_leading_newline(dom, id, tag) {
                out.push('\n');
            }
            for child in dom.children(id) {
                write_node(dom, child, out);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}

fn needs_leading_newline(dom: &Dom, id: NodeId, tag: &str) -> bool {
    NEWLINE_SENSITIVE.contains(&tag)
        && dom
            .children(id)
            .next()
            .and_then(|first| dom.text_content(first))
            .is_some_and(|text| text.starts_with('\n'))
}

/// Length in characters of `outer_html(dom, id)`, computed without
/// allocating.
pub fn serialized_len(dom: &Dom, id: NodeId) -> usize {
    let Some(node) = dom.get(id) else {
        return 0;
    };
    match &node.data {
        NodeData::Document => inner_len(dom, id),
        NodeData::Text(text) => escaped_len(text),
        NodeData::Comment(text) => text.chars().count() + "<!---->".len(),
        NodeData::Element { name, attrs } => {
            let tag = name.local.as_ref();
            let tag_len = tag.chars().count();
            let attrs_len: usize = attrs
                .iter()
                .map(|a| a.local_name().chars().count() + escaped_attr_len(&a.value) + 4)
                .sum();
            let open = tag_len + attrs_len + 2;
            if is_void_element(tag) {
                return open;
            }
            let newline = usize::from(needs_leading_newline(dom, id, tag));
            open + newline + inner_len(dom, id) + tag_len + 3
        }
    }
}

/// Length in characters of `inner_html(dom, id)`.
pub fn inner_len(dom: &Dom, id: NodeId) -> usize {
    dom.children(id).map(|c| serialized_len(dom, c)).sum()
}

/// Escape text content.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape an attribute value for a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("&quot;"),
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Width of one character once escaped as text.
pub fn escaped_char_len(c: char) -> usize {
    match c {
        '&' => 5,
        '<' | '>' => 4,
        _ => 1,
    }
}

/// Width of a string once escaped as text.
pub fn escaped_len(s: &str) -> usize {
    s.chars().map(escaped_char_len).sum()
}

fn escaped_attr_len(s: &str) -> usize {
    s.chars()
        .map(|c| if c == '"' { 6 } else { escaped_char_len(c) })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Attribute, parse_html};

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_text("\"quoted\""), "\"quoted\"");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("a\"b&c"), "a&quot;b&amp;c");
    }

    #[test]
    fn test_void_elements_have_no_close_tag() {
        let mut dom = Dom::new();
        let img = dom.create_html_element("img", vec![Attribute::new("src", "x.jpg")]);
        dom.append(dom.root(), img);
        assert_eq!(to_html(&dom), r#"<img src="x.jpg">"#);
    }

    #[test]
    fn test_serialized_len_matches_output() {
        let dom = parse_html(
            r#"<p>Tom &amp; <b title="a&quot;b">Jerry</b><br><pre>
line</pre><!-- note --></p>"#,
        );
        let body = dom.content_root();
        let html = inner_html(&dom, body);
        assert_eq!(inner_len(&dom, body), html.chars().count());
        for id in dom.descendants(body) {
            assert_eq!(serialized_len(&dom, id), outer_html(&dom, id).chars().count());
        }
    }

    #[test]
    fn test_pre_leading_newline_survives_reparse() {
        let dom = parse_html("<pre>\n\ncode</pre>");
        let once = inner_html(&dom, dom.content_root());
        let again = parse_html(&once);
        assert_eq!(inner_html(&again, again.content_root()), once);
    }

    #[test]
    fn test_non_ascii_counts_characters() {
        assert_eq!(escaped_len("привет"), 6);
        assert_eq!(escaped_len("a&b"), 7);
    }
}
