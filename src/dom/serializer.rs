//! `OuterHtml`/`Html`/`Text` serialization. Grounded on the
//! shape of `markup5ever::serialize::Serializer`, simplified to a direct
//! recursive writer since we never need to serialize anything but our
//! own `Handle` tree.

use std::fmt::Write;

use crate::dom::node::{Handle, NodeData};
use crate::dom::settings::OutputSettings;
use crate::dom::tag::is_void_element;
use crate::entity;

/// Writes `node`'s outer HTML (the node itself plus descendants) to `out`.
pub fn serialize_outer(out: &mut String, node: &Handle, settings: &OutputSettings) {
    serialize_node(out, node, settings, 0);
}

/// Writes only `node`'s children's HTML, skipping `node` itself — used for
/// `Document`/fragment roots and for `Element::Html()` (inner HTML).
pub fn serialize_inner(out: &mut String, node: &Handle, settings: &OutputSettings) {
    for child in node.children.borrow().iter() {
        serialize_node(out, child, settings, 0);
    }
}

fn indent(out: &mut String, settings: &OutputSettings, depth: usize) {
    if settings.pretty_print && depth > 0 {
        out.push('\n');
        for _ in 0..depth * settings.indent_amount {
            out.push(' ');
        }
    }
}

/// Elements whose content model means pretty-printing must not insert
/// whitespace around their text (it would change what they mean).
fn is_whitespace_sensitive(name: &str) -> bool {
    matches!(name, "pre" | "textarea" | "script" | "style" | "title")
}

fn serialize_node(out: &mut String, node: &Handle, settings: &OutputSettings, depth: usize) {
    match &node.data {
        NodeData::Document { .. } => {
            for child in node.children.borrow().iter() {
                serialize_node(out, child, settings, depth);
            }
        }
        NodeData::DocumentType {
            name,
            public_id,
            system_id,
        } => {
            indent(out, settings, depth);
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            if !public_id.is_empty() {
                let _ = write!(out, " PUBLIC \"{}\"", public_id);
                if !system_id.is_empty() {
                    let _ = write!(out, " \"{}\"", system_id);
                }
            } else if !system_id.is_empty() {
                let _ = write!(out, " SYSTEM \"{}\"", system_id);
            }
            out.push('>');
        }
        NodeData::XmlDeclaration { version, encoding } => {
            let _ = write!(out, "<?xml version=\"{}\"", version);
            if let Some(enc) = encoding {
                let _ = write!(out, " encoding=\"{}\"", enc);
            }
            out.push_str("?>");
        }
        NodeData::Comment(text) => {
            indent(out, settings, depth);
            let _ = write!(out, "<!--{}-->", text.borrow());
        }
        NodeData::TextNode(text) => {
            let parent_raw = node
                .parent_node()
                .and_then(|p| p.tag())
                .map(|t| is_whitespace_sensitive(t.as_str()))
                .unwrap_or(false);
            if !parent_raw {
                indent(out, settings, depth);
            }
            escape_text(out, &text.borrow(), settings);
        }
        NodeData::DataNode(text) => {
            out.push_str(&text.borrow());
        }
        NodeData::CDataNode(text) => {
            out.push_str("<![CDATA[");
            out.push_str(&text.borrow());
            out.push_str("]]>");
        }
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            indent(out, settings, depth);
            let tag = name.as_str();
            out.push('<');
            out.push_str(tag);
            for attr in attrs.borrow().iter() {
                out.push(' ');
                out.push_str(&attr.key);
                let bare = attrs.borrow().is_boolean(&attr.key)
                    && (attr.value.is_empty() || attr.value.eq_ignore_ascii_case(&attr.key));
                if !bare {
                    out.push_str("=\"");
                    escape_text(out, &attr.value, settings);
                    out.push('"');
                }
            }
            if is_void_element(tag) {
                out.push_str(if settings.syntax_xml { " />" } else { ">" });
                return;
            }
            out.push('>');

            let whitespace_sensitive = is_whitespace_sensitive(tag);
            if let Some(contents) = template_contents {
                for child in contents.children.borrow().iter() {
                    serialize_node(out, child, settings, depth + 1);
                }
            } else {
                for child in node.children.borrow().iter() {
                    serialize_node(
                        out,
                        child,
                        settings,
                        if whitespace_sensitive { 0 } else { depth + 1 },
                    );
                }
            }
            if !whitespace_sensitive && !node.children.borrow().is_empty() {
                indent(out, settings, depth);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_text(out: &mut String, text: &str, settings: &OutputSettings) {
    for c in text.chars() {
        match entity::escape_name(c as u32, settings.escape_mode) {
            Some(name) => {
                out.push('&');
                out.push_str(name);
                out.push(';');
            }
            None => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::attributes::Attributes;
    use crate::dom::node::new_node;
    use crate::dom::tag::Tag;
    use crate::error::Position;
    use std::cell::{Cell, RefCell};
    use tendril::StrTendril;

    fn elem(name: &str) -> Handle {
        new_node(
            NodeData::Element {
                name: Tag::new(name),
                attrs: RefCell::new(Attributes::new()),
                template_contents: None,
                script_already_started: Cell::new(false),
            },
            Position::UNTRACKED,
        )
    }

    fn text(s: &str) -> Handle {
        new_node(
            NodeData::TextNode(RefCell::new(StrTendril::from(s))),
            Position::UNTRACKED,
        )
    }

    #[test]
    fn escapes_ampersand_and_lt_in_text() {
        let p = elem("p");
        crate::dom::node::append(&p, text("a & b < c"));
        let mut out = String::new();
        let settings = OutputSettings {
            pretty_print: false,
            ..OutputSettings::default()
        };
        serialize_outer(&mut out, &p, &settings);
        assert_eq!(out, "<p>a &amp; b &lt; c</p>");
    }

    #[test]
    fn boolean_attribute_serializes_without_a_value() {
        let input = elem("input");
        input.attrs_mut().unwrap().put("disabled", "");
        input.attrs_mut().unwrap().put("type", "text");
        let mut out = String::new();
        serialize_outer(
            &mut out,
            &input,
            &OutputSettings {
                pretty_print: false,
                ..OutputSettings::default()
            },
        );
        assert_eq!(out, "<input disabled type=\"text\">");
    }

    #[test]
    fn void_element_has_no_closing_tag() {
        let br = elem("br");
        let mut out = String::new();
        serialize_outer(
            &mut out,
            &br,
            &OutputSettings {
                pretty_print: false,
                ..OutputSettings::default()
            },
        );
        assert_eq!(out, "<br>");
    }
}
