// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The insertion-mode rules themselves: one method per `InsertionMode`
//! variant, applying the WHATWG tree-construction algorithm token by
//! token.

use crate::dom::attributes::Attributes;
use crate::dom::tag::{self, Tag as DomTag};
use crate::tokenizer::{TagKind, Token};

use super::stack;
use super::types::InsertionMode;
use super::{Step, TreeBuilder};

fn is_ws_only(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_whitespace())
}

/// Splits `s` at the first non-whitespace character, so callers can
/// handle a leading whitespace run differently from the rest of a
/// character token (several insertion modes only special-case whitespace).
fn split_leading_ws(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

const CLOSES_P_ON_OPEN: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "form", "header", "hgroup", "main",
    "menu", "nav", "ol", "p", "section", "summary", "ul", "pre", "listing", "hr", "h1", "h2",
    "h3", "h4", "h5", "h6",
];

impl TreeBuilder {
    // ---------------------------------------------------------------- §1

    pub(super) fn mode_initial(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) if is_ws_only(s) => Step::Done,
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(ref d) => {
                self.insert_doctype(d);
                self.derive_quirks_mode(d);
                self.mode = InsertionMode::BeforeHtml;
                Step::Done
            }
            other => {
                self.derive_quirks_mode(&crate::tokenizer::Doctype::default());
                self.mode = InsertionMode::BeforeHtml;
                Step::Reprocess(other)
            }
        }
    }

    pub(super) fn mode_before_html(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) if is_ws_only(s) => Step::Done,
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed before html");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.insert_html_element(t);
                self.mode = InsertionMode::BeforeHead;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && !matches!(&*t.name, "head" | "body" | "html" | "br") =>
            {
                self.error("unexpected end tag before html");
                Step::Done
            }
            other => {
                let html = self.create_element(DomTag::new("html"), Attributes::new());
                crate::dom::node::append(&self.document.clone(), html.clone());
                self.open_elements.push(html);
                self.mode = InsertionMode::BeforeHead;
                Step::Reprocess(other)
            }
        }
    }

    pub(super) fn mode_before_head(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) if is_ws_only(s) => Step::Done,
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "head" => {
                let el = self.insert_html_element(t);
                self.head_element = Some(el);
                self.mode = InsertionMode::InHead;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && !matches!(&*t.name, "head" | "body" | "html" | "br") =>
            {
                self.error("unexpected end tag");
                Step::Done
            }
            other => {
                let el = self.insert_html_element(&Self::synthetic_tag("head"));
                self.head_element = Some(el);
                self.mode = InsertionMode::InHead;
                Step::Reprocess(other)
            }
        }
    }

    pub(super) fn mode_in_head(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) => {
                let (ws, rest) = split_leading_ws(s);
                if !ws.is_empty() {
                    self.insert_text(ws);
                }
                if rest.is_empty() {
                    Step::Done
                } else {
                    self.close_head_and_reprocess(Token::CharacterToken(
                        tendril::StrTendril::from(rest),
                    ))
                }
            }
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(&*t.name, "base" | "basefont" | "bgsound" | "link" | "meta") =>
            {
                self.insert_and_pop(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "title" => {
                self.use_text_mode(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "noscript" => {
                self.insert_html_element(t);
                self.mode = InsertionMode::InHeadNoscript;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "noframes" | "style") =>
            {
                self.use_text_mode(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "script" => {
                self.use_text_mode(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "template" => {
                // No separate "in template" insertion-mode stack: template
                // contents are parsed as ordinary head content, which is
                // adequate for a non-executing, non-shadow-including parser.
                self.insert_html_element(t);
                self.push_formatting_marker();
                self.frameset_ok = false;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "head" => {
                self.open_elements.pop();
                self.mode = InsertionMode::AfterHead;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag && !matches!(&*t.name, "body" | "html" | "br") =>
            {
                self.error("unexpected end tag in head");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "head" => {
                self.error("unexpected head start tag");
                Step::Done
            }
            other => self.close_head_and_reprocess(other),
        }
    }

    fn close_head_and_reprocess(&mut self, other: Token) -> Step {
        self.open_elements.pop();
        self.mode = InsertionMode::AfterHead;
        Step::Reprocess(other)
    }

    pub(super) fn mode_in_head_noscript(&mut self, tok: Token) -> Step {
        match tok {
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "noscript" => {
                self.open_elements.pop();
                self.mode = InsertionMode::InHead;
                Step::Done
            }
            Token::CharacterToken(ref s) if is_ws_only(s) => self.mode_in_head(tok),
            Token::CommentToken(_) => self.mode_in_head(tok),
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(
                        &*t.name,
                        "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                    ) =>
            {
                self.mode_in_head(tok)
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag && !matches!(&*t.name, "br") =>
            {
                self.error("unexpected end tag");
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "head" | "noscript") =>
            {
                self.error("unexpected start tag");
                Step::Done
            }
            other => {
                self.error("unexpected token in noscript");
                self.open_elements.pop();
                self.mode = InsertionMode::InHead;
                Step::Reprocess(other)
            }
        }
    }

    pub(super) fn mode_after_head(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) => {
                let (ws, rest) = split_leading_ws(s);
                if !ws.is_empty() {
                    self.insert_text(ws);
                }
                if rest.is_empty() {
                    Step::Done
                } else {
                    self.open_body_and_reprocess(Token::CharacterToken(tendril::StrTendril::from(
                        rest,
                    )))
                }
            }
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "body" => {
                self.insert_html_element(t);
                self.frameset_ok = false;
                self.mode = InsertionMode::InBody;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "frameset" => {
                self.insert_html_element(t);
                self.mode = InsertionMode::InFrameset;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(
                        &*t.name,
                        "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                            | "style" | "template" | "title"
                    ) =>
            {
                self.error("content only valid in head, reopening");
                if let Some(head) = self.head_element.clone() {
                    self.open_elements.push(head);
                    let step = self.mode_in_head(tok);
                    self.open_elements.pop();
                    step
                } else {
                    Step::Done
                }
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "template" => {
                self.mode_in_head(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "head" => {
                self.error("unexpected head start tag");
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag && !matches!(&*t.name, "body" | "html" | "br") =>
            {
                self.error("unexpected end tag");
                Step::Done
            }
            other => self.open_body_and_reprocess(other),
        }
    }

    fn open_body_and_reprocess(&mut self, other: Token) -> Step {
        self.insert_html_element(&Self::synthetic_tag("body"));
        self.frameset_ok = true;
        self.mode = InsertionMode::InBody;
        Step::Reprocess(other)
    }

    // ------------------------------------------------------------- InBody

    pub(super) fn mode_in_body(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) => {
                if s.contains('\u{0}') {
                    // already filtered at the tokenizer layer; defensive only
                }
                self.reconstruct_active_formatting_elements();
                self.insert_text(s);
                if !is_ws_only(s) {
                    self.frameset_ok = false;
                }
                Step::Done
            }
            Token::NullCharacterToken => Step::Done,
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::EofToken => {
                self.done = true;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.error("unexpected html start tag");
                if let Some(root) = self.open_elements.iter().next().cloned() {
                    self.add_missing_attributes(&root, t);
                }
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(
                        &*t.name,
                        "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                            | "style" | "template" | "title"
                    ) =>
            {
                self.mode_in_head(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "template" => {
                self.mode_in_head(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "body" => {
                self.error("unexpected body start tag");
                if let Some(body) = self.open_elements.iter().nth(1).cloned() {
                    self.add_missing_attributes(&body, t);
                }
                self.frameset_ok = false;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "frameset" => {
                if self.frameset_ok && self.open_elements.len() >= 2 {
                    self.insert_html_element(t);
                    self.mode = InsertionMode::InFrameset;
                } else {
                    self.error("frameset not allowed here");
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && CLOSES_P_ON_OPEN.contains(&&*t.name) => {
                self.close_p_if_in_button_scope();
                if HEADING_TAGS.contains(&&*t.name) {
                    if let Some(cur) = self.current_node() {
                        if let Some(tag) = cur.tag() {
                            if HEADING_TAGS.contains(&tag.as_str()) {
                                self.open_elements.pop();
                            }
                        }
                    }
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "form" => {
                if self.form_element.is_some() {
                    self.error("nested forms are not allowed");
                } else {
                    self.close_p_if_in_button_scope();
                    let el = self.insert_html_element(t);
                    self.form_element = Some(el);
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && matches!(&*t.name, "li" | "dd" | "dt") => {
                self.frameset_ok = false;
                let is_li = &*t.name == "li";
                let stop_names: &[&str] = if is_li { &["li"] } else { &["dd", "dt"] };
                for i in (0..self.open_elements.len()).rev() {
                    let node = self.open_elements.get(i).clone();
                    let Some(tag) = node.tag() else { break };
                    let name = tag.as_str();
                    if stop_names.contains(&name) {
                        self.generate_implied_end_tags(Some(name));
                        self.open_elements.pop_until(name);
                        break;
                    }
                    if tag::is_special(name) && !matches!(name, "address" | "div" | "p") {
                        break;
                    }
                }
                self.close_p_if_in_button_scope();
                self.insert_html_element(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "plaintext" => {
                self.close_p_if_in_button_scope();
                self.insert_html_element(t);
                self.tokenizer.switch_to(crate::tokenizer::states::Plaintext);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "button" => {
                if self
                    .open_elements
                    .in_scope("button", stack::is_default_scope_boundary)
                {
                    self.error("nested button");
                    self.generate_implied_end_tags(None);
                    self.open_elements.pop_until("button");
                }
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                self.frameset_ok = false;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && tag::is_formatting(&t.name) =>
            {
                if &*t.name == "a" {
                    if let Some((_, existing, _)) = self.find_in_active_formatting("a") {
                        if self.open_elements.position_of(&existing).is_some() {
                            self.error("nested anchor tag");
                            self.run_adoption_agency("a");
                            self.remove_from_active_formatting(&existing);
                        }
                    }
                }
                if &*t.name == "nobr"
                    && self
                        .open_elements
                        .in_scope("nobr", stack::is_default_scope_boundary)
                {
                    self.run_adoption_agency("nobr");
                    self.reconstruct_active_formatting_elements();
                }
                self.reconstruct_active_formatting_elements();
                let el = self.insert_html_element(t);
                self.push_formatting_element(el, t.clone());
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "applet" | "marquee" | "object") =>
            {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                self.push_formatting_marker();
                self.frameset_ok = false;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag && matches!(&*t.name, "applet" | "marquee" | "object") =>
            {
                if self
                    .open_elements
                    .in_scope(&t.name, stack::is_default_scope_boundary)
                {
                    self.generate_implied_end_tags(None);
                    self.open_elements.pop_until(&t.name);
                    self.clear_active_formatting_to_last_marker();
                } else {
                    self.error("unmatched end tag");
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "table" => {
                self.close_p_if_in_button_scope();
                self.insert_html_element(t);
                self.frameset_ok = false;
                self.foster_parenting = true;
                self.mode = InsertionMode::InTable;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(&*t.name, "area" | "br" | "embed" | "img" | "keygen" | "wbr") =>
            {
                self.reconstruct_active_formatting_elements();
                self.insert_and_pop(t);
                self.frameset_ok = false;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "input" => {
                self.reconstruct_active_formatting_elements();
                self.insert_and_pop(t);
                let is_hidden = t
                    .attrs
                    .iter()
                    .any(|a| a.name.eq_ignore_ascii_case("type") && a.value.eq_ignore_ascii_case("hidden"));
                if !is_hidden {
                    self.frameset_ok = false;
                }
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "param" | "source" | "track") =>
            {
                self.insert_and_pop(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "hr" => {
                self.close_p_if_in_button_scope();
                self.insert_and_pop(t);
                self.frameset_ok = false;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "textarea" => {
                self.use_text_mode(t);
                self.frameset_ok = false;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "xmp" | "iframe" | "noembed") =>
            {
                self.close_p_if_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.use_text_mode(t);
                self.frameset_ok = false;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "select" => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                self.frameset_ok = false;
                self.mode = match self.mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "optgroup" | "option") =>
            {
                if self.current_node().map(|c| c.tag_name_is("option")).unwrap_or(false) {
                    self.open_elements.pop();
                }
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "rb" | "rtc") =>
            {
                if self.open_elements.in_scope("ruby", stack::is_default_scope_boundary) {
                    self.generate_implied_end_tags(None);
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "rp" | "rt") =>
            {
                if self.open_elements.in_scope("ruby", stack::is_default_scope_boundary) {
                    self.generate_implied_end_tags(Some("rtc"));
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "body" => {
                if self
                    .open_elements
                    .in_scope("body", stack::is_default_scope_boundary)
                {
                    self.mode = InsertionMode::AfterBody;
                } else {
                    self.error("no body element in scope");
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "html" => {
                if self
                    .open_elements
                    .in_scope("body", stack::is_default_scope_boundary)
                {
                    self.mode = InsertionMode::AfterBody;
                    Step::Reprocess(tok)
                } else {
                    self.error("no body element in scope");
                    Step::Done
                }
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "p" => {
                if !self
                    .open_elements
                    .in_scope("p", stack::is_button_scope_boundary)
                {
                    self.error("no p element in button scope");
                    self.insert_html_element(&Self::synthetic_tag("p"));
                }
                self.generate_implied_end_tags(Some("p"));
                self.open_elements.pop_until("p");
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag && matches!(&*t.name, "li" | "dd" | "dt") =>
            {
                let boundary = if &*t.name == "li" {
                    stack::is_list_item_scope_boundary
                } else {
                    stack::is_default_scope_boundary
                };
                if self.open_elements.in_scope(&t.name, boundary) {
                    self.generate_implied_end_tags(Some(&t.name));
                    self.open_elements.pop_until(&t.name);
                } else {
                    self.error("no matching list item in scope");
                }
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag && HEADING_TAGS.contains(&&*t.name) =>
            {
                if self
                    .open_elements
                    .in_scope_any(HEADING_TAGS, stack::is_default_scope_boundary)
                {
                    self.generate_implied_end_tags(None);
                    while let Some(top) = self.current_node() {
                        let is_heading = top.tag().map(|t| HEADING_TAGS.contains(&t.as_str())).unwrap_or(false);
                        self.open_elements.pop();
                        if is_heading {
                            break;
                        }
                    }
                } else {
                    self.error("no heading in scope");
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "form" => {
                let node = self.form_element.take();
                match node {
                    Some(form) if self.open_elements.position_of(&form).is_some() => {
                        self.generate_implied_end_tags(None);
                        if let Some((idx, _)) = self
                            .open_elements
                            .iter()
                            .enumerate()
                            .find(|(_, h)| crate::dom::node::Handle::ptr_eq(h, &form))
                        {
                            self.open_elements.truncate_to(idx);
                        }
                    }
                    _ => self.error("no matching form in scope"),
                }
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag && tag::is_formatting(&t.name) =>
            {
                self.run_adoption_agency(&t.name);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "br" => {
                self.error("end tag br treated as start tag");
                self.reconstruct_active_formatting_elements();
                self.insert_and_pop(&Self::synthetic_tag("br"));
                self.frameset_ok = false;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag => {
                self.close_via_any_other_end_tag(&t.name);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && matches!(&*t.name, "math" | "svg") => {
                // Permissive "preserve as written" handling
                // §1's non-goal of full namespace-aware foreign content:
                // the subtree is still built, just without MathML/SVG
                // adjustment of attribute/tag casing.
                self.reconstruct_active_formatting_elements();
                if t.self_closing {
                    self.insert_and_pop(t);
                } else {
                    self.insert_html_element(t);
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag => {
                self.reconstruct_active_formatting_elements();
                self.insert_html_element(t);
                Step::Done
            }
        }
    }

    // -------------------------------------------------------------- Text

    pub(super) fn mode_text(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) => {
                self.insert_text(s);
                Step::Done
            }
            Token::NullCharacterToken => Step::Done,
            Token::TagToken(ref t) if t.kind == TagKind::EndTag => {
                self.open_elements.pop();
                self.mode = self.original_mode;
                Step::Done
            }
            Token::EofToken => {
                self.error("eof in text mode");
                self.open_elements.pop();
                self.mode = self.original_mode;
                Step::Reprocess(tok)
            }
            _ => Step::Done,
        }
    }

    // ------------------------------------------------------------ InTable

    pub(super) fn mode_in_table(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(_)
                if self
                    .current_node()
                    .and_then(|n| n.tag())
                    .map(|t| matches!(t.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr"))
                    .unwrap_or(false) =>
            {
                self.pending_table_text.clear();
                self.original_mode = self.mode;
                self.mode = InsertionMode::InTableText;
                Step::Reprocess(tok)
            }
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "caption" => {
                self.clear_stack_back_to_table_context();
                self.push_formatting_marker();
                self.insert_html_element(t);
                self.mode = InsertionMode::InCaption;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "colgroup" => {
                self.clear_stack_back_to_table_context();
                self.insert_html_element(t);
                self.mode = InsertionMode::InColumnGroup;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "col" => {
                self.clear_stack_back_to_table_context();
                self.insert_html_element(&Self::synthetic_tag("colgroup"));
                self.mode = InsertionMode::InColumnGroup;
                Step::Reprocess(tok)
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(&*t.name, "tbody" | "tfoot" | "thead") =>
            {
                self.clear_stack_back_to_table_context();
                self.insert_html_element(t);
                self.mode = InsertionMode::InTableBody;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "td" | "th" | "tr") =>
            {
                self.clear_stack_back_to_table_context();
                self.insert_html_element(&Self::synthetic_tag("tbody"));
                self.mode = InsertionMode::InTableBody;
                Step::Reprocess(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "table" => {
                self.error("nested table start tag");
                if self
                    .open_elements
                    .in_scope("table", stack::is_table_scope_boundary)
                {
                    self.open_elements.pop_until("table");
                    self.mode = self.reset_insertion_mode_after_pop();
                    Step::Reprocess(tok)
                } else {
                    Step::Done
                }
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "table" => {
                if self
                    .open_elements
                    .in_scope("table", stack::is_table_scope_boundary)
                {
                    self.open_elements.pop_until("table");
                    self.foster_parenting = false;
                    self.mode = self.reset_insertion_mode_after_pop();
                } else {
                    self.error("no table in scope");
                }
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && matches!(
                        &*t.name,
                        "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                            | "th" | "thead" | "tr"
                    ) =>
            {
                self.error("unexpected end tag in table");
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(&*t.name, "style" | "script" | "template") =>
            {
                self.mode_in_head(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "input" => {
                let is_hidden = t
                    .attrs
                    .iter()
                    .any(|a| a.name.eq_ignore_ascii_case("type") && a.value.eq_ignore_ascii_case("hidden"));
                if is_hidden {
                    self.error("hidden input inside table");
                    self.insert_and_pop(t);
                    Step::Done
                } else {
                    self.foster_and_process_in_body(tok)
                }
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "form" => {
                if self.form_element.is_none() {
                    self.error("form start tag in table");
                    let el = self.insert_and_pop(t);
                    self.form_element = Some(el);
                }
                Step::Done
            }
            Token::EofToken => self.mode_in_body(tok),
            other => self.foster_and_process_in_body(other),
        }
    }

    fn foster_and_process_in_body(&mut self, tok: Token) -> Step {
        self.error("foster-parenting content out of table");
        self.foster_parenting = true;
        let step = self.mode_in_body(tok);
        self.foster_parenting = false;
        step
    }

    fn clear_stack_back_to_table_context(&mut self) {
        while let Some(top) = self.current_node() {
            match top.tag() {
                Some(t) if matches!(t.as_str(), "table" | "template" | "html") => break,
                _ => {
                    self.open_elements.pop();
                }
            }
        }
    }

    fn clear_stack_back_to_table_body_context(&mut self) {
        while let Some(top) = self.current_node() {
            match top.tag() {
                Some(t) if matches!(t.as_str(), "tbody" | "tfoot" | "thead" | "template" | "html") => {
                    break
                }
                _ => {
                    self.open_elements.pop();
                }
            }
        }
    }

    fn clear_stack_back_to_table_row_context(&mut self) {
        while let Some(top) = self.current_node() {
            match top.tag() {
                Some(t) if matches!(t.as_str(), "tr" | "template" | "html") => break,
                _ => {
                    self.open_elements.pop();
                }
            }
        }
    }

    fn reset_insertion_mode_after_pop(&self) -> InsertionMode {
        for node in self.open_elements.iter().rev() {
            if let Some(tag) = node.tag() {
                match tag.as_str() {
                    "select" => return InsertionMode::InSelect,
                    "td" | "th" => return InsertionMode::InCell,
                    "tr" => return InsertionMode::InRow,
                    "tbody" | "thead" | "tfoot" => return InsertionMode::InTableBody,
                    "caption" => return InsertionMode::InCaption,
                    "colgroup" => return InsertionMode::InColumnGroup,
                    "table" => return InsertionMode::InTable,
                    "head" => return InsertionMode::InHead,
                    "body" => return InsertionMode::InBody,
                    "html" => return InsertionMode::BeforeHead,
                    _ => {}
                }
            }
        }
        InsertionMode::InBody
    }

    pub(super) fn mode_in_table_text(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) => {
                self.pending_table_text.push_str(s);
                Step::Done
            }
            Token::NullCharacterToken => Step::Done,
            other => {
                let text = std::mem::take(&mut self.pending_table_text);
                self.mode = self.original_mode;
                if is_ws_only(&text) {
                    if !text.is_empty() {
                        self.insert_text(&text);
                    }
                } else {
                    self.error("non-whitespace text inside table, foster parenting");
                    self.foster_parenting = true;
                    self.insert_text(&text);
                    self.foster_parenting = false;
                }
                Step::Reprocess(other)
            }
        }
    }

    // -------------------------------------------------------- InTableBody

    pub(super) fn mode_in_table_body(&mut self, tok: Token) -> Step {
        match tok {
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "tr" => {
                self.clear_stack_back_to_table_body_context();
                self.insert_html_element(t);
                self.mode = InsertionMode::InRow;
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "th" | "td") =>
            {
                self.error("cell start tag without a row");
                self.clear_stack_back_to_table_body_context();
                self.insert_html_element(&Self::synthetic_tag("tr"));
                self.mode = InsertionMode::InRow;
                Step::Reprocess(tok)
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && matches!(&*t.name, "tbody" | "tfoot" | "thead") =>
            {
                if self.open_elements.contains_tag(&t.name) {
                    self.clear_stack_back_to_table_body_context();
                    self.open_elements.pop();
                    self.mode = InsertionMode::InTable;
                } else {
                    self.error("no matching table section in scope");
                }
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(&*t.name, "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead") =>
            {
                if self.open_elements.in_scope_any(
                    &["tbody", "thead", "tfoot"],
                    stack::is_table_scope_boundary,
                ) {
                    self.clear_stack_back_to_table_body_context();
                    self.open_elements.pop();
                    self.mode = InsertionMode::InTable;
                    Step::Reprocess(tok)
                } else {
                    self.error("no table section in scope");
                    Step::Done
                }
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && matches!(&*t.name, "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr") =>
            {
                self.error("unexpected end tag");
                Step::Done
            }
            other => self.mode_in_table(other),
        }
    }

    // -------------------------------------------------------------- InRow

    pub(super) fn mode_in_row(&mut self, tok: Token) -> Step {
        match tok {
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "th" | "td") =>
            {
                self.clear_stack_back_to_table_row_context();
                self.insert_html_element(t);
                self.mode = InsertionMode::InCell;
                self.push_formatting_marker();
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "tr" => {
                if self
                    .open_elements
                    .in_scope("tr", stack::is_table_scope_boundary)
                {
                    self.clear_stack_back_to_table_row_context();
                    self.open_elements.pop();
                    self.mode = InsertionMode::InTableBody;
                } else {
                    self.error("no tr in scope");
                }
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(&*t.name, "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if self
                    .open_elements
                    .in_scope("tr", stack::is_table_scope_boundary)
                {
                    self.clear_stack_back_to_table_row_context();
                    self.open_elements.pop();
                    self.mode = InsertionMode::InTableBody;
                    Step::Reprocess(tok)
                } else {
                    self.error("no tr in scope");
                    Step::Done
                }
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && matches!(&*t.name, "tbody" | "tfoot" | "thead") =>
            {
                if self.open_elements.contains_tag(&t.name) {
                    self.clear_stack_back_to_table_row_context();
                    self.open_elements.pop();
                    self.mode = InsertionMode::InTableBody;
                    Step::Reprocess(tok)
                } else {
                    self.error("no matching section in scope");
                    Step::Done
                }
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && matches!(&*t.name, "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th") =>
            {
                self.error("unexpected end tag");
                Step::Done
            }
            other => self.mode_in_table(other),
        }
    }

    // ------------------------------------------------------------- InCell

    pub(super) fn mode_in_cell(&mut self, tok: Token) -> Step {
        match tok {
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag && matches!(&*t.name, "td" | "th") =>
            {
                if self.open_elements.in_scope(&t.name, stack::is_table_scope_boundary) {
                    self.generate_implied_end_tags(None);
                    self.open_elements.pop_until(&t.name);
                    self.clear_active_formatting_to_last_marker();
                    self.mode = InsertionMode::InRow;
                } else {
                    self.error("no matching cell in scope");
                }
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(
                        &*t.name,
                        "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                    ) =>
            {
                if self
                    .open_elements
                    .in_scope_any(&["td", "th"], stack::is_table_scope_boundary)
                {
                    self.close_cell_and_reprocess(tok)
                } else {
                    self.error("no cell in scope");
                    Step::Done
                }
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && matches!(&*t.name, "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.error("unexpected end tag in cell");
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && matches!(&*t.name, "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if self
                    .open_elements
                    .in_scope(&t.name, stack::is_table_scope_boundary)
                {
                    self.close_cell_and_reprocess(tok)
                } else {
                    self.error("no matching element in scope");
                    Step::Done
                }
            }
            other => self.mode_in_body(other),
        }
    }

    fn close_cell_and_reprocess(&mut self, tok: Token) -> Step {
        self.generate_implied_end_tags(None);
        for name in ["td", "th"] {
            if self.open_elements.contains_tag(name) {
                self.open_elements.pop_until(name);
                break;
            }
        }
        self.clear_active_formatting_to_last_marker();
        self.mode = InsertionMode::InRow;
        Step::Reprocess(tok)
    }

    // ---------------------------------------------------------- InCaption

    pub(super) fn mode_in_caption(&mut self, tok: Token) -> Step {
        match tok {
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "caption" => {
                self.close_caption(tok, false)
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(
                        &*t.name,
                        "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                    ) =>
            {
                self.close_caption(tok, true)
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "table" => {
                self.close_caption(tok, true)
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && matches!(&*t.name, "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr") =>
            {
                self.error("unexpected end tag in caption");
                Step::Done
            }
            other => self.mode_in_body(other),
        }
    }

    fn close_caption(&mut self, tok: Token, reprocess: bool) -> Step {
        if !self
            .open_elements
            .in_scope("caption", stack::is_default_scope_boundary)
        {
            self.error("no caption in scope");
            return Step::Done;
        }
        self.generate_implied_end_tags(None);
        self.open_elements.pop_until("caption");
        self.clear_active_formatting_to_last_marker();
        self.mode = InsertionMode::InTable;
        if reprocess {
            Step::Reprocess(tok)
        } else {
            Step::Done
        }
    }

    // ------------------------------------------------------- InColumnGroup

    pub(super) fn mode_in_column_group(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) if is_ws_only(s) => {
                self.insert_text(s);
                Step::Done
            }
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "col" => {
                self.insert_and_pop(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "colgroup" => {
                if self.current_node().map(|c| c.tag_name_is("colgroup")).unwrap_or(false) {
                    self.open_elements.pop();
                    self.mode = InsertionMode::InTable;
                } else {
                    self.error("no colgroup to close");
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "col" => {
                self.error("unmatched col end tag");
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && &*t.name == "template"
                    || (t.kind == TagKind::EndTag && &*t.name == "template") =>
            {
                self.mode_in_head(tok)
            }
            Token::EofToken => self.mode_in_body(tok),
            other => {
                if self.current_node().map(|c| c.tag_name_is("colgroup")).unwrap_or(false) {
                    self.open_elements.pop();
                    self.mode = InsertionMode::InTable;
                    Step::Reprocess(other)
                } else {
                    self.error("unexpected token in column group");
                    Step::Done
                }
            }
        }
    }

    // ------------------------------------------------------------ InSelect

    pub(super) fn mode_in_select(&mut self, tok: Token) -> Step {
        match tok {
            Token::NullCharacterToken => Step::Done,
            Token::CharacterToken(ref s) => {
                self.insert_text(s);
                Step::Done
            }
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "option" => {
                if self.current_node().map(|c| c.tag_name_is("option")).unwrap_or(false) {
                    self.open_elements.pop();
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "optgroup" => {
                if self.current_node().map(|c| c.tag_name_is("option")).unwrap_or(false) {
                    self.open_elements.pop();
                }
                if self.current_node().map(|c| c.tag_name_is("optgroup")).unwrap_or(false) {
                    self.open_elements.pop();
                }
                self.insert_html_element(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "optgroup" => {
                let second_is_optgroup = self.open_elements.len() >= 2
                    && self.open_elements.get(self.open_elements.len() - 2).tag_name_is("optgroup");
                if self.current_node().map(|c| c.tag_name_is("option")).unwrap_or(false) && second_is_optgroup {
                    self.open_elements.pop();
                }
                if self.current_node().map(|c| c.tag_name_is("optgroup")).unwrap_or(false) {
                    self.open_elements.pop();
                } else {
                    self.error("no optgroup to close");
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "option" => {
                if self.current_node().map(|c| c.tag_name_is("option")).unwrap_or(false) {
                    self.open_elements.pop();
                } else {
                    self.error("no option to close");
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "select" => {
                if self
                    .open_elements
                    .in_scope("select", stack::is_table_scope_boundary)
                {
                    self.open_elements.pop_until("select");
                    self.mode = self.reset_insertion_mode_after_pop();
                } else {
                    self.error("no select in scope");
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "select" => {
                self.error("nested select start tag treated as close");
                self.open_elements.pop_until("select");
                self.mode = self.reset_insertion_mode_after_pop();
                Step::Done
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "input" | "keygen" | "textarea") =>
            {
                self.error("unexpected start tag in select, closing it");
                if self
                    .open_elements
                    .in_scope("select", stack::is_table_scope_boundary)
                {
                    self.open_elements.pop_until("select");
                    self.mode = self.reset_insertion_mode_after_pop();
                    Step::Reprocess(tok)
                } else {
                    Step::Done
                }
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag && matches!(&*t.name, "script" | "template") =>
            {
                self.mode_in_head(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "template" => {
                self.mode_in_head(tok)
            }
            Token::EofToken => self.mode_in_body(tok),
            _ => {
                self.error("unexpected token in select");
                Step::Done
            }
        }
    }

    pub(super) fn mode_in_select_in_table(&mut self, tok: Token) -> Step {
        match tok {
            Token::TagToken(ref t)
                if t.kind == TagKind::StartTag
                    && matches!(&*t.name, "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th") =>
            {
                self.error("table content in select-in-table, closing select");
                self.open_elements.pop_until("select");
                self.mode = self.reset_insertion_mode_after_pop();
                Step::Reprocess(tok)
            }
            Token::TagToken(ref t)
                if t.kind == TagKind::EndTag
                    && matches!(&*t.name, "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th") =>
            {
                if self.open_elements.contains_tag(&t.name) {
                    self.open_elements.pop_until("select");
                    self.mode = self.reset_insertion_mode_after_pop();
                    Step::Reprocess(tok)
                } else {
                    self.error("unmatched end tag");
                    Step::Done
                }
            }
            other => self.mode_in_select(other),
        }
    }

    // ----------------------------------------------------------- AfterBody

    pub(super) fn mode_after_body(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) if is_ws_only(s) => self.mode_in_body(tok),
            Token::CommentToken(ref text) => {
                // Appended as the last child of <html>, per the WHATWG
                // "after body" insertion mode, rather than via the normal
                // current-node insertion point.
                if let Some(html) = self.open_elements.iter().next().cloned() {
                    crate::dom::node::append(
                        &html,
                        crate::dom::node::new_node(
                            crate::dom::node::NodeData::Comment(std::cell::RefCell::new(
                                tendril::StrTendril::from(text.as_ref()),
                            )),
                            self.current_position(),
                        ),
                    );
                }
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "html" => {
                self.mode = InsertionMode::AfterAfterBody;
                Step::Done
            }
            Token::EofToken => {
                self.done = true;
                Step::Done
            }
            other => {
                self.error("unexpected token after body, reprocessing in body");
                self.mode = InsertionMode::InBody;
                Step::Reprocess(other)
            }
        }
    }

    pub(super) fn mode_after_after_body(&mut self, tok: Token) -> Step {
        match tok {
            Token::CommentToken(ref text) => {
                self.insert_comment_on_document(text);
                Step::Done
            }
            Token::DoctypeToken(_) => self.mode_in_body(tok),
            Token::CharacterToken(ref s) if is_ws_only(s) => self.mode_in_body(tok),
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::EofToken => {
                self.done = true;
                Step::Done
            }
            other => {
                self.error("unexpected token after html, reprocessing in body");
                self.mode = InsertionMode::InBody;
                Step::Reprocess(other)
            }
        }
    }

    fn insert_comment_on_document(&mut self, text: &str) {
        crate::dom::node::append(
            &self.document.clone(),
            crate::dom::node::new_node(
                crate::dom::node::NodeData::Comment(std::cell::RefCell::new(tendril::StrTendril::from(
                    text,
                ))),
                self.current_position(),
            ),
        );
    }

    // ----------------------------------------------------------- Frameset

    pub(super) fn mode_in_frameset(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) if is_ws_only(s) => {
                self.insert_text(s);
                Step::Done
            }
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "frameset" => {
                self.insert_html_element(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "frameset" => {
                self.open_elements.pop();
                if !self.open_elements.current().map(|c| c.tag_name_is("frameset")).unwrap_or(false) {
                    self.mode = InsertionMode::AfterFrameset;
                }
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "frame" => {
                self.insert_and_pop(t);
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "noframes" => {
                self.mode_in_head(tok)
            }
            Token::EofToken => {
                self.done = true;
                Step::Done
            }
            _ => {
                self.error("unexpected token in frameset");
                Step::Done
            }
        }
    }

    pub(super) fn mode_after_frameset(&mut self, tok: Token) -> Step {
        match tok {
            Token::CharacterToken(ref s) if is_ws_only(s) => {
                self.insert_text(s);
                Step::Done
            }
            Token::CommentToken(ref text) => {
                self.insert_comment(text);
                Step::Done
            }
            Token::DoctypeToken(_) => {
                self.error("doctype not allowed here");
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::EndTag && &*t.name == "html" => {
                self.mode = InsertionMode::AfterAfterFrameset;
                Step::Done
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "noframes" => {
                self.mode_in_head(tok)
            }
            Token::EofToken => {
                self.done = true;
                Step::Done
            }
            _ => {
                self.error("unexpected token after frameset");
                Step::Done
            }
        }
    }

    pub(super) fn mode_after_after_frameset(&mut self, tok: Token) -> Step {
        match tok {
            Token::CommentToken(ref text) => {
                self.insert_comment_on_document(text);
                Step::Done
            }
            Token::DoctypeToken(_) => self.mode_in_body(tok),
            Token::CharacterToken(ref s) if is_ws_only(s) => self.mode_in_body(tok),
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "html" => {
                self.mode_in_body(tok)
            }
            Token::TagToken(ref t) if t.kind == TagKind::StartTag && &*t.name == "noframes" => {
                self.mode_in_head(tok)
            }
            Token::EofToken => {
                self.done = true;
                Step::Done
            }
            _ => {
                self.error("unexpected token after frameset document");
                Step::Done
            }
        }
    }
}
