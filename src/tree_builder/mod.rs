// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The HTML tree builder: insertion modes, the stack of open elements,
//! active-formatting-element reconstruction, the adoption agency
//! algorithm, foster parenting, and fragment parsing.

mod rules;
mod stack;
mod types;
pub mod xml;

use std::cell::{Cell, RefCell};

use tendril::StrTendril;

use crate::dom::attributes::Attributes;
use crate::dom::node::{self, Handle, NodeData};
use crate::dom::settings::{ParseSettings, QuirksMode};
use crate::dom::tag::{self, Tag as DomTag};
use crate::error::{ParseErrorList, Position};
use crate::tokenizer::{Doctype, Tag, TagKind, Token, Tokenizer, TokenizerOpts};

use stack::OpenElements;
use types::{FormatEntry, InsertionMode};

pub(crate) enum Step {
    Done,
    Reprocess(Token),
}

/// Where the next node should be inserted: ordinarily the last child of
/// the current node, but foster-parented out of a table when the current
/// node is table-structural content ("foster parenting").
enum InsertionPoint {
    LastChild(Handle),
    BeforeSibling(Handle),
}

pub struct TreeBuilder {
    tokenizer: Tokenizer,
    settings: ParseSettings,
    document: Handle,
    mode: InsertionMode,
    /// Saved mode to return to after the `Text`/raw-text insertion mode.
    original_mode: InsertionMode,
    open_elements: OpenElements,
    active_formatting: Vec<FormatEntry>,
    head_element: Option<Handle>,
    form_element: Option<Handle>,
    quirks_mode: QuirksMode,
    frameset_ok: bool,
    foster_parenting: bool,
    /// Accumulated character data while in the `InTableText` insertion
    /// mode, which must see a whole run of characters before deciding
    /// whether it was whitespace-only (kept verbatim) or not (foster
    /// parented).
    pending_table_text: String,
    /// Context element name when parsing a fragment; `None` for
    /// whole-document parsing.
    fragment_context: Option<String>,
    /// Set once the first `<base href>` has been applied to the document's
    /// base URI; later `<base>` elements are then ignored.
    base_uri_set_from_tag: bool,
    done: bool,
}

impl TreeBuilder {
    fn new_internal(
        input: StrTendril,
        settings: ParseSettings,
        base_uri: &str,
        fragment_context: Option<&str>,
    ) -> TreeBuilder {
        let mut opts = TokenizerOpts::default();
        opts.track_positions = settings.track_positions;
        opts.track_errors = settings.max_errors > 0;
        opts.max_errors = settings.max_errors;
        if let Some(ctx) = fragment_context {
            if tag::is_void_element(ctx) {
                // irrelevant, handled generically below
            }
            opts.initial_state = None;
            opts.last_start_tag_name = Some(ctx.to_string());
        }

        let document = node::new_node(
            NodeData::Document {
                base_uri: RefCell::new(base_uri.to_string()),
            },
            Position::UNTRACKED,
        );
        let mut tb = TreeBuilder {
            tokenizer: Tokenizer::new(input, opts),
            settings,
            document,
            mode: InsertionMode::Initial,
            original_mode: InsertionMode::InBody,
            open_elements: OpenElements::new(),
            active_formatting: Vec::new(),
            head_element: None,
            form_element: None,
            quirks_mode: QuirksMode::NoQuirks,
            frameset_ok: true,
            foster_parenting: false,
            pending_table_text: String::new(),
            fragment_context: fragment_context.map(|s| s.to_string()),
            base_uri_set_from_tag: false,
            done: false,
        };

        if let Some(ctx) = fragment_context {
            // "Parsing HTML fragments": create a synthetic root <html> and
            // drive the tree builder as if it were already inside `ctx`.
            let html = tb.create_element(DomTag::new("html"), Attributes::new());
            node::append(&tb.document, html.clone());
            tb.open_elements.push(html);
            tb.reset_insertion_mode_for_fragment(ctx);
            if ctx == "script" {
                tb.tokenizer
                    .switch_to_raw(crate::tokenizer::states::RawKind::ScriptData, "script");
            } else if matches!(ctx, "title" | "textarea") {
                tb.tokenizer
                    .switch_to_raw(crate::tokenizer::states::RawKind::Rcdata, ctx);
            } else if matches!(ctx, "style" | "xmp" | "iframe" | "noembed" | "noframes") {
                tb.tokenizer
                    .switch_to_raw(crate::tokenizer::states::RawKind::Rawtext, ctx);
            } else if ctx == "plaintext" {
                tb.tokenizer.switch_to(crate::tokenizer::states::Plaintext);
            }
        }

        tb
    }

    pub fn new(input: StrTendril, settings: ParseSettings, base_uri: &str) -> TreeBuilder {
        TreeBuilder::new_internal(input, settings, base_uri, None)
    }

    pub fn new_fragment(
        input: StrTendril,
        settings: ParseSettings,
        base_uri: &str,
        context_tag: &str,
    ) -> TreeBuilder {
        TreeBuilder::new_internal(input, settings, base_uri, Some(context_tag))
    }

    /// Runs the tokenizer/tree-builder loop to completion and returns the
    /// finished document, its quirks mode, and any recovered parse errors.
    pub fn run(mut self) -> ParseOutput {
        while !self.done {
            let tok = self.tokenizer.next_token();
            self.process_token(tok);
        }
        ParseOutput {
            document: self.document,
            quirks_mode: self.quirks_mode,
            errors: self.tokenizer.errors().clone(),
        }
    }

    /// For fragment parsing: the synthetic `<html>` node's children are
    /// the fragment's actual result nodes.
    pub fn run_fragment(self) -> Vec<Handle> {
        let out = self.run();
        out.document
            .children
            .borrow()
            .first()
            .map(|html| html.children.borrow().clone())
            .unwrap_or_default()
    }

    fn process_token(&mut self, tok: Token) {
        let mut tok = tok;
        loop {
            match self.dispatch(tok) {
                Step::Done => break,
                Step::Reprocess(next) => tok = next,
            }
        }
    }

    fn dispatch(&mut self, tok: Token) -> Step {
        if matches!(tok, Token::EofToken) && self.open_elements.is_empty() && self.mode == InsertionMode::Initial {
            self.done = true;
            return Step::Done;
        }
        // HTML has no `CDataNode` of its own (that's an XML-tree-builder
        // concept); a `<![CDATA[...]]>` section parsed as HTML is just
        // character data, same as the insertion modes already handle.
        let tok = match tok {
            Token::CDataToken(s) => Token::CharacterToken(s),
            other => other,
        };
        match self.mode {
            InsertionMode::Initial => self.mode_initial(tok),
            InsertionMode::BeforeHtml => self.mode_before_html(tok),
            InsertionMode::BeforeHead => self.mode_before_head(tok),
            InsertionMode::InHead => self.mode_in_head(tok),
            InsertionMode::InHeadNoscript => self.mode_in_head_noscript(tok),
            InsertionMode::AfterHead => self.mode_after_head(tok),
            InsertionMode::InBody => self.mode_in_body(tok),
            InsertionMode::Text => self.mode_text(tok),
            InsertionMode::InTable => self.mode_in_table(tok),
            InsertionMode::InTableText => self.mode_in_table_text(tok),
            InsertionMode::InTableBody => self.mode_in_table_body(tok),
            InsertionMode::InRow => self.mode_in_row(tok),
            InsertionMode::InCell => self.mode_in_cell(tok),
            InsertionMode::InCaption => self.mode_in_caption(tok),
            InsertionMode::InColumnGroup => self.mode_in_column_group(tok),
            InsertionMode::InSelect => self.mode_in_select(tok),
            InsertionMode::InSelectInTable => self.mode_in_select_in_table(tok),
            InsertionMode::AfterBody => self.mode_after_body(tok),
            InsertionMode::InFrameset => self.mode_in_frameset(tok),
            InsertionMode::AfterFrameset => self.mode_after_frameset(tok),
            InsertionMode::AfterAfterBody => self.mode_after_after_body(tok),
            InsertionMode::AfterAfterFrameset => self.mode_after_after_frameset(tok),
        }
    }

    fn error(&mut self, msg: &str) {
        // Tokenizer-level errors already flow through `self.tokenizer`'s
        // own `ParseErrorList`; tree-construction errors share that sink
        // so a single bounded list captures both.
        let pos = self.current_position();
        self.tokenizer.push_error(pos, msg);
    }

    // -- node construction -----------------------------------------------

    fn create_element(&self, name: DomTag, attrs: Attributes) -> Handle {
        let template_contents = if name.as_str() == "template" {
            Some(node::new_node(
                NodeData::Document {
                    base_uri: RefCell::new(String::new()),
                },
                Position::UNTRACKED,
            ))
        } else {
            None
        };
        node::new_node(
            NodeData::Element {
                name,
                attrs: RefCell::new(attrs),
                template_contents,
                script_already_started: Cell::new(false),
            },
            self.current_position(),
        )
    }

    fn current_position(&self) -> Position {
        if self.settings.track_positions {
            self.tokenizer.position()
        } else {
            Position::UNTRACKED
        }
    }

    fn attrs_from_tag(&self, tag: &Tag) -> Attributes {
        let mut attrs = if self.settings.preserve_attribute_case {
            Attributes::new_case_sensitive()
        } else {
            Attributes::new()
        };
        for a in &tag.attrs {
            let key = self.settings.normalize_attribute(&a.name);
            attrs.put_ignore_duplicate(&key, &a.value);
        }
        attrs
    }

    fn current_node(&self) -> Option<Handle> {
        self.open_elements.current().cloned()
    }

    fn foster_parenting_target(&self) -> InsertionPoint {
        if self.foster_parenting {
            if let Some(idx) = self
                .open_elements
                .iter()
                .rposition(|h| h.tag_name_is("table"))
            {
                let table = self.open_elements.get(idx).clone();
                if let Some((parent, _)) = node::parent_and_index(&table) {
                    return InsertionPoint::BeforeSibling(table);
                }
                return InsertionPoint::LastChild(table);
            }
        }
        InsertionPoint::LastChild(self.current_node().unwrap_or_else(|| self.document.clone()))
    }

    fn insertion_point(&self) -> InsertionPoint {
        let current = self.current_node();
        let is_table_ish = current
            .as_ref()
            .and_then(|c| c.tag())
            .map(|t| matches!(t.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr"))
            .unwrap_or(false);
        if self.foster_parenting && is_table_ish {
            self.foster_parenting_target()
        } else {
            InsertionPoint::LastChild(current.unwrap_or_else(|| self.document.clone()))
        }
    }

    fn insert_at(&self, point: InsertionPoint, child: Handle) {
        match point {
            InsertionPoint::LastChild(parent) => node::append(&parent, child),
            InsertionPoint::BeforeSibling(sibling) => node::insert_before(&sibling, child),
        }
    }

    fn insert_html_element(&mut self, tag: &Tag) -> Handle {
        let name = DomTag::new(&self.settings.normalize_tag(&tag.name));
        let attrs = self.attrs_from_tag(tag);
        let el = self.create_element(name, attrs);
        self.insert_at(self.insertion_point(), el.clone());
        self.open_elements.push(el.clone());
        el
    }

    /// Inserts `tag` as a void/self-closing element: pushed then popped
    /// immediately, so it never becomes the current node.
    fn insert_and_pop(&mut self, tag: &Tag) -> Handle {
        let el = self.insert_html_element(tag);
        self.open_elements.pop();
        if tag.name == "base" {
            self.maybe_set_base_uri(&el);
        }
        el
    }

    /// The first in-tree `<base href>` sets the document base URI; later
    /// ones are ignored.
    fn maybe_set_base_uri(&mut self, base_el: &Handle) {
        if self.base_uri_set_from_tag {
            return;
        }
        if let Some(href) = base_el.attrs().and_then(|a| a.get("href").map(|v| v.to_string())) {
            let current = self.document.base_uri().unwrap_or_default();
            if let Some(resolved) = crate::dom::url::resolve(&current, &href) {
                self.document.set_base_uri(&resolved);
                self.base_uri_set_from_tag = true;
            }
        }
    }

    /// Inserts a generic raw-text/RCDATA element (`<script>`, `<style>`,
    /// `<textarea>`, `<title>`, ...): the tokenizer already switched lexer
    /// state in `after_emit_tag`, so the tree builder only needs to enter
    /// `Text` mode and remember where to return.
    fn use_text_mode(&mut self, tag: &Tag) -> Handle {
        let el = self.insert_html_element(tag);
        self.original_mode = self.mode;
        self.mode = InsertionMode::Text;
        el
    }

    /// Copies any attribute from `tag` not already present onto `el`,
    /// without overwriting existing values — used when a stray `<html>`
    /// or `<body>` start tag reappears after the real one was already
    /// created.
    fn add_missing_attributes(&self, el: &Handle, tag: &Tag) {
        if let Some(mut attrs) = el.attrs_mut() {
            for a in &tag.attrs {
                let key = self.settings.normalize_attribute(&a.name);
                if !attrs.has_key(&key) {
                    attrs.put(&key, &a.value);
                }
            }
        }
    }

    fn synthetic_tag(name: &str) -> Tag {
        Tag {
            kind: TagKind::StartTag,
            name: StrTendril::from(name),
            self_closing: false,
            attrs: Vec::new(),
        }
    }

    /// "Any other end tag" fallback: search the stack from the top for an
    /// element named `name`; if found, close implied end tags (the element
    /// itself excluded) and pop up to and including it, otherwise report a
    /// parse error and ignore the token.
    fn close_via_any_other_end_tag(&mut self, name: &str) {
        if !self.open_elements.iter().any(|h| h.tag_name_is(name)) {
            self.error("unexpected end tag with no matching start tag");
            return;
        }
        self.generate_implied_end_tags(Some(name));
        self.open_elements.pop_until(name);
    }

    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.insertion_point() {
            InsertionPoint::LastChild(parent) => {
                if !node::append_text_merging(&parent, text) {
                    node::append(
                        &parent,
                        node::new_node(
                            NodeData::TextNode(RefCell::new(StrTendril::from(text))),
                            self.current_position(),
                        ),
                    );
                }
            }
            InsertionPoint::BeforeSibling(sibling) => {
                node::insert_before(
                    &sibling,
                    node::new_node(
                        NodeData::TextNode(RefCell::new(StrTendril::from(text))),
                        self.current_position(),
                    ),
                );
            }
        }
    }

    fn insert_comment(&mut self, text: &str) {
        let node = node::new_node(
            NodeData::Comment(RefCell::new(StrTendril::from(text))),
            self.current_position(),
        );
        self.insert_at(self.insertion_point(), node);
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
        node::append(&self.document, node);
    }

    // -- quirks mode -------------------------------------------------------

    fn derive_quirks_mode(&mut self, doctype: &Doctype) {
        let name = doctype.name.as_deref().unwrap_or("");
        let public_id = doctype.public_id.as_deref().unwrap_or("");
        let system_id = doctype.system_id.as_deref().unwrap_or("");

        if doctype.force_quirks || !name.eq_ignore_ascii_case("html") {
            self.quirks_mode = QuirksMode::Quirks;
            return;
        }
        let pid = public_id.to_ascii_lowercase();
        if pid.starts_with("-//softquad software//dtd hotmetal pro")
            || pid.starts_with("-//w3c//dtd html 3.2")
            || pid.starts_with("-//ietf//dtd html")
        {
            self.quirks_mode = QuirksMode::Quirks;
            return;
        }
        if system_id.is_empty()
            && (pid.starts_with("-//w3c//dtd html 4.01 frameset")
                || pid.starts_with("-//w3c//dtd html 4.01 transitional"))
        {
            self.quirks_mode = QuirksMode::LimitedQuirks;
            return;
        }
        if pid.starts_with("-//w3c//dtd xhtml 1.0 frameset")
            || pid.starts_with("-//w3c//dtd xhtml 1.0 transitional")
        {
            self.quirks_mode = QuirksMode::LimitedQuirks;
            return;
        }
        self.quirks_mode = QuirksMode::NoQuirks;
    }

    // -- active formatting elements -----------------------------------------

    fn push_formatting_marker(&mut self) {
        self.active_formatting.push(FormatEntry::Marker);
    }

    fn push_formatting_element(&mut self, el: Handle, tag: Tag) {
        // "Noah's Ark clause": drop the earliest of 3+ identical entries
        // since the last marker.
        let mut matches = 0;
        let mut earliest = None;
        for (i, entry) in self.active_formatting.iter().enumerate().rev() {
            match entry {
                FormatEntry::Marker => break,
                FormatEntry::Element(h, t) => {
                    if t.name == tag.name && t.equiv_modulo_attr_order(&tag) {
                        matches += 1;
                        earliest = Some(i);
                        let _ = h;
                    }
                }
            }
        }
        if matches >= 3 {
            if let Some(i) = earliest {
                self.active_formatting.remove(i);
            }
        }
        self.active_formatting.push(FormatEntry::Element(el, tag));
    }

    fn reconstruct_active_formatting_elements(&mut self) {
        if self.active_formatting.is_empty() {
            return;
        }
        if matches!(self.active_formatting.last(), Some(FormatEntry::Marker)) {
            return;
        }
        if let Some(FormatEntry::Element(h, _)) = self.active_formatting.last() {
            if self.open_elements.position_of(h).is_some() {
                return;
            }
        }
        let mut idx = self.active_formatting.len() - 1;
        loop {
            if idx == 0 {
                break;
            }
            idx -= 1;
            let reinsert = match &self.active_formatting[idx] {
                FormatEntry::Marker => {
                    idx += 1;
                    break;
                }
                FormatEntry::Element(h, _) => self.open_elements.position_of(h).is_none(),
            };
            if !reinsert {
                idx += 1;
                break;
            }
        }
        for i in idx..self.active_formatting.len() {
            if let FormatEntry::Element(_, tag) = self.active_formatting[i].clone_entry() {
                let new_el = self.insert_html_element(&tag);
                self.active_formatting[i] = FormatEntry::Element(new_el, tag);
            }
        }
    }

    fn clear_active_formatting_to_last_marker(&mut self) {
        while let Some(entry) = self.active_formatting.pop() {
            if matches!(entry, FormatEntry::Marker) {
                break;
            }
        }
    }

    fn find_in_active_formatting(&self, name: &str) -> Option<(usize, Handle, Tag)> {
        for (i, entry) in self.active_formatting.iter().enumerate().rev() {
            match entry {
                FormatEntry::Marker => return None,
                FormatEntry::Element(h, t) => {
                    if &*t.name == name {
                        return Some((i, h.clone(), t.clone()));
                    }
                }
            }
        }
        None
    }

    fn remove_from_active_formatting(&mut self, el: &Handle) {
        if let Some(i) = self.active_formatting.iter().position(|e| match e {
            FormatEntry::Element(h, _) => Handle::ptr_eq(h, el),
            FormatEntry::Marker => false,
        }) {
            self.active_formatting.remove(i);
        }
    }

    // -- implied end tags / p auto-closing ---------------------------------

    fn generate_implied_end_tags(&mut self, exclude: Option<&str>) {
        loop {
            let should_pop = match self.current_node() {
                Some(n) => match n.tag() {
                    Some(t) => {
                        let name = t.as_str();
                        Some(name) != exclude
                            && matches!(
                                name,
                                "dd" | "dt"
                                    | "li"
                                    | "optgroup"
                                    | "option"
                                    | "p"
                                    | "rb"
                                    | "rp"
                                    | "rt"
                                    | "rtc"
                            )
                    }
                    None => false,
                },
                None => false,
            };
            if !should_pop {
                break;
            }
            self.open_elements.pop();
        }
    }

    fn close_p_if_in_button_scope(&mut self) {
        if self.open_elements.in_scope("p", stack::is_button_scope_boundary) {
            self.generate_implied_end_tags(Some("p"));
            self.open_elements.pop_until("p");
        }
    }

    // -- adoption agency -----------------------------------------------------

    /// A simplified, bounded (max 8 outer iterations, per the WHATWG
    /// algorithm's own cap) version of the adoption agency algorithm for
    /// misnested formatting elements such as `<b><i></b></i>`.
    fn run_adoption_agency(&mut self, subject: &str) {
        for _ in 0..8 {
            let (fmt_idx, formatting_el, formatting_tag) =
                match self.find_in_active_formatting(subject) {
                    Some(x) => x,
                    None => return,
                };

            if self.open_elements.position_of(&formatting_el).is_none() {
                self.remove_from_active_formatting(&formatting_el);
                return;
            }
            if !self
                .open_elements
                .in_scope(subject, stack::is_default_scope_boundary)
            {
                return;
            }

            let stack_idx = match self.open_elements.position_of(&formatting_el) {
                Some(i) => i,
                None => return,
            };

            // Find the furthest block: the topmost special element above
            // `formatting_el` on the stack.
            let mut furthest_block = None;
            for i in (stack_idx + 1)..self.open_elements.len() {
                let node = self.open_elements.get(i).clone();
                if let Some(tag) = node.tag() {
                    if tag::is_special(tag.as_str()) {
                        furthest_block = Some((i, node));
                        break;
                    }
                }
            }

            let Some((block_idx, furthest_block)) = furthest_block else {
                // No furthest block: simply pop elements up to and
                // including the formatting element.
                self.open_elements.truncate_to(stack_idx);
                self.remove_from_active_formatting(&formatting_el);
                return;
            };

            let common_ancestor = self.open_elements.get(stack_idx.saturating_sub(1)).clone();

            // Move the furthest block to be a child of the common
            // ancestor, then clone the formatting element as its new
            // parent, reparenting the furthest block's children under it.
            node::remove_from_parent(&furthest_block);
            node::append(&common_ancestor, furthest_block.clone());

            let new_formatting = self.create_element(formatting_tag.clone().name_tag(), {
                let mut a = Attributes::new();
                for attr in &formatting_tag.attrs {
                    a.put(&attr.name, &attr.value);
                }
                a
            });
            node::reparent_children(&furthest_block, &new_formatting);
            node::append(&furthest_block, new_formatting.clone());

            self.active_formatting[fmt_idx] =
                FormatEntry::Element(new_formatting.clone(), formatting_tag);
            self.open_elements.truncate_to(stack_idx);
            self.open_elements.push(furthest_block);
            self.open_elements.push(new_formatting);
            let _ = block_idx;
        }
    }

    // -- fragment parsing ----------------------------------------------------

    fn reset_insertion_mode_for_fragment(&mut self, context: &str) {
        self.mode = match context {
            "select" => InsertionMode::InSelect,
            "td" | "th" => InsertionMode::InCell,
            "tr" => InsertionMode::InRow,
            "tbody" | "thead" | "tfoot" => InsertionMode::InTableBody,
            "caption" => InsertionMode::InCaption,
            "colgroup" => InsertionMode::InColumnGroup,
            "table" => InsertionMode::InTable,
            "head" => InsertionMode::InHead,
            "body" => InsertionMode::InBody,
            "html" => InsertionMode::BeforeHead,
            _ => InsertionMode::InBody,
        };
    }
}

impl FormatEntry {
    fn clone_entry(&self) -> FormatEntry {
        match self {
            FormatEntry::Marker => FormatEntry::Marker,
            FormatEntry::Element(h, t) => FormatEntry::Element(h.clone(), t.clone()),
        }
    }
}

impl Tag {
    fn name_tag(self) -> DomTag {
        DomTag::new(&self.name)
    }
}

pub struct ParseOutput {
    pub document: Handle,
    pub quirks_mode: QuirksMode,
    pub errors: ParseErrorList,
}
