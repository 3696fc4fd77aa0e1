// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The HTML5 tokenizer: an explicit state machine that
//! turns a `CharacterReader`'s characters into a `Token` stream.

pub mod char_ref;
pub mod interface;
pub mod states;

use std::collections::VecDeque;

use log::trace;
use tendril::StrTendril;

pub use self::interface::{Doctype, Tag, TagKind, Token, TokenAttribute};
pub use self::interface::{CDataToken, CharacterToken, CommentToken, DoctypeToken, EofToken, TagToken};

use self::states::{DoctypeIdKind, Public, RawKind, ScriptEscapeKind, State, System};
use crate::error::{ParseErrorList, Position};
use crate::reader::CharacterReader;

/// Tokenizer options, with an impl of `Default`. Mirrors
/// `html5ever::tokenizer::TokenizerOpts`.
#[derive(Clone)]
pub struct TokenizerOpts {
    /// Discard a leading U+FEFF byte-order mark, if present. Default: true.
    pub discard_bom: bool,
    /// Initial state override; only conformance-test harnesses should set
    /// this to anything other than `None`.
    pub initial_state: Option<State>,
    /// "Appropriate end tag" hint for harnesses that start in a raw-text
    /// state directly (mirrors html5ever's `last_start_tag_name`).
    pub last_start_tag_name: Option<String>,
    /// Track and report parse errors (bounded by `max_errors`)?
    pub track_errors: bool,
    pub max_errors: usize,
    /// Track line/column positions for tokens and errors?
    pub track_positions: bool,
}

impl Default for TokenizerOpts {
    fn default() -> TokenizerOpts {
        TokenizerOpts {
            discard_bom: true,
            initial_state: None,
            last_start_tag_name: None,
            track_errors: false,
            max_errors: usize::MAX,
            track_positions: false,
        }
    }
}

#[derive(Clone)]
struct AttrInProgress {
    name: String,
    name_pos: Position,
    value: String,
}

/// Which "appropriate end tag" would close the raw-text run we are
/// currently in; the tokenizer only leaves `RawData`/`RawEndTagName` early
/// for an end tag whose name matches the element that opened it.
#[derive(Clone)]
struct RawEndTagMatch {
    expected: String,
}

pub struct Tokenizer {
    reader: CharacterReader,
    state: State,
    opts: TokenizerOpts,
    errors: ParseErrorList,

    current_tag_kind: TagKind,
    current_tag_name: String,
    current_tag_self_closing: bool,
    current_attrs: Vec<AttrInProgress>,
    current_attr: Option<AttrInProgress>,

    current_comment: String,
    current_doctype: Doctype,
    current_cdata: String,

    temp_buffer: String,
    raw_end_tag: Option<RawEndTagMatch>,

    char_run: String,
    pending: VecDeque<Token>,
    eof_emitted: bool,
}

impl Tokenizer {
    pub fn new(input: StrTendril, opts: TokenizerOpts) -> Tokenizer {
        let mut reader = CharacterReader::new(input);
        reader.set_track_newlines(opts.track_positions);
        let raw_end_tag = opts
            .last_start_tag_name
            .clone()
            .map(|name| RawEndTagMatch { expected: name });
        let mut tok = Tokenizer {
            state: opts.initial_state.unwrap_or(states::Data),
            errors: ParseErrorList::with_max(if opts.track_errors {
                opts.max_errors
            } else {
                0
            }),
            reader,
            current_tag_kind: TagKind::StartTag,
            current_tag_name: String::new(),
            current_tag_self_closing: false,
            current_attrs: Vec::new(),
            current_attr: None,
            current_comment: String::new(),
            current_doctype: Doctype::default(),
            current_cdata: String::new(),
            temp_buffer: String::new(),
            raw_end_tag,
            char_run: String::new(),
            pending: VecDeque::new(),
            eof_emitted: false,
            opts,
        };
        if tok.opts.discard_bom {
            tok.reader.match_consume_char('\u{FEFF}');
        }
        tok
    }

    pub fn errors(&self) -> &ParseErrorList {
        &self.errors
    }

    pub fn position(&self) -> Position {
        if self.opts.track_positions {
            let off = self.reader.position();
            Position {
                offset: off as i64,
                line: self.reader.line_number(off),
                column: self.reader.column_number(off),
            }
        } else {
            Position::UNTRACKED
        }
    }

    fn error(&mut self, msg: &str) {
        let pos = self.position();
        self.errors.push(pos, msg.to_string());
    }

    /// Records a tree-construction-level parse error into the same bounded
    /// list as the tokenizer's own lexical errors, so a
    /// single `ParseErrorList` captures both.
    pub(crate) fn push_error(&mut self, pos: Position, msg: &str) {
        self.errors.push(pos, msg.to_string());
    }

    /// Force the raw-text/RCData/script-data family states, as the tree
    /// builder does right after constructing a `<script>`/`<title>`/
    /// `<textarea>`/... start tag.
    pub fn switch_to_raw(&mut self, kind: RawKind, appropriate_end_tag: &str) {
        self.state = states::RawData(kind);
        self.raw_end_tag = Some(RawEndTagMatch {
            expected: appropriate_end_tag.to_ascii_lowercase(),
        });
    }

    pub fn switch_to(&mut self, state: State) {
        self.state = state;
    }

    pub fn current_state(&self) -> State {
        self.state
    }

    /// `Read()`: drain the pending-token queue, pumping the state machine
    /// until a token is produced or EOF is reached.
    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                return tok;
            }
            if self.eof_emitted {
                return EofToken;
            }
            self.step();
        }
    }

    // -- token assembly -----------------------------------------------------

    fn emit(&mut self, tok: Token) {
        self.pending.push_back(tok);
    }

    fn emit_char(&mut self, c: char) {
        if c == '\0' {
            self.error("unexpected null character");
            self.flush_chars();
            self.emit(Token::NullCharacterToken);
        } else {
            self.char_run.push(c);
        }
    }

    fn emit_str(&mut self, s: &str) {
        for c in s.chars() {
            self.emit_char(c);
        }
    }

    fn flush_chars(&mut self) {
        if !self.char_run.is_empty() {
            let s = std::mem::take(&mut self.char_run);
            self.emit(CharacterToken(StrTendril::from(s.as_str())));
        }
    }

    fn start_new_tag(&mut self, kind: TagKind, name: &str) {
        self.finish_attr_if_any();
        self.current_tag_kind = kind;
        self.current_tag_name = name.to_string();
        self.current_tag_self_closing = false;
        self.current_attrs.clear();
        self.current_attr = None;
    }

    fn tag_name_push(&mut self, c: char) {
        self.current_tag_name.push(c);
    }

    fn start_attr(&mut self, c: char) {
        self.finish_attr_if_any();
        let pos = self.position();
        self.current_attr = Some(AttrInProgress {
            name: c.to_string(),
            name_pos: pos,
            value: String::new(),
        });
    }

    fn attr_name_push(&mut self, c: char) {
        if let Some(a) = &mut self.current_attr {
            a.name.push(c);
        }
    }

    fn attr_value_push(&mut self, c: char) {
        if let Some(a) = &mut self.current_attr {
            a.value.push(c);
        }
    }

    fn attr_value_push_str(&mut self, s: &str) {
        if let Some(a) = &mut self.current_attr {
            a.value.push_str(s);
        }
    }

    fn finish_attr_if_any(&mut self) {
        if let Some(attr) = self.current_attr.take() {
            if self.current_attrs.iter().any(|a| a.name == attr.name) {
                self.error("duplicate attribute");
            } else {
                self.current_attrs.push(attr);
            }
        }
    }

    fn emit_current_tag(&mut self) {
        self.finish_attr_if_any();
        self.flush_chars();
        if self.current_tag_kind == TagKind::EndTag && !self.current_attrs.is_empty() {
            self.error("attributes incorrectly present on end tag");
        }
        if self.current_tag_kind == TagKind::EndTag && self.current_tag_self_closing {
            self.error("self-closing flag on end tag");
        }
        let attrs = self
            .current_attrs
            .drain(..)
            .map(|a| TokenAttribute {
                name: StrTendril::from(a.name.as_str()),
                value: StrTendril::from(a.value.as_str()),
                name_position: a.name_pos,
            })
            .collect();
        let name = self.current_tag_name.clone();
        if self.current_tag_kind == TagKind::StartTag {
            self.raw_end_tag = Some(RawEndTagMatch {
                expected: name.to_ascii_lowercase(),
            });
        }
        self.emit(TagToken(Tag {
            kind: self.current_tag_kind,
            name: StrTendril::from(name.as_str()),
            self_closing: self.current_tag_self_closing,
            attrs,
        }));
    }

    fn emit_comment(&mut self) {
        self.flush_chars();
        let c = std::mem::take(&mut self.current_comment);
        self.emit(CommentToken(StrTendril::from(c.as_str())));
    }

    fn cdata_push(&mut self, c: char) {
        self.current_cdata.push(c);
    }

    fn cdata_push_str(&mut self, s: &str) {
        self.current_cdata.push_str(s);
    }

    fn emit_cdata(&mut self) {
        self.flush_chars();
        let c = std::mem::take(&mut self.current_cdata);
        self.emit(Token::CDataToken(StrTendril::from(c.as_str())));
    }

    fn emit_doctype(&mut self) {
        self.flush_chars();
        let d = std::mem::take(&mut self.current_doctype);
        self.emit(DoctypeToken(d));
    }

    fn emit_eof(&mut self) {
        self.flush_chars();
        self.error("unexpectedly reached end of file");
        self.emit(EofToken);
        self.eof_emitted = true;
    }

    /// Does the upcoming end tag, if any, match the "appropriate end tag
    /// name" for the raw-text run we are currently in?
    fn raw_end_tag_matches(&mut self) -> bool {
        match &self.raw_end_tag {
            None => false,
            Some(expect) => {
                let ahead = self.reader.peek_str(expect.expected.chars().count() + 1);
                let lower = ahead.to_ascii_lowercase();
                if !lower.starts_with(&expect.expected) {
                    return false;
                }
                match lower.chars().nth(expect.expected.chars().count()) {
                    Some(c) => c.is_ascii_whitespace() || c == '/' || c == '>',
                    None => false,
                }
            }
        }
    }

    // -- the state machine ---------------------------------------------------

    fn step(&mut self) {
        trace!("tokenizer state {:?}", self.state);
        match self.state {
            State::Data => self.step_data(),
            State::Plaintext => self.step_plaintext(),
            State::TagOpen => self.step_tag_open(),
            State::EndTagOpen => self.step_end_tag_open(),
            State::TagName => self.step_tag_name(),
            State::RawData(k) => self.step_raw_data(k),
            State::RawLessThanSign(k) => self.step_raw_less_than_sign(k),
            State::RawEndTagOpen(k) => self.step_raw_end_tag_open(k),
            State::RawEndTagName(k) => self.step_raw_end_tag_name(k),
            State::ScriptDataEscapeStart(k) => self.step_script_data_escape_start(k),
            State::ScriptDataEscapeStartDash => self.step_script_data_escape_start_dash(),
            State::ScriptDataEscapedDash(k) => self.step_script_data_escaped_dash(k),
            State::ScriptDataEscapedDashDash(k) => self.step_script_data_escaped_dash_dash(k),
            State::ScriptDataDoubleEscapeEnd => self.step_script_data_double_escape_end(),
            State::BeforeAttributeName => self.step_before_attribute_name(),
            State::AttributeName => self.step_attribute_name(),
            State::AfterAttributeName => self.step_after_attribute_name(),
            State::BeforeAttributeValue => self.step_before_attribute_value(),
            State::AttributeValue(k) => self.step_attribute_value(k),
            State::AfterAttributeValueQuoted => self.step_after_attribute_value_quoted(),
            State::SelfClosingStartTag => self.step_self_closing_start_tag(),
            State::BogusComment => self.step_bogus_comment(),
            State::MarkupDeclarationOpen => self.step_markup_declaration_open(),
            State::CommentStart => self.step_comment_start(),
            State::CommentStartDash => self.step_comment_start_dash(),
            State::Comment => self.step_comment(),
            State::CommentLessThanSign => self.step_comment_less_than_sign(),
            State::CommentLessThanSignBang => self.step_comment_less_than_sign_bang(),
            State::CommentLessThanSignBangDash => self.step_comment_less_than_sign_bang_dash(),
            State::CommentLessThanSignBangDashDash => {
                self.step_comment_less_than_sign_bang_dash_dash()
            }
            State::CommentEndDash => self.step_comment_end_dash(),
            State::CommentEnd => self.step_comment_end(),
            State::CommentEndBang => self.step_comment_end_bang(),
            State::Doctype => self.step_doctype(),
            State::BeforeDoctypeName => self.step_before_doctype_name(),
            State::DoctypeName => self.step_doctype_name(),
            State::AfterDoctypeName => self.step_after_doctype_name(),
            State::AfterDoctypeKeyword(k) => self.step_after_doctype_keyword(k),
            State::BeforeDoctypeIdentifier(k) => self.step_before_doctype_identifier(k),
            State::DoctypeIdentifierDoubleQuoted(k) => {
                self.step_doctype_identifier_quoted(k, '"')
            }
            State::DoctypeIdentifierSingleQuoted(k) => {
                self.step_doctype_identifier_quoted(k, '\'')
            }
            State::AfterDoctypeIdentifier(k) => self.step_after_doctype_identifier(k),
            State::BetweenDoctypePublicAndSystemIdentifiers => {
                self.step_between_doctype_public_and_system()
            }
            State::BogusDoctype => self.step_bogus_doctype(),
            State::CdataSection => self.step_cdata_section(),
            State::CdataSectionBracket => self.step_cdata_section_bracket(),
            State::CdataSectionEnd => self.step_cdata_section_end(),
        }
    }

    fn step_data(&mut self) {
        match self.reader.current() {
            None => self.emit_eof(),
            Some('&') => {
                self.reader.consume();
                self.consume_char_ref_into_data(None);
            }
            Some('<') => {
                self.reader.consume();
                self.state = states::TagOpen;
            }
            Some('\0') => {
                self.reader.consume();
                self.emit_char('\0');
            }
            Some(_) => {
                let run = self.reader.consume_data();
                if run.is_empty() {
                    // consume_data stops at '&'/'<'/'\0'; if nothing was
                    // consumed we must still make progress.
                    let c = self.reader.consume().unwrap();
                    self.emit_char(c);
                } else {
                    self.emit_str(&run);
                }
            }
        }
    }

    fn consume_char_ref_into_data(&mut self, additional_allowed: Option<char>) {
        match char_ref::consume_character_reference(&mut self.reader, additional_allowed, false) {
            Some(cref) => {
                if cref.error {
                    self.error("invalid character reference");
                }
                self.emit_str(&cref.text);
            }
            None => self.emit_char('&'),
        }
    }

    fn step_plaintext(&mut self) {
        match self.reader.consume() {
            None => self.emit_eof(),
            Some(c) => self.emit_char(c),
        }
    }

    fn step_tag_open(&mut self) {
        match self.reader.current() {
            Some('!') => {
                self.reader.consume();
                self.state = states::MarkupDeclarationOpen;
            }
            Some('/') => {
                self.reader.consume();
                self.state = states::EndTagOpen;
            }
            Some(c) if c.is_ascii_alphabetic() => {
                self.start_new_tag(TagKind::StartTag, "");
                self.state = states::TagName;
            }
            Some('?') => {
                self.error("unexpected question mark instead of tag name");
                self.current_comment.clear();
                self.current_comment.push('?');
                self.reader.consume();
                self.state = states::BogusComment;
            }
            Some(_) => {
                self.error("invalid first character of tag name");
                self.emit_char('<');
                self.state = states::Data;
            }
            None => {
                self.error("eof before tag name");
                self.emit_char('<');
                self.emit_eof();
            }
        }
    }

    fn step_end_tag_open(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.start_new_tag(TagKind::EndTag, "");
                self.state = states::TagName;
            }
            Some('>') => {
                self.error("missing end tag name");
                self.reader.consume();
                self.state = states::Data;
            }
            Some(_) => {
                self.error("invalid first character of tag name");
                self.current_comment.clear();
                self.state = states::BogusComment;
            }
            None => {
                self.error("eof before tag name");
                self.emit_str("</");
                self.emit_eof();
            }
        }
    }

    fn step_tag_name(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
                self.state = states::BeforeAttributeName;
            }
            Some('/') => {
                self.reader.consume();
                self.state = states::SelfClosingStartTag;
            }
            Some('>') => {
                self.reader.consume();
                self.emit_current_tag();
                self.after_emit_tag();
            }
            Some('\0') => {
                self.error("unexpected null character");
                self.reader.consume();
                self.tag_name_push('\u{FFFD}');
            }
            Some(c) => {
                self.reader.consume();
                self.tag_name_push(c);
            }
            None => {
                self.error("eof in tag");
                self.emit_eof();
            }
        }
    }

    /// After a start tag is emitted, a raw-text element switches the
    /// tokenizer into the matching special state. Void/
    /// normal elements stay in `Data`; this is only a heuristic at the
    /// tokenizer layer — the tree builder may override it for elements it
    /// tracks more precisely (foreign content, `<plaintext>`).
    fn after_emit_tag(&mut self) {
        if self.current_tag_kind != TagKind::StartTag {
            self.state = states::Data;
            return;
        }
        let name = self.current_tag_name.to_ascii_lowercase();
        self.state = match name.as_str() {
            "script" => states::RawData(RawKind::ScriptData),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                states::RawData(RawKind::Rawtext)
            }
            "textarea" | "title" => states::RawData(RawKind::Rcdata),
            "plaintext" => states::Plaintext,
            _ => states::Data,
        };
    }

    fn step_raw_data(&mut self, kind: RawKind) {
        match self.reader.current() {
            None => self.emit_eof(),
            Some('<') => {
                self.reader.consume();
                self.state = states::RawLessThanSign(kind);
            }
            Some('&') if matches!(kind, RawKind::Rcdata) => {
                self.reader.consume();
                self.consume_char_ref_into_data(None);
            }
            Some('\0') => {
                self.error("unexpected null character");
                self.reader.consume();
                self.emit_char('\u{FFFD}');
            }
            Some(_) => {
                let run = self.reader.consume_raw_data();
                if run.is_empty() {
                    let c = self.reader.consume().unwrap();
                    self.emit_char(c);
                } else {
                    self.emit_str(&run);
                }
            }
        }
    }

    fn step_raw_less_than_sign(&mut self, kind: RawKind) {
        match self.reader.current() {
            Some('/') => {
                self.reader.consume();
                self.temp_buffer.clear();
                self.state = states::RawEndTagOpen(kind);
            }
            Some('!') if matches!(kind, RawKind::ScriptData) => {
                self.reader.consume();
                self.emit_str("<!");
                self.state = states::ScriptDataEscapeStart(ScriptEscapeKind::Escaped);
            }
            _ => {
                self.emit_char('<');
                self.state = states::RawData(kind);
            }
        }
    }

    fn step_raw_end_tag_open(&mut self, kind: RawKind) {
        match self.reader.current() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.start_new_tag(TagKind::EndTag, "");
                self.state = states::RawEndTagName(kind);
            }
            _ => {
                self.emit_str("</");
                self.state = states::RawData(kind);
            }
        }
    }

    fn step_raw_end_tag_name(&mut self, kind: RawKind) {
        if self.raw_end_tag_matches() {
            match self.reader.current() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.reader.consume();
                    self.state = states::BeforeAttributeName;
                    return;
                }
                Some('/') => {
                    self.reader.consume();
                    self.state = states::SelfClosingStartTag;
                    return;
                }
                Some('>') => {
                    self.reader.consume();
                    self.emit_current_tag();
                    self.state = states::Data;
                    return;
                }
                _ => {}
            }
        }
        match self.reader.current() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.reader.consume();
                self.tag_name_push(c);
            }
            _ => {
                self.emit_str("</");
                self.emit_str(&self.current_tag_name.clone());
                self.state = states::RawData(kind);
            }
        }
    }

    fn step_script_data_escape_start(&mut self, kind: ScriptEscapeKind) {
        match self.reader.current() {
            Some('-') => {
                self.reader.consume();
                self.emit_char('-');
                self.state = states::ScriptDataEscapeStartDash;
            }
            _ => self.state = states::RawData(RawKind::ScriptData),
        }
        let _ = kind;
    }

    fn step_script_data_escape_start_dash(&mut self) {
        match self.reader.current() {
            Some('-') => {
                self.reader.consume();
                self.emit_char('-');
                self.state =
                    states::ScriptDataEscapedDashDash(ScriptEscapeKind::Escaped);
            }
            _ => self.state = states::RawData(RawKind::ScriptData),
        }
    }

    fn step_script_data_escaped_dash(&mut self, kind: ScriptEscapeKind) {
        match self.reader.current() {
            Some('-') => {
                self.reader.consume();
                self.emit_char('-');
                self.state = states::ScriptDataEscapedDashDash(kind);
            }
            Some('<') => {
                self.reader.consume();
                self.state = states::RawLessThanSign(RawKind::ScriptDataEscaped(kind));
            }
            Some('\0') => {
                self.reader.consume();
                self.emit_char('\u{FFFD}');
                self.state = states::RawData(RawKind::ScriptDataEscaped(kind));
            }
            Some(c) => {
                self.reader.consume();
                self.emit_char(c);
                self.state = states::RawData(RawKind::ScriptDataEscaped(kind));
            }
            None => self.emit_eof(),
        }
    }

    fn step_script_data_escaped_dash_dash(&mut self, kind: ScriptEscapeKind) {
        match self.reader.current() {
            Some('-') => {
                self.reader.consume();
                self.emit_char('-');
            }
            Some('<') => {
                self.reader.consume();
                self.state = states::RawLessThanSign(RawKind::ScriptDataEscaped(kind));
            }
            Some('>') => {
                self.reader.consume();
                self.emit_char('>');
                self.state = states::RawData(RawKind::ScriptData);
            }
            Some('\0') => {
                self.reader.consume();
                self.emit_char('\u{FFFD}');
                self.state = states::RawData(RawKind::ScriptDataEscaped(kind));
            }
            Some(c) => {
                self.reader.consume();
                self.emit_char(c);
                self.state = states::RawData(RawKind::ScriptDataEscaped(kind));
            }
            None => self.emit_eof(),
        }
    }

    fn step_script_data_double_escape_end(&mut self) {
        // Simplified: treat like returning to the single-escaped state once
        // the closing "script" token is matched, per the whatwg algorithm's
        // double-escape toggling.
        self.state = states::RawData(RawKind::ScriptDataEscaped(ScriptEscapeKind::Escaped));
    }

    fn step_before_attribute_name(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
            }
            Some('/') | Some('>') | None => {
                self.state = states::AfterAttributeName;
            }
            Some('=') => {
                self.error("unexpected equals sign before attribute name");
                self.reader.consume();
                self.start_attr('=');
                self.state = states::AttributeName;
            }
            Some(c) => {
                self.reader.consume();
                self.start_attr(if c == '\0' { '\u{FFFD}' } else { c });
                self.state = states::AttributeName;
            }
        }
    }

    fn step_attribute_name(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() || c == '/' || c == '>' => {
                self.state = states::AfterAttributeName;
            }
            None => self.state = states::AfterAttributeName,
            Some('=') => {
                self.reader.consume();
                self.state = states::BeforeAttributeValue;
            }
            Some('\0') => {
                self.reader.consume();
                self.attr_name_push('\u{FFFD}');
            }
            Some(c) => {
                self.reader.consume();
                self.attr_name_push(c);
            }
        }
    }

    fn step_after_attribute_name(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
            }
            Some('/') => {
                self.reader.consume();
                self.state = states::SelfClosingStartTag;
            }
            Some('=') => {
                self.reader.consume();
                self.state = states::BeforeAttributeValue;
            }
            Some('>') => {
                self.reader.consume();
                self.emit_current_tag();
                self.after_emit_tag();
            }
            Some(c) => {
                self.start_attr(c);
                self.reader.consume();
                self.state = states::AttributeName;
            }
            None => {
                self.error("eof in tag");
                self.emit_eof();
            }
        }
    }

    fn step_before_attribute_value(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
            }
            Some('"') => {
                self.reader.consume();
                self.state = states::AttributeValue(states::DoubleQuoted);
            }
            Some('\'') => {
                self.reader.consume();
                self.state = states::AttributeValue(states::SingleQuoted);
            }
            Some('>') => {
                self.error("missing attribute value");
                self.reader.consume();
                self.emit_current_tag();
                self.after_emit_tag();
            }
            _ => self.state = states::AttributeValue(states::Unquoted),
        }
    }

    fn step_attribute_value(&mut self, kind: states::AttrValueKind) {
        use states::AttrValueKind::*;
        match kind {
            DoubleQuoted | SingleQuoted => {
                let quote = if kind == DoubleQuoted { '"' } else { '\'' };
                match self.reader.current() {
                    Some(c) if c == quote => {
                        self.reader.consume();
                        self.state = states::AfterAttributeValueQuoted;
                    }
                    Some('&') => {
                        self.reader.consume();
                        self.consume_char_ref_into_attr(Some(quote));
                    }
                    Some('\0') => {
                        self.reader.consume();
                        self.attr_value_push('\u{FFFD}');
                    }
                    Some(_) => {
                        let run = self.reader.consume_attribute_quoted(kind == SingleQuoted);
                        if run.is_empty() {
                            let c = self.reader.consume().unwrap();
                            self.attr_value_push(c);
                        } else {
                            self.attr_value_push_str(&run);
                        }
                    }
                    None => {
                        self.error("eof in tag");
                        self.emit_eof();
                    }
                }
            }
            Unquoted => match self.reader.current() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.reader.consume();
                    self.state = states::BeforeAttributeName;
                }
                Some('&') => {
                    self.reader.consume();
                    self.consume_char_ref_into_attr(None);
                }
                Some('>') => {
                    self.reader.consume();
                    self.emit_current_tag();
                    self.after_emit_tag();
                }
                Some('\0') => {
                    self.reader.consume();
                    self.attr_value_push('\u{FFFD}');
                }
                Some(c @ ('"' | '\'' | '<' | '=' | '`')) => {
                    self.error("unexpected character in unquoted attribute value");
                    self.reader.consume();
                    self.attr_value_push(c);
                }
                Some(c) => {
                    self.reader.consume();
                    self.attr_value_push(c);
                }
                None => {
                    self.error("eof in tag");
                    self.emit_eof();
                }
            },
        }
    }

    fn consume_char_ref_into_attr(&mut self, additional_allowed: Option<char>) {
        match char_ref::consume_character_reference(&mut self.reader, additional_allowed, true) {
            Some(cref) => {
                if cref.error {
                    self.error("invalid character reference");
                }
                self.attr_value_push_str(&cref.text);
            }
            None => self.attr_value_push('&'),
        }
    }

    fn step_after_attribute_value_quoted(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
                self.state = states::BeforeAttributeName;
            }
            Some('/') => {
                self.reader.consume();
                self.state = states::SelfClosingStartTag;
            }
            Some('>') => {
                self.reader.consume();
                self.emit_current_tag();
                self.after_emit_tag();
            }
            Some(_) => {
                self.error("missing whitespace between attributes");
                self.state = states::BeforeAttributeName;
            }
            None => {
                self.error("eof in tag");
                self.emit_eof();
            }
        }
    }

    fn step_self_closing_start_tag(&mut self) {
        match self.reader.current() {
            Some('>') => {
                self.reader.consume();
                self.current_tag_self_closing = true;
                self.emit_current_tag();
                self.after_emit_tag();
            }
            Some(_) => {
                self.error("unexpected solidus in tag");
                self.state = states::BeforeAttributeName;
            }
            None => {
                self.error("eof in tag");
                self.emit_eof();
            }
        }
    }

    fn step_bogus_comment(&mut self) {
        match self.reader.current() {
            Some('>') => {
                self.reader.consume();
                self.emit_comment();
                self.state = states::Data;
            }
            Some('\0') => {
                self.reader.consume();
                self.current_comment.push('\u{FFFD}');
            }
            Some(c) => {
                self.reader.consume();
                self.current_comment.push(c);
            }
            None => {
                self.emit_comment();
                self.emit_eof();
            }
        }
    }

    fn step_markup_declaration_open(&mut self) {
        if self.reader.match_consume_str("--", false) {
            self.current_comment.clear();
            self.state = states::CommentStart;
        } else if self.reader.match_consume_str("doctype", true) {
            self.state = states::Doctype;
        } else if self.reader.match_consume_str("[CDATA[", false) {
            self.state = states::CdataSection;
        } else {
            self.error("incorrectly opened comment");
            self.current_comment.clear();
            self.state = states::BogusComment;
        }
    }

    fn step_comment_start(&mut self) {
        match self.reader.current() {
            Some('-') => {
                self.reader.consume();
                self.state = states::CommentStartDash;
            }
            Some('>') => {
                self.error("abrupt closing of empty comment");
                self.reader.consume();
                self.emit_comment();
                self.state = states::Data;
            }
            _ => self.state = states::Comment,
        }
    }

    fn step_comment_start_dash(&mut self) {
        match self.reader.current() {
            Some('-') => {
                self.reader.consume();
                self.state = states::CommentEnd;
            }
            Some('>') => {
                self.error("abrupt closing of empty comment");
                self.reader.consume();
                self.emit_comment();
                self.state = states::Data;
            }
            None => {
                self.emit_comment();
                self.emit_eof();
            }
            _ => {
                self.current_comment.push('-');
                self.state = states::Comment;
            }
        }
    }

    fn step_comment(&mut self) {
        match self.reader.current() {
            Some('<') => {
                self.reader.consume();
                self.current_comment.push('<');
                self.state = states::CommentLessThanSign;
            }
            Some('-') => {
                self.reader.consume();
                self.state = states::CommentEndDash;
            }
            Some('\0') => {
                self.reader.consume();
                self.current_comment.push('\u{FFFD}');
            }
            Some(c) => {
                self.reader.consume();
                self.current_comment.push(c);
            }
            None => {
                self.error("eof in comment");
                self.emit_comment();
                self.emit_eof();
            }
        }
    }

    fn step_comment_less_than_sign(&mut self) {
        match self.reader.current() {
            Some('!') => {
                self.reader.consume();
                self.current_comment.push('!');
                self.state = states::CommentLessThanSignBang;
            }
            Some('<') => {
                self.reader.consume();
                self.current_comment.push('<');
            }
            _ => self.state = states::Comment,
        }
    }

    fn step_comment_less_than_sign_bang(&mut self) {
        match self.reader.current() {
            Some('-') => {
                self.reader.consume();
                self.state = states::CommentLessThanSignBangDash;
            }
            _ => self.state = states::Comment,
        }
    }

    fn step_comment_less_than_sign_bang_dash(&mut self) {
        match self.reader.current() {
            Some('-') => {
                self.reader.consume();
                self.state = states::CommentLessThanSignBangDashDash;
            }
            _ => self.state = states::CommentEndDash,
        }
    }

    fn step_comment_less_than_sign_bang_dash_dash(&mut self) {
        self.state = states::CommentEnd;
        let _ = self.reader.current();
    }

    fn step_comment_end_dash(&mut self) {
        match self.reader.current() {
            Some('-') => {
                self.reader.consume();
                self.state = states::CommentEnd;
            }
            None => {
                self.error("eof in comment");
                self.emit_comment();
                self.emit_eof();
            }
            _ => {
                self.current_comment.push('-');
                self.state = states::Comment;
            }
        }
    }

    fn step_comment_end(&mut self) {
        match self.reader.current() {
            Some('>') => {
                self.reader.consume();
                self.emit_comment();
                self.state = states::Data;
            }
            Some('!') => {
                self.reader.consume();
                self.state = states::CommentEndBang;
            }
            Some('-') => {
                self.reader.consume();
                self.current_comment.push('-');
            }
            None => {
                self.error("eof in comment");
                self.emit_comment();
                self.emit_eof();
            }
            _ => {
                self.current_comment.push_str("--");
                self.state = states::Comment;
            }
        }
    }

    fn step_comment_end_bang(&mut self) {
        match self.reader.current() {
            Some('-') => {
                self.reader.consume();
                self.current_comment.push_str("--!");
                self.state = states::CommentEndDash;
            }
            Some('>') => {
                self.error("incorrectly closed comment");
                self.reader.consume();
                self.emit_comment();
                self.state = states::Data;
            }
            None => {
                self.error("eof in comment");
                self.emit_comment();
                self.emit_eof();
            }
            _ => {
                self.current_comment.push_str("--!");
                self.state = states::Comment;
            }
        }
    }

    fn step_doctype(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
                self.state = states::BeforeDoctypeName;
            }
            Some('>') => self.state = states::BeforeDoctypeName,
            None => {
                self.error("eof in doctype");
                self.current_doctype = Doctype {
                    force_quirks: true,
                    ..Doctype::default()
                };
                self.emit_doctype();
                self.emit_eof();
            }
            _ => {
                self.error("missing whitespace before doctype name");
                self.state = states::BeforeDoctypeName;
            }
        }
    }

    fn step_before_doctype_name(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
            }
            Some('>') => {
                self.error("missing doctype name");
                self.reader.consume();
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.state = states::Data;
            }
            Some('\0') => {
                self.reader.consume();
                self.current_doctype.name = Some(StrTendril::from("\u{FFFD}"));
                self.state = states::DoctypeName;
            }
            Some(c) => {
                self.reader.consume();
                self.current_doctype.name =
                    Some(StrTendril::from(c.to_ascii_lowercase().to_string().as_str()));
                self.state = states::DoctypeName;
            }
            None => {
                self.error("eof in doctype");
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
        }
    }

    fn doctype_name_push(&mut self, c: char) {
        let mut name = self
            .current_doctype
            .name
            .take()
            .map(|t| t.to_string())
            .unwrap_or_default();
        name.push(c);
        self.current_doctype.name = Some(StrTendril::from(name.as_str()));
    }

    fn step_doctype_name(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
                self.state = states::AfterDoctypeName;
            }
            Some('>') => {
                self.reader.consume();
                self.emit_doctype();
                self.state = states::Data;
            }
            Some('\0') => {
                self.reader.consume();
                self.doctype_name_push('\u{FFFD}');
            }
            Some(c) => {
                self.reader.consume();
                self.doctype_name_push(c.to_ascii_lowercase());
            }
            None => {
                self.error("eof in doctype");
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
        }
    }

    fn step_after_doctype_name(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
            }
            Some('>') => {
                self.reader.consume();
                self.emit_doctype();
                self.state = states::Data;
            }
            None => {
                self.error("eof in doctype");
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            _ => {
                if self.reader.match_consume_str("public", true) {
                    self.state = states::AfterDoctypeKeyword(Public);
                } else if self.reader.match_consume_str("system", true) {
                    self.state = states::AfterDoctypeKeyword(System);
                } else {
                    self.error("invalid character sequence after doctype name");
                    self.reader.consume();
                    self.current_doctype.force_quirks = true;
                    self.state = states::BogusDoctype;
                }
            }
        }
    }

    fn step_after_doctype_keyword(&mut self, kind: DoctypeIdKind) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
                self.state = states::BeforeDoctypeIdentifier(kind);
            }
            Some('"') | Some('\'') => {
                self.error("missing whitespace after doctype keyword");
                self.state = states::BeforeDoctypeIdentifier(kind);
            }
            Some('>') => {
                self.error("missing doctype identifier");
                self.reader.consume();
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.state = states::Data;
            }
            None => {
                self.error("eof in doctype");
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            _ => {
                self.error("missing quote before doctype identifier");
                self.current_doctype.force_quirks = true;
                self.state = states::BogusDoctype;
            }
        }
    }

    fn step_before_doctype_identifier(&mut self, kind: DoctypeIdKind) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
            }
            Some('"') => {
                self.reader.consume();
                self.set_doctype_id(kind, String::new());
                self.state = states::DoctypeIdentifierDoubleQuoted(kind);
            }
            Some('\'') => {
                self.reader.consume();
                self.set_doctype_id(kind, String::new());
                self.state = states::DoctypeIdentifierSingleQuoted(kind);
            }
            Some('>') => {
                self.error("missing doctype identifier");
                self.reader.consume();
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.state = states::Data;
            }
            None => {
                self.error("eof in doctype");
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            _ => {
                self.error("missing quote before doctype identifier");
                self.current_doctype.force_quirks = true;
                self.state = states::BogusDoctype;
            }
        }
    }

    fn set_doctype_id(&mut self, kind: DoctypeIdKind, value: String) {
        let tendril = StrTendril::from(value.as_str());
        match kind {
            Public => self.current_doctype.public_id = Some(tendril),
            System => self.current_doctype.system_id = Some(tendril),
        }
    }

    fn doctype_id_push(&mut self, kind: DoctypeIdKind, c: char) {
        let field = match kind {
            Public => &mut self.current_doctype.public_id,
            System => &mut self.current_doctype.system_id,
        };
        let mut s = field.take().map(|t| t.to_string()).unwrap_or_default();
        s.push(c);
        *field = Some(StrTendril::from(s.as_str()));
    }

    fn step_doctype_identifier_quoted(&mut self, kind: DoctypeIdKind, quote: char) {
        match self.reader.current() {
            Some(c) if c == quote => {
                self.reader.consume();
                self.state = states::AfterDoctypeIdentifier(kind);
            }
            Some('\0') => {
                self.reader.consume();
                self.doctype_id_push(kind, '\u{FFFD}');
            }
            Some('>') => {
                self.error("abrupt doctype public identifier");
                self.reader.consume();
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.state = states::Data;
            }
            Some(c) => {
                self.reader.consume();
                self.doctype_id_push(kind, c);
            }
            None => {
                self.error("eof in doctype");
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
        }
    }

    fn step_after_doctype_identifier(&mut self, kind: DoctypeIdKind) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
            }
            Some('>') => {
                self.reader.consume();
                self.emit_doctype();
                self.state = states::Data;
            }
            None => {
                self.error("eof in doctype");
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            _ if kind == Public => {
                self.error("missing whitespace between doctype public and system identifiers");
                self.state = states::BetweenDoctypePublicAndSystemIdentifiers;
            }
            _ => {
                self.error("unexpected character after doctype system identifier");
                self.state = states::BogusDoctype;
            }
        }
    }

    fn step_between_doctype_public_and_system(&mut self) {
        match self.reader.current() {
            Some(c) if c.is_ascii_whitespace() => {
                self.reader.consume();
            }
            Some('"') => {
                self.reader.consume();
                self.set_doctype_id(System, String::new());
                self.state = states::DoctypeIdentifierDoubleQuoted(System);
            }
            Some('\'') => {
                self.reader.consume();
                self.set_doctype_id(System, String::new());
                self.state = states::DoctypeIdentifierSingleQuoted(System);
            }
            Some('>') => {
                self.reader.consume();
                self.emit_doctype();
                self.state = states::Data;
            }
            None => {
                self.error("eof in doctype");
                self.current_doctype.force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            _ => {
                self.error("missing quote before doctype system identifier");
                self.current_doctype.force_quirks = true;
                self.state = states::BogusDoctype;
            }
        }
    }

    fn step_bogus_doctype(&mut self) {
        match self.reader.current() {
            Some('>') => {
                self.reader.consume();
                self.emit_doctype();
                self.state = states::Data;
            }
            Some(_) => {
                self.reader.consume();
            }
            None => {
                self.emit_doctype();
                self.emit_eof();
            }
        }
    }

    fn step_cdata_section(&mut self) {
        match self.reader.current() {
            Some(']') => {
                self.reader.consume();
                self.state = states::CdataSectionBracket;
            }
            None => {
                self.error("eof in cdata");
                self.emit_cdata();
                self.emit_eof();
            }
            Some(_) => {
                let run = self.reader.consume_to_any(b"]\0");
                if run.is_empty() {
                    let c = self.reader.consume().unwrap();
                    self.cdata_push(c);
                } else {
                    self.cdata_push_str(&run);
                }
            }
        }
    }

    fn step_cdata_section_bracket(&mut self) {
        match self.reader.current() {
            Some(']') => {
                self.reader.consume();
                self.state = states::CdataSectionEnd;
            }
            _ => {
                self.cdata_push(']');
                self.state = states::CdataSection;
            }
        }
    }

    fn step_cdata_section_end(&mut self) {
        match self.reader.current() {
            Some(']') => {
                self.reader.consume();
                self.cdata_push(']');
            }
            Some('>') => {
                self.reader.consume();
                self.emit_cdata();
                self.state = states::Data;
            }
            _ => {
                self.cdata_push_str("]]");
                self.state = states::CdataSection;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let mut t = Tokenizer::new(StrTendril::from(input), TokenizerOpts::default());
        let mut out = Vec::new();
        loop {
            let tok = t.next_token();
            let is_eof = matches!(tok, EofToken);
            out.push(tok);
            if is_eof {
                break;
            }
        }
        out
    }

    #[test]
    fn simple_start_and_end_tag() {
        let toks = tokenize("<p>hi</p>");
        assert!(
            matches!(&toks[0], TagToken(t) if &*t.name == "p" && t.kind == TagKind::StartTag)
        );
        assert!(matches!(&toks[1], CharacterToken(s) if &**s == "hi"));
        assert!(matches!(&toks[2], TagToken(t) if &*t.name == "p" && t.kind == TagKind::EndTag));
    }

    #[test]
    fn attribute_parsing() {
        let toks = tokenize("<a href=\"x\" disabled>y</a>");
        match &toks[0] {
            TagToken(t) => {
                assert_eq!(&*t.name, "a");
                assert_eq!(t.attrs.len(), 2);
                assert_eq!(&*t.attrs[0].name, "href");
                assert_eq!(&*t.attrs[0].value, "x");
                assert_eq!(&*t.attrs[1].name, "disabled");
                assert_eq!(&*t.attrs[1].value, "");
            }
            other => panic!("expected start tag, got {:?}", other),
        }
    }

    #[test]
    fn comment_token() {
        let toks = tokenize("<!-- hi -->");
        assert!(matches!(&toks[0], CommentToken(s) if &**s == " hi "));
    }

    #[test]
    fn doctype_token() {
        let toks = tokenize("<!DOCTYPE html>");
        match &toks[0] {
            DoctypeToken(d) => assert_eq!(d.name.as_deref(), Some("html")),
            other => panic!("expected doctype, got {:?}", other),
        }
    }

    #[test]
    fn named_entity_in_data() {
        let toks = tokenize("a&amp;b");
        assert!(matches!(&toks[0], CharacterToken(s) if &**s == "a&b"));
    }

    #[test]
    fn null_character_is_reported_and_replaced() {
        let toks = tokenize("a\0b");
        // The null splits the surrounding run into separate character
        // tokens around a dedicated `NullCharacterToken`.
        assert!(toks.iter().any(|t| matches!(t, Token::NullCharacterToken)));
    }

    #[test]
    fn unterminated_comment_at_eof() {
        let toks = tokenize("<!--abc");
        assert!(matches!(&toks[0], CommentToken(s) if &**s == "abc"));
        assert!(matches!(toks.last(), Some(EofToken)));
    }

    #[test]
    fn cdata_section() {
        let toks = tokenize("<![CDATA[hi]]>");
        assert!(matches!(&toks[0], CDataToken(s) if &**s == "hi"));
    }
}
