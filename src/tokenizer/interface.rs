// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use tendril::StrTendril;

pub use self::TagKind::{EndTag, StartTag};
pub use self::Token::{CDataToken, CharacterToken, CommentToken, DoctypeToken, EofToken, TagToken};

use crate::error::Position;

/// A `DOCTYPE` token.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Doctype {
    pub name: Option<StrTendril>,
    pub public_id: Option<StrTendril>,
    pub system_id: Option<StrTendril>,
    pub force_quirks: bool,
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum TagKind {
    StartTag,
    EndTag,
}

/// A single tag attribute, preserving the case as written; the tree
/// builder normalizes it per `ParseSettings`.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TokenAttribute {
    pub name: StrTendril,
    pub value: StrTendril,
    pub name_position: Position,
}

/// A start or end tag token.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Tag {
    pub kind: TagKind,
    pub name: StrTendril,
    pub self_closing: bool,
    pub attrs: Vec<TokenAttribute>,
}

impl Tag {
    /// Equivalent modulo attribute order (used by the tree builder to spot
    /// redundant adjacent `<html>`/`<head>` starts during error recovery).
    pub fn equiv_modulo_attr_order(&self, other: &Tag) -> bool {
        if self.kind != other.kind || self.name != other.name {
            return false;
        }
        let mut a: Vec<_> = self.attrs.iter().map(|a| (&a.name, &a.value)).collect();
        let mut b: Vec<_> = other.attrs.iter().map(|a| (&a.name, &a.value)).collect();
        a.sort();
        b.sort();
        a == b
    }
}

/// The token stream produced by the tokenizer:
/// `StartTag`, `EndTag`, `Comment`, `Character`, `Doctype`, and `EOF`.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Token {
    TagToken(Tag),
    CommentToken(StrTendril),
    CharacterToken(StrTendril),
    /// U+0000 NULL, reported but not folded into a surrounding character run
    /// so the tree builder can apply the correct per-insertion-mode handling.
    NullCharacterToken,
    /// The text content of a `<![CDATA[ ... ]]>` section, kept distinct from
    /// `CharacterToken` so a tree builder that cares (the XML builder) can
    /// round-trip it as a `CDataNode` instead of a plain text node.
    CDataToken(StrTendril),
    DoctypeToken(Doctype),
    EofToken,
}
