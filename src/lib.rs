// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A lenient, browser-grade HTML5 parser: tokenizer, WHATWG
//! tree-construction algorithm (with its error-recovery machinery —
//! adoption agency, foster parenting, implicit tag synthesis), a
//! reference-counted DOM, and a jsoup-like CSS selector engine for
//! querying the result.
//!
//! ```
//! let doc = loosehtml::parse_html("<p>hi", "");
//! let p = doc.document.select("p").unwrap().into_iter().next().unwrap();
//! assert_eq!(p.text_content(), "hi");
//! ```

#[macro_use]
mod macros;

mod buffer_queue;
mod reader;

pub mod dom;
pub mod entity;
pub mod error;
pub mod parser;
pub mod select;
pub mod tokenizer;
pub mod tree_builder;

pub use dom::{Attribute, Attributes, Handle, NodeData, OutputSettings, ParseSettings, QuirksMode};
pub use error::{Error, ParseError, ParseErrorList, Result};
pub use parser::{
    parse_body_fragment, parse_fragment, parse_html, parse_html_with_settings, parse_xml,
    parse_xml_fragment, ParsedDocument,
};
pub use select::{Elements, SelectorError};

/// Re-export of the `tendril` crate, since `StrTendril` appears in public
/// signatures (node text, attribute values).
pub mod tendril {
    pub use ::tendril::*;
}
