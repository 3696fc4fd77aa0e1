//! The node tree, attributes, tag interning, parse/output settings, and
//! serialization.

pub mod attributes;
pub mod node;
pub mod serializer;
pub mod settings;
pub mod tag;
pub mod url;

pub use attributes::{Attribute, Attributes};
pub use node::{Handle, NodeData, WeakHandle};
pub use settings::{OutputSettings, ParseSettings, QuirksMode};
pub use tag::Tag;

use crate::select::{self, Elements, SelectorError};

impl Handle {
    /// Renders this node and its descendants.
    pub fn outer_html(&self, settings: &OutputSettings) -> String {
        let mut out = String::new();
        serializer::serialize_outer(&mut out, self, settings);
        out
    }

    /// Renders this node and its descendants with default output settings.
    pub fn outer_html_default(&self) -> String {
        self.outer_html(&OutputSettings::default())
    }

    /// Renders just this node's children.
    pub fn html(&self, settings: &OutputSettings) -> String {
        let mut out = String::new();
        serializer::serialize_inner(&mut out, self, settings);
        out
    }

    /// Compiles and runs `query` against this node's descendants.
    pub fn select(&self, query: &str) -> Result<Elements, SelectorError> {
        select::select(self, query)
    }

    /// Like `select`, but returns only the first match, if any.
    pub fn select_first(&self, query: &str) -> Result<Option<Handle>, SelectorError> {
        Ok(select::select(self, query)?.into_iter().next())
    }

    /// Like `select_first`, but fails if nothing matched rather than
    /// returning `None` — for callers who know a match must exist.
    pub fn expect_first(&self, query: &str) -> crate::error::Result<Handle> {
        self.select_first(query)?
            .ok_or_else(|| crate::error::Error::NoMatch {
                query: query.to_string(),
            })
    }

    /// Does this node match `query`?
    pub fn matches(&self, query: &str) -> Result<bool, SelectorError> {
        select::matches(self, query)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_html;

    #[test]
    fn expect_first_returns_the_match() {
        let doc = parse_html("<div><p>hi</p></div>", "");
        let p = doc.document.expect_first("p").unwrap();
        assert_eq!(p.text_content(), "hi");
    }

    #[test]
    fn expect_first_errors_when_nothing_matches() {
        let doc = parse_html("<div></div>", "");
        let err = doc.document.expect_first("p").unwrap_err();
        assert!(err.to_string().contains("no element matched"));
    }
}
