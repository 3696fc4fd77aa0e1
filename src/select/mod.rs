//! The CSS-like/jsoup-like selector engine: grammar,
//! compiled `Evaluator` tree, and traversal/`Collector`.

pub mod evaluator;
pub mod parser;

use std::ops::Deref;

use crate::dom::node::Handle;
use evaluator::Selector;

/// An ordered collection of matched elements, in document order. Derefs to
/// `[Handle]` so slice methods (`len`, `iter`, indexing) work directly;
/// the few extra helpers (`first`, `text`, `attr`) mirror jsoup's
/// `Elements` convenience API.
#[derive(Debug, Default, Clone)]
pub struct Elements(Vec<Handle>);

impl Elements {
    pub fn first(&self) -> Option<&Handle> {
        self.0.first()
    }

    /// Combined text content of every matched element, joined with a
    /// single space, mirroring jsoup's `Elements.text()`.
    pub fn text(&self) -> String {
        self.0
            .iter()
            .map(|h| h.text_content())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The named attribute's value from the first matched element, if any.
    pub fn attr(&self, key: &str) -> Option<String> {
        self.0
            .first()
            .and_then(|h| h.attrs())
            .and_then(|a| a.get(key).map(|v| v.to_string()))
    }
}

impl Deref for Elements {
    type Target = [Handle];

    fn deref(&self) -> &[Handle] {
        &self.0
    }
}

impl From<Vec<Handle>> for Elements {
    fn from(v: Vec<Handle>) -> Elements {
        Elements(v)
    }
}

impl IntoIterator for Elements {
    type Item = Handle;
    type IntoIter = std::vec::IntoIter<Handle>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Elements {
    type Item = &'a Handle;
    type IntoIter = std::slice::Iter<'a, Handle>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SelectorError {
    #[error("unexpected character {found:?} at position {pos} (expected {expected})")]
    Syntax {
        pos: usize,
        found: String,
        expected: &'static str,
    },

    #[error("unexpected end of selector (expected {0})")]
    UnexpectedEof(&'static str),

    #[error("unknown pseudo-class: {0}")]
    UnknownPseudo(String),

    #[error("invalid regular expression in selector: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid integer argument to {pseudo}: {value}")]
    InvalidInteger { pseudo: &'static str, value: String },
}

/// Compiles `query` and runs it against every descendant of `root`, in
/// document order.
pub fn select(root: &Handle, query: &str) -> Result<Elements, SelectorError> {
    let groups = parser::parse(query)?;
    let mut out = Vec::new();
    collect(root, &groups, &mut out);
    Ok(out.into())
}

/// Does `node` itself match `query`?
pub fn matches(node: &Handle, query: &str) -> Result<bool, SelectorError> {
    let groups = parser::parse(query)?;
    Ok(groups.iter().any(|s| evaluator::selector_matches(node, s)))
}

fn collect(root: &Handle, groups: &[Selector], out: &mut Vec<Handle>) {
    for child in root.children.borrow().iter() {
        if !child.is_element() {
            continue;
        }
        if groups.iter().any(|s| evaluator::selector_matches(child, s)) {
            out.push(child.clone());
        }
        collect(child, groups, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    #[test]
    fn select_by_tag_and_class() {
        let doc = parse_html("<div class='a'><p class='a'>x</p><p>y</p></div>", "");
        let found = doc.document.select("p.a").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].own_text(), "x");
    }

    #[test]
    fn select_descendant_and_child_combinators() {
        let doc = parse_html("<div><p><b>x</b></p><b>y</b></div>", "");
        assert_eq!(doc.document.select("div b").unwrap().len(), 2);
        assert_eq!(doc.document.select("div > b").unwrap().len(), 1);
    }

    #[test]
    fn select_has_and_contains() {
        let doc = parse_html("<div><p>hello world</p></div><div><p>bye</p></div>", "");
        let has = doc.document.select("div:has(p:contains(hello))").unwrap();
        assert_eq!(has.len(), 1);
    }

    #[test]
    fn select_nth_child() {
        let doc = parse_html("<ul><li>1</li><li>2</li><li>3</li></ul>", "");
        let second = doc.document.select("li:nth-child(2)").unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].own_text(), "2");
    }

    #[test]
    fn select_attribute_operators() {
        let doc = parse_html(
            "<a href='https://example.com/x'>a</a><a href='/local'>b</a>",
            "",
        );
        let external = doc.document.select("a[href^=https]").unwrap();
        assert_eq!(external.len(), 1);
    }

    #[test]
    fn select_attribute_not_equals() {
        let doc = parse_html("<input type='text'><input type='checkbox'>", "");
        let not_text = doc.document.select("input[type!=text]").unwrap();
        assert_eq!(not_text.len(), 1);
    }

    #[test]
    fn select_attribute_key_prefix() {
        let doc = parse_html("<div data-id='1'></div><div class='x'></div>", "");
        let found = doc.document.select("div[^data-]").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn select_attribute_value_as_regex() {
        let doc = parse_html("<a href='/a/1'>a</a><a href='/b/x'>b</a>", "");
        let numeric = doc.document.select(r"a[href~=\d+$]").unwrap();
        assert_eq!(numeric.len(), 1);
    }
}
