//! Tag name interning. `html5ever`'s own tree builder works over
//! `string_cache::QualName`, built by a `build.rs`-driven codegen step
//! (`string_cache_codegen`); we cannot safely hand-author that codegen
//! without a compiler to check it against, so tag names are interned at
//! runtime instead, behind a process-wide table.

use std::collections::HashSet;
use std::sync::RwLock;

use once_cell::sync::Lazy;

static INTERNED: Lazy<RwLock<HashSet<&'static str>>> = Lazy::new(|| RwLock::new(HashSet::new()));

/// An interned, lowercased HTML/XML tag name. Cheap to copy and compare
/// (pointer/length equality via the underlying `&'static str`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(&'static str);

impl Tag {
    /// Interns `name`, lowercasing it first (HTML tag names are
    /// case-insensitive; XML tag names are interned as-given by callers
    /// that care about case, via `new_exact`).
    pub fn new(name: &str) -> Tag {
        Tag::new_exact(&name.to_ascii_lowercase())
    }

    /// Interns `name` verbatim, without lowercasing. Used by the XML tree
    /// builder, where tag names are case-sensitive.
    pub fn new_exact(name: &str) -> Tag {
        if let Some(hit) = INTERNED.read().unwrap().get(name) {
            return Tag(hit);
        }
        let mut table = INTERNED.write().unwrap();
        if let Some(hit) = table.get(name) {
            return Tag(hit);
        }
        let leaked: &'static str = Box::leak(name.to_string().into_boxed_str());
        table.insert(leaked);
        Tag(leaked)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl std::fmt::Debug for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tag({:?})", self.0)
    }
}

impl PartialEq<&str> for Tag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The elements whose end tag may always be omitted, and a handful of
/// other membership tests the tree builder consults constantly. Kept as
/// plain functions rather than a bitflag on `Tag` itself, since the
/// interning pool has no room to carry metadata alongside the string.
pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

pub fn is_special(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "applet"
            | "area"
            | "article"
            | "aside"
            | "base"
            | "basefont"
            | "bgsound"
            | "blockquote"
            | "body"
            | "br"
            | "button"
            | "caption"
            | "center"
            | "col"
            | "colgroup"
            | "dd"
            | "details"
            | "dir"
            | "div"
            | "dl"
            | "dt"
            | "embed"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "frame"
            | "frameset"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "head"
            | "header"
            | "hgroup"
            | "hr"
            | "html"
            | "iframe"
            | "img"
            | "input"
            | "li"
            | "link"
            | "listing"
            | "main"
            | "marquee"
            | "menu"
            | "meta"
            | "nav"
            | "noembed"
            | "noframes"
            | "noscript"
            | "object"
            | "ol"
            | "p"
            | "param"
            | "plaintext"
            | "pre"
            | "script"
            | "section"
            | "select"
            | "source"
            | "style"
            | "summary"
            | "table"
            | "tbody"
            | "td"
            | "template"
            | "textarea"
            | "tfoot"
            | "th"
            | "thead"
            | "title"
            | "tr"
            | "track"
            | "ul"
            | "wbr"
    )
}

pub fn is_formatting(name: &str) -> bool {
    matches!(
        name,
        "a" | "b"
            | "big"
            | "code"
            | "em"
            | "font"
            | "i"
            | "nobr"
            | "s"
            | "small"
            | "strike"
            | "strong"
            | "tt"
            | "u"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_shared() {
        let a = Tag::new("DIV");
        let b = Tag::new("div");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "div");
    }

    #[test]
    fn void_and_special_membership() {
        assert!(is_void_element("br"));
        assert!(!is_void_element("div"));
        assert!(is_special("table"));
        assert!(is_formatting("a"));
        assert!(!is_formatting("div"));
    }
}
