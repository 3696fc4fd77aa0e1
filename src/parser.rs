//! Top-level entry points: parse a whole document, a fragment of one, or
//! an XML document, producing a `ParsedDocument` that bundles the node
//! tree together with the recovered errors and quirks mode the caller
//! needs to make sense of it.

use tendril::StrTendril;

use crate::dom::node::Handle;
use crate::dom::settings::{ParseSettings, QuirksMode};
use crate::error::ParseErrorList;
use crate::tree_builder::xml::XmlTreeBuilder;
use crate::tree_builder::TreeBuilder;

/// The result of parsing a whole document: the `Document` node at the
/// root of the tree, its derived quirks mode, any parse errors recovered
/// along the way (empty unless `ParseSettings::with_tracking` was used),
/// and the base URI resolved into the document (for `Handle::abs_url`).
pub struct ParsedDocument {
    pub document: Handle,
    pub quirks_mode: QuirksMode,
    pub errors: ParseErrorList,
    pub base_uri: String,
}

/// Parses `html` as a whole document against `base_uri`, using default
/// (lenient, lower-casing) HTML parse settings.
pub fn parse_html(html: &str, base_uri: &str) -> ParsedDocument {
    parse_html_with_settings(html, base_uri, ParseSettings::html())
}

/// Parses `html` as a whole document with caller-supplied settings, e.g.
/// `ParseSettings::html().with_tracking(50)` to cap recovered errors.
pub fn parse_html_with_settings(
    html: &str,
    base_uri: &str,
    settings: ParseSettings,
) -> ParsedDocument {
    let out = TreeBuilder::new(StrTendril::from(html), settings, base_uri).run();
    ParsedDocument {
        document: out.document,
        quirks_mode: out.quirks_mode,
        errors: out.errors,
        base_uri: base_uri.to_string(),
    }
}

/// Parses `html` as if it were the contents of `<body>`: the common case
/// for parsing an HTML snippet rather than a whole page.
pub fn parse_body_fragment(html: &str, base_uri: &str) -> Vec<Handle> {
    parse_fragment(html, base_uri, "body")
}

/// Parses `html` as a fragment, as if it occurred as a child of a
/// `context_tag` element (e.g. `"td"`, `"select"`, `"template"`) — the
/// tree builder resets to whatever insertion mode that context implies
/// so that content which only makes sense inside it (a bare `<tr>`
/// inside `"table"`, for instance) is handled the same way it would be
/// inline in a full document.
pub fn parse_fragment(html: &str, base_uri: &str, context_tag: &str) -> Vec<Handle> {
    TreeBuilder::new_fragment(
        StrTendril::from(html),
        ParseSettings::html(),
        base_uri,
        context_tag,
    )
    .run_fragment()
}

/// Parses `xml` as a whole XML document: tokens map one-to-one to nodes,
/// tag/attribute case is preserved, and self-closing tags are honored.
pub fn parse_xml(xml: &str, base_uri: &str) -> ParsedDocument {
    let out = XmlTreeBuilder::new(StrTendril::from(xml), ParseSettings::xml(), base_uri).run();
    ParsedDocument {
        document: out.document,
        quirks_mode: out.quirks_mode,
        errors: out.errors,
        base_uri: base_uri.to_string(),
    }
}

/// Parses `xml` as a fragment nested inside `context_tag`.
pub fn parse_xml_fragment(xml: &str, base_uri: &str, context_tag: &str) -> Vec<Handle> {
    XmlTreeBuilder::new_fragment(
        StrTendril::from(xml),
        ParseSettings::xml(),
        base_uri,
        context_tag,
    )
    .run_fragment()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_document_and_wraps_in_html_body() {
        let out = parse_html("<p>hi</p>", "");
        let html = out.document.children.borrow()[0].clone();
        assert!(html.tag_name_is("html"));
    }

    #[test]
    fn base_uri_resolves_relative_links() {
        let out = parse_html("<a href=\"/foo\">x</a>", "http://example.com/");
        let a = out
            .document
            .select("a")
            .expect("valid selector")
            .into_iter()
            .next()
            .expect("an anchor");
        assert_eq!(a.abs_url("href").as_deref(), Some("http://example.com/foo"));
    }

    #[test]
    fn in_tree_base_tag_overrides_caller_base_uri() {
        let out = parse_html(
            "<head><base href=\"http://override.example/\"></head><a href=\"x\">y</a>",
            "http://example.com/",
        );
        let a = out
            .document
            .select("a")
            .expect("valid selector")
            .into_iter()
            .next()
            .expect("an anchor");
        assert_eq!(
            a.abs_url("href").as_deref(),
            Some("http://override.example/x")
        );
    }

    #[test]
    fn fragment_parsing_in_table_context_keeps_bare_row() {
        let nodes = parse_fragment("<tr><td>1</td></tr>", "", "table");
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].tag_name_is("tr"));
    }

    #[test]
    fn xml_parsing_preserves_case_and_self_closes() {
        let out = parse_xml("<Root><Child/></Root>", "");
        let root = out.document.children.borrow()[0].clone();
        assert_eq!(root.tag().unwrap().as_str(), "Root");
        assert_eq!(root.children.borrow().len(), 1);
    }

    #[test]
    fn error_tracking_is_off_by_default() {
        let out = parse_html("<div><span></div>", "");
        assert!(out.errors.is_empty());
    }

    #[test]
    fn error_tracking_can_be_enabled_and_capped() {
        let out = parse_html_with_settings(
            "<div><span><p></div>",
            "",
            ParseSettings::html().with_tracking(1),
        );
        assert!(out.errors.len() <= 1);
    }
}
