//! Black-box, whole-pipeline scenarios: parse real-shaped markup through
//! the public API and check what a caller would actually observe —
//! selection counts, recovered text, absolute URLs, and the tree shapes
//! that misnested/foster-parented markup is supposed to produce.

use loosehtml::{parse_fragment, parse_html, parse_html_with_settings, ParseSettings};

#[test]
fn nested_divs_select_by_tag_and_id() {
    let doc = parse_html("<div id=1><div id=2><p>Hi</p></div></div>", "");
    let divs = doc.document.select("div").unwrap();
    assert_eq!(divs.len(), 2);
    let ids: Vec<_> = divs
        .iter()
        .map(|d| d.attrs().unwrap().get("id").unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);

    let p = doc.document.select("p").unwrap();
    assert_eq!(p.len(), 1);
    assert_eq!(p[0].text_content(), "Hi");
}

#[test]
fn malformed_markup_recovers_and_caps_tracked_errors() {
    let out = parse_html_with_settings(
        "<p>One</p href='no'>&arrgh;<font /><br /><foo",
        "",
        ParseSettings::html().with_tracking(5),
    );
    assert!(out.errors.len() <= 5);
    // Recovery continues to EOF rather than aborting: the open <foo> at the
    // end is still present as an element in the tree.
    assert!(!out.document.select("foo").unwrap().is_empty());
}

#[test]
fn relative_href_resolves_against_base_uri() {
    let doc = parse_html("<a href=/foo>x</a>", "http://example.com/");
    let a = doc.document.select("a").unwrap().into_iter().next().unwrap();
    assert_eq!(a.abs_url("href").as_deref(), Some("http://example.com/foo"));
}

#[test]
fn misnested_formatting_elements_trigger_adoption_agency() {
    let doc = parse_html("<p><b>1<i>2<b>3</p>4", "");
    let html = doc.document.outer_html_default();
    // The adoption agency reconstructs <i>/<b> wrappers around the trailing
    // "4" rather than leaving it as a dangling sibling of the original <p>.
    assert!(html.contains("<i>"));
    assert!(html.contains("<b>"));
    assert!(doc.document.text_content().contains('4'));
}

#[test]
fn table_foster_parents_non_table_content() {
    let doc = parse_html("<table><b><tr><td>a</td></tr>b</table>c", "");
    let table = doc
        .document
        .select("table")
        .unwrap()
        .into_iter()
        .next()
        .unwrap();
    let parent = table.parent_node().unwrap();
    let table_siblings: Vec<_> = parent
        .children
        .borrow()
        .iter()
        .filter(|c| !loosehtml::Handle::ptr_eq(c, &table))
        .cloned()
        .collect();
    // <b> opened inside the table but before any cell content is foster
    // parented out to become the table's sibling, not its descendant.
    assert!(table_siblings.iter().any(|n| n.tag_name_is("b")));
    assert!(!table
        .select("b")
        .unwrap()
        .into_iter()
        .any(|b| b.tag_name_is("b")));
    let td = table.select("td").unwrap().into_iter().next().unwrap();
    assert_eq!(td.text_content(), "a");
}

#[test]
fn has_and_contains_combine_for_subtree_text_search() {
    let doc = parse_html("<div><p>One</p></div><div><p>two</p></div>", "");
    let found = doc
        .document
        .select("div:has(p:contains(two))")
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text_content(), "two");
}

#[test]
fn empty_input_synthesizes_html_head_body() {
    let doc = parse_html("", "");
    let html = doc.document.children.borrow()[0].clone();
    assert!(html.tag_name_is("html"));
    let kids = html.child_elements();
    assert_eq!(kids.len(), 2);
    assert!(kids[0].tag_name_is("head"));
    assert!(kids[1].tag_name_is("body"));
}

#[test]
fn unterminated_comment_captures_remainder_at_eof() {
    let doc = parse_html("<p>hi</p><!-- never closed", "");
    let body = doc.document.select("body").unwrap().into_iter().next().unwrap();
    let comment_present = body
        .children
        .borrow()
        .iter()
        .any(|c| matches!(c.data, loosehtml::NodeData::Comment(_)));
    assert!(comment_present);
}

#[test]
fn fragment_parsing_seeds_insertion_mode_from_context() {
    // A bare <tr> only makes sense seeded with "table" context; parsed as a
    // full document it would be silently dropped outside a <table>.
    let nodes = parse_fragment("<tr><td>x</td></tr>", "", "table");
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].tag_name_is("tr"));
    assert_eq!(nodes[0].select("td").unwrap()[0].text_content(), "x");
}

#[test]
fn outer_html_round_trips_through_a_second_parse() {
    let doc = parse_html("<div id=a><p>hello &amp; goodbye</p></div>", "");
    let first = doc.document.outer_html_default();
    let reparsed = parse_html(&first, "");
    let second = reparsed.document.outer_html_default();
    assert_eq!(first, second);
}
