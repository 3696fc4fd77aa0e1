//! Compiled selector representation and the matching algorithm that
//! walks it against a candidate node.

use regex::Regex;

use crate::dom::node::Handle;

/// A single simple selector within a compound (e.g. the `p`, `.a`, and
/// `[href]` in `p.a[href]`).
#[derive(Debug)]
pub enum SimpleSelector {
    Tag(String),
    /// `ns|tag`: tag name qualified by a namespace prefix, matched against
    /// the element's preserved tag name written as `ns:tag` (this DOM keeps
    /// namespaced names as written rather than tracking real namespace
    /// URIs). `ns == "*"` matches any prefix as long as the local name
    /// matches.
    NsTag(String, String),
    Universal,
    Id(String),
    Class(String),
    AttrExists(String),
    AttrEquals(String, String),
    AttrNotEquals(String, String),
    AttrStartsWith(String, String),
    AttrEndsWith(String, String),
    AttrContains(String, String),
    AttrMatches(String, Regex),
    /// `[^prefix]`: true if any attribute name on the element starts with
    /// `prefix`.
    AttrKeyPrefix(String),
    Not(Vec<Selector>),
    Has(Vec<Selector>),
    Is(Vec<Selector>),
    Contains(String),
    ContainsOwn(String),
    Matches(Regex),
    MatchesOwn(Regex),
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(i64, i64),
    NthLastChild(i64, i64),
    NthOfType(i64, i64),
    NthLastOfType(i64, i64),
    IndexLessThan(i64),
    IndexGreaterThan(i64),
    IndexEquals(i64),
}

#[derive(Copy, Clone, Debug)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

/// One compound selector plus the combinator that relates it to the
/// previous step (`None` on the first step of a selector).
#[derive(Debug)]
pub struct Step {
    pub combinator: Option<Combinator>,
    pub compound: Vec<SimpleSelector>,
}

/// A full selector: a chain of steps read left to right, matched right
/// to left (the rightmost compound is tested against the candidate node
/// itself; earlier steps constrain its ancestors/siblings).
#[derive(Debug, Default)]
pub struct Selector {
    pub steps: Vec<Step>,
}

pub fn selector_matches(node: &Handle, selector: &Selector) -> bool {
    if selector.steps.is_empty() {
        return false;
    }
    match_step(node, &selector.steps, selector.steps.len() - 1)
}

fn match_step(node: &Handle, steps: &[Step], i: usize) -> bool {
    if !matches_compound(node, &steps[i].compound) {
        return false;
    }
    if i == 0 {
        return true;
    }
    match steps[i].combinator.expect("non-first step without a combinator") {
        Combinator::Descendant => {
            let mut cur = node.parent_node();
            while let Some(p) = cur {
                if !p.is_element() {
                    break;
                }
                if match_step(&p, steps, i - 1) {
                    return true;
                }
                cur = p.parent_node();
            }
            false
        }
        Combinator::Child => match node.parent_node() {
            Some(p) if p.is_element() => match_step(&p, steps, i - 1),
            _ => false,
        },
        Combinator::NextSibling => match prev_element_sibling(node) {
            Some(s) => match_step(&s, steps, i - 1),
            None => false,
        },
        Combinator::SubsequentSibling => {
            let mut cur = prev_element_sibling(node);
            while let Some(s) = cur {
                if match_step(&s, steps, i - 1) {
                    return true;
                }
                cur = prev_element_sibling(&s);
            }
            false
        }
    }
}

fn matches_compound(node: &Handle, compound: &[SimpleSelector]) -> bool {
    compound.iter().all(|s| matches_simple(node, s))
}

fn element_siblings(node: &Handle) -> Vec<Handle> {
    match node.parent_node() {
        Some(p) => p.children.borrow().iter().filter(|c| c.is_element()).cloned().collect(),
        None => vec![node.clone()],
    }
}

fn prev_element_sibling(node: &Handle) -> Option<Handle> {
    let sibs = element_siblings(node);
    let idx = sibs.iter().position(|s| Handle::ptr_eq(s, node))?;
    if idx == 0 {
        None
    } else {
        Some(sibs[idx - 1].clone())
    }
}

/// 1-based position of `node` among its element siblings.
fn child_index(node: &Handle) -> usize {
    let sibs = element_siblings(node);
    sibs.iter().position(|s| Handle::ptr_eq(s, node)).unwrap_or(0) + 1
}

fn child_index_of_type(node: &Handle) -> usize {
    let tag = node.tag();
    let sibs: Vec<Handle> = element_siblings(node)
        .into_iter()
        .filter(|s| s.tag() == tag)
        .collect();
    sibs.iter().position(|s| Handle::ptr_eq(s, node)).unwrap_or(0) + 1
}

/// Does `1-based position` satisfy the `an+b` expression?
fn matches_an_plus_b(position: i64, a: i64, b: i64) -> bool {
    if a == 0 {
        return position == b;
    }
    let k = position - b;
    k % a == 0 && k / a >= 0
}

fn matches_simple(node: &Handle, sel: &SimpleSelector) -> bool {
    match sel {
        SimpleSelector::Tag(name) => node.tag_name_is(name),
        SimpleSelector::NsTag(ns, local) => node
            .tag()
            .map(|t| {
                let full = t.as_str();
                match full.split_once(':') {
                    Some((prefix, rest)) => {
                        (ns == "*" || prefix.eq_ignore_ascii_case(ns))
                            && (local == "*" || rest.eq_ignore_ascii_case(local))
                    }
                    None => false,
                }
            })
            .unwrap_or(false),
        SimpleSelector::Universal => node.is_element(),
        SimpleSelector::Id(id) => node.attrs().map(|a| a.has_key_with_value("id", id)).unwrap_or(false),
        SimpleSelector::Class(class) => node.attrs().map(|a| a.has_class(class)).unwrap_or(false),
        SimpleSelector::AttrExists(key) => node.attrs().map(|a| a.has_key(key)).unwrap_or(false),
        SimpleSelector::AttrEquals(key, val) => {
            node.attrs().and_then(|a| a.get(key).map(|v| v == val)).unwrap_or(false)
        }
        SimpleSelector::AttrNotEquals(key, val) => {
            node.attrs().map(|a| a.get(key).map(|v| v != val).unwrap_or(true)).unwrap_or(true)
        }
        SimpleSelector::AttrStartsWith(key, val) => node
            .attrs()
            .and_then(|a| a.get(key).map(|v| v.starts_with(val.as_str())))
            .unwrap_or(false),
        SimpleSelector::AttrEndsWith(key, val) => node
            .attrs()
            .and_then(|a| a.get(key).map(|v| v.ends_with(val.as_str())))
            .unwrap_or(false),
        SimpleSelector::AttrContains(key, val) => node
            .attrs()
            .and_then(|a| a.get(key).map(|v| v.contains(val.as_str())))
            .unwrap_or(false),
        SimpleSelector::AttrMatches(key, re) => {
            node.attrs().and_then(|a| a.get(key).map(|v| re.is_match(v))).unwrap_or(false)
        }
        SimpleSelector::AttrKeyPrefix(prefix) => node
            .attrs()
            .map(|a| a.iter().any(|attr| attr.key.starts_with(prefix.as_str())))
            .unwrap_or(false),
        SimpleSelector::Not(group) => !group.iter().any(|s| selector_matches(node, s)),
        SimpleSelector::Has(group) => subtree_matches_any(node, group, true),
        SimpleSelector::Is(group) => group.iter().any(|s| selector_matches(node, s)),
        SimpleSelector::Contains(text) => node.text_content().to_lowercase().contains(&text.to_lowercase()),
        SimpleSelector::ContainsOwn(text) => node.own_text().to_lowercase().contains(&text.to_lowercase()),
        SimpleSelector::Matches(re) => re.is_match(&node.text_content()),
        SimpleSelector::MatchesOwn(re) => re.is_match(&node.own_text()),
        SimpleSelector::Root => node.parent_node().map(|p| p.is_document()).unwrap_or(true),
        SimpleSelector::Empty => node.children.borrow().is_empty(),
        SimpleSelector::FirstChild => child_index(node) == 1,
        SimpleSelector::LastChild => child_index(node) == element_siblings(node).len(),
        SimpleSelector::OnlyChild => element_siblings(node).len() == 1,
        SimpleSelector::FirstOfType => child_index_of_type(node) == 1,
        SimpleSelector::LastOfType => {
            let tag = node.tag();
            let count = element_siblings(node).into_iter().filter(|s| s.tag() == tag).count();
            child_index_of_type(node) == count
        }
        SimpleSelector::OnlyOfType => {
            let tag = node.tag();
            element_siblings(node).into_iter().filter(|s| s.tag() == tag).count() == 1
        }
        SimpleSelector::NthChild(a, b) => matches_an_plus_b(child_index(node) as i64, *a, *b),
        SimpleSelector::NthLastChild(a, b) => {
            let total = element_siblings(node).len() as i64;
            let pos_from_end = total - child_index(node) as i64 + 1;
            matches_an_plus_b(pos_from_end, *a, *b)
        }
        SimpleSelector::NthOfType(a, b) => matches_an_plus_b(child_index_of_type(node) as i64, *a, *b),
        SimpleSelector::NthLastOfType(a, b) => {
            let tag = node.tag();
            let total = element_siblings(node).into_iter().filter(|s| s.tag() == tag).count() as i64;
            let pos_from_end = total - child_index_of_type(node) as i64 + 1;
            matches_an_plus_b(pos_from_end, *a, *b)
        }
        SimpleSelector::IndexLessThan(n) => (child_index(node) as i64) < *n,
        SimpleSelector::IndexGreaterThan(n) => (child_index(node) as i64) > *n,
        SimpleSelector::IndexEquals(n) => (child_index(node) as i64) == *n,
    }
}

/// `:has(...)`: true if `node` itself, or any descendant when
/// `include_descendants`, matches any selector in `group`. jsoup's
/// `:has` tests the subtree rooted at (but not including) `node`.
fn subtree_matches_any(node: &Handle, group: &[Selector], include_descendants: bool) -> bool {
    for child in node.children.borrow().iter() {
        if !child.is_element() {
            continue;
        }
        if group.iter().any(|s| selector_matches(child, s)) {
            return true;
        }
        if include_descendants && subtree_matches_any(child, group, true) {
            return true;
        }
    }
    false
}
