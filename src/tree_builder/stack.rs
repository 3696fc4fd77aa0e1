//! The stack of open elements, simplified from
//! `html5ever`'s indexed `ElemStack` to a plain `Vec<Handle>` — our
//! documents are built in memory in one pass, so the O(n) scope scans
//! this implies are not a throughput concern the way they are for a
//! browser engine processing a live network stream.

use crate::dom::node::Handle;

/// Tag-name sets used as scope boundaries by `in_scope`/`in_button_scope`/
/// `in_table_scope`/`in_list_item_scope`.
pub(crate) fn is_default_scope_boundary(name: &str) -> bool {
    matches!(
        name,
        "applet"
            | "caption"
            | "html"
            | "table"
            | "td"
            | "th"
            | "marquee"
            | "object"
            | "template"
    )
}

pub(crate) fn is_list_item_scope_boundary(name: &str) -> bool {
    is_default_scope_boundary(name) || matches!(name, "ol" | "ul")
}

pub(crate) fn is_button_scope_boundary(name: &str) -> bool {
    is_default_scope_boundary(name) || name == "button"
}

pub(crate) fn is_table_scope_boundary(name: &str) -> bool {
    matches!(name, "html" | "table" | "template")
}

pub(crate) struct OpenElements {
    stack: Vec<Handle>,
}

impl OpenElements {
    pub(crate) fn new() -> OpenElements {
        OpenElements { stack: Vec::new() }
    }

    pub(crate) fn push(&mut self, node: Handle) {
        self.stack.push(node);
    }

    pub(crate) fn pop(&mut self) -> Option<Handle> {
        self.stack.pop()
    }

    pub(crate) fn current(&self) -> Option<&Handle> {
        self.stack.last()
    }

    pub(crate) fn len(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub(crate) fn get(&self, i: usize) -> &Handle {
        &self.stack[i]
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Handle> {
        self.stack.iter()
    }

    pub(crate) fn truncate_to(&mut self, len: usize) {
        self.stack.truncate(len);
    }

    /// Pop elements until (and including) the first one named `name`.
    pub(crate) fn pop_until(&mut self, name: &str) {
        while let Some(top) = self.stack.pop() {
            if top.tag_name_is(name) {
                break;
            }
        }
    }

    /// Pop elements until (but not including) one named `name`, or the
    /// stack is exhausted.
    pub(crate) fn pop_until_before(&mut self, name: &str) {
        while let Some(top) = self.current() {
            if top.tag_name_is(name) {
                break;
            }
            self.stack.pop();
        }
    }

    pub(crate) fn contains_tag(&self, name: &str) -> bool {
        self.stack.iter().any(|h| h.tag_name_is(name))
    }

    pub(crate) fn position_of(&self, node: &Handle) -> Option<usize> {
        self.stack.iter().position(|h| Handle::ptr_eq(h, node))
    }

    /// Is an element named `name` in scope, per the given scope-boundary
    /// predicate ("has an element in scope" family)?
    pub(crate) fn in_scope(&self, name: &str, boundary: impl Fn(&str) -> bool) -> bool {
        for node in self.stack.iter().rev() {
            if node.tag_name_is(name) {
                return true;
            }
            if let Some(tag) = node.tag() {
                if boundary(tag.as_str()) {
                    return false;
                }
            }
        }
        false
    }

    pub(crate) fn in_scope_any(&self, names: &[&str], boundary: impl Fn(&str) -> bool) -> bool {
        for node in self.stack.iter().rev() {
            if let Some(tag) = node.tag() {
                if names.contains(&tag.as_str()) {
                    return true;
                }
                if boundary(tag.as_str()) {
                    return false;
                }
            }
        }
        false
    }
}
