// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The parse tree: `Node`/`Handle`/`WeakHandle`, reference-counted and
//! mutable through interior `Cell`/`RefCell` fields. Adapted from
//! `markup5ever_rcdom`'s `Node`.

use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::{Rc, Weak};

use tendril::StrTendril;

use crate::dom::attributes::Attributes;
use crate::dom::tag::Tag;
use crate::error::Position;

/// The different kinds of node that can appear in the tree: `Document`,
/// `Element`, `TextNode`, `DataNode` (raw `<script>`/`<style>` content),
/// `CDataNode`, `Comment`, `DocumentType`, and `XmlDeclaration`.
pub enum NodeData {
    Document {
        /// Location URL / document base URI, resolved by `abs_url`. Set at
        /// parse time from the caller's `baseUri` argument, then updated
        /// once by the first in-tree `<base href>`.
        base_uri: RefCell<String>,
    },

    Element {
        name: Tag,
        attrs: RefCell<Attributes>,
        /// `<template>` contents live in a detached document fragment,
        /// not among `children`, per the HTML template-contents model.
        template_contents: Option<Handle>,
        /// Set once a `<script>` element's "already started" flag fires;
        /// out of scope for this crate's non-executing parse model but
        /// kept so a host embedding a scripting engine has somewhere to
        /// record it.
        script_already_started: Cell<bool>,
    },

    TextNode(RefCell<StrTendril>),

    /// Raw, un-entity-decoded content of a `<script>`/`<style>`/other
    /// raw-text element — distinct from `TextNode` because its contents
    /// must round-trip through serialization byte-for-byte.
    DataNode(RefCell<StrTendril>),

    CDataNode(RefCell<StrTendril>),

    Comment(RefCell<StrTendril>),

    DocumentType {
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    },

    XmlDeclaration {
        version: StrTendril,
        encoding: Option<StrTendril>,
    },
}

pub struct Node {
    pub data: NodeData,
    pub parent: Cell<Option<WeakHandle>>,
    pub children: RefCell<Vec<Handle>>,
    /// Source position of the opening tag/token that produced this node,
    /// `Position::UNTRACKED` unless `ParseSettings::track_positions` was set.
    pub source_position: Position,
}

impl Node {
    fn new(data: NodeData, position: Position) -> Node {
        Node {
            data,
            parent: Cell::new(None),
            children: RefCell::new(Vec::new()),
            source_position: position,
        }
    }
}

/// Reference to a DOM node. Cheap to clone (reference count bump only).
#[derive(Clone)]
pub struct Handle(Rc<Node>);

impl Deref for Handle {
    type Target = Node;
    fn deref(&self) -> &Node {
        &self.0
    }
}

impl Handle {
    pub fn ptr_eq(a: &Handle, b: &Handle) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    fn downgrade(&self) -> WeakHandle {
        Rc::downgrade(&self.0)
    }
}

pub type WeakHandle = Weak<Node>;

pub fn new_node(data: NodeData, position: Position) -> Handle {
    Handle(Rc::new(Node::new(data, position)))
}

/// Appends `child` as the last child of `parent`, severing any existing
/// parent link `child` may have had.
pub fn append(parent: &Handle, child: Handle) {
    remove_from_parent(&child);
    child.parent.set(Some(parent.downgrade()));
    parent.children.borrow_mut().push(child);
}

/// Inserts `child` immediately before `sibling` in `sibling`'s parent.
pub fn insert_before(sibling: &Handle, child: Handle) {
    let (parent, index) =
        parent_and_index(sibling).expect("insert_before called on a node without a parent");
    remove_from_parent(&child);
    child.parent.set(Some(parent.downgrade()));
    parent.children.borrow_mut().insert(index, child);
}

pub fn parent_and_index(target: &Handle) -> Option<(Handle, usize)> {
    let weak = target.parent.take()?;
    let parent = Handle(weak.upgrade().expect("dangling weak parent pointer"));
    target.parent.set(Some(weak));
    let index = parent
        .children
        .borrow()
        .iter()
        .position(|c| Handle::ptr_eq(c, target))
        .expect("node claims a parent that does not list it as a child");
    Some((parent, index))
}

pub fn remove_from_parent(target: &Handle) {
    if let Some((parent, index)) = parent_and_index(target) {
        parent.children.borrow_mut().remove(index);
        target.parent.set(None);
    }
}

/// Moves all of `from`'s children onto the end of `to`'s children list,
/// leaving `from` childless. Used by the adoption agency algorithm and by
/// `<template>` fragment handling.
pub fn reparent_children(from: &Handle, to: &Handle) {
    let moved: Vec<Handle> = from.children.borrow_mut().drain(..).collect();
    for child in &moved {
        child.parent.set(Some(to.downgrade()));
    }
    to.children.borrow_mut().extend(moved);
}

/// If `parent`'s last child is a `TextNode`, appends `text` to it and
/// returns `true`; callers use this to coalesce adjacent character
/// tokens into a single text node, as WHATWG's "insert a character"
/// algorithm requires.
pub fn append_text_merging(parent: &Handle, text: &str) -> bool {
    if let Some(last) = parent.children.borrow().last() {
        if let NodeData::TextNode(existing) = &last.data {
            existing.borrow_mut().push_slice(text);
            return true;
        }
    }
    false
}

impl Handle {
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }

    pub fn is_document(&self) -> bool {
        matches!(self.data, NodeData::Document { .. })
    }

    /// Walks up to the owning `Document` node and returns its base URI, if
    /// this node is attached to one.
    pub fn base_uri(&self) -> Option<String> {
        let mut cur = self.clone();
        loop {
            if let NodeData::Document { base_uri } = &cur.data {
                return Some(base_uri.borrow().clone());
            }
            cur = cur.parent_node()?;
        }
    }

    /// Sets the base URI on this node, if it is a `Document` node. Used by
    /// the tree builder when the first in-tree `<base href>` is seen.
    pub fn set_base_uri(&self, uri: &str) {
        if let NodeData::Document { base_uri } = &self.data {
            *base_uri.borrow_mut() = uri.to_string();
        }
    }

    /// Resolves `key`'s value against this node's document base URI.
    /// Returns `None` if the attribute is absent/empty, or if the value
    /// isn't itself absolute and no base URI is reachable.
    pub fn abs_url(&self, key: &str) -> Option<String> {
        let value = self.attrs().and_then(|a| a.get(key).map(|v| v.to_string()))?;
        if value.is_empty() {
            return None;
        }
        let base = self.base_uri().unwrap_or_default();
        crate::dom::url::resolve(&base, &value)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::TextNode(_))
    }

    pub fn tag(&self) -> Option<Tag> {
        match &self.data {
            NodeData::Element { name, .. } => Some(*name),
            _ => None,
        }
    }

    pub fn tag_name_is(&self, name: &str) -> bool {
        self.tag().map(|t| t.as_str() == name).unwrap_or(false)
    }

    pub fn attrs(&self) -> Option<std::cell::Ref<'_, Attributes>> {
        match &self.data {
            NodeData::Element { attrs, .. } => Some(attrs.borrow()),
            _ => None,
        }
    }

    pub fn attrs_mut(&self) -> Option<std::cell::RefMut<'_, Attributes>> {
        match &self.data {
            NodeData::Element { attrs, .. } => Some(attrs.borrow_mut()),
            _ => None,
        }
    }

    pub fn template_contents(&self) -> Option<Handle> {
        match &self.data {
            NodeData::Element {
                template_contents, ..
            } => template_contents.clone(),
            _ => None,
        }
    }

    /// Concatenated text of all descendant text nodes, in document order
    /// (`Node::text`/`Element::text`).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Text of this node's own direct text-node children only
    /// (`Element::own_text`).
    pub fn own_text(&self) -> String {
        let mut out = String::new();
        for child in self.children.borrow().iter() {
            if let NodeData::TextNode(t) = &child.data {
                out.push_str(&t.borrow());
            }
        }
        out
    }

    pub fn child_elements(&self) -> Vec<Handle> {
        self.children
            .borrow()
            .iter()
            .filter(|c| c.is_element())
            .cloned()
            .collect()
    }

    pub fn parent_node(&self) -> Option<Handle> {
        parent_and_index(self).map(|(p, _)| p)
    }
}

fn collect_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::TextNode(t) => out.push_str(&t.borrow()),
        NodeData::DataNode(_) | NodeData::CDataNode(_) | NodeData::Comment(_) => {}
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elem(name: &str) -> Handle {
        new_node(
            NodeData::Element {
                name: Tag::new(name),
                attrs: RefCell::new(Attributes::new()),
                template_contents: None,
                script_already_started: Cell::new(false),
            },
            Position::UNTRACKED,
        )
    }

    fn text(s: &str) -> Handle {
        new_node(
            NodeData::TextNode(RefCell::new(StrTendril::from(s))),
            Position::UNTRACKED,
        )
    }

    #[test]
    fn append_and_reparent() {
        let root = elem("div");
        let child = elem("span");
        append(&root, child.clone());
        assert!(Handle::ptr_eq(&child.parent_node().unwrap(), &root));
        assert_eq!(root.children.borrow().len(), 1);

        let other = elem("p");
        reparent_children(&root, &other);
        assert_eq!(root.children.borrow().len(), 0);
        assert_eq!(other.children.borrow().len(), 1);
    }

    #[test]
    fn text_merging_coalesces_adjacent_runs() {
        let root = elem("p");
        append(&root, text("hello "));
        assert!(append_text_merging(&root, "world"));
        assert_eq!(root.children.borrow().len(), 1);
        assert_eq!(root.text_content(), "hello world");
    }

    #[test]
    fn insert_before_preserves_order() {
        let root = elem("ul");
        let a = elem("li");
        let b = elem("li");
        append(&root, a.clone());
        insert_before(&a, b.clone());
        let kids = root.children.borrow();
        assert!(Handle::ptr_eq(&kids[0], &b));
        assert!(Handle::ptr_eq(&kids[1], &a));
    }
}
