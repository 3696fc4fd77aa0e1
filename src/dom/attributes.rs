//! `Attributes`: an ordered, case-policy-aware collection of name/value
//! pairs attached to an element.

use std::fmt;

/// A single attribute as stored on a node: the name preserves whatever
/// case `ParseSettings` decided to keep, while lookups are always
/// case-insensitive for HTML (case-sensitive for XML; see
/// `Attributes::new` vs `Attributes::new_case_sensitive`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// Insertion-ordered attribute list. Duplicate attribute names (which can
/// arise from malformed markup that the tokenizer already deduplicates,
/// but also from programmatic `put`) keep only the first occurrence,
/// matching the tokenizer's own last-wins-is-actually-first-wins rule for
/// attribute parsing per the WHATWG tokenizer.
#[derive(Clone, Debug, Default)]
pub struct Attributes {
    items: Vec<Attribute>,
    case_sensitive: bool,
}

impl Attributes {
    pub fn new() -> Attributes {
        Attributes {
            items: Vec::new(),
            case_sensitive: false,
        }
    }

    pub fn new_case_sensitive() -> Attributes {
        Attributes {
            items: Vec::new(),
            case_sensitive: true,
        }
    }

    fn key_eq(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|a| self.key_eq(&a.key, key))
            .map(|a| a.value.as_str())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn has_key_with_value(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// Sets `key` to `value`, preserving the existing entry's position (and
    /// its originally-cased key) if `key` is already present.
    pub fn put(&mut self, key: &str, value: &str) {
        if let Some(a) = self.items.iter_mut().find(|a| {
            if self.case_sensitive {
                a.key == key
            } else {
                a.key.eq_ignore_ascii_case(key)
            }
        }) {
            a.value = value.to_string();
            return;
        }
        self.items.push(Attribute {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Appends `key`/`value` unconditionally, even if `key` is already
    /// present (used by the tokenizer's attribute list, which must surface
    /// duplicate-attribute parse errors before the tree builder dedups).
    pub fn put_ignore_duplicate(&mut self, key: &str, value: &str) {
        if !self.has_key(key) {
            self.items.push(Attribute {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.items.retain(|a| !self.key_eq(&a.key, key));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    /// `class` attribute split on ASCII whitespace, per the
    /// dataset/className helpers.
    pub fn class_names(&self) -> Vec<&str> {
        self.get("class")
            .map(|c| c.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.class_names().iter().any(|c| *c == name)
    }

    /// Boolean attributes (e.g. `disabled`, `checked`) per the HTML spec:
    /// present with no `=value` at all, or with a value equal to their own
    /// name, are true; everything else compares on value.
    pub fn is_boolean(&self, key: &str) -> bool {
        matches!(
            key.to_ascii_lowercase().as_str(),
            "allowfullscreen"
                | "async"
                | "autofocus"
                | "autoplay"
                | "checked"
                | "compact"
                | "declare"
                | "default"
                | "defer"
                | "disabled"
                | "formnovalidate"
                | "hidden"
                | "ismap"
                | "itemscope"
                | "multiple"
                | "muted"
                | "nohref"
                | "noresize"
                | "noshade"
                | "novalidate"
                | "nowrap"
                | "open"
                | "readonly"
                | "required"
                | "reversed"
                | "selected"
                | "seamless"
        )
    }

    /// The `data-*` subset, with the `data-` prefix stripped.
    pub fn dataset(&self) -> Vec<(&str, &str)> {
        self.items
            .iter()
            .filter_map(|a| {
                a.key
                    .strip_prefix("data-")
                    .map(|rest| (rest, a.value.as_str()))
            })
            .collect()
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, a) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}=\"{}\"", a.key, a.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_lookup_by_default() {
        let mut a = Attributes::new();
        a.put("Href", "x");
        assert_eq!(a.get("href"), Some("x"));
    }

    #[test]
    fn case_sensitive_xml_mode() {
        let mut a = Attributes::new_case_sensitive();
        a.put("Href", "x");
        assert_eq!(a.get("href"), None);
        assert_eq!(a.get("Href"), Some("x"));
    }

    #[test]
    fn class_names_split_on_whitespace() {
        let mut a = Attributes::new();
        a.put("class", "foo  bar\tbaz");
        assert_eq!(a.class_names(), vec!["foo", "bar", "baz"]);
        assert!(a.has_class("bar"));
    }

    #[test]
    fn dataset_strips_prefix() {
        let mut a = Attributes::new();
        a.put("data-id", "42");
        assert_eq!(a.dataset(), vec![("id", "42")]);
    }
}
