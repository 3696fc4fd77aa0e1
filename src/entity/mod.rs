//! Named and numeric character reference resolution, and the reverse
//! (escaping) direction used by the serializer.

mod tables;

/// Selects which named-entity table the serializer prefers when escaping,
/// and (identically) which sets the tokenizer treats as known. All three
/// tables are always legal to *decode*; `EscapeMode` only affects encoding.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EscapeMode {
    Xhtml,
    Base,
    Extended,
}

/// Outcome of a named-entity lookup starting at `&name`.
pub struct NamedLookup {
    pub value: &'static str,
    /// Length in bytes of the matched name, not including `&` or `;`.
    pub name_len: usize,
    pub requires_semicolon: bool,
}

/// Looks up the longest named entity prefix of `name_and_rest` (the text
/// immediately following `&`, *not* including the `&`). Tries the XHTML and
/// BASE bare-name sets first (no `;` required, but the match must not be
/// immediately followed by an alphanumeric or `=`), then the full
/// semicolon-requiring EXTENDED set.
pub fn lookup_named(rest: &str, in_attribute: bool) -> Option<NamedLookup> {
    // Prefer the longest match with a trailing `;`.
    if let Some(semi) = rest.find(';') {
        let name = &rest[..semi];
        if let Some(v) = tables::XHTML.get(name) {
            return Some(NamedLookup {
                value: v,
                name_len: name.len(),
                requires_semicolon: true,
            });
        }
        if let Some(v) = tables::BASE.get(name) {
            return Some(NamedLookup {
                value: v,
                name_len: name.len(),
                requires_semicolon: true,
            });
        }
        if let Some(v) = tables::EXTENDED.get(name) {
            return Some(NamedLookup {
                value: v,
                name_len: name.len(),
                requires_semicolon: true,
            });
        }
    }

    // Bare-name fallback: longest prefix in the BASE set not followed by an
    // alphanumeric or `=` (the `&notit;` vs `&not` + `it;` disambiguation).
    let mut best: Option<(&str, &'static str)> = None;
    for (name, value) in tables::BASE.entries() {
        if rest.starts_with(name) {
            if best.map(|(b, _)| name.len() > b.len()).unwrap_or(true) {
                best = Some((name, value));
            }
        }
    }
    if let Some((name, value)) = best {
        let after = rest.as_bytes().get(name.len()).copied();
        let blocked = match after {
            Some(b) => (b as char).is_ascii_alphanumeric() || (in_attribute && b == b'='),
            None => false,
        };
        if !blocked {
            return Some(NamedLookup {
                value,
                name_len: name.len(),
                requires_semicolon: false,
            });
        }
    }
    None
}

/// Clamps a numeric character reference scalar value:
/// surrogates and values beyond U+10FFFF become U+FFFD; the Windows-1252
/// C1 overrides apply to 0x80–0x9F.
pub fn resolve_numeric(code: u32) -> char {
    if (0x80..=0x9F).contains(&code) {
        if let Some(c) = tables::windows_1252_override(code) {
            return c;
        }
    }
    if code == 0 {
        return '\u{FFFD}';
    }
    if (0xD800..=0xDFFF).contains(&code) || code > 0x10FFFF {
        return '\u{FFFD}';
    }
    char::from_u32(code).unwrap_or('\u{FFFD}')
}

/// Reverse lookup used by the serializer: the preferred entity name for a
/// codepoint under the given escape mode, if a named form exists.
pub fn escape_name(code: u32, mode: EscapeMode) -> Option<&'static str> {
    if mode == EscapeMode::Xhtml && !matches!(code, 38 | 60 | 62 | 34 | 39) {
        return None;
    }
    tables::REVERSE.get(&code).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_semicolon_entity() {
        let l = lookup_named("amp;rest", false).unwrap();
        assert_eq!(l.value, "&");
        assert_eq!(l.name_len, 3);
    }

    #[test]
    fn bare_name_blocked_by_trailing_alnum() {
        // "&notit;" must not decode "not" as a bare entity.
        assert!(lookup_named("notit;", false).is_none());
    }

    #[test]
    fn bare_name_allowed_standalone() {
        let l = lookup_named("amp rest", false).unwrap();
        assert_eq!(l.value, "&");
        assert!(!l.requires_semicolon);
    }

    #[test]
    fn numeric_surrogate_clamped() {
        assert_eq!(resolve_numeric(0xD800), '\u{FFFD}');
        assert_eq!(resolve_numeric(0x110000), '\u{FFFD}');
        assert_eq!(resolve_numeric(0), '\u{FFFD}');
    }

    #[test]
    fn windows_1252_override_applied() {
        assert_eq!(resolve_numeric(0x80), '\u{20AC}');
    }
}
