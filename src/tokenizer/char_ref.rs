// Copyright 2014-2017 The html5ever Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `ConsumeCharacterReference`, invoked from the `Data`/`RCData` states and
//! from attribute-value consumption.

use crate::entity;
use crate::reader::CharacterReader;

const MAX_ENTITY_NAME_LEN: usize = 32;

/// Result of attempting to consume a character reference starting just
/// after the `&` (which has already been consumed by the caller).
pub struct CharRef {
    pub text: String,
    /// True if a parse error should be reported (unterminated numeric
    /// reference, unknown entity name, out-of-range codepoint, ...).
    pub error: bool,
}

/// `additional_allowed`: when consuming inside an attribute value, the
/// surrounding quote character (or `None` for unquoted) is never itself
/// the start of a reference and is passed through untouched by the caller;
/// this parameter affects only the bare-name disambiguation rule.
pub fn consume_character_reference(
    reader: &mut CharacterReader,
    additional_allowed: Option<char>,
    in_attribute: bool,
) -> Option<CharRef> {
    match reader.current() {
        None => return None,
        Some(c) if Some(c) == additional_allowed => return None,
        Some(c) if c.is_ascii_whitespace() || c == '<' || c == '&' => return None,
        _ => {}
    }

    if reader.matches_char('#') {
        reader.consume();
        return Some(consume_numeric(reader));
    }

    let rest = reader.peek_str(MAX_ENTITY_NAME_LEN);
    match entity::lookup_named(&rest, in_attribute) {
        Some(found) => {
            for _ in 0..found.name_len {
                reader.consume();
            }
            if found.requires_semicolon && reader.matches_char(';') {
                reader.consume();
            }
            Some(CharRef {
                text: found.value.to_string(),
                error: false,
            })
        }
        None => None,
    }
}

fn consume_numeric(reader: &mut CharacterReader) -> CharRef {
    let hex = reader.matches_any(&['x', 'X']);
    if hex {
        reader.consume();
    }

    let digits = if hex {
        reader.consume_hex_sequence()
    } else {
        reader.consume_digit_sequence()
    };

    if digits.is_empty() {
        return CharRef {
            text: String::new(),
            error: true,
        };
    }

    let radix = if hex { 16 } else { 10 };
    let code = u32::from_str_radix(&digits, radix).unwrap_or(0x110000);

    let had_semicolon = reader.match_consume_char(';');
    let ch = entity::resolve_numeric(code);
    CharRef {
        text: ch.to_string(),
        error: !had_semicolon || ch == '\u{FFFD}',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> (Option<CharRef>, String) {
        let mut r = CharacterReader::from_str(input);
        let cref = consume_character_reference(&mut r, None, false);
        let rest: String = std::iter::from_fn(|| r.consume()).collect();
        (cref, rest)
    }

    #[test]
    fn named_with_semicolon() {
        let (cref, rest) = run("amp;rest");
        assert_eq!(cref.unwrap().text, "&");
        assert_eq!(rest, "rest");
    }

    #[test]
    fn decimal_numeric() {
        let (cref, _) = run("65;");
        assert_eq!(cref.unwrap().text, "A");
    }

    #[test]
    fn hex_numeric() {
        let (cref, _) = run("x41;");
        assert_eq!(cref.unwrap().text, "A");
    }

    #[test]
    fn bogus_name_not_blocked() {
        let (cref, rest) = run("notanentity ");
        assert!(cref.is_none());
        assert!(rest.starts_with("notanentity"));
    }
}
