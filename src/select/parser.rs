//! Recursive-descent parser for the selector grammar (
//! "Grammar"): comma-separated selector groups, each a chain of compound
//! selectors joined by combinators (whitespace for descendant, `>` `+`
//! `~` for child/adjacent/general sibling), each compound a run of
//! `tag`, `#id`, `.class`, `[attr...]`, and `:pseudo(...)` simple
//! selectors.

use regex::Regex;

use super::evaluator::{Combinator, Selector, SimpleSelector, Step};
use super::SelectorError;

pub fn parse(query: &str) -> Result<Vec<Selector>, SelectorError> {
    let mut p = Parser {
        chars: query.chars().collect(),
        pos: 0,
    };
    let group = p.parse_group(None)?;
    p.skip_ws();
    if !p.eof() {
        return Err(p.syntax_error("end of selector"));
    }
    Ok(group)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn syntax_error(&self, expected: &'static str) -> SelectorError {
        match self.peek() {
            Some(c) => SelectorError::Syntax {
                pos: self.pos,
                found: c.to_string(),
                expected,
            },
            None => SelectorError::UnexpectedEof(expected),
        }
    }

    fn expect(&mut self, c: char) -> Result<(), SelectorError> {
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.syntax_error_for_char(c))
        }
    }

    fn syntax_error_for_char(&self, _wanted: char) -> SelectorError {
        self.syntax_error("closing delimiter")
    }

    /// Parses a comma-separated list of selectors, stopping before `stop`
    /// (an unconsumed `)`, passed by sub-selector parsers) or at EOF.
    fn parse_group(&mut self, stop: Option<char>) -> Result<Vec<Selector>, SelectorError> {
        let mut out = Vec::new();
        loop {
            let sel = self.parse_selector(stop)?;
            out.push(sel);
            self.skip_ws();
            if self.peek() == Some(',') {
                self.bump();
                self.skip_ws();
                continue;
            }
            break;
        }
        Ok(out)
    }

    fn parse_selector(&mut self, stop: Option<char>) -> Result<Selector, SelectorError> {
        let mut steps: Vec<Step> = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let at_stop = self.eof()
                || self.peek() == Some(',')
                || stop.is_some() && self.peek() == stop;
            if at_stop {
                break;
            }
            let explicit = match self.peek() {
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    Some(Combinator::Child)
                }
                Some('+') => {
                    self.bump();
                    self.skip_ws();
                    Some(Combinator::NextSibling)
                }
                Some('~') => {
                    self.bump();
                    self.skip_ws();
                    Some(Combinator::SubsequentSibling)
                }
                _ => None,
            };
            let combinator = explicit.or(if !steps.is_empty() && had_ws {
                Some(Combinator::Descendant)
            } else {
                None
            });
            let compound = self.parse_compound()?;
            if compound.is_empty() {
                return Err(self.syntax_error("a tag, class, id, attribute, or pseudo-class"));
            }
            steps.push(Step { combinator, compound });
        }
        if steps.is_empty() {
            return Err(self.syntax_error("a selector"));
        }
        Ok(Selector { steps })
    }

    fn parse_compound(&mut self) -> Result<Vec<SimpleSelector>, SelectorError> {
        let mut out = Vec::new();
        match self.peek() {
            Some('*') => {
                self.bump();
                out.push(SimpleSelector::Universal);
            }
            Some(c) if is_ident_start(c) || c == '\\' => {
                let name = self.parse_ident()?;
                if self.peek() == Some('|') && self.chars.get(self.pos + 1) != Some(&'=') {
                    self.bump();
                    let local = if self.peek() == Some('*') {
                        self.bump();
                        "*".to_string()
                    } else {
                        self.parse_ident()?
                    };
                    out.push(SimpleSelector::NsTag(
                        name.to_ascii_lowercase(),
                        local.to_ascii_lowercase(),
                    ));
                } else {
                    out.push(SimpleSelector::Tag(name.to_ascii_lowercase()));
                }
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    out.push(SimpleSelector::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.bump();
                    out.push(SimpleSelector::Class(self.parse_ident()?));
                }
                Some('[') => out.push(self.parse_attr()?),
                Some(':') => out.push(self.parse_pseudo()?),
                _ => break,
            }
        }
        Ok(out)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut s = String::new();
        loop {
            match self.peek() {
                Some('\\') => {
                    self.bump();
                    match self.bump() {
                        Some(c) => s.push(c),
                        None => return Err(SelectorError::UnexpectedEof("an escaped character")),
                    }
                }
                Some(c) if is_ident_char(c) => s.push(self.bump().unwrap()),
                _ => break,
            }
        }
        if s.is_empty() {
            return Err(self.syntax_error("an identifier"));
        }
        Ok(s)
    }

    fn parse_attr(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.expect('[')?;
        self.skip_ws();
        if self.peek() == Some('^') {
            self.bump();
            let prefix = self.parse_ident()?;
            self.skip_ws();
            self.expect(']')?;
            return Ok(SimpleSelector::AttrKeyPrefix(prefix));
        }
        let key = self.parse_ident()?;
        self.skip_ws();
        let sel = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(SimpleSelector::AttrExists(key));
            }
            Some('^') => {
                self.bump();
                self.expect('=')?;
                SimpleSelector::AttrStartsWith(key, self.parse_attr_value()?)
            }
            Some('$') => {
                self.bump();
                self.expect('=')?;
                SimpleSelector::AttrEndsWith(key, self.parse_attr_value()?)
            }
            Some('*') => {
                self.bump();
                self.expect('=')?;
                SimpleSelector::AttrContains(key, self.parse_attr_value()?)
            }
            Some('~') => {
                self.bump();
                self.expect('=')?;
                let pattern = self.parse_attr_value()?;
                SimpleSelector::AttrMatches(key, Regex::new(&pattern)?)
            }
            Some('!') => {
                self.bump();
                self.expect('=')?;
                SimpleSelector::AttrNotEquals(key, self.parse_attr_value()?)
            }
            Some('=') => {
                self.bump();
                SimpleSelector::AttrEquals(key, self.parse_attr_value()?)
            }
            _ => return Err(self.syntax_error("an attribute operator")),
        };
        self.skip_ws();
        self.expect(']')?;
        Ok(sel)
    }

    fn parse_attr_value(&mut self) -> Result<String, SelectorError> {
        self.skip_ws();
        let v = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                let mut s = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == q => break,
                        Some(c) => s.push(c),
                        None => return Err(SelectorError::UnexpectedEof("closing quote")),
                    }
                }
                s
            }
            _ => {
                let mut s = String::new();
                while matches!(self.peek(), Some(c) if c != ']' && !c.is_whitespace()) {
                    s.push(self.bump().unwrap());
                }
                s
            }
        };
        Ok(v)
    }

    /// Reads raw text up to (but not including) the `)` that closes the
    /// current pseudo-class argument, tracking nested `(`/`)` so that
    /// e.g. `:contains(a (b))` keeps its inner parens.
    fn read_balanced_until_close_paren(&mut self) -> String {
        let mut depth = 0i32;
        let mut s = String::new();
        loop {
            match self.peek() {
                Some('\\') => {
                    self.bump();
                    if let Some(c) = self.bump() {
                        s.push(c);
                    }
                }
                Some('(') => {
                    depth += 1;
                    s.push(self.bump().unwrap());
                }
                Some(')') if depth == 0 => break,
                Some(')') => {
                    depth -= 1;
                    s.push(self.bump().unwrap());
                }
                Some(_) => s.push(self.bump().unwrap()),
                None => break,
            }
        }
        s
    }

    fn parse_pseudo_text_arg(&mut self) -> Result<String, SelectorError> {
        self.expect('(')?;
        self.skip_ws();
        let text = if matches!(self.peek(), Some('"' | '\'')) {
            self.parse_attr_value()?
        } else {
            self.read_balanced_until_close_paren().trim().to_string()
        };
        self.skip_ws();
        self.expect(')')?;
        Ok(text)
    }

    fn parse_pseudo(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.expect(':')?;
        let name = self.parse_ident()?;
        let lname = name.to_ascii_lowercase();
        Ok(match lname.as_str() {
            "not" => SimpleSelector::Not(self.parse_pseudo_selector_group_arg()?),
            "has" => SimpleSelector::Has(self.parse_pseudo_selector_group_arg()?),
            "is" => SimpleSelector::Is(self.parse_pseudo_selector_group_arg()?),
            "contains" => SimpleSelector::Contains(self.parse_pseudo_text_arg()?),
            "containsown" => SimpleSelector::ContainsOwn(self.parse_pseudo_text_arg()?),
            "matches" => {
                let pat = self.parse_pseudo_text_arg()?;
                SimpleSelector::Matches(Regex::new(&pat)?)
            }
            "matchesown" => {
                let pat = self.parse_pseudo_text_arg()?;
                SimpleSelector::MatchesOwn(Regex::new(&pat)?)
            }
            "nth-child" => {
                let (a, b) = parse_an_plus_b(&self.parse_pseudo_text_arg()?, "nth-child")?;
                SimpleSelector::NthChild(a, b)
            }
            "nth-last-child" => {
                let (a, b) = parse_an_plus_b(&self.parse_pseudo_text_arg()?, "nth-last-child")?;
                SimpleSelector::NthLastChild(a, b)
            }
            "nth-of-type" => {
                let (a, b) = parse_an_plus_b(&self.parse_pseudo_text_arg()?, "nth-of-type")?;
                SimpleSelector::NthOfType(a, b)
            }
            "nth-last-of-type" => {
                let (a, b) = parse_an_plus_b(&self.parse_pseudo_text_arg()?, "nth-last-of-type")?;
                SimpleSelector::NthLastOfType(a, b)
            }
            "lt" => SimpleSelector::IndexLessThan(parse_int_arg(&self.parse_pseudo_text_arg()?, "lt")?),
            "gt" => SimpleSelector::IndexGreaterThan(parse_int_arg(&self.parse_pseudo_text_arg()?, "gt")?),
            "eq" => SimpleSelector::IndexEquals(parse_int_arg(&self.parse_pseudo_text_arg()?, "eq")?),
            "first-child" => SimpleSelector::FirstChild,
            "last-child" => SimpleSelector::LastChild,
            "only-child" => SimpleSelector::OnlyChild,
            "first-of-type" => SimpleSelector::FirstOfType,
            "last-of-type" => SimpleSelector::LastOfType,
            "only-of-type" => SimpleSelector::OnlyOfType,
            "empty" => SimpleSelector::Empty,
            "root" => SimpleSelector::Root,
            _ => return Err(SelectorError::UnknownPseudo(name)),
        })
    }

    fn parse_pseudo_selector_group_arg(&mut self) -> Result<Vec<Selector>, SelectorError> {
        self.expect('(')?;
        self.skip_ws();
        let group = self.parse_group(Some(')'))?;
        self.skip_ws();
        self.expect(')')?;
        Ok(group)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn parse_int_arg(s: &str, pseudo: &'static str) -> Result<i64, SelectorError> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| SelectorError::InvalidInteger {
            pseudo,
            value: s.to_string(),
        })
}

/// Parses a CSS `An+B` micro-syntax: `odd`, `even`, `<b>`, `<a>n`,
/// `<a>n+<b>`, `<a>n-<b>`, `-n+<b>`, etc.
fn parse_an_plus_b(input: &str, pseudo: &'static str) -> Result<(i64, i64), SelectorError> {
    let s: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let lower = s.to_ascii_lowercase();
    if lower == "odd" {
        return Ok((2, 1));
    }
    if lower == "even" {
        return Ok((2, 0));
    }
    let err = || SelectorError::InvalidInteger {
        pseudo,
        value: input.to_string(),
    };
    if let Some(n_pos) = lower.find('n') {
        let a_str = &lower[..n_pos];
        let a = match a_str {
            "" | "+" => 1,
            "-" => -1,
            _ => a_str.parse::<i64>().map_err(|_| err())?,
        };
        let b_str = &lower[n_pos + 1..];
        let b = if b_str.is_empty() {
            0
        } else {
            b_str.parse::<i64>().map_err(|_| err())?
        };
        Ok((a, b))
    } else {
        let b = lower.parse::<i64>().map_err(|_| err())?;
        Ok((0, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_tag() {
        let g = parse("div").unwrap();
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].steps.len(), 1);
    }

    #[test]
    fn parses_descendant_and_child_combinators() {
        let g = parse("div p > span").unwrap();
        assert_eq!(g[0].steps.len(), 3);
        assert!(matches!(g[0].steps[1].combinator, Some(Combinator::Descendant)));
        assert!(matches!(g[0].steps[2].combinator, Some(Combinator::Child)));
    }

    #[test]
    fn parses_group_with_comma() {
        let g = parse("a, b.c").unwrap();
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn parses_nth_child_expression() {
        let (a, b) = parse_an_plus_b("2n+1", "nth-child").unwrap();
        assert_eq!((a, b), (2, 1));
        let (a, b) = parse_an_plus_b("odd", "nth-child").unwrap();
        assert_eq!((a, b), (2, 1));
    }

    #[test]
    fn rejects_unknown_pseudo() {
        assert!(parse("div:bogus").is_err());
    }

    #[test]
    fn parses_nested_has_contains() {
        let g = parse("div:has(p:contains(hi))").unwrap();
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn parses_key_prefix_attribute() {
        let g = parse("div[^data-]").unwrap();
        assert!(matches!(
            g[0].steps[0].compound[1],
            SimpleSelector::AttrKeyPrefix(_)
        ));
    }

    #[test]
    fn parses_namespaced_tag() {
        let g = parse("svg|path").unwrap();
        assert!(matches!(
            g[0].steps[0].compound[0],
            SimpleSelector::NsTag(ref ns, ref local) if ns == "svg" && local == "path"
        ));
    }

    #[test]
    fn parses_escaped_identifier() {
        let g = parse(r"\#foo").unwrap();
        assert!(matches!(
            g[0].steps[0].compound[0],
            SimpleSelector::Tag(ref t) if t == "#foo"
        ));
    }

    #[test]
    fn parses_not_equals_and_regex_value() {
        let g = parse("a[href!=x]").unwrap();
        assert!(matches!(
            g[0].steps[0].compound[1],
            SimpleSelector::AttrNotEquals(_, _)
        ));
        let g = parse(r"a[href~=\d+]").unwrap();
        assert!(matches!(
            g[0].steps[0].compound[1],
            SimpleSelector::AttrMatches(_, _)
        ));
    }
}
