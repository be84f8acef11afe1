//! Hand-written recursive-descent reader (spec §4.8), grounded directly on
//! `lp<K>::str_read`/`term_read`/`rule_read` in the original evaluator.
//! Comment stripping happens once, up front, over the whole source; the
//! character-level reading below never sees a `#`.

use crate::dict::Dict;
use crate::rule::{RawRule, RawTerm};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("identifier expected at byte {pos}")]
    IdentifierExpected { pos: usize },
    #[error("term expected at byte {pos}")]
    TermExpected { pos: usize },
    #[error("':-' expected at byte {pos}")]
    SeparatorExpected { pos: usize },
    #[error("unexpected end of input")]
    UnexpectedEof,
}

/// Drop everything from an unescaped `#` to end of line, on every line.
fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for line in src.lines() {
        match line.find('#') {
            Some(i) => out.push_str(&line[..i]),
            None => out.push_str(line),
        }
        out.push(' ');
    }
    out
}

/// A character cursor over the (already comment-stripped) source that tracks
/// its own byte offset, so parse errors can report where they occurred.
struct Scanner<'a> {
    rest: std::str::Chars<'a>,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Scanner<'a> {
        Scanner { rest: src.chars(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.rest.clone().next()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.rest.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.next();
        }
    }
}

/// Read one identifier: an optional leading `?`, then one or more
/// alphanumeric/`_` characters. Interns it immediately via `dict`.
fn read_ident(s: &mut Scanner, dict: &mut Dict) -> Result<i64, ParseError> {
    s.skip_ws();
    let start = s.pos;
    let mut ident = String::new();
    if let Some('?') = s.peek() {
        ident.push('?');
        s.next();
    }
    let start_len = ident.len();
    while matches!(s.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
        ident.push(s.next().unwrap());
    }
    if ident.len() == start_len {
        return Err(ParseError::IdentifierExpected { pos: start });
    }
    Ok(dict.intern(&ident))
}

/// Read one term: an optional leading `~` (negation), then one or more
/// identifiers, stopping at `,`, `:`, or `.`. Returns `None` if nothing but
/// whitespace remains before the next stop character (used by `read_rule`
/// to detect the end of a rule body or of the whole program).
fn read_term(s: &mut Scanner, dict: &mut Dict) -> Result<Option<RawTerm>, ParseError> {
    s.skip_ws();
    match s.peek() {
        None | Some(',') | Some('.') | Some(':') => return Ok(None),
        _ => {}
    }
    let mut term = RawTerm::new();
    if let Some('~') = s.peek() {
        term.push(-1);
        s.next();
    } else {
        term.push(1);
    }
    loop {
        s.skip_ws();
        match s.peek() {
            Some(',') => {
                s.next();
                return Ok(Some(term));
            }
            Some('.') | Some(':') | None => return Ok(Some(term)),
            _ => term.push(read_ident(s, dict)?),
        }
    }
}

/// Read one rule. A fact is `head.`; a rule is `head :- body1, ..., bodyN.`.
/// The returned [`RawRule`] always has the head last. Returns `Ok(None)` at
/// end of input (no more rules to read).
fn read_rule(s: &mut Scanner, dict: &mut Dict) -> Result<Option<RawRule>, ParseError> {
    let head = match read_term(s, dict)? {
        None => return Ok(None),
        Some(t) => t,
    };
    let mut rule = RawRule::new();
    s.skip_ws();
    if let Some('.') = s.peek() {
        s.next();
        rule.push(head);
        return Ok(Some(rule));
    }
    let sep_pos = s.pos;
    s.skip_ws();
    if s.next() != Some(':') || s.next() != Some('-') {
        return Err(ParseError::SeparatorExpected { pos: sep_pos });
    }
    loop {
        let term_pos = s.pos;
        let body = read_term(s, dict)?.ok_or(ParseError::TermExpected { pos: term_pos })?;
        rule.push(body);
        s.skip_ws();
        if let Some('.') = s.peek() {
            s.next();
            break;
        }
    }
    rule.push(head);
    Ok(Some(rule))
}

/// Strip comments, then read every rule in the program.
pub fn parse_program(src: &str, dict: &mut Dict) -> Result<Vec<RawRule>, ParseError> {
    let stripped = strip_comments(src);
    let mut scanner = Scanner::new(&stripped);
    let mut rules = Vec::new();
    while let Some(rule) = read_rule(&mut scanner, dict)? {
        rules.push(rule);
    }
    Ok(rules)
}
