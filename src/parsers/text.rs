// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Free-text field parsers: whitespace runs, words, quoted strings and
//! the delimiter-driven `string-to` / `char-to` / `char-sep` family.

use serde_json::{Map, Value};

use crate::{
    context::Context,
    errors::RulebaseError,
    parsers::{Match, Parse},
};

fn str_value(msg: &str, a: usize, b: usize) -> Value {
    Value::String(msg[a..b].to_string())
}

fn cfg_char(cfg: &Map<String, Value>, parser: &str) -> Result<char, RulebaseError> {
    let s = cfg
        .get("char")
        .and_then(Value::as_str)
        .ok_or_else(|| RulebaseError::bad_config(parser, "missing 'char' string"))?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(RulebaseError::bad_config(parser, "'char' must be exactly one character")),
    }
}

/// One or more spaces or tabs.
#[derive(Debug, Clone, Copy)]
pub struct Whitespace;

impl Parse for Whitespace {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        let mut end = offs;
        while end < b.len() && (b[end] == b' ' || b[end] == b'\t') {
            end += 1;
        }
        if end == offs {
            return None;
        }
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// One or more characters, up to the next space or end of input.
#[derive(Debug, Clone, Copy)]
pub struct Word;

impl Parse for Word {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        let mut end = offs;
        while end < b.len() && b[end] != b' ' {
            end += 1;
        }
        if end == offs {
            return None;
        }
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// One or more ASCII letters.
#[derive(Debug, Clone, Copy)]
pub struct Alpha;

impl Parse for Alpha {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        let mut end = offs;
        while end < b.len() && b[end].is_ascii_alphabetic() {
            end += 1;
        }
        if end == offs {
            return None;
        }
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// The remainder of the input, possibly empty. Always matches; its
/// registry priority (255) keeps it the very last resort.
#[derive(Debug, Clone, Copy)]
pub struct Rest;

impl Parse for Rest {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        Some(Match::with_value(msg.len(), capture, || {
            str_value(msg, offs, msg.len())
        }))
    }
}

/// Scans a double-quoted string starting at `offs`, honoring `\"` and
/// `\\` escapes. Returns the offset just past the closing quote.
fn scan_quoted(b: &[u8], offs: usize) -> Option<usize> {
    if offs >= b.len() || b[offs] != b'"' {
        return None;
    }
    let mut i = offs + 1;
    while i < b.len() {
        match b[i] {
            b'\\' if i + 1 < b.len() => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// A double-quoted string. Captured text includes the quotes.
#[derive(Debug, Clone, Copy)]
pub struct QuotedString;

impl Parse for QuotedString {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let end = scan_quoted(msg.as_bytes(), offs)?;
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// Optionally quoted string: a quoted string when the input leads with a
/// quote (captured as the unescaped inner text), a plain word otherwise.
#[derive(Debug, Clone, Copy)]
pub struct OpQuotedString;

impl Parse for OpQuotedString {
    fn parse(&self, ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        if b.get(offs) != Some(&b'"') {
            return Word.parse(ctx, msg, offs, capture);
        }
        let end = scan_quoted(b, offs)?;
        Some(Match::with_value(end, capture, || {
            let inner = &msg[offs + 1..end - 1];
            let mut out = String::with_capacity(inner.len());
            let mut esc = false;
            for c in inner.chars() {
                if esc {
                    out.push(c);
                    esc = false;
                } else if c == '\\' {
                    esc = true;
                } else {
                    out.push(c);
                }
            }
            Value::String(out)
        }))
    }
}

/// Everything strictly before the first occurrence of a delimiter string;
/// the delimiter itself is not consumed. Configuration: `text`.
#[derive(Debug, Clone)]
pub struct StringTo {
    text: String,
}

impl StringTo {
    pub(crate) fn from_cfg(cfg: &Map<String, Value>) -> Result<Self, RulebaseError> {
        let text = cfg
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| RulebaseError::bad_config("string-to", "missing 'text' string"))?;
        if text.is_empty() {
            return Err(RulebaseError::bad_config("string-to", "'text' must not be empty"));
        }
        Ok(StringTo {
            text: text.to_string(),
        })
    }
}

impl Parse for StringTo {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let idx = msg[offs..].find(&self.text)?;
        if idx == 0 {
            return None;
        }
        let end = offs + idx;
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// Everything strictly before the first occurrence of a delimiter
/// character; the delimiter is not consumed. Configuration: `char`.
#[derive(Debug, Clone, Copy)]
pub struct CharTo {
    delim: char,
}

impl CharTo {
    pub(crate) fn from_cfg(cfg: &Map<String, Value>) -> Result<Self, RulebaseError> {
        Ok(CharTo {
            delim: cfg_char(cfg, "char-to")?,
        })
    }
}

impl Parse for CharTo {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let idx = msg[offs..].find(self.delim)?;
        if idx == 0 {
            return None;
        }
        let end = offs + idx;
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// Everything up to a separator character or end of input; may be empty.
/// Configuration: `char`.
#[derive(Debug, Clone, Copy)]
pub struct CharSep {
    delim: char,
}

impl CharSep {
    pub(crate) fn from_cfg(cfg: &Map<String, Value>) -> Result<Self, RulebaseError> {
        Ok(CharSep {
            delim: cfg_char(cfg, "char-sep")?,
        })
    }
}

impl Parse for CharSep {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let end = match msg[offs..].find(self.delim) {
            Some(idx) => offs + idx,
            None => msg.len(),
        };
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}
