// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Numeric field parsers: decimal integers, floats and `0x`-prefixed hex
//! numbers.

use serde_json::{Map, Number as JsonNumber, Value};

use crate::{
    context::Context,
    errors::RulebaseError,
    parsers::{Match, Parse},
};

fn digit_run(b: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    i
}

/// One or more decimal digits. Captured as a JSON integer; runs too long
/// for an `i64` fall back to the matched text.
#[derive(Debug, Clone, Copy)]
pub struct Number;

impl Parse for Number {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let end = digit_run(msg.as_bytes(), offs);
        if end == offs {
            return None;
        }
        Some(Match::with_value(end, capture, || {
            match msg[offs..end].parse::<i64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => Value::String(msg[offs..end].to_string()),
            }
        }))
    }
}

/// Decimal number with optional leading `-` and optional fraction.
#[derive(Debug, Clone, Copy)]
pub struct Float;

impl Parse for Float {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        let mut i = offs;
        if i < b.len() && b[i] == b'-' {
            i += 1;
        }
        let int_end = digit_run(b, i);
        if int_end == i {
            return None;
        }
        let mut end = int_end;
        if end < b.len() && b[end] == b'.' {
            let frac_end = digit_run(b, end + 1);
            if frac_end > end + 1 {
                end = frac_end;
            }
        }
        Some(Match::with_value(end, capture, || {
            msg[offs..end]
                .parse::<f64>()
                .ok()
                .and_then(JsonNumber::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(msg[offs..end].to_string()))
        }))
    }
}

/// `0x`-prefixed hexadecimal number. Optional configuration `maxval`
/// rejects values above the bound. Captured as the matched text.
#[derive(Debug, Clone, Copy)]
pub struct HexNumber {
    maxval: Option<u64>,
}

impl HexNumber {
    pub(crate) fn from_cfg(cfg: &Map<String, Value>) -> Result<Self, RulebaseError> {
        let maxval = match cfg.get("maxval") {
            None => None,
            Some(v) => Some(v.as_u64().ok_or_else(|| {
                RulebaseError::bad_config("hexnumber", "'maxval' must be a non-negative integer")
            })?),
        };
        Ok(HexNumber { maxval })
    }
}

impl Parse for HexNumber {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        if b.len() < offs + 3 || b[offs] != b'0' || b[offs + 1] != b'x' {
            return None;
        }
        let mut end = offs + 2;
        while end < b.len() && b[end].is_ascii_hexdigit() {
            end += 1;
        }
        if end == offs + 2 {
            return None;
        }
        let value = u64::from_str_radix(&msg[offs + 2..end], 16).ok()?;
        if let Some(maxval) = self.maxval
            && value > maxval
        {
            return None;
        }
        Some(Match::with_value(end, capture, || {
            Value::String(msg[offs..end].to_string())
        }))
    }
}
