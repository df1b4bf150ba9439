// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Timestamp parsers for the formats commonly found at the front of log
//! lines. All of them capture the matched text verbatim; interpreting the
//! timestamp is left to consumers of the record.

use serde_json::Value;

use crate::{
    context::Context,
    parsers::{Match, Parse},
};

const MONTHS: [&[u8; 3]; 12] = [
    b"Jan", b"Feb", b"Mar", b"Apr", b"May", b"Jun", b"Jul", b"Aug", b"Sep", b"Oct",
    b"Nov", b"Dec",
];

fn str_value(msg: &str, a: usize, b: usize) -> Value {
    Value::String(msg[a..b].to_string())
}

/// Reads exactly `width` digits starting at `from` and checks the decoded
/// value against an inclusive range.
fn fixed_digits(b: &[u8], from: usize, width: usize, min: u32, max: u32) -> Option<usize> {
    if from + width > b.len() {
        return None;
    }
    let mut v: u32 = 0;
    for &c in &b[from..from + width] {
        if !c.is_ascii_digit() {
            return None;
        }
        v = v * 10 + u32::from(c - b'0');
    }
    (min..=max).contains(&v).then_some(from + width)
}

/// `hh:mm:ss` with a caller-supplied hour range.
fn time_hms(b: &[u8], from: usize, hour_min: u32, hour_max: u32) -> Option<usize> {
    let mut i = fixed_digits(b, from, 2, hour_min, hour_max)?;
    for _ in 0..2 {
        if b.get(i) != Some(&b':') {
            return None;
        }
        i = fixed_digits(b, i + 1, 2, 0, 59)?;
    }
    Some(i)
}

/// Traditional syslog timestamp: `Mmm [d]d hh:mm:ss`, with the day either
/// space-padded or one to two digits.
#[derive(Debug, Clone, Copy)]
pub struct Rfc3164Date;

impl Parse for Rfc3164Date {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        if offs + 3 > b.len() {
            return None;
        }
        let month: &[u8; 3] = b[offs..offs + 3].try_into().ok()?;
        if !MONTHS.contains(&month) {
            return None;
        }
        let mut i = offs + 3;
        if b.get(i) != Some(&b' ') {
            return None;
        }
        i += 1;
        // Day of month: " 5", "5" or "15".
        if b.get(i) == Some(&b' ') {
            i = fixed_digits(b, i + 1, 1, 1, 9)?;
        } else {
            i = match fixed_digits(b, i, 2, 1, 31) {
                Some(j) => j,
                None => fixed_digits(b, i, 1, 1, 9)?,
            };
        }
        if b.get(i) != Some(&b' ') {
            return None;
        }
        let end = time_hms(b, i + 1, 0, 23)?;
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// RFC 5424 / ISO 8601 timestamp with mandatory time and zone:
/// `yyyy-mm-ddThh:mm:ss[.frac](Z|±hh:mm)`.
#[derive(Debug, Clone, Copy)]
pub struct Rfc5424Date;

impl Parse for Rfc5424Date {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        let i = date_ymd(b, offs)?;
        if !matches!(b.get(i), Some(&b'T') | Some(&b't')) {
            return None;
        }
        let mut i = time_hms(b, i + 1, 0, 23)?;
        if b.get(i) == Some(&b'.') {
            let mut j = i + 1;
            while j < b.len() && j - i <= 6 && b[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 {
                i = j;
            }
        }
        let end = match b.get(i) {
            Some(&b'Z') | Some(&b'z') => i + 1,
            Some(&b'+') | Some(&b'-') => {
                let j = fixed_digits(b, i + 1, 2, 0, 23)?;
                if b.get(j) != Some(&b':') {
                    return None;
                }
                fixed_digits(b, j + 1, 2, 0, 59)?
            },
            _ => return None,
        };
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// `yyyy-mm-dd`.
#[derive(Debug, Clone, Copy)]
pub struct IsoDate;

fn date_ymd(b: &[u8], from: usize) -> Option<usize> {
    let i = fixed_digits(b, from, 4, 0, 9999)?;
    if b.get(i) != Some(&b'-') {
        return None;
    }
    let i = fixed_digits(b, i + 1, 2, 1, 12)?;
    if b.get(i) != Some(&b'-') {
        return None;
    }
    fixed_digits(b, i + 1, 2, 1, 31)
}

impl Parse for IsoDate {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let end = date_ymd(msg.as_bytes(), offs)?;
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// `hh:mm:ss` on the 24-hour clock.
#[derive(Debug, Clone, Copy)]
pub struct Time24hr;

impl Parse for Time24hr {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let end = time_hms(msg.as_bytes(), offs, 0, 23)?;
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// `hh:mm:ss` on the 12-hour clock (hours 01–12).
#[derive(Debug, Clone, Copy)]
pub struct Time12hr;

impl Parse for Time12hr {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let end = time_hms(msg.as_bytes(), offs, 1, 12)?;
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// Kernel ring-buffer timestamp: `[seconds.micros]`, seconds optionally
/// space-padded as emitted by dmesg, micros exactly six digits.
#[derive(Debug, Clone, Copy)]
pub struct KernelTimestamp;

impl Parse for KernelTimestamp {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        if b.get(offs) != Some(&b'[') {
            return None;
        }
        let mut i = offs + 1;
        while i < b.len() && b[i] == b' ' {
            i += 1;
        }
        let secs_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == secs_start || i - secs_start > 12 {
            return None;
        }
        if b.get(i) != Some(&b'.') {
            return None;
        }
        let i = fixed_digits(b, i + 1, 6, 0, 999_999)?;
        if b.get(i) != Some(&b']') {
            return None;
        }
        let end = i + 1;
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// Elapsed time `h+:mm:ss`, hours unbounded.
#[derive(Debug, Clone, Copy)]
pub struct Duration;

impl Parse for Duration {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        let mut i = offs;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == offs {
            return None;
        }
        if b.get(i) != Some(&b':') {
            return None;
        }
        let i = fixed_digits(b, i + 1, 2, 0, 59)?;
        if b.get(i) != Some(&b':') {
            return None;
        }
        let end = fixed_digits(b, i + 1, 2, 0, 59)?;
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}
