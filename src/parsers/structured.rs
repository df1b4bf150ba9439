// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Parsers that lift structured payloads embedded in log lines into
//! nested objects: JSON, CEE/lumberjack, name=value lists, ArcSight CEF,
//! Checkpoint LEA and iptables field dumps.

use serde_json::{Deserializer, Map, Value};

use crate::{
    context::Context,
    parsers::{Match, Parse},
};

/// One JSON value, parsed as a prefix of the remaining input.
#[derive(Debug, Clone, Copy)]
pub struct Json;

/// Parses a single JSON value at `offs`, returning it together with the
/// offset just past its serialized form.
fn parse_json_prefix(msg: &str, offs: usize) -> Option<(usize, Value)> {
    let mut stream = Deserializer::from_str(&msg[offs..]).into_iter::<Value>();
    let value = stream.next()?.ok()?;
    Some((offs + stream.byte_offset(), value))
}

impl Parse for Json {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let (end, value) = parse_json_prefix(msg, offs)?;
        Some(Match::with_value(end, capture, || value))
    }
}

/// CEE/lumberjack structured syslog: the `@cee:` cookie followed by a
/// JSON object.
#[derive(Debug, Clone, Copy)]
pub struct CeeSyslog;

impl Parse for CeeSyslog {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let rest = msg[offs..].strip_prefix("@cee:")?;
        let mut i = offs + 5;
        i += rest.len() - rest.trim_start_matches(' ').len();
        let (end, value) = parse_json_prefix(msg, i)?;
        if !value.is_object() {
            return None;
        }
        Some(Match::with_value(end, capture, || value))
    }
}

/// Space-separated `name=value` pairs, e.g. `a=1 b=2`. At least one pair
/// is required; scanning stops before the first token that is not a pair.
#[derive(Debug, Clone, Copy)]
pub struct NameValueList;

/// Scans one `name=value` pair; returns (end, name, value).
fn scan_pair(msg: &str, from: usize) -> Option<(usize, &str, &str)> {
    let b = msg.as_bytes();
    let mut i = from;
    while i < b.len() && b[i] != b'=' && b[i] != b' ' {
        i += 1;
    }
    if i == from || b.get(i) != Some(&b'=') {
        return None;
    }
    let name = &msg[from..i];
    let vstart = i + 1;
    let mut j = vstart;
    while j < b.len() && b[j] != b' ' {
        j += 1;
    }
    Some((j, name, &msg[vstart..j]))
}

impl Parse for NameValueList {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let mut obj = Map::new();
        let (mut end, name, value) = scan_pair(msg, offs)?;
        obj.insert(name.to_string(), Value::String(value.to_string()));
        while msg.as_bytes().get(end) == Some(&b' ') {
            match scan_pair(msg, end + 1) {
                Some((e, n, v)) => {
                    obj.insert(n.to_string(), Value::String(v.to_string()));
                    end = e;
                },
                None => break,
            }
        }
        Some(Match::with_value(end, capture, || Value::Object(obj)))
    }
}

/// Unescapes a CEF header field (`\|` and `\\`).
fn cef_unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut esc = false;
    for c in raw.chars() {
        if esc {
            out.push(c);
            esc = false;
        } else if c == '\\' {
            esc = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Scans one `|`-terminated CEF header field, honoring escapes. Returns
/// (offset past the `|`, unescaped field).
fn cef_field(msg: &str, from: usize) -> Option<(usize, String)> {
    let b = msg.as_bytes();
    let mut i = from;
    while i < b.len() {
        match b[i] {
            b'\\' if i + 1 < b.len() => i += 2,
            b'|' => return Some((i + 1, cef_unescape(&msg[from..i]))),
            _ => i += 1,
        }
    }
    None
}

/// ArcSight Common Event Format, version 0:
/// `CEF:0|vendor|product|version|sig|name|severity|extensions`.
/// Consumes the rest of the input; extension values may contain spaces.
#[derive(Debug, Clone, Copy)]
pub struct Cef;

/// Splits the CEF extension blob into key/value pairs. A value runs to
/// the start of the next `key=` token or end of input.
fn cef_extensions(ext: &str) -> Map<String, Value> {
    let mut out = Map::new();
    let b = ext.as_bytes();
    let mut i = 0;
    while i < b.len() {
        while i < b.len() && b[i] == b' ' {
            i += 1;
        }
        let key_start = i;
        while i < b.len() && b[i] != b'=' && b[i] != b' ' {
            i += 1;
        }
        if i >= b.len() || b[i] != b'=' || i == key_start {
            break;
        }
        let key = &ext[key_start..i];
        i += 1;
        let val_start = i;
        let mut val_end = b.len();
        let mut j = i;
        while j < b.len() {
            if b[j] == b' ' {
                // Look ahead for the next "key=" token.
                let mut k = j + 1;
                while k < b.len() && b[k] != b'=' && b[k] != b' ' {
                    k += 1;
                }
                if k < b.len() && b[k] == b'=' && k > j + 1 {
                    val_end = j;
                    break;
                }
            }
            j += 1;
        }
        out.insert(
            key.to_string(),
            Value::String(ext[val_start..val_end].to_string()),
        );
        i = val_end;
    }
    out
}

impl Parse for Cef {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        if !msg[offs..].starts_with("CEF:0|") {
            return None;
        }
        let base = offs + "CEF:0|".len();
        let (i, vendor) = cef_field(msg, base)?;
        let (i, product) = cef_field(msg, i)?;
        let (i, version) = cef_field(msg, i)?;
        let (i, sig) = cef_field(msg, i)?;
        let (i, name) = cef_field(msg, i)?;
        let (i, severity) = cef_field(msg, i)?;
        let end = msg.len();
        Some(Match::with_value(end, capture, || {
            let mut obj = Map::new();
            obj.insert("DeviceVendor".into(), Value::String(vendor));
            obj.insert("DeviceProduct".into(), Value::String(product));
            obj.insert("DeviceVersion".into(), Value::String(version));
            obj.insert("SignatureID".into(), Value::String(sig));
            obj.insert("Name".into(), Value::String(name));
            obj.insert("Severity".into(), Value::String(severity));
            obj.insert("Extensions".into(), Value::Object(cef_extensions(&msg[i..])));
            Value::Object(obj)
        }))
    }
}

/// Checkpoint LEA field list: `key: value; key2: value2;`, with the
/// trailing semicolon of the last field optional.
#[derive(Debug, Clone, Copy)]
pub struct CheckpointLea;

impl Parse for CheckpointLea {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        let mut obj = Map::new();
        let mut i = offs;
        loop {
            let key_start = i;
            while i < b.len() && b[i] != b':' && b[i] != b';' && b[i] != b' ' {
                i += 1;
            }
            if i == key_start || b.get(i) != Some(&b':') || b.get(i + 1) != Some(&b' ') {
                break;
            }
            let key = &msg[key_start..i];
            let val_start = i + 2;
            let mut j = val_start;
            while j < b.len() && b[j] != b';' {
                j += 1;
            }
            obj.insert(
                key.to_string(),
                Value::String(msg[val_start..j].to_string()),
            );
            if j < b.len() {
                j += 1; // consume ';'
            }
            i = j;
            if b.get(i) == Some(&b' ') {
                // More fields may follow after a single space.
                if i + 1 < b.len() {
                    i += 1;
                    continue;
                }
            }
            break;
        }
        if obj.is_empty() {
            return None;
        }
        Some(Match::with_value(i, capture, || Value::Object(obj)))
    }
}

/// iptables log fields: two or more space-separated `NAME[=value]`
/// tokens with uppercase names, e.g. `IN=eth0 OUT= SRC=192.0.2.1`.
#[derive(Debug, Clone, Copy)]
pub struct V2Iptables;

/// Scans one `NAME` or `NAME=value` token; returns (end, name, value).
fn scan_iptables_field<'a>(msg: &'a str, from: usize) -> Option<(usize, &'a str, &'a str)> {
    let b = msg.as_bytes();
    let mut i = from;
    while i < b.len() && (b[i].is_ascii_uppercase() || (i > from && b[i].is_ascii_digit())) {
        i += 1;
    }
    if i == from {
        return None;
    }
    let name = &msg[from..i];
    if b.get(i) != Some(&b'=') {
        return Some((i, name, ""));
    }
    let vstart = i + 1;
    let mut j = vstart;
    while j < b.len() && b[j] != b' ' {
        j += 1;
    }
    Some((j, name, &msg[vstart..j]))
}

impl Parse for V2Iptables {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let mut obj = Map::new();
        let (mut end, name, value) = scan_iptables_field(msg, offs)?;
        obj.insert(name.to_string(), Value::String(value.to_string()));
        while msg.as_bytes().get(end) == Some(&b' ') {
            match scan_iptables_field(msg, end + 1) {
                Some((e, n, v)) => {
                    obj.insert(n.to_string(), Value::String(v.to_string()));
                    end = e;
                },
                None => break,
            }
        }
        // A single field is too unspecific to claim an iptables match.
        if obj.len() < 2 {
            return None;
        }
        Some(Match::with_value(end, capture, || Value::Object(obj)))
    }
}
