// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Network-address parsers: IPv4/IPv6, MAC-48 and the Cisco interface
//! spec (`[iface:]ip/port[ (ip/port)][ (user)]`).

use std::net::Ipv6Addr;

use serde_json::{Map, Value, json};

use crate::{
    context::Context,
    parsers::{Match, Parse},
};

fn str_value(msg: &str, a: usize, b: usize) -> Value {
    Value::String(msg[a..b].to_string())
}

/// Scans one dotted-quad IPv4 address; returns the offset past it.
/// Octets are one to three digits with a value of at most 255 (leading
/// zeroes are accepted, as in classic syslog output).
fn scan_ipv4(b: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    for octet in 0..4 {
        if octet > 0 {
            if b.get(i) != Some(&b'.') {
                return None;
            }
            i += 1;
        }
        let start = i;
        let mut v: u32 = 0;
        while i < b.len() && i - start < 3 && b[i].is_ascii_digit() {
            v = v * 10 + u32::from(b[i] - b'0');
            i += 1;
        }
        if i == start || v > 255 {
            return None;
        }
    }
    Some(i)
}

/// Decimal port number, at most five digits, at most 65535.
fn scan_port(b: &[u8], from: usize) -> Option<(usize, u32)> {
    let mut i = from;
    let mut v: u32 = 0;
    while i < b.len() && i - from < 5 && b[i].is_ascii_digit() {
        v = v * 10 + u32::from(b[i] - b'0');
        i += 1;
    }
    if i == from || v > 65_535 {
        return None;
    }
    Some((i, v))
}

/// Dotted-quad IPv4 address.
#[derive(Debug, Clone, Copy)]
pub struct Ipv4;

impl Parse for Ipv4 {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let end = scan_ipv4(msg.as_bytes(), offs)?;
        Some(Match::with_value(end, capture, || str_value(msg, offs, end)))
    }
}

/// IPv6 address in any RFC 4291 text form, including `::` compression
/// and an embedded IPv4 tail. The scanner takes the maximal run of
/// hex/colon/dot characters and backs off trailing punctuation until the
/// token is a valid address.
#[derive(Debug, Clone, Copy)]
pub struct Ipv6;

impl Parse for Ipv6 {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        let mut stop = offs;
        while stop < b.len()
            && (b[stop].is_ascii_hexdigit() || b[stop] == b':' || b[stop] == b'.')
        {
            stop += 1;
        }
        if !msg[offs..stop].contains(':') {
            return None;
        }
        let mut end = stop;
        while end > offs + 1 {
            if msg[offs..end].parse::<Ipv6Addr>().is_ok() {
                return Some(Match::with_value(end, capture, || {
                    str_value(msg, offs, end)
                }));
            }
            end -= 1;
        }
        None
    }
}

/// MAC-48 hardware address: six hex pairs joined by `:` or `-`, with a
/// consistent separator.
#[derive(Debug, Clone, Copy)]
pub struct Mac48;

impl Parse for Mac48 {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        if offs + 17 > b.len() {
            return None;
        }
        let sep = b[offs + 2];
        if sep != b':' && sep != b'-' {
            return None;
        }
        let mut i = offs;
        for pair in 0..6 {
            if pair > 0 {
                if b[i] != sep {
                    return None;
                }
                i += 1;
            }
            if !b[i].is_ascii_hexdigit() || !b[i + 1].is_ascii_hexdigit() {
                return None;
            }
            i += 2;
        }
        Some(Match::with_value(i, capture, || str_value(msg, offs, i)))
    }
}

/// Cisco interface spec as seen in ASA/PIX logs, e.g.
/// `outside:192.0.2.1/50349 (192.0.2.2/50349) (user)`. The interface
/// prefix and both parenthesized groups are optional.
#[derive(Debug, Clone, Copy)]
pub struct CiscoInterfaceSpec;

impl CiscoInterfaceSpec {
    /// `ip/port`, returning the end offset plus both pieces.
    fn scan_ip_port<'a>(msg: &'a str, from: usize) -> Option<(usize, &'a str, u32)> {
        let b = msg.as_bytes();
        let ip_end = scan_ipv4(b, from)?;
        if b.get(ip_end) != Some(&b'/') {
            return None;
        }
        let (end, port) = scan_port(b, ip_end + 1)?;
        Some((end, &msg[from..ip_end], port))
    }
}

impl Parse for CiscoInterfaceSpec {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let b = msg.as_bytes();
        let mut obj = Map::new();

        // Optional "iface:" prefix; only committed when an ip/port follows.
        let mut i = offs;
        let mut iface_end = offs;
        while iface_end < b.len()
            && (b[iface_end].is_ascii_alphanumeric()
                || matches!(b[iface_end], b'_' | b'-' | b'.' | b'/'))
        {
            iface_end += 1;
        }
        if iface_end > offs
            && b.get(iface_end) == Some(&b':')
            && Self::scan_ip_port(msg, iface_end + 1).is_some()
        {
            obj.insert("interface".into(), str_value(msg, offs, iface_end));
            i = iface_end + 1;
        }

        let (mut end, ip, port) = Self::scan_ip_port(msg, i)?;
        obj.insert("ip".into(), Value::String(ip.to_string()));
        obj.insert("port".into(), json!(port));

        // Optional " (ip/port)" mapped-address group.
        if msg[end..].starts_with(" (")
            && let Some((e2, ip2, port2)) = Self::scan_ip_port(msg, end + 2)
            && msg.as_bytes().get(e2) == Some(&b')')
        {
            obj.insert("ip2".into(), Value::String(ip2.to_string()));
            obj.insert("port2".into(), json!(port2));
            end = e2 + 1;
        }

        // Optional " (user)" group.
        if msg[end..].starts_with(" (")
            && let Some(close) = msg[end + 2..].find(')')
            && close > 0
        {
            obj.insert("user".into(), str_value(msg, end + 2, end + 2 + close));
            end = end + 2 + close + 1;
        }

        Some(Match::with_value(end, capture, || Value::Object(obj)))
    }
}
