// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Built-in parser registry.
//!
//! Every parser kind the engine knows is one row of [`PARSER_TABLE`].
//! VERY IMPORTANT: the table must be initialized EXACTLY in the order of
//! the [`ParserKind`] discriminants — the row index is the stable numeric
//! identifier of the kind.
//!
//! Rough guideline for assigning priorities: 0 is highest, 255 lowest.
//! 255 should be reserved for things that *really* should only run as a
//! last resort (`rest`). The user-assigned priority occupies the upper 24
//! bits of the composite, so kind defaults only decide between parsers the
//! user has not prioritized explicitly (the common case).

pub mod datetime;
pub mod literal;
pub mod network;
pub mod number;
pub mod repeat;
pub mod structured;
pub mod text;

use enum_dispatch::enum_dispatch;
use serde_json::{Map, Value};

pub use self::{
    datetime::{
        Duration, IsoDate, KernelTimestamp, Rfc3164Date, Rfc5424Date, Time12hr,
        Time24hr,
    },
    literal::Literal,
    network::{CiscoInterfaceSpec, Ipv4, Ipv6, Mac48},
    number::{Float, HexNumber, Number},
    repeat::Repeat,
    structured::{Cef, CeeSyslog, CheckpointLea, Json, NameValueList, V2Iptables},
    text::{
        Alpha, CharSep, CharTo, OpQuotedString, QuotedString, Rest, StringTo,
        Whitespace, Word,
    },
};
use crate::{context::Context, errors::RulebaseError};

/// Closed set of parser kinds. The discriminant order defines the stable
/// numeric identifier of each built-in kind; [`ParserKind::Custom`] is the
/// sentinel for user-defined sub-pdags and has no registry row — the
/// normalizer dispatches it separately.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Literal = 0,
    Repeat,
    Rfc3164Date,
    Rfc5424Date,
    Number,
    Float,
    HexNumber,
    KernelTimestamp,
    Whitespace,
    Ipv4,
    Ipv6,
    Word,
    Alpha,
    Rest,
    OpQuotedString,
    QuotedString,
    IsoDate,
    Time24hr,
    Time12hr,
    Duration,
    CiscoInterfaceSpec,
    NameValueList,
    Json,
    CeeSyslog,
    Mac48,
    Cef,
    CheckpointLea,
    V2Iptables,
    StringTo,
    CharTo,
    CharSep,
    Custom,
}

/// Successful parse attempt: `end` is the byte offset just past the
/// consumed input, `value` is the captured structured value (only built
/// when a capture was requested and the kind produces one).
#[derive(Debug)]
pub struct Match {
    pub end: usize,
    pub value: Option<Value>,
}

impl Match {
    pub(crate) fn with_value(end: usize, capture: bool, value: impl FnOnce() -> Value) -> Self {
        Match {
            end,
            value: capture.then(value),
        }
    }
}

/// The matching function every parser implements.
///
/// Contract: on a match, return the offset just past the consumed bytes
/// (zero-length success is legal only for `rest` and `char-sep`), and
/// build a value only when `capture` is set. On no match return `None` —
/// the matcher treats that as "try the next alternative", never as an
/// error. Parsers are pure: same inputs, same outputs.
#[enum_dispatch]
pub trait Parse {
    fn parse(&self, ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match>;
}

/// Per-edge compiled configuration, one variant per kind.
#[enum_dispatch(Parse)]
#[derive(Debug)]
pub enum ParserData {
    Literal(Literal),
    Repeat(Repeat),
    Rfc3164Date(Rfc3164Date),
    Rfc5424Date(Rfc5424Date),
    Number(Number),
    Float(Float),
    HexNumber(HexNumber),
    KernelTimestamp(KernelTimestamp),
    Whitespace(Whitespace),
    Ipv4(Ipv4),
    Ipv6(Ipv6),
    Word(Word),
    Alpha(Alpha),
    Rest(Rest),
    OpQuotedString(OpQuotedString),
    QuotedString(QuotedString),
    IsoDate(IsoDate),
    Time24hr(Time24hr),
    Time12hr(Time12hr),
    Duration(Duration),
    CiscoInterfaceSpec(CiscoInterfaceSpec),
    NameValueList(NameValueList),
    Json(Json),
    CeeSyslog(CeeSyslog),
    Mac48(Mac48),
    Cef(Cef),
    CheckpointLea(CheckpointLea),
    V2Iptables(V2Iptables),
    StringTo(StringTo),
    CharTo(CharTo),
    CharSep(CharSep),
    Custom(CustomType),
}

/// Placeholder payload for user-defined type edges. The normalizer never
/// dispatches through it: custom edges are resolved against the context's
/// type table before the payload would be consulted.
#[derive(Debug, Clone, Copy)]
pub struct CustomType;

impl Parse for CustomType {
    fn parse(&self, _ctx: &Context, _msg: &str, _offs: usize, _capture: bool) -> Option<Match> {
        None
    }
}

/// One registry row.
pub struct ParserInfo {
    /// Stable string identifier used in rule configuration.
    pub name: &'static str,
    pub kind: ParserKind,
    /// Default kind priority; lower numeric value is higher precedence.
    pub prio: u8,
    /// Builds the kind-specific payload from the stripped configuration
    /// (all keys except `type`, `name`, `priority`).
    pub construct:
        fn(&mut Context, &Map<String, Value>) -> Result<ParserData, RulebaseError>,
}

pub static PARSER_TABLE: &[ParserInfo] = &[
    ParserInfo {
        name: "literal",
        kind: ParserKind::Literal,
        prio: 4,
        construct: |_, cfg| Ok(ParserData::Literal(Literal::from_cfg(cfg)?)),
    },
    ParserInfo {
        name: "repeat",
        kind: ParserKind::Repeat,
        prio: 4,
        construct: |ctx, cfg| Ok(ParserData::Repeat(Repeat::from_cfg(ctx, cfg)?)),
    },
    ParserInfo {
        name: "date-rfc3164",
        kind: ParserKind::Rfc3164Date,
        prio: 8,
        construct: |_, _| Ok(ParserData::Rfc3164Date(Rfc3164Date)),
    },
    ParserInfo {
        name: "date-rfc5424",
        kind: ParserKind::Rfc5424Date,
        prio: 8,
        construct: |_, _| Ok(ParserData::Rfc5424Date(Rfc5424Date)),
    },
    ParserInfo {
        name: "number",
        kind: ParserKind::Number,
        prio: 16,
        construct: |_, _| Ok(ParserData::Number(Number)),
    },
    ParserInfo {
        name: "float",
        kind: ParserKind::Float,
        prio: 16,
        construct: |_, _| Ok(ParserData::Float(Float)),
    },
    ParserInfo {
        name: "hexnumber",
        kind: ParserKind::HexNumber,
        prio: 16,
        construct: |_, cfg| Ok(ParserData::HexNumber(HexNumber::from_cfg(cfg)?)),
    },
    ParserInfo {
        name: "kernel-timestamp",
        kind: ParserKind::KernelTimestamp,
        prio: 16,
        construct: |_, _| Ok(ParserData::KernelTimestamp(KernelTimestamp)),
    },
    ParserInfo {
        name: "whitespace",
        kind: ParserKind::Whitespace,
        prio: 4,
        construct: |_, _| Ok(ParserData::Whitespace(Whitespace)),
    },
    ParserInfo {
        name: "ipv4",
        kind: ParserKind::Ipv4,
        prio: 4,
        construct: |_, _| Ok(ParserData::Ipv4(Ipv4)),
    },
    ParserInfo {
        name: "ipv6",
        kind: ParserKind::Ipv6,
        prio: 4,
        construct: |_, _| Ok(ParserData::Ipv6(Ipv6)),
    },
    ParserInfo {
        name: "word",
        kind: ParserKind::Word,
        prio: 32,
        construct: |_, _| Ok(ParserData::Word(Word)),
    },
    ParserInfo {
        name: "alpha",
        kind: ParserKind::Alpha,
        prio: 32,
        construct: |_, _| Ok(ParserData::Alpha(Alpha)),
    },
    ParserInfo {
        name: "rest",
        kind: ParserKind::Rest,
        prio: 255,
        construct: |_, _| Ok(ParserData::Rest(Rest)),
    },
    ParserInfo {
        name: "op-quoted-string",
        kind: ParserKind::OpQuotedString,
        prio: 64,
        construct: |_, _| Ok(ParserData::OpQuotedString(OpQuotedString)),
    },
    ParserInfo {
        name: "quoted-string",
        kind: ParserKind::QuotedString,
        prio: 64,
        construct: |_, _| Ok(ParserData::QuotedString(QuotedString)),
    },
    ParserInfo {
        name: "date-iso",
        kind: ParserKind::IsoDate,
        prio: 8,
        construct: |_, _| Ok(ParserData::IsoDate(IsoDate)),
    },
    ParserInfo {
        name: "time-24hr",
        kind: ParserKind::Time24hr,
        prio: 8,
        construct: |_, _| Ok(ParserData::Time24hr(Time24hr)),
    },
    ParserInfo {
        name: "time-12hr",
        kind: ParserKind::Time12hr,
        prio: 8,
        construct: |_, _| Ok(ParserData::Time12hr(Time12hr)),
    },
    ParserInfo {
        name: "duration",
        kind: ParserKind::Duration,
        prio: 16,
        construct: |_, _| Ok(ParserData::Duration(Duration)),
    },
    ParserInfo {
        name: "cisco-interface-spec",
        kind: ParserKind::CiscoInterfaceSpec,
        prio: 4,
        construct: |_, _| Ok(ParserData::CiscoInterfaceSpec(CiscoInterfaceSpec)),
    },
    ParserInfo {
        name: "name-value-list",
        kind: ParserKind::NameValueList,
        prio: 8,
        construct: |_, _| Ok(ParserData::NameValueList(NameValueList)),
    },
    ParserInfo {
        name: "json",
        kind: ParserKind::Json,
        prio: 4,
        construct: |_, _| Ok(ParserData::Json(Json)),
    },
    ParserInfo {
        name: "cee-syslog",
        kind: ParserKind::CeeSyslog,
        prio: 4,
        construct: |_, _| Ok(ParserData::CeeSyslog(CeeSyslog)),
    },
    ParserInfo {
        name: "mac48",
        kind: ParserKind::Mac48,
        prio: 16,
        construct: |_, _| Ok(ParserData::Mac48(Mac48)),
    },
    ParserInfo {
        name: "cef",
        kind: ParserKind::Cef,
        prio: 4,
        construct: |_, _| Ok(ParserData::Cef(Cef)),
    },
    ParserInfo {
        name: "checkpoint-lea",
        kind: ParserKind::CheckpointLea,
        prio: 4,
        construct: |_, _| Ok(ParserData::CheckpointLea(CheckpointLea)),
    },
    ParserInfo {
        name: "v2-iptables",
        kind: ParserKind::V2Iptables,
        prio: 4,
        construct: |_, _| Ok(ParserData::V2Iptables(V2Iptables)),
    },
    ParserInfo {
        name: "string-to",
        kind: ParserKind::StringTo,
        prio: 32,
        construct: |_, cfg| Ok(ParserData::StringTo(StringTo::from_cfg(cfg)?)),
    },
    ParserInfo {
        name: "char-to",
        kind: ParserKind::CharTo,
        prio: 32,
        construct: |_, cfg| Ok(ParserData::CharTo(CharTo::from_cfg(cfg)?)),
    },
    ParserInfo {
        name: "char-sep",
        kind: ParserKind::CharSep,
        prio: 32,
        construct: |_, cfg| Ok(ParserData::CharSep(CharSep::from_cfg(cfg)?)),
    },
];

/// `name → registry row` lookup. A linear scan is fine here: the table is
/// small and lookups happen only at construction time.
pub fn by_name(name: &str) -> Option<&'static ParserInfo> {
    PARSER_TABLE.iter().find(|info| info.name == name)
}

/// Registry row of a built-in kind. Must not be called for
/// [`ParserKind::Custom`].
pub fn info(kind: ParserKind) -> &'static ParserInfo {
    let row = &PARSER_TABLE[kind as usize];
    debug_assert_eq!(row.kind, kind);
    row
}

/// Display name of a kind, including the user-defined sentinel.
pub fn kind_name(kind: ParserKind) -> &'static str {
    if kind == ParserKind::Custom {
        "USER-DEFINED"
    } else {
        info(kind).name
    }
}
