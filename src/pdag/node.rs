// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Node and edge types of the parse DAG.
//!
//! A pdag node is one parse state; each outgoing [`ParserInstance`] is a
//! typed edge that consumes input and leads to a successor state. Nodes
//! live in the arena owned by [`crate::context::Context`] and are addressed
//! by [`NodeId`] handles, so edges converging on a shared successor (the
//! join node of an alternative) are plain index copies plus an explicit
//! reference count.

use serde_json::Value;

use crate::parsers::{ParserData, ParserKind};

/// Default user-assigned priority when the rule author specifies none.
pub const DFLT_USR_PARSER_PRIO: u32 = 30_000;

/// Nominal kind priority for user-defined types (hopefully relatively
/// specific).
pub const CUSTOM_TYPE_PRIO: u8 = 16;

/// Handle of a pdag node inside the owning context's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// One outgoing edge of a pdag node.
#[derive(Debug)]
pub struct ParserInstance {
    /// Which parser runs on this edge.
    pub kind: ParserKind,
    /// Capture name. `None` means "match but do not capture"; the literal
    /// `"."` merges an object result into the parent record.
    pub name: Option<String>,
    /// Composite priority: upper 24 bits user-assigned, lower 8 bits the
    /// parser kind default. Lower value is tried first.
    pub prio: u32,
    /// Canonical (sorted-key) rendering of the kind-specific configuration;
    /// equality of `(kind, conf)` is the edge deduplication criterion.
    pub conf: String,
    /// Kind-specific compiled configuration.
    pub data: ParserData,
    /// Successor node reached when the parser matches.
    pub node: NodeId,
    /// For [`ParserKind::Custom`]: index of the named sub-pdag in the
    /// context's type table.
    pub custom: Option<usize>,
}

/// Edge pieces produced by parser-instance construction, before a
/// successor node is known.
#[derive(Debug)]
pub(crate) struct PendingParser {
    pub kind: ParserKind,
    pub name: Option<String>,
    pub prio: u32,
    pub conf: String,
    pub data: ParserData,
    pub custom: Option<usize>,
}

impl PendingParser {
    pub(crate) fn into_instance(self, node: NodeId) -> ParserInstance {
        ParserInstance {
            kind: self.kind,
            name: self.name,
            prio: self.prio,
            conf: self.conf,
            data: self.data,
            node,
            custom: self.custom,
        }
    }
}

/// One parse state.
#[derive(Debug, Default)]
pub struct PdagNode {
    /// Outgoing edges, sorted by composite priority after optimization.
    pub parsers: Vec<ParserInstance>,
    /// Whether this node is a legitimate match endpoint. Terminal nodes
    /// may still have outgoing edges that match longer inputs.
    pub terminal: bool,
    /// Tags attached to events accepted at this node (array of strings).
    pub tags: Option<Value>,
    /// Number of edges targeting this node, plus one if it is the root of
    /// the main pdag or of a named sub-pdag. Guards literal compaction.
    pub refcount: u32,
}

/// Read-only view of one edge, exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    pub kind: ParserKind,
    pub kind_name: &'static str,
    pub name: Option<&'a str>,
    pub prio: u32,
    pub target: NodeId,
}

/// Builds the composite 32-bit priority from the user-assigned part and
/// the parser-kind default. Lower value means higher precedence.
pub fn composite_prio(user: u32, kind: u8) -> u32 {
    (user << 8) | u32::from(kind)
}
