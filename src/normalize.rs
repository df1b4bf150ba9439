// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The normalizer: a depth-first, backtracking walk of the pdag against
//! one input line.
//!
//! At every node the outgoing edges are tried in priority order. An edge
//! whose parser matches is followed recursively; if the recursion fails,
//! the produced value is discarded and the next edge is tried
//! (backtracking). The first edge whose subtree reaches a terminal wins.
//! Normalization itself never fails: when no rule matches, the record
//! carries the original message and the unparsed tail from the furthest
//! offset any attempt reached.

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    context::Context,
    parsers::{self, Match, Parse, ParserKind},
    pdag::node::{NodeId, ParserInstance},
};

/// Record key holding the full input when no rule matched.
pub const ORIGINAL_MSG_KEY: &str = "originalmsg";
/// Record key holding the input tail past the furthest parsed offset.
pub const UNPARSED_DATA_KEY: &str = "unparsed-data";
/// Record key holding the tags of the accepting terminal node.
pub const EVENT_TAGS_KEY: &str = "event.tags";

impl Context {
    /// Normalizes one log line into a structured record. Requires
    /// [`Context::optimize`] to have run.
    pub fn normalize(&self, msg: &str) -> Map<String, Value> {
        let mut record = Map::new();
        let mut parsed_to = 0usize;
        match self.normalize_rec(self.root, msg, 0, false, &mut parsed_to, &mut record) {
            Some(end_node) => {
                debug!(%end_node, parsed_to, "match complete");
                if let Some(tags) = &self.node(end_node).tags {
                    record.insert(EVENT_TAGS_KEY.to_string(), tags.clone());
                }
            },
            None => {
                debug!(parsed_to, "no rule matched");
                record.insert(
                    ORIGINAL_MSG_KEY.to_string(),
                    Value::String(msg.to_string()),
                );
                record.insert(
                    UNPARSED_DATA_KEY.to_string(),
                    Value::String(msg[parsed_to.min(msg.len())..].to_string()),
                );
            },
        }
        record
    }

    /// Recursive step of the normalizer. Returns the accepting terminal
    /// node on success. `parsed_to` tracks the furthest offset reached by
    /// any successful parser on any path, matched or backtracked.
    pub(crate) fn normalize_rec(
        &self,
        node: NodeId,
        msg: &str,
        offs: usize,
        partial: bool,
        parsed_to: &mut usize,
        record: &mut Map<String, Value>,
    ) -> Option<NodeId> {
        for prs in &self.node(node).parsers {
            let Some(m) = self.try_parser(prs, msg, offs) else {
                continue;
            };
            let new_offs = m.end;
            if new_offs > *parsed_to {
                *parsed_to = new_offs;
            }
            debug!(
                %node,
                offs,
                new_offs,
                parser = parsers::kind_name(prs.kind),
                "potential hit, trying subtree"
            );
            if let Some(end_node) =
                self.normalize_rec(prs.node, msg, new_offs, partial, parsed_to, record)
            {
                attach_value(record, prs, m.value);
                return Some(end_node);
            }
            // Backtrack: the value (if any) is dropped with `m`.
            debug!(%node, offs, "no match in subtree, backtracking");
        }
        let n = self.node(node);
        if n.terminal && (offs == msg.len() || partial) {
            return Some(node);
        }
        None
    }

    /// Runs one edge's parser at `offs`. User-defined types are
    /// dispatched here: the named sub-pdag is normalized in partial-match
    /// mode and yields the object accumulated there, consuming up to the
    /// furthest offset the sub-match reached.
    fn try_parser(&self, prs: &ParserInstance, msg: &str, offs: usize) -> Option<Match> {
        if prs.kind == ParserKind::Custom {
            let idx = prs.custom?;
            let mut obj = Map::new();
            let mut sub_max = offs;
            self.normalize_rec(self.type_root(idx), msg, offs, true, &mut sub_max, &mut obj)?;
            return Some(Match {
                end: sub_max.max(offs),
                value: Some(Value::Object(obj)),
            });
        }
        prs.data.parse(self, msg, offs, prs.name.is_some())
    }
}

/// Applies the capture naming rule on an accepted path: no name discards
/// the value, the name `"."` merges an object's keys into the parent
/// record, any other name attaches the value under that key.
fn attach_value(record: &mut Map<String, Value>, prs: &ParserInstance, value: Option<Value>) {
    let Some(name) = prs.name.as_deref() else {
        return;
    };
    let Some(value) = value else {
        return;
    };
    if name == "." {
        match value {
            Value::Object(obj) => {
                for (k, v) in obj {
                    record.insert(k, v);
                }
            },
            other => {
                record.insert(name.to_string(), other);
            },
        }
    } else {
        record.insert(name.to_string(), value);
    }
}
