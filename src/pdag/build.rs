// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! pdag construction: turning parser configuration objects into graph
//! edges.
//!
//! Two composition modes exist. A configuration array is sequential:
//! each element's successor becomes the current node for the next
//! element. An `{type: "alternative", parser: [...]}` object appends all
//! alternatives as siblings of the current node; they converge on one
//! shared join node. Equivalent edges (same kind, same canonical
//! configuration) are deduplicated by walking the existing edge instead
//! of appending a twin.

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    context::Context,
    errors::RulebaseError,
    parsers::{self, CustomType, ParserData, ParserKind},
    pdag::node::{
        CUSTOM_TYPE_PRIO, DFLT_USR_PARSER_PRIO, NodeId, PendingParser, composite_prio,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddMode {
    Seq,
    Alternative,
}

fn render(cfg: &Value) -> String {
    cfg.to_string()
}

fn is_alternative(cfg: &Value) -> bool {
    cfg.get("type").and_then(Value::as_str) == Some("alternative")
}

impl Context {
    /// Extends the pdag at `*cursor` with one parser configuration
    /// (object, array, or alternative object) and moves the cursor to
    /// the node where matching continues.
    pub fn add_parser(&mut self, cursor: &mut NodeId, cfg: &Value) -> Result<(), RulebaseError> {
        let mut nextnode = None;
        self.add_parser_internal(cursor, AddMode::Seq, cfg, &mut nextnode)
    }

    /// Adds one rule to the main pdag: extends from the root and marks
    /// the final node terminal, attaching optional tags.
    pub fn add_rule(
        &mut self,
        cfg: &Value,
        tags: Option<Value>,
    ) -> Result<(), RulebaseError> {
        let mut cursor = self.root;
        self.add_parser(&mut cursor, cfg)?;
        self.set_terminal(cursor, tags);
        Ok(())
    }

    /// Defines (or extends) the user-defined type `name`, which must
    /// carry the `@` prefix. The type's final node is marked terminal so
    /// it can be invoked in partial-match mode.
    pub fn define_type(&mut self, name: &str, cfg: &Value) -> Result<(), RulebaseError> {
        if !name.starts_with('@') {
            return Err(RulebaseError::bad_config(
                name,
                "user-defined type names must start with '@'",
            ));
        }
        let idx = self
            .find_or_add_type(name, true)
            .expect("find_or_add_type with add always yields a type");
        let mut cursor = self.type_root(idx);
        self.add_parser(&mut cursor, cfg)?;
        self.set_terminal(cursor, None);
        Ok(())
    }

    /// Builds a detached sub-pdag (used by the `repeat` parser): a fresh
    /// root extended with `cfg`, its final node terminal.
    pub(crate) fn build_sub_pdag(&mut self, cfg: &Value) -> Result<NodeId, RulebaseError> {
        let root = self.new_node();
        let mut cursor = root;
        self.add_parser(&mut cursor, cfg)?;
        self.set_terminal(cursor, None);
        Ok(root)
    }

    fn add_parser_internal(
        &mut self,
        cursor: &mut NodeId,
        mode: AddMode,
        cfg: &Value,
        nextnode: &mut Option<NodeId>,
    ) -> Result<(), RulebaseError> {
        match cfg {
            Value::Object(_) if is_alternative(cfg) => {
                let parsers = cfg
                    .get("parser")
                    .and_then(Value::as_array)
                    .ok_or_else(|| RulebaseError::MalformedAlternative(render(cfg)))?;
                self.add_alternatives(cursor, parsers, nextnode)
            },
            Value::Object(_) => {
                self.add_parser_instance(*cursor, cfg, nextnode)?;
                if mode == AddMode::Seq {
                    *cursor = nextnode.expect("instance construction fills the successor");
                }
                Ok(())
            },
            Value::Array(arr) => self.add_sequence(cursor, arr, nextnode),
            _ => Err(RulebaseError::BadShape(render(cfg))),
        }
    }

    /// Sequential walk: each element gets a fresh per-step successor and
    /// the cursor advances behind it. `nextnode` reports the last step's
    /// successor to the caller.
    fn add_sequence(
        &mut self,
        cursor: &mut NodeId,
        arr: &[Value],
        nextnode: &mut Option<NodeId>,
    ) -> Result<(), RulebaseError> {
        for cfg in arr {
            let mut step = None;
            self.add_parser_internal(cursor, AddMode::Seq, cfg, &mut step)?;
            if step.is_some() {
                *nextnode = step;
            }
        }
        Ok(())
    }

    /// Alternative walk: all branches share one join successor. A branch
    /// that is itself an array is walked sequentially, with only its last
    /// element converging on the join.
    fn add_alternatives(
        &mut self,
        cursor: &mut NodeId,
        arr: &[Value],
        nextnode: &mut Option<NodeId>,
    ) -> Result<(), RulebaseError> {
        for cfg in arr {
            match cfg {
                Value::Array(branch) => self.add_branch(*cursor, branch, nextnode)?,
                Value::Object(_) if is_alternative(cfg) => {
                    let mut local = *cursor;
                    self.add_parser_internal(&mut local, AddMode::Alternative, cfg, nextnode)?;
                },
                Value::Object(_) => {
                    self.add_parser_instance(*cursor, cfg, nextnode)?;
                },
                _ => return Err(RulebaseError::BadShape(render(cfg))),
            }
        }
        *cursor = nextnode.ok_or_else(|| {
            RulebaseError::MalformedAlternative("empty alternative array".to_string())
        })?;
        Ok(())
    }

    /// One sequence branch of an alternative group: the leading elements
    /// are walked sequentially, and only the final element converges on
    /// the group's shared join node.
    fn add_branch(
        &mut self,
        mut local: NodeId,
        branch: &[Value],
        nextnode: &mut Option<NodeId>,
    ) -> Result<(), RulebaseError> {
        let Some((last, head)) = branch.split_last() else {
            return Err(RulebaseError::MalformedAlternative("empty branch".to_string()));
        };
        for cfg in head {
            let mut step = None;
            self.add_parser_internal(&mut local, AddMode::Seq, cfg, &mut step)?;
        }
        match last {
            Value::Array(inner) => self.add_branch(local, inner, nextnode),
            _ => self.add_parser_internal(&mut local, AddMode::Alternative, last, nextnode),
        }
    }

    /// Adds a single parser instance to `node`. If an equivalent edge
    /// (same kind, same canonical configuration) already exists, the
    /// existing edge's successor is reused and the new instance is
    /// discarded; otherwise a successor is taken from `*nextnode` (the
    /// shared join of an alternative group) or freshly allocated.
    fn add_parser_instance(
        &mut self,
        node: NodeId,
        cfg: &Value,
        nextnode: &mut Option<NodeId>,
    ) -> Result<(), RulebaseError> {
        let pending = self.new_parser(cfg)?;
        let merged = self
            .node(node)
            .parsers
            .iter()
            .find(|existing| {
                existing.kind == pending.kind
                    && existing.custom == pending.custom
                    && existing.conf == pending.conf
            })
            .map(|existing| existing.node);
        if let Some(succ) = merged {
            debug!(%node, conf = %pending.conf, "merging with existing edge");
            // The freshly built instance is discarded; release anything
            // its construction allocated.
            if let ParserData::Repeat(rep) = &pending.data {
                for sub in rep.sub_pdags() {
                    self.release_node(sub);
                }
            }
            *nextnode = Some(succ);
            return Ok(());
        }
        let succ = match *nextnode {
            None => {
                let id = self.new_node();
                *nextnode = Some(id);
                id
            },
            Some(id) => {
                self.node_mut(id).refcount += 1;
                id
            },
        };
        self.node_mut(node).parsers.push(pending.into_instance(succ));
        Ok(())
    }

    /// Builds the edge pieces from one configuration object: resolves the
    /// parser kind (or user-defined type), computes the composite
    /// priority, captures the canonical configuration rendering, and runs
    /// the kind's constructor on the remaining keys.
    fn new_parser(&mut self, cfg: &Value) -> Result<PendingParser, RulebaseError> {
        let obj = cfg
            .as_object()
            .ok_or_else(|| RulebaseError::BadShape(render(cfg)))?;
        let ty = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| RulebaseError::MissingType(render(cfg)))?
            .to_string();

        let name = match obj.get("name") {
            None => None,
            Some(Value::String(s)) if s == "-" => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(RulebaseError::bad_config(&ty, format!("bad 'name': {other}")));
            },
        };

        let user_prio = match obj.get("priority") {
            None => DFLT_USR_PARSER_PRIO,
            Some(v) => {
                let p = v.as_u64().filter(|p| *p < (1 << 24)).ok_or_else(|| {
                    RulebaseError::bad_config(&ty, format!("bad 'priority': {v}"))
                })?;
                p as u32
            },
        };
        debug!(ty = %ty, user_prio, "assigned priority");

        // The canonical form covers only the kind-specific keys; its
        // sorted-key rendering makes equivalent configurations compare
        // equal regardless of author key order.
        let mut stripped: Map<String, Value> = obj.clone();
        stripped.remove("type");
        stripped.remove("name");
        stripped.remove("priority");
        let conf =
            serde_json::to_string(&stripped).expect("config maps always serialize");

        if ty.starts_with('@') {
            let idx = self
                .find_or_add_type(&ty, false)
                .ok_or_else(|| RulebaseError::UnknownUserType(ty.clone()))?;
            return Ok(PendingParser {
                kind: ParserKind::Custom,
                name,
                prio: composite_prio(user_prio, CUSTOM_TYPE_PRIO),
                conf,
                data: ParserData::Custom(CustomType),
                custom: Some(idx),
            });
        }

        let info = parsers::by_name(&ty).ok_or_else(|| RulebaseError::UnknownType {
            name: ty.clone(),
            conf: render(cfg),
        })?;
        let data = (info.construct)(self, &stripped)?;
        Ok(PendingParser {
            kind: info.kind,
            name,
            prio: composite_prio(user_prio, info.prio),
            conf,
            data,
            custom: None,
        })
    }
}
