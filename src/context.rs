// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The library context: owner of the main pdag and of all named
//! user-defined sub-pdags.
//!
//! All nodes of all pdags live in one arena indexed by [`NodeId`]. The
//! context is mutable while rules are added and during [`optimize`]; after
//! that every entry point takes `&self`, so one optimized context can be
//! shared read-only between threads.
//!
//! [`optimize`]: Context::optimize

use tracing::debug;

use crate::{
    parsers,
    pdag::node::{EdgeView, NodeId, PdagNode},
};

/// A named sub-pdag ("user-defined type"). Names carry the `@` sentinel
/// prefix that distinguishes them from built-in parser names.
#[derive(Debug)]
pub struct TypePdag {
    pub name: String,
    pub root: NodeId,
}

/// Owner of the main pdag and the user-defined type table.
#[derive(Debug)]
pub struct Context {
    pub(crate) nodes: Vec<PdagNode>,
    pub(crate) root: NodeId,
    pub(crate) types: Vec<TypePdag>,
    /// Live node count (allocated minus spliced out by optimization).
    pub(crate) n_nodes: usize,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates a context with an empty main pdag.
    pub fn new() -> Self {
        let mut ctx = Context {
            nodes: Vec::new(),
            root: NodeId(0),
            types: Vec::new(),
            n_nodes: 0,
        };
        ctx.root = ctx.new_node();
        ctx
    }

    /// Allocates a fresh node with a reference count of one.
    pub(crate) fn new_node(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PdagNode {
            refcount: 1,
            ..PdagNode::default()
        });
        self.n_nodes += 1;
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &PdagNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut PdagNode {
        &mut self.nodes[id.0]
    }

    /// Root of the main pdag.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live pdag nodes across the main pdag and all types.
    pub fn node_count(&self) -> usize {
        self.n_nodes
    }

    /// Drops one reference to `id`, freeing the node (and, via an
    /// explicit work list, everything only it kept alive — including
    /// `repeat` sub-pdags) when the count reaches zero.
    pub(crate) fn release_node(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let n = self.node_mut(id);
            if n.refcount == 0 {
                continue;
            }
            n.refcount -= 1;
            if n.refcount > 0 {
                continue;
            }
            self.n_nodes -= 1;
            let edges = std::mem::take(&mut self.node_mut(id).parsers);
            for edge in edges {
                if let crate::parsers::ParserData::Repeat(rep) = &edge.data {
                    stack.extend(rep.sub_pdags());
                }
                stack.push(edge.node);
            }
        }
    }

    /// Looks up a named sub-pdag by linear name comparison. With `add`
    /// set, a missing name causes a fresh empty sub-pdag to be appended.
    pub fn find_or_add_type(&mut self, name: &str, add: bool) -> Option<usize> {
        if let Some(i) = self.types.iter().position(|t| t.name == name) {
            return Some(i);
        }
        if !add {
            debug!(name, "custom type not found");
            return None;
        }
        let root = self.new_node();
        self.types.push(TypePdag {
            name: name.to_string(),
            root,
        });
        Some(self.types.len() - 1)
    }

    /// Root node of the named sub-pdag at `idx`.
    pub fn type_root(&self, idx: usize) -> NodeId {
        self.types[idx].root
    }

    /// Names of all user-defined types, in definition order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.name.as_str())
    }

    /// Marks `node` as a legitimate match endpoint and attaches optional
    /// tags (an array of strings) reported under `event.tags`.
    pub fn set_terminal(&mut self, node: NodeId, tags: Option<serde_json::Value>) {
        let n = self.node_mut(node);
        n.terminal = true;
        if tags.is_some() {
            n.tags = tags;
        }
    }

    /// Whether `node` is a terminal state.
    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.node(node).terminal
    }

    /// Reference count of `node` (incoming edges plus roots).
    pub fn refcount(&self, node: NodeId) -> u32 {
        self.node(node).refcount
    }

    /// Read-only view of the outgoing edges of `node`, in storage order
    /// (priority order once the context is optimized).
    pub fn edges(&self, node: NodeId) -> Vec<EdgeView<'_>> {
        self.node(node)
            .parsers
            .iter()
            .map(|p| EdgeView {
                kind: p.kind,
                kind_name: parsers::kind_name(p.kind),
                name: p.name.as_deref(),
                prio: p.prio,
                target: p.node,
            })
            .collect()
    }
}
