// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! pdag optimization, run once after all rules are loaded and before the
//! first normalization.
//!
//! Two passes over every pdag (main plus each named type). The sort pass
//! orders every node's edges by composite priority so the normalizer
//! gives specific parsers first dibs. The compaction pass merges chains
//! of unnamed literal edges into single instances, splicing out the
//! intermediate nodes. A third check rejects user-defined types whose
//! references form a cycle, which would otherwise make the composite
//! graph cyclic.

use std::collections::HashSet;

use tracing::debug;

use crate::{
    context::Context,
    errors::RulebaseError,
    parsers::{ParserData, ParserKind},
    pdag::node::NodeId,
};

impl Context {
    /// Sorts and compacts all pdags. Must be called before
    /// [`Context::normalize`]; it is idempotent.
    pub fn optimize(&mut self) -> Result<(), RulebaseError> {
        self.check_type_cycles()?;

        let mut roots: Vec<NodeId> = self.types.iter().map(|t| t.root).collect();
        roots.push(self.root);
        for root in roots {
            let mut visited = HashSet::new();
            self.optimize_component(root, &mut visited);
        }
        Ok(())
    }

    fn optimize_component(&mut self, node: NodeId, visited: &mut HashSet<NodeId>) {
        if !visited.insert(node) {
            return;
        }
        self.node_mut(node).parsers.sort_by_key(|p| p.prio);
        for i in 0..self.node(node).parsers.len() {
            self.compact_literal_chain(node, i);
            let succ = self.node(node).parsers[i].node;
            self.optimize_component(succ, visited);
        }
    }

    /// Merges `literal → literal` chains hanging off edge `idx` of
    /// `node`. Compaction stops at named literals (the capture would be
    /// lost), terminal intermediates (a legitimate match endpoint would
    /// disappear) and shared intermediates (another edge still needs the
    /// node).
    fn compact_literal_chain(&mut self, node: NodeId, idx: usize) {
        loop {
            let edge = &self.node(node).parsers[idx];
            if edge.kind != ParserKind::Literal || edge.name.is_some() {
                return;
            }
            let succ = edge.node;
            let s = self.node(succ);
            if s.refcount != 1 || s.terminal || s.parsers.len() != 1 {
                return;
            }
            let child = &s.parsers[0];
            if child.kind != ParserKind::Literal || child.name.is_some() {
                return;
            }
            let child_node = child.node;
            let ParserData::Literal(child_lit) = &child.data else {
                return;
            };
            let child_lit = child_lit.clone();

            let edge = &mut self.node_mut(node).parsers[idx];
            let ParserData::Literal(lit) = &mut edge.data else {
                return;
            };
            lit.append(&child_lit);
            edge.conf = serde_json::json!({ "text": lit.text() }).to_string();
            edge.node = child_node;
            debug!(%node, %succ, "literal path compacted");

            let s = self.node_mut(succ);
            s.refcount = 0;
            s.parsers.clear();
            self.n_nodes -= 1;
        }
    }

    /// Rejects mutually (or self-) recursive user-defined types. The
    /// input length bounds the normalizer's recursion either way, but a
    /// cyclic type definition is always a rule-base authoring error.
    fn check_type_cycles(&self) -> Result<(), RulebaseError> {
        let refs: Vec<Vec<usize>> = self
            .types
            .iter()
            .map(|t| self.referenced_types(t.root))
            .collect();

        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }
        fn visit(
            ctx: &Context,
            refs: &[Vec<usize>],
            colors: &mut [Color],
            i: usize,
        ) -> Result<(), RulebaseError> {
            match colors[i] {
                Color::Black => return Ok(()),
                Color::Gray => {
                    return Err(RulebaseError::RecursiveType(ctx.types[i].name.clone()));
                },
                Color::White => {},
            }
            colors[i] = Color::Gray;
            for &next in &refs[i] {
                visit(ctx, refs, colors, next)?;
            }
            colors[i] = Color::Black;
            Ok(())
        }

        let mut colors = vec![Color::White; self.types.len()];
        for i in 0..self.types.len() {
            visit(self, &refs, &mut colors, i)?;
        }
        Ok(())
    }

    /// All type-table indices referenced by edges reachable from `root`,
    /// including edges inside `repeat` sub-pdags.
    fn referenced_types(&self, root: NodeId) -> Vec<usize> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            for prs in &self.node(id).parsers {
                if let Some(idx) = prs.custom {
                    out.push(idx);
                }
                if let ParserData::Repeat(rep) = &prs.data {
                    stack.extend(rep.sub_pdags());
                }
                stack.push(prs.node);
            }
        }
        out
    }
}
