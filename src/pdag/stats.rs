// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Diagnostics: textual pdag dump, per-pdag statistics and DOT graph
//! emission. All three are side-effect-free visitors rendering into a
//! caller-supplied writer, useful when debugging rule bases.

use std::{
    collections::HashSet,
    fmt::{self, Write},
};

use crate::{
    context::Context,
    parsers::{self, ParserData, ParserKind},
    pdag::node::NodeId,
};

struct PdagStats {
    nodes: usize,
    term_nodes: usize,
    parsers: usize,
    max_nparsers: usize,
    nparsers_cnt: [usize; 100],
    nparsers_100plus: usize,
    prs_cnt: [usize; 32],
}

impl Default for PdagStats {
    fn default() -> Self {
        Self {
            nodes: 0,
            term_nodes: 0,
            parsers: 0,
            max_nparsers: 0,
            nparsers_cnt: [0; 100],
            nparsers_100plus: 0,
            prs_cnt: [0; 32],
        }
    }
}

impl Context {
    /// Renders statistics for the pdag rooted at `root`.
    pub fn render_pdag_stats(&self, root: NodeId, w: &mut impl Write) -> fmt::Result {
        let mut stats = PdagStats::default();
        let mut visited = HashSet::new();
        let longest_path = self.stats_rec(root, &mut stats, &mut visited);

        writeln!(w, "nodes.............: {:4}", stats.nodes)?;
        writeln!(w, "terminal nodes....: {:4}", stats.term_nodes)?;
        writeln!(w, "parsers entries...: {:4}", stats.parsers)?;
        writeln!(w, "longest path......: {longest_path:4}")?;

        writeln!(w, "Parser Type Counts:")?;
        for (i, &cnt) in stats.prs_cnt.iter().enumerate() {
            if cnt != 0 {
                let name = kind_name_by_index(i);
                writeln!(w, "\t{name:>20}: {cnt}")?;
            }
        }

        writeln!(w, "Parsers per Node:")?;
        writeln!(w, "\tmax:\t{:4}", stats.max_nparsers)?;
        for (i, &cnt) in stats.nparsers_cnt.iter().enumerate() {
            if cnt != 0 {
                writeln!(w, "\t{i}:\t{cnt:4}")?;
            }
        }
        if stats.nparsers_100plus != 0 {
            writeln!(w, "\t100+:\t{:4}", stats.nparsers_100plus)?;
        }
        Ok(())
    }

    /// Renders statistics for the full context: every named type's pdag
    /// followed by the main pdag.
    pub fn render_stats(&self, w: &mut impl Write) -> fmt::Result {
        writeln!(w, "User-Defined Types")?;
        writeln!(w, "==================")?;
        writeln!(w, "number types: {}", self.types.len())?;
        for t in &self.types {
            writeln!(w, "type: {}", t.name)?;
        }

        for t in &self.types {
            writeln!(w)?;
            writeln!(w, "type PDAG: {}", t.name)?;
            writeln!(w, "----------")?;
            self.render_pdag_stats(t.root, w)?;
        }

        writeln!(w)?;
        writeln!(w, "Main PDAG")?;
        writeln!(w, "=========")?;
        self.render_pdag_stats(self.root, w)
    }

    fn stats_rec(
        &self,
        node: NodeId,
        stats: &mut PdagStats,
        visited: &mut HashSet<NodeId>,
    ) -> usize {
        if !visited.insert(node) {
            return 0;
        }
        let n = self.node(node);
        stats.nodes += 1;
        if n.terminal {
            stats.term_nodes += 1;
        }
        stats.max_nparsers = stats.max_nparsers.max(n.parsers.len());
        if n.parsers.len() >= 100 {
            stats.nparsers_100plus += 1;
        } else {
            stats.nparsers_cnt[n.parsers.len()] += 1;
        }
        stats.parsers += n.parsers.len();
        let mut max_path = 0;
        for prs in &n.parsers {
            stats.prs_cnt[prs.kind as usize] += 1;
            max_path = max_path.max(self.stats_rec(prs.node, stats, visited));
        }
        max_path + 1
    }

    /// Renders a textual dump of all pdags (types first, then main), one
    /// indented line per node and edge.
    pub fn render_dag(&self, w: &mut impl Write) -> fmt::Result {
        for t in &self.types {
            writeln!(w, "COMPONENT: {}", t.name)?;
            self.dump_component(t.root, 0, w)?;
        }
        writeln!(w, "MAIN COMPONENT:")?;
        self.dump_component(self.root, 0, w)
    }

    fn dump_component(&self, node: NodeId, level: usize, w: &mut impl Write) -> fmt::Result {
        let indent = "  ".repeat(level.min(40));
        let n = self.node(node);
        writeln!(
            w,
            "{indent}subDAG{} {node} (children: {} parsers)",
            if n.terminal { " [TERM]" } else { "" },
            n.parsers.len()
        )?;
        for prs in &n.parsers {
            writeln!(
                w,
                "{indent}field type '{}', name '{}': '{}'",
                parsers::kind_name(prs.kind),
                prs.name.as_deref().unwrap_or("-"),
                edge_data_display(prs)
            )?;
            if let ParserData::Repeat(rep) = &prs.data {
                let [parser, while_cond] = rep.sub_pdags();
                writeln!(w, "{indent}parser:")?;
                self.dump_component(parser, level + 1, w)?;
                writeln!(w, "{indent}while:")?;
                self.dump_component(while_cond, level + 1, w)?;
                writeln!(w, "{indent}end repeat def")?;
            }
            self.dump_component(prs.node, level + 1, w)?;
        }
        Ok(())
    }

    /// Emits a DOT control file for the pdag rooted at `root`, suitable
    /// for the GNU DOT tool. Handy for understanding complex rule bases.
    pub fn dot_graph(&self, root: NodeId) -> String {
        let mut out = String::from("digraph pdag {\n");
        let mut visited = HashSet::new();
        self.dot_rec(root, &mut visited, &mut out);
        out.push_str("}\n");
        out
    }

    fn dot_rec(&self, node: NodeId, visited: &mut HashSet<NodeId>, out: &mut String) {
        if !visited.insert(node) {
            return;
        }
        let n = self.node(node);
        let style = if n.parsers.is_empty() { " style=\"bold\"" } else { "" };
        let _ = writeln!(out, "{node} [ label=\"\"{style}]");

        for prs in &n.parsers {
            let mut label = parsers::kind_name(prs.kind).to_string();
            if prs.kind == ParserKind::Literal {
                label.push(':');
                for c in edge_data_display(prs).chars() {
                    if c != '\\' && c != '"' {
                        label.push(c);
                    }
                }
            }
            let _ = writeln!(
                out,
                "{node} -> {} [label=\"{label}\" style=\"normal\"]",
                prs.node
            );
            if let ParserData::Repeat(rep) = &prs.data {
                let [parser, while_cond] = rep.sub_pdags();
                let _ = writeln!(
                    out,
                    "{node} -> {parser} [label=\"parser\" style=\"dotted\"]"
                );
                self.dot_rec(parser, visited, out);
                let _ = writeln!(
                    out,
                    "{node} -> {while_cond} [label=\"while\" style=\"dotted\"]"
                );
                self.dot_rec(while_cond, visited, out);
            }
            self.dot_rec(prs.node, visited, out);
        }
    }
}

fn kind_name_by_index(i: usize) -> &'static str {
    parsers::PARSER_TABLE
        .get(i)
        .map(|info| info.name)
        .unwrap_or("USER-DEFINED")
}

fn edge_data_display(prs: &crate::pdag::node::ParserInstance) -> String {
    match &prs.data {
        ParserData::Literal(lit) => lit.text().to_string(),
        _ => "UNKNOWN".to_string(),
    }
}
