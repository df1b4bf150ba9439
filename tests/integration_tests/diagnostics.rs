// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use lognorm_rs::cfg::rulebase::Rulebase;

fn fixture_context() -> Result<lognorm_rs::context::Context> {
    Rulebase::load_from_file("tests/integration_tests/fixtures/syslog.yaml")?.build_context()
}

#[test]
fn test_stats_render() -> Result<()> {
    let ctx = fixture_context()?;
    let mut out = String::new();
    ctx.render_stats(&mut out)?;

    assert!(out.contains("User-Defined Types"), "{out}");
    assert!(out.contains("number types: 1"), "{out}");
    assert!(out.contains("type: @syslog_header"), "{out}");
    assert!(out.contains("Main PDAG"), "{out}");
    assert!(out.contains("nodes.............:"), "{out}");
    assert!(out.contains("literal"), "{out}");
    Ok(())
}

#[test]
fn test_dag_dump_render() -> Result<()> {
    let ctx = fixture_context()?;
    let mut out = String::new();
    ctx.render_dag(&mut out)?;

    assert!(out.contains("COMPONENT: @syslog_header"), "{out}");
    assert!(out.contains("MAIN COMPONENT:"), "{out}");
    assert!(out.contains("[TERM]"), "{out}");
    assert!(out.contains("field type 'USER-DEFINED'"), "{out}");
    assert!(out.contains("field type 'literal'"), "{out}");
    // The repeat definition is expanded inline.
    assert!(out.contains("end repeat def"), "{out}");
    Ok(())
}

#[test]
fn test_dot_emission() -> Result<()> {
    let ctx = fixture_context()?;
    let dot = ctx.dot_graph(ctx.root());

    assert!(dot.starts_with("digraph pdag {\n"), "{dot}");
    assert!(dot.trim_end().ends_with('}'), "{dot}");
    assert!(dot.contains("label=\"literal:metrics \""), "{dot}");
    assert!(dot.contains("style=\"dotted\""), "{dot}");
    Ok(())
}

#[test]
fn test_node_count_matches_stats() -> Result<()> {
    let ctx = fixture_context()?;
    let mut out = String::new();
    ctx.render_stats(&mut out)?;

    // Sum of the per-pdag node counts. Repeat sub-pdags hang off edge
    // payloads rather than roots, so the arena's live count is at least
    // this sum.
    let counted: usize = out
        .lines()
        .filter_map(|l| l.strip_prefix("nodes.............:"))
        .map(|n| n.trim().parse::<usize>().expect("count"))
        .sum();
    assert!(counted > 0);
    assert!(counted <= ctx.node_count(), "{counted} vs {}", ctx.node_count());
    Ok(())
}
