// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use lognorm_rs::{context::Context, errors::RulebaseError, parsers::ParserKind};
use serde_json::{Value, json};

#[test]
fn test_sequence_chains_nodes() -> Result<()> {
    let mut ctx = Context::new();
    ctx.add_rule(
        &json!([
            {"type": "literal", "text": "id="},
            {"type": "number", "name": "id"},
        ]),
        None,
    )?;

    // Root, one node behind the literal, one behind the number.
    assert_eq!(ctx.node_count(), 3);
    let root_edges = ctx.edges(ctx.root());
    assert_eq!(root_edges.len(), 1);
    assert_eq!(root_edges[0].kind, ParserKind::Literal);
    let mid_edges = ctx.edges(root_edges[0].target);
    assert_eq!(mid_edges.len(), 1);
    assert_eq!(mid_edges[0].kind, ParserKind::Number);
    assert_eq!(mid_edges[0].name, Some("id"));
    assert!(ctx.is_terminal(mid_edges[0].target));
    assert!(!ctx.is_terminal(root_edges[0].target));
    Ok(())
}

#[test]
fn test_equivalent_edges_dedup() -> Result<()> {
    let mut ctx = Context::new();
    let rule = json!([
        {"type": "literal", "text": "a"},
        {"type": "word", "name": "w"},
    ]);
    ctx.add_rule(&rule, None)?;
    let nodes_after_first = ctx.node_count();

    // The identical rule walks the existing path instead of adding edges.
    ctx.add_rule(&rule, None)?;
    assert_eq!(ctx.node_count(), nodes_after_first);
    assert_eq!(ctx.edges(ctx.root()).len(), 1);

    // A different literal forks at the root.
    ctx.add_rule(&json!([{"type": "literal", "text": "b"}]), None)?;
    assert_eq!(ctx.edges(ctx.root()).len(), 2);
    Ok(())
}

#[test]
fn test_dedup_ignores_key_order() -> Result<()> {
    // Same parser written with different key order in the rule source.
    let a: Value = serde_json::from_str(
        r#"[{"type": "repeat", "parser": {"type": "number", "name": "n"}, "while": {"type": "literal", "text": ","}}]"#,
    )?;
    let b: Value = serde_json::from_str(
        r#"[{"type": "repeat", "while": {"type": "literal", "text": ","}, "parser": {"type": "number", "name": "n"}}]"#,
    )?;
    let mut ctx = Context::new();
    ctx.add_rule(&a, None)?;
    let root_edges = ctx.edges(ctx.root()).len();
    ctx.add_rule(&b, None)?;
    assert_eq!(ctx.edges(ctx.root()).len(), root_edges, "must deduplicate");
    Ok(())
}

#[test]
fn test_alternative_shares_join_node() -> Result<()> {
    let mut ctx = Context::new();
    ctx.add_rule(
        &json!([
            {"type": "alternative", "parser": [
                {"type": "word", "name": "w"},
                {"type": "number", "name": "n"},
            ]},
            {"type": "literal", "text": "!"},
        ]),
        None,
    )?;

    let root_edges = ctx.edges(ctx.root());
    assert_eq!(root_edges.len(), 2);
    let join = root_edges[0].target;
    assert_eq!(join, root_edges[1].target, "alternatives must converge");
    assert_eq!(ctx.refcount(join), 2);

    // The join continues into the shared literal.
    let join_edges = ctx.edges(join);
    assert_eq!(join_edges.len(), 1);
    assert_eq!(join_edges[0].kind, ParserKind::Literal);
    Ok(())
}

#[test]
fn test_alternative_sequence_branch_joins_at_end() -> Result<()> {
    let mut ctx = Context::new();
    ctx.add_rule(
        &json!([
            {"type": "alternative", "parser": [
                [
                    {"type": "literal", "text": "a", "name": "x"},
                    {"type": "literal", "text": "b", "name": "y"},
                ],
                {"type": "number", "name": "n"},
            ]},
            {"type": "literal", "text": "!"},
        ]),
        None,
    )?;
    ctx.optimize()?;

    let rec = ctx.normalize("ab!");
    assert_eq!(rec.get("x"), Some(&json!("a")));
    assert_eq!(rec.get("y"), Some(&json!("b")));
    let rec = ctx.normalize("7!");
    assert_eq!(rec.get("n"), Some(&json!(7)));
    Ok(())
}

#[test]
fn test_user_defined_type_resolution() -> Result<()> {
    let mut ctx = Context::new();
    ctx.define_type(
        "@pair",
        &json!([
            {"type": "char-to", "char": "=", "name": "k"},
            {"type": "literal", "text": "="},
            {"type": "word", "name": "v"},
        ]),
    )?;
    ctx.add_rule(&json!([{"type": "@pair", "name": "."}]), None)?;

    let root_edges = ctx.edges(ctx.root());
    assert_eq!(root_edges.len(), 1);
    assert_eq!(root_edges[0].kind, ParserKind::Custom);
    assert_eq!(root_edges[0].kind_name, "USER-DEFINED");
    Ok(())
}

#[test]
fn test_construction_errors() {
    let mut ctx = Context::new();

    let err = ctx.add_rule(&json!([{"name": "x"}]), None);
    assert!(matches!(err, Err(RulebaseError::MissingType(_))), "{err:?}");

    let err = ctx.add_rule(&json!([{"type": "no-such-parser"}]), None);
    assert!(matches!(err, Err(RulebaseError::UnknownType { .. })), "{err:?}");

    let err = ctx.add_rule(&json!([{"type": "@nope"}]), None);
    assert!(matches!(err, Err(RulebaseError::UnknownUserType(_))), "{err:?}");

    let err = ctx.add_rule(&json!([{"type": "alternative", "parser": "oops"}]), None);
    assert!(
        matches!(err, Err(RulebaseError::MalformedAlternative(_))),
        "{err:?}"
    );

    let err = ctx.add_rule(&json!(["just a string"]), None);
    assert!(matches!(err, Err(RulebaseError::BadShape(_))), "{err:?}");

    let err = ctx.add_rule(&json!([{"type": "literal"}]), None);
    assert!(matches!(err, Err(RulebaseError::BadConfig { .. })), "{err:?}");

    let err = ctx.add_rule(
        &json!([{"type": "word", "name": "w", "priority": 1 << 24}]),
        None,
    );
    assert!(matches!(err, Err(RulebaseError::BadConfig { .. })), "{err:?}");
}

#[test]
fn test_unnamed_markers() -> Result<()> {
    // Both an absent name and the "-" marker mean "match, do not capture".
    let mut ctx = Context::new();
    ctx.add_rule(
        &json!([
            {"type": "word", "name": "-"},
            {"type": "whitespace"},
            {"type": "rest", "name": "r"},
        ]),
        None,
    )?;
    ctx.optimize()?;
    let rec = ctx.normalize("head tail");
    assert_eq!(rec.len(), 1);
    assert_eq!(rec.get("r"), Some(&json!("tail")));
    Ok(())
}

#[test]
fn test_failed_rule_leaves_earlier_rules_intact() -> Result<()> {
    let mut ctx = Context::new();
    ctx.add_rule(&json!([{"type": "literal", "text": "ok"}]), None)?;
    assert!(ctx.add_rule(&json!([{"type": "bogus"}]), None).is_err());
    ctx.optimize()?;
    assert!(!ctx.normalize("ok").contains_key("originalmsg"));
    Ok(())
}
