// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use lognorm_rs::context::Context;
use serde_json::json;

use super::ctx_for_rule;

#[test]
fn test_literal_only_rule() -> Result<()> {
    let ctx = ctx_for_rule(r#"[{"type": "literal", "text": "hello"}]"#)?;

    let rec = ctx.normalize("hello");
    assert!(rec.is_empty(), "clean match yields an empty record: {rec:?}");

    // The literal fails at offset 0, so the whole line is unparsed.
    let rec = ctx.normalize("hell");
    assert_eq!(rec.get("originalmsg"), Some(&json!("hell")));
    assert_eq!(rec.get("unparsed-data"), Some(&json!("hell")));

    // Trailing garbage: the literal matched, but no terminal was reached
    // at end of input.
    let rec = ctx.normalize("hello!");
    assert_eq!(rec.get("originalmsg"), Some(&json!("hello!")));
    assert_eq!(rec.get("unparsed-data"), Some(&json!("!")));
    Ok(())
}

#[test]
fn test_number_capture() -> Result<()> {
    let ctx = ctx_for_rule(
        r#"[{"type": "literal", "text": "id="}, {"type": "number", "name": "id"}]"#,
    )?;

    let rec = ctx.normalize("id=42");
    assert_eq!(rec.get("id"), Some(&json!(42)));
    assert_eq!(rec.len(), 1);

    let rec = ctx.normalize("id=abc");
    assert_eq!(rec.get("originalmsg"), Some(&json!("id=abc")));
    assert_eq!(rec.get("unparsed-data"), Some(&json!("abc")));
    Ok(())
}

#[test]
fn test_alternative_priority_default_kind_order() -> Result<()> {
    // With equal (default) user priorities the kind defaults decide:
    // literal (4) outranks word (32), so the word capture never fires.
    let ctx = ctx_for_rule(
        r#"[{"type": "alternative", "parser": [
            {"type": "word", "name": "w"},
            {"type": "literal", "text": "ok"}
        ]}]"#,
    )?;
    let rec = ctx.normalize("ok");
    assert!(rec.is_empty(), "literal must win: {rec:?}");
    Ok(())
}

#[test]
fn test_priority_monotonicity() -> Result<()> {
    // Swapping which competitor carries the better (lower) user priority
    // swaps the winner.
    let favored_word = ctx_for_rule(
        r#"[{"type": "alternative", "parser": [
            {"type": "word", "name": "w", "priority": 100},
            {"type": "literal", "text": "ok", "name": "lit"}
        ]}]"#,
    )?;
    assert_eq!(favored_word.normalize("ok").get("w"), Some(&json!("ok")));

    let favored_literal = ctx_for_rule(
        r#"[{"type": "alternative", "parser": [
            {"type": "word", "name": "w", "priority": 30000},
            {"type": "literal", "text": "ok", "name": "lit", "priority": 100}
        ]}]"#,
    )?;
    assert_eq!(
        favored_literal.normalize("ok").get("lit"),
        Some(&json!("ok"))
    );
    Ok(())
}

#[test]
fn test_backtracking_across_alternatives() -> Result<()> {
    let ctx = ctx_for_rule(
        r#"[
            {"type": "alternative", "parser": [
                {"type": "word", "name": "a"},
                {"type": "literal", "text": "abc"}
            ]},
            {"type": "literal", "text": "!"}
        ]"#,
    )?;

    // The literal branch (higher kind priority) carries the match; the
    // word branch would swallow the "!" and fail.
    let rec = ctx.normalize("abc!");
    assert!(rec.is_empty(), "{rec:?}");

    // Both branches consume "abc", then "!" fails at end of input. The
    // furthest parsed offset is 3, so the unparsed tail is empty.
    let rec = ctx.normalize("abc");
    assert_eq!(rec.get("originalmsg"), Some(&json!("abc")));
    assert_eq!(rec.get("unparsed-data"), Some(&json!("")));
    Ok(())
}

#[test]
fn test_backtracking_discards_captures() -> Result<()> {
    // The greedy rest branch matches and captures, but its subtree dies;
    // the record must not contain the discarded capture.
    let ctx = ctx_for_rule(
        r#"[
            {"type": "alternative", "parser": [
                {"type": "rest", "name": "r", "priority": 1},
                {"type": "char-to", "char": " ", "name": "head"}
            ]},
            {"type": "whitespace"},
            {"type": "rest", "name": "tail"}
        ]"#,
    )?;
    let rec = ctx.normalize("alpha beta");
    assert_eq!(rec.get("head"), Some(&json!("alpha")));
    assert_eq!(rec.get("tail"), Some(&json!("beta")));
    assert!(!rec.contains_key("r"), "discarded capture leaked: {rec:?}");
    Ok(())
}

#[test]
fn test_user_defined_type_dot_merge() -> Result<()> {
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
    ctx.optimize()?;

    // The "." merge rule flattens the sub-pdag's object into the record.
    let rec = ctx.normalize("x=y");
    assert_eq!(rec.get("k"), Some(&json!("x")));
    assert_eq!(rec.get("v"), Some(&json!("y")));
    assert_eq!(rec.len(), 2);
    Ok(())
}

#[test]
fn test_user_defined_type_named_capture_nests() -> Result<()> {
    let mut ctx = Context::new();
    ctx.define_type(
        "@pair",
        &json!([
            {"type": "char-to", "char": "=", "name": "k"},
            {"type": "literal", "text": "="},
            {"type": "word", "name": "v"},
        ]),
    )?;
    ctx.add_rule(&json!([{"type": "@pair", "name": "kv"}]), None)?;
    ctx.optimize()?;

    let rec = ctx.normalize("x=y");
    assert_eq!(rec.get("kv"), Some(&json!({"k": "x", "v": "y"})));
    Ok(())
}

#[test]
fn test_dot_name_with_scalar_value() -> Result<()> {
    // A non-object value under "." attaches under the literal key ".".
    let ctx = ctx_for_rule(r#"[{"type": "number", "name": "."}]"#)?;
    let rec = ctx.normalize("7");
    assert_eq!(rec.get("."), Some(&json!(7)));
    Ok(())
}

#[test]
fn test_tags_attached_on_match() -> Result<()> {
    let mut ctx = Context::new();
    ctx.add_rule(
        &json!([{"type": "literal", "text": "ping"}]),
        Some(json!(["icmp", "net"])),
    )?;
    ctx.optimize()?;

    let rec = ctx.normalize("ping");
    assert_eq!(rec.get("event.tags"), Some(&json!(["icmp", "net"])));
    let rec = ctx.normalize("pong");
    assert!(!rec.contains_key("event.tags"));
    Ok(())
}

#[test]
fn test_unparsed_tail_is_suffix_of_original() -> Result<()> {
    let ctx = ctx_for_rule(
        r#"[{"type": "literal", "text": "a="}, {"type": "number", "name": "a"}]"#,
    )?;
    for input in ["", "a", "a=", "a=x", "a=1y", "zzz"] {
        let rec = ctx.normalize(input);
        if rec.contains_key("originalmsg") {
            let orig = rec["originalmsg"].as_str().expect("string");
            let tail = rec["unparsed-data"].as_str().expect("string");
            assert!(orig.ends_with(tail), "{input}: {rec:?}");
            assert_eq!(orig, input);
        }
    }
    Ok(())
}

#[test]
fn test_determinism() -> Result<()> {
    let ctx = ctx_for_rule(
        r#"[
            {"type": "alternative", "parser": [
                {"type": "json", "name": "doc"},
                {"type": "word", "name": "w"}
            ]},
            {"type": "rest", "name": "tail"}
        ]"#,
    )?;
    for input in [r#"{"b":1,"a":2} x"#, "plain text", ""] {
        let a = serde_json::to_string(&ctx.normalize(input))?;
        let b = serde_json::to_string(&ctx.normalize(input))?;
        assert_eq!(a, b);
    }
    Ok(())
}

#[test]
fn test_terminal_node_with_outgoing_edges() -> Result<()> {
    // "ab" extends "a"; both are legitimate endpoints.
    let mut ctx = Context::new();
    ctx.add_rule(&json!([{"type": "literal", "text": "a"}]), None)?;
    ctx.add_rule(
        &json!([
            {"type": "literal", "text": "a"},
            {"type": "literal", "text": "b"},
        ]),
        None,
    )?;
    ctx.optimize()?;
    assert!(!ctx.normalize("a").contains_key("originalmsg"));
    assert!(!ctx.normalize("ab").contains_key("originalmsg"));
    assert!(ctx.normalize("ac").contains_key("originalmsg"));
    Ok(())
}

#[test]
fn test_empty_input() -> Result<()> {
    let ctx = ctx_for_rule(r#"[{"type": "literal", "text": "x"}]"#)?;
    let rec = ctx.normalize("");
    assert_eq!(rec.get("originalmsg"), Some(&json!("")));
    assert_eq!(rec.get("unparsed-data"), Some(&json!("")));
    Ok(())
}

#[test]
fn test_repeat_collects_array() -> Result<()> {
    let ctx = ctx_for_rule(
        r#"[{"type": "repeat",
             "parser": {"type": "number", "name": "n"},
             "while": {"type": "literal", "text": ","},
             "name": "nums"}]"#,
    )?;
    let rec = ctx.normalize("1,2,3");
    assert_eq!(
        rec.get("nums"),
        Some(&json!([{"n": 1}, {"n": 2}, {"n": 3}]))
    );

    // A separator with no element behind it fails the whole edge.
    let rec = ctx.normalize("1,2,");
    assert!(rec.contains_key("originalmsg"), "{rec:?}");
    Ok(())
}
