// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use lognorm_rs::cfg::rulebase::Rulebase;
use serde_json::json;

#[test]
fn test_load_and_normalize_fixture() -> Result<()> {
    let rb = Rulebase::load_from_file("tests/unit_tests/fixtures/ssh.yaml")?;
    assert_eq!(rb.types.len(), 1);
    assert_eq!(rb.rules.len(), 2);

    let ctx = rb.build_context()?;
    let rec = ctx.normalize("Accepted password for root@10.0.0.1 port 22");
    assert_eq!(rec.get("user"), Some(&json!("root")));
    assert_eq!(rec.get("host"), Some(&json!("10.0.0.1")));
    assert_eq!(rec.get("port"), Some(&json!(22)));
    assert_eq!(rec.get("event.tags"), Some(&json!(["ssh", "auth-ok"])));

    let rec = ctx.normalize("Failed password for eve@db1 port 2222");
    assert_eq!(rec.get("event.tags"), Some(&json!(["ssh", "auth-fail"])));

    let rec = ctx.normalize("something unrelated");
    assert_eq!(rec.get("originalmsg"), Some(&json!("something unrelated")));
    Ok(())
}

#[test]
fn test_unknown_type_in_rule_fails_load() {
    let rb = Rulebase::load_from_file("tests/unit_tests/fixtures/bad_type.yaml")
        .expect("the YAML itself is well-formed");
    let err = rb.build_context();
    assert!(err.is_err(), "{err:?}");
}

#[test]
fn test_type_name_must_carry_sentinel() -> Result<()> {
    let rb: Rulebase = serde_yaml::from_str(
        r#"
types:
  - name: "pair"
    parser: [{ type: word, name: w }]
rules:
  - parser: [{ type: literal, text: x }]
"#,
    )?;
    assert!(rb.validate().is_err());
    Ok(())
}

#[test]
fn test_empty_rules_rejected() -> Result<()> {
    let rb: Result<Rulebase, _> = serde_yaml::from_str("types: []\nrules: []\n");
    let rb = rb?;
    assert!(rb.validate().is_err());
    Ok(())
}

#[test]
fn test_types_must_be_defined_before_use() -> Result<()> {
    let rb: Rulebase = serde_yaml::from_str(
        r#"
types:
  - name: "@outer"
    parser: [{ type: "@inner", name: "." }]
  - name: "@inner"
    parser: [{ type: number, name: n }]
rules:
  - parser: [{ type: "@outer", name: "." }]
"#,
    )?;
    let err = rb.build_context();
    assert!(err.is_err(), "forward reference must fail: {err:?}");
    Ok(())
}
