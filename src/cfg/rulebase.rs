// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! YAML rule-base loading.
//!
//! A rule base is a YAML document with two sections: `types`, an ordered
//! list of user-defined type definitions, and `rules`, the rules of the
//! main pdag. Parser configurations are plain JSON-compatible values and
//! are fed to the pdag builder untouched, so everything the builder
//! accepts (sequences, alternatives, nested arrays, kind-specific keys)
//! can be written inline:
//!
//! ```yaml
//! types:
//!   - name: "@pair"
//!     parser:
//!       - { type: char-to, char: "=", name: k }
//!       - { type: literal, text: "=" }
//!       - { type: word, name: v }
//! rules:
//!   - parser:
//!       - { type: literal, text: "id=" }
//!       - { type: number, name: id }
//!     tags: [session]
//! ```
//!
//! Types are defined strictly in list order; a type may only reference
//! types defined above it (the optimizer additionally rejects reference
//! cycles).

use std::{fs, path::Path};

use anyhow::{Context as _, Result, ensure};
use serde::Deserialize;
use serde_json::Value;

use crate::context::Context;

/// One user-defined type definition.
#[derive(Deserialize, Debug, Clone)]
pub struct TypeDef {
    /// Type name including the `@` prefix.
    pub name: String,
    /// Parser configuration of the type's sub-pdag.
    pub parser: Value,
}

/// One rule of the main pdag.
#[derive(Deserialize, Debug, Clone)]
pub struct Rule {
    /// Parser configuration matched against the input.
    pub parser: Value,
    /// Optional tags (array of strings) attached to the rule's terminal
    /// node and reported under `event.tags`.
    #[serde(default)]
    pub tags: Option<Value>,
}

/// A parsed rule-base file.
#[derive(Deserialize, Debug, Clone)]
pub struct Rulebase {
    #[serde(default)]
    pub types: Vec<TypeDef>,
    pub rules: Vec<Rule>,
}

impl Rulebase {
    /// Loads the rule base from YAML, validates it, and returns the
    /// ready-to-apply value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(&path).with_context(|| {
            format!("failed to read rule base {:?}", path.as_ref())
        })?;
        let rb: Rulebase =
            serde_yaml::from_str(&s).context("failed to parse rule base YAML")?;
        rb.validate()?;
        Ok(rb)
    }

    /// Validates invariants the pdag builder cannot see per-rule.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.rules.is_empty(), "rule base contains no rules");
        for t in &self.types {
            ensure!(
                t.name.starts_with('@'),
                "type name '{}' must start with '@'",
                t.name
            );
        }
        Ok(())
    }

    /// Feeds all type definitions and rules into `ctx`, in order.
    pub fn apply(&self, ctx: &mut Context) -> Result<()> {
        for (i, t) in self.types.iter().enumerate() {
            ctx.define_type(&t.name, &t.parser)
                .with_context(|| format!("type #{i} ('{}')", t.name))?;
        }
        for (i, r) in self.rules.iter().enumerate() {
            ctx.add_rule(&r.parser, r.tags.clone())
                .with_context(|| format!("rule #{i}"))?;
        }
        Ok(())
    }

    /// Builds an optimized [`Context`] from this rule base, ready for
    /// [`Context::normalize`].
    pub fn build_context(&self) -> Result<Context> {
        let mut ctx = Context::new();
        self.apply(&mut ctx)?;
        ctx.optimize().context("pdag optimization failed")?;
        Ok(ctx)
    }
}
