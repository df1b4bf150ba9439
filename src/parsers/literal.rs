// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use serde_json::{Map, Value};

use crate::{
    context::Context,
    errors::RulebaseError,
    parsers::{Match, Parse},
};

/// Matches one exact piece of text. Configuration: `text` (non-empty
/// string). The optimizer concatenates chains of unnamed literal edges
/// into a single instance via [`Literal::append`].
#[derive(Debug, Clone)]
pub struct Literal {
    text: String,
}

impl Literal {
    pub(crate) fn from_cfg(cfg: &Map<String, Value>) -> Result<Self, RulebaseError> {
        let text = cfg
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| RulebaseError::bad_config("literal", "missing 'text' string"))?;
        if text.is_empty() {
            return Err(RulebaseError::bad_config("literal", "'text' must not be empty"));
        }
        Ok(Literal {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Concatenates a compacted successor literal onto this one.
    pub(crate) fn append(&mut self, other: &Literal) {
        self.text.push_str(&other.text);
    }
}

impl Parse for Literal {
    fn parse(&self, _ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        if !msg[offs..].starts_with(&self.text) {
            return None;
        }
        Some(Match::with_value(offs + self.text.len(), capture, || {
            Value::String(self.text.clone())
        }))
    }
}
