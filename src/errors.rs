// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Typed errors surfaced by pdag construction and rule-base loading.
//!
//! Normalization itself never fails: a message that matches no rule is
//! reported through the `originalmsg` / `unparsed-data` keys of the output
//! record, and a parser that does not match is an internal signal consumed
//! by the matcher while it tries the next alternative.

use thiserror::Error;

/// Everything that can go wrong while turning parser configuration
/// objects into pdag edges. Each variant carries enough context to point
/// the rule author at the offending configuration.
#[derive(Debug, Error)]
pub enum RulebaseError {
    /// The configuration object has no `type` key.
    #[error("parser type missing in config: {0}")]
    MissingType(String),

    /// `type` names no built-in parser.
    #[error("invalid field type '{name}' in config: {conf}")]
    UnknownType { name: String, conf: String },

    /// `type` starts with `@` but no such user-defined type exists yet.
    #[error("unknown user-defined type '{0}'")]
    UnknownUserType(String),

    /// An `alternative` object whose `parser` key is missing or not an
    /// array.
    #[error("alternative type needs array of parsers, got: {0}")]
    MalformedAlternative(String),

    /// A configuration node that is neither an object nor an array.
    #[error("parser config of wrong shape: {0}")]
    BadShape(String),

    /// A kind-specific option is missing or has the wrong type.
    #[error("bad configuration for parser '{name}': {reason}")]
    BadConfig { name: String, reason: String },

    /// User-defined types reference each other in a cycle.
    #[error("user-defined types form a reference cycle involving '{0}'")]
    RecursiveType(String),
}

impl RulebaseError {
    pub(crate) fn bad_config(name: &str, reason: impl Into<String>) -> Self {
        Self::BadConfig {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
