// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use serde_json::{Map, Value};

use crate::{
    context::Context,
    errors::RulebaseError,
    parsers::{Match, Parse},
    pdag::node::NodeId,
};

/// Matches a sub-pdag one or more times, with a second sub-pdag acting
/// as the inter-element separator condition. Configuration: `parser`
/// (element grammar) and `while` (separator grammar). Iteration stops
/// when the separator no longer matches; an element that consumes zero
/// bytes aborts the whole match, so a mis-built rule cannot loop.
///
/// Captured as an array with one object per element.
#[derive(Debug)]
pub struct Repeat {
    parser: NodeId,
    while_cond: NodeId,
}

impl Repeat {
    pub(crate) fn from_cfg(
        ctx: &mut Context,
        cfg: &Map<String, Value>,
    ) -> Result<Self, RulebaseError> {
        let parser_cfg = cfg
            .get("parser")
            .ok_or_else(|| RulebaseError::bad_config("repeat", "missing 'parser' config"))?;
        let while_cfg = cfg
            .get("while")
            .ok_or_else(|| RulebaseError::bad_config("repeat", "missing 'while' config"))?;
        Ok(Repeat {
            parser: ctx.build_sub_pdag(parser_cfg)?,
            while_cond: ctx.build_sub_pdag(while_cfg)?,
        })
    }

    /// Roots of the element and separator sub-pdags, in that order.
    pub(crate) fn sub_pdags(&self) -> [NodeId; 2] {
        [self.parser, self.while_cond]
    }
}

impl Parse for Repeat {
    fn parse(&self, ctx: &Context, msg: &str, offs: usize, capture: bool) -> Option<Match> {
        let mut items = Vec::new();
        let mut cur = offs;
        loop {
            let mut obj = Map::new();
            let mut max = cur;
            ctx.normalize_rec(self.parser, msg, cur, true, &mut max, &mut obj)?;
            let elem_end = max.max(cur);
            if elem_end == cur {
                // Zero-length element: refuse rather than loop forever.
                return None;
            }
            items.push(Value::Object(obj));
            cur = elem_end;

            let mut sep_max = cur;
            let mut discard = Map::new();
            if ctx
                .normalize_rec(self.while_cond, msg, cur, true, &mut sep_max, &mut discard)
                .is_none()
            {
                break;
            }
            let sep_end = sep_max.max(cur);
            if sep_end == cur {
                break;
            }
            cur = sep_end;
        }
        Some(Match::with_value(cur, capture, || Value::Array(items)))
    }
}
