// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result};
use lognorm_rs::cfg::{cli::resolve_config_path, logger::init_logger, rulebase::Rulebase};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tracing::info;

/// Reads log lines from stdin and prints one normalized JSON record per
/// line. Usage: `lognorm <rulebase.yaml>`.
#[tokio::main]
async fn main() -> Result<()> {
    let _init_logger = init_logger("tests/config_logger.yaml")?;

    let rb_path = std::env::args()
        .nth(1)
        .context("usage: lognorm <rulebase.yaml>")?;

    let rb = resolve_config_path(&rb_path)
        .and_then(Rulebase::load_from_file)
        .context("failed to resolve or load rule base")?;
    let ctx = rb.build_context().context("failed to build pdag")?;
    info!(
        rules = rb.rules.len(),
        types = rb.types.len(),
        nodes = ctx.node_count(),
        "rule base loaded"
    );

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let record = ctx.normalize(&line);
        println!("{}", Value::Object(record));
    }

    Ok(())
}
