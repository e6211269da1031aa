// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::Store;
use anyhow::{Context, Result, bail};
use std::path::Path;

pub const CSV_HEADER: [&str; 5] = ["date", "type", "amount", "category", "note"];

pub async fn handle(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|f| f.to_lowercase())
        .unwrap_or_else(|| "json".into());
    let out = sub.get_one::<String>("out").context("--out is required")?.trim();
    let n = export_to(store, Path::new(out), &fmt).await?;
    println!("Exported {} transactions to {}", n, out);
    Ok(())
}

/// Write a full JSON backup or a transactions-only CSV. Returns the number
/// of transactions written.
pub async fn export_to(store: &dyn Store, out: &Path, fmt: &str) -> Result<usize> {
    match fmt {
        "json" => {
            let doc = store.export_document().await?;
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)
                .with_context(|| format!("Write {}", out.display()))?;
            tracing::info!(path = %out.display(), "wrote JSON backup");
            Ok(doc.transactions.len())
        }
        "csv" => {
            let doc = store.export_document().await?;
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record(CSV_HEADER)?;
            for t in &doc.transactions {
                wtr.write_record([
                    t.date.to_string(),
                    t.r#type.to_string(),
                    t.amount.to_string(),
                    t.category.clone(),
                    t.note.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
            tracing::info!(path = %out.display(), "wrote CSV export");
            Ok(doc.transactions.len())
        }
        other => bail!("Unknown format: {} (use json|csv)", other),
    }
}
