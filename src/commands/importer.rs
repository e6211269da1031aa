// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{ImportDocument, ImportSummary, NewTransaction, TransactionType};
use crate::store::Store;
use crate::utils::{parse_amount, parse_date};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::path::Path;

pub async fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("backup", sub)) => {
            let path = sub.get_one::<String>("path").context("--path is required")?.trim();
            let s = import_backup(store, Path::new(path)).await?;
            println!(
                "Restored {} transactions, {} categories, {} settings, {} budgets from {}",
                s.transactions, s.categories, s.settings, s.budgets, path
            );
        }
        Some(("csv", sub)) => {
            let path = sub.get_one::<String>("path").context("--path is required")?.trim();
            let n = import_csv(store, Path::new(path)).await?;
            println!("Imported {} transactions from {}", n, path);
        }
        _ => {}
    }
    Ok(())
}

/// Replace every collection with the contents of a JSON backup. Nothing is
/// changed if the file fails to parse or any record is rejected.
pub async fn import_backup(store: &dyn Store, path: &Path) -> Result<ImportSummary> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Open backup {}", path.display()))?;
    let doc: ImportDocument = serde_json::from_str(&raw)
        .with_context(|| format!("Parse backup {}", path.display()))?;
    Ok(store.import_document(doc).await?)
}

/// Append transactions from a `date,type,amount,category,note` CSV.
pub async fn import_csv(store: &dyn Store, path: &Path) -> Result<usize> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;

    let mut items = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let line = i + 2;
        let rec = result?;
        let field = |idx: usize, name: &'static str| {
            rec.get(idx)
                .map(str::trim)
                .with_context(|| format!("line {}: {} missing", line, name))
        };
        let date_raw = field(0, "date")?;
        let date = parse_date(date_raw)
            .with_context(|| format!("line {}: invalid transaction date '{}'", line, date_raw))?;
        let kind: TransactionType = field(1, "type")?
            .parse()
            .with_context(|| format!("line {}: invalid type", line))?;
        let amount_raw = field(2, "amount")?;
        let amount = parse_amount(amount_raw)
            .with_context(|| format!("line {}: invalid amount '{}'", line, amount_raw))?;
        let category = field(3, "category")?.to_string();
        let note = rec
            .get(4)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        items.push(NewTransaction {
            date,
            r#type: kind,
            amount,
            category,
            note,
            created_at: None,
        });
    }
    Ok(store.append_transactions(items).await?)
}
