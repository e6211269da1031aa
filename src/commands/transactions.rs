// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{NewTransaction, Transaction, TransactionPatch, TransactionType};
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, parse_amount, parse_date, pretty_table, today};
use anyhow::{Context, Result, bail};

pub async fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub).await?,
        Some(("edit", sub)) => edit(store, sub).await?,
        Some(("rm", sub)) => rm(store, sub).await?,
        Some(("list", sub)) => list(store, sub).await?,
        _ => {}
    }
    Ok(())
}

fn parse_type(sub: &clap::ArgMatches) -> Result<Option<TransactionType>> {
    sub.get_one::<String>("type")
        .map(|t| t.parse::<TransactionType>())
        .transpose()
        .context("Invalid --type")
}

pub fn new_from_args(sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let kind = parse_type(sub)?.context("--type is required")?;
    let amount = parse_amount(sub.get_one::<String>("amount").context("--amount is required")?)?;
    let category = sub
        .get_one::<String>("category")
        .context("--category is required")?
        .trim()
        .to_string();
    Ok(NewTransaction {
        date,
        r#type: kind,
        amount,
        category,
        note: sub.get_one::<String>("note").cloned(),
        created_at: None,
    })
}

/// An empty `--note` clears the note.
pub fn patch_from_args(sub: &clap::ArgMatches) -> Result<TransactionPatch> {
    Ok(TransactionPatch {
        date: sub
            .get_one::<String>("date")
            .map(|d| parse_date(d))
            .transpose()?,
        r#type: parse_type(sub)?,
        amount: sub
            .get_one::<String>("amount")
            .map(|a| parse_amount(a))
            .transpose()?,
        category: sub
            .get_one::<String>("category")
            .map(|c| c.trim().to_string()),
        note: sub
            .get_one::<String>("note")
            .map(|n| Some(n.clone()).filter(|n| !n.trim().is_empty())),
    })
}

async fn add(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let new = new_from_args(sub)?;
    let known = store.list_categories(Some(new.r#type)).await?;
    if !known.iter().any(|c| c.name == new.category) {
        tracing::warn!(category = %new.category, "category is not in the {} list", new.r#type);
    }
    let tx = store.add_transaction(new).await?;
    println!(
        "Recorded {} {} on {} in '{}' (id {})",
        tx.r#type,
        fmt_money(&tx.amount),
        tx.date,
        tx.category,
        tx.id
    );
    Ok(())
}

async fn edit(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    let patch = patch_from_args(sub)?;
    if patch.is_empty() {
        bail!("Nothing to change for transaction {}", id);
    }
    let tx = store.update_transaction(id, patch).await?;
    println!(
        "Updated transaction {}: {} {} on {} in '{}'",
        tx.id,
        tx.r#type,
        fmt_money(&tx.amount),
        tx.date,
        tx.category
    );
    Ok(())
}

async fn rm(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").context("--id is required")?;
    store.delete_transaction(id).await?;
    println!("Removed transaction {}", id);
    Ok(())
}

async fn list(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(store, sub).await?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.r#type.to_string(),
                    fmt_money(&t.amount),
                    t.category.clone(),
                    t.note.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Type", "Amount", "Category", "Note"], rows)
        );
    }
    Ok(())
}

/// Rows for `tx list`: one day when `--date` is given, otherwise a newest
/// first page.
pub async fn query_rows(store: &dyn Store, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    if let Some(d) = sub.get_one::<String>("date") {
        return Ok(store.transactions_on(parse_date(d)?).await?);
    }
    let limit = sub.get_one::<usize>("limit").copied();
    let offset = sub.get_one::<usize>("offset").copied().unwrap_or(0);
    Ok(store.list_transactions(limit, offset).await?)
}
