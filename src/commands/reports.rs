// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::{DateRange, Period, bucket_series};
use crate::models::TransactionType;
use crate::stats::{CategoryDetail, CategoryShare, category_detail, category_shares};
use crate::store::Store;
use crate::utils::{
    bar, fmt_money, fmt_percent, maybe_print_json, pretty_table, range_period, resolve_range,
    today,
};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

pub async fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(store, sub).await?,
        Some(("categories", sub)) => categories(store, sub).await?,
        Some(("chart", sub)) => chart(store, sub).await?,
        Some(("category", sub)) => category(store, sub).await?,
        _ => {}
    }
    Ok(())
}

fn kind_arg(sub: &clap::ArgMatches) -> Result<TransactionType> {
    Ok(sub
        .get_one::<String>("type")
        .map(|t| t.parse::<TransactionType>())
        .transpose()?
        .unwrap_or(TransactionType::Expense))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub range: DateRange,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub days_with_activity: usize,
}

pub async fn summary_for(store: &dyn Store, range: DateRange) -> Result<Summary> {
    let stats = store.statistics(range.start, range.end).await?;
    Ok(Summary {
        range,
        total_income: stats.total_income,
        total_expenses: stats.total_expenses,
        balance: stats.balance(),
        days_with_activity: stats.daily_data.len(),
    })
}

async fn summary(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let range = resolve_range(sub, today())?;
    let s = summary_for(store, range).await?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        println!("{}", s.range);
        println!(
            "{}",
            pretty_table(
                &["Income", "Expenses", "Balance"],
                vec![vec![
                    fmt_money(&s.total_income),
                    fmt_money(&s.total_expenses),
                    fmt_money(&s.balance),
                ]],
            )
        );
    }
    Ok(())
}

pub async fn shares_for(
    store: &dyn Store,
    range: DateRange,
    kind: TransactionType,
) -> Result<Vec<CategoryShare>> {
    let stats = store.statistics(range.start, range.end).await?;
    Ok(category_shares(stats.by_category(kind)))
}

async fn categories(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let range = resolve_range(sub, today())?;
    let kind = kind_arg(sub)?;
    let data = shares_for(store, range, kind).await?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No {} in {}", kind, range);
        return Ok(());
    }
    let icons = store.list_categories(Some(kind)).await?;
    let rows = data
        .iter()
        .map(|c| {
            let icon = icons
                .iter()
                .find(|i| i.name == c.category)
                .map(|i| i.icon.clone())
                .unwrap_or_default();
            vec![
                format!("{} {}", icon, c.category).trim().to_string(),
                fmt_money(&c.amount),
                fmt_percent(&c.percentage),
                bar(c.percentage, Decimal::ONE_HUNDRED, 20),
            ]
        })
        .collect();
    println!("{} by category, {}", kind, range);
    println!(
        "{}",
        pretty_table(&["Category", "Amount", "Share", ""], rows)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Chart {
    pub period: Period,
    pub range: DateRange,
    pub labels: Vec<&'static str>,
    pub income: Vec<Decimal>,
    pub expenses: Vec<Decimal>,
}

/// Income and expense series for the period containing today.
pub async fn chart_for(store: &dyn Store, period: Period, today: chrono::NaiveDate) -> Result<Chart> {
    let range = period.date_range(today);
    let stats = store.statistics(range.start, range.end).await?;
    Ok(Chart {
        period,
        range,
        labels: period.labels().to_vec(),
        income: bucket_series(&stats.daily_data, period, TransactionType::Income),
        expenses: bucket_series(&stats.daily_data, period, TransactionType::Expense),
    })
}

async fn chart(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let period = range_period(sub)?;
    let c = chart_for(store, period, today()).await?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &c)? {
        return Ok(());
    }
    let max = c
        .income
        .iter()
        .chain(c.expenses.iter())
        .copied()
        .max()
        .unwrap_or(Decimal::ZERO);
    let rows = c
        .labels
        .iter()
        .zip(c.income.iter().zip(c.expenses.iter()))
        .map(|(label, (inc, exp))| {
            vec![
                label.to_string(),
                fmt_money(inc),
                bar(*inc, max, 16),
                fmt_money(exp),
                bar(*exp, max, 16),
            ]
        })
        .collect();
    println!("{} {}", c.period, c.range);
    println!(
        "{}",
        pretty_table(&["", "Income", "", "Expenses", ""], rows)
    );
    Ok(())
}

pub async fn detail_for(
    store: &dyn Store,
    range: DateRange,
    name: &str,
    kind: TransactionType,
) -> Result<CategoryDetail> {
    let txs = store.transactions_by_date_range(range.start, range.end).await?;
    Ok(category_detail(&txs, name, kind))
}

async fn category(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").context("--name is required")?;
    let range = resolve_range(sub, today())?;
    let detail = detail_for(store, range, name.trim(), kind_arg(sub)?).await?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &detail)? {
        return Ok(());
    }
    println!(
        "{} ({}), {}: {} transactions, total {}, average {}",
        detail.category,
        detail.r#type,
        range,
        detail.count,
        fmt_money(&detail.total),
        fmt_money(&detail.average)
    );
    let max = detail.trend.values().copied().max().unwrap_or(Decimal::ZERO);
    let rows = detail
        .trend
        .iter()
        .map(|(d, v)| vec![d.to_string(), fmt_money(v), bar(*v, max, 20)])
        .collect();
    println!("{}", pretty_table(&["Date", "Amount", ""], rows));
    Ok(())
}
