// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Budget;
use crate::stats::BudgetProgress;
use crate::store::Store;
use crate::utils::{
    bar, fmt_money, fmt_percent, maybe_print_json, month_range, parse_decimal, parse_month,
    pretty_table, today,
};
use anyhow::{Result, bail};
use rust_decimal::Decimal;
use serde::Serialize;

pub async fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(store, sub).await?,
        Some(("show", sub)) => show(store, sub).await?,
        Some(("progress", sub)) => progress(store, sub).await?,
        _ => {}
    }
    Ok(())
}

fn month_arg(sub: &clap::ArgMatches) -> Result<String> {
    match sub.get_one::<String>("month") {
        Some(m) => parse_month(m),
        None => Ok(today().format("%Y-%m").to_string()),
    }
}

fn non_negative(raw: &str, what: &str) -> Result<Decimal> {
    let d = parse_decimal(raw)?;
    if d < Decimal::ZERO {
        bail!("{} must not be negative, got {}", what, d);
    }
    Ok(d)
}

async fn set(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_arg(sub)?;
    let mut budget = store.get_budget(&month).await?;
    if let Some(a) = sub.get_one::<String>("amount") {
        budget.amount = non_negative(a, "Budget")?;
    }
    if let Some(g) = sub.get_one::<String>("savings-goal") {
        budget.savings_goal = non_negative(g, "Savings goal")?;
    }
    let saved = store.set_budget(budget).await?;
    println!(
        "Budget for {} = {} (savings goal {})",
        saved.month,
        fmt_money(&saved.amount),
        fmt_money(&saved.savings_goal)
    );
    Ok(())
}

async fn show(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let data: Vec<Budget> = match sub.get_one::<String>("month") {
        Some(m) => vec![store.get_budget(&parse_month(m)?).await?],
        None => store.all_budgets().await?,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|b| {
                vec![
                    b.month.clone(),
                    fmt_money(&b.amount),
                    fmt_money(&b.savings_goal),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Budget", "Savings goal"], rows)
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthProgress {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
    /// Income minus expenses for the month.
    pub saved: Decimal,
    pub savings_goal: Decimal,
    pub budget: Option<BudgetProgress>,
}

/// Spending and saving for a `YYYY-MM` month, measured over the month's
/// real first and last day.
pub async fn month_progress(store: &dyn Store, month: &str) -> Result<MonthProgress> {
    let month = parse_month(month)?;
    let range = month_range(&month)?;
    let stats = store.statistics(range.start, range.end).await?;
    let budget = store.get_budget(&month).await?;
    Ok(MonthProgress {
        income: stats.total_income,
        expenses: stats.total_expenses,
        saved: stats.balance(),
        savings_goal: budget.savings_goal,
        budget: BudgetProgress::compute(&budget, stats.total_expenses),
        month,
    })
}

async fn progress(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let report = month_progress(store, &month_arg(sub)?).await?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let mut rows = vec![
        vec!["Income".to_string(), fmt_money(&report.income), String::new()],
        vec![
            "Expenses".to_string(),
            fmt_money(&report.expenses),
            String::new(),
        ],
    ];
    match &report.budget {
        Some(p) => {
            rows.push(vec!["Budget".into(), fmt_money(&p.budget), String::new()]);
            rows.push(vec![
                "Remaining".into(),
                fmt_money(&p.remaining),
                if p.over_budget {
                    "over budget".into()
                } else {
                    String::new()
                },
            ]);
            rows.push(vec![
                "Used".into(),
                fmt_percent(&p.percentage),
                bar(p.capped_percentage(), Decimal::ONE_HUNDRED, 20),
            ]);
        }
        None => rows.push(vec!["Budget".into(), "not set".into(), String::new()]),
    }
    if report.savings_goal > Decimal::ZERO {
        let pct = report.saved.max(Decimal::ZERO) / report.savings_goal * Decimal::ONE_HUNDRED;
        rows.push(vec![
            "Saved".into(),
            fmt_money(&report.saved),
            format!("goal {} ({})", fmt_money(&report.savings_goal), fmt_percent(&pct)),
        ]);
    }
    println!("{}", report.month);
    println!("{}", pretty_table(&["", "Amount", ""], rows));
    Ok(())
}
