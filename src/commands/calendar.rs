// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::{GridCell, MonthCursor, MonthGrid, month_grid};
use crate::stats::DailyTotals;
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, pretty_table, today};
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub grid: MonthGrid,
    pub month_income: Decimal,
    pub month_expenses: Decimal,
    /// Totals for every visible cell, including neighbouring months.
    pub daily: BTreeMap<NaiveDate, DailyTotals>,
}

pub async fn calendar_view(
    store: &dyn Store,
    cursor: MonthCursor,
    today: NaiveDate,
) -> Result<CalendarView> {
    let grid = month_grid(cursor, today);
    let (Some(first), Some(last)) = (grid.cells.first(), grid.cells.last()) else {
        anyhow::bail!("empty calendar grid for {}", cursor.key());
    };
    let stats = store.statistics(first.date, last.date).await?;
    let mut month_income = Decimal::ZERO;
    let mut month_expenses = Decimal::ZERO;
    for (date, totals) in &stats.daily_data {
        if MonthCursor::from_date(*date) == cursor {
            month_income += totals.income;
            month_expenses += totals.expenses;
        }
    }
    Ok(CalendarView {
        grid,
        month_income,
        month_expenses,
        daily: stats.daily_data,
    })
}

fn cell_text(cell: &GridCell, totals: Option<&DailyTotals>) -> String {
    let mut head = match cell.month_label {
        Some(label) => format!("{} {}", label, cell.day),
        None => cell.day.to_string(),
    };
    if cell.is_today {
        head.push_str(" *");
    }
    if cell.other_month {
        head = format!("({})", head);
    }
    let mut lines = vec![head];
    if let Some(t) = totals {
        if t.income > Decimal::ZERO {
            lines.push(format!("+{}", fmt_money(&t.income)));
        }
        if t.expenses > Decimal::ZERO {
            lines.push(format!("-{}", fmt_money(&t.expenses)));
        }
    }
    lines.join("\n")
}

pub async fn handle(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let now = today();
    let cursor = match sub.get_one::<String>("month") {
        Some(m) => MonthCursor::parse(m)?,
        None => MonthCursor::from_date(now),
    };
    let view = calendar_view(store, cursor, now).await?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = view
        .grid
        .rows()
        .map(|week| {
            week.iter()
                .map(|c| cell_text(c, view.daily.get(&c.date)))
                .collect::<Vec<String>>()
        })
        .collect();
    println!("{}", view.grid.title);
    println!(
        "{}",
        pretty_table(&["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"], rows)
    );
    println!(
        "Income {}  Expenses {}  Balance {}",
        fmt_money(&view.month_income),
        fmt_money(&view.month_expenses),
        fmt_money(&(view.month_income - view.month_expenses))
    );
    Ok(())
}
