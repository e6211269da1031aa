// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tallybook::calendar::{DateRange, MonthCursor, Period};
use tallybook::commands::{calendar, reports};
use tallybook::models::{NewTransaction, TransactionType};
use tallybook::store::{SqliteStore, Store};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tx(date: &str, kind: TransactionType, amount: &str, cat: &str) -> NewTransaction {
    NewTransaction {
        date: day(date),
        r#type: kind,
        amount: d(amount),
        category: cat.into(),
        note: None,
        created_at: None,
    }
}

async fn march() -> SqliteStore {
    use TransactionType::*;
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .append_transactions(vec![
            tx("2024-02-29", Expense, "5", "Dining"),
            tx("2024-03-01", Income, "100", "Salary"),
            tx("2024-03-01", Expense, "30", "Dining"),
            tx("2024-03-17", Expense, "20", "Transport"),
            tx("2024-03-30", Expense, "10", "Dining"),
            tx("2024-04-02", Expense, "7", "Rent"),
        ])
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn summary_uses_inclusive_range() {
    let store = march().await;
    let range = DateRange::new(day("2024-03-01"), day("2024-03-31")).unwrap();
    let s = reports::summary_for(&store, range).await.unwrap();
    assert_eq!(s.total_income, d("100"));
    assert_eq!(s.total_expenses, d("60"));
    assert_eq!(s.balance, d("40"));
    assert_eq!(s.days_with_activity, 3);
}

#[tokio::test]
async fn shares_rank_categories() {
    let store = march().await;
    let range = Period::Monthly.date_range(day("2024-03-17"));
    let shares = reports::shares_for(&store, range, TransactionType::Expense)
        .await
        .unwrap();
    let names: Vec<&str> = shares.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(names, vec!["Dining", "Transport"]);
    assert_eq!(shares[0].amount, d("40"));
    assert_eq!(shares[0].percentage.round_dp(2), d("66.67"));
}

#[tokio::test]
async fn monthly_chart_folds_late_days_into_last_week() {
    let store = march().await;
    let chart = reports::chart_for(&store, Period::Monthly, day("2024-03-17"))
        .await
        .unwrap();
    assert_eq!(chart.labels, vec!["Week 1", "Week 2", "Week 3", "Week 4"]);
    assert_eq!(chart.income, vec![d("100"), d("0"), d("0"), d("0")]);
    assert_eq!(chart.expenses, vec![d("30"), d("0"), d("20"), d("10")]);
}

#[tokio::test]
async fn weekly_chart_starts_on_sunday() {
    let store = march().await;
    // week of Sunday 2024-03-17
    let chart = reports::chart_for(&store, Period::Weekly, day("2024-03-20"))
        .await
        .unwrap();
    assert_eq!(chart.range.start, day("2024-03-17"));
    assert_eq!(chart.expenses[0], d("20"));
    assert_eq!(chart.expenses.iter().copied().sum::<Decimal>(), d("20"));
}

#[tokio::test]
async fn category_detail_over_range() {
    let store = march().await;
    let range = DateRange::new(day("2024-02-01"), day("2024-03-31")).unwrap();
    let detail = reports::detail_for(&store, range, "Dining", TransactionType::Expense)
        .await
        .unwrap();
    assert_eq!(detail.count, 3);
    assert_eq!(detail.total, d("45"));
    assert_eq!(detail.average, d("15"));
    assert_eq!(detail.trend.len(), 3);
}

#[tokio::test]
async fn calendar_view_totals_only_the_month() {
    let store = march().await;
    let cursor = MonthCursor::new(2024, 2).unwrap();
    let view = calendar::calendar_view(&store, cursor, day("2024-03-17"))
        .await
        .unwrap();
    assert_eq!(view.grid.title, "March 2024");
    assert_eq!(view.month_income, d("100"));
    assert_eq!(view.month_expenses, d("60"));
    // neighbouring days in the grid still carry their totals
    assert_eq!(view.daily[&day("2024-02-29")].expenses, d("5"));
    assert_eq!(view.daily[&day("2024-04-02")].expenses, d("7"));
    let today: Vec<NaiveDate> = view
        .grid
        .cells
        .iter()
        .filter(|c| c.is_today)
        .map(|c| c.date)
        .collect();
    assert_eq!(today, vec![day("2024-03-17")]);
}
