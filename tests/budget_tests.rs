// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tallybook::models::{NewTransaction, TransactionType};
use tallybook::store::{SqliteStore, Store};
use tallybook::{cli, commands::budgets};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn tx(date: &str, kind: TransactionType, amount: &str) -> NewTransaction {
    NewTransaction {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        r#type: kind,
        amount: d(amount),
        category: "Misc".into(),
        note: None,
        created_at: None,
    }
}

async fn run_budget(store: &SqliteStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["tallybook", "budget"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("budget", b_m)) = matches.subcommand() {
        budgets::handle(store, b_m).await
    } else {
        panic!("budget command not parsed");
    }
}

#[tokio::test]
async fn set_updates_only_supplied_fields() {
    let store = SqliteStore::open_in_memory().unwrap();
    run_budget(&store, &["set", "--month", " 2024-02 ", "--amount", "100"])
        .await
        .unwrap();
    run_budget(&store, &["set", "--month", "2024-02", "--savings-goal", "50.00"])
        .await
        .unwrap();
    let b = store.get_budget("2024-02").await.unwrap();
    assert_eq!(b.amount, d("100"));
    assert_eq!(b.savings_goal, d("50"));
}

#[tokio::test]
async fn set_rejects_negative_and_bad_month() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(
        run_budget(&store, &["set", "--month", "2024-02", "--amount", "-1"])
            .await
            .is_err()
    );
    assert!(
        run_budget(&store, &["set", "--month", "2024-2", "--amount", "1"])
            .await
            .is_err()
    );
    assert!(store.all_budgets().await.unwrap().is_empty());
}

#[tokio::test]
async fn progress_covers_whole_leap_month() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .append_transactions(vec![
            tx("2024-02-01", TransactionType::Income, "200"),
            tx("2024-02-29", TransactionType::Expense, "120"),
            tx("2024-03-01", TransactionType::Expense, "999"),
        ])
        .await
        .unwrap();
    run_budget(
        &store,
        &["set", "--month", "2024-02", "--amount", "100", "--savings-goal", "50"],
    )
    .await
    .unwrap();

    let report = budgets::month_progress(&store, "2024-02").await.unwrap();
    assert_eq!(report.expenses, d("120"));
    assert_eq!(report.saved, d("80"));
    let p = report.budget.unwrap();
    assert!(p.over_budget);
    assert_eq!(p.remaining, d("-20"));
    assert_eq!(p.percentage, d("120"));
}

#[tokio::test]
async fn progress_without_budget_has_no_ratio() {
    let store = SqliteStore::open_in_memory().unwrap();
    let report = budgets::month_progress(&store, "2025-08").await.unwrap();
    assert!(report.budget.is_none());
    assert!(report.expenses.is_zero());
}
