// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use tallybook::models::{Budget, NewTransaction, TransactionType};
use tallybook::store::{SqliteStore, Store};
use tallybook::{cli, commands::exporter};
use tempfile::tempdir;

async fn seeded() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .add_transaction(NewTransaction {
            date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            r#type: TransactionType::Expense,
            amount: "12.34".parse().unwrap(),
            category: "Shopping".into(),
            note: Some("Weekly run, corner shop".into()),
            created_at: None,
        })
        .await
        .unwrap();
    store
        .set_budget(Budget {
            month: "2025-01".into(),
            amount: Decimal::from(500),
            savings_goal: Decimal::ZERO,
        })
        .await
        .unwrap();
    store.set_setting("dailyReminder", json!(true)).await.unwrap();
    store
}

async fn run_export(store: &SqliteStore, fmt: &str, out: &str) -> anyhow::Result<()> {
    let matches =
        cli::build_cli().get_matches_from(["tallybook", "export", "--format", fmt, "--out", out]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(store, export_m).await
    } else {
        panic!("no export subcommand");
    }
}

#[tokio::test]
async fn export_writes_camel_case_backup_with_numeric_amounts() {
    let store = seeded().await;
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("backup.json");
    run_export(&store, "json", &out_path.to_string_lossy())
        .await
        .unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let tx = &parsed["transactions"][0];
    assert_eq!(tx["date"], json!("2025-01-02"));
    assert_eq!(tx["type"], json!("expense"));
    assert_eq!(tx["amount"], json!(12.34));
    assert!(tx["createdAt"].is_string());
    assert_eq!(parsed["budgets"][0]["savingsGoal"], json!(0));
    assert_eq!(parsed["settings"]["dailyReminder"], json!(true));
    assert!(parsed["exportedAt"].is_string());
    assert_eq!(parsed["categories"], json!([]));
}

#[tokio::test]
async fn export_csv_quotes_notes() {
    let store = seeded().await;
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("tx.csv");
    run_export(&store, "CSV", &out_path.to_string_lossy())
        .await
        .unwrap();
    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("date,type,amount,category,note"));
    assert_eq!(
        lines.next(),
        Some("2025-01-02,expense,12.34,Shopping,\"Weekly run, corner shop\"")
    );
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn export_rejects_unknown_format() {
    let store = seeded().await;
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    assert!(
        run_export(&store, "xml", &out_path.to_string_lossy())
            .await
            .is_err()
    );
    assert!(!out_path.exists());
}
