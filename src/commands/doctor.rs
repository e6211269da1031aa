// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TransactionType;
use crate::settings::{AppSettings, is_known_key};
use crate::store::Store;
use crate::utils::pretty_table;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub async fn diagnose(store: &dyn Store) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    // 1) Transactions pointing at a category name that no longer exists
    let known: BTreeSet<(String, TransactionType)> = store
        .list_categories(None)
        .await?
        .into_iter()
        .map(|c| (c.name, c.r#type))
        .collect();
    let mut orphans: BTreeSet<(String, TransactionType)> = BTreeSet::new();
    for t in store.list_transactions(None, 0).await? {
        let key = (t.category, t.r#type);
        if !known.contains(&key) {
            orphans.insert(key);
        }
    }
    for (name, kind) in orphans {
        issues.push(Issue {
            kind: "orphaned_category",
            detail: format!("{} '{}'", kind, name),
        });
    }

    // 2) Settings
    let settings = store.all_settings().await?;
    for key in settings.keys().filter(|k| !is_known_key(k)) {
        issues.push(Issue {
            kind: "unknown_setting",
            detail: key.clone(),
        });
    }
    if AppSettings::from_map(&settings).pin_lock && store.get_pin().await?.is_none() {
        issues.push(Issue {
            kind: "pin_lock_without_pin",
            detail: "pinLock is on but no PIN is stored".into(),
        });
    }

    Ok(issues)
}

pub async fn handle(store: &dyn Store) -> Result<()> {
    let issues = diagnose(store).await?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
