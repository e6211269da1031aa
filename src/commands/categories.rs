// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TransactionType::{self, Expense, Income};
use crate::models::{Category, CategoryPatch, NewCategory};
use crate::store::Store;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result, bail};

pub const DEFAULT_CATEGORIES: [(&str, TransactionType, &str); 21] = [
    ("Salary", Income, "🤑"),
    ("Part-time", Income, "💪"),
    ("Bonus", Income, "🎉"),
    ("Investment", Income, "🌱"),
    ("Red envelope", Income, "🧧"),
    ("Other income", Income, "✨"),
    ("Dining", Expense, "🍜"),
    ("Drinks", Expense, "🧋"),
    ("Transport", Expense, "🚌"),
    ("Shopping", Expense, "🛒"),
    ("Entertainment", Expense, "🎬"),
    ("Household", Expense, "🧴"),
    ("Medical", Expense, "💊"),
    ("Education", Expense, "📖"),
    ("Pets", Expense, "🐱"),
    ("Beauty", Expense, "💄"),
    ("Sports", Expense, "🏃"),
    ("Phone", Expense, "📱"),
    ("Utilities", Expense, "💡"),
    ("Rent", Expense, "🏠"),
    ("Other expense", Expense, "📝"),
];

/// Insert the default set when no categories exist. Returns how many were
/// added.
pub async fn seed_defaults(store: &dyn Store) -> Result<usize> {
    if !store.list_categories(None).await?.is_empty() {
        return Ok(0);
    }
    for (name, kind, icon) in DEFAULT_CATEGORIES {
        store
            .add_category(NewCategory {
                name: name.to_string(),
                r#type: kind,
                icon: icon.to_string(),
            })
            .await?;
    }
    tracing::info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    Ok(DEFAULT_CATEGORIES.len())
}

pub async fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").context("--name is required")?;
            let kind: TransactionType = sub
                .get_one::<String>("type")
                .context("--type is required")?
                .parse()?;
            let existing = store.list_categories(Some(kind)).await?;
            if existing.iter().any(|c| c.name == name.trim()) {
                bail!("Category '{}' already exists for {}", name.trim(), kind);
            }
            let icon = sub.get_one::<String>("icon").cloned().unwrap_or_default();
            let cat = store
                .add_category(NewCategory {
                    name: name.trim().to_string(),
                    r#type: kind,
                    icon,
                })
                .await?;
            println!("Added {} category '{}' (id {})", cat.r#type, cat.name, cat.id);
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").context("--id is required")?;
            let patch = CategoryPatch {
                name: sub.get_one::<String>("name").map(|s| s.trim().to_string()),
                r#type: sub
                    .get_one::<String>("type")
                    .map(|t| t.parse())
                    .transpose()?,
                icon: sub.get_one::<String>("icon").cloned(),
            };
            let cat = store.update_category(id, patch).await?;
            println!("Updated category {} -> {} '{}'", cat.id, cat.r#type, cat.name);
        }
        Some(("list", sub)) => {
            let kind = sub
                .get_one::<String>("type")
                .map(|t| t.parse::<TransactionType>())
                .transpose()?;
            let data = store.list_categories(kind).await?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                println!("{}", category_table(&data));
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("--id is required")?;
            store.delete_category(id).await?;
            println!("Removed category {}", id);
        }
        Some(("seed", _)) => {
            let added = seed_defaults(store).await?;
            if added == 0 {
                println!("Categories already present, nothing seeded");
            } else {
                println!("Added {} default categories", added);
            }
        }
        _ => {}
    }
    Ok(())
}

fn category_table(data: &[Category]) -> comfy_table::Table {
    let rows = data
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.icon.clone(),
                c.name.clone(),
                c.r#type.to_string(),
            ]
        })
        .collect();
    pretty_table(&["ID", "Icon", "Category", "Type"], rows)
}
