// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use clap::ArgMatches;

use crate::pin;
use crate::store::Store;

pub mod budgets;
pub mod calendar;
pub mod categories;
pub mod doctor;
pub mod exporter;
pub mod importer;
pub mod pin_lock;
pub mod reports;
pub mod settings;
pub mod transactions;

/// Commands reachable while the book is locked.
fn bypasses_lock(matches: &ArgMatches) -> bool {
    match matches.subcommand() {
        Some(("init", _)) => true,
        Some(("pin", sub)) => matches!(sub.subcommand_name(), Some("status" | "unlock")),
        _ => false,
    }
}

/// Dispatch a parsed command line. Returns `false` when no subcommand was
/// given.
pub async fn run(store: &dyn Store, matches: &ArgMatches) -> Result<bool> {
    if !bypasses_lock(matches) {
        let supplied = matches.get_one::<String>("pin").map(String::as_str);
        pin::check_unlock(store, supplied).await?;
    }

    match matches.subcommand() {
        Some(("init", _)) => {
            let added = categories::seed_defaults(store).await?;
            if added > 0 {
                println!("Added {} default categories", added);
            }
        }
        Some(("tx", sub)) => transactions::handle(store, sub).await?,
        Some(("category", sub)) => categories::handle(store, sub).await?,
        Some(("budget", sub)) => budgets::handle(store, sub).await?,
        Some(("stats", sub)) => reports::handle(store, sub).await?,
        Some(("calendar", sub)) => calendar::handle(store, sub).await?,
        Some(("settings", sub)) => settings::handle(store, sub).await?,
        Some(("pin", sub)) => pin_lock::handle(store, sub, matches).await?,
        Some(("export", sub)) => exporter::handle(store, sub).await?,
        Some(("import", sub)) => importer::handle(store, sub).await?,
        Some(("doctor", _)) => doctor::handle(store).await?,
        _ => return Ok(false),
    }
    Ok(true)
}
