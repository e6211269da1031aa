// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::pin;
use crate::store::Store;
use anyhow::{Context, Result};

/// `root` carries the global `--pin` used by `unlock`.
pub async fn handle(store: &dyn Store, m: &clap::ArgMatches, root: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let new = sub.get_one::<String>("new").context("--new is required")?;
            let confirm = sub
                .get_one::<String>("confirm")
                .context("--confirm is required")?;
            pin::enable(store, new, confirm).await?;
            println!("PIN lock enabled");
        }
        Some(("change", sub)) => {
            let current = sub
                .get_one::<String>("current")
                .context("--current is required")?;
            let new = sub.get_one::<String>("new").context("--new is required")?;
            let confirm = sub
                .get_one::<String>("confirm")
                .context("--confirm is required")?;
            pin::change(store, current, new, confirm).await?;
            println!("PIN changed");
        }
        Some(("clear", _)) => {
            pin::disable(store).await?;
            println!("PIN lock disabled");
        }
        Some(("unlock", _)) => {
            let supplied = root.get_one::<String>("pin").map(String::as_str);
            pin::check_unlock(store, supplied).await?;
            println!("Unlocked");
        }
        Some(("status", _)) => {
            let locked = pin::is_locked(store).await?;
            match store.get_pin().await? {
                Some(rec) if locked => println!("Locked (PIN set {})", rec.created_at),
                Some(_) => println!("PIN stored but lock is off"),
                None => println!("No PIN set"),
            }
        }
        _ => {}
    }
    Ok(())
}
