// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings::{AppSettings, CLOUD_SYNC, PIN_LOCK, is_known_key, parse_setting_value};
use crate::store::Store;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result, bail};
use serde_json::Value;

pub async fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let all = store.all_settings().await?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &all)? {
                return Ok(());
            }
            let rows = all
                .iter()
                .map(|(k, v)| {
                    let note = if is_known_key(k) { "" } else { "unknown key" };
                    vec![k.clone(), v.to_string(), note.to_string()]
                })
                .collect();
            println!("{}", pretty_table(&["Key", "Value", ""], rows));
            let typed = AppSettings::from_map(&all);
            if typed.cloud_sync && !typed.cloud_sync_configured() {
                println!("cloudSync is on but supabaseUrl/supabaseKey are missing");
            }
        }
        Some(("get", sub)) => {
            let key = sub.get_one::<String>("key").context("--key is required")?;
            match store.get_setting(key).await? {
                Some(v) => println!("{}", v),
                None => bail!("Setting '{}' is not set", key),
            }
        }
        Some(("set", sub)) => {
            let key = sub
                .get_one::<String>("key")
                .context("--key is required")?
                .trim();
            let raw = sub.get_one::<String>("value").context("--value is required")?;
            if key == PIN_LOCK {
                bail!("Use `pin set` / `pin clear` to change {}", PIN_LOCK);
            }
            let value = parse_setting_value(key, raw);
            if !is_known_key(key) {
                tracing::warn!(key, "storing unknown setting key");
            }
            store.set_setting(key, value.clone()).await?;
            if key == CLOUD_SYNC && value == Value::Bool(true) {
                println!("Note: cloud sync is recorded as a preference only");
            }
            println!("{} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
