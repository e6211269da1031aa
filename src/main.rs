// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use tallybook::store::SqliteStore;
use tallybook::{cli, commands, db, utils};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    utils::init_tracing();
    let matches = cli::build_cli().get_matches();

    let store = SqliteStore::new(db::open_or_init()?)?;

    if let Some(("init", _)) = matches.subcommand() {
        println!("Database initialized at {}", db::db_path()?.display());
    }
    if !commands::run(&store, &matches).await? {
        cli::build_cli().print_help()?;
        println!();
    }
    Ok(())
}
