// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

use crate::calendar::{DateRange, MonthCursor, Period, last_n_days};

static MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("month regex"));

static TRACING: Once = Once::new();

/// Install the stderr subscriber. `RUST_LOG` overrides the default
/// `tallybook=warn` filter. Later calls are no-ops.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tallybook=warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn is_month_key(s: &str) -> bool {
    MONTH_RE.is_match(s)
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    if !is_month_key(s) {
        return Err(anyhow!("Invalid month '{}', expected YYYY-MM", s));
    }
    Ok(s.to_string())
}

/// Amounts entered by hand: strictly positive decimals.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = s
        .trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}'", s))?;
    if d <= Decimal::ZERO {
        return Err(anyhow!("Amount must be positive, got {}", d));
    }
    Ok(d)
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn fmt_percent(d: &Decimal) -> String {
    format!("{:.1}%", d.round_dp(1))
}

/// First and last day of a `YYYY-MM` month.
pub fn month_range(month: &str) -> Result<DateRange> {
    let cursor = MonthCursor::parse(month)?;
    Ok(DateRange {
        start: cursor.first_day(),
        end: cursor.last_day(),
    })
}

/// Resolve the shared range flags of the `stats` commands: `--from/--to`
/// wins over `--last-days`, which wins over `--period` (default monthly).
pub fn resolve_range(sub: &clap::ArgMatches, today: NaiveDate) -> Result<DateRange> {
    let from = sub.get_one::<String>("from");
    let to = sub.get_one::<String>("to");
    if from.is_some() || to.is_some() {
        let start = from
            .map(|s| parse_date(s))
            .transpose()?
            .unwrap_or(NaiveDate::MIN);
        let end = to.map(|s| parse_date(s)).transpose()?.unwrap_or(today);
        return DateRange::new(start, end);
    }
    if let Some(n) = sub.get_one::<u32>("last-days") {
        return Ok(last_n_days(today, *n));
    }
    Ok(range_period(sub)?.date_range(today))
}

pub fn range_period(sub: &clap::ArgMatches) -> Result<Period> {
    match sub.get_one::<String>("period") {
        Some(p) => p.parse(),
        None => Ok(Period::Monthly),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Horizontal bar scaled against `max`.
pub fn bar(value: Decimal, max: Decimal, width: usize) -> String {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return String::new();
    }
    let filled = (value / max * Decimal::from(width))
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(width);
    "█".repeat(filled.max(1))
}
