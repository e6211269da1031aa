// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistent record store: the [`Store`] contract and its SQLite backing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::init_schema;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Budget, Category, CategoryPatch, ExportDocument, ImportDocument, ImportSummary, NewCategory,
    NewTransaction, PinRecord, Transaction, TransactionPatch, TransactionType,
};
use crate::settings::validate_setting;
use crate::stats::{Statistics, compute_statistics};
use crate::utils::is_month_key;

/// Asynchronous request/response access to the record collections. Every
/// operation resolves or rejects on its own; nothing is retried.
#[async_trait]
pub trait Store: Send + Sync {
    async fn add_transaction(&self, new: NewTransaction) -> StoreResult<Transaction>;
    async fn update_transaction(&self, id: i64, patch: TransactionPatch)
    -> StoreResult<Transaction>;
    async fn delete_transaction(&self, id: i64) -> StoreResult<()>;
    async fn get_transaction(&self, id: i64) -> StoreResult<Option<Transaction>>;
    /// Newest first.
    async fn list_transactions(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> StoreResult<Vec<Transaction>>;
    /// Inclusive on both ends, ordered by date then id.
    async fn transactions_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Transaction>>;
    async fn transactions_on(&self, date: NaiveDate) -> StoreResult<Vec<Transaction>>;

    async fn list_categories(&self, kind: Option<TransactionType>) -> StoreResult<Vec<Category>>;
    async fn add_category(&self, new: NewCategory) -> StoreResult<Category>;
    async fn update_category(&self, id: i64, patch: CategoryPatch) -> StoreResult<Category>;
    async fn delete_category(&self, id: i64) -> StoreResult<()>;

    async fn get_setting(&self, key: &str) -> StoreResult<Option<Value>>;
    async fn set_setting(&self, key: &str, value: Value) -> StoreResult<()>;
    async fn all_settings(&self) -> StoreResult<BTreeMap<String, Value>>;

    /// A month without a stored budget reads as zero amount and zero goal.
    async fn get_budget(&self, month: &str) -> StoreResult<Budget>;
    async fn set_budget(&self, budget: Budget) -> StoreResult<Budget>;
    async fn all_budgets(&self) -> StoreResult<Vec<Budget>>;

    async fn get_pin(&self) -> StoreResult<Option<PinRecord>>;
    async fn set_pin(&self, hash: &str) -> StoreResult<PinRecord>;
    async fn clear_pin(&self) -> StoreResult<()>;

    /// Empties transactions, categories, settings and budgets. The PIN stays.
    async fn clear_all(&self) -> StoreResult<()>;
    async fn export_document(&self) -> StoreResult<ExportDocument>;
    /// Destructive replace of every collection in the document.
    async fn import_document(&self, doc: ImportDocument) -> StoreResult<ImportSummary>;
    /// Non-destructive bulk insert, all or nothing.
    async fn append_transactions(&self, items: Vec<NewTransaction>) -> StoreResult<usize>;

    async fn statistics(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<Statistics> {
        let txs = self.transactions_by_date_range(start, end).await?;
        Ok(compute_statistics(&txs, start, end))
    }
}

/// SQLite-backed store. The single connection is serialized behind an async
/// mutex.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> StoreResult<Self> {
        init_schema(&conn)?;
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::new(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::new(Connection::open_in_memory()?)
    }
}

const TX_COLUMNS: &str = "id, date, type, amount, category, note, created_at";

fn stamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_stamp(s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StoreError::invalid(format!("bad timestamp '{}': {}", s, e)))
}

fn parse_amount(s: &str) -> StoreResult<Decimal> {
    Decimal::from_str(s).map_err(|e| StoreError::invalid(format!("bad amount '{}': {}", s, e)))
}

fn clean_note(note: Option<String>) -> Option<String> {
    note.filter(|n| !n.trim().is_empty())
}

fn check_transaction(amount: Decimal, category: &str) -> StoreResult<()> {
    if amount <= Decimal::ZERO {
        return Err(StoreError::invalid(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    if category.trim().is_empty() {
        return Err(StoreError::invalid("category must not be empty"));
    }
    Ok(())
}

struct RawTransaction {
    id: i64,
    date: NaiveDate,
    kind: String,
    amount: String,
    category: String,
    note: Option<String>,
    created_at: String,
}

impl RawTransaction {
    fn decode(self) -> StoreResult<Transaction> {
        Ok(Transaction {
            id: self.id,
            date: self.date,
            r#type: self.kind.parse()?,
            amount: parse_amount(&self.amount)?,
            category: self.category,
            note: self.note,
            created_at: parse_stamp(&self.created_at)?,
        })
    }
}

fn read_transactions<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> StoreResult<Vec<Transaction>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |r| {
        Ok(RawTransaction {
            id: r.get(0)?,
            date: r.get(1)?,
            kind: r.get(2)?,
            amount: r.get(3)?,
            category: r.get(4)?,
            note: r.get(5)?,
            created_at: r.get(6)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.decode()?);
    }
    Ok(out)
}

fn fetch_transaction(conn: &Connection, id: i64) -> StoreResult<Option<Transaction>> {
    let sql = format!("SELECT {} FROM transactions WHERE id=?1", TX_COLUMNS);
    Ok(read_transactions(conn, &sql, params![id])?.pop())
}

fn insert_transaction(conn: &Connection, new: NewTransaction) -> StoreResult<Transaction> {
    check_transaction(new.amount, &new.category)?;
    let created = new.created_at.unwrap_or_else(Utc::now);
    conn.execute(
        "INSERT INTO transactions(date, type, amount, category, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.date,
            new.r#type.as_str(),
            new.amount.to_string(),
            new.category,
            clean_note(new.note),
            stamp(&created)
        ],
    )?;
    let id = conn.last_insert_rowid();
    fetch_transaction(conn, id)?.ok_or(StoreError::NotFound {
        kind: "transaction",
        id,
    })
}

fn read_categories<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> StoreResult<Vec<Category>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, kind, icon) = row?;
        out.push(Category {
            id,
            name,
            r#type: kind.parse()?,
            icon,
        });
    }
    Ok(out)
}

fn fetch_category(conn: &Connection, id: i64) -> StoreResult<Option<Category>> {
    Ok(read_categories(
        conn,
        "SELECT id, name, type, icon FROM categories WHERE id=?1",
        params![id],
    )?
    .pop())
}

fn insert_category(conn: &Connection, new: NewCategory) -> StoreResult<Category> {
    if new.name.trim().is_empty() {
        return Err(StoreError::invalid("category name must not be empty"));
    }
    conn.execute(
        "INSERT INTO categories(name, type, icon) VALUES (?1, ?2, ?3)",
        params![new.name, new.r#type.as_str(), new.icon],
    )?;
    Ok(Category {
        id: conn.last_insert_rowid(),
        name: new.name,
        r#type: new.r#type,
        icon: new.icon,
    })
}

fn write_setting(conn: &Connection, key: &str, value: &Value) -> StoreResult<()> {
    validate_setting(key, value)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, serde_json::to_string(value)?],
    )?;
    Ok(())
}

fn read_settings(conn: &Connection) -> StoreResult<BTreeMap<String, Value>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut out = BTreeMap::new();
    for row in rows {
        let (k, v) = row?;
        out.insert(k, serde_json::from_str(&v)?);
    }
    Ok(out)
}

fn write_budget(conn: &Connection, budget: &Budget) -> StoreResult<()> {
    if !is_month_key(&budget.month) {
        return Err(StoreError::invalid(format!(
            "budget month '{}' is not YYYY-MM",
            budget.month
        )));
    }
    if budget.amount < Decimal::ZERO || budget.savings_goal < Decimal::ZERO {
        return Err(StoreError::invalid(format!(
            "budget for {} must not be negative",
            budget.month
        )));
    }
    conn.execute(
        "INSERT INTO budgets(month, amount, savings_goal) VALUES (?1, ?2, ?3)
         ON CONFLICT(month) DO UPDATE SET amount=excluded.amount, savings_goal=excluded.savings_goal",
        params![
            budget.month,
            budget.amount.to_string(),
            budget.savings_goal.to_string()
        ],
    )?;
    Ok(())
}

fn read_budgets<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> StoreResult<Vec<Budget>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (month, amount, goal) = row?;
        out.push(Budget {
            month,
            amount: parse_amount(&amount)?,
            savings_goal: parse_amount(&goal)?,
        });
    }
    Ok(out)
}

fn clear_collections(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "DELETE FROM transactions;
         DELETE FROM categories;
         DELETE FROM settings;
         DELETE FROM budgets;",
    )?;
    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    async fn add_transaction(&self, new: NewTransaction) -> StoreResult<Transaction> {
        let conn = self.conn.lock().await;
        let tx = insert_transaction(&conn, new)?;
        tracing::debug!(id = tx.id, date = %tx.date, "added transaction");
        Ok(tx)
    }

    async fn update_transaction(
        &self,
        id: i64,
        patch: TransactionPatch,
    ) -> StoreResult<Transaction> {
        let conn = self.conn.lock().await;
        let mut tx = fetch_transaction(&conn, id)?.ok_or(StoreError::NotFound {
            kind: "transaction",
            id,
        })?;
        patch.apply(&mut tx);
        tx.note = clean_note(tx.note.take());
        check_transaction(tx.amount, &tx.category)?;
        conn.execute(
            "UPDATE transactions SET date=?1, type=?2, amount=?3, category=?4, note=?5 WHERE id=?6",
            params![
                tx.date,
                tx.r#type.as_str(),
                tx.amount.to_string(),
                tx.category,
                tx.note,
                id
            ],
        )?;
        tracing::debug!(id, "updated transaction");
        Ok(tx)
    }

    async fn delete_transaction(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(StoreError::NotFound {
                kind: "transaction",
                id,
            });
        }
        tracing::debug!(id, "deleted transaction");
        Ok(())
    }

    async fn get_transaction(&self, id: i64) -> StoreResult<Option<Transaction>> {
        let conn = self.conn.lock().await;
        fetch_transaction(&conn, id)
    }

    async fn list_transactions(
        &self,
        limit: Option<usize>,
        offset: usize,
    ) -> StoreResult<Vec<Transaction>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {} FROM transactions ORDER BY date DESC, id DESC LIMIT ?1 OFFSET ?2",
            TX_COLUMNS
        );
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        read_transactions(&conn, &sql, params![limit, offset as i64])
    }

    async fn transactions_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Transaction>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {} FROM transactions WHERE date>=?1 AND date<=?2 ORDER BY date, id",
            TX_COLUMNS
        );
        read_transactions(&conn, &sql, params![start, end])
    }

    async fn transactions_on(&self, date: NaiveDate) -> StoreResult<Vec<Transaction>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {} FROM transactions WHERE date=?1 ORDER BY id",
            TX_COLUMNS
        );
        read_transactions(&conn, &sql, params![date])
    }

    async fn list_categories(&self, kind: Option<TransactionType>) -> StoreResult<Vec<Category>> {
        let conn = self.conn.lock().await;
        match kind {
            Some(k) => read_categories(
                &conn,
                "SELECT id, name, type, icon FROM categories WHERE type=?1 ORDER BY id",
                params![k.as_str()],
            ),
            None => read_categories(
                &conn,
                "SELECT id, name, type, icon FROM categories ORDER BY id",
                [],
            ),
        }
    }

    async fn add_category(&self, new: NewCategory) -> StoreResult<Category> {
        let conn = self.conn.lock().await;
        let cat = insert_category(&conn, new)?;
        tracing::debug!(id = cat.id, name = %cat.name, "added category");
        Ok(cat)
    }

    async fn update_category(&self, id: i64, patch: CategoryPatch) -> StoreResult<Category> {
        let conn = self.conn.lock().await;
        let mut cat = fetch_category(&conn, id)?.ok_or(StoreError::NotFound {
            kind: "category",
            id,
        })?;
        if let Some(name) = patch.name {
            cat.name = name;
        }
        if let Some(kind) = patch.r#type {
            cat.r#type = kind;
        }
        if let Some(icon) = patch.icon {
            cat.icon = icon;
        }
        if cat.name.trim().is_empty() {
            return Err(StoreError::invalid("category name must not be empty"));
        }
        conn.execute(
            "UPDATE categories SET name=?1, type=?2, icon=?3 WHERE id=?4",
            params![cat.name, cat.r#type.as_str(), cat.icon, id],
        )?;
        Ok(cat)
    }

    async fn delete_category(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let n = conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(StoreError::NotFound {
                kind: "category",
                id,
            });
        }
        tracing::debug!(id, "deleted category");
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<Value>> {
        let conn = self.conn.lock().await;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()?;
        match raw {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    async fn set_setting(&self, key: &str, value: Value) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        write_setting(&conn, key, &value)?;
        tracing::debug!(key, "stored setting");
        Ok(())
    }

    async fn all_settings(&self) -> StoreResult<BTreeMap<String, Value>> {
        let conn = self.conn.lock().await;
        read_settings(&conn)
    }

    async fn get_budget(&self, month: &str) -> StoreResult<Budget> {
        let conn = self.conn.lock().await;
        let found = read_budgets(
            &conn,
            "SELECT month, amount, savings_goal FROM budgets WHERE month=?1",
            params![month],
        )?
        .pop();
        Ok(found.unwrap_or_else(|| Budget::empty(month)))
    }

    async fn set_budget(&self, budget: Budget) -> StoreResult<Budget> {
        let conn = self.conn.lock().await;
        write_budget(&conn, &budget)?;
        tracing::debug!(month = %budget.month, "stored budget");
        Ok(budget)
    }

    async fn all_budgets(&self) -> StoreResult<Vec<Budget>> {
        let conn = self.conn.lock().await;
        read_budgets(
            &conn,
            "SELECT month, amount, savings_goal FROM budgets ORDER BY month",
            [],
        )
    }

    async fn get_pin(&self) -> StoreResult<Option<PinRecord>> {
        let conn = self.conn.lock().await;
        let raw: Option<(String, String)> = conn
            .query_row("SELECT hash, created_at FROM pin WHERE id=1", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .optional()?;
        match raw {
            Some((hash, created)) => Ok(Some(PinRecord {
                hash,
                created_at: parse_stamp(&created)?,
            })),
            None => Ok(None),
        }
    }

    async fn set_pin(&self, hash: &str) -> StoreResult<PinRecord> {
        if hash.trim().is_empty() {
            return Err(StoreError::invalid("PIN hash must not be empty"));
        }
        let conn = self.conn.lock().await;
        let created = stamp(&Utc::now());
        conn.execute(
            "INSERT INTO pin(id, hash, created_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET hash=excluded.hash, created_at=excluded.created_at",
            params![hash, created],
        )?;
        Ok(PinRecord {
            hash: hash.to_string(),
            created_at: parse_stamp(&created)?,
        })
    }

    async fn clear_pin(&self) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM pin", [])?;
        Ok(())
    }

    async fn clear_all(&self) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        clear_collections(&conn)?;
        tracing::info!("cleared all collections");
        Ok(())
    }

    async fn export_document(&self) -> StoreResult<ExportDocument> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {} FROM transactions ORDER BY date, id", TX_COLUMNS);
        let transactions = read_transactions(&conn, &sql, [])?;
        let categories = read_categories(
            &conn,
            "SELECT id, name, type, icon FROM categories ORDER BY id",
            [],
        )?;
        let settings = read_settings(&conn)?;
        let budgets = read_budgets(
            &conn,
            "SELECT month, amount, savings_goal FROM budgets ORDER BY month",
            [],
        )?;
        Ok(ExportDocument {
            transactions,
            categories,
            settings,
            budgets,
            exported_at: Utc::now(),
        })
    }

    async fn import_document(&self, doc: ImportDocument) -> StoreResult<ImportSummary> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        clear_collections(&tx)?;
        let mut summary = ImportSummary::default();
        for t in doc.transactions {
            insert_transaction(&tx, t)?;
            summary.transactions += 1;
        }
        for c in doc.categories {
            insert_category(&tx, c)?;
            summary.categories += 1;
        }
        for (k, v) in &doc.settings {
            write_setting(&tx, k, v)?;
            summary.settings += 1;
        }
        for b in &doc.budgets {
            write_budget(&tx, b)?;
            summary.budgets += 1;
        }
        tx.commit()?;
        tracing::info!(
            transactions = summary.transactions,
            categories = summary.categories,
            settings = summary.settings,
            budgets = summary.budgets,
            "imported backup"
        );
        Ok(summary)
    }

    async fn append_transactions(&self, items: Vec<NewTransaction>) -> StoreResult<usize> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let mut n = 0;
        for item in items {
            insert_transaction(&tx, item)?;
            n += 1;
        }
        tx.commit()?;
        tracing::info!(count = n, "appended transactions");
        Ok(n)
    }
}
