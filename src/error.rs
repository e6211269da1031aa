// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced by the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("malformed JSON value: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StoreError::InvalidRecord(msg.into())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
