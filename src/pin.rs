// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local PIN lock. The PIN itself is never stored, only its SHA-256 digest.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::error::StoreError;
use crate::settings::{AppSettings, PIN_LOCK};
use crate::store::Store;

static PIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4,6}$").expect("valid regex"));

#[derive(Debug, Error)]
pub enum PinError {
    #[error("PIN must be 4 to 6 digits")]
    InvalidFormat,
    #[error("new PIN and confirmation do not match")]
    Mismatch,
    #[error("incorrect PIN")]
    WrongPin,
    #[error("no PIN is set")]
    NotSet,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn validate_pin(pin: &str) -> Result<(), PinError> {
    if PIN_RE.is_match(pin) {
        Ok(())
    } else {
        Err(PinError::InvalidFormat)
    }
}

/// Lowercase hex SHA-256 of the PIN's UTF-8 bytes.
pub fn hash_pin(pin: &str) -> String {
    hex::encode(Sha256::digest(pin.as_bytes()))
}

pub fn verify_pin(pin: &str, hash: &str) -> bool {
    hash_pin(pin).eq_ignore_ascii_case(hash)
}

/// Store the PIN and switch the lock on.
pub async fn enable(store: &dyn Store, pin: &str, confirm: &str) -> Result<(), PinError> {
    validate_pin(pin)?;
    if pin != confirm {
        return Err(PinError::Mismatch);
    }
    store.set_pin(&hash_pin(pin)).await?;
    store.set_setting(PIN_LOCK, Value::Bool(true)).await?;
    tracing::info!("PIN lock enabled");
    Ok(())
}

pub async fn disable(store: &dyn Store) -> Result<(), PinError> {
    store.clear_pin().await?;
    store.set_setting(PIN_LOCK, Value::Bool(false)).await?;
    tracing::info!("PIN lock disabled");
    Ok(())
}

pub async fn change(
    store: &dyn Store,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<(), PinError> {
    let record = store.get_pin().await?.ok_or(PinError::NotSet)?;
    if !verify_pin(current, &record.hash) {
        return Err(PinError::WrongPin);
    }
    validate_pin(new)?;
    if new != confirm {
        return Err(PinError::Mismatch);
    }
    store.set_pin(&hash_pin(new)).await?;
    tracing::info!("PIN changed");
    Ok(())
}

/// Whether the lock is engaged: `pinLock` on and a PIN on record.
pub async fn is_locked(store: &dyn Store) -> Result<bool, PinError> {
    let settings = AppSettings::from_map(&store.all_settings().await?);
    Ok(settings.pin_lock && store.get_pin().await?.is_some())
}

/// Passes when the lock is not engaged or `pin` matches the stored digest.
pub async fn check_unlock(store: &dyn Store, pin: Option<&str>) -> Result<(), PinError> {
    if !is_locked(store).await? {
        return Ok(());
    }
    let record = store.get_pin().await?.ok_or(PinError::NotSet)?;
    match pin {
        Some(p) if verify_pin(p, &record.hash) => Ok(()),
        _ => {
            tracing::warn!("rejected PIN attempt");
            Err(PinError::WrongPin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    #[test]
    fn format_is_four_to_six_digits() {
        for ok in ["1234", "00000", "987654"] {
            assert!(validate_pin(ok).is_ok(), "{ok}");
        }
        for bad in ["12a4", "123", "1234567", "", " 1234", "１２３４"] {
            assert!(matches!(validate_pin(bad), Err(PinError::InvalidFormat)), "{bad}");
        }
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            hash_pin("1234"),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
        assert!(verify_pin("1234", &hash_pin("1234")));
        assert!(!verify_pin("4321", &hash_pin("1234")));
    }

    #[tokio::test]
    async fn lock_lifecycle() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(check_unlock(&store, None).await.is_ok());

        assert!(matches!(
            enable(&store, "1234", "1235").await,
            Err(PinError::Mismatch)
        ));
        enable(&store, "1234", "1234").await.unwrap();
        assert!(is_locked(&store).await.unwrap());
        assert!(check_unlock(&store, None).await.is_err());
        assert!(check_unlock(&store, Some("0000")).await.is_err());
        check_unlock(&store, Some("1234")).await.unwrap();

        assert!(matches!(
            change(&store, "9999", "5678", "5678").await,
            Err(PinError::WrongPin)
        ));
        change(&store, "1234", "5678", "5678").await.unwrap();
        check_unlock(&store, Some("5678")).await.unwrap();

        disable(&store).await.unwrap();
        assert!(!is_locked(&store).await.unwrap());
        assert!(check_unlock(&store, None).await.is_ok());
    }
}
