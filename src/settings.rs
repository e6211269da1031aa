// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Free-form key/value preferences with a typed view over the keys the app
//! understands.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};

pub const PIN_LOCK: &str = "pinLock";
pub const DAILY_REMINDER: &str = "dailyReminder";
pub const CLOUD_SYNC: &str = "cloudSync";
pub const SUPABASE_URL: &str = "supabaseUrl";
pub const SUPABASE_KEY: &str = "supabaseKey";

const BOOL_KEYS: [&str; 3] = [PIN_LOCK, DAILY_REMINDER, CLOUD_SYNC];
const STRING_KEYS: [&str; 2] = [SUPABASE_URL, SUPABASE_KEY];

pub fn is_known_key(key: &str) -> bool {
    BOOL_KEYS.contains(&key) || STRING_KEYS.contains(&key)
}

/// Reject values of the wrong JSON type for recognized keys. Unknown keys
/// accept anything.
pub fn validate_setting(key: &str, value: &Value) -> StoreResult<()> {
    if key.trim().is_empty() {
        return Err(StoreError::invalid("setting key must not be empty"));
    }
    if BOOL_KEYS.contains(&key) && !value.is_boolean() {
        return Err(StoreError::invalid(format!(
            "setting '{}' expects true or false, got {}",
            key, value
        )));
    }
    if STRING_KEYS.contains(&key) && !(value.is_string() || value.is_null()) {
        return Err(StoreError::invalid(format!(
            "setting '{}' expects a string, got {}",
            key, value
        )));
    }
    Ok(())
}

/// Interpret a command-line value. String keys take the text as given;
/// otherwise valid JSON literals (`true`, `42`, `"x"`) keep their type and
/// anything else is taken as a plain string.
pub fn parse_setting_value(key: &str, raw: &str) -> Value {
    let raw = raw.trim();
    if STRING_KEYS.contains(&key) {
        return Value::String(raw.to_string());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub pin_lock: bool,
    pub daily_reminder: bool,
    pub cloud_sync: bool,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
}

impl AppSettings {
    pub fn from_map(map: &BTreeMap<String, Value>) -> Self {
        let flag = |k: &str| map.get(k).and_then(Value::as_bool).unwrap_or(false);
        let text = |k: &str| {
            map.get(k)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };
        AppSettings {
            pin_lock: flag(PIN_LOCK),
            daily_reminder: flag(DAILY_REMINDER),
            cloud_sync: flag(CLOUD_SYNC),
            supabase_url: text(SUPABASE_URL),
            supabase_key: text(SUPABASE_KEY),
        }
    }

    /// Sync is only configured, never performed.
    pub fn cloud_sync_configured(&self) -> bool {
        self.cloud_sync && self.supabase_url.is_some() && self.supabase_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_keys_are_type_checked() {
        assert!(validate_setting(PIN_LOCK, &json!(true)).is_ok());
        assert!(validate_setting(PIN_LOCK, &json!("yes")).is_err());
        assert!(validate_setting(SUPABASE_URL, &json!("https://x.supabase.co")).is_ok());
        assert!(validate_setting(SUPABASE_KEY, &json!(12)).is_err());
        assert!(validate_setting("theme", &json!({"dark": true})).is_ok());
        assert!(validate_setting(" ", &json!(1)).is_err());
    }

    #[test]
    fn cli_values_keep_json_types() {
        assert_eq!(parse_setting_value(DAILY_REMINDER, "true"), json!(true));
        assert_eq!(parse_setting_value("retries", " 3 "), json!(3));
        assert_eq!(
            parse_setting_value(SUPABASE_URL, "https://example.test"),
            json!("https://example.test")
        );
    }

    #[test]
    fn string_keys_keep_numeric_looking_text() {
        assert_eq!(parse_setting_value(SUPABASE_KEY, " 12345 "), json!("12345"));
        assert_eq!(parse_setting_value(SUPABASE_URL, "true"), json!("true"));
        assert!(validate_setting(SUPABASE_KEY, &parse_setting_value(SUPABASE_KEY, "12345")).is_ok());
    }

    #[test]
    fn typed_view_defaults_missing_keys() {
        let mut map = BTreeMap::new();
        map.insert(CLOUD_SYNC.to_string(), json!(true));
        map.insert(SUPABASE_URL.to_string(), json!("https://x"));
        let s = AppSettings::from_map(&map);
        assert!(!s.pin_lock);
        assert!(s.cloud_sync);
        assert!(!s.cloud_sync_configured());
    }
}
