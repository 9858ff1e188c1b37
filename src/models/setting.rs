use rusqlite::{Connection, OptionalExtension, Result, params};
use std::time::{SystemTime, UNIX_EPOCH};

/// One persisted key with its JSON-encoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: i64,
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_secs()).ok())
        .unwrap_or_default()
}

impl Setting {
    pub fn find(conn: &Connection, key: &str) -> Result<Option<Self>> {
        conn.query_row(
            "SELECT key, value, updated_at FROM settings WHERE key = ?1",
            params![key],
            |row| {
                Ok(Self {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            },
        )
        .optional()
    }

    /// Load the given keys; keys with no stored row are simply missing from the result.
    pub fn find_many(conn: &Connection, keys: &[&str]) -> Result<Vec<Self>> {
        let mut found = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(setting) = Self::find(conn, key)? {
                found.push(setting);
            }
        }
        Ok(found)
    }

    /// Insert or replace the value stored under `key`.
    pub fn upsert(conn: &Connection, key: &str, value: &str) -> Result<Self> {
        let updated_at = current_timestamp();
        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, updated_at],
        )?;
        Ok(Self { key: key.to_string(), value: value.to_string(), updated_at })
    }
}
