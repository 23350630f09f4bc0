//! Migration name rules.
//!
//! A migration name is `<14-digit timestamp>_<suffix>` where the suffix is
//! one or more `[A-Za-z0-9_]` characters. The prefix is conventionally
//! `YYYYMMDDHHMMSS` but the engine only ever compares it lexicographically.

use chrono::Utc;

/// Length of the timestamp prefix.
pub const TIMESTAMP_LEN: usize = 14;

/// Errors raised by [`validate_migration_name`], one per violated rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("invalid migration name: empty")]
    Empty,

    #[error("invalid migration name {name:?}: timestamp prefix must be 14 digits")]
    Timestamp { name: String },

    #[error("invalid migration name {name:?}: expected underscore after the timestamp")]
    Underscore { name: String },

    #[error("invalid migration name {name:?}: short, nothing follows the underscore")]
    Short { name: String },

    #[error("invalid migration name {name:?}: invalid character {ch:?} in suffix")]
    Charset { name: String, ch: char },
}

/// Validates a migration name against `^\d{14}_[A-Za-z0-9_]+$`.
pub fn validate_migration_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    let bytes = name.as_bytes();
    if bytes.len() < TIMESTAMP_LEN || !bytes[..TIMESTAMP_LEN].iter().all(u8::is_ascii_digit) {
        return Err(NameError::Timestamp { name: name.into() });
    }

    if bytes.len() == TIMESTAMP_LEN || bytes[TIMESTAMP_LEN] != b'_' {
        return Err(NameError::Underscore { name: name.into() });
    }

    let suffix = &name[TIMESTAMP_LEN + 1..];
    if suffix.is_empty() {
        return Err(NameError::Short { name: name.into() });
    }
    if let Some(ch) = suffix.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(NameError::Charset {
            name: name.into(),
            ch,
        });
    }

    Ok(())
}

/// Returns the 14-digit prefix of a (not necessarily valid) migration name.
pub fn version_of(name: &str) -> &str {
    name.get(..TIMESTAMP_LEN).unwrap_or(name)
}

/// Formats the current UTC wall-clock time as a 14-digit prefix.
pub fn timestamp_prefix() -> String {
    Utc::now().format("%Y%m%d%H%M%S").to_string()
}

/// Returns the smallest 14-digit prefix strictly greater than `prefix`.
///
/// Used to keep in-process plans strictly ascending when two operations
/// land within the same wall-clock second.
pub fn bump_prefix(prefix: &str) -> String {
    let n: u64 = prefix.parse().unwrap_or(0);
    format!("{:014}", n + 1)
}
