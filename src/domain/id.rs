//! Identifiers for tasks, projects and work logs
//!
//! ID Format:
//! - Task IDs: `t-{7-char-hash}` (e.g., `t-9d3e5f2`)
//! - Work log IDs: `log-{7-char-hash}`
//! - Project IDs: any non-empty string (opaque to the engine)
//!
//! Hashes are derived from title + creation timestamp, so the same title
//! created at different times produces different IDs. Parsing accepts any
//! non-empty, whitespace-free string so that IDs from imported backups survive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("ID must not be empty")]
    Empty,

    #[error("ID must not contain whitespace: '{0}'")]
    Whitespace(String),
}

/// Generates a 7-character hash from title and timestamp
fn generate_hash(title: &str, timestamp: DateTime<Utc>) -> String {
    let input = format!("{}{}", title, timestamp.timestamp_nanos_opt().unwrap_or(0));
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

fn validate(s: &str) -> Result<String, IdError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if s.chars().any(char::is_whitespace) {
        return Err(IdError::Whitespace(s.to_string()));
    }
    Ok(s.to_string())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Returns the ID as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate(s).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// Task ID, stable for the task's lifetime
    TaskId
);

string_id!(
    /// Owning project of a task; only used for filtering
    ProjectId
);

string_id!(
    /// Work log entry ID
    LogId
);

impl TaskId {
    /// Creates a fresh task ID from title and timestamp
    pub fn generate(title: &str, timestamp: DateTime<Utc>) -> Self {
        Self(format!("t-{}", generate_hash(title, timestamp)))
    }
}

impl LogId {
    /// Creates a fresh log ID from the log content and timestamp
    pub fn generate(content: &str, timestamp: DateTime<Utc>) -> Self {
        Self(format!("log-{}", generate_hash(content, timestamp)))
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self("default".to_string())
    }
}
