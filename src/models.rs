// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Data models for confessions and their embedded comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a confession or comment, in characters.
pub const MAX_TEXT_LEN: usize = 300;

/// An anonymous confession with its embedded comment thread.
///
/// Comments are plain strings owned by the confession; insertion order is
/// display order. `created_at` is set once when the confession is admitted
/// and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confession {
    /// Unique record identifier
    pub id: Uuid,
    /// Confession text (1..=300 characters)
    pub text: String,
    /// Creation timestamp, server clock
    pub created_at: DateTime<Utc>,
    /// Append-only comment thread
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Confession {
    /// Create a new confession with an empty comment thread.
    pub fn new(text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            created_at,
            comments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_confession_has_empty_comments() {
        let confession = Confession::new("hello".to_string(), Utc::now());
        assert_eq!(confession.text, "hello");
        assert!(confession.comments.is_empty());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let confession = Confession::new("hello".to_string(), Utc::now());
        let json = serde_json::to_value(&confession).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
