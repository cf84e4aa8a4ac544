// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Record store adapter for confessions.
//!
//! The pipeline and paginator only ever talk to [`ConfessionStore`]; the
//! in-memory adapter below is the default backend, and a document database
//! adapter plugs in behind the same trait. Every write is a single-document
//! create or single-document field append, so the adapter needs no
//! cross-record transactions.

use crate::models::Confession;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;

/// Generic document collection operations over confessions.
#[async_trait]
pub trait ConfessionStore: Send + Sync {
    /// Insert a new confession.
    async fn insert(&self, confession: Confession) -> Result<Confession>;

    /// Fetch a window of confessions ordered by `created_at` descending.
    ///
    /// Records with equal timestamps keep store iteration order.
    async fn find_page(&self, skip: usize, limit: usize) -> Result<Vec<Confession>>;

    /// Count all confessions.
    async fn count(&self) -> Result<u64>;

    /// Fetch a confession by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Confession>>;

    /// Append a comment to a confession; returns the updated record, or
    /// `None` if the id does not resolve.
    async fn append_comment(&self, id: Uuid, comment: String) -> Result<Option<Confession>>;

    /// Delete a confession by id; returns whether a record was removed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool>;

    /// Bulk delete by exact text equality; returns the number removed.
    async fn delete_by_text(&self, text: &str) -> Result<u64>;
}

/// In-memory confession store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<Confession>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfessionStore for MemoryStore {
    async fn insert(&self, confession: Confession) -> Result<Confession> {
        let mut records = self.records.write().await;
        records.push(confession.clone());
        Ok(confession)
    }

    async fn find_page(&self, skip: usize, limit: usize) -> Result<Vec<Confession>> {
        let records = self.records.read().await;
        let mut sorted: Vec<Confession> = records.clone();
        // Stable sort: equal timestamps keep insertion order
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sorted.into_iter().skip(skip).take(limit).collect())
    }

    async fn count(&self) -> Result<u64> {
        let records = self.records.read().await;
        Ok(records.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Confession>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|c| c.id == id).cloned())
    }

    async fn append_comment(&self, id: Uuid, comment: String) -> Result<Option<Confession>> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|c| c.id == id) {
            Some(confession) => {
                confession.comments.push(comment);
                Ok(Some(confession.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|c| c.id != id);
        Ok(records.len() < before)
    }

    async fn delete_by_text(&self, text: &str) -> Result<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|c| c.text != text);
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn confession(text: &str, offset_secs: i64) -> Confession {
        Confession::new(text.to_string(), Utc::now() + Duration::seconds(offset_secs))
    }

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let store = MemoryStore::new();
        let created = store.insert(confession("hello", 0)).await.unwrap();

        let found = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.text, "hello");
        assert!(found.comments.is_empty());
    }

    #[tokio::test]
    async fn test_find_page_descending() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert(confession(&format!("post {i}"), i)).await.unwrap();
        }

        let page = store.find_page(0, 3).await.unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].text, "post 4");
        assert_eq!(page[1].text, "post 3");
        assert_eq!(page[2].text, "post 2");

        let rest = store.find_page(3, 3).await.unwrap();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].text, "post 1");
    }

    #[tokio::test]
    async fn test_append_comment_preserves_order() {
        let store = MemoryStore::new();
        let created = store.insert(confession("hello", 0)).await.unwrap();

        store.append_comment(created.id, "first".to_string()).await.unwrap();
        let updated = store
            .append_comment(created.id, "second".to_string())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.comments, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_append_comment_missing_id() {
        let store = MemoryStore::new();
        let result = store
            .append_comment(Uuid::new_v4(), "orphan".to_string())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let store = MemoryStore::new();
        let created = store.insert(confession("hello", 0)).await.unwrap();

        assert!(store.delete_by_id(created.id).await.unwrap());
        assert!(!store.delete_by_id(created.id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_by_text() {
        let store = MemoryStore::new();
        store.insert(confession("spam", 0)).await.unwrap();
        store.insert(confession("keep", 1)).await.unwrap();
        store.insert(confession("spam", 2)).await.unwrap();

        let removed = store.delete_by_text("spam").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
