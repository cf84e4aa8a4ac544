// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Feed paginator: bounded, newest-first windows over the confession
//! collection plus navigation metadata.
//!
//! The items query and the count query are two separate store reads with no
//! snapshot between them; under concurrent writes the metadata may be
//! slightly stale relative to the items. Accepted — exact consistency would
//! cost a synchronization mechanism the domain does not need.

use crate::error::Result;
use crate::models::Confession;
use crate::store::ConfessionStore;
use serde::Serialize;
use std::sync::Arc;

/// One feed page with navigation metadata.
#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub confessions: Vec<Confession>,
    pub pagination: Pagination,
}

/// Navigation metadata for a feed page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_confessions: u64,
}

/// Computes page windows over the store's descending-time order.
pub struct FeedPaginator {
    store: Arc<dyn ConfessionStore>,
    page_size: usize,
}

impl FeedPaginator {
    pub fn new(store: Arc<dyn ConfessionStore>, page_size: usize) -> Self {
        Self { store, page_size }
    }

    /// Fetch one page. Absent or sub-1 page numbers clamp to 1; a page
    /// beyond the last returns empty items with correct metadata.
    pub async fn page(&self, requested: Option<i64>) -> Result<FeedPage> {
        let current_page = requested.unwrap_or(1).max(1) as u64;
        // Saturate: an absurdly large page number is still just an empty page
        let skip = ((current_page - 1) as usize).saturating_mul(self.page_size);

        let confessions = self.store.find_page(skip, self.page_size).await?;
        let total_confessions = self.store.count().await?;
        let total_pages = total_confessions.div_ceil(self.page_size as u64);

        Ok(FeedPage {
            confessions,
            pagination: Pagination {
                current_page,
                total_pages,
                total_confessions,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confession;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};

    async fn seeded_store(n: usize) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let base = Utc::now();
        for i in 0..n {
            store
                .insert(Confession::new(
                    format!("post {i}"),
                    base + Duration::seconds(i as i64),
                ))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_page_clamps_below_one() {
        let store = seeded_store(5).await;
        let paginator = FeedPaginator::new(store, 15);

        let zero = paginator.page(Some(0)).await.unwrap();
        let one = paginator.page(Some(1)).await.unwrap();
        assert_eq!(zero.pagination.current_page, 1);
        assert_eq!(zero.confessions.len(), one.confessions.len());

        let negative = paginator.page(Some(-3)).await.unwrap();
        assert_eq!(negative.pagination.current_page, 1);
    }

    #[tokio::test]
    async fn test_page_defaults_to_one() {
        let store = seeded_store(3).await;
        let paginator = FeedPaginator::new(store, 15);

        let page = paginator.page(None).await.unwrap();
        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.confessions.len(), 3);
        // Newest first
        assert_eq!(page.confessions[0].text, "post 2");
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let paginator = FeedPaginator::new(store, 15);

        let page = paginator.page(Some(1)).await.unwrap();
        assert!(page.confessions.is_empty());
        assert_eq!(page.pagination.total_pages, 0);
        assert_eq!(page.pagination.total_confessions, 0);
    }
}
