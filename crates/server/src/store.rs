//! Event Store Adapter contract.
//!
//! A narrow capability over one append-mostly table: insert, filtered select,
//! single-row lookup, resolution update, delete. Every operation is a single
//! independent store call; the store is the only serialization point.

use async_trait::async_trait;
use canary_core::error::Result;
use canary_core::{EventFilter, EventStats, Resolution, SecurityEvent, ValidatedEvent};

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new row. The store assigns `id` and `created_at`; the row
    /// starts unresolved.
    async fn insert(&self, event: &ValidatedEvent) -> Result<SecurityEvent>;

    /// Rows matching `filter.predicate()`, newest first, at most `filter.limit`.
    async fn select(&self, filter: &EventFilter) -> Result<Vec<SecurityEvent>>;

    async fn get(&self, id: &str) -> Result<Option<SecurityEvent>>;

    /// Overwrite the resolution pair. `None` when the id does not exist.
    async fn update_resolution(
        &self,
        id: &str,
        resolution: Resolution,
    ) -> Result<Option<SecurityEvent>>;

    /// `false` when the id does not exist.
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn stats(&self) -> Result<EventStats>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<()>;
}
