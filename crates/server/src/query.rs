//! Event Query Engine: bounded, filtered, newest-first views of the event log.
//!
//! Filtering and ordering are pushed down to the store; nothing here scans
//! the full table.

use canary_core::error::Result;
use canary_core::{EventError, EventFilter, EventStats, SecurityEvent};
use serde::Deserialize;
use std::sync::Arc;

use crate::store::EventStore;

/// Raw filter parameters as they arrive on the query string.
///
/// Kept as strings so that odd values (`limit=abc`, `resolved=maybe`) degrade
/// to "no restriction" instead of rejecting the request. Only an over-long `q`
/// is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQueryParams {
    pub limit: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub resolved: Option<String>,
    pub q: Option<String>,
}

impl EventQueryParams {
    pub fn to_filter(&self) -> Result<EventFilter> {
        EventFilter::from_params(
            self.limit.as_deref(),
            self.event_type.as_deref(),
            self.resolved.as_deref(),
            self.q.as_deref(),
        )
    }
}

#[derive(Clone)]
pub struct EventQueryEngine {
    store: Arc<dyn EventStore>,
}

impl EventQueryEngine {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Matching events, newest first. No matches is an empty list, not an error.
    pub async fn list(&self, filter: &EventFilter) -> Result<Vec<SecurityEvent>> {
        let events = self.store.select(filter).await?;
        tracing::debug!(
            limit = filter.limit,
            event_type = ?filter.event_type,
            resolved = ?filter.resolved,
            q = ?filter.search,
            returned = events.len(),
            "event query"
        );
        Ok(events)
    }

    pub async fn get(&self, id: &str) -> Result<SecurityEvent> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| EventError::not_found(id))
    }

    pub async fn stats(&self) -> Result<EventStats> {
        self.store.stats().await
    }
}
