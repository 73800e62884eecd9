//! Resolution State Manager and deletion.
//!
//! The only mutation paths for existing events. Re-resolving an already
//! resolved event refreshes `resolved_at` to the time of the latest call.

use canary_core::error::Result;
use canary_core::{EventError, Resolution, SecurityEvent};
use chrono::Utc;
use std::sync::Arc;

use crate::store::EventStore;

#[derive(Clone)]
pub struct ResolutionManager {
    store: Arc<dyn EventStore>,
}

impl ResolutionManager {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Move an event to the target state. Idempotent: the same target twice
    /// leaves `resolved` unchanged.
    pub async fn set_resolved(&self, id: &str, resolved: bool) -> Result<SecurityEvent> {
        let target = Resolution::target(resolved, Utc::now());

        let event = self
            .store
            .update_resolution(id, target)
            .await?
            .ok_or_else(|| EventError::not_found(id))?;

        tracing::info!(id = %event.id, resolved = event.resolved, "event resolution updated");
        Ok(event)
    }

    /// Permanently remove an event.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(EventError::not_found(id));
        }
        tracing::info!(id = %id, "event deleted");
        Ok(())
    }
}
