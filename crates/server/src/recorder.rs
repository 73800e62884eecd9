//! Event Recorder: validates candidate events and persists them.
//!
//! Shared by every write source (canary hits, manual reports, simulation).
//! Storage failures are returned to the caller as-is; there is no retry here.

use canary_core::error::Result;
use canary_core::{NewEvent, SecurityEvent};
use std::sync::Arc;

use crate::store::EventStore;

#[derive(Clone)]
pub struct EventRecorder {
    store: Arc<dyn EventStore>,
}

impl EventRecorder {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, candidate: &NewEvent) -> Result<SecurityEvent> {
        let event = candidate.validate()?;

        match self.store.insert(&event).await {
            Ok(stored) => {
                tracing::info!(
                    id = %stored.id,
                    event_type = %stored.event_type,
                    endpoint = %stored.endpoint,
                    ip = %stored.ip_address,
                    "security event recorded"
                );
                Ok(stored)
            }
            Err(e) => {
                tracing::error!(
                    event_type = event.event_type(),
                    endpoint = event.endpoint(),
                    "failed to record security event: {}",
                    e
                );
                Err(e)
            }
        }
    }
}
