pub mod error;
pub mod event;
pub mod event_type;
pub mod filter;
pub mod stats;


pub use error::EventError;
pub use event::{NewEvent, Resolution, SecurityEvent, ValidatedEvent};
pub use event_type::EventType;
pub use filter::{fold_case, EventFilter, Predicate, TextField, DEFAULT_LIMIT, MAX_LIMIT, MAX_SEARCH_LEN};
pub use stats::EventStats;
