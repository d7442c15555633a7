//! Events: the text under evaluation plus its context and history.

mod types;

pub use types::{Event, EventContext, RefinementRecord, X_PLATFORM_SOURCE};
