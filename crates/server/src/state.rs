use std::sync::Arc;
use std::time::Instant;

use spiral_core::{Config, MemoryStore, SanitizedConfig};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    memory: Option<Arc<dyn MemoryStore>>,
    ws_broadcaster: WsBroadcaster,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        config: Config,
        memory: Option<Arc<dyn MemoryStore>>,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        Self {
            config,
            memory,
            ws_broadcaster,
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// The memory store, if `[memory].enabled` and it opened successfully.
    pub fn memory(&self) -> Option<&Arc<dyn MemoryStore>> {
        self.memory.as_ref()
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
