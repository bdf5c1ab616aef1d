use transit_tracker::{config::TrackerConfig, store::in_memory_store::InMemoryPositionStore};

pub struct AppState {
    pub store: InMemoryPositionStore,
    pub config: TrackerConfig,
}

impl AppState {
    pub fn new(config: TrackerConfig) -> Self {
        AppState {
            store: InMemoryPositionStore::new(),
            config,
        }
    }
}
