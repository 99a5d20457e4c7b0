use crate::{
    config::Config,
    services::store::{MemoryStore, RosterStore, SettingsStore},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<dyn SettingsStore>,
    pub roster: Arc<dyn RosterStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(settings: Arc<dyn SettingsStore>, roster: Arc<dyn RosterStore>, config: Config) -> Self {
        Self {
            settings,
            roster,
            config: Arc::new(config),
        }
    }

    /// Both stores backed by one `MemoryStore`.
    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, config)
    }
}
