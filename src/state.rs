use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    db::{MemoryDirectory, MemoryStore, PgStore, SharedDirectory, SharedStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub directory: SharedDirectory,
    pub config: Config,
}

impl AppState {
    /// Postgres serves both the quiz tables and the user directory.
    pub fn postgres(pool: sqlx::PgPool, config: Config) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            store: store.clone(),
            directory: store,
            config,
        }
    }

    pub fn in_memory(directory: Arc<MemoryDirectory>, config: Config) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            directory,
            config,
        }
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for SharedDirectory {
    fn from_ref(state: &AppState) -> Self {
        state.directory.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
