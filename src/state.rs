use std::sync::Arc;

use crate::{config::Config, store::RecordStore};

/// Handles shared across request handlers. Built once at startup; the store
/// is a stateless connection handle, never shared mutable state.
pub struct AppState<S: RecordStore> {
    pub config: Config,
    pub store: S,
}

impl<S: RecordStore> AppState<S> {
    pub fn new(config: Config, store: S) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
