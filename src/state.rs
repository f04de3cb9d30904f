// src/state.rs

use std::sync::Arc;

use crate::{api::QuizBackend, storage::KeyValueStore};

/// Shared handles every quiz runner is built from.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn QuizBackend>,

    /// Holds in-progress sessions (`quizstate:*`) and finished results.
    pub session_store: Arc<dyn KeyValueStore>,

    /// Holds timer snapshots and submission markers.
    pub durable_store: Arc<dyn KeyValueStore>,
}

impl AppState {
    /// One store for everything.
    pub fn with_single_store(
        backend: Arc<dyn QuizBackend>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            backend,
            session_store: store.clone(),
            durable_store: store,
        }
    }
}
