use std::sync::Arc;

use crate::pipeline::ScreeningCoordinator;
use crate::store::ScreeningStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence behind a trait so tests can swap the Postgres store out.
    pub store: Arc<dyn ScreeningStore>,
    pub coordinator: ScreeningCoordinator,
}
