//! HTTP API.
//!
//! Routes:
//! - `GET  /`                     welcome message
//! - `GET  /api/health`           liveness
//! - `POST /api/scan`             run and store a scan
//! - `GET  /api/scans`            all scans, most recent first
//! - `GET  /api/scan/:id`         one scan
//! - `GET  /api/scan/:id/export`  xlsx download

mod error;
pub mod routes;

use crate::scanner::ScanOrchestrator;
use crate::storage::ScanStore;
use std::sync::Arc;

pub use routes::create_router;

/// Shared state for all handlers.
pub struct AppState {
    pub orchestrator: ScanOrchestrator,
    pub store: Arc<ScanStore>,
}

impl AppState {
    pub fn new(orchestrator: ScanOrchestrator, store: ScanStore) -> Self {
        Self {
            orchestrator,
            store: Arc::new(store),
        }
    }
}
