use std::sync::Arc;

use crate::config::Config;
use crate::media::MediaStore;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. The gateways sit behind traits so workflows can be
/// exercised against an in-memory store in tests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub media: Arc<dyn MediaStore>,
    pub config: Config,
}
