use std::sync::Arc;

use crate::provider::{WorkflowBackend, WorkflowClient};
use crate::relay::RelayService;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub relay: Arc<RelayService>,
}

impl AppState {
    /// State backed by the HTTP provider client at `settings.provider.base_url`.
    pub fn new(settings: Settings) -> Self {
        let backend = Arc::new(WorkflowClient::new(settings.provider.base_url.clone()));
        Self::with_backend(settings, backend)
    }

    pub fn with_backend(settings: Settings, backend: Arc<dyn WorkflowBackend>) -> Self {
        let relay = Arc::new(RelayService::new(backend, &settings));
        Self {
            settings: Arc::new(settings),
            relay,
        }
    }
}
