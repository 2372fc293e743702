//! Relay between callers and the workflow provider.
//!
//! Every operation follows the same shape: build the provider payload, call
//! the provider (workflow runs go through [`RetryPolicy`]), then map the
//! provider's `data.outputs` onto the caller's envelope.

mod contract;
mod outputs;
mod translation;

pub use contract::ContractType;
pub use translation::translation_timeout;

use std::sync::Arc;

use crate::provider::WorkflowBackend;
use crate::retry::RetryPolicy;
use crate::settings::{LimitSettings, ProviderSettings, Settings, TimeoutSettings};

pub struct RelayService {
    backend: Arc<dyn WorkflowBackend>,
    provider: ProviderSettings,
    timeouts: TimeoutSettings,
    limits: LimitSettings,
    retry: RetryPolicy,
}

impl RelayService {
    pub fn new(backend: Arc<dyn WorkflowBackend>, settings: &Settings) -> Self {
        Self {
            backend,
            provider: settings.provider.clone(),
            timeouts: settings.timeouts.clone(),
            limits: settings.limits.clone(),
            retry: RetryPolicy::new(settings.retry.max_attempts),
        }
    }
}
