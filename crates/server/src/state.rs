use legalassist_common::{AppConfig, Result};
use legalassist_llm::ModelGateway;
use std::sync::Arc;

use crate::router::FeatureRouter;

/// Shared application state
///
/// Read-only after start-up; every request borrows it concurrently.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Feature router over the injected model gateway
    pub router: FeatureRouter,

    /// Model backend name for health reports
    pub model_name: String,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig, gateway: Arc<dyn ModelGateway>) -> Result<Self> {
        let model_name = gateway.name().to_string();
        let router = FeatureRouter::new(gateway, &config)?;

        Ok(Self {
            config,
            router,
            model_name,
        })
    }
}
