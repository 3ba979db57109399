//! LegalAssist LLM Integration
//!
//! Model gateway, document segmentation, prompt templates and the
//! map-reduce document analyzer

mod analyze;
mod chunking;
mod client;
mod gateway;
mod prompts;
mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

use legalassist_common::{ModelConfig, Result};
use std::sync::Arc;
use std::time::Duration;

pub use analyze::{
    combine_extractions, AnalysisMode, AnalysisReport, Document, DocumentAnalyzer,
    PartialExtraction,
};
pub use chunking::{segment, Chunk};
pub use client::CohereClient;
pub use gateway::{ModelGateway, RetryGateway, TimeoutGateway};
pub use prompts::{PromptBuilder, PromptVariables, TemplateKind};
pub use types::{GenerateRequest, GenerateResponse, GenerationOptions, GenerationProfiles};

/// First backoff delay between retries
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Build the production gateway: Cohere, bounded per attempt, with retries
pub fn build_gateway(config: &ModelConfig) -> Result<Arc<dyn ModelGateway>> {
    let client = CohereClient::new(config)?;
    let gateway = RetryGateway::new(
        TimeoutGateway::new(client, config.timeout()),
        config.max_retries,
        RETRY_BASE_DELAY,
    );
    Ok(Arc::new(gateway))
}
