use legalassist_common::ModelConfig;
use serde::{Deserialize, Serialize};

/// Sampling options for one model call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationOptions {
    /// Temperature (0.0 - 5.0)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl GenerationOptions {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Sampling options for each kind of model call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationProfiles {
    /// Free-form legal consultation
    pub consult: GenerationOptions,

    /// Map step, one call per chunk
    pub chunk_analysis: GenerationOptions,

    /// Reduce step producing the final report
    pub final_analysis: GenerationOptions,

    /// Document template drafting
    pub template: GenerationOptions,
}

impl GenerationProfiles {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            consult: GenerationOptions::new(config.consult_temperature, config.consult_max_tokens),
            chunk_analysis: GenerationOptions::new(
                config.analysis_temperature,
                config.chunk_max_tokens,
            ),
            final_analysis: GenerationOptions::new(
                config.analysis_temperature,
                config.analysis_max_tokens,
            ),
            template: GenerationOptions::new(
                config.template_temperature,
                config.template_max_tokens,
            ),
        }
    }
}

impl Default for GenerationProfiles {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

/// Cohere generate request
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Model name (e.g., "command", "command-light")
    pub model: String,

    /// Prompt text
    pub prompt: String,

    /// Temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

/// Cohere generate response
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Candidate generations, best first
    #[serde(default)]
    pub generations: Vec<Generation>,
}

/// One generated candidate
#[derive(Debug, Clone, Deserialize)]
pub struct Generation {
    /// Generated text
    pub text: String,
}

/// Cohere error body
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}
