use async_trait::async_trait;
use legalassist_common::{LegalAssistError, ModelConfig, Result};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::gateway::ModelGateway;
use crate::types::{ApiErrorBody, GenerateRequest, GenerateResponse, GenerationOptions};

/// Longest slice of an error body kept in error messages
const ERROR_BODY_EXCERPT: usize = 200;

/// Cohere generate API client
///
/// Makes exactly one HTTP attempt per call; timeouts and retries are layered
/// on top with [`crate::TimeoutGateway`] and [`crate::RetryGateway`].
#[derive(Debug, Clone)]
pub struct CohereClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl CohereClient {
    /// Create new Cohere client
    pub fn new(config: &ModelConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LegalAssistError::config("COHERE_API_KEY is not set"));
        }

        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!("Cohere client initialized: {} (model: {})", base_url, config.model);

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
        })
    }

    /// Model name sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single attempt to generate text
    async fn try_generate(&self, request: &GenerateRequest) -> Result<String> {
        let url = format!("{}/v1/generate", self.base_url);

        debug!(
            "Sending generate request to Cohere - Model: {}, Prompt length: {}, Max tokens: {}",
            request.model,
            request.prompt.len(),
            request.max_tokens
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LegalAssistError::model(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LegalAssistError::model(format!("Failed to parse response: {}", e)))?;

        let text = result
            .generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LegalAssistError::model("Empty response from Cohere"));
        }

        debug!("Received response from Cohere - Length: {}", text.len());
        Ok(text)
    }
}

#[async_trait]
impl ModelGateway for CohereClient {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        self.try_generate(&request).await
    }

    fn name(&self) -> &str {
        "cohere"
    }
}

/// Map a non-success response to an error; 4xx other than 429 is not retryable
fn api_error(status: StatusCode, body: &str) -> LegalAssistError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.chars().take(ERROR_BODY_EXCERPT).collect());

    let message = format!("Cohere API error {}: {}", status.as_u16(), detail);

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        LegalAssistError::model(message)
    } else {
        LegalAssistError::ModelRejected(message)
    }
}
