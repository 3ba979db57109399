use async_trait::async_trait;
use legalassist_common::{LegalAssistError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::GenerationOptions;

/// Single-shot access to the generative text model
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Generate text from a prompt
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Backend name for logs and health reports
    fn name(&self) -> &str;
}

#[async_trait]
impl<G: ModelGateway + ?Sized> ModelGateway for Arc<G> {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        (**self).generate(prompt, options).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Bounds every call to the inner gateway
///
/// An elapsed call fails with [`LegalAssistError::Timeout`].
pub struct TimeoutGateway<G> {
    inner: G,
    timeout: Duration,
}

impl<G: ModelGateway> TimeoutGateway<G> {
    pub fn new(inner: G, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<G: ModelGateway> ModelGateway for TimeoutGateway<G> {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        match tokio::time::timeout(self.timeout, self.inner.generate(prompt, options)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{} call timed out after {:?}", self.inner.name(), self.timeout);
                Err(LegalAssistError::Timeout(self.timeout))
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Retries retryable failures with exponential backoff
///
/// Waits `base_delay`, then twice that, and so on between attempts.
pub struct RetryGateway<G> {
    inner: G,
    max_retries: u32,
    base_delay: Duration,
}

impl<G: ModelGateway> RetryGateway<G> {
    pub fn new(inner: G, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }
}

#[async_trait]
impl<G: ModelGateway> ModelGateway for RetryGateway<G> {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let attempts = self.max_retries + 1;
        let mut attempt = 1;

        loop {
            match self.inner.generate(prompt, options).await {
                Ok(text) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", self.inner.name(), attempt);
                    }
                    return Ok(text);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let delay = self.base_delay * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        "{} request failed (attempt {}/{}): {}. Retrying in {:?}...",
                        self.inner.name(),
                        attempt,
                        attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGateway;

    fn options() -> GenerationOptions {
        GenerationOptions::new(0.1, 100)
    }

    #[tokio::test]
    async fn test_timeout_gateway_passes_through() {
        let gateway = TimeoutGateway::new(
            ScriptedGateway::new().reply("done"),
            Duration::from_secs(5),
        );
        assert_eq!(gateway.generate("p", &options()).await.unwrap(), "done");
        assert_eq!(gateway.name(), "scripted");
    }

    #[tokio::test]
    async fn test_timeout_gateway_times_out() {
        let inner = ScriptedGateway::new()
            .with_delay(Duration::from_millis(500))
            .reply("too late");
        let gateway = TimeoutGateway::new(inner, Duration::from_millis(20));

        let err = gateway.generate("p", &options()).await.unwrap_err();
        assert!(matches!(err, LegalAssistError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_retry_gateway_recovers() {
        let inner = Arc::new(
            ScriptedGateway::new()
                .fail("503 upstream")
                .fail("503 upstream")
                .reply("answer"),
        );
        let gateway = RetryGateway::new(inner.clone(), 2, Duration::from_millis(1));

        assert_eq!(gateway.generate("p", &options()).await.unwrap(), "answer");
        assert_eq!(inner.call_count(), 3);
    }

    #[tokio::test]
    async fn test_retry_gateway_gives_up() {
        let inner = Arc::new(
            ScriptedGateway::new()
                .fail("first")
                .fail("second")
                .reply("never reached"),
        );
        let gateway = RetryGateway::new(inner.clone(), 1, Duration::from_millis(1));

        let err = gateway.generate("p", &options()).await.unwrap_err();
        assert_eq!(err.to_string(), "Model error: second");
        assert_eq!(inner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_retry_gateway_skips_non_retryable() {
        let inner = Arc::new(ScriptedGateway::new().fail_with(LegalAssistError::config("no key")));
        let gateway = RetryGateway::new(inner.clone(), 3, Duration::from_millis(1));

        assert!(gateway.generate("p", &options()).await.is_err());
        assert_eq!(inner.call_count(), 1);
    }
}
