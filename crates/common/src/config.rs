use crate::error::LegalAssistError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Document analysis policy
///
/// `single_shot_threshold` decides whether a document is segmented at all;
/// `chunk_size` and `chunk_overlap` only shape the windows once it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Documents at or below this many characters skip segmentation
    pub single_shot_threshold: usize,

    /// Maximum characters per chunk
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,

    /// Chunk analyses allowed in flight at once (1 = sequential)
    pub chunk_concurrency: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            single_shot_threshold: 120_000,
            chunk_size: 32_000,
            chunk_overlap: 500,
            chunk_concurrency: 1,
        }
    }
}

impl AnalysisConfig {
    /// Validate the segmentation policy
    pub fn validate(&self) -> Result<(), LegalAssistError> {
        if self.chunk_size == 0 {
            return Err(LegalAssistError::config("Chunk size cannot be 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(LegalAssistError::config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.chunk_concurrency == 0 {
            return Err(LegalAssistError::config("Chunk concurrency cannot be 0"));
        }

        Ok(())
    }
}

/// Generative model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Cohere API key
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Cohere API base URL
    pub base_url: String,

    /// Model name
    pub model: String,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    pub max_retries: u32,

    /// Sampling temperature for free-form consultation
    pub consult_temperature: f32,

    /// Sampling temperature for chunk and final analysis
    pub analysis_temperature: f32,

    /// Sampling temperature for template generation
    pub template_temperature: f32,

    pub consult_max_tokens: u32,
    pub chunk_max_tokens: u32,
    pub analysis_max_tokens: u32,
    pub template_max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.cohere.ai".to_string(),
            model: "command".to_string(),
            timeout_secs: 120,
            max_retries: 2,
            consult_temperature: 0.7,
            analysis_temperature: 0.1,
            template_temperature: 0.1,
            consult_max_tokens: 1000,
            chunk_max_tokens: 1000,
            analysis_max_tokens: 2000,
            template_max_tokens: 2500,
        }
    }
}

impl ModelConfig {
    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate model settings
    pub fn validate(&self) -> Result<(), LegalAssistError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(LegalAssistError::config(
                "Model base URL must start with http:// or https://",
            ));
        }

        if self.model.trim().is_empty() {
            return Err(LegalAssistError::config("Model name cannot be empty"));
        }

        if self.timeout_secs == 0 {
            return Err(LegalAssistError::config("Model timeout cannot be 0"));
        }

        for (name, value) in [
            ("consult", self.consult_temperature),
            ("analysis", self.analysis_temperature),
            ("template", self.template_temperature),
        ] {
            if !(0.0..=5.0).contains(&value) {
                return Err(LegalAssistError::config(format!(
                    "{} temperature must be between 0 and 5, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("consult", self.consult_max_tokens),
            ("chunk", self.chunk_max_tokens),
            ("analysis", self.analysis_max_tokens),
            ("template", self.template_max_tokens),
        ] {
            if value == 0 {
                return Err(LegalAssistError::config(format!(
                    "{} max tokens cannot be 0",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// LegalAssist application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Allow cross-origin requests from any origin
    pub cors_allow_any_origin: bool,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,

    /// Log directory (console only when unset)
    pub log_dir: Option<PathBuf>,

    /// Log level
    pub log_level: String,

    /// Generative model settings
    pub model: ModelConfig,

    /// Document analysis policy
    pub analysis: AnalysisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 5000,
            cors_allow_any_origin: true,
            max_upload_bytes: 10 * 1024 * 1024,
            log_dir: None,
            log_level: "info".to_string(),
            model: ModelConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, LegalAssistError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LegalAssistError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let model_defaults = ModelConfig::default();
        let analysis_defaults = AnalysisConfig::default();

        let config = Self {
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var(&lookup, "SERVER_PORT")?.unwrap_or(defaults.server_port),
            cors_allow_any_origin: parse_var(&lookup, "CORS_ALLOW_ANY_ORIGIN")?
                .unwrap_or(defaults.cors_allow_any_origin),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
            log_dir: lookup("LOG_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            model: ModelConfig {
                api_key: lookup("COHERE_API_KEY").unwrap_or_default(),
                base_url: lookup("COHERE_BASE_URL").unwrap_or(model_defaults.base_url),
                model: lookup("COHERE_MODEL").unwrap_or(model_defaults.model),
                timeout_secs: parse_var(&lookup, "MODEL_TIMEOUT_SECS")?
                    .unwrap_or(model_defaults.timeout_secs),
                max_retries: parse_var(&lookup, "MODEL_MAX_RETRIES")?
                    .unwrap_or(model_defaults.max_retries),
                consult_temperature: parse_var(&lookup, "CONSULT_TEMPERATURE")?
                    .unwrap_or(model_defaults.consult_temperature),
                analysis_temperature: parse_var(&lookup, "ANALYSIS_TEMPERATURE")?
                    .unwrap_or(model_defaults.analysis_temperature),
                template_temperature: parse_var(&lookup, "TEMPLATE_TEMPERATURE")?
                    .unwrap_or(model_defaults.template_temperature),
                consult_max_tokens: parse_var(&lookup, "CONSULT_MAX_TOKENS")?
                    .unwrap_or(model_defaults.consult_max_tokens),
                chunk_max_tokens: parse_var(&lookup, "CHUNK_MAX_TOKENS")?
                    .unwrap_or(model_defaults.chunk_max_tokens),
                analysis_max_tokens: parse_var(&lookup, "ANALYSIS_MAX_TOKENS")?
                    .unwrap_or(model_defaults.analysis_max_tokens),
                template_max_tokens: parse_var(&lookup, "TEMPLATE_MAX_TOKENS")?
                    .unwrap_or(model_defaults.template_max_tokens),
            },
            analysis: AnalysisConfig {
                single_shot_threshold: parse_var(&lookup, "SINGLE_SHOT_THRESHOLD")?
                    .unwrap_or(analysis_defaults.single_shot_threshold),
                chunk_size: parse_var(&lookup, "CHUNK_SIZE")?
                    .unwrap_or(analysis_defaults.chunk_size),
                chunk_overlap: parse_var(&lookup, "CHUNK_OVERLAP")?
                    .unwrap_or(analysis_defaults.chunk_overlap),
                chunk_concurrency: parse_var(&lookup, "CHUNK_CONCURRENCY")?
                    .unwrap_or(analysis_defaults.chunk_concurrency),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), LegalAssistError> {
        if self.server_port == 0 {
            return Err(LegalAssistError::config("Server port cannot be 0"));
        }

        if self.max_upload_bytes == 0 {
            return Err(LegalAssistError::config("Max upload size cannot be 0"));
        }

        self.model.validate()?;
        self.analysis.validate()?;

        Ok(())
    }
}

/// Parse an optional variable, failing loudly on malformed values
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, LegalAssistError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map(Some).map_err(|e| {
            LegalAssistError::config(format!("Invalid value for {}: '{}' ({})", key, raw, e))
        }),
        _ => Ok(None),
    }
}
