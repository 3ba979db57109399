use std::time::Duration;

/// LegalAssist error types
#[derive(Debug, thiserror::Error)]
pub enum LegalAssistError {
    /// Request rejected before any processing (missing message, unknown feature)
    #[error("{0}")]
    Validation(String),

    /// A prompt template could not be rendered
    #[error("Template error: {0}")]
    Template(String),

    /// The generative model call failed
    #[error("Model error: {0}")]
    Model(String),

    /// The model provider refused the request (bad key, bad request)
    #[error("Model request rejected: {0}")]
    ModelRejected(String),

    /// The generative model call exceeded its time budget
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    /// Document analysis aborted; wraps the first model failure
    #[error("Analysis failed during {stage}: {source}")]
    Analysis {
        stage: String,
        #[source]
        source: Box<LegalAssistError>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LegalAssistError {
    /// Create validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Create model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a failure that aborted the analysis pipeline at `stage`
    pub fn analysis<S: Into<String>>(stage: S, source: LegalAssistError) -> Self {
        Self::Analysis {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error originated from the generative model
    pub fn is_model_failure(&self) -> bool {
        match self {
            Self::Model(_) | Self::ModelRejected(_) | Self::Timeout(_) => true,
            Self::Analysis { source, .. } => source.is_model_failure(),
            _ => false,
        }
    }

    /// Whether retrying the same model call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Model(_) | Self::Timeout(_))
    }
}

// HTTP response conversion
impl LegalAssistError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Timeout(_) => 504,
            Self::Model(_) => 502,
            Self::ModelRejected(_) => 502,
            Self::Analysis { .. } => 502,
            Self::Template(_) => 500,
            Self::Config(_) => 500,
            Self::Io(_) => 500,
            Self::Json(_) => 400,
            Self::Other(_) => 500,
        }
    }
}
