//! Feature dispatch with user-safe failure handling
//!
//! Only validation failures leave this module as errors. Every failure after
//! validation is logged and replaced by a fixed apology for the feature.

use legalassist_common::{AppConfig, LegalAssistError, Result};
use legalassist_llm::{
    Document, DocumentAnalyzer, GenerationProfiles, ModelGateway, PromptBuilder,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::types::ChatResponse;

pub const MISSING_MESSAGE: &str = "missing message";
pub const INVALID_FEATURE: &str = "invalid feature";

pub const CONSULT_APOLOGY: &str =
    "I'm sorry, I couldn't process your legal question right now. Please try again in a few moments.";
pub const ANALYZE_APOLOGY: &str =
    "I'm sorry, I couldn't analyze this document right now. Please try again later or submit a shorter document.";
pub const TEMPLATE_APOLOGY: &str =
    "I'm sorry, I couldn't generate the requested template right now. Please try again later.";

/// Pipeline selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feature {
    #[default]
    Consult,
    Analyze,
    GenerateTemplate,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Consult => "consult",
            Feature::Analyze => "analyze",
            Feature::GenerateTemplate => "generate-template",
        }
    }

    /// Fixed message returned when this pipeline fails
    pub fn apology(&self) -> &'static str {
        match self {
            Feature::Consult => CONSULT_APOLOGY,
            Feature::Analyze => ANALYZE_APOLOGY,
            Feature::GenerateTemplate => TEMPLATE_APOLOGY,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = LegalAssistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "consult" | "consultation" => Ok(Feature::Consult),
            "analyze" | "analysis" => Ok(Feature::Analyze),
            "generate-template" | "template" => Ok(Feature::GenerateTemplate),
            _ => Err(LegalAssistError::validation(INVALID_FEATURE)),
        }
    }
}

/// Confirmation shown above a generated template
pub fn template_confirmation(document_type: &str) -> String {
    format!(
        "I've generated a {} template for you. You can copy it below.",
        document_type
    )
}

/// Dispatches requests to the consult, analyze and generate-template pipelines
pub struct FeatureRouter {
    gateway: Arc<dyn ModelGateway>,
    prompts: Arc<PromptBuilder>,
    analyzer: DocumentAnalyzer,
    profiles: GenerationProfiles,
}

impl FeatureRouter {
    pub fn new(gateway: Arc<dyn ModelGateway>, config: &AppConfig) -> Result<Self> {
        let prompts = Arc::new(PromptBuilder::new()?);
        let profiles = GenerationProfiles::from_config(&config.model);
        let analyzer = DocumentAnalyzer::new(
            gateway.clone(),
            prompts.clone(),
            config.analysis.clone(),
            profiles,
        );

        Ok(Self {
            gateway,
            prompts,
            analyzer,
            profiles,
        })
    }

    /// Handle one `(message, feature)` request
    ///
    /// Fails only with [`LegalAssistError::Validation`]; an absent feature
    /// means consult.
    pub async fn handle(&self, message: Option<&str>, feature: Option<&str>) -> Result<ChatResponse> {
        let message = match message {
            Some(m) if !m.trim().is_empty() => m,
            _ => return Err(LegalAssistError::validation(MISSING_MESSAGE)),
        };

        let feature = match feature {
            Some(f) => f.parse::<Feature>()?,
            None => Feature::default(),
        };

        info!(
            "Handling {} request - Message length: {} chars",
            feature,
            message.chars().count()
        );

        let outcome = match feature {
            Feature::Consult => self.consult(message).await.map(ChatResponse::text),
            Feature::Analyze => self.analyze(Document::new(message)).await,
            Feature::GenerateTemplate => self.generate_template(message.trim()).await,
        };

        Ok(recover(feature, outcome))
    }

    /// Analyze text extracted from an uploaded file
    pub async fn handle_document(&self, document: Document) -> Result<ChatResponse> {
        if document.as_str().trim().is_empty() {
            return Err(LegalAssistError::validation(MISSING_MESSAGE));
        }

        info!(
            "Handling analyze request for uploaded file {}",
            document.source().unwrap_or("<unnamed>")
        );

        let outcome = self.analyze(document).await;
        Ok(recover(Feature::Analyze, outcome))
    }

    async fn consult(&self, query: &str) -> Result<String> {
        let prompt = self.prompts.consultation(query)?;
        self.gateway.generate(&prompt, &self.profiles.consult).await
    }

    async fn analyze(&self, document: Document) -> Result<ChatResponse> {
        let report = self.analyzer.analyze(&document).await?;
        debug!("Analysis finished with {} model calls", report.model_calls());
        Ok(ChatResponse::text(report.text))
    }

    async fn generate_template(&self, document_type: &str) -> Result<ChatResponse> {
        let prompt = self.prompts.template_generation(document_type)?;
        let template = self.gateway.generate(&prompt, &self.profiles.template).await?;

        Ok(ChatResponse {
            response: template_confirmation(document_type),
            template: Some(template),
            template_type: Some(document_type.to_string()),
        })
    }
}

/// Replace any pipeline failure with the feature's apology
fn recover(feature: Feature, outcome: Result<ChatResponse>) -> ChatResponse {
    match outcome {
        Ok(response) => response,
        Err(e) => {
            warn!("{} pipeline failed, returning apology: {}", feature, e);
            ChatResponse::text(feature.apology())
        }
    }
}
