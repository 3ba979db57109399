use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chat request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    /// Question, document text, or document type depending on the feature
    #[serde(default)]
    pub message: Option<String>,

    /// consult, analyze or generate-template (consult when absent)
    #[serde(default)]
    pub feature: Option<String>,
}

/// Successful outcome of a chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Text shown to the user
    pub response: String,

    /// Raw generated template (generate-template only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Echoed document type (generate-template only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
}

impl ChatResponse {
    /// Plain text response
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            template: None,
            template_type: None,
        }
    }
}

/// Error body for client errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,

    /// Model backend name
    pub model: String,

    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_omits_template_fields() {
        let json = serde_json::to_value(ChatResponse::text("hello")).unwrap();
        assert_eq!(json, serde_json::json!({ "response": "hello" }));
    }

    #[test]
    fn test_chat_response_uses_camel_case() {
        let response = ChatResponse {
            response: "done".to_string(),
            template: Some("TEMPLATE".to_string()),
            template_type: Some("lease".to_string()),
        };
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["templateType"], "lease");
        assert_eq!(json["template"], "TEMPLATE");
    }

    #[test]
    fn test_chat_request_fields_are_optional() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_none());
        assert!(req.feature.is_none());
    }
}
