pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AnalysisConfig, AppConfig, ModelConfig};
pub use error::LegalAssistError;
pub type Result<T> = std::result::Result<T, LegalAssistError>;
