//! Error Types

use thiserror::Error;

/// Result type alias for insight operations
pub type Result<T> = std::result::Result<T, InsightError>;

/// Insight error types
#[derive(Error, Debug)]
pub enum InsightError {
    /// Generative provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Response could not be turned into an assessment
    #[error("Parse error: {0}")]
    Parse(String),
}

impl InsightError {
    /// Convert to a message for the analysis panel
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => "The AI service is currently unavailable. Please try again.".into(),
            Self::Parse(_) => "The AI response could not be understood. Please try again.".into(),
        }
    }
}
